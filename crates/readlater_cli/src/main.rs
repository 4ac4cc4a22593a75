//! Command-line front end for the item store.
//!
//! # Responsibility
//! - Drive item use-cases against the same SQLite file the app uses.
//! - Keep output deterministic for quick local sanity checks.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use readlater_core::db::open_db;
use readlater_core::model::timestamp::{parse_iso, to_iso};
use readlater_core::{
    init_logging_with, CoreConfig, Item, ItemDraft, ItemPatch, ItemService, KvItemRepository,
    SqliteKeyValueStore, Timestamp,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "readlater", version, about = "Read/do-later item store")]
struct Cli {
    /// Database file (overrides READLATER_DB_PATH).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print core linkage info.
    Ping,

    /// List items, newest first.
    List {
        /// Print the stored JSON records.
        #[arg(long)]
        json: bool,
    },

    /// Create an item.
    Add {
        name: String,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long)]
        url: Option<String>,
        /// ISO-8601 due date (default: now).
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        read_later: bool,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Update fields of an existing item. Pass an empty string to clear
    /// `--url` or `--notes`.
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        read_later: Option<bool>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete an item by id.
    Delete { id: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CoreConfig::from_env().context("failed to resolve configuration")?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Err(err) = init_logging_with(&config) {
        eprintln!("warning: logging disabled: {err}");
    }

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    let service = ItemService::new(KvItemRepository::new(SqliteKeyValueStore::new(&conn)));

    match cli.command {
        Command::Ping => {
            println!("readlater_core ping={}", readlater_core::ping());
            println!("readlater_core version={}", readlater_core::core_version());
            println!("db={}", config.db_path.display());
        }
        Command::List { json } => {
            let items = service.list_items();
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else if items.is_empty() {
                println!("No items.");
            } else {
                for item in &items {
                    println!("{}", summary_line(item));
                }
            }
        }
        Command::Add {
            name,
            category,
            url,
            due,
            read_later,
            notes,
        } => {
            let draft = ItemDraft {
                name,
                category,
                url,
                due_date: parse_due(due.as_deref())?,
                read_later,
                notes,
            };
            let item = service.add_item(&draft)?;
            println!("created {}", item.id);
        }
        Command::Edit {
            id,
            name,
            category,
            url,
            due,
            read_later,
            notes,
        } => {
            let patch = ItemPatch {
                id,
                name,
                category,
                url: url.map(Some),
                due_date: parse_due(due.as_deref())?,
                read_later,
                notes: notes.map(Some),
            };
            let item = service.update_item(&patch)?;
            println!("updated {}", summary_line(&item));
        }
        Command::Delete { id } => {
            if !service.delete_item(&id)? {
                bail!("item not found: {id}");
            }
            println!("deleted {id}");
        }
    }
    Ok(())
}

fn parse_due(raw: Option<&str>) -> Result<Option<Timestamp>> {
    raw.map(|value| parse_iso(value).with_context(|| format!("invalid due date `{value}`")))
        .transpose()
}

fn summary_line(item: &Item) -> String {
    let marker = if item.read_later { "*" } else { " " };
    let category = if item.category.is_empty() {
        String::new()
    } else {
        format!(" [{}]", item.category)
    };
    format!(
        "{marker} {}  {}{category}  due {}",
        item.id,
        item.name,
        to_iso(&item.due_date)
    )
}
