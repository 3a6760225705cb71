use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use gather::config::Config;
use gather::feed::Feed;
use gather::storage::{Database, DatabaseError, Driver};

/// Get the config directory path (~/.config/gather/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("gather"))
}

#[derive(Parser, Debug)]
#[command(name = "gather", about = "Fetch and archive syndicated news feeds")]
struct Args {
    /// Database file (overrides config)
    #[arg(long, value_name = "FILE")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a new feed
    Add {
        /// Feed identifier ([A-Za-z0-9_-])
        name: String,
        /// Display name
        proper_name: String,
        /// Feed URL (http:// or https://)
        url: String,
    },
    /// List registered feeds
    List,
    /// Fetch a feed's document and show its entries and fingerprint
    Fetch {
        /// Feed identifier
        name: String,
    },
    /// Update a registered feed (not implemented yet)
    Update { name: String },
    /// Delete a registered feed (not implemented yet)
    Delete { name: String },
}

async fn find_feed(db: &Database, name: &str) -> Result<Feed> {
    let feeds = Feed::list(db).await?;
    feeds
        .into_iter()
        .find(|f| f.name() == name)
        .with_context(|| format!("no feed named '{}'", name))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
    }

    // Config directory is user-only: it holds the database file
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) =
            std::fs::set_permissions(&config_dir, std::fs::Permissions::from_mode(0o700))
        {
            tracing::warn!(
                path = %config_dir.display(),
                error = %e,
                "Failed to set config directory permissions to 0700"
            );
        }
    }

    let config = Config::load(&config_dir.join("config.toml"))?;
    // Fail on an unsupported driver tag before touching the filesystem
    let _driver: Driver = config.driver()?;

    let db_path = args
        .database
        .unwrap_or_else(|| config.database_path(&config_dir));
    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;

    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(e @ DatabaseError::InstanceLocked) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            return Err(anyhow::anyhow!("Failed to open database: {}", e));
        }
    };

    match args.command {
        Command::Add {
            name,
            proper_name,
            url,
        } => {
            let mut feed = Feed::new(&name, &proper_name, &url)?;
            feed.insert(&db).await?;
            println!("Added feed '{}' (id {})", feed.name(), feed.id());
        }
        Command::List => {
            let feeds = Feed::list(&db).await?;
            if feeds.is_empty() {
                println!("No feeds registered.");
            }
            for feed in feeds {
                println!(
                    "{:>4}  {:<20}  {:<24}  {}",
                    feed.id(),
                    feed.name(),
                    feed.proper_name(),
                    feed.url()
                );
            }
        }
        Command::Fetch { name } => {
            let mut feed = find_feed(&db, &name).await?;
            let client = reqwest::Client::new();
            let response = feed
                .refresh(&client)
                .await
                .with_context(|| format!("failed to refresh feed '{}'", name))?;

            let entry_count = serde_json::from_str::<Vec<serde_json::Value>>(feed.entries())
                .map(|entries| entries.len())
                .unwrap_or(0);
            println!("Fetched {} ({})", feed.proper_name(), feed.url());
            println!("  status:      {}", response.status);
            println!("  entries:     {}", entry_count);
            println!(
                "  fingerprint: {}:{}",
                response.hash_algorithm, response.content_hash
            );
        }
        Command::Update { name } => {
            let feed = find_feed(&db, &name).await?;
            feed.update(&db).await?;
        }
        Command::Delete { name } => {
            let feed = find_feed(&db, &name).await?;
            feed.delete(&db).await?;
        }
    }

    Ok(())
}
