//! Serve command - launches the Shelfmark web server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Args;

use shelfmark_server::{Server, ServerConfig};
use shelfmark_store::{FsArchiveStore, MemoryStorage};
use shelfmark_types::{Account, Bookmark};

use super::Context;
use crate::config::{self, FileConfig};

/// Arguments for the serve command.
///
/// CLI arguments override config file values.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Port used by the server (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address the server listens on (overrides config)
    #[arg(short, long)]
    pub address: Option<String>,

    /// Root path the server is mounted under, for reverse-proxy prefixes
    #[arg(short = 'r', long)]
    pub webroot: Option<String>,

    /// Data directory holding archives, seed files, and shelfmark.toml
    #[arg(long, env = "SHELFMARK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory of static assets served without authentication
    #[arg(long)]
    pub assets_dir: Option<PathBuf>,

    /// Path to config file (overrides default discovery)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Session and account cache TTL in seconds (overrides config)
    #[arg(long)]
    pub session_ttl: Option<u64>,

    /// Archive content cache TTL in seconds (overrides config)
    #[arg(long)]
    pub archive_ttl: Option<u64>,
}

/// Run the serve command.
pub async fn run(args: ServeArgs, ctx: &Context) -> Result<()> {
    // ── Data directory ──────────────────────────────────────────────────

    let data_dir = args
        .data_dir
        .clone()
        .or_else(|| dirs::data_local_dir().map(|d| d.join("shelfmark")))
        .unwrap_or_else(|| PathBuf::from("data"));

    if ctx.verbose {
        println!("Data directory: {}", data_dir.display());
    }

    // ── Config file ─────────────────────────────────────────────────────

    let file = if let Some(ref path) = args.config {
        config::load(path)?
    } else {
        let default_path = data_dir.join("shelfmark.toml");
        if default_path.exists() {
            if ctx.verbose {
                println!("Loaded config: {}", default_path.display());
            }
            config::load(&default_path)?
        } else {
            FileConfig::default()
        }
    };

    // ── Server settings (CLI over config over defaults) ─────────────────

    let port = args.port.or(file.server.port).unwrap_or(8080);
    let address = args
        .address
        .clone()
        .or(file.server.address.clone())
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr: SocketAddr = format!("{}:{}", address, port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", address, port))?;

    let webroot = args
        .webroot
        .clone()
        .or(file.server.webroot.clone())
        .unwrap_or_else(|| "/".to_string());

    let assets_dir = args
        .assets_dir
        .clone()
        .or(file.server.assets_dir.clone())
        .or_else(|| {
            let default = data_dir.join("assets");
            default.is_dir().then_some(default)
        });

    let mut server_config = ServerConfig::new()
        .with_bind_address(addr)
        .with_root_path(&webroot);

    if let Some(ref dir) = assets_dir {
        server_config = server_config.with_assets_dir(dir);
    }
    if let Some(secs) = args.session_ttl.or(file.cache.session_ttl_secs) {
        server_config = server_config.with_session_ttl(Duration::from_secs(secs));
    }
    if let Some(secs) = file.cache.session_sweep_secs {
        server_config = server_config.with_session_sweep_interval(Duration::from_secs(secs));
    }
    if let Some(secs) = args.archive_ttl.or(file.cache.archive_ttl_secs) {
        server_config = server_config.with_archive_ttl(Duration::from_secs(secs));
    }
    if let Some(secs) = file.cache.archive_sweep_secs {
        server_config = server_config.with_archive_sweep_interval(Duration::from_secs(secs));
    }
    if let Some(secs) = file.cache.grant_ttl_secs {
        server_config = server_config.with_grant_ttl(Duration::from_secs(secs));
    }

    if ctx.verbose {
        println!("Bind address: {}", addr);
        println!("Root path: {}", server_config.root_path);
        match &assets_dir {
            Some(dir) => println!("Static assets: {}", dir.display()),
            None => println!("Static assets: disabled"),
        }
    }

    // ── Collaborators ───────────────────────────────────────────────────

    let storage = seed_storage(&data_dir, ctx).await?;
    let archive = Arc::new(FsArchiveStore::new(&data_dir));

    // ── Start server ────────────────────────────────────────────────────

    let server = Server::new(server_config, storage, archive);

    println!(
        "Shelfmark serving on http://{}{}",
        addr,
        display_root(&server.state().config.root_path)
    );
    println!("Press Ctrl+C to stop");

    server.run().await?;
    Ok(())
}

/// Load seed data into the in-memory storage collaborator.
///
/// `accounts.json` and `bookmarks.json` in the data directory stand in
/// for the persistent database this subsystem treats as external.
async fn seed_storage(data_dir: &std::path::Path, ctx: &Context) -> Result<Arc<MemoryStorage>> {
    let storage = MemoryStorage::new();

    let accounts_path = data_dir.join("accounts.json");
    if accounts_path.exists() {
        let raw = std::fs::read_to_string(&accounts_path)
            .with_context(|| format!("cannot read {}", accounts_path.display()))?;
        let accounts: Vec<Account> = serde_json::from_str(&raw)
            .with_context(|| format!("cannot parse {}", accounts_path.display()))?;
        let count = accounts.len();
        for account in accounts {
            storage.insert_account(account).await;
        }
        if ctx.verbose {
            println!("Accounts: {} loaded", count);
        }
    } else {
        eprintln!(
            "warning: {} not found; login will reject everyone",
            accounts_path.display()
        );
    }

    let bookmarks_path = data_dir.join("bookmarks.json");
    if bookmarks_path.exists() {
        let raw = std::fs::read_to_string(&bookmarks_path)
            .with_context(|| format!("cannot read {}", bookmarks_path.display()))?;
        let bookmarks: Vec<Bookmark> = serde_json::from_str(&raw)
            .with_context(|| format!("cannot parse {}", bookmarks_path.display()))?;
        let count = bookmarks.len();
        for bookmark in bookmarks {
            storage.insert_bookmark(bookmark).await;
        }
        if ctx.verbose {
            println!("Bookmarks: {} loaded", count);
        }
    }

    Ok(Arc::new(storage))
}

fn display_root(webroot: &str) -> &str {
    if webroot == "/" { "" } else { webroot }
}
