use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use vidcast_catalog::CatalogClient;
use vidcast_core::{init_logging, AppDirs, Config, Request};
use vidcast_plugin::{render, HostReply, Router};

mod store;

use store::FileSettings;

#[derive(Debug, Parser)]
#[command(name = "vidcast", version, about = "Stateless media catalog browser")]
struct Cli {
    /// Query string the host replays, e.g. "mode=browse&category=VODMovies".
    /// Omitted means the top-level page.
    query: Option<String>,
    /// Catalog API base URL (takes precedence over config)
    #[arg(long)]
    base_url: Option<String>,
    /// Token endpoint URL (takes precedence over config)
    #[arg(long)]
    token_url: Option<String>,
    /// Entrypoint self-links are bound to (takes precedence over config)
    #[arg(long)]
    entry: Option<String>,
    /// Keep config, settings and logs under this directory instead of the
    /// platform defaults
    #[arg(long)]
    profile_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let dirs = match &cli.profile_dir {
        Some(root) => AppDirs::from_root(root),
        None => AppDirs::discover()?,
    };
    let config = Config::load_or_default(&dirs)?;
    let _logging = init_logging(&config.logging, &dirs)?;

    let base_url = cli.base_url.as_deref().unwrap_or(&config.catalog.base_url);
    let token_url = cli.token_url.as_deref().unwrap_or(&config.catalog.token_url);
    let entry = cli.entry.as_deref().unwrap_or(&config.plugin.entry);

    let request = Request::decode(cli.query.as_deref().unwrap_or(""));
    tracing::info!("handling request: {:?}", request.mode);

    let catalog = CatalogClient::new(base_url, token_url)?;
    let mut settings = FileSettings::open(dirs.data_dir())?;

    // One invocation, one request in flight; a current-thread runtime is
    // all the catalog client needs.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let mut router = Router::new(&catalog, &mut settings);
    match runtime.block_on(router.handle(&request)) {
        Ok(outcome) => {
            let reply = render(&outcome, entry);
            println!("{}", serde_json::to_string(&reply)?);
            Ok(())
        }
        Err(e) => {
            // One notification, no partial output.
            tracing::error!("{e}");
            let reply = HostReply::Error {
                message: e.to_string(),
            };
            println!("{}", serde_json::to_string(&reply)?);
            std::process::exit(1);
        }
    }
}
