use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use launchdeck_core::{Collection, Launch, LaunchPad, QueryDescriptor};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::AppContext;
use commands::browse::ListArgs;

#[derive(Parser)]
#[command(name = "launchdeck")]
#[command(about = "Browse SpaceX launches and launch pads from the terminal", long_about = None)]
struct Cli {
    /// Query API base URL (overrides the config file and SPACEX_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Path to an alternative config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List past launches, newest first
    Launches(ListArgs),
    /// List launch pads by full name
    LaunchPads(ListArgs),
    /// Show one launch or launch pad
    Show {
        #[command(subcommand)]
        target: ShowTarget,
    },
    /// Manage favorites
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
}

#[derive(Subcommand)]
enum ShowTarget {
    /// Show a launch with its rocket and launch pad
    Launch { id: String },
    /// Show a launch pad with its most recent launches
    LaunchPad { id: String },
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// List favorite ids of a collection
    List { collection: Collection },
    /// Add an id to the favorites of a collection
    Add { collection: Collection, id: String },
    /// Remove an id from the favorites of a collection
    Remove { collection: Collection, id: String },
    /// Remove every favorite of a collection
    Clear { collection: Collection },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("launchdeck=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let ctx = AppContext::load(cli.config, cli.api_url)?;
    let page_size = ctx.config.pagination.page_size;

    match cli.command {
        Commands::Launches(args) => {
            commands::browse::list::<Launch>(&ctx, QueryDescriptor::past_launches(page_size), &args)
                .await?
        }
        Commands::LaunchPads(args) => {
            commands::browse::list::<LaunchPad>(&ctx, QueryDescriptor::launch_pads(page_size), &args)
                .await?
        }
        Commands::Show { target } => match target {
            ShowTarget::Launch { id } => commands::show::launch(&ctx, &id).await?,
            ShowTarget::LaunchPad { id } => commands::show::launch_pad(&ctx, &id).await?,
        },
        Commands::Favorites { action } => match action {
            FavoritesAction::List { collection } => commands::favorites::list(&ctx, collection)?,
            FavoritesAction::Add { collection, id } => {
                commands::favorites::add(&ctx, collection, &id)?
            }
            FavoritesAction::Remove { collection, id } => {
                commands::favorites::remove(&ctx, collection, &id)?
            }
            FavoritesAction::Clear { collection } => commands::favorites::clear(&ctx, collection)?,
        },
    }

    Ok(())
}
