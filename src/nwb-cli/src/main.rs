mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::*;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nwb_cli=info,nwb_loot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Tables { id, format, data } => {
            commands::loot::tables(id.as_deref(), format, data.data)?;
        }

        Commands::Buckets {
            bucket,
            format,
            data,
        } => {
            commands::loot::buckets(bucket.as_deref(), format, data.data)?;
        }

        Commands::Limits { format, data } => {
            commands::loot::limits(format, data.data)?;
        }

        Commands::Graph {
            tables,
            context,
            format,
            data,
        } => {
            commands::loot::graph(&tables, context, format, data.data)?;
        }

        Commands::Sources { item, data } => {
            commands::loot::sources(&item, data.data)?;
        }

        Commands::Configure { data_dir, show } => {
            commands::configure::handle(data_dir, show)?;
        }
    }

    Ok(())
}
