//! tailor CLI - static site generator with a configurable build pipeline.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

use commands::theme::ThemeFormat;

#[derive(Parser)]
#[command(name = "tailor")]
#[command(about = "Static site generator with a configurable build pipeline")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root containing tailor.toml and the input directory
    #[arg(short, long, global = true, default_value = ".")]
    root: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the site into the output directory
    Build {
        /// Minify HTML output
        #[arg(long)]
        production: bool,
    },

    /// Build, watch and serve the site with live reload
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,

        /// Minify HTML output
        #[arg(long)]
        production: bool,
    },

    /// Print the theme description
    Theme {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = ThemeFormat::Json)]
        format: ThemeFormat,

        /// Minify CSS output
        #[arg(long)]
        minify: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Build { production } => {
            commands::build::run(cli.root, production).await?;
        }
        Commands::Serve {
            port,
            host,
            no_open,
            production,
        } => {
            let overrides = commands::serve::Overrides {
                port,
                host,
                open: if no_open { Some(false) } else { None },
                production,
            };
            commands::serve::run(cli.root, overrides).await?;
        }
        Commands::Theme {
            format,
            minify,
            output,
        } => {
            commands::theme::run(format, minify, output)?;
        }
    }

    Ok(())
}
