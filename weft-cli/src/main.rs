use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "weft", version, about = "Weft template CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template from a bundle to HTML.
    Render {
        /// Path to the template bundle
        bundle: PathBuf,
        /// Name of the template to render
        #[arg(long, short)]
        template: String,
        /// JSON object with initial context values
        #[arg(long)]
        data: Option<PathBuf>,
        /// Write `key=value` after mounting (repeatable)
        #[arg(long = "set", value_parser = weft_cli::parse_assignment)]
        assignments: Vec<(String, String)>,
    },
    /// Print the bind map of a template.
    Inspect {
        /// Path to the template bundle
        bundle: PathBuf,
        /// Name of the template to inspect
        #[arg(long, short)]
        template: String,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Render {
            bundle,
            template,
            data,
            assignments,
        } => {
            let html = weft_cli::render(&bundle, &template, data.as_deref(), &assignments)?;
            println!("{html}");
        }
        Commands::Inspect { bundle, template } => {
            print!("{}", weft_cli::inspect(&bundle, &template)?);
        }
    }
    Ok(())
}
