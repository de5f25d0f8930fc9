use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inischema::cli::{Output, OutputFormat};
use inischema::{FieldKind, ParserOptions};

/// Parse field kind from string
fn parse_kind(s: &str) -> Result<FieldKind, String> {
    s.parse()
}

/// Parse output format from string
fn parse_format(s: &str) -> Result<OutputFormat, String> {
    s.parse()
}

#[derive(Parser)]
#[command(name = "inischema")]
#[command(version, about = "Typed schemas over INI configuration files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true, help = "Parser options file (TOML)")]
    options: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump a configuration file as parsed
    Show {
        file: PathBuf,
        #[arg(long, short, default_value = "text", value_parser = parse_format)]
        format: OutputFormat,
    },

    /// Print one option coerced to a kind
    Get {
        file: PathBuf,
        section: String,
        option: String,
        #[arg(long, short, default_value = "raw", value_parser = parse_kind)]
        kind: FieldKind,
    },

    /// Bind a schema declaration against a configuration file
    Check {
        file: PathBuf,
        #[arg(long, short, help = "Schema declaration (TOML)")]
        schema: PathBuf,
        #[arg(long, short, default_value = "text", value_parser = parse_format)]
        format: OutputFormat,
    },

    /// Show effective parser options
    Options {
        #[arg(long, short, default_value = "text", value_parser = parse_format)]
        format: OutputFormat,
    },
}

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            Output::new().error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let options = ParserOptions::load(cli.options.as_deref())?;

    match cli.command {
        Commands::Show { file, format } => {
            inischema::cli::commands::show::run(&file, options, format)?;
        }
        Commands::Get {
            file,
            section,
            option,
            kind,
        } => {
            inischema::cli::commands::get::run(&file, &section, &option, kind, options)?;
        }
        Commands::Check {
            file,
            schema,
            format,
        } => {
            inischema::cli::commands::check::run(&file, &schema, options, format)?;
        }
        Commands::Options { format } => {
            inischema::cli::commands::options::run(cli.options.as_deref(), &options, format)?;
        }
    }

    Ok(())
}
