use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use clausula_core::numerals::{currency_in_words, format_currency, number_to_words};
use clausula_core::{RenderOptions, Template, derive_timeline};
use tracing::{info, warn};

mod config;
mod display;
mod source;

use config::{Config, OutputFormat};
use source::Source;

#[derive(Parser)]
#[command(name = "clausula", version, about = "Contract document previews and progress timelines")]
struct Cli {
    /// Extra TOML configuration file, layered over clausula.toml.
    #[arg(long, global = true, env = "CLAUSULA_CONFIG")]
    config: Option<PathBuf>,

    /// Log debug events.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct ContractArgs {
    /// Contract record as JSON ("-" reads stdin).
    #[arg(long)]
    file: Option<PathBuf>,

    /// Contract identifier to fetch from the API.
    #[arg(long)]
    id: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Render the contract document.
    Preview {
        #[command(flatten)]
        contract: ContractArgs,

        /// Template file with {{placeholder}} fields (default: built-in service contract).
        #[arg(long)]
        template: Option<PathBuf>,

        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Text written in place of missing fields.
        #[arg(long)]
        marker: Option<String>,

        /// Write to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show progress along the contract term.
    Timeline {
        #[command(flatten)]
        contract: ContractArgs,

        /// Additions as a JSON array (default: fetched with --id, none with --file).
        #[arg(long)]
        additions: Option<PathBuf>,

        /// Reference date, YYYY-MM-DD (default: today).
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Print the derived timeline as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Spell out an amount in pesos.
    Words { amount: u64 },
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("clausula error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;
    info!("clausula v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Command::Preview {
            contract,
            template,
            format,
            marker,
            output,
        } => {
            let source = Source::new(contract.file, contract.id)?;
            let record = source.contract(&config.api).await?;

            let custom;
            let template = match template {
                Some(path) => {
                    let text = std::fs::read_to_string(&path)
                        .with_context(|| format!("reading template {}", path.display()))?;
                    custom = Template::parse(&text);
                    custom
                        .validate()
                        .with_context(|| format!("invalid template {}", path.display()))?;
                    &custom
                }
                None => Template::builtin(),
            };

            let options = RenderOptions {
                marker: marker.unwrap_or(config.render.marker),
            };
            let document = template.render(&record, &options);
            for field in document.missing_fields() {
                warn!(field = field.name(), "contract field missing, marker rendered");
            }

            let rendered = match format.unwrap_or(config.render.format) {
                OutputFormat::Plain => document.to_plain(),
                OutputFormat::Html => document.to_html(),
            };
            match output {
                Some(path) => std::fs::write(&path, rendered)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => println!("{rendered}"),
            }
        }
        Command::Timeline {
            contract,
            additions,
            as_of,
            json,
        } => {
            let source = Source::new(contract.file, contract.id)?;
            let record = source.contract(&config.api).await?;
            let additions = source.additions(&config.api, additions.as_deref()).await?;
            let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());

            let timeline = derive_timeline(&record, &additions, as_of);
            if json {
                println!("{}", serde_json::to_string_pretty(&timeline)?);
            } else {
                display::print_timeline_card(&record, &timeline);
            }
        }
        Command::Words { amount } => {
            println!("{}", format_currency(Some(amount)));
            println!("{}", number_to_words(amount));
            println!("{}", currency_in_words(amount));
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("CLAUSULA_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
