use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use uuid::Uuid;

use landscape_quotes::config::Settings;
use landscape_quotes::domain::RateCard;
use landscape_quotes::logging;
use landscape_quotes::services::{quote_from_json, QuoteOptions};
use landscape_quotes::QuoteError;

#[derive(Parser)]
#[command(
    about = env!("CARGO_PKG_DESCRIPTION"),
    version = env!("CARGO_PKG_VERSION")
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Price a list of design elements against a rate card
    Quote {
        #[arg(long, help = "Rate card JSON file.")]
        rate_card: PathBuf,

        #[arg(long, help = "JSON file holding an array of design elements.")]
        elements: PathBuf,

        #[arg(long, help = "Month (1-12) the work is scheduled for; applies seasonal pricing.")]
        month: Option<u32>,

        #[arg(long, help = "Applies the job complexity multiplier.")]
        complexity: bool,
    },
    /// Print the rate card a new organisation starts with
    DefaultRateCard {
        #[arg(long)]
        organisation_id: Option<Uuid>,
    },
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn quote(settings: &Settings, rate_card: &Path, elements: &Path, options: QuoteOptions) -> Result<String> {
    let quote = quote_from_json(
        &settings.calculator(),
        &read_file(rate_card)?,
        &read_file(elements)?,
        options,
    )?;

    tracing::info!(
        line_items = quote.line_items.len(),
        skipped = quote.skipped_elements.len(),
        total = %quote.total,
        "Quote generated"
    );

    serde_json::to_string_pretty(&quote).context("Failed to serialize quote")
}

fn run() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    logging::init_logging(&settings.env);

    let args = Args::parse();

    let output = match args.command {
        Command::Quote {
            rate_card,
            elements,
            month,
            complexity,
        } => {
            let options = QuoteOptions {
                seasonal_month: month,
                apply_complexity: complexity,
            };
            quote(&settings, &rate_card, &elements, options)?
        }
        Command::DefaultRateCard { organisation_id } => {
            let card = RateCard::with_default_rates(organisation_id.unwrap_or_else(Uuid::new_v4));
            serde_json::to_string_pretty(&card).context("Failed to serialize rate card")?
        }
    };

    println!("{}", output);
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Quote errors get the same JSON body the service layer reports
            match e.downcast_ref::<QuoteError>() {
                Some(err) => match serde_json::to_string_pretty(&err.to_response()) {
                    Ok(body) => eprintln!("{}", body),
                    Err(_) => eprintln!("Error: {}", err),
                },
                None => eprintln!("Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}
