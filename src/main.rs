mod builder;
mod config;
mod error;
mod geocode;
mod logo;
mod parser;
mod record;
mod store;
#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};

use chrono::NaiveDate;

use crate::builder::{Built, RecordBuilder};
use crate::config::Settings;
use crate::geocode::{Geocoder, NominatimGeocoder};
use crate::logo::{HttpLogoConverter, LogoConverter};
use crate::parser::{Field, Submission};
use crate::store::JsonStore;

#[derive(Parser)]
#[command(
    name = "community_intake",
    about = "Add community submissions from issue forms to communities.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an issue body, geocode it, convert the logo and append the record
    Process(BodyArgs),
    /// Parse and validate an issue body against the store without writing anything
    Check(BodyArgs),
    /// Communities overview table
    Overview {
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
}

#[derive(Args)]
struct BodyArgs {
    /// Issue body text
    #[arg(env = "ISSUE_BODY", hide_env_values = true)]
    body: Option<String>,
    /// Read the issue body from a file (takes precedence over BODY)
    #[arg(long)]
    body_file: Option<PathBuf>,
}

impl BodyArgs {
    fn read(self) -> anyhow::Result<String> {
        match (self.body_file, self.body) {
            (Some(path), _) => std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read issue body from {}", path.display())),
            (None, Some(body)) => Ok(body),
            (None, None) => bail!("No issue body: pass BODY, --body-file or set ISSUE_BODY"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load().context("Failed to load settings")?;
    let store = JsonStore::new(&settings.store_path);

    let result = match cli.command {
        Commands::Process(args) => {
            let client = settings
                .http_client()
                .context("Failed to build HTTP client")?;
            let builder = RecordBuilder::new(
                NominatimGeocoder::new(client.clone(), settings.geocode_url.as_str()),
                HttpLogoConverter::new(client, &settings.images_dir),
            );
            let today = chrono::Local::now().date_naive();
            let built = process(&store, &builder, || args.read(), today).await?;

            if let Some(warning) = &built.logo_warning {
                eprintln!("Warning: logo not stored ({})", warning);
            }
            println!("Added community #{}: {}", built.record.id, built.record.name);
            Ok(())
        }
        Commands::Check(args) => {
            let records = store.load()?;
            let submission = Submission::from_body(&args.read()?);

            for field in Field::ALL {
                let value = submission.value(field);
                let shown = if value.is_empty() {
                    "-".to_string()
                } else {
                    truncate(&value.replace('\n', " / "), 60)
                };
                println!("{:<14} {}", field.key(), shown);
            }

            let id = builder::check(&submission, &records)?;
            println!("\nOK: would be added as #{} ({} existing)", id, records.len());
            Ok(())
        }
        Commands::Overview { limit } => {
            let records = store.load()?;
            if records.is_empty() {
                println!("No communities in {}.", store.path().display());
                return Ok(());
            }

            println!(
                "{:>4} | {:<28} | {:<10} | {:<20} | {:<6} | {:<4}",
                "#", "Community", "Status", "Location", "Coords", "Logo"
            );
            println!("{}", "-".repeat(88));

            for r in records.iter().take(limit) {
                println!(
                    "{:>4} | {:<28} | {:<10} | {:<20} | {:<6} | {:<4}",
                    r.id,
                    truncate(&r.name, 28),
                    truncate(&r.status, 10),
                    truncate(&r.location, 20),
                    if r.lat_lon.is_known() { "yes" } else { "-" },
                    if r.thumbnail_url.is_empty() { "-" } else { "yes" },
                );
            }

            println!(
                "\n{} of {} communities | next id: {}",
                records.len().min(limit),
                records.len(),
                builder::next_id(&records).unwrap_or_else(|_| "-".into())
            );
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}

/// Load the store, build a record from the body and append it. The store is
/// loaded before the body is read so a broken store is reported first. Nothing
/// is written unless the record was built; a failed save removes its logo.
async fn process<G: Geocoder, L: LogoConverter>(
    store: &JsonStore,
    builder: &RecordBuilder<G, L>,
    read_body: impl FnOnce() -> anyhow::Result<String>,
    today: NaiveDate,
) -> anyhow::Result<Built> {
    let mut records = store.load()?;
    let body = read_body()?;

    let built = builder.build(&body, &records, today).await?;
    records.push(built.record.clone());
    if let Err(e) = store.save(&records) {
        builder.discard_logo(&built.record);
        return Err(e.into());
    }
    Ok(built)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

// ── Tests ──
