use anyhow::{Context, Result};
use clap::Parser;
use plant_identifier::models::Config;
use plant_identifier::{FailureKind, IdentificationOrchestrator, PlantIdentification};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "plant-identifier")]
#[command(about = "Identify a plant from a photo")]
struct CliArgs {
    /// Photo to identify (JPEG, PNG or WebP).
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    /// Place name the photo was taken at, used to tell similar species apart.
    #[arg(long, value_name = "NAME")]
    location: Option<String>,

    /// Print the identification as JSON.
    #[arg(long)]
    json: bool,
}

fn render(plant: &PlantIdentification, location: Option<&str>, json: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(plant).context("Failed to serialize identification");
    }
    Ok(format!(
        "{}\n\n{}",
        plant.to_response_text(),
        plant.share_summary(location)
    ))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plant_identifier=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let config = Config::from_env()?;
    let orchestrator = IdentificationOrchestrator::from_config(&config)?;

    let image = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("Failed to read {}", args.image.display()))?;
    info!("Identifying {} ({} bytes)", args.image.display(), image.len());

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let location = args.location.as_deref();
    match orchestrator
        .start()
        .identify(&image, location, &cancel)
        .await
    {
        Ok(plant) => {
            println!("{}", render(&plant, location, args.json)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            error!("{}", failure);
            eprintln!("{}", failure.user_message());
            Ok(match failure.kind() {
                FailureKind::NotIdentifiable => ExitCode::from(2),
                FailureKind::Technical => ExitCode::FAILURE,
                FailureKind::Cancelled => ExitCode::from(130),
            })
        }
    }
}
