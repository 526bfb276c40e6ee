use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::load_settings, services::Translator, CatalogTranslator, PatientService,
    RestPatientService,
};
use serde::Serialize;
use shared::filters::format_decimal_values;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    /// Overrides the configured OpenMRS server url.
    #[arg(long)]
    openmrs_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search patients by name or identifier.
    Search { query: String },
    /// Fetch one patient.
    Patient { uuid: String },
    /// List the identifiers of a patient.
    Identifiers { uuid: String },
    /// List the patient identifier types.
    IdentifierTypes,
    /// Look up a message key in the configured translation catalog.
    Translate { key: String },
    /// Apply the decimal display filter to a value.
    FormatDecimal { value: String },
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn patient_client(openmrs_url: Option<String>) -> Result<RestPatientService> {
    let mut settings = load_settings();
    if let Some(url) = openmrs_url {
        settings.openmrs_url = url;
    }
    info!(openmrs_url = %settings.openmrs_url, "using OpenMRS server");
    RestPatientService::from_settings(&settings).context("failed to build REST client")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let openmrs_url = args.openmrs_url;
    let client = || patient_client(openmrs_url.clone());

    match args.command {
        Command::Search { query } => print_json(&client()?.search(&query).await?)?,
        Command::Patient { uuid } => print_json(&client()?.get_patient(&uuid).await?)?,
        Command::Identifiers { uuid } => {
            print_json(&client()?.patient_identifiers(&uuid).await?)?
        }
        Command::IdentifierTypes => print_json(&client()?.identifier_types().await?)?,
        Command::Translate { key } => {
            let translator = match load_settings().translations_path {
                Some(path) => CatalogTranslator::load(&path)?,
                None => CatalogTranslator::default(),
            };
            println!("{}", translator.translate(&key))
        }
        Command::FormatDecimal { value } => {
            println!("{}", format_decimal_values(Some(&value)).unwrap_or_default())
        }
    }

    Ok(())
}
