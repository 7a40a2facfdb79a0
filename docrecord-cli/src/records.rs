//! Record commands: get-all, get, create, update, delete

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use docrecord_core::{Record, RecordId, RecordProvider};
use serde_json::Value;
use tracing::info;

#[derive(Parser, Debug)]
pub struct GetAllArgs {
    /// Collection name
    pub collection: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON array
    Json,
    /// One compact JSON record per line
    Ndjson,
}

#[derive(Parser, Debug)]
pub struct GetArgs {
    /// Collection name
    pub collection: String,
    /// Record id (numbers are treated as numeric ids)
    pub id: String,
}

#[derive(Parser, Debug)]
pub struct CreateArgs {
    /// Collection name
    pub collection: String,
    /// Record as a JSON object; a missing `_id` is generated
    pub record: String,
}

#[derive(Parser, Debug)]
pub struct UpdateArgs {
    /// Collection name
    pub collection: String,
    /// Record id (numbers are treated as numeric ids)
    pub id: String,
    /// Fields to set, as a JSON object
    pub patch: String,

    /// Create the record if it does not exist
    #[arg(long)]
    pub upsert: bool,
}

#[derive(Parser, Debug)]
pub struct DeleteArgs {
    /// Collection name
    pub collection: String,
    /// Record id (numbers are treated as numeric ids)
    pub id: String,
}

/// Interpret a command-line id: JSON numbers stay numeric, anything else is
/// a string id.
pub fn parse_id(raw: &str) -> RecordId {
    match serde_json::from_str::<Value>(raw) {
        Ok(number @ Value::Number(_)) => RecordId::from(number),
        _ => RecordId::from(raw),
    }
}

/// Parse a JSON object argument into a record.
pub fn parse_record(raw: &str) -> Result<Record> {
    let value: Value = serde_json::from_str(raw).context("Record must be valid JSON")?;
    Record::try_from(value).context("Record must be a JSON object")
}

fn print_record(record: &Record) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(record)?);
    Ok(())
}

pub async fn run_get_all(provider: &RecordProvider, args: GetAllArgs) -> Result<()> {
    let records = provider.get_all(&args.collection).await?;
    info!(collection = %args.collection, count = records.len(), "Fetched records");

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Ndjson => {
            for record in &records {
                println!("{}", serde_json::to_string(record)?);
            }
        }
    }
    Ok(())
}

pub async fn run_get(provider: &RecordProvider, args: GetArgs) -> Result<()> {
    let record = provider.get(&args.collection, parse_id(&args.id)).await?;
    print_record(&record)
}

pub async fn run_create(provider: &RecordProvider, args: CreateArgs) -> Result<()> {
    let record = parse_record(&args.record)?;
    let created = provider.create(&args.collection, record).await?;
    print_record(&created)
}

pub async fn run_update(provider: &RecordProvider, args: UpdateArgs) -> Result<()> {
    let patch = parse_record(&args.patch)?;
    let updated = provider
        .update(&args.collection, parse_id(&args.id), patch, args.upsert)
        .await?;
    print_record(&updated)
}

pub async fn run_delete(provider: &RecordProvider, args: DeleteArgs) -> Result<()> {
    let removed = provider.delete(&args.collection, parse_id(&args.id)).await?;
    println!("{}", removed);
    Ok(())
}
