//! Commands over the collected data: `status`, `export`, `show`, `clear`, `config`.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use harvest_checkpoint::{
    FileKeyValueStore, RecordStats, ResumeStore, filter_records, render_table, to_csv, to_json,
};
use harvest_config::{Config, ConfigLoader, ConfigValidator};
use harvest_protocols::SellerRecord;

use crate::cli::ExportFormat;

pub(crate) async fn open_store(config: &Config) -> Result<ResumeStore, Box<dyn std::error::Error>> {
    let backend = FileKeyValueStore::new(&config.store.path).await?;
    Ok(ResumeStore::new(Arc::new(backend)))
}

pub(crate) async fn status(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = open_store(config).await?.snapshot().await;
    let stats = RecordStats::from_records(&snapshot.seller_data);

    println!("Store:         {}", config.store.path.display());
    println!(
        "Category:      {}",
        snapshot.category_name.as_deref().unwrap_or("-")
    );
    if !snapshot.breadcrumb_steps.is_empty() {
        let trail: Vec<&str> = snapshot
            .breadcrumb_steps
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        println!("Breadcrumbs:   {}", trail.join(" > "));
    }
    match snapshot.total_sellers {
        Some(total) => println!(
            "Cursor:        {} / {} ({} remaining)",
            snapshot.current_seller_index,
            total,
            snapshot.remaining().unwrap_or(0)
        ),
        None => println!("Cursor:        {}", snapshot.current_seller_index),
    }
    println!("Records:       {}", stats.total);
    println!("With email:    {}", stats.with_email);

    Ok(())
}

fn render(records: &[SellerRecord], format: ExportFormat) -> Result<String, serde_json::Error> {
    match format {
        ExportFormat::Json => to_json(records),
        ExportFormat::Csv => Ok(to_csv(records)),
    }
}

pub(crate) async fn export(
    config: &Config,
    format: ExportFormat,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let records = open_store(config).await?.records().await;
    if records.is_empty() {
        println!("No records to export.");
        return Ok(());
    }

    let content = render(&records, format)?;
    match output {
        Some(path) => {
            tokio::fs::write(path, content).await?;
            info!(records = records.len(), "Exported {} to {}", format.extension(), path.display());
            println!("Wrote {} records to {}", records.len(), path.display());
        }
        None => println!("{}", content),
    }

    Ok(())
}

pub(crate) async fn show(config: &Config, search: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let records = open_store(config).await?.records().await;
    let matching = filter_records(&records, search.unwrap_or(""));
    if matching.is_empty() {
        println!("No records found.");
        return Ok(());
    }

    let stats = RecordStats::from_records(&records);
    print!("{}", render_table(&matching));
    println!("{}", "-".repeat(80));
    println!(
        "{} shown, {} total, {} with email",
        matching.len(),
        stats.total,
        stats.with_email
    );
    Ok(())
}

pub(crate) async fn clear(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config).await?;
    let count = store.records().await.len();
    store.clear().await?;
    info!(records = count, "Cleared collected data");
    println!("Cleared {} records and the resume cursor.", count);
    Ok(())
}

pub(crate) fn show_config(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    print!("{}", ConfigLoader::to_toml(config)?);

    let validation = ConfigValidator::validate(config)?;
    for error in &validation.errors {
        println!("# error   {}", error);
    }
    for warning in &validation.warnings {
        println!("# warning {}", warning);
    }
    Ok(())
}
