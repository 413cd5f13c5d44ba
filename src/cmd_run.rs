//! `run` command: drive the engine against the live listing tab.

use std::sync::Arc;

use tracing::{info, warn};

use harvest_browser::{BrowserManager, BrowserManagerConfig, CdpUiProbe};
use harvest_config::{Config, ConfigValidator};
use harvest_engine::{EngineController, EngineOptions, RunOutcome, SellerEngine};

use crate::cmd_data::open_store;

pub(crate) async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let validation = ConfigValidator::ensure_valid(&config)?;
    for warning in &validation.warnings {
        warn!("Config {}", warning);
    }

    let store = open_store(&config).await?;

    let manager = BrowserManager::new(BrowserManagerConfig::from(&config.browser));
    let client = manager.connect().await?;
    let page = manager.attach_listing_page().await?;
    info!("Attached to listing tab {}", page.target_id());

    let probe = Arc::new(CdpUiProbe::new(client, page, config.selectors.clone()));
    let engine = Arc::new(SellerEngine::new(
        probe,
        store,
        EngineOptions::from_config(&config),
    ));
    let controller = Arc::new(EngineController::new(engine));

    controller.start();

    let stopper = {
        let controller = controller.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Interrupt received, stopping after the current seller");
                    controller.stop();
                }
                Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
            }
        })
    };

    let result = controller.wait().await;
    stopper.abort();
    manager.close().await?;

    match result {
        Some(Ok(outcome)) => {
            print_outcome(&outcome);
            Ok(())
        }
        Some(Err(e)) => Err(e.into()),
        None => Ok(()),
    }
}

fn print_outcome(outcome: &RunOutcome) {
    let summary = outcome.summary();
    match outcome {
        RunOutcome::Completed { .. } => println!("Run completed"),
        RunOutcome::Aborted { cursor, .. } => {
            println!("Run stopped; next run resumes at seller {}", cursor + 1)
        }
    }
    println!("{}", "=".repeat(40));
    println!("Sellers:            {}", summary.total_sellers);
    println!("Resumed from:       {}", summary.start_cursor);
    println!("Processed:          {}", summary.processed);
    println!("With email:         {}", summary.found);
    println!("Without email:      {}", summary.not_found);
    if summary.recovery_failures > 0 {
        println!("Recovery failures:  {}", summary.recovery_failures);
    }
    if summary.panel_failures > 0 {
        println!("Panel failures:     {}", summary.panel_failures);
    }
}
