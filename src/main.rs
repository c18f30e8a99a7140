//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `web_quality_audit` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Printing results as JSON on stdout
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use web_quality_audit::config::{Cli, Command};
use web_quality_audit::initialization::init_logger_with;
use web_quality_audit::{
    normalize_batch_urls, validate_and_normalize_url, AuditFailure, Auditor, AuditorOptions,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger_with(cli.log_level.clone().into(), cli.log_format.clone())
        .context("Failed to initialize logger")?;

    match cli.command {
        Command::Audit { url, audit } => {
            let Some(url) = validate_and_normalize_url(&url) else {
                eprintln!("web_quality_audit error: invalid URL '{}'", url);
                process::exit(1);
            };
            let config = audit.to_config(url);
            let auditor = Auditor::new(AuditorOptions {
                max_concurrency: 1,
                user_agent: config.user_agent.clone(),
                timeout: config.timeout,
            })
            .context("Failed to initialize auditor")?;

            let outcome = auditor.run_audit(config).await;
            auditor.stats().log_summary();
            match outcome {
                Ok(result) => {
                    let json = serde_json::to_string_pretty(&result)
                        .context("Failed to serialize audit result")?;
                    println!("{json}");
                    Ok(())
                }
                Err(e) => {
                    let failure = AuditFailure::from(&e);
                    let json = serde_json::to_string_pretty(&failure)
                        .context("Failed to serialize audit failure")?;
                    println!("{json}");
                    eprintln!("web_quality_audit error: {}", e);
                    process::exit(1);
                }
            }
        }
        Command::Batch {
            urls,
            concurrency,
            audit,
        } => {
            // Unusable URLs stay in the request and come back as failed entries
            let urls = normalize_batch_urls(&urls);

            let template = audit.to_config(String::new());
            let auditor = Auditor::new(AuditorOptions {
                max_concurrency: concurrency,
                user_agent: template.user_agent.clone(),
                timeout: template.timeout,
            })
            .context("Failed to initialize auditor")?;

            let batch = auditor.run_batch(&urls, &template).await;
            auditor.stats().log_summary();
            let json =
                serde_json::to_string_pretty(&batch).context("Failed to serialize batch result")?;
            println!("{json}");
            Ok(())
        }
    }
}
