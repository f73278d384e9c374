mod bootstrap;
mod render;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use billing_core::models::InvoiceRecord;
use billing_core::settings::Settings;
use billing_core::time_utils::TimezoneHandler;
use billing_data::aggregator::{Aggregation, InvoiceAggregator};
use billing_data::filter::{filter_invoices, FilterCriteria};
use billing_data::report::ChartsReport;
use billing_runtime::data_manager::{DataManager, DEFAULT_CACHE_TTL_SECS};
use billing_runtime::downloads::{find_by_file_name, InvoiceFiles};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();
    settings.validate()?;

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Energy Dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Timezone: {}, Format: {}",
        settings.view,
        settings.timezone,
        settings.format
    );

    let clock = TimezoneHandler::new(&settings.timezone);
    let source = settings.source_path();
    let mut manager = DataManager::new(DEFAULT_CACHE_TTL_SECS, &source);

    let Some(invoices) = manager.get_data(false).await else {
        bail!(
            "could not load invoices from {}: {}",
            source.display(),
            manager.last_error().unwrap_or("unknown error")
        );
    };
    tracing::info!("Loaded {} invoice(s) from {}", invoices.len(), source.display());

    let criteria = FilterCriteria::new(settings.client.as_str(), &settings.period);
    let filtered = filter_invoices(&invoices, &criteria, clock.now());

    if let Some(file_name) = settings.download.as_deref() {
        return download(&settings, &filtered, file_name).await;
    }

    match settings.view.as_str() {
        "list" => {
            if settings.format == "json" {
                println!("{}", render::list_json(&filtered, &criteria)?);
            } else {
                print!("{}", render::render_list(&filtered, &criteria));
            }
        }

        "charts" => {
            // Charts follow the same criteria as the list.
            let aggregation = aggregate(&filtered, settings.skip_invalid)?;
            let report = ChartsReport::from(&aggregation);
            tracing::info!("{}", render::totals_summary(&report));

            if settings.format == "json" {
                println!("{}", render::charts_json(&report, &aggregation.points)?);
            } else {
                print!("{}", render::render_charts(&report, &aggregation.points));
            }
        }

        unknown => {
            eprintln!("Unknown view mode: {}", unknown);
        }
    }

    Ok(())
}

/// Aggregate strictly, or drop malformed records when `skip_invalid` is set.
fn aggregate(records: &[&InvoiceRecord], skip_invalid: bool) -> Result<Aggregation> {
    let records = records.iter().copied();
    if !skip_invalid {
        return InvoiceAggregator::aggregate(records)
            .context("invoice listing has malformed figures (use --skip-invalid to drop them)");
    }

    let (aggregation, rejected) = InvoiceAggregator::aggregate_skipping_invalid(records);
    if !rejected.is_empty() {
        eprintln!("Skipped {} invoice(s) with malformed figures:", rejected.len());
        for r in &rejected {
            eprintln!("  #{} {}: {}", r.index, r.date, r.error);
        }
    }
    Ok(aggregation)
}

/// Save the document for `file_name`, which must belong to the filtered listing.
async fn download(settings: &Settings, filtered: &[&InvoiceRecord], file_name: &str) -> Result<()> {
    if find_by_file_name(filtered.iter().copied(), file_name).is_none() {
        bail!("no listed invoice has file name {:?}", file_name);
    }

    let files = InvoiceFiles::new(settings.files_dir_path());
    let out_dir = settings
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let target = files.save_to(file_name, &out_dir).await?;
    println!("{}", target.display());

    Ok(())
}
