use clap::Parser;
use faq_harvest::output::{self, OutputWriter};
use faq_harvest::results::CrawlSummary;
use faq_harvest::{FaqItem, Harvest, HarvestError, utils};
use std::process::ExitCode;

mod args;
use args::Args;

/// Exit status after Ctrl-C, as shells report SIGINT
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command-line arguments
    let args = Args::parse();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let writer = OutputWriter::new(&config);
    if let Err(e) = writer.ensure_directories() {
        ::log::error!("Failed to create output directories: {}", e);
        return ExitCode::FAILURE;
    }
    let stamp = utils::file_timestamp();
    let harvest = Harvest::from_config(config);

    if let Some(path) = &args.reprocess {
        ::log::info!("Reprocessing saved capture: {}", path.display());
        let raw = match output::load_raw(path) {
            Ok(raw) => raw,
            Err(e) => {
                ::log::error!("Failed to load {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        };
        return match reconcile(&harvest, &writer, &raw, &stamp) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                ::log::error!("Reprocessing failed: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    ::log::info!("Starting harvest of {}", harvest.config().target_url);
    println!("Note: harvesting requires a WebDriver server (e.g., ChromeDriver).");
    println!(
        "Set WEBDRIVER_URL or --webdriver-url if not using {}",
        harvest.config().webdriver_url
    );

    let start_time = std::time::Instant::now();
    match harvest.run(shutdown_signal()).await {
        Ok(run) => {
            ::log::info!(
                "Crawl finished in {:.2} seconds",
                start_time.elapsed().as_secs_f64()
            );
            if let Err(e) = save_raw(&writer, &run.items, &stamp) {
                ::log::error!("Failed to save raw capture: {}", e);
                return ExitCode::FAILURE;
            }
            if let Err(e) = reconcile(&harvest, &writer, &run.items, &stamp) {
                ::log::error!("Failed to write results: {}", e);
                return ExitCode::FAILURE;
            }
            print_crawl_summary(&run.summary);
            ExitCode::SUCCESS
        }
        Err(HarvestError::Interrupted { partial }) => {
            ::log::warn!("Interrupted; keeping {} captured items", partial.len());
            if let Err(e) = save_raw(&writer, &partial, &stamp) {
                ::log::error!("Failed to save partial capture: {}", e);
            }
            ExitCode::from(EXIT_INTERRUPTED)
        }
        Err(e) => {
            ::log::error!("Harvest failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        ::log::warn!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

fn save_raw(writer: &OutputWriter, items: &[FaqItem], stamp: &str) -> Result<(), HarvestError> {
    let path = writer.save_raw(items, stamp)?;
    ::log::info!("Raw capture saved: {} ({} items)", path.display(), items.len());
    Ok(())
}

/// Reconcile a capture and write the processed JSON, CSV and report
fn reconcile(
    harvest: &Harvest,
    writer: &OutputWriter,
    raw: &[FaqItem],
    stamp: &str,
) -> Result<(), HarvestError> {
    let (items, stats) = harvest.process(raw)?;

    let json = writer.save_processed_json(&items, stamp)?;
    ::log::info!("JSON saved: {} ({} items)", json.display(), items.len());
    let csv = writer.save_csv(&items, stamp)?;
    ::log::info!("CSV saved: {} ({} items)", csv.display(), items.len());
    let report = writer.save_report(&stats, stamp)?;
    ::log::info!("Report saved: {}", report.display());

    println!();
    println!("Processed items:     {}", stats.total_items);
    println!("Categories:          {}", stats.total_categories);
    println!("Avg question length: {}", stats.avg_question_length);
    println!("Avg answer length:   {}", stats.avg_answer_length);
    println!("Items with links:    {}", stats.items_with_links);
    Ok(())
}

fn print_crawl_summary(summary: &CrawlSummary) {
    println!("Crawled at:          {}", summary.crawled_at);
    println!("Raw items:           {}", summary.total_faqs);
    println!("Categories crawled:  {}", summary.categories.join(", "));
}

