use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use faq_harvest::{Harvest, HarvestConfig, LogObserver};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to harvest configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Override the delay between categories in milliseconds
    #[arg(short, long)]
    delay_ms: Option<u64>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logger
    env_logger::init();

    let args = Args::parse();

    let mut config = HarvestConfig::from_file(&args.config)?;
    config.apply_env();

    println!("Harvest configuration:");
    println!("  Target URL: {}", config.target_url);
    println!("  WebDriver URL: {}", config.webdriver_url);
    println!("  Item selector: {}", config.selectors.item);
    println!("  Category rules: {}", config.category_rules.len());

    let mut harvest = Harvest::from_config(config).with_observer(Arc::new(LogObserver));

    if let Some(delay_ms) = args.delay_ms {
        println!("Overriding category delay: {}ms", delay_ms);
        harvest = harvest.with_delay_ms(delay_ms);
    }
    if args.headed {
        harvest = harvest.with_headless(false);
    }

    let start_time = std::time::Instant::now();
    let run = harvest.run(shutdown_signal()).await?;

    for item in &run.items {
        println!("[{}] p{} {}", item.category, item.page_number, item.question);
    }

    let (processed, stats) = harvest.process(&run.items)?;
    println!(
        "Harvested {} items ({} after reconciliation) from {} categories in {:.2} seconds.",
        run.items.len(),
        processed.len(),
        run.summary.total_categories,
        start_time.elapsed().as_secs_f64()
    );
    for (category, count) in &stats.category_distribution {
        println!("  {}: {}", category, count);
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        ::log::warn!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
