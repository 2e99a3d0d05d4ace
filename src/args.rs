use clap::Parser;
use faq_harvest::HarvestConfig;
use std::error::Error;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "faq-harvest")]
#[command(about = "Harvests categorized, paginated FAQ listings through a WebDriver browser")]
#[command(version)]
pub struct Args {
    /// FAQ listing URL (defaults to the configured target)
    pub url: Option<String>,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// WebDriver server URL (overrides WEBDRIVER_URL and the config file)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Show the browser window instead of running headless
    #[arg(long)]
    pub headed: bool,

    /// Delay between categories in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Base directory for the processed/, raw/ and reports/ artifacts
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Skip the browser and reconcile a saved raw capture
    #[arg(long, value_name = "RAW_JSON")]
    pub reprocess: Option<PathBuf>,
}

impl Args {
    /// Build the run configuration: file (or defaults), then environment, then flags
    pub fn load_config(&self) -> Result<HarvestConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => HarvestConfig::from_file(path)?,
            None => HarvestConfig::default(),
        };
        config.apply_env();
        self.apply_to(&mut config);
        Ok(config)
    }

    fn apply_to(&self, config: &mut HarvestConfig) {
        if let Some(url) = &self.url {
            config.target_url = url.clone();
        }
        if let Some(webdriver_url) = &self.webdriver_url {
            config.webdriver_url = webdriver_url.clone();
        }
        if self.headed {
            config.browser.headless = false;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.crawling.delay_between_requests_ms = delay_ms;
        }
        if let Some(dir) = &self.output_dir {
            config.output.output_dir = subdir(dir, "processed");
            config.output.raw_dir = subdir(dir, "raw");
            config.output.reports_dir = subdir(dir, "reports");
        }
    }
}

fn subdir(base: &Path, name: &str) -> String {
    base.join(name).to_string_lossy().into_owned()
}
