
use crate::browser::mock::RecordingObserver;
use crate::config::{CrawlingConfig, HarvestConfig};
use std::sync::Arc;

const TARGET: &str = "https://www.example.com/faq";

fn test_config() -> HarvestConfig {
    let mut config = HarvestConfig::new(TARGET);
    config.crawling = CrawlingConfig::without_delays();
    config.crawling.expand_timeout_ms = 200;
    config
}

fn recorder() -> Arc<RecordingObserver> {
    Arc::new(RecordingObserver::default())
}
