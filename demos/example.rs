use std::time::Duration;

use ini_conf::{ConfSet, SectionName};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct CacheSection {
    size: u64,
    ratio: f64,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct AppConfig {
    name: String,
    debug: bool,
    cache: CacheSection,
}

fn main() -> Result<(), ini_conf::ConfigError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut conf = ConfSet::new("demos/app.ini");
    conf.string(SectionName::Global, "name", "app");
    let debug = conf.bool(SectionName::Global, "debug", false);
    let host = conf.string("db", "host", "localhost");
    let port = conf.uint("db", "port", 5432);
    let timeout = conf.duration("db", "timeout", Duration::from_secs(30));
    conf.uint64("cache", "size", 256);
    conf.float64("cache", "ratio", 0.5);

    conf.parse()?;

    println!("debug={:?}", conf.get(&debug));
    println!(
        "db: {}:{} (timeout {:?})",
        conf.get(&host).map_or("?", String::as_str),
        conf.get(&port).copied().unwrap_or_default(),
        conf.get(&timeout),
    );

    for item in conf.items() {
        println!("  {} {} = {} ({})", item.section(), item.name(), item.value(), item.value().kind());
    }

    let config: AppConfig = conf.extract()?;
    println!("{config:#?}");

    Ok(())
}
