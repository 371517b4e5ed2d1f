use dossier_config::logging::Configuration;
use eyre::Context;
use std::env;
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    filter::{LevelFilter, Targets},
    layer::SubscriberExt,
    Layer, Registry,
};

fn filter(config: &Configuration) -> eyre::Result<Targets> {
    let directives = env::var("RUST_LOG")
        .ok()
        .or_else(|| config.filter.as_ref().map(ToString::to_string));

    match directives {
        Some(directives) => directives
            .parse()
            .with_context(|| format!("Failed to parse log filter {directives:?}")),
        None => Ok(Targets::default().with_default(LevelFilter::INFO)),
    }
}

/// Install the global tracing subscriber
///
/// Filter directives are read from `RUST_LOG`, falling back to the configured filter and then to `INFO`
pub fn initialise_logging(config: &Configuration) -> eyre::Result<()> {
    let subscriber = Registry::default()
        .with(tracing_subscriber::fmt::layer().with_filter(filter(config)?))
        .with(ErrorLayer::default());

    tracing::subscriber::set_global_default(subscriber)
        .context("Couldn't install the global tracing subscriber")?;

    Ok(())
}
