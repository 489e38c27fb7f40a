// SPDX-License-Identifier: Apache-2.0
use std::env;
use tracing::subscriber::{SetGlobalDefaultError, set_global_default};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{EnvFilter, Registry, fmt::MakeWriter, layer::SubscriberExt};

use crate::settings::LogFormat;

fn env_filter(default: impl FnOnce() -> String) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let filter_level = env::var("RUST_LOG").unwrap_or_else(|_| default());
        EnvFilter::new(filter_level)
    })
}

/// Initialize the tracing subscriber for the application, emitting Bunyan JSON
pub fn init_tracing<Sink>(name: &str, sink: Sink) -> Result<(), SetGlobalDefaultError>
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    // Skip setting LogTracer if it's already been set
    let _ = LogTracer::init();

    let env_filter = env_filter(|| format!("{}=info,actix_web=info", name));
    let formatting_layer = BunyanFormattingLayer::new(name.into(), sink);

    let subscriber = Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer);

    set_global_default(subscriber)?;
    tracing::info!("Tracing initialized with Bunyan formatter");
    Ok(())
}

/// Initialize a more readable console logger for development
pub fn init_console_tracing(name: &str) -> Result<(), SetGlobalDefaultError> {
    let _ = LogTracer::init();

    let env_filter = env_filter(|| format!("{}=debug,actix_web=info", name));
    let subscriber = tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_env_filter(env_filter)
        .finish();

    set_global_default(subscriber)?;
    tracing::info!("Console tracing initialized");
    Ok(())
}

/// Picks the subscriber matching the configured log format
pub fn init(name: &str, format: LogFormat) -> Result<(), SetGlobalDefaultError> {
    match format {
        LogFormat::Json => init_tracing(name, std::io::stdout),
        LogFormat::Console => init_console_tracing(name),
    }
}
