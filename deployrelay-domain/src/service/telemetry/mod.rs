use anyhow::{Context, Result};
use std::{
    fs::{File, OpenOptions},
    io::{self, Stdout},
    path::Path,
    sync::Arc,
};
use tracing::{subscriber::set_global_default, Subscriber};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{
    fmt::{
        writer::{MakeWriterExt, Tee},
        MakeWriter,
    },
    layer::SubscriberExt,
    EnvFilter, Registry,
};

/// Bunyan level assigned to `INFO` records.
pub const BUNYAN_INFO_LEVEL: u64 = 30;

/// Stdout plus the append-only log file that `/status` reads back.
pub type LogSink = Tee<fn() -> Stdout, Arc<File>>;

pub fn log_sink(path: &Path) -> Result<LogSink> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Could not open log file {}", path.display()))?;

    let stdout: fn() -> Stdout = io::stdout;
    Ok(stdout.and(Arc::new(file)))
}

/// Bunyan JSON records written to `sink`. `RUST_LOG` wins over
/// `default_filter` when set.
pub fn get_subscriber<Sink>(
    name: &str,
    default_filter: &str,
    sink: Sink,
) -> impl Subscriber + Send + Sync + 'static
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    Registry::default()
        .with(filter_layer)
        .with(JsonStorageLayer)
        .with(BunyanFormattingLayer::new(name.to_owned(), sink))
}

pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync + 'static) -> Result<()> {
    LogTracer::init().context("Failed to set logger")?;
    set_global_default(subscriber).context("Failed to set subscriber")
}
