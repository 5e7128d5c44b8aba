//
// logging.rs
// dicom-nifti-batch
//
// Tracing setup for the binary: one append-mode log file plus the console, both rendered as
// `<timestamp> - <LEVEL> - <message>`.
//

use std::fmt;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Error events on this target are rendered as `CRITICAL`.
pub const CRITICAL_TARGET: &str = "critical";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Event formatter producing `2026-10-19 14:03:11,482 - INFO - message`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainFormat;

impl<S, N> FormatEvent<S, N> for PlainFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        write!(
            writer,
            "{} - {} - ",
            Local::now().format(TIMESTAMP_FORMAT),
            level_label(meta.level(), meta.target())
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn level_label(level: &Level, target: &str) -> &'static str {
    match *level {
        Level::ERROR if target == CRITICAL_TARGET => "CRITICAL",
        Level::ERROR => "ERROR",
        Level::WARN => "WARNING",
        Level::INFO => "INFO",
        Level::DEBUG => "DEBUG",
        Level::TRACE => "TRACE",
    }
}

fn build_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }))
}

/// Install the global subscriber. Call once, before any batch work starts.
pub fn init_logging(log_file: &Path, verbose: bool) -> Result<()> {
    if let Some(parent) = log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file: {}", log_file.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(PlainFormat)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_filter(build_filter(verbose)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(PlainFormat)
                .with_writer(std::io::stderr)
                .with_filter(build_filter(verbose)),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

/// Console-only subscriber for failures that happen before the log file is known.
pub fn init_console_logging(verbose: bool) -> Result<()> {
    tracing_subscriber::fmt()
        .event_format(PlainFormat)
        .with_writer(std::io::stderr)
        .with_env_filter(build_filter(verbose))
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
        .context("Failed to install console subscriber")
}

/// Run-fatal message, rendered at CRITICAL.
pub fn log_fatal(message: impl fmt::Display) {
    tracing::error!(target: CRITICAL_TARGET, "Error: {}", message);
}
