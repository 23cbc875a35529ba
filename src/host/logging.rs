use std::fs::File;
use std::io::{self, IsTerminal, stdout};
use std::path::PathBuf;

use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Where file logging goes when the terminal is busy drawing frames.
pub fn log_file_path() -> PathBuf {
    std::env::temp_dir().join("vga-monitor.log")
}

pub fn setup_logging_file(level: tracing::Level) -> io::Result<PathBuf> {
    let logfile = log_file_path();

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(File::create(&logfile)?)
        .log_internal_errors(false);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(logging_targets(level))
        .init();
    Ok(logfile)
}

pub fn setup_logging_stdio(level: tracing::Level) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .with_line_number(false)
        .with_level(false)
        .without_time();

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(stdout().is_terminal())
        .event_format(format)
        .log_internal_errors(false);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(logging_targets(level))
        .init();
}

fn logging_targets(level: tracing::Level) -> Targets {
    Targets::new()
        .with_target("ratatui", LevelFilter::OFF)
        .with_target("crossterm", LevelFilter::OFF)
        .with_default(LevelFilter::from_level(level))
}
