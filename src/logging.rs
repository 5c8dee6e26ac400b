use std::io;
use tracing_appender::rolling;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_STDERR_FILTER: &str = "info,web_request=warn";
const DEFAULT_FILE_FILTER: &str = "web_request=debug,xrefs=debug,info";

pub fn configure_logging() {
    // Stdout carries command output, so console logging goes to stderr
    let stderr_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_STDERR_FILTER));
    let stderr_log = fmt::layer()
        .with_writer(io::stderr)
        .with_filter(stderr_filter);

    // File log configuration
    let file_appender = rolling::daily("logs", "chemrel.log");
    let file_log = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_filter(EnvFilter::new(DEFAULT_FILE_FILTER));

    tracing_subscriber::Registry::default()
        .with(stderr_log)
        .with(file_log)
        .init();
}
