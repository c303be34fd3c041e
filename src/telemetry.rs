//! Tracing setup for the CLI and for embedders that want the same output.
//!
//! LOG_LEVEL takes a plain level ("debug") or full directives such as
//! "warn,quizdesk=debug,attempt=debug,chat=info,reqwest=info".
//! LOG_FORMAT picks "pretty" (default), "compact" or "json".
//!
//! Everything is written to stderr so command output on stdout stays clean.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_DIRECTIVES: &str = "warn,quizdesk=info,attempt=info,chat=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

impl LogFormat {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("json") => LogFormat::Json,
            Some("compact") => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    let format = LogFormat::parse(std::env::var("LOG_FORMAT").ok().as_deref());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    // Each arm yields a different subscriber type, so init inside the match.
    let _ = match format {
        LogFormat::Json => builder.json().with_current_span(false).try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.with_file(true).with_line_number(true).try_init(),
    };
}
