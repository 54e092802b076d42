use std::io::{self, IsTerminal};
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Log target of this crate; callers add it to their own prefix list.
pub const TARGET_PREFIX: &str = "embedding_service";

/// RFC3339 UTC timer, e.g. `2025-11-01T10:20:30Z`.
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        w.write_str(&now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
    }
}

/// Compact formatting layer that renders only events whose target starts with
/// one of `prefixes`.
///
/// Events go to stderr so stdout stays free for command output. ANSI colors
/// are enabled only when stderr is a terminal. Span close events are logged so
/// `#[instrument]`ed calls report their duration.
pub fn layer<S>(prefixes: &'static [&'static str]) -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let use_ansi = io::stderr().is_terminal();
    let ours = filter::filter_fn(move |meta| {
        prefixes.iter().any(|p| meta.target().starts_with(p))
    });

    fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(use_ansi)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(
            fmt::format()
                .compact()
                .with_timer(ChronoRfc3339Utc)
                .with_level(true)
                .with_target(true)
                .with_source_location(true),
        )
        .with_filter(ours)
}

/// One level directive per prefix, e.g. `embedding_service=debug`.
pub fn level_directives(prefixes: &[&str], level: Level) -> Vec<Directive> {
    prefixes
        .iter()
        .filter_map(|p| Directive::from_str(&format!("{p}={}", level.as_str().to_lowercase())).ok())
        .collect()
}

/// `EnvFilter` from `RUST_LOG` (or `default`), with `level` for `prefixes`.
pub fn env_filter_with_level(default: &str, prefixes: &[&str], level: Level) -> EnvFilter {
    let base = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    level_directives(prefixes, level)
        .into_iter()
        .fold(base, |f, d| f.add_directive(d))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_directive_per_prefix() {
        let ds = level_directives(&[TARGET_PREFIX, "my_app"], Level::DEBUG);
        assert_eq!(ds.len(), 2);
        assert!(ds.iter().any(|d| d.to_string() == "embedding_service=debug"));
        assert!(ds.iter().any(|d| d.to_string() == "my_app=debug"));
    }
}
