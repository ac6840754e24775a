use indicatif::ProgressStyle;
use tracing::{Span, info_span};
use tracing_indicatif::IndicatifLayer;
use tracing_indicatif::filter::IndicatifFilter;
use tracing_indicatif::span_ext::IndicatifSpanExt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::terminal::logging::SelfcheckFormatter;

const PRINT_DIRECTIVE: &str = "selfcheck::print=info";

const TICK_STRINGS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

/// Installs the global subscriber: `RUST_LOG` filtering (default `info`),
/// symbol-prefixed lines, and progress bars that keep log output above them.
pub fn init_logging() {
    let indicatif_layer = IndicatifLayer::new();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Console lines are output, not diagnostics: keep them whatever RUST_LOG says.
    let filter = match PRINT_DIRECTIVE.parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .event_format(SelfcheckFormatter)
        .with_writer(indicatif_layer.get_stdout_writer());

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(indicatif_layer.with_filter(IndicatifFilter::new(false)))
        .init();
}

/// A span that shows a progress bar of `total` steps while entered.
pub fn progress_span(message: &str, total: usize) -> Span {
    let span = info_span!("progress", indicatif.pb_show = true);
    span.pb_set_style(&progress_style());
    span.pb_set_length(total as u64);
    span.pb_set_message(message);
    span
}

pub fn report_progress(span: &Span, completed: usize) {
    span.pb_set_position(completed as u64);
}

fn progress_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} {msg} {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICK_STRINGS)
}
