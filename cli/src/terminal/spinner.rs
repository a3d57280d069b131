use colored::*;
use indicatif::ProgressStyle;
use tracing::{Span, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

const TIP: &str = "press 'q' to finish early";

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&[
            "▁▁▁▁▁",
            "▁▂▂▂▁",
            "▁▄▂▄▁",
            "▂▄▆▄▂",
            "▄▆█▆▄",
            "▂▄▆▄▂",
            "▁▄▂▄▁",
            "▁▂▂▂▁",
        ])
}

/// A span rendered as a spinner while it is entered.
pub fn start(message: &str) -> Span {
    let span: Span = info_span!("progress");
    span.pb_set_style(&spinner_style());
    span.pb_set_message(&format!("{message} {}", format!("({TIP})").italic().dimmed()));
    span.pb_start();
    span
}

pub fn report_discovery_progress(span: &Span, count: usize) {
    span.pb_set_message(&format!(
        "Found {} camera(s) so far... {}",
        count.to_string().green().bold(),
        format!("({TIP})").italic().dimmed()
    ));
}
