use chrono::{DateTime, SecondsFormat, Utc};
use unicode_truncate::UnicodeTruncateStr;

use crate::http_probe::prelude::*;

pub const TRANSPORT_ERROR_MARKER: &str = "UNKNOWN ERROR";
pub const ERROR_RESPONSE_MARKER: &str = "ERROR RESPONSE";

/// Pads or truncates to exactly `width` display columns. A double width
/// character that would straddle the limit is dropped and padded instead.
pub fn to_fixed_width(input: &str, width: usize) -> String {
    let (truncated, used) = input.unicode_truncate(width);
    format!("{truncated}{}", " ".repeat(width.saturating_sub(used)))
}

/// Number of terminal columns `input` occupies.
pub fn display_width(input: &str) -> usize {
    input.unicode_truncate(usize::MAX).1
}

/// Columnar console/file message for one outcome.
pub fn format_message(outcome: &ProbeOutcome, size_aware: bool, name_width: usize) -> String {
    let name = to_fixed_width(&outcome.target.name, name_width);
    let url = &outcome.target.url;
    let ms = outcome.elapsed_ms;

    if outcome.failure == FailureKind::TransportError {
        return format!("ms={ms:>6} \t{name} \t{url} \t{TRANSPORT_ERROR_MARKER} ");
    }

    let mut message = if size_aware {
        format!(
            "ms={ms:>6} \tsize={:>9} \tkbps={:>8} \t{name} \t{url}",
            outcome.byte_size, outcome.throughput_kbps
        )
    } else {
        format!("ms={ms:>6} \t{name} \t{url}")
    };

    if outcome.failure == FailureKind::ErrorResponse {
        let status = outcome
            .http_status
            .map(|s| s.to_string())
            .unwrap_or_default();
        let status_text = outcome.http_status_text.as_deref().unwrap_or_default();
        message.push_str(&format!(
            " \t{ERROR_RESPONSE_MARKER} \t{status} \t{status_text}"
        ));
    }

    message
}

/// ISO-8601 UTC with milliseconds, e.g. `2024-05-01T12:00:00.000Z`.
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// One line of the daily result file, newline terminated.
pub fn format_line(now: DateTime<Utc>, severity: Severity, message: &str) -> String {
    format!("{} \t{:<8}\t{}\n", timestamp(now), severity.tag(), message)
}
