pub mod classify;
pub mod probe;
pub mod result;

pub mod prelude {
    pub use super::classify::{Severity, Thresholds};
    pub use super::probe::{FetchError, FetchResponse, Fetcher, Prober, ReqwestFetcher};
    pub use super::result::{FailureKind, ProbeOutcome};
}

use std::fmt::Write;

/// Flattens an error and its sources into one line.
fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let _ = write!(s, ": {}", src);
        err = src;
    }
    s
}
