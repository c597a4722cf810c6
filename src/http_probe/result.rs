use crate::config::Target;

/// Why a probe did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    None,
    /// The server answered with a non 2xx status.
    ErrorResponse,
    /// No response at all: DNS, connect, reset or timeout.
    TransportError,
}

/// Outcome of a single fetch attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutcome {
    pub target: Target,
    pub elapsed_ms: u64,
    pub byte_size: u64,
    pub throughput_kbps: f64,
    pub http_status: Option<u16>,
    pub http_status_text: Option<String>,
    pub failure: FailureKind,
}

impl ProbeOutcome {
    pub fn success(target: Target, elapsed_ms: u64, byte_size: u64) -> Self {
        Self {
            target,
            elapsed_ms,
            byte_size,
            throughput_kbps: throughput_kbps(byte_size, elapsed_ms),
            http_status: None,
            http_status_text: None,
            failure: FailureKind::None,
        }
    }

    pub fn with_status(mut self, status: u16, status_text: impl Into<String>) -> Self {
        self.http_status = Some(status);
        self.http_status_text = Some(status_text.into());
        self
    }

    pub fn error_response(
        target: Target,
        elapsed_ms: u64,
        byte_size: u64,
        status: u16,
        status_text: impl Into<String>,
    ) -> Self {
        let mut outcome = Self::success(target, elapsed_ms, byte_size).with_status(status, status_text);
        outcome.failure = FailureKind::ErrorResponse;
        outcome
    }

    /// A failed transfer never reports bytes or throughput.
    pub fn transport_error(target: Target, elapsed_ms: u64) -> Self {
        Self {
            target,
            elapsed_ms,
            byte_size: 0,
            throughput_kbps: 0.0,
            http_status: None,
            http_status_text: None,
            failure: FailureKind::TransportError,
        }
    }
}

/// Transfer rate in thousands of bytes per second, truncated to whole bytes
/// per second first. Zero when no time elapsed.
pub fn throughput_kbps(byte_size: u64, elapsed_ms: u64) -> f64 {
    if elapsed_ms == 0 {
        return 0.0;
    }
    let bytes_per_sec = u128::from(byte_size) * 1000 / u128::from(elapsed_ms);
    bytes_per_sec as f64 / 1000.0
}
