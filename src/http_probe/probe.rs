use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use hyper::ext::ReasonPhrase;
use reqwest::Client;
use tokio::time::Instant;

use super::prelude::*;
use super::report;
use crate::config::Target;

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub status_text: String,
    /// Size of the fully read body.
    pub byte_size: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("{0}")]
    Transport(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(report(&err))
        }
    }
}

/// Performs a GET and reads the whole body within `timeout`.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<FetchResponse, FetchError>> + Send;
}

impl<T: Fetcher> Fetcher for Arc<T> {
    fn fetch(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<FetchResponse, FetchError>> + Send {
        (**self).fetch(url, timeout)
    }
}

#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("netpulse/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchResponse, FetchError> {
        let response = self.client.get(url).timeout(timeout).send().await?;
        let status = response.status();
        // hyper only keeps the reason phrase when it differs from the canonical one.
        let status_text = response
            .extensions()
            .get::<ReasonPhrase>()
            .map(|reason| String::from_utf8_lossy(reason.as_bytes()).into_owned())
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_default();
        let body = response.bytes().await?;

        Ok(FetchResponse {
            status: status.as_u16(),
            status_text,
            byte_size: body.len() as u64,
        })
    }
}

/// Runs timed fetches and turns them into [`ProbeOutcome`]s.
pub struct Prober<F> {
    fetcher: F,
    timeout: Duration,
}

impl<F: Fetcher> Prober<F> {
    pub fn new(fetcher: F, timeout: Duration) -> Self {
        Self { fetcher, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Single best effort attempt. Never fails: transport problems and the
    /// timeout itself become a [`FailureKind::TransportError`] outcome.
    pub async fn probe(&self, target: &Target) -> ProbeOutcome {
        let start = Instant::now();
        let fetched = tokio::time::timeout(
            self.timeout,
            self.fetcher.fetch(&target.url, self.timeout),
        )
        .await;
        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match fetched {
            Ok(Ok(response)) if (200..300).contains(&response.status) => {
                ProbeOutcome::success(target.clone(), elapsed_ms, response.byte_size)
                    .with_status(response.status, response.status_text)
            }
            Ok(Ok(response)) => ProbeOutcome::error_response(
                target.clone(),
                elapsed_ms,
                response.byte_size,
                response.status,
                response.status_text,
            ),
            Ok(Err(err)) => {
                let timeout_ms = self.timeout.as_millis();
                if u128::from(elapsed_ms) < timeout_ms {
                    log::info!(
                        "{} failed after {elapsed_ms}ms, before the {timeout_ms}ms timeout: {err}",
                        target.name
                    );
                }
                ProbeOutcome::transport_error(target.clone(), elapsed_ms)
            }
            Err(_) => {
                log::debug!("{} gave no response within {:?}", target.name, self.timeout);
                ProbeOutcome::transport_error(target.clone(), elapsed_ms)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::time::sleep;

    use super::*;

    /// Scripted behaviour for one URL.
    #[derive(Debug, Clone)]
    pub enum Script {
        Respond {
            delay: Duration,
            status: u16,
            bytes: u64,
        },
        Fail(Duration),
        Hang,
        Panic,
    }

    impl Script {
        pub fn ok(delay_ms: u64, bytes: u64) -> Self {
            Script::Respond {
                delay: Duration::from_millis(delay_ms),
                status: 200,
                bytes,
            }
        }

        pub fn status(delay_ms: u64, status: u16) -> Self {
            Script::Respond {
                delay: Duration::from_millis(delay_ms),
                status,
                bytes: 0,
            }
        }
    }

    /// In memory fetcher recording every requested URL and the highest
    /// number of fetches running at once.
    #[derive(Default)]
    pub struct ScriptedFetcher {
        scripts: HashMap<String, Script>,
        pub calls: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
    }

    /// Decrements the in flight count when the fetch finishes or is dropped
    /// by a timeout.
    struct InFlight<'a>(&'a AtomicUsize);

    impl Drop for InFlight<'_> {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl ScriptedFetcher {
        pub fn with(mut self, url: &str, script: Script) -> Self {
            self.scripts.insert(url.to_string(), script);
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn calls_to(&self, url: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|c| *c == url).count()
        }

        pub fn peak_in_flight(&self) -> usize {
            self.peak_in_flight.load(Ordering::SeqCst)
        }
    }

    impl Fetcher for ScriptedFetcher {
        async fn fetch(&self, url: &str, _timeout: Duration) -> Result<FetchResponse, FetchError> {
            self.calls.lock().unwrap().push(url.to_string());
            let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
            let _guard = InFlight(&self.in_flight);
            let script = self.scripts.get(url).cloned().unwrap_or(Script::ok(0, 0));
            match script {
                Script::Respond {
                    delay,
                    status,
                    bytes,
                } => {
                    sleep(delay).await;
                    let status_text = match status {
                        200 => "OK",
                        404 => "Not Found",
                        500 => "Internal Server Error",
                        _ => "",
                    };
                    Ok(FetchResponse {
                        status,
                        status_text: status_text.to_string(),
                        byte_size: bytes,
                    })
                }
                Script::Fail(delay) => {
                    sleep(delay).await;
                    Err(FetchError::Transport("connection refused".to_string()))
                }
                Script::Hang => std::future::pending().await,
                Script::Panic => panic!("scripted fetcher panic for {url}"),
            }
        }
    }

    fn target() -> Target {
        Target::new("A", "http://example/ok")
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_success_is_measured() {
        let fetcher = ScriptedFetcher::default().with("http://example/ok", Script::ok(100, 2_000));
        let prober = Prober::new(fetcher, Duration::from_secs(5));

        let outcome = prober.probe(&target()).await;

        assert_eq!(outcome.failure, FailureKind::None);
        assert_eq!(outcome.elapsed_ms, 100);
        assert_eq!(outcome.byte_size, 2_000);
        assert_eq!(outcome.throughput_kbps, 20.0);
        assert_eq!(outcome.http_status, Some(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_status() {
        let fetcher = ScriptedFetcher::default().with("http://example/ok", Script::status(30, 404));
        let prober = Prober::new(fetcher, Duration::from_secs(5));

        let outcome = prober.probe(&target()).await;

        assert_eq!(outcome.failure, FailureKind::ErrorResponse);
        assert_eq!(outcome.http_status, Some(404));
        assert_eq!(outcome.http_status_text.as_deref(), Some("Not Found"));
        assert_eq!(outcome.elapsed_ms, 30);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_fetch_hits_timeout() {
        let fetcher = ScriptedFetcher::default().with("http://example/ok", Script::Hang);
        let prober = Prober::new(fetcher, Duration::from_secs(5));

        let outcome = prober.probe(&target()).await;

        assert_eq!(outcome.failure, FailureKind::TransportError);
        assert_eq!(outcome.elapsed_ms, 5_000);
        assert_eq!(outcome.byte_size, 0);
        assert_eq!(outcome.throughput_kbps, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_early_transport_failure_keeps_measured_time() {
        let fetcher = ScriptedFetcher::default()
            .with("http://example/ok", Script::Fail(Duration::from_millis(40)));
        let prober = Prober::new(fetcher, Duration::from_secs(5));

        let outcome = prober.probe(&target()).await;

        assert_eq!(outcome.failure, FailureKind::TransportError);
        assert_eq!(outcome.elapsed_ms, 40);
    }

    /// Serves one raw HTTP/1.1 response with the given status line.
    async fn serve_once(status_line: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!("{status_line}\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok");
            socket.write_all(response.as_bytes()).await.unwrap();
        });
        format!("http://{addr}/")
    }

    #[tokio::test]
    async fn test_reqwest_fetcher_keeps_server_reason_phrase() {
        let url = serve_once("HTTP/1.1 599 Origin Melted").await;
        let fetcher = ReqwestFetcher::new(Duration::from_secs(2)).unwrap();

        let response = fetcher.fetch(&url, Duration::from_secs(2)).await.unwrap();

        assert_eq!(response.status, 599);
        assert_eq!(response.status_text, "Origin Melted");
        assert_eq!(response.byte_size, 2);
    }

    #[tokio::test]
    async fn test_reqwest_fetcher_falls_back_to_canonical_reason() {
        let url = serve_once("HTTP/1.1 404 Not Found").await;
        let fetcher = ReqwestFetcher::new(Duration::from_secs(2)).unwrap();

        let response = fetcher.fetch(&url, Duration::from_secs(2)).await.unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(response.status_text, "Not Found");
    }

    #[tokio::test]
    async fn test_reqwest_fetcher_connection_refused() {
        let fetcher = ReqwestFetcher::new(Duration::from_millis(500)).unwrap();
        let result = fetcher
            .fetch("http://127.0.0.1:1/unreachable", Duration::from_millis(500))
            .await;
        assert!(result.is_err());
    }
}
