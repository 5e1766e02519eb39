// Blocking HTTP fetcher.

use std::time::Duration;

use tracing::debug;

use super::{Fetcher, SourceError, SourceKind};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

const USER_AGENT: &str = concat!("waiver-assistant/", env!("CARGO_PKG_VERSION"));

/// `Fetcher` backed by a blocking `reqwest` client with a fixed timeout.
/// No retries: any failure is returned to the caller.
pub struct HttpFetcher {
    http: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, kind: SourceKind, url: &str) -> Result<String, SourceError> {
        let fetch_error = |message: String| SourceError::Fetch {
            origin: kind,
            url: url.to_string(),
            message,
        };

        debug!("GET {} ({})", url, kind);
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|e| fetch_error(describe(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP {status}")));
        }

        let body = response.text().map_err(|e| fetch_error(describe(&e)))?;
        debug!("{}: {} bytes from {}", kind, body.len(), url);
        Ok(body)
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_timeout() {
        assert!(HttpFetcher::new(DEFAULT_TIMEOUT).is_ok());
    }

    #[test]
    fn unreachable_host_is_a_fetch_error() {
        let fetcher = HttpFetcher::new(Duration::from_secs(2)).unwrap();
        // Port 9 on localhost (discard) is closed on any normal test host.
        let err = fetcher
            .fetch(SourceKind::Fixtures, "http://127.0.0.1:9/fixtures")
            .unwrap_err();
        match err {
            SourceError::Fetch { origin, url, .. } => {
                assert_eq!(origin, SourceKind::Fixtures);
                assert_eq!(url, "http://127.0.0.1:9/fixtures");
            }
            other => panic!("expected fetch error, got {other:?}"),
        }
    }
}
