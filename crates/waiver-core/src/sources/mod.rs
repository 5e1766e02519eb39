// Remote data sources: the fetch capability and its memoizing wrapper.

pub mod cache;
pub mod http;

use std::fmt;

pub use cache::{CachedFetcher, Clock, SystemClock};
pub use http::HttpFetcher;

/// The upstream feeds the pipeline reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    SeasonStats,
    Roster,
    Draft,
    LiveMetrics,
    Fixtures,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::SeasonStats => "season stats",
            SourceKind::Roster => "roster",
            SourceKind::Draft => "draft picks",
            SourceKind::LiveMetrics => "live metrics",
            SourceKind::Fixtures => "fixtures",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SourceError {
    /// Transport failure, timeout, or non-success HTTP status.
    #[error("failed to fetch {origin} from {url}: {message}")]
    Fetch {
        origin: SourceKind,
        url: String,
        message: String,
    },

    /// The payload could not be decoded as the expected container.
    #[error("failed to parse {origin}: {message}")]
    Parse { origin: SourceKind, message: String },
}

impl SourceError {
    pub fn origin(&self) -> SourceKind {
        match self {
            SourceError::Fetch { origin, .. } | SourceError::Parse { origin, .. } => *origin,
        }
    }
}

/// Fetch the raw text body of one source.
///
/// Implementations are blocking. The production one goes over HTTP; tests
/// substitute in-memory fakes.
pub trait Fetcher {
    fn fetch(&self, kind: SourceKind, url: &str) -> Result<String, SourceError>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch(&self, kind: SourceKind, url: &str) -> Result<String, SourceError> {
        (**self).fetch(kind, url)
    }
}

/// Substitute `{league_id}` in a configured URL template.
pub fn expand_url(template: &str, league_id: &str) -> String {
    template.replace("{league_id}", league_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_template_expansion() {
        assert_eq!(
            expand_url("https://x/api/v1/league/{league_id}/draft", "42"),
            "https://x/api/v1/league/42/draft"
        );
        assert_eq!(expand_url("https://x/csv", "42"), "https://x/csv");
    }

    #[test]
    fn error_messages_name_the_source() {
        let err = SourceError::Fetch {
            origin: SourceKind::Draft,
            url: "https://x".into(),
            message: "HTTP 503".into(),
        };
        assert_eq!(err.to_string(), "failed to fetch draft picks from https://x: HTTP 503");
        assert_eq!(err.origin(), SourceKind::Draft);

        let err = SourceError::Parse {
            origin: SourceKind::SeasonStats,
            message: "no name column".into(),
        };
        assert_eq!(err.to_string(), "failed to parse season stats: no name column");
    }
}
