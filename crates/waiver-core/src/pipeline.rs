// One synchronous refresh: fetch every source, build the ownership index,
// load the player pool and annotate owners. Ranking is left to the caller.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{Config, ConfigError};
use crate::roster::{self, OwnershipIndex, RosterEntry};
use crate::sources::{CachedFetcher, Fetcher, HttpFetcher, SourceError, SourceKind};
use crate::stats::{self, FixtureTable, LiveTable, PlayerRecord};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error(transparent)]
    Source(#[from] SourceError),
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Where the ownership index came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterSource {
    pub kind: SourceKind,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Season-stats players with live metrics and owners filled in.
    pub pool: Vec<PlayerRecord>,
    pub ownership: OwnershipIndex,
    pub roster_source: RosterSource,
    /// The configured user team, resolved against the index.
    pub my_team_id: Option<String>,
}

impl PipelineOutput {
    /// Roster entries of the user's team, in payload order.
    pub fn my_squad(&self) -> Vec<&RosterEntry> {
        match self.my_team_id.as_deref() {
            Some(id) => self.ownership.entries_for(id),
            None => Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// The production fetcher for `config`: HTTP with the configured timeout,
/// memoized for the configured TTL.
pub fn http_fetcher(config: &Config) -> Result<CachedFetcher<HttpFetcher>, PipelineError> {
    let http = HttpFetcher::new(config.http.timeout())?;
    Ok(CachedFetcher::new(http, config.http.cache_ttl()))
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Fetch and reconcile every source once.
///
/// Season stats and the roster are required: a fetch or parse failure aborts
/// the run. Live metrics and fixtures are optional but, when configured, a
/// failure on either also aborts. Fixtures are only read when live metrics
/// are, since the live feed carries the team id → short code table.
pub fn run<F: Fetcher>(fetcher: &F, config: &Config) -> Result<PipelineOutput, PipelineError> {
    let (ownership, roster_source) = load_ownership(fetcher, config)?;
    info!(
        "ownership index from {} ({}): {} teams, {} owned players",
        roster_source.kind,
        roster_source.url,
        ownership.teams().len(),
        ownership.len()
    );

    let season_url = config.season_stats_url();
    let season_body = fetcher.fetch(SourceKind::SeasonStats, &season_url)?;
    let season_rows = stats::season::load_from_str(&season_body)
        .map_err(|e| parse_error(SourceKind::SeasonStats, e))?;
    info!("loaded {} season stats rows", season_rows.len());

    let live = match config.live_metrics_url() {
        Some(url) => Some(load_live(fetcher, &url)?),
        None => None,
    };

    let fixtures = match (config.fixtures_url(), &live) {
        (Some(url), Some(live)) => Some(load_fixtures(fetcher, &url, live)?),
        (Some(_), None) => {
            warn!("fixtures source configured without live metrics; skipping fixture ease");
            None
        }
        (None, _) => None,
    };

    let mut pool = stats::load(season_rows, live.as_ref(), fixtures.as_ref());
    stats::annotate_owners(&mut pool, &ownership);

    let my_team_id = resolve_my_team(&ownership, config);
    match &my_team_id {
        Some(id) => info!("user team resolved to id '{}'", id),
        None => warn!(
            "configured team '{}' not found among {} teams",
            config.league.team_id,
            ownership.teams().len()
        ),
    }

    Ok(PipelineOutput {
        pool,
        ownership,
        roster_source,
        my_team_id,
    })
}

/// Try the live roster endpoints in order, then fall back to the draft
/// picks. Endpoint failures are logged and skipped; only a draft failure is
/// fatal. An empty draft result is accepted (everyone is a free agent).
fn load_ownership<F: Fetcher>(
    fetcher: &F,
    config: &Config,
) -> Result<(OwnershipIndex, RosterSource), PipelineError> {
    for url in config.roster_urls() {
        let body = match fetcher.fetch(SourceKind::Roster, &url) {
            Ok(body) => body,
            Err(e) => {
                debug!("roster endpoint failed: {}", e);
                continue;
            }
        };
        match roster::extract_str(&body) {
            Ok(entries) if !entries.is_empty() => {
                return Ok((
                    OwnershipIndex::build(entries),
                    RosterSource {
                        kind: SourceKind::Roster,
                        url,
                    },
                ));
            }
            Ok(_) => debug!("roster endpoint {} yielded no entries", url),
            Err(e) => debug!("roster endpoint {} returned non-JSON: {}", url, e),
        }
    }

    let url = config.draft_url();
    let body = fetcher.fetch(SourceKind::Draft, &url)?;
    let entries = roster::extract_str(&body).map_err(|e| parse_error(SourceKind::Draft, e))?;
    if entries.is_empty() {
        warn!("draft picks at {} yielded no roster entries", url);
    }
    Ok((
        OwnershipIndex::build(entries),
        RosterSource {
            kind: SourceKind::Draft,
            url,
        },
    ))
}

fn load_live<F: Fetcher>(fetcher: &F, url: &str) -> Result<LiveTable, PipelineError> {
    let body = fetcher.fetch(SourceKind::LiveMetrics, url)?;
    let table = stats::live::load_from_str(&body)
        .map_err(|e| parse_error(SourceKind::LiveMetrics, e))?;
    info!(
        "loaded {} live metrics rows, {} team codes",
        table.len(),
        table.team_codes.len()
    );
    Ok(table)
}

fn load_fixtures<F: Fetcher>(
    fetcher: &F,
    url: &str,
    live: &LiveTable,
) -> Result<FixtureTable, PipelineError> {
    let body = fetcher.fetch(SourceKind::Fixtures, url)?;
    let table = FixtureTable::load_from_str(&body, &live.team_codes)
        .map_err(|e| parse_error(SourceKind::Fixtures, e))?;
    if table.is_empty() {
        warn!("no upcoming fixtures found; fixture ease unavailable");
    }
    Ok(table)
}

/// `team_id` first, then `team_name`, each as an id or a team name.
fn resolve_my_team(index: &OwnershipIndex, config: &Config) -> Option<String> {
    let league = &config.league;
    std::iter::once(league.team_id.as_str())
        .chain(league.team_name.as_deref())
        .filter(|ident| !ident.trim().is_empty())
        .find_map(|ident| index.resolve_team(ident))
        .map(str::to_string)
}

fn parse_error(origin: SourceKind, err: impl std::fmt::Display) -> SourceError {
    SourceError::Parse {
        origin,
        message: err.to_string(),
    }
}
