// Configuration loading and parsing (league.toml, strategy.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::ranking::{FilterMode, ScoringWeights, DEFAULT_TOP_N};
use crate::sources::expand_url;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// League identity and squad lookup.
pub const LEAGUE_FILE: &str = "league.toml";
/// Weights, ranking options, source URLs and HTTP settings.
pub const STRATEGY_FILE: &str = "strategy.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("waiver config file not readable: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse waiver config {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to seed config/ from defaults/: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub weights: ScoringWeights,
    pub ranking: RankingConfig,
    pub sources: SourcesConfig,
    pub http: HttpConfig,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[league]` table in league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub league_id: String,
    /// The user's team: an id, or a team name resolved against the roster.
    #[serde(default)]
    pub team_id: String,
    /// Fallback identifier tried when `team_id` matches no team.
    #[serde(default)]
    pub team_name: Option<String>,
}

// ---------------------------------------------------------------------------
// strategy.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire strategy.toml file.
#[derive(Debug, Clone, Deserialize)]
struct StrategyFile {
    #[serde(default)]
    weights: ScoringWeights,
    #[serde(default)]
    ranking: RankingConfig,
    sources: SourcesConfig,
    #[serde(default)]
    http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub top_n: usize,
    pub filter: FilterMode,
}

impl Default for RankingConfig {
    fn default() -> Self {
        RankingConfig {
            top_n: DEFAULT_TOP_N,
            filter: FilterMode::All,
        }
    }
}

/// Source URLs. `{league_id}` in any of them is replaced by the configured
/// league id.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    pub season_stats_url: String,
    pub draft_url: String,
    /// Live roster endpoints, tried in order before falling back to the
    /// draft picks.
    #[serde(default)]
    pub roster_urls: Vec<String>,
    #[serde(default)]
    pub live_metrics_url: Option<String>,
    #[serde(default)]
    pub fixtures_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    /// Zero disables memoization.
    pub cache_ttl_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            timeout_secs: 20,
            cache_ttl_secs: 300,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        let secs = i64::try_from(self.cache_ttl_secs)
            .unwrap_or(i64::MAX)
            .min(i64::MAX / 1000);
        chrono::Duration::seconds(secs)
    }
}

impl Config {
    pub fn season_stats_url(&self) -> String {
        expand_url(&self.sources.season_stats_url, &self.league.league_id)
    }

    pub fn draft_url(&self) -> String {
        expand_url(&self.sources.draft_url, &self.league.league_id)
    }

    pub fn roster_urls(&self) -> Vec<String> {
        self.sources
            .roster_urls
            .iter()
            .map(|t| expand_url(t, &self.league.league_id))
            .collect()
    }

    pub fn live_metrics_url(&self) -> Option<String> {
        self.sources
            .live_metrics_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .map(|t| expand_url(t, &self.league.league_id))
    }

    pub fn fixtures_url(&self) -> Option<String> {
        self.sources
            .fixtures_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .map(|t| expand_url(t, &self.league.league_id))
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// `config/strategy.toml`, both relative to the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- league.toml (required) ---
    let league_path = config_dir.join(LEAGUE_FILE);
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;

    // --- strategy.toml (required) ---
    let strategy_path = config_dir.join(STRATEGY_FILE);
    let strategy_text = read_file(&strategy_path)?;
    let strategy_file: StrategyFile =
        toml::from_str(&strategy_text).map_err(|e| ConfigError::ParseError {
            path: strategy_path.clone(),
            source: e,
        })?;

    let config = Config {
        league: league_file.league,
        weights: strategy_file.weights,
        ranking: strategy_file.ranking,
        sources: strategy_file.sources,
        http: strategy_file.http,
    };

    validate(&config)?;

    Ok(config)
}

/// Copy `league.toml` and `strategy.toml` from `defaults/` into `config/`
/// when they are missing there. Returns the files that were copied.
///
/// Existing files in `config/` are left untouched and nothing else in
/// `defaults/` is copied.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "no defaults/ or config/ directory in {}; run waiver-assistant \
                     from the project root, where defaults/{LEAGUE_FILE} and \
                     defaults/{STRATEGY_FILE} live",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("cannot create {}: {e}", config_dir.display()),
    })?;

    let mut copied = Vec::new();
    for file_name in [LEAGUE_FILE, STRATEGY_FILE] {
        let source = defaults_dir.join(file_name);
        if !source.is_file() {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&source).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("cannot read default {file_name}: {e}"),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("cannot write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            // Never overwrite the user's edits.
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("cannot create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Load config relative to `base_dir`, copying defaults first.
pub fn load_config_in(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_files(base_dir)?;
    load_config_from(base_dir)
}

/// Convenience wrapper: loads config relative to the current working directory.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    load_config_in(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.league.league_id.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "league.league_id".into(),
            message: "must not be empty".into(),
        });
    }

    if config.ranking.top_n == 0 {
        return Err(ConfigError::ValidationError {
            field: "ranking.top_n".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.http.timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "http.timeout_secs".into(),
            message: "must be greater than 0".into(),
        });
    }

    let required_urls: &[(&str, &str)] = &[
        ("sources.season_stats_url", config.sources.season_stats_url.as_str()),
        ("sources.draft_url", config.sources.draft_url.as_str()),
    ];
    for (name, url) in required_urls {
        if url.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    // Weights may be negative; they only have to be real numbers.
    let w = &config.weights;
    let weight_fields: &[(&str, f64)] = &[
        ("weights.points_per_game", w.points_per_game),
        ("weights.ict_index", w.ict_index),
        ("weights.fixture_ease", w.fixture_ease),
        ("weights.form", w.form),
    ];
    for (name, val) in weight_fields {
        if !val.is_finite() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be a finite number, got {val}"),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Workspace root, where `defaults/` lives.
    fn project_root() -> PathBuf {
        let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let root = manifest.join("../..");
        if root.join("defaults").exists() {
            root
        } else {
            panic!("Cannot locate defaults/ directory from {:?}", manifest);
        }
    }

    /// Fresh temp dir with a `config/` containing the default strategy.toml
    /// and the given league.toml body.
    fn temp_config(name: &str, league_toml: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let config_dir = tmp.join("config");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("league.toml"), league_toml).unwrap();
        fs::copy(
            project_root().join("defaults/strategy.toml"),
            config_dir.join("strategy.toml"),
        )
        .unwrap();
        tmp
    }

    #[test]
    fn load_valid_config_from_default_files() {
        let tmp = std::env::temp_dir().join("waiver_config_defaults");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        for file in ["league.toml", "strategy.toml"] {
            fs::copy(project_root().join("defaults").join(file), tmp.join("defaults").join(file)).unwrap();
        }

        let config = load_config_in(&tmp).expect("should load default config");

        assert!(!config.league.league_id.is_empty());
        assert_eq!(config.ranking.top_n, 25);
        assert_eq!(config.ranking.filter, FilterMode::All);
        assert_eq!(config.weights, ScoringWeights::default());
        assert_eq!(config.http.timeout_secs, 20);
        assert_eq!(config.roster_urls().len(), 4);
        assert!(config.draft_url().contains(&config.league.league_id));
        assert!(!config.draft_url().contains("{league_id}"));
        assert!(config.live_metrics_url().is_some());
        assert!(config.fixtures_url().is_some());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_does_not_overwrite() {
        let tmp = std::env::temp_dir().join("waiver_config_no_overwrite");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("defaults/league.toml"), "default").unwrap();
        fs::write(tmp.join("defaults/strategy.toml"), "default").unwrap();
        fs::write(tmp.join("defaults/credentials.toml.example"), "x").unwrap();
        fs::write(tmp.join("config/league.toml"), "mine").unwrap();

        let copied = ensure_config_files(&tmp).unwrap();
        assert_eq!(copied, vec![tmp.join("config/strategy.toml")]);
        assert_eq!(fs::read_to_string(tmp.join("config/league.toml")).unwrap(), "mine");
        assert!(!tmp.join("config/credentials.toml.example").exists());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn only_league_and_strategy_files_are_seeded() {
        let tmp = std::env::temp_dir().join("waiver_config_seed_known_files");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::write(tmp.join("defaults").join(LEAGUE_FILE), "default").unwrap();
        fs::write(tmp.join("defaults").join(STRATEGY_FILE), "default").unwrap();
        fs::write(tmp.join("defaults/notes.toml"), "x").unwrap();

        let mut copied = ensure_config_files(&tmp).unwrap();
        copied.sort();
        assert_eq!(
            copied,
            vec![tmp.join("config").join(LEAGUE_FILE), tmp.join("config").join(STRATEGY_FILE)]
        );
        assert!(!tmp.join("config/notes.toml").exists());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_defaults_and_config_is_an_error() {
        let tmp = std::env::temp_dir().join("waiver_config_nothing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();
        let err = ensure_config_files(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::DefaultsCopyError { .. }));
        let message = err.to_string();
        assert!(message.contains("waiver-assistant"));
        assert!(message.contains(LEAGUE_FILE) && message.contains(STRATEGY_FILE));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_file_reported_with_path() {
        let tmp = std::env::temp_dir().join("waiver_config_missing_file");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        match load_config_from(&tmp).unwrap_err() {
            ConfigError::FileNotFound { path } => assert!(path.ends_with("league.toml")),
            other => panic!("expected FileNotFound, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_empty_league_id() {
        let tmp = temp_config(
            "waiver_config_empty_league",
            "[league]\nleague_id = \"  \"\nteam_id = \"7\"\n",
        );
        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "league.league_id"),
            other => panic!("expected ValidationError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_top_n_and_timeout() {
        let tmp = temp_config("waiver_config_zero_top_n", "[league]\nleague_id = \"1\"\n");
        let strategy = r#"
[ranking]
top_n = 0

[sources]
season_stats_url = "https://x/csv"
draft_url = "https://x/{league_id}/draft"
"#;
        fs::write(tmp.join("config/strategy.toml"), strategy).unwrap();
        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "ranking.top_n"),
            other => panic!("expected ValidationError, got: {other}"),
        }

        let strategy = r#"
[http]
timeout_secs = 0

[sources]
season_stats_url = "https://x/csv"
draft_url = "https://x/{league_id}/draft"
"#;
        fs::write(tmp.join("config/strategy.toml"), strategy).unwrap();
        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "http.timeout_secs"),
            other => panic!("expected ValidationError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn minimal_strategy_uses_defaults_and_accepts_negative_weights() {
        let tmp = temp_config("waiver_config_minimal", "[league]\nleague_id = \"55\"\n");
        let strategy = r#"
[weights]
form = -0.5

[ranking]
filter = "available_only"

[sources]
season_stats_url = "https://x/csv"
draft_url = "https://x/{league_id}/draft"
"#;
        fs::write(tmp.join("config/strategy.toml"), strategy).unwrap();
        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.weights.form, -0.5);
        assert_eq!(config.weights.points_per_game, 1.0);
        assert_eq!(config.ranking.top_n, DEFAULT_TOP_N);
        assert_eq!(config.ranking.filter, FilterMode::AvailableOnly);
        assert_eq!(config.http.timeout(), Duration::from_secs(20));
        assert_eq!(config.draft_url(), "https://x/55/draft");
        assert!(config.roster_urls().is_empty());
        assert!(config.live_metrics_url().is_none());
        assert_eq!(config.league.team_id, "");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let tmp = temp_config("waiver_config_malformed", "[league\nleague_id = 1");
        assert!(matches!(
            load_config_from(&tmp),
            Err(ConfigError::ParseError { .. })
        ));
        let _ = fs::remove_dir_all(&tmp);
    }
}
