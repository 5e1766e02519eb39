// Composite scoring and top-N ranking of unowned players.

use serde::{Deserialize, Serialize};

use crate::stats::PlayerRecord;

// ---------------------------------------------------------------------------
// Configuration types
// ---------------------------------------------------------------------------

/// Flat bonus added to the composite score of players returning from injury.
pub const INJURY_RETURN_BONUS: f64 = 0.05;

/// Number of candidates returned when the caller does not say otherwise.
pub const DEFAULT_TOP_N: usize = 25;

/// Per-metric multipliers applied to the normalized component scores.
///
/// Sign is not validated; a negative weight penalizes the metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub points_per_game: f64,
    pub ict_index: f64,
    pub fixture_ease: f64,
    pub form: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        ScoringWeights {
            points_per_game: 1.0,
            ict_index: 1.0,
            fixture_ease: 1.0,
            form: 1.0,
        }
    }
}

/// Which unowned players are eligible for ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Every unowned player.
    #[default]
    All,
    /// Unowned players expected to feature next round. Players whose chance
    /// of playing is not published are kept.
    AvailableOnly,
}

// ---------------------------------------------------------------------------
// Scored output
// ---------------------------------------------------------------------------

/// Min-max normalized metric values, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ComponentScores {
    pub points_per_game: f64,
    pub ict_index: f64,
    pub fixture_ease: f64,
    pub form: f64,
}

impl ComponentScores {
    fn weighted_sum(&self, weights: &ScoringWeights) -> f64 {
        self.points_per_game * weights.points_per_game
            + self.ict_index * weights.ict_index
            + self.fixture_ease * weights.fixture_ease
            + self.form * weights.form
    }
}

/// One ranked player. Scores are only comparable within a single `rank` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate<'a> {
    pub record: &'a PlayerRecord,
    pub components: ComponentScores,
    pub composite: f64,
}

// ---------------------------------------------------------------------------
// Min-max normalization
// ---------------------------------------------------------------------------

/// Observed range of one metric across the filtered set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
}

/// Range of the present (non-null) values; `None` when every value is null.
pub fn compute_range<I>(values: I) -> Option<MetricRange>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values
        .into_iter()
        .flatten()
        .fold(None, |acc: Option<MetricRange>, v| match acc {
            None => Some(MetricRange { min: v, max: v }),
            Some(r) => Some(MetricRange {
                min: r.min.min(v),
                max: r.max.max(v),
            }),
        })
}

/// Map `value` into `[0, 1]` over `range`. A null value, a missing range or
/// a zero-width range all give 0.
pub fn min_max(value: Option<f64>, range: Option<MetricRange>) -> f64 {
    let (Some(v), Some(r)) = (value, range) else {
        return 0.0;
    };
    let span = r.max - r.min;
    if span <= 0.0 {
        return 0.0;
    }
    (v - r.min) / span
}

struct PoolRanges {
    points_per_game: Option<MetricRange>,
    ict_index: Option<MetricRange>,
    fixture_ease: Option<MetricRange>,
    form: Option<MetricRange>,
}

impl PoolRanges {
    fn of(records: &[&PlayerRecord]) -> Self {
        PoolRanges {
            points_per_game: compute_range(records.iter().map(|r| r.points_per_game())),
            ict_index: compute_range(records.iter().map(|r| r.live.ict_index)),
            fixture_ease: compute_range(records.iter().map(|r| r.live.fixture_ease)),
            form: compute_range(records.iter().map(|r| r.live.form)),
        }
    }

    fn components(&self, record: &PlayerRecord) -> ComponentScores {
        ComponentScores {
            points_per_game: min_max(record.points_per_game(), self.points_per_game),
            ict_index: min_max(record.live.ict_index, self.ict_index),
            fixture_ease: min_max(record.live.fixture_ease, self.fixture_ease),
            form: min_max(record.live.form, self.form),
        }
    }
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

fn is_eligible(record: &PlayerRecord, mode: FilterMode) -> bool {
    if !record.is_unowned() {
        return false;
    }
    match mode {
        FilterMode::All => true,
        FilterMode::AvailableOnly => {
            record.available_next_round || record.live.chance_of_playing.is_none()
        }
    }
}

/// Score and order the unowned players of `pool`, best first.
///
/// Normalization ranges are computed over the filtered set only. The sort is
/// stable, so equal composites keep pool order. Returns at most `top_n`
/// candidates; an empty filtered set yields an empty result.
pub fn rank<'a>(
    pool: &'a [PlayerRecord],
    weights: &ScoringWeights,
    mode: FilterMode,
    top_n: usize,
) -> Vec<ScoredCandidate<'a>> {
    let eligible: Vec<&PlayerRecord> = pool.iter().filter(|r| is_eligible(r, mode)).collect();
    if eligible.is_empty() {
        return Vec::new();
    }
    let ranges = PoolRanges::of(&eligible);

    let mut scored: Vec<ScoredCandidate<'a>> = eligible
        .into_iter()
        .map(|record| {
            let components = ranges.components(record);
            let bonus = if record.returning_from_injury {
                INJURY_RETURN_BONUS
            } else {
                0.0
            };
            ScoredCandidate {
                record,
                components,
                composite: components.weighted_sum(weights) + bonus,
            }
        })
        .collect();

    scored.sort_by(|a, b| b.composite.total_cmp(&a.composite));
    scored.truncate(top_n);
    scored
}

/// `rank` with default weights, every unowned player, top 25.
pub fn rank_default(pool: &[PlayerRecord]) -> Vec<ScoredCandidate<'_>> {
    rank(pool, &ScoringWeights::default(), FilterMode::All, DEFAULT_TOP_N)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Owner;
    use crate::stats::{season, LiveMetrics};
    use std::collections::HashMap;

    fn player(name: &str, ppg: Option<f64>) -> PlayerRecord {
        let mut season_metrics = HashMap::new();
        if let Some(ppg) = ppg {
            season_metrics.insert(season::POINTS_PER_GAME.to_string(), ppg);
        }
        PlayerRecord {
            name: name.into(),
            key: crate::name_key::normalize(name),
            club: "Fulham".into(),
            position: None,
            season: season_metrics,
            live: LiveMetrics::default(),
            available_next_round: true,
            returning_from_injury: false,
            owner: Owner::Unowned,
        }
    }

    fn names(ranked: &[ScoredCandidate<'_>]) -> Vec<String> {
        ranked.iter().map(|c| c.record.name.clone()).collect()
    }

    #[test]
    fn higher_ppg_ranks_first() {
        let pool = vec![player("B", Some(2.0)), player("A", Some(5.0))];
        let ranked = rank_default(&pool);
        assert_eq!(names(&ranked), vec!["A", "B"]);
        assert!(ranked[0].composite > ranked[1].composite);
        assert!((ranked[0].components.points_per_game - 1.0).abs() < f64::EPSILON);
        assert_eq!(ranked[1].components.points_per_game, 0.0);
    }

    #[test]
    fn scenario_higher_ppg_wins_when_all_else_equal() {
        let mut a = player("A", Some(5.0));
        let mut b = player("B", Some(2.0));
        for p in [&mut a, &mut b] {
            p.live.ict_index = Some(10.0);
            p.live.fixture_ease = Some(3.0);
            p.live.form = Some(2.0);
        }
        let pool = vec![b, a];
        let ranked = rank(&pool, &ScoringWeights::default(), FilterMode::All, DEFAULT_TOP_N);

        assert_eq!(names(&ranked), vec!["A", "B"]);
        assert!(ranked[0].composite > ranked[1].composite);
        assert_eq!(ranked[0].components.ict_index, 0.0);
        assert_eq!(ranked[0].components.fixture_ease, 0.0);
        assert_eq!(ranked[0].components.form, 0.0);
        assert!((ranked[0].composite - 1.0).abs() < f64::EPSILON);
        assert_eq!(ranked[1].composite, 0.0);
    }

    #[test]
    fn owned_players_excluded() {
        let mut owned = player("Owned", Some(9.0));
        owned.owner = Owner::Team("Bob".into());
        let pool = vec![owned, player("Free", Some(1.0))];
        assert_eq!(names(&rank_default(&pool)), vec!["Free"]);
    }

    #[test]
    fn all_equal_metrics_normalize_to_zero() {
        let mut returning = player("Returning", Some(3.0));
        returning.returning_from_injury = true;
        let pool = vec![player("A", Some(3.0)), returning, player("C", Some(3.0))];
        let ranked = rank_default(&pool);

        for c in &ranked {
            assert_eq!(c.components, ComponentScores::default());
        }
        assert_eq!(ranked[0].record.name, "Returning");
        assert!((ranked[0].composite - INJURY_RETURN_BONUS).abs() < f64::EPSILON);
        assert_eq!(ranked[1].composite, 0.0);
    }

    #[test]
    fn ties_keep_pool_order() {
        let pool = vec![player("First", Some(1.0)), player("Second", Some(1.0)), player("Third", Some(1.0))];
        assert_eq!(names(&rank_default(&pool)), vec!["First", "Second", "Third"]);
    }

    #[test]
    fn null_metrics_excluded_from_range_and_score_zero() {
        let pool = vec![player("None", None), player("Low", Some(2.0)), player("High", Some(4.0))];
        let ranked = rank_default(&pool);
        assert_eq!(names(&ranked), vec!["High", "None", "Low"]);
        let low = ranked.iter().find(|c| c.record.name == "Low").unwrap();
        assert_eq!(low.components.points_per_game, 0.0);
    }

    #[test]
    fn truncates_to_top_n() {
        let pool: Vec<PlayerRecord> = (0..40).map(|i| player(&format!("P{i}"), Some(i as f64))).collect();
        assert_eq!(rank_default(&pool).len(), DEFAULT_TOP_N);
        let top3 = rank(&pool, &ScoringWeights::default(), FilterMode::All, 3);
        assert_eq!(names(&top3), vec!["P39", "P38", "P37"]);
    }

    #[test]
    fn empty_pool_gives_empty_result() {
        assert!(rank_default(&[]).is_empty());
        let mut owned = player("Owned", Some(1.0));
        owned.owner = Owner::Team("Bob".into());
        assert!(rank_default(&[owned]).is_empty());
    }

    #[test]
    fn available_only_keeps_unknown_chance() {
        let mut injured = player("Injured", Some(9.0));
        injured.available_next_round = false;
        injured.live.chance_of_playing = Some(0.0);
        let mut unknown = player("Unknown", Some(5.0));
        unknown.available_next_round = false;
        let fit = player("Fit", Some(1.0));
        let pool = vec![injured, unknown, fit];

        let ranked = rank(&pool, &ScoringWeights::default(), FilterMode::AvailableOnly, 10);
        assert_eq!(names(&ranked), vec!["Unknown", "Fit"]);
        let all = rank(&pool, &ScoringWeights::default(), FilterMode::All, 10);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn raising_a_weight_never_demotes_the_stronger_player() {
        // X leads on form, Y leads on ppg; everything else equal.
        let mut x = player("X", Some(2.0));
        x.live.form = Some(8.0);
        let mut y = player("Y", Some(6.0));
        y.live.form = Some(1.0);
        let pool = vec![y, x];

        let position_of_x = |form_weight: f64| {
            let weights = ScoringWeights {
                form: form_weight,
                ..ScoringWeights::default()
            };
            rank(&pool, &weights, FilterMode::All, 10)
                .iter()
                .position(|c| c.record.name == "X")
                .unwrap()
        };

        let mut previous = position_of_x(0.0);
        for w in [0.5, 1.0, 1.5, 3.0, 10.0] {
            let current = position_of_x(w);
            assert!(current <= previous, "X dropped from {previous} to {current} at weight {w}");
            previous = current;
        }
        assert_eq!(previous, 0);
    }

    #[test]
    fn negative_weights_are_applied() {
        let pool = vec![player("A", Some(5.0)), player("B", Some(2.0))];
        let weights = ScoringWeights {
            points_per_game: -1.0,
            ..ScoringWeights::default()
        };
        let ranked = rank(&pool, &weights, FilterMode::All, 10);
        assert_eq!(names(&ranked), vec!["B", "A"]);
    }

    #[test]
    fn range_helpers() {
        assert_eq!(compute_range(Vec::<Option<f64>>::new()), None);
        assert_eq!(compute_range(vec![None, None]), None);
        assert_eq!(
            compute_range(vec![Some(3.0), None, Some(1.0)]),
            Some(MetricRange { min: 1.0, max: 3.0 })
        );
        let r = Some(MetricRange { min: 1.0, max: 3.0 });
        assert_eq!(min_max(Some(2.0), r), 0.5);
        assert_eq!(min_max(None, r), 0.0);
        assert_eq!(min_max(Some(2.0), Some(MetricRange { min: 2.0, max: 2.0 })), 0.0);
    }

    #[test]
    fn filter_mode_from_toml_string() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: FilterMode,
        }
        let w: Wrapper = toml::from_str(r#"mode = "available_only""#).unwrap();
        assert_eq!(w.mode, FilterMode::AvailableOnly);
    }
}
