//! Heuristic scoring engine producing the recommendation for the next draw.

pub mod analysis;
pub mod context;
pub mod selection;

use chrono::{NaiveDateTime, Utc};
use rand::Rng;

use crate::attributes::{NumberProfile, Wave, head_of, tail_of};
use crate::types::{DrawRecord, LotteryType, PredictionData, WaveRecommendation};
use crate::utils::format_number;
use crate::zodiac::Zodiac;

use analysis::{DIMENSION_COUNT, WEIGHTS};
use context::{Context, Scores};
use selection::{recommend_heads, recommend_tails, recommend_wave, recommend_zodiacs, select_diverse};

pub const MIN_HISTORY: usize = 50;
pub const HISTORY_WINDOW: usize = 300;
pub const PICK_COUNT: usize = 18;
pub const ZODIAC_COUNT: usize = 6;
pub const HEAD_COUNT: usize = 2;
pub const TAIL_COUNT: usize = 5;

const OVERHEAT_WINDOW: usize = 20;
const OVERHEAT_LIMIT: usize = 8;

/// Multiplicative factors applied after the weighted sum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penalties {
    /// The previous draw's special number.
    pub repeat_special: f64,
    /// Other numbers sharing the previous special's zodiac.
    pub special_zodiac: f64,
    /// Any number of the previous draw.
    pub recent_draw: f64,
    /// Numbers whose zodiac was the special zodiac more than eight times in the last twenty draws.
    pub overheated_zodiac: f64,
}

impl Default for Penalties {
    fn default() -> Self {
        Self {
            repeat_special: 0.3,
            special_zodiac: 0.85,
            recent_draw: 0.9,
            overheated_zodiac: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictorConfig {
    pub min_history: usize,
    pub pick_count: usize,
    /// Upper bound (exclusive) of the random tie-breaking term.
    pub perturbation: f64,
    pub tail_parity_bonus: f64,
    pub head_rotation_bonus: f64,
    pub penalties: Penalties,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            min_history: MIN_HISTORY,
            pick_count: PICK_COUNT,
            perturbation: 0.1,
            tail_parity_bonus: 0.05,
            head_rotation_bonus: 0.05,
            penalties: Penalties::default(),
        }
    }
}

/// One candidate number with its sub-scores for a single run.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberStat {
    pub profile: NumberProfile,
    /// Sub-scores in [`WEIGHTS`] order.
    pub scores: [f64; DIMENSION_COUNT],
    pub pre_penalty: f64,
    pub total: f64,
}

impl NumberStat {
    pub fn number(&self) -> u8 {
        self.profile.number
    }
}

#[derive(Debug, Clone, Default)]
pub struct Predictor {
    config: PredictorConfig,
}

impl Predictor {
    pub fn new(config: PredictorConfig) -> Self {
        Self { config }
    }

    /// `history` must be newest first.
    pub fn generate<R: Rng>(
        &self,
        history: &[DrawRecord],
        lottery_type: LotteryType,
        rng: &mut R,
    ) -> PredictionData {
        self.generate_at(history, lottery_type, Utc::now().naive_utc(), rng)
    }

    /// Like [`Predictor::generate`], with `now` standing in for a missing draw time.
    pub fn generate_at<R: Rng>(
        &self,
        history: &[DrawRecord],
        lottery_type: LotteryType,
        now: NaiveDateTime,
        rng: &mut R,
    ) -> PredictionData {
        if history.len() < self.config.min_history.max(1) {
            tracing::info!(
                "{} has {} draws, below {}; using random fallback",
                lottery_type,
                history.len(),
                self.config.min_history
            );
            return self.fallback(rng);
        }

        let ctx = Context::new(history, now);
        let mut ranked = self.score(&ctx, rng);
        ranked.sort_by(|a, b| b.total.total_cmp(&a.total).then(a.number().cmp(&b.number())));

        let selected = select_diverse(&ranked, self.config.pick_count);
        let excluded = ctx.reference.profile.zodiac;

        let mut numbers: Vec<u8> = selected.iter().map(NumberStat::number).collect();
        numbers.sort_unstable();

        tracing::debug!(
            "{}: scored {} draws, top candidate {:02}, previous special {:02}",
            lottery_type,
            history.len(),
            ranked[0].number(),
            ctx.reference.special
        );

        PredictionData {
            zodiacs: recommend_zodiacs(&selected, &ranked, excluded, ZODIAC_COUNT),
            numbers: numbers.into_iter().map(format_number).collect(),
            wave: recommend_wave(&selected),
            heads: recommend_heads(&ctx, &selected, HEAD_COUNT),
            tails: recommend_tails(&ctx, &selected, TAIL_COUNT),
        }
    }

    /// Uniform pick used when the history is too short to score.
    pub fn fallback<R: Rng>(&self, rng: &mut R) -> PredictionData {
        let mut numbers: Vec<u8> = rand::seq::index::sample(rng, 49, self.config.pick_count.min(49))
            .into_iter()
            .map(|i| i as u8 + 1)
            .collect();
        numbers.sort_unstable();

        PredictionData {
            zodiacs: Zodiac::ORDER[..ZODIAC_COUNT].to_vec(),
            numbers: numbers.into_iter().map(format_number).collect(),
            wave: WaveRecommendation {
                main: Wave::Red,
                defense: Wave::Blue,
            },
            heads: vec![0, 1],
            tails: vec![1, 2, 3, 4, 5],
        }
    }

    /// Scores every candidate; the result is ordered by number.
    pub fn score<R: Rng>(&self, ctx: &Context, rng: &mut R) -> Vec<NumberStat> {
        let dimension_scores: Vec<Scores> = WEIGHTS.iter().map(|(d, _)| d.analyze(ctx)).collect();

        let special = ctx.reference.special;
        let special_profile = ctx.reference.profile;
        let penalties = self.config.penalties;

        let mut zodiac_heat = [0usize; 12];
        for zodiac in ctx.special_zodiacs.iter().take(OVERHEAT_WINDOW) {
            zodiac_heat[zodiac.index()] += 1;
        }

        (1..=49u8)
            .map(|n| {
                let profile = *ctx.profile(n);
                let mut scores = [0.0; DIMENSION_COUNT];
                let mut weighted = 0.0;
                for (k, (_, weight)) in WEIGHTS.iter().enumerate() {
                    scores[k] = dimension_scores[k][n as usize];
                    weighted += weight * scores[k];
                }

                let mut pre_penalty = weighted + rng.random::<f64>() * self.config.perturbation;
                if tail_of(n) % 2 == tail_of(special) % 2 {
                    pre_penalty += self.config.tail_parity_bonus;
                }
                if head_of(n) == (head_of(special) + 1) % 5 {
                    pre_penalty += self.config.head_rotation_bonus;
                }

                let mut total = pre_penalty;
                if n == special {
                    total *= penalties.repeat_special;
                } else if profile.zodiac == special_profile.zodiac {
                    total *= penalties.special_zodiac;
                }
                if ctx.last().contains(n) {
                    total *= penalties.recent_draw;
                }
                if zodiac_heat[profile.zodiac.index()] > OVERHEAT_LIMIT {
                    total *= penalties.overheated_zodiac;
                }

                NumberStat {
                    profile,
                    scores,
                    pre_penalty,
                    total,
                }
            })
            .collect()
    }
}
