//! Per-number scoring dimensions.
//!
//! Every dimension returns non-negative scores for 1..=49 which are scaled so
//! the best number scores 1.0. Bucket-level dimensions (zodiac, tail, wave,
//! element, zone) broadcast the bucket score to its member numbers.

use crate::attributes::{
    ElementRelation, ZONE_COUNT, digit_root, element_of, head_of, is_prime, tail_of, wave_of,
    zone_of,
};

use super::context::{Context, Scores};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    ZodiacTransition,
    SpecialTransition,
    HistoryMirror,
    Trajectory,
    PatternGeometry,
    TailInertia,
    ZodiacInertia,
    ElementInertia,
    WaveInertia,
    Omission,
    Seasonal,
    PrimeBalance,
    SumBand,
    Positional,
    Cluster,
    Symmetry,
    Periodicity,
    Trend,
    HeadTailPattern,
    CrossCorrelation,
    AttributeBalance,
    TimePattern,
    ConsecutiveRun,
    SumZone,
    ElementRelation,
    DynamicBalance,
    ZoneUniformity,
    Markov1,
    Markov2,
    Numerology,
    Chameleon,
    QuantumLeap,
}

pub const DIMENSION_COUNT: usize = 32;

/// Static weight of each dimension in the total score.
pub const WEIGHTS: [(Dimension, f64); DIMENSION_COUNT] = [
    (Dimension::ZodiacTransition, 1.5),
    (Dimension::SpecialTransition, 1.2),
    (Dimension::HistoryMirror, 1.0),
    (Dimension::Trajectory, 0.6),
    (Dimension::PatternGeometry, 0.5),
    (Dimension::TailInertia, 0.8),
    (Dimension::ZodiacInertia, 0.8),
    (Dimension::ElementInertia, 0.6),
    (Dimension::WaveInertia, 0.6),
    (Dimension::Omission, 1.2),
    (Dimension::Seasonal, 0.5),
    (Dimension::PrimeBalance, 0.4),
    (Dimension::SumBand, 0.7),
    (Dimension::Positional, 1.0),
    (Dimension::Cluster, 0.8),
    (Dimension::Symmetry, 0.5),
    (Dimension::Periodicity, 0.9),
    (Dimension::Trend, 1.0),
    (Dimension::HeadTailPattern, 0.7),
    (Dimension::CrossCorrelation, 0.8),
    (Dimension::AttributeBalance, 0.5),
    (Dimension::TimePattern, 0.4),
    (Dimension::ConsecutiveRun, 0.4),
    (Dimension::SumZone, 0.5),
    (Dimension::ElementRelation, 0.6),
    (Dimension::DynamicBalance, 0.4),
    (Dimension::ZoneUniformity, 0.5),
    (Dimension::Markov1, 1.0),
    (Dimension::Markov2, 0.8),
    (Dimension::Numerology, 0.4),
    (Dimension::Chameleon, 0.5),
    (Dimension::QuantumLeap, 0.5),
];

const INERTIA_WINDOW: usize = 10;
const BALANCE_WINDOW: usize = 20;
const LONG_WINDOW: usize = 50;
const POSITIONAL_WINDOW: usize = 100;
const MIRROR_MATCHES: usize = 5;
const LEAP_SIZE: u8 = 20;

impl Dimension {
    pub fn name(self) -> &'static str {
        match self {
            Dimension::ZodiacTransition => "zodiac_transition",
            Dimension::SpecialTransition => "special_transition",
            Dimension::HistoryMirror => "history_mirror",
            Dimension::Trajectory => "trajectory",
            Dimension::PatternGeometry => "pattern_geometry",
            Dimension::TailInertia => "tail_inertia",
            Dimension::ZodiacInertia => "zodiac_inertia",
            Dimension::ElementInertia => "element_inertia",
            Dimension::WaveInertia => "wave_inertia",
            Dimension::Omission => "omission",
            Dimension::Seasonal => "seasonal",
            Dimension::PrimeBalance => "prime_balance",
            Dimension::SumBand => "sum_band",
            Dimension::Positional => "positional",
            Dimension::Cluster => "cluster",
            Dimension::Symmetry => "symmetry",
            Dimension::Periodicity => "periodicity",
            Dimension::Trend => "trend",
            Dimension::HeadTailPattern => "head_tail_pattern",
            Dimension::CrossCorrelation => "cross_correlation",
            Dimension::AttributeBalance => "attribute_balance",
            Dimension::TimePattern => "time_pattern",
            Dimension::ConsecutiveRun => "consecutive_run",
            Dimension::SumZone => "sum_zone",
            Dimension::ElementRelation => "element_relation",
            Dimension::DynamicBalance => "dynamic_balance",
            Dimension::ZoneUniformity => "zone_uniformity",
            Dimension::Markov1 => "markov_1",
            Dimension::Markov2 => "markov_2",
            Dimension::Numerology => "numerology",
            Dimension::Chameleon => "chameleon",
            Dimension::QuantumLeap => "quantum_leap",
        }
    }

    /// Raw scores scaled into [0, 1].
    pub fn analyze(self, ctx: &Context) -> Scores {
        let mut scores = match self {
            Dimension::ZodiacTransition => zodiac_transition(ctx),
            Dimension::SpecialTransition => special_transition(ctx),
            Dimension::HistoryMirror => history_mirror(ctx),
            Dimension::Trajectory => trajectory(ctx),
            Dimension::PatternGeometry => pattern_geometry(ctx),
            Dimension::TailInertia => tail_inertia(ctx),
            Dimension::ZodiacInertia => zodiac_inertia(ctx),
            Dimension::ElementInertia => element_inertia(ctx),
            Dimension::WaveInertia => wave_inertia(ctx),
            Dimension::Omission => omission(ctx),
            Dimension::Seasonal => seasonal(ctx),
            Dimension::PrimeBalance => prime_balance(ctx),
            Dimension::SumBand => sum_band(ctx),
            Dimension::Positional => positional(ctx),
            Dimension::Cluster => cluster(ctx),
            Dimension::Symmetry => symmetry(ctx),
            Dimension::Periodicity => periodicity(ctx),
            Dimension::Trend => trend(ctx),
            Dimension::HeadTailPattern => head_tail_pattern(ctx),
            Dimension::CrossCorrelation => cross_correlation(ctx),
            Dimension::AttributeBalance => attribute_balance(ctx),
            Dimension::TimePattern => time_pattern(ctx),
            Dimension::ConsecutiveRun => consecutive_run(ctx),
            Dimension::SumZone => sum_zone(ctx),
            Dimension::ElementRelation => element_relation(ctx),
            Dimension::DynamicBalance => dynamic_balance(ctx),
            Dimension::ZoneUniformity => zone_uniformity(ctx),
            Dimension::Markov1 => markov_first_order(ctx),
            Dimension::Markov2 => markov_second_order(ctx),
            Dimension::Numerology => numerology(ctx),
            Dimension::Chameleon => chameleon(ctx),
            Dimension::QuantumLeap => quantum_leap(ctx),
        };
        normalize(&mut scores);
        scores
    }
}

pub fn weight_of(dimension: Dimension) -> f64 {
    WEIGHTS
        .iter()
        .find(|(d, _)| *d == dimension)
        .map(|(_, w)| *w)
        .unwrap_or(0.0)
}

pub fn normalize(scores: &mut Scores) {
    for s in scores.iter_mut() {
        if !s.is_finite() || *s < 0.0 {
            *s = 0.0;
        }
    }
    let max = scores[1..].iter().cloned().fold(0.0, f64::max);
    if max > 0.0 {
        for s in scores[1..].iter_mut() {
            *s /= max;
        }
    }
    scores[0] = 0.0;
}

fn ratio(count: f64, total: f64) -> f64 {
    if total > 0.0 { count / total } else { 0.0 }
}

fn circular_distance(a: u8, b: u8) -> u8 {
    let d = a.abs_diff(b);
    d.min(49 - d.min(49))
}

fn wrap_number(value: i32) -> u8 {
    ((value - 1).rem_euclid(49) + 1) as u8
}

fn grid_position(number: u8) -> (f64, f64) {
    let index = (number - 1) as f64;
    ((index / 7.0).floor(), index % 7.0)
}

/// How often each zodiac followed the latest special zodiac.
fn zodiac_transition(ctx: &Context) -> Scores {
    let from = ctx.special_zodiacs[0];
    let mut counts = [0.0; 12];
    let mut total = 0.0;
    for i in 0..ctx.len().saturating_sub(1) {
        if ctx.special_zodiacs[i + 1] == from {
            counts[ctx.special_zodiacs[i].index()] += 1.0;
            total += 1.0;
        }
    }
    ctx.broadcast(|p| ratio(counts[p.zodiac.index()], total))
}

/// How often each number followed the latest special, neighbours counting half.
fn special_transition(ctx: &Context) -> Scores {
    let from = ctx.reference.special;
    let mut scores = [0.0; 50];
    for i in 0..ctx.len().saturating_sub(1) {
        let weight = match ctx.specials[i + 1].abs_diff(from) {
            0 => 1.0,
            1 => 0.5,
            _ => continue,
        };
        scores[ctx.specials[i] as usize] += weight;
    }
    scores
}

/// Draws that followed the past draws most similar to the latest one.
fn history_mirror(ctx: &Context) -> Scores {
    let last = ctx.last();
    let mut similar: Vec<(usize, f64)> = (1..ctx.len())
        .map(|i| {
            let shared = ctx.history[i]
                .numbers
                .iter()
                .filter(|n| last.contains(**n))
                .count();
            (i, shared as f64 / 7.0)
        })
        .filter(|(_, similarity)| *similarity > 0.0)
        .collect();
    similar.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut scores = [0.0; 50];
    for (i, similarity) in similar.into_iter().take(MIRROR_MATCHES) {
        let follower = &ctx.history[i - 1];
        for &n in &follower.numbers {
            scores[n as usize] += similarity;
        }
        scores[follower.special() as usize] += similarity;
    }
    scores
}

/// Closeness to the special projected from the last two movements.
fn trajectory(ctx: &Context) -> Scores {
    let s = ctx.recent_specials(3);
    if s.len() < 3 {
        return [0.0; 50];
    }
    let step = ((s[0] as i32 - s[1] as i32) + (s[1] as i32 - s[2] as i32)) as f64 / 2.0;
    let projected = wrap_number(s[0] as i32 + step.round() as i32);
    ctx.broadcast(|p| (1.0 - circular_distance(p.number, projected) as f64 / 10.0).max(0.0))
}

/// Closeness on the 7x7 number grid to the centroid of recent specials.
fn pattern_geometry(ctx: &Context) -> Scores {
    let recent = ctx.recent_specials(INERTIA_WINDOW);
    let count = recent.len() as f64;
    let (row, col) = recent.iter().fold((0.0, 0.0), |(r, c), &n| {
        let (nr, nc) = grid_position(n);
        (r + nr / count, c + nc / count)
    });
    ctx.broadcast(|p| {
        let (r, c) = grid_position(p.number);
        1.0 / (1.0 + ((r - row).powi(2) + (c - col).powi(2)).sqrt())
    })
}

fn tail_inertia(ctx: &Context) -> Scores {
    let mut counts = [0.0; 10];
    for &s in ctx.recent_specials(INERTIA_WINDOW) {
        counts[tail_of(s) as usize] += 1.0;
    }
    ctx.broadcast(|p| counts[p.tail as usize])
}

fn zodiac_inertia(ctx: &Context) -> Scores {
    let mut counts = [0.0; 12];
    for zodiac in ctx.special_zodiacs.iter().take(INERTIA_WINDOW) {
        counts[zodiac.index()] += 1.0;
    }
    ctx.broadcast(|p| counts[p.zodiac.index()])
}

fn element_inertia(ctx: &Context) -> Scores {
    let mut counts = [0.0; 5];
    for &s in ctx.recent_specials(INERTIA_WINDOW) {
        counts[element_of(s).index()] += 1.0;
    }
    ctx.broadcast(|p| counts[p.element.index()])
}

fn wave_inertia(ctx: &Context) -> Scores {
    let mut counts = [0.0; 3];
    for &s in ctx.recent_specials(INERTIA_WINDOW) {
        counts[wave_of(s).index()] += 1.0;
    }
    ctx.broadcast(|p| counts[p.wave.index()])
}

/// Draws since each number last appeared in any position.
fn omission(ctx: &Context) -> Scores {
    ctx.broadcast(|p| {
        ctx.history
            .iter()
            .position(|draw| draw.contains(p.number))
            .unwrap_or(ctx.len()) as f64
    })
}

/// Specials drawn in the same month, ISO week or day of month as the latest draw.
fn seasonal(ctx: &Context) -> Scores {
    let reference = ctx.reference.calendar;
    let mut scores = [0.0; 50];
    for i in 1..ctx.len() {
        let Some(calendar) = ctx.calendars[i] else {
            continue;
        };
        let mut weight = 0.0;
        if calendar.month == reference.month {
            weight += 1.0;
        }
        if calendar.iso_week == reference.iso_week {
            weight += 0.5;
        }
        if calendar.day == reference.day {
            weight += 0.5;
        }
        scores[ctx.specials[i] as usize] += weight;
    }
    scores
}

/// Favours whichever of prime and composite has been under-drawn lately.
fn prime_balance(ctx: &Context) -> Scores {
    let recent = ctx.recent_specials(BALANCE_WINDOW);
    let primes = recent.iter().filter(|&&s| is_prime(s)).count() as f64;
    let observed = ratio(primes, recent.len() as f64);
    ctx.broadcast(|p| if p.prime { 1.0 - observed } else { observed })
}

fn regular_sum(numbers: &[u8]) -> u32 {
    numbers.iter().map(|&n| n as u32).sum()
}

/// Specials that followed draws whose regular sum fell in the latest draw's band.
fn sum_band(ctx: &Context) -> Scores {
    let band = |i: usize| regular_sum(ctx.history[i].regulars()) / 30;
    let current = band(0);
    let mut scores = [0.0; 50];
    for i in 1..ctx.len() {
        if band(i) == current {
            scores[ctx.specials[i - 1] as usize] += 1.0;
        }
    }
    scores
}

/// Frequency in the special position, plus a fifth of the regular-position frequency.
fn positional(ctx: &Context) -> Scores {
    let mut scores = [0.0; 50];
    for draw in ctx.window(POSITIONAL_WINDOW) {
        scores[draw.special() as usize] += 1.0;
        for &n in draw.regulars() {
            scores[n as usize] += 0.2;
        }
    }
    scores
}

/// Co-occurrence with the latest special.
fn cluster(ctx: &Context) -> Scores {
    let anchor = ctx.reference.special;
    let mut scores = [0.0; 50];
    for draw in ctx.window(POSITIONAL_WINDOW).iter().skip(1) {
        if draw.contains(anchor) {
            for &n in draw.numbers.iter().filter(|&&n| n != anchor) {
                scores[n as usize] += 1.0;
            }
        }
    }
    scores
}

/// Mirror (50 - n) and digit reversal of the latest numbers.
fn symmetry(ctx: &Context) -> Scores {
    let special = ctx.reference.special;
    let mut scores = [0.0; 50];
    let mirror = 50 - special;
    scores[mirror as usize] += 1.0;
    for neighbour in [mirror.saturating_sub(1), mirror + 1] {
        if (1..=49).contains(&neighbour) {
            scores[neighbour as usize] += 0.5;
        }
    }
    let reversed = tail_of(special) * 10 + head_of(special);
    if (1..=49).contains(&reversed) && reversed != special {
        scores[reversed as usize] += 1.0;
    }
    for &n in ctx.last().regulars() {
        scores[(50 - n) as usize] += 0.3;
    }
    scores
}

/// Numbers whose average appearance interval says they are due next draw.
fn periodicity(ctx: &Context) -> Scores {
    ctx.broadcast(|p| {
        let seen: Vec<usize> = ctx
            .history
            .iter()
            .enumerate()
            .filter(|(_, draw)| draw.contains(p.number))
            .map(|(i, _)| i)
            .collect();
        if seen.len() < 3 {
            return 0.0;
        }
        let period = (seen[seen.len() - 1] - seen[0]) as f64 / (seen.len() - 1) as f64;
        let due_in = seen[0] as f64 + 1.0;
        1.0 / (1.0 + (due_in - period).abs())
    })
}

/// Rise of the short-window frequency over the long-window frequency.
fn trend(ctx: &Context) -> Scores {
    let short = ctx.window(INERTIA_WINDOW);
    let long = ctx.window(LONG_WINDOW);
    ctx.broadcast(|p| {
        let short_rate = ratio(
            short.iter().filter(|d| d.contains(p.number)).count() as f64,
            short.len() as f64,
        );
        let long_rate = ratio(
            long.iter().filter(|d| d.contains(p.number)).count() as f64,
            long.len() as f64,
        );
        (short_rate - long_rate).max(0.0)
    })
}

fn head_tail_pattern(ctx: &Context) -> Scores {
    let recent = ctx.recent_specials(BALANCE_WINDOW);
    let mut heads = [0.0; 5];
    let mut tails = [0.0; 10];
    for &s in recent {
        heads[head_of(s) as usize] += 1.0;
        tails[tail_of(s) as usize] += 1.0;
    }
    let total = recent.len() as f64;
    ctx.broadcast(|p| ratio(heads[p.head as usize], total) + ratio(tails[p.tail as usize], total))
}

/// Lag-one link from regular numbers of one draw to the special of the next.
fn cross_correlation(ctx: &Context) -> Scores {
    let mut cross = vec![[0.0f64; 50]; 50];
    for i in 0..ctx.len().saturating_sub(1) {
        let special = ctx.specials[i] as usize;
        for &r in ctx.history[i + 1].regulars() {
            cross[r as usize][special] += 1.0;
        }
    }
    let mut scores = [0.0; 50];
    for &r in ctx.last().regulars() {
        for n in 1..=49 {
            scores[n] += cross[r as usize][n];
        }
    }
    scores
}

/// Favours the under-represented parity and size classes.
fn attribute_balance(ctx: &Context) -> Scores {
    let recent = ctx.recent_specials(INERTIA_WINDOW);
    let total = recent.len() as f64;
    let odd = ratio(recent.iter().filter(|&&s| s % 2 == 1).count() as f64, total);
    let big = ratio(recent.iter().filter(|&&s| s >= 25).count() as f64, total);
    ctx.broadcast(|p| {
        let parity = if p.odd { 1.0 - odd } else { odd };
        let size = if p.big { 1.0 - big } else { big };
        (parity + size) / 2.0
    })
}

/// Specials drawn on the same weekday, at the same hour or in the same lunar quarter.
fn time_pattern(ctx: &Context) -> Scores {
    let reference = ctx.reference.calendar;
    let mut scores = [0.0; 50];
    for i in 1..ctx.len() {
        let Some(calendar) = ctx.calendars[i] else {
            continue;
        };
        let mut weight = 0.0;
        if calendar.weekday == reference.weekday {
            weight += 1.0;
        }
        if calendar.hour == reference.hour {
            weight += 0.5;
        }
        if calendar.lunar_bucket == reference.lunar_bucket {
            weight += 1.0;
        }
        scores[ctx.specials[i] as usize] += weight;
    }
    scores
}

fn has_consecutive(numbers: &[u8; 7]) -> bool {
    let mut sorted = *numbers;
    sorted.sort_unstable();
    sorted.windows(2).any(|w| w[1] == w[0] + 1)
}

/// Neighbours of the latest numbers, in proportion to how often runs occur.
fn consecutive_run(ctx: &Context) -> Scores {
    let window = ctx.window(LONG_WINDOW);
    let rate = ratio(
        window.iter().filter(|d| has_consecutive(&d.numbers)).count() as f64,
        window.len() as f64,
    );
    let last = ctx.last();
    ctx.broadcast(|p| {
        let adjacent = last
            .numbers
            .iter()
            .filter(|&&n| n.abs_diff(p.number) == 1)
            .count();
        if adjacent > 0 {
            rate * adjacent as f64
        } else {
            (1.0 - rate) * 0.5
        }
    })
}

/// Zone of the running sum of the last three specials.
fn sum_zone(ctx: &Context) -> Scores {
    let s = ctx.recent_specials(3);
    let sum: u32 = s.iter().map(|&n| n as u32).sum();
    let target = zone_of(((sum.max(1) - 1) % 49 + 1) as u8);
    ctx.broadcast(|p| match zone_of(p.number).abs_diff(target) {
        0 => 1.0,
        1 => 0.5,
        _ => 0.1,
    })
}

/// Historical frequency of each generation/destruction relation between
/// consecutive specials, spread over the numbers in that relation to the latest special.
fn element_relation(ctx: &Context) -> Scores {
    let mut counts = [0.0; 5];
    let mut total = 0.0;
    for i in 0..ctx.len().saturating_sub(1) {
        let older = element_of(ctx.specials[i + 1]);
        let newer = element_of(ctx.specials[i]);
        counts[older.relation_to(newer).index()] += 1.0;
        total += 1.0;
    }
    let from = ctx.reference.profile.element;
    let mut members = [0.0; 5];
    for relation in ElementRelation::ALL {
        members[relation.index()] = (1..=49u8)
            .filter(|&n| from.relation_to(element_of(n)) == relation)
            .count() as f64;
    }
    ctx.broadcast(|p| {
        let relation = from.relation_to(p.element).index();
        ratio(ratio(counts[relation], total), members[relation])
    })
}

/// Distance from the recent special mean.
fn dynamic_balance(ctx: &Context) -> Scores {
    let recent = ctx.recent_specials(INERTIA_WINDOW);
    let mean = recent.iter().map(|&n| n as f64).sum::<f64>() / recent.len() as f64;
    ctx.broadcast(|p| (p.number as f64 - mean).abs() / 48.0)
}

/// Zones that fell short of a uniform share in recent draws.
fn zone_uniformity(ctx: &Context) -> Scores {
    let window = ctx.window(BALANCE_WINDOW);
    let mut counts = [0.0; ZONE_COUNT];
    for draw in window {
        for &n in &draw.numbers {
            counts[zone_of(n)] += 1.0;
        }
    }
    let expected = (window.len() * 7) as f64 / ZONE_COUNT as f64;
    ctx.broadcast(|p| ratio((expected - counts[zone_of(p.number)]).max(0.0), expected))
}

/// P(next special zone | latest special zone).
fn markov_first_order(ctx: &Context) -> Scores {
    let from = zone_of(ctx.reference.special);
    let mut counts = [0.0; ZONE_COUNT];
    let mut total = 0.0;
    for i in 0..ctx.len().saturating_sub(1) {
        if zone_of(ctx.specials[i + 1]) == from {
            counts[zone_of(ctx.specials[i])] += 1.0;
            total += 1.0;
        }
    }
    ctx.broadcast(|p| ratio(counts[zone_of(p.number)], total))
}

/// P(next special zone | zones of the latest two specials).
fn markov_second_order(ctx: &Context) -> Scores {
    if ctx.len() < 3 {
        return [0.0; 50];
    }
    let state = (zone_of(ctx.specials[1]), zone_of(ctx.specials[0]));
    let mut counts = [0.0; ZONE_COUNT];
    let mut total = 0.0;
    for i in 0..ctx.len() - 2 {
        if (zone_of(ctx.specials[i + 2]), zone_of(ctx.specials[i + 1])) == state {
            counts[zone_of(ctx.specials[i])] += 1.0;
            total += 1.0;
        }
    }
    ctx.broadcast(|p| ratio(counts[zone_of(p.number)], total))
}

fn digit_sum(value: &str) -> u32 {
    value.chars().filter_map(|c| c.to_digit(10)).sum()
}

/// Digit-root frequency of recent specials, with resonance bonuses for the
/// latest draw's total and the upcoming sequence id.
fn numerology(ctx: &Context) -> Scores {
    let recent = ctx.recent_specials(30);
    let mut roots = [0.0; 10];
    for &s in recent {
        roots[digit_root(s as u32) as usize] += 1.0;
    }
    let total = recent.len() as f64;
    let draw_root = digit_root(ctx.last().numbers.iter().map(|&n| n as u32).sum());
    let next_root = digit_root(digit_sum(&ctx.last().expect) + 1);
    ctx.broadcast(|p| {
        let root = digit_root(p.number as u32);
        let mut score = ratio(roots[root as usize], total);
        if root == draw_root {
            score += 0.2;
        }
        if root == next_root {
            score += 0.2;
        }
        score
    })
}

/// Numbers sharing many attributes with the latest special.
fn chameleon(ctx: &Context) -> Scores {
    let reference = ctx.reference.profile;
    ctx.broadcast(|p| {
        if p.number == reference.number {
            0.0
        } else {
            p.shared_attributes(&reference) as f64 / 7.0
        }
    })
}

/// Far or near numbers depending on how often the special has recently leapt.
fn quantum_leap(ctx: &Context) -> Scores {
    let recent = ctx.recent_specials(30);
    let jumps = recent.windows(2).count() as f64;
    let leaps = recent
        .windows(2)
        .filter(|w| w[0].abs_diff(w[1]) >= LEAP_SIZE)
        .count() as f64;
    let leap_rate = ratio(leaps, jumps);
    let anchor = ctx.reference.special;
    ctx.broadcast(|p| {
        let far = p.number.abs_diff(anchor) as f64 / 48.0;
        leap_rate * far + (1.0 - leap_rate) * (1.0 - far)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::tests::{cyclic_history, reference_time};
    use std::collections::HashSet;

    #[test]
    fn test_weight_table_covers_every_dimension_once() {
        let names: HashSet<&str> = WEIGHTS.iter().map(|(d, _)| d.name()).collect();
        assert_eq!(names.len(), DIMENSION_COUNT);
        assert!(WEIGHTS.iter().all(|(_, w)| *w > 0.0));
        assert_eq!(weight_of(Dimension::ZodiacTransition), 1.5);
    }

    #[test]
    fn test_every_dimension_is_normalized() {
        let history = cyclic_history(120);
        let ctx = Context::new(&history, reference_time());
        for (dimension, _) in WEIGHTS {
            let scores = dimension.analyze(&ctx);
            assert_eq!(scores[0], 0.0, "{}", dimension.name());
            for n in 1..=49 {
                assert!(
                    (0.0..=1.0).contains(&scores[n]),
                    "{} scored {} for {}",
                    dimension.name(),
                    scores[n],
                    n
                );
            }
        }
    }

    #[test]
    fn test_special_transition_follows_cycle() {
        // Newest-first specials 1, 2, 3, ... so 49 has always followed a 1.
        let history = cyclic_history(120);
        let ctx = Context::new(&history, reference_time());
        let scores = Dimension::SpecialTransition.analyze(&ctx);
        assert_eq!(scores[49], 1.0);
        assert_eq!(scores[25], 0.0);
    }

    #[test]
    fn test_trajectory_wraps_around() {
        let history = cyclic_history(60);
        let ctx = Context::new(&history, reference_time());
        let scores = Dimension::Trajectory.analyze(&ctx);
        // Specials descend by one each draw, so after 1 comes 49.
        assert_eq!(scores[49], 1.0);
        assert!(scores[1] > scores[25]);
    }

    #[test]
    fn test_omission_rewards_long_absence() {
        let history = cyclic_history(60);
        let ctx = Context::new(&history, reference_time());
        let scores = Dimension::Omission.analyze(&ctx);
        for &n in &history[0].numbers {
            assert_eq!(scores[n as usize], 0.0);
        }
        assert!(scores.iter().any(|&s| s == 1.0));
    }

    #[test]
    fn test_symmetry_mirrors_special() {
        let history = cyclic_history(60);
        let ctx = Context::new(&history, reference_time());
        let scores = Dimension::Symmetry.analyze(&ctx);
        // The latest special is 1, its mirror is 49 and its reversal is 10.
        assert!(scores[49] > 0.0);
        assert!(scores[10] > 0.0);
    }

    #[test]
    fn test_time_pattern_counts_draw_hour() {
        let evening = cyclic_history(60);
        let mut morning = evening.clone();
        morning[1].open_time = Some("2025-06-01 09:30:00".to_string());

        let special = evening[1].special() as usize;
        let at_evening = time_pattern(&Context::new(&evening, reference_time()));
        let at_morning = time_pattern(&Context::new(&morning, reference_time()));
        assert!((at_evening[special] - at_morning[special] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_clamps_and_scales() {
        let mut scores = [0.0; 50];
        scores[3] = 4.0;
        scores[4] = 2.0;
        scores[5] = -1.0;
        scores[6] = f64::NAN;
        normalize(&mut scores);
        assert_eq!(scores[3], 1.0);
        assert_eq!(scores[4], 0.5);
        assert_eq!(scores[5], 0.0);
        assert_eq!(scores[6], 0.0);
    }

    #[test]
    fn test_circular_distance() {
        assert_eq!(circular_distance(1, 49), 1);
        assert_eq!(circular_distance(10, 20), 10);
        assert_eq!(wrap_number(0), 49);
        assert_eq!(wrap_number(50), 1);
    }
}
