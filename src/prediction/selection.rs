use std::collections::HashMap;

use crate::attributes::{Wave, head_of, tail_of};
use crate::types::WaveRecommendation;
use crate::zodiac::Zodiac;

use super::NumberStat;
use super::context::Context;

const MAX_PER_ZODIAC: usize = 3;
const MAX_PER_TAIL: usize = 3;
const MAX_PER_WAVE: usize = 8;

/// Weights of the head/tail digit analyses: special frequency, omission,
/// positional frequency, and the selected candidates' scores.
const DIGIT_WEIGHTS: [f64; 4] = [1.0, 0.6, 0.4, 0.8];
const DIGIT_FREQUENCY_WINDOW: usize = 20;
const DIGIT_POSITIONAL_WINDOW: usize = 50;

/// Greedy pick in score order that caps how many numbers share a zodiac, tail or wave.
///
/// `ranked` must already be sorted by descending total.
pub fn select_diverse(ranked: &[NumberStat], count: usize) -> Vec<NumberStat> {
    let mut selected: Vec<NumberStat> = Vec::with_capacity(count);
    let mut zodiacs: HashMap<Zodiac, usize> = HashMap::new();
    let mut tails = [0usize; 10];
    let mut waves = [0usize; 3];

    for stat in ranked {
        if selected.len() >= count {
            break;
        }
        let profile = &stat.profile;
        let zodiac_count = zodiacs.get(&profile.zodiac).copied().unwrap_or(0);
        if zodiac_count >= MAX_PER_ZODIAC
            || tails[profile.tail as usize] >= MAX_PER_TAIL
            || waves[profile.wave.index()] >= MAX_PER_WAVE
        {
            continue;
        }
        *zodiacs.entry(profile.zodiac).or_insert(0) += 1;
        tails[profile.tail as usize] += 1;
        waves[profile.wave.index()] += 1;
        selected.push(stat.clone());
    }

    // Fallback: fill with the best remaining numbers when the caps exclude too many.
    if selected.len() < count {
        for stat in ranked {
            if selected.len() >= count {
                break;
            }
            if !selected.iter().any(|s| s.number() == stat.number()) {
                selected.push(stat.clone());
            }
        }
    }

    selected
}

fn rank_zodiacs<'a, I>(stats: I) -> Vec<(Zodiac, f64)>
where
    I: IntoIterator<Item = &'a NumberStat>,
{
    let mut sums: HashMap<Zodiac, f64> = HashMap::new();
    for stat in stats {
        *sums.entry(stat.profile.zodiac).or_insert(0.0) += stat.total;
    }
    let mut ranked: Vec<(Zodiac, f64)> = sums.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
}

/// Top zodiacs by summed score over the selection, never the excluded one,
/// backfilled from the ranking over every candidate.
pub fn recommend_zodiacs(
    selected: &[NumberStat],
    candidates: &[NumberStat],
    excluded: Zodiac,
    count: usize,
) -> Vec<Zodiac> {
    let mut zodiacs: Vec<Zodiac> = rank_zodiacs(selected)
        .into_iter()
        .map(|(z, _)| z)
        .filter(|z| *z != excluded)
        .take(count)
        .collect();

    if zodiacs.len() < count {
        for (zodiac, _) in rank_zodiacs(candidates) {
            if zodiacs.len() >= count {
                break;
            }
            if zodiac != excluded && !zodiacs.contains(&zodiac) {
                zodiacs.push(zodiac);
            }
        }
    }
    zodiacs
}

/// Most and second most represented waves in the selection.
pub fn recommend_wave(selected: &[NumberStat]) -> WaveRecommendation {
    let mut tally: Vec<(Wave, usize, f64)> = Wave::ALL.iter().map(|&w| (w, 0, 0.0)).collect();
    for stat in selected {
        let entry = &mut tally[stat.profile.wave.index()];
        entry.1 += 1;
        entry.2 += stat.total;
    }
    tally.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then(b.2.total_cmp(&a.2))
            .then(a.0.index().cmp(&b.0.index()))
    });
    WaveRecommendation {
        main: tally[0].0,
        defense: tally[1].0,
    }
}

fn normalized(values: Vec<f64>) -> Vec<f64> {
    let max = values.iter().cloned().fold(0.0, f64::max);
    if max > 0.0 {
        values.into_iter().map(|v| v / max).collect()
    } else {
        values
    }
}

/// Scores each digit bucket and returns the best `count` digits.
fn recommend_digits<F>(
    ctx: &Context,
    selected: &[NumberStat],
    buckets: usize,
    digit: F,
    count: usize,
) -> Vec<u8>
where
    F: Fn(u8) -> u8,
{
    let mut frequency = vec![0.0; buckets];
    for &s in ctx.recent_specials(DIGIT_FREQUENCY_WINDOW) {
        frequency[digit(s) as usize] += 1.0;
    }

    let omission = (0..buckets)
        .map(|d| {
            ctx.specials
                .iter()
                .position(|&s| digit(s) as usize == d)
                .unwrap_or(ctx.len()) as f64
        })
        .collect();

    let mut positional = vec![0.0; buckets];
    for draw in ctx.window(DIGIT_POSITIONAL_WINDOW) {
        for &n in &draw.numbers {
            positional[digit(n) as usize] += 1.0;
        }
    }

    let mut candidate = vec![0.0; buckets];
    for stat in selected {
        candidate[digit(stat.number()) as usize] += stat.total;
    }

    let parts = [
        normalized(frequency),
        normalized(omission),
        normalized(positional),
        normalized(candidate),
    ];
    let mut scored: Vec<(u8, f64)> = (0..buckets)
        .map(|d| {
            let score: f64 = parts
                .iter()
                .zip(DIGIT_WEIGHTS)
                .map(|(part, weight)| part[d] * weight)
                .sum();
            (d as u8, score)
        })
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut digits: Vec<u8> = scored.into_iter().take(count).map(|(d, _)| d).collect();
    digits.sort_unstable();
    digits
}

pub fn recommend_heads(ctx: &Context, selected: &[NumberStat], count: usize) -> Vec<u8> {
    recommend_digits(ctx, selected, 5, head_of, count)
}

pub fn recommend_tails(ctx: &Context, selected: &[NumberStat], count: usize) -> Vec<u8> {
    recommend_digits(ctx, selected, 10, tail_of, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::NumberProfile;
    use crate::prediction::analysis::DIMENSION_COUNT;
    use crate::zodiac::ZodiacTable;

    fn stat(number: u8, total: f64) -> NumberStat {
        let table = ZodiacTable::with_reference(5);
        NumberStat {
            profile: NumberProfile::new(number, &table),
            scores: [0.0; DIMENSION_COUNT],
            pre_penalty: total,
            total,
        }
    }

    #[test]
    fn test_select_diverse_caps_shared_zodiac() {
        // 1, 13, 25, 37, 49 share a zodiac; a cap of three skips the last two.
        let ranked: Vec<NumberStat> = [1, 13, 25, 37, 49, 2, 3, 4]
            .iter()
            .enumerate()
            .map(|(i, &n)| stat(n, 100.0 - i as f64))
            .collect();
        let picked: Vec<u8> = select_diverse(&ranked, 5).iter().map(|s| s.number()).collect();
        assert_eq!(picked, vec![1, 13, 25, 2, 3]);
    }

    #[test]
    fn test_select_diverse_backfills() {
        let ranked: Vec<NumberStat> = [1, 13, 25, 37, 49]
            .iter()
            .map(|&n| stat(n, 10.0))
            .collect();
        let picked: Vec<u8> = select_diverse(&ranked, 5).iter().map(|s| s.number()).collect();
        assert_eq!(picked, vec![1, 13, 25, 37, 49]);
    }

    #[test]
    fn test_recommend_zodiacs_excludes_and_backfills() {
        let table = ZodiacTable::with_reference(5);
        let selected = vec![stat(1, 9.0), stat(2, 8.0), stat(3, 7.0)];
        let candidates: Vec<NumberStat> = (1..=49).map(|n| stat(n, 50.0 - n as f64)).collect();
        let excluded = table.zodiac_of(2);
        let zodiacs = recommend_zodiacs(&selected, &candidates, excluded, 6);
        assert_eq!(zodiacs.len(), 6);
        assert!(!zodiacs.contains(&excluded));
        assert_eq!(zodiacs[0], table.zodiac_of(1));
        assert_eq!(zodiacs[1], table.zodiac_of(3));
    }

    #[test]
    fn test_recommend_wave_ranks_by_count() {
        // 5, 6, 11 are green, 1 is red.
        let selected = vec![stat(5, 1.0), stat(6, 1.0), stat(11, 1.0), stat(1, 9.0)];
        let wave = recommend_wave(&selected);
        assert_eq!(wave.main, Wave::Green);
        assert_eq!(wave.defense, Wave::Red);
    }
}
