use chrono::Utc;
use serde::Serialize;

use crate::attributes::{head_of, tail_of, wave_of};
use crate::types::{DrawRecord, PredictionData};
use crate::utils::format_number;
use crate::zodiac::ZodiacTable;

/// Hit flags of one prediction against the draw it targeted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    pub expect: String,
    pub special: String,
    pub zodiac_hit: bool,
    pub wave_hit: bool,
    pub head_hit: bool,
    pub tail_hit: bool,
    pub special_hit: bool,
    /// Predicted numbers drawn in any position, ascending.
    pub number_hits: Vec<String>,
}

pub fn verify(actual: &DrawRecord, prediction: &PredictionData) -> Verification {
    let special = actual.special();
    let date = actual
        .draw_time()
        .map(|t| t.date())
        .unwrap_or_else(|| Utc::now().date_naive());
    let zodiac = ZodiacTable::for_date(date).zodiac_of(special);
    let wave = wave_of(special);
    let predicted = prediction.number_values();

    let mut number_hits: Vec<u8> = predicted
        .iter()
        .copied()
        .filter(|n| actual.contains(*n))
        .collect();
    number_hits.sort_unstable();
    number_hits.dedup();

    Verification {
        expect: actual.expect.clone(),
        special: format_number(special),
        zodiac_hit: prediction.zodiacs.contains(&zodiac),
        wave_hit: prediction.wave.main == wave || prediction.wave.defense == wave,
        head_hit: prediction.heads.contains(&head_of(special)),
        tail_hit: prediction.tails.contains(&tail_of(special)),
        special_hit: predicted.contains(&special),
        number_hits: number_hits.into_iter().map(format_number).collect(),
    }
}
