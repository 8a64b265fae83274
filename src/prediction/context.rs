use chrono::{DateTime, Datelike, NaiveDateTime, Timelike};

use crate::attributes::NumberProfile;
use crate::types::DrawRecord;
use crate::zodiac::{Zodiac, ZodiacTable};

/// Per-number score vector; index 0 is unused so numbers index directly.
pub type Scores = [f64; 50];

const SYNODIC_MONTH_DAYS: f64 = 29.530_588_853;
/// New moon of 2000-01-06 18:14 UTC.
const KNOWN_NEW_MOON_TS: i64 = 947_182_440;

/// Quarter of the synodic month containing `time`, 0 (new moon) to 3.
pub fn lunar_phase_bucket(time: NaiveDateTime) -> u8 {
    let known = DateTime::from_timestamp(KNOWN_NEW_MOON_TS, 0)
        .map(|t| t.naive_utc())
        .unwrap_or(time);
    let days = (time - known).num_seconds() as f64 / 86_400.0;
    let phase = days.rem_euclid(SYNODIC_MONTH_DAYS) / SYNODIC_MONTH_DAYS;
    ((phase * 4.0).floor() as u8).min(3)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    pub month: u32,
    pub iso_week: u32,
    pub weekday: u32,
    pub day: u32,
    pub hour: u32,
    pub lunar_bucket: u8,
}

impl Calendar {
    pub fn of(time: NaiveDateTime) -> Self {
        let date = time.date();
        Self {
            month: date.month(),
            iso_week: date.iso_week().week(),
            weekday: date.weekday().num_days_from_monday(),
            day: date.day(),
            hour: time.hour(),
            lunar_bucket: lunar_phase_bucket(time),
        }
    }
}

/// Attributes of the most recent draw that the dimensions compare against.
#[derive(Debug, Clone, Copy)]
pub struct Reference {
    pub special: u8,
    pub profile: NumberProfile,
    pub calendar: Calendar,
}

/// Everything derived once from the history before scoring.
pub struct Context<'a> {
    /// Newest first, never empty.
    pub history: &'a [DrawRecord],
    pub table: ZodiacTable,
    pub profiles: [NumberProfile; 50],
    pub reference: Reference,
    pub specials: Vec<u8>,
    /// Special number zodiac of each draw, resolved against that draw's own date.
    pub special_zodiacs: Vec<Zodiac>,
    pub calendars: Vec<Option<Calendar>>,
}

impl<'a> Context<'a> {
    /// Builds the context; `now` stands in for a missing draw time on the latest draw.
    ///
    /// Panics if `history` is empty; callers route short histories to the fallback.
    pub fn new(history: &'a [DrawRecord], now: NaiveDateTime) -> Self {
        let last = &history[0];
        let reference_time = last.draw_time().unwrap_or(now);
        let table = ZodiacTable::for_date(reference_time.date());
        let profiles: [NumberProfile; 50] =
            std::array::from_fn(|n| NumberProfile::new((n as u8).max(1), &table));

        let specials: Vec<u8> = history.iter().map(DrawRecord::special).collect();
        let special_zodiacs = history
            .iter()
            .map(|draw| {
                let draw_table = draw
                    .draw_time()
                    .map(|t| ZodiacTable::for_date(t.date()))
                    .unwrap_or(table);
                draw_table.zodiac_of(draw.special())
            })
            .collect();
        let calendars = history
            .iter()
            .map(|draw| draw.draw_time().map(Calendar::of))
            .collect();

        let special = last.special();
        Self {
            history,
            table,
            profiles,
            reference: Reference {
                special,
                profile: profiles[special as usize],
                calendar: Calendar::of(reference_time),
            },
            specials,
            special_zodiacs,
            calendars,
        }
    }

    pub fn last(&self) -> &DrawRecord {
        &self.history[0]
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn window(&self, size: usize) -> &'a [DrawRecord] {
        &self.history[..size.min(self.history.len())]
    }

    pub fn recent_specials(&self, size: usize) -> &[u8] {
        &self.specials[..size.min(self.specials.len())]
    }

    pub fn profile(&self, number: u8) -> &NumberProfile {
        &self.profiles[number as usize]
    }

    /// Builds a score vector from each candidate's profile.
    pub fn broadcast<F>(&self, score: F) -> Scores
    where
        F: Fn(&NumberProfile) -> f64,
    {
        let mut scores = [0.0; 50];
        for n in 1..=49u8 {
            scores[n as usize] = score(self.profile(n));
        }
        scores
    }
}
