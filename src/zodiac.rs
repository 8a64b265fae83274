use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Zodiac {
    #[serde(rename = "鼠")]
    Rat,
    #[serde(rename = "牛")]
    Ox,
    #[serde(rename = "虎")]
    Tiger,
    #[serde(rename = "兔")]
    Rabbit,
    #[serde(rename = "龙")]
    Dragon,
    #[serde(rename = "蛇")]
    Snake,
    #[serde(rename = "马")]
    Horse,
    #[serde(rename = "羊")]
    Goat,
    #[serde(rename = "猴")]
    Monkey,
    #[serde(rename = "鸡")]
    Rooster,
    #[serde(rename = "狗")]
    Dog,
    #[serde(rename = "猪")]
    Pig,
}

impl Zodiac {
    pub const ORDER: [Zodiac; 12] = [
        Zodiac::Rat,
        Zodiac::Ox,
        Zodiac::Tiger,
        Zodiac::Rabbit,
        Zodiac::Dragon,
        Zodiac::Snake,
        Zodiac::Horse,
        Zodiac::Goat,
        Zodiac::Monkey,
        Zodiac::Rooster,
        Zodiac::Dog,
        Zodiac::Pig,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Zodiac::Rat => "鼠",
            Zodiac::Ox => "牛",
            Zodiac::Tiger => "虎",
            Zodiac::Rabbit => "兔",
            Zodiac::Dragon => "龙",
            Zodiac::Snake => "蛇",
            Zodiac::Horse => "马",
            Zodiac::Goat => "羊",
            Zodiac::Monkey => "猴",
            Zodiac::Rooster => "鸡",
            Zodiac::Dog => "狗",
            Zodiac::Pig => "猪",
        }
    }
}

impl fmt::Display for Zodiac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lunar new year dates; dates before these still belong to the previous zodiac year.
const LUNAR_NEW_YEAR: [(i32, u32, u32); 21] = [
    (2015, 2, 19),
    (2016, 2, 8),
    (2017, 1, 28),
    (2018, 2, 16),
    (2019, 2, 5),
    (2020, 1, 25),
    (2021, 2, 12),
    (2022, 2, 1),
    (2023, 1, 22),
    (2024, 2, 10),
    (2025, 1, 29),
    (2026, 2, 17),
    (2027, 2, 6),
    (2028, 1, 26),
    (2029, 2, 13),
    (2030, 2, 3),
    (2031, 1, 23),
    (2032, 2, 11),
    (2033, 1, 31),
    (2034, 2, 19),
    (2035, 2, 8),
];

fn lunar_new_year(year: i32) -> Option<NaiveDate> {
    let (_, month, day) = LUNAR_NEW_YEAR
        .iter()
        .find(|(y, _, _)| *y == year)
        .copied()
        .unwrap_or((year, 2, 4));
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Index into [`Zodiac::ORDER`] of the zodiac year containing `date`.
pub fn reference_index(date: NaiveDate) -> usize {
    let mut year = date.year();
    if let Some(new_year) = lunar_new_year(year) {
        if date < new_year {
            year -= 1;
        }
    }
    (year - 4).rem_euclid(12) as usize
}

/// Number to zodiac mapping for each of the twelve reference indices.
static TABLES: Lazy<[[Zodiac; 50]; 12]> = Lazy::new(|| {
    let mut tables = [[Zodiac::Rat; 50]; 12];
    for (reference, table) in tables.iter_mut().enumerate() {
        for number in 1..=49usize {
            let offset = (reference as isize - (number as isize - 1)).rem_euclid(12);
            table[number] = Zodiac::ORDER[offset as usize];
        }
    }
    tables
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZodiacTable {
    reference: usize,
}

impl ZodiacTable {
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            reference: reference_index(date),
        }
    }

    pub fn with_reference(reference: usize) -> Self {
        Self {
            reference: reference % 12,
        }
    }

    pub fn reference(&self) -> usize {
        self.reference
    }

    pub fn zodiac_of(&self, number: u8) -> Zodiac {
        TABLES[self.reference][(number as usize).clamp(1, 49)]
    }

    pub fn numbers_of(&self, zodiac: Zodiac) -> Vec<u8> {
        (1..=49).filter(|&n| self.zodiac_of(n) == zodiac).collect()
    }
}
