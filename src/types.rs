use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::attributes::Wave;
use crate::utils::{parse_draw_time, parse_open_code};
use crate::zodiac::Zodiac;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LotteryType {
    #[serde(rename = "HK")]
    Hk,
    #[serde(rename = "MO_NEW")]
    MoNew,
    #[serde(rename = "MO_OLD")]
    MoOld,
}

impl LotteryType {
    pub const ALL: [LotteryType; 3] = [LotteryType::Hk, LotteryType::MoNew, LotteryType::MoOld];

    pub fn as_str(&self) -> &'static str {
        match self {
            LotteryType::Hk => "HK",
            LotteryType::MoNew => "MO_NEW",
            LotteryType::MoOld => "MO_OLD",
        }
    }
}

impl fmt::Display for LotteryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown lottery type: {0}")]
pub struct UnknownLotteryType(pub String);

impl FromStr for LotteryType {
    type Err = UnknownLotteryType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HK" => Ok(LotteryType::Hk),
            "MO_NEW" => Ok(LotteryType::MoNew),
            "MO_OLD" => Ok(LotteryType::MoOld),
            _ => Err(UnknownLotteryType(s.to_string())),
        }
    }
}

/// One row as delivered by an upstream results API.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawDraw {
    #[serde(deserialize_with = "string_or_number")]
    pub expect: String,
    pub open_code: String,
    #[serde(default)]
    pub open_time: Option<String>,
    #[serde(default)]
    pub wave: Option<String>,
    #[serde(default)]
    pub zodiac: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Expect {
        Text(String),
        Number(u64),
    }

    Ok(match Expect::deserialize(deserializer)? {
        Expect::Text(s) => s.trim().to_string(),
        Expect::Number(n) => n.to_string(),
    })
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidDraw {
    #[error("draw has an empty sequence id")]
    MissingExpect,
    #[error("draw {expect} has a malformed open code: {open_code}")]
    OpenCode { expect: String, open_code: String },
}

/// A stored draw: six regular numbers followed by the special number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawRecord {
    pub lottery_type: LotteryType,
    pub expect: String,
    pub numbers: [u8; 7],
    pub open_time: Option<String>,
    pub wave: Option<String>,
    pub zodiac: Option<String>,
}

impl DrawRecord {
    pub fn from_raw(lottery_type: LotteryType, raw: &RawDraw) -> Result<Self, InvalidDraw> {
        if raw.expect.is_empty() || !raw.expect.chars().all(|c| c.is_ascii_digit()) {
            return Err(InvalidDraw::MissingExpect);
        }
        let numbers = parse_open_code(&raw.open_code).ok_or_else(|| InvalidDraw::OpenCode {
            expect: raw.expect.clone(),
            open_code: raw.open_code.clone(),
        })?;

        Ok(Self {
            lottery_type,
            expect: raw.expect.clone(),
            numbers,
            open_time: raw.open_time.clone().filter(|t| !t.trim().is_empty()),
            wave: raw.wave.clone(),
            zodiac: raw.zodiac.clone(),
        })
    }

    pub fn special(&self) -> u8 {
        self.numbers[6]
    }

    pub fn regulars(&self) -> &[u8] {
        &self.numbers[..6]
    }

    pub fn contains(&self, number: u8) -> bool {
        self.numbers.contains(&number)
    }

    pub fn open_code(&self) -> String {
        self.numbers
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn draw_time(&self) -> Option<NaiveDateTime> {
        self.open_time.as_deref().and_then(parse_draw_time)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveRecommendation {
    pub main: Wave,
    pub defense: Wave,
}

/// The recommendation produced for one upcoming draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionData {
    pub zodiacs: Vec<Zodiac>,
    pub numbers: Vec<String>,
    pub wave: WaveRecommendation,
    pub heads: Vec<u8>,
    pub tails: Vec<u8>,
}

impl PredictionData {
    /// Numbers as integers; entries that fail to parse are dropped.
    pub fn number_values(&self) -> Vec<u8> {
        self.numbers.iter().filter_map(|n| n.parse().ok()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRecord {
    pub lottery_type: LotteryType,
    pub target_expect: String,
    #[serde(rename = "prediction")]
    pub payload: PredictionData,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(expect: &str, open_code: &str) -> RawDraw {
        RawDraw {
            expect: expect.to_string(),
            open_code: open_code.to_string(),
            open_time: Some("2025-03-01 21:32:00".to_string()),
            wave: None,
            zodiac: None,
        }
    }

    #[test]
    fn test_lottery_type_parsing() {
        assert_eq!("hk".parse::<LotteryType>(), Ok(LotteryType::Hk));
        assert_eq!("MO_NEW".parse::<LotteryType>(), Ok(LotteryType::MoNew));
        assert_eq!(" mo_old ".parse::<LotteryType>(), Ok(LotteryType::MoOld));
        assert!("INVALID".parse::<LotteryType>().is_err());
        assert!("".parse::<LotteryType>().is_err());
    }

    #[test]
    fn test_lottery_type_wire_name_matches_display() {
        for lottery_type in LotteryType::ALL {
            let json = serde_json::to_string(&lottery_type).unwrap();
            assert_eq!(json, format!("\"{}\"", lottery_type));
        }
    }

    #[test]
    fn test_raw_draw_accepts_numeric_expect() {
        let parsed: RawDraw =
            serde_json::from_str(r#"{"expect": 2025061, "openCode": "1,2,3,4,5,6,7"}"#).unwrap();
        assert_eq!(parsed.expect, "2025061");
        assert_eq!(parsed.open_time, None);
    }

    #[test]
    fn test_from_raw_splits_special() {
        let record = DrawRecord::from_raw(LotteryType::Hk, &raw("1001", "10,2,33,4,45,6,49")).unwrap();
        assert_eq!(record.special(), 49);
        assert_eq!(record.regulars(), &[10, 2, 33, 4, 45, 6]);
        assert_eq!(record.open_code(), "10,2,33,4,45,6,49");
        assert!(record.draw_time().is_some());
    }

    #[test]
    fn test_from_raw_rejects_bad_rows() {
        assert!(matches!(
            DrawRecord::from_raw(LotteryType::Hk, &raw("1001", "1,2,3")),
            Err(InvalidDraw::OpenCode { .. })
        ));
        assert!(matches!(
            DrawRecord::from_raw(LotteryType::Hk, &raw("1001", "1,2,3,4,5,6,50")),
            Err(InvalidDraw::OpenCode { .. })
        ));
        assert_eq!(
            DrawRecord::from_raw(LotteryType::Hk, &raw("", "1,2,3,4,5,6,7")),
            Err(InvalidDraw::MissingExpect)
        );
    }

    #[test]
    fn test_prediction_data_round_trip() {
        let data = PredictionData {
            zodiacs: vec![Zodiac::Rat, Zodiac::Dragon, Zodiac::Pig],
            numbers: vec!["01".to_string(), "17".to_string(), "49".to_string()],
            wave: WaveRecommendation {
                main: Wave::Green,
                defense: Wave::Red,
            },
            heads: vec![0, 3],
            tails: vec![1, 4, 7, 8, 9],
        };
        let json = serde_json::to_string(&data).unwrap();
        let parsed: PredictionData = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, data);
        assert_eq!(parsed.number_values(), vec![1, 17, 49]);
    }
}
