use parking_lot::Mutex;
use rusqlite::Connection;
use serde_json::Value;
use thiserror::Error;

use crate::database::insert_records;
use crate::types::{DrawRecord, LotteryType, RawDraw};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("no source URL configured for {0}")]
    MissingSource(LotteryType),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream answered with status {0}")]
    Status(reqwest::StatusCode),
    #[error("unexpected payload: {0}")]
    Payload(String),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Extracts draw rows from either a bare array or a `{ "data": [...] }` wrapper.
pub fn parse_draws(payload: Value) -> Result<Vec<RawDraw>, SyncError> {
    let rows = match payload {
        Value::Array(rows) => rows,
        Value::Object(mut object) => match object.remove("data") {
            Some(Value::Array(rows)) => rows,
            _ => return Err(SyncError::Payload("expected a data array".to_string())),
        },
        other => {
            return Err(SyncError::Payload(format!(
                "expected an array of draws, got {}",
                other
            )));
        }
    };

    let mut draws = Vec::with_capacity(rows.len());
    for row in rows {
        match serde_json::from_value::<RawDraw>(row) {
            Ok(draw) => draws.push(draw),
            Err(e) => tracing::warn!("Skipping unreadable draw row: {}", e),
        }
    }
    Ok(draws)
}

pub async fn fetch_draws(client: &reqwest::Client, url: &str) -> Result<Vec<RawDraw>, SyncError> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(SyncError::Status(response.status()));
    }

    let payload: Value = response.json().await?;
    parse_draws(payload)
}

/// Validates and stores fetched draws; returns how many rows were new.
pub fn save_draws(
    conn: &Connection,
    lottery_type: LotteryType,
    draws: &[RawDraw],
) -> Result<usize, SyncError> {
    let records: Vec<DrawRecord> = draws
        .iter()
        .filter_map(|raw| match DrawRecord::from_raw(lottery_type, raw) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping {} draw: {}", lottery_type, e);
                None
            }
        })
        .collect();

    Ok(insert_records(conn, &records)?)
}

pub async fn sync_lottery(
    db: &Mutex<Connection>,
    client: &reqwest::Client,
    url: &str,
    lottery_type: LotteryType,
) -> Result<usize, SyncError> {
    tracing::info!("Syncing {} from {}", lottery_type, url);
    let draws = fetch_draws(client, url).await?;

    let inserted = {
        let conn = db.lock();
        save_draws(&conn, lottery_type, &draws)?
    };

    tracing::info!(
        "Synced {}: {} fetched, {} new",
        lottery_type,
        draws.len(),
        inserted
    );
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{count_records, create_tables};
    use serde_json::json;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn
    }

    #[test]
    fn test_parse_wrapped_and_bare_payloads() {
        let wrapped = json!({"data": [{"expect": "1001", "openCode": "1,2,3,4,5,6,7"}]});
        assert_eq!(parse_draws(wrapped).unwrap().len(), 1);

        let bare = json!([
            {"expect": "1001", "openCode": "1,2,3,4,5,6,7", "openTime": "2025-01-02 21:30:00"},
            {"expect": 1002, "openCode": "8,9,10,11,12,13,14", "wave": "blue", "zodiac": "猴"}
        ]);
        let draws = parse_draws(bare).unwrap();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[1].expect, "1002");
        assert_eq!(draws[1].zodiac.as_deref(), Some("猴"));
    }

    #[test]
    fn test_parse_rejects_non_array_payloads() {
        assert!(matches!(parse_draws(json!({"data": "nope"})), Err(SyncError::Payload(_))));
        assert!(matches!(parse_draws(json!({"rows": []})), Err(SyncError::Payload(_))));
        assert!(matches!(parse_draws(json!("text")), Err(SyncError::Payload(_))));
    }

    #[test]
    fn test_parse_skips_unreadable_rows() {
        let payload = json!([{"expect": "1"}, {"expect": "2", "openCode": "1,2,3,4,5,6,7"}]);
        assert_eq!(parse_draws(payload).unwrap().len(), 1);
    }

    #[test]
    fn test_save_is_idempotent() {
        let conn = memory_db();
        let draws =
            parse_draws(json!({"data": [{"expect": "1001", "openCode": "1,2,3,4,5,6,7"}]})).unwrap();
        assert_eq!(save_draws(&conn, LotteryType::Hk, &draws).unwrap(), 1);
        assert_eq!(save_draws(&conn, LotteryType::Hk, &draws).unwrap(), 0);
        assert_eq!(count_records(&conn, LotteryType::Hk).unwrap(), 1);
    }

    #[test]
    fn test_save_skips_invalid_draws() {
        let conn = memory_db();
        let draws = parse_draws(json!([
            {"expect": "1001", "openCode": "1,2,3,4,5,6"},
            {"expect": "1002", "openCode": "1,2,3,4,5,6,7"}
        ]))
        .unwrap();
        assert_eq!(save_draws(&conn, LotteryType::MoOld, &draws).unwrap(), 1);
    }
}
