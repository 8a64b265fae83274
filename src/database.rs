use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};
use std::fs;
use std::path::Path;

use crate::types::{DrawRecord, LotteryType, PredictionData, PredictionRecord};
use crate::utils::parse_open_code;

/// Inserts are committed in transactions of at most this many statements.
pub const INSERT_CHUNK_SIZE: usize = 50;

const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS lottery_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    lottery_type TEXT NOT NULL,
    expect TEXT NOT NULL,
    open_code TEXT NOT NULL,
    open_time TEXT,
    wave TEXT,
    zodiac TEXT,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    UNIQUE(lottery_type, expect)
);
CREATE TABLE IF NOT EXISTS predictions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    lottery_type TEXT NOT NULL,
    target_expect TEXT NOT NULL,
    prediction_numbers TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE(lottery_type, target_expect)
);
";

pub fn open_database(path: &str) -> Result<Connection> {
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                Some(format!("Failed to create {}: {}", parent.display(), e)),
            )
        })?;
    }

    let conn = Connection::open(path)?;
    create_tables(&conn)?;
    Ok(conn)
}

pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLES)
}

/// Drops and recreates both tables.
pub fn reset_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "DROP TABLE IF EXISTS lottery_records;
         DROP TABLE IF EXISTS predictions;",
    )?;
    create_tables(conn)
}

/// Inserts draws, ignoring ones already stored, and returns how many were new.
pub fn insert_records(conn: &Connection, records: &[DrawRecord]) -> Result<usize> {
    let mut inserted = 0;
    for chunk in records.chunks(INSERT_CHUNK_SIZE) {
        let tx = conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR IGNORE INTO lottery_records (
                    lottery_type, expect, open_code, open_time, wave, zodiac
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for record in chunk {
                inserted += stmt.execute(params![
                    record.lottery_type.as_str(),
                    &record.expect,
                    record.open_code(),
                    &record.open_time,
                    &record.wave,
                    &record.zodiac,
                ])?;
            }
        }
        tx.commit()?;
    }
    Ok(inserted)
}

fn read_record(row: &Row, lottery_type: LotteryType) -> Result<Option<DrawRecord>> {
    let expect: String = row.get(0)?;
    let open_code: String = row.get(1)?;
    let Some(numbers) = parse_open_code(&open_code) else {
        tracing::warn!(
            "Skipping {} draw {} with malformed open code {:?}",
            lottery_type,
            expect,
            open_code
        );
        return Ok(None);
    };

    Ok(Some(DrawRecord {
        lottery_type,
        expect,
        numbers,
        open_time: row.get(2)?,
        wave: row.get(3)?,
        zodiac: row.get(4)?,
    }))
}

/// Most recent draws first, ordered numerically by sequence id.
pub fn get_recent_records(
    conn: &Connection,
    lottery_type: LotteryType,
    limit: usize,
) -> Result<Vec<DrawRecord>> {
    let mut stmt = conn.prepare(
        "SELECT expect, open_code, open_time, wave, zodiac
         FROM lottery_records
         WHERE lottery_type = ?1
         ORDER BY CAST(expect AS INTEGER) DESC
         LIMIT ?2",
    )?;
    let record_iter = stmt.query_map(params![lottery_type.as_str(), limit as i64], |row| {
        read_record(row, lottery_type)
    })?;

    let mut results = Vec::new();
    for record in record_iter {
        if let Some(record) = record? {
            results.push(record);
        }
    }
    Ok(results)
}

pub fn get_latest_record(conn: &Connection, lottery_type: LotteryType) -> Result<Option<DrawRecord>> {
    Ok(get_recent_records(conn, lottery_type, 1)?.into_iter().next())
}

pub fn get_record(
    conn: &Connection,
    lottery_type: LotteryType,
    expect: &str,
) -> Result<Option<DrawRecord>> {
    let mut stmt = conn.prepare(
        "SELECT expect, open_code, open_time, wave, zodiac
         FROM lottery_records
         WHERE lottery_type = ?1 AND expect = ?2",
    )?;
    let record = stmt
        .query_row(params![lottery_type.as_str(), expect], |row| {
            read_record(row, lottery_type)
        })
        .optional()?;
    Ok(record.flatten())
}

pub fn count_records(conn: &Connection, lottery_type: LotteryType) -> Result<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM lottery_records WHERE lottery_type = ?1",
        [lottery_type.as_str()],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

pub fn delete_record(conn: &Connection, lottery_type: LotteryType, expect: &str) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM lottery_records WHERE lottery_type = ?1 AND expect = ?2",
        params![lottery_type.as_str(), expect],
    )?;
    Ok(deleted > 0)
}

/// Stores the prediction for a target draw, replacing any earlier one.
pub fn upsert_prediction(
    conn: &Connection,
    lottery_type: LotteryType,
    target_expect: &str,
    prediction: &PredictionData,
) -> Result<()> {
    let payload = serde_json::to_string(prediction)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

    conn.execute(
        "INSERT INTO predictions (lottery_type, target_expect, prediction_numbers, created_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(lottery_type, target_expect) DO UPDATE SET
            prediction_numbers = excluded.prediction_numbers,
            created_at = excluded.created_at",
        params![
            lottery_type.as_str(),
            target_expect,
            payload,
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn read_prediction(row: &Row, lottery_type: LotteryType) -> Result<Option<PredictionRecord>> {
    let target_expect: String = row.get(0)?;
    let payload: String = row.get(1)?;
    let payload = match serde_json::from_str::<PredictionData>(&payload) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(
                "Skipping unreadable {} prediction for {}: {}",
                lottery_type,
                target_expect,
                e
            );
            return Ok(None);
        }
    };

    Ok(Some(PredictionRecord {
        lottery_type,
        target_expect,
        payload,
        created_at: row.get(2)?,
    }))
}

pub fn get_prediction(
    conn: &Connection,
    lottery_type: LotteryType,
    target_expect: &str,
) -> Result<Option<PredictionRecord>> {
    let mut stmt = conn.prepare(
        "SELECT target_expect, prediction_numbers, created_at
         FROM predictions
         WHERE lottery_type = ?1 AND target_expect = ?2",
    )?;
    let prediction = stmt
        .query_row(params![lottery_type.as_str(), target_expect], |row| {
            read_prediction(row, lottery_type)
        })
        .optional()?;
    Ok(prediction.flatten())
}

pub fn get_recent_predictions(
    conn: &Connection,
    lottery_type: LotteryType,
    limit: usize,
) -> Result<Vec<PredictionRecord>> {
    let mut stmt = conn.prepare(
        "SELECT target_expect, prediction_numbers, created_at
         FROM predictions
         WHERE lottery_type = ?1
         ORDER BY CAST(target_expect AS INTEGER) DESC
         LIMIT ?2",
    )?;
    let prediction_iter = stmt.query_map(params![lottery_type.as_str(), limit as i64], |row| {
        read_prediction(row, lottery_type)
    })?;

    let mut results = Vec::new();
    for prediction in prediction_iter {
        if let Some(prediction) = prediction? {
            results.push(prediction);
        }
    }
    Ok(results)
}
