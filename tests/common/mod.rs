#![allow(dead_code)]

use lotto_six::config::Config;
use lotto_six::database::{create_tables, insert_records};
use lotto_six::types::{DrawRecord, LotteryType};
use lotto_six::{LotteryService, SharedConnection};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::sync::Arc;

pub fn setup_test_db() -> SharedConnection {
    let conn = Connection::open_in_memory().expect("Failed to open in-memory DB");
    create_tables(&conn).expect("Failed to create tables");
    Arc::new(Mutex::new(conn))
}

pub fn setup_service(config: Config) -> LotteryService {
    LotteryService::new(setup_test_db(), config)
}

/// `len` consecutive draws, newest first, ending at expect 2025100.
pub fn sample_draws(lottery_type: LotteryType, len: usize) -> Vec<DrawRecord> {
    (0..len)
        .map(|i| {
            let special = (i * 5 % 49) as u8 + 1;
            let mut numbers = [0u8; 7];
            for (j, slot) in numbers.iter_mut().take(6).enumerate() {
                *slot = ((special as usize + 6 * (j + 1)) % 49) as u8 + 1;
            }
            numbers[6] = special;
            DrawRecord {
                lottery_type,
                expect: format!("{}", 2025100 - i),
                numbers,
                open_time: Some(format!("2025-04-{:02} 21:30:00", 30 - i % 30)),
                wave: None,
                zodiac: None,
            }
        })
        .collect()
}

pub fn seed(db: &SharedConnection, draws: &[DrawRecord]) {
    insert_records(&db.lock(), draws).expect("Failed to seed draws");
}
