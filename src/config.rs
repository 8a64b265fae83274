use anyhow::Result;
use std::env;

use crate::types::LotteryType;

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub telegram_token: Option<String>,
    pub admin_chat_id: Option<String>,
    pub url_hk: Option<String>,
    pub url_mo_new: Option<String>,
    pub url_mo_old: Option<String>,
}

impl Config {
    pub fn source_url(&self, lottery_type: LotteryType) -> Option<&str> {
        match lottery_type {
            LotteryType::Hk => self.url_hk.as_deref(),
            LotteryType::MoNew => self.url_mo_new.as_deref(),
            LotteryType::MoOld => self.url_mo_old.as_deref(),
        }
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Reads the environment, after loading `.env` when one exists.
pub fn load() -> Result<Config> {
    dotenvy::dotenv().ok();

    let database_url =
        env::var("LOTTERY_DB_PATH").unwrap_or_else(|_| "data/lottery.db".to_string());
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

    Ok(Config {
        database_url,
        bind_addr,
        telegram_token: optional("TELEGRAM_TOKEN"),
        admin_chat_id: optional("ADMIN_CHAT_ID"),
        url_hk: optional("URL_HK"),
        url_mo_new: optional("URL_MO_NEW"),
        url_mo_old: optional("URL_MO_OLD"),
    })
}
