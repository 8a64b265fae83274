use anyhow::{Result, anyhow};
use parking_lot::Mutex;
use rand::Rng;
use rusqlite::Connection;
use serde::Serialize;
use std::sync::Arc;

use crate::api::{SyncError, sync_lottery};
use crate::config::Config;
use crate::database::{
    count_records, delete_record, get_latest_record, get_prediction, get_record,
    get_recent_predictions, get_recent_records, reset_tables, upsert_prediction,
};
use crate::notify::Notifier;
use crate::prediction::{HISTORY_WINDOW, Predictor};
use crate::types::{DrawRecord, LotteryType, PredictionRecord};
use crate::utils::next_expect;
use crate::verify::{Verification, verify};

pub const DASHBOARD_HISTORY: usize = 50;
pub const DASHBOARD_PREDICTIONS: usize = 20;

pub type SharedConnection = Arc<Mutex<Connection>>;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub latest_record: Option<DrawRecord>,
    /// Prediction for the draw after the latest one.
    pub latest_prediction: Option<PredictionRecord>,
    /// Prediction that targeted the latest draw.
    pub last_prediction: Option<PredictionRecord>,
    pub last_verification: Option<Verification>,
    pub history: Vec<DrawRecord>,
    pub prediction_history: Vec<PredictionRecord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    pub lottery_type: LotteryType,
    pub inserted: usize,
    pub total: usize,
    pub prediction: Option<PredictionRecord>,
}

pub struct LotteryService {
    db: SharedConnection,
    client: reqwest::Client,
    config: Config,
    notifier: Notifier,
    predictor: Predictor,
}

impl LotteryService {
    pub fn new(db: SharedConnection, config: Config) -> Self {
        let client = reqwest::Client::new();
        let notifier = Notifier::new(
            client.clone(),
            config.telegram_token.clone(),
            config.admin_chat_id.clone(),
        );
        Self {
            db,
            client,
            config,
            notifier,
            predictor: Predictor::default(),
        }
    }

    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn connection(&self) -> &SharedConnection {
        &self.db
    }

    /// Pulls the configured feed; when new draws arrive the next prediction is regenerated.
    pub async fn sync(&self, lottery_type: LotteryType) -> Result<SyncOutcome> {
        let url = self
            .config
            .source_url(lottery_type)
            .ok_or(SyncError::MissingSource(lottery_type))?;

        let inserted = match sync_lottery(&self.db, &self.client, url, lottery_type).await {
            Ok(inserted) => inserted,
            Err(e) => {
                tracing::error!("Sync of {} failed: {}", lottery_type, e);
                self.notifier
                    .notify(format!("⚠️ {} sync failed: {}", lottery_type, e));
                return Err(e.into());
            }
        };

        let prediction = if inserted > 0 {
            Some(self.predict(lottery_type)?)
        } else {
            None
        };
        let total = count_records(&self.db.lock(), lottery_type)?;

        Ok(SyncOutcome {
            lottery_type,
            inserted,
            total,
            prediction,
        })
    }

    pub fn predict(&self, lottery_type: LotteryType) -> Result<PredictionRecord> {
        self.predict_with(lottery_type, &mut rand::rng())
    }

    /// Generates and stores the prediction for the draw after the latest stored one.
    pub fn predict_with<R: Rng>(
        &self,
        lottery_type: LotteryType,
        rng: &mut R,
    ) -> Result<PredictionRecord> {
        let record = {
            let conn = self.db.lock();
            let history = get_recent_records(&conn, lottery_type, HISTORY_WINDOW)?;
            let latest = history
                .first()
                .ok_or_else(|| anyhow!("no {} draws stored yet", lottery_type))?;
            let target = next_expect(&latest.expect)
                .ok_or_else(|| anyhow!("cannot derive the draw after {}", latest.expect))?;

            let prediction = self.predictor.generate(&history, lottery_type, rng);
            upsert_prediction(&conn, lottery_type, &target, &prediction)?;
            get_prediction(&conn, lottery_type, &target)?
                .ok_or_else(|| anyhow!("prediction for {} was not stored", target))?
        };

        tracing::info!(
            "🎯 {} prediction for {}: {}",
            lottery_type,
            record.target_expect,
            record.payload.numbers.join(" ")
        );
        self.notifier.notify(format!(
            "🎯 {} {}\nNumbers: {}\nZodiacs: {}\nWave: {} / {}",
            lottery_type,
            record.target_expect,
            record.payload.numbers.join(" "),
            record
                .payload
                .zodiacs
                .iter()
                .map(|z| z.label())
                .collect::<Vec<_>>()
                .join(""),
            record.payload.wave.main,
            record.payload.wave.defense,
        ));
        Ok(record)
    }

    pub fn dashboard(&self, lottery_type: LotteryType) -> Result<DashboardData> {
        let conn = self.db.lock();
        let latest_record = get_latest_record(&conn, lottery_type)?;

        let (latest_prediction, last_prediction) = match &latest_record {
            Some(latest) => {
                let upcoming = match next_expect(&latest.expect) {
                    Some(target) => get_prediction(&conn, lottery_type, &target)?,
                    None => None,
                };
                (upcoming, get_prediction(&conn, lottery_type, &latest.expect)?)
            }
            None => (None, None),
        };

        let last_verification = match (&latest_record, &last_prediction) {
            (Some(actual), Some(prediction)) => Some(verify(actual, &prediction.payload)),
            _ => None,
        };

        Ok(DashboardData {
            history: get_recent_records(&conn, lottery_type, DASHBOARD_HISTORY)?,
            prediction_history: get_recent_predictions(&conn, lottery_type, DASHBOARD_PREDICTIONS)?,
            latest_record,
            latest_prediction,
            last_prediction,
            last_verification,
        })
    }

    pub fn list(&self, lottery_type: LotteryType, limit: usize) -> Result<Vec<DrawRecord>> {
        Ok(get_recent_records(&self.db.lock(), lottery_type, limit)?)
    }

    pub fn delete(&self, lottery_type: LotteryType, expect: &str) -> Result<bool> {
        let deleted = delete_record(&self.db.lock(), lottery_type, expect)?;
        if deleted {
            tracing::info!("Deleted {} draw {}", lottery_type, expect);
        }
        Ok(deleted)
    }

    pub fn prediction(
        &self,
        lottery_type: LotteryType,
        target_expect: &str,
    ) -> Result<Option<PredictionRecord>> {
        Ok(get_prediction(&self.db.lock(), lottery_type, target_expect)?)
    }

    pub fn verify(&self, lottery_type: LotteryType, expect: &str) -> Result<Verification> {
        let conn = self.db.lock();
        let actual = get_record(&conn, lottery_type, expect)?
            .ok_or_else(|| anyhow!("no {} draw {}", lottery_type, expect))?;
        let prediction = get_prediction(&conn, lottery_type, expect)?
            .ok_or_else(|| anyhow!("no {} prediction for {}", lottery_type, expect))?;
        Ok(verify(&actual, &prediction.payload))
    }

    pub fn reset_schema(&self) -> Result<()> {
        reset_tables(&self.db.lock())?;
        tracing::warn!("Dropped and recreated all tables");
        Ok(())
    }
}
