use anyhow::{Result, anyhow};
use lotto_six::LotteryService;
use lotto_six::types::LotteryType;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

const DEFAULT_LIST_LIMIT: usize = 10;

fn lottery_type(arguments: &HashMap<String, Value>) -> Result<LotteryType> {
    let value = arguments
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("Missing type parameter"))?;
    Ok(value.parse()?)
}

/// Draw numbers arrive either as strings or as bare integers.
fn expect(arguments: &HashMap<String, Value>) -> Option<String> {
    match arguments.get("expect")? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn required_expect(arguments: &HashMap<String, Value>) -> Result<String> {
    expect(arguments).ok_or_else(|| anyhow!("Missing expect parameter"))
}

pub struct LotteryUseCase {
    service: Arc<LotteryService>,
}

impl LotteryUseCase {
    pub fn new(service: Arc<LotteryService>) -> Self {
        Self { service }
    }

    pub async fn generate_prediction(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        let lottery_type = lottery_type(arguments)?;
        let record = self.service.predict(lottery_type)?;

        Ok(json!({
            "success": true,
            "prediction": record
        })
        .to_string())
    }

    pub async fn list_draws(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        let lottery_type = lottery_type(arguments)?;
        let limit = arguments
            .get("limit")
            .and_then(|v| v.as_u64())
            .map(|l| l as usize)
            .unwrap_or(DEFAULT_LIST_LIMIT);

        let results = self.service.list(lottery_type, limit)?;

        Ok(json!({
            "success": true,
            "results": results
        })
        .to_string())
    }

    pub async fn delete_draw(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        let lottery_type = lottery_type(arguments)?;
        let expect = required_expect(arguments)?;

        let deleted = self.service.delete(lottery_type, &expect)?;
        let message = if deleted {
            format!("Deleted {} draw {}", lottery_type, expect)
        } else {
            format!("No {} draw {}", lottery_type, expect)
        };

        Ok(json!({
            "success": deleted,
            "message": message
        })
        .to_string())
    }

    /// Without `expect`, returns the prediction for the upcoming draw.
    pub async fn get_prediction(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        let lottery_type = lottery_type(arguments)?;
        let prediction = match expect(arguments) {
            Some(expect) => self.service.prediction(lottery_type, &expect)?,
            None => self.service.dashboard(lottery_type)?.latest_prediction,
        };

        Ok(json!({
            "success": prediction.is_some(),
            "prediction": prediction
        })
        .to_string())
    }

    pub async fn verify_prediction(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        let lottery_type = lottery_type(arguments)?;
        let expect = required_expect(arguments)?;

        let verification = self.service.verify(lottery_type, &expect)?;

        Ok(json!({
            "success": true,
            "verification": verification
        })
        .to_string())
    }

    pub async fn reset_database(&self, _arguments: &HashMap<String, Value>) -> Result<String> {
        self.service.reset_schema()?;

        Ok(json!({
            "success": true,
            "message": "Database tables dropped and recreated"
        })
        .to_string())
    }
}

pub struct SyncUseCase {
    service: Arc<LotteryService>,
}

impl SyncUseCase {
    pub fn new(service: Arc<LotteryService>) -> Self {
        Self { service }
    }

    pub async fn sync_draws(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        let lottery_type = lottery_type(arguments)?;
        let outcome = self.service.sync(lottery_type).await?;

        Ok(json!({
            "success": true,
            "outcome": outcome,
            "message": format!(
                "{}: {} new draws, {} stored",
                lottery_type, outcome.inserted, outcome.total
            )
        })
        .to_string())
    }
}
