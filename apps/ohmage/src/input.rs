//! JSON input files read by the CLI.
//!
//! - responses: `{"mood": 6, "smoker": true, "name": "Ann", "age": "SKIPPED"}`
//! - items: `[{"id": "mood", "kind": {"type": "number", "min": 0, "max": 10}}]`
//! - survey: `{"id": "daily", "items": [...]}`
//! - data points: `[{"id": "optional", "created_at": "optional", "body": {...}}]`

use crate::error::{AppError, Result};
use ohmage_core::primitives::{NOT_DISPLAYED_KEYWORD, SKIPPED_KEYWORD};
use ohmage_core::{ItemDefinition, ItemDefinitions, ItemId, Responses, Survey, Value};
use serde::Deserialize;
use std::path::Path;

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AppError::InvalidInput(format!("cannot read {}: {}", path.display(), e))
    })?;
    Ok(serde_json::from_str(&content)?)
}

/// Map a JSON response value. `null` means the item was skipped.
pub fn value_from_json(value: &serde_json::Value) -> Result<Value> {
    match value {
        serde_json::Value::Null => Ok(Value::Skipped),
        serde_json::Value::Bool(b) => Ok(Value::Boolean(*b)),
        serde_json::Value::Number(n) => n
            .as_f64()
            .map(Value::Number)
            .ok_or_else(|| AppError::InvalidInput(format!("unrepresentable number {}", n))),
        serde_json::Value::String(s) if s == SKIPPED_KEYWORD => Ok(Value::Skipped),
        serde_json::Value::String(s) if s == NOT_DISPLAYED_KEYWORD => Ok(Value::NotDisplayed),
        serde_json::Value::String(s) => Ok(Value::Text(s.clone())),
        other => Err(AppError::InvalidInput(format!(
            "responses must be scalars, got {}",
            other
        ))),
    }
}

/// Parse a responses object.
pub fn parse_responses(json: &serde_json::Value) -> Result<Responses> {
    let serde_json::Value::Object(map) = json else {
        return Err(AppError::InvalidInput(
            "responses must be a JSON object".to_string(),
        ));
    };
    let mut responses = Responses::new();
    for (key, value) in map {
        let id = ItemId::parse(key)
            .ok_or_else(|| AppError::InvalidInput(format!("invalid item id '{}'", key)))?;
        responses.insert(id, value_from_json(value)?);
    }
    Ok(responses)
}

pub fn load_responses(path: &Path) -> Result<Responses> {
    parse_responses(&read_json(path)?)
}

/// Load item definitions keyed by id.
pub fn load_items(path: &Path) -> Result<ItemDefinitions> {
    let list: Vec<ItemDefinition> = read_json(path)?;
    let mut items = ItemDefinitions::new();
    for item in list {
        if !ItemId::is_valid(item.id.as_str()) {
            return Err(AppError::InvalidInput(format!("invalid item id '{}'", item.id)));
        }
        if items.contains_key(&item.id) {
            return Err(AppError::InvalidInput(format!("duplicate item '{}'", item.id)));
        }
        items.insert(item.id.clone(), item);
    }
    Ok(items)
}

pub fn load_survey(path: &Path) -> Result<Survey> {
    read_json(path)
}

/// A data point as written by a producer.
#[derive(Debug, Clone, Deserialize)]
pub struct PointInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    pub body: serde_json::Value,
}

/// A data point with id and creation time filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPoint {
    pub id: String,
    pub created_at: String,
    pub payload: String,
}

impl PointInput {
    /// Assign a v4 UUID and the current time where missing.
    pub fn prepare(self) -> Result<PreparedPoint> {
        Ok(PreparedPoint {
            id: self.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            created_at: self
                .created_at
                .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
            payload: serde_json::to_string(&self.body)?,
        })
    }
}

pub fn load_points(path: &Path) -> Result<Vec<PreparedPoint>> {
    let inputs: Vec<PointInput> = read_json(path)?;
    inputs.into_iter().map(PointInput::prepare).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_json_scalars() {
        let responses = parse_responses(&json!({
            "mood": 6,
            "smoker": true,
            "name": "Ann",
            "age": "SKIPPED",
            "sleep": null,
            "walk": "NOT_DISPLAYED"
        }))
        .expect("valid responses");

        assert_eq!(responses[&ItemId::new("mood")], Value::Number(6.0));
        assert_eq!(responses[&ItemId::new("smoker")], Value::Boolean(true));
        assert_eq!(responses[&ItemId::new("name")], Value::Text("Ann".to_string()));
        assert_eq!(responses[&ItemId::new("age")], Value::Skipped);
        assert_eq!(responses[&ItemId::new("sleep")], Value::Skipped);
        assert_eq!(responses[&ItemId::new("walk")], Value::NotDisplayed);
    }

    #[test]
    fn rejects_nested_values_and_bad_ids() {
        assert!(parse_responses(&json!({"mood": [1]})).is_err());
        assert!(parse_responses(&json!({"1mood": 1})).is_err());
        assert!(parse_responses(&json!([1])).is_err());
    }

    #[test]
    fn prepare_fills_missing_fields() {
        let point = PointInput {
            id: None,
            created_at: None,
            body: json!({"step_count": 3}),
        }
        .prepare()
        .expect("prepare");

        assert!(uuid::Uuid::parse_str(&point.id).is_ok());
        assert!(chrono::DateTime::parse_from_rfc3339(&point.created_at).is_ok());
        assert_eq!(point.payload, r#"{"step_count":3}"#);

        let kept = PointInput {
            id: Some("p1".to_string()),
            created_at: Some("2024-05-01T10:00:00Z".to_string()),
            body: json!({}),
        }
        .prepare()
        .expect("prepare");
        assert_eq!(kept.id, "p1");
        assert_eq!(kept.created_at, "2024-05-01T10:00:00Z");
    }
}
