//! Feature Normalizer - raw payloads to the fixed schema.
//!
//! Legacy payloads may carry the five schema fields directly, or supply
//! `timestamp` / `category` / `merchant` / `type` from which the missing
//! fields are derived. `amount` has no fallback: its absence fails the
//! request immediately.

use chrono::{DateTime, Datelike, Timelike};
use serde_json::Value;

use crate::error::ValidationError;

use super::encoding::{category_code, MERCHANT_CATEGORY_MODULUS, TRANSACTION_TYPE_MODULUS};
use super::vector::TransactionFeatures;

/// Normalize a raw payload into [`TransactionFeatures`].
///
/// The input is never mutated. Derivation order:
/// 1. `amount` must be present (checked first, no fallback).
/// 2. `hour` / `day_of_week` filled from `timestamp` when absent; a
///    timestamp that fails to parse is ignored, leaving the fields for the
///    final presence check.
/// 3. `merchant_category` derived from `category`, then `merchant`, else
///    defaults to 0.
/// 4. `transaction_type` derived from `type`, else defaults to 0.
pub fn normalize(payload: &Value) -> Result<TransactionFeatures, ValidationError> {
    let obj = payload.as_object().ok_or(ValidationError::NotAnObject)?;

    let amount_raw = obj
        .get("amount")
        .ok_or_else(|| ValidationError::MissingFields(vec!["amount".to_string()]))?;

    let mut hour = obj.get("hour").cloned();
    let mut day_of_week = obj.get("day_of_week").cloned();
    let mut merchant_category = obj.get("merchant_category").cloned();
    let mut transaction_type = obj.get("transaction_type").cloned();

    if hour.is_none() || day_of_week.is_none() {
        if let Some(timestamp) = obj.get("timestamp").and_then(Value::as_str) {
            match DateTime::parse_from_rfc3339(timestamp) {
                Ok(parsed) => {
                    if hour.is_none() {
                        hour = Some(Value::from(i64::from(parsed.hour())));
                    }
                    if day_of_week.is_none() {
                        let day = parsed.weekday().num_days_from_monday();
                        day_of_week = Some(Value::from(i64::from(day)));
                    }
                }
                // Swallowed: the fields stay absent and are reported by the
                // presence check below, not as a parse error.
                Err(e) => log::debug!("ignoring unparseable timestamp {timestamp:?}: {e}"),
            }
        }
    }

    if merchant_category.is_none() {
        let code = match obj.get("category").or_else(|| obj.get("merchant")) {
            Some(source) => category_code(&text_of(source), MERCHANT_CATEGORY_MODULUS),
            None => 0,
        };
        merchant_category = Some(Value::from(code));
    }

    if transaction_type.is_none() {
        let code = match obj.get("type") {
            Some(source) => category_code(&text_of(source), TRANSACTION_TYPE_MODULUS),
            None => 0,
        };
        transaction_type = Some(Value::from(code));
    }

    let mut missing = Vec::new();
    if hour.is_none() {
        missing.push("hour".to_string());
    }
    if day_of_week.is_none() {
        missing.push("day_of_week".to_string());
    }

    match (hour, day_of_week, merchant_category, transaction_type) {
        (Some(hour), Some(day_of_week), Some(merchant_category), Some(transaction_type)) => {
            Ok(TransactionFeatures {
                amount: coerce_float("amount", amount_raw)?,
                hour: coerce_int("hour", &hour)?,
                day_of_week: coerce_int("day_of_week", &day_of_week)?,
                merchant_category: coerce_int("merchant_category", &merchant_category)?,
                transaction_type: coerce_int("transaction_type", &transaction_type)?,
            })
        }
        _ => Err(ValidationError::MissingFields(missing)),
    }
}

/// String form of a source value for hashing; strings as-is, everything
/// else via its JSON representation.
fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn coerce_float(field: &str, value: &Value) -> Result<f64, ValidationError> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| not_numeric(field, value)),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| not_numeric(field, value)),
        _ => Err(not_numeric(field, value)),
    }
}

fn coerce_int(field: &str, value: &Value) -> Result<i64, ValidationError> {
    match value {
        Value::Number(n) => n
            .as_i64()
            // JSON floats truncate toward zero, matching int(float).
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .ok_or_else(|| not_numeric(field, value)),
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| not_numeric(field, value)),
        _ => Err(not_numeric(field, value)),
    }
}

fn not_numeric(field: &str, value: &Value) -> ValidationError {
    ValidationError::NotNumeric {
        field: field.to_string(),
        value: value.to_string(),
    }
}
