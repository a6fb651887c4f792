//! Typed access to form and query parameters

use chrono::NaiveDate;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Parameter errors, reported to clients as bad requests
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("{key} value not provided")]
    Missing { key: String },

    #[error("{key} value '{value}' could not be parsed to {target}")]
    Unparsable {
        key: String,
        value: String,
        target: &'static str,
    },
}

/// Request parameters from a query string or urlencoded body
#[derive(Debug, Clone, Default)]
pub struct FormValues(HashMap<String, String>);

impl From<HashMap<String, String>> for FormValues {
    fn from(values: HashMap<String, String>) -> Self {
        Self(values)
    }
}

impl FormValues {
    fn raw(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn parse<T>(
        &self,
        key: &str,
        target: &'static str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<T, FormError> {
        let value = self.raw(key).ok_or_else(|| FormError::Missing {
            key: key.to_string(),
        })?;

        parse(value).ok_or_else(|| FormError::Unparsable {
            key: key.to_string(),
            value: value.to_string(),
            target,
        })
    }

    /// Required non-empty string
    pub fn string(&self, key: &str) -> Result<String, FormError> {
        self.parse(key, "string", |v| Some(v.to_string()))
    }

    /// Required civil date (`YYYY-MM-DD`)
    pub fn date(&self, key: &str) -> Result<NaiveDate, FormError> {
        self.parse(key, "date", |v| NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
    }

    /// Required integer
    pub fn int(&self, key: &str) -> Result<i64, FormError> {
        self.parse(key, "int", |v| v.parse().ok())
    }

    /// Optional boolean, `false` when absent
    pub fn flag(&self, key: &str) -> Result<bool, FormError> {
        if self.raw(key).is_none() {
            return Ok(false);
        }
        self.parse(key, "bool", parse_bool)
    }

    /// Optional timeout in milliseconds, capped at `max`
    pub fn timeout(&self, key: &str, max: Duration) -> Result<Option<Duration>, FormError> {
        if self.raw(key).is_none() {
            return Ok(None);
        }
        let ms = self.parse(key, "duration in milliseconds", |v| v.parse::<u64>().ok())?;
        Ok(Some(Duration::from_millis(ms).min(max)))
    }

    /// Optional value parsed with `FromStr`
    pub fn optional<T: std::str::FromStr>(
        &self,
        key: &str,
        target: &'static str,
    ) -> Result<Option<T>, FormError> {
        if self.raw(key).is_none() {
            return Ok(None);
        }
        self.parse(key, target, |v| v.parse().ok()).map(Some)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "t" | "yes" | "on" => Some(true),
        "false" | "0" | "f" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Capitalize the first letter of every word, lowercase the rest
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut word_start = true;

    for ch in s.chars() {
        if ch.is_alphanumeric() || ch == '\'' {
            if word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            word_start = false;
        } else {
            out.push(ch);
            word_start = true;
        }
    }

    out
}
