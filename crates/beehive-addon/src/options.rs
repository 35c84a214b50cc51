//! Option parsing for host-supplied values.
//!
//! Host values arrive as `serde_json::Value`. Each parser checks shape and types before
//! any task is built and reports the first problem as
//! [`AddonError::InvalidArgument`].

use std::time::Duration;

use beehive_task::ResultFormat;
use serde_json::{Map, Value};

use crate::error::AddonError;

/// Options for `helloAsync` on the module and on `HelloObjectAsync`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HelloAsyncOptions {
    pub louder: bool,
    pub format: ResultFormat,
    /// Extra time the worker sleeps before computing
    pub sleep: Duration,
}

impl HelloAsyncOptions {
    pub fn parse(options: &Value) -> Result<Self, AddonError> {
        let options = expect_object(options, "first arg 'options' must be an object")?;
        Ok(Self {
            louder: optional_bool(options, "louder")?.unwrap_or(false),
            format: ResultFormat::from_buffer_flag(
                optional_bool(options, "buffer")?.unwrap_or(false),
            ),
            sleep: optional_millis(options, "sleep")?.unwrap_or(Duration::ZERO),
        })
    }
}

/// Options for `helloPromise`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromiseOptions {
    pub phrase: String,
    pub multiply: u32,
}

impl Default for PromiseOptions {
    fn default() -> Self {
        Self {
            phrase: "hello".to_string(),
            multiply: 1,
        }
    }
}

impl PromiseOptions {
    /// `None` and `null` mean "use the defaults".
    pub fn parse(options: Option<&Value>) -> Result<Self, AddonError> {
        let options = match options {
            None | Some(Value::Null) => return Ok(Self::default()),
            Some(value) => expect_object(value, "options must be an object")?,
        };

        let mut parsed = Self::default();
        if let Some(phrase) = options.get("phrase") {
            parsed.phrase = phrase
                .as_str()
                .ok_or_else(|| AddonError::invalid("options.phrase must be a string"))?
                .to_string();
        }
        if let Some(multiply) = options.get("multiply") {
            let number = multiply
                .as_f64()
                .ok_or_else(|| AddonError::invalid("options.multiply must be a number"))?
                .trunc();
            if number.is_nan() || number < 1.0 {
                return Err(AddonError::invalid("options.multiply must be 1 or greater"));
            }
            parsed.multiply = number.min(f64::from(u32::MAX)) as u32;
        }
        Ok(parsed)
    }
}

/// Options for `shout`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoutOptions {
    pub phrase: String,
    pub louder: bool,
}

impl ShoutOptions {
    pub fn parse(options: &Value) -> Result<Self, AddonError> {
        let options = expect_object(options, "first arg 'options' must be an object")?;
        let phrase = options
            .get("phrase")
            .and_then(Value::as_str)
            .ok_or_else(|| AddonError::invalid("option 'phrase' must be a string"))?
            .to_string();
        Ok(Self {
            phrase,
            louder: optional_bool(options, "louder")?.unwrap_or(false),
        })
    }
}

fn expect_object<'a>(
    value: &'a Value,
    message: &str,
) -> Result<&'a Map<String, Value>, AddonError> {
    value.as_object().ok_or_else(|| AddonError::invalid(message))
}

fn optional_bool(options: &Map<String, Value>, key: &str) -> Result<Option<bool>, AddonError> {
    match options.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_bool()
            .map(Some)
            .ok_or_else(|| AddonError::invalid(format!("option '{key}' must be a boolean"))),
    }
}

fn optional_millis(
    options: &Map<String, Value>,
    key: &str,
) -> Result<Option<Duration>, AddonError> {
    let Some(value) = options.get(key) else {
        return Ok(None);
    };
    if let Some(ms) = value.as_u64() {
        return Ok(Some(Duration::from_millis(ms)));
    }
    match value.as_f64() {
        Some(ms) if ms.is_finite() && ms >= 0.0 && ms.fract() == 0.0 => {
            Ok(Some(Duration::from_millis(ms.min(u64::MAX as f64) as u64)))
        }
        _ => Err(AddonError::invalid(format!(
            "option '{key}' must be a positive integer"
        ))),
    }
}
