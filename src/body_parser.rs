//! Body-parser options carried on routes.
//!
//! The router does not parse bodies. It only carries the options object from
//! scope to route so the parser can pick it up at request time, which is why
//! the only validation here is "is it an object".

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Opaque body-parser configuration: a JSON object forwarded unexamined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyParserConfig(Map<String, Value>);

impl BodyParserConfig {
    pub fn new(options: Map<String, Value>) -> Self {
        Self(options)
    }

    /// Accepts `null` (no override) or an object; anything else is an error.
    pub fn from_value(
        component: &'static str,
        operation: &'static str,
        value: Value,
    ) -> Result<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::Object(map) => Ok(Some(Self(map))),
            _ => Err(Error::InvalidBodyParser { component, operation }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}
