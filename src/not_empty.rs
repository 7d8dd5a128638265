//! Non-empty collection check

use std::borrow::Cow;

use serde_json::Value;

use crate::error::ConfigError;
use crate::rule::{render_template, shape_of, Rule};

const DEFAULT_MESSAGE: &str = "The field {0} must not be empty.";

/// Rule requiring a collection to hold at least one element.
///
/// Sequences and objects are collections. `null` is accepted; any other
/// shape, strings included, is a [`ConfigError::UnexpectedShape`].
///
/// # Example
///
/// ```rust
/// use fieldrules::{NotEmpty, Rule};
/// use serde_json::json;
///
/// let rule = NotEmpty::new();
/// assert!(rule.is_valid(&json!(["a"])).unwrap());
/// assert!(rule.is_valid(&json!({"k": 1})).unwrap());
/// assert!(!rule.is_valid(&json!([])).unwrap());
/// assert!(rule.is_valid(&json!(null)).unwrap());
/// assert!(rule.is_valid(&json!("text")).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct NotEmpty {
    message: Cow<'static, str>,
}

impl NotEmpty {
    /// Create the rule with the default message.
    pub fn new() -> Self {
        NotEmpty {
            message: Cow::Borrowed(DEFAULT_MESSAGE),
        }
    }

    /// Replace the error message template. `{0}` is the field name.
    pub fn with_message(mut self, template: impl Into<Cow<'static, str>>) -> Self {
        self.message = template.into();
        self
    }
}

impl Default for NotEmpty {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for NotEmpty {
    fn name(&self) -> &'static str {
        "NotEmpty"
    }

    fn is_valid(&self, value: &Value) -> Result<bool, ConfigError> {
        match value {
            Value::Null => Ok(true),
            Value::Array(items) => Ok(!items.is_empty()),
            Value::Object(map) => Ok(!map.is_empty()),
            other => Err(ConfigError::UnexpectedShape {
                rule: self.name(),
                expected: "a collection",
                found: shape_of(other),
            }),
        }
    }

    fn format_error_message(&self, field: &str) -> Result<String, ConfigError> {
        render_template(&self.message, &[&field])
    }
}
