//! The invocation contract shared by every rule
//!
//! A validation driver extracts a value from a field, hands it to a [`Rule`]
//! and reads back a boolean, or asks the rule for a user-facing message.
//! Candidates are dynamic [`Value`]s; `Value::Null` stands for an absent
//! value, which every rule in this crate accepts.
//!
//! # Example
//!
//! ```rust
//! use fieldrules::{validate_field, ListRange, NotEmpty, Rule};
//! use serde_json::json;
//!
//! let range = ListRange::integer(1, 10);
//! let not_empty = NotEmpty::new();
//! let rules: [&dyn Rule; 2] = [&range, &not_empty];
//!
//! let violations = validate_field(&json!([0, 5, 11]), "scores", &rules).unwrap();
//! assert_eq!(violations.len(), 1);
//! assert_eq!(
//!     violations[0].message(),
//!     "The field scores must only contain values between 1 and 10."
//! );
//! ```

use std::fmt::{self, Display, Write as _};

use serde_json::Value;

use crate::error::{ConfigError, Violation};

/// A validation rule over a dynamic candidate value.
///
/// `is_valid` answers whether the data satisfies the rule. Misuse of the rule
/// (wrong candidate shape, broken configuration) is reported through
/// [`ConfigError`] and is never folded into `Ok(false)`.
pub trait Rule: Send + Sync {
    /// Short name used in configuration errors.
    fn name(&self) -> &'static str;

    /// Check a candidate value.
    fn is_valid(&self, value: &Value) -> Result<bool, ConfigError>;

    /// Render the user-facing message for a failed check on `field`.
    fn format_error_message(&self, field: &str) -> Result<String, ConfigError>;

    /// Check a candidate and produce a [`Violation`] when it fails.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fieldrules::{ListRange, Rule};
    /// use serde_json::json;
    ///
    /// let rule = ListRange::double(0.0, 1.0);
    /// assert!(rule.check(&json!([0.5]), "ratios").unwrap().is_none());
    ///
    /// let violation = rule.check(&json!([1.5]), "ratios").unwrap().unwrap();
    /// assert_eq!(violation.field(), "ratios");
    /// ```
    fn check(&self, value: &Value, field: &str) -> Result<Option<Violation>, ConfigError> {
        if self.is_valid(value)? {
            Ok(None)
        } else {
            let message = self.format_error_message(field)?;
            Ok(Some(Violation::new(field, message)))
        }
    }
}

/// Run every rule against one field value and collect all violations.
///
/// Rules are not short-circuited: a field failing two rules yields two
/// violations, in rule order. The first configuration error aborts.
pub fn validate_field(
    value: &Value,
    field: &str,
    rules: &[&dyn Rule],
) -> Result<Vec<Violation>, ConfigError> {
    let mut violations = Vec::new();
    for rule in rules {
        if let Some(violation) = rule.check(value, field)? {
            violations.push(violation);
        }
    }
    Ok(violations)
}

/// Describe the shape of a value for configuration errors.
pub(crate) fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "an object",
    }
}

/// Render a message template with positional `{N}` placeholders.
///
/// `{{` and `}}` produce literal braces. Referencing a placeholder beyond
/// `args`, an empty or non-numeric placeholder, or an unbalanced brace is a
/// [`ConfigError::MessageTemplate`].
pub(crate) fn render_template(
    template: &str,
    args: &[&dyn Display],
) -> Result<String, ConfigError> {
    let fail = |reason: String| ConfigError::MessageTemplate {
        template: template.to_string(),
        reason,
    };

    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut index = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(d) => index.push(d),
                        None => return Err(fail("unclosed placeholder".to_string())),
                    }
                }
                let position: usize = index
                    .trim()
                    .parse()
                    .map_err(|_| fail(format!("placeholder {{{}}} is not a position", index)))?;
                let arg = args.get(position).ok_or_else(|| {
                    fail(format!(
                        "placeholder {{{}}} exceeds the {} available argument(s)",
                        position,
                        args.len()
                    ))
                })?;
                write!(out, "{}", arg).map_err(|e: fmt::Error| fail(e.to_string()))?;
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(fail("unmatched '}'".to_string())),
            c => out.push(c),
        }
    }
    Ok(out)
}
