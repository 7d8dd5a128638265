//! Error types for rule configuration and validation failures
//!
//! Two categories are kept apart on purpose:
//!
//! - [`ConfigError`] means the rule itself is set up wrong (bounds out of
//!   order, an unparsable bound, a candidate of the wrong shape). It is always
//!   returned as `Err` and never turned into "invalid data".
//! - [`Violation`] describes data that failed a correctly configured rule.
//!
//! # Examples
//!
//! ```
//! use fieldrules::{ConfigError, ListRange, Rule};
//! use serde_json::json;
//!
//! let rule = ListRange::integer(500, 0);
//! let err = rule.is_valid(&json!([])).unwrap_err();
//! assert!(matches!(err, ConfigError::MinExceedsMax { .. }));
//! assert_eq!(err.to_string(), "minimum (500) is greater than maximum (0)");
//! ```

use std::fmt;

use crate::range::OperandType;

/// A rule that cannot be evaluated because it was configured incorrectly.
///
/// `ConfigError` is `Clone` so that a rule which failed its one-time setup
/// can hand out the same error on every later call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The lower bound is greater than the upper bound.
    #[error("minimum ({min}) is greater than maximum ({max})")]
    MinExceedsMax {
        /// Rendered minimum.
        min: String,
        /// Rendered maximum.
        max: String,
    },

    /// The bounds have no ordering relative to each other (a NaN bound).
    #[error("bounds {min} and {max} cannot be ordered")]
    UnorderedBounds {
        /// Rendered minimum.
        min: String,
        /// Rendered maximum.
        max: String,
    },

    /// A bound declared as a string could not be parsed into the operand type.
    #[error("cannot parse bound {text:?} as {operand}: {reason}")]
    InvalidBound {
        /// The declared operand type.
        operand: OperandType,
        /// The bound text as declared.
        text: String,
        /// Parser message.
        reason: String,
    },

    /// The candidate handed to a rule does not have the shape the rule needs.
    #[error("{rule} requires {expected}, found {found}")]
    UnexpectedShape {
        /// Name of the rule that was misapplied.
        rule: &'static str,
        /// Shape the rule accepts.
        expected: &'static str,
        /// Shape that was supplied.
        found: &'static str,
    },

    /// An error message template could not be rendered.
    #[error("invalid message template {template:?}: {reason}")]
    MessageTemplate {
        /// The offending template.
        template: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// A value that failed a rule, with the rendered message for its field.
///
/// # Examples
///
/// ```
/// use fieldrules::{NotEmpty, Rule};
/// use serde_json::json;
///
/// let violation = NotEmpty::new()
///     .check(&json!([]), "tags")
///     .unwrap()
///     .expect("empty list is a violation");
///
/// assert_eq!(violation.field(), "tags");
/// assert_eq!(violation.to_string(), "The field tags must not be empty.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    field: String,
    message: String,
}

impl Violation {
    /// Create a violation for `field` with an already rendered message.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Violation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// The field the violation belongs to.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The rendered, user-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Violation {}
