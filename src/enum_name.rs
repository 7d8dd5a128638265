//! String-to-enum-name membership check
//!
//! Rust enums carry no runtime list of their variant names, so a type opts
//! in through [`EnumNames`]. The [`named_enum!`](crate::named_enum) macro
//! declares an enum and implements the trait in one go.
//!
//! # Example
//!
//! ```rust
//! use fieldrules::{named_enum, Rule, StringInEnum};
//! use serde_json::json;
//!
//! named_enum! {
//!     #[derive(Debug, Clone, Copy, PartialEq)]
//!     pub enum Channel { Email, Sms, Push }
//! }
//!
//! let rule = StringInEnum::of::<Channel>();
//! assert!(rule.is_valid(&json!("Sms")).unwrap());
//! assert!(!rule.is_valid(&json!("sms")).unwrap());
//! ```

use std::borrow::Cow;

use serde_json::Value;

use crate::error::ConfigError;
use crate::rule::{render_template, shape_of, Rule};

const DEFAULT_MESSAGE: &str = "The field {0} must be one of: {1}.";

/// An enumeration whose declared member names are known.
pub trait EnumNames {
    /// Member names in declaration order.
    const NAMES: &'static [&'static str];
}

/// Declare an enum of unit variants and implement [`EnumNames`] for it.
///
/// Attributes on the enum and on each variant are passed through.
///
/// ```rust
/// use fieldrules::{named_enum, EnumNames};
///
/// named_enum! {
///     /// Review state.
///     enum Status {
///         Draft,
///         #[allow(dead_code)]
///         Published,
///     }
/// }
///
/// assert_eq!(Status::NAMES, &["Draft", "Published"]);
/// ```
#[macro_export]
macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $crate::EnumNames for $name {
            const NAMES: &'static [&'static str] = &[$(stringify!($variant)),+];
        }
    };
}

/// Rule requiring a string to equal one of an enumeration's member names.
///
/// Matching is exact and case-sensitive: no trimming, no case folding, no
/// matching on discriminant values. `null` is accepted; a non-string
/// candidate is a [`ConfigError::UnexpectedShape`].
#[derive(Debug, Clone)]
pub struct StringInEnum {
    enum_name: &'static str,
    names: &'static [&'static str],
    message: Cow<'static, str>,
}

impl StringInEnum {
    /// Build the rule for an enum implementing [`EnumNames`].
    pub fn of<E: EnumNames>() -> Self {
        Self::from_names(std::any::type_name::<E>(), E::NAMES)
    }

    /// Build the rule from an explicit list of member names.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fieldrules::{Rule, StringInEnum};
    /// use serde_json::json;
    ///
    /// let rule = StringInEnum::from_names("Size", &["Small", "Large"]);
    /// assert!(rule.is_valid(&json!("Large")).unwrap());
    /// assert!(rule.is_valid(&json!(1)).is_err());
    /// ```
    pub fn from_names(enum_name: &'static str, names: &'static [&'static str]) -> Self {
        StringInEnum {
            enum_name,
            names,
            message: Cow::Borrowed(DEFAULT_MESSAGE),
        }
    }

    /// Replace the error message template.
    ///
    /// `{0}` is the field name, `{1}` the comma-separated member names.
    pub fn with_message(mut self, template: impl Into<Cow<'static, str>>) -> Self {
        self.message = template.into();
        self
    }

    /// Name of the target enumeration.
    pub fn enum_name(&self) -> &'static str {
        self.enum_name
    }

    /// Accepted member names, in declaration order.
    pub fn names(&self) -> &'static [&'static str] {
        self.names
    }
}

impl Rule for StringInEnum {
    fn name(&self) -> &'static str {
        "StringInEnum"
    }

    fn is_valid(&self, value: &Value) -> Result<bool, ConfigError> {
        match value {
            Value::Null => Ok(true),
            Value::String(s) => Ok(self.names.contains(&s.as_str())),
            other => Err(ConfigError::UnexpectedShape {
                rule: self.name(),
                expected: "a string",
                found: shape_of(other),
            }),
        }
    }

    fn format_error_message(&self, field: &str) -> Result<String, ConfigError> {
        let names = self.names.join(", ");
        render_template(&self.message, &[&field, &names])
    }
}
