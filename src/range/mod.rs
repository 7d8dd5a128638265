//! Inclusive range checks over every element of a sequence
//!
//! [`ListRange`] accepts a sequence when each element lies within
//! `[minimum, maximum]`. Bounds are declared in one of three typing modes
//! (see [`RangeSpec`]):
//!
//! - native `i32` bounds, elements coerced to `i32`,
//! - native `f64` bounds, elements coerced to `f64`,
//! - bounds given as strings and parsed into an [`OperandType`], elements
//!   passed through or parsed into the same type.
//!
//! Setup (parsing the bounds, checking their order, picking the conversion)
//! happens on first use and is cached for the lifetime of the rule. A failed
//! setup is cached too, so a misconfigured rule keeps failing the same way.
//!
//! # Example
//!
//! ```rust
//! use fieldrules::{ListRange, OperandType, Rule};
//! use serde_json::json;
//!
//! let percentages = ListRange::integer(0, 100);
//! assert!(percentages.is_valid(&json!([0, 50, 100])).unwrap());
//! assert!(!percentages.is_valid(&json!([0, 101])).unwrap());
//!
//! let prices = ListRange::parsed(OperandType::Decimal, "0.01", "999.99");
//! assert!(prices.is_valid(&json!(["19.99", 5, ""])).unwrap());
//! assert!(!prices.is_valid(&json!(["free"])).unwrap());
//! ```

mod operand;

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde_json::Value;

use crate::error::ConfigError;
use crate::rule::{render_template, shape_of, Rule};

use operand::Conversion;
pub use operand::{CustomType, CustomValue, Operand, OperandType};

const DEFAULT_MESSAGE: &str = "The field {0} must only contain values between {1} and {2}.";

/// Declared bounds of a range rule, one variant per typing mode.
///
/// With the `serde` feature this is the configuration-file form of a range
/// rule, tagged by `mode`:
///
/// ```json
/// { "mode": "parsed", "operand": "decimal", "min": "0", "max": "500" }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "mode", rename_all = "snake_case"))]
pub enum RangeSpec {
    /// Native integer bounds.
    Integer {
        /// Inclusive lower bound.
        min: i32,
        /// Inclusive upper bound.
        max: i32,
    },
    /// Native floating-point bounds.
    Double {
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },
    /// Bounds given as text and parsed into `operand`.
    Parsed {
        /// Type the bounds and elements are compared in.
        operand: OperandType,
        /// Inclusive lower bound, as text.
        min: String,
        /// Inclusive upper bound, as text.
        max: String,
    },
}

impl RangeSpec {
    /// The type bounds and elements are compared in.
    pub fn operand_type(&self) -> OperandType {
        match self {
            RangeSpec::Integer { .. } => OperandType::Int32,
            RangeSpec::Double { .. } => OperandType::Double,
            RangeSpec::Parsed { operand, .. } => *operand,
        }
    }

    fn setup(&self) -> Result<Setup, ConfigError> {
        let (min, max, conversion) = match self {
            RangeSpec::Integer { min, max } => {
                (Operand::Int32(*min), Operand::Int32(*max), Conversion::Integer)
            }
            RangeSpec::Double { min, max } => {
                (Operand::Double(*min), Operand::Double(*max), Conversion::Double)
            }
            RangeSpec::Parsed { operand, min, max } => (
                parse_bound(*operand, min)?,
                parse_bound(*operand, max)?,
                Conversion::Parse(*operand),
            ),
        };

        match min.partial_cmp(&max) {
            Some(Ordering::Greater) => Err(ConfigError::MinExceedsMax {
                min: min.to_string(),
                max: max.to_string(),
            }),
            None => Err(ConfigError::UnorderedBounds {
                min: min.to_string(),
                max: max.to_string(),
            }),
            Some(_) => Ok(Setup {
                min,
                max,
                conversion,
            }),
        }
    }
}

fn parse_bound(operand: OperandType, text: &str) -> Result<Operand, ConfigError> {
    operand
        .parse(text)
        .map_err(|reason| ConfigError::InvalidBound {
            operand,
            text: text.to_string(),
            reason,
        })
}

/// Bounds and conversion fixed by a successful setup.
#[derive(Debug, Clone)]
struct Setup {
    min: Operand,
    max: Operand,
    conversion: Conversion,
}

impl Setup {
    fn contains(&self, value: &Operand) -> bool {
        self.min <= *value && *value <= self.max
    }
}

/// Rule requiring every element of a sequence to lie within inclusive bounds.
///
/// - `null` is accepted; requiring a value is a separate concern.
/// - Empty string elements are skipped.
/// - Elements that cannot be converted to the operand type make the sequence
///   invalid; they are not errors.
/// - Anything other than a sequence is a [`ConfigError::UnexpectedShape`].
///
/// # Example
///
/// ```rust
/// use fieldrules::{ConfigError, ListRange, Rule};
/// use serde_json::json;
///
/// let rule = ListRange::double(0.0, 1.0);
/// assert!(rule.is_valid(&json!(null)).unwrap());
/// assert!(rule.is_valid(&json!([0.25, "0.75", ""])).unwrap());
/// assert!(!rule.is_valid(&json!([0.25, "lots"])).unwrap());
///
/// let err = rule.is_valid(&json!(0.5)).unwrap_err();
/// assert!(matches!(err, ConfigError::UnexpectedShape { .. }));
/// ```
#[derive(Debug, Clone)]
pub struct ListRange {
    spec: RangeSpec,
    message: Cow<'static, str>,
    setup: OnceLock<Result<Setup, ConfigError>>,
}

impl ListRange {
    /// Create a rule from declared bounds.
    pub fn new(spec: RangeSpec) -> Self {
        ListRange {
            spec,
            message: Cow::Borrowed(DEFAULT_MESSAGE),
            setup: OnceLock::new(),
        }
    }

    /// Bounds given as native integers.
    pub fn integer(min: i32, max: i32) -> Self {
        Self::new(RangeSpec::Integer { min, max })
    }

    /// Bounds given as native floats.
    pub fn double(min: f64, max: f64) -> Self {
        Self::new(RangeSpec::Double { min, max })
    }

    /// Bounds given as text, parsed into `operand` on first use.
    pub fn parsed(operand: OperandType, min: impl Into<String>, max: impl Into<String>) -> Self {
        Self::new(RangeSpec::Parsed {
            operand,
            min: min.into(),
            max: max.into(),
        })
    }

    /// Bounds given as text, parsed into a caller-supplied ordered type.
    ///
    /// Shorthand for `ListRange::parsed(OperandType::custom::<T>(), min, max)`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use fieldrules::{ListRange, Rule};
    /// use serde_json::json;
    ///
    /// let rule = ListRange::parsed_as::<NaiveDate>("2000-01-01", "2030-12-31");
    /// assert!(rule.is_valid(&json!(["2012-06-30", ""])).unwrap());
    /// assert!(!rule.is_valid(&json!(["1999-12-31"])).unwrap());
    /// assert!(!rule.is_valid(&json!(["yesterday"])).unwrap());
    /// ```
    pub fn parsed_as<T>(min: impl Into<String>, max: impl Into<String>) -> Self
    where
        T: FromStr + PartialOrd + fmt::Display + fmt::Debug + Send + Sync + 'static,
        T::Err: fmt::Display,
    {
        Self::parsed(OperandType::custom::<T>(), min, max)
    }

    /// Replace the error message template.
    ///
    /// `{0}` is the field name, `{1}` the minimum and `{2}` the maximum.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fieldrules::{ListRange, Rule};
    ///
    /// let rule = ListRange::integer(1, 5).with_message("{0}: {1}..={2}");
    /// assert_eq!(rule.format_error_message("stars").unwrap(), "stars: 1..=5");
    /// ```
    pub fn with_message(mut self, template: impl Into<Cow<'static, str>>) -> Self {
        self.message = template.into();
        self
    }

    /// The bounds as declared.
    pub fn spec(&self) -> &RangeSpec {
        &self.spec
    }

    /// The type bounds and elements are compared in.
    pub fn operand_type(&self) -> OperandType {
        self.spec.operand_type()
    }

    /// The inclusive lower bound. Runs setup if it has not run yet.
    pub fn minimum(&self) -> Result<&Operand, ConfigError> {
        self.ensure_setup().map(|setup| &setup.min)
    }

    /// The inclusive upper bound. Runs setup if it has not run yet.
    pub fn maximum(&self) -> Result<&Operand, ConfigError> {
        self.ensure_setup().map(|setup| &setup.max)
    }

    /// Check a sequence of dynamic elements.
    ///
    /// Consumes `items` lazily and stops at the first element that is out
    /// of range or cannot be converted.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fieldrules::ListRange;
    /// use serde_json::{json, Value};
    ///
    /// let rule = ListRange::integer(0, 9);
    /// let digits: Vec<Value> = (0..10).map(|d| json!(d)).collect();
    /// assert!(rule.is_valid_elements(&digits).unwrap());
    /// ```
    pub fn is_valid_elements<'a, I>(&self, items: I) -> Result<bool, ConfigError>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let setup = self.ensure_setup()?;

        for (_index, item) in items.into_iter().enumerate() {
            if matches!(item, Value::String(s) if s.is_empty()) {
                continue;
            }

            let Some(converted) = setup.conversion.convert(item) else {
                #[cfg(feature = "tracing")]
                tracing::trace!(index = _index, "range element is not convertible: {}", item);
                return Ok(false);
            };

            if !setup.contains(&converted) {
                #[cfg(feature = "tracing")]
                tracing::trace!(
                    index = _index,
                    "range element {} is outside [{}, {}]",
                    converted,
                    setup.min,
                    setup.max
                );
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn ensure_setup(&self) -> Result<&Setup, ConfigError> {
        self.setup
            .get_or_init(|| {
                let result = self.spec.setup();
                #[cfg(feature = "tracing")]
                match &result {
                    Ok(setup) => tracing::debug!(
                        operand = %self.spec.operand_type(),
                        "range rule set up with bounds [{}, {}]",
                        setup.min,
                        setup.max
                    ),
                    Err(err) => tracing::warn!("range rule is misconfigured: {}", err),
                }
                result
            })
            .as_ref()
            .map_err(Clone::clone)
    }
}

impl From<RangeSpec> for ListRange {
    fn from(spec: RangeSpec) -> Self {
        ListRange::new(spec)
    }
}

impl Rule for ListRange {
    fn name(&self) -> &'static str {
        "ListRange"
    }

    fn is_valid(&self, value: &Value) -> Result<bool, ConfigError> {
        self.ensure_setup()?;

        match value {
            Value::Null => Ok(true),
            Value::Array(items) => self.is_valid_elements(items),
            other => Err(ConfigError::UnexpectedShape {
                rule: self.name(),
                expected: "a sequence",
                found: shape_of(other),
            }),
        }
    }

    fn format_error_message(&self, field: &str) -> Result<String, ConfigError> {
        let setup = self.ensure_setup()?;
        render_template(&self.message, &[&field, &setup.min, &setup.max])
    }
}
