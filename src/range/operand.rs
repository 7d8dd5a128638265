//! Operand types and element conversion for range rules
//!
//! A range rule compares every element against bounds of one declared type.
//! [`OperandType`] is that declared type and [`Operand`] a typed value of it.
//! A conversion strategy, picked once per rule, turns each dynamic element
//! into an operand.
//!
//! Besides the built-in scalars, any ordered type that parses from text can
//! serve as an operand through [`OperandType::custom`].

use std::any::{Any, TypeId};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::{Number, Value};

/// The element type a range rule compares in.
///
/// Every member has a natural ordering. `Text` compares ordinally.
/// `Custom` types are only declared in code and never (de)serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OperandType {
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 64-bit unsigned integer.
    UInt64,
    /// 64-bit float.
    Double,
    /// 96-bit fixed-point decimal.
    Decimal,
    /// UTF-8 text.
    Text,
    /// A caller-supplied ordered type, see [`OperandType::custom`].
    #[cfg_attr(feature = "serde", serde(skip))]
    Custom(CustomType),
}

impl OperandType {
    /// Parse a bound or element string with this type's canonical parser.
    ///
    /// Numeric types tolerate surrounding whitespace. `Text` accepts any
    /// string verbatim.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fieldrules::{Operand, OperandType};
    /// use rust_decimal::Decimal;
    ///
    /// assert_eq!(
    ///     OperandType::Decimal.parse(" 2.50 "),
    ///     Ok(Operand::Decimal(Decimal::new(250, 2)))
    /// );
    /// assert!(OperandType::Int64.parse("2.5").is_err());
    /// ```
    pub fn parse(self, text: &str) -> Result<Operand, String> {
        match self {
            OperandType::Int32 => parse_trimmed(text).map(Operand::Int32),
            OperandType::Int64 => parse_trimmed(text).map(Operand::Int64),
            OperandType::UInt64 => parse_trimmed(text).map(Operand::UInt64),
            OperandType::Double => parse_trimmed(text).map(Operand::Double),
            OperandType::Decimal => parse_trimmed(text).map(Operand::Decimal),
            OperandType::Text => Ok(Operand::Text(text.to_string())),
            OperandType::Custom(custom) => (custom.parse)(text).map(Operand::Custom),
        }
    }

    /// Declare a caller-supplied operand type.
    ///
    /// Bounds and string elements are parsed with `T::from_str` after
    /// trimming; JSON numbers are parsed from their text form. Values compare
    /// with `T`'s own ordering.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use fieldrules::OperandType;
    ///
    /// let dates = OperandType::custom::<NaiveDate>();
    /// assert!(dates.parse("2024-02-29").is_ok());
    /// assert!(dates.parse("2023-02-29").is_err());
    /// ```
    pub fn custom<T>() -> Self
    where
        T: FromStr + PartialOrd + fmt::Display + fmt::Debug + Send + Sync + 'static,
        T::Err: fmt::Display,
    {
        OperandType::Custom(CustomType {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            parse: parse_custom::<T>,
        })
    }

    /// Convert a JSON number of this type without going through text.
    ///
    /// Returns `None` when the number is not representable, e.g. a fraction
    /// for an integer type or a number for `Text`.
    fn number_as(self, n: &Number) -> Option<Operand> {
        match self {
            OperandType::Int32 => n
                .as_i64()
                .and_then(|i| i32::try_from(i).ok())
                .map(Operand::Int32),
            OperandType::Int64 => n.as_i64().map(Operand::Int64),
            OperandType::UInt64 => n.as_u64().map(Operand::UInt64),
            OperandType::Double => n.as_f64().map(Operand::Double),
            OperandType::Decimal => number_to_decimal(n).map(Operand::Decimal),
            OperandType::Text => None,
            OperandType::Custom(custom) => {
                (custom.parse)(&n.to_string()).ok().map(Operand::Custom)
            }
        }
    }
}

impl fmt::Display for OperandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperandType::Int32 => "int32",
            OperandType::Int64 => "int64",
            OperandType::UInt64 => "uint64",
            OperandType::Double => "double",
            OperandType::Decimal => "decimal",
            OperandType::Text => "text",
            OperandType::Custom(custom) => custom.name,
        };
        f.write_str(name)
    }
}

fn parse_trimmed<T>(text: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    text.trim().parse().map_err(|e: T::Err| e.to_string())
}

/// Identity and parser of a caller-supplied operand type.
///
/// Two `CustomType`s are equal when they were declared for the same Rust
/// type.
#[derive(Clone, Copy)]
pub struct CustomType {
    type_id: TypeId,
    name: &'static str,
    parse: fn(&str) -> Result<CustomValue, String>,
}

impl CustomType {
    /// Rust type name of the operand.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for CustomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CustomType").field(&self.name).finish()
    }
}

impl PartialEq for CustomType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for CustomType {}

impl Hash for CustomType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

fn parse_custom<T>(text: &str) -> Result<CustomValue, String>
where
    T: FromStr + PartialOrd + fmt::Display + fmt::Debug + Send + Sync + 'static,
    T::Err: fmt::Display,
{
    parse_trimmed::<T>(text).map(CustomValue::new)
}

trait DynOperand: fmt::Debug + fmt::Display + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn operand_type(&self) -> OperandType;
    fn partial_cmp_dyn(&self, other: &dyn DynOperand) -> Option<Ordering>;
}

impl<T> DynOperand for T
where
    T: FromStr + PartialOrd + fmt::Display + fmt::Debug + Send + Sync + 'static,
    T::Err: fmt::Display,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn operand_type(&self) -> OperandType {
        OperandType::custom::<T>()
    }

    fn partial_cmp_dyn(&self, other: &dyn DynOperand) -> Option<Ordering> {
        other
            .as_any()
            .downcast_ref::<T>()
            .and_then(|other| self.partial_cmp(other))
    }
}

/// A value of a caller-supplied operand type.
///
/// Values of different custom types are unordered.
#[derive(Clone)]
pub struct CustomValue(Arc<dyn DynOperand>);

impl CustomValue {
    /// Wrap a value of an ordered type.
    pub fn new<T>(value: T) -> Self
    where
        T: FromStr + PartialOrd + fmt::Display + fmt::Debug + Send + Sync + 'static,
        T::Err: fmt::Display,
    {
        CustomValue(Arc::new(value))
    }

    /// The wrapped value, if it is a `T`.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref()
    }

    /// The operand type this value was declared with.
    pub fn operand_type(&self) -> OperandType {
        self.0.operand_type()
    }
}

impl fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for CustomValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp_dyn(&*other.0)
    }
}

fn number_to_decimal(n: &Number) -> Option<Decimal> {
    if let Some(i) = n.as_i64() {
        return Some(Decimal::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Some(Decimal::from(u));
    }
    // Floats go through their shortest text form so 0.1 stays 0.1.
    let text = n.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
        // Magnitudes beyond 28 decimal places round to what Decimal can hold.
        .or_else(|| n.as_f64().and_then(Decimal::from_f64))
}

/// A typed bound or converted element.
///
/// Operands of the same variant compare by their natural ordering. Operands
/// of different variants are unordered.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// 32-bit signed integer.
    Int32(i32),
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit unsigned integer.
    UInt64(u64),
    /// 64-bit float.
    Double(f64),
    /// Fixed-point decimal.
    Decimal(Decimal),
    /// Text, ordered ordinally.
    Text(String),
    /// Value of a caller-supplied type.
    Custom(CustomValue),
}

impl Operand {
    /// The type this operand belongs to.
    pub fn operand_type(&self) -> OperandType {
        match self {
            Operand::Int32(_) => OperandType::Int32,
            Operand::Int64(_) => OperandType::Int64,
            Operand::UInt64(_) => OperandType::UInt64,
            Operand::Double(_) => OperandType::Double,
            Operand::Decimal(_) => OperandType::Decimal,
            Operand::Text(_) => OperandType::Text,
            Operand::Custom(v) => v.operand_type(),
        }
    }
}

impl PartialOrd for Operand {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Operand::Int32(a), Operand::Int32(b)) => a.partial_cmp(b),
            (Operand::Int64(a), Operand::Int64(b)) => a.partial_cmp(b),
            (Operand::UInt64(a), Operand::UInt64(b)) => a.partial_cmp(b),
            (Operand::Double(a), Operand::Double(b)) => a.partial_cmp(b),
            (Operand::Decimal(a), Operand::Decimal(b)) => a.partial_cmp(b),
            (Operand::Text(a), Operand::Text(b)) => a.partial_cmp(b),
            (Operand::Custom(a), Operand::Custom(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Int32(v) => write!(f, "{}", v),
            Operand::Int64(v) => write!(f, "{}", v),
            Operand::UInt64(v) => write!(f, "{}", v),
            Operand::Double(v) => write!(f, "{}", v),
            Operand::Decimal(v) => write!(f, "{}", v),
            Operand::Text(v) => f.write_str(v),
            Operand::Custom(v) => write!(f, "{}", v),
        }
    }
}

/// How a dynamic element is turned into an operand.
///
/// Chosen once when a range rule is set up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Conversion {
    /// Coerce to `i32` with invariant numeric rules.
    Integer,
    /// Coerce to `f64` with invariant numeric rules.
    Double,
    /// Pass values of the operand type through, parse strings into it.
    /// `null` is not convertible.
    Parse(OperandType),
}

impl Conversion {
    /// Convert one element, `None` if it cannot be represented.
    pub(crate) fn convert(self, value: &Value) -> Option<Operand> {
        match self {
            Conversion::Integer => coerce_i32(value).map(Operand::Int32),
            Conversion::Double => coerce_f64(value).map(Operand::Double),
            Conversion::Parse(operand) => match value {
                Value::Number(n) => operand.number_as(n),
                Value::String(s) => operand.parse(s).ok(),
                _ => None,
            },
        }
    }
}

fn coerce_i32(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i32::try_from(i).ok()
            } else if let Some(u) = n.as_u64() {
                i32::try_from(u).ok()
            } else {
                n.as_f64().and_then(round_to_i32)
            }
        }
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i32::from(*b)),
        Value::Null => Some(0),
        _ => None,
    }
}

// Half-to-even, rejecting NaN and anything outside i32.
fn round_to_i32(f: f64) -> Option<i32> {
    let rounded = f.round_ties_even();
    if rounded >= f64::from(i32::MIN) && rounded <= f64::from(i32::MAX) {
        Some(rounded as i32)
    } else {
        None
    }
}

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => strip_group_separators(s.trim())?.parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        _ => None,
    }
}

// Group separators may only appear in the integral part, never first.
fn strip_group_separators(text: &str) -> Option<String> {
    let end = text.find(['.', 'e', 'E']).unwrap_or(text.len());
    let (integral, rest) = text.split_at(end);
    if rest.contains(',') || integral.trim_start_matches(['+', '-']).starts_with(',') {
        return None;
    }
    Some(format!("{}{}", integral.replace(',', ""), rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer_coercion() {
        let c = Conversion::Integer;
        assert_eq!(c.convert(&json!(42)), Some(Operand::Int32(42)));
        assert_eq!(c.convert(&json!(" -7 ")), Some(Operand::Int32(-7)));
        assert_eq!(c.convert(&json!(true)), Some(Operand::Int32(1)));
        assert_eq!(c.convert(&json!(false)), Some(Operand::Int32(0)));
        assert_eq!(c.convert(&json!(null)), Some(Operand::Int32(0)));
    }

    #[test]
    fn test_integer_coercion_rounds_half_to_even() {
        let c = Conversion::Integer;
        assert_eq!(c.convert(&json!(2.5)), Some(Operand::Int32(2)));
        assert_eq!(c.convert(&json!(3.5)), Some(Operand::Int32(4)));
        assert_eq!(c.convert(&json!(-0.4)), Some(Operand::Int32(0)));
    }

    #[test]
    fn test_integer_coercion_failures() {
        let c = Conversion::Integer;
        assert_eq!(c.convert(&json!(3_000_000_000_i64)), None);
        assert_eq!(c.convert(&json!(1e12)), None);
        assert_eq!(c.convert(&json!("1.5")), None);
        assert_eq!(c.convert(&json!("1,000")), None);
        assert_eq!(c.convert(&json!("   ")), None);
        assert_eq!(c.convert(&json!([1])), None);
        assert_eq!(c.convert(&json!({"a": 1})), None);
    }

    #[test]
    fn test_double_coercion() {
        let c = Conversion::Double;
        assert_eq!(c.convert(&json!(1.5)), Some(Operand::Double(1.5)));
        assert_eq!(c.convert(&json!(3)), Some(Operand::Double(3.0)));
        assert_eq!(c.convert(&json!("2.5e2")), Some(Operand::Double(250.0)));
        assert_eq!(c.convert(&json!("1,250.5")), Some(Operand::Double(1250.5)));
        assert_eq!(c.convert(&json!(true)), Some(Operand::Double(1.0)));
        assert_eq!(c.convert(&json!(null)), Some(Operand::Double(0.0)));
        assert_eq!(c.convert(&json!("abc")), None);
    }

    #[test]
    fn test_double_group_separators_only_in_integral_part() {
        let c = Conversion::Double;
        assert_eq!(c.convert(&json!("-1,000")), Some(Operand::Double(-1000.0)));
        assert_eq!(c.convert(&json!("1,000e2")), Some(Operand::Double(100_000.0)));
        assert_eq!(c.convert(&json!("1.5,0")), None);
        assert_eq!(c.convert(&json!("1e1,0")), None);
        assert_eq!(c.convert(&json!(",,4")), None);
        assert_eq!(c.convert(&json!("-,5")), None);
    }

    #[test]
    fn test_null_is_not_parsable() {
        for operand in [OperandType::Int32, OperandType::Decimal, OperandType::Text] {
            assert_eq!(Conversion::Parse(operand).convert(&json!(null)), None);
        }
    }

    #[test]
    fn test_double_coercion_nan() {
        match Conversion::Double.convert(&json!("NaN")) {
            Some(Operand::Double(v)) => assert!(v.is_nan()),
            other => panic!("expected NaN, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_conversion_numbers_pass_through() {
        let c = Conversion::Parse(OperandType::Decimal);
        assert_eq!(c.convert(&json!(250)), Some(Operand::Decimal(Decimal::from(250))));
        assert_eq!(
            c.convert(&json!(0.1)),
            Some(Operand::Decimal(Decimal::new(1, 1)))
        );
        assert_eq!(
            c.convert(&json!("12.75")),
            Some(Operand::Decimal(Decimal::new(1275, 2)))
        );
        assert_eq!(c.convert(&json!("twelve")), None);
        assert_eq!(c.convert(&json!(true)), None);
    }

    #[test]
    fn test_decimal_from_tiny_and_huge_floats() {
        let c = Conversion::Parse(OperandType::Decimal);
        assert!(matches!(
            c.convert(&json!(1e-300)),
            Some(Operand::Decimal(d)) if d.is_zero()
        ));
        assert_eq!(c.convert(&json!(1e300)), None);
    }

    #[test]
    fn test_parse_conversion_integer_types() {
        let c = Conversion::Parse(OperandType::Int64);
        assert_eq!(c.convert(&json!(-5)), Some(Operand::Int64(-5)));
        assert_eq!(c.convert(&json!(1.5)), None);

        let c = Conversion::Parse(OperandType::UInt64);
        assert_eq!(c.convert(&json!("18")), Some(Operand::UInt64(18)));
        assert_eq!(c.convert(&json!(-1)), None);

        let c = Conversion::Parse(OperandType::Int32);
        assert_eq!(c.convert(&json!(3_000_000_000_u64)), None);
    }

    #[test]
    fn test_parse_conversion_text() {
        let c = Conversion::Parse(OperandType::Text);
        assert_eq!(c.convert(&json!(" m ")), Some(Operand::Text(" m ".into())));
        assert_eq!(c.convert(&json!(5)), None);
    }

    #[test]
    fn test_operand_ordering() {
        assert!(Operand::Int32(1) < Operand::Int32(2));
        assert!(Operand::Text("apple".into()) < Operand::Text("banana".into()));
        assert_eq!(Operand::Int32(1).partial_cmp(&Operand::Int64(1)), None);
        assert_eq!(
            Operand::Double(f64::NAN).partial_cmp(&Operand::Double(0.0)),
            None
        );
    }

    #[test]
    fn test_operand_display() {
        assert_eq!(Operand::Double(500.0).to_string(), "500");
        assert_eq!(Operand::Decimal(Decimal::new(105, 1)).to_string(), "10.5");
        assert_eq!(Operand::Text("z".into()).to_string(), "z");
        assert_eq!(OperandType::UInt64.to_string(), "uint64");
    }

    #[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
    struct Version(u32, u32);

    impl FromStr for Version {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            let (major, minor) = s.split_once('.').ok_or("expected major.minor")?;
            let major = major.parse().map_err(|_| "bad major")?;
            let minor = minor.parse().map_err(|_| "bad minor")?;
            Ok(Version(major, minor))
        }
    }

    impl fmt::Display for Version {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}.{}", self.0, self.1)
        }
    }

    #[test]
    fn test_custom_operand_parse_and_order() {
        let versions = OperandType::custom::<Version>();
        let low = versions.parse(" 1.2 ").unwrap();
        let high = versions.parse("1.10").unwrap();
        assert!(low < high);
        assert_eq!(low.to_string(), "1.2");
        assert_eq!(low.operand_type(), versions);
        assert!(versions.parse("1").is_err());
    }

    #[test]
    fn test_custom_operand_conversion() {
        let versions = OperandType::custom::<Version>();
        let c = Conversion::Parse(versions);
        match c.convert(&json!("2.0")) {
            Some(Operand::Custom(v)) => {
                assert_eq!(v.downcast_ref::<Version>(), Some(&Version(2, 0)))
            }
            other => panic!("expected a version, got {:?}", other),
        }
        // Numbers go through their text form.
        assert!(c.convert(&json!(3.5)).is_some());
        assert_eq!(c.convert(&json!(true)), None);
        assert_eq!(c.convert(&json!(null)), None);
    }

    #[test]
    fn test_custom_types_are_distinct() {
        let versions = OperandType::custom::<Version>();
        let numbers = OperandType::custom::<i64>();
        assert_eq!(versions, OperandType::custom::<Version>());
        assert_ne!(versions, numbers);
        assert!(versions.to_string().ends_with("Version"));

        let v = versions.parse("1.0").unwrap();
        let n = numbers.parse("1").unwrap();
        assert_eq!(v.partial_cmp(&n), None);
        assert_ne!(v, n);
    }

    #[test]
    fn test_builtin_operand_types() {
        assert_eq!(Operand::Int64(1).operand_type(), OperandType::Int64);
        assert_eq!(Operand::Text("a".into()).operand_type(), OperandType::Text);
        assert_eq!(
            OperandType::Decimal.parse("1").unwrap().operand_type(),
            OperandType::Decimal
        );
    }

    #[test]
    fn test_operand_type_parse_errors_carry_reason() {
        let err = OperandType::Int32.parse("x").unwrap_err();
        assert!(!err.is_empty());
    }
}
