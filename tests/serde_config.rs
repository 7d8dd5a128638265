//! Declaring range rules in configuration (requires the `serde` feature)

#![cfg(feature = "serde")]

use fieldrules::{ListRange, OperandType, RangeSpec, Rule};
use serde_json::json;

#[test]
fn test_parsed_spec_from_config() {
    let spec: RangeSpec = serde_json::from_value(json!({
        "mode": "parsed",
        "operand": "decimal",
        "min": "0",
        "max": "500",
    }))
    .unwrap();

    assert_eq!(
        spec,
        RangeSpec::Parsed {
            operand: OperandType::Decimal,
            min: "0".to_string(),
            max: "500".to_string(),
        }
    );

    let rule = ListRange::from(spec);
    assert!(rule.is_valid(&json!([0, 250, 500])).unwrap());
    assert!(!rule.is_valid(&json!([501])).unwrap());
}

#[test]
fn test_native_specs_from_config() {
    let integer: RangeSpec =
        serde_json::from_value(json!({"mode": "integer", "min": 1, "max": 3})).unwrap();
    assert_eq!(integer, RangeSpec::Integer { min: 1, max: 3 });

    let double: RangeSpec =
        serde_json::from_value(json!({"mode": "double", "min": 0.5, "max": 1.5})).unwrap();
    assert_eq!(double, RangeSpec::Double { min: 0.5, max: 1.5 });
}

#[test]
fn test_spec_serializes_with_tags() {
    let spec = RangeSpec::Parsed {
        operand: OperandType::UInt64,
        min: "1".to_string(),
        max: "9".to_string(),
    };
    let value = serde_json::to_value(&spec).unwrap();
    assert_eq!(value["mode"], "parsed");
    assert_eq!(value["operand"], "uint64");
}

#[test]
fn test_unknown_mode_is_rejected() {
    let result: Result<RangeSpec, _> =
        serde_json::from_value(json!({"mode": "percent", "min": 0, "max": 1}));
    assert!(result.is_err());
}
