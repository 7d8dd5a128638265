//! # fieldrules
//!
//! Validation rules for annotation-driven validators: a driver pulls a value
//! out of a field, hands it to a [`Rule`], and reads back whether the data is
//! valid or asks for a user-facing message.
//!
//! - [`ListRange`]: every element of a sequence lies within inclusive bounds.
//! - [`NotEmpty`]: a collection holds at least one element.
//! - [`StringInEnum`]: a string is exactly one of an enum's member names.
//!
//! Candidates are [`serde_json::Value`]s, with `null` standing for "no value".
//! Every rule accepts `null`; pairing it with a required check is up to the
//! driver.
//!
//! Misconfigured rules and misapplied rules (a number handed to a sequence
//! rule) report a [`ConfigError`]. Bad data is just `Ok(false)`.
//!
//! ## Quick Example
//!
//! ```rust
//! use fieldrules::prelude::*;
//! use serde_json::json;
//!
//! named_enum! {
//!     enum Plan { Free, Pro, Team }
//! }
//!
//! let form = json!({
//!     "ratings": [5, 4, "3", ""],
//!     "tags": [],
//!     "plan": "pro",
//! });
//!
//! let ratings = ListRange::integer(1, 5);
//! let tags = NotEmpty::new();
//! let plan = StringInEnum::of::<Plan>();
//!
//! assert!(ratings.is_valid(&form["ratings"]).unwrap());
//! assert!(!tags.is_valid(&form["tags"]).unwrap());
//! assert!(!plan.is_valid(&form["plan"]).unwrap());
//!
//! // A missing field reads as null and is left to a required check.
//! assert!(ratings.is_valid(&form["missing"]).unwrap());
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod enum_name;
pub mod error;
pub mod not_empty;
pub mod range;
pub mod rule;

// Re-exports
pub use enum_name::{EnumNames, StringInEnum};
pub use error::{ConfigError, Violation};
pub use not_empty::NotEmpty;
pub use range::{CustomType, CustomValue, ListRange, Operand, OperandType, RangeSpec};
pub use rule::{validate_field, Rule};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::enum_name::{EnumNames, StringInEnum};
    pub use crate::error::{ConfigError, Violation};
    pub use crate::named_enum;
    pub use crate::not_empty::NotEmpty;
    pub use crate::range::{ListRange, OperandType, RangeSpec};
    pub use crate::rule::{validate_field, Rule};
}
