//! # memstash codec
//!
//! Value model and JSON codec shared by the memstash crates.
//!
//! This crate provides:
//! - [`Value`], the dynamic value stored in keys and document fields
//! - [`TypeTag`], the closed set of types a schema may declare
//! - [`IndexKey`], the hashable projection used by equality indexes
//! - JSON helpers for snapshots and typed result decoding
//!
//! ## Usage
//!
//! ```
//! use memstash_codec::{from_json, to_json, TypeTag, Value};
//!
//! let value = Value::from(vec![1, 2, 3]);
//! let bytes = to_json(&value).unwrap();
//! let decoded: Value = from_json(&bytes).unwrap();
//! assert_eq!(value, decoded);
//! assert_eq!(decoded.type_tag(), Some(TypeTag::List));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod json;
mod key;
mod types;
mod value;

pub use error::{CodecError, CodecResult};
pub use json::{decode_as, from_json, to_json, to_json_pretty, to_value};
pub use key::IndexKey;
pub use types::TypeTag;
pub use value::Value;
