//! # Protoclosure Core
//!
//! `protoclosure-core` exchanges protobuf messages with closure-library's `goog.proto2`
//! JavaScript runtime. It encodes `prost_reflect::DynamicMessage`s into the JSON
//! formats that runtime understands, and decodes them back.
//!
//! ## Formats
//!
//! * **PBLite**: a positional array where the value of tag `t` sits at index `t`
//!   (`[null,101,[],["foo","bar"]]`).
//! * **PBLite, zero-indexed**: the same array without the unused slot 0
//!   (`[101,[],["foo","bar"]]`).
//! * **Object keyed by name**: `{"field1":101,"field3":["foo","bar"]}`.
//! * **Object keyed by tag**: `{"1":101,"3":["foo","bar"]}`.
//!
//! 64-bit integers are written as strings unless the field is numeric-safe (see
//! [`schema`]), and booleans are `1`/`0` in PBLite.
//!
//! ## Key Components
//!
//! * **[`marshal`] & [`unmarshal`]:** The text entry points, with one shorthand per format
//!   ([`marshal_pblite`], [`unmarshal_object_key_tag`], ...).
//! * **[`codec`]:** The same conversions at the `serde_json::Value` level.
//! * **[`schema`]:** The per-message field metadata the codecs walk, cached per process.
//!
//! ## Example
//!
//! ```rust,no_run
//! use protoclosure_core::{Format, marshal, unmarshal};
//! use protoclosure_core::prost_reflect::{DescriptorPool, DynamicMessage};
//!
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DescriptorPool::decode(std::fs::read("descriptor.bin")?.as_slice())?;
//! let descriptor = pool.get_message_by_name("my.package.MyMessage").unwrap();
//!
//! let mut message = DynamicMessage::new(descriptor);
//! unmarshal("[null,101]", &mut message, Format::PbLite)?;
//! let object = marshal(&message, Format::ObjectKeyName)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports `prost` and `prost-reflect` to ensure that consumers
//! use compatible versions of these underlying dependencies.
pub mod codec;
pub mod error;
pub mod format;
mod marshal;
pub mod schema;

pub use error::{DecodeError, EncodeError};
pub use format::Format;
pub use marshal::*;

// Re-exports
pub use prost;
pub use prost_reflect;
