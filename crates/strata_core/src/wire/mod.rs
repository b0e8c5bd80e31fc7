//! # Serialization
//!
//! Two ways out of (and back into) a container:
//!
//! - [`WireEncode`]/[`WireDecode`]: compact, little-endian, `i64`
//!   length-prefixed binary format
//! - serde: `DynamicArray<T>` serializes as a plain sequence

mod codec;
mod serde_impl;

pub use codec::{decode_into, from_bytes, to_bytes, WireDecode, WireEncode, WireReader};
