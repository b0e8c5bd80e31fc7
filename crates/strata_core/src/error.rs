//! # Container Error Types
//!
//! All recoverable errors that can occur in the container runtime.
//!
//! Out-of-range indices are programmer errors and panic at the call site;
//! they never appear here.

use thiserror::Error;

/// Errors that can occur while growing, decoding or configuring containers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContainerError {
    /// Requested slot count cannot be expressed as an allocation layout.
    #[error("capacity overflow: cannot allocate {requested} elements")]
    CapacityOverflow {
        /// The slot count that was requested.
        requested: usize,
    },

    /// The global allocator refused the request.
    #[error("allocation of {bytes} bytes (align {align}) failed")]
    AllocationFailed {
        /// Size of the rejected allocation.
        bytes: usize,
        /// Alignment of the rejected allocation.
        align: usize,
    },

    /// The input ended before a value was fully decoded.
    #[error("truncated input: need {needed} bytes, have {available}")]
    Truncated {
        /// Bytes required to continue decoding.
        needed: usize,
        /// Bytes left in the input.
        available: usize,
    },

    /// A length prefix was below zero.
    #[error("negative length prefix: {0}")]
    NegativeLength(i64),

    /// A length prefix does not fit in addressable memory.
    #[error("length prefix too large: {0}")]
    LengthTooLarge(i64),

    /// A decoded scalar is outside the domain of its type.
    #[error("invalid {type_name} value: {value}")]
    InvalidValue {
        /// Name of the type being decoded.
        type_name: &'static str,
        /// The offending raw value.
        value: u64,
    },

    /// A whole-buffer decode finished with input left over.
    #[error("{0} trailing bytes after decoded value")]
    TrailingBytes(usize),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for container operations.
pub type ContainerResult<T> = Result<T, ContainerError>;
