//! # Binary Codec
//!
//! Little-endian, length-prefixed encoding.
//!
//! ```text
//! DynamicArray<T>:  [ count: i64 LE ][ T0 ][ T1 ] ... [ T(count-1) ]
//! Bitset:           [ bits: i64 LE  ][ word0: u64 LE ] ... [ word(ceil(bits/64)-1) ]
//! ```

use crate::bits::{Bitset, WORD_BITS};
use crate::error::{ContainerError, ContainerResult};
use crate::memory::DynamicArray;

/// Cursor over an encoded byte buffer.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> WireReader<'a> {
    /// Starts reading at the beginning of `bytes`.
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// Bytes consumed so far.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Bytes left to read.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    /// Returns `true` once every byte has been consumed.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Consumes the next `count` bytes.
    ///
    /// # Errors
    ///
    /// [`ContainerError::Truncated`] if fewer than `count` bytes remain;
    /// nothing is consumed.
    pub fn read_bytes(&mut self, count: usize) -> ContainerResult<&'a [u8]> {
        if count > self.remaining() {
            return Err(ContainerError::Truncated {
                needed: count,
                available: self.remaining(),
            });
        }
        let start = self.position;
        self.position += count;
        Ok(&self.bytes[start..self.position])
    }

    /// Consumes the next `N` bytes as an array.
    ///
    /// # Errors
    ///
    /// [`ContainerError::Truncated`] if fewer than `N` bytes remain.
    pub fn read_array<const N: usize>(&mut self) -> ContainerResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Reads an `i64` length prefix and checks it against the input left,
    /// assuming each element takes at least `min_element_len` bytes.
    ///
    /// # Errors
    ///
    /// [`ContainerError::NegativeLength`], [`ContainerError::LengthTooLarge`]
    /// or [`ContainerError::Truncated`].
    pub fn read_length(&mut self, min_element_len: usize) -> ContainerResult<usize> {
        let raw = i64::decode(self)?;
        if raw < 0 {
            return Err(ContainerError::NegativeLength(raw));
        }
        let count = usize::try_from(raw).map_err(|_| ContainerError::LengthTooLarge(raw))?;
        let needed = count
            .checked_mul(min_element_len)
            .ok_or(ContainerError::LengthTooLarge(raw))?;
        if needed > self.remaining() {
            return Err(ContainerError::Truncated {
                needed,
                available: self.remaining(),
            });
        }
        Ok(count)
    }
}

/// Types that can be written in the wire format.
pub trait WireEncode {
    /// Appends the encoding of `self` to `out`.
    fn encode(&self, out: &mut DynamicArray<u8>);
}

/// Types that can be read back from the wire format.
pub trait WireDecode: Sized {
    /// Lower bound on the encoded size of one value, used to reject
    /// length prefixes the remaining input cannot possibly satisfy.
    const MIN_ENCODED_LEN: usize = 1;

    /// Decodes one value from `reader`.
    ///
    /// # Errors
    ///
    /// Any [`ContainerError`] decode variant.
    fn decode(reader: &mut WireReader<'_>) -> ContainerResult<Self>;
}

macro_rules! scalar_wire_impls {
    ($($t:ty),+ $(,)?) => {
        $(
            impl WireEncode for $t {
                #[inline]
                fn encode(&self, out: &mut DynamicArray<u8>) {
                    out.append(&self.to_le_bytes());
                }
            }

            impl WireDecode for $t {
                const MIN_ENCODED_LEN: usize = std::mem::size_of::<$t>();

                #[inline]
                fn decode(reader: &mut WireReader<'_>) -> ContainerResult<Self> {
                    Ok(<$t>::from_le_bytes(reader.read_array()?))
                }
            }
        )+
    };
}

scalar_wire_impls!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

impl WireEncode for bool {
    #[inline]
    fn encode(&self, out: &mut DynamicArray<u8>) {
        out.push_back(u8::from(*self));
    }
}

impl WireDecode for bool {
    fn decode(reader: &mut WireReader<'_>) -> ContainerResult<Self> {
        match u8::decode(reader)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(ContainerError::InvalidValue {
                type_name: "bool",
                value: u64::from(other),
            }),
        }
    }
}

impl<T: WireEncode> WireEncode for DynamicArray<T> {
    fn encode(&self, out: &mut DynamicArray<u8>) {
        (self.len() as i64).encode(out);
        for item in self {
            item.encode(out);
        }
    }
}

impl<T: WireDecode> WireDecode for DynamicArray<T> {
    const MIN_ENCODED_LEN: usize = 8;

    fn decode(reader: &mut WireReader<'_>) -> ContainerResult<Self> {
        let count = reader.read_length(T::MIN_ENCODED_LEN)?;
        let mut values = Self::new();
        values.try_reserve(count)?;
        for _ in 0..count {
            values.push_back(T::decode(reader)?);
        }
        Ok(values)
    }
}

impl WireEncode for Bitset {
    fn encode(&self, out: &mut DynamicArray<u8>) {
        (self.len() as i64).encode(out);
        for word in self.words() {
            word.encode(out);
        }
    }
}

impl WireDecode for Bitset {
    const MIN_ENCODED_LEN: usize = 8;

    fn decode(reader: &mut WireReader<'_>) -> ContainerResult<Self> {
        let bits = reader.read_length(0)?;
        let word_count = bits.div_ceil(WORD_BITS);
        let available = reader.remaining();
        if word_count.saturating_mul(8) > available {
            return Err(ContainerError::Truncated {
                needed: word_count.saturating_mul(8),
                available,
            });
        }
        let mut words = DynamicArray::new();
        words.try_reserve(word_count)?;
        for _ in 0..word_count {
            words.push_back(u64::decode(reader)?);
        }
        let last = words.last().copied().unwrap_or(0);
        Bitset::from_words(words, bits).ok_or(ContainerError::InvalidValue {
            type_name: "bitset padding",
            value: last,
        })
    }
}

/// Encodes `value` into a fresh buffer.
#[must_use]
pub fn to_bytes<T: WireEncode + ?Sized>(value: &T) -> DynamicArray<u8> {
    let mut out = DynamicArray::new();
    value.encode(&mut out);
    out
}

/// Decodes exactly one `T` from `bytes`.
///
/// # Errors
///
/// Any decode error, or [`ContainerError::TrailingBytes`] if input is left over.
pub fn from_bytes<T: WireDecode>(bytes: &[u8]) -> ContainerResult<T> {
    let mut reader = WireReader::new(bytes);
    let value = T::decode(&mut reader)?;
    if !reader.is_empty() {
        return Err(ContainerError::TrailingBytes(reader.remaining()));
    }
    Ok(value)
}

/// Decodes an array from `reader` into `dest`.
///
/// `dest` is replaced only after the whole sequence decoded; on error it
/// is left exactly as it was. Its growth policy is kept.
///
/// # Errors
///
/// Any decode error.
pub fn decode_into<T: WireDecode>(
    dest: &mut DynamicArray<T>,
    reader: &mut WireReader<'_>,
) -> ContainerResult<()> {
    let mut decoded = DynamicArray::<T>::decode(reader)?;
    decoded.set_policy(dest.policy());
    *dest = decoded;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_layout() {
        let values: DynamicArray<i32> = DynamicArray::from([1, 2, 3, 4, 5, 666]);
        let bytes = to_bytes(&values);

        assert_eq!(bytes.len(), 8 + 6 * 4);
        let bytes = bytes.as_slice();
        assert_eq!(&bytes[..8], &6i64.to_le_bytes());
        assert_eq!(&bytes[8..12], &1i32.to_le_bytes());
        assert_eq!(&bytes[28..], &666i32.to_le_bytes());
    }

    #[test]
    fn test_array_round_trip() {
        let values: DynamicArray<i32> = DynamicArray::from([1, 2, 3, 4, 5, 666]);
        let decoded: DynamicArray<i32> = from_bytes(&to_bytes(&values)).unwrap();
        assert_eq!(decoded.len(), 6);
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_nested_arrays() {
        let inner_a: DynamicArray<u8> = DynamicArray::from([1, 2]);
        let inner_b: DynamicArray<u8> = DynamicArray::new();
        let outer: DynamicArray<DynamicArray<u8>> = DynamicArray::from([inner_a, inner_b]);

        let decoded: DynamicArray<DynamicArray<u8>> = from_bytes(&to_bytes(&outer)).unwrap();
        assert_eq!(decoded, outer);
    }

    #[test]
    fn test_negative_length_rejected() {
        let bytes = to_bytes(&-1i64);
        let err = from_bytes::<DynamicArray<u8>>(&bytes).unwrap_err();
        assert_eq!(err, ContainerError::NegativeLength(-1));
    }

    #[test]
    fn test_length_beyond_input_rejected() {
        let mut bytes = to_bytes(&3i64);
        bytes.append(&[0; 8]);
        let err = from_bytes::<DynamicArray<u32>>(&bytes).unwrap_err();
        assert_eq!(
            err,
            ContainerError::Truncated {
                needed: 12,
                available: 8
            }
        );
    }

    #[test]
    fn test_truncated_prefix() {
        let err = from_bytes::<DynamicArray<u8>>(&[1, 0, 0]).unwrap_err();
        assert!(matches!(err, ContainerError::Truncated { needed: 8, available: 3 }));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = to_bytes(&DynamicArray::from([7u8]));
        bytes.push_back(0);
        assert_eq!(
            from_bytes::<DynamicArray<u8>>(&bytes).unwrap_err(),
            ContainerError::TrailingBytes(1)
        );
    }

    #[test]
    fn test_invalid_bool() {
        let err = from_bytes::<bool>(&[2]).unwrap_err();
        assert!(matches!(err, ContainerError::InvalidValue { type_name: "bool", value: 2 }));
    }

    #[test]
    fn test_decode_into_keeps_destination_on_error() {
        let mut dest: DynamicArray<u16> = DynamicArray::from([9, 9, 9]);

        let bytes = to_bytes(&DynamicArray::from([1u16, 2, 3, 4]));
        let truncated = &bytes.as_slice()[..bytes.len() - 1];
        let mut reader = WireReader::new(truncated);
        assert!(decode_into(&mut dest, &mut reader).is_err());
        assert_eq!(dest.as_slice(), &[9, 9, 9]);

        let mut reader = WireReader::new(&bytes);
        decode_into(&mut dest, &mut reader).unwrap();
        assert_eq!(dest.as_slice(), &[1, 2, 3, 4]);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_bitset_round_trip() {
        let mut bits = Bitset::with_len(130);
        bits.set_bit(0, true);
        bits.set_bit(64, true);
        bits.set_bit(129, true);

        let bytes = to_bytes(&bits);
        assert_eq!(bytes.len(), 8 + 3 * 8);
        let decoded: Bitset = from_bytes(&bytes).unwrap();
        assert_eq!(decoded, bits);
    }

    #[test]
    fn test_bitset_padding_rejected() {
        let mut bytes = to_bytes(&4i64);
        bytes.append(&(1u64 << 5).to_le_bytes());
        let err = from_bytes::<Bitset>(&bytes).unwrap_err();
        assert!(matches!(err, ContainerError::InvalidValue { .. }));
    }
}
