//! serde integration: a [`DynamicArray`] is a sequence.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{Deserialize, Deserializer, Error as _, SeqAccess, Visitor};
use serde::ser::{Serialize, Serializer};

use crate::memory::DynamicArray;

/// Upper bound on the capacity reserved from an untrusted size hint.
const MAX_PREALLOCATED: usize = 4096;

impl<T: Serialize> Serialize for DynamicArray<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

struct DynamicArrayVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for DynamicArrayVisitor<T> {
    type Value = DynamicArray<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a sequence")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut values = DynamicArray::new();
        if let Some(hint) = seq.size_hint() {
            values
                .try_reserve(hint.min(MAX_PREALLOCATED))
                .map_err(A::Error::custom)?;
        }
        while let Some(value) = seq.next_element()? {
            values.try_push_back(value).map_err(A::Error::custom)?;
        }
        Ok(values)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for DynamicArray<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(DynamicArrayVisitor(PhantomData))
    }
}
