// Copyright (c) Sienna Satterwhite, CesiumDB Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use std::{
    mem::size_of,
    rc::Rc,
    sync::Arc,
};

use bytes::Bytes;

use crate::errs::SkipListError;

/// A shared trait for encoding and decoding data in and out of binary formats.
pub trait BinaryMarshaller: Sized {
    /// Encode the data structure into a byte array.
    fn encode(&self) -> Bytes;
    /// Decode a byte array into the target type.
    fn decode(src: Bytes) -> Result<Self, SkipListError>;
    /// The size of the encoded structure in bytes.
    fn encoded_size(&self) -> usize;
}

fn wrong_width(ty: &str, expected: usize, found: usize) -> SkipListError {
    SkipListError::Corrupted(format!(
        "expected {} bytes for {}, found {}",
        expected, ty, found
    ))
}

macro_rules! fixed_width {
    ($($ty:ty),* $(,)?) => {
        $(
            impl BinaryMarshaller for $ty {
                #[inline]
                fn encode(&self) -> Bytes {
                    Bytes::copy_from_slice(&self.to_le_bytes())
                }

                #[inline]
                fn decode(src: Bytes) -> Result<Self, SkipListError> {
                    let arr: [u8; size_of::<$ty>()] = src
                        .as_ref()
                        .try_into()
                        .map_err(|_| wrong_width(stringify!($ty), size_of::<$ty>(), src.len()))?;
                    Ok(<$ty>::from_le_bytes(arr))
                }

                #[inline]
                fn encoded_size(&self) -> usize {
                    size_of::<$ty>()
                }
            }
        )*
    };
}

fixed_width!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);

impl BinaryMarshaller for bool {
    fn encode(&self) -> Bytes {
        Bytes::copy_from_slice(&[*self as u8])
    }

    fn decode(src: Bytes) -> Result<Self, SkipListError> {
        match src.as_ref() {
            | [0] => Ok(false),
            | [1] => Ok(true),
            | [other] => Err(SkipListError::Corrupted(format!("invalid bool byte {}", other))),
            | _ => Err(wrong_width("bool", 1, src.len())),
        }
    }

    fn encoded_size(&self) -> usize {
        1
    }
}

impl BinaryMarshaller for char {
    fn encode(&self) -> Bytes {
        (*self as u32).encode()
    }

    fn decode(src: Bytes) -> Result<Self, SkipListError> {
        let raw = u32::decode(src)?;
        char::from_u32(raw)
            .ok_or_else(|| SkipListError::Corrupted(format!("invalid char scalar {:#x}", raw)))
    }

    fn encoded_size(&self) -> usize {
        size_of::<u32>()
    }
}

impl BinaryMarshaller for String {
    fn encode(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }

    fn decode(src: Bytes) -> Result<Self, SkipListError> {
        String::from_utf8(src.to_vec())
            .map_err(|e| SkipListError::Corrupted(format!("invalid utf-8 string: {}", e)))
    }

    fn encoded_size(&self) -> usize {
        self.len()
    }
}

impl BinaryMarshaller for Vec<u8> {
    fn encode(&self) -> Bytes {
        Bytes::copy_from_slice(self)
    }

    fn decode(src: Bytes) -> Result<Self, SkipListError> {
        Ok(src.to_vec())
    }

    fn encoded_size(&self) -> usize {
        self.len()
    }
}

impl BinaryMarshaller for Bytes {
    fn encode(&self) -> Bytes {
        self.clone()
    }

    fn decode(src: Bytes) -> Result<Self, SkipListError> {
        Ok(src)
    }

    fn encoded_size(&self) -> usize {
        self.len()
    }
}

// shared elements are written by value and come back unshared
impl<T: BinaryMarshaller> BinaryMarshaller for Rc<T> {
    fn encode(&self) -> Bytes {
        self.as_ref().encode()
    }

    fn decode(src: Bytes) -> Result<Self, SkipListError> {
        T::decode(src).map(Rc::new)
    }

    fn encoded_size(&self) -> usize {
        self.as_ref().encoded_size()
    }
}

impl<T: BinaryMarshaller> BinaryMarshaller for Arc<T> {
    fn encode(&self) -> Bytes {
        self.as_ref().encode()
    }

    fn decode(src: Bytes) -> Result<Self, SkipListError> {
        T::decode(src).map(Arc::new)
    }

    fn encoded_size(&self) -> usize {
        self.as_ref().encoded_size()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::BinaryMarshaller;
    use crate::errs::SkipListError;

    #[test]
    fn test_integers() {
        let encoded = (-42i32).encode();
        assert_eq!(encoded.len(), 4);
        assert_eq!(i32::decode(encoded).unwrap(), -42);
        assert_eq!(u128::MAX.encoded_size(), 16);
        assert_eq!(u64::decode(0xDEAD_BEEFu64.encode()).unwrap(), 0xDEAD_BEEF);
    }

    #[test]
    fn test_wrong_width_is_corrupted() {
        assert!(matches!(
            u32::decode(Bytes::from_static(&[1, 2, 3])),
            Err(SkipListError::Corrupted(_))
        ));
    }

    #[test]
    fn test_floats_keep_bits() {
        assert_eq!(f64::decode((-0.0f64).encode()).unwrap().to_bits(), (-0.0f64).to_bits());
        assert!(f32::decode(f32::NAN.encode()).unwrap().is_nan());
    }

    #[test]
    fn test_bool_and_char() {
        assert!(bool::decode(true.encode()).unwrap());
        assert!(bool::decode(Bytes::from_static(&[2])).is_err());
        assert_eq!(char::decode('ß'.encode()).unwrap(), 'ß');
        assert!(char::decode(0xD800u32.encode()).is_err());
    }

    #[test]
    fn test_strings_and_bytes() {
        let s = String::from("skip");
        assert_eq!(s.encoded_size(), 4);
        assert_eq!(String::decode(s.encode()).unwrap(), s);
        assert!(String::decode(Bytes::from_static(&[0xff, 0xfe])).is_err());

        let raw = vec![0u8, 1, 2];
        assert_eq!(Vec::<u8>::decode(raw.encode()).unwrap(), raw);

        let b = Bytes::from_static(b"abc");
        assert_eq!(Bytes::decode(b.encode()).unwrap(), b);
    }
}
