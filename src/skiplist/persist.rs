// Copyright (c) Sienna Satterwhite, CesiumDB Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

//! Sequential persistence.
//!
//! A list is written as a flat run of its elements in ascending order, never
//! as its node graph, so the lane layout of the saved list has no bearing on
//! the restored one:
//!
//! ```text
//! +-----------+----------------------------------+---------+
//! | count u64 | (len u32 | payload) x count ...  | crc u32 |
//! +-----------+----------------------------------+---------+
//! ```
//!
//! All integers are little endian and the checksum covers everything before
//! it.

use std::{
    io::{
        Read,
        Write,
    },
    mem::size_of,
};

use bytes::{
    Buf,
    BufMut,
    Bytes,
    BytesMut,
};
use crc32fast::Hasher;
use tracing::{
    debug,
    instrument,
};

use crate::{
    config::SkipListConfig,
    encoding::BinaryMarshaller,
    errs::SkipListError,
    skiplist::{
        comparator::Comparator,
        IndexedSkipList,
    },
};

const HEADER_SIZE: usize = size_of::<u64>();
const RECORD_HEADER_SIZE: usize = size_of::<u32>();
const TRAILER_SIZE: usize = size_of::<u32>();

impl<T, C> IndexedSkipList<T, C>
where
    T: BinaryMarshaller,
    C: Comparator<T>,
{
    /// Serialize the list into a single buffer.
    #[instrument(level = "debug", skip(self), fields(len = self.len()))]
    pub fn to_bytes(&self) -> Bytes {
        let payload: usize = self
            .iter()
            .map(|e| RECORD_HEADER_SIZE + e.encoded_size())
            .sum();
        let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload + TRAILER_SIZE);

        buf.put_u64_le(self.len() as u64);
        for element in self.iter() {
            let encoded = element.encode();
            buf.put_u32_le(encoded.len() as u32);
            buf.put_slice(encoded.as_ref());
        }

        let mut hasher = Hasher::new();
        hasher.update(buf.as_ref());
        buf.put_u32_le(hasher.finalize());

        buf.freeze()
    }

    /// Write the list to `writer`.
    pub fn save<W: Write>(&self, mut writer: W) -> Result<(), SkipListError> {
        writer.write_all(self.to_bytes().as_ref())?;
        writer.flush()?;
        Ok(())
    }

    /// Rebuild a list from a buffer produced by [`IndexedSkipList::to_bytes`].
    pub fn from_bytes(payload: Bytes, comparator: C) -> Result<Self, SkipListError> {
        Self::from_bytes_with_config(payload, SkipListConfig::default(), comparator)
    }

    /// Same as [`IndexedSkipList::from_bytes`] with explicit level settings.
    #[instrument(level = "debug", skip(payload, comparator), fields(size = payload.len()))]
    pub fn from_bytes_with_config(
        payload: Bytes,
        config: SkipListConfig,
        comparator: C,
    ) -> Result<Self, SkipListError> {
        config.validate()?;
        let elements = decode_elements::<T>(payload)?;

        let mut list = Self::build(config, comparator, elements.len());
        // back to front, so that equal elements keep their saved order
        for element in elements.into_iter().rev() {
            list.insert(element);
        }
        debug!(len = list.len(), "restored list");

        Ok(list)
    }

    /// Read a list written by [`IndexedSkipList::save`].
    pub fn restore<R: Read>(reader: R, comparator: C) -> Result<Self, SkipListError> {
        Self::restore_with_config(reader, SkipListConfig::default(), comparator)
    }

    pub fn restore_with_config<R: Read>(
        mut reader: R,
        config: SkipListConfig,
        comparator: C,
    ) -> Result<Self, SkipListError> {
        let mut raw = Vec::new();
        reader.read_to_end(&mut raw)?;
        Self::from_bytes_with_config(Bytes::from(raw), config, comparator)
    }
}

fn decode_elements<T: BinaryMarshaller>(payload: Bytes) -> Result<Vec<T>, SkipListError> {
    if payload.len() < HEADER_SIZE + TRAILER_SIZE {
        return Err(SkipListError::Corrupted(format!(
            "stream of {} bytes is too short",
            payload.len()
        )));
    }

    let body_len = payload.len() - TRAILER_SIZE;
    let mut trailer = payload.slice(body_len..);
    let found = trailer.get_u32_le();

    let mut hasher = Hasher::new();
    hasher.update(&payload[..body_len]);
    let expected = hasher.finalize();
    if expected != found {
        return Err(SkipListError::ChecksumMismatch { expected, found });
    }

    let mut body = payload.slice(..body_len);
    let count = body.get_u64_le();
    // never trust the header with the allocation size
    let upper_bound = body.remaining() / RECORD_HEADER_SIZE;
    let mut elements = Vec::with_capacity((count as usize).min(upper_bound));

    for i in 0..count {
        if body.remaining() < RECORD_HEADER_SIZE {
            return Err(SkipListError::Corrupted(format!(
                "stream ends after {} of {} elements",
                i, count
            )));
        }
        let len = body.get_u32_le() as usize;
        if body.remaining() < len {
            return Err(SkipListError::Corrupted(format!(
                "element {} needs {} bytes, {} left",
                i,
                len,
                body.remaining()
            )));
        }
        elements.push(T::decode(body.split_to(len))?);
    }

    if body.has_remaining() {
        return Err(SkipListError::Corrupted(format!(
            "{} trailing bytes after {} elements",
            body.remaining(),
            count
        )));
    }

    Ok(elements)
}

#[cfg(test)]
mod tests {
    use std::{
        fs::File,
        io::{
            BufReader,
            BufWriter,
        },
    };

    use bytes::{
        BufMut,
        Bytes,
        BytesMut,
    };
    use proptest::{
        collection::vec,
        prelude::*,
    };
    use tempfile::tempdir;

    use crate::{
        config::SkipListConfig,
        errs::SkipListError,
        skiplist::{
            comparator::{
                Natural,
                Reverse,
            },
            IndexedSkipList,
        },
    };

    fn sample() -> IndexedSkipList<i32> {
        [5, -3, 17, -9, 4, 6, 4].into_iter().collect()
    }

    #[test]
    fn test_layout() {
        let list = sample();
        let bytes = list.to_bytes();
        // count + 7 * (len + i32) + crc
        assert_eq!(bytes.len(), 8 + 7 * (4 + 4) + 4);
        assert_eq!(&bytes[..8], &7u64.to_le_bytes());
        assert_eq!(&bytes[8..12], &4u32.to_le_bytes());
        assert_eq!(&bytes[12..16], &(-9i32).to_le_bytes());
    }

    #[test]
    fn test_round_trip() {
        let list = sample();
        let restored = IndexedSkipList::<i32>::from_bytes(list.to_bytes(), Natural).unwrap();
        restored.check_invariants();
        assert_eq!(restored, list);
        assert_eq!(*restored.get(6).unwrap(), 17);
    }

    #[test]
    fn test_empty_round_trip() {
        let list: IndexedSkipList<String> = IndexedSkipList::new();
        let bytes = list.to_bytes();
        assert_eq!(bytes.len(), 12);
        let restored = IndexedSkipList::<String>::from_bytes(bytes, Natural).unwrap();
        assert!(restored.is_empty());
    }

    #[test]
    fn test_round_trip_keeps_comparator_order_of_equals() {
        // only the high byte takes part in ordering
        let by_hi = |a: &u16, b: &u16| (a >> 8).cmp(&(b >> 8));
        let mut list = IndexedSkipList::with_comparator(by_hi);
        for i in 0..30u16 {
            list.insert(((i % 4) << 8) | i);
        }

        let restored = IndexedSkipList::<u16, _>::from_bytes(list.to_bytes(), by_hi).unwrap();
        restored.check_invariants();
        assert!(restored.iter().eq(list.iter()));
    }

    #[test]
    fn test_custom_comparator_restore() {
        let mut list = IndexedSkipList::with_comparator(Reverse(Natural));
        list.extend(["b".to_string(), "c".to_string(), "a".to_string()]);
        let restored =
            IndexedSkipList::<String, _>::from_bytes(list.to_bytes(), Reverse(Natural)).unwrap();
        assert_eq!(
            restored.iter().cloned().collect::<Vec<_>>(),
            vec!["c", "b", "a"]
        );
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("list.bin");

        let list: IndexedSkipList<u64> = (0..1_000u64).map(|i| i * 7 % 1_000).collect();
        list.save(BufWriter::new(File::create(&path).unwrap())).unwrap();

        let config = SkipListConfig::default().with_seed(9);
        let restored = IndexedSkipList::<u64>::restore_with_config(
            BufReader::new(File::open(&path).unwrap()),
            config,
            Natural,
        )
        .unwrap();
        restored.check_invariants();
        assert_eq!(restored, list);
        assert_eq!(restored.config().seed(), Some(9));
    }

    #[test]
    fn test_checksum_mismatch() {
        let bytes = sample().to_bytes();
        let mut tampered = BytesMut::from(bytes.as_ref());
        tampered[12] ^= 0xff;
        assert!(matches!(
            IndexedSkipList::<i32>::from_bytes(tampered.freeze(), Natural),
            Err(SkipListError::ChecksumMismatch { .. })
        ));
    }

    fn with_crc(body: &[u8]) -> Bytes {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(body);
        let mut buf = BytesMut::from(body);
        buf.put_u32_le(hasher.finalize());
        buf.freeze()
    }

    #[test]
    fn test_truncated_stream() {
        assert!(matches!(
            IndexedSkipList::<i32>::from_bytes(Bytes::from_static(&[0, 1, 2]), Natural),
            Err(SkipListError::Corrupted(_))
        ));

        // claims two elements, carries one
        let mut body = BytesMut::new();
        body.put_u64_le(2);
        body.put_u32_le(4);
        body.put_i32_le(1);
        assert!(matches!(
            IndexedSkipList::<i32>::from_bytes(with_crc(&body), Natural),
            Err(SkipListError::Corrupted(_))
        ));

        // record longer than what is left
        let mut body = BytesMut::new();
        body.put_u64_le(1);
        body.put_u32_le(40);
        body.put_i32_le(1);
        assert!(matches!(
            IndexedSkipList::<i32>::from_bytes(with_crc(&body), Natural),
            Err(SkipListError::Corrupted(_))
        ));
    }

    #[test]
    fn test_trailing_and_malformed_elements() {
        let mut body = BytesMut::new();
        body.put_u64_le(1);
        body.put_u32_le(4);
        body.put_i32_le(1);
        body.put_u8(0);
        assert!(matches!(
            IndexedSkipList::<i32>::from_bytes(with_crc(&body), Natural),
            Err(SkipListError::Corrupted(_))
        ));

        let mut body = BytesMut::new();
        body.put_u64_le(1);
        body.put_u32_le(2);
        body.put_u16_le(1);
        assert!(matches!(
            IndexedSkipList::<i32>::from_bytes(with_crc(&body), Natural),
            Err(SkipListError::Corrupted(_))
        ));
    }

    #[test]
    fn test_io_error_surfaces() {
        struct Broken;

        impl std::io::Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "disk gone"))
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        assert!(matches!(sample().save(Broken), Err(SkipListError::Io(_))));
    }

    proptest! {
        #[test]
        fn prop_round_trip(values in vec(any::<i64>(), 0..300)) {
            let list: IndexedSkipList<i64> = values.into_iter().collect();
            let restored = IndexedSkipList::<i64>::from_bytes(list.to_bytes(), Natural).unwrap();
            restored.check_invariants();
            prop_assert!(restored.iter().eq(list.iter()));
        }

        #[test]
        fn prop_round_trip_strings(values in vec(".{0,12}", 0..100)) {
            let list: IndexedSkipList<String> = values.into_iter().collect();
            let mut out = Vec::new();
            list.save(&mut out).unwrap();
            let restored = IndexedSkipList::<String>::restore(out.as_slice(), Natural).unwrap();
            prop_assert_eq!(restored, list);
        }
    }
}
