//! Groups file names by hash across every archive read in one run

use crate::bsa::{BsaEntry, BsaHash};
use std::collections::HashMap;

/// Names sharing one hash value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashBucket {
    pub hash: BsaHash,
    pub names: Vec<String>,
}

/// Hash -> names mapping, built incrementally
///
/// Buckets are kept in the order their hash was first seen and names in
/// insertion order, so reports are deterministic.
#[derive(Debug, Default)]
pub struct CollisionIndex {
    buckets: Vec<HashBucket>,
    by_hash: HashMap<BsaHash, usize>,
    total_names: usize,
}

impl CollisionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a name to the bucket for `hash`, creating it on first use
    pub fn add(&mut self, name: impl Into<String>, hash: BsaHash) {
        let index = match self.by_hash.get(&hash) {
            Some(&index) => index,
            None => {
                self.buckets.push(HashBucket {
                    hash,
                    names: Vec::with_capacity(1),
                });
                self.by_hash.insert(hash, self.buckets.len() - 1);
                self.buckets.len() - 1
            }
        };
        self.buckets[index].names.push(name.into());
        self.total_names += 1;
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = BsaEntry>) {
        for entry in entries {
            self.add(entry.name, entry.hash);
        }
    }

    /// Buckets holding more than one name
    pub fn collisions(&self) -> impl Iterator<Item = &HashBucket> {
        self.buckets.iter().filter(|b| b.names.len() > 1)
    }

    pub fn total_names(&self) -> usize {
        self.total_names
    }

    pub fn distinct_hashes(&self) -> usize {
        self.buckets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsa::parser::tests::ArchiveBuilder;
    use crate::bsa::BsaReader;
    use std::io::Cursor;

    #[test]
    fn test_no_collisions() {
        let mut index = CollisionIndex::new();
        index.add("a.dds", BsaHash(1));
        index.add("b.dds", BsaHash(2));

        assert_eq!(index.collisions().count(), 0);
        assert_eq!(index.total_names(), 2);
        assert_eq!(index.distinct_hashes(), 2);
    }

    #[test]
    fn test_bucket_keeps_insertion_order() {
        let mut index = CollisionIndex::new();
        index.add("zeta", BsaHash(5));
        index.add("other", BsaHash(6));
        index.add("alpha", BsaHash(5));
        index.add("mid", BsaHash(5));

        let buckets: Vec<_> = index.collisions().collect();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].hash, BsaHash(5));
        assert_eq!(buckets[0].names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_buckets_in_first_seen_order() {
        let mut index = CollisionIndex::new();
        for (name, hash) in [("a", 9), ("b", 3), ("c", 3), ("d", 9)] {
            index.add(name, BsaHash(hash));
        }

        let hashes: Vec<_> = index.collisions().map(|b| b.hash.value()).collect();
        assert_eq!(hashes, [9, 3]);
    }

    #[test]
    fn test_single_archive_collision() {
        let data = ArchiveBuilder::new().entry(b"a", 1, 2).entry(b"bb", 1, 2).build();
        let entries = BsaReader::new(Cursor::new(data)).read_entries().unwrap();

        let mut index = CollisionIndex::new();
        index.extend(entries);

        let buckets: Vec<_> = index.collisions().collect();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].names, ["a", "bb"]);
    }

    #[test]
    fn test_cross_archive_collision() {
        let first = ArchiveBuilder::new()
            .entry(b"textures\\rock.dds", 0xAAAA, 0x1)
            .entry(b"textures\\tree.dds", 0xBBBB, 0x2)
            .build();
        let second = ArchiveBuilder::new()
            .entry(b"meshes\\rock.nif", 0xCCCC, 0x3)
            .entry(b"textures\\r0ck.dds", 0xAAAA, 0x1)
            .build();

        let mut index = CollisionIndex::new();
        for data in [first, second] {
            index.extend(BsaReader::new(Cursor::new(data)).read_entries().unwrap());
        }

        let buckets: Vec<_> = index.collisions().collect();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].names, ["textures\\rock.dds", "textures\\r0ck.dds"]);
        assert_eq!(index.total_names(), 4);
    }
}
