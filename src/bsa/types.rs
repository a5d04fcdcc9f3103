use std::fmt;

/// BSA archive header (first 12 bytes of the file)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BsaHeader {
    pub version: u32,           // Always 256 for Morrowind archives
    pub hash_table_offset: u32, // Relative to the end of the header
    pub file_count: u32,
}

impl BsaHeader {
    /// Absolute position of the hash table within the archive
    pub fn hash_table_start(&self) -> u64 {
        HEADER_SIZE + u64::from(self.hash_table_offset)
    }

    /// Offset (within the name blob) at which the last file name ends
    ///
    /// The hash table offset covers the size/offset records, the name
    /// offset table and the name blob, so subtracting 12 bytes per file
    /// leaves the blob length. Signed because a corrupt header can make it
    /// negative.
    pub fn name_blob_end(&self) -> i64 {
        i64::from(self.hash_table_offset) - i64::from(self.file_count) * FILE_RECORD_SIZE as i64
    }
}

/// 64-bit file name hash as stored in the hash table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BsaHash(pub u64);

impl BsaHash {
    /// Combine the two stored halves; the first value read is the high word
    pub fn from_parts(high: u32, low: u32) -> Self {
        Self((u64::from(high) << 32) | u64::from(low))
    }

    #[cfg(test)]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BsaHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

/// A file entry recovered from the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BsaEntry {
    /// File name as stored (e.g., "textures\foo.dds"), decoded as Latin-1
    pub name: String,
    pub hash: BsaHash,
}

/// Only supported archive version
pub const BSA_VERSION: u32 = 256;

/// Size of the version/offset/count header
pub const HEADER_SIZE: u64 = 12;

/// Size/offset record per file, skipped by the reader
pub const SIZE_RECORD_SIZE: u64 = 8;

/// Name offset table entry per file
pub const NAME_OFFSET_SIZE: u64 = 4;

/// Bytes per file accounted for before the name blob
pub const FILE_RECORD_SIZE: u64 = SIZE_RECORD_SIZE + NAME_OFFSET_SIZE;

/// Hash table entry per file (two u32 halves)
pub const HASH_RECORD_SIZE: u64 = 8;
