use super::error::{BsaError, Result};
use super::types::*;
use byteorder::{LittleEndian, ReadBytesExt};
use log::debug;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Reader for Morrowind-style (version 256) BSA archives
///
/// Recovers every file name together with the 64-bit hash stored for it.
/// File contents are never touched.
pub struct BsaReader<R> {
    source: R,
    header: Option<BsaHeader>,
}

impl BsaReader<BufReader<File>> {
    /// Open an archive on disk
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Opening BSA: {:?}", path);
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read + Seek> BsaReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            header: None,
        }
    }

    /// Header of the archive, available once `read_entries` got past it
    pub fn header(&self) -> Option<&BsaHeader> {
        self.header.as_ref()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> R {
        self.source
    }

    /// Read all (name, hash) pairs in entry order
    ///
    /// Layout after the 12-byte header: per-file size/offset records,
    /// the name offset table, the name blob, then (at the offset named in
    /// the header) the hash table.
    pub fn read_entries(&mut self) -> Result<Vec<BsaEntry>> {
        let header = self.read_header()?;
        self.header = Some(header);

        self.skip_fixed_records(&header)?;
        let offsets = self.read_name_offsets(&header)?;
        let names = self.read_names(&header, &offsets)?;
        let hashes = self.read_hashes(&header)?;

        debug!("Read {} file names and {} hashes", names.len(), hashes.len());

        Ok(names
            .into_iter()
            .zip(hashes)
            .map(|(name, hash)| BsaEntry { name, hash })
            .collect())
    }

    fn read_header(&mut self) -> Result<BsaHeader> {
        self.source.seek(SeekFrom::Start(0))?;
        let bytes = self.read_section(HEADER_SIZE, "header")?;
        let mut cursor = &bytes[..];

        let version = cursor.read_u32::<LittleEndian>()?;
        if version != BSA_VERSION {
            return Err(BsaError::InvalidVersion(version));
        }
        let hash_table_offset = cursor.read_u32::<LittleEndian>()?;
        let file_count = cursor.read_u32::<LittleEndian>()?;

        let header = BsaHeader {
            version,
            hash_table_offset,
            file_count,
        };
        debug!(
            "BSA header: version {}, hash table offset {}, {} files",
            header.version, header.hash_table_offset, header.file_count
        );
        Ok(header)
    }

    /// Skip the size/offset record of every file; only names and hashes matter here
    fn skip_fixed_records(&mut self, header: &BsaHeader) -> Result<()> {
        let expected = u64::from(header.file_count) * SIZE_RECORD_SIZE;
        let skipped = io::copy(&mut (&mut self.source).take(expected), &mut io::sink())?;
        if skipped < expected {
            return Err(BsaError::Truncated {
                section: "fixed records",
                expected,
                actual: skipped,
            });
        }
        Ok(())
    }

    fn read_name_offsets(&mut self, header: &BsaHeader) -> Result<Vec<u32>> {
        let len = u64::from(header.file_count) * NAME_OFFSET_SIZE;
        let bytes = self.read_section(len, "name offsets")?;
        let mut cursor = &bytes[..];

        let mut offsets = Vec::with_capacity(header.file_count as usize);
        for _ in 0..header.file_count {
            offsets.push(cursor.read_u32::<LittleEndian>()?);
        }
        Ok(offsets)
    }

    /// Read the name blob sequentially, one record per offset table entry
    ///
    /// Each record runs up to the next entry's offset (or the end of the
    /// blob for the last one) and ends in a NUL that is dropped unchecked.
    fn read_names(&mut self, header: &BsaHeader, offsets: &[u32]) -> Result<Vec<String>> {
        let mut names = Vec::with_capacity(offsets.len());

        for (index, &start) in offsets.iter().enumerate() {
            let end = match offsets.get(index + 1) {
                Some(&next) => i64::from(next),
                None => header.name_blob_end(),
            };
            let length = end - i64::from(start);
            if length < 1 {
                return Err(BsaError::InvalidNameLength { index, length });
            }

            let record = self.read_section(length as u64, "file name")?;
            names.push(decode_latin1(&record[..record.len() - 1]));
        }

        Ok(names)
    }

    fn read_hashes(&mut self, header: &BsaHeader) -> Result<Vec<BsaHash>> {
        self.source.seek(SeekFrom::Start(header.hash_table_start()))?;

        let len = u64::from(header.file_count) * HASH_RECORD_SIZE;
        let bytes = self.read_section(len, "hash table")?;
        let mut cursor = &bytes[..];

        let mut hashes = Vec::with_capacity(header.file_count as usize);
        for _ in 0..header.file_count {
            let high = cursor.read_u32::<LittleEndian>()?;
            let low = cursor.read_u32::<LittleEndian>()?;
            hashes.push(BsaHash::from_parts(high, low));
        }
        Ok(hashes)
    }

    /// Read exactly `len` bytes, failing with `Truncated` on a short read
    ///
    /// Goes through `take` so a corrupt length never allocates more than
    /// the archive actually holds.
    fn read_section(&mut self, len: u64, section: &'static str) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        (&mut self.source).take(len).read_to_end(&mut bytes)?;

        let actual = bytes.len() as u64;
        if actual < len {
            return Err(BsaError::Truncated {
                section,
                expected: len,
                actual,
            });
        }
        Ok(bytes)
    }
}

/// Decode a single-byte (ISO-8859-1) string; every byte maps to the code point of the same value
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
