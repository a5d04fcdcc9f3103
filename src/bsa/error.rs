use thiserror::Error;

/// Result type for BSA reading
pub type Result<T> = std::result::Result<T, BsaError>;

/// Errors raised while reading a BSA archive
#[derive(Error, Debug)]
pub enum BsaError {
    /// Header carries a version other than the one supported layout
    #[error("Invalid BSA version: {0} (expected 256)")]
    InvalidVersion(u32),

    /// Offset table and header disagree about where a file name ends
    #[error("Invalid length {length} for file name record {index}")]
    InvalidNameLength { index: usize, length: i64 },

    /// Fewer bytes left in the archive than a section needs
    #[error("Truncated {section}: expected {expected} bytes, got {actual}")]
    Truncated {
        section: &'static str,
        expected: u64,
        actual: u64,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BsaError {
    /// True for errors caused by a malformed (rather than short) archive
    pub fn is_invalid_format(&self) -> bool {
        matches!(
            self,
            BsaError::InvalidVersion(_) | BsaError::InvalidNameLength { .. }
        )
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self, BsaError::Truncated { .. })
    }
}
