use thiserror::Error;

/// Errors raised while decoding a save container or one of its regions.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A mandatory fixed-size field ran past the end of its region.
    #[error(
        "truncated data: {needed} bytes needed at offset {offset:#x}, only {remaining} remaining"
    )]
    Truncated {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// The file length matches neither the PC nor the console layout.
    #[error(
        "file length {actual} matches no known layout (pc = {expected_pc}, console = {expected_console})"
    )]
    BadFileSize {
        actual: usize,
        expected_pc: usize,
        expected_console: usize,
    },

    /// A slot or common-section format version outside the supported range.
    #[error("unsupported save format version {0:#x}")]
    UnsupportedVersion(u32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the slot-level operations (copy/swap/delete/
/// transfer/export/import). These are deterministic data-integrity
/// errors; callers must not retry them.
#[derive(Debug, Error)]
pub enum OpError {
    #[error("invalid slot index {index}, expected 0..=9")]
    InvalidSlotIndex { index: usize },

    #[error("source slot {index} is empty")]
    SourceSlotEmpty { index: usize },

    #[error("source and destination are both slot {index}")]
    SameSlot { index: usize },

    #[error("corrupt package: {reason}")]
    CorruptPackage { reason: String },

    #[error("unsupported package version {0}, expected 1")]
    UnsupportedPackageVersion(u32),

    #[error("truncated package: {expected} bytes declared, {actual} available")]
    TruncatedPackage { expected: usize, actual: usize },

    #[error(
        "checksum mismatch: expected {}, got {}",
        hex::encode(expected),
        hex::encode(actual)
    )]
    ChecksumMismatch {
        expected: [u8; 16],
        actual: [u8; 16],
    },

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
