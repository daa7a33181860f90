//! The standalone character file (".erc"): one exported slot, its
//! regenerated profile mirror, and a trailing content checksum, fully
//! independent of any save container.
//!
//! Wire layout: `"ERC\0"` magic, u32 format version, u8 active flag,
//! u32 slot-data length + bytes, u32 profile length (always 0x24C) +
//! bytes, then a 16-byte MD5 over everything preceding it.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::checksum;
use crate::common::PROFILE_ENTRY_SIZE;
use crate::error::OpError;
use crate::layout::SLOT_SIZE;

pub const PACKAGE_MAGIC: [u8; 4] = *b"ERC\0";
pub const PACKAGE_VERSION: u32 = 1;

const HEADER_LEN: usize = 4 + 4 + 1;
const DIGEST_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct CharacterPackage {
    pub active: bool,
    /// The full fixed-size slot data region.
    pub slot_data: Vec<u8>,
    /// Serialized profile summary entry, exactly 0x24C bytes.
    pub profile: Vec<u8>,
}

impl CharacterPackage {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            HEADER_LEN + 4 + self.slot_data.len() + 4 + self.profile.len() + DIGEST_LEN,
        );
        out.extend_from_slice(&PACKAGE_MAGIC);
        out.extend_from_slice(&PACKAGE_VERSION.to_le_bytes());
        out.push(self.active as u8);
        out.extend_from_slice(&(self.slot_data.len() as u32).to_le_bytes());
        out.extend_from_slice(&self.slot_data);
        out.extend_from_slice(&(self.profile.len() as u32).to_le_bytes());
        out.extend_from_slice(&self.profile);
        let digest = checksum::digest(&out);
        out.extend_from_slice(&digest);
        out
    }

    /// Decode and fully validate a package.
    ///
    /// The trailing checksum is verified first (it covers the whole
    /// body, so any flipped byte surfaces as [`OpError::ChecksumMismatch`]);
    /// structural validation of magic, version, and declared lengths
    /// follows on the authenticated bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, OpError> {
        let min_len = HEADER_LEN + 4 + 4 + DIGEST_LEN;
        if bytes.len() < min_len {
            return Err(OpError::TruncatedPackage {
                expected: min_len,
                actual: bytes.len(),
            });
        }

        let body = &bytes[..bytes.len() - DIGEST_LEN];
        let stored: [u8; 16] = bytes[bytes.len() - DIGEST_LEN..].try_into().unwrap();
        let computed = checksum::digest(body);
        if stored != computed {
            return Err(OpError::ChecksumMismatch {
                expected: stored,
                actual: computed,
            });
        }

        let magic: [u8; 4] = body[0..4].try_into().unwrap();
        if magic != PACKAGE_MAGIC {
            return Err(OpError::CorruptPackage {
                reason: format!("bad magic {magic:02x?}"),
            });
        }
        let version = u32::from_le_bytes(body[4..8].try_into().unwrap());
        if version != PACKAGE_VERSION {
            return Err(OpError::UnsupportedPackageVersion(version));
        }
        let active = body[8] != 0;

        let mut pos = HEADER_LEN;
        let slot_data = read_block(body, &mut pos, "slot data")?;
        if slot_data.len() > SLOT_SIZE {
            return Err(OpError::CorruptPackage {
                reason: format!(
                    "slot data length {} exceeds slot size {SLOT_SIZE}",
                    slot_data.len()
                ),
            });
        }
        let profile = read_block(body, &mut pos, "profile")?;
        if profile.len() != PROFILE_ENTRY_SIZE {
            return Err(OpError::CorruptPackage {
                reason: format!(
                    "profile length {} != {PROFILE_ENTRY_SIZE}",
                    profile.len()
                ),
            });
        }
        if pos != body.len() {
            return Err(OpError::CorruptPackage {
                reason: format!("{} trailing bytes after profile", body.len() - pos),
            });
        }

        debug!(active, slot_len = slot_data.len(), "package decoded");
        Ok(Self {
            active,
            slot_data,
            profile,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, OpError> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        fs::write(path, self.to_bytes())
    }
}

/// Read one `u32 length + bytes` block; a declared length running past
/// the supplied bytes is [`OpError::TruncatedPackage`], never silently
/// shortened or zero-padded.
fn read_block(body: &[u8], pos: &mut usize, label: &str) -> Result<Vec<u8>, OpError> {
    if body.len() - *pos < 4 {
        return Err(OpError::TruncatedPackage {
            expected: *pos + 4,
            actual: body.len(),
        });
    }
    let len = u32::from_le_bytes(body[*pos..*pos + 4].try_into().unwrap()) as usize;
    *pos += 4;
    if body.len() - *pos < len {
        debug!(label, declared = len, available = body.len() - *pos, "short block");
        return Err(OpError::TruncatedPackage {
            expected: len,
            actual: body.len() - *pos,
        });
    }
    let out = body[*pos..*pos + len].to_vec();
    *pos += len;
    Ok(out)
}
