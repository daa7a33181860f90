//! MD5 integrity headers.
//!
//! Each checksummed region carries a 0x10-byte MD5 digest of exactly
//! its data bytes, stored immediately before them. Recomputing the
//! header is the last step of any mutation pipeline; the game rejects
//! a file whose digests are stale.

use crate::layout::{FileLayout, RegionId};

pub fn digest(region: &[u8]) -> [u8; 16] {
    md5::compute(region).0
}

/// Recompute and store the checksum header for `id`. No-op on
/// platforms without headers.
pub fn write_region(buf: &mut [u8], layout: &FileLayout, id: RegionId) {
    let Some(header) = layout.checksum(id) else {
        return;
    };
    let data = layout.data(id);
    let sum = digest(&buf[data.start..data.end]);
    tracing::trace!(region = %id, digest = %hex::encode(sum), "checksum written");
    buf[header.start..header.end].copy_from_slice(&sum);
}

/// Compare the stored header against the region's actual digest.
/// Returns `(stored, computed)` when they differ; `None` when they
/// match or the platform has no headers.
pub fn verify_region(buf: &[u8], layout: &FileLayout, id: RegionId) -> Option<([u8; 16], [u8; 16])> {
    let header = layout.checksum(id)?;
    let data = layout.data(id);
    let stored: [u8; 16] = buf[header.start..header.end].try_into().unwrap();
    let computed = digest(&buf[data.start..data.end]);
    if stored == computed { None } else { Some((stored, computed)) }
}
