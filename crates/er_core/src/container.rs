//! The save container: one whole-file byte buffer, its derived offset
//! table, and the parsed slot/common records.
//!
//! The buffer is authoritative for what would land on disk; the parsed
//! records are authoritative for field values. Every mutation path
//! ends by rebuilding the touched region into the buffer and
//! recomputing its checksum header, so the two views never stay out of
//! sync past the end of an operation.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::checksum;
use crate::common::{CommonSection, ProfileSummaryEntry};
use crate::error::{OpError, ParseError};
use crate::layout::{FieldSpan, FileLayout, Platform, RegionId, SLOT_COUNT};
use crate::listing::CharacterListing;
use crate::slot::{rebuild, CharacterSlot};

/// A stored-vs-computed digest disagreement found by
/// [`SaveContainer::verify_checksums`].
#[derive(Debug, Clone, Copy)]
pub struct ChecksumIssue {
    pub region: RegionId,
    pub stored: [u8; 16],
    pub computed: [u8; 16],
}

#[derive(Debug)]
pub struct SaveContainer {
    layout: FileLayout,
    buf: Vec<u8>,
    slots: Vec<CharacterSlot>,
    common: CommonSection,
}

impl SaveContainer {
    /// Parse a whole container from its file bytes. The platform is
    /// detected from the exact file length.
    pub fn from_bytes(buf: Vec<u8>) -> Result<Self, ParseError> {
        let Some(platform) = Platform::detect(buf.len()) else {
            return Err(ParseError::BadFileSize {
                actual: buf.len(),
                expected_pc: Platform::Pc.file_len(),
                expected_console: Platform::Console.file_len(),
            });
        };
        let layout = FileLayout::new(platform);

        let mut slots = Vec::with_capacity(SLOT_COUNT);
        for i in 0..SLOT_COUNT {
            let data = layout.data(RegionId::Slot(i));
            slots.push(CharacterSlot::parse(&buf[data.start..data.end])?);
        }
        let common_data = layout.data(RegionId::Common);
        let common = CommonSection::parse(&buf[common_data.start..common_data.end], platform)?;

        debug!(
            ?platform,
            occupied = slots.iter().filter(|s| !s.is_empty()).count(),
            "container parsed"
        );
        Ok(Self {
            layout,
            buf,
            slots,
            common,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        info!(path = %path.display(), len = bytes.len(), "loading save container");
        Self::from_bytes(bytes)
    }

    /// A blank container: every slot empty, common section defaulted,
    /// all checksums valid.
    pub fn create(platform: Platform) -> Self {
        let layout = FileLayout::new(platform);
        let mut container = Self {
            layout,
            buf: vec![0u8; layout.file_len()],
            slots: (0..SLOT_COUNT).map(|_| CharacterSlot::empty()).collect(),
            common: CommonSection::new(platform),
        };
        for i in 0..SLOT_COUNT {
            container.write_slot_region(i);
        }
        container.write_common_region();
        container
    }

    pub fn platform(&self) -> Platform {
        self.layout.platform()
    }

    pub fn layout(&self) -> &FileLayout {
        &self.layout
    }

    pub fn slot(&self, index: usize) -> &CharacterSlot {
        &self.slots[index]
    }

    /// Mutable access for editors. The caller must follow any edit
    /// with [`Self::rebuild_and_checksum`] before the buffer is
    /// consistent again.
    pub fn slot_mut(&mut self, index: usize) -> &mut CharacterSlot {
        &mut self.slots[index]
    }

    pub fn common(&self) -> &CommonSection {
        &self.common
    }

    pub fn common_mut(&mut self) -> &mut CommonSection {
        &mut self.common
    }

    pub(crate) fn check_index(index: usize) -> Result<(), OpError> {
        if index >= SLOT_COUNT {
            return Err(OpError::InvalidSlotIndex { index });
        }
        Ok(())
    }

    /// Re-serialize slot `index` into the buffer, refresh its profile
    /// mirror and occupancy flag, rebuild the common section, and
    /// recompute both checksums. Returns the rebuilt slot's field
    /// spans for diagnostics.
    pub fn rebuild_and_checksum(&mut self, index: usize) -> Result<Vec<FieldSpan>, OpError> {
        Self::check_index(index)?;
        let spans = self.write_slot_region(index);

        self.common.profiles[index] = ProfileSummaryEntry::regenerate_from(&self.slots[index]);
        self.common.active[index] = !self.slots[index].is_empty();
        self.write_common_region();
        Ok(spans)
    }

    /// Rebuild only the common section (after direct common edits).
    pub fn rebuild_common(&mut self) {
        self.write_common_region();
    }

    /// Raw bytes of slot `index`'s data region.
    pub fn slot_bytes(&self, index: usize) -> &[u8] {
        let data = self.layout.data(RegionId::Slot(index));
        &self.buf[data.start..data.end]
    }

    /// Report every region whose stored digest disagrees with its
    /// data. Empty on console files, which carry no headers.
    pub fn verify_checksums(&self) -> Vec<ChecksumIssue> {
        let mut issues = Vec::new();
        for i in 0..SLOT_COUNT {
            let id = RegionId::Slot(i);
            if let Some((stored, computed)) = checksum::verify_region(&self.buf, &self.layout, id) {
                issues.push(ChecksumIssue {
                    region: id,
                    stored,
                    computed,
                });
            }
        }
        if let Some((stored, computed)) =
            checksum::verify_region(&self.buf, &self.layout, RegionId::Common)
        {
            issues.push(ChecksumIssue {
                region: RegionId::Common,
                stored,
                computed,
            });
        }
        issues
    }

    pub fn listings(&self) -> Vec<CharacterListing> {
        (0..SLOT_COUNT)
            .map(|i| {
                let profile = &self.common.profiles[i];
                CharacterListing {
                    index: i,
                    active: self.common.active[i],
                    name: profile.name.clone(),
                    level: profile.level,
                    playtime_seconds: profile.playtime_seconds,
                }
            })
            .collect()
    }

    pub fn to_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let path = path.as_ref();
        info!(path = %path.display(), len = self.buf.len(), "writing save container");
        fs::write(path, &self.buf)
    }

    // --- internals shared with ops ---

    pub(crate) fn buf(&self) -> &[u8] {
        &self.buf
    }

    pub(crate) fn buf_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }

    /// Serialize the parsed slot record into its region and stamp the
    /// checksum. Mirror maintenance is the caller's job.
    pub(crate) fn write_slot_region(&mut self, index: usize) -> Vec<FieldSpan> {
        let (bytes, spans) = rebuild::rebuild(&self.slots[index]);
        let data = self.layout.data(RegionId::Slot(index));
        self.buf[data.start..data.end].copy_from_slice(&bytes);
        checksum::write_region(&mut self.buf, &self.layout, RegionId::Slot(index));
        spans
    }

    pub(crate) fn write_common_region(&mut self) {
        let bytes = self.common.rebuild(self.platform());
        let data = self.layout.data(RegionId::Common);
        self.buf[data.start..data.end].copy_from_slice(&bytes);
        checksum::write_region(&mut self.buf, &self.layout, RegionId::Common);
    }

    /// Re-read a slot record from the buffer after a raw region edit.
    pub(crate) fn reparse_slot(&mut self, index: usize) -> Result<(), ParseError> {
        let data = self.layout.data(RegionId::Slot(index));
        self.slots[index] = CharacterSlot::parse(&self.buf[data.start..data.end])?;
        Ok(())
    }

    /// Replace the in-memory record (used by delete's empty sentinel).
    pub(crate) fn set_slot(&mut self, index: usize, slot: CharacterSlot) {
        self.slots[index] = slot;
    }
}
