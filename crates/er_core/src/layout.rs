//! Fixed container geometry.
//!
//! Offsets are computed once from these constants and never derived
//! from file content: the game's loader seeks to slot `i` by
//! `i * stride`, so the layout is the contract.

pub const SLOT_COUNT: usize = 10;
pub const SLOT_SIZE: usize = 0x28_0000;
pub const COMMON_SIZE: usize = 0x6_0000;
pub const CHECKSUM_SIZE: usize = 0x10;

/// Which platform wrote the file. Console saves carry no per-region
/// checksum headers; everything else about the layout is identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Pc,
    Console,
}

impl Platform {
    pub fn checksum_size(self) -> usize {
        match self {
            Platform::Pc => CHECKSUM_SIZE,
            Platform::Console => 0,
        }
    }

    /// Exact on-disk length of a container for this platform.
    pub fn file_len(self) -> usize {
        let cs = self.checksum_size();
        SLOT_COUNT * (cs + SLOT_SIZE) + cs + COMMON_SIZE
    }

    /// Detect the platform from a file length. The two expected
    /// lengths differ, so detection is unambiguous.
    pub fn detect(file_len: usize) -> Option<Platform> {
        if file_len == Platform::Pc.file_len() {
            Some(Platform::Pc)
        } else if file_len == Platform::Console.file_len() {
            Some(Platform::Console)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// One checksummed region of the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionId {
    Slot(usize),
    Common,
}

impl std::fmt::Display for RegionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegionId::Slot(i) => write!(f, "slot {i}"),
            RegionId::Common => write!(f, "common section"),
        }
    }
}

/// Derived offset table into the container buffer.
#[derive(Debug, Clone, Copy)]
pub struct FileLayout {
    platform: Platform,
}

impl FileLayout {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn file_len(&self) -> usize {
        self.platform.file_len()
    }

    fn region_start(&self, id: RegionId) -> usize {
        let stride = self.platform.checksum_size() + SLOT_SIZE;
        match id {
            RegionId::Slot(i) => {
                debug_assert!(i < SLOT_COUNT);
                i * stride
            }
            RegionId::Common => SLOT_COUNT * stride,
        }
    }

    /// Whole region including its checksum header (if any).
    pub fn region(&self, id: RegionId) -> ByteRange {
        let start = self.region_start(id);
        let data_len = match id {
            RegionId::Slot(_) => SLOT_SIZE,
            RegionId::Common => COMMON_SIZE,
        };
        ByteRange {
            start,
            end: start + self.platform.checksum_size() + data_len,
        }
    }

    /// The checksum header bytes, when the platform has them.
    pub fn checksum(&self, id: RegionId) -> Option<ByteRange> {
        match self.platform {
            Platform::Console => None,
            Platform::Pc => {
                let start = self.region_start(id);
                Some(ByteRange {
                    start,
                    end: start + CHECKSUM_SIZE,
                })
            }
        }
    }

    /// The data bytes the checksum covers.
    pub fn data(&self, id: RegionId) -> ByteRange {
        let region = self.region(id);
        ByteRange {
            start: region.start + self.platform.checksum_size(),
            end: region.end,
        }
    }
}

/// Diagnostic span recorded by the rebuilder: where one logical field
/// landed in the rebuilt region. Tooling only, not needed for
/// correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpan {
    pub name: &'static str,
    pub start: usize,
    pub end: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pc_layout_covers_file_exactly() {
        let layout = FileLayout::new(Platform::Pc);
        let mut expected = 0usize;
        for i in 0..SLOT_COUNT {
            let region = layout.region(RegionId::Slot(i));
            assert_eq!(region.start, expected);
            assert_eq!(region.len(), CHECKSUM_SIZE + SLOT_SIZE);
            expected = region.end;
        }
        let common = layout.region(RegionId::Common);
        assert_eq!(common.start, expected);
        assert_eq!(common.end, layout.file_len());
    }

    #[test]
    fn console_layout_has_no_checksum_headers() {
        let layout = FileLayout::new(Platform::Console);
        assert!(layout.checksum(RegionId::Slot(0)).is_none());
        assert_eq!(layout.data(RegionId::Slot(1)).start, SLOT_SIZE);
        assert_eq!(
            layout.file_len(),
            SLOT_COUNT * SLOT_SIZE + COMMON_SIZE
        );
    }

    #[test]
    fn platform_detection_is_unambiguous() {
        assert_eq!(Platform::detect(Platform::Pc.file_len()), Some(Platform::Pc));
        assert_eq!(
            Platform::detect(Platform::Console.file_len()),
            Some(Platform::Console)
        );
        assert_eq!(Platform::detect(123), None);
    }
}
