use crate::layout::FieldSpan;

/// Emit-side twin of [`crate::reader::SliceReader`]: builds a region
/// byte-for-byte in wire order, recording a diagnostic span per
/// logical field, then zero-pads to the fixed region size.
pub struct SectionWriter {
    out: Vec<u8>,
    spans: Vec<FieldSpan>,
}

impl SectionWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            out: Vec::with_capacity(capacity),
            spans: Vec::new(),
        }
    }

    pub fn put_u8(&mut self, v: u8) {
        self.out.push(v);
    }

    pub fn put_u16(&mut self, v: u16) {
        self.out.extend_from_slice(&v.to_le_bytes());
    }

    pub fn put_u32(&mut self, v: u32) {
        self.out.extend_from_slice(&v.to_le_bytes());
    }

    pub fn put_u64(&mut self, v: u64) {
        self.out.extend_from_slice(&v.to_le_bytes());
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes);
    }

    /// Write a fixed-width UTF-16LE string field of `n_bytes` bytes:
    /// encoded code units, a NUL terminator, zero padding. Strings too
    /// long for the field are truncated to whole code units.
    pub fn put_fixed_utf16(&mut self, s: &str, n_bytes: usize) {
        let max_units = n_bytes / 2 - 1;
        let start = self.out.len();
        for unit in s.encode_utf16().take(max_units) {
            self.out.extend_from_slice(&unit.to_le_bytes());
        }
        self.out.resize(start + n_bytes, 0);
    }

    /// Record that the bytes written since `start` belong to `name`.
    pub fn record_span(&mut self, name: &'static str, start: usize) {
        self.spans.push(FieldSpan {
            name,
            start,
            end: self.out.len(),
        });
    }

    /// Zero-fill up to `len`. The caller guarantees the logical fields
    /// fit the region; field-length clamping upstream makes overflow
    /// unreachable.
    pub fn pad_to(&mut self, len: usize) {
        debug_assert!(self.out.len() <= len, "region overflow: {} > {len}", self.out.len());
        self.out.resize(len, 0);
    }

    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    pub fn finish(self) -> (Vec<u8>, Vec<FieldSpan>) {
        (self.out, self.spans)
    }
}
