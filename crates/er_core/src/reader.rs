use crate::error::ParseError;

/// Little-endian primitive reads over an in-memory region.
///
/// Every read that would run past the end of the slice fails with
/// [`ParseError::Truncated`] carrying the exact offset and shortfall.
pub struct SliceReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ParseError> {
        let remaining = self.data.len() - self.pos;
        if remaining < n {
            return Err(ParseError::Truncated {
                offset: self.pos,
                needed: n,
                remaining,
            });
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, ParseError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32, ParseError> {
        Ok(u32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    pub fn read_u64(&mut self) -> Result<u64, ParseError> {
        Ok(u64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ParseError> {
        Ok(self.take(N)?.try_into().unwrap())
    }

    pub fn read_u32_array<const N: usize>(&mut self) -> Result<[u32; N], ParseError> {
        let mut out = [0u32; N];
        for item in &mut out {
            *item = self.read_u32()?;
        }
        Ok(out)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, ParseError> {
        Ok(self.take(n)?.to_vec())
    }

    /// Read a fixed-width UTF-16LE string field of `n_bytes` bytes,
    /// stopping at the first NUL code unit. Malformed code units are
    /// replaced rather than failing the whole record: names are
    /// display-only and the rebuild path re-encodes them.
    pub fn read_fixed_utf16(&mut self, n_bytes: usize) -> Result<String, ParseError> {
        let raw = self.take(n_bytes)?;
        let mut units = Vec::with_capacity(n_bytes / 2);
        for pair in raw.chunks_exact(2) {
            let unit = u16::from_le_bytes([pair[0], pair[1]]);
            if unit == 0 {
                break;
            }
            units.push(unit);
        }
        Ok(String::from_utf16_lossy(&units))
    }

    pub fn skip(&mut self, n: usize) -> Result<(), ParseError> {
        self.take(n)?;
        Ok(())
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}
