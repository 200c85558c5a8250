use super::error::RecordError;

/// Byte order used when decoding multi-byte header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// Bounds-checked view over a capture buffer (or one record of it).
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    endian: Endian,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8], endian: Endian) -> Self {
        Self { data, endian }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn read_u16(&self, offset: usize) -> Result<u16, RecordError> {
        let bytes = self.read_array::<2>(offset)?;
        Ok(match self.endian {
            Endian::Little => u16::from_le_bytes(bytes),
            Endian::Big => u16::from_be_bytes(bytes),
        })
    }

    pub fn read_u32(&self, offset: usize) -> Result<u32, RecordError> {
        let bytes = self.read_array::<4>(offset)?;
        Ok(match self.endian {
            Endian::Little => u32::from_le_bytes(bytes),
            Endian::Big => u32::from_be_bytes(bytes),
        })
    }

    /// Borrow `len` bytes starting at `offset` without copying.
    pub fn read_slice(&self, offset: usize, len: usize) -> Result<&'a [u8], RecordError> {
        let end = offset.checked_add(len).ok_or(RecordError::OutOfBounds {
            needed: usize::MAX,
            actual: self.data.len(),
        })?;
        self.data.get(offset..end).ok_or(RecordError::OutOfBounds {
            needed: end,
            actual: self.data.len(),
        })
    }

    fn read_array<const N: usize>(&self, offset: usize) -> Result<[u8; N], RecordError> {
        let bytes = self.read_slice(offset, N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }
}
