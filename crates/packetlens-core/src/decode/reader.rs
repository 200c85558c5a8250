use std::net::Ipv4Addr;

use super::error::DecodeError;

/// Safe byte access into a link-layer frame; network fields are big-endian.
pub struct FrameReader<'a> {
    frame: &'a [u8],
}

impl<'a> FrameReader<'a> {
    pub fn new(frame: &'a [u8]) -> Self {
        Self { frame }
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, DecodeError> {
        self.frame
            .get(offset)
            .copied()
            .ok_or(DecodeError::TooShort {
                needed: offset + 1,
                actual: self.frame.len(),
            })
    }

    pub fn read_u16_be(&self, range: std::ops::Range<usize>) -> Result<u16, DecodeError> {
        let bytes = self.read_slice(range)?;
        match bytes {
            [hi, lo] => Ok(u16::from_be_bytes([*hi, *lo])),
            _ => Err(DecodeError::TooShort {
                needed: 2,
                actual: bytes.len(),
            }),
        }
    }

    pub fn read_ipv4(&self, range: std::ops::Range<usize>) -> Result<Ipv4Addr, DecodeError> {
        let bytes = self.read_slice(range)?;
        match bytes {
            [a, b, c, d] => Ok(Ipv4Addr::new(*a, *b, *c, *d)),
            _ => Err(DecodeError::TooShort {
                needed: 4,
                actual: bytes.len(),
            }),
        }
    }

    pub fn read_slice(&self, range: std::ops::Range<usize>) -> Result<&'a [u8], DecodeError> {
        self.frame
            .get(range.clone())
            .ok_or(DecodeError::TooShort {
                needed: range.end,
                actual: self.frame.len(),
            })
    }
}
