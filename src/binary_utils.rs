use std::io::{Cursor, Read};

use crate::error::{DecodeError, Result};

/// Bounds-checked cursor over an owned byte buffer.
///
/// Every multi-byte read names its endianness; archive formats mix both, so there is no
/// native-endian read on purpose.
#[derive(Clone, Debug, Default)]
pub struct InputStream {
    cursor: Cursor<Vec<u8>>,
}

impl InputStream {
    pub fn new(data: Vec<u8>) -> Self {
        InputStream {
            cursor: Cursor::new(data),
        }
    }

    pub fn len(&self) -> usize {
        self.cursor.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn tell(&self) -> usize {
        self.cursor.position() as usize
    }

    pub fn remaining(&self) -> usize {
        self.len() - self.tell()
    }

    pub fn eof(&self) -> bool {
        self.tell() >= self.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        self.cursor.get_ref()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.cursor.into_inner()
    }

    pub fn seek(&mut self, position: usize) -> Result<&mut Self> {
        if position > self.len() {
            return Err(DecodeError::OutOfRange {
                position,
                length: self.len(),
            });
        }

        self.cursor.set_position(position as u64);
        Ok(self)
    }

    pub fn skip(&mut self, count: usize) -> Result<&mut Self> {
        let target = self
            .tell()
            .checked_add(count)
            .ok_or(DecodeError::OutOfRange {
                position: usize::MAX,
                length: self.len(),
            })?;
        self.seek(target)
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        if needed > self.remaining() {
            return Err(DecodeError::UnexpectedEof {
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    /// Reads exactly `length` bytes or fails without moving the cursor.
    pub fn read(&mut self, length: usize) -> Result<Vec<u8>> {
        self.ensure(length)?;

        let mut buffer = vec![0u8; length];
        self.cursor.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Returns the next `length` bytes without consuming them.
    pub fn peek(&self, length: usize) -> Result<&[u8]> {
        self.ensure(length)?;
        let start = self.tell();
        Ok(&self.as_slice()[start..start + length])
    }

    pub fn read_to_eof(&mut self) -> Vec<u8> {
        let start = self.tell();
        let rest = self.as_slice()[start..].to_vec();
        self.cursor.set_position(self.len() as u64);
        rest
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.ensure(N)?;

        let mut buf = [0u8; N];
        self.cursor.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u16_be(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32_be(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_i32_le(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64_le(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64_be(&mut self) -> Result<u64> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }
}

impl From<Vec<u8>> for InputStream {
    fn from(data: Vec<u8>) -> Self {
        InputStream::new(data)
    }
}

impl From<&[u8]> for InputStream {
    fn from(data: &[u8]) -> Self {
        InputStream::new(data.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_both_endiannesses() {
        let mut stream = InputStream::from(&[0x01, 0x02, 0x03, 0x04, 0x01, 0x02, 0x03, 0x04][..]);
        assert_eq!(stream.read_u32_le().unwrap(), 0x0403_0201);
        assert_eq!(stream.read_u32_be().unwrap(), 0x0102_0304);
        assert!(stream.eof());
    }

    #[test]
    fn mixed_width_reads_advance_cursor() {
        let mut stream = InputStream::from(&[0xAA, 0x34, 0x12, 0x12, 0x34, 0xFF][..]);
        assert_eq!(stream.read_u8().unwrap(), 0xAA);
        assert_eq!(stream.read_u16_le().unwrap(), 0x1234);
        assert_eq!(stream.read_u16_be().unwrap(), 0x1234);
        assert_eq!(stream.tell(), 5);
        assert_eq!(stream.remaining(), 1);
    }

    #[test]
    fn short_read_fails_and_keeps_position() {
        let mut stream = InputStream::from(&[1, 2, 3][..]);
        stream.skip(1).unwrap();
        match stream.read_u32_le() {
            Err(DecodeError::UnexpectedEof { needed, remaining }) => {
                assert_eq!(needed, 4);
                assert_eq!(remaining, 2);
            }
            other => panic!("expected UnexpectedEof, got {:?}", other),
        }
        assert_eq!(stream.tell(), 1);
        assert!(stream.read(3).is_err());
        assert_eq!(stream.read(2).unwrap(), vec![2, 3]);
    }

    #[test]
    fn seek_past_end_is_out_of_range() {
        let mut stream = InputStream::from(&[0u8; 4][..]);
        assert!(stream.seek(4).is_ok());
        assert!(stream.eof());
        assert!(matches!(
            stream.seek(5),
            Err(DecodeError::OutOfRange {
                position: 5,
                length: 4
            })
        ));
        assert!(matches!(stream.skip(1), Err(DecodeError::OutOfRange { .. })));
    }

    #[test]
    fn peek_does_not_consume() {
        let mut stream = InputStream::from(&b"WIPF\x01\x00"[..]);
        assert_eq!(stream.peek(4).unwrap(), b"WIPF");
        assert_eq!(stream.tell(), 0);
        stream.skip(4).unwrap();
        assert_eq!(stream.read_to_eof(), vec![1, 0]);
        assert!(stream.eof());
    }
}
