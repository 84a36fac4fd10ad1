//! Sequential little-endian reader/writer over a fixed-size byte buffer
//!
//! Every binary codec goes through [`ByteCursor`]. Reads and writes advance
//! the offset by the width of the value; any access past the end of the
//! buffer fails with [`CursorError::OutOfBounds`] instead of yielding garbage.
//!
//! Writers never grow the buffer. Encoders compute the exact output size up
//! front (it only depends on the action count) and hand the cursor a zeroed
//! buffer of that size.

use byteorder::{ByteOrder, LittleEndian};

/// Bounds violation while reading or writing
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    #[error("needed {needed} bytes at offset {offset}, only {available} available")]
    OutOfBounds {
        offset: usize,
        needed: usize,
        available: usize,
    },
}

/// Cursor over a byte buffer
#[derive(Debug, Clone)]
pub struct ByteCursor<B> {
    buf: B,
    pos: usize,
}

impl<B: AsRef<[u8]>> ByteCursor<B> {
    /// Create a cursor positioned at the start of `buf`
    pub fn new(buf: B) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current offset
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move to an absolute offset (may point past the end; the next access fails)
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Total buffer length
    pub fn len(&self) -> usize {
        self.buf.as_ref().len()
    }

    /// Whether the underlying buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes left after the current offset
    pub fn remaining(&self) -> usize {
        self.len().saturating_sub(self.pos)
    }

    /// True once the offset has reached the end of the buffer
    pub fn is_eof(&self) -> bool {
        self.pos >= self.len()
    }

    /// Borrow the underlying buffer
    pub fn get_ref(&self) -> &B {
        &self.buf
    }

    /// Consume the cursor and return the buffer
    pub fn into_inner(self) -> B {
        self.buf
    }

    fn check(&self, needed: usize) -> Result<usize, CursorError> {
        let available = self.remaining();
        if needed > available {
            return Err(CursorError::OutOfBounds {
                offset: self.pos,
                needed,
                available,
            });
        }
        Ok(self.pos)
    }

    /// Take the next `len` bytes and advance
    pub fn read_bytes(&mut self, len: usize) -> Result<&[u8], CursorError> {
        let start = self.check(len)?;
        self.pos += len;
        Ok(&self.buf.as_ref()[start..start + len])
    }

    /// Look at the next `len` bytes without advancing
    pub fn peek_bytes(&self, len: usize) -> Result<&[u8], CursorError> {
        let start = self.check(len)?;
        Ok(&self.buf.as_ref()[start..start + len])
    }

    pub fn read_u8(&mut self) -> Result<u8, CursorError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, CursorError> {
        Ok(LittleEndian::read_u16(self.read_bytes(2)?))
    }

    pub fn read_i16(&mut self) -> Result<i16, CursorError> {
        Ok(LittleEndian::read_i16(self.read_bytes(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32, CursorError> {
        Ok(LittleEndian::read_u32(self.read_bytes(4)?))
    }

    pub fn read_i32(&mut self) -> Result<i32, CursorError> {
        Ok(LittleEndian::read_i32(self.read_bytes(4)?))
    }

    pub fn read_f32(&mut self) -> Result<f32, CursorError> {
        Ok(LittleEndian::read_f32(self.read_bytes(4)?))
    }

    /// Read a fixed-length ASCII string (non-UTF-8 bytes are replaced)
    pub fn read_str(&mut self, len: usize) -> Result<String, CursorError> {
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Read bytes up to and including `delim`, one char per byte
    ///
    /// Fails if the buffer ends before the delimiter shows up.
    pub fn read_until(&mut self, delim: u8) -> Result<String, CursorError> {
        let mut s = String::new();
        loop {
            let byte = self.read_u8()?;
            s.push(byte as char);
            if byte == delim {
                return Ok(s);
            }
        }
    }

    /// Decode the whole buffer as UTF-8 text (invalid sequences are replaced)
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(self.buf.as_ref()).into_owned()
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> ByteCursor<B> {
    fn slot(&mut self, len: usize) -> Result<&mut [u8], CursorError> {
        let start = self.check(len)?;
        self.pos += len;
        Ok(&mut self.buf.as_mut()[start..start + len])
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), CursorError> {
        self.slot(bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), CursorError> {
        self.slot(1)?[0] = value;
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<(), CursorError> {
        LittleEndian::write_u16(self.slot(2)?, value);
        Ok(())
    }

    pub fn write_i16(&mut self, value: i16) -> Result<(), CursorError> {
        LittleEndian::write_i16(self.slot(2)?, value);
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<(), CursorError> {
        LittleEndian::write_u32(self.slot(4)?, value);
        Ok(())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<(), CursorError> {
        LittleEndian::write_i32(self.slot(4)?, value);
        Ok(())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<(), CursorError> {
        LittleEndian::write_f32(self.slot(4)?, value);
        Ok(())
    }

    /// Write an ASCII string byte by byte (no terminator)
    pub fn write_str(&mut self, s: &str) -> Result<(), CursorError> {
        self.write_bytes(s.as_bytes())
    }
}

impl ByteCursor<Vec<u8>> {
    /// Zeroed buffer of exactly `size` bytes, ready for writing
    pub fn with_size(size: usize) -> Self {
        Self::new(vec![0u8; size])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_little_endian() {
        let data = [0x01, 0x02, 0x03, 0x04, 0xFF, 0xFF, 0x00, 0x00, 0x20, 0x41];
        let mut cursor = ByteCursor::new(&data[..]);

        assert_eq!(cursor.read_u32().unwrap(), 0x0403_0201);
        assert_eq!(cursor.read_i16().unwrap(), -1);
        assert_eq!(cursor.read_f32().unwrap(), 10.0);
        assert!(cursor.is_eof());
    }

    #[test]
    fn test_read_past_end_is_error() {
        let data = [0x01, 0x02, 0x03];
        let mut cursor = ByteCursor::new(&data[..]);

        cursor.read_u8().unwrap();
        let err = cursor.read_u32().unwrap_err();
        assert_eq!(
            err,
            CursorError::OutOfBounds {
                offset: 1,
                needed: 4,
                available: 2,
            }
        );
        // Failed read doesn't advance
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_write_fixed_buffer() {
        let mut cursor = ByteCursor::with_size(7);
        cursor.write_str("RP").unwrap();
        cursor.write_u8(2).unwrap();
        cursor.write_f32(60.0).unwrap();
        assert!(cursor.is_eof());
        assert!(cursor.write_u8(0).is_err());

        let bytes = cursor.into_inner();
        assert_eq!(&bytes[..3], b"RP\x02");
        assert_eq!(LittleEndian::read_f32(&bytes[3..]), 60.0);
    }

    #[test]
    fn test_read_str_and_until() {
        let data = b"fps: 60\nframes\n";
        let mut cursor = ByteCursor::new(&data[..]);

        assert_eq!(cursor.read_str(5).unwrap(), "fps: ");
        assert_eq!(cursor.read_until(b'\n').unwrap(), "60\n");
        assert_eq!(cursor.read_until(b'\n').unwrap(), "frames\n");
        assert!(cursor.read_until(b'\n').is_err());
    }

    #[test]
    fn test_peek_does_not_advance() {
        let data = b"RPLY\x02";
        let cursor = ByteCursor::new(&data[..]);
        assert_eq!(cursor.peek_bytes(4).unwrap(), b"RPLY");
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.to_text(), "RPLY\u{2}");
    }

    #[test]
    fn test_seek_past_end() {
        let data = [0u8; 4];
        let mut cursor = ByteCursor::new(&data[..]);
        cursor.seek(10);
        assert!(cursor.is_eof());
        assert_eq!(cursor.remaining(), 0);
        assert!(cursor.read_u8().is_err());
    }
}
