//! Binary buffer reader with cursor tracking.

use std::str;

use crate::BufferError;

/// A binary buffer reader that reads data from a byte slice.
///
/// The reader maintains a cursor position and provides methods for reading
/// various integer types and strings. Reads past the end return
/// [`BufferError::EndOfBuffer`] and leave the cursor where it was.
///
/// # Example
///
/// ```
/// use modelkit_buffers::Reader;
///
/// let data = [0x01, 0x02, 0x03, 0x04];
/// let mut reader = Reader::new(&data);
///
/// assert_eq!(reader.u8().unwrap(), 0x01);
/// assert_eq!(reader.u16().unwrap(), 0x0203);
/// assert!(reader.u16().is_err());
/// ```
pub struct Reader<'a> {
    /// The underlying byte slice.
    pub uint8: &'a [u8],
    /// Current cursor position.
    pub x: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader for the given byte slice.
    pub fn new(uint8: &'a [u8]) -> Self {
        Self { uint8, x: 0 }
    }

    /// Returns the number of remaining bytes.
    pub fn size(&self) -> usize {
        self.uint8.len() - self.x
    }

    /// True once every byte has been consumed.
    pub fn is_eof(&self) -> bool {
        self.x >= self.uint8.len()
    }

    /// Returns a subarray of the given size and advances the cursor.
    pub fn buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        let start = self.x;
        let end = start
            .checked_add(size)
            .filter(|end| *end <= self.uint8.len())
            .ok_or(BufferError::EndOfBuffer {
                offset: start,
                needed: size,
            })?;
        self.x = end;
        Ok(&self.uint8[start..end])
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], BufferError> {
        let bytes = self.buf(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Reads an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self) -> Result<u8, BufferError> {
        Ok(self.array::<1>()?[0])
    }

    /// Reads an unsigned 16-bit integer (big-endian).
    #[inline]
    pub fn u16(&mut self) -> Result<u16, BufferError> {
        Ok(u16::from_be_bytes(self.array()?))
    }

    /// Reads an unsigned 32-bit integer (big-endian).
    #[inline]
    pub fn u32(&mut self) -> Result<u32, BufferError> {
        Ok(u32::from_be_bytes(self.array()?))
    }

    /// Reads a signed 64-bit integer (big-endian).
    #[inline]
    pub fn i64(&mut self) -> Result<i64, BufferError> {
        Ok(i64::from_be_bytes(self.array()?))
    }

    /// Reads a 64-bit floating point number (big-endian).
    #[inline]
    pub fn f64(&mut self) -> Result<f64, BufferError> {
        Ok(f64::from_be_bytes(self.array()?))
    }

    /// Reads a UTF-8 string of the given size.
    pub fn utf8(&mut self, size: usize) -> Result<&'a str, BufferError> {
        let start = self.x;
        let bytes = self.buf(size)?;
        str::from_utf8(bytes).map_err(|_| {
            self.x = start;
            BufferError::InvalidUtf8(start)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u8() {
        let data = [0x01, 0x02, 0x03];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.u8().unwrap(), 0x01);
        assert_eq!(reader.u8().unwrap(), 0x02);
        assert_eq!(reader.u8().unwrap(), 0x03);
        assert!(reader.is_eof());
    }

    #[test]
    fn test_u16() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.u16().unwrap(), 0x0102);
        assert_eq!(reader.u16().unwrap(), 0x0304);
    }

    #[test]
    fn test_u32() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.u32().unwrap(), 0x01020304);
    }

    #[test]
    fn short_read_keeps_cursor() {
        let data = [0x01, 0x02, 0x03];
        let mut reader = Reader::new(&data);
        reader.u8().unwrap();
        assert_eq!(
            reader.u32(),
            Err(BufferError::EndOfBuffer {
                offset: 1,
                needed: 4
            })
        );
        assert_eq!(reader.size(), 2);
        assert_eq!(reader.u8(), Ok(0x02));
    }

    #[test]
    fn huge_length_does_not_overflow() {
        let data = [0x00];
        let mut reader = Reader::new(&data);
        reader.u8().unwrap();
        assert!(reader.buf(usize::MAX).is_err());
    }

    #[test]
    fn test_utf8() {
        let data = b"hello world";
        let mut reader = Reader::new(data);
        assert_eq!(reader.utf8(5).unwrap(), "hello");
        assert_eq!(reader.utf8(6).unwrap(), " world");
    }

    #[test]
    fn invalid_utf8_is_reported() {
        let data = [0xff, 0xfe];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.utf8(2), Err(BufferError::InvalidUtf8(0)));
        assert_eq!(reader.size(), 2);
    }
}
