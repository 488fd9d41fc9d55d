use super::crc::{read_full, Crc32Reader};
use crate::error::{PsiError, Result};
use std::io::{self, Cursor, Read, Write};

/// A byte source a section can be decoded from.
///
/// Sources that accumulate a checksum override [`SectionSource::finish_section`]
/// to read and verify the trailer once the section body is exhausted. Plain
/// sources keep the default, which reports that no trailer was checked.
pub trait SectionSource: Read {
    /// Reads and verifies the CRC32 trailer, if this source tracks one.
    fn finish_section(&mut self) -> Result<Option<u32>> {
        Ok(None)
    }
}

impl SectionSource for &[u8] {}

impl<T: AsRef<[u8]>> SectionSource for Cursor<T> {}

impl<S: SectionSource + ?Sized> SectionSource for &mut S {
    fn finish_section(&mut self) -> Result<Option<u32>> {
        (**self).finish_section()
    }
}

impl<R: Read> SectionSource for Crc32Reader<R> {
    fn finish_section(&mut self) -> Result<Option<u32>> {
        self.verify_trailer().map(Some)
    }
}

/// Restricts reads to a declared number of bytes.
///
/// The window enforces the declared boundary, not physical availability: a
/// read of more bytes than remain in the counter fails even if the wrapped
/// source could supply them.
#[derive(Debug)]
pub struct BoundedReader<R> {
    inner: R,
    remaining: usize,
}

impl<R: Read> BoundedReader<R> {
    /// Opens a window of `len` bytes over `inner`.
    pub fn new(inner: R, len: usize) -> Self {
        Self {
            inner,
            remaining: len,
        }
    }

    /// Bytes left before the window is exhausted.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// True once every declared byte has been read
    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    /// Reads exactly `buf.len()` bytes for `field`.
    pub fn read_field(&mut self, field: &'static str, buf: &mut [u8]) -> Result<()> {
        if buf.len() > self.remaining {
            return Err(PsiError::truncated(field, buf.len(), self.remaining));
        }
        read_full(&mut self.inner, buf, field)?;
        self.remaining -= buf.len();
        Ok(())
    }

    /// Reads one byte
    pub fn read_u8(&mut self, field: &'static str) -> Result<u8> {
        let mut b = [0u8; 1];
        self.read_field(field, &mut b)?;
        Ok(b[0])
    }

    /// Reads a big-endian 16-bit slot.
    pub fn read_u16(&mut self, field: &'static str) -> Result<u16> {
        let mut b = [0u8; 2];
        self.read_field(field, &mut b)?;
        Ok(u16::from_be_bytes(b))
    }

    /// Reads `len` bytes into a fresh buffer.
    pub fn read_vec(&mut self, field: &'static str, len: usize) -> Result<Vec<u8>> {
        let mut data = vec![0u8; len];
        self.read_field(field, &mut data)?;
        Ok(data)
    }

    /// Opens a nested window of `len` bytes. Bytes read through it are also
    /// taken from this window.
    pub fn window(&mut self, field: &'static str, len: usize) -> Result<BoundedReader<&mut Self>> {
        if len > self.remaining {
            return Err(PsiError::truncated(field, len, self.remaining));
        }
        Ok(BoundedReader::new(self, len))
    }

    /// Mutable access to the wrapped source, bypassing the counter.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Gives back the wrapped source
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for BoundedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let limit = buf.len().min(self.remaining);
        let n = self.inner.read(&mut buf[..limit])?;
        self.remaining -= n;
        Ok(n)
    }
}

impl<R: SectionSource> SectionSource for BoundedReader<R> {
    fn finish_section(&mut self) -> Result<Option<u32>> {
        self.inner.finish_section()
    }
}

/// Restricts writes to a declared number of bytes, which must all be filled
/// before [`BoundedWriter::finish`] succeeds.
pub struct BoundedWriter<W> {
    inner: W,
    remaining: usize,
}

impl<W: Write> BoundedWriter<W> {
    /// Opens a window of `len` bytes over `inner`
    pub fn new(inner: W, len: usize) -> Self {
        Self {
            inner,
            remaining: len,
        }
    }

    /// Bytes still to be written
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Writes all of `data` for `field`.
    pub fn write_field(&mut self, field: &'static str, data: &[u8]) -> Result<()> {
        if data.len() > self.remaining {
            return Err(PsiError::truncated(field, data.len(), self.remaining));
        }
        self.inner.write_all(data)?;
        self.remaining -= data.len();
        Ok(())
    }

    /// Returns the sink once the declared length has been written exactly.
    pub fn finish(self, field: &'static str) -> Result<W> {
        if self.remaining != 0 {
            return Err(PsiError::truncated(field, self.remaining, 0));
        }
        Ok(self.inner)
    }
}

impl<W: Write> Write for BoundedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.remaining == 0 && !buf.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "bounded window exhausted",
            ));
        }
        let limit = buf.len().min(self.remaining);
        let n = self.inner.write(&buf[..limit])?;
        self.remaining -= n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
