//! CRC32 implementation specifically for MPEG-2 TS PSI tables
//! Based on ITU-T H.222.0 / ISO/IEC 13818-1
//! Polynomial: x32 + x26 + x23 + x22 + x16 + x12 + x11 + x10 + x8 + x7 + x5 + x4 + x2 + x + 1
//! Initial value: 0xFFFFFFFF, no reflection, no final XOR

use crate::error::{PsiError, Result};
use std::io::{self, Read, Write};

const CRC32_MPEG2: u32 = 0x04C11DB7;

const CRC32_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u32) << 24;
        let mut bit = 0;
        while bit < 8 {
            crc = if (crc & 0x80000000) != 0 {
                (crc << 1) ^ CRC32_MPEG2
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
};

/// Running MPEG-2 CRC32 used to validate and generate PSI section trailers.
///
/// The register starts at `0xFFFFFFFF` and is fed every byte from `table_id`
/// up to the last byte before the trailer.
#[derive(Debug, Clone, Copy)]
pub struct Crc32Mpeg2 {
    value: u32,
}

impl Crc32Mpeg2 {
    /// Creates a calculator in its initial state
    pub fn new() -> Self {
        Self { value: 0xFFFFFFFF }
    }

    /// Calculates the CRC32 checksum for the given data in one shot
    ///
    /// # Examples
    ///
    /// ```
    /// use ts_pmt::utils::Crc32Mpeg2;
    ///
    /// assert_eq!(Crc32Mpeg2::calculate(b"123456789"), 0x0376E6E7);
    /// ```
    pub fn calculate(data: &[u8]) -> u32 {
        let mut crc = Self::new();
        crc.update(data);
        crc.value()
    }

    /// Feeds more bytes into the register
    pub fn update(&mut self, data: &[u8]) {
        let mut crc = self.value;
        for &byte in data {
            let index = ((crc >> 24) ^ (byte as u32)) & 0xFF;
            crc = (crc << 8) ^ CRC32_TABLE[index as usize];
        }
        self.value = crc;
    }

    /// Current register value
    pub fn value(&self) -> u32 {
        self.value
    }
}

impl Default for Crc32Mpeg2 {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte source that accumulates a CRC32 over everything read through it and can
/// check the 4-byte big-endian trailer that follows.
pub struct Crc32Reader<R> {
    inner: R,
    crc: Crc32Mpeg2,
}

impl<R: Read> Crc32Reader<R> {
    /// Wraps `inner`, starting a fresh checksum.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            crc: Crc32Mpeg2::new(),
        }
    }

    /// Checksum of the bytes read so far.
    pub fn computed(&self) -> u32 {
        self.crc.value()
    }

    /// Reads the trailer, which is not itself accumulated, and compares it with
    /// the running checksum. Returns the trailer value on success.
    pub fn verify_trailer(&mut self) -> Result<u32> {
        let mut trailer = [0u8; 4];
        read_full(&mut self.inner, &mut trailer, "crc32")?;
        let expected = u32::from_be_bytes(trailer);
        let computed = self.crc.value();
        if expected != computed {
            log::warn!(
                "section crc check failed: trailer {:#010x}, computed {:#010x}",
                expected,
                computed
            );
            return Err(PsiError::ChecksumMismatch { expected, computed });
        }
        Ok(expected)
    }

    /// Gives back the wrapped source.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for Crc32Reader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.crc.update(&buf[..n]);
        Ok(n)
    }
}

/// Byte sink that accumulates a CRC32 over everything written through it and
/// appends the trailer on request.
pub struct Crc32Writer<W> {
    inner: W,
    crc: Crc32Mpeg2,
}

impl<W: Write> Crc32Writer<W> {
    /// Wraps `inner`, starting a fresh checksum.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            crc: Crc32Mpeg2::new(),
        }
    }

    /// Checksum of the bytes written so far.
    pub fn computed(&self) -> u32 {
        self.crc.value()
    }

    /// Writes the 4-byte big-endian trailer and returns the sink with the
    /// checksum that was written.
    pub fn finish(mut self) -> Result<(W, u32)> {
        let crc = self.crc.value();
        self.inner.write_all(&crc.to_be_bytes())?;
        Ok((self.inner, crc))
    }
}

impl<W: Write> Write for Crc32Writer<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.crc.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Fills `buf` from `src`, reporting end of data as a truncated `field`.
pub(crate) fn read_full<R: Read + ?Sized>(
    src: &mut R,
    buf: &mut [u8],
    field: &'static str,
) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match src.read(&mut buf[filled..]) {
            Ok(0) => return Err(PsiError::truncated(field, buf.len(), filled)),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_crc32_mpeg2() {
        // Test vector from STMicroelectronics community forum post
        assert_eq!(
            Crc32Mpeg2::calculate(&[0x01, 0x01]),
            0xD66FB816,
            "CRC32 MPEG-2 calculation failed for test vector [0x01, 0x01]"
        );
        assert_eq!(Crc32Mpeg2::calculate(b"123456789"), 0x0376E6E7);
        assert_eq!(Crc32Mpeg2::calculate(&[]), 0xFFFFFFFF);
    }

    #[test]
    fn test_incremental_matches_one_shot() {
        let data = b"program map table section";
        let mut crc = Crc32Mpeg2::new();
        crc.update(&data[..7]);
        crc.update(&data[7..]);
        assert_eq!(crc.value(), Crc32Mpeg2::calculate(data));
    }

    #[test]
    fn test_section_with_trailer_sums_to_zero() {
        let data = b"test section data";
        let mut section = data.to_vec();
        section.extend_from_slice(&Crc32Mpeg2::calculate(data).to_be_bytes());
        assert_eq!(Crc32Mpeg2::calculate(&section), 0);
    }

    #[test]
    fn test_writer_then_reader() {
        let mut writer = Crc32Writer::new(Vec::new());
        writer.write_all(b"hello psi").unwrap();
        let (out, crc) = writer.finish().unwrap();
        assert_eq!(out.len(), 13);
        assert_eq!(crc, Crc32Mpeg2::calculate(b"hello psi"));

        let mut reader = Crc32Reader::new(&out[..]);
        let mut body = [0u8; 9];
        reader.read_exact(&mut body).unwrap();
        assert_eq!(reader.verify_trailer().unwrap(), crc);
    }

    #[test]
    fn test_reader_detects_corruption() {
        let mut section = b"hello psi".to_vec();
        section.extend_from_slice(&Crc32Mpeg2::calculate(b"hello psi").to_be_bytes());
        section[2] ^= 0x01;

        let mut reader = Crc32Reader::new(&section[..]);
        let mut body = [0u8; 9];
        reader.read_exact(&mut body).unwrap();
        assert_matches!(
            reader.verify_trailer(),
            Err(PsiError::ChecksumMismatch { .. })
        );
    }

    #[test]
    fn test_missing_trailer_is_truncation() {
        let mut reader = Crc32Reader::new(&[0xAAu8, 0xBB][..]);
        assert_matches!(
            reader.verify_trailer(),
            Err(PsiError::TruncatedSection {
                field: "crc32",
                needed: 4,
                remaining: 2
            })
        );
    }
}
