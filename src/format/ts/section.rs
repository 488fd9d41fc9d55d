//! Section framing around the PMT body: the common PSI header, `section_length`
//! bookkeeping, the CRC32 trailer and transport-unit stuffing.

use super::pmt::{pmt_body, read_pmt_body};
use super::types::*;
use crate::error::{PsiError, Result};
use crate::utils::crc::read_full;
use crate::utils::{BoundedReader, BoundedWriter, Crc32Reader, Crc32Writer, SectionSource};
use bytes::{BufMut, Bytes, BytesMut};
use std::io::{self, Read, Write};

/// Size of the fixed header as written by [`write_section`].
pub const SECTION_HEADER_SIZE: usize = SECTION_COMMON_HEADER_SIZE + TABLE_SYNTAX_HEADER_SIZE;

/// Outcome of a decode that keeps whatever was parsed when an error occurs.
///
/// `pmt` is only trustworthy when `error` is `None`. A checksum mismatch still
/// leaves a structurally complete table in `pmt`.
#[derive(Debug)]
pub struct Decoded {
    /// Fields decoded before any error
    pub pmt: Pmt,
    /// First error hit, if any
    pub error: Option<PsiError>,
}

impl Decoded {
    /// True when decoding completed without error
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// The table, or the error that cut decoding short
    pub fn into_result(self) -> Result<Pmt> {
        match self.error {
            None => Ok(self.pmt),
            Some(e) => Err(e),
        }
    }
}

/// Source that reads the trailer without comparing it against anything.
struct Unverified<R>(R);

impl<R: Read> Read for Unverified<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl<R: Read> SectionSource for Unverified<R> {
    fn finish_section(&mut self) -> Result<Option<u32>> {
        let mut trailer = [0u8; CRC_SIZE];
        read_full(&mut self.0, &mut trailer, "crc32")?;
        Ok(Some(u32::from_be_bytes(trailer)))
    }
}

/// Reads the 8 header bytes that precede every long-form PSI section body.
pub fn read_section_header<R: Read + ?Sized>(src: &mut R) -> Result<SectionHeader> {
    let mut buf = [0u8; SECTION_HEADER_SIZE];
    read_full(src, &mut buf, "section_header")?;

    Ok(SectionHeader {
        table_id: buf[0],
        section_length: (u16::from(buf[1] & 0x0f) << 8) | u16::from(buf[2]),
        program_number: u16::from_be_bytes([buf[3], buf[4]]),
        version_number: (buf[5] >> 1) & 0x1f,
        current_next_indicator: buf[5] & 0x01 != 0,
        section_number: buf[6],
        last_section_number: buf[7],
    })
}

/// Decodes a complete PMT section, verifying its CRC32 trailer.
pub fn read_pmt<R: Read>(src: R) -> Result<Pmt> {
    read_pmt_lenient(src, true).into_result()
}

/// Decodes a PMT section held in a byte slice.
///
/// ```rust
/// use ts_pmt::format::ts::{decode_pmt, DEFAULT_PMT_SECTION, STREAM_TYPE_H264};
///
/// let pmt = decode_pmt(&DEFAULT_PMT_SECTION).unwrap();
/// assert_eq!(pmt.pcr_pid, 256);
/// assert_eq!(pmt.streams[0].stream_type, STREAM_TYPE_H264);
/// ```
pub fn decode_pmt(data: &[u8]) -> Result<Pmt> {
    read_pmt(data)
}

/// Decodes a PMT section and returns the parsed table alongside any error.
///
/// With `verify_crc` unset the trailer is consumed and stored in `crc32`
/// without being checked.
pub fn read_pmt_lenient<R: Read>(src: R, verify_crc: bool) -> Decoded {
    let mut pmt = Pmt::default();
    let res = if verify_crc {
        read_verified(src, &mut pmt)
    } else {
        read_pmt_into(&mut Unverified(src), &mut pmt)
    };
    if let Err(ref e) = res {
        log::debug!("pmt section rejected: {}", e);
    }
    Decoded {
        pmt,
        error: res.err(),
    }
}

/// Buffers the declared section and checks the trailer before trusting any
/// length inside it, so corruption of any byte that keeps the section within
/// the input reports as a checksum mismatch.
fn read_verified<R: Read>(mut src: R, pmt: &mut Pmt) -> Result<()> {
    let mut common = [0u8; SECTION_COMMON_HEADER_SIZE];
    read_full(&mut src, &mut common, "section_header")?;
    let section_length = (usize::from(common[1] & 0x0f) << 8) | usize::from(common[2]);
    if section_length < CRC_SIZE {
        return Err(PsiError::truncated(
            "section_length",
            TABLE_SYNTAX_HEADER_SIZE + CRC_SIZE,
            section_length,
        ));
    }

    let mut section = vec![0u8; SECTION_COMMON_HEADER_SIZE + section_length];
    section[..SECTION_COMMON_HEADER_SIZE].copy_from_slice(&common);
    read_full(&mut src, &mut section[SECTION_COMMON_HEADER_SIZE..], "section")?;

    let parsed = read_pmt_into(&mut Unverified(&section[..]), pmt);

    let mut crc = Crc32Reader::new(&section[..]);
    let covered = (section.len() - CRC_SIZE) as u64;
    io::copy(&mut (&mut crc).take(covered), &mut io::sink())?;
    crc.verify_trailer()?;
    parsed
}

/// Reads the section header from `src` and returns it with a window scoped to
/// the body.
///
/// With a [`Crc32Reader`] as the source the header bytes are part of the
/// checksum, and [`read_pmt_body`] verifies the trailer once the window is
/// exhausted:
///
/// ```rust
/// use ts_pmt::format::ts::pmt::read_pmt_body;
/// use ts_pmt::format::ts::section::open_section;
/// use ts_pmt::format::ts::{Pmt, DEFAULT_PMT_SECTION};
/// use ts_pmt::utils::Crc32Reader;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let (header, mut body) = open_section(Crc32Reader::new(&DEFAULT_PMT_SECTION[..]))?;
/// let mut pmt = Pmt::default();
/// read_pmt_body(&mut body, &mut pmt)?;
/// assert_eq!(header.section_length, 23);
/// assert_eq!(pmt.crc32, 0x2f44b99b);
/// # Ok(())
/// # }
/// ```
pub fn open_section<S: SectionSource>(mut src: S) -> Result<(SectionHeader, BoundedReader<S>)> {
    let header = read_section_header(&mut src)?;
    let window = body_window(src, &header)?;
    Ok((header, window))
}

fn body_window<S: SectionSource>(src: S, header: &SectionHeader) -> Result<BoundedReader<S>> {
    let body_len = header.body_len().ok_or_else(|| {
        PsiError::truncated(
            "section_length",
            TABLE_SYNTAX_HEADER_SIZE + CRC_SIZE,
            header.section_length as usize,
        )
    })?;
    Ok(BoundedReader::new(src, body_len))
}

fn read_pmt_into<S: SectionSource>(src: &mut S, pmt: &mut Pmt) -> Result<()> {
    let header = read_section_header(src)?;
    *pmt = Pmt::from_header(&header);
    if header.table_id != TABLE_ID_PMT {
        // skip the rest of the section so a stream stays aligned on the next one
        let rest = usize::from(header.section_length & 0x0fff).saturating_sub(TABLE_SYNTAX_HEADER_SIZE);
        io::copy(&mut (&mut *src).take(rest as u64), &mut io::sink())?;
        return Err(PsiError::InvalidTableId(header.table_id));
    }
    let mut window = body_window(src, &header)?;
    log::trace!(
        "pmt section program_number={} version={} section_length={}",
        header.program_number,
        header.version_number,
        header.section_length
    );

    read_pmt_body(&mut window, pmt)?;
    log::debug!(
        "decoded pmt program_number={} streams={} crc32={:#010x}",
        pmt.program_number,
        pmt.streams.len(),
        pmt.crc32
    );
    Ok(())
}

/// `section_length` for a body of `body_len` bytes (PCR PID onwards): the table
/// syntax header, the body and the trailer.
pub fn section_length_for(body_len: usize) -> Result<u16> {
    let length = TABLE_SYNTAX_HEADER_SIZE + body_len + CRC_SIZE;
    if length > MAX_LENGTH_FIELD {
        return Err(PsiError::LengthOverflow {
            field: "section_length",
            length,
        });
    }
    Ok(length as u16)
}

/// Writes the common header, `body` and the CRC32 trailer computed over both.
///
/// `header.section_length` must already describe `body`; a body that does not
/// fill it exactly fails with `TruncatedSection`. Returns the number of bytes
/// written.
pub fn write_section<W: Write>(w: W, header: &SectionHeader, body: &[u8]) -> Result<usize> {
    if header.table_id != TABLE_ID_PMT {
        return Err(PsiError::InvalidTableId(header.table_id));
    }
    let section_length = header.section_length & 0x0fff;
    let body_len = header.body_len().ok_or_else(|| {
        PsiError::truncated(
            "section_length",
            TABLE_SYNTAX_HEADER_SIZE + CRC_SIZE,
            section_length as usize,
        )
    })?;

    let mut fixed = BytesMut::with_capacity(SECTION_HEADER_SIZE);
    fixed.put_u8(header.table_id);
    // section_syntax_indicator(1) + '0' + reserved(2) + section_length(12)
    fixed.put_u16(0xb000 | section_length);
    fixed.put_u16(header.program_number);
    // reserved(2) + version_number(5) + current_next_indicator(1)
    fixed.put_u8(0xc0 | (header.version_number & 0x1f) << 1 | header.current_next_indicator as u8);
    fixed.put_u8(header.section_number);
    fixed.put_u8(header.last_section_number);

    let mut crc = Crc32Writer::new(w);
    crc.write_all(&fixed)?;
    let mut window = BoundedWriter::new(&mut crc, body_len);
    window.write_field("section body", body)?;
    window.finish("section body")?;
    let (_, crc32) = crc.finish()?;

    log::debug!(
        "wrote section table_id={:#04x} section_length={} crc32={:#010x}",
        header.table_id,
        section_length,
        crc32
    );
    Ok(SECTION_COMMON_HEADER_SIZE + section_length as usize)
}

/// Encodes `pmt` as a complete section onto `w`.
///
/// Lengths and the trailer are always recomputed. A `section_length` of 0 is
/// replaced by the computed value; any other value is written as given and
/// must match the body. `pmt` itself is left untouched.
pub fn write_pmt<W: Write>(w: W, pmt: &Pmt) -> Result<usize> {
    if pmt.table_id != TABLE_ID_PMT {
        return Err(PsiError::InvalidTableId(pmt.table_id));
    }
    let body = pmt_body(pmt)?;
    let mut header = pmt.header();
    if header.section_length == 0 {
        header.section_length = section_length_for(body.len())?;
    }
    write_section(w, &header, &body)
}

/// Encodes `pmt` into a fresh buffer.
pub fn encode_pmt(pmt: &Pmt) -> Result<Bytes> {
    let mut writer = BytesMut::with_capacity(TS_PACKET_SIZE).writer();
    write_pmt(&mut writer, pmt)?;
    Ok(writer.into_inner().freeze())
}

/// `len` copies of the fill byte.
pub fn stuffing(byte: u8, len: usize) -> Bytes {
    let mut buf = BytesMut::with_capacity(len);
    buf.put_bytes(byte, len);
    buf.freeze()
}

/// Pads `buf` with the fill byte up to `unit_size`. Buffers already at or past
/// the unit size are left alone.
pub fn pad_to_unit(buf: &mut BytesMut, unit_size: usize, byte: u8) {
    if buf.len() < unit_size {
        buf.put_bytes(byte, unit_size - buf.len());
    }
}

/// Writes one whole transport unit carrying `pmt`: the caller's transport
/// header, a zero pointer field, the section and fill bytes up to `unit_size`.
pub fn write_pmt_packet<W: Write>(
    mut w: W,
    ts_header: &[u8],
    pmt: &Pmt,
    unit_size: usize,
    stuffing_byte: u8,
) -> Result<usize> {
    if pmt.table_id != TABLE_ID_PMT {
        return Err(PsiError::InvalidTableId(pmt.table_id));
    }
    let section = encode_pmt(pmt)?;
    let used = ts_header.len() + 1 + section.len();
    if used > unit_size {
        return Err(PsiError::UnitOverflow {
            section: used,
            unit: unit_size,
        });
    }

    let mut buf = BytesMut::with_capacity(unit_size);
    buf.put_slice(ts_header);
    // pointer field
    buf.put_u8(0);
    buf.put_slice(&section);
    pad_to_unit(&mut buf, unit_size, stuffing_byte);

    w.write_all(&buf)?;
    Ok(buf.len())
}

/// Writes [`DEFAULT_PMT_PACKET`].
pub fn write_default_pmt_packet<W: Write>(mut w: W) -> Result<()> {
    w.write_all(&DEFAULT_PMT_PACKET)?;
    Ok(())
}
