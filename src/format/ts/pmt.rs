//! Program Map Table body: everything between the table syntax header and the
//! CRC trailer.

use super::descriptor::{descriptor_block, read_descriptors};
use super::types::*;
use crate::error::{PsiError, Result};
use crate::utils::{BoundedReader, SectionSource};
use bytes::{BufMut, BytesMut};

const RESERVED_PID_BITS: u16 = 7 << 13;
const RESERVED_LENGTH_BITS: u16 = 0xf << 12;
const LENGTH_MASK: u16 = 0x0fff;

/// Decodes the PMT body from `window` into `pmt`.
///
/// `window` must be scoped to the bytes between the table syntax header and
/// the trailer. Fields are written into `pmt` as they are decoded, so after an
/// error it holds whatever was read up to that point. Once the window is
/// exhausted, a checksum-capable source reads and verifies the trailer and its
/// value is stored in `pmt.crc32`.
pub fn read_pmt_body<S: SectionSource>(window: &mut BoundedReader<S>, pmt: &mut Pmt) -> Result<()> {
    // reserved(3) + pcr_pid(13)
    pmt.pcr_pid = window.read_u16("pcr_pid")? & PID_MASK;

    // reserved(4) + program_info_length(12)
    let program_info_length = (window.read_u16("program_info_length")? & LENGTH_MASK) as usize;
    log::trace!(
        "pmt pcr_pid={:#06x} program_info_length={}",
        pmt.pcr_pid,
        program_info_length
    );

    if program_info_length > 0 {
        let mut descriptors = window.window("program_info", program_info_length)?;
        pmt.program_descriptors = read_descriptors(&mut descriptors)?;
    }

    while !window.is_empty() {
        let stream_type = window.read_u8("stream_type")?;
        let elementary_pid = window.read_u16("elementary_pid")? & PID_MASK;
        let es_info_length = (window.read_u16("es_info_length")? & LENGTH_MASK) as usize;

        let descriptors = if es_info_length > 0 {
            let mut es_info = window.window("es_info", es_info_length)?;
            read_descriptors(&mut es_info)?
        } else {
            Vec::new()
        };

        log::trace!(
            "pmt stream type={:#04x} pid={:#06x} es_info_length={}",
            stream_type,
            elementary_pid,
            es_info_length
        );
        pmt.streams.push(StreamEntry {
            stream_type,
            elementary_pid,
            descriptors,
        });
    }

    if let Some(crc32) = window.finish_section()? {
        pmt.crc32 = crc32;
    }
    Ok(())
}

/// Serializes the PMT body: PCR PID, program descriptors and the stream loop.
///
/// Reserved bits are written as 1 and all lengths are recomputed from the
/// descriptor lists; the length fields of `pmt` are not consulted.
pub fn write_pmt_body(buf: &mut BytesMut, pmt: &Pmt) -> Result<()> {
    let program_info = descriptor_block(&pmt.program_descriptors)?;

    buf.put_u16(pmt.pcr_pid & PID_MASK | RESERVED_PID_BITS);
    buf.put_u16(length_field("program_info_length", program_info.len())?);
    buf.put_slice(&program_info);

    for stream in &pmt.streams {
        buf.put_u8(stream.stream_type);
        buf.put_u16(stream.elementary_pid & PID_MASK | RESERVED_PID_BITS);

        let es_info = descriptor_block(&stream.descriptors)?;
        buf.put_u16(length_field("es_info_length", es_info.len())?);
        buf.put_slice(&es_info);
    }

    Ok(())
}

/// Serializes the PMT body into a fresh buffer.
pub fn pmt_body(pmt: &Pmt) -> Result<BytesMut> {
    let len = PMT_FIXED_SIZE
        + pmt
            .program_descriptors
            .iter()
            .map(Descriptor::wire_len)
            .sum::<usize>()
        + pmt
            .streams
            .iter()
            .map(|s| {
                STREAM_ENTRY_FIXED_SIZE + s.descriptors.iter().map(Descriptor::wire_len).sum::<usize>()
            })
            .sum::<usize>();
    let mut buf = BytesMut::with_capacity(len);
    write_pmt_body(&mut buf, pmt)?;
    Ok(buf)
}

fn length_field(field: &'static str, length: usize) -> Result<u16> {
    if length > MAX_LENGTH_FIELD {
        return Err(PsiError::LengthOverflow { field, length });
    }
    Ok(length as u16 | RESERVED_LENGTH_BITS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use hex_literal::hex;
    use pretty_assertions::assert_eq;

    fn decode(body: &[u8]) -> (Pmt, Result<()>) {
        let mut pmt = Pmt::default();
        let mut window = BoundedReader::new(body, body.len());
        let res = read_pmt_body(&mut window, &mut pmt);
        (pmt, res)
    }

    #[test]
    fn test_read_body() {
        let body = hex!(
            "e100 f006 050443554549"
            "1b e100 f000"
            "0f e101 f006 0a04656e6700"
        );
        let (pmt, res) = decode(&body);
        res.unwrap();
        assert_eq!(pmt.pcr_pid, 0x100);
        assert_eq!(
            pmt.program_descriptors,
            vec![Descriptor::new(0x05, &b"CUEI"[..])]
        );
        assert_eq!(
            pmt.streams,
            vec![
                StreamEntry::new(STREAM_TYPE_H264, 0x100),
                StreamEntry::new(STREAM_TYPE_AAC, 0x101)
                    .with_descriptor(Descriptor::new(0x0a, &b"eng\x00"[..])),
            ]
        );
        // a plain slice carries no checksum
        assert_eq!(pmt.crc32, 0);
    }

    #[test]
    fn test_checksum_source_verifies_after_body() {
        use crate::format::ts::section::read_section_header;
        use crate::utils::Crc32Reader;

        let mut crc = Crc32Reader::new(&DEFAULT_PMT_SECTION[..]);
        let header = read_section_header(&mut crc).unwrap();
        let mut pmt = Pmt::default();
        let mut window = BoundedReader::new(&mut crc, header.body_len().unwrap());
        read_pmt_body(&mut window, &mut pmt).unwrap();
        assert_eq!(pmt.crc32, 0x2f44b99b);

        let mut data = DEFAULT_PMT_SECTION;
        data[13] ^= 0x01;
        let mut crc = Crc32Reader::new(&data[..]);
        let header = read_section_header(&mut crc).unwrap();
        let mut pmt = Pmt::default();
        let mut window = BoundedReader::new(&mut crc, header.body_len().unwrap());
        assert_matches!(
            read_pmt_body(&mut window, &mut pmt),
            Err(PsiError::ChecksumMismatch { .. })
        );
        // the body was fully decoded before the trailer was checked
        assert_eq!(pmt.streams.len(), 2);
        assert_eq!(pmt.crc32, 0);
    }

    #[test]
    fn test_reserved_bits_are_masked() {
        // reserved bits cleared instead of set
        let body = hex!("1fff 0000 02 0100 0000");
        let (pmt, res) = decode(&body);
        res.unwrap();
        assert_eq!(pmt.pcr_pid, PID_NONE);
        assert_eq!(pmt.streams, vec![StreamEntry::new(0x02, 0x100)]);
    }

    #[test]
    fn test_program_info_past_body() {
        let body = hex!("e100 f008 0504435545");
        let (pmt, res) = decode(&body);
        assert_matches!(
            res,
            Err(PsiError::TruncatedSection {
                field: "program_info",
                needed: 8,
                remaining: 5
            })
        );
        assert_eq!(pmt.pcr_pid, 0x100);
        assert!(pmt.streams.is_empty());
    }

    #[test]
    fn test_es_info_past_body() {
        let body = hex!("e100 f000 1b e100 f004 0a02");
        let (_, res) = decode(&body);
        assert_matches!(
            res,
            Err(PsiError::TruncatedSection {
                field: "es_info",
                ..
            })
        );
    }

    #[test]
    fn test_partial_stream_entry() {
        let body = hex!("e100 f000 1b e1");
        let (_, res) = decode(&body);
        assert_matches!(
            res,
            Err(PsiError::TruncatedSection {
                field: "elementary_pid",
                needed: 2,
                remaining: 1
            })
        );
    }

    #[test]
    fn test_write_body() {
        let pmt = Pmt::new(1, 0xffff)
            .with_stream(StreamEntry::new(STREAM_TYPE_H264, 0x100))
            .with_stream(
                StreamEntry::new(STREAM_TYPE_AAC, 0x101)
                    .with_descriptor(Descriptor::new(0x0a, &b"eng\x00"[..])),
            );
        let body = pmt_body(&pmt).unwrap();
        assert_eq!(
            &body[..],
            &hex!("ffff f000 1b e100 f000 0f e101 f006 0a04656e6700")[..]
        );
    }

    #[test]
    fn test_program_info_overflow() {
        let mut pmt = Pmt::new(1, 0x100);
        pmt.program_descriptors = vec![Descriptor::new(0x80, vec![0; 255]); 17];
        assert_matches!(
            pmt_body(&pmt),
            Err(PsiError::LengthOverflow {
                field: "program_info_length",
                length: 4369
            })
        );
    }
}
