// PIDs
/// PID the default PMT packet is carried on
pub const PID_PMT: u16 = 0x0100;
/// `pcr_pid` value meaning no PCR is carried for the program
pub const PID_NONE: u16 = 0x1fff;
/// Low 13 bits of a PID slot
pub const PID_MASK: u16 = 0x1fff;

// Table IDs
/// Program Association Table id
pub const TABLE_ID_PAT: u8 = 0x00;
/// Program Map Table id
pub const TABLE_ID_PMT: u8 = 0x02;

// Elementary Stream Types
/// ISO/IEC 13818-2 video
pub const STREAM_TYPE_MPEG2_VIDEO: u8 = 0x02;
/// ISO/IEC 11172-3 audio
pub const STREAM_TYPE_MPEG1_AUDIO: u8 = 0x03;
/// ISO/IEC 13818-3 audio
pub const STREAM_TYPE_MPEG2_AUDIO: u8 = 0x04;
/// PES packets with private data
pub const STREAM_TYPE_PRIVATE_DATA: u8 = 0x06;
/// ADTS AAC audio
pub const STREAM_TYPE_AAC: u8 = 0x0f;
/// H.264/AVC video
pub const STREAM_TYPE_H264: u8 = 0x1b;
/// H.265/HEVC video
pub const STREAM_TYPE_H265: u8 = 0x24;

// Constants
/// Transport packet size
pub const TS_PACKET_SIZE: usize = 188;
/// Transport packet header without adaptation field
pub const TS_HEADER_SIZE: usize = 4;
/// Fill byte after the last section in a packet
pub const STUFFING_BYTE: u8 = 0xff;
/// table_id + flags/section_length
pub const SECTION_COMMON_HEADER_SIZE: usize = 3;
/// program_number, version/current_next, section_number, last_section_number
pub const TABLE_SYNTAX_HEADER_SIZE: usize = 5;
/// pcr_pid + program_info_length
pub const PMT_FIXED_SIZE: usize = 4;
/// stream_type + elementary_pid + es_info_length
pub const STREAM_ENTRY_FIXED_SIZE: usize = 5;
/// CRC32 trailer size
pub const CRC_SIZE: usize = 4;
/// Largest value a 12-bit length slot can carry
pub const MAX_LENGTH_FIELD: usize = 0x0fff;
/// Largest payload a one-byte descriptor length can carry
pub const MAX_DESCRIPTOR_DATA: usize = 255;

/// Tag-length-data triple attached to a program or to one of its streams.
///
/// The length is never stored; it is the size of `data`, recomputed on encode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Descriptor {
    /// descriptor_tag
    pub tag: u8,
    /// Payload, at most 255 bytes on the wire
    pub data: Vec<u8>,
}

impl Descriptor {
    /// Creates a descriptor from its tag and payload
    pub fn new(tag: u8, data: impl Into<Vec<u8>>) -> Self {
        Self {
            tag,
            data: data.into(),
        }
    }

    /// Bytes this descriptor occupies on the wire
    pub fn wire_len(&self) -> usize {
        2 + self.data.len()
    }
}

/// One elementary stream of the program.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamEntry {
    /// Stream type, see the `STREAM_TYPE_*` constants
    pub stream_type: u8,
    /// 13-bit PID; wider values are masked on encode
    pub elementary_pid: u16,
    /// ES info descriptors
    pub descriptors: Vec<Descriptor>,
}

impl StreamEntry {
    /// Creates an entry without descriptors
    pub fn new(stream_type: u8, elementary_pid: u16) -> Self {
        Self {
            stream_type,
            elementary_pid,
            descriptors: Vec::new(),
        }
    }

    /// Appends a descriptor
    pub fn with_descriptor(mut self, descriptor: Descriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }
}

/// Fields shared by every long-form PSI section, framed around the PMT body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionHeader {
    /// Table id, 0x02 for a PMT
    pub table_id: u8,
    /// Only the low 12 bits are carried on the wire
    pub section_length: u16,
    /// Program this table describes
    pub program_number: u16,
    /// 5 bits
    pub version_number: u8,
    /// Set when the table applies now rather than next
    pub current_next_indicator: bool,
    /// Always 0 for a PMT
    pub section_number: u8,
    /// Always 0 for a PMT
    pub last_section_number: u8,
}

impl SectionHeader {
    /// Bytes between the `section_length` field and the CRC trailer.
    pub fn body_len(&self) -> Option<usize> {
        let section_length = (self.section_length & 0x0fff) as usize;
        section_length.checked_sub(TABLE_SYNTAX_HEADER_SIZE + CRC_SIZE)
    }
}

/// Program Map Table section.
///
/// `section_length` of 0 asks the encoder to compute it. `crc32` is filled in by
/// decode and ignored by encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pmt {
    /// Must be [`TABLE_ID_PMT`] to encode
    pub table_id: u8,
    /// 0 on input means computed; decode fills in the wire value
    pub section_length: u16,
    /// Program this table describes
    pub program_number: u16,
    /// 5 bits; higher bits are dropped on encode
    pub version_number: u8,
    /// Set when the table applies now rather than next
    pub current_next_indicator: bool,
    /// Section index within the table
    pub section_number: u8,
    /// Index of the table's last section
    pub last_section_number: u8,
    /// PID carrying the program clock, [`PID_NONE`] for none
    pub pcr_pid: u16,
    /// Program info descriptors
    pub program_descriptors: Vec<Descriptor>,
    /// Stream loop, in wire order
    pub streams: Vec<StreamEntry>,
    /// Trailer as read by decode
    pub crc32: u32,
}

impl Default for Pmt {
    fn default() -> Self {
        Self {
            table_id: TABLE_ID_PMT,
            section_length: 0,
            program_number: 1,
            version_number: 0,
            current_next_indicator: true,
            section_number: 0,
            last_section_number: 0,
            pcr_pid: PID_NONE,
            program_descriptors: Vec::new(),
            streams: Vec::new(),
            crc32: 0,
        }
    }
}

impl Pmt {
    /// Creates an empty, current, version 0 table
    pub fn new(program_number: u16, pcr_pid: u16) -> Self {
        Self {
            program_number,
            pcr_pid,
            ..Self::default()
        }
    }

    /// Appends a stream entry
    pub fn with_stream(mut self, stream: StreamEntry) -> Self {
        self.streams.push(stream);
        self
    }

    /// The common header fields of this table.
    pub fn header(&self) -> SectionHeader {
        SectionHeader {
            table_id: self.table_id,
            section_length: self.section_length,
            program_number: self.program_number,
            version_number: self.version_number,
            current_next_indicator: self.current_next_indicator,
            section_number: self.section_number,
            last_section_number: self.last_section_number,
        }
    }

    pub(crate) fn from_header(header: &SectionHeader) -> Self {
        Self {
            table_id: header.table_id,
            section_length: header.section_length,
            program_number: header.program_number,
            version_number: header.version_number,
            current_next_indicator: header.current_next_indicator,
            section_number: header.section_number,
            last_section_number: header.last_section_number,
            pcr_pid: 0,
            program_descriptors: Vec::new(),
            streams: Vec::new(),
            crc32: 0,
        }
    }

    /// False when `pcr_pid` is the no-PCR sentinel.
    pub fn has_pcr(&self) -> bool {
        self.pcr_pid & PID_MASK != PID_NONE
    }

    /// Finds the entry carried on `pid`.
    pub fn stream_by_pid(&self, pid: u16) -> Option<&StreamEntry> {
        self.streams
            .iter()
            .find(|s| s.elementary_pid & PID_MASK == pid & PID_MASK)
    }
}

/// Minimal valid PMT section: program 1, PCR on PID 256, H.264 on PID 256 and
/// AAC on PID 257, no descriptors.
pub const DEFAULT_PMT_SECTION: [u8; 26] = [
    // PSI
    0x02, 0xb0, 0x17, 0x00, 0x01, 0xc1, 0x00, 0x00,
    // PCR PID, program info length
    0xe1, 0x00, 0xf0, 0x00,
    // H264
    0x1b, 0xe1, 0x00, 0xf0, 0x00,
    // AAC
    0x0f, 0xe1, 0x01, 0xf0, 0x00,
    // CRC
    0x2f, 0x44, 0xb9, 0x9b,
];

/// [`DEFAULT_PMT_SECTION`] carried in a whole transport packet on
/// [`PID_PMT`]: TS header with payload_unit_start set, zero pointer field,
/// the section, then stuffing.
pub const DEFAULT_PMT_PACKET: [u8; TS_PACKET_SIZE] = {
    let mut packet = [STUFFING_BYTE; TS_PACKET_SIZE];
    packet[0] = 0x47;
    packet[1] = 0x40 | (PID_PMT >> 8) as u8;
    packet[2] = PID_PMT as u8;
    packet[3] = 0x10;
    packet[4] = 0x00;
    let mut i = 0;
    while i < DEFAULT_PMT_SECTION.len() {
        packet[TS_HEADER_SIZE + 1 + i] = DEFAULT_PMT_SECTION[i];
        i += 1;
    }
    packet
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Crc32Mpeg2;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_section_crc() {
        let (body, trailer) = DEFAULT_PMT_SECTION.split_at(DEFAULT_PMT_SECTION.len() - CRC_SIZE);
        assert_eq!(
            Crc32Mpeg2::calculate(body).to_be_bytes(),
            [trailer[0], trailer[1], trailer[2], trailer[3]]
        );
    }

    #[test]
    fn test_default_packet_layout() {
        assert_eq!(&DEFAULT_PMT_PACKET[..5], &[0x47, 0x41, 0x00, 0x10, 0x00]);
        assert_eq!(&DEFAULT_PMT_PACKET[5..31], &DEFAULT_PMT_SECTION[..]);
        assert!(DEFAULT_PMT_PACKET[31..].iter().all(|&b| b == STUFFING_BYTE));
    }

    #[test]
    fn test_header_body_len() {
        let mut header = Pmt::default().header();
        header.section_length = 0xb017;
        assert_eq!(header.body_len(), Some(14));
        header.section_length = 8;
        assert_eq!(header.body_len(), None);
    }

    #[test]
    fn test_pcr_sentinel() {
        assert!(!Pmt::default().has_pcr());
        assert!(Pmt::new(1, 0x100).has_pcr());
        assert!(!Pmt::new(1, 0xffff).has_pcr());
    }

    #[test]
    fn test_stream_lookup_masks_pid() {
        let pmt = Pmt::new(1, 0x100)
            .with_stream(StreamEntry::new(STREAM_TYPE_H264, 0xe100))
            .with_stream(StreamEntry::new(STREAM_TYPE_AAC, 0x101));
        assert_eq!(pmt.stream_by_pid(0x100).map(|s| s.stream_type), Some(STREAM_TYPE_H264));
        assert_eq!(pmt.stream_by_pid(0x101).map(|s| s.stream_type), Some(STREAM_TYPE_AAC));
        assert!(pmt.stream_by_pid(0x102).is_none());
    }
}
