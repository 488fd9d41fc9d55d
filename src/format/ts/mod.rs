//! # MPEG Transport Stream Program Map Table
//!
//! This module reads and writes the Program Map Table (PMT) section of an
//! MPEG transport stream bit-exactly, including:
//!
//! - PSI section header and `section_length` bookkeeping
//! - Program and elementary stream descriptor loops
//! - CRC32/MPEG-2 trailer generation and verification
//! - Stuffing a section out to a whole transport unit
//!
//! ## Core Features
//!
//! - **Decoding**: Length-scoped reads; every declared length is enforced
//! - **Encoding**: Lengths and checksum always recomputed, reserved bits set
//! - **Observability**: Sections are reported to a caller-supplied observer
//!
//! ## Example Usage
//!
//! ### Round-tripping a PMT
//!
//! ```rust
//! use ts_pmt::format::ts::{decode_pmt, encode_pmt, Pmt, StreamEntry};
//! use ts_pmt::format::ts::{STREAM_TYPE_AAC, STREAM_TYPE_H264};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pmt = Pmt::new(1, 256)
//!     .with_stream(StreamEntry::new(STREAM_TYPE_H264, 256))
//!     .with_stream(StreamEntry::new(STREAM_TYPE_AAC, 257));
//!
//! let section = encode_pmt(&pmt)?;
//! let decoded = decode_pmt(&section)?;
//! assert_eq!(decoded.streams, pmt.streams);
//! assert_eq!(usize::from(decoded.section_length), section.len() - 3);
//! # Ok(())
//! # }
//! ```
//!
//! ### Writing a transport packet
//!
//! ```rust
//! use ts_pmt::config::CodecConfig;
//! use ts_pmt::format::ts::{PmtCodec, DEFAULT_PMT_SECTION, TS_PACKET_SIZE};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut codec = PmtCodec::new(CodecConfig::default());
//! let pmt = codec.decode(&DEFAULT_PMT_SECTION[..])?;
//!
//! let mut packet = Vec::new();
//! codec.write_packet(&mut packet, &[0x47, 0x41, 0x00, 0x10], &pmt)?;
//! assert_eq!(packet.len(), TS_PACKET_SIZE);
//! # Ok(())
//! # }
//! ```

/// Configured codec reporting to an observer
pub mod codec;

/// Descriptor loop reading and writing
pub mod descriptor;

/// Section event hooks
pub mod observer;

/// PMT body between the section header and the trailer
pub mod pmt;

/// Section framing, checksum and stuffing
pub mod section;

/// Core PMT types and constants
pub mod types;


// Re-export commonly used types and constants
pub use codec::PmtCodec;
pub use observer::{from_fn, LogObserver, NoopObserver, SectionEvent, SectionObserver};
pub use section::{
    decode_pmt, encode_pmt, open_section, pad_to_unit, read_pmt, read_pmt_lenient, stuffing, write_default_pmt_packet,
    write_pmt, write_pmt_packet, Decoded,
};
pub use types::{
    Descriptor, Pmt, SectionHeader, StreamEntry, DEFAULT_PMT_PACKET, DEFAULT_PMT_SECTION, PID_NONE, PID_PMT,
    STREAM_TYPE_AAC, STREAM_TYPE_H264, STREAM_TYPE_H265, STUFFING_BYTE, TABLE_ID_PMT, TS_PACKET_SIZE,
};
