//! # Utility Functions and Types
//!
//! Byte-level plumbing shared by the section codecs:
//!
//! - CRC calculation and validation
//! - Length-bounded reading and writing windows
//!
//! ## Bounded Windows
//!
//! A [`BoundedReader`] scopes reads to a declared byte count, the way PSI
//! length fields scope descriptor loops:
//!
//! ```rust
//! use ts_pmt::utils::BoundedReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = [0xE1, 0x00, 0xF0, 0x00];
//! let mut window = BoundedReader::new(&data[..], 2);
//!
//! assert_eq!(window.read_u16("pcr_pid")? & 0x1FFF, 0x100);
//! assert!(window.read_u16("program_info_length").is_err());
//! # Ok(())
//! # }
//! ```
//!
//! ## CRC Calculation
//!
//! The crc module provides MPEG-2 CRC32 calculation:
//!
//! ```rust
//! use ts_pmt::utils::Crc32Mpeg2;
//!
//! let data = b"Hello, world!";
//! let crc = Crc32Mpeg2::calculate(data);
//! println!("CRC32: {:08x}", crc);
//! ```

/// CRC calculation and checksum-aware readers/writers
pub mod crc;

/// Length-bounded byte windows
pub mod window;

pub use crc::{Crc32Mpeg2, Crc32Reader, Crc32Writer};
pub use window::{BoundedReader, BoundedWriter, SectionSource};
