#![doc(html_root_url = "https://docs.rs/ts-pmt/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

//! # ts-pmt - MPEG-TS Program Map Table codec
//!
//! `ts-pmt` reads and writes the Program Map Table section of an MPEG
//! transport stream, bit-exactly, in the layout of ISO/IEC 13818-1.
//!
//! ## Features
//!
//! - Section header, descriptor loops and stream entries
//! - CRC32/MPEG-2 trailer computed on encode and verified on decode
//! - Length-scoped decoding: no declared length is ever overrun
//! - Transport unit stuffing and a ready-made default PMT packet
//! - Observer hook for decoded, encoded and rejected sections
//!
//! ## Quick Start
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! ts-pmt = "0.1.0"
//! ```
//!
//! ### Decoding a section
//!
//! ```rust
//! use ts_pmt::format::ts::{decode_pmt, DEFAULT_PMT_SECTION};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pmt = decode_pmt(&DEFAULT_PMT_SECTION)?;
//! for stream in &pmt.streams {
//!     println!("type {:#04x} on pid {}", stream.stream_type, stream.elementary_pid);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Logging sections
//!
//! ```rust
//! use ts_pmt::config::CodecConfig;
//! use ts_pmt::format::ts::{LogObserver, PmtCodec, DEFAULT_PMT_SECTION};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CodecConfig::from_env();
//! let level = config.event_level;
//! let mut codec = PmtCodec::new(config).with_observer(LogObserver::new(level));
//! codec.decode(&DEFAULT_PMT_SECTION[..])?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - `format`: Transport stream table implementations
//!   - PMT section, body and descriptor codecs
//!   - Configured codec and observer hooks
//!
//! - `error`: Error handling types and utilities
//!
//! - `utils`: Common utilities and helper functions
//!   - CRC calculations
//!   - Length-bounded readers and writers
//!
//! - `config`: Codec settings from defaults, environment or file

/// Error types and utilities
pub mod error;

/// Media format implementations
pub mod format;

/// Common utilities and helper functions
pub mod utils;

/// Configuration module
pub mod config;

pub use error::{PsiError, Result};
