use super::observer::{NoopObserver, SectionEvent, SectionObserver};
use super::section::{encode_pmt, read_pmt_lenient, write_pmt_packet, Decoded};
use super::types::Pmt;
use crate::config::CodecConfig;
use crate::error::Result;
use bytes::Bytes;
use std::io::{Read, Write};

/// PMT encoder/decoder bound to a [`CodecConfig`] and a [`SectionObserver`].
///
/// The free functions in [`section`](super::section) do the work; the codec
/// adds the configured checksum policy and packet layout, and reports every
/// section to its observer.
#[derive(Debug, Clone)]
pub struct PmtCodec<O = NoopObserver> {
    config: CodecConfig,
    observer: O,
}

impl PmtCodec<NoopObserver> {
    /// Creates a codec that reports to no one.
    pub fn new(config: CodecConfig) -> Self {
        Self {
            config,
            observer: NoopObserver,
        }
    }
}

impl Default for PmtCodec<NoopObserver> {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

impl<O: SectionObserver> PmtCodec<O> {
    /// Replaces the observer, keeping the configuration.
    pub fn with_observer<O2: SectionObserver>(self, observer: O2) -> PmtCodec<O2> {
        PmtCodec {
            config: self.config,
            observer,
        }
    }

    /// Settings in use
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// The attached observer
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Mutable access to the attached observer
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Consumes the codec, returning its observer
    pub fn into_observer(self) -> O {
        self.observer
    }

    /// Decodes one section from `src`.
    pub fn decode<R: Read>(&mut self, src: R) -> Result<Pmt> {
        self.decode_lenient(src).into_result()
    }

    /// Decodes one section from `src`, keeping the partial table on error.
    pub fn decode_lenient<R: Read>(&mut self, src: R) -> Decoded {
        let decoded = read_pmt_lenient(src, self.config.verify_crc);
        match decoded.error {
            None => self.observer.observe(&SectionEvent::Decoded { pmt: &decoded.pmt }),
            Some(ref error) => self.observer.observe(&SectionEvent::Rejected { error }),
        }
        decoded
    }

    /// Encodes `pmt` as a complete section.
    pub fn encode(&mut self, pmt: &Pmt) -> Result<Bytes> {
        match encode_pmt(pmt) {
            Ok(bytes) => {
                self.observer.observe(&SectionEvent::Encoded {
                    table_id: pmt.table_id,
                    bytes: &bytes,
                });
                Ok(bytes)
            }
            Err(error) => {
                self.observer.observe(&SectionEvent::Rejected { error: &error });
                Err(error)
            }
        }
    }

    /// Encodes `pmt` onto `w`, returning the section length in bytes.
    pub fn write<W: Write>(&mut self, mut w: W, pmt: &Pmt) -> Result<usize> {
        let bytes = self.encode(pmt)?;
        w.write_all(&bytes)?;
        Ok(bytes.len())
    }

    /// Writes `pmt` as one transport unit sized and stuffed per the config.
    pub fn write_packet<W: Write>(&mut self, w: W, ts_header: &[u8], pmt: &Pmt) -> Result<usize> {
        let res = write_pmt_packet(
            w,
            ts_header,
            pmt,
            self.config.unit_size,
            self.config.stuffing_byte,
        );
        if let Err(ref error) = res {
            self.observer.observe(&SectionEvent::Rejected { error });
        }
        res
    }
}
