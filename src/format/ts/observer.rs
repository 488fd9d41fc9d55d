use super::types::Pmt;
use crate::error::PsiError;

/// Something that happened to a section passing through a [`PmtCodec`](super::PmtCodec).
#[derive(Debug)]
pub enum SectionEvent<'a> {
    /// A section decoded and, if configured, passed its checksum.
    Decoded {
        /// The decoded table
        pmt: &'a Pmt,
    },
    /// A section was serialized; `bytes` is the complete section.
    Encoded {
        /// Table id written
        table_id: u8,
        /// Section bytes including the trailer
        bytes: &'a [u8],
    },
    /// Decode or encode failed.
    Rejected {
        /// Why the section was rejected
        error: &'a PsiError,
    },
}

/// Hook the codec reports sections to, in place of printing them.
pub trait SectionObserver {
    /// Called once per section event
    fn observe(&mut self, event: &SectionEvent<'_>);
}

/// Observer backed by a closure, built with [`from_fn`].
pub struct FnObserver<F>(F);

/// Wraps a closure as a [`SectionObserver`].
pub fn from_fn<F>(f: F) -> FnObserver<F>
where
    F: FnMut(&SectionEvent<'_>),
{
    FnObserver(f)
}

impl<F> SectionObserver for FnObserver<F>
where
    F: FnMut(&SectionEvent<'_>),
{
    fn observe(&mut self, event: &SectionEvent<'_>) {
        (self.0)(event)
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SectionObserver for NoopObserver {
    fn observe(&mut self, _event: &SectionEvent<'_>) {}
}

/// Routes events to the `log` facade at a fixed level.
#[derive(Debug, Clone, Copy)]
pub struct LogObserver {
    level: log::Level,
}

impl LogObserver {
    /// Logs decoded and encoded sections at `level`
    pub fn new(level: log::Level) -> Self {
        Self { level }
    }
}

impl Default for LogObserver {
    fn default() -> Self {
        Self::new(log::Level::Debug)
    }
}

impl SectionObserver for LogObserver {
    fn observe(&mut self, event: &SectionEvent<'_>) {
        match event {
            SectionEvent::Decoded { pmt } => log::log!(
                self.level,
                "read PMT: program {} version {} pcr_pid {:#06x} streams {:?}",
                pmt.program_number,
                pmt.version_number,
                pmt.pcr_pid,
                pmt.streams
                    .iter()
                    .map(|s| (s.stream_type, s.elementary_pid))
                    .collect::<Vec<_>>()
            ),
            SectionEvent::Encoded { table_id, bytes } => log::log!(
                self.level,
                "write table {:#04x}: {:02x?}",
                table_id,
                bytes
            ),
            SectionEvent::Rejected { error } => log::warn!("section rejected: {}", error),
        }
    }
}
