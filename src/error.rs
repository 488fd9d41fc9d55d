use thiserror::Error;

/// Errors produced while decoding or encoding a PSI section.
#[derive(Error, Debug)]
pub enum PsiError {
    /// A read or write needed more bytes than the declared length allows.
    #[error("truncated section: {field} needs {needed} bytes, {remaining} remaining")]
    TruncatedSection {
        /// wire field being processed
        field: &'static str,
        /// bytes the field required
        needed: usize,
        /// bytes left in the window or source
        remaining: usize,
    },

    /// The CRC-32 trailer does not match the bytes of the section.
    #[error("checksum mismatch: trailer {expected:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        /// value carried in the trailer
        expected: u32,
        /// value accumulated over the section
        computed: u32,
    },

    /// The table id is not the Program Map Table id.
    #[error("invalid table id: {0:#04x}")]
    InvalidTableId(u8),

    /// Descriptor payload does not fit the one-byte length field.
    #[error("descriptor {tag:#04x} payload of {length} bytes exceeds 255")]
    OversizeDescriptor {
        /// descriptor tag
        tag: u8,
        /// payload length
        length: usize,
    },

    /// A computed length does not fit its 12-bit wire slot.
    #[error("{field} of {length} bytes does not fit in 12 bits")]
    LengthOverflow {
        /// wire field being computed
        field: &'static str,
        /// computed length
        length: usize,
    },

    /// A section does not fit the requested transport unit.
    #[error("section of {section} bytes does not fit a {unit} byte unit")]
    UnitOverflow {
        /// bytes of header, pointer field and section
        section: usize,
        /// target unit size
        unit: usize,
    },

    /// Failure of the underlying byte source or sink.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PsiError {
    pub(crate) fn truncated(field: &'static str, needed: usize, remaining: usize) -> Self {
        PsiError::TruncatedSection {
            field,
            needed,
            remaining,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PsiError>;
