use super::types::{Descriptor, MAX_DESCRIPTOR_DATA};
use crate::error::{PsiError, Result};
use crate::utils::BoundedReader;
use bytes::{BufMut, BytesMut};
use std::io::Read;

/// Decodes descriptors until `window` is exhausted.
///
/// The list is scoped by the window's byte count, never by a descriptor count.
/// A tag, length or payload that runs past the end of the window is a
/// `TruncatedSection`, so a successful return always means the window was
/// consumed exactly.
pub fn read_descriptors<R: Read>(window: &mut BoundedReader<R>) -> Result<Vec<Descriptor>> {
    let mut descriptors = Vec::new();
    while !window.is_empty() {
        let tag = window.read_u8("descriptor_tag")?;
        let length = window.read_u8("descriptor_length")? as usize;
        let data = window.read_vec("descriptor_data", length)?;
        log::trace!("descriptor tag={:#04x} length={}", tag, length);
        descriptors.push(Descriptor { tag, data });
    }
    Ok(descriptors)
}

/// Serializes `descriptors` in order onto `buf`.
pub fn write_descriptors(buf: &mut BytesMut, descriptors: &[Descriptor]) -> Result<()> {
    for desc in descriptors {
        if desc.data.len() > MAX_DESCRIPTOR_DATA {
            return Err(PsiError::OversizeDescriptor {
                tag: desc.tag,
                length: desc.data.len(),
            });
        }
        buf.put_u8(desc.tag);
        buf.put_u8(desc.data.len() as u8);
        buf.put_slice(&desc.data);
    }
    Ok(())
}

/// Serializes `descriptors` into a fresh scratch buffer, so the caller can
/// learn the block length before writing it.
pub fn descriptor_block(descriptors: &[Descriptor]) -> Result<BytesMut> {
    let len = descriptors.iter().map(Descriptor::wire_len).sum();
    let mut buf = BytesMut::with_capacity(len);
    write_descriptors(&mut buf, descriptors)?;
    Ok(buf)
}
