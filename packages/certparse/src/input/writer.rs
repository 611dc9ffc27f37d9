//! Minimal DER writer used when re-encoding normalized names

use der::{Encode, Length};

use super::tag::Tag;

/// Append one TLV with `tag` and `content` to `out`
pub fn write_tlv(out: &mut Vec<u8>, tag: Tag, content: &[u8]) -> der::Result<()> {
    out.push(tag.octet());
    Length::try_from(content.len())?.encode_to_vec(out)?;
    out.extend_from_slice(content);
    Ok(())
}

/// Encode one TLV into a fresh vector
pub fn encode_tlv(tag: Tag, content: &[u8]) -> der::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(content.len() + 6);
    write_tlv(&mut out, tag, content)?;
    Ok(out)
}
