//! Backing buffer, zero-copy views and the DER reading layer

mod buffer;
mod oid;
mod parser;
mod primitives;
mod tag;
mod writer;

pub use buffer::{CertBuffer, Input};
pub use oid::{parse_oid, read_oid, Oid};
pub use parser::{sequence_value, Parser, Tlv, MAX_NESTING_DEPTH};
pub use primitives::{
    integer_is_negative, parse_bool, parse_time, parse_u32, parse_u8, validate_integer,
    AlgorithmIdentifier, BitString, Ia5Text,
};
pub use tag::Tag;
pub(crate) use writer::{encode_tlv, write_tlv};
