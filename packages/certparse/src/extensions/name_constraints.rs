//! NameConstraints (2.5.29.30)
//!
//! ```text
//! NameConstraints ::= SEQUENCE {
//!      permittedSubtrees       [0]     GeneralSubtrees OPTIONAL,
//!      excludedSubtrees        [1]     GeneralSubtrees OPTIONAL }
//!
//! GeneralSubtrees ::= SEQUENCE SIZE (1..MAX) OF GeneralSubtree
//!
//! GeneralSubtree ::= SEQUENCE {
//!      base                    GeneralName,
//!      minimum         [0]     BaseDistance DEFAULT 0,
//!      maximum         [1]     BaseDistance OPTIONAL }
//! ```
//!
//! RFC 5280 requires `minimum` to be zero and `maximum` to be absent; with
//! DER that means neither may be encoded.

use crate::error::{DecodeError, DecodeResult};
use crate::input::{sequence_value, Input, Parser, Tag};

use super::general_names::{GeneralName, GeneralNameTypes, GeneralNames};

/// A decoded NameConstraints extension
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameConstraints {
    permitted: Option<GeneralNames>,
    excluded: Option<GeneralNames>,
    critical: bool,
}

impl NameConstraints {
    /// Permitted subtrees, if encoded
    #[must_use]
    pub fn permitted_subtrees(&self) -> Option<&GeneralNames> {
        self.permitted.as_ref()
    }

    /// Excluded subtrees, if encoded
    #[must_use]
    pub fn excluded_subtrees(&self) -> Option<&GeneralNames> {
        self.excluded.as_ref()
    }

    /// Criticality of the extension this was decoded from
    #[must_use]
    pub fn is_critical(&self) -> bool {
        self.critical
    }

    /// Name types appearing in either subtree list
    #[must_use]
    pub fn constrained_name_types(&self) -> GeneralNameTypes {
        let bits = [&self.permitted, &self.excluded]
            .into_iter()
            .flatten()
            .fold(0u16, |acc, names| acc | names.present_name_types().bits());
        GeneralNameTypes::from_bits(bits)
    }
}

/// Decode a NameConstraints extension value
///
/// `critical` is recorded so that later name checks can reject constraints
/// on name types they do not understand.
pub fn decode_name_constraints(value: &Input, critical: bool) -> DecodeResult<NameConstraints> {
    let mut parser = Parser::new(sequence_value(value)?);
    let start = parser.offset();

    let permitted = read_subtrees(&mut parser, 0)?;
    let excluded = read_subtrees(&mut parser, 1)?;
    parser.finish()?;

    if permitted.is_none() && excluded.is_none() {
        return Err(DecodeError::invalid(
            start,
            "NameConstraints",
            "neither permittedSubtrees nor excludedSubtrees is present",
        ));
    }

    Ok(NameConstraints {
        permitted,
        excluded,
        critical,
    })
}

fn read_subtrees(parser: &mut Parser, number: u8) -> DecodeResult<Option<GeneralNames>> {
    let Some(mut subtrees) =
        parser.read_optional_constructed(Tag::context_specific_constructed(number))?
    else {
        return Ok(None);
    };
    if !subtrees.has_more() {
        return Err(DecodeError::Empty {
            offset: subtrees.offset(),
            what: "GeneralSubtrees",
        });
    }

    let mut names = GeneralNames::default();
    while subtrees.has_more() {
        let mut subtree = subtrees.read_sequence()?;
        let base = subtree.read_tlv()?;
        names.push(GeneralName::parse(&base, &subtree, true)?);
        if subtree.has_more() {
            return Err(DecodeError::invalid(
                subtree.offset(),
                "GeneralSubtree",
                "minimum and maximum must not be encoded",
            ));
        }
    }
    Ok(Some(names))
}
