use std::fmt;
use std::str::FromStr;

use crate::error::DecodeError;
use crate::token::TypeToken;

pub const DELIMITER: char = ';';

/// Ordered parameter types of an operation. Position matters, repeats are fine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature(Vec<TypeToken>);

impl Signature {
    pub fn new(tokens: Vec<TypeToken>) -> Self {
        Self(tokens)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn tokens(&self) -> &[TypeToken] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Wire form, e.g. `4;0`. Empty for a zero-parameter signature.
    pub fn codes(&self) -> String {
        self.0
            .iter()
            .map(|tok| tok.code().to_string())
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, tok) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(tok.type_name())?;
        }
        f.write_str(")")
    }
}

impl From<Vec<TypeToken>> for Signature {
    fn from(tokens: Vec<TypeToken>) -> Self {
        Self(tokens)
    }
}

impl FromIterator<TypeToken> for Signature {
    fn from_iter<I: IntoIterator<Item = TypeToken>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromStr for Signature {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_signature(s)
    }
}

// empty segments are dropped, so ";", "" and "a;;b" give 0, 0 and 2 segments.
// whitespace is kept as-is.
fn segments(s: &str) -> impl Iterator<Item = &str> {
    s.split(DELIMITER).filter(|seg| !seg.is_empty())
}

/// Decodes a `;`-delimited list of type codes. Stops at the first bad segment.
pub fn decode_signature(s: &str) -> Result<Signature, DecodeError> {
    segments(s).map(TypeToken::from_code).collect()
}

/// Splits a `;`-delimited argument string into raw text, with no coercion.
pub fn split_args(s: &str) -> Vec<String> {
    segments(s).map(str::to_owned).collect()
}
