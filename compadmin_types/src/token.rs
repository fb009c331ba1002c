use std::fmt;
use std::str::FromStr;

use crate::error::DecodeError;

/// Parameter type of an invokable operation, as named by the admin form's
/// numeric wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeToken {
    Int,
    Double,
    Float,
    Long,
    String,
}

// wire code -> token. codes are what forms post back, never renumber them.
const CODE_TABLE: [(u32, TypeToken); 5] = [
    (0, TypeToken::Int),
    (1, TypeToken::Double),
    (2, TypeToken::Float),
    (3, TypeToken::Long),
    (4, TypeToken::String),
];

impl TypeToken {
    pub const ALL: [TypeToken; 5] = [
        TypeToken::Int,
        TypeToken::Double,
        TypeToken::Float,
        TypeToken::Long,
        TypeToken::String,
    ];

    /// Decodes a single signature segment.
    ///
    /// Blank segments, segments with anything other than ASCII digits, and
    /// digit strings naming no token are all rejected, each with its own
    /// error so the operator can tell which rule the segment broke.
    pub fn from_code(code: &str) -> Result<Self, DecodeError> {
        if code.trim().is_empty() {
            return Err(DecodeError::Blank);
        }
        if !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DecodeError::NonNumeric(code.to_owned()));
        }
        // all digits, so a parse failure can only be overflow
        let n: u32 = code
            .parse()
            .map_err(|_| DecodeError::Unrecognized(code.to_owned()))?;

        CODE_TABLE
            .iter()
            .find(|(c, _)| *c == n)
            .map(|(_, tok)| *tok)
            .ok_or_else(|| DecodeError::Unrecognized(code.to_owned()))
    }

    pub fn code(self) -> u32 {
        match self {
            TypeToken::Int => 0,
            TypeToken::Double => 1,
            TypeToken::Float => 2,
            TypeToken::Long => 3,
            TypeToken::String => 4,
        }
    }

    pub fn type_name(self) -> &'static str {
        match self {
            TypeToken::Int => "i32",
            TypeToken::Double => "f64",
            TypeToken::Float => "f32",
            TypeToken::Long => "i64",
            TypeToken::String => "String",
        }
    }
}

impl FromStr for TypeToken {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}
