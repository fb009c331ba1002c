use std::fmt;
use std::sync::PoisonError;

use thiserror::Error;

use crate::signature::Signature;
use crate::token::TypeToken;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("blank type token code")]
    Blank,
    #[error("type token code {0:?} is not numeric")]
    NonNumeric(String),
    #[error("no type token with code {0:?}")]
    Unrecognized(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvokeError {
    #[error("bad method signature: {0}")]
    Decode(#[from] DecodeError),
    #[error("no method {name}{signature}")]
    NoSuchMethod { name: String, signature: Signature },
    #[error("wrong number of arguments: expected {expected}, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },
    #[error("argument {index} ({token:?}) is not a valid {expected}")]
    BadArgument {
        index: usize,
        token: String,
        expected: TypeToken,
    },
    #[error("{0}")]
    Failed(String),
    #[error("method panicked: {0}")]
    Panicked(String),
}

/// Failure reported by an operation handler itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct MethodFailure(pub String);

impl MethodFailure {
    pub fn new(msg: impl fmt::Display) -> Self {
        Self(msg.to_string())
    }
}

impl<T> From<PoisonError<T>> for MethodFailure {
    fn from(err: PoisonError<T>) -> Self {
        Self::new(err)
    }
}

impl From<MethodFailure> for InvokeError {
    fn from(err: MethodFailure) -> Self {
        InvokeError::Failed(err.0)
    }
}
