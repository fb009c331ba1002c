use std::fmt;

use compadmin_types::{decode_signature, split_args, InvokeError, Signature};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::registry::Registry;

/// How far a request got through the invocation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    SignatureDecoding,
    ArgumentSplitting,
    MethodResolution,
    Invocation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Idle => "idle",
            Stage::SignatureDecoding => "signature decoding",
            Stage::ArgumentSplitting => "argument splitting",
            Stage::MethodResolution => "method resolution",
            Stage::Invocation => "invocation",
        };
        f.write_str(s)
    }
}

/// An operator's request to run an operation, straight from the form fields.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub method: &'a str,
    pub signature: Option<&'a str>,
    pub args: Option<&'a str>,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{source}")]
pub struct DispatchError {
    pub stage: Stage,
    pub source: InvokeError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invoked {
    pub signature: Signature,
    pub returned: Value,
}

/// Decodes the signature, splits the arguments, resolves the operation and
/// runs it against `target`.
///
/// Argument count is not compared against the signature here;
/// a mismatch comes back from the invocation stage.
pub fn dispatch<C: 'static>(
    registry: &Registry<C>, target: &C, req: &Invocation<'_>,
) -> Result<Invoked, DispatchError> {
    let fail = |stage: Stage, source: InvokeError| DispatchError { stage, source };

    let signature = match req.signature {
        Some(s) => decode_signature(s).map_err(|e| fail(Stage::SignatureDecoding, e.into()))?,
        None => Signature::empty(),
    };

    let args = req.args.map(split_args).unwrap_or_default();
    debug!(stage = %Stage::ArgumentSplitting, args = args.len());

    let id = registry.resolve(req.method, &signature).ok_or_else(|| {
        fail(
            Stage::MethodResolution,
            InvokeError::NoSuchMethod {
                name: req.method.to_owned(),
                signature: signature.clone(),
            },
        )
    })?;

    let returned = registry
        .invoke(id, target, &args)
        .map_err(|e| fail(Stage::Invocation, e))?;

    Ok(Invoked {
        signature,
        returned,
    })
}
