pub mod error;
pub mod signature;
pub mod token;

pub use error::{DecodeError, InvokeError, MethodFailure};
pub use signature::{decode_signature, split_args, Signature, DELIMITER};
pub use token::TypeToken;
