//! Collection token wire format.

mod codec;
mod error;

pub use codec::{decode, encode, validate};
pub use error::TokenError;
