//! Token verification for operator identity.
//!
//! Tokens are minted by the identity collaborator; this crate only
//! validates them and extracts the operator claims.

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::{Claims, OperatorRole};
pub use decoder::TokenDecoder;
pub use encoder::TokenEncoder;
