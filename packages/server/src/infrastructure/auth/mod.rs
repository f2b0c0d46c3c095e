//! Token Verifier implementations.

pub mod jwt;

pub use jwt::JwtTokenVerifier;
