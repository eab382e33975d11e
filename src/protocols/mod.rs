//! Quantum Cryptography Protocols.
//!
//! Currently the BB84 quantum key distribution protocol.

pub mod qkd;
pub use qkd::bb84;
