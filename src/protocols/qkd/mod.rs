//! Quantum Key Distribution (QKD) Protocols.
//!
//! - **BB84**: the first quantum key distribution protocol, prepare-and-measure with
//!   two conjugate bases.

pub mod bb84;
