//! # Domain Layer
//!
//! Pure cryptographic dispatch, no I/O.
//!
//! - `suite`: `SignatureSuite`, the per-regime algorithm selector
//! - `verify`: entity-level checks (`verify_transaction`/`verify_stake`/
//!   `verify_block`/`verify_vrf_proof`) built on top of it
//! - `errors`: `SignatureError`

pub mod errors;
pub mod suite;
pub mod verify;

pub use errors::*;
pub use suite::*;
pub use verify::*;
