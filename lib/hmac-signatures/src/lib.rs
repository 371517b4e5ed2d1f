//!
//! HMAC-SHA256 request signatures
//!
//! Requests are signed with a secret shared between client and server. Reads sign their
//! canonical path, writes sign their canonical JSON body, and both bind a Unix timestamp
//! which the verifying side checks against a tolerance window.
//!

#![deny(missing_docs)]

pub mod canonical;
pub mod clock;
pub mod crypto;
pub mod header;

mod error;
mod sign;
mod verify;

pub use self::{
    canonical::Payload,
    clock::Clock,
    error::Error,
    header::SignedHeaders,
    sign::{Signer, SignerConfig},
    verify::Verifier,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;
