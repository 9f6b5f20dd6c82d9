//! Bridge between PEM bundles and password-protected keystores.
//!
//! The in-memory model is a [`Container`] of aliased entries, either a
//! single certificate or a private key with its certificate chain. A
//! [`Bridge`] owns one container together with the file path, password and
//! [`Provider`] used to persist it, and offers the merge, batch and export
//! operations. [`Pkcs12Provider`] binds persistence to the PKCS#12 format.

pub mod bridge;
pub mod container;
pub mod error;
pub mod pkcs12;

mod alias;
mod key;

#[cfg(test)]
mod testdata;

pub use bridge::{Batch, Bridge, MergeReport, Provider, Warning};
pub use container::{Container, Entry};
pub use pkcs12::Pkcs12Provider;
