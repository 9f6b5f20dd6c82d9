//! # hashi
//!
//! Core traits for the hashi PEM/keystore bridge.
//!
//! This crate defines the `Decoder` trait that establishes the type-safe
//! conversion pattern used throughout the workspace:
//!
//! ```text
//! bundle text → Pem → Vec<u8> (DER) → container entry
//! ```
//!
//! Each conversion step is expressed as a `Decoder` implementation, and the
//! `DecodableFrom` marker trait constrains which conversions exist so that
//! an invalid pair fails at compile time rather than at runtime.

#![forbid(unsafe_code)]

pub mod decoder;
