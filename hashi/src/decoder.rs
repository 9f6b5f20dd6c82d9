//! Decoder trait for type-safe conversions.
//!
//! Converting from a source type `T` to a destination type `D` takes two
//! trait implementations:
//!
//! 1. `DecodableFrom<T>` on `D` marks the conversion as valid
//! 2. `Decoder<T, D>` on `T` performs the conversion
//!
//! The marker trait exists purely as a compile-time guard: without it any
//! type could claim to decode into any other, and a bad pairing would only
//! surface at runtime.
//!
//! ```no_run
//! use hashi::decoder::{DecodableFrom, Decoder};
//!
//! struct Armored(String);
//! struct Payload(Vec<u8>);
//!
//! #[derive(Debug)]
//! struct ParseError;
//!
//! impl DecodableFrom<Armored> for Payload {}
//!
//! impl Decoder<Armored, Payload> for Armored {
//!     type Error = ParseError;
//!
//!     fn decode(&self) -> Result<Payload, Self::Error> {
//!         Ok(Payload(self.0.as_bytes().to_vec()))
//!     }
//! }
//! ```

/// Decoder trait for converting from type `T` to type `D`.
///
/// Implemented by the source type `T` (usually `Self`). The destination
/// type must be marked with `DecodableFrom<T>`.
pub trait Decoder<T, D: DecodableFrom<T>> {
    /// The error type returned when decoding fails.
    type Error;

    /// Decodes `self` into type `D`.
    ///
    /// # Errors
    ///
    /// Returns an error if the conversion fails; the conditions depend on
    /// the implementing type.
    fn decode(&self) -> Result<D, Self::Error>;
}

/// Marker trait indicating that type `D` can be decoded from type `T`.
///
/// Has no methods; implement it for each valid (source, destination) pair.
pub trait DecodableFrom<T> {}
