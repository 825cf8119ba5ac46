//! Errors.

use thiserror::Error as ErrorTrait;

/// Alias for a `Result` with the error type [`enum@Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// This type represents the errors that can occur when parsing a number.
///
/// Rendering never errors: [`crate::render_number_f64`] reports a too-small
/// destination by returning `0` and leaving the buffer untouched.
#[derive(ErrorTrait, Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The input is not a well-formed number or special token: it is empty,
    /// has unnecessary leading zeroes, duplicate separators, a lone
    /// exponent, or trailing garbage.
    #[error("invalid number")]
    InvalidNumber,
}
