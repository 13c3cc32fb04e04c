//! Error type

use core::fmt::{self, Display};

/// Result type with the crate-local [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised at the library boundary.
///
/// Verification APIs collapse every malformed input into an `Err` (or a
/// `None` for recovery); no input can cause a panic.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Malformed byte encoding: bad length, bad SEC1 prefix, or invalid
    /// DER framing.
    InvalidEncoding,

    /// A point which is not on the curve, or the identity where a concrete
    /// point is required.
    InvalidPoint,

    /// A scalar which is zero or out of the range `[1, n - 1]` where a
    /// private key or signature component is required.
    InvalidScalar,

    /// Inversion of zero.
    NonInvertible,

    /// No square root exists for the given field element, i.e. an
    /// x-coordinate with no matching curve point.
    NonResidue,

    /// Precomputation window width outside `[1, 16]`.
    InvalidWindowSize,

    /// Signature verification failure.
    Verification,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Error::InvalidEncoding => "invalid encoding",
            Error::InvalidPoint => "invalid point",
            Error::InvalidScalar => "invalid scalar",
            Error::NonInvertible => "non-invertible element",
            Error::NonResidue => "no square root exists",
            Error::InvalidWindowSize => "window width out of range",
            Error::Verification => "signature verification failure",
        })
    }
}

impl std::error::Error for Error {}
