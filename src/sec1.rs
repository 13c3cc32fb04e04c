//! SEC1 `Elliptic-Curve-Point-to-Octet-String` encoding.
//!
//! Serialized according to the algorithm described in SEC 1: Elliptic Curve
//! Cryptography (Version 2.0) section 2.3.3 (page 10):
//!
//! <https://www.secg.org/sec1-v2.pdf>

use crate::{Error, Result};
use core::fmt;

/// Size of a compressed point (tag byte plus the x-coordinate).
pub const COMPRESSED_SIZE: usize = 33;

/// Size of an uncompressed point (tag byte plus both coordinates).
pub const UNCOMPRESSED_SIZE: usize = 65;

/// SEC1 tag byte for a compressed point with an even y-coordinate.
const TAG_COMPRESSED_EVEN: u8 = 0x02;

/// SEC1 tag byte for a compressed point with an odd y-coordinate.
const TAG_COMPRESSED_ODD: u8 = 0x03;

/// SEC1 tag byte for an uncompressed point.
const TAG_UNCOMPRESSED: u8 = 0x04;

/// SEC1-encoded curve point: `0x02/0x03 || x` (33 bytes) or
/// `0x04 || x || y` (65 bytes).
///
/// The point at infinity has no wire form and cannot be represented.
#[derive(Clone, Copy)]
pub struct EncodedPoint {
    bytes: [u8; UNCOMPRESSED_SIZE],
    length: usize,
}

/// Coordinates carried by an [`EncodedPoint`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Coordinates {
    /// Compressed form: the x-coordinate and the parity of y.
    Compressed {
        /// Big-endian x-coordinate.
        x: [u8; 32],
        /// Is the y-coordinate odd?
        y_is_odd: bool,
    },

    /// Uncompressed form: both coordinates.
    Uncompressed {
        /// Big-endian x-coordinate.
        x: [u8; 32],
        /// Big-endian y-coordinate.
        y: [u8; 32],
    },
}

impl EncodedPoint {
    /// Decodes a SEC1-encoded point from its wire form, validating the tag
    /// byte and the length. (Whether the coordinates name a point on the
    /// curve is the concern of the point decoder, not of this container.)
    pub fn from_bytes(input: &[u8]) -> Result<Self> {
        let expected_len = match input.first() {
            Some(&TAG_COMPRESSED_EVEN) | Some(&TAG_COMPRESSED_ODD) => COMPRESSED_SIZE,
            Some(&TAG_UNCOMPRESSED) => UNCOMPRESSED_SIZE,
            // includes 0x00: the identity is never encoded on the wire
            _ => return Err(Error::InvalidEncoding),
        };

        if input.len() != expected_len {
            return Err(Error::InvalidEncoding);
        }

        let mut bytes = [0u8; UNCOMPRESSED_SIZE];
        bytes[..expected_len].copy_from_slice(input);

        Ok(Self {
            bytes,
            length: expected_len,
        })
    }

    /// Serializes an affine coordinate pair.
    pub fn from_affine_coordinates(x: &[u8; 32], y: &[u8; 32], compress: bool) -> Self {
        let mut bytes = [0u8; UNCOMPRESSED_SIZE];

        if compress {
            bytes[0] = if y[31] & 1 == 1 {
                TAG_COMPRESSED_ODD
            } else {
                TAG_COMPRESSED_EVEN
            };
            bytes[1..33].copy_from_slice(x);
            Self {
                bytes,
                length: COMPRESSED_SIZE,
            }
        } else {
            bytes[0] = TAG_UNCOMPRESSED;
            bytes[1..33].copy_from_slice(x);
            bytes[33..65].copy_from_slice(y);
            Self {
                bytes,
                length: UNCOMPRESSED_SIZE,
            }
        }
    }

    /// Borrows the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.length]
    }

    /// Length of the encoding in bytes: 33 or 65.
    pub fn len(&self) -> usize {
        self.length
    }

    /// An encoded point is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Is this point compressed?
    pub fn is_compressed(&self) -> bool {
        self.length == COMPRESSED_SIZE
    }

    /// The coordinates carried by this encoding.
    pub fn coordinates(&self) -> Coordinates {
        let mut x = [0u8; 32];
        x.copy_from_slice(&self.bytes[1..33]);

        if self.is_compressed() {
            Coordinates::Compressed {
                x,
                y_is_odd: self.bytes[0] == TAG_COMPRESSED_ODD,
            }
        } else {
            let mut y = [0u8; 32];
            y.copy_from_slice(&self.bytes[33..65]);
            Coordinates::Uncompressed { x, y }
        }
    }

    /// Big-endian x-coordinate.
    pub fn x(&self) -> [u8; 32] {
        let mut x = [0u8; 32];
        x.copy_from_slice(&self.bytes[1..33]);
        x
    }
}

impl AsRef<[u8]> for EncodedPoint {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl PartialEq for EncodedPoint {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for EncodedPoint {}

impl fmt::Debug for EncodedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncodedPoint(")?;
        for byte in self.as_bytes() {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, ")")
    }
}

impl TryFrom<&[u8]> for EncodedPoint {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes(bytes)
    }
}
