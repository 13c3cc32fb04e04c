//! Strict DER encoding of ECDSA signatures.
//!
//! `SEQUENCE { INTEGER r, INTEGER s }` with minimal-length contents: each
//! INTEGER drops leading zero bytes and carries a single 0x00 pad exactly
//! when the first content byte would otherwise read as negative. The
//! decoder enforces the same rules (Bitcoin "strict DER"): short-form
//! lengths only, minimal integers, no trailing bytes.

use crate::{Error, Result};
use core::fmt;

/// Maximum size of an encoded signature: 6 framing bytes plus two 33-byte
/// integers.
pub const MAX_LEN: usize = 72;

const TAG_SEQUENCE: u8 = 0x30;
const TAG_INTEGER: u8 = 0x02;

/// ASN.1 DER-encoded ECDSA signature.
#[derive(Clone, Copy)]
pub struct Signature {
    bytes: [u8; MAX_LEN],
    length: usize,
}

impl Signature {
    /// Encodes the given big-endian `(r, s)` pair.
    ///
    /// Both values must be non-zero (guaranteed by the caller, which holds
    /// them as non-zero scalars).
    pub(crate) fn from_components(r: &[u8; 32], s: &[u8; 32]) -> Self {
        let mut bytes = [0u8; MAX_LEN];
        let r_len = int_len(r);
        let s_len = int_len(s);
        let body_len = 2 + r_len + 2 + s_len;

        bytes[0] = TAG_SEQUENCE;
        bytes[1] = body_len as u8;
        let mut pos = 2;
        pos = write_int(&mut bytes, pos, r, r_len);
        pos = write_int(&mut bytes, pos, s, s_len);

        Self { bytes, length: pos }
    }

    /// Decodes a strict-DER signature into its big-endian `(r, s)` pair.
    pub(crate) fn decode(input: &[u8]) -> Result<([u8; 32], [u8; 32])> {
        if input.len() < 8 || input.len() > MAX_LEN {
            return Err(Error::InvalidEncoding);
        }
        if input[0] != TAG_SEQUENCE {
            return Err(Error::InvalidEncoding);
        }

        // DER signatures are always short enough for short-form lengths;
        // a long-form (0x80+) length byte is non-minimal here.
        let body_len = input[1] as usize;
        if input[1] & 0x80 != 0 || body_len != input.len() - 2 {
            return Err(Error::InvalidEncoding);
        }

        let (r, pos) = read_int(input, 2)?;
        let (s, pos) = read_int(input, pos)?;

        if pos != input.len() {
            return Err(Error::InvalidEncoding);
        }

        Ok((r, s))
    }

    /// Parses and validates DER framing, retaining the encoded form.
    pub fn from_bytes(input: &[u8]) -> Result<Self> {
        Self::decode(input)?;
        let mut bytes = [0u8; MAX_LEN];
        bytes[..input.len()].copy_from_slice(input);
        Ok(Self {
            bytes,
            length: input.len(),
        })
    }

    /// Borrows the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.length]
    }

    /// Length of the encoding in bytes.
    pub fn len(&self) -> usize {
        self.length
    }

    /// A DER signature is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for Signature {}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "der::Signature(")?;
        for byte in self.as_bytes() {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, ")")
    }
}

impl TryFrom<&[u8]> for Signature {
    type Error = Error;

    fn try_from(input: &[u8]) -> Result<Self> {
        Self::from_bytes(input)
    }
}

/// Length of the minimal INTEGER content for a 32-byte big-endian value.
fn int_len(value: &[u8; 32]) -> usize {
    let zeros = value.iter().take_while(|&&b| b == 0).count();
    let significant = 32 - zeros;
    // a leading high bit needs a 0x00 pad; zero itself encodes as one byte
    match value.get(zeros) {
        Some(&first) if first & 0x80 != 0 => significant + 1,
        Some(_) => significant,
        None => 1,
    }
}

fn write_int(out: &mut [u8; MAX_LEN], mut pos: usize, value: &[u8; 32], len: usize) -> usize {
    out[pos] = TAG_INTEGER;
    out[pos + 1] = len as u8;
    pos += 2;

    let zeros = value.iter().take_while(|&&b| b == 0).count();
    let significant = 32 - zeros;
    if len > significant {
        out[pos] = 0x00;
        pos += 1;
    }
    out[pos..pos + significant].copy_from_slice(&value[zeros..]);
    pos + significant
}

/// Reads one strictly-minimal INTEGER, returning its value left-padded to
/// 32 bytes and the new cursor.
fn read_int(input: &[u8], pos: usize) -> Result<([u8; 32], usize)> {
    let header = input.get(pos..pos + 2).ok_or(Error::InvalidEncoding)?;
    if header[0] != TAG_INTEGER {
        return Err(Error::InvalidEncoding);
    }

    let len = header[1] as usize;
    if len == 0 || len > 33 {
        return Err(Error::InvalidEncoding);
    }

    let content = input
        .get(pos + 2..pos + 2 + len)
        .ok_or(Error::InvalidEncoding)?;

    // negative integers cannot occur
    if content[0] & 0x80 != 0 {
        return Err(Error::InvalidEncoding);
    }
    // a leading zero is only allowed to clear the next byte's high bit
    // (a sole zero byte, the minimal encoding of 0, passes the framing
    // check here and fails the scalar range check later)
    if content[0] == 0 && len > 1 && content[1] & 0x80 == 0 {
        return Err(Error::InvalidEncoding);
    }

    let digits = if content[0] == 0 {
        &content[1..]
    } else {
        content
    };
    if digits.len() > 32 {
        return Err(Error::InvalidEncoding);
    }

    let mut value = [0u8; 32];
    value[32 - digits.len()..].copy_from_slice(digits);
    Ok((value, pos + 2 + len))
}
