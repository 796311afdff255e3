#![doc = include_str!("../README.md")]
#![cfg_attr(not(test), no_std)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod string;

pub use crate::string::*;

use alloc::vec::Vec;
use core::{fmt, str::Utf8Error};

/// An error indicating that an interior nul byte was found.
///
/// The rejected bytes cannot be turned into a [NulString], but the error
/// keeps ownership of them so nothing is lost. [nul_position](Self::nul_position)
/// reports where the first nul byte was found, and [into_vec](Self::into_vec)
/// hands the bytes back, so a caller may truncate and retry.
///
/// # Examples
///
/// ```
/// use nulstring::NulString;
///
/// let err = NulString::new(&b"f\0o"[..]).unwrap_err();
/// assert_eq!(err.nul_position(), 1);
/// assert_eq!(err.into_vec(), b"f\0o");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NulError {
    nul_position: usize,
    bytes: Vec<u8>,
}

impl NulError {
    /// Returns the position of the first nul byte in the rejected input.
    pub fn nul_position(&self) -> usize {
        self.nul_position
    }

    /// Consumes the error, returning the rejected bytes unchanged.
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}

impl fmt::Display for NulError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(
            fmt,
            "nul byte found in provided data at position: {}",
            self.nul_position
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for NulError {}

/// An error indicating that a byte vector was not a well-formed
/// nul-terminated string.
///
/// Returned by [NulString::from_vec_with_nul] when the vector does not end
/// with a nul byte, or contains more than one. The two reasons are told
/// apart by the [Display](fmt::Display) message.
///
/// # Examples
///
/// ```
/// use nulstring::NulString;
///
/// let err = NulString::from_vec_with_nul(b"foo".to_vec()).unwrap_err();
/// assert_eq!(err.to_string(), "data provided is not nul terminated");
/// assert_eq!(err.into_bytes(), b"foo");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FromVecWithNulError {
    kind: FromVecWithNulErrorKind,
    bytes: Vec<u8>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FromVecWithNulErrorKind {
    MissingNul,
    InteriorNul,
}

impl FromVecWithNulError {
    /// Returns a borrowed view of the rejected bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the error, returning the rejected bytes unchanged.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl fmt::Display for FromVecWithNulError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(match self.kind {
            FromVecWithNulErrorKind::MissingNul => "data provided is not nul terminated",
            FromVecWithNulErrorKind::InteriorNul => {
                "data provided contains more than one nul byte"
            }
        })
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FromVecWithNulError {}

/// An error indicating that a [NulString] did not hold valid UTF-8.
///
/// Returned by [NulString::into_string]. Ownership of the original string is
/// returned to the caller through [into_nulstring](Self::into_nulstring), so
/// a failed conversion never loses the bytes.
///
/// # Examples
///
/// ```
/// use nulstring::NulString;
///
/// let s = NulString::new(&[0x66, 0xff][..]).unwrap();
/// let err = s.into_string().unwrap_err();
/// assert_eq!(err.utf8_error().valid_up_to(), 1);
/// assert_eq!(err.into_nulstring().as_bytes(), [0x66, 0xff]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntoStringError {
    inner: NulString,
    error: Utf8Error,
}

impl IntoStringError {
    /// Consumes the error, returning the [NulString] that failed to convert.
    pub fn into_nulstring(self) -> NulString {
        self.inner
    }

    /// Returns the underlying UTF-8 decode error.
    pub fn utf8_error(&self) -> Utf8Error {
        self.error
    }
}

impl fmt::Display for IntoStringError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str("nul-terminated string contained non-utf8 bytes")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for IntoStringError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
