use alloc::{string::String, vec, vec::Vec};
use core::{
    ffi::CStr,
    fmt::{self, Write},
    ops::Deref,
    str::{self, Utf8Error},
};

use memchr::memchr;

use crate::{FromVecWithNulError, FromVecWithNulErrorKind, IntoStringError, NulError};

/// An owned byte string terminated by exactly one nul byte.
///
/// A `NulString` never contains an interior nul byte and always ends with a
/// single terminating nul. The validating constructors enforce this; the
/// `unsafe` ones trust the caller instead of re-scanning the bytes.
///
/// Once built, the contents never change. Accessors borrow views of the
/// bytes with or without the terminator, and the `into_*` conversions
/// consume the string and hand the underlying bytes back out.
///
/// # Examples
///
/// ```
/// use nulstring::NulString;
///
/// let s = NulString::new("hello").unwrap();
/// assert_eq!(s.as_bytes(), b"hello");
/// assert_eq!(s.as_bytes_with_nul(), b"hello\0");
/// ```
///
/// Interior nul bytes are rejected:
///
/// ```
/// use nulstring::NulString;
///
/// assert!(NulString::new(&b"hello\0world"[..]).is_err());
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NulString {
    inner: Vec<u8>,
}

impl NulString {
    /// Creates a `NulString` from bytes or text, appending the terminator.
    ///
    /// Accepts anything convertible into a byte vector, such as `&str`,
    /// `String`, `&[u8]` or `Vec<u8>`. Every byte is scanned; if a nul byte
    /// is found the input is rejected and returned inside the error.
    ///
    /// # Examples
    ///
    /// ```
    /// use nulstring::NulString;
    ///
    /// let s = NulString::new("foo").unwrap();
    /// assert_eq!(s.as_bytes_with_nul(), [102, 111, 111, 0]);
    /// ```
    ///
    /// An interior nul byte is an error carrying its position:
    ///
    /// ```
    /// use nulstring::NulString;
    ///
    /// let err = NulString::new(&[102, 0, 111][..]).unwrap_err();
    /// assert_eq!(err.nul_position(), 1);
    /// assert_eq!(err.into_vec(), [102, 0, 111]);
    /// ```
    pub fn new<T: Into<Vec<u8>>>(t: T) -> Result<NulString, NulError> {
        let bytes = t.into();
        match memchr(b'\0', &bytes) {
            Some(nul_position) => Err(NulError {
                nul_position,
                bytes,
            }),
            None => Ok(unsafe { NulString::from_vec_unchecked(bytes) }),
        }
    }

    /// Creates a `NulString` from a byte vector, appending the terminator
    /// without scanning for interior nul bytes.
    ///
    /// Use this to skip re-validating bytes that are already known to be
    /// nul-free, for example bytes just taken out of another `NulString`.
    ///
    /// # Safety
    ///
    /// The vector must not contain nul bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use nulstring::NulString;
    ///
    /// let s = unsafe { NulString::from_vec_unchecked(b"abc".to_vec()) };
    /// assert_eq!(s.as_bytes_with_nul(), b"abc\0");
    /// ```
    pub unsafe fn from_vec_unchecked(mut v: Vec<u8>) -> NulString {
        v.push(b'\0');
        NulString { inner: v }
    }

    /// Creates a `NulString` from a byte vector that already carries its
    /// terminator, without validation.
    ///
    /// # Safety
    ///
    /// The vector must contain exactly one nul byte, as its last element.
    ///
    /// # Examples
    ///
    /// ```
    /// use nulstring::NulString;
    ///
    /// let s = unsafe { NulString::from_vec_with_nul_unchecked(b"abc\0".to_vec()) };
    /// assert_eq!(s.as_bytes(), b"abc");
    /// ```
    pub unsafe fn from_vec_with_nul_unchecked(v: Vec<u8>) -> NulString {
        NulString { inner: v }
    }

    /// Creates a `NulString` from a byte vector that claims to already carry
    /// its terminator.
    ///
    /// The vector is taken over as-is, with no copy and no appended byte.
    /// It must end with a nul byte and contain no other.
    ///
    /// # Examples
    ///
    /// ```
    /// use nulstring::NulString;
    ///
    /// let s = NulString::from_vec_with_nul(b"foo\0".to_vec()).unwrap();
    /// assert_eq!(s, NulString::new("foo").unwrap());
    /// ```
    ///
    /// A missing terminator and an extra nul byte are distinct errors:
    ///
    /// ```
    /// use nulstring::NulString;
    ///
    /// let err = NulString::from_vec_with_nul(b"foo".to_vec()).unwrap_err();
    /// assert_eq!(err.to_string(), "data provided is not nul terminated");
    ///
    /// let err = NulString::from_vec_with_nul(b"f\0o\0".to_vec()).unwrap_err();
    /// assert_eq!(err.to_string(), "data provided contains more than one nul byte");
    /// ```
    pub fn from_vec_with_nul(v: Vec<u8>) -> Result<NulString, FromVecWithNulError> {
        let kind = match v.last() {
            Some(0) => match memchr(b'\0', &v[..v.len() - 1]) {
                Some(_) => FromVecWithNulErrorKind::InteriorNul,
                None => return Ok(unsafe { NulString::from_vec_with_nul_unchecked(v) }),
            },
            _ => FromVecWithNulErrorKind::MissingNul,
        };
        Err(FromVecWithNulError { kind, bytes: v })
    }

    /// Converts the `NulString` into a [String] if it holds valid UTF-8.
    ///
    /// On failure ownership of the original string is returned inside the
    /// error, so the bytes are not lost.
    ///
    /// # Examples
    ///
    /// ```
    /// use nulstring::NulString;
    ///
    /// let s = NulString::new("foo").unwrap();
    /// assert_eq!(s.into_string().unwrap(), "foo");
    /// ```
    ///
    /// Recovering the string after a failed conversion:
    ///
    /// ```
    /// use nulstring::NulString;
    ///
    /// let s = NulString::new(&[0x66, 0x6f, 0xff][..]).unwrap();
    /// let err = s.into_string().unwrap_err();
    /// let s = err.into_nulstring();
    /// assert_eq!(s.as_bytes(), [0x66, 0x6f, 0xff]);
    /// ```
    pub fn into_string(self) -> Result<String, IntoStringError> {
        String::from_utf8(self.into_bytes()).map_err(|err| {
            let error = err.utf8_error();
            IntoStringError {
                inner: unsafe { NulString::from_vec_unchecked(err.into_bytes()) },
                error,
            }
        })
    }

    /// Consumes the `NulString`, returning its bytes without the terminator.
    ///
    /// # Examples
    ///
    /// ```
    /// use nulstring::NulString;
    ///
    /// let s = NulString::new("foo").unwrap();
    /// assert_eq!(s.into_bytes(), b"foo");
    /// ```
    pub fn into_bytes(self) -> Vec<u8> {
        let mut v = self.into_bytes_with_nul();
        let nul = v.pop();
        debug_assert_eq!(nul, Some(b'\0'));
        v
    }

    /// Consumes the `NulString`, returning its bytes with the terminator.
    ///
    /// # Examples
    ///
    /// ```
    /// use nulstring::NulString;
    ///
    /// let s = NulString::new("foo").unwrap();
    /// assert_eq!(s.into_bytes_with_nul(), b"foo\0");
    /// ```
    pub fn into_bytes_with_nul(self) -> Vec<u8> {
        self.inner
    }

    /// Returns the bytes of this string **without** the nul terminator.
    ///
    /// # Examples
    ///
    /// ```
    /// use nulstring::NulString;
    ///
    /// let s = NulString::new("123456").unwrap();
    /// assert_eq!(s.as_bytes(), b"123456");
    /// ```
    pub fn as_bytes(&self) -> &[u8] {
        &self.inner[..self.inner.len() - 1]
    }

    /// Returns the bytes of this string **with** the nul terminator.
    ///
    /// # Examples
    ///
    /// ```
    /// use nulstring::NulString;
    ///
    /// let s = NulString::new("123456").unwrap();
    /// assert_eq!(s.as_bytes_with_nul(), b"123456\0");
    /// ```
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.inner
    }

    /// Borrows this string as a [CStr] slice.
    ///
    /// # Examples
    ///
    /// ```
    /// use core::ffi::CStr;
    /// use nulstring::NulString;
    ///
    /// let s = NulString::new("banana").unwrap();
    /// let c: &CStr = s.as_c_str();
    /// assert_eq!(c.to_bytes(), b"banana");
    /// ```
    pub fn as_c_str(&self) -> &CStr {
        unsafe { CStr::from_bytes_with_nul_unchecked(&self.inner) }
    }

    /// Yields a <code>&[str]</code> slice if the `NulString` contains valid
    /// UTF-8.
    ///
    /// # Examples
    ///
    /// ```
    /// use nulstring::NulString;
    ///
    /// let s = NulString::new("foobar").unwrap();
    /// assert_eq!(s.to_str(), Ok("foobar"));
    /// ```
    pub fn to_str(&self) -> Result<&str, Utf8Error> {
        str::from_utf8(self.as_bytes())
    }

    /// Returns the length of this string, excluding the nul terminator.
    ///
    /// # Examples
    ///
    /// ```
    /// use nulstring::NulString;
    ///
    /// let s = NulString::new("123456").unwrap();
    /// assert_eq!(s.count_bytes(), 6);
    /// assert_eq!(s.as_bytes_with_nul().len(), 7);
    /// ```
    pub fn count_bytes(&self) -> usize {
        self.inner.len() - 1
    }

    /// Returns `true` if this string has a length of 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use nulstring::NulString;
    ///
    /// assert!(NulString::new("").unwrap().is_empty());
    /// assert!(!NulString::new("123").unwrap().is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.count_bytes() == 0
    }

    /// Returns an iterator over the chars of this string.
    ///
    /// Any invalid UTF-8 sequences are replaced with
    /// [`U+FFFD REPLACEMENT CHARACTER`][U+FFFD].
    ///
    /// [U+FFFD]: core::char::REPLACEMENT_CHARACTER
    ///
    /// # Examples
    ///
    /// ```
    /// use nulstring::NulString;
    ///
    /// let word = NulString::new("cup").unwrap();
    /// let mut chars = word.chars();
    /// assert_eq!(chars.next(), Some('c'));
    /// assert_eq!(chars.next(), Some('u'));
    /// assert_eq!(chars.next(), Some('p'));
    /// assert_eq!(chars.next(), None);
    /// ```
    ///
    /// Invalid UTF-8 does not stop the iteration:
    ///
    /// ```
    /// use nulstring::NulString;
    ///
    /// let word = NulString::new(&b"inva\x83lid"[..]).unwrap();
    /// assert_eq!(8, word.chars().count());
    /// assert_eq!(word.chars().nth(4), Some(char::REPLACEMENT_CHARACTER));
    /// ```
    pub fn chars(&self) -> Chars<'_> {
        Chars::new(self.as_bytes())
    }
}

impl Default for NulString {
    fn default() -> Self {
        NulString { inner: vec![0] }
    }
}

impl Deref for NulString {
    type Target = CStr;

    fn deref(&self) -> &Self::Target {
        self.as_c_str()
    }
}

impl From<&CStr> for NulString {
    fn from(value: &CStr) -> Self {
        unsafe { NulString::from_vec_with_nul_unchecked(value.to_bytes_with_nul().to_vec()) }
    }
}

impl From<NulString> for Vec<u8> {
    fn from(value: NulString) -> Self {
        value.into_bytes()
    }
}

impl TryFrom<&str> for NulString {
    type Error = NulError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        NulString::new(value)
    }
}

impl AsRef<[u8]> for NulString {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl AsRef<CStr> for NulString {
    fn as_ref(&self) -> &CStr {
        self.as_c_str()
    }
}

impl fmt::Display for NulString {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        for c in self.chars() {
            fmt.write_char(c)?;
        }
        Ok(())
    }
}

impl fmt::Debug for NulString {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_char('"')?;
        for c in self.chars() {
            fmt::Display::fmt(&c.escape_debug(), fmt)?;
        }
        fmt.write_char('"')
    }
}

/// An iterator over the [char](core::primitive::char)s of a [NulString].
///
/// Any invalid UTF-8 sequences are replaced with
/// [`U+FFFD REPLACEMENT CHARACTER`][U+FFFD].
///
/// This struct is created by the [chars](NulString::chars) method on
/// [NulString]. See its documentation for more.
///
/// [U+FFFD]: core::char::REPLACEMENT_CHARACTER
pub struct Chars<'a> {
    bytes: &'a [u8],
}

impl<'a> Chars<'a> {
    const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Views the not yet consumed bytes of the underlying string.
    ///
    /// ```
    /// use nulstring::NulString;
    ///
    /// let s = NulString::new("abc").unwrap();
    /// let mut chars = s.chars();
    ///
    /// assert_eq!(chars.as_bytes(), b"abc");
    /// chars.next();
    /// assert_eq!(chars.as_bytes(), b"bc");
    /// ```
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    fn next_byte(&mut self) -> Option<u8> {
        let (&b, rest) = self.bytes.split_first()?;
        self.bytes = rest;
        Some(b)
    }
}

impl Iterator for Chars<'_> {
    type Item = char;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buf = [0; 4];
        buf[0] = self.next_byte()?;
        let (len, mask) = match buf[0] {
            0x00..=0x7f => return Some(char::from(buf[0])),
            0x80..=0xbf => return Some(char::REPLACEMENT_CHARACTER),
            0xc0..=0xdf => (2, 0x1f),
            0xe0..=0xef => (3, 0x0f),
            0xf0..=0xf7 => (4, 0x07),
            0xf8..=0xff => return Some(char::REPLACEMENT_CHARACTER),
        };
        for b in &mut buf[1..len] {
            match self.next_byte() {
                Some(next) => *b = next,
                None => return Some(char::REPLACEMENT_CHARACTER),
            }
        }
        let mut raw = (buf[0] & mask) as u32;
        for b in &buf[1..len] {
            if *b & 0xc0 != 0x80 {
                return Some(char::REPLACEMENT_CHARACTER);
            }
            raw = (raw << 6) | (*b & 0x3f) as u32;
        }
        Some(char::from_u32(raw).unwrap_or(char::REPLACEMENT_CHARACTER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn new_appends_nul() {
        let s = NulString::new("foo").unwrap();
        assert_eq!(s.as_bytes(), b"foo");
        assert_eq!(s.as_bytes_with_nul(), [102, 111, 111, 0]);
        assert_eq!(s.count_bytes(), 3);
    }

    #[test]
    fn new_accepts_text_and_bytes() {
        let s1 = NulString::new("abc").unwrap();
        let s2 = NulString::new(String::from("abc")).unwrap();
        let s3 = NulString::new(&b"abc"[..]).unwrap();
        let s4 = NulString::new(b"abc".to_vec()).unwrap();
        assert_eq!(s1, s2);
        assert_eq!(s2, s3);
        assert_eq!(s3, s4);
    }

    #[test]
    fn new_rejects_interior_nul() {
        let err = NulString::new(&[102, 0, 111][..]).unwrap_err();
        assert_eq!(err.nul_position(), 1);
        assert_eq!(
            err.to_string(),
            "nul byte found in provided data at position: 1"
        );
        assert_eq!(err.into_vec(), [102, 0, 111]);
    }

    #[test]
    fn empty() {
        let s = NulString::new("").unwrap();
        assert!(s.is_empty());
        assert_eq!(s.as_bytes(), b"");
        assert_eq!(s.as_bytes_with_nul(), b"\0");
        assert_eq!(s, NulString::default());
    }

    #[test]
    fn from_vec_with_nul() {
        let s = NulString::from_vec_with_nul(b"foo\0".to_vec()).unwrap();
        assert_eq!(s, NulString::new("foo").unwrap());
    }

    #[test]
    fn from_vec_with_nul_missing_terminator() {
        let err = NulString::from_vec_with_nul(b"foo".to_vec()).unwrap_err();
        assert_eq!(err.to_string(), "data provided is not nul terminated");
        assert_eq!(err.into_bytes(), b"foo");

        let err = NulString::from_vec_with_nul(Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "data provided is not nul terminated");
    }

    #[test]
    fn from_vec_with_nul_extra_nul() {
        let err = NulString::from_vec_with_nul(b"f\0o\0".to_vec()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "data provided contains more than one nul byte"
        );
        assert_eq!(err.as_bytes(), b"f\0o\0");
    }

    #[test]
    fn unchecked() {
        let s1 = unsafe { NulString::from_vec_unchecked(b"abc".to_vec()) };
        let s2 = unsafe { NulString::from_vec_with_nul_unchecked(b"abc\0".to_vec()) };
        let s3 = NulString::new("abc").unwrap();
        assert_eq!(s1, s2);
        assert_eq!(s2, s3);
    }

    #[test]
    fn into_string() {
        let s = NulString::new("foo").unwrap();
        assert_eq!(s.into_string().unwrap(), "foo");
    }

    #[test]
    fn into_string_invalid_utf8() {
        let s = NulString::new(&[0x66, 0x6f, 0xff][..]).unwrap();
        let err = s.into_string().unwrap_err();
        assert_eq!(err.utf8_error().valid_up_to(), 2);
        let s = err.into_nulstring();
        assert_eq!(s.as_bytes(), [0x66, 0x6f, 0xff]);
        assert_eq!(s.as_bytes_with_nul(), [0x66, 0x6f, 0xff, 0]);
    }

    #[test]
    fn into_bytes() {
        let s = NulString::new("foo").unwrap();
        assert_eq!(s.clone().into_bytes(), b"foo");
        assert_eq!(s.into_bytes_with_nul(), b"foo\0");
    }

    #[test]
    fn accessors_are_idempotent() {
        let s = NulString::new("bar").unwrap();
        assert_eq!(s.as_bytes(), s.as_bytes());
        assert_eq!(s.as_bytes_with_nul(), s.as_bytes_with_nul());
    }

    #[test]
    fn as_c_str() {
        let s = NulString::new("banana").unwrap();
        let c = CStr::from_bytes_with_nul(b"banana\0").unwrap();
        assert_eq!(s.as_c_str(), c);
        // Deref exposes CStr methods directly.
        assert_eq!(s.to_bytes(), b"banana");
    }

    #[test]
    fn from_c_str() {
        let c = CStr::from_bytes_with_nul(b"hello\0").unwrap();
        let s = NulString::from(c);
        assert_eq!(s, NulString::new("hello").unwrap());
    }

    #[test]
    fn try_from_str() {
        let s = NulString::try_from("abc123").unwrap();
        assert_eq!(s.to_str(), Ok("abc123"));
        assert!(NulString::try_from("abc\0123").is_err());
    }

    #[test]
    fn cmp() {
        let s1 = NulString::new("a").unwrap();
        let s2 = NulString::new("ab").unwrap();
        assert!(s1 < s2);
        assert!(s1 == s1.clone());
        assert!(!(s2 < s1));
    }

    #[test]
    fn display() {
        let s = NulString::new("foo\x1b123").unwrap();
        assert_eq!(format!("{s}"), "foo\x1b123");
    }

    #[test]
    fn debug() {
        let s = NulString::new("foo\x1b123").unwrap();
        assert_eq!(format!("{s:?}"), format!("{:?}", "foo\x1b123"));
    }

    #[test]
    fn debug_invalid_utf8() {
        let s = NulString::new(&[0x66, 0xff][..]).unwrap();
        assert_eq!(format!("{s:?}"), "\"f\u{fffd}\"");
    }

    #[test]
    fn chars() {
        let s = NulString::new("\u{40}\u{0440}\u{10040}").unwrap();
        let mut chars = s.chars();
        assert_eq!(chars.next(), Some('@'));
        assert_eq!(chars.next(), Some('р'));
        assert_eq!(chars.next(), Some('𐁀'));
        assert_eq!(chars.next(), None);
    }

    #[test]
    fn chars_invalid() {
        fn chars(slice: &[u8]) -> Vec<char> {
            NulString::new(slice).unwrap().chars().collect()
        }

        let r = char::REPLACEMENT_CHARACTER;
        assert_eq!(chars(b"1\x802\xff3"), ['1', r, '2', r, '3']);
        assert_eq!(chars(b"1\xc0\x402"), ['1', r, '2']);
        assert_eq!(chars(b"1\xe0\x80\xff2"), ['1', r, '2']);
        assert_eq!(chars(b"1\xf0\x80\x80\x7f2"), ['1', r, '2']);
        assert_eq!(chars(b"1\xf0"), ['1', r]);
    }

    proptest! {
        #[test]
        fn nul_free_round_trip(b in prop::collection::vec(1u8..=255, 0..64)) {
            let s = NulString::new(b.clone()).unwrap();
            prop_assert_eq!(s.as_bytes(), &b[..]);

            let mut with_nul = b.clone();
            with_nul.push(0);
            prop_assert_eq!(s.as_bytes_with_nul(), &with_nul[..]);
            prop_assert_eq!(s.as_bytes_with_nul().len(), b.len() + 1);

            prop_assert_eq!(NulString::from_vec_with_nul(with_nul).unwrap(), s);
        }

        #[test]
        fn interior_nul_rejected(
            prefix in prop::collection::vec(1u8..=255, 0..16),
            suffix in prop::collection::vec(any::<u8>(), 0..16),
        ) {
            let mut bytes = prefix.clone();
            bytes.push(0);
            bytes.extend_from_slice(&suffix);

            let err = NulString::new(bytes.clone()).unwrap_err();
            prop_assert_eq!(err.nul_position(), prefix.len());
            prop_assert_eq!(err.into_vec(), bytes);
        }

        #[test]
        fn into_string_iff_utf8(b in prop::collection::vec(1u8..=255, 0..64)) {
            let valid = str::from_utf8(&b).is_ok();
            let s = NulString::new(b.clone()).unwrap();
            match s.into_string() {
                Ok(text) => {
                    prop_assert!(valid);
                    prop_assert_eq!(text.as_bytes(), &b[..]);
                }
                Err(err) => {
                    prop_assert!(!valid);
                    let s = err.into_nulstring();
                    prop_assert_eq!(s.as_bytes(), &b[..]);
                }
            }
        }

        #[test]
        fn text_round_trip(t in "\\PC*") {
            let s = NulString::new(t.as_str()).unwrap();
            prop_assert_eq!(s.into_string().unwrap(), t);
        }
    }
}
