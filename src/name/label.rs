// Copyright 2021 Matthew Ingwersen.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! Implementation of the [`Label`] type.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A borrowed label of a [`Name`](super::Name).
///
/// A `Label` is a view of the octets of one label, without the length
/// octet that precedes it on the wire. The null label of the DNS root
/// is represented by an empty `Label`.
#[derive(Clone, Copy)]
pub struct Label<'a> {
    octets: &'a [u8],
}

impl<'a> Label<'a> {
    /// Wraps `octets`, which the caller promises is at most 63 octets
    /// long.
    pub(super) fn new(octets: &'a [u8]) -> Self {
        debug_assert!(octets.len() <= super::MAX_LABEL_LEN);
        Self { octets }
    }

    /// Returns the octets of the label.
    pub fn octets(&self) -> &'a [u8] {
        self.octets
    }

    /// Returns the length of the label in octets.
    pub fn len(&self) -> usize {
        self.octets.len()
    }

    /// Returns whether this is the null label.
    pub fn is_null(&self) -> bool {
        self.octets.is_empty()
    }
}

impl fmt::Display for Label<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for octet in self.octets {
            if *octet == b'.' {
                f.write_str("\\.")?;
            } else if *octet == b'\\' {
                f.write_str("\\\\")?;
            } else if octet.is_ascii_graphic() {
                write!(f, "{}", *octet as char)?;
            } else {
                write!(f, "\\{:03}", *octet)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Label<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

/// In accordance with RFC 1034 § 3.1 (clarified by RFC 4343),
/// comparison of `Label`s is ASCII-case-insensitive.
impl PartialEq for Label<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.octets.eq_ignore_ascii_case(other.octets)
    }
}

impl Eq for Label<'_> {}

impl PartialOrd for Label<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// `Label`s are ordered as in [RFC 4034 § 6.1]: as octet strings with
/// upper-case ASCII letters treated as lower-case.
///
/// [RFC 4034 § 6.1]: https://datatracker.ietf.org/doc/html/rfc4034#section-6.1
impl Ord for Label<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.octets
            .iter()
            .zip(other.octets.iter())
            .map(|(a, b)| a.to_ascii_lowercase().cmp(&b.to_ascii_lowercase()))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| self.octets.len().cmp(&other.octets.len()))
    }
}

impl Hash for Label<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Hashing must agree with the case-insensitive PartialEq.
        state.write_u8(self.octets.len() as u8);
        for octet in self.octets {
            state.write_u8(octet.to_ascii_lowercase());
        }
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(label: Label) -> u64 {
        let mut hasher = DefaultHasher::new();
        label.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn labels_compare_case_insensitively() {
        let a = Label::new(b"Quandary");
        let b = Label::new(b"qUANDARY");
        assert_eq!(a, b);
        assert_eq!(hash_of(a), hash_of(b));
    }

    #[test]
    fn labels_order_canonically() {
        assert!(Label::new(b"a") < Label::new(b"B"));
        assert!(Label::new(b"z") < Label::new(b"za"));
        assert!(Label::new(b"") < Label::new(b"\x00"));
    }

    #[test]
    fn display_escapes_special_octets() {
        assert_eq!(Label::new(b"a.b\\c\x07").to_string(), "a\\.b\\\\c\\007");
    }
}
