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

//! Implementation of the [`Name`] type for domain names and the
//! compression codec for on-the-wire names.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;
use std::str::FromStr;

use arrayvec::ArrayVec;

mod error;
mod label;
mod wire;
pub use error::Error;
pub use label::Label;

/// The maximum number of labels in a domain name.
pub const MAX_N_LABELS: usize = 128;

/// The maximum length of the uncompressed on-the-wire representation of
/// a domain name.
pub const MAX_WIRE_LEN: usize = 255;

/// The maximum length of a label in a domain name (not including the
/// octet that provides the length).
pub const MAX_LABEL_LEN: usize = 63;

////////////////////////////////////////////////////////////////////////
// NAME STRUCTURE                                                     //
////////////////////////////////////////////////////////////////////////

/// A structure to represent a domain name.
///
/// A `Name` stores the uncompressed on-the-wire representation of the
/// domain name, as defined in [RFC 1035 § 3.1], in a fixed-size inline
/// buffer that can hold any valid name. Thus `Name`s never allocate.
/// The original case of each label is preserved, but comparison,
/// hashing, and ordering are ASCII-case-insensitive.
///
/// `Name`s can be constructed in several ways:
///
/// * through the [`FromStr`] implementation, which expects a fully
///   qualified name (with a trailing dot);
/// * from uncompressed on-the-wire names through
///   [`Name::try_from_uncompressed`]; and
/// * from compressed on-the-wire names through
///   [`Name::try_from_compressed`] or [`Name::decode`].
///
/// [RFC 1035 § 3.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-3.1
#[derive(Clone)]
pub struct Name {
    octets: ArrayVec<u8, MAX_WIRE_LEN>,
}

#[allow(clippy::len_without_is_empty)] // A domain name is never empty!
impl Name {
    /// Returns a `Name` representing the DNS root, `.`.
    pub fn root() -> Self {
        let mut octets = ArrayVec::new();
        octets.push(0);
        Self { octets }
    }

    /// Wraps an on-the-wire representation that the caller has already
    /// validated.
    fn from_validated(octets: ArrayVec<u8, MAX_WIRE_LEN>) -> Self {
        debug_assert!(wire::validate_uncompressed_name(&octets, true).is_ok());
        Self { octets }
    }

    /// Returns whether this `Name` is equal to or a subdomain of
    /// `other`.
    pub fn eq_or_subdomain_of(&self, other: &Name) -> bool {
        self.len() >= other.len()
            && self
                .labels()
                .rev()
                .zip(other.labels().rev())
                .all(|(a, b)| a == b)
    }

    /// Returns whether the `Name` is the DNS root `.`.
    pub fn is_root(&self) -> bool {
        self.octets.len() == 1
    }

    /// Returns an iterator over labels in this `Name`, including the
    /// terminal null label.
    pub fn labels(&self) -> Labels {
        Labels::new(self)
    }

    /// Returns the number of labels in this `Name`, including the
    /// terminal null label. The root name thus has length 1.
    pub fn len(&self) -> usize {
        self.labels().len()
    }

    /// Makes all ASCII letters in this `Name` lowercase, as required by
    /// [RFC 4034 § 6.2] for canonical forms.
    ///
    /// [RFC 4034 § 6.2]: https://datatracker.ietf.org/doc/html/rfc4034#section-6.2
    pub fn make_ascii_lowercase(&mut self) {
        let mut offset = 0;
        while self.octets[offset] != 0 {
            let len = self.octets[offset] as usize;
            self.octets[offset + 1..offset + 1 + len].make_ascii_lowercase();
            offset += len + 1;
        }
    }

    /// Returns the superdomain obtained by skipping the first `skip`
    /// labels of the `Name`, or `None` if there aren't enough labels.
    pub fn superdomain(&self, skip: usize) -> Option<Name> {
        if skip < self.len() {
            let start = self.label_offset(skip);
            let mut octets = self.octets.clone();
            octets.drain(..start);
            Some(Self::from_validated(octets))
        } else {
            None
        }
    }

    /// Tries to parse a compressed name present at index `start` of the
    /// provided buffer. Pointers are followed; indices given in
    /// pointers are treated as equivalent to indices in `octets` (so
    /// generally one will pass an entire DNS message in `octets`). Two
    /// things are returned on success:
    ///
    /// * the new `Name`; and
    /// * the number of contiguous octets read at `start`. Equivalently,
    ///   the number of octets to skip after `start` to read the next
    ///   field when parsing a DNS message. If a pointer label is
    ///   present at `start`, this value will be 2.
    pub fn try_from_compressed(octets: &[u8], start: usize) -> Result<(Self, usize), Error> {
        wire::parse_compressed_name(octets, start)
    }

    /// Tries to parse an uncompressed name present at the start of the
    /// provided buffer. The name need not occupy the entire buffer;
    /// extra data is ignored. If the name is valid, it is returned
    /// along with its length in octets.
    pub fn try_from_uncompressed(octets: &[u8]) -> Result<(Self, usize), Error> {
        let len = wire::validate_uncompressed_name(octets, false)?;
        let mut repr = ArrayVec::new();
        repr.try_extend_from_slice(&octets[..len])
            .or(Err(Error::NameTooLong))?;
        Ok((Self::from_validated(repr), len))
    }

    /// Returns the (uncompressed) on-the-wire representation of the
    /// `Name`.
    pub fn wire_repr(&self) -> &[u8] {
        &self.octets
    }

    /// Returns the (uncompressed) on-the-wire representation of the
    /// first `n` labels of the `Name`. This will panic if
    /// `n > self.len()`.
    pub fn wire_repr_to(&self, n: usize) -> &[u8] {
        if n == self.len() {
            self.wire_repr()
        } else {
            &self.octets[..self.label_offset(n)]
        }
    }

    /// Returns the offset of the `n`-th label in the on-the-wire
    /// representation. `n` must be less than `self.len()`.
    fn label_offset(&self, n: usize) -> usize {
        let mut offset = 0;
        for _ in 0..n {
            offset += self.octets[offset] as usize + 1;
        }
        offset
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_root() {
            f.write_str(".")
        } else {
            for label in self.labels().filter(|label| !label.is_null()) {
                write!(f, "{}.", label)?;
            }
            Ok(())
        }
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.octets.len() == other.octets.len() && self.octets.eq_ignore_ascii_case(&other.octets)
    }
}

impl Eq for Name {}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The [`Ord`] implementation for `Name` employs DNSSEC's canonical
/// ordering of domain names. Per [RFC 4034 § 6.1], `Name`s are ordered
/// as strings of labels read from right to left.
///
/// [RFC 4034 § 6.1]: https://datatracker.ietf.org/doc/html/rfc4034#section-6.1
impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        self.labels()
            .rev()
            .zip(other.labels().rev())
            .find_map(|(a, b)| Some(a.cmp(&b)).filter(|ordering| ordering.is_ne()))
            .unwrap_or_else(|| self.len().cmp(&other.len()))
    }
}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for label in self.labels() {
            label.hash(state);
        }
    }
}

////////////////////////////////////////////////////////////////////////
// ITERATION OVER A NAME'S LABELS                                     //
////////////////////////////////////////////////////////////////////////

/// An iterator over the [`Label`]s in a [`Name`].
///
/// To use this iterator, construct one from a [`Name`] using
/// [`Name::labels`].
#[derive(Clone, Debug)]
pub struct Labels<'a> {
    labels: ArrayVec<Label<'a>, MAX_N_LABELS>,
    front: usize,
    back: usize,
}

impl<'a> Labels<'a> {
    fn new(name: &'a Name) -> Self {
        let mut labels = ArrayVec::new();
        let mut offset = 0;
        loop {
            let len = name.octets[offset] as usize;
            labels.push(Label::new(&name.octets[offset + 1..offset + 1 + len]));
            if len == 0 {
                break;
            }
            offset += len + 1;
        }
        let back = labels.len();
        Labels {
            labels,
            front: 0,
            back,
        }
    }
}

impl<'a> Iterator for Labels<'a> {
    type Item = Label<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front < self.back {
            self.front += 1;
            Some(self.labels[self.front - 1])
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl DoubleEndedIterator for Labels<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back > self.front {
            self.back -= 1;
            Some(self.labels[self.back])
        } else {
            None
        }
    }
}

impl ExactSizeIterator for Labels<'_> {}

impl FusedIterator for Labels<'_> {}

////////////////////////////////////////////////////////////////////////
// PARSING OF NAMES FROM RUST STRINGS                                 //
////////////////////////////////////////////////////////////////////////

/// Allows for conversion of a Rust [`str`] into a [`Name`]. The passed
/// string must be strictly ASCII and fully qualified. Escape sequences
/// as defined by [RFC 4343 § 2.1] are supported.
///
/// [RFC 4343 § 2.1]: https://datatracker.ietf.org/doc/html/rfc4343#section-2.1
impl FromStr for Name {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(Error::StrEmpty);
        } else if s == "." {
            return Ok(Name::root());
        }

        let mut remaining_octets: &[u8] = s.as_ref();
        let mut octets = ArrayVec::<u8, MAX_WIRE_LEN>::new();
        let mut label_start = 0;
        let mut label_len = 0;
        octets.push(0);

        // NOTE: to check that the string is ASCII, it suffices to check
        // that each octet is ASCII as we go. This is because all
        // multi-byte characters start with an octet that is not ASCII.
        while let Some(&octet) = remaining_octets.first() {
            let value = if octet == b'\\' {
                let (value, consumed) = parse_escape(&remaining_octets[1..])?;
                remaining_octets = &remaining_octets[consumed + 1..];
                value
            } else if octet == b'.' {
                if label_len == 0 {
                    return Err(Error::NullNonTerminal);
                }
                octets[label_start] = label_len as u8;
                label_start = octets.len();
                label_len = 0;
                octets.try_push(0).or(Err(Error::NameTooLong))?;
                remaining_octets = &remaining_octets[1..];
                continue;
            } else if !octet.is_ascii() {
                return Err(Error::StrNotAscii);
            } else {
                remaining_octets = &remaining_octets[1..];
                octet
            };

            if label_len >= MAX_LABEL_LEN {
                return Err(Error::LabelTooLong);
            }
            octets.try_push(value).or(Err(Error::NameTooLong))?;
            label_len += 1;
        }

        if label_len != 0 {
            Err(Error::NonNullTerminal)
        } else {
            Ok(Self::from_validated(octets))
        }
    }
}

/// Parses an escape sequence. We expect `remaining_octets` to start
/// with the octet immediately *after* the backslash that introduces the
/// escape sequence.
fn parse_escape(remaining_octets: &[u8]) -> Result<(u8, usize), Error> {
    if remaining_octets.is_empty() {
        Err(Error::InvalidEscape)
    } else if remaining_octets[0].is_ascii_digit() {
        if remaining_octets.len() < 3
            || !remaining_octets[1].is_ascii_digit()
            || !remaining_octets[2].is_ascii_digit()
        {
            Err(Error::InvalidEscape)
        } else {
            let hundreds = (remaining_octets[0] - b'0') as usize;
            let tens = (remaining_octets[1] - b'0') as usize;
            let ones = (remaining_octets[2] - b'0') as usize;
            let value = 100 * hundreds + 10 * tens + ones;
            if value > 255 {
                Err(Error::InvalidEscape)
            } else {
                Ok((value as u8, 3))
            }
        }
    } else {
        Ok((remaining_octets[0], 1))
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
