// Copyright 2022 Matthew Ingwersen.
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

//! Implementation of the [`Error`] type for name-related errors.

use std::fmt;

/// Problems found while building a [`Name`](super::Name) from wire
/// octets or from text.
///
/// When a name is decoded from a message, these are wrapped in
/// [`wire::ErrorKind::InvalidName`](crate::wire::ErrorKind::InvalidName),
/// except for [`Error::UnexpectedEom`], which becomes
/// [`wire::ErrorKind::TruncatedInput`](crate::wire::ErrorKind::TruncatedInput).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Error {
    // Compression pointers.
    /// A pointer referred back into the run of labels that led to it.
    CompressionLoop,
    /// A pointer referred to its own position or to a later one.
    InvalidPointer,

    // Lengths.
    /// A label was longer than 63 octets.
    LabelTooLong,
    /// The name was longer than 255 octets in wire form.
    NameTooLong,
    /// The input ended in the middle of the name.
    UnexpectedEom,
    /// Octets were left over after a name that had to fill its input.
    ExtraData,

    // Text.
    /// A backslash escape was malformed or out of range.
    InvalidEscape,
    /// The text had no trailing dot, so it was not fully qualified.
    NonNullTerminal,
    /// The text had an empty label before the end (as in `a..b.`).
    NullNonTerminal,
    /// The text was empty.
    StrEmpty,
    /// The text contained non-ASCII characters.
    StrNotAscii,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Self::CompressionLoop => "compression pointer loop",
            Self::InvalidPointer => "compression pointer does not point backward",
            Self::LabelTooLong => "label is longer than 63 octets",
            Self::NameTooLong => "name is longer than 255 octets",
            Self::UnexpectedEom => "input ends inside the name",
            Self::ExtraData => "octets follow the name",
            Self::InvalidEscape => "invalid escape sequence",
            Self::NonNullTerminal => "name is not fully qualified",
            Self::NullNonTerminal => "name has an empty label",
            Self::StrEmpty => "name is empty",
            Self::StrNotAscii => "name is not ASCII",
        })
    }
}

impl std::error::Error for Error {}
