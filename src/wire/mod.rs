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

//! The byte-level layer of the DNS wire format: the [`WireBuffer`]
//! that messages are encoded into, the [`Cursor`] that they are decoded
//! from, and the primitive codecs both provide.

use std::fmt;

use crate::name;

mod buffer;
mod cursor;
pub use buffer::{CompressionGuard, WireBuffer};
pub use cursor::{Cursor, DecodeObserver, Tag};

/// The largest offset that a compression pointer can refer to.
pub const POINTER_MAX: usize = 0x3fff;

////////////////////////////////////////////////////////////////////////
// DECODING ERRORS                                                    //
////////////////////////////////////////////////////////////////////////

/// An error produced while decoding wire-format data.
///
/// Every decoding error records the byte offset (from the start of the
/// message) at which the problem was detected, so that callers can log
/// meaningful diagnostics for malformed messages.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    offset: usize,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }

    /// Returns what went wrong.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the offset into the message at which the error was
    /// detected.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns whether this error was caused by the input ending early.
    pub fn is_truncation(&self) -> bool {
        self.kind == ErrorKind::TruncatedInput
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at offset {}", self.kind, self.offset)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind {
            ErrorKind::InvalidName(ref e) => Some(e),
            _ => None,
        }
    }
}

/// The kinds of [`Error`]s that decoding can produce.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// Fewer octets remained than a field requires.
    TruncatedInput,

    /// A domain name was invalid. Compression pointer problems are
    /// reported here as [`name::Error::InvalidPointer`] and
    /// [`name::Error::CompressionLoop`].
    InvalidName(name::Error),

    /// A record's RDATA did not occupy exactly the number of octets
    /// given by its RDLENGTH.
    RdataLengthMismatch,

    /// An algorithm number whose associated data length is unknown.
    UnsupportedAlgorithm(u8),

    /// An IPSECKEY gateway type outside of the defined range.
    UnknownGatewayType(u8),

    /// A DS digest type whose digest length is unknown.
    UnknownDigestType(u8),

    /// A variable-length field that must not be empty was empty.
    EmptyField,

    /// A field had a value that could not be interpreted.
    InvalidField,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::TruncatedInput => f.write_str("truncated input"),
            Self::InvalidName(e) => write!(f, "invalid domain name: {}", e),
            Self::RdataLengthMismatch => f.write_str("RDATA does not match RDLENGTH"),
            Self::UnsupportedAlgorithm(v) => write!(f, "unsupported algorithm {}", v),
            Self::UnknownGatewayType(v) => write!(f, "unknown gateway type {}", v),
            Self::UnknownDigestType(v) => write!(f, "unknown digest type {}", v),
            Self::EmptyField => f.write_str("required field is empty"),
            Self::InvalidField => f.write_str("field has an invalid value"),
        }
    }
}

impl From<name::Error> for ErrorKind {
    fn from(error: name::Error) -> Self {
        match error {
            name::Error::UnexpectedEom => Self::TruncatedInput,
            other => Self::InvalidName(other),
        }
    }
}

/// The result type for decoding operations.
pub type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////
// ENCODING ERRORS                                                    //
////////////////////////////////////////////////////////////////////////

/// An error produced while encoding in-memory data that cannot be
/// represented on the wire.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EncodeError {
    /// An IP address could not be reduced to the family the field
    /// requires.
    NotAnAddressOfExpectedFamily,

    /// A `<character-string>` was longer than 255 octets.
    CharacterStringTooLong,

    /// A length-prefixed field was longer than its length prefix can
    /// express.
    FieldTooLong,

    /// The RDATA of a record was longer than 65,535 octets.
    RdataTooLong,

    /// A message section held more than 65,535 entries.
    SectionTooLong,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::NotAnAddressOfExpectedFamily => {
                f.write_str("address is not of the expected family")
            }
            Self::CharacterStringTooLong => f.write_str("<character-string> is too long"),
            Self::FieldTooLong => f.write_str("field is too long for its length prefix"),
            Self::RdataTooLong => f.write_str("RDATA is too long"),
            Self::SectionTooLong => f.write_str("too many entries in a message section"),
        }
    }
}

impl std::error::Error for EncodeError {}
