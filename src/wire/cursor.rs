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

//! Implementation of the [`Cursor`] type and the [`DecodeObserver`]
//! hook.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use super::{Error, ErrorKind, Result};

////////////////////////////////////////////////////////////////////////
// DECODE OBSERVERS                                                   //
////////////////////////////////////////////////////////////////////////

/// Identifies what kind of wire element a [`DecodeObserver`] is being
/// told about.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Tag {
    Header,
    Question,
    Name,
    Record,
    Rdata,
}

/// A side channel that is told about each wire element after it is
/// successfully decoded, along with the offsets of its first octet and
/// of the octet just past it. Observers cannot influence decoding.
///
/// Any `FnMut(usize, usize, Tag, &dyn Debug)` closure is an observer.
pub trait DecodeObserver {
    fn observe(&mut self, start: usize, end: usize, tag: Tag, value: &dyn fmt::Debug);
}

impl<F> DecodeObserver for F
where
    F: FnMut(usize, usize, Tag, &dyn fmt::Debug),
{
    fn observe(&mut self, start: usize, end: usize, tag: Tag, value: &dyn fmt::Debug) {
        self(start, end, tag, value)
    }
}

////////////////////////////////////////////////////////////////////////
// CURSOR                                                             //
////////////////////////////////////////////////////////////////////////

/// A read position within a DNS message.
///
/// One `Cursor` is shared by all the nested decoders of a message, so
/// that compression pointers resolve against the whole message. Reads
/// never go past the cursor's *limit*, which is normally the end of the
/// message; [`Cursor::bounded`] temporarily lowers it to the end of a
/// record's RDATA so that trailing fields of unspecified length cannot
/// swallow the octets of the next record.
pub struct Cursor<'a> {
    octets: &'a [u8],
    position: usize,
    limit: usize,
    observer: Option<&'a mut dyn DecodeObserver>,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor at the start of `octets`.
    pub fn new(octets: &'a [u8]) -> Self {
        Self {
            octets,
            position: 0,
            limit: octets.len(),
            observer: None,
        }
    }

    /// Creates a cursor at the start of `octets` that reports decoded
    /// elements to `observer`.
    pub fn with_observer(octets: &'a [u8], observer: &'a mut dyn DecodeObserver) -> Self {
        Self {
            observer: Some(observer),
            ..Self::new(octets)
        }
    }

    /// Returns the current offset from the start of the message.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the message up to the current limit. Since compression
    /// pointers only point backward, names can be parsed against this
    /// slice with absolute offsets.
    pub fn readable(&self) -> &'a [u8] {
        &self.octets[..self.limit]
    }

    /// Returns the number of octets between the position and the limit.
    pub fn remaining(&self) -> usize {
        self.limit - self.position
    }

    /// Returns whether the position has reached the limit.
    pub fn is_at_end(&self) -> bool {
        self.position >= self.limit
    }

    /// Creates an error at the current position.
    pub fn error(&self, kind: ErrorKind) -> Error {
        Error::new(kind, self.position)
    }

    /// Creates an error at `offset`.
    pub fn error_at(&self, offset: usize, kind: ErrorKind) -> Error {
        Error::new(kind, offset)
    }

    /// Moves the position forward by `n` octets.
    pub fn advance(&mut self, n: usize) -> Result<()> {
        if n > self.remaining() {
            Err(self.error(ErrorKind::TruncatedInput))
        } else {
            self.position += n;
            Ok(())
        }
    }

    /// Reports a decoded element spanning `start` to the current
    /// position to the observer, if there is one.
    pub fn observe(&mut self, start: usize, tag: Tag, value: &dyn fmt::Debug) {
        let end = self.position;
        if let Some(observer) = self.observer.as_mut() {
            observer.observe(start, end, tag, value);
        }
    }

    /// Runs `f` with the limit lowered to `len` octets past the current
    /// position. The length must fit within the current limit, and `f`
    /// must consume exactly `len` octets; otherwise decoding fails with
    /// [`ErrorKind::TruncatedInput`] or
    /// [`ErrorKind::RdataLengthMismatch`], respectively.
    pub fn bounded<T, F>(&mut self, len: usize, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        if len > self.remaining() {
            return Err(self.error(ErrorKind::TruncatedInput));
        }
        let end = self.position + len;
        let saved_limit = std::mem::replace(&mut self.limit, end);
        let result = f(self);
        self.limit = saved_limit;
        let value = result?;
        if self.position != end {
            Err(self.error(ErrorKind::RdataLengthMismatch))
        } else {
            Ok(value)
        }
    }

    ////////////////////////////////////////////////////////////////////
    // PRIMITIVES                                                     //
    ////////////////////////////////////////////////////////////////////

    /// Reads `n` octets.
    pub fn read_slice(&mut self, n: usize) -> Result<&'a [u8]> {
        let start = self.position;
        self.advance(n)?;
        Ok(&self.octets[start..self.position])
    }

    /// Reads everything up to the limit.
    pub fn read_rest(&mut self) -> Result<&'a [u8]> {
        self.read_slice(self.remaining())
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut array = [0; N];
        array.copy_from_slice(self.read_slice(N)?);
        Ok(array)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_be_bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_be_bytes)
    }

    /// Reads a `<character-string>`, returning its contents without the
    /// length octet.
    /// Reads a length-prefixed `<character-string>`. On failure the
    /// position is left before the length octet.
    pub fn read_character_string(&mut self) -> Result<&'a [u8]> {
        let start = self.position;
        let len = self.read_u8()? as usize;
        if len > self.remaining() {
            self.position = start;
            return Err(self.error_at(start + 1, ErrorKind::TruncatedInput));
        }
        self.read_slice(len)
    }

    pub fn read_ipv4(&mut self) -> Result<Ipv4Addr> {
        self.read_array::<4>().map(Ipv4Addr::from)
    }

    pub fn read_ipv6(&mut self) -> Result<Ipv6Addr> {
        self.read_array::<16>().map(Ipv6Addr::from)
    }
}

impl fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("len", &self.octets.len())
            .field("position", &self.position)
            .field("limit", &self.limit)
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_work() {
        let mut cursor = Cursor::new(b"\x01\x02\x03\x04\x05\x06\x07\x04test\xc0\x00\x02\x01");
        assert_eq!(cursor.read_u8(), Ok(0x01));
        assert_eq!(cursor.read_u16(), Ok(0x0203));
        assert_eq!(cursor.read_u32(), Ok(0x04050607));
        assert_eq!(cursor.read_character_string(), Ok(&b"test"[..]));
        assert_eq!(cursor.read_ipv4(), Ok(Ipv4Addr::new(192, 0, 2, 1)));
        assert!(cursor.is_at_end());
    }

    #[test]
    fn reads_past_the_end_fail_without_advancing() {
        let mut cursor = Cursor::new(b"\x00\x01\x02");
        cursor.advance(1).unwrap();
        let error = cursor.read_u32().unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::TruncatedInput);
        assert_eq!(error.offset(), 1);
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn overlong_character_string_fails_without_advancing() {
        let mut cursor = Cursor::new(b"\x05ab");
        let error = cursor.read_character_string().unwrap_err();
        assert!(error.is_truncation());
        assert_eq!(error.offset(), 1);
        assert_eq!(cursor.position(), 0);

        let mut cursor = Cursor::new(b"");
        assert!(cursor.read_character_string().unwrap_err().is_truncation());
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn bounded_limits_reads() {
        let mut cursor = Cursor::new(b"\x00\x01\x02\x03\x04");
        let rest = cursor.bounded(3, |c| c.read_rest()).unwrap();
        assert_eq!(rest, b"\x00\x01\x02");
        assert_eq!(cursor.remaining(), 2);

        let error = cursor.bounded(1, |c| c.read_u16()).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::TruncatedInput);
    }

    #[test]
    fn bounded_rejects_bad_lengths() {
        let mut cursor = Cursor::new(b"\x00\x01\x02\x03");
        let error = cursor.bounded(3, |c| c.read_u16()).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::RdataLengthMismatch);

        let mut cursor = Cursor::new(b"\x00\x01\x02\x03");
        let error = cursor.bounded(5, |c| c.read_rest()).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::TruncatedInput);
    }

    #[test]
    fn observer_sees_spans() {
        let mut seen = Vec::new();
        let mut observer = |start: usize, end: usize, tag: Tag, value: &dyn fmt::Debug| {
            seen.push((start, end, tag, format!("{:?}", value)));
        };
        {
            let mut cursor = Cursor::with_observer(b"\x00\x2a\x00", &mut observer);
            let value = cursor.read_u16().unwrap();
            cursor.observe(0, Tag::Header, &value);
        }
        assert_eq!(seen, vec![(0, 2, Tag::Header, "42".to_owned())]);
    }
}
