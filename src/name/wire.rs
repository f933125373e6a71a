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

//! Implementation of parsing, validation, and compressed serialization
//! of on-the-wire names.

use arrayvec::ArrayVec;

use super::{Error, Name, MAX_LABEL_LEN, MAX_WIRE_LEN};
use crate::wire::{self, Cursor, Tag, WireBuffer};

////////////////////////////////////////////////////////////////////////
// VALIDATION OF UNCOMPRESSED ON-THE-WIRE NAMES                       //
////////////////////////////////////////////////////////////////////////

/// Validates an uncompressed name present at the beginning of `octets`,
/// returning its length. The parameter `use_all` controls whether to
/// expect the name to occupy the entire buffer.
pub fn validate_uncompressed_name(octets: &[u8], use_all: bool) -> Result<usize, Error> {
    let mut offset = 0;
    let mut finished = false;
    while !finished && offset < octets.len() {
        let label_len = octets[offset];
        if label_len > (MAX_LABEL_LEN as u8) {
            return Err(Error::LabelTooLong);
        } else if label_len == 0 {
            finished = true;
        }
        offset += label_len as usize + 1;
        if offset > MAX_WIRE_LEN {
            return Err(Error::NameTooLong);
        }
    }

    if !finished || offset > octets.len() {
        Err(Error::UnexpectedEom)
    } else if use_all && offset < octets.len() {
        Err(Error::ExtraData)
    } else {
        Ok(offset)
    }
}

////////////////////////////////////////////////////////////////////////
// PARSING OF COMPRESSED ON-THE-WIRE NAMES                            //
////////////////////////////////////////////////////////////////////////

/// Parses a compressed name starting at index `start` of `octets`.
/// Pointers are followed. Indices given in pointers are treated as
/// indices of `octets`, so the intention is for an entire DNS message
/// to be passed in `octets`. This is the implementation of
/// [`Name::try_from_compressed`].
///
/// The name is read in "chunks": runs of labels ending either with the
/// null label or with a pointer. Every pointer must refer to an index
/// earlier than the start of the chunk containing it, so chunk starts
/// strictly decrease and the walk always terminates.
pub fn parse_compressed_name(octets: &[u8], start: usize) -> Result<(Name, usize), Error> {
    let mut next_chunk = Some(start);
    let mut wire_len_of_first_chunk = None;
    let mut wire_repr = ArrayVec::<u8, MAX_WIRE_LEN>::new();

    while let Some(chunk_start) = next_chunk {
        let mut index = chunk_start;
        loop {
            let len = *octets.get(index).ok_or(Error::UnexpectedEom)?;
            if len & 0xc0 == 0xc0 {
                next_chunk = Some(parse_pointer(octets, chunk_start, index)?);
                index += 2;
                break;
            } else if len > (MAX_LABEL_LEN as u8) {
                return Err(Error::LabelTooLong);
            }

            let end_of_label = index + len as usize + 1;
            if end_of_label > octets.len() {
                return Err(Error::UnexpectedEom);
            }
            wire_repr
                .try_extend_from_slice(&octets[index..end_of_label])
                .or(Err(Error::NameTooLong))?;
            index = end_of_label;
            if len == 0 {
                next_chunk = None;
                break;
            }
        }
        wire_len_of_first_chunk.get_or_insert(index - chunk_start);
    }

    Ok((
        Name::from_validated(wire_repr),
        wire_len_of_first_chunk.unwrap_or_default(),
    ))
}

/// Parses a pointer at `index` in `octets`. According to
/// [RFC 1035 § 4.1.4], pointers refer to a *prior* occurrence of a
/// name. A pointer at or after its own position is invalid; a pointer
/// back into the chunk currently being read would revisit labels and
/// is reported as a loop.
///
/// [RFC 1035 § 4.1.4]: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.4
fn parse_pointer(octets: &[u8], chunk_start: usize, index: usize) -> Result<usize, Error> {
    let second = *octets.get(index + 1).ok_or(Error::UnexpectedEom)?;
    let pointer = (u16::from_be_bytes([octets[index], second]) & !0xc000) as usize;
    if pointer >= index {
        Err(Error::InvalidPointer)
    } else if pointer >= chunk_start {
        Err(Error::CompressionLoop)
    } else {
        Ok(pointer)
    }
}

////////////////////////////////////////////////////////////////////////
// NAME CODEC OVER WIRE BUFFERS AND CURSORS                           //
////////////////////////////////////////////////////////////////////////

impl Name {
    /// Decodes a possibly compressed name at the cursor's position. The
    /// cursor advances only past the octets of the name at its original
    /// location; octets reached through pointers are not consumed.
    pub fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        let start = cursor.position();
        let (name, len) = parse_compressed_name(cursor.readable(), start)
            .map_err(|e| cursor.error_at(start, e.into()))?;
        cursor.advance(len)?;
        cursor.observe(start, Tag::Name, &name);
        Ok(name)
    }

    /// Encodes this name into `buf`.
    ///
    /// When compression is enabled on the buffer, each suffix of the
    /// name is looked up (longest first) among the names previously
    /// written. On a hit, the labels before that suffix are written
    /// literally and followed by a pointer to it. The suffixes written
    /// literally are then remembered for reuse by later names. When
    /// compression is disabled, the name is written uncompressed and
    /// nothing is remembered.
    pub fn encode(&self, buf: &mut WireBuffer) {
        let n_non_null = self.len() - 1;
        let compress = buf.compression_enabled();
        let start = buf.len();

        let mut pointer = None;
        let mut n_literal = n_non_null;
        if compress {
            for skip in 0..n_non_null {
                if let Some(offset) = self.superdomain(skip).and_then(|s| buf.name_offset(&s)) {
                    pointer = Some(offset);
                    n_literal = skip;
                    break;
                }
            }
        }

        buf.push_slice(self.wire_repr_to(n_literal));
        match pointer {
            Some(offset) => buf.push_u16(0xc000 | offset),
            None => buf.push_u8(0),
        }

        if compress {
            let mut offset = start;
            for (skip, label) in self.labels().take(n_literal).enumerate() {
                if let Some(suffix) = self.superdomain(skip) {
                    buf.remember_name(suffix, offset);
                }
                offset += label.len() + 1;
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::ErrorKind;

    ////////////////////////////////////////////////////////////////////
    // TESTS FOR validate_uncompressed_name                           //
    ////////////////////////////////////////////////////////////////////

    #[test]
    fn validate_uncompressed_name_accepts_valid_names() {
        assert_eq!(
            validate_uncompressed_name(b"\x07example\x04test\x00junk", false),
            Ok(14)
        );
        assert_eq!(
            validate_uncompressed_name(b"\x07example\x04test\x00", true),
            Ok(14)
        );
    }

    #[test]
    fn validate_uncompressed_name_rejects_bad_names() {
        assert_eq!(
            validate_uncompressed_name(b"\x07example\x04test\x00junk", true),
            Err(Error::ExtraData)
        );
        assert_eq!(
            validate_uncompressed_name(b"\x07example\x04tes", true),
            Err(Error::UnexpectedEom)
        );
        assert_eq!(
            validate_uncompressed_name(b"\x40xxxxxxxx\x00", true),
            Err(Error::LabelTooLong)
        );
        let mut long = Vec::new();
        for _ in 0..128 {
            long.extend_from_slice(b"\x01x");
        }
        long.push(0);
        assert_eq!(
            validate_uncompressed_name(&long, true),
            Err(Error::NameTooLong)
        );
    }

    ////////////////////////////////////////////////////////////////////
    // TESTS FOR parse_compressed_name                                //
    ////////////////////////////////////////////////////////////////////

    #[test]
    fn parse_compressed_name_works() {
        let message = b"junk\x04test\x00junk\x07example\xc0\x04junk";
        assert_eq!(
            parse_compressed_name(message, 14),
            Ok(("example.test.".parse().unwrap(), 10))
        );
        assert_eq!(
            parse_compressed_name(message, 4),
            Ok(("test.".parse().unwrap(), 6))
        );
    }

    #[test]
    fn parse_compressed_name_follows_pointer_chains() {
        let message = b"\x04test\x00\x07example\xc0\x00\x03www\xc0\x06";
        assert_eq!(
            parse_compressed_name(message, 16),
            Ok(("www.example.test.".parse().unwrap(), 6))
        );
    }

    #[test]
    fn parse_compressed_name_rejects_pointer_to_self() {
        assert_eq!(
            parse_compressed_name(b"\xc0\x00", 0),
            Err(Error::InvalidPointer)
        );
    }

    #[test]
    fn parse_compressed_name_rejects_forward_pointer() {
        assert_eq!(
            parse_compressed_name(b"\x01x\xc0\x08junk\x00", 0),
            Err(Error::InvalidPointer)
        );
    }

    #[test]
    fn parse_compressed_name_rejects_loops() {
        assert_eq!(
            parse_compressed_name(b"\x01a\x01b\xc0\x00", 2),
            Err(Error::CompressionLoop)
        );
        assert_eq!(
            parse_compressed_name(b"\x01a\xc0\x00", 0),
            Err(Error::CompressionLoop)
        );
    }

    #[test]
    fn parse_compressed_name_rejects_unexpected_eom() {
        assert_eq!(
            parse_compressed_name(b"\x07example\x04tes", 0),
            Err(Error::UnexpectedEom)
        );
        assert_eq!(
            parse_compressed_name(b"\x04test\x00\xc0", 6),
            Err(Error::UnexpectedEom)
        );
    }

    ////////////////////////////////////////////////////////////////////
    // TESTS FOR Name::encode AND Name::decode                        //
    ////////////////////////////////////////////////////////////////////

    #[test]
    fn encode_compresses_shared_suffixes() {
        let first: Name = "www.example.com.".parse().unwrap();
        let second: Name = "mail.EXAMPLE.com.".parse().unwrap();
        let mut buf = WireBuffer::new();
        first.encode(&mut buf);
        second.encode(&mut buf);
        assert_eq!(
            buf.as_slice(),
            b"\x03www\x07example\x03com\x00\x04mail\xc0\x04"
        );
    }

    #[test]
    fn encode_reuses_whole_names() {
        let name: Name = "example.com.".parse().unwrap();
        let mut buf = WireBuffer::new();
        name.encode(&mut buf);
        name.encode(&mut buf);
        assert_eq!(buf.as_slice(), b"\x07example\x03com\x00\xc0\x00");
    }

    #[test]
    fn encode_without_compression_writes_literally() {
        let name: Name = "example.com.".parse().unwrap();
        let mut buf = WireBuffer::new();
        name.encode(&mut buf);
        {
            let mut guard = buf.disable_compression();
            name.encode(&mut guard);
        }
        assert!(buf.compression_enabled());
        name.encode(&mut buf);
        assert_eq!(
            buf.as_slice(),
            b"\x07example\x03com\x00\x07example\x03com\x00\xc0\x00"
        );
    }

    #[test]
    fn decode_consumes_only_the_first_chunk() {
        let message = b"\x07example\x03com\x00\x03www\xc0\x00\xff";
        let mut cursor = Cursor::new(message);
        assert_eq!(
            Name::decode(&mut cursor).unwrap(),
            "example.com.".parse().unwrap()
        );
        assert_eq!(cursor.position(), 13);
        assert_eq!(
            Name::decode(&mut cursor).unwrap(),
            "www.example.com.".parse().unwrap()
        );
        assert_eq!(cursor.position(), 19);
    }

    #[test]
    fn decode_reports_pointer_errors_with_offset() {
        let message = b"\x01x\xc0\x02";
        let mut cursor = Cursor::new(message);
        let error = Name::decode(&mut cursor).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::InvalidName(Error::InvalidPointer));
        assert_eq!(error.offset(), 0);
    }

    #[test]
    fn decode_reports_truncation() {
        let mut cursor = Cursor::new(b"\x07exam");
        let error = Name::decode(&mut cursor).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::TruncatedInput);
    }
}
