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

//! Implementation of the [`Header`] type.

use super::{Opcode, Rcode};
use crate::wire::{self, Cursor, WireBuffer};

pub const HEADER_SIZE: usize = 12;

const QR_MASK: u8 = 0x80;
const OPCODE_MASK: u8 = 0x78;
const OPCODE_SHIFT: usize = 3;
const AA_MASK: u8 = 0x04;
const TC_MASK: u8 = 0x02;
const RD_MASK: u8 = 0x01;
const RA_MASK: u8 = 0x80;
const Z_MASK: u8 = 0x40;
const AD_MASK: u8 = 0x20;
const CD_MASK: u8 = 0x10;
const RCODE_MASK: u8 = 0x0f;

////////////////////////////////////////////////////////////////////////
// HEADERS                                                            //
////////////////////////////////////////////////////////////////////////

/// The ID and flags of a DNS message header ([RFC 1035 § 4.1.1]), with
/// the AD and CD bits of [RFC 4035 § 3.2].
///
/// The four section counts are not stored here; they are derived from
/// the sections of the [`Message`](super::Message) when it is encoded.
///
/// [RFC 1035 § 4.1.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.1
/// [RFC 4035 § 3.2]: https://datatracker.ietf.org/doc/html/rfc4035#section-3.2
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Header {
    pub id: u16,
    pub qr: bool,
    pub opcode: Opcode,
    pub aa: bool,
    pub tc: bool,
    pub rd: bool,
    pub ra: bool,
    pub z: bool,
    pub ad: bool,
    pub cd: bool,
    pub rcode: Rcode,
}

/// The section counts that follow the flags in the wire header.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(super) struct Counts {
    pub qdcount: u16,
    pub ancount: u16,
    pub nscount: u16,
    pub arcount: u16,
}

impl Header {
    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<(Self, Counts)> {
        let id = cursor.read_u16()?;
        let first = cursor.read_u8()?;
        let second = cursor.read_u8()?;
        let header = Self {
            id,
            qr: first & QR_MASK != 0,
            opcode: Opcode::from_header_octet(first),
            aa: first & AA_MASK != 0,
            tc: first & TC_MASK != 0,
            rd: first & RD_MASK != 0,
            ra: second & RA_MASK != 0,
            z: second & Z_MASK != 0,
            ad: second & AD_MASK != 0,
            cd: second & CD_MASK != 0,
            rcode: Rcode::from_header_octet(second),
        };
        let counts = Counts {
            qdcount: cursor.read_u16()?,
            ancount: cursor.read_u16()?,
            nscount: cursor.read_u16()?,
            arcount: cursor.read_u16()?,
        };
        Ok((header, counts))
    }

    pub(super) fn encode(&self, counts: Counts, buf: &mut WireBuffer) {
        let first = flag(self.qr, QR_MASK)
            | (u8::from(self.opcode) << OPCODE_SHIFT) & OPCODE_MASK
            | flag(self.aa, AA_MASK)
            | flag(self.tc, TC_MASK)
            | flag(self.rd, RD_MASK);
        let second = flag(self.ra, RA_MASK)
            | flag(self.z, Z_MASK)
            | flag(self.ad, AD_MASK)
            | flag(self.cd, CD_MASK)
            | u8::from(self.rcode) & RCODE_MASK;
        buf.push_u16(self.id);
        buf.push_u8(first);
        buf.push_u8(second);
        buf.push_u16(counts.qdcount);
        buf.push_u16(counts.ancount);
        buf.push_u16(counts.nscount);
        buf.push_u16(counts.arcount);
    }

    /// Returns the names of the flags that are set, in the order dig
    /// prints them.
    pub fn flag_names(&self) -> Vec<&'static str> {
        [
            (self.qr, "qr"),
            (self.aa, "aa"),
            (self.tc, "tc"),
            (self.rd, "rd"),
            (self.ra, "ra"),
            (self.z, "z"),
            (self.ad, "ad"),
            (self.cd, "cd"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect()
    }
}

fn flag(set: bool, mask: u8) -> u8 {
    if set {
        mask
    } else {
        0
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_round_trip() {
        let header = Header {
            id: 0xbeef,
            qr: true,
            opcode: Opcode::Notify,
            aa: true,
            rd: true,
            ad: true,
            rcode: Rcode::NxDomain,
            ..Default::default()
        };
        let counts = Counts {
            qdcount: 1,
            ancount: 2,
            nscount: 3,
            arcount: 4,
        };
        let mut buf = WireBuffer::new();
        header.encode(counts, &mut buf);
        assert_eq!(
            buf.as_slice(),
            b"\xbe\xef\xa5\x23\x00\x01\x00\x02\x00\x03\x00\x04"
        );
        let decoded = Header::decode(&mut Cursor::new(buf.as_slice())).unwrap();
        assert_eq!(decoded, (header, counts));
        assert_eq!(header.flag_names(), ["qr", "aa", "rd", "ad"]);
    }

    #[test]
    fn short_header_is_truncated() {
        let error = Header::decode(&mut Cursor::new(b"\x00\x01\x01\x00\x00\x01")).unwrap_err();
        assert!(error.is_truncation());
    }
}
