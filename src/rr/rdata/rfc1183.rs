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

//! RDATA for the experimental RR types of [RFC 1183] (RP, AFSDB, X25,
//! ISDN, and RT), along with NSAP ([RFC 1706]) and PX ([RFC 2163]).
//!
//! [RFC 1183]: https://datatracker.ietf.org/doc/html/rfc1183
//! [RFC 1706]: https://datatracker.ietf.org/doc/html/rfc1706
//! [RFC 2163]: https://datatracker.ietf.org/doc/html/rfc2163

use std::fmt;

use crate::name::Name;
use crate::util::{write_hex, write_quoted};
use crate::wire::{self, Cursor, EncodeError, WireBuffer};

////////////////////////////////////////////////////////////////////////
// RFC 1183 § 2.2 - RP RR                                             //
////////////////////////////////////////////////////////////////////////

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Rp {
    pub mbox: Name,
    pub txt: Name,
}

impl Rp {
    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        Ok(Self {
            mbox: Name::decode(cursor)?,
            txt: Name::decode(cursor)?,
        })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        self.mbox.encode(buf);
        self.txt.encode(buf);
        Ok(())
    }
}

impl fmt::Display for Rp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.mbox, self.txt)
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 1183 § 1 - AFSDB RR                                            //
////////////////////////////////////////////////////////////////////////

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Afsdb {
    pub subtype: u16,
    pub hostname: Name,
}

impl Afsdb {
    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        Ok(Self {
            subtype: cursor.read_u16()?,
            hostname: Name::decode(cursor)?,
        })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        buf.push_u16(self.subtype);
        self.hostname.encode(buf);
        Ok(())
    }
}

impl fmt::Display for Afsdb {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.subtype, self.hostname)
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 1183 § 3.1 - X25 RR                                            //
////////////////////////////////////////////////////////////////////////

/// The PSDN address of an X25 record.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct X25 {
    pub psdn_address: Vec<u8>,
}

impl X25 {
    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        Ok(Self {
            psdn_address: cursor.read_character_string()?.to_vec(),
        })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        buf.push_character_string(&self.psdn_address)
    }
}

impl fmt::Display for X25 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_quoted(f, &self.psdn_address)
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 1183 § 3.2 - ISDN RR                                           //
////////////////////////////////////////////////////////////////////////

/// The RDATA of an ISDN record. The subaddress is optional in the
/// standard; an empty subaddress is still written on the wire.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Isdn {
    pub address: Vec<u8>,
    pub subaddress: Vec<u8>,
}

impl Isdn {
    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        Ok(Self {
            address: cursor.read_character_string()?.to_vec(),
            subaddress: cursor.read_character_string()?.to_vec(),
        })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        buf.push_character_string(&self.address)?;
        buf.push_character_string(&self.subaddress)
    }
}

impl fmt::Display for Isdn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_quoted(f, &self.address)?;
        f.write_str(" ")?;
        write_quoted(f, &self.subaddress)
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 1183 § 3.3 - RT RR                                             //
////////////////////////////////////////////////////////////////////////

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Rt {
    pub preference: u16,
    pub intermediate: Name,
}

impl Rt {
    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        Ok(Self {
            preference: cursor.read_u16()?,
            intermediate: Name::decode(cursor)?,
        })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        buf.push_u16(self.preference);
        self.intermediate.encode(buf);
        Ok(())
    }
}

impl fmt::Display for Rt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.preference, self.intermediate)
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 1706 § 5 - NSAP RR                                             //
////////////////////////////////////////////////////////////////////////

/// An NSAP address, filling the RDATA.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Nsap {
    pub address: Vec<u8>,
}

impl Nsap {
    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        Ok(Self {
            address: cursor.read_rest()?.to_vec(),
        })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        buf.push_slice(&self.address);
        Ok(())
    }
}

impl fmt::Display for Nsap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("0x")?;
        write_hex(f, &self.address)
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 2163 § 4 - PX RR                                               //
////////////////////////////////////////////////////////////////////////

/// The RDATA of a PX record, mapping between RFC 822 and X.400
/// addresses.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Px {
    pub preference: u16,
    pub map822: Name,
    pub mapx400: Name,
}

impl Px {
    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        Ok(Self {
            preference: cursor.read_u16()?,
            map822: Name::decode(cursor)?,
            mapx400: Name::decode(cursor)?,
        })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        buf.push_u16(self.preference);
        self.map822.encode(buf);
        self.mapx400.encode(buf);
        Ok(())
    }
}

impl fmt::Display for Px {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.preference, self.map822, self.mapx400)
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nsap_displays_as_hex() {
        let nsap = Nsap {
            address: b"\x47\x00\x05\x80".to_vec(),
        };
        assert_eq!(nsap.to_string(), "0x47000580");
    }

    #[test]
    fn isdn_requires_subaddress_field() {
        let mut cursor = Cursor::new(b"\x0f150862028003217");
        assert!(Isdn::decode(&mut cursor).unwrap_err().is_truncation());

        let mut cursor = Cursor::new(b"\x0f150862028003217\x03004");
        let isdn = Isdn::decode(&mut cursor).unwrap();
        assert_eq!(isdn.to_string(), "\"150862028003217\" \"004\"");
    }

    #[test]
    fn px_round_trips_with_compression() {
        let px = Px {
            preference: 10,
            map822: "ab.net2.it.".parse().unwrap(),
            mapx400: "o-ab.prmd-net2.admdb.c-it.".parse().unwrap(),
        };
        let mut buf = WireBuffer::new();
        px.encode(&mut buf).unwrap();
        let mut cursor = Cursor::new(buf.as_slice());
        assert_eq!(Px::decode(&mut cursor).unwrap(), px);
        assert!(cursor.is_at_end());
    }
}
