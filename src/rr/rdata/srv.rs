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

//! RDATA for the service-location RR types: SRV ([RFC 2782]), NAPTR
//! ([RFC 3403]), and KX ([RFC 2230]).
//!
//! [RFC 2782]: https://datatracker.ietf.org/doc/html/rfc2782
//! [RFC 3403]: https://datatracker.ietf.org/doc/html/rfc3403
//! [RFC 2230]: https://datatracker.ietf.org/doc/html/rfc2230

use std::fmt;

use crate::name::Name;
use crate::util::write_quoted;
use crate::wire::{self, Cursor, EncodeError, WireBuffer};

////////////////////////////////////////////////////////////////////////
// RFC 2782 - SRV RR                                                  //
////////////////////////////////////////////////////////////////////////

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Srv {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: Name,
}

impl Srv {
    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        Ok(Self {
            priority: cursor.read_u16()?,
            weight: cursor.read_u16()?,
            port: cursor.read_u16()?,
            target: Name::decode(cursor)?,
        })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        buf.push_u16(self.priority);
        buf.push_u16(self.weight);
        buf.push_u16(self.port);
        self.target.encode(buf);
        Ok(())
    }
}

impl fmt::Display for Srv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.priority, self.weight, self.port, self.target
        )
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 3403 § 4.1 - NAPTR RR                                          //
////////////////////////////////////////////////////////////////////////

/// The RDATA of a NAPTR record. The replacement name is never
/// compressed.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Naptr {
    pub order: u16,
    pub preference: u16,
    pub flags: Vec<u8>,
    pub services: Vec<u8>,
    pub regexp: Vec<u8>,
    pub replacement: Name,
}

impl Naptr {
    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        Ok(Self {
            order: cursor.read_u16()?,
            preference: cursor.read_u16()?,
            flags: cursor.read_character_string()?.to_vec(),
            services: cursor.read_character_string()?.to_vec(),
            regexp: cursor.read_character_string()?.to_vec(),
            replacement: Name::decode(cursor)?,
        })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        buf.push_u16(self.order);
        buf.push_u16(self.preference);
        buf.push_character_string(&self.flags)?;
        buf.push_character_string(&self.services)?;
        buf.push_character_string(&self.regexp)?;
        self.replacement.encode(&mut buf.disable_compression());
        Ok(())
    }
}

impl fmt::Display for Naptr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} ", self.order, self.preference)?;
        for field in [&self.flags, &self.services, &self.regexp] {
            write_quoted(f, field)?;
            f.write_str(" ")?;
        }
        write!(f, "{}", self.replacement)
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 2230 § 3 - KX RR                                               //
////////////////////////////////////////////////////////////////////////

/// The RDATA of a KX record. The exchanger is written uncompressed.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Kx {
    pub preference: u16,
    pub exchanger: Name,
}

impl Kx {
    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        Ok(Self {
            preference: cursor.read_u16()?,
            exchanger: Name::decode(cursor)?,
        })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        let mut buf = buf.disable_compression();
        buf.push_u16(self.preference);
        self.exchanger.encode(&mut buf);
        Ok(())
    }
}

impl fmt::Display for Kx {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.preference, self.exchanger)
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srv_target_may_be_compressed() {
        let mut buf = WireBuffer::new();
        let target: Name = "sip.example.".parse().unwrap();
        target.encode(&mut buf);
        let first_len = buf.len();

        let srv = Srv {
            priority: 0,
            weight: 5,
            port: 5060,
            target: target.clone(),
        };
        srv.encode(&mut buf).unwrap();
        assert_eq!(buf.len(), first_len + 6 + 2);

        let mut cursor = Cursor::new(buf.as_slice());
        cursor.advance(first_len).unwrap();
        assert_eq!(Srv::decode(&mut cursor).unwrap(), srv);
        assert_eq!(srv.to_string(), "0 5 5060 sip.example.");
    }

    #[test]
    fn naptr_replacement_is_not_compressed() {
        let mut buf = WireBuffer::new();
        let replacement: Name = "_sip._udp.example.com.".parse().unwrap();
        replacement.encode(&mut buf);
        let first_len = buf.len();

        let naptr = Naptr {
            order: 100,
            preference: 10,
            flags: b"S".to_vec(),
            services: b"SIP+D2U".to_vec(),
            regexp: Vec::new(),
            replacement: replacement.clone(),
        };
        naptr.encode(&mut buf).unwrap();
        let expected_len = 4 + 2 + 8 + 1 + replacement.wire_repr().len();
        assert_eq!(buf.len() - first_len, expected_len);
        assert!(buf.compression_enabled());
        assert_eq!(
            naptr.to_string(),
            "100 10 \"S\" \"SIP+D2U\" \"\" _sip._udp.example.com."
        );
    }

    #[test]
    fn kx_round_trips() {
        let kx = Kx {
            preference: 10,
            exchanger: "kx.example.".parse().unwrap(),
        };
        let mut buf = WireBuffer::new();
        kx.encode(&mut buf).unwrap();
        assert!(buf.compression_enabled());
        assert_eq!(Kx::decode(&mut Cursor::new(buf.as_slice())).unwrap(), kx);
    }
}
