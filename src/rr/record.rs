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

//! Implementation of the [`Record`] type for whole resource records.

use std::fmt;

use super::rdata::{ExtRcode, Rdata};
use super::{Ttl, Type};
use crate::class::Class;
use crate::name::Name;
use crate::wire::{self, Cursor, EncodeError, Tag, WireBuffer};

////////////////////////////////////////////////////////////////////////
// RESOURCE RECORDS                                                   //
////////////////////////////////////////////////////////////////////////

/// A resource record, as laid out in [RFC 1035 § 4.1.3].
///
/// Two records are equal when their owners (compared
/// case-insensitively), types, classes, and RDATA are equal. The TTL
/// does not take part in the comparison, following [RFC 2136 § 1.1].
///
/// [RFC 1035 § 4.1.3]: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.3
/// [RFC 2136 § 1.1]: https://datatracker.ietf.org/doc/html/rfc2136#section-1.1
#[derive(Clone, Debug)]
pub struct Record {
    pub owner: Name,
    pub rr_type: Type,
    pub class: Class,
    pub ttl: Ttl,
    pub rdata: Rdata,
}

impl Record {
    /// Creates a record whose type is taken from `rdata`. RDATA that
    /// does not determine a type ([`Rdata::Empty`] and
    /// [`Rdata::Unknown`]) needs [`Record::with_type`] instead.
    pub fn new(owner: Name, class: Class, ttl: Ttl, rdata: Rdata) -> Option<Self> {
        let rr_type = rdata.rr_type()?;
        Some(Self::with_type(owner, rr_type, class, ttl, rdata))
    }

    pub fn with_type(owner: Name, rr_type: Type, class: Class, ttl: Ttl, rdata: Rdata) -> Self {
        debug_assert!(rdata.rr_type().map_or(true, |t| t == rr_type));
        Self {
            owner,
            rr_type,
            class,
            ttl,
            rdata,
        }
    }

    /// Decodes a record at the cursor's position.
    pub fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        let start = cursor.position();
        let owner = Name::decode(cursor)?;
        let rr_type = Type::from(cursor.read_u16()?);
        let class = Class::from(cursor.read_u16()?);
        let ttl = Ttl::from(cursor.read_u32()?);
        let rdlength = cursor.read_u16()?;
        let rdata = Rdata::decode(rr_type, cursor, rdlength)?;
        let record = Self {
            owner,
            rr_type,
            class,
            ttl,
            rdata,
        };
        cursor.observe(start, Tag::Record, &record);
        Ok(record)
    }

    /// Encodes the record into `buf`. RDLENGTH is filled in after the
    /// RDATA has been written.
    pub fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        self.owner.encode(buf);
        buf.push_u16(self.rr_type.into());
        buf.push_u16(self.class.into());
        buf.push_u32(self.ttl.into());
        buf.with_u16_length(|buf| self.rdata.encode(buf))
    }

    /// For an OPT record, returns the extended RCODE and flags carried
    /// in the TTL field.
    pub fn ext_rcode(&self) -> Option<ExtRcode> {
        if self.rr_type == Type::OPT {
            Some(ExtRcode::from_ttl(self.ttl))
        } else {
            None
        }
    }

    /// For an OPT record, returns the requestor's UDP payload size,
    /// which is carried in the class field.
    pub fn udp_payload_size(&self) -> Option<u16> {
        if self.rr_type == Type::OPT {
            Some(self.class.into())
        } else {
            None
        }
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.rr_type == other.rr_type
            && self.class == other.class
            && self.owner == other.owner
            && self.rdata == other.rdata
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.rr_type == Type::OPT {
            write!(
                f,
                "{}\t{}\t{}\tOPT {}",
                self.owner,
                u16::from(self.class),
                ExtRcode::from_ttl(self.ttl),
                self.rdata,
            )
        } else {
            write!(
                f,
                "{}\t{}\t{}\t{} {}",
                self.owner, self.class, self.ttl, self.rr_type, self.rdata,
            )
        }
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rr::rdata::{Opt, A};
    use crate::wire::ErrorKind;

    fn www_example_a() -> Record {
        Record::new(
            "www.example.com.".parse().unwrap(),
            Class::IN,
            Ttl::from(300u32),
            Rdata::A(A {
                address: "93.184.216.34".parse().unwrap(),
            }),
        )
        .unwrap()
    }

    #[test]
    fn a_record_round_trips() {
        let record = www_example_a();
        let mut buf = WireBuffer::new();
        record.encode(&mut buf).unwrap();
        assert_eq!(
            &buf.as_slice()[17..],
            b"\x00\x01\x00\x01\x00\x00\x01\x2c\x00\x04\x5d\xb8\xd8\x22"
        );

        let decoded = Record::decode(&mut Cursor::new(buf.as_slice())).unwrap();
        assert_eq!(decoded.owner, "WWW.EXAMPLE.COM.".parse().unwrap());
        assert_eq!(decoded.ttl, Ttl::from(300u32));
        match decoded.rdata {
            Rdata::A(ref a) => assert_eq!(a.address.to_string(), "93.184.216.34"),
            ref other => panic!("unexpected RDATA {:?}", other),
        }
        assert_eq!(decoded, record);
    }

    #[test]
    fn truncation_is_detected() {
        let mut buf = WireBuffer::new();
        www_example_a().encode(&mut buf).unwrap();
        let octets = buf.as_slice();
        let error = Record::decode(&mut Cursor::new(&octets[..octets.len() - 1])).unwrap_err();
        assert!(error.is_truncation());
    }

    #[test]
    fn equality_ignores_ttl() {
        let mut other = www_example_a();
        other.ttl = Ttl::from(3600u32);
        assert_eq!(other, www_example_a());
        other.class = Class::CH;
        assert_ne!(other, www_example_a());
    }

    #[test]
    fn rdata_length_mismatch_is_detected() {
        // An NS record whose RDLENGTH claims one octet more than the
        // name occupies.
        let octets = b"\x00\x00\x02\x00\x01\x00\x00\x00\x00\x00\x04\x01a\x00\x00";
        let error = Record::decode(&mut Cursor::new(octets)).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::RdataLengthMismatch);
    }

    #[test]
    fn opt_record_displays_specially() {
        let record = Record::with_type(
            Name::root(),
            Type::OPT,
            Class::from(4096),
            ExtRcode {
                rcode: 0,
                version: 0,
                z: ExtRcode::DO,
            }
            .to_ttl(),
            Rdata::Opt(Opt::default()),
        );
        assert_eq!(record.udp_payload_size(), Some(4096));
        assert!(record.ext_rcode().unwrap().dnssec_ok());
        assert_eq!(
            record.to_string(),
            ".\t4096\tEXT_RCODE:00 Ver:0 Z:32768\tOPT "
        );
    }

    #[test]
    fn display_works() {
        assert_eq!(
            www_example_a().to_string(),
            "www.example.com.\tIN\t300\tA 93.184.216.34"
        );
    }
}
