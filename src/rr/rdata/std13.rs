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

//! RDATA for the RR types from the original DNS specification, STD 13
//! ([RFC 1034] and [RFC 1035]).
//!
//! The RR types whose RDATA is a single domain name (NS, MD, MF, CNAME,
//! MB, MG, MR, and PTR) are represented directly by [`Name`] in
//! [`Rdata`](super::Rdata), and NULL by [`Opaque`](super::Opaque).
//!
//! [RFC 1034]: https://datatracker.ietf.org/doc/html/rfc1034
//! [RFC 1035]: https://datatracker.ietf.org/doc/html/rfc1035

use std::collections::BTreeSet;
use std::fmt;
use std::net::IpAddr;

use crate::name::Name;
use crate::util::write_quoted;
use crate::wire::{self, Cursor, EncodeError, ErrorKind, WireBuffer};

////////////////////////////////////////////////////////////////////////
// STD 13 - A RR                                                      //
////////////////////////////////////////////////////////////////////////

/// An A record's host address.
///
/// The address is kept as an [`IpAddr`] so that callers can pass any
/// address; encoding fails with
/// [`EncodeError::NotAnAddressOfExpectedFamily`] unless it can be
/// reduced to IPv4.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct A {
    pub address: IpAddr,
}

impl A {
    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        Ok(Self {
            address: cursor.read_ipv4()?.into(),
        })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        buf.push_ipv4(self.address)
    }
}

impl fmt::Display for A {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}

////////////////////////////////////////////////////////////////////////
// STD 13 - SOA RR                                                    //
////////////////////////////////////////////////////////////////////////

/// The RDATA of an SOA record.
///
/// Note that [RFC 1035 § 3.3.13] does not state whether REFRESH, RETRY,
/// and EXPIRE are signed or unsigned. BIND, NSD, and Knot all seem to
/// agree that they are unsigned, and that makes more sense than signed,
/// so we've gone with that!
///
/// [RFC 1035 § 3.3.13]: https://datatracker.ietf.org/doc/html/rfc1035#section-3.3.13
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Soa {
    pub mname: Name,
    pub rname: Name,
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minimum: u32,
}

impl Soa {
    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        Ok(Self {
            mname: Name::decode(cursor)?,
            rname: Name::decode(cursor)?,
            serial: cursor.read_u32()?,
            refresh: cursor.read_u32()?,
            retry: cursor.read_u32()?,
            expire: cursor.read_u32()?,
            minimum: cursor.read_u32()?,
        })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        self.mname.encode(buf);
        self.rname.encode(buf);
        buf.push_u32(self.serial);
        buf.push_u32(self.refresh);
        buf.push_u32(self.retry);
        buf.push_u32(self.expire);
        buf.push_u32(self.minimum);
        Ok(())
    }
}

impl fmt::Display for Soa {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.mname,
            self.rname,
            self.serial,
            self.refresh,
            self.retry,
            self.expire,
            self.minimum
        )
    }
}

////////////////////////////////////////////////////////////////////////
// STD 13 - WKS RR                                                    //
////////////////////////////////////////////////////////////////////////

/// The RDATA of a WKS record: an address, an IP protocol number, and
/// the set of ports on which that protocol's well-known services are
/// offered.
///
/// On the wire, the ports form a bitmap in which port `i` is bit
/// `i & 7` of octet `i >> 3`, counting from the least significant bit.
/// The bitmap is only as long as the highest port requires.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Wks {
    pub address: IpAddr,
    pub protocol: u8,
    pub ports: BTreeSet<u16>,
}

impl Wks {
    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        let address = cursor.read_ipv4()?.into();
        let protocol = cursor.read_u8()?;
        let bitmap_start = cursor.position();
        let bitmap = cursor.read_rest()?;
        if bitmap.len() > WKS_BITMAP_MAX {
            return Err(cursor.error_at(bitmap_start, ErrorKind::InvalidField));
        }
        let mut ports = BTreeSet::new();
        for (index, octet) in bitmap.iter().enumerate() {
            for bit in 0..8 {
                if octet & (1 << bit) != 0 {
                    ports.insert((index * 8 + bit) as u16);
                }
            }
        }
        Ok(Self {
            address,
            protocol,
            ports,
        })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        buf.push_ipv4(self.address)?;
        buf.push_u8(self.protocol);
        if let Some(highest) = self.ports.iter().next_back() {
            let mut bitmap = vec![0; *highest as usize / 8 + 1];
            for port in &self.ports {
                bitmap[*port as usize >> 3] |= 1 << (port & 7);
            }
            buf.push_slice(&bitmap);
        }
        Ok(())
    }
}

impl fmt::Display for Wks {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ", self.address)?;
        match protocol_mnemonic(self.protocol) {
            Some(mnemonic) => f.write_str(mnemonic)?,
            None => write!(f, "{}", self.protocol)?,
        }
        for port in &self.ports {
            match port_mnemonic(*port) {
                Some(mnemonic) => write!(f, " {}", mnemonic)?,
                None => write!(f, " {}", port)?,
            }
        }
        Ok(())
    }
}

/// The longest bitmap whose ports all fit in 16 bits.
const WKS_BITMAP_MAX: usize = 8192;

/// Returns the IANA keyword for an IP protocol number, for the
/// protocols WKS records are used with.
fn protocol_mnemonic(protocol: u8) -> Option<&'static str> {
    match protocol {
        1 => Some("ICMP"),
        6 => Some("TCP"),
        17 => Some("UDP"),
        _ => None,
    }
}

/// Returns the IANA service name for a well-known port.
fn port_mnemonic(port: u16) -> Option<&'static str> {
    let name = match port {
        7 => "echo",
        9 => "discard",
        13 => "daytime",
        19 => "chargen",
        20 => "ftp-data",
        21 => "ftp",
        22 => "ssh",
        23 => "telnet",
        25 => "smtp",
        37 => "time",
        43 => "whois",
        53 => "domain",
        69 => "tftp",
        70 => "gopher",
        79 => "finger",
        80 => "http",
        88 => "kerberos",
        110 => "pop3",
        119 => "nntp",
        123 => "ntp",
        143 => "imap",
        161 => "snmp",
        179 => "bgp",
        389 => "ldap",
        443 => "https",
        514 => "shell",
        587 => "submission",
        636 => "ldaps",
        853 => "domain-s",
        993 => "imaps",
        995 => "pop3s",
        _ => return None,
    };
    Some(name)
}

////////////////////////////////////////////////////////////////////////
// STD 13 - HINFO RR                                                  //
////////////////////////////////////////////////////////////////////////

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Hinfo {
    pub cpu: Vec<u8>,
    pub os: Vec<u8>,
}

impl Hinfo {
    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        Ok(Self {
            cpu: cursor.read_character_string()?.to_vec(),
            os: cursor.read_character_string()?.to_vec(),
        })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        buf.push_character_string(&self.cpu)?;
        buf.push_character_string(&self.os)
    }
}

impl fmt::Display for Hinfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_quoted(f, &self.cpu)?;
        f.write_str(" ")?;
        write_quoted(f, &self.os)
    }
}

////////////////////////////////////////////////////////////////////////
// STD 13 - MINFO RR                                                  //
////////////////////////////////////////////////////////////////////////

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Minfo {
    pub rmailbx: Name,
    pub emailbx: Name,
}

impl Minfo {
    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        Ok(Self {
            rmailbx: Name::decode(cursor)?,
            emailbx: Name::decode(cursor)?,
        })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        self.rmailbx.encode(buf);
        self.emailbx.encode(buf);
        Ok(())
    }
}

impl fmt::Display for Minfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.rmailbx, self.emailbx)
    }
}

////////////////////////////////////////////////////////////////////////
// STD 13 - MX RR                                                     //
////////////////////////////////////////////////////////////////////////

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Mx {
    pub preference: u16,
    pub exchange: Name,
}

impl Mx {
    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        Ok(Self {
            preference: cursor.read_u16()?,
            exchange: Name::decode(cursor)?,
        })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        buf.push_u16(self.preference);
        self.exchange.encode(buf);
        Ok(())
    }
}

impl fmt::Display for Mx {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.preference, self.exchange)
    }
}

////////////////////////////////////////////////////////////////////////
// STD 13 - TXT RR                                                    //
////////////////////////////////////////////////////////////////////////

/// The RDATA of a TXT record: a sequence of `<character-string>`s
/// filling the RDATA.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Txt {
    pub strings: Vec<Vec<u8>>,
}

impl Txt {
    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        let mut strings = Vec::new();
        while !cursor.is_at_end() {
            strings.push(cursor.read_character_string()?.to_vec());
        }
        Ok(Self { strings })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        for string in &self.strings {
            buf.push_character_string(string)?;
        }
        Ok(())
    }
}

impl fmt::Display for Txt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, string) in self.strings.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write_quoted(f, string)?;
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wks_bitmap_is_sized_to_highest_port() {
        let wks = Wks {
            address: "192.0.2.1".parse().unwrap(),
            protocol: 6,
            ports: [0, 25, 9].into_iter().collect(),
        };
        let mut buf = WireBuffer::new();
        wks.encode(&mut buf).unwrap();
        assert_eq!(buf.as_slice(), b"\xc0\x00\x02\x01\x06\x01\x02\x00\x02");

        let mut cursor = Cursor::new(buf.as_slice());
        assert_eq!(Wks::decode(&mut cursor).unwrap(), wks);
        assert_eq!(wks.to_string(), "192.0.2.1 TCP 0 discard smtp");
    }

    #[test]
    fn wks_displays_numbers_without_mnemonics() {
        let wks = Wks {
            address: "192.0.2.1".parse().unwrap(),
            protocol: 132,
            ports: [53, 5353].into_iter().collect(),
        };
        assert_eq!(wks.to_string(), "192.0.2.1 132 domain 5353");
    }

    #[test]
    fn wks_rejects_bitmap_beyond_port_range() {
        let mut octets = b"\xc0\x00\x02\x01\x06".to_vec();
        octets.resize(5 + WKS_BITMAP_MAX, 0xff);
        let mut cursor = Cursor::new(&octets);
        let wks = Wks::decode(&mut cursor).unwrap();
        assert_eq!(wks.ports.len(), 65536);

        octets.push(0x01);
        let error = Wks::decode(&mut Cursor::new(&octets)).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::InvalidField);
        assert_eq!(error.offset(), 5);
    }

    #[test]
    fn wks_without_ports_has_no_bitmap() {
        let wks = Wks {
            address: "192.0.2.1".parse().unwrap(),
            protocol: 17,
            ports: BTreeSet::new(),
        };
        let mut buf = WireBuffer::new();
        wks.encode(&mut buf).unwrap();
        assert_eq!(buf.len(), 5);
    }

    #[test]
    fn a_rejects_ipv6_addresses() {
        let a = A {
            address: "2001:db8::1".parse().unwrap(),
        };
        assert_eq!(
            a.encode(&mut WireBuffer::new()),
            Err(EncodeError::NotAnAddressOfExpectedFamily)
        );
    }

    #[test]
    fn txt_decodes_all_strings() {
        let mut cursor = Cursor::new(b"\x05hello\x00\x03\"x\\");
        let txt = Txt::decode(&mut cursor).unwrap();
        assert_eq!(txt.strings, vec![b"hello".to_vec(), vec![], b"\"x\\".to_vec()]);
        assert_eq!(txt.to_string(), "\"hello\" \"\" \"\\\"x\\\\\"");
    }

    #[test]
    fn txt_rejects_truncated_string() {
        let mut cursor = Cursor::new(b"\x05hell");
        assert!(Txt::decode(&mut cursor).unwrap_err().is_truncation());
    }

    #[test]
    fn soa_displays_in_zone_file_order() {
        let soa = Soa {
            mname: "ns.example.".parse().unwrap(),
            rname: "hostmaster.example.".parse().unwrap(),
            serial: 1,
            refresh: 2,
            retry: 3,
            expire: 4,
            minimum: 5,
        };
        assert_eq!(soa.to_string(), "ns.example. hostmaster.example. 1 2 3 4 5");
    }
}
