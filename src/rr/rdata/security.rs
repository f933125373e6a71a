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

//! RDATA for RR types that publish keys and certificates: CERT
//! ([RFC 4398]), IPSECKEY ([RFC 4025]), SSHFP ([RFC 4255]), and DHCID
//! ([RFC 4701]).
//!
//! [RFC 4025]: https://datatracker.ietf.org/doc/html/rfc4025
//! [RFC 4255]: https://datatracker.ietf.org/doc/html/rfc4255
//! [RFC 4398]: https://datatracker.ietf.org/doc/html/rfc4398
//! [RFC 4701]: https://datatracker.ietf.org/doc/html/rfc4701

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use sha2::{Digest, Sha256};

use super::read_nonempty_rest;
use crate::name::Name;
use crate::util::{write_base64, write_hex};
use crate::wire::{self, Cursor, EncodeError, ErrorKind, WireBuffer};

////////////////////////////////////////////////////////////////////////
// RFC 4398 § 2 - CERT RR                                             //
////////////////////////////////////////////////////////////////////////

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Cert {
    pub cert_type: u16,
    pub key_tag: u16,
    pub algorithm: u8,
    pub certificate: Vec<u8>,
}

impl Cert {
    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        Ok(Self {
            cert_type: cursor.read_u16()?,
            key_tag: cursor.read_u16()?,
            algorithm: cursor.read_u8()?,
            certificate: read_nonempty_rest(cursor)?,
        })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        buf.push_u16(self.cert_type);
        buf.push_u16(self.key_tag);
        buf.push_u8(self.algorithm);
        buf.push_slice(&self.certificate);
        Ok(())
    }
}

impl fmt::Display for Cert {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {} ", self.cert_type, self.key_tag, self.algorithm)?;
        write_base64(f, &self.certificate)
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 4025 § 2 - IPSECKEY RR                                         //
////////////////////////////////////////////////////////////////////////

/// The gateway of an IPSECKEY record. The variant determines the
/// gateway type octet on the wire.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Gateway {
    None,
    V4(Ipv4Addr),
    V6(Ipv6Addr),
    Domain(Name),
}

impl Gateway {
    /// Returns the gateway type octet for this gateway.
    pub fn gateway_type(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::V4(_) => 1,
            Self::V6(_) => 2,
            Self::Domain(_) => 3,
        }
    }
}

impl fmt::Display for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::None => f.write_str("."),
            Self::V4(address) => write!(f, "{}", address),
            Self::V6(address) => write!(f, "{}", address),
            Self::Domain(name) => write!(f, "{}", name),
        }
    }
}

/// The RDATA of an IPSECKEY record. The public key must not be empty,
/// and a domain-name gateway is never compressed.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Ipseckey {
    pub precedence: u8,
    pub algorithm: u8,
    pub gateway: Gateway,
    pub public_key: Vec<u8>,
}

impl Ipseckey {
    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        let precedence = cursor.read_u8()?;
        let gateway_type_offset = cursor.position();
        let gateway_type = cursor.read_u8()?;
        let algorithm = cursor.read_u8()?;
        let gateway = match gateway_type {
            0 => Gateway::None,
            1 => Gateway::V4(cursor.read_ipv4()?),
            2 => Gateway::V6(cursor.read_ipv6()?),
            3 => Gateway::Domain(Name::decode(cursor)?),
            _ => {
                return Err(cursor.error_at(
                    gateway_type_offset,
                    ErrorKind::UnknownGatewayType(gateway_type),
                ))
            }
        };
        Ok(Self {
            precedence,
            algorithm,
            gateway,
            public_key: read_nonempty_rest(cursor)?,
        })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        buf.push_u8(self.precedence);
        buf.push_u8(self.gateway.gateway_type());
        buf.push_u8(self.algorithm);
        match self.gateway {
            Gateway::None => (),
            Gateway::V4(address) => buf.push_slice(&address.octets()),
            Gateway::V6(address) => buf.push_slice(&address.octets()),
            Gateway::Domain(ref name) => name.encode(&mut buf.disable_compression()),
        }
        buf.push_slice(&self.public_key);
        Ok(())
    }
}

impl fmt::Display for Ipseckey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} ",
            self.precedence,
            self.gateway.gateway_type(),
            self.algorithm,
            self.gateway,
        )?;
        write_base64(f, &self.public_key)
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 4255 § 3.1 - SSHFP RR                                          //
////////////////////////////////////////////////////////////////////////

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Sshfp {
    pub algorithm: u8,
    pub fingerprint_type: u8,
    pub fingerprint: Vec<u8>,
}

impl Sshfp {
    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        Ok(Self {
            algorithm: cursor.read_u8()?,
            fingerprint_type: cursor.read_u8()?,
            fingerprint: read_nonempty_rest(cursor)?,
        })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        buf.push_u8(self.algorithm);
        buf.push_u8(self.fingerprint_type);
        buf.push_slice(&self.fingerprint);
        Ok(())
    }
}

impl fmt::Display for Sshfp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} ", self.algorithm, self.fingerprint_type)?;
        write_hex(f, &self.fingerprint)
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 4701 § 3 - DHCID RR                                            //
////////////////////////////////////////////////////////////////////////

/// The RDATA of a DHCID record: an identifier type, a digest type, and
/// the digest, kept together as one opaque (but non-empty) field.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Dhcid {
    pub data: Vec<u8>,
}

impl Dhcid {
    /// The SHA-256 digest type (RFC 4701 § 3.3).
    pub const SHA256: u8 = 1;

    /// Computes the RDATA for a client with the given identifier type
    /// and identifier, whose FQDN is `fqdn`, as described in RFC 4701
    /// § 3.3: the SHA-256 digest of the identifier followed by the
    /// canonical wire form of the FQDN.
    pub fn from_identifier(identifier_type: u16, identifier: &[u8], fqdn: &Name) -> Self {
        let mut canonical = fqdn.clone();
        canonical.make_ascii_lowercase();

        let mut hasher = Sha256::new();
        hasher.update(identifier);
        hasher.update(canonical.wire_repr());

        let mut data = Vec::with_capacity(35);
        data.extend_from_slice(&identifier_type.to_be_bytes());
        data.push(Self::SHA256);
        data.extend_from_slice(&hasher.finalize());
        Self { data }
    }

    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        Ok(Self {
            data: read_nonempty_rest(cursor)?,
        })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        buf.push_slice(&self.data);
        Ok(())
    }
}

impl fmt::Display for Dhcid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_base64(f, &self.data)
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dhcid_matches_rfc4701_example() {
        // RFC 4701 § 3.6, example 1: a DHCPv6 DUID (identifier type
        // 0x0002).
        let duid = b"\x00\x01\x00\x06\x41\x2d\xf1\x66\x01\x02\x03\x04\x05\x06";
        let fqdn: Name = "chi6.example.com.".parse().unwrap();
        let dhcid = Dhcid::from_identifier(2, &duid[..], &fqdn);
        assert_eq!(dhcid.data.len(), 35);
        assert_eq!(&dhcid.data[..3], b"\x00\x02\x01");
        assert_eq!(
            dhcid.to_string(),
            "AAIBY2/AuCccgoJbsaxcQc9TUapptP69lOjxfNuVAA2kjEA="
        );
    }

    #[test]
    fn dhcid_digest_ignores_case_of_fqdn() {
        let lower: Name = "client.example.com.".parse().unwrap();
        let upper: Name = "CLIENT.Example.COM.".parse().unwrap();
        assert_eq!(
            Dhcid::from_identifier(2, b"\x00\x01", &lower),
            Dhcid::from_identifier(2, b"\x00\x01", &upper),
        );
    }

    #[test]
    fn ipseckey_domain_gateway_is_not_compressed() {
        let mut buf = WireBuffer::new();
        let gateway: Name = "gateway.example.".parse().unwrap();
        gateway.encode(&mut buf);
        let start = buf.len();

        let ipseckey = Ipseckey {
            precedence: 10,
            algorithm: 2,
            gateway: Gateway::Domain(gateway.clone()),
            public_key: b"\x01\x03\x51\x53".to_vec(),
        };
        ipseckey.encode(&mut buf).unwrap();
        assert_eq!(buf.len() - start, 3 + gateway.wire_repr().len() + 4);

        let mut cursor = Cursor::new(buf.as_slice());
        cursor.advance(start).unwrap();
        assert_eq!(Ipseckey::decode(&mut cursor).unwrap(), ipseckey);
        assert_eq!(ipseckey.to_string(), "10 3 2 gateway.example. AQNRUw==");
    }

    #[test]
    fn ipseckey_rejects_reserved_gateway_types() {
        let error = Ipseckey::decode(&mut Cursor::new(b"\x0a\x04\x02\x01")).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::UnknownGatewayType(4));
        assert_eq!(error.offset(), 1);
    }

    #[test]
    fn ipseckey_v4_gateway_must_fit() {
        let error = Ipseckey::decode(&mut Cursor::new(b"\x0a\x01\x02\xc0\x00\x02")).unwrap_err();
        assert!(error.is_truncation());
    }

    #[test]
    fn ipseckey_without_gateway_displays_dot() {
        let ipseckey = Ipseckey {
            precedence: 10,
            algorithm: 2,
            gateway: Gateway::None,
            public_key: b"\x01\x03\x51\x53".to_vec(),
        };
        assert_eq!(ipseckey.to_string(), "10 0 2 . AQNRUw==");
    }

    #[test]
    fn sshfp_requires_fingerprint() {
        let error = Sshfp::decode(&mut Cursor::new(b"\x01\x01")).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::EmptyField);
        let sshfp = Sshfp::decode(&mut Cursor::new(b"\x01\x01\x12\x34")).unwrap();
        assert_eq!(sshfp.to_string(), "1 1 1234");
    }
}
