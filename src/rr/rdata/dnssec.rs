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

//! RDATA for the DNSSEC RR types of [RFC 4034] (DNSKEY, RRSIG, NSEC,
//! and DS) and [RFC 5155] (NSEC3 and NSEC3PARAM). The older KEY and SIG
//! types of [RFC 2535] share their layouts with DNSKEY and RRSIG.
//!
//! [RFC 2535]: https://datatracker.ietf.org/doc/html/rfc2535
//! [RFC 4034]: https://datatracker.ietf.org/doc/html/rfc4034
//! [RFC 5155]: https://datatracker.ietf.org/doc/html/rfc5155

use std::collections::BTreeSet;
use std::fmt;

use super::read_nonempty_rest;
use crate::name::Name;
use crate::rr::Type;
use crate::util::{write_base32hex, write_base64, write_hex, write_timestamp};
use crate::wire::{self, Cursor, EncodeError, ErrorKind, WireBuffer};

////////////////////////////////////////////////////////////////////////
// RFC 4034 § 2 - DNSKEY RR                                           //
////////////////////////////////////////////////////////////////////////

/// The RDATA of a DNSKEY or KEY record. The public key must not be
/// empty.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Dnskey {
    pub flags: u16,
    pub protocol: u8,
    pub algorithm: u8,
    pub public_key: Vec<u8>,
}

impl Dnskey {
    /// The Zone Key flag (RFC 4034 § 2.1.1).
    pub const ZONE: u16 = 0x0100;

    /// The Secure Entry Point flag (RFC 4034 § 2.1.1).
    pub const SEP: u16 = 0x0001;

    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        Ok(Self {
            flags: cursor.read_u16()?,
            protocol: cursor.read_u8()?,
            algorithm: cursor.read_u8()?,
            public_key: read_nonempty_rest(cursor)?,
        })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        buf.push_u16(self.flags);
        buf.push_u8(self.protocol);
        buf.push_u8(self.algorithm);
        buf.push_slice(&self.public_key);
        Ok(())
    }
}

impl fmt::Display for Dnskey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {} ", self.flags, self.protocol, self.algorithm)?;
        write_base64(f, &self.public_key)
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 4034 § 3 - RRSIG RR                                            //
////////////////////////////////////////////////////////////////////////

/// The RDATA of an RRSIG or SIG record. The signer's name is always
/// written uncompressed, and the signature must not be empty.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Rrsig {
    pub type_covered: Type,
    pub algorithm: u8,
    pub labels: u8,
    pub original_ttl: u32,

    /// Signature expiration, in seconds since the Unix epoch (modulo
    /// 2³², see RFC 4034 § 3.1.5).
    pub expiration: u32,

    /// Signature inception, in the same form as `expiration`.
    pub inception: u32,

    pub key_tag: u16,
    pub signer: Name,
    pub signature: Vec<u8>,
}

impl Rrsig {
    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        Ok(Self {
            type_covered: cursor.read_u16()?.into(),
            algorithm: cursor.read_u8()?,
            labels: cursor.read_u8()?,
            original_ttl: cursor.read_u32()?,
            expiration: cursor.read_u32()?,
            inception: cursor.read_u32()?,
            key_tag: cursor.read_u16()?,
            signer: Name::decode(cursor)?,
            signature: read_nonempty_rest(cursor)?,
        })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        buf.push_u16(self.type_covered.into());
        buf.push_u8(self.algorithm);
        buf.push_u8(self.labels);
        buf.push_u32(self.original_ttl);
        buf.push_u32(self.expiration);
        buf.push_u32(self.inception);
        buf.push_u16(self.key_tag);
        self.signer.encode(&mut buf.disable_compression());
        buf.push_slice(&self.signature);
        Ok(())
    }
}

impl fmt::Display for Rrsig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} ",
            self.type_covered, self.algorithm, self.labels, self.original_ttl
        )?;
        write_timestamp(f, self.expiration)?;
        f.write_str(" ")?;
        write_timestamp(f, self.inception)?;
        write!(f, " {} {} ", self.key_tag, self.signer)?;
        write_base64(f, &self.signature)
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 4034 § 4 - NSEC RR                                             //
////////////////////////////////////////////////////////////////////////

/// The RDATA of an NSEC record. The next owner name is always written
/// uncompressed.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Nsec {
    pub next: Name,
    pub types: BTreeSet<Type>,
}

impl Nsec {
    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        Ok(Self {
            next: Name::decode(cursor)?,
            types: decode_type_bitmap(cursor)?,
        })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        self.next.encode(&mut buf.disable_compression());
        encode_type_bitmap(&self.types, buf);
        Ok(())
    }
}

impl fmt::Display for Nsec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.next)?;
        write_type_list(f, &self.types)
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 4034 § 5 - DS RR                                               //
////////////////////////////////////////////////////////////////////////

/// The RDATA of a DS record. Only digest types whose length is known
/// can be decoded.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Ds {
    pub key_tag: u16,
    pub algorithm: u8,
    pub digest_type: u8,
    pub digest: Vec<u8>,
}

impl Ds {
    /// Returns the length of digests of the given type: SHA-1 (1),
    /// SHA-256 (2), or SHA-384 (4).
    pub fn digest_len(digest_type: u8) -> Option<usize> {
        match digest_type {
            1 => Some(20),
            2 => Some(32),
            4 => Some(48),
            _ => None,
        }
    }

    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        let key_tag = cursor.read_u16()?;
        let algorithm = cursor.read_u8()?;
        let digest_type_offset = cursor.position();
        let digest_type = cursor.read_u8()?;
        let len = Self::digest_len(digest_type).ok_or_else(|| {
            cursor.error_at(
                digest_type_offset,
                ErrorKind::UnknownDigestType(digest_type),
            )
        })?;
        Ok(Self {
            key_tag,
            algorithm,
            digest_type,
            digest: cursor.read_slice(len)?.to_vec(),
        })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        buf.push_u16(self.key_tag);
        buf.push_u8(self.algorithm);
        buf.push_u8(self.digest_type);
        buf.push_slice(&self.digest);
        Ok(())
    }
}

impl fmt::Display for Ds {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} ",
            self.key_tag, self.algorithm, self.digest_type
        )?;
        write_hex(f, &self.digest)
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 5155 § 4 - NSEC3PARAM RR                                       //
////////////////////////////////////////////////////////////////////////

/// The SHA-1 hash algorithm, the only one defined for NSEC3.
pub const NSEC3_SHA1: u8 = 1;

/// The RDATA of an NSEC3PARAM record. These fields also begin the
/// RDATA of an NSEC3 record.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Nsec3param {
    pub hash_algorithm: u8,
    pub flags: u8,
    pub iterations: u16,
    pub salt: Vec<u8>,
}

impl Nsec3param {
    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        let hash_algorithm_offset = cursor.position();
        let hash_algorithm = cursor.read_u8()?;
        if hash_algorithm != NSEC3_SHA1 {
            return Err(cursor.error_at(
                hash_algorithm_offset,
                ErrorKind::UnsupportedAlgorithm(hash_algorithm),
            ));
        }
        Ok(Self {
            hash_algorithm,
            flags: cursor.read_u8()?,
            iterations: cursor.read_u16()?,
            salt: cursor.read_character_string()?.to_vec(),
        })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        buf.push_u8(self.hash_algorithm);
        buf.push_u8(self.flags);
        buf.push_u16(self.iterations);
        buf.push_u8_prefixed(&self.salt)
    }
}

impl fmt::Display for Nsec3param {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} ",
            self.hash_algorithm, self.flags, self.iterations
        )?;
        if self.salt.is_empty() {
            f.write_str("-")
        } else {
            write_hex(f, &self.salt)
        }
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 5155 § 3 - NSEC3 RR                                            //
////////////////////////////////////////////////////////////////////////

/// The RDATA of an NSEC3 record.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Nsec3 {
    pub params: Nsec3param,

    /// The next hashed owner name in binary form. On the wire it is
    /// preceded by a one-octet length.
    pub next_hashed_owner: Vec<u8>,

    pub types: BTreeSet<Type>,
}

impl Nsec3 {
    /// The Opt-Out flag (RFC 5155 § 3.1.2.1).
    pub const OPT_OUT: u8 = 0x01;

    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        let params = Nsec3param::decode(cursor)?;
        let hash_len = cursor.read_u8()? as usize;
        Ok(Self {
            params,
            next_hashed_owner: cursor.read_slice(hash_len)?.to_vec(),
            types: decode_type_bitmap(cursor)?,
        })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        self.params.encode(buf)?;
        buf.push_u8_prefixed(&self.next_hashed_owner)?;
        encode_type_bitmap(&self.types, buf);
        Ok(())
    }

    pub fn opt_out(&self) -> bool {
        self.params.flags & Self::OPT_OUT != 0
    }
}

impl fmt::Display for Nsec3 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ", self.params)?;
        write_base32hex(f, &self.next_hashed_owner)?;
        write_type_list(f, &self.types)
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 4034 § 4.1.2 - TYPE BIT MAPS                                   //
////////////////////////////////////////////////////////////////////////

/// Encodes a set of types as a sequence of windowed bitmaps. Each
/// window covers 256 types and is trimmed after its last set bit.
pub fn encode_type_bitmap(types: &BTreeSet<Type>, buf: &mut WireBuffer) {
    let mut window: Option<(u8, [u8; 32], usize)> = None;
    for rr_type in types {
        let [high, low] = u16::from(*rr_type).to_be_bytes();
        match window {
            Some((number, _, _)) if number == high => (),
            _ => {
                if let Some((number, bits, len)) = window {
                    write_window(buf, number, &bits[..len]);
                }
                window = Some((high, [0; 32], 0));
            }
        }
        if let Some((_, ref mut bits, ref mut len)) = window {
            let index = (low / 8) as usize;
            bits[index] |= 0x80 >> (low % 8);
            *len = index + 1;
        }
    }
    if let Some((number, bits, len)) = window {
        write_window(buf, number, &bits[..len]);
    }
}

fn write_window(buf: &mut WireBuffer, number: u8, bits: &[u8]) {
    buf.push_u8(number);
    buf.push_u8(bits.len() as u8);
    buf.push_slice(bits);
}

/// Decodes windowed type bitmaps filling the rest of the cursor's
/// bound. Windows must have a length from 1 to 32 octets.
pub fn decode_type_bitmap(cursor: &mut Cursor) -> wire::Result<BTreeSet<Type>> {
    let mut types = BTreeSet::new();
    while !cursor.is_at_end() {
        let window = cursor.read_u8()?;
        let len_offset = cursor.position();
        let len = cursor.read_u8()?;
        if len == 0 || len > 32 {
            return Err(cursor.error_at(len_offset, ErrorKind::InvalidField));
        }
        for (i, octet) in cursor.read_slice(len as usize)?.iter().enumerate() {
            for bit in 0..8 {
                if octet & (0x80 >> bit) != 0 {
                    let low = (i * 8 + bit) as u8;
                    types.insert(Type::from(u16::from_be_bytes([window, low])));
                }
            }
        }
    }
    Ok(types)
}

fn write_type_list(f: &mut fmt::Formatter, types: &BTreeSet<Type>) -> fmt::Result {
    for rr_type in types {
        write!(f, " {}", rr_type)?;
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn types(list: &[Type]) -> BTreeSet<Type> {
        list.iter().copied().collect()
    }

    #[test]
    fn type_bitmap_matches_rfc4034_example() {
        // From RFC 4034 § 4.3.
        let set = types(&[
            Type::A,
            Type::MX,
            Type::RRSIG,
            Type::NSEC,
            Type::from(1234),
        ]);
        let mut buf = WireBuffer::new();
        encode_type_bitmap(&set, &mut buf);
        assert_eq!(
            buf.as_slice(),
            b"\x00\x06\x40\x01\x00\x00\x00\x03\
              \x04\x1b\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\
              \x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x20"
        );
        assert_eq!(
            decode_type_bitmap(&mut Cursor::new(buf.as_slice())).unwrap(),
            set
        );
    }

    #[test]
    fn empty_bitmap_windows_are_rejected() {
        let error = decode_type_bitmap(&mut Cursor::new(b"\x00\x00")).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::InvalidField);
        assert_eq!(error.offset(), 1);
    }

    #[test]
    fn nsec_displays_types() {
        let nsec = Nsec {
            next: "host.example.com.".parse().unwrap(),
            types: types(&[Type::A, Type::MX, Type::RRSIG, Type::NSEC]),
        };
        assert_eq!(nsec.to_string(), "host.example.com. A MX RRSIG NSEC");
    }

    #[test]
    fn ds_rejects_unknown_digest_types() {
        let error = Ds::decode(&mut Cursor::new(b"\xec\x45\x05\x03\xab")).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::UnknownDigestType(3));
        assert_eq!(error.offset(), 3);
    }

    #[test]
    fn ds_reads_digest_of_declared_type() {
        let mut octets = b"\xec\x45\x05\x01".to_vec();
        octets.extend_from_slice(&[0xab; 20]);
        let ds = Ds::decode(&mut Cursor::new(&octets)).unwrap();
        assert_eq!(ds.key_tag, 60485);
        assert_eq!(ds.digest.len(), 20);
        assert!(ds.to_string().starts_with("60485 5 1 abab"));
    }

    #[test]
    fn nsec3param_rejects_unknown_hash_algorithms() {
        let error = Nsec3param::decode(&mut Cursor::new(b"\x02\x00\x00\x0a\x00")).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::UnsupportedAlgorithm(2));
    }

    #[test]
    fn nsec3param_displays_empty_salt_as_dash() {
        let param = Nsec3param {
            hash_algorithm: 1,
            flags: 0,
            iterations: 12,
            salt: Vec::new(),
        };
        assert_eq!(param.to_string(), "1 0 12 -");
    }

    #[test]
    fn nsec3_round_trips() {
        let nsec3 = Nsec3 {
            params: Nsec3param {
                hash_algorithm: 1,
                flags: Nsec3::OPT_OUT,
                iterations: 12,
                salt: b"\xaa\xbb\xcc\xdd".to_vec(),
            },
            next_hashed_owner: b"\x00\x01\x02\x03\x04".to_vec(),
            types: types(&[Type::NS, Type::DS, Type::RRSIG]),
        };
        let mut buf = WireBuffer::new();
        nsec3.encode(&mut buf).unwrap();
        let decoded = Nsec3::decode(&mut Cursor::new(buf.as_slice())).unwrap();
        assert_eq!(decoded, nsec3);
        assert!(decoded.opt_out());
        assert_eq!(nsec3.to_string(), "1 1 12 aabbccdd 000g40o4 NS DS RRSIG");
    }

    #[test]
    fn rrsig_signer_is_not_compressed() {
        let mut buf = WireBuffer::new();
        let signer: Name = "example.".parse().unwrap();
        signer.encode(&mut buf);
        let start = buf.len();

        let rrsig = Rrsig {
            type_covered: Type::A,
            algorithm: 5,
            labels: 3,
            original_ttl: 86400,
            expiration: 1_081_539_377,
            inception: 1_078_950_977,
            key_tag: 2642,
            signer: signer.clone(),
            signature: b"\x01\x02\x03".to_vec(),
        };
        rrsig.encode(&mut buf).unwrap();
        assert_eq!(buf.len() - start, 18 + signer.wire_repr().len() + 3);
        assert_eq!(
            rrsig.to_string(),
            "A 5 3 86400 20040409193617 20040310203617 2642 example. AQID"
        );
    }

    #[test]
    fn dnskey_requires_public_key() {
        let error = Dnskey::decode(&mut Cursor::new(b"\x01\x00\x03\x05")).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::EmptyField);
    }
}
