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

//! Implementation of the [`Rdata`] type and DNS RDATA processing.

use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;

use super::Type;
use crate::name::Name;
use crate::util::write_generic_rdata;
use crate::wire::{self, Cursor, EncodeError, ErrorKind, Tag, WireBuffer};

// Implementations of RR types.
mod dnssec;
mod ipv6;
mod location;
mod opt;
mod rfc1183;
mod security;
mod srv;
mod std13;
pub use dnssec::*;
pub use ipv6::*;
pub use location::*;
pub use opt::*;
pub use rfc1183::*;
pub use security::*;
pub use srv::*;
pub use std13::*;

////////////////////////////////////////////////////////////////////////
// RDATA TYPE                                                         //
////////////////////////////////////////////////////////////////////////

/// The decoded RDATA of a record.
///
/// Each supported RR type has a variant holding its payload shape.
/// RDATA of any other type is kept as [`Opaque`] octets in
/// [`Rdata::Unknown`]. A record whose RDLENGTH is zero decodes to the
/// empty form for its type: [`Rdata::Empty`] for most types, or an
/// empty payload for types such as TXT and OPT whose payload may
/// legitimately be empty.
///
/// Equality compares payloads field by field. Embedded domain names
/// compare case-insensitively; all other fields (including binary keys,
/// digests, and opaque data) compare exactly.
#[derive(Clone, Debug, PartialEq)]
pub enum Rdata {
    Empty,
    A(A),
    Ns(Name),
    Md(Name),
    Mf(Name),
    Cname(Name),
    Soa(Soa),
    Mb(Name),
    Mg(Name),
    Mr(Name),
    Null(Opaque),
    Wks(Wks),
    Ptr(Name),
    Hinfo(Hinfo),
    Minfo(Minfo),
    Mx(Mx),
    Txt(Txt),
    Rp(Rp),
    Afsdb(Afsdb),
    X25(X25),
    Isdn(Isdn),
    Rt(Rt),
    Nsap(Nsap),
    NsapPtr(Name),
    Sig(Rrsig),
    Key(Dnskey),
    Px(Px),
    Gpos(Gpos),
    Aaaa(Aaaa),
    Loc(Loc),
    Srv(Srv),
    Naptr(Naptr),
    Kx(Kx),
    Cert(Cert),
    Dname(Name),
    Opt(Opt),
    Ds(Ds),
    Sshfp(Sshfp),
    Ipseckey(Ipseckey),
    Rrsig(Rrsig),
    Nsec(Nsec),
    Dnskey(Dnskey),
    Dhcid(Dhcid),
    Nsec3(Nsec3),
    Nsec3param(Nsec3param),

    /// Negative-cache RDATA: the type for which a name has no data.
    Nodata(Type),

    /// Negative-cache RDATA for a name that does not exist.
    Nxdomain,

    Unknown(Opaque),
}

impl Rdata {
    /// Decodes RDATA of type `rr_type` that is `rdlength` octets long,
    /// starting at the cursor's position. The decoder for the type is
    /// confined to exactly `rdlength` octets.
    pub fn decode(rr_type: Type, cursor: &mut Cursor, rdlength: u16) -> wire::Result<Self> {
        let start = cursor.position();
        let entry = REGISTRY.get(&rr_type);
        let rdata = cursor.bounded(rdlength as usize, |cursor| {
            if rdlength == 0 {
                Ok(entry.map_or_else(|| Self::Unknown(Opaque::default()), |e| (e.empty)()))
            } else if let Some(entry) = entry {
                (entry.decode)(cursor)
            } else {
                Opaque::decode(cursor).map(Self::Unknown)
            }
        })?;
        cursor.observe(start, Tag::Rdata, &rdata);
        Ok(rdata)
    }

    /// Returns the empty form of RDATA for `rr_type`, which is what a
    /// record of that type with an RDLENGTH of zero decodes to.
    pub fn empty_for(rr_type: Type) -> Self {
        REGISTRY
            .get(&rr_type)
            .map_or_else(|| Self::Unknown(Opaque::default()), |e| (e.empty)())
    }

    /// Returns whether `rr_type` has a dedicated payload shape.
    pub fn is_known_type(rr_type: Type) -> bool {
        REGISTRY.contains_key(&rr_type)
    }

    /// Encodes the RDATA (without RDLENGTH) into `buf`.
    pub fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        match self {
            Self::Empty | Self::Nxdomain => Ok(()),
            Self::A(a) => a.encode(buf),
            Self::Ns(name)
            | Self::Md(name)
            | Self::Mf(name)
            | Self::Cname(name)
            | Self::Mb(name)
            | Self::Mg(name)
            | Self::Mr(name)
            | Self::Ptr(name)
            | Self::NsapPtr(name)
            | Self::Dname(name) => {
                name.encode(buf);
                Ok(())
            }
            Self::Soa(soa) => soa.encode(buf),
            Self::Null(opaque) | Self::Unknown(opaque) => opaque.encode(buf),
            Self::Wks(wks) => wks.encode(buf),
            Self::Hinfo(hinfo) => hinfo.encode(buf),
            Self::Minfo(minfo) => minfo.encode(buf),
            Self::Mx(mx) => mx.encode(buf),
            Self::Txt(txt) => txt.encode(buf),
            Self::Rp(rp) => rp.encode(buf),
            Self::Afsdb(afsdb) => afsdb.encode(buf),
            Self::X25(x25) => x25.encode(buf),
            Self::Isdn(isdn) => isdn.encode(buf),
            Self::Rt(rt) => rt.encode(buf),
            Self::Nsap(nsap) => nsap.encode(buf),
            Self::Sig(rrsig) | Self::Rrsig(rrsig) => rrsig.encode(buf),
            Self::Key(dnskey) | Self::Dnskey(dnskey) => dnskey.encode(buf),
            Self::Px(px) => px.encode(buf),
            Self::Gpos(gpos) => gpos.encode(buf),
            Self::Aaaa(aaaa) => aaaa.encode(buf),
            Self::Loc(loc) => loc.encode(buf),
            Self::Srv(srv) => srv.encode(buf),
            Self::Naptr(naptr) => naptr.encode(buf),
            Self::Kx(kx) => kx.encode(buf),
            Self::Cert(cert) => cert.encode(buf),
            Self::Opt(opt) => opt.encode(buf),
            Self::Ds(ds) => ds.encode(buf),
            Self::Sshfp(sshfp) => sshfp.encode(buf),
            Self::Ipseckey(ipseckey) => ipseckey.encode(buf),
            Self::Nsec(nsec) => nsec.encode(buf),
            Self::Dhcid(dhcid) => dhcid.encode(buf),
            Self::Nsec3(nsec3) => nsec3.encode(buf),
            Self::Nsec3param(nsec3param) => nsec3param.encode(buf),
            Self::Nodata(rr_type) => {
                buf.push_u16((*rr_type).into());
                Ok(())
            }
        }
    }

    /// Returns the RR type that this payload shape belongs to, or
    /// `None` for [`Rdata::Empty`] and [`Rdata::Unknown`], which can
    /// belong to any type.
    pub fn rr_type(&self) -> Option<Type> {
        let rr_type = match self {
            Self::Empty | Self::Unknown(_) => return None,
            Self::A(_) => Type::A,
            Self::Ns(_) => Type::NS,
            Self::Md(_) => Type::MD,
            Self::Mf(_) => Type::MF,
            Self::Cname(_) => Type::CNAME,
            Self::Soa(_) => Type::SOA,
            Self::Mb(_) => Type::MB,
            Self::Mg(_) => Type::MG,
            Self::Mr(_) => Type::MR,
            Self::Null(_) => Type::NULL,
            Self::Wks(_) => Type::WKS,
            Self::Ptr(_) => Type::PTR,
            Self::Hinfo(_) => Type::HINFO,
            Self::Minfo(_) => Type::MINFO,
            Self::Mx(_) => Type::MX,
            Self::Txt(_) => Type::TXT,
            Self::Rp(_) => Type::RP,
            Self::Afsdb(_) => Type::AFSDB,
            Self::X25(_) => Type::X25,
            Self::Isdn(_) => Type::ISDN,
            Self::Rt(_) => Type::RT,
            Self::Nsap(_) => Type::NSAP,
            Self::NsapPtr(_) => Type::NSAP_PTR,
            Self::Sig(_) => Type::SIG,
            Self::Key(_) => Type::KEY,
            Self::Px(_) => Type::PX,
            Self::Gpos(_) => Type::GPOS,
            Self::Aaaa(_) => Type::AAAA,
            Self::Loc(_) => Type::LOC,
            Self::Srv(_) => Type::SRV,
            Self::Naptr(_) => Type::NAPTR,
            Self::Kx(_) => Type::KX,
            Self::Cert(_) => Type::CERT,
            Self::Dname(_) => Type::DNAME,
            Self::Opt(_) => Type::OPT,
            Self::Ds(_) => Type::DS,
            Self::Sshfp(_) => Type::SSHFP,
            Self::Ipseckey(_) => Type::IPSECKEY,
            Self::Rrsig(_) => Type::RRSIG,
            Self::Nsec(_) => Type::NSEC,
            Self::Dnskey(_) => Type::DNSKEY,
            Self::Dhcid(_) => Type::DHCID,
            Self::Nsec3(_) => Type::NSEC3,
            Self::Nsec3param(_) => Type::NSEC3PARAM,
            Self::Nodata(_) => Type::NODATA,
            Self::Nxdomain => Type::NXDOMAIN,
        };
        Some(rr_type)
    }
}

impl fmt::Display for Rdata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Empty | Self::Nxdomain => Ok(()),
            Self::A(a) => fmt::Display::fmt(a, f),
            Self::Ns(name)
            | Self::Md(name)
            | Self::Mf(name)
            | Self::Cname(name)
            | Self::Mb(name)
            | Self::Mg(name)
            | Self::Mr(name)
            | Self::Ptr(name)
            | Self::NsapPtr(name)
            | Self::Dname(name) => fmt::Display::fmt(name, f),
            Self::Soa(soa) => fmt::Display::fmt(soa, f),
            Self::Null(opaque) | Self::Unknown(opaque) => fmt::Display::fmt(opaque, f),
            Self::Wks(wks) => fmt::Display::fmt(wks, f),
            Self::Hinfo(hinfo) => fmt::Display::fmt(hinfo, f),
            Self::Minfo(minfo) => fmt::Display::fmt(minfo, f),
            Self::Mx(mx) => fmt::Display::fmt(mx, f),
            Self::Txt(txt) => fmt::Display::fmt(txt, f),
            Self::Rp(rp) => fmt::Display::fmt(rp, f),
            Self::Afsdb(afsdb) => fmt::Display::fmt(afsdb, f),
            Self::X25(x25) => fmt::Display::fmt(x25, f),
            Self::Isdn(isdn) => fmt::Display::fmt(isdn, f),
            Self::Rt(rt) => fmt::Display::fmt(rt, f),
            Self::Nsap(nsap) => fmt::Display::fmt(nsap, f),
            Self::Sig(rrsig) | Self::Rrsig(rrsig) => fmt::Display::fmt(rrsig, f),
            Self::Key(dnskey) | Self::Dnskey(dnskey) => fmt::Display::fmt(dnskey, f),
            Self::Px(px) => fmt::Display::fmt(px, f),
            Self::Gpos(gpos) => fmt::Display::fmt(gpos, f),
            Self::Aaaa(aaaa) => fmt::Display::fmt(aaaa, f),
            Self::Loc(loc) => fmt::Display::fmt(loc, f),
            Self::Srv(srv) => fmt::Display::fmt(srv, f),
            Self::Naptr(naptr) => fmt::Display::fmt(naptr, f),
            Self::Kx(kx) => fmt::Display::fmt(kx, f),
            Self::Cert(cert) => fmt::Display::fmt(cert, f),
            Self::Opt(opt) => fmt::Display::fmt(opt, f),
            Self::Ds(ds) => fmt::Display::fmt(ds, f),
            Self::Sshfp(sshfp) => fmt::Display::fmt(sshfp, f),
            Self::Ipseckey(ipseckey) => fmt::Display::fmt(ipseckey, f),
            Self::Nsec(nsec) => fmt::Display::fmt(nsec, f),
            Self::Dhcid(dhcid) => fmt::Display::fmt(dhcid, f),
            Self::Nsec3(nsec3) => fmt::Display::fmt(nsec3, f),
            Self::Nsec3param(nsec3param) => fmt::Display::fmt(nsec3param, f),
            Self::Nodata(rr_type) => fmt::Display::fmt(rr_type, f),
        }
    }
}

////////////////////////////////////////////////////////////////////////
// OPAQUE RDATA                                                       //
////////////////////////////////////////////////////////////////////////

/// RDATA treated as an uninterpreted octet string: the payload of NULL
/// records and of records of unknown type ([RFC 3597]).
///
/// [RFC 3597]: https://datatracker.ietf.org/doc/html/rfc3597
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Opaque {
    pub octets: Vec<u8>,
}

impl Opaque {
    fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        Ok(Self {
            octets: cursor.read_rest()?.to_vec(),
        })
    }

    fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        buf.push_slice(&self.octets);
        Ok(())
    }
}

impl From<Vec<u8>> for Opaque {
    fn from(octets: Vec<u8>) -> Self {
        Self { octets }
    }
}

impl fmt::Display for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_generic_rdata(f, &self.octets)
    }
}

/// Reads the rest of the RDATA as a field that must not be empty.
fn read_nonempty_rest(cursor: &mut Cursor) -> wire::Result<Vec<u8>> {
    let rest = cursor.read_rest()?;
    if rest.is_empty() {
        Err(cursor.error(ErrorKind::EmptyField))
    } else {
        Ok(rest.to_vec())
    }
}

////////////////////////////////////////////////////////////////////////
// TYPE REGISTRY                                                      //
////////////////////////////////////////////////////////////////////////

/// A registry entry: how to construct the empty form of a type's RDATA
/// and how to decode it.
struct Entry {
    rr_type: Type,
    empty: fn() -> Rdata,
    decode: fn(&mut Cursor) -> wire::Result<Rdata>,
}

macro_rules! entry {
    ($rr_type:ident, $variant:ident, $decode:expr) => {
        entry!($rr_type, $variant, $decode, || Rdata::Empty)
    };
    ($rr_type:ident, $variant:ident, $decode:expr, $empty:expr) => {
        Entry {
            rr_type: Type::$rr_type,
            empty: $empty,
            decode: |cursor| $decode(cursor).map(Rdata::$variant),
        }
    };
}

fn registry_entries() -> Vec<Entry> {
    vec![
        entry!(A, A, A::decode),
        entry!(NS, Ns, Name::decode),
        entry!(MD, Md, Name::decode),
        entry!(MF, Mf, Name::decode),
        entry!(CNAME, Cname, Name::decode),
        entry!(SOA, Soa, Soa::decode),
        entry!(MB, Mb, Name::decode),
        entry!(MG, Mg, Name::decode),
        entry!(MR, Mr, Name::decode),
        entry!(NULL, Null, Opaque::decode, || Rdata::Null(Opaque::default())),
        entry!(WKS, Wks, Wks::decode),
        entry!(PTR, Ptr, Name::decode),
        entry!(HINFO, Hinfo, Hinfo::decode),
        entry!(MINFO, Minfo, Minfo::decode),
        entry!(MX, Mx, Mx::decode),
        entry!(TXT, Txt, Txt::decode, || Rdata::Txt(Txt::default())),
        entry!(RP, Rp, Rp::decode),
        entry!(AFSDB, Afsdb, Afsdb::decode),
        entry!(X25, X25, X25::decode),
        entry!(ISDN, Isdn, Isdn::decode),
        entry!(RT, Rt, Rt::decode),
        entry!(NSAP, Nsap, Nsap::decode, || Rdata::Nsap(Nsap::default())),
        entry!(NSAP_PTR, NsapPtr, Name::decode),
        entry!(SIG, Sig, Rrsig::decode),
        entry!(KEY, Key, Dnskey::decode),
        entry!(PX, Px, Px::decode),
        entry!(GPOS, Gpos, Gpos::decode),
        entry!(AAAA, Aaaa, Aaaa::decode),
        entry!(LOC, Loc, Loc::decode),
        entry!(SRV, Srv, Srv::decode),
        entry!(NAPTR, Naptr, Naptr::decode),
        entry!(KX, Kx, Kx::decode),
        entry!(CERT, Cert, Cert::decode),
        entry!(DNAME, Dname, Name::decode),
        entry!(OPT, Opt, Opt::decode, || Rdata::Opt(Opt::default())),
        entry!(DS, Ds, Ds::decode),
        entry!(SSHFP, Sshfp, Sshfp::decode),
        entry!(IPSECKEY, Ipseckey, Ipseckey::decode),
        entry!(RRSIG, Rrsig, Rrsig::decode),
        entry!(NSEC, Nsec, Nsec::decode),
        entry!(DNSKEY, Dnskey, Dnskey::decode),
        entry!(DHCID, Dhcid, Dhcid::decode),
        entry!(NSEC3, Nsec3, Nsec3::decode),
        entry!(NSEC3PARAM, Nsec3param, Nsec3param::decode),
        entry!(NODATA, Nodata, decode_nodata),
        Entry {
            rr_type: Type::NXDOMAIN,
            empty: || Rdata::Nxdomain,
            decode: |_| Ok(Rdata::Nxdomain),
        },
    ]
}

fn decode_nodata(cursor: &mut Cursor) -> wire::Result<Type> {
    cursor.read_u16().map(Type::from)
}

lazy_static! {
    static ref REGISTRY: HashMap<Type, Entry> = registry_entries()
        .into_iter()
        .map(|entry| (entry.rr_type, entry))
        .collect();
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(rr_type: Type, octets: &[u8]) -> wire::Result<Rdata> {
        let mut cursor = Cursor::new(octets);
        Rdata::decode(rr_type, &mut cursor, octets.len() as u16)
    }

    fn round_trip(rr_type: Type, rdata: &Rdata) {
        let mut buf = WireBuffer::new();
        rdata.encode(&mut buf).unwrap();
        let decoded = decode_all(rr_type, buf.as_slice()).unwrap();
        assert_eq!(&decoded, rdata);
    }

    #[test]
    fn decode_checks_if_message_is_long_enough() {
        // Every type, known or not, must refuse an RDLENGTH that runs
        // past the end of the message.
        let too_short = [0; 2];
        for i in 0..=u16::MAX {
            let mut cursor = Cursor::new(&too_short);
            let error = Rdata::decode(Type::from(i), &mut cursor, 4).unwrap_err();
            assert!(error.is_truncation());
        }
    }

    #[test]
    fn zero_rdlength_gives_empty_forms() {
        let mut cursor = Cursor::new(&[]);
        for (rr_type, expected) in [
            (Type::A, Rdata::Empty),
            (Type::SOA, Rdata::Empty),
            (Type::TXT, Rdata::Txt(Txt::default())),
            (Type::OPT, Rdata::Opt(Opt::default())),
            (Type::NULL, Rdata::Null(Opaque::default())),
            (Type::NXDOMAIN, Rdata::Nxdomain),
            (Type::NODATA, Rdata::Empty),
            (Type::from(0xfffe), Rdata::Unknown(Opaque::default())),
        ] {
            assert_eq!(Rdata::decode(rr_type, &mut cursor, 0).unwrap(), expected);
            assert_eq!(Rdata::empty_for(rr_type), expected);
        }
    }

    #[test]
    fn decoder_must_consume_rdlength() {
        // An A record with one octet too many.
        let error = decode_all(Type::A, b"\xc0\x00\x02\x01\x00").unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::RdataLengthMismatch);
    }

    #[test]
    fn decoder_is_confined_to_rdlength() {
        // A TXT record followed by more data in the message must not
        // swallow it.
        let octets = b"\x03abc\x03def";
        let mut cursor = Cursor::new(&octets[..]);
        let rdata = Rdata::decode(Type::TXT, &mut cursor, 4).unwrap();
        assert_eq!(rdata.to_string(), "\"abc\"");
        assert_eq!(cursor.position(), 4);
    }

    #[test]
    fn unknown_types_are_opaque() {
        // TYPE65534 is from the private use range.
        let rdata = decode_all(Type::from(0xfffe), b"\x01\x02\x03").unwrap();
        assert_eq!(rdata, Rdata::Unknown(vec![1, 2, 3].into()));
        assert_eq!(rdata.to_string(), "\\# 3 010203");
        assert_eq!(rdata.rr_type(), None);
        assert!(!Rdata::is_known_type(Type::from(0xfffe)));
        assert!(Rdata::is_known_type(Type::NODATA));
    }

    #[test]
    fn names_compare_case_insensitively() {
        let lower = Rdata::Cname("www.example.".parse().unwrap());
        let upper = Rdata::Cname("WWW.Example.".parse().unwrap());
        assert_eq!(lower, upper);
        assert_ne!(lower, Rdata::Ptr("www.example.".parse().unwrap()));
    }

    #[test]
    fn shapes_round_trip() {
        let name: Name = "host.example.".parse().unwrap();
        let cases = [
            (Type::NS, Rdata::Ns(name.clone())),
            (Type::DNAME, Rdata::Dname(name.clone())),
            (
                Type::MX,
                Rdata::Mx(Mx {
                    preference: 10,
                    exchange: name.clone(),
                }),
            ),
            (
                Type::SSHFP,
                Rdata::Sshfp(Sshfp {
                    algorithm: 1,
                    fingerprint_type: 1,
                    fingerprint: vec![0x12; 20],
                }),
            ),
            (
                Type::CERT,
                Rdata::Cert(Cert {
                    cert_type: 1,
                    key_tag: 12345,
                    algorithm: 8,
                    certificate: vec![1, 2, 3, 4],
                }),
            ),
            (
                Type::KEY,
                Rdata::Key(Dnskey {
                    flags: 256,
                    protocol: 3,
                    algorithm: 5,
                    public_key: vec![1, 2, 3],
                }),
            ),
            (Type::NODATA, Rdata::Nodata(Type::AAAA)),
            (
                Type::OPT,
                Rdata::Opt(Opt {
                    options: vec![EdnsOption {
                        code: 10,
                        data: vec![1, 2, 3, 4, 5, 6, 7, 8],
                    }],
                }),
            ),
        ];
        for (rr_type, rdata) in &cases {
            assert_eq!(rdata.rr_type(), Some(*rr_type));
            round_trip(*rr_type, rdata);
        }
    }

    #[test]
    fn display_works() {
        assert_eq!(Rdata::Nodata(Type::MX).to_string(), "MX");
        assert_eq!(Rdata::Nxdomain.to_string(), "");
        assert_eq!(
            Rdata::Ns("ns.example.".parse().unwrap()).to_string(),
            "ns.example."
        );
    }
}
