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

//! Provides the [`Type`] structure for DNS RR types.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;

////////////////////////////////////////////////////////////////////////
// RR TYPES                                                           //
////////////////////////////////////////////////////////////////////////

/// Represents the RR type of a DNS record.
///
/// An RR type is represented on the wire as an unsigned 16-bit integer.
/// Hence this is basically a wrapper around `u16` with nice
/// [`Debug`](fmt::Debug), [`Display`](fmt::Display), and [`FromStr`]
/// implementations for working with the common textual representations
/// of RR types. In addition, constants for RR types (e.g. [`Type::A`])
/// are provided.
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Type(u16);

impl Type {
    pub const A: Type = Type(1);
    pub const NS: Type = Type(2);
    pub const MD: Type = Type(3);
    pub const MF: Type = Type(4);
    pub const CNAME: Type = Type(5);
    pub const SOA: Type = Type(6);
    pub const MB: Type = Type(7);
    pub const MG: Type = Type(8);
    pub const MR: Type = Type(9);
    pub const NULL: Type = Type(10);
    pub const WKS: Type = Type(11);
    pub const PTR: Type = Type(12);
    pub const HINFO: Type = Type(13);
    pub const MINFO: Type = Type(14);
    pub const MX: Type = Type(15);
    pub const TXT: Type = Type(16);
    pub const RP: Type = Type(17);
    pub const AFSDB: Type = Type(18);
    pub const X25: Type = Type(19);
    pub const ISDN: Type = Type(20);
    pub const RT: Type = Type(21);
    pub const NSAP: Type = Type(22);
    pub const NSAP_PTR: Type = Type(23);
    pub const SIG: Type = Type(24);
    pub const KEY: Type = Type(25);
    pub const PX: Type = Type(26);
    pub const GPOS: Type = Type(27);
    pub const AAAA: Type = Type(28);
    pub const LOC: Type = Type(29);
    pub const NXT: Type = Type(30);
    pub const SRV: Type = Type(33);
    pub const NAPTR: Type = Type(35);
    pub const KX: Type = Type(36);
    pub const CERT: Type = Type(37);
    pub const A6: Type = Type(38);
    pub const DNAME: Type = Type(39);
    pub const OPT: Type = Type(41);
    pub const APL: Type = Type(42);
    pub const DS: Type = Type(43);
    pub const SSHFP: Type = Type(44);
    pub const IPSECKEY: Type = Type(45);
    pub const RRSIG: Type = Type(46);
    pub const NSEC: Type = Type(47);
    pub const DNSKEY: Type = Type(48);
    pub const DHCID: Type = Type(49);
    pub const NSEC3: Type = Type(50);
    pub const NSEC3PARAM: Type = Type(51);
    pub const HIP: Type = Type(55);
    pub const SPF: Type = Type(99);
    pub const TKEY: Type = Type(249);
    pub const TSIG: Type = Type(250);
    pub const IXFR: Type = Type(251);
    pub const AXFR: Type = Type(252);
    pub const MAILB: Type = Type(253);
    pub const MAILA: Type = Type(254);
    pub const ANY: Type = Type(255);
    pub const URI: Type = Type(256);
    pub const CAA: Type = Type(257);
    pub const TA: Type = Type(32768);
    pub const DLV: Type = Type(32769);

    /// A pseudo type, from the private use range, for cached negative
    /// answers saying that a name exists but has no data of the
    /// queried type.
    pub const NODATA: Type = Type(0xff00);

    /// A pseudo type, from the private use range, for cached negative
    /// answers saying that a name does not exist.
    pub const NXDOMAIN: Type = Type(0xff01);

    /// Returns the mnemonic of this type, if it has one.
    pub fn mnemonic(self) -> Option<&'static str> {
        BY_TYPE.get(&self).copied()
    }

    /// Returns whether this is a meta type or QTYPE rather than a type
    /// of data that can be stored in a zone.
    pub fn is_meta(self) -> bool {
        self == Self::OPT || (128..=255).contains(&self.0)
    }
}

/// The mnemonics of the types this crate knows by name.
const MNEMONICS: &[(Type, &str)] = &[
    (Type::A, "A"),
    (Type::NS, "NS"),
    (Type::MD, "MD"),
    (Type::MF, "MF"),
    (Type::CNAME, "CNAME"),
    (Type::SOA, "SOA"),
    (Type::MB, "MB"),
    (Type::MG, "MG"),
    (Type::MR, "MR"),
    (Type::NULL, "NULL"),
    (Type::WKS, "WKS"),
    (Type::PTR, "PTR"),
    (Type::HINFO, "HINFO"),
    (Type::MINFO, "MINFO"),
    (Type::MX, "MX"),
    (Type::TXT, "TXT"),
    (Type::RP, "RP"),
    (Type::AFSDB, "AFSDB"),
    (Type::X25, "X25"),
    (Type::ISDN, "ISDN"),
    (Type::RT, "RT"),
    (Type::NSAP, "NSAP"),
    (Type::NSAP_PTR, "NSAP-PTR"),
    (Type::SIG, "SIG"),
    (Type::KEY, "KEY"),
    (Type::PX, "PX"),
    (Type::GPOS, "GPOS"),
    (Type::AAAA, "AAAA"),
    (Type::LOC, "LOC"),
    (Type::NXT, "NXT"),
    (Type::SRV, "SRV"),
    (Type::NAPTR, "NAPTR"),
    (Type::KX, "KX"),
    (Type::CERT, "CERT"),
    (Type::A6, "A6"),
    (Type::DNAME, "DNAME"),
    (Type::OPT, "OPT"),
    (Type::APL, "APL"),
    (Type::DS, "DS"),
    (Type::SSHFP, "SSHFP"),
    (Type::IPSECKEY, "IPSECKEY"),
    (Type::RRSIG, "RRSIG"),
    (Type::NSEC, "NSEC"),
    (Type::DNSKEY, "DNSKEY"),
    (Type::DHCID, "DHCID"),
    (Type::NSEC3, "NSEC3"),
    (Type::NSEC3PARAM, "NSEC3PARAM"),
    (Type::HIP, "HIP"),
    (Type::SPF, "SPF"),
    (Type::TKEY, "TKEY"),
    (Type::TSIG, "TSIG"),
    (Type::IXFR, "IXFR"),
    (Type::AXFR, "AXFR"),
    (Type::MAILB, "MAILB"),
    (Type::MAILA, "MAILA"),
    (Type::ANY, "ANY"),
    (Type::URI, "URI"),
    (Type::CAA, "CAA"),
    (Type::TA, "TA"),
    (Type::DLV, "DLV"),
    (Type::NODATA, "NODATA"),
    (Type::NXDOMAIN, "NXDOMAIN"),
];

lazy_static! {
    static ref BY_TYPE: HashMap<Type, &'static str> = MNEMONICS.iter().copied().collect();
    static ref BY_MNEMONIC: HashMap<&'static str, Type> =
        MNEMONICS.iter().map(|&(t, m)| (m, t)).collect();
}

impl From<u16> for Type {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl From<Type> for u16 {
    fn from(rr_type: Type) -> Self {
        rr_type.0
    }
}

impl FromStr for Type {
    type Err = &'static str;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let upper = text.to_ascii_uppercase();
        if let Some(rr_type) = BY_MNEMONIC.get(upper.as_str()) {
            Ok(*rr_type)
        } else if upper == "*" {
            Ok(Self::ANY)
        } else if let Some(value) = upper.strip_prefix("TYPE") {
            // RFC 3597 § 5
            value
                .parse::<u16>()
                .map(Self::from)
                .or(Err("type value is not a valid unsigned 16-bit integer"))
        } else {
            Err("unknown type")
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.mnemonic() {
            Some(mnemonic) => f.write_str(mnemonic),
            None => write!(f, "TYPE{}", self.0), // RFC 3597 § 5
        }
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_displays_according_to_rfc3597() {
        // TYPE65280 is from the private use range, but this crate uses
        // it for NODATA; TYPE65534 is unknown.
        assert_eq!(Type::from(0xff00).to_string(), "NODATA");
        assert_eq!(Type::from(0xfffe).to_string(), "TYPE65534");
        assert_eq!(Type::NSAP_PTR.to_string(), "NSAP-PTR");
    }

    #[test]
    fn type_parses_according_to_rfc3597() {
        let type_a: Type = "TYPE1".parse().unwrap();
        let type_65534: Type = "type65534".parse().unwrap();
        assert_eq!(type_a, Type::A);
        assert_eq!(u16::from(type_65534), 65534);
        assert!("TYPE65536".parse::<Type>().is_err());
    }

    #[test]
    fn type_parses_mnemonics_case_insensitively() {
        assert_eq!("nsec3param".parse(), Ok(Type::NSEC3PARAM));
        assert_eq!("Nsap-Ptr".parse(), Ok(Type::NSAP_PTR));
        assert_eq!("*".parse(), Ok(Type::ANY));
        assert_eq!("bogus".parse::<Type>(), Err("unknown type"));
    }

    #[test]
    fn mnemonic_table_has_no_duplicates() {
        assert_eq!(BY_TYPE.len(), MNEMONICS.len());
        assert_eq!(BY_MNEMONIC.len(), MNEMONICS.len());
    }

    #[test]
    fn meta_types_are_recognized() {
        assert!(Type::ANY.is_meta());
        assert!(Type::OPT.is_meta());
        assert!(!Type::A.is_meta());
    }
}
