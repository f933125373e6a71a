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

//! Provides the [`Ttl`] structure for DNS RR TTLs.

use std::fmt;

////////////////////////////////////////////////////////////////////////
// TTLS                                                               //
////////////////////////////////////////////////////////////////////////

/// The time to live (TTL) field of a DNS record.
///
/// There are contradictory definitions of the TTL field in [RFC 1035]
/// (see [erratum 2130]): it is described both as a signed and as an
/// unsigned 32-bit integer. Furthermore, in OPT pseudo-records the
/// field is not a TTL at all, but carries the extended RCODE, EDNS
/// version, and flags (see [`ExtRcode`](super::rdata::ExtRcode)).
///
/// So that decoding and re-encoding a record never changes it, `Ttl`
/// stores the 32 bits exactly as they appear on the wire.
/// [`Ttl::as_signed`] gives the signed reading, and [`Ttl::effective`]
/// gives the reading of [RFC 2181 § 8], in which values with the most
/// significant bit set are treated as zero.
///
/// [Erratum 2130]: https://www.rfc-editor.org/errata/eid2130
/// [RFC 1035]: https://datatracker.ietf.org/doc/html/rfc1035
/// [RFC 2181 § 8]: https://datatracker.ietf.org/doc/html/rfc2181#section-8
#[derive(Clone, Copy, Default, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Ttl(u32);

impl Ttl {
    /// Returns the field interpreted as a signed integer.
    pub fn as_signed(self) -> i32 {
        self.0 as i32
    }

    /// Returns the TTL in seconds according to RFC 2181 § 8.
    pub fn effective(self) -> u32 {
        if self.0 > i32::MAX as u32 {
            0
        } else {
            self.0
        }
    }
}

impl From<u32> for Ttl {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<i32> for Ttl {
    fn from(signed: i32) -> Self {
        Self(signed as u32)
    }
}

impl From<Ttl> for u32 {
    fn from(ttl: Ttl) -> Self {
        ttl.0
    }
}

impl fmt::Debug for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_signed())
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_bits_are_preserved() {
        let raw = 0x8000_0001;
        assert_eq!(u32::from(Ttl::from(raw)), raw);
        assert_eq!(Ttl::from(-1i32).as_signed(), -1);
    }

    #[test]
    fn small_ttls_are_effective() {
        let i32_max = i32::MAX as u32;
        assert_eq!(Ttl::from(0u32).effective(), 0);
        assert_eq!(Ttl::from(23u32).effective(), 23);
        assert_eq!(Ttl::from(i32_max).effective(), i32_max);
    }

    #[test]
    fn large_ttls_are_effectively_zero() {
        assert_eq!(Ttl::from(i32::MAX as u32 + 1).effective(), 0);
        assert_eq!(Ttl::from(u32::MAX).to_string(), "-1");
    }
}
