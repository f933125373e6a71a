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

//! Handling of the EDNS pseudo-RR type, OPT.
//!
//! This follows EDNS(0) as restated and refined by [RFC 6891].
//!
//! [RFC 6891]: https://datatracker.ietf.org/doc/html/rfc6891

use std::fmt;

use crate::rr::Ttl;
use crate::util::write_spaced_hex;
use crate::wire::{self, Cursor, EncodeError, WireBuffer};

////////////////////////////////////////////////////////////////////////
// EDNS(0) (RFC 6891) - OPT PSEUDO-RR                                 //
////////////////////////////////////////////////////////////////////////

/// The RDATA of an OPT record.
///
/// [RFC 6891 § 6.1.2] defines the wire format for OPT RDATA. It
/// consists of attribute-value pairs to specify EDNS options, filling
/// the RDATA.
///
/// [RFC 6891 § 6.1.2]: https://datatracker.ietf.org/doc/html/rfc6891#section-6.1.2
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Opt {
    pub options: Vec<EdnsOption>,
}

/// A single EDNS option.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct EdnsOption {
    pub code: u16,
    pub data: Vec<u8>,
}

impl Opt {
    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        let mut options = Vec::new();
        while !cursor.is_at_end() {
            let code = cursor.read_u16()?;
            let len = cursor.read_u16()? as usize;
            options.push(EdnsOption {
                code,
                data: cursor.read_slice(len)?.to_vec(),
            });
        }
        Ok(Self { options })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        for option in &self.options {
            buf.push_u16(option.code);
            buf.push_u16_prefixed(&option.data)?;
        }
        Ok(())
    }
}

impl fmt::Display for Opt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, option) in self.options.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", option)?;
        }
        Ok(())
    }
}

impl fmt::Display for EdnsOption {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04x}:", self.code)?;
        write_spaced_hex(f, &self.data)
    }
}

////////////////////////////////////////////////////////////////////////
// EXTENDED RCODE AND FLAGS                                           //
////////////////////////////////////////////////////////////////////////

/// The contents of the TTL field of an OPT record (RFC 6891 § 6.1.3):
/// the upper eight bits of the extended RCODE, the EDNS version, and
/// sixteen bits of flags.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct ExtRcode {
    pub rcode: u8,
    pub version: u8,
    pub z: u16,
}

impl ExtRcode {
    /// The DNSSEC OK flag of [RFC 3225].
    ///
    /// [RFC 3225]: https://datatracker.ietf.org/doc/html/rfc3225
    pub const DO: u16 = 0x8000;

    pub fn from_ttl(ttl: Ttl) -> Self {
        let raw = u32::from(ttl);
        Self {
            rcode: (raw >> 24) as u8,
            version: (raw >> 16) as u8,
            z: raw as u16,
        }
    }

    pub fn to_ttl(self) -> Ttl {
        Ttl::from((self.rcode as u32) << 24 | (self.version as u32) << 16 | self.z as u32)
    }

    pub fn dnssec_ok(self) -> bool {
        self.z & Self::DO != 0
    }
}

impl From<Ttl> for ExtRcode {
    fn from(ttl: Ttl) -> Self {
        Self::from_ttl(ttl)
    }
}

impl From<ExtRcode> for Ttl {
    fn from(ext_rcode: ExtRcode) -> Self {
        ext_rcode.to_ttl()
    }
}

impl fmt::Display for ExtRcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "EXT_RCODE:{:02x} Ver:{} Z:{}",
            self.rcode, self.version, self.z
        )
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_works() {
        let octets = b"\x00\x0a\x00\x08\x01\x02\x03\x04\x05\x06\x07\x08\x00\x0c\x00\x00";
        let opt = Opt::decode(&mut Cursor::new(octets)).unwrap();
        assert_eq!(opt.options.len(), 2);
        assert_eq!(opt.options[0].code, 10);
        assert!(opt.options[1].data.is_empty());
        assert_eq!(opt.to_string(), "000a:01 02 03 04 05 06 07 08 000c:");
    }

    #[test]
    fn decode_rejects_overlong_option() {
        let octets = b"\x00\x0a\x00\x08\x01\x02\x03";
        assert!(Opt::decode(&mut Cursor::new(octets))
            .unwrap_err()
            .is_truncation());
    }

    #[test]
    fn ext_rcode_converts_to_and_from_ttl() {
        let ext_rcode = ExtRcode::from_ttl(Ttl::from(0x0100_8000u32));
        assert_eq!(
            ext_rcode,
            ExtRcode {
                rcode: 1,
                version: 0,
                z: ExtRcode::DO,
            }
        );
        assert!(ext_rcode.dnssec_ok());
        assert_eq!(u32::from(ext_rcode.to_ttl()), 0x0100_8000);
        assert_eq!(ext_rcode.to_string(), "EXT_RCODE:01 Ver:0 Z:32768");
    }
}
