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

//! Handling of the [RFC 3596] RR type, AAAA.
//!
//! [RFC 3596]: https://datatracker.ietf.org/doc/html/rfc3596

use std::fmt;
use std::net::IpAddr;

use crate::wire::{self, Cursor, EncodeError, WireBuffer};

////////////////////////////////////////////////////////////////////////
// RFC 3596 §§ 2.1 and 2.2 - IPV6 AAAA RR                             //
////////////////////////////////////////////////////////////////////////

/// An AAAA record's host address. IPv4 addresses are encoded in their
/// IPv4-mapped form.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Aaaa {
    pub address: IpAddr,
}

impl Aaaa {
    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        Ok(Self {
            address: cursor.read_ipv6()?.into(),
        })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        buf.push_ipv6(self.address)
    }
}

impl fmt::Display for Aaaa {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aaaa_round_trips() {
        let aaaa = Aaaa {
            address: "2001:db8::53".parse().unwrap(),
        };
        let mut buf = WireBuffer::new();
        aaaa.encode(&mut buf).unwrap();
        assert_eq!(buf.len(), 16);
        assert_eq!(Aaaa::decode(&mut Cursor::new(buf.as_slice())).unwrap(), aaaa);
        assert_eq!(aaaa.to_string(), "2001:db8::53");
    }
}
