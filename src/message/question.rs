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

//! Implementation of types relating to DNS questions.

use std::fmt;

use crate::class::Class;
use crate::name::Name;
use crate::rr::Type;
use crate::wire::{self, Cursor, Tag, WireBuffer};

////////////////////////////////////////////////////////////////////////
// QUESTIONS                                                          //
////////////////////////////////////////////////////////////////////////

/// The question of a DNS query.
///
/// Defined in [RFC 1035 § 4.1.2], a DNS question includes
///
/// * the QNAME, which is the domain name whose records are being
///   queried;
/// * the QTYPE, which specifies what types of records are desired; and
/// * the QCLASS, which specifies which DNS class(es) to search.
///
/// QTYPEs and QCLASSes are represented by [`Type`] and [`Class`],
/// which carry constants for the query-only values such as
/// [`Type::ANY`] and [`Class::ANY`].
///
/// While the original specification does not rule out having multiple
/// questions per message, in practice only one question per message is
/// used.
///
/// [RFC 1035 § 4.1.2]: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.2
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Question {
    pub qname: Name,
    pub qtype: Type,
    pub qclass: Class,
}

impl Question {
    pub fn new(qname: Name, qtype: Type, qclass: Class) -> Self {
        Self {
            qname,
            qtype,
            qclass,
        }
    }

    /// An IN-class question for address records.
    pub fn a(qname: Name) -> Self {
        Self::new(qname, Type::A, Class::IN)
    }

    /// An IN-class question for nameserver records.
    pub fn ns(qname: Name) -> Self {
        Self::new(qname, Type::NS, Class::IN)
    }

    /// An IN-class question for records of every type.
    pub fn any(qname: Name) -> Self {
        Self::new(qname, Type::ANY, Class::IN)
    }

    pub fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        let start = cursor.position();
        let qname = Name::decode(cursor)?;
        let qtype = Type::from(cursor.read_u16()?);
        let qclass = Class::from(cursor.read_u16()?);
        let question = Self::new(qname, qtype, qclass);
        cursor.observe(start, Tag::Question, &question);
        Ok(question)
    }

    pub fn encode(&self, buf: &mut WireBuffer) {
        self.qname.encode(buf);
        buf.push_u16(self.qtype.into());
        buf.push_u16(self.qclass.into());
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, ";{}\t\t{}\t{}", self.qname, self.qclass, self.qtype)
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_works() {
        let question = Question::ns("example.com.".parse().unwrap());
        let mut buf = WireBuffer::new();
        question.encode(&mut buf);
        assert_eq!(buf.as_slice(), b"\x07example\x03com\x00\x00\x02\x00\x01");
        let decoded = Question::decode(&mut Cursor::new(buf.as_slice())).unwrap();
        assert_eq!(decoded, question);
    }

    #[test]
    fn missing_qclass_is_truncated() {
        let error = Question::decode(&mut Cursor::new(b"\x00\x00\xff\x00")).unwrap_err();
        assert!(error.is_truncation());
    }

    #[test]
    fn display_works() {
        let question = Question::any("example.".parse().unwrap());
        assert_eq!(question.to_string(), ";example.\t\tIN\tANY");
    }
}
