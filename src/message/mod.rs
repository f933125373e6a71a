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

//! Implementation of reading and writing of DNS messages.

use std::fmt;

use crate::class::Class;
use crate::name::Name;
use crate::rr::rdata::{ExtRcode, Opt};
use crate::rr::{Rdata, Record, RecordSet, Type};
use crate::wire::{self, Cursor, DecodeObserver, EncodeError, Tag, WireBuffer};

mod header;
mod opcode;
mod question;
mod rcode;
pub use header::{Header, HEADER_SIZE};
pub use opcode::{IntoOpcodeError, Opcode};
pub use question::Question;
pub use rcode::{IntoRcodeError, Rcode};

use header::Counts;

/// Returns a random message ID.
pub fn gen_id() -> u16 {
    rand::random()
}

////////////////////////////////////////////////////////////////////////
// MESSAGES                                                           //
////////////////////////////////////////////////////////////////////////

/// A DNS message, as laid out in [RFC 1035 § 4.1]: a header followed by
/// the question, answer, authority, and additional sections.
///
/// Messages are encoded into a single [`WireBuffer`], so that names in
/// later sections are compressed against names in earlier ones.
///
/// [RFC 1035 § 4.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Message {
    pub header: Header,
    pub question: Vec<Question>,
    pub answer: Vec<Record>,
    pub authority: Vec<Record>,
    pub additional: Vec<Record>,
}

impl Message {
    /// Creates an empty message with the given ID.
    pub fn new(id: u16) -> Self {
        Self {
            header: Header {
                id,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Creates a standard recursive query for records of type `qtype`
    /// in the IN class, with a random ID.
    pub fn query(qname: Name, qtype: Type) -> Self {
        let mut message = Self::new(gen_id());
        message.header.rd = true;
        message
            .question
            .push(Question::new(qname, qtype, Class::IN));
        message
    }

    ////////////////////////////////////////////////////////////////////
    // DECODING                                                       //
    ////////////////////////////////////////////////////////////////////

    /// Decodes a message. Octets after the last record of the
    /// additional section are ignored.
    pub fn decode(octets: &[u8]) -> wire::Result<Self> {
        Self::decode_from(&mut Cursor::new(octets))
    }

    /// Decodes a message, reporting each decoded element to
    /// `observer`.
    pub fn decode_with_observer(
        octets: &[u8],
        observer: &mut dyn DecodeObserver,
    ) -> wire::Result<Self> {
        Self::decode_from(&mut Cursor::with_observer(octets, observer))
    }

    fn decode_from(cursor: &mut Cursor) -> wire::Result<Self> {
        let start = cursor.position();
        let (header, counts) = Header::decode(cursor)?;
        cursor.observe(start, Tag::Header, &header);
        Ok(Self {
            header,
            question: (0..counts.qdcount)
                .map(|_| Question::decode(cursor))
                .collect::<wire::Result<_>>()?,
            answer: decode_section(cursor, counts.ancount)?,
            authority: decode_section(cursor, counts.nscount)?,
            additional: decode_section(cursor, counts.arcount)?,
        })
    }

    ////////////////////////////////////////////////////////////////////
    // ENCODING                                                       //
    ////////////////////////////////////////////////////////////////////

    /// Encodes the message with name compression.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut buf = WireBuffer::with_capacity(512);
        self.encode_into(&mut buf)?;
        Ok(buf.into_vec())
    }

    /// Encodes the message into `buf`, which should be empty, since
    /// compression pointers are offsets from the start of the buffer.
    pub fn encode_into(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        let counts = Counts {
            qdcount: section_len(&self.question)?,
            ancount: section_len(&self.answer)?,
            nscount: section_len(&self.authority)?,
            arcount: section_len(&self.additional)?,
        };
        self.header.encode(counts, buf);
        for question in &self.question {
            question.encode(buf);
        }
        for record in self.records() {
            record.encode(buf)?;
        }
        Ok(())
    }

    ////////////////////////////////////////////////////////////////////
    // ACCESSORS                                                      //
    ////////////////////////////////////////////////////////////////////

    /// Iterates over the records of the answer, authority, and
    /// additional sections, in that order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.answer
            .iter()
            .chain(&self.authority)
            .chain(&self.additional)
    }

    /// Returns the answer section as a [`RecordSet`], with duplicates
    /// removed.
    pub fn answer_set(&self) -> RecordSet {
        RecordSet::from(self.answer.clone()).unique()
    }

    /// Returns the OPT pseudo-RR of the additional section, if there is
    /// one.
    pub fn edns(&self) -> Option<&Record> {
        self.additional.iter().find(|r| r.rr_type == Type::OPT)
    }

    /// Adds an OPT pseudo-RR advertising `udp_payload_size`, replacing
    /// any OPT record already present.
    pub fn set_edns(&mut self, udp_payload_size: u16, dnssec_ok: bool) {
        self.additional.retain(|r| r.rr_type != Type::OPT);
        let ext_rcode = ExtRcode {
            z: if dnssec_ok { ExtRcode::DO } else { 0 },
            ..Default::default()
        };
        self.additional.push(Record::with_type(
            Name::root(),
            Type::OPT,
            Class::from(udp_payload_size),
            ext_rcode.to_ttl(),
            Rdata::Opt(Opt::default()),
        ));
    }

    /// Returns the full 12-bit RCODE, combining the header RCODE with
    /// the upper bits from the OPT record, if any.
    pub fn extended_rcode(&self) -> u16 {
        let upper = self
            .edns()
            .and_then(Record::ext_rcode)
            .map_or(0, |e| e.rcode as u16);
        upper << 4 | u8::from(self.header.rcode) as u16
    }
}

fn decode_section(cursor: &mut Cursor, count: u16) -> wire::Result<Vec<Record>> {
    (0..count).map(|_| Record::decode(cursor)).collect()
}

fn section_len<T>(section: &[T]) -> Result<u16, EncodeError> {
    u16::try_from(section.len()).or(Err(EncodeError::SectionTooLong))
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            ";; opcode: {}, status: {}, id: {}",
            self.header.opcode, self.header.rcode, self.header.id
        )?;
        f.write_str(";; flags:")?;
        for flag in self.header.flag_names() {
            write!(f, " {}", flag)?;
        }
        writeln!(
            f,
            "; QUERY: {}, ANSWER: {}, AUTHORITY: {}, ADDITIONAL: {}",
            self.question.len(),
            self.answer.len(),
            self.authority.len(),
            self.additional.len(),
        )?;

        if !self.question.is_empty() {
            f.write_str("\n;; QUESTION SECTION:\n")?;
            for question in &self.question {
                writeln!(f, "{}", question)?;
            }
        }
        for (title, section) in [
            ("ANSWER", &self.answer),
            ("AUTHORITY", &self.authority),
            ("ADDITIONAL", &self.additional),
        ] {
            if !section.is_empty() {
                write!(f, "\n;; {} SECTION:\n", title)?;
                for record in section {
                    writeln!(f, "{}", record)?;
                }
            }
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
