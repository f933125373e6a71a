// Copyright 2021 Matthew Ingwersen.
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

//! Crate-private utilities.

use std::fmt::{self, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// A wrapper around [`str`] references whose [`PartialEq`] and [`Eq`]
/// implementations are ASCII-case-insensitive.
pub struct Caseless<'a>(pub &'a str);

impl PartialEq for Caseless<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(other.0)
    }
}

impl Eq for Caseless<'_> {}

/// Converts a nibble into an ASCII hex character. Lower-case hex digits
/// are used. The passed value must be less than 16.
pub fn nibble_to_ascii_hex_digit(nibble: u8) -> u8 {
    debug_assert!(nibble < 16);
    if nibble < 10 {
        b'0' + nibble
    } else {
        b'a' + nibble - 10
    }
}

////////////////////////////////////////////////////////////////////////
// PRESENTATION-FORMAT ENCODERS                                       //
////////////////////////////////////////////////////////////////////////

/// Writes `octets` as contiguous lower-case hexadecimal.
pub fn write_hex(f: &mut fmt::Formatter, octets: &[u8]) -> fmt::Result {
    for octet in octets {
        f.write_char(char::from(nibble_to_ascii_hex_digit(octet >> 4)))?;
        f.write_char(char::from(nibble_to_ascii_hex_digit(octet & 0xf)))?;
    }
    Ok(())
}

/// Writes `octets` as lower-case hexadecimal with a space between
/// octets.
pub fn write_spaced_hex(f: &mut fmt::Formatter, octets: &[u8]) -> fmt::Result {
    for (i, octet) in octets.iter().enumerate() {
        if i > 0 {
            f.write_char(' ')?;
        }
        write_hex(f, &[*octet])?;
    }
    Ok(())
}

/// Writes `octets` in the RFC 3597 generic RDATA format
/// (`\# <length> <hex>`).
pub fn write_generic_rdata(f: &mut fmt::Formatter, octets: &[u8]) -> fmt::Result {
    write!(f, "\\# {}", octets.len())?;
    if !octets.is_empty() {
        f.write_char(' ')?;
        write_hex(f, octets)?;
    }
    Ok(())
}

/// Writes `octets` in standard base 64 with padding.
pub fn write_base64(f: &mut fmt::Formatter, octets: &[u8]) -> fmt::Result {
    f.write_str(&STANDARD.encode(octets))
}

/// The "extended hex" base 32 alphabet of [RFC 4648 § 7], as used for
/// NSEC3 hashed owner names.
///
/// [RFC 4648 § 7]: https://datatracker.ietf.org/doc/html/rfc4648#section-7
const BASE32HEX_ALPHABET: &[u8; 32] = b"0123456789abcdefghijklmnopqrstuv";

/// Writes `octets` in unpadded base 32 with the extended hex alphabet.
pub fn write_base32hex(f: &mut fmt::Formatter, octets: &[u8]) -> fmt::Result {
    let mut buffer: u16 = 0;
    let mut bits = 0;
    for octet in octets {
        buffer = (buffer << 8) | *octet as u16;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            let index = (buffer >> bits) & 0x1f;
            f.write_char(char::from(BASE32HEX_ALPHABET[index as usize]))?;
        }
        buffer &= (1 << bits) - 1;
    }
    if bits > 0 {
        let index = (buffer << (5 - bits)) & 0x1f;
        f.write_char(char::from(BASE32HEX_ALPHABET[index as usize]))?;
    }
    Ok(())
}

/// Writes an octet string as the contents of a quoted
/// `<character-string>`, escaping `"` and `\` with a backslash and
/// non-printable octets as `\DDD`.
pub fn write_quoted(f: &mut fmt::Formatter, octets: &[u8]) -> fmt::Result {
    f.write_char('"')?;
    for octet in octets {
        match *octet {
            b'"' | b'\\' => write!(f, "\\{}", char::from(*octet))?,
            0x20..=0x7e => f.write_char(char::from(*octet))?,
            _ => write!(f, "\\{:03}", octet)?,
        }
    }
    f.write_char('"')
}

/// Writes a 32-bit count of seconds since the Unix epoch as
/// `YYYYMMDDHHmmSS` in UTC, the format [RFC 4034 § 3.2] uses for RRSIG
/// timestamps.
///
/// [RFC 4034 § 3.2]: https://datatracker.ietf.org/doc/html/rfc4034#section-3.2
pub fn write_timestamp(f: &mut fmt::Formatter, seconds: u32) -> fmt::Result {
    let days = (seconds / 86400) as i64;
    let rem = seconds % 86400;
    let (year, month, day) = civil_from_days(days);
    write!(
        f,
        "{:04}{:02}{:02}{:02}{:02}{:02}",
        year,
        month,
        day,
        rem / 3600,
        (rem / 60) % 60,
        rem % 60,
    )
}

/// Converts a count of days since 1970-01-01 into a proleptic Gregorian
/// (year, month, day).
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719468;
    let era = z.div_euclid(146097);
    let doe = z.rem_euclid(146097);
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
    (year, month, day)
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    struct With<F>(F);

    impl<F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result> fmt::Display for With<F> {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            (self.0)(f)
        }
    }

    fn with<F>(write: F) -> With<F>
    where
        F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result,
    {
        With(write)
    }

    #[test]
    fn base32hex_matches_rfc4648_vectors() {
        let cases: [(&[u8], &str); 4] = [
            (b"f", "co"),
            (b"fo", "cpng"),
            (b"foo", "cpnmu"),
            (b"foobar", "cpnmuog5e8"),
        ];
        for (input, expected) in cases {
            assert_eq!(with(|f| write_base32hex(f, input)).to_string(), expected);
        }
    }

    #[test]
    fn timestamps_are_formatted_in_utc() {
        assert_eq!(
            with(|f| write_timestamp(f, 0)).to_string(),
            "19700101000000"
        );
        assert_eq!(
            with(|f| write_timestamp(f, 1_300_000_000)).to_string(),
            "20110313070640"
        );
    }

    #[test]
    fn quoting_escapes_special_octets() {
        assert_eq!(
            with(|f| write_quoted(f, b"a\"b\\c\x01")).to_string(),
            "\"a\\\"b\\\\c\\001\""
        );
    }

    #[test]
    fn generic_rdata_format() {
        assert_eq!(with(|f| write_generic_rdata(f, b"")).to_string(), "\\# 0");
        assert_eq!(
            with(|f| write_generic_rdata(f, b"\x0a\xff")).to_string(),
            "\\# 2 0aff"
        );
    }
}
