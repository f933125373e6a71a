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

//! RDATA for the geographic RR types, GPOS ([RFC 1712]) and LOC
//! ([RFC 1876]).
//!
//! [RFC 1712]: https://datatracker.ietf.org/doc/html/rfc1712
//! [RFC 1876]: https://datatracker.ietf.org/doc/html/rfc1876

use std::fmt;

use crate::wire::{self, Cursor, EncodeError, ErrorKind, WireBuffer};

////////////////////////////////////////////////////////////////////////
// RFC 1712 - GPOS RR                                                 //
////////////////////////////////////////////////////////////////////////

/// The RDATA of a GPOS record. On the wire, each coordinate is a
/// decimal number written out as a `<character-string>`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gpos {
    pub longitude: f64,
    pub latitude: f64,
    pub altitude: f64,
}

impl Gpos {
    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        Ok(Self {
            longitude: read_coordinate(cursor)?,
            latitude: read_coordinate(cursor)?,
            altitude: read_coordinate(cursor)?,
        })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        for coordinate in [self.longitude, self.latitude, self.altitude] {
            buf.push_character_string(format!("{:.6}", coordinate).as_bytes())?;
        }
        Ok(())
    }
}

fn read_coordinate(cursor: &mut Cursor) -> wire::Result<f64> {
    let start = cursor.position();
    let text = cursor.read_character_string()?;
    std::str::from_utf8(text)
        .ok()
        .and_then(|text| text.trim().parse().ok())
        .ok_or_else(|| cursor.error_at(start, ErrorKind::InvalidField))
}

impl fmt::Display for Gpos {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:.6} {:.6} {:.6}",
            self.longitude, self.latitude, self.altitude
        )
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 1876 - LOC RR                                                  //
////////////////////////////////////////////////////////////////////////

/// The latitude and longitude fields are offset so that the equator and
/// prime meridian are at 2³¹.
const EQUATOR: i64 = 1 << 31;

/// The altitude field is offset so that 100,000 m below the WGS 84
/// reference spheroid is at zero.
const ALTITUDE_BASE_CM: i64 = 10_000_000;

const THOUSANDTHS_PER_MINUTE: u32 = 60_000;
const THOUSANDTHS_PER_DEGREE: u32 = 3_600_000;

/// The RDATA of a LOC record, kept in its wire representation. Use the
/// helper methods to convert between the wire values and degrees,
/// minutes, and seconds, or centimeters.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Loc {
    pub version: u8,
    pub size: u8,
    pub horizontal_precision: u8,
    pub vertical_precision: u8,
    pub latitude: u32,
    pub longitude: u32,
    pub altitude: u32,
}

impl Loc {
    pub(super) fn decode(cursor: &mut Cursor) -> wire::Result<Self> {
        Ok(Self {
            version: cursor.read_u8()?,
            size: cursor.read_u8()?,
            horizontal_precision: cursor.read_u8()?,
            vertical_precision: cursor.read_u8()?,
            latitude: cursor.read_u32()?,
            longitude: cursor.read_u32()?,
            altitude: cursor.read_u32()?,
        })
    }

    pub(super) fn encode(&self, buf: &mut WireBuffer) -> Result<(), EncodeError> {
        buf.push_u8(self.version);
        buf.push_u8(self.size);
        buf.push_u8(self.horizontal_precision);
        buf.push_u8(self.vertical_precision);
        buf.push_u32(self.latitude);
        buf.push_u32(self.longitude);
        buf.push_u32(self.altitude);
        Ok(())
    }

    /// Returns the altitude in centimeters relative to the WGS 84
    /// reference spheroid.
    pub fn altitude_cm(&self) -> i64 {
        self.altitude as i64 - ALTITUDE_BASE_CM
    }

    /// Sets the altitude from centimeters relative to the WGS 84
    /// reference spheroid.
    pub fn set_altitude_cm(&mut self, cm: i64) {
        self.altitude = (cm + ALTITUDE_BASE_CM) as u32;
    }

    /// Converts a size or precision field, which is a base-10 mantissa
    /// and exponent packed into the high and low nibbles, into
    /// centimeters.
    pub fn decode_precision(value: u8) -> u64 {
        let exponent = (value & 0xf).min(9) as u32;
        (value >> 4) as u64 * 10u64.pow(exponent)
    }

    /// Converts centimeters into a size or precision field, rounding
    /// down to one significant digit.
    pub fn encode_precision(cm: u64) -> u8 {
        let mut mantissa = cm;
        let mut exponent = 0;
        while mantissa > 9 {
            mantissa /= 10;
            exponent += 1;
        }
        ((mantissa as u8) << 4) | exponent.min(9)
    }

    /// Converts degrees, minutes, and thousandths of seconds of arc into
    /// a latitude or longitude field. `positive` selects north or east.
    pub fn encode_dmts(degrees: u32, minutes: u32, thousandths: u32, positive: bool) -> u32 {
        let offset = degrees as i64 * THOUSANDTHS_PER_DEGREE as i64
            + minutes as i64 * THOUSANDTHS_PER_MINUTE as i64
            + thousandths as i64;
        if positive {
            (EQUATOR + offset) as u32
        } else {
            (EQUATOR - offset) as u32
        }
    }

    /// Splits a latitude or longitude field into degrees, minutes,
    /// thousandths of seconds of arc, and whether it is north or east.
    pub fn decode_dmts(value: u32) -> (u32, u32, u32, bool) {
        let offset = value as i64 - EQUATOR;
        let magnitude = offset.unsigned_abs() as u32;
        (
            magnitude / THOUSANDTHS_PER_DEGREE,
            (magnitude / THOUSANDTHS_PER_MINUTE) % 60,
            magnitude % THOUSANDTHS_PER_MINUTE,
            offset >= 0,
        )
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let coordinates = [(self.latitude, 'N', 'S'), (self.longitude, 'E', 'W')];
        for (value, positive_hemisphere, negative_hemisphere) in coordinates {
            let (degrees, minutes, thousandths, positive) = Self::decode_dmts(value);
            write!(
                f,
                "{} {} {}.{:03} {} ",
                degrees,
                minutes,
                thousandths / 1000,
                thousandths % 1000,
                if positive {
                    positive_hemisphere
                } else {
                    negative_hemisphere
                },
            )?;
        }

        let altitude = self.altitude_cm();
        write!(
            f,
            "{}{}.{:02}m {}m {}m {}m",
            if altitude < 0 { "-" } else { "" },
            altitude.unsigned_abs() / 100,
            altitude.unsigned_abs() % 100,
            Self::decode_precision(self.size) / 100,
            Self::decode_precision(self.horizontal_precision) / 100,
            Self::decode_precision(self.vertical_precision) / 100,
        )
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn cambridge_net() -> Loc {
        let mut loc = Loc {
            version: 0,
            size: Loc::encode_precision(3000),
            horizontal_precision: Loc::encode_precision(1_000_000),
            vertical_precision: Loc::encode_precision(1000),
            latitude: Loc::encode_dmts(42, 21, 54_000, true),
            longitude: Loc::encode_dmts(71, 6, 18_000, false),
            altitude: 0,
        };
        loc.set_altitude_cm(-2400);
        loc
    }

    #[test]
    fn loc_fields_match_rfc1876_example() {
        let loc = cambridge_net();
        assert_eq!(loc.size, 0x33);
        assert_eq!(loc.horizontal_precision, 0x16);
        assert_eq!(loc.vertical_precision, 0x13);
        assert_eq!(loc.latitude, 2_299_997_648);
        assert_eq!(loc.longitude, 1_891_505_648);
        assert_eq!(loc.altitude, 9_997_600);
        assert_eq!(
            loc.to_string(),
            "42 21 54.000 N 71 6 18.000 W -24.00m 30m 10000m 10m"
        );
    }

    #[test]
    fn loc_latitude_precedes_longitude_on_the_wire() {
        let loc = cambridge_net();
        let mut buf = WireBuffer::new();
        loc.encode(&mut buf).unwrap();
        assert_eq!(&buf.as_slice()[4..8], &2_299_997_648u32.to_be_bytes());
        assert_eq!(Loc::decode(&mut Cursor::new(buf.as_slice())).unwrap(), loc);
    }

    #[test]
    fn small_negative_altitudes_keep_their_sign() {
        let mut loc = cambridge_net();
        loc.set_altitude_cm(-50);
        assert!(loc.to_string().contains(" -0.50m "));
    }

    #[test]
    fn precision_exponent_is_clamped() {
        assert_eq!(Loc::decode_precision(0x1f), 1_000_000_000);
        assert_eq!(Loc::decode_precision(0x12), 100);
    }

    #[test]
    fn gpos_round_trips() {
        let gpos = Gpos {
            longitude: -32.6882,
            latitude: 116.8652,
            altitude: 10.0,
        };
        let mut buf = WireBuffer::new();
        gpos.encode(&mut buf).unwrap();
        assert_eq!(&buf.as_slice()[..11], b"\x0a-32.688200");
        assert_eq!(Gpos::decode(&mut Cursor::new(buf.as_slice())).unwrap(), gpos);
        assert_eq!(gpos.to_string(), "-32.688200 116.865200 10.000000");
    }

    #[test]
    fn gpos_rejects_non_numbers() {
        let error = Gpos::decode(&mut Cursor::new(b"\x01x\x010\x010")).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::InvalidField);
        assert_eq!(error.offset(), 0);
    }
}
