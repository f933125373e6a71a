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

//! Implementation of the [`WireBuffer`] type.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::ops::{Deref, DerefMut};

use super::{EncodeError, POINTER_MAX};
use crate::name::Name;

////////////////////////////////////////////////////////////////////////
// WIRE BUFFER                                                        //
////////////////////////////////////////////////////////////////////////

/// An append-only buffer into which one DNS message is encoded.
///
/// Besides the octets themselves, a `WireBuffer` remembers where
/// previously written domain names start, so that later names sharing
/// a suffix with them can be compressed (see [`Name::encode`]). The
/// lookup is ASCII-case-insensitive, since [`Name`]'s [`Hash`] and
/// [`Eq`] implementations are.
///
/// Compression is on by default. Encoders for fields that must not be
/// compressed use [`WireBuffer::disable_compression`], which turns it
/// off until the returned guard is dropped.
#[derive(Debug)]
pub struct WireBuffer {
    octets: Vec<u8>,
    names: HashMap<Name, u16>,
    compress: bool,
}

impl WireBuffer {
    /// Creates an empty buffer with compression enabled.
    pub fn new() -> Self {
        Self::with_capacity(512)
    }

    /// Creates an empty buffer with compression enabled and room for
    /// `capacity` octets.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            octets: Vec::with_capacity(capacity),
            names: HashMap::new(),
            compress: true,
        }
    }

    /// Creates an empty buffer that never compresses names.
    pub fn uncompressed() -> Self {
        let mut buf = Self::new();
        buf.compress = false;
        buf
    }

    /// Returns the number of octets written so far.
    pub fn len(&self) -> usize {
        self.octets.len()
    }

    /// Returns whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.octets.is_empty()
    }

    /// Returns the octets written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.octets
    }

    /// Consumes the buffer, returning the octets written.
    pub fn into_vec(self) -> Vec<u8> {
        self.octets
    }

    ////////////////////////////////////////////////////////////////////
    // PRIMITIVES                                                     //
    ////////////////////////////////////////////////////////////////////

    pub fn push_u8(&mut self, value: u8) {
        self.octets.push(value);
    }

    pub fn push_u16(&mut self, value: u16) {
        self.octets.extend_from_slice(&value.to_be_bytes());
    }

    pub fn push_u32(&mut self, value: u32) {
        self.octets.extend_from_slice(&value.to_be_bytes());
    }

    pub fn push_slice(&mut self, octets: &[u8]) {
        self.octets.extend_from_slice(octets);
    }

    /// Writes `octets` as a `<character-string>`: a length octet
    /// followed by at most 255 octets of data.
    pub fn push_character_string(&mut self, octets: &[u8]) -> Result<(), EncodeError> {
        let len = u8::try_from(octets.len()).or(Err(EncodeError::CharacterStringTooLong))?;
        self.push_u8(len);
        self.push_slice(octets);
        Ok(())
    }

    /// Writes `octets` preceded by a one-octet length.
    pub fn push_u8_prefixed(&mut self, octets: &[u8]) -> Result<(), EncodeError> {
        let len = u8::try_from(octets.len()).or(Err(EncodeError::FieldTooLong))?;
        self.push_u8(len);
        self.push_slice(octets);
        Ok(())
    }

    /// Writes `octets` preceded by a two-octet length.
    pub fn push_u16_prefixed(&mut self, octets: &[u8]) -> Result<(), EncodeError> {
        let len = u16::try_from(octets.len()).or(Err(EncodeError::FieldTooLong))?;
        self.push_u16(len);
        self.push_slice(octets);
        Ok(())
    }

    /// Writes a four-octet IPv4 address. IPv4-mapped IPv6 addresses
    /// are reduced to their IPv4 form; other IPv6 addresses fail with
    /// [`EncodeError::NotAnAddressOfExpectedFamily`].
    pub fn push_ipv4(&mut self, address: IpAddr) -> Result<(), EncodeError> {
        let v4: Ipv4Addr = match address {
            IpAddr::V4(v4) => v4,
            IpAddr::V6(v6) => v6
                .to_ipv4_mapped()
                .ok_or(EncodeError::NotAnAddressOfExpectedFamily)?,
        };
        self.push_slice(&v4.octets());
        Ok(())
    }

    /// Writes a sixteen-octet IPv6 address. IPv4 addresses are widened
    /// to their IPv4-mapped form.
    pub fn push_ipv6(&mut self, address: IpAddr) -> Result<(), EncodeError> {
        let v6: Ipv6Addr = match address {
            IpAddr::V4(v4) => v4.to_ipv6_mapped(),
            IpAddr::V6(v6) => v6,
        };
        self.push_slice(&v6.octets());
        Ok(())
    }

    /// Writes a placeholder `u16` and returns its offset, to be filled
    /// in later with [`WireBuffer::patch_u16`].
    pub fn reserve_u16(&mut self) -> usize {
        let at = self.octets.len();
        self.push_u16(0);
        at
    }

    /// Overwrites the `u16` at `at`, which must have been returned by
    /// [`WireBuffer::reserve_u16`].
    pub fn patch_u16(&mut self, at: usize, value: u16) {
        debug_assert!(at + 2 <= self.octets.len());
        self.octets[at..at + 2].copy_from_slice(&value.to_be_bytes());
    }

    /// Writes a length-prefixed region: a two-octet length is reserved,
    /// `f` writes the contents, and the length is then filled in from
    /// the number of octets actually written.
    pub fn with_u16_length<F>(&mut self, f: F) -> Result<(), EncodeError>
    where
        F: FnOnce(&mut Self) -> Result<(), EncodeError>,
    {
        let at = self.reserve_u16();
        f(self)?;
        let len = u16::try_from(self.octets.len() - at - 2).or(Err(EncodeError::RdataTooLong))?;
        self.patch_u16(at, len);
        Ok(())
    }

    ////////////////////////////////////////////////////////////////////
    // COMPRESSION STATE                                              //
    ////////////////////////////////////////////////////////////////////

    /// Returns whether names written now may be compressed.
    pub fn compression_enabled(&self) -> bool {
        self.compress
    }

    /// Disables compression until the returned guard is dropped, at
    /// which point the previous setting is restored. The guard
    /// dereferences to the buffer, so nested encoders write through it.
    pub fn disable_compression(&mut self) -> CompressionGuard<'_> {
        let previous = self.compress;
        self.compress = false;
        CompressionGuard {
            buf: self,
            previous,
        }
    }

    /// Returns the offset at which `name` was previously written, if it
    /// was written while compression was enabled.
    pub fn name_offset(&self, name: &Name) -> Option<u16> {
        self.names.get(name).copied()
    }

    /// Remembers that `name` starts at `offset`. Offsets beyond the
    /// reach of a compression pointer are ignored, as is a name already
    /// remembered.
    pub fn remember_name(&mut self, name: Name, offset: usize) {
        if offset <= POINTER_MAX {
            self.names.entry(name).or_insert(offset as u16);
        }
    }
}

impl Default for WireBuffer {
    fn default() -> Self {
        Self::new()
    }
}

////////////////////////////////////////////////////////////////////////
// COMPRESSION GUARD                                                  //
////////////////////////////////////////////////////////////////////////

/// A scope in which a [`WireBuffer`] does not compress names. It is
/// returned by [`WireBuffer::disable_compression`].
pub struct CompressionGuard<'a> {
    buf: &'a mut WireBuffer,
    previous: bool,
}

impl Deref for CompressionGuard<'_> {
    type Target = WireBuffer;

    fn deref(&self) -> &WireBuffer {
        self.buf
    }
}

impl DerefMut for CompressionGuard<'_> {
    fn deref_mut(&mut self) -> &mut WireBuffer {
        self.buf
    }
}

impl Drop for CompressionGuard<'_> {
    fn drop(&mut self) {
        self.buf.compress = self.previous;
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_are_big_endian() {
        let mut buf = WireBuffer::new();
        buf.push_u8(0x01);
        buf.push_u16(0x0203);
        buf.push_u32(0x04050607);
        assert_eq!(buf.as_slice(), b"\x01\x02\x03\x04\x05\x06\x07");
    }

    #[test]
    fn character_strings_are_length_prefixed() {
        let mut buf = WireBuffer::new();
        buf.push_character_string(b"quandary").unwrap();
        buf.push_character_string(b"").unwrap();
        assert_eq!(buf.as_slice(), b"\x08quandary\x00");
        assert_eq!(
            buf.push_character_string(&[0; 256]),
            Err(EncodeError::CharacterStringTooLong)
        );
    }

    #[test]
    fn addresses_are_reduced_to_the_required_family() {
        let mut buf = WireBuffer::new();
        buf.push_ipv4("192.0.2.1".parse().unwrap()).unwrap();
        buf.push_ipv4("::ffff:192.0.2.2".parse().unwrap()).unwrap();
        assert_eq!(buf.as_slice(), b"\xc0\x00\x02\x01\xc0\x00\x02\x02");
        assert_eq!(
            buf.push_ipv4("2001:db8::1".parse().unwrap()),
            Err(EncodeError::NotAnAddressOfExpectedFamily)
        );

        let mut buf = WireBuffer::new();
        buf.push_ipv6("192.0.2.1".parse().unwrap()).unwrap();
        assert_eq!(
            buf.as_slice(),
            b"\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\xff\xff\xc0\x00\x02\x01"
        );
    }

    #[test]
    fn length_prefix_is_backpatched() {
        let mut buf = WireBuffer::new();
        buf.push_u8(0xff);
        buf.with_u16_length(|buf| {
            buf.push_u32(7);
            Ok(())
        })
        .unwrap();
        assert_eq!(buf.as_slice(), b"\xff\x00\x04\x00\x00\x00\x07");
    }

    #[test]
    fn compression_guard_restores_previous_state() {
        let mut buf = WireBuffer::new();
        {
            let mut outer = buf.disable_compression();
            assert!(!outer.compression_enabled());
            {
                let inner = outer.disable_compression();
                assert!(!inner.compression_enabled());
            }
            assert!(!outer.compression_enabled());
        }
        assert!(buf.compression_enabled());
        assert!(!WireBuffer::uncompressed().compression_enabled());
    }

    #[test]
    fn remembered_names_are_found_case_insensitively() {
        let mut buf = WireBuffer::new();
        buf.remember_name("Example.COM.".parse().unwrap(), 12);
        buf.remember_name("example.com.".parse().unwrap(), 40);
        buf.remember_name("far.example.".parse().unwrap(), 0x4000);
        assert_eq!(buf.name_offset(&"EXAMPLE.com.".parse().unwrap()), Some(12));
        assert_eq!(buf.name_offset(&"far.example.".parse().unwrap()), None);
    }
}
