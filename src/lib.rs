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

//! A codec for the DNS wire protocol.
//!
//! The crate is built in layers. [`wire`] provides the byte-level
//! buffer and cursor; [`name`] implements domain names and their
//! compression codec on top of it; [`rr`] models resource records,
//! their RDATA, and set operations over them; [`message`] assembles
//! whole DNS messages; and [`exchange`] sends a message over UDP and
//! collects the response.

pub mod class;
pub mod exchange;
pub mod message;
pub mod name;
pub mod rr;
mod util;
pub mod wire;
