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

//! Implements command-line argument parsing.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::anyhow;
use clap::Parser;

use dnswire::rr::Type;

/// The port that nameservers listen on when none is given.
pub const DEFAULT_PORT: u16 = 53;

/// Parses the command line arguments.
pub fn parse() -> Args {
    Args::parse()
}

/// Send a DNS query to each configured nameserver and print the
/// responses
#[derive(Debug, Parser)]
#[clap(author, version)]
pub struct Args {
    /// The domain name to look up
    #[clap(value_name = "NAME")]
    pub name: String,

    /// The record type to ask for
    #[clap(default_value = "A", value_name = "TYPE", value_parser = parse_type)]
    pub rr_type: Type,

    /// Set the resolver configuration file to use
    #[clap(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Query this nameserver instead of the configured ones
    #[clap(long = "server", short = 's', value_name = "IP[:PORT]", value_parser)]
    pub servers: Vec<Nameserver>,

    /// Set how many seconds to wait for responses
    #[clap(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Set how many rounds of queries to send before giving up
    #[clap(long, value_name = "N")]
    pub attempts: Option<u32>,

    /// Set the DNSSEC OK bit (implies EDNS)
    #[clap(long)]
    pub dnssec: bool,

    /// Advertise this EDNS UDP payload size
    #[clap(long, value_name = "OCTETS")]
    pub bufsize: Option<u16>,

    /// Clear the RD (recursion desired) bit
    #[clap(long)]
    pub norecurse: bool,

    /// Print the query before sending it
    #[clap(long)]
    pub debug: bool,
}

fn parse_type(s: &str) -> Result<Type, anyhow::Error> {
    s.parse()
        .map_err(|e| anyhow!("invalid record type {}: {}", s, e))
}

/// The address of a nameserver. This is parsed with its [`FromStr`]
/// implementation, which accepts either a bare IP address (implying
/// port 53) or a socket address:
///
/// * `192.0.2.1`
/// * `[2001:db8::1]:5353`
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Nameserver(pub SocketAddr);

impl FromStr for Nameserver {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(addr) = s.parse::<SocketAddr>() {
            Ok(Self(addr))
        } else {
            s.parse::<IpAddr>()
                .map(|ip| Self(SocketAddr::new(ip, DEFAULT_PORT)))
                .map_err(|_| anyhow!("not an IP address or IP:PORT pair: {}", s))
        }
    }
}
