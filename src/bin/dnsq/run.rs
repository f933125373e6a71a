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

//! Implements sending the query and printing the responses.

use std::fmt::Write;
use std::net::{SocketAddr, UdpSocket};
use std::process;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use env_logger::Env;
use log::{error, info, warn};
use rand::seq::SliceRandom;

use dnswire::exchange::ExchangeConfig;
use dnswire::message::Message;

use crate::args::Args;
use crate::config::{self, ResolverConfig};

/// The EDNS UDP payload size advertised when `--dnssec` is given
/// without `--bufsize`.
const DEFAULT_EDNS_BUFSIZE: u16 = 1232;

/// Runs the query.
pub fn run(args: Args) {
    env_logger::init_from_env(Env::new().default_filter_or("warn"));

    if let Err(e) = try_running(args) {
        let mut message = String::from("Failed to query:");
        for (i, cause) in e.chain().enumerate() {
            let _ = write!(message, "\n[{}] {}", i + 1, cause);
        }
        error!("{}", message);
        process::exit(1);
    }
}

fn try_running(args: Args) -> Result<()> {
    let config = if let Some(ref config_path) = args.config {
        info!("Loading the configuration from {}.", config_path.display());
        config::load_from_path(config_path, &args)
    } else {
        config::load_from_args(&args)
    }
    .context("failed to load the configuration")?;

    let query = build_query(&args, &config)?;
    if config.options.debug {
        println!(";; QUERY:\n{}", query);
    }
    let exchange_config = ExchangeConfig {
        size_hint: ExchangeConfig::default()
            .size_hint
            .max(args.bufsize.unwrap_or(0) as usize),
    };

    let mut nameservers = config.nameserver_addrs();
    for attempt in 1..=config.options.attempts {
        if config.options.rotate {
            nameservers.shuffle(&mut rand::thread_rng());
        }
        if query_all(&query, &nameservers, &config, &exchange_config)? {
            return Ok(());
        }
        info!(
            "No usable response in attempt {} of {}.",
            attempt, config.options.attempts
        );
    }
    Err(anyhow!("no nameserver gave a usable response"))
}

fn build_query(args: &Args, config: &ResolverConfig) -> Result<Message> {
    let mut query = Message::query(config.qualify(&args.name)?, args.rr_type);
    query.header.rd = !args.norecurse;
    if args.dnssec || args.bufsize.is_some() {
        query.set_edns(args.bufsize.unwrap_or(DEFAULT_EDNS_BUFSIZE), args.dnssec);
    }
    Ok(query)
}

/// Sends `query` to every nameserver at once, collecting the results
/// in a single sink, and prints each response as it arrives. Returns
/// whether any response matched the query.
fn query_all(
    query: &Message,
    nameservers: &[SocketAddr],
    config: &ResolverConfig,
    exchange_config: &ExchangeConfig,
) -> Result<bool> {
    let timeout = Duration::from_secs(config.options.timeout);
    let (sink, receiver) = mpsc::channel();
    for &nameserver in nameservers {
        let socket = connect(nameserver, timeout)
            .with_context(|| format!("failed to set up a socket for {}", nameserver))?;
        query
            .exchange_into(socket, exchange_config, sink.clone())
            .with_context(|| format!("failed to start the exchange with {}", nameserver))?;
    }
    drop(sink);

    let mut answered = false;
    for result in receiver {
        match result {
            Ok(response) if response.header.id != query.header.id => {
                warn!(
                    "Discarding a response with ID {} (expected {}).",
                    response.header.id, query.header.id
                );
            }
            Ok(response) => {
                println!("{}", response);
                answered = true;
            }
            Err(e) => warn!("{}", e),
        }
    }
    Ok(answered)
}

fn connect(nameserver: SocketAddr, timeout: Duration) -> std::io::Result<UdpSocket> {
    let local: SocketAddr = if nameserver.is_ipv4() {
        ([0u8; 4], 0).into()
    } else {
        ([0u16; 8], 0).into()
    };
    let socket = UdpSocket::bind(local)?;
    socket.connect(nameserver)?;
    socket.set_read_timeout(Some(timeout))?;
    Ok(socket)
}
