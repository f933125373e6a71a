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

//! The exchange engine: one query and one response over a connected
//! UDP socket.
//!
//! An [`Exchange`] writes a query, then performs exactly one blocking
//! read, bounded by the socket's read timeout. It neither retries nor
//! checks that the response ID matches the query; both are left to the
//! caller. Exchanges started with [`Exchange::start`] run on their own
//! threads and deliver their single result into a [`Sink`]. Since a
//! sink is an [`mpsc::Sender`], one receiver can collect the results
//! of many exchanges, in the order in which they complete.

use std::fmt;
use std::io;
use std::net::UdpSocket;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use log::{debug, trace, warn};

use crate::message::{Message, HEADER_SIZE};
use crate::wire::{self, EncodeError};

/// The result that an exchange delivers.
pub type ExchangeResult = Result<Message, Error>;

/// Where exchanges deliver their results.
pub type Sink = mpsc::Sender<ExchangeResult>;

////////////////////////////////////////////////////////////////////////
// CONFIGURATION                                                      //
////////////////////////////////////////////////////////////////////////

/// Options for exchanges started through [`Message::exchange`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ExchangeConfig {
    /// The size of the buffer that the response is read into. Octets
    /// of a larger response are lost.
    pub size_hint: usize,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self { size_hint: 2000 }
    }
}

////////////////////////////////////////////////////////////////////////
// EXCHANGES                                                          //
////////////////////////////////////////////////////////////////////////

/// The progress of an [`Exchange`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum State {
    Idle,
    Sent,
    Completed,
    TimedOut,
    TransportError,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Self::Idle => "idle",
            Self::Sent => "sent",
            Self::Completed => "completed",
            Self::TimedOut => "timed out",
            Self::TransportError => "transport error",
        })
    }
}

/// A single query/response exchange over a connected socket.
#[derive(Debug)]
pub struct Exchange {
    socket: UdpSocket,
    query: Vec<u8>,
    size_hint: usize,
    state: State,
}

impl Exchange {
    pub fn new(socket: UdpSocket, query: Vec<u8>, size_hint: usize) -> Self {
        Self {
            socket,
            query,
            size_hint: size_hint.max(HEADER_SIZE),
            state: State::Idle,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Runs the exchange on a new thread, which delivers exactly one
    /// result into `sink`.
    pub fn start(
        socket: UdpSocket,
        query: Vec<u8>,
        size_hint: usize,
        sink: Sink,
    ) -> io::Result<JoinHandle<()>> {
        let mut exchange = Self::new(socket, query, size_hint);
        thread::Builder::new()
            .name("exchange".to_owned())
            .spawn(move || {
                let result = exchange.run();
                if sink.send(result).is_err() {
                    debug!("Exchange result dropped: the receiver has hung up.");
                }
            })
    }

    /// Runs the exchange on the current thread. An exchange runs at
    /// most once; running it again gives a transport error.
    pub fn run(&mut self) -> ExchangeResult {
        if self.state != State::Idle {
            return Err(Error::Transport(io::Error::new(
                io::ErrorKind::Other,
                "exchange has already run",
            )));
        }

        let peer = self
            .socket
            .peer_addr()
            .map_or_else(|_| "an unconnected peer".to_owned(), |a| a.to_string());
        debug!("Sending a {}-octet query to {}.", self.query.len(), peer);
        if let Err(e) = retry_if_interrupted(|| self.socket.send(&self.query)) {
            return Err(self.fail(&peer, e));
        }
        self.state = State::Sent;

        let mut buf = vec![0; self.size_hint];
        match retry_if_interrupted(|| self.socket.recv(&mut buf)) {
            Ok(len) => {
                self.state = State::Completed;
                debug!("Received a {}-octet response from {}.", len, peer);
                Message::decode(&buf[..len]).map_err(|e| {
                    warn!("Malformed response from {}: {}", peer, e);
                    Error::Decode(e)
                })
            }
            Err(e) => Err(self.fail(&peer, e)),
        }
    }

    fn fail(&mut self, peer: &str, e: io::Error) -> Error {
        let error = Error::from(e);
        self.state = match error {
            Error::Timeout => State::TimedOut,
            _ => State::TransportError,
        };
        warn!("Exchange with {} failed: {}", peer, error);
        trace!("Exchange state: {}", self.state);
        error
    }
}

/// Executes `f`, retrying the operation if it is interrupted.
fn retry_if_interrupted<F, R>(mut f: F) -> io::Result<R>
where
    F: FnMut() -> io::Result<R>,
{
    loop {
        match f() {
            Ok(r) => return Ok(r),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

////////////////////////////////////////////////////////////////////////
// MESSAGE CONVENIENCES                                               //
////////////////////////////////////////////////////////////////////////

impl Message {
    /// Encodes this message and exchanges it over `socket` on a new
    /// thread, returning the receiver that the result is delivered to.
    pub fn exchange(
        &self,
        socket: UdpSocket,
        config: &ExchangeConfig,
    ) -> Result<mpsc::Receiver<ExchangeResult>, Error> {
        let (sink, receiver) = mpsc::channel();
        self.exchange_into(socket, config, sink)?;
        Ok(receiver)
    }

    /// Like [`Message::exchange`], but delivers the result into an
    /// existing sink, which may be shared with other exchanges.
    pub fn exchange_into(
        &self,
        socket: UdpSocket,
        config: &ExchangeConfig,
        sink: Sink,
    ) -> Result<JoinHandle<()>, Error> {
        let query = self.encode()?;
        Ok(Exchange::start(socket, query, config.size_hint, sink)?)
    }
}

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// An error that ends an exchange.
#[derive(Debug)]
pub enum Error {
    /// The socket reported an error.
    Transport(io::Error),

    /// No response arrived before the socket's read timeout.
    Timeout,

    /// The query could not be encoded.
    Encode(EncodeError),

    /// The response could not be decoded.
    Decode(wire::Error),
}

impl Error {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport error: {}", e),
            Self::Timeout => f.write_str("timed out waiting for a response"),
            Self::Encode(e) => write!(f, "failed to encode the query: {}", e),
            Self::Decode(e) => write!(f, "failed to decode the response: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(e) => Some(e),
            Self::Timeout => None,
            Self::Encode(e) => Some(e),
            Self::Decode(e) => Some(e),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Self::Timeout,
            _ => Self::Transport(e),
        }
    }
}

impl From<EncodeError> for Error {
    fn from(e: EncodeError) -> Self {
        Self::Encode(e)
    }
}

impl From<wire::Error> for Error {
    fn from(e: wire::Error) -> Self {
        Self::Decode(e)
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
