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

//! Implements the resolver configuration file.
//!
//! The file is TOML. Every field is optional:
//!
//! ```toml
//! nameservers = ["192.0.2.1", "[2001:db8::53]:53"]
//! domain = "example.com."
//!
//! [options]
//! attempts = 2
//! ndots = 1
//! timeout = 5
//! rotate = false
//! debug = false
//! ```

use std::fmt::{self, Write};
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use log::Level::Debug;
use log::{debug, log_enabled};
use paste::paste;
use serde::{de, Deserialize};

use dnswire::name::Name;

use crate::args::{Args, Nameserver, DEFAULT_PORT};

////////////////////////////////////////////////////////////////////////
// CONFIGURATION LOADING                                              //
////////////////////////////////////////////////////////////////////////

/// Loads the resolver configuration from the file given by `path`,
/// then applies the overrides given on the command line.
pub fn load_from_path(path: impl AsRef<Path>, args: &Args) -> Result<ResolverConfig> {
    let raw_config = fs::read(path.as_ref()).context("failed to read the configuration file")?;
    let config: ResolverConfig =
        toml::from_slice(&raw_config).context("failed to parse the configuration file")?;
    finish(config, args)
}

/// Builds the resolver configuration from the defaults and the command
/// line arguments alone.
pub fn load_from_args(args: &Args) -> Result<ResolverConfig> {
    finish(ResolverConfig::default(), args)
}

fn finish(mut config: ResolverConfig, args: &Args) -> Result<ResolverConfig> {
    if !args.servers.is_empty() {
        config.nameservers = args.servers.iter().map(|s| ConfigNameserver(*s)).collect();
    }
    if let Some(timeout) = args.timeout {
        config.options.timeout = timeout;
    }
    if let Some(attempts) = args.attempts {
        config.options.attempts = attempts;
    }
    config.options.debug |= args.debug;
    validate(&config)?;
    log_config_summary(&config);
    Ok(config)
}

fn validate(config: &ResolverConfig) -> Result<()> {
    if config.nameservers.is_empty() {
        bail!("no nameservers are configured");
    } else if config.options.attempts == 0 {
        bail!("the number of attempts must be positive");
    } else if config.options.timeout == 0 {
        bail!("the timeout must be positive");
    }
    Ok(())
}

/// Summarizes the configuration in the log, if the debug log level is
/// enabled.
fn log_config_summary(config: &ResolverConfig) {
    if !log_enabled!(Debug) {
        // Don't compute the message if it will never be printed.
        return;
    }

    debug!("{}", config_summary(config));
}

/// Renders the configuration for the debug log, one setting per line.
fn config_summary(config: &ResolverConfig) -> String {
    let mut message = String::from("Configuration loaded:\nNameservers: ");
    for (i, nameserver) in config.nameservers.iter().enumerate() {
        if i > 0 {
            message.push_str(", ");
        }
        let _ = write!(message, "{}", nameserver.0 .0);
    }
    let _ = write!(
        message,
        "\nDomain:      {}\nOptions:     attempts:{} ndots:{} timeout:{}",
        config
            .domain
            .as_ref()
            .map_or_else(|| "none".to_owned(), |d| d.0.to_string()),
        config.options.attempts,
        config.options.ndots,
        config.options.timeout,
    );
    if config.options.rotate {
        message.push_str(" rotate");
    }
    if config.options.debug {
        message.push_str(" debug");
    }
    message
}

////////////////////////////////////////////////////////////////////////
// CONFIGURATION FILE STRUCTURE                                       //
////////////////////////////////////////////////////////////////////////

/// The complete configuration file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolverConfig {
    #[serde(default = "default_nameservers")]
    pub nameservers: Vec<ConfigNameserver>,
    pub domain: Option<ConfigName>,
    #[serde(default)]
    pub options: ResolverOptions,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            nameservers: default_nameservers(),
            domain: None,
            options: ResolverOptions::default(),
        }
    }
}

impl ResolverConfig {
    /// Returns the socket addresses of the nameservers.
    pub fn nameserver_addrs(&self) -> Vec<SocketAddr> {
        self.nameservers.iter().map(|n| n.0 .0).collect()
    }

    /// Turns the name given on the command line into a fully qualified
    /// name. A name ending in a dot is already fully qualified. Other
    /// names are qualified with the configured domain if they have
    /// fewer than `ndots` dots, and taken as fully qualified names
    /// otherwise.
    pub fn qualify(&self, name: &str) -> Result<Name> {
        let text = if name.ends_with('.') {
            name.to_owned()
        } else {
            match self.domain {
                Some(ref domain)
                    if name.matches('.').count() < self.options.ndots as usize =>
                {
                    if domain.0.is_root() {
                        format!("{}.", name)
                    } else {
                        format!("{}.{}", name, domain.0)
                    }
                }
                _ => format!("{}.", name),
            }
        };
        text.parse()
            .map_err(|e| anyhow!("invalid domain name {}: {}", text, e))
    }
}

const DEFAULT_NAMESERVER: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

fn default_nameservers() -> Vec<ConfigNameserver> {
    vec![ConfigNameserver(Nameserver(SocketAddr::new(
        DEFAULT_NAMESERVER,
        DEFAULT_PORT,
    )))]
}

/// The `[options]` table.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverOptions {
    /// How many rounds of queries to send before giving up.
    pub attempts: u32,

    /// Names given with fewer dots than this are qualified with the
    /// configured domain.
    pub ndots: u8,

    /// How many seconds to wait for responses in each round.
    pub timeout: u64,

    /// Whether to shuffle the order in which nameservers are queried.
    pub rotate: bool,

    /// Whether to print queries as well as responses.
    pub debug: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            attempts: 2,
            ndots: 1,
            timeout: 5,
            rotate: false,
            debug: false,
        }
    }
}

////////////////////////////////////////////////////////////////////////
// WRAPPERS FOR SERDE                                                 //
////////////////////////////////////////////////////////////////////////

/// Generates a deserializable `ConfigX` structure wrapping an `X`
/// type, using its [`FromStr`](std::str::FromStr) implementation.
macro_rules! make_serde_wrapper {
    ($wrapper:ident, $over:ty, $description:literal) => {
        /// A macro-generated deserializable wrapper.
        #[derive(Clone, Debug)]
        pub struct $wrapper(pub $over);

        impl<'de> Deserialize<'de> for $wrapper {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: de::Deserializer<'de>,
            {
                deserializer.deserialize_str(paste! { [<$wrapper Visitor>] })
            }
        }

        paste! {
            /// A macro-generated [`Visitor`](de::Visitor).
            struct [<$wrapper Visitor>];
        }

        impl<'de> de::Visitor<'de> for paste! { [<$wrapper Visitor>] } {
            type Value = $wrapper;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str($description)
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value
                    .parse()
                    .map($wrapper)
                    .map_err(|e| E::custom(format!("invalid {}: {}", $description, e)))
            }
        }
    };
}

make_serde_wrapper!(ConfigName, Name, "domain name");
make_serde_wrapper!(ConfigNameserver, Nameserver, "nameserver address");

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn args(extra: &[&str]) -> Args {
        Args::try_parse_from(["dnsq", "www"].iter().chain(extra)).unwrap()
    }

    #[test]
    fn full_file_parses() {
        let config: ResolverConfig = toml::from_str(
            concat!(
                "nameservers = [\"192.0.2.1\", \"[2001:db8::53]:5353\"]\n",
                "domain = \"example.com.\"\n",
                "[options]\n",
                "attempts = 3\n",
                "rotate = true\n",
            ),
        )
        .unwrap();
        assert_eq!(
            config.nameserver_addrs(),
            [
                "192.0.2.1:53".parse::<SocketAddr>().unwrap(),
                "[2001:db8::53]:5353".parse::<SocketAddr>().unwrap(),
            ]
        );
        assert_eq!(config.options.attempts, 3);
        assert_eq!(config.options.timeout, 5);
        assert!(config.options.rotate);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(toml::from_str::<ResolverConfig>("search = [\"example.\"]").is_err());
        assert!(toml::from_str::<ResolverConfig>("[options]\ninet6 = true").is_err());
        assert!(toml::from_str::<ResolverConfig>("nameservers = [\"ns.example.\"]").is_err());
    }

    #[test]
    fn arguments_override_the_file() {
        let file: ResolverConfig = toml::from_str("nameservers = [\"192.0.2.1\"]").unwrap();
        let config = finish(file, &args(&["-s", "192.0.2.2", "--timeout", "1"])).unwrap();
        assert_eq!(config.nameserver_addrs(), ["192.0.2.2:53".parse::<SocketAddr>().unwrap()]);
        assert_eq!(config.options.timeout, 1);
        assert!(load_from_args(&args(&["--attempts", "0"])).is_err());
    }

    #[test]
    fn names_are_qualified_with_the_domain() {
        let config: ResolverConfig = toml::from_str("domain = \"example.com.\"").unwrap();
        assert_eq!(
            config.qualify("www").unwrap(),
            "www.example.com.".parse().unwrap()
        );
        assert_eq!(
            config.qualify("www.example.org").unwrap(),
            "www.example.org.".parse().unwrap()
        );
        assert_eq!(config.qualify("www.").unwrap(), "www.".parse().unwrap());
        assert!(ResolverConfig::default().qualify("a..b").is_err());
    }

    #[test]
    fn summary_has_one_setting_per_line() {
        let config: ResolverConfig = toml::from_str(concat!(
            "nameservers = [\"192.0.2.1\"]\n",
            "[options]\n",
            "rotate = true\n",
        ))
        .unwrap();
        assert_eq!(
            config_summary(&config),
            concat!(
                "Configuration loaded:\n",
                "Nameservers: 192.0.2.1:53\n",
                "Domain:      none\n",
                "Options:     attempts:2 ndots:1 timeout:5 rotate",
            )
        );
    }
}
