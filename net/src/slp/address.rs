use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Port a Java edition server listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 25565;

/// Host and port of the server to ping.
///
/// Deserializes from either `"host[:port]"` or `{ host, port }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "AddressRepr")]
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AddressRepr {
    Text(String),
    Fields {
        host: String,
        #[serde(default = "default_port")]
        port: u16,
    },
}

impl TryFrom<AddressRepr> for ServerAddress {
    type Error = AddressError;

    fn try_from(repr: AddressRepr) -> Result<Self, Self::Error> {
        match repr {
            AddressRepr::Text(text) => Self::parse(&text),
            AddressRepr::Fields { host, port } => Ok(Self::new(host, port)),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,
    #[error("missing closing bracket in IPv6 address")]
    MissingClosingBracket,
    #[error("unexpected text after IPv6 address")]
    TrailingGarbage,
    #[error("IPv6 addresses need brackets when a port is given")]
    Ipv6RequiresBrackets,
    #[error("invalid port: {0}")]
    InvalidPort(#[from] std::num::ParseIntError),
}

impl ServerAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn with_default_port(host: impl Into<String>) -> Self {
        Self::new(host, DEFAULT_PORT)
    }

    /// Parses `host`, `host:port`, `[v6]` or `[v6]:port`.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AddressError::Empty);
        }

        if let Some(bracketed) = s.strip_prefix('[') {
            let close = bracketed
                .find(']')
                .ok_or(AddressError::MissingClosingBracket)?;
            let host = &bracketed[..close];
            if host.is_empty() {
                return Err(AddressError::Empty);
            }
            let rest = &bracketed[close + 1..];
            let port = if rest.is_empty() {
                DEFAULT_PORT
            } else {
                rest.strip_prefix(':')
                    .ok_or(AddressError::TrailingGarbage)?
                    .parse::<u16>()?
            };
            return Ok(Self::new(host, port));
        }

        match s.matches(':').count() {
            0 => Ok(Self::with_default_port(s)),
            1 => {
                let (host, port) = s.split_once(':').ok_or(AddressError::Empty)?;
                if host.is_empty() {
                    return Err(AddressError::Empty);
                }
                Ok(Self::new(host, port.parse::<u16>()?))
            }
            // Bare IPv6 literal without a port.
            _ if s.parse::<std::net::Ipv6Addr>().is_ok() => Ok(Self::with_default_port(s)),
            _ => Err(AddressError::Ipv6RequiresBrackets),
        }
    }
}

impl FromStr for ServerAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_forms() {
        assert_eq!(
            ServerAddress::parse("mc.example.org").unwrap(),
            ServerAddress::new("mc.example.org", 25565)
        );
        assert_eq!(
            ServerAddress::parse(" sc3.example.com:683 ").unwrap(),
            ServerAddress::new("sc3.example.com", 683)
        );
        assert_eq!(
            ServerAddress::parse("[::1]:25570").unwrap(),
            ServerAddress::new("::1", 25570)
        );
        assert_eq!(
            ServerAddress::parse("[::1]").unwrap(),
            ServerAddress::new("::1", 25565)
        );
        assert_eq!(
            ServerAddress::parse("fe80::1").unwrap(),
            ServerAddress::new("fe80::1", 25565)
        );
    }

    #[test]
    fn rejects_bad_addresses() {
        assert_eq!(ServerAddress::parse("  "), Err(AddressError::Empty));
        assert_eq!(ServerAddress::parse(":25565"), Err(AddressError::Empty));
        assert_eq!(
            ServerAddress::parse("[::1"),
            Err(AddressError::MissingClosingBracket)
        );
        assert_eq!(
            ServerAddress::parse("[::1]x"),
            Err(AddressError::TrailingGarbage)
        );
        assert!(matches!(
            ServerAddress::parse("host:70000"),
            Err(AddressError::InvalidPort(_))
        ));
        assert_eq!(
            ServerAddress::parse("a:b:c"),
            Err(AddressError::Ipv6RequiresBrackets)
        );
    }

    #[test]
    fn deserializes_from_text_or_fields() {
        let text: ServerAddress = serde_json::from_str(r#""mc.example.org:683""#).unwrap();
        assert_eq!(text, ServerAddress::new("mc.example.org", 683));

        let fields: ServerAddress = serde_json::from_str(r#"{"host":"mc.example.org"}"#).unwrap();
        assert_eq!(fields, ServerAddress::new("mc.example.org", 25565));

        assert!(serde_json::from_str::<ServerAddress>(r#""host:70000""#).is_err());
    }

    #[test]
    fn display_brackets_ipv6() {
        assert_eq!(ServerAddress::new("::1", 1).to_string(), "[::1]:1");
        assert_eq!(ServerAddress::new("localhost", 2).to_string(), "localhost:2");
    }
}
