// Copyright 2024 Wladimir Palant
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Variables that header values can refer to, resolved from request information.
//!
//! A header value like `%CLIENT_IP%` refers to a variable. Variables are looked up in a fixed
//! registry when the configuration is compiled, the resolver function is then called for every
//! request.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

/// HTTP protocol negotiated with the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// HTTP/1.0
    Http10,
    /// HTTP/1.1
    Http11,
    /// HTTP/2
    Http2,
}

impl Protocol {
    /// Returns protocol name as used in header values, e.g. `HTTP/1.1`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http10 => "HTTP/1.0",
            Self::Http11 => "HTTP/1.1",
            Self::Http2 => "HTTP/2",
        }
    }
}

impl Display for Protocol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HTTP/1.0" => Ok(Self::Http10),
            "HTTP/1.1" => Ok(Self::Http11),
            "HTTP/2" | "HTTP/2.0" => Ok(Self::Http2),
            other => Err(format!(
                "unknown protocol {other}, expected HTTP/1.0, HTTP/1.1 or HTTP/2"
            )),
        }
    }
}

impl TryFrom<http::Version> for Protocol {
    type Error = http::Version;

    fn try_from(version: http::Version) -> Result<Self, Self::Error> {
        match version {
            http::Version::HTTP_10 => Ok(Self::Http10),
            http::Version::HTTP_11 => Ok(Self::Http11),
            http::Version::HTTP_2 => Ok(Self::Http2),
            other => Err(other),
        }
    }
}

/// Request facts that variables are resolved from
///
/// The information is only ever read. Implementations are provided by the code running the
/// request, [`ConnectionInfo`] is a plain implementation holding the values.
pub trait RequestInfo {
    /// Address of the downstream peer (the client), without the port
    fn downstream_address(&self) -> &str;

    /// The protocol negotiated with the client, `None` if not known yet
    fn protocol(&self) -> Option<Protocol>;

    /// Local address the request was received on, if known
    fn local_address(&self) -> Option<&str> {
        None
    }
}

/// Request information for a single connection
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// Address of the downstream peer
    pub downstream_address: String,
    /// Local address the connection was accepted on
    pub local_address: Option<String>,
    /// Negotiated protocol
    pub protocol: Option<Protocol>,
}

impl ConnectionInfo {
    /// Creates connection information for the given peer address
    pub fn new(downstream_address: impl Into<String>) -> Self {
        Self {
            downstream_address: downstream_address.into(),
            ..Default::default()
        }
    }

    /// Sets the negotiated protocol
    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    /// Sets the local address
    pub fn with_local_address(mut self, local_address: impl Into<String>) -> Self {
        self.local_address = Some(local_address.into());
        self
    }
}

impl From<IpAddr> for ConnectionInfo {
    fn from(addr: IpAddr) -> Self {
        Self::new(addr.to_string())
    }
}

impl From<SocketAddr> for ConnectionInfo {
    fn from(addr: SocketAddr) -> Self {
        addr.ip().into()
    }
}

impl RequestInfo for ConnectionInfo {
    fn downstream_address(&self) -> &str {
        &self.downstream_address
    }

    fn protocol(&self) -> Option<Protocol> {
        self.protocol
    }

    fn local_address(&self) -> Option<&str> {
        self.local_address.as_deref()
    }
}

/// Function producing the value of a variable from request information
pub type Resolver = fn(&dyn RequestInfo) -> Option<String>;

fn client_ip(info: &dyn RequestInfo) -> Option<String> {
    Some(info.downstream_address().to_owned())
}

fn protocol(info: &dyn RequestInfo) -> Option<String> {
    info.protocol().map(|protocol| protocol.as_str().to_owned())
}

fn local_address(info: &dyn RequestInfo) -> Option<String> {
    info.local_address().map(ToOwned::to_owned)
}

const VARIABLES: &[(&str, Resolver)] = &[
    ("CLIENT_IP", client_ip),
    ("DOWNSTREAM_REMOTE_ADDRESS_WITHOUT_PORT", client_ip),
    ("DOWNSTREAM_LOCAL_ADDRESS", local_address),
    ("PROTOCOL", protocol),
];

static REGISTRY: Lazy<HashMap<&'static str, Resolver>> =
    Lazy::new(|| VARIABLES.iter().copied().collect());

/// Looks up the resolver for a variable name
pub fn lookup(name: &str) -> Option<Resolver> {
    REGISTRY.get(name).copied()
}

/// Lists the names of all supported variables
pub fn supported() -> impl Iterator<Item = &'static str> {
    VARIABLES.iter().map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    fn resolve(name: &str, info: &dyn RequestInfo) -> Option<String> {
        lookup(name).unwrap()(info)
    }

    #[test]
    fn client_ip_variable() {
        let info = ConnectionInfo::new("127.0.0.1");
        assert_eq!(resolve("CLIENT_IP", &info).as_deref(), Some("127.0.0.1"));
        assert_eq!(
            resolve("DOWNSTREAM_REMOTE_ADDRESS_WITHOUT_PORT", &info).as_deref(),
            Some("127.0.0.1")
        );
    }

    #[test]
    fn protocol_variable() {
        let info = ConnectionInfo::new("127.0.0.1");
        assert_eq!(resolve("PROTOCOL", &info), None);

        let info = info.with_protocol(Protocol::Http11);
        assert_eq!(resolve("PROTOCOL", &info).as_deref(), Some("HTTP/1.1"));

        let info = info.with_protocol(Protocol::Http2);
        assert_eq!(resolve("PROTOCOL", &info).as_deref(), Some("HTTP/2"));
    }

    #[test]
    fn local_address_variable() {
        let info = ConnectionInfo::new("127.0.0.1");
        assert_eq!(resolve("DOWNSTREAM_LOCAL_ADDRESS", &info), None);

        let info = info.with_local_address("10.0.0.1");
        assert_eq!(
            resolve("DOWNSTREAM_LOCAL_ADDRESS", &info).as_deref(),
            Some("10.0.0.1")
        );
    }

    #[test]
    fn unknown_variable() {
        assert!(lookup("INVALID_VARIABLE").is_none());
        assert!(lookup("client_ip").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn supported_variables() {
        let names: Vec<_> = supported().collect();
        assert!(names.contains(&"CLIENT_IP"));
        assert!(names.contains(&"PROTOCOL"));
        for name in names {
            assert!(lookup(name).is_some());
        }
    }

    #[test]
    fn protocol_conversions() {
        assert_eq!("HTTP/1.0".parse::<Protocol>(), Ok(Protocol::Http10));
        assert_eq!("HTTP/2.0".parse::<Protocol>(), Ok(Protocol::Http2));
        assert!("SPDY/3".parse::<Protocol>().is_err());

        assert_eq!(Protocol::try_from(http::Version::HTTP_11), Ok(Protocol::Http11));
        assert_eq!(
            Protocol::try_from(http::Version::HTTP_3),
            Err(http::Version::HTTP_3)
        );
        assert_eq!(Protocol::Http2.to_string(), "HTTP/2");
    }

    #[test]
    fn connection_from_socket_addr() {
        let info = ConnectionInfo::from("[::1]:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(info.downstream_address(), "::1");
        assert_eq!(info.protocol(), None);
    }
}
