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

#![doc = include_str!("../README.md")]

use clap::Parser;
use http::{HeaderMap, HeaderName, HeaderValue};
use log::{error, info};
use route_headers_module::variables::{self, ConnectionInfo, Protocol};
use route_headers_module::{RouteHeadersConf, RouteHeadersHandler};
use std::net::IpAddr;
use std::path::PathBuf;
use std::process::ExitCode;

/// Check route header configuration and show its effect on a set of headers
#[derive(Debug, Parser)]
struct Opt {
    /// Configuration file to load (can be specified multiple times, files are merged in order)
    #[clap(long, num_args = 1.., required_unless_present = "list_variables")]
    conf: Vec<PathBuf>,

    /// Address of the client the request is received from
    #[clap(long, default_value = "127.0.0.1")]
    client_ip: IpAddr,

    /// Protocol negotiated with the client: HTTP/1.0, HTTP/1.1 or HTTP/2 (omit if unknown)
    #[clap(long)]
    protocol: Option<Protocol>,

    /// Local address the request is received on (omit if unknown)
    #[clap(long)]
    local_address: Option<String>,

    /// Existing header in the format NAME:VALUE (can be specified multiple times)
    #[clap(long = "header", value_parser = parse_header)]
    headers: Vec<(HeaderName, HeaderValue)>,

    /// Apply response header directives instead of request header directives
    #[clap(long)]
    response: bool,

    /// List supported variables and exit
    #[clap(long)]
    list_variables: bool,
}

impl Opt {
    fn connection_info(&self) -> ConnectionInfo {
        let mut info = ConnectionInfo::from(self.client_ip);
        if let Some(protocol) = self.protocol {
            info = info.with_protocol(protocol);
        }
        if let Some(local_address) = &self.local_address {
            info = info.with_local_address(local_address.as_str());
        }
        info
    }

    fn header_map(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            headers.append(name, value.clone());
        }
        headers
    }
}

fn parse_header(header: &str) -> Result<(HeaderName, HeaderValue), String> {
    let (name, value) = header
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:VALUE, got {header:?}"))?;
    let name = HeaderName::try_from(name.trim())
        .map_err(|err| format!("invalid header name {name:?}: {err}"))?;
    let value = HeaderValue::try_from(value.trim())
        .map_err(|err| format!("invalid header value {value:?}: {err}"))?;
    Ok((name, value))
}

fn main() -> ExitCode {
    env_logger::init();

    let opt = Opt::parse();

    if opt.list_variables {
        for name in variables::supported() {
            println!("{name}");
        }
        return ExitCode::SUCCESS;
    }

    let handler = match RouteHeadersConf::load_from_files(&opt.conf)
        .and_then(RouteHeadersHandler::try_from)
    {
        Ok(handler) => handler,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };
    info!("Configuration is valid");

    let info = opt.connection_info();
    let mut headers = opt.header_map();
    if opt.response {
        handler.evaluate_response_headers(&mut headers, &info);
    } else {
        handler.evaluate_request_headers(&mut headers, &info);
    }

    for (name, value) in &headers {
        println!("{name}: {}", String::from_utf8_lossy(value.as_bytes()));
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn header_parsing() {
        let (name, value) = parse_header("X-Forwarded-For: 192.0.2.1").unwrap();
        assert_eq!(name, "x-forwarded-for");
        assert_eq!(value, "192.0.2.1");

        let (name, value) = parse_header("x-empty:").unwrap();
        assert_eq!(name, "x-empty");
        assert_eq!(value, "");

        let (_, value) = parse_header("x-time: 12:30").unwrap();
        assert_eq!(value, "12:30");

        assert!(parse_header("no colon").is_err());
        assert!(parse_header("bad name: value").is_err());
    }

    #[test]
    fn options() {
        let opt = Opt::try_parse_from([
            "route-headers-check",
            "--conf",
            "a.yaml",
            "b.yaml",
            "--protocol",
            "HTTP/2",
            "--header",
            "x-a: 1",
            "--header",
            "x-a: 2",
            "--response",
        ])
        .unwrap();
        assert_eq!(
            opt.conf,
            vec![PathBuf::from("a.yaml"), PathBuf::from("b.yaml")]
        );
        assert!(opt.response);
        assert_eq!(
            opt.connection_info(),
            ConnectionInfo::new("127.0.0.1").with_protocol(Protocol::Http2)
        );
        assert_eq!(opt.header_map().get_all("x-a").iter().count(), 2);

        assert!(Opt::try_parse_from(["route-headers-check"]).is_err());
        assert!(Opt::try_parse_from(["route-headers-check", "--list-variables"]).is_ok());
        assert!(
            Opt::try_parse_from(["route-headers-check", "--conf", "a.yaml", "--protocol", "SPDY"])
                .is_err()
        );
    }
}
