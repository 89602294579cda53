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

//! # Route Headers Module
//!
//! This crate adds and removes HTTP headers of requests passed on by a proxy and of the responses
//! sent back to the client. Each route carries its own header configuration, selecting the route
//! for a request is up to the caller. The configuration is compiled once when it is loaded, any
//! errors in it are reported at that point. Applying compiled configuration to a request never
//! fails.
//!
//! A route configuration could look like this:
//!
//! ```yaml
//! request_headers_to_add:
//! - key: X-Client-IP
//!   value: "%CLIENT_IP%"
//!   append: false
//! - key: X-Route
//!   value: api
//! request_headers_to_remove: [Cookie]
//! response_headers_to_add:
//! - header:
//!     key: X-Protocol
//!     value: "%PROTOCOL%"
//!   append: true
//! response_headers_to_remove: [Server, X-Powered-By]
//! ```
//!
//! Headers listed under `*_headers_to_remove` are removed first, so that they never affect
//! headers added by the same configuration. Added headers are then processed in the order
//! given. If `append` is `true` (the default), existing values of the header are kept and the
//! new value is added. Otherwise existing values are replaced.
//!
//! ## Header values
//!
//! A value is either a literal string or it refers to a variable, the entire value then has to be
//! `%<variable_name>%`. Any other use of `%` in a value is a configuration error. Supported
//! variables:
//!
//! * `CLIENT_IP`: Address of the client the request was received from
//! * `DOWNSTREAM_REMOTE_ADDRESS_WITHOUT_PORT`: Same as `CLIENT_IP`
//! * `DOWNSTREAM_LOCAL_ADDRESS`: Local address the request was received on
//! * `PROTOCOL`: Protocol negotiated with the client, one of `HTTP/1.0`, `HTTP/1.1` or `HTTP/2`
//!
//! If the value of a variable isn’t known for a request, an empty header value is used.
//!
//! ## Code example
//!
//! ```rust
//! use http::HeaderMap;
//! use route_headers_module::configuration::{FromYaml, RouteHeadersConf};
//! use route_headers_module::variables::{ConnectionInfo, Protocol};
//! use route_headers_module::RouteHeadersHandler;
//!
//! let conf = RouteHeadersConf::from_yaml(
//!     r#"
//!         request_headers_to_add:
//!         - key: x-client-ip
//!           value: "%CLIENT_IP%"
//!           append: false
//!         response_headers_to_remove: [server]
//!     "#,
//! )
//! .unwrap();
//! let handler = RouteHeadersHandler::try_from(conf).unwrap();
//!
//! let info = ConnectionInfo::new("192.0.2.1").with_protocol(Protocol::Http11);
//! let mut headers = HeaderMap::new();
//! handler.evaluate_request_headers(&mut headers, &info);
//! assert_eq!(headers["x-client-ip"], "192.0.2.1");
//! ```

pub mod configuration;
mod deserialize;
pub mod error;
pub mod formatter;
mod handler;
pub mod parser;
pub mod variables;

pub use configuration::{FromYaml, HeaderDirective, RouteHeadersConf};
pub use error::ConfigurationError;
pub use formatter::HeaderFormatter;
pub use handler::RouteHeadersHandler;
pub use parser::HeaderParser;
