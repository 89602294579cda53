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

use http::HeaderMap;
use log::{debug, trace};

use crate::configuration::RouteHeadersConf;
use crate::error::ConfigurationError;
use crate::parser::HeaderParser;
use crate::variables::RequestInfo;

/// Compiled header configuration of a route
///
/// Request and response headers are handled independently, each with its own list of
/// modifications.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteHeadersHandler {
    request: HeaderParser,
    response: HeaderParser,
}

impl TryFrom<RouteHeadersConf> for RouteHeadersHandler {
    type Error = ConfigurationError;

    fn try_from(value: RouteHeadersConf) -> Result<Self, Self::Error> {
        debug!("Route headers configuration received: {value:#?}");

        let request = HeaderParser::configure(
            &value.request_headers_to_add,
            &value.request_headers_to_remove,
        )?;
        let response = HeaderParser::configure(
            &value.response_headers_to_add,
            &value.response_headers_to_remove,
        )?;

        Ok(Self { request, response })
    }
}

impl RouteHeadersHandler {
    /// Compiled modifications of request headers
    pub fn request(&self) -> &HeaderParser {
        &self.request
    }

    /// Compiled modifications of response headers
    pub fn response(&self) -> &HeaderParser {
        &self.response
    }

    /// Applies this route’s modifications to request headers. This should run before the
    /// request is passed on to the upstream server.
    pub fn evaluate_request_headers(&self, headers: &mut HeaderMap, info: &dyn RequestInfo) {
        trace!("Evaluating request headers");
        self.request.evaluate_headers(headers, info);
    }

    /// Applies this route’s modifications to response headers. This should run before the
    /// response is sent to the client.
    pub fn evaluate_response_headers(&self, headers: &mut HeaderMap, info: &dyn RequestInfo) {
        trace!("Evaluating response headers");
        self.response.evaluate_headers(headers, info);
    }
}
