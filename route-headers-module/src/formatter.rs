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

//! Compiled header values

use http::HeaderValue;
use log::warn;
use std::fmt::{Debug, Formatter};

use crate::error::ConfigurationError;
use crate::variables::{self, RequestInfo, Resolver};

const VARIABLE_DELIMITER: char = '%';

/// Determines how a header value is produced for a request
///
/// Which variant applies is decided once, when the configured value is compiled.
#[derive(Clone)]
pub enum HeaderFormatter {
    /// A fixed value
    Literal(HeaderValue),
    /// A value resolved from request information
    Dynamic {
        /// Variable name, without the `%` delimiters
        variable: String,
        /// Function resolving the variable
        resolver: Resolver,
    },
}

impl HeaderFormatter {
    /// Name of the variable for dynamic values
    pub fn variable_name(&self) -> Option<&str> {
        match self {
            Self::Literal(_) => None,
            Self::Dynamic { variable, .. } => Some(variable.as_str()),
        }
    }

    /// Produces the header value for a request. Variables not known for the request resolve to an
    /// empty string.
    pub fn format(&self, info: &dyn RequestInfo) -> String {
        match self {
            // Literals are created from strings and are always valid UTF-8
            Self::Literal(value) => String::from_utf8_lossy(value.as_bytes()).into_owned(),
            Self::Dynamic { resolver, .. } => resolver(info).unwrap_or_default(),
        }
    }

    /// Same as [`HeaderFormatter::format`] but produces a value that can go into a header map.
    ///
    /// A resolved value that isn’t allowed in HTTP headers is replaced by an empty value.
    pub fn format_value(&self, info: &dyn RequestInfo) -> HeaderValue {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Dynamic { variable, resolver } => match resolver(info) {
                Some(value) => HeaderValue::try_from(value).unwrap_or_else(|err| {
                    warn!("Variable {variable} resolved to an invalid header value: {err}");
                    HeaderValue::from_static("")
                }),
                None => HeaderValue::from_static(""),
            },
        }
    }
}

impl TryFrom<&str> for HeaderFormatter {
    type Error = ConfigurationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if !value.contains(VARIABLE_DELIMITER) {
            return HeaderValue::from_str(value)
                .map(Self::Literal)
                .map_err(|_| ConfigurationError::InvalidHeaderValue(value.to_owned()));
        }

        let variable = value
            .strip_prefix(VARIABLE_DELIMITER)
            .and_then(|value| value.strip_suffix(VARIABLE_DELIMITER))
            .filter(|name| !name.is_empty() && !name.contains(VARIABLE_DELIMITER))
            .ok_or_else(|| ConfigurationError::MalformedVariable(value.to_owned()))?;

        let resolver = variables::lookup(variable)
            .ok_or_else(|| ConfigurationError::UnsupportedVariable(variable.to_owned()))?;
        Ok(Self::Dynamic {
            variable: variable.to_owned(),
            resolver,
        })
    }
}

impl Debug for HeaderFormatter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Dynamic { variable, .. } => f.debug_tuple("Dynamic").field(variable).finish(),
        }
    }
}

// Resolvers are determined by the variable name.
impl PartialEq for HeaderFormatter {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Literal(a), Self::Literal(b)) => a == b,
            (Self::Dynamic { variable: a, .. }, Self::Dynamic { variable: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Eq for HeaderFormatter {}
