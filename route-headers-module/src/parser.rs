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

//! Compilation of header directives and their application to header maps

use http::{HeaderMap, HeaderName};
use log::trace;

use crate::configuration::HeaderDirective;
use crate::error::ConfigurationError;
use crate::formatter::HeaderFormatter;
use crate::variables::RequestInfo;

fn header_name(key: &str) -> Result<HeaderName, ConfigurationError> {
    HeaderName::try_from(key).map_err(|_| ConfigurationError::InvalidHeaderName(key.to_owned()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HeaderToAdd {
    name: HeaderName,
    formatter: HeaderFormatter,
    append: bool,
}

/// Compiled list of header modifications, applied to every request or response of a route
///
/// Once compiled, the list doesn’t change and can be shared between any number of concurrent
/// requests. Applying it never fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderParser {
    headers_to_add: Vec<HeaderToAdd>,
    headers_to_remove: Vec<HeaderName>,
}

impl HeaderParser {
    /// Compiles the headers to be added and removed.
    ///
    /// Any invalid value makes the entire configuration fail. Directive order is preserved.
    pub fn configure<S>(
        headers_to_add: &[HeaderDirective],
        headers_to_remove: &[S],
    ) -> Result<Self, ConfigurationError>
    where
        S: AsRef<str>,
    {
        let headers_to_add = headers_to_add
            .iter()
            .map(|directive| {
                Ok(HeaderToAdd {
                    name: header_name(&directive.key)?,
                    formatter: HeaderFormatter::try_from(directive.value.as_str())?,
                    append: directive.append,
                })
            })
            .collect::<Result<Vec<_>, ConfigurationError>>()?;

        let headers_to_remove = headers_to_remove
            .iter()
            .map(|key| header_name(key.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let parser = Self {
            headers_to_add,
            headers_to_remove,
        };
        trace!("Compiled header directives: {parser:?}");
        Ok(parser)
    }

    /// Returns `true` if applying this has no effect.
    pub fn is_empty(&self) -> bool {
        self.headers_to_add.is_empty() && self.headers_to_remove.is_empty()
    }

    /// Applies header modifications to the given header map.
    ///
    /// Removals run first, so they never affect headers added here. Headers are then added in the
    /// configured order: appending headers keep existing values, non-appending headers replace
    /// them.
    pub fn evaluate_headers(&self, headers: &mut HeaderMap, info: &dyn RequestInfo) {
        for name in &self.headers_to_remove {
            headers.remove(name);
        }

        for header in &self.headers_to_add {
            let value = header.formatter.format_value(info);
            trace!(
                "Adding header {}: {value:?} (append: {})",
                header.name,
                header.append
            );
            if header.append {
                headers.append(&header.name, value);
            } else {
                headers.insert(&header.name, value);
            }
        }
    }
}
