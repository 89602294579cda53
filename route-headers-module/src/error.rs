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

//! Errors produced while loading and compiling header configuration

use std::path::PathBuf;
use thiserror::Error;

/// An error in the header configuration of a route
///
/// These errors are only produced when configuration is loaded and compiled. Applying compiled
/// configuration to a request or response never fails.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Value has the `%<variable_name>%` shape but the variable is unknown
    #[error("field '{0}' not supported as custom header")]
    UnsupportedVariable(String),

    /// Value contains `%` but is not a single `%<variable_name>%` token
    #[error(
        "Incorrect header configuration. Expected variable format %<variable_name>%, actual format {0}"
    )]
    MalformedVariable(String),

    /// Header name cannot be used in an HTTP message
    #[error("Invalid header name {0:?}")]
    InvalidHeaderName(String),

    /// Literal header value cannot be used in an HTTP message
    #[error("Invalid header value {0:?}")]
    InvalidHeaderValue(String),

    /// Configuration file could not be opened
    #[error("failed opening configuration file {}: {source}", .path.display())]
    FileOpen {
        /// Path of the configuration file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Configuration file could not be parsed
    #[error("failed reading configuration file {}: {source}", .path.display())]
    FileRead {
        /// Path of the configuration file
        path: PathBuf,
        /// Underlying parsing error
        source: serde_yaml::Error,
    },

    /// Configuration string could not be parsed
    #[error("failed parsing configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            ConfigurationError::UnsupportedVariable("INVALID_VARIABLE".to_owned()).to_string(),
            "field 'INVALID_VARIABLE' not supported as custom header"
        );
        assert_eq!(
            ConfigurationError::MalformedVariable("%CLIENT_IP".to_owned()).to_string(),
            "Incorrect header configuration. Expected variable format %<variable_name>%, actual format %CLIENT_IP"
        );
        assert_eq!(
            ConfigurationError::InvalidHeaderName("x header".to_owned()).to_string(),
            "Invalid header name \"x header\""
        );
    }
}
