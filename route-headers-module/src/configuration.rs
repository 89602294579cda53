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

//! Structures required to deserialize Route Headers Module configuration from YAML configuration
//! files.

use log::trace;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt::Debug;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::ConfigurationError;

/// A single header to be added
///
/// The value is either a literal or a variable reference like `%CLIENT_IP%`. If `append` is
/// `false`, existing headers with the same name are replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderDirective {
    /// Header name
    pub key: String,
    /// Raw header value as configured
    pub value: String,
    /// If `true`, existing values of the header are kept
    pub append: bool,
}

impl HeaderDirective {
    /// Creates a directive appending the header
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            append: true,
        }
    }

    /// Changes the append mode of the directive
    pub fn with_append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }
}

/// Header configuration of a route
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouteHeadersConf {
    /// Headers to be added to the request before it is passed on
    pub request_headers_to_add: Vec<HeaderDirective>,
    /// Request headers to be removed
    pub request_headers_to_remove: Vec<String>,
    /// Headers to be added to the response before it is sent to the client
    pub response_headers_to_add: Vec<HeaderDirective>,
    /// Response headers to be removed
    pub response_headers_to_remove: Vec<String>,
}

impl RouteHeadersConf {
    /// Merges two configurations. Directives from `other` are applied after the existing ones.
    pub fn merge_with(&mut self, other: Self) {
        self.request_headers_to_add
            .extend(other.request_headers_to_add);
        self.request_headers_to_remove
            .extend(other.request_headers_to_remove);
        self.response_headers_to_add
            .extend(other.response_headers_to_add);
        self.response_headers_to_remove
            .extend(other.response_headers_to_remove);
    }

    /// Loads and merges configuration from a number of YAML files, in the order given.
    pub fn load_from_files<P>(paths: &[P]) -> Result<Self, ConfigurationError>
    where
        P: AsRef<Path>,
    {
        let mut conf = Self::default();
        for path in paths {
            conf.merge_with(Self::load_from_yaml(path)?);
        }
        Ok(conf)
    }
}

/// Trait for configuration structures that can be loaded from YAML. This trait has a blanket
/// implementation for any structure implementing [`serde::Deserialize`].
pub trait FromYaml {
    /// Parses configuration from a YAML string.
    fn from_yaml(yaml: impl AsRef<str>) -> Result<Self, ConfigurationError>
    where
        Self: Sized;

    /// Loads configuration from a YAML file.
    fn load_from_yaml<P>(path: P) -> Result<Self, ConfigurationError>
    where
        P: AsRef<Path>,
        Self: Sized;
}

impl<D> FromYaml for D
where
    D: DeserializeOwned + Debug,
{
    fn from_yaml(yaml: impl AsRef<str>) -> Result<Self, ConfigurationError> {
        let conf = serde_yaml::from_str(yaml.as_ref())?;
        trace!("Parsed configuration: {conf:#?}");
        Ok(conf)
    }

    fn load_from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigurationError::FileOpen {
            path: path.to_owned(),
            source,
        })?;
        let reader = BufReader::new(file);

        let conf =
            serde_yaml::from_reader(reader).map_err(|source| ConfigurationError::FileRead {
                path: path.to_owned(),
                source,
            })?;
        trace!("Loaded configuration file {}: {conf:#?}", path.display());

        Ok(conf)
    }
}
