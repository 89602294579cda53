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

//! Custom deserialization code for the configuration

use serde::de::{Deserialize, Deserializer, Error as _, MapAccess, Visitor};

use crate::configuration::HeaderDirective;

const KEY_FIELD: &str = "key";
const VALUE_FIELD: &str = "value";
const APPEND_FIELD: &str = "append";
const HEADER_FIELD: &str = "header";
const FIELDS: &[&str] = &[KEY_FIELD, VALUE_FIELD, APPEND_FIELD, HEADER_FIELD];

/// Nested `header` entry, `{key, value}`
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct KeyValue {
    key: String,
    value: String,
}

fn set_once<T, E: serde::de::Error>(
    target: &mut Option<T>,
    field: &'static str,
    value: T,
) -> Result<(), E> {
    if target.is_some() {
        return Err(E::duplicate_field(field));
    }
    *target = Some(value);
    Ok(())
}

impl<'de> Deserialize<'de> for HeaderDirective {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DirectiveVisitor;

        impl<'de> Visitor<'de> for DirectiveVisitor {
            type Value = HeaderDirective;

            fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                formatter.write_str("header directive with key and value")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut key = None;
                let mut value = None;
                let mut append = None;
                while let Some(field) = map.next_key::<String>()? {
                    match field.as_str() {
                        KEY_FIELD => set_once(&mut key, KEY_FIELD, map.next_value()?)?,
                        VALUE_FIELD => set_once(&mut value, VALUE_FIELD, map.next_value()?)?,
                        APPEND_FIELD => set_once(&mut append, APPEND_FIELD, map.next_value()?)?,
                        HEADER_FIELD => {
                            let header: KeyValue = map.next_value()?;
                            set_once(&mut key, KEY_FIELD, header.key)?;
                            set_once(&mut value, VALUE_FIELD, header.value)?;
                        }
                        other => return Err(A::Error::unknown_field(other, FIELDS)),
                    }
                }

                Ok(HeaderDirective {
                    key: key.ok_or_else(|| A::Error::missing_field(KEY_FIELD))?,
                    value: value.ok_or_else(|| A::Error::missing_field(VALUE_FIELD))?,
                    append: append.unwrap_or(true),
                })
            }
        }

        deserializer.deserialize_map(DirectiveVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    fn parse(yaml: &str) -> Result<HeaderDirective, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    #[test]
    fn flat() {
        assert_eq!(
            parse("{key: x-client-ip, value: \"%CLIENT_IP%\"}").unwrap(),
            HeaderDirective::new("x-client-ip", "%CLIENT_IP%")
        );
        assert_eq!(
            parse("{key: static-header, value: static-value, append: false}").unwrap(),
            HeaderDirective::new("static-header", "static-value").with_append(false)
        );
    }

    #[test]
    fn nested() {
        assert_eq!(
            parse(
                r#"
                    header:
                        key: x-client-ip
                        value: "%CLIENT_IP%"
                    append: false
                "#
            )
            .unwrap(),
            HeaderDirective::new("x-client-ip", "%CLIENT_IP%").with_append(false)
        );
        assert_eq!(
            parse("{header: {key: x-a, value: a}}").unwrap(),
            HeaderDirective::new("x-a", "a")
        );
    }

    #[test]
    fn errors() {
        let err = parse("{key: x-a}").unwrap_err().to_string();
        assert!(err.contains("missing field `value`"), "{err}");

        let err = parse("{value: a}").unwrap_err().to_string();
        assert!(err.contains("missing field `key`"), "{err}");

        let err = parse("{key: x-a, value: a, header: {key: x-b, value: b}}")
            .unwrap_err()
            .to_string();
        assert!(err.contains("duplicate field `key`"), "{err}");

        let err = parse("{key: x-a, value: a, whatever: true}")
            .unwrap_err()
            .to_string();
        assert!(err.contains("unknown field `whatever`"), "{err}");

        assert!(parse("{header: {key: x-a, value: a, append: true}}").is_err());
        assert!(parse("x-a: a").is_err());
    }
}
