// Copyright (C) 2018 Stephane Raux. Distributed under the MIT license.

use serde::{Deserializer, Serializer};
use serde_derive::{Deserialize, Serialize};
use std::io::Read;
use std::time::Duration;

/// Settings bound to a locator when it is built.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Config {
    /// Wall-clock limit for one round trip, in seconds when serialized.
    #[serde(
        default = "Config::default_timeout",
        deserialize_with = "deserialize_secs",
        serialize_with = "serialize_secs"
    )]
    pub request_timeout: Duration,
    /// Never ask for, nor accept, positions derived from the IP address.
    #[serde(default = "Config::default_ignore_ip_method")]
    pub ignore_ip_method: bool,
}

impl Config {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    fn default_timeout() -> Duration {
        Self::DEFAULT_TIMEOUT
    }

    fn default_ignore_ip_method() -> bool {
        true
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn ignore_ip_method(mut self, ignore: bool) -> Self {
        self.ignore_ip_method = ignore;
        self
    }

    pub fn from_config<R: Read>(config: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            request_timeout: Self::default_timeout(),
            ignore_ip_method: Self::default_ignore_ip_method(),
        }
    }
}

fn deserialize_secs<'de, D>(input: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = <f64 as serde::Deserialize>::deserialize(input)?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(serde::de::Error::custom(
            "request_timeout must be a non-negative number of seconds"));
    }
    let whole = secs.trunc();
    Ok(Duration::new(whole as u64, ((secs - whole) * 1e9) as u32))
}

fn serialize_secs<S>(timeout: &Duration, out: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let secs = timeout.as_secs() as f64
        + f64::from(timeout.subsec_nanos()) / 1e9;
    out.serialize_f64(secs)
}
