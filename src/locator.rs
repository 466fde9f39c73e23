// Copyright (C) 2018 Stephane Raux. Distributed under the MIT license.

use crate::{Client, Config, Error, ErrorKind, ProtocolGeneric, ProtocolYandex,
    Request, Response, YANDEX};
use crate::protocol::Protocol;
use url::Url;

/// Something that turns a radio environment into a position.
pub trait Locator {
    /// Resolves `req` with one blocking round trip. `req` is left untouched.
    fn get(&self, req: &Request) -> Result<Response, Error>;
}

/// One of the supported services, selected by [`new`].
#[derive(Debug)]
pub struct GeoLocator {
    inner: AnyLocator,
}

#[derive(Debug)]
enum AnyLocator {
    Generic(Client<ProtocolGeneric>),
    Yandex(Client<ProtocolYandex>),
}

impl GeoLocator {
    /// Yandex Locator reached at `endpoint` instead of [`YANDEX`].
    pub fn yandex_at(endpoint: &str, api_key: &str, config: Config)
        -> Result<Self, Error>
    {
        let url = parse_service_url(endpoint)?;
        let client = Client::new(ProtocolYandex::new(url, api_key), config);
        Ok(GeoLocator {inner: AnyLocator::Yandex(client)})
    }

    /// Endpoint requests are posted to.
    pub fn service(&self) -> &str {
        match &self.inner {
            AnyLocator::Generic(client) => client.protocol().url(),
            AnyLocator::Yandex(client) => client.protocol().url(),
        }
    }

    pub fn config(&self) -> &Config {
        match &self.inner {
            AnyLocator::Generic(client) => client.config(),
            AnyLocator::Yandex(client) => client.config(),
        }
    }
}

impl Locator for GeoLocator {
    fn get(&self, req: &Request) -> Result<Response, Error> {
        match &self.inner {
            AnyLocator::Generic(client) => client.get(req),
            AnyLocator::Yandex(client) => client.get(req),
        }
    }
}

/// Builds a locator for `service` with the default [`Config`].
///
/// `service` is either [`YANDEX`] or the URL of a service speaking the common
/// geolocation schema, such as [`MOZILLA`](crate::MOZILLA) or
/// [`GOOGLE`](crate::GOOGLE). A non-empty `api_key` is passed to the latter
/// as the `key` query parameter.
pub fn new(service: &str, api_key: &str) -> Result<GeoLocator, Error> {
    with_config(service, api_key, Config::default())
}

/// Same as [`new`] with explicit settings.
pub fn with_config(service: &str, api_key: &str, config: Config)
    -> Result<GeoLocator, Error>
{
    if service == YANDEX {
        return GeoLocator::yandex_at(YANDEX, api_key, config);
    }
    let mut url = parse_service_url(service)?;
    if !api_key.is_empty() {
        url.query_pairs_mut().append_pair("key", api_key);
    }
    let client = Client::new(ProtocolGeneric::new(url), config);
    Ok(GeoLocator {inner: AnyLocator::Generic(client)})
}

fn parse_service_url(service: &str) -> Result<Url, Error> {
    let url = Url::parse(service)
        .map_err(|e| Error::new(ErrorKind::InvalidConfiguration, e))?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        _ => Err(Error::new(ErrorKind::InvalidConfiguration,
            format!("not an HTTP service URL: {}", service))),
    }
}
