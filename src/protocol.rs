// Copyright (C) 2018 Stephane Raux. Distributed under the MIT license.

mod generic;
mod yandex;

pub(crate) use self::generic::ProtocolGeneric;
pub(crate) use self::yandex::ProtocolYandex;

use crate::{Config, Error, Request, Response};
use hyper::{Body, StatusCode};

pub(crate) trait Protocol {
    /// Endpoint the request is posted to.
    fn url(&self) -> &str;
    fn request(&self, req: &Request, config: &Config)
        -> Result<hyper::Request<Body>, Error>;
    fn parse(&self, status: StatusCode, body: &[u8], config: &Config)
        -> Result<Response, Error>;
}
