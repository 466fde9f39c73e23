// Copyright (C) 2018 Stephane Raux. Distributed under the MIT license.

use crate::{Config, Error, ErrorKind, Protocol, Request, Response};
use futures::{Future, Stream};
use hyper::{Chunk, StatusCode};
use hyper_tls::HttpsConnector;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::current_thread::Runtime;
use tokio::timer::Timeout;

/// Longest deadline handed to the timer; beyond it a call runs unbounded.
const MAX_TIMEOUT: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Runs one blocking round trip per call. Nothing is kept between calls, so a
/// client can be shared by several threads.
#[derive(Debug)]
pub(crate) struct Client<P> {
    protocol: Arc<P>,
    config: Config,
}

impl<P: Protocol + Send + Sync + 'static> Client<P> {
    pub(crate) fn new(protocol: P, config: Config) -> Self {
        let protocol = Arc::new(protocol);
        Client {protocol, config}
    }

    pub(crate) fn protocol(&self) -> &P {
        &self.protocol
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn get(&self, req: &Request) -> Result<Response, Error> {
        tracing::debug!(
            service = self.protocol.url(),
            cells = req.cell_towers.len(),
            wifis = req.wifi_access_points.len(),
            "sending geolocation request"
        );
        let request = self.protocol.request(req, &self.config)?;
        let mut runtime = Runtime::new()
            .map_err(|e| Error::new(ErrorKind::Transport, e))?;
        runtime.block_on(futures::future::lazy(|| self.exchange(request)))
    }

    fn exchange(&self, request: hyper::Request<hyper::Body>)
        -> Box<dyn Future<Item = Response, Error = Error>>
    {
        let connector = match HttpsConnector::new(1) {
            Ok(connector) => connector,
            Err(e) => return Box::new(futures::future::err(e.into())),
        };
        let client = hyper::Client::builder()
            .build::<_, hyper::Body>(connector);
        let proto = self.protocol.clone();
        let config = self.config.clone();
        let timeout = self.config.request_timeout;
        let exchange = client.request(request)
            .and_then(|resp| {
                let status = resp.status();
                resp.into_body().concat2().map(move |body| (status, body))
            });
        let exchange: Box<dyn Future<Item = (StatusCode, Chunk), Error = Error>> =
            match deadline(timeout) {
                Some(deadline) => Box::new(Timeout::new_at(exchange, deadline)
                    .map_err(move |e| {
                        if e.is_elapsed() {
                            Error::new(ErrorKind::Transport,
                                format!("no response within {:?}", timeout))
                        } else if let Some(e) = e.into_inner() {
                            e.into()
                        } else {
                            Error::new(ErrorKind::Transport, "timer failure")
                        }
                    })),
                None => {
                    tracing::debug!(?timeout, "timeout too large, not enforced");
                    Box::new(exchange.from_err())
                }
            };
        let response = exchange
            .and_then(move |(status, body)| {
                tracing::debug!(service = proto.url(), %status,
                    "received geolocation response");
                proto.parse(status, &body, &config)
            });
        Box::new(response)
    }
}

fn deadline(timeout: Duration) -> Option<Instant> {
    if timeout > MAX_TIMEOUT {
        return None;
    }
    Instant::now().checked_add(timeout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_follows_timeout() {
        let before = Instant::now();
        let at = deadline(Duration::from_secs(10)).unwrap();
        assert!(at >= before + Duration::from_secs(10));
    }

    #[test]
    fn huge_timeout_has_no_deadline() {
        assert!(deadline(Duration::from_secs(u64::MAX)).is_none());
        assert!(deadline(MAX_TIMEOUT + Duration::from_secs(1)).is_none());
    }
}
