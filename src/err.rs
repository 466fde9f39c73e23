// Copyright (C) 2018 Stephane Raux. Distributed under the MIT license.

use hyper::StatusCode;
use serde::Serializer;
use serde::ser::SerializeSeq;
use serde_derive::Serialize;
use std::error::Error as StdError;
use std::fmt::{Display, self};

#[derive(Debug, Serialize)]
pub struct Error {
    kind: ErrorKind,
    #[serde(serialize_with = "serialize_cause")]
    cause: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new<E>(kind: ErrorKind, cause: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        let cause = Some(cause.into());
        Error {kind, cause}
    }

    pub fn kind(&self) -> &ErrorKind {&self.kind}

    /// Maps a provider HTTP status onto the error taxonomy. Only 200 counts
    /// as success.
    pub(crate) fn check_status(status: StatusCode) -> Result<(), Error> {
        match status.as_u16() {
            200 => Ok(()),
            400 => Err(ErrorKind::BadRequest.into()),
            403 => Err(ErrorKind::Forbidden.into()),
            404 => Err(ErrorKind::NotFound.into()),
            _ => {
                let text = status.canonical_reason()
                    .map_or_else(|| status.as_str().to_string(), str::to_string);
                Err(Error::new(ErrorKind::ProviderFailure, text))
            }
        }
    }

    /// Classifies the free-text error a provider embeds in its response body.
    pub(crate) fn from_provider_message(message: &str) -> Error {
        PROVIDER_MESSAGES.iter()
            .find(|(text, _)| *text == message)
            .map(|(_, kind)| Error::from(kind.clone()))
            .unwrap_or_else(|| {
                Error::new(ErrorKind::ProviderFailure, message.to_string())
            })
    }
}

// Literal messages are provider wording, matched exactly.
const PROVIDER_MESSAGES: &[(&str, ErrorKind)] = &[
    ("JSON request is invalid", ErrorKind::BadRequest),
    ("invalid api_key", ErrorKind::Forbidden),
    ("Location not found", ErrorKind::NotFound),
];

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum ErrorKind {
    /// Malformed query or invalid credential.
    BadRequest,
    /// Quota exhausted or credential rejected.
    Forbidden,
    /// No usable position could be derived.
    NotFound,
    /// Any other provider-side failure; the cause carries the provider text.
    ProviderFailure,
    /// Connection, TLS or timeout failure on this side of the wire.
    Transport,
    /// Response body (or outbound payload) could not be (de)serialized.
    Decode,
    InvalidConfiguration,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            ErrorKind::BadRequest => f.write_str("Bad request"),
            ErrorKind::Forbidden => f.write_str("Forbidden"),
            ErrorKind::NotFound => f.write_str("Location not found"),
            ErrorKind::ProviderFailure => match &self.cause {
                Some(cause) => write!(f, "Provider error: {}", cause),
                None => f.write_str("Provider error"),
            },
            ErrorKind::Transport => f.write_str("Transport failure"),
            ErrorKind::Decode => f.write_str("Malformed response"),
            ErrorKind::InvalidConfiguration =>
                f.write_str("Invalid configuration"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_ref().map(|e| &**e as &dyn StdError)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {kind, cause: None}
    }
}

impl From<hyper::Error> for Error {
    fn from(e: hyper::Error) -> Error {
        Error::new(ErrorKind::Transport, e)
    }
}

impl From<hyper_tls::Error> for Error {
    fn from(e: hyper_tls::Error) -> Error {
        Error::new(ErrorKind::Transport, e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::new(ErrorKind::Decode, e)
    }
}

fn serialize_cause<S>(e: &Option<Box<dyn StdError + Send + Sync>>, out: S)
    -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut seq = out.serialize_seq(None)?;
    let mut e = e.as_ref().map(|e| &**e as &dyn StdError);
    while let Some(cause) = e {
        seq.serialize_element(&cause.to_string())?;
        e = cause.source();
    }
    seq.end()
}
