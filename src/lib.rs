// Copyright (C) 2018 Stephane Raux. Distributed under the MIT license.

//! Device position from nearby cell towers and WiFi access points, resolved
//! by one of several geolocation web services behind a single [`Locator`].

mod client;
mod config;
mod err;
mod locator;
mod model;
mod protocol;

use crate::client::Client;
pub use crate::config::Config;
pub use crate::err::{Error, ErrorKind};
pub use crate::locator::{new, with_config, GeoLocator, Locator};
pub use crate::model::{CellTower, Fallbacks, RadioType, Request,
    WifiAccessPoint};
use crate::protocol::{Protocol, ProtocolGeneric, ProtocolYandex};

use serde_derive::{Deserialize, Serialize};

/// Mozilla Location Service, generic schema.
pub const MOZILLA: &str = "https://location.services.mozilla.com/v1/geolocate";
/// Google Geolocation API, generic schema.
pub const GOOGLE: &str = "https://www.googleapis.com/geolocation/v1/geolocate";
/// Yandex Locator, specialized schema.
pub const YANDEX: &str = "http://api.lbs.yandex.net/geolocation";

/// Latitude and longitude in degrees.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Point {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
}

/// Estimated position, whichever provider answered.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Response {
    pub location: Point,
    /// Radius of the estimate, in meters.
    pub accuracy: f64,
}
