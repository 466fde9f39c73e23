// Copyright (C) 2018 Stephane Raux. Distributed under the MIT license.

use crate::model::is_unset;
use crate::{Config, Error, ErrorKind, Point, Protocol, Request, Response};
use hyper::header::CONTENT_TYPE;
use hyper::{Body, StatusCode};
use serde_derive::{Deserialize, Serialize};
use url::Url;
use url::form_urlencoded;

/// Yandex Locator: its own nested schema, carried as a JSON string in the
/// `json` field of a form-encoded body. Failures are reported in the body.
#[derive(Clone, Debug)]
pub(crate) struct ProtocolYandex {
    url: Url,
    api_key: String,
}

const VERSION: &str = "1.0";

impl ProtocolYandex {
    pub(crate) fn new(url: Url, api_key: &str) -> Self {
        let api_key = api_key.to_string();
        ProtocolYandex {url, api_key}
    }

    pub(crate) fn payload(&self, req: &Request, config: &Config)
        -> Result<String, Error>
    {
        let gsm_cells = req.cell_towers.iter()
            .map(|cell| YandexCell {
                countrycode: cell.mobile_country_code,
                operatorid: cell.mobile_network_code,
                cellid: cell.cell_id,
                lac: cell.location_area_code,
                signal_strength: cell.signal_strength,
                age: cell.age,
            })
            .collect();
        let wifi_networks = req.wifi_access_points.iter()
            .map(|wifi| YandexWifi {
                mac: &wifi.mac_address,
                signal_strength: wifi.signal_strength,
                age: wifi.age,
            })
            .collect();
        let ip = match &req.ip_address {
            Some(address) if !config.ignore_ip_method && !address.is_empty() =>
                Some(YandexIp {address_v4: address}),
            _ => None,
        };
        let request = YandexRequest {
            common: YandexCommon {version: VERSION, api_key: &self.api_key},
            gsm_cells,
            wifi_networks,
            ip,
        };
        serde_json::to_string(&request)
            .map_err(|e| Error::new(ErrorKind::Decode, e))
    }
}

impl Protocol for ProtocolYandex {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    fn request(&self, req: &Request, config: &Config)
        -> Result<hyper::Request<Body>, Error>
    {
        let data = self.payload(req, config)?;
        let form = form_urlencoded::Serializer::new(String::new())
            .append_pair("json", &data)
            .finish();
        hyper::Request::post(self.url.as_str())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form))
            .map_err(|e| Error::new(ErrorKind::InvalidConfiguration, e))
    }

    fn parse(&self, status: StatusCode, body: &[u8], config: &Config)
        -> Result<Response, Error>
    {
        // Documented as always answering 200; checked anyway.
        Error::check_status(status)?;
        let resp = serde_json::from_slice::<YandexResponse>(body)?;
        if let Some(error) = resp.error.as_ref().filter(|e| !e.is_empty()) {
            tracing::warn!(%error, "provider reported a failure");
            return Err(Error::from_provider_message(error));
        }
        if config.ignore_ip_method && resp.position.kind == "ip" {
            tracing::warn!(service = %self.url, "rejecting IP based position");
            return Err(ErrorKind::NotFound.into());
        }
        Ok(Response {
            location: Point {
                latitude: resp.position.latitude,
                longitude: resp.position.longitude,
            },
            accuracy: resp.position.precision,
        })
    }
}

#[derive(Debug, Serialize)]
struct YandexRequest<'a> {
    common: YandexCommon<'a>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    gsm_cells: Vec<YandexCell>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    wifi_networks: Vec<YandexWifi<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ip: Option<YandexIp<'a>>,
}

#[derive(Debug, Serialize)]
struct YandexCommon<'a> {
    version: &'a str,
    api_key: &'a str,
}

#[derive(Debug, Serialize)]
struct YandexCell {
    countrycode: u16,
    operatorid: u16,
    cellid: u32,
    lac: u16,
    #[serde(skip_serializing_if = "is_unset")]
    signal_strength: Option<i16>,
    #[serde(skip_serializing_if = "is_unset")]
    age: Option<u32>,
}

#[derive(Debug, Serialize)]
struct YandexWifi<'a> {
    mac: &'a str,
    #[serde(skip_serializing_if = "is_unset")]
    signal_strength: Option<i16>,
    #[serde(skip_serializing_if = "is_unset")]
    age: Option<u32>,
}

#[derive(Debug, Serialize)]
struct YandexIp<'a> {
    address_v4: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct YandexResponse {
    position: YandexPosition,
    /// Absent, null and empty all mean success.
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct YandexPosition {
    latitude: f64,
    longitude: f64,
    #[allow(dead_code)]
    altitude: f64,
    precision: f64,
    #[allow(dead_code)]
    altitude_precision: f64,
    /// Positioning method: gsm, wifi or ip.
    #[serde(rename = "type")]
    kind: String,
}
