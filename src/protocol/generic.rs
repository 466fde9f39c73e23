// Copyright (C) 2018 Stephane Raux. Distributed under the MIT license.

use crate::{Config, Error, ErrorKind, Fallbacks, Protocol, Request, Response};
use hyper::header::CONTENT_TYPE;
use hyper::{Body, StatusCode};
use serde_derive::Deserialize;
use url::Url;

/// Services speaking the common JSON geolocation schema (Mozilla, Google and
/// compatible ones).
#[derive(Clone, Debug)]
pub(crate) struct ProtocolGeneric {
    url: Url,
}

impl ProtocolGeneric {
    pub(crate) fn new(url: Url) -> Self {
        ProtocolGeneric {url}
    }

    pub(crate) fn payload(&self, req: &Request, config: &Config)
        -> Result<Vec<u8>, Error>
    {
        let mut req = req.clone();
        req.consider_ip = !config.ignore_ip_method;
        if config.ignore_ip_method {
            req.fallbacks = Some(Fallbacks::NONE);
        }
        // Mozilla finds nothing when the radio type is missing.
        req.radio_type = Some(req.radio_type.unwrap_or_default());
        // The address is taken from the connection.
        req.ip_address = None;
        serde_json::to_vec(&req).map_err(|e| Error::new(ErrorKind::Decode, e))
    }
}

#[derive(Debug, Deserialize)]
struct GeolocateResponse {
    #[serde(flatten)]
    response: Response,
    #[serde(default)]
    fallback: Option<String>,
}

impl Protocol for ProtocolGeneric {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    fn request(&self, req: &Request, config: &Config)
        -> Result<hyper::Request<Body>, Error>
    {
        let data = self.payload(req, config)?;
        hyper::Request::post(self.url.as_str())
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(data))
            .map_err(|e| Error::new(ErrorKind::InvalidConfiguration, e))
    }

    fn parse(&self, status: StatusCode, body: &[u8], config: &Config)
        -> Result<Response, Error>
    {
        Error::check_status(status)?;
        let resp = serde_json::from_slice::<GeolocateResponse>(body)?;
        if config.ignore_ip_method && resp.fallback.as_ref()
            .map_or(false, |f| f == "ipf")
        {
            tracing::warn!(service = %self.url, "rejecting IP based position");
            return Err(ErrorKind::NotFound.into());
        }
        Ok(resp.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CellTower, RadioType, WifiAccessPoint};
    use serde_json::{json, Value};

    fn protocol() -> ProtocolGeneric {
        ProtocolGeneric::new(Url::parse(crate::MOZILLA).unwrap())
    }

    fn cell(cell_id: u32, signal: i16) -> CellTower {
        CellTower {
            mobile_country_code: 250,
            mobile_network_code: 2,
            location_area_code: 7743,
            cell_id,
            signal_strength: Some(signal),
            ..CellTower::default()
        }
    }

    fn fixture() -> Request {
        Request {
            cell_towers: vec![
                cell(22517, -78),
                cell(39696, -81),
                cell(22518, -91),
                cell(27306, -101),
                cell(29909, -103),
                cell(22516, -104),
                cell(20736, -105),
            ],
            wifi_access_points: vec![WifiAccessPoint {
                mac_address: "2:18:E4:C8:38:30".to_string(),
                signal_strength: Some(-22),
                ..WifiAccessPoint::default()
            }],
            ..Request::default()
        }
    }

    fn encode(req: &Request, config: &Config) -> Value {
        let data = protocol().payload(req, config).unwrap();
        serde_json::from_slice(&data).unwrap()
    }

    #[test]
    fn fixture_maps_one_to_one() {
        let req = fixture();
        let payload = encode(&req, &Config::default());
        let cells = payload["cellTowers"].as_array().unwrap();
        assert_eq!(cells.len(), 7);
        for (sent, source) in cells.iter().zip(&req.cell_towers) {
            assert_eq!(sent["mobileCountryCode"], 250);
            assert_eq!(sent["mobileNetworkCode"], 2);
            assert_eq!(sent["locationAreaCode"], 7743);
            assert_eq!(sent["cellId"], source.cell_id);
            assert_eq!(sent["signalStrength"],
                json!(source.signal_strength.unwrap()));
            assert!(sent.get("age").is_none());
            assert!(sent.get("timingAdvance").is_none());
        }
        let wifis = payload["wifiAccessPoints"].as_array().unwrap();
        assert_eq!(wifis.len(), 1);
        assert_eq!(wifis[0], json!({
            "macAddress": "2:18:E4:C8:38:30",
            "signalStrength": -22,
        }));
    }

    #[test]
    fn suppression_forces_ip_off() {
        let req = Request {
            consider_ip: true,
            ip_address: Some("203.0.113.7".to_string()),
            fallbacks: Some(Fallbacks {lac: true, ip: true}),
            ..fixture()
        };
        let payload = encode(&req, &Config::default());
        assert_eq!(payload["considerIp"], false);
        assert_eq!(payload["fallbacks"], json!({"lacf": false, "ipf": false}));
        assert!(payload.get("ipaddress").is_none());
    }

    #[test]
    fn fallbacks_pass_through_without_suppression() {
        let config = Config::default().ignore_ip_method(false);
        let req = Request {
            ip_address: Some("203.0.113.7".to_string()),
            fallbacks: Some(Fallbacks {lac: true, ip: false}),
            ..fixture()
        };
        let payload = encode(&req, &config);
        assert_eq!(payload["considerIp"], true);
        assert_eq!(payload["fallbacks"], json!({"lacf": true, "ipf": false}));
        assert!(payload.get("ipaddress").is_none());

        let payload = encode(&fixture(), &config);
        assert!(payload.get("fallbacks").is_none());
    }

    #[test]
    fn radio_type_defaults_to_gsm() {
        let payload = encode(&fixture(), &Config::default());
        assert_eq!(payload["radioType"], "gsm");

        let req = Request {radio_type: Some(RadioType::Lte), ..fixture()};
        assert_eq!(encode(&req, &Config::default())["radioType"], "lte");

        let req: Request = serde_json::from_str(r#"{"radioType": ""}"#).unwrap();
        assert_eq!(encode(&req, &Config::default())["radioType"], "gsm");
    }

    #[test]
    fn zero_values_are_omitted() {
        let req = Request {
            home_mobile_country_code: Some(0),
            home_mobile_network_code: Some(2),
            carrier: Some(String::new()),
            ..Request::default()
        };
        let payload = encode(&req, &Config::default());
        assert_eq!(payload, json!({
            "homeMobileNetworkCode": 2,
            "radioType": "gsm",
            "considerIp": false,
            "fallbacks": {"lacf": false, "ipf": false},
        }));
    }

    #[test]
    fn caller_request_is_untouched() {
        let req = Request {
            ip_address: Some("203.0.113.7".to_string()),
            ..fixture()
        };
        let before = req.clone();
        encode(&req, &Config::default());
        assert_eq!(req, before);
    }

    #[test]
    fn response_is_taken_verbatim() {
        let body = br#"{"location": {"lat": 55.7, "lng": 37.6}, "accuracy": 30.5}"#;
        let resp = protocol()
            .parse(StatusCode::OK, body, &Config::default())
            .unwrap();
        assert_eq!(resp.location.latitude, 55.7);
        assert_eq!(resp.location.longitude, 37.6);
        assert_eq!(resp.accuracy, 30.5);
    }

    #[test]
    fn status_wins_over_body() {
        let body = br#"{"location": {"lat": 55.7, "lng": 37.6}, "accuracy": 30.5}"#;
        let e = protocol()
            .parse(StatusCode::FORBIDDEN, body, &Config::default())
            .unwrap_err();
        assert_eq!(e.kind(), &ErrorKind::Forbidden);
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let e = protocol()
            .parse(StatusCode::OK, b"<html>", &Config::default())
            .unwrap_err();
        assert_eq!(e.kind(), &ErrorKind::Decode);
    }

    #[test]
    fn ip_fallback_answer_is_rejected_under_suppression() {
        let body = br#"{"location": {"lat": 1.0, "lng": 2.0}, "accuracy": 25000.0,
            "fallback": "ipf"}"#;
        let e = protocol()
            .parse(StatusCode::OK, body, &Config::default())
            .unwrap_err();
        assert_eq!(e.kind(), &ErrorKind::NotFound);

        let config = Config::default().ignore_ip_method(false);
        let resp = protocol().parse(StatusCode::OK, body, &config).unwrap();
        assert_eq!(resp.accuracy, 25000.0);
    }
}
