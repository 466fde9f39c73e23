// Copyright (C) 2018 Stephane Raux. Distributed under the MIT license.

//! Provider-agnostic description of a positioning query.
//!
//! Field names follow the common JSON geolocation schema, so a `Request`
//! can be read straight from such a document.

use serde::Deserializer;
use serde::de::IntoDeserializer;
use serde_derive::{Deserialize, Serialize};

/// One positioning query.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Request {
    /// Mobile country code stored on the SIM card (100-999).
    #[serde(skip_serializing_if = "is_unset")]
    pub home_mobile_country_code: Option<u16>,
    /// Mobile network code stored on the SIM card (0-32767).
    #[serde(skip_serializing_if = "is_unset")]
    pub home_mobile_network_code: Option<u16>,
    /// An empty string reads as unset.
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_radio_type"
    )]
    pub radio_type: Option<RadioType>,
    /// Clear text name of the carrier.
    #[serde(skip_serializing_if = "is_unset")]
    pub carrier: Option<String>,
    /// Whether the client IP address may be used to locate it.
    pub consider_ip: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cell_towers: Vec<CellTower>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub wifi_access_points: Vec<WifiAccessPoint>,
    #[serde(rename = "ipaddress", skip_serializing_if = "is_unset")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallbacks: Option<Fallbacks>,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RadioType {
    Lte,
    Gsm,
    Cdma,
    Wcdma,
}

impl Default for RadioType {
    fn default() -> Self {
        RadioType::Gsm
    }
}

/// Escalations a provider may take when exact matching fails.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Fallbacks {
    /// Fall back from exact cell position to a coarse location area estimate.
    #[serde(rename = "lacf", default)]
    pub lac: bool,
    /// Fall back to a GeoIP estimate based on the sender address.
    #[serde(rename = "ipf", default)]
    pub ip: bool,
}

impl Fallbacks {
    pub const NONE: Fallbacks = Fallbacks {lac: false, ip: false};
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellTower {
    pub mobile_country_code: u16,
    pub mobile_network_code: u16,
    /// Location area code (GSM, WCDMA) or tracking area code (LTE).
    pub location_area_code: u16,
    pub cell_id: u32,
    /// RSSI or RSCP in dBm.
    #[serde(default, skip_serializing_if = "is_unset")]
    pub signal_strength: Option<i16>,
    /// Milliseconds since the cell was last seen.
    #[serde(default, skip_serializing_if = "is_unset")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "is_unset")]
    pub timing_advance: Option<u8>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WifiAccessPoint {
    /// BSSID of the network.
    pub mac_address: String,
    #[serde(default, skip_serializing_if = "is_unset")]
    pub signal_strength: Option<i16>,
    #[serde(default, skip_serializing_if = "is_unset")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "is_unset")]
    pub channel: Option<u8>,
    /// In dB.
    #[serde(default, skip_serializing_if = "is_unset")]
    pub signal_to_noise_ratio: Option<u16>,
}

/// Absent and zero values are both left out of outbound payloads.
pub(crate) fn is_unset<T: Default + PartialEq>(value: &Option<T>) -> bool {
    value.as_ref().map_or(true, |v| *v == T::default())
}

fn deserialize_radio_type<'de, D>(input: D) -> Result<Option<RadioType>, D::Error>
where
    D: Deserializer<'de>,
{
    let name = <Option<String> as serde::Deserialize>::deserialize(input)?;
    match name {
        Some(name) if !name.is_empty() => {
            let name: serde::de::value::StringDeserializer<D::Error> =
                name.into_deserializer();
            <RadioType as serde::Deserialize>::deserialize(name).map(Some)
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn radio_type(doc: &str) -> Result<Option<RadioType>, serde_json::Error> {
        serde_json::from_str::<Request>(doc).map(|req| req.radio_type)
    }

    #[test]
    fn empty_radio_type_reads_as_unset() {
        assert_eq!(radio_type(r#"{"radioType": ""}"#).unwrap(), None);
        assert_eq!(radio_type(r#"{"radioType": null}"#).unwrap(), None);
        assert_eq!(radio_type("{}").unwrap(), None);
    }

    #[test]
    fn radio_type_names_are_lowercase() {
        assert_eq!(radio_type(r#"{"radioType": "lte"}"#).unwrap(),
            Some(RadioType::Lte));
        assert_eq!(radio_type(r#"{"radioType": "wcdma"}"#).unwrap(),
            Some(RadioType::Wcdma));
        assert!(radio_type(r#"{"radioType": "5g"}"#).is_err());
    }
}
