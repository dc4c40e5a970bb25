use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::err::DecodeError;

/// A Google Photos Takeout JSON sidecar, as found either beside
/// a media file or inside an album's `metadata.json`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawMetadataRecord
{
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,
    /// Only present on album descriptors
    #[serde(default, deserialize_with = "object_only", skip_serializing_if = "Option::is_none")]
    pub date: Option<Timestamp>,
    /// Only present on asset sidecars
    #[serde(default, deserialize_with = "object_only", skip_serializing_if = "Option::is_none")]
    pub photo_taken_time: Option<Timestamp>,
    #[serde(default, deserialize_with = "object_only", skip_serializing_if = "Option::is_none")]
    pub geo_data_exif: Option<GeoData>,
    #[serde(default, deserialize_with = "object_only", skip_serializing_if = "Option::is_none")]
    pub geo_data: Option<GeoData>,
    #[serde(default)]
    pub trashed: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<Presence>,
    #[serde(default)]
    pub favorited: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichments: Option<Vec<serde_json::Value>>,
    #[serde(default, deserialize_with = "object_only", skip_serializing_if = "Option::is_none")]
    pub google_photos_origin: Option<Origin>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Timestamp
{
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeoData
{
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude_span: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude_span: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Origin
{
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_partner_sharing: Option<Presence>,
}

/// A key whose value doesn't matter - only that Takeout wrote it.
/// An absent key is modelled as `Option::None` by the containing struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence
{
    Flag(bool),
    Present,
}

impl Presence
{
    pub fn is_set(self) -> bool
    {
        match self
        {
            Presence::Flag(flag) => flag,
            Presence::Present => true,
        }
    }
}

impl<'de> Deserialize<'de> for Presence
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where D: Deserializer<'de>
    {
        match serde_json::Value::deserialize(deserializer)?
        {
            serde_json::Value::Bool(flag) => Ok(Presence::Flag(flag)),
            serde_json::Value::Null => Ok(Presence::Flag(false)),
            _ => Ok(Presence::Present),
        }
    }
}

impl Serialize for Presence
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: Serializer
    {
        match self
        {
            Presence::Flag(flag) => serializer.serialize_bool(*flag),
            Presence::Present => serializer.serialize_str("present"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Classification
{
    Album,
    Asset,
    Undefined,
}

/// Identifies an asset by its title and the raw `photoTakenTime`
/// string, so two sidecars with the same unparsable timestamp still match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetKey
{
    pub title: String,
    pub timestamp: String,
}

impl std::fmt::Display for AssetKey
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error>
    {
        write!(f, "{},{}", self.title, self.timestamp)
    }
}

impl RawMetadataRecord
{
    pub fn capture_timestamp(&self) -> &str
    {
        self.photo_taken_time.as_ref().map(|t| t.timestamp.as_str()).unwrap_or_default()
    }

    pub fn album_timestamp(&self) -> &str
    {
        self.date.as_ref().map(|t| t.timestamp.as_str()).unwrap_or_default()
    }

    pub fn url_present(&self) -> bool
    {
        self.url.map(Presence::is_set).unwrap_or(false)
    }

    pub fn from_partner_sharing(&self) -> bool
    {
        self.google_photos_origin.as_ref()
            .and_then(|o| o.from_partner_sharing)
            .map(Presence::is_set)
            .unwrap_or(false)
    }

    pub fn enrichments(&self) -> &[serde_json::Value]
    {
        self.enrichments.as_deref().unwrap_or_default()
    }

    pub fn is_album(&self) -> bool
    {
        !self.album_timestamp().is_empty()
    }

    pub fn is_asset(&self) -> bool
    {
        !self.capture_timestamp().is_empty()
    }

    pub fn is_partner(&self) -> bool
    {
        self.from_partner_sharing()
    }

    /// Album descriptors win when both timestamps are set.
    /// Callers must handle `Undefined` themselves.
    pub fn classify(&self) -> Classification
    {
        if self.is_album()
        {
            Classification::Album
        }
        else if self.is_asset()
        {
            Classification::Asset
        }
        else
        {
            Classification::Undefined
        }
    }

    pub fn key(&self) -> AssetKey
    {
        AssetKey
        {
            title: self.title.clone(),
            timestamp: self.capture_timestamp().to_owned(),
        }
    }
}

/// Nested blocks must be JSON objects. Derived struct impls would
/// otherwise also fill the fields from an array, by position.
fn object_only<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where D: Deserializer<'de>,
          T: DeserializeOwned
{
    match Option::<Value>::deserialize(deserializer)?
    {
        None => Ok(None),
        Some(value @ Value::Object(_)) => serde_json::from_value(value).map(Some).map_err(D::Error::custom),
        Some(_) => Err(D::Error::custom("expected a JSON object")),
    }
}

/// Decodes a sidecar, unwrapping `albumData` when it holds a record.
///
/// The wrapper shape has to be attempted first: the flat shape ignores
/// unknown keys, so it would happily accept a wrapper and return an
/// empty record.
pub fn decode_sidecar(json_bytes: &[u8]) -> Result<RawMetadataRecord, DecodeError>
{
    let object = serde_json::from_slice::<Map<String, Value>>(json_bytes)?;

    match object.get("albumData")
    {
        Some(Value::Object(album)) =>
        {
            match serde_json::from_value::<RawMetadataRecord>(Value::Object(album.clone()))
            {
                Ok(record) =>
                {
                    debug!(title = %record.title, "decoded album wrapper sidecar");
                    return Ok(record);
                },
                Err(err) =>
                {
                    debug!("albumData is not a sidecar: {}", err);
                },
            }
        },
        Some(_) =>
        {
            debug!("albumData is not an object, decoding as a flat sidecar");
        },
        None =>
        {
        },
    }

    let record = serde_json::from_value::<RawMetadataRecord>(Value::Object(object))?;

    debug!(title = %record.title, classification = ?record.classify(), "decoded flat sidecar");

    Ok(record)
}
