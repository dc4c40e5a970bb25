use serde::Serialize;
use tracing::debug;

use crate::enrichment::{merge_enrichments, Enrichment};
use crate::err::DecodeError;
use crate::sidecar::{decode_sidecar, GeoData, RawMetadataRecord};
use crate::tz::{CaptureInstant, TimeResolver};

/// The metadata handed on for one photo or video.
///
/// A (0, 0) location means "unknown". Takeout writes zeros when it has
/// no location, so a photo genuinely taken at (0, 0) is indistinguishable.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CanonicalMetadata
{
    pub file_name: String,
    pub description: String,
    pub capture_instant: CaptureInstant,
    pub latitude: f64,
    pub longitude: f64,
    pub trashed: bool,
    pub archived: bool,
    pub favorited: bool,
    pub from_partner: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AlbumMetadata
{
    pub title: String,
    pub description: String,
    pub created: CaptureInstant,
    pub enrichment: Enrichment,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canonicalizer
{
    resolver: TimeResolver,
}

fn coordinates(geo: &Option<GeoData>) -> (f64, f64)
{
    geo.as_ref()
        .map(|g| (g.latitude, g.longitude))
        .unwrap_or((0.0, 0.0))
}

impl Canonicalizer
{
    pub fn new(resolver: TimeResolver) -> Self
    {
        Canonicalizer { resolver }
    }

    pub fn resolver(&self) -> &TimeResolver
    {
        &self.resolver
    }

    pub fn canonicalize(&self, record: RawMetadataRecord) -> CanonicalMetadata
    {
        // Takeout writes (0, 0) into geoDataExif when the file had no
        // GPS tags - only then do we trust the location Google inferred.

        let (mut latitude, mut longitude) = coordinates(&record.geo_data_exif);

        if latitude == 0.0 && longitude == 0.0
        {
            let (api_latitude, api_longitude) = coordinates(&record.geo_data);
            latitude = api_latitude;
            longitude = api_longitude;
        }

        let capture_instant = self.resolver.resolve(record.capture_timestamp());
        let from_partner = record.from_partner_sharing();

        CanonicalMetadata
        {
            file_name: record.title,
            description: record.description,
            capture_instant,
            latitude,
            longitude,
            trashed: record.trashed,
            archived: record.archived,
            favorited: record.favorited,
            from_partner,
        }
    }

    pub fn album(&self, record: RawMetadataRecord) -> Result<AlbumMetadata, DecodeError>
    {
        let enrichment = merge_enrichments(record.enrichments())?;
        let created = self.resolver.resolve(record.album_timestamp());

        Ok(AlbumMetadata
        {
            title: record.title,
            description: record.description,
            created,
            enrichment,
        })
    }

    pub fn decode_asset(&self, json_bytes: &[u8]) -> Result<CanonicalMetadata, DecodeError>
    {
        let record = decode_sidecar(json_bytes)?;

        debug!(key = %record.key(), "canonicalizing asset sidecar");

        Ok(self.canonicalize(record))
    }
}

#[cfg(test)]
mod tests
{
    use serde_json::json;
    use crate::tz::LocalZone;
    use super::*;

    fn canonicalizer() -> Canonicalizer
    {
        Canonicalizer::new(TimeResolver::new(LocalZone::Named(chrono_tz::UTC)))
    }

    fn canonicalize(json: serde_json::Value) -> CanonicalMetadata
    {
        let record: RawMetadataRecord = serde_json::from_value(json).unwrap();
        canonicalizer().canonicalize(record)
    }

    fn check_location(json: serde_json::Value, latitude: f64, longitude: f64)
    {
        let canonical = canonicalize(json);

        assert_eq!(canonical.latitude, latitude);
        assert_eq!(canonical.longitude, longitude);
    }

    #[test]
    fn test_geo_source()
    {
        let exif = json!({"latitude": 1.5, "longitude": 2.5, "altitude": 3.0});
        let api = json!({"latitude": 12.5, "longitude": 77.6, "altitude": 0.0});
        let zero = json!({"latitude": 0.0, "longitude": 0.0, "altitude": 0.0});

        check_location(json!({"geoDataExif": exif, "geoData": api}), 1.5, 2.5);
        check_location(json!({"geoDataExif": zero, "geoData": api}), 12.5, 77.6);
        check_location(json!({"geoData": api}), 12.5, 77.6);
        check_location(json!({"geoDataExif": zero}), 0.0, 0.0);
        check_location(json!({}), 0.0, 0.0);

        // Only an exact (0, 0) falls back - one zero axis is a real location
        check_location(json!({"geoDataExif": {"latitude": 0.0, "longitude": 5.0}, "geoData": api}), 0.0, 5.0);
    }

    #[test]
    fn test_zero_zero_is_treated_as_unknown()
    {
        // A photo really taken at (0, 0) loses its location to geoData.
        // Takeout gives us no way to tell the two apart.

        check_location(json!({
                "geoDataExif": {"latitude": 0.0, "longitude": 0.0, "altitude": 12.0},
                "geoData": {"latitude": 0.0001, "longitude": 0.0002, "altitude": 0.0},
            }),
            0.0001,
            0.0002);
    }

    #[test]
    fn test_fields_are_copied()
    {
        let canonical = canonicalize(json!({
            "title": "IMG_0001.jpg",
            "description": "At the beach",
            "photoTakenTime": {"timestamp": "1600000000", "formatted": "13 Sept 2020, 12:26:40 UTC"},
            "trashed": true,
            "favorited": true,
            "googlePhotosOrigin": {"fromPartnerSharing": {}},
        }));

        assert_eq!(canonical.file_name, "IMG_0001.jpg");
        assert_eq!(canonical.description, "At the beach");
        assert_eq!(canonical.capture_instant.to_option().unwrap().to_rfc3339(), "2020-09-13T12:26:40+00:00");
        assert_eq!(canonical.trashed, true);
        assert_eq!(canonical.archived, false);
        assert_eq!(canonical.favorited, true);
        assert_eq!(canonical.from_partner, true);
    }

    #[test]
    fn test_album_date_is_not_capture_time()
    {
        let canonical = canonicalize(json!({"title": "Holidays", "date": {"timestamp": "1600000000"}}));

        assert!(canonical.capture_instant.is_unknown());
    }

    #[test]
    fn test_album()
    {
        let record = decode_sidecar(json!({
            "albumData": {
                "title": "Paris 2020",
                "description": "",
                "date": {"timestamp": "1600000000"},
                "enrichments": [
                    {"narrativeEnrichment": {"text": "Hello"}},
                    {"locationEnrichment": {"location": [
                        {"name": "Paris", "description": "City", "latitudeE7": 488566000, "longitudeE7": 23522000}
                    ]}},
                ],
            }
        }).to_string().as_bytes()).unwrap();

        let album = canonicalizer().album(record).unwrap();

        assert_eq!(album.title, "Paris 2020");
        assert_eq!(album.created.to_option().unwrap().timestamp(), 1600000000);
        assert_eq!(album.enrichment.text, "Hello\nParis - City");
        assert_eq!(album.enrichment.latitude, 48.8566);
    }

    #[test]
    fn test_album_with_bad_enrichment()
    {
        let record: RawMetadataRecord = serde_json::from_value(json!({
            "title": "Broken",
            "date": {"timestamp": "1600000000"},
            "enrichments": [{"narrativeEnrichment": {"text": 5}}],
        })).unwrap();

        assert!(matches!(canonicalizer().album(record), Err(DecodeError::EnrichmentShape { index: 0, .. })));
    }

    #[test]
    fn test_serialized_form()
    {
        let canonical = canonicalize(json!({"title": "a.jpg", "photoTakenTime": {"timestamp": "0"}}));
        let value = serde_json::to_value(&canonical).unwrap();

        assert_eq!(value["file_name"], json!("a.jpg"));
        assert_eq!(value["capture_instant"], json!(null));

        let canonical = canonicalize(json!({"title": "a.jpg", "photoTakenTime": {"timestamp": "1600000000"}}));
        let value = serde_json::to_value(&canonical).unwrap();

        assert_eq!(value["capture_instant"], json!("2020-09-13T12:26:40+00:00"));
    }
}
