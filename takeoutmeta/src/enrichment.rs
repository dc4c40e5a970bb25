use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use tracing::trace;

use crate::err::{DecodeError, EnrichmentShapeSnafu};

const E7_SCALE: f64 = 10_000_000.0;

/// The free text and last location gathered from an album's enrichments.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct Enrichment
{
    pub text: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
enum EnrichmentEntry
{
    NarrativeEnrichment(Narrative),
    LocationEnrichment(LocationBlock),
}

#[derive(Deserialize, Debug)]
struct Narrative
{
    #[serde(default)]
    text: String,
}

#[derive(Deserialize, Debug)]
struct LocationBlock
{
    #[serde(default)]
    location: Vec<Place>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Place
{
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default, rename = "latitudeE7")]
    latitude_e7: i64,
    #[serde(default, rename = "longitudeE7")]
    longitude_e7: i64,
}

fn append(text: &mut String, sep: &str, addition: &str)
{
    if !text.is_empty()
    {
        text.push_str(sep);
    }
    text.push_str(addition);
}

impl Enrichment
{
    fn add_narrative(&mut self, narrative: Narrative)
    {
        if !narrative.text.is_empty()
        {
            append(&mut self.text, "\n", &narrative.text);
        }
    }

    fn add_place(&mut self, place: Place)
    {
        // A place's description hangs off the text built so far,
        // not off the place name, so it still appears when the name is empty.

        if !place.name.is_empty()
        {
            append(&mut self.text, "\n", &place.name);
        }

        if !place.description.is_empty()
        {
            append(&mut self.text, " - ", &place.description);
        }

        self.latitude = (place.latitude_e7 as f64) / E7_SCALE;
        self.longitude = (place.longitude_e7 as f64) / E7_SCALE;
    }
}

/// Folds the enrichment array, in order, into a single [`Enrichment`].
pub fn merge_enrichments(entries: &[serde_json::Value]) -> Result<Enrichment, DecodeError>
{
    let mut result = Enrichment::default();

    for (index, value) in entries.iter().enumerate()
    {
        let entry = EnrichmentEntry::deserialize(value)
            .context(EnrichmentShapeSnafu{ index })?;

        trace!(index, ?entry, "merging enrichment");

        match entry
        {
            EnrichmentEntry::NarrativeEnrichment(narrative) =>
            {
                result.add_narrative(narrative);
            },
            EnrichmentEntry::LocationEnrichment(block) =>
            {
                for place in block.location
                {
                    result.add_place(place);
                }
            },
        }
    }

    Ok(result)
}
