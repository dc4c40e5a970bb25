use snafu::Snafu;
use snafu::IntoError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DecodeError
{
    #[snafu(display("Takeout metadata could not be decoded: {}", source))]
    Structural { source: serde_json::Error },
    #[snafu(display("Enrichment {} is neither a narrative nor a location: {}", index, source))]
    EnrichmentShape { index: usize, source: serde_json::Error },
}

impl From<serde_json::Error> for DecodeError
{
    fn from(source: serde_json::Error) -> Self
    {
        StructuralSnafu{}.into_error(source)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplicitTimezoneParseError;

impl std::fmt::Display for ExplicitTimezoneParseError
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error>
    {
        write!(f, "Timezone must be an IANA name or an offset such as +10:00")
    }
}

impl std::error::Error for ExplicitTimezoneParseError
{
}
