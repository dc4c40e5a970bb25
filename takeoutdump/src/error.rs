use snafu::Snafu;
use snafu::IntoError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DumpError
{
    #[snafu(display("Could not read {}: {}", path, source))]
    IoError { path: String, source: std::io::Error },
    #[snafu(display("{}", source))]
    DecodeError { source: takeoutmeta::DecodeError },
    #[snafu(display("JSON output error: {}", source))]
    JsonError { source: serde_json::Error },
}

impl From<takeoutmeta::DecodeError> for DumpError
{
    fn from(source: takeoutmeta::DecodeError) -> Self {
        DecodeSnafu{}.into_error(source)
    }
}

impl From<serde_json::Error> for DumpError
{
    fn from(source: serde_json::Error) -> Self {
        JsonSnafu{}.into_error(source)
    }
}
