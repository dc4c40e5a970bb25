use std::path::{Path, PathBuf};
use serde::Serialize;
use snafu::ResultExt;
use structopt::StructOpt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use takeoutmeta::{Canonicalizer, Classification, LocalZone, TimeResolver};

mod error;

use error::{DumpError, IoSnafu};

#[derive(StructOpt, Debug)]
#[structopt(name = "takeoutdump", about = "Prints the metadata held in Google Photos Takeout JSON sidecars")]
struct Opt
{
    /// Timezone for capture times, as an IANA name or +HH:MM.
    /// Defaults to $TZ, then the system timezone.
    #[structopt(long)]
    timezone: Option<LocalZone>,

    /// Print the decoded sidecar instead of its canonical metadata
    #[structopt(long)]
    raw: bool,

    /// One line of JSON per file
    #[structopt(long)]
    compact: bool,

    #[structopt(parse(from_os_str), required = true)]
    files: Vec<PathBuf>,
}

#[derive(Serialize)]
struct Dump<T: Serialize>
{
    file: String,
    classification: &'static str,
    key: String,
    metadata: T,
}

fn classification_name(classification: Classification) -> &'static str
{
    match classification
    {
        Classification::Album => "album",
        Classification::Asset => "asset",
        Classification::Undefined => "undefined",
    }
}

fn dump_file(opt: &Opt, canonicalizer: &Canonicalizer, path: &Path) -> Result<String, DumpError>
{
    let file = path.display().to_string();

    let bytes = std::fs::read(path).context(IoSnafu{ path: file.clone() })?;
    let record = takeoutmeta::decode_sidecar(&bytes)?;

    let classification = record.classify();
    let key = record.key().to_string();

    if classification == Classification::Undefined
    {
        warn!(%file, "sidecar has neither an album date nor a photo taken time");
    }

    let value = if opt.raw
    {
        serde_json::to_value(Dump { file, classification: classification_name(classification), key, metadata: record })?
    }
    else if classification == Classification::Album
    {
        let album = canonicalizer.album(record)?;
        serde_json::to_value(Dump { file, classification: classification_name(classification), key, metadata: album })?
    }
    else
    {
        let canonical = canonicalizer.canonicalize(record);
        serde_json::to_value(Dump { file, classification: classification_name(classification), key, metadata: canonical })?
    };

    let text = if opt.compact
    {
        serde_json::to_string(&value)?
    }
    else
    {
        serde_json::to_string_pretty(&value)?
    };

    Ok(text)
}

fn main()
{
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let opt = Opt::from_args();

    let zone = opt.timezone.unwrap_or_else(LocalZone::resolve);
    let canonicalizer = Canonicalizer::new(TimeResolver::new(zone));

    info!(zone = ?canonicalizer.resolver().zone(), "resolved local timezone");
    let mut failures = 0;

    for path in opt.files.iter()
    {
        match dump_file(&opt, &canonicalizer, path)
        {
            Ok(text) => println!("{}", text),
            Err(err) =>
            {
                warn!(file = %path.display(), "{}", err);
                failures += 1;
            },
        }
    }

    if failures != 0
    {
        warn!(failures, total = opt.files.len(), "some sidecars could not be dumped");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests
{
    use std::io::Write;
    use super::*;

    fn opt(raw: bool) -> Opt
    {
        Opt
        {
            timezone: None,
            raw,
            compact: true,
            files: Vec::new(),
        }
    }

    fn dump(json: &str, raw: bool) -> Result<serde_json::Value, DumpError>
    {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let canonicalizer = Canonicalizer::new(TimeResolver::new(LocalZone::Named(chrono_tz::UTC)));
        let text = dump_file(&opt(raw), &canonicalizer, file.path())?;

        Ok(serde_json::from_str(&text).unwrap())
    }

    #[test]
    fn test_dump_asset()
    {
        let value = dump(r#"{"title": "IMG_0001.jpg", "photoTakenTime": {"timestamp": "1600000000"}}"#, false).unwrap();

        assert_eq!(value["classification"], "asset");
        assert_eq!(value["key"], "IMG_0001.jpg,1600000000");
        assert_eq!(value["metadata"]["capture_instant"], "2020-09-13T12:26:40+00:00");
    }

    #[test]
    fn test_dump_album()
    {
        let value = dump(r#"{"albumData": {"title": "Trip", "date": {"timestamp": "1600000000"},
            "enrichments": [{"narrativeEnrichment": {"text": "Day one"}}]}}"#, false).unwrap();

        assert_eq!(value["classification"], "album");
        assert_eq!(value["metadata"]["enrichment"]["text"], "Day one");
    }

    #[test]
    fn test_dump_raw()
    {
        let value = dump(r#"{"title": "IMG_0002.jpg", "url": {}}"#, true).unwrap();

        assert_eq!(value["classification"], "undefined");
        assert_eq!(value["metadata"]["url"], "present");
    }

    #[test]
    fn test_dump_errors()
    {
        assert!(matches!(dump("[1, 2", false), Err(DumpError::DecodeError { .. })));
        assert!(matches!(dump(r#"{"albumData": {"date": {"timestamp": "1"}, "enrichments": [{}]}}"#, false), Err(DumpError::DecodeError { .. })));

        let canonicalizer = Canonicalizer::new(TimeResolver::new(LocalZone::System));
        let missing = Path::new("/nonexistent/takeout/IMG_0001.jpg.json");

        assert!(matches!(dump_file(&opt(false), &canonicalizer, missing), Err(DumpError::IoError { .. })));
    }
}
