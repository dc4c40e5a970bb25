use std::str::FromStr;
use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::err::ExplicitTimezoneParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExplicitTimezone(FixedOffset);

impl ExplicitTimezone
{
    pub fn new(offset: FixedOffset) -> Self
    {
        ExplicitTimezone(offset)
    }

    pub fn offset(&self) -> FixedOffset
    {
        self.0
    }
}

impl From<FixedOffset> for ExplicitTimezone
{
    fn from(offset: FixedOffset) -> Self
    {
        ExplicitTimezone::new(offset)
    }
}

impl std::fmt::Display for ExplicitTimezone
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error>
    {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ExplicitTimezone
{
    type Err = ExplicitTimezoneParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        let parts = s.split(':').collect::<Vec<_>>();

        if parts.len() == 2
        {
            let negative = parts[0].starts_with('-');
            let hours: i32 = parts[0].parse().map_err(|_| ExplicitTimezoneParseError)?;
            let mins: i32 = parts[1].parse().map_err(|_| ExplicitTimezoneParseError)?;

            if hours >= -23 && hours <= 23
            {
                if mins >= 0 && mins <= 59
                {
                    let mins = if negative { (hours * 60) - mins } else { (hours * 60) + mins };

                    return Ok(FixedOffset::east_opt(mins * 60).ok_or(ExplicitTimezoneParseError)?.into());
                }
            }
        }

        Err(ExplicitTimezoneParseError)
    }
}

/// The timezone capture times are shown in. Resolved once at startup
/// and then shared read-only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocalZone
{
    Fixed(ExplicitTimezone),
    Named(chrono_tz::Tz),
    System,
}

impl LocalZone
{
    /// Uses the `TZ` environment variable if it names a zone
    /// or an offset, and the operating system's zone otherwise.
    pub fn resolve() -> Self
    {
        LocalZone::from_tz_var(std::env::var("TZ").ok().as_deref())
    }

    pub fn from_tz_var(tz: Option<&str>) -> Self
    {
        match tz
        {
            Some(tz) =>
            {
                match tz.parse::<LocalZone>()
                {
                    Ok(zone) =>
                    {
                        debug!(%tz, "using timezone from TZ");
                        zone
                    },
                    Err(_) =>
                    {
                        debug!(%tz, "TZ not recognised, using system timezone");
                        LocalZone::System
                    },
                }
            },
            None => LocalZone::System,
        }
    }

    pub fn localize(&self, utc: &DateTime<Utc>) -> DateTime<FixedOffset>
    {
        match self
        {
            LocalZone::Fixed(explicit) => utc.with_timezone(&explicit.offset()),
            LocalZone::Named(tz) => fix_offset(utc, tz),
            LocalZone::System => fix_offset(utc, &chrono::Local),
        }
    }
}

fn fix_offset<Tz: TimeZone>(utc: &DateTime<Utc>, tz: &Tz) -> DateTime<FixedOffset>
{
    let local = utc.with_timezone(tz);
    let offset = local.offset().fix();

    local.with_timezone(&offset)
}

impl FromStr for LocalZone
{
    type Err = ExplicitTimezoneParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        let s = s.trim_start_matches(':');

        if let Ok(explicit) = s.parse::<ExplicitTimezone>()
        {
            return Ok(LocalZone::Fixed(explicit));
        }

        s.parse::<chrono_tz::Tz>()
            .map(LocalZone::Named)
            .map_err(|_| ExplicitTimezoneParseError)
    }
}

/// Either an instant in the local zone, or an explicit "no usable time".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureInstant
{
    Unknown,
    At(DateTime<FixedOffset>),
}

impl CaptureInstant
{
    pub fn is_unknown(&self) -> bool
    {
        *self == CaptureInstant::Unknown
    }

    pub fn to_option(&self) -> Option<DateTime<FixedOffset>>
    {
        match self
        {
            CaptureInstant::Unknown => None,
            CaptureInstant::At(instant) => Some(*instant),
        }
    }
}

impl Serialize for CaptureInstant
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: Serializer
    {
        match self
        {
            CaptureInstant::Unknown => serializer.serialize_none(),
            CaptureInstant::At(instant) => serializer.serialize_str(&instant.to_rfc3339()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeResolver
{
    zone: LocalZone,
}

impl TimeResolver
{
    pub fn new(zone: LocalZone) -> Self
    {
        TimeResolver { zone }
    }

    pub fn zone(&self) -> LocalZone
    {
        self.zone
    }

    /// Converts a Takeout epoch-seconds string. Empty, unparsable
    /// and "0" all mean the time isn't known.
    pub fn resolve(&self, epoch_seconds: &str) -> CaptureInstant
    {
        let seconds = match epoch_seconds.parse::<i64>()
        {
            Ok(0) | Err(_) => return CaptureInstant::Unknown,
            Ok(seconds) => seconds,
        };

        match DateTime::<Utc>::from_timestamp(seconds, 0)
        {
            Some(utc) => CaptureInstant::At(self.zone.localize(&utc)),
            None =>
            {
                debug!(epoch_seconds, "timestamp out of range");
                CaptureInstant::Unknown
            },
        }
    }
}
