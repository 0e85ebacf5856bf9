use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// Hour of the UTC day that manual runs are requested for.
pub const RUN_HOUR_UTC: u32 = 12;

/// Point in time as seconds since the Unix epoch plus a nanosecond remainder.
///
/// Serializes using the protobuf JSON mapping for `google.protobuf.Timestamp`, i.e. an
/// RFC 3339 string in UTC.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct WireTimestamp {
    pub seconds: i64,
    pub nanos: i32,
}

impl WireTimestamp {
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        let nanos = u32::try_from(self.nanos).ok()?;
        DateTime::from_timestamp(self.seconds, nanos)
    }
}

impl From<DateTime<Utc>> for WireTimestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self {
            seconds: value.timestamp(),
            // Always below 2e9, so fits
            nanos: value.timestamp_subsec_nanos() as i32,
        }
    }
}

impl Serialize for WireTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let datetime = self.to_datetime().ok_or_else(|| {
            serde::ser::Error::custom(format!("timestamp out of range: {self:?}"))
        })?;
        serializer.serialize_str(&datetime.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

/// Run time for the given calendar date: that day at 12:00:00 UTC.
pub fn run_time_on(date: NaiveDate) -> Result<DateTime<Utc>> {
    let naive = date
        .and_hms_opt(RUN_HOUR_UTC, 0, 0)
        .with_context(|| format!("Invalid run time for {date}"))?;
    Ok(naive.and_utc())
}

pub fn iso_8601(run_time: &DateTime<Utc>) -> String {
    run_time.to_rfc3339_opts(SecondsFormat::Millis, true)
}
