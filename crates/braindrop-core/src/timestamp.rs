//! Timestamp wire format.
//!
//! Timestamps are always written as RFC 3339 strings in UTC. Reading also
//! accepts epoch milliseconds, either as a JSON number or as a numeric
//! string, which older builds of the app wrote for `updatedAt`.

use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Current time, strictly later than `previous` when one is given.
pub fn now_after(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match previous {
        Some(prev) if now <= prev => prev + Duration::microseconds(1),
        _ => now,
    }
}

/// Render a timestamp the way it is persisted.
pub fn format(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse any accepted textual form.
pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    raw.parse::<i64>().ok().and_then(from_millis)
}

fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(ts))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Millis(i64),
        Float(f64),
    }

    let parsed = match Raw::deserialize(deserializer)? {
        Raw::Text(s) => parse(&s),
        Raw::Millis(ms) => from_millis(ms),
        Raw::Float(ms) => from_millis(ms as i64),
    };
    parsed.ok_or_else(|| serde::de::Error::custom("invalid timestamp"))
}

/// Optional timestamp field where any unreadable value decodes as `None`.
///
/// Older builds stored things like `null` or a function's source text in
/// `updatedAt`; those records should still load.
pub mod lenient {
    use chrono::{DateTime, Utc};
    use serde::de::IgnoredAny;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match ts {
            Some(ts) => super::serialize(ts, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Millis(i64),
            Float(f64),
            Other(IgnoredAny),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => super::parse(&s),
            Raw::Millis(ms) => super::from_millis(ms),
            Raw::Float(ms) => super::from_millis(ms as i64),
            Raw::Other(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize, Deserialize)]
    struct Wrapper {
        #[serde(with = "crate::timestamp")]
        at: DateTime<Utc>,
    }

    #[test]
    fn writes_rfc3339_utc() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 0).unwrap();
        let json = serde_json::to_string(&Wrapper { at: ts }).unwrap();
        assert_eq!(json, r#"{"at":"2024-03-09T14:30:00Z"}"#);
    }

    #[test]
    fn reads_iso_with_millis() {
        let w: Wrapper = serde_json::from_str(r#"{"at":"2024-03-09T14:30:00.250Z"}"#).unwrap();
        assert_eq!(w.at.timestamp_millis(), 1_709_994_600_250);
    }

    #[test]
    fn reads_legacy_numeric_string() {
        let w: Wrapper = serde_json::from_str(r#"{"at":"1709994600250"}"#).unwrap();
        assert_eq!(w.at.timestamp_millis(), 1_709_994_600_250);
    }

    #[test]
    fn reads_epoch_millis_number() {
        let w: Wrapper = serde_json::from_str(r#"{"at":1709994600250}"#).unwrap();
        assert_eq!(w.at.timestamp_millis(), 1_709_994_600_250);
    }

    #[test]
    fn rejects_garbage() {
        assert!(serde_json::from_str::<Wrapper>(r#"{"at":"yesterday"}"#).is_err());
        assert!(serde_json::from_str::<Wrapper>(r#"{"at":true}"#).is_err());
    }

    #[derive(Serialize, Deserialize)]
    struct LenientWrapper {
        #[serde(default, with = "crate::timestamp::lenient")]
        at: Option<DateTime<Utc>>,
    }

    #[test]
    fn lenient_maps_unreadable_values_to_none() {
        for json in [
            r#"{"at":"function getTime() { [native code] }"}"#,
            r#"{"at":null}"#,
            r#"{"at":true}"#,
            r#"{}"#,
        ] {
            let w: LenientWrapper = serde_json::from_str(json).unwrap();
            assert_eq!(w.at, None, "{}", json);
        }
        let w: LenientWrapper = serde_json::from_str(r#"{"at":"1709994600250"}"#).unwrap();
        assert_eq!(w.at.map(|t| t.timestamp_millis()), Some(1_709_994_600_250));
    }

    #[test]
    fn sub_second_precision_survives_round_trip() {
        let ts = Utc.timestamp_nanos(1_709_994_600_123_456_789);
        let json = serde_json::to_string(&Wrapper { at: ts }).unwrap();
        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(back.at, ts);
    }

    #[test]
    fn now_after_is_strictly_later() {
        let future = Utc::now() + Duration::hours(1);
        assert!(now_after(Some(future)) > future);
        let past = Utc::now() - Duration::hours(1);
        assert!(now_after(Some(past)) > past);
    }
}
