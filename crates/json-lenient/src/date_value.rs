//! Date fields decoded through pluggable wire-format strategies.
//!
//! A [`DateStrategy`] names the raw wire type and the conversions to and
//! from a UTC instant. [`DateValue`] keeps the raw value it decoded from
//! and replays it verbatim on encode, so formatting quirks of the source
//! document (fractional digits, offsets, padding) survive a round trip
//! untouched. Assigning a new date through [`DateValue::set_date`]
//! re-derives the raw value with the strategy's encoder.

use std::ops::Deref;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::Value;

use crate::error::DecodeError;
use crate::keyed::{FieldCodec, Keyed};
use crate::node::{FromNode, ToNode};

/// A wire format for dates: a raw scalar type plus conversions.
pub trait DateStrategy {
    type Raw: FromNode + ToNode;

    fn decode(raw: &Self::Raw) -> Result<DateTime<Utc>, DecodeError>;

    fn encode(date: &DateTime<Utc>) -> Self::Raw;
}

/// A date field bound to a wire format.
pub struct DateValue<S: DateStrategy> {
    raw: S::Raw,
    date: DateTime<Utc>,
}

impl<S: DateStrategy> DateValue<S> {
    /// Constructs from an instant; the raw form is derived by the strategy.
    pub fn from_date(date: DateTime<Utc>) -> Self {
        DateValue {
            raw: S::encode(&date),
            date,
        }
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// The wire value this field decoded from (or last derived).
    pub fn raw(&self) -> &S::Raw {
        &self.raw
    }

    /// Replaces the instant and re-derives the raw form.
    pub fn set_date(&mut self, date: DateTime<Utc>) {
        self.raw = S::encode(&date);
        self.date = date;
    }

    /// Replays the stored raw value verbatim.
    pub fn encode(&self) -> Value {
        self.raw.to_node()
    }
}

impl<S: DateStrategy> FromNode for DateValue<S> {
    const EXPECTED: &'static str = <S::Raw as FromNode>::EXPECTED;

    fn from_node(node: &Value) -> Result<Self, DecodeError> {
        let raw = S::Raw::from_node(node)?;
        let date = S::decode(&raw)?;
        Ok(DateValue { raw, date })
    }
}

impl<S: DateStrategy> ToNode for DateValue<S> {
    fn to_node(&self) -> Value {
        self.encode()
    }
}

impl<S: DateStrategy> FieldCodec for DateValue<S> {
    fn decode_field(container: &Keyed<'_>, field: &str) -> Result<Self, DecodeError> {
        let key = container.lookup_key(field);
        Self::from_node(container.node(field)?).map_err(|err| err.at(key.as_str()))
    }
}

impl<S: DateStrategy> Deref for DateValue<S> {
    type Target = DateTime<Utc>;

    fn deref(&self) -> &Self::Target {
        &self.date
    }
}

impl<S: DateStrategy> std::fmt::Debug for DateValue<S>
where
    S::Raw: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DateValue")
            .field("raw", &self.raw)
            .field("date", &self.date)
            .finish()
    }
}

impl<S: DateStrategy> Clone for DateValue<S>
where
    S::Raw: Clone,
{
    fn clone(&self) -> Self {
        DateValue {
            raw: self.raw.clone(),
            date: self.date,
        }
    }
}

/// Equality is on the instant; raw forms may differ in formatting.
impl<S: DateStrategy> PartialEq for DateValue<S> {
    fn eq(&self, other: &Self) -> bool {
        self.date == other.date
    }
}

/// A date field that resolves to `None` when the key is absent or null.
pub struct OptionalDateValue<S: DateStrategy> {
    value: Option<DateValue<S>>,
}

impl<S: DateStrategy> OptionalDateValue<S> {
    pub fn new(value: Option<DateValue<S>>) -> Self {
        OptionalDateValue { value }
    }

    pub fn encode(&self) -> Value {
        match &self.value {
            Some(bound) => bound.encode(),
            None => Value::Null,
        }
    }
}

impl<S: DateStrategy> FromNode for OptionalDateValue<S> {
    const EXPECTED: &'static str = <S::Raw as FromNode>::EXPECTED;

    fn from_node(node: &Value) -> Result<Self, DecodeError> {
        if node.is_null() {
            return Ok(OptionalDateValue::new(None));
        }
        DateValue::from_node(node).map(|bound| OptionalDateValue::new(Some(bound)))
    }
}

impl<S: DateStrategy> FieldCodec for OptionalDateValue<S> {
    fn decode_field(container: &Keyed<'_>, field: &str) -> Result<Self, DecodeError> {
        match container.get(field) {
            Some(node) => {
                let key = container.lookup_key(field);
                Self::from_node(node).map_err(|err| err.at(key.as_str()))
            }
            None => Ok(OptionalDateValue::new(None)),
        }
    }
}

impl<S: DateStrategy> Deref for OptionalDateValue<S> {
    type Target = Option<DateValue<S>>;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<S: DateStrategy> std::fmt::Debug for OptionalDateValue<S>
where
    S::Raw: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("OptionalDateValue").field(&self.value).finish()
    }
}

impl<S: DateStrategy> PartialEq for OptionalDateValue<S> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

// ── Strategies ────────────────────────────────────────────────────────────

/// ISO 8601 timestamps with whole-second precision, `Z` suffix on encode.
pub struct Iso8601Strategy;

impl DateStrategy for Iso8601Strategy {
    type Raw = String;

    fn decode(raw: &String) -> Result<DateTime<Utc>, DecodeError> {
        DateTime::parse_from_rfc3339(raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|_| DecodeError::data_corrupted(format!("invalid ISO 8601 date `{raw}`")))
    }

    fn encode(date: &DateTime<Utc>) -> String {
        date.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// ISO 8601 with fractional seconds, millisecond precision on encode.
pub struct Iso8601FractionalStrategy;

impl DateStrategy for Iso8601FractionalStrategy {
    type Raw = String;

    fn decode(raw: &String) -> Result<DateTime<Utc>, DecodeError> {
        DateTime::parse_from_rfc3339(raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|_| DecodeError::data_corrupted(format!("invalid ISO 8601 date `{raw}`")))
    }

    fn encode(date: &DateTime<Utc>) -> String {
        date.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// RFC 3339 timestamps; encodes with a numeric UTC offset.
pub struct Rfc3339Strategy;

impl DateStrategy for Rfc3339Strategy {
    type Raw = String;

    fn decode(raw: &String) -> Result<DateTime<Utc>, DecodeError> {
        DateTime::parse_from_rfc3339(raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|_| DecodeError::data_corrupted(format!("invalid RFC 3339 date `{raw}`")))
    }

    fn encode(date: &DateTime<Utc>) -> String {
        date.to_rfc3339_opts(SecondsFormat::Secs, false)
    }
}

/// RFC 2822 timestamps, e.g. `Fri, 27 Dec 2019 22:43:00 -0000`.
pub struct Rfc2822Strategy;

impl DateStrategy for Rfc2822Strategy {
    type Raw = String;

    fn decode(raw: &String) -> Result<DateTime<Utc>, DecodeError> {
        DateTime::parse_from_rfc2822(raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|_| DecodeError::data_corrupted(format!("invalid RFC 2822 date `{raw}`")))
    }

    fn encode(date: &DateTime<Utc>) -> String {
        date.to_rfc2822()
    }
}

/// Seconds since the Unix epoch as a number; fractional seconds are kept
/// to millisecond precision.
pub struct TimestampStrategy;

impl DateStrategy for TimestampStrategy {
    type Raw = f64;

    fn decode(raw: &f64) -> Result<DateTime<Utc>, DecodeError> {
        if !raw.is_finite() {
            return Err(DecodeError::data_corrupted(format!(
                "invalid epoch timestamp `{raw}`"
            )));
        }
        DateTime::from_timestamp_millis((raw * 1000.0) as i64).ok_or_else(|| {
            DecodeError::data_corrupted(format!("epoch timestamp `{raw}` out of range"))
        })
    }

    fn encode(date: &DateTime<Utc>) -> f64 {
        date.timestamp_millis() as f64 / 1000.0
    }
}

/// Calendar dates in `yyyy-MM-dd` form, midnight UTC.
pub struct YearMonthDayStrategy;

impl DateStrategy for YearMonthDayStrategy {
    type Raw = String;

    fn decode(raw: &String) -> Result<DateTime<Utc>, DecodeError> {
        let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            DecodeError::data_corrupted(format!("invalid calendar date `{raw}`"))
        })?;
        match day.and_hms_opt(0, 0, 0) {
            Some(midnight) => Ok(midnight.and_utc()),
            None => Err(DecodeError::data_corrupted(format!(
                "invalid calendar date `{raw}`"
            ))),
        }
    }

    fn encode(date: &DateTime<Utc>) -> String {
        date.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn iso8601_parses_offsets_into_utc() {
        let bound =
            DateValue::<Iso8601Strategy>::from_node(&json!("1996-12-19T16:39:57-08:00")).unwrap();
        assert_eq!(
            bound.date(),
            Utc.with_ymd_and_hms(1996, 12, 20, 0, 39, 57).unwrap()
        );
    }

    #[test]
    fn encode_replays_the_source_text_verbatim() {
        // A non-canonical offset form survives the round trip untouched.
        let raw = json!("1996-12-19T16:39:57-08:00");
        let bound = DateValue::<Iso8601Strategy>::from_node(&raw).unwrap();
        assert_eq!(bound.encode(), raw);

        let raw = json!("2023-01-15T10:30:00.123Z");
        let bound = DateValue::<Iso8601FractionalStrategy>::from_node(&raw).unwrap();
        assert_eq!(bound.encode(), raw);
    }

    #[test]
    fn set_date_rederives_the_raw_form() {
        let mut bound =
            DateValue::<Iso8601Strategy>::from_node(&json!("1996-12-19T16:39:57-08:00")).unwrap();
        bound.set_date(Utc.with_ymd_and_hms(2008, 9, 15, 10, 53, 0).unwrap());
        assert_eq!(bound.encode(), json!("2008-09-15T10:53:00Z"));
    }

    #[test]
    fn from_date_derives_raw_with_the_strategy() {
        let instant = Utc.with_ymd_and_hms(2008, 9, 15, 10, 53, 0).unwrap();
        assert_eq!(
            DateValue::<Rfc3339Strategy>::from_date(instant).encode(),
            json!("2008-09-15T10:53:00+00:00")
        );
        assert_eq!(
            DateValue::<YearMonthDayStrategy>::from_date(instant).encode(),
            json!("2008-09-15")
        );
    }

    #[test]
    fn rfc2822_roundtrip() {
        let raw = json!("Fri, 27 Dec 2019 22:43:00 -0000");
        let bound = DateValue::<Rfc2822Strategy>::from_node(&raw).unwrap();
        assert_eq!(
            bound.date(),
            Utc.with_ymd_and_hms(2019, 12, 27, 22, 43, 0).unwrap()
        );
        assert_eq!(bound.encode(), raw);
    }

    #[test]
    fn timestamp_keeps_millisecond_precision() {
        let bound = DateValue::<TimestampStrategy>::from_node(&json!(978307200.5)).unwrap();
        assert_eq!(
            bound.date(),
            DateTime::from_timestamp_millis(978_307_200_500).unwrap()
        );
        assert_eq!(bound.encode(), json!(978307200.5));
    }

    #[test]
    fn timestamp_accepts_integer_nodes() {
        let bound = DateValue::<TimestampStrategy>::from_node(&json!(851042397)).unwrap();
        assert_eq!(
            bound.date(),
            Utc.with_ymd_and_hms(1996, 12, 19, 22, 39, 57).unwrap()
        );
    }

    #[test]
    fn year_month_day_is_midnight_utc() {
        let bound = DateValue::<YearMonthDayStrategy>::from_node(&json!("1996-12-19")).unwrap();
        assert_eq!(
            bound.date(),
            Utc.with_ymd_and_hms(1996, 12, 19, 0, 0, 0).unwrap()
        );
        assert_eq!(bound.encode(), json!("1996-12-19"));
    }

    #[test]
    fn unparsable_text_is_data_corrupted() {
        let err = DateValue::<Iso8601Strategy>::from_node(&json!("late october")).unwrap_err();
        assert_eq!(
            err,
            DecodeError::data_corrupted("invalid ISO 8601 date `late october`")
        );
        let err = DateValue::<YearMonthDayStrategy>::from_node(&json!("12/19/1996")).unwrap_err();
        assert_eq!(
            err,
            DecodeError::data_corrupted("invalid calendar date `12/19/1996`")
        );
    }

    #[test]
    fn wrong_raw_type_is_a_type_mismatch() {
        let err = DateValue::<Iso8601Strategy>::from_node(&json!(123456)).unwrap_err();
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn optional_date_absent_and_null_are_none() {
        let doc = json!({"deleted_at": null});
        let keyed = Keyed::from_node(&doc).unwrap();
        let bound: OptionalDateValue<Iso8601Strategy> = keyed.decode("deleted_at").unwrap();
        assert_eq!(*bound, None);
        let bound: OptionalDateValue<Iso8601Strategy> = keyed.decode("created_at").unwrap();
        assert_eq!(*bound, None);
        assert_eq!(bound.encode(), json!(null));
    }

    #[test]
    fn optional_date_present_decodes_and_replays() {
        let doc = json!({"updated_at": "2019-12-27T22:43:00Z"});
        let keyed = Keyed::from_node(&doc).unwrap();
        let bound: OptionalDateValue<Iso8601Strategy> = keyed.decode("updated_at").unwrap();
        assert!(bound.is_some());
        assert_eq!(bound.encode(), json!("2019-12-27T22:43:00Z"));
    }
}
