//! Wire formats for dates and timestamps exchanged with the nutrition API.

use serde::{de, Deserialize, Deserializer, Serializer};
use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime, Time, UtcOffset,
};

time::serde::format_description!(pub iso_date, Date, "[year]-[month]-[day]");

pub fn parse_date(text: &str) -> Result<Date, time::error::Parse> {
    Date::parse(text.trim(), format_description!("[year]-[month]-[day]"))
}

pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

/// Parses the `HH:MM` value of an `<input type="time">`.
pub fn parse_clock(text: &str) -> Result<Time, time::error::Parse> {
    Time::parse(text.trim(), format_description!("[hour]:[minute]"))
}

pub fn format_clock(time: Time) -> String {
    time.format(format_description!("[hour]:[minute]"))
        .unwrap_or_default()
}

/// Naive timestamps (`2024-05-01T12:30:00`). Offset-aware values are accepted on input and
/// normalized to UTC.
pub mod timestamp {
    use super::*;

    pub fn parse(text: &str) -> Result<PrimitiveDateTime, time::error::Parse> {
        if let Ok(aware) = OffsetDateTime::parse(text, &Rfc3339) {
            let utc = aware.to_offset(UtcOffset::UTC);
            return Ok(PrimitiveDateTime::new(utc.date(), utc.time()));
        }
        PrimitiveDateTime::parse(
            text,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"),
        )
    }

    pub fn format(value: &PrimitiveDateTime) -> String {
        value
            .format(format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"))
            .unwrap_or_default()
    }

    pub fn serialize<S: Serializer>(value: &PrimitiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PrimitiveDateTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse(&text).map_err(de::Error::custom)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<PrimitiveDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => serializer.serialize_some(&format(v)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<PrimitiveDateTime>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|text| parse(&text).map_err(de::Error::custom))
                .transpose()
        }
    }
}

/// Numeric series where the API sends `null` for missing days; those days read as 0.
pub fn nullable_series<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
    let series = Option::<Vec<Option<f64>>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(series.into_iter().map(Option::unwrap_or_default).collect())
}

#[cfg(test)]
mod formats_tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn timestamp_accepts_naive_and_fractional_values() {
        assert_eq!(
            timestamp::parse("2024-05-01T12:30:00").unwrap(),
            datetime!(2024-05-01 12:30:00)
        );
        assert_eq!(
            timestamp::parse("2024-05-01T12:30:00.250").unwrap(),
            datetime!(2024-05-01 12:30:00.25)
        );
    }

    #[test]
    fn timestamp_normalizes_offsets_to_utc() {
        assert_eq!(
            timestamp::parse("2024-05-01T14:30:00+02:00").unwrap(),
            datetime!(2024-05-01 12:30:00)
        );
    }

    #[test]
    fn timestamp_serializes_without_fraction() {
        assert_eq!(
            timestamp::format(&datetime!(2024-05-01 08:05:00)),
            "2024-05-01T08:05:00"
        );
    }

    #[test]
    fn form_inputs_parse() {
        assert_eq!(parse_date("2024-02-29").unwrap(), date!(2024 - 02 - 29));
        assert!(parse_date("29.02.2024").is_err());
        assert_eq!(format_clock(parse_clock("07:45").unwrap()), "07:45");
        assert!(parse_clock("7 o'clock").is_err());
    }
}
