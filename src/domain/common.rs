use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Identifies entities that expose a stable unique identifier.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Supplies a presentation-ready label for UI or logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Records that are retained as tombstones instead of being removed.
pub trait SoftDeletable {
    fn is_deleted(&self) -> bool;

    /// Flags the record as deleted and stamps the modification time.
    fn mark_deleted(&mut self, now: DateTime<Utc>);
}

/// Keeps only records whose soft-delete flag is unset.
pub fn visible<T: SoftDeletable>(records: &[T]) -> Vec<&T> {
    records.iter().filter(|record| !record.is_deleted()).collect()
}

/// Serde adapter for calendar dates.
///
/// Writes `YYYY-MM-DD`. Reads either that form or a full RFC 3339 timestamp,
/// keeping only the calendar date of the latter.
pub mod calendar_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid date `{raw}`")))
    }

    /// Parses a date-only or timestamp string into a calendar date.
    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let trimmed = raw.trim();
        NaiveDate::parse_from_str(trimmed, FORMAT)
            .ok()
            .or_else(|| {
                DateTime::parse_from_rfc3339(trimmed)
                    .ok()
                    .map(|stamp| stamp.date_naive())
            })
    }
}

/// Serde adapter for references to other records.
///
/// A value that is not a UUID string (empty, `null`, a number) reads as the
/// nil id, which never matches a record and so resolves as a dangling
/// reference instead of rejecting the whole document.
pub mod lenient_id {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Value;
    use uuid::Uuid;

    pub fn serialize<S>(id: &Uuid, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        id.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Uuid, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Ok(raw
            .as_str()
            .and_then(|text| Uuid::parse_str(text.trim()).ok())
            .unwrap_or_else(Uuid::nil))
    }
}

#[cfg(test)]
mod tests {
    use super::{calendar_date, lenient_id};
    use chrono::NaiveDate;
    use serde::Deserialize;
    use uuid::Uuid;

    #[derive(Deserialize)]
    struct Reference {
        #[serde(with = "lenient_id", default)]
        target: Uuid,
    }

    fn target_of(json: &str) -> Uuid {
        serde_json::from_str::<Reference>(json).unwrap().target
    }

    #[test]
    fn unusable_references_read_as_nil() {
        let id = Uuid::new_v4();
        assert_eq!(target_of(&format!(r#"{{"target": "{id}"}}"#)), id);
        assert_eq!(target_of(r#"{"target": ""}"#), Uuid::nil());
        assert_eq!(target_of(r#"{"target": null}"#), Uuid::nil());
        assert_eq!(target_of(r#"{"target": 42}"#), Uuid::nil());
        assert_eq!(target_of(r#"{}"#), Uuid::nil());
    }

    #[test]
    fn parses_date_only_and_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(calendar_date::parse("2024-03-01"), Some(expected));
        assert_eq!(
            calendar_date::parse("2024-03-01T10:15:00.000Z"),
            Some(expected)
        );
        assert_eq!(calendar_date::parse("03/01/2024"), None);
    }
}
