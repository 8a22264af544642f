use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Note {
    #[serde(rename = "_id")]
    pub id: String,
    pub content: String,
    /// Missing or unparseable timestamps read as `None`.
    #[serde(rename = "createdAt", default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}

/// Body for `POST /notes` and `PATCH /notes/:id`.
#[derive(Debug, Clone, Serialize)]
pub struct NoteRequest {
    pub content: String,
}

impl Note {
    pub fn was_edited(&self) -> bool {
        match (self.created_at, self.updated_at) {
            (Some(created), Some(updated)) => updated > created,
            _ => false,
        }
    }

    /// Relative time since the last change, e.g. "5m ago" or "2d ago".
    /// `None` when the backend sent no usable timestamp.
    pub fn updated_ago(&self, now: DateTime<Utc>) -> Option<String> {
        let changed = self.updated_at.or(self.created_at)?;
        Some(age_display(now - changed))
    }
}

fn age_display(age: chrono::Duration) -> String {
    let minutes = age.num_minutes();
    if minutes < 1 {
        // Also covers clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn note_at(updated_at: DateTime<Utc>) -> Note {
        Note {
            id: "n1".into(),
            content: "hello".into(),
            created_at: Some(updated_at),
            updated_at: Some(updated_at),
        }
    }

    fn ago(note: Note, now: DateTime<Utc>) -> String {
        note.updated_ago(now).unwrap()
    }

    #[test]
    fn test_parse_wire_note() {
        let json = r#"{"_id":"665f1c","content":"Buy milk","createdAt":"2024-06-04T10:00:00.000Z","updatedAt":"2024-06-04T11:30:00.000Z","__v":0}"#;
        let note: Note = serde_json::from_str(json).unwrap();
        assert_eq!(note.id, "665f1c");
        assert_eq!(note.content, "Buy milk");
        assert!(note.was_edited());
    }

    #[test]
    fn test_parse_note_with_missing_or_bad_timestamps() {
        let json = r#"[
            {"_id":"a","content":"no dates"},
            {"_id":"b","content":"null dates","createdAt":null,"updatedAt":null},
            {"_id":"c","content":"bad date","createdAt":"yesterday","updatedAt":1717495200},
            {"_id":"d","content":"created only","createdAt":"2024-06-04T10:00:00Z"}
        ]"#;
        let notes: Vec<Note> = serde_json::from_str(json).unwrap();
        assert_eq!(notes.len(), 4);

        let now = Utc::now();
        for note in &notes[..3] {
            assert_eq!(note.created_at, None);
            assert_eq!(note.updated_at, None);
            assert!(!note.was_edited());
            assert_eq!(note.updated_ago(now), None);
        }
        assert!(notes[3].created_at.is_some());
        assert!(!notes[3].was_edited());
        assert!(notes[3].updated_ago(now).is_some());
    }

    #[test]
    fn test_updated_ago() {
        let now = Utc::now();
        assert_eq!(ago(note_at(now + Duration::minutes(3)), now), "just now");
        assert_eq!(ago(note_at(now), now), "just now");
        assert_eq!(ago(note_at(now - Duration::minutes(5)), now), "5m ago");
        assert_eq!(ago(note_at(now - Duration::minutes(90)), now), "2h ago");
        assert_eq!(ago(note_at(now - Duration::minutes(80)), now), "1h ago");
        assert_eq!(ago(note_at(now - Duration::hours(36)), now), "2d ago");
        assert_eq!(ago(note_at(now - Duration::hours(25)), now), "1d ago");
    }
}
