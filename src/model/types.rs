use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::defaults::default_subjects;

/// Type tag carried by every uploaded file today.
pub const FILE_TYPE_IMAGE: &str = "image";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Task {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub text: String,
    #[serde(deserialize_with = "lenient_bool")]
    pub completed: bool,
    #[serde(deserialize_with = "lenient_string")]
    pub category: String,
    #[serde(deserialize_with = "lenient_string")]
    pub subject: String,
    /// Calendar date as `YYYY-MM-DD`, empty when unset.
    #[serde(deserialize_with = "lenient_string")]
    pub due_date: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Event {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(deserialize_with = "lenient_string")]
    pub subject: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleItem {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    /// Weekday label as shown in the timetable (`"Lunes"`, ...).
    #[serde(deserialize_with = "lenient_string")]
    pub day: String,
    #[serde(deserialize_with = "lenient_string")]
    pub subject: String,
    #[serde(deserialize_with = "lenient_string")]
    pub room: String,
    #[serde(deserialize_with = "lenient_string")]
    pub start_time: String,
    #[serde(deserialize_with = "lenient_string")]
    pub end_time: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileItem {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub kind: String,
    /// Remote download URL or a `data:` URL with the inline base64 payload.
    #[serde(deserialize_with = "lenient_string")]
    pub url: String,
    /// Object store path; present only when the bytes live in the remote object store.
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_optional_string"
    )]
    pub storage_path: Option<String>,
}

impl FileItem {
    pub fn is_remote(&self) -> bool {
        self.storage_path.is_some()
    }

    pub fn is_inline(&self) -> bool {
        self.url.starts_with("data:")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Folder {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub color: String,
    #[serde(deserialize_with = "lenient_files")]
    pub files: Vec<FileItem>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Flashcard {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub question: String,
    #[serde(deserialize_with = "lenient_string")]
    pub answer: String,
    #[serde(deserialize_with = "lenient_string")]
    pub subject: String,
}

// Stored entities may come from older clients or hand edits: a null or mistyped inner field
// decodes to its default instead of failing the whole entity.

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => String::new(),
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

fn lenient_optional_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let text = lenient_string(deserializer)?;
    Ok((!text.is_empty()).then_some(text))
}

fn lenient_files<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<FileItem>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| FileItem::deserialize(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// The aggregate document: the only unit that is ever loaded, saved or pushed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    pub tasks: Vec<Task>,
    pub events: Vec<Event>,
    pub schedule: Vec<ScheduleItem>,
    pub folders: Vec<Folder>,
    pub general_files: Vec<FileItem>,
    pub flashcards: Vec<Flashcard>,
    pub subjects: Vec<String>,
}

impl Default for AppData {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            events: Vec::new(),
            schedule: Vec::new(),
            folders: Vec::new(),
            general_files: Vec::new(),
            flashcards: Vec::new(),
            subjects: default_subjects(),
        }
    }
}

/// Two-valued UI theme preference kept next to the aggregate in local storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}
