use std::sync::LazyLock;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::logger::Logger;

use super::defaults::default_subjects;
use super::types::AppData;

static LOGGER: LazyLock<Logger> = LazyLock::new(|| Logger::new("@studymate/model"));

/// Builds a well-formed [`AppData`] from an arbitrary, possibly partial, JSON document.
///
/// Each of the seven top-level fields is taken from `raw` when present and truthy, otherwise the
/// empty collection (or the default subject list) is used. A present list is decoded element by
/// element: an entry that cannot be decoded is dropped and the rest are kept. A present value
/// that is not a list is replaced by the default. The result is idempotent:
/// `merge_with_defaults(&to_value(merge_with_defaults(x)))` equals `merge_with_defaults(x)`.
pub fn merge_with_defaults(raw: &Value) -> AppData {
    let empty = Map::new();
    let fields = match raw {
        Value::Object(map) => map,
        Value::Null => &empty,
        other => {
            LOGGER.warn(format!(
                "stored document is not an object ({}); using defaults",
                json_type_name(other)
            ));
            &empty
        }
    };

    AppData {
        tasks: list_or_default(fields, "tasks", Vec::new),
        events: list_or_default(fields, "events", Vec::new),
        schedule: list_or_default(fields, "schedule", Vec::new),
        folders: list_or_default(fields, "folders", Vec::new),
        general_files: list_or_default(fields, "generalFiles", Vec::new),
        flashcards: list_or_default(fields, "flashcards", Vec::new),
        subjects: list_or_default(fields, "subjects", default_subjects),
    }
}

fn list_or_default<T, F>(fields: &Map<String, Value>, name: &str, default: F) -> Vec<T>
where
    T: DeserializeOwned,
    F: FnOnce() -> Vec<T>,
{
    match fields.get(name) {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| match T::deserialize(item) {
                Ok(decoded) => Some(decoded),
                Err(err) => {
                    LOGGER.warn(format!("dropping {name}[{index}]: {err}"));
                    None
                }
            })
            .collect(),
        Some(value) if is_truthy(value) => {
            LOGGER.warn(format!(
                "field '{name}' is not a list ({}); using default",
                json_type_name(value)
            ));
            default()
        }
        _ => default(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map(|n| n != 0.0).unwrap_or(true),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::defaults::DEFAULT_SUBJECTS;
    use crate::model::types::Task;
    use serde_json::json;

    #[test]
    fn fills_only_missing_fields() {
        let raw = json!({
            "tasks": [{"id": "1", "text": "Ensayo", "completed": false,
                       "category": "Tarea", "subject": "Filosofía", "dueDate": "2026-03-01"}]
        });
        let merged = merge_with_defaults(&raw);

        assert_eq!(merged.tasks.len(), 1);
        assert_eq!(merged.tasks[0].text, "Ensayo");
        assert!(merged.events.is_empty());
        assert!(merged.schedule.is_empty());
        assert!(merged.folders.is_empty());
        assert!(merged.general_files.is_empty());
        assert!(merged.flashcards.is_empty());
        assert_eq!(merged.subjects, DEFAULT_SUBJECTS);
    }

    #[test]
    fn present_empty_subjects_are_kept() {
        let merged = merge_with_defaults(&json!({"subjects": []}));
        assert!(merged.subjects.is_empty());
    }

    #[test]
    fn falsy_and_malformed_fields_use_defaults() {
        let merged = merge_with_defaults(&json!({
            "tasks": null,
            "events": 0,
            "schedule": "",
            "flashcards": {"not": "a list"},
            "subjects": false
        }));
        assert_eq!(merged, AppData::default());
    }

    #[test]
    fn one_malformed_entity_keeps_its_siblings() {
        let merged = merge_with_defaults(&json!({
            "tasks": [
                {"id": "1", "text": "A"},
                {"id": "2", "text": "B", "dueDate": null},
                "not a task"
            ],
            "subjects": ["Química", 7, "Latín"]
        }));

        let texts: Vec<_> = merged.tasks.iter().map(|task| task.text.as_str()).collect();
        assert_eq!(texts, ["A", "B"]);
        assert_eq!(merged.tasks[1].due_date, "");
        assert_eq!(merged.subjects, ["Química", "Latín"]);
    }

    #[test]
    fn non_object_input_yields_defaults() {
        assert_eq!(merge_with_defaults(&json!([1, 2, 3])), AppData::default());
        assert_eq!(merge_with_defaults(&Value::Null), AppData::default());
    }

    #[test]
    fn normalizing_twice_matches_normalizing_once() {
        let raw = json!({
            "tasks": [{"id": "1", "text": "Leer"}],
            "subjects": ["Química"],
            "extra": "ignored"
        });
        let once = merge_with_defaults(&raw);
        let twice = merge_with_defaults(&serde_json::to_value(&once).unwrap());
        assert_eq!(once, twice);
        assert_eq!(
            once.tasks,
            vec![Task {
                id: "1".into(),
                text: "Leer".into(),
                ..Task::default()
            }]
        );
    }
}
