//! The aggregate `AppData` document, its entities, and default/normalization rules.

pub mod defaults;
mod edit;
mod id;
mod merge;
pub mod types;

pub use defaults::{default_subjects, DEFAULT_SUBJECTS, FOLDER_COLORS};
pub use edit::{NewEvent, NewFlashcard, NewScheduleItem, NewTask};
pub use id::generate_id;
pub use merge::merge_with_defaults;
pub use types::{
    AppData, Event, FileItem, Flashcard, Folder, ScheduleItem, Task, Theme, FILE_TYPE_IMAGE,
};
