//! In-place editing of the aggregate. Callers persist the whole document afterwards.

use super::defaults::{DEFAULT_EVENT_TYPE, DEFAULT_TASK_CATEGORY, FOLDER_COLORS};
use super::id::generate_id;
use super::types::{AppData, Event, FileItem, Flashcard, Folder, ScheduleItem, Task};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewTask {
    pub text: String,
    pub category: String,
    pub subject: String,
    pub due_date: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub date: String,
    pub kind: String,
    pub subject: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewScheduleItem {
    pub day: String,
    pub subject: String,
    pub room: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewFlashcard {
    pub question: String,
    pub answer: String,
    pub subject: String,
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn or_default(value: String, fallback: &str) -> String {
    if is_blank(&value) {
        fallback.to_owned()
    } else {
        value
    }
}

fn take_by_id<T, F>(items: &mut Vec<T>, id: &str, id_of: F) -> Option<T>
where
    F: Fn(&T) -> &str,
{
    let index = items.iter().position(|item| id_of(item) == id)?;
    Some(items.remove(index))
}

impl AppData {
    /// Appends a new uncompleted task. Blank text is rejected.
    pub fn add_task(&mut self, new: NewTask) -> Option<&Task> {
        if is_blank(&new.text) {
            return None;
        }
        self.tasks.push(Task {
            id: generate_id(),
            text: new.text,
            completed: false,
            category: or_default(new.category, DEFAULT_TASK_CATEGORY),
            subject: new.subject,
            due_date: new.due_date,
        });
        self.tasks.last()
    }

    /// Flips the completed flag; returns false when no task has `id`.
    pub fn toggle_task(&mut self, id: &str) -> bool {
        match self.tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                true
            }
            None => false,
        }
    }

    pub fn remove_task(&mut self, id: &str) -> Option<Task> {
        take_by_id(&mut self.tasks, id, |task| &task.id)
    }

    /// Appends a calendar event. Both a title and a date are required.
    pub fn add_event(&mut self, new: NewEvent) -> Option<&Event> {
        if is_blank(&new.title) || is_blank(&new.date) {
            return None;
        }
        self.events.push(Event {
            id: generate_id(),
            title: new.title,
            date: new.date,
            kind: or_default(new.kind, DEFAULT_EVENT_TYPE),
            subject: new.subject,
        });
        self.events.last()
    }

    pub fn remove_event(&mut self, id: &str) -> Option<Event> {
        take_by_id(&mut self.events, id, |event| &event.id)
    }

    /// Appends a timetable slot. A subject is required.
    pub fn add_class(&mut self, new: NewScheduleItem) -> Option<&ScheduleItem> {
        if is_blank(&new.subject) {
            return None;
        }
        self.schedule.push(ScheduleItem {
            id: generate_id(),
            day: new.day,
            subject: new.subject,
            room: new.room,
            start_time: new.start_time,
            end_time: new.end_time,
        });
        self.schedule.last()
    }

    pub fn remove_class(&mut self, id: &str) -> Option<ScheduleItem> {
        take_by_id(&mut self.schedule, id, |item| &item.id)
    }

    /// Classes held on `day`, earliest start first.
    pub fn classes_on(&self, day: &str) -> Vec<&ScheduleItem> {
        let mut classes: Vec<&ScheduleItem> =
            self.schedule.iter().filter(|item| item.day == day).collect();
        classes.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        classes
    }

    /// Creates an empty folder whose color tag rotates with the folder count.
    pub fn add_folder(&mut self, name: impl Into<String>) -> Option<&Folder> {
        let name = name.into();
        if is_blank(&name) {
            return None;
        }
        let color = FOLDER_COLORS[self.folders.len() % FOLDER_COLORS.len()];
        self.folders.push(Folder {
            id: generate_id(),
            name,
            color: color.to_owned(),
            files: Vec::new(),
        });
        self.folders.last()
    }

    /// Removes the folder and hands it back so its remote blobs can be cleaned up.
    pub fn remove_folder(&mut self, id: &str) -> Option<Folder> {
        take_by_id(&mut self.folders, id, |folder| &folder.id)
    }

    pub fn folder(&self, id: &str) -> Option<&Folder> {
        self.folders.iter().find(|folder| folder.id == id)
    }

    pub fn add_file_to_folder(&mut self, folder_id: &str, file: FileItem) -> bool {
        match self.folders.iter_mut().find(|folder| folder.id == folder_id) {
            Some(folder) => {
                folder.files.push(file);
                true
            }
            None => false,
        }
    }

    pub fn remove_file_from_folder(&mut self, folder_id: &str, file_id: &str) -> Option<FileItem> {
        let folder = self
            .folders
            .iter_mut()
            .find(|folder| folder.id == folder_id)?;
        take_by_id(&mut folder.files, file_id, |file| &file.id)
    }

    pub fn add_general_file(&mut self, file: FileItem) {
        self.general_files.push(file);
    }

    pub fn remove_general_file(&mut self, id: &str) -> Option<FileItem> {
        take_by_id(&mut self.general_files, id, |file| &file.id)
    }

    /// Appends a flashcard. Question and answer are both required.
    pub fn add_flashcard(&mut self, new: NewFlashcard) -> Option<&Flashcard> {
        if is_blank(&new.question) || is_blank(&new.answer) {
            return None;
        }
        self.flashcards.push(Flashcard {
            id: generate_id(),
            question: new.question,
            answer: new.answer,
            subject: new.subject,
        });
        self.flashcards.last()
    }

    pub fn remove_flashcard(&mut self, id: &str) -> Option<Flashcard> {
        take_by_id(&mut self.flashcards, id, |card| &card.id)
    }

    /// Adds a subject name; blank or already-present names leave the list unchanged.
    pub fn add_subject(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if is_blank(&name) || self.subjects.iter().any(|existing| *existing == name) {
            return false;
        }
        self.subjects.push(name);
        true
    }

    pub fn remove_subject(&mut self, name: &str) -> bool {
        let before = self.subjects.len();
        self.subjects.retain(|subject| subject != name);
        self.subjects.len() != before
    }

    /// Every file item in the document, folder files first.
    pub fn all_files(&self) -> impl Iterator<Item = &FileItem> {
        self.folders
            .iter()
            .flat_map(|folder| folder.files.iter())
            .chain(self.general_files.iter())
    }
}
