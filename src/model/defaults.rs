/// Subjects every fresh document starts with.
pub const DEFAULT_SUBJECTS: [&str; 14] = [
    "Lengua Castellana",
    "Ed. Física",
    "Física",
    "Cálculo",
    "Geometría",
    "Ética y Rel.",
    "Filosofía",
    "Historia y Geografía",
    "Inglés",
    "Biología",
    "Artística",
    "Economía y Política",
    "Tecnología y Estadística",
    "Química",
];

/// Color tags assigned to new folders in rotation.
pub const FOLDER_COLORS: [&str; 8] = [
    "blue", "purple", "green", "orange", "pink", "cyan", "red", "indigo",
];

pub const DEFAULT_TASK_CATEGORY: &str = "Tarea";
pub const DEFAULT_EVENT_TYPE: &str = "Examen";

pub fn default_subjects() -> Vec<String> {
    DEFAULT_SUBJECTS.iter().map(|subject| subject.to_string()).collect()
}
