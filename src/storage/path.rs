/// Object store path for an uploaded file:
/// `<namespace>/folders/<folder_id>/<file_id>_<file_name>` when the file belongs to a folder,
/// `<namespace>/general/<file_id>_<file_name>` otherwise.
pub fn blob_path(namespace: &str, folder_id: Option<&str>, file_id: &str, file_name: &str) -> String {
    let namespace = namespace.trim_matches('/');
    match folder_id.filter(|id| !id.is_empty()) {
        Some(folder_id) => format!("{namespace}/folders/{folder_id}/{file_id}_{file_name}"),
        None => format!("{namespace}/general/{file_id}_{file_name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_and_general_paths() {
        assert_eq!(
            blob_path("studymate", Some("17"), "42", "apuntes.png"),
            "studymate/folders/17/42_apuntes.png"
        );
        assert_eq!(
            blob_path("studymate", None, "123", "a.png"),
            "studymate/general/123_a.png"
        );
        assert_eq!(
            blob_path("studymate/", Some(""), "1", "b.jpg"),
            "studymate/general/1_b.jpg"
        );
    }
}
