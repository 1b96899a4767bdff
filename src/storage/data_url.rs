use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

const DEFAULT_MIME: &str = "application/octet-stream";

/// Encodes `bytes` as `data:<mime>;base64,<payload>`. The declared content type wins; otherwise
/// the type is guessed from the file extension.
pub fn to_data_url(file_name: &str, content_type: Option<&str>, bytes: &[u8]) -> String {
    let mime = content_type
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| guess_mime_type(file_name));
    format!("data:{mime};base64,{}", BASE64_STANDARD.encode(bytes))
}

pub fn guess_mime_type(file_name: &str) -> &'static str {
    let extension = match file_name.rsplit_once('.') {
        Some((_, extension)) => extension.to_ascii_lowercase(),
        None => return DEFAULT_MIME,
    };
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "heic" => "image/heic",
        "pdf" => "application/pdf",
        _ => DEFAULT_MIME,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_type_wins_over_extension() {
        assert_eq!(
            to_data_url("scan.png", Some("image/jpeg"), b"abc"),
            "data:image/jpeg;base64,YWJj"
        );
    }

    #[test]
    fn extension_is_used_when_type_is_missing() {
        assert_eq!(to_data_url("Foto.JPG", None, b""), "data:image/jpeg;base64,");
        assert_eq!(
            to_data_url("notes", Some("  "), b"hi"),
            "data:application/octet-stream;base64,aGk="
        );
    }
}
