//! Image name filtering.

/// File extensions recognised as images, lower-case with the leading dot.
pub const IMAGE_EXTENSIONS: [&str; 7] = [
    ".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp", ".tiff",
];

/// Returns whether `name` ends with one of the [`IMAGE_EXTENSIONS`],
/// ignoring ASCII case.
pub fn is_image_name(name: &str) -> bool {
    IMAGE_EXTENSIONS
        .iter()
        .any(|ext| ends_with_ignore_ascii_case(name, ext))
}

/// Returns the MIME type for an image name, or `application/octet-stream`
/// when the extension is not recognised.
pub fn content_type_for(name: &str) -> &'static str {
    const TYPES: [(&str, &str); 7] = [
        (".jpg", "image/jpeg"),
        (".jpeg", "image/jpeg"),
        (".png", "image/png"),
        (".gif", "image/gif"),
        (".webp", "image/webp"),
        (".bmp", "image/bmp"),
        (".tiff", "image/tiff"),
    ];

    TYPES
        .iter()
        .find(|(ext, _)| ends_with_ignore_ascii_case(name, ext))
        .map_or("application/octet-stream", |(_, mime)| mime)
}

fn ends_with_ignore_ascii_case(name: &str, suffix: &str) -> bool {
    let (name, suffix) = (name.as_bytes(), suffix.as_bytes());
    name.len() >= suffix.len() && name[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_extensions_case_insensitively() {
        assert!(is_image_name("PHOTO.JPG"));
        assert!(is_image_name("holiday/beach.Jpeg"));
        assert!(is_image_name("scan.tiff"));
        assert!(!is_image_name("notes.txt"));
        assert!(!is_image_name("archive.tif"));
        assert!(!is_image_name("png"));
        assert!(!is_image_name(""));
    }

    #[test]
    fn non_ascii_names_do_not_panic() {
        assert!(is_image_name("фото.png"));
        assert!(!is_image_name("ñ"));
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type_for("a.JPG"), "image/jpeg");
        assert_eq!(content_type_for("b.webp"), "image/webp");
        assert_eq!(content_type_for("c.bin"), "application/octet-stream");
    }
}
