//! MIME type detection for served narration audio.

use std::path::Path;

/// Detect MIME type by file extension.
pub fn detect_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "mp3"          => "audio/mpeg",
        "opus"         => "audio/opus",
        "aac"          => "audio/aac",
        "flac"         => "audio/flac",
        "wav"          => "audio/wav",
        "ogg"          => "audio/ogg",
        _              => "application/octet-stream",
    }
}

pub fn is_audio(mime: &str) -> bool {
    mime.starts_with("audio/")
}

/// Whether a browser can play or show the file in place.
pub fn is_inline_safe(mime: &str) -> bool {
    matches!(
        mime,
        "audio/mpeg" | "audio/ogg" | "audio/wav" | "audio/opus" | "audio/aac" | "audio/flac"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn detects_narration_formats() {
        assert_eq!(detect_mime_type(&PathBuf::from("output_cat.mp3")), "audio/mpeg");
        assert_eq!(detect_mime_type(&PathBuf::from("output_cat.OPUS")), "audio/opus");
        assert!(is_audio(detect_mime_type(&PathBuf::from("x.wav"))));
    }

    #[test]
    fn unknown_extension_is_downloaded_not_inlined() {
        let mime = detect_mime_type(&PathBuf::from("output_cat.tmp"));
        assert_eq!(mime, "application/octet-stream");
        assert!(!is_inline_safe(mime));
        assert!(!is_audio(mime));
    }
}
