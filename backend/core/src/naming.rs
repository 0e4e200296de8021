//! Filename sanitization and derived output names.
//!
//! Output audio names are a pure function of the uploaded filename so that a
//! generated narration lives at a predictable static path.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Prefix that keeps audio artifacts from shadowing the source image name.
pub const AUDIO_NAME_PREFIX: &str = "output_";

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.-]").unwrap());

/// Reduce a client-supplied filename to a safe, flat name.
///
/// Directory components are dropped and accented letters are reduced to
/// their ASCII base (NFKD, then non-ASCII removed). Whitespace runs become
/// `_`, anything outside `[A-Za-z0-9_.-]` is removed, and leading/trailing
/// `.` and `_` are trimmed. May return an empty string.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    let ascii: String = base.nfkd().filter(char::is_ascii).collect();
    let spaced = WHITESPACE.replace_all(ascii.trim(), "_");
    let cleaned = UNSAFE_CHARS.replace_all(&spaced, "");
    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// The filename with its final extension removed.
pub fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

/// Derive the narration filename for an uploaded image.
///
/// `photo.final.png` with extension `mp3` becomes `output_photo.final.mp3`.
/// A `suffix` (used when unique names are enabled) is appended to the stem.
pub fn derive_audio_name(image_name: &str, extension: &str, suffix: Option<&str>) -> String {
    let stem = file_stem(image_name);
    match suffix {
        Some(suffix) => format!("{AUDIO_NAME_PREFIX}{stem}_{suffix}.{extension}"),
        None => format!("{AUDIO_NAME_PREFIX}{stem}.{extension}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_directories_and_unsafe_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename(r"C:\Users\me\My Photo.JPG"), "My_Photo.JPG");
        assert_eq!(sanitize_filename("street sign (1).png"), "street_sign_1.png");
    }

    #[test]
    fn accented_letters_keep_their_base_letter() {
        assert_eq!(sanitize_filename("café.png"), "cafe.png");
        assert_eq!(sanitize_filename("Ångström menü.jpg"), "Angstrom_menu.jpg");
        assert_eq!(sanitize_filename("ﬁle.png"), "file.png");
    }

    #[test]
    fn trims_leading_dots_and_underscores() {
        assert_eq!(sanitize_filename(".hidden.png"), "hidden.png");
        assert_eq!(sanitize_filename("__init__.jpg"), "init__.jpg");
    }

    #[test]
    fn sanitizes_to_empty_when_nothing_survives() {
        assert_eq!(sanitize_filename(""), "");
        assert_eq!(sanitize_filename("..."), "");
        assert_eq!(sanitize_filename("日本.."), "");
    }

    #[test]
    fn stem_removes_only_final_extension() {
        assert_eq!(file_stem("photo.final.png"), "photo.final");
        assert_eq!(file_stem("noext"), "noext");
        assert_eq!(file_stem(".png"), ".png");
    }

    #[test]
    fn derived_name_is_prefixed_and_deterministic() {
        let a = derive_audio_name("cat.jpg", "mp3", None);
        let b = derive_audio_name("cat.jpg", "mp3", None);
        assert_eq!(a, "output_cat.mp3");
        assert_eq!(a, b);
        assert_ne!(a, "cat.jpg");
    }

    #[test]
    fn derived_name_carries_suffix_and_extension() {
        assert_eq!(derive_audio_name("cat.jpg", "opus", Some("1a2b3c4d")), "output_cat_1a2b3c4d.opus");
    }
}
