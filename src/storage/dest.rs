//! Destination resolution for uploads: maps a logical directory and an
//! original filename onto the generated filename, the backend destination
//! key, and the public URL the stored object is served from. Pure, no I/O.
use serde::Serialize;
use url::Url;
use uuid::Uuid;

/// A resolved upload destination for one file.
#[derive(Debug, Clone, Serialize)]
pub struct Destination {
    /// Generated filename, original extension preserved.
    pub filename: String,
    /// Backend destination key, `/`-separated, no leading slash.
    pub key: String,
    /// Public URL the object will be reachable under.
    pub url: String,
}

/// Resolves `dir` and `original` into a [`Destination`] under `base`.
///
/// A fresh random filename is generated on every call, so duplicate original
/// filenames within one bulk call never collide.
#[must_use]
pub fn resolve(base: &Url, dir: &str, original: &str) -> Destination {
    let filename = generate_filename(original);
    let key = join_key(dir, &filename);
    let url = public_url(base, &key);
    Destination { filename, key, url }
}

/// Random filename preserving the extension of `original`.
pub(crate) fn generate_filename(original: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    match std::path::Path::new(original)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
    {
        Some(ext) if !ext.is_empty() => format!("{id}.{ext}"),
        _ => id,
    }
}

/// Joins `dir` and `filename` into a normalized key: forward slashes only,
/// empty segments collapsed, no leading slash. A malformed directory is
/// passed through as-is, one segment per path component.
pub(crate) fn join_key(dir: &str, filename: &str) -> String {
    let dir = dir.replace('\\', "/");
    let mut segments: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();
    segments.push(filename);
    segments.join("/")
}

/// Appends `key` to `base`, percent-encoding URL-unsafe characters segment by
/// segment.
pub(crate) fn public_url(base: &Url, key: &str) -> String {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().extend(key.split('/'));
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://localhost:8080/uploads").unwrap()
    }

    #[test]
    fn generated_filename_keeps_extension() {
        let name = generate_filename("portrait.png");
        assert!(name.ends_with(".png"));
        assert!(name.len() > ".png".len());
    }

    #[test]
    fn generated_filename_without_extension_has_none() {
        let name = generate_filename("README");
        assert!(!name.contains('.'));
    }

    #[test]
    fn generated_filenames_never_collide() {
        assert_ne!(generate_filename("a.png"), generate_filename("a.png"));
    }

    #[test]
    fn key_normalizes_separators() {
        assert_eq!(join_key("users\\42", "a.png"), "users/42/a.png");
        assert_eq!(join_key("/images//thumbs/", "x.jpg"), "images/thumbs/x.jpg");
        assert_eq!(join_key("", "x.jpg"), "x.jpg");
    }

    #[test]
    fn url_escapes_unsafe_characters() {
        let url = public_url(&base(), "images/my file.png");
        assert_eq!(url, "http://localhost:8080/uploads/images/my%20file.png");
    }

    #[test]
    fn resolved_url_extends_the_base() {
        let dest = resolve(&base(), "images", "cover.png");
        assert_eq!(dest.url, format!("http://localhost:8080/uploads/{}", dest.key));
        assert!(dest.key.starts_with("images/"));
        assert!(dest.key.ends_with(&dest.filename));
    }
}
