/// Upload filename generation and extension validation
///
/// Stored names must be collision-resistant across concurrent requests:
/// image names combine a millisecond timestamp with a random alphanumeric
/// token; markdown names use the slugged title plus the timestamp alone,
/// which can collide for identical titles within the same millisecond (an
/// accepted risk).
use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};

/// Accepted image upload extensions (lower-case, without the dot)
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Accepted markdown upload extensions
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Length of the random token in generated image names
const TOKEN_LEN: usize = 8;

/// Extract the lower-cased extension of a filename, without the dot
fn extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(stem, ext)| (stem, ext.to_ascii_lowercase()))
        .filter(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
        .map(|(_, ext)| ext)
}

/// Check an uploaded image filename against the allow-list
pub fn is_allowed_image(filename: &str) -> bool {
    extension(filename)
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Check an uploaded markdown filename against the allow-list
pub fn is_allowed_markdown(filename: &str) -> bool {
    extension(filename)
        .map(|ext| MARKDOWN_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Generate a storage name for an uploaded image:
/// `<category>-<millisecond-timestamp>-<random-token>.<ext>`
///
/// Callers must have validated the filename first; an extensionless input
/// falls back to "bin" rather than producing a dotless name.
pub fn image_name(category: &str, original_filename: &str) -> String {
    let ext = extension(original_filename).unwrap_or_else(|| "bin".to_string());
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect();

    format!(
        "{}-{}-{}.{}",
        category,
        Utc::now().timestamp_millis(),
        token,
        ext
    )
}

/// Generate a storage name for an uploaded markdown body:
/// `<slug-of-title>-<millisecond-timestamp>.md`
pub fn markdown_name(title: &str) -> String {
    format!("{}-{}.md", slugify(title), Utc::now().timestamp_millis())
}

/// Lower-case a title and collapse every non-alphanumeric run into a
/// single separator, trimming leading/trailing separators
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_sep = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }

    if slug.is_empty() {
        slug.push_str("untitled");
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_image_allow_list() {
        assert!(is_allowed_image("photo.png"));
        assert!(is_allowed_image("photo.JPG"));
        assert!(is_allowed_image("a.b.webp"));
        assert!(!is_allowed_image("malware.exe"));
        assert!(!is_allowed_image("archive.tar.gz"));
        assert!(!is_allowed_image("noextension"));
        assert!(!is_allowed_image(".png"));
    }

    #[test]
    fn test_markdown_allow_list() {
        assert!(is_allowed_markdown("post.md"));
        assert!(is_allowed_markdown("post.MARKDOWN"));
        assert!(!is_allowed_markdown("post.txt"));
    }

    #[test]
    fn test_image_name_shape() {
        let name = image_name("project", "photo.PNG");
        let parts: Vec<&str> = name.splitn(3, '-').collect();

        assert_eq!(parts[0], "project");
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        let (token, ext) = parts[2].split_once('.').unwrap();
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(ext, "png");
    }

    #[test]
    fn test_image_names_are_unique() {
        let names: HashSet<String> = (0..100)
            .map(|_| image_name("project", "photo.png"))
            .collect();
        // Same millisecond, distinct random tokens
        assert_eq!(names.len(), 100);
    }

    #[test]
    fn test_markdown_name_shape() {
        let name = markdown_name("My First Post!");
        assert!(name.starts_with("my-first-post-"));
        assert!(name.ends_with(".md"));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  spaced   out  "), "spaced-out");
        assert_eq!(slugify("Rust & WebAssembly 2024"), "rust-webassembly-2024");
        assert_eq!(slugify("!!!"), "untitled");
    }
}
