//! Virtual path utilities.
//!
//! Paths handled here are rooted at the store root (`/docs/a.txt`),
//! never real filesystem paths. [`sanitize`] is the single entry point
//! for untrusted input: it rebuilds a path from its segments, dropping
//! empties and `..`, so crafted input cannot climb out of the root.

/// Normalize an untrusted path to a rooted form with no `..` segments.
///
/// Empty and `..` segments are dropped rather than resolved, so the
/// benign segments of a traversal attempt survive in order.
///
/// # Examples
///
/// ```
/// use shelf_store::path::sanitize;
///
/// assert_eq!(sanitize("/docs/notes.txt"), "/docs/notes.txt");
/// assert_eq!(sanitize("/a/../../etc/passwd"), "/a/etc/passwd");
/// assert_eq!(sanitize("no/leading//slash/"), "/no/leading/slash");
/// assert_eq!(sanitize(""), "/");
/// ```
#[must_use]
pub fn sanitize(path: &str) -> String {
    let kept: Vec<&str> = path
        .trim_matches('/')
        .split('/')
        .filter(|seg| !seg.is_empty() && *seg != "..")
        .collect();
    let mut out = String::with_capacity(path.len() + 1);
    out.push('/');
    out.push_str(&kept.join("/"));
    out
}

/// Parent of a rooted path; the root is its own parent.
///
/// # Examples
///
/// ```
/// use shelf_store::path::dirname;
///
/// assert_eq!(dirname("/docs/notes.txt"), "/docs");
/// assert_eq!(dirname("/docs"), "/");
/// assert_eq!(dirname("/"), "/");
/// ```
#[must_use]
pub fn dirname(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(pos) => trimmed[..pos].to_string(),
    }
}

/// Final segment of a path, ignoring trailing slashes.
///
/// # Examples
///
/// ```
/// use shelf_store::path::basename;
///
/// assert_eq!(basename("/docs/notes.txt"), "notes.txt");
/// assert_eq!(basename("/docs/"), "docs");
/// assert_eq!(basename("/"), "");
/// ```
#[must_use]
pub fn basename(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(pos) => trimmed[pos + 1..].to_string(),
        None => trimmed.to_string(),
    }
}

/// Join a rooted directory and a child name without doubling slashes.
///
/// # Examples
///
/// ```
/// use shelf_store::path::join;
///
/// assert_eq!(join("/", "docs"), "/docs");
/// assert_eq!(join("/docs", "notes.txt"), "/docs/notes.txt");
/// ```
#[must_use]
pub fn join(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}
