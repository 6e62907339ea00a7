//! Minimal placeholder templates.
//!
//! Templates are plain files in the store; rendering replaces each
//! `{{ key }}` and `{{key}}` occurrence with its context value. There
//! is no escaping and no control flow, which is all the home page
//! needs.

use shelf_store::FileStore;

/// Render the template at `path` with the given context, or `None`
/// when the template file does not exist or cannot be read.
#[must_use]
pub fn render<S: FileStore + ?Sized>(
    store: &S,
    path: &str,
    context: &[(&str, &str)],
) -> Option<String> {
    let raw = store.read(path).ok()?;
    let mut content = String::from_utf8_lossy(&raw).into_owned();
    for (key, value) in context {
        let spaced = format!("{{{{ {key} }}}}");
        content = content.replace(&spaced, value);
        let tight = format!("{{{{{key}}}}}");
        content = content.replace(&tight, value);
    }
    Some(content)
}
