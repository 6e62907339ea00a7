//! Directory tree walking.

use crate::path::join;
use crate::store::FileStore;

/// Every directory under `start`, preorder, optionally excluding one
/// subtree.
///
/// Walks with an explicit stack rather than recursion. Sibling order
/// follows the store's listing order. When `exclude` names a directory
/// it and everything beneath it are left out, which keeps a move page
/// from offering a destination inside the item being moved.
#[must_use]
pub fn all_directories<S: FileStore + ?Sized>(
    store: &S,
    start: &str,
    exclude: Option<&str>,
) -> Vec<String> {
    let mut found = Vec::new();
    let mut stack = child_dirs(store, start, exclude);
    stack.reverse();
    while let Some(dir) = stack.pop() {
        let mut children = child_dirs(store, &dir, exclude);
        children.reverse();
        found.push(dir);
        stack.extend(children);
    }
    found
}

fn child_dirs<S: FileStore + ?Sized>(store: &S, dir: &str, exclude: Option<&str>) -> Vec<String> {
    store
        .list(dir)
        .into_iter()
        .filter(|entry| entry.is_dir)
        .map(|entry| join(dir, &entry.name))
        .filter(|path| Some(path.as_str()) != exclude)
        .collect()
}
