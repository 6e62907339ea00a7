//! Filesystem-backed storage rooted under one directory.

use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;

use log::{debug, info, warn};

use crate::path::{basename, dirname, join, sanitize};

/// Seed page written on first start so the home template resolves.
const DEFAULT_INDEX_HTML: &str = "<html><head><title>Home Page</title></head><body><h1>Home Page</h1>Data: {{ title }}<br><br><a href=\"/files\">Edit Files</a></body></html>";

/// One directory listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub is_dir: bool,
}

/// Storage operations the HTTP layer is written against.
///
/// All paths are virtual, rooted at the store root, and re-sanitized on
/// every call. Mutations are best-effort: failures are logged and
/// swallowed, so a bad filesystem state never turns a redirect into an
/// error page.
pub trait FileStore {
    fn exists(&self, path: &str) -> bool;
    fn is_dir(&self, path: &str) -> bool;
    fn is_file(&self, path: &str) -> bool;

    /// Directory entries, directories first, each group alphabetical.
    /// A missing or unreadable directory lists as empty.
    fn list(&self, path: &str) -> Vec<Entry>;

    /// Whole-file read, used for small template sources.
    ///
    /// # Errors
    ///
    /// Any failure, including a missing file, surfaces as the error.
    fn read(&self, path: &str) -> io::Result<Vec<u8>>;

    /// Open for streaming reads, returning the file size up front.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be opened or sized.
    fn open_read(&self, path: &str) -> io::Result<(u64, Box<dyn Read>)>;

    /// Open (create or truncate) for streaming writes.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be created.
    fn open_write(&self, path: &str) -> io::Result<Box<dyn Write>>;

    /// Remove a file or an empty directory. A non-empty directory is
    /// left in place.
    fn delete(&self, path: &str);

    /// Rename within the same directory. Slashes in the new name are
    /// replaced so a rename cannot relocate the item.
    fn rename(&self, path: &str, new_name: &str);

    /// Create a single directory level.
    fn make_dir(&self, path: &str);

    /// Move a file or directory into `dest_dir`, keeping its name.
    fn move_item(&self, src: &str, dest_dir: &str);
}

/// [`FileStore`] over a local directory.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Open the store, creating the root directory and a default
    /// `index.html` on first start.
    ///
    /// # Errors
    ///
    /// Fails when the root cannot be created or the seed page cannot be
    /// written.
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            fs::create_dir_all(&root)?;
            info!("created storage root {}", root.display());
        }
        let index = root.join("index.html");
        if !index.is_file() {
            fs::write(&index, DEFAULT_INDEX_HTML)?;
            info!("created default {}", index.display());
        }
        Ok(Self { root })
    }

    /// Root directory backing this store.
    #[must_use]
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn real(&self, path: &str) -> PathBuf {
        let clean = sanitize(path);
        self.root.join(clean.trim_start_matches('/'))
    }
}

impl FileStore for LocalStore {
    fn exists(&self, path: &str) -> bool {
        self.real(path).exists()
    }

    fn is_dir(&self, path: &str) -> bool {
        self.real(path).is_dir()
    }

    fn is_file(&self, path: &str) -> bool {
        self.real(path).is_file()
    }

    fn list(&self, path: &str) -> Vec<Entry> {
        let target = self.real(path);
        let entries = match fs::read_dir(&target) {
            Ok(entries) => entries,
            Err(err) => {
                debug!("cannot list {}: {err}", target.display());
                return Vec::new();
            }
        };
        let mut items: Vec<Entry> = entries
            .filter_map(Result::ok)
            .map(|entry| Entry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: entry.path().is_dir(),
            })
            .collect();
        items.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
        items
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        fs::read(self.real(path))
    }

    fn open_read(&self, path: &str) -> io::Result<(u64, Box<dyn Read>)> {
        let file = fs::File::open(self.real(path))?;
        let len = file.metadata()?.len();
        Ok((len, Box::new(file)))
    }

    fn open_write(&self, path: &str) -> io::Result<Box<dyn Write>> {
        let file = fs::File::create(self.real(path))?;
        Ok(Box::new(BufWriter::new(file)))
    }

    fn delete(&self, path: &str) {
        let target = self.real(path);
        let result = if target.is_file() {
            fs::remove_file(&target)
        } else if target.is_dir() {
            // remove_dir, not remove_dir_all: non-empty stays in place
            fs::remove_dir(&target)
        } else {
            return;
        };
        match result {
            Ok(()) => info!("deleted {}", target.display()),
            Err(err) => warn!("cannot delete {}: {err}", target.display()),
        }
    }

    fn rename(&self, path: &str, new_name: &str) {
        let safe_name = new_name.trim_matches('/').replace('/', "_");
        let source = self.real(path);
        if !source.exists() {
            return;
        }
        let dest = self.real(&join(&dirname(&sanitize(path)), &safe_name));
        match fs::rename(&source, &dest) {
            Ok(()) => info!("renamed {} to {}", source.display(), dest.display()),
            Err(err) => warn!("cannot rename {}: {err}", source.display()),
        }
    }

    fn make_dir(&self, path: &str) {
        let target = self.real(path);
        if target.exists() {
            return;
        }
        match fs::create_dir(&target) {
            Ok(()) => info!("created directory {}", target.display()),
            Err(err) => warn!("cannot create {}: {err}", target.display()),
        }
    }

    fn move_item(&self, src: &str, dest_dir: &str) {
        let source = self.real(src);
        let dest_root = self.real(dest_dir);
        if !source.exists() || !dest_root.exists() {
            debug!("move skipped, missing source or destination");
            return;
        }
        let dest = dest_root.join(basename(&sanitize(src)));
        match fs::rename(&source, &dest) {
            Ok(()) => info!("moved {} to {}", source.display(), dest.display()),
            Err(err) => warn!("cannot move {}: {err}", source.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, LocalStore) {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(dir.path().join("files")).unwrap();
        (dir, store)
    }

    fn names(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn open_bootstraps_root_and_index() {
        let (_dir, store) = store();
        assert!(store.root().is_dir());
        let page = store.read("/index.html").unwrap();
        assert_eq!(page, DEFAULT_INDEX_HTML.as_bytes());
    }

    #[test]
    fn open_preserves_existing_index() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("files");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("index.html"), "custom").unwrap();
        let store = LocalStore::open(&root).unwrap();
        assert_eq!(store.read("/index.html").unwrap(), b"custom");
    }

    #[test]
    fn list_sorts_directories_first() {
        let (_dir, store) = store();
        store.make_dir("/zoo");
        store.make_dir("/attic");
        std::fs::write(store.root().join("b.txt"), "b").unwrap();
        std::fs::write(store.root().join("a.txt"), "a").unwrap();
        let entries = store.list("/");
        assert_eq!(names(&entries), ["attic", "zoo", "a.txt", "b.txt", "index.html"]);
        assert!(entries[0].is_dir && entries[1].is_dir);
        assert!(!entries[2].is_dir);
    }

    #[test]
    fn list_missing_directory_is_empty() {
        let (_dir, store) = store();
        assert!(store.list("/nowhere").is_empty());
    }

    #[test]
    fn open_read_reports_size() {
        let (_dir, store) = store();
        std::fs::write(store.root().join("data.bin"), [7u8; 42]).unwrap();
        let (len, mut reader) = store.open_read("/data.bin").unwrap();
        assert_eq!(len, 42);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, [7u8; 42]);
    }

    #[test]
    fn open_write_round_trips() {
        let (_dir, store) = store();
        {
            let mut writer = store.open_write("/out.txt").unwrap();
            writer.write_all(b"written through the store").unwrap();
            writer.flush().unwrap();
        }
        assert_eq!(store.read("/out.txt").unwrap(), b"written through the store");
    }

    #[test]
    fn read_missing_file_errors() {
        let (_dir, store) = store();
        assert!(store.read("/missing.txt").is_err());
        assert!(store.open_read("/missing.txt").is_err());
    }

    #[test]
    fn delete_removes_file_and_empty_dir() {
        let (_dir, store) = store();
        std::fs::write(store.root().join("gone.txt"), "x").unwrap();
        store.delete("/gone.txt");
        assert!(!store.exists("/gone.txt"));

        store.make_dir("/hollow");
        store.delete("/hollow");
        assert!(!store.exists("/hollow"));
    }

    #[test]
    fn delete_keeps_non_empty_directory() {
        let (_dir, store) = store();
        store.make_dir("/full");
        std::fs::write(store.root().join("full/kid.txt"), "x").unwrap();
        store.delete("/full");
        assert!(store.is_dir("/full"));
        assert!(store.is_file("/full/kid.txt"));
    }

    #[test]
    fn delete_missing_is_quiet() {
        let (_dir, store) = store();
        store.delete("/never-was");
    }

    #[test]
    fn rename_stays_in_directory() {
        let (_dir, store) = store();
        store.make_dir("/docs");
        std::fs::write(store.root().join("docs/old.txt"), "x").unwrap();
        store.rename("/docs/old.txt", "new.txt");
        assert!(store.is_file("/docs/new.txt"));
        assert!(!store.exists("/docs/old.txt"));
    }

    #[test]
    fn rename_replaces_slashes_in_name() {
        let (_dir, store) = store();
        std::fs::write(store.root().join("a.txt"), "x").unwrap();
        store.rename("/a.txt", "/evil/name.txt");
        assert!(store.is_file("/evil_name.txt"));
        assert!(!store.exists("/a.txt"));
    }

    #[test]
    fn rename_missing_is_noop() {
        let (_dir, store) = store();
        store.rename("/ghost.txt", "real.txt");
        assert!(!store.exists("/real.txt"));
    }

    #[test]
    fn make_dir_is_single_level_and_idempotent() {
        let (_dir, store) = store();
        store.make_dir("/fresh");
        assert!(store.is_dir("/fresh"));
        store.make_dir("/fresh");
        assert!(store.is_dir("/fresh"));
        // Parent missing: logged, nothing created.
        store.make_dir("/no/parent");
        assert!(!store.exists("/no"));
    }

    #[test]
    fn move_item_keeps_name() {
        let (_dir, store) = store();
        store.make_dir("/dest");
        std::fs::write(store.root().join("item.txt"), "x").unwrap();
        store.move_item("/item.txt", "/dest");
        assert!(store.is_file("/dest/item.txt"));
        assert!(!store.exists("/item.txt"));
    }

    #[test]
    fn move_requires_existing_destination() {
        let (_dir, store) = store();
        std::fs::write(store.root().join("stay.txt"), "x").unwrap();
        store.move_item("/stay.txt", "/nowhere");
        assert!(store.is_file("/stay.txt"));
    }

    #[test]
    fn move_whole_directory() {
        let (_dir, store) = store();
        store.make_dir("/src");
        store.make_dir("/dst");
        std::fs::write(store.root().join("src/deep.txt"), "x").unwrap();
        store.move_item("/src", "/dst");
        assert!(store.is_file("/dst/src/deep.txt"));
        assert!(!store.exists("/src"));
    }

    #[test]
    fn paths_cannot_escape_root() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("secret.txt"), "outside").unwrap();
        let store = LocalStore::open(dir.path().join("files")).unwrap();
        assert!(!store.is_file("/../secret.txt"));
        assert!(store.read("/../secret.txt").is_err());
    }
}
