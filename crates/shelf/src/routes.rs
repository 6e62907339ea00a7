//! Request dispatch table.
//!
//! Paths arrive already percent-decoded. Each management route strips
//! its operation prefix and carries the remaining item path; the
//! handler sanitizes that remainder before touching the store.

use shelf_http::Method;

/// What a request resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// `GET /`: render the home template.
    Home,
    /// `GET /files...` with no operation prefix: list if a directory.
    Browse(String),
    /// `GET /files/delete/<path>`: delete, then redirect to the parent.
    DeleteItem(String),
    /// `GET /files/rename/<path>`: show the rename form.
    RenameForm(String),
    /// `POST /files/rename/<path>`: apply a rename.
    RenamePerform(String),
    /// `GET /files/create_dir/<path>`: show the create-directory form.
    CreateDirForm(String),
    /// `POST /files/create_dir/<path>`: create the directory.
    CreateDirPerform(String),
    /// `GET /files/move/<path>`: show the destination picker.
    MoveForm(String),
    /// `GET /files/move_confirm/<path>?dest_dir=..`: apply a move.
    MoveConfirm(String),
    /// `POST /files/upload<dir>`: decode a multipart upload into `dir`.
    Upload(String),
    /// Any other `GET`: serve a file from the store root.
    ServeStatic(String),
    /// Everything else.
    NotFound,
}

/// Resolve a decoded request line to an [`Action`].
#[must_use]
pub fn route(method: &Method, path: &str) -> Action {
    match method {
        Method::Get => route_get(path),
        Method::Post => route_post(path),
        Method::Other(_) => Action::NotFound,
    }
}

fn route_get(path: &str) -> Action {
    if path == "/" {
        return Action::Home;
    }
    let Some(tail) = path.strip_prefix("/files") else {
        return Action::ServeStatic(path.to_string());
    };
    if let Some(item) = tail.strip_prefix("/delete/") {
        return Action::DeleteItem(format!("/{item}"));
    }
    if let Some(item) = tail.strip_prefix("/rename/") {
        return Action::RenameForm(format!("/{item}"));
    }
    if let Some(item) = tail.strip_prefix("/create_dir/") {
        return Action::CreateDirForm(format!("/{item}"));
    }
    if let Some(item) = tail.strip_prefix("/move_confirm") {
        return Action::MoveConfirm(item.to_string());
    }
    if let Some(item) = tail.strip_prefix("/move/") {
        return Action::MoveForm(format!("/{item}"));
    }
    Action::Browse(tail.to_string())
}

fn route_post(path: &str) -> Action {
    let Some(tail) = path.strip_prefix("/files") else {
        return Action::NotFound;
    };
    if let Some(dir) = tail.strip_prefix("/upload") {
        return Action::Upload(dir.to_string());
    }
    if let Some(item) = tail.strip_prefix("/rename/") {
        return Action::RenamePerform(format!("/{item}"));
    }
    if let Some(item) = tail.strip_prefix("/create_dir/") {
        return Action::CreateDirPerform(format!("/{item}"));
    }
    Action::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(path: &str) -> Action {
        route(&Method::Get, path)
    }

    fn post(path: &str) -> Action {
        route(&Method::Post, path)
    }

    #[test]
    fn home_and_static() {
        assert_eq!(get("/"), Action::Home);
        assert_eq!(get("/style.css"), Action::ServeStatic("/style.css".into()));
        assert_eq!(get("/about"), Action::ServeStatic("/about".into()));
    }

    #[test]
    fn management_routes_keep_item_paths() {
        assert_eq!(
            get("/files/delete/docs/a.txt"),
            Action::DeleteItem("/docs/a.txt".into())
        );
        assert_eq!(
            get("/files/rename/a.txt"),
            Action::RenameForm("/a.txt".into())
        );
        assert_eq!(
            get("/files/create_dir/docs"),
            Action::CreateDirForm("/docs".into())
        );
        assert_eq!(get("/files/move/a.txt"), Action::MoveForm("/a.txt".into()));
    }

    #[test]
    fn move_confirm_allows_bare_tail() {
        assert_eq!(
            get("/files/move_confirm/docs/a.txt"),
            Action::MoveConfirm("/docs/a.txt".into())
        );
        assert_eq!(get("/files/move_confirm"), Action::MoveConfirm(String::new()));
        // A path starting with move_confirm is not mistaken for move.
        assert!(matches!(get("/files/move_confirm/x"), Action::MoveConfirm(_)));
    }

    #[test]
    fn browse_covers_bare_and_nested_dirs() {
        assert_eq!(get("/files"), Action::Browse(String::new()));
        assert_eq!(get("/files/"), Action::Browse("/".into()));
        assert_eq!(get("/files/docs"), Action::Browse("/docs".into()));
        // No trailing slash after the operation name means no match.
        assert_eq!(get("/files/delete"), Action::Browse("/delete".into()));
    }

    #[test]
    fn post_routes() {
        assert_eq!(post("/files/upload"), Action::Upload(String::new()));
        assert_eq!(post("/files/upload/docs"), Action::Upload("/docs".into()));
        assert_eq!(
            post("/files/rename/a.txt"),
            Action::RenamePerform("/a.txt".into())
        );
        assert_eq!(
            post("/files/create_dir/docs"),
            Action::CreateDirPerform("/docs".into())
        );
        assert_eq!(post("/files/other"), Action::NotFound);
        assert_eq!(post("/elsewhere"), Action::NotFound);
    }

    #[test]
    fn unsupported_methods_are_not_found() {
        assert_eq!(
            route(&Method::Other("PUT".into()), "/files/docs"),
            Action::NotFound
        );
        assert_eq!(route(&Method::Other("HEAD".into()), "/"), Action::NotFound);
    }
}
