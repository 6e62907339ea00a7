//! Server-rendered management pages.
//!
//! Page builders are pure string functions over store listings, so the
//! markup is testable without sockets. Item paths are percent-encoded
//! wherever they land in a URL; display names stay raw.

use shelf_http::percent_encode;
use shelf_store::Entry;
use shelf_store::path::{dirname, join};

/// Directory listing with per-item actions and the upload and
/// create-directory forms.
#[must_use]
pub fn listing(current_dir: &str, entries: &[Entry]) -> String {
    let mut page = String::from("<html><body>");
    page.push_str(&format!("<h1>Index of /files{current_dir}</h1>"));

    if current_dir != "/" {
        let parent = percent_encode(&dirname(current_dir));
        page.push_str(&format!(
            "<b><a href=\"/files{parent}\">../ (Parent Directory)</a></b><br><br>"
        ));
    }

    if entries.is_empty() {
        page.push_str("<ul><li><i>Directory Empty</i></li></ul>");
    } else {
        page.push_str("<ul>");
        for entry in entries {
            let item_path = join(current_dir, &entry.name);
            let encoded = percent_encode(&item_path);
            page.push_str("<li style=\"padding: 2px\">");
            page.push_str(&format!(
                "<form action=\"/files/delete{encoded}\" method=\"get\" style=\"display:inline;\"><button type=\"submit\">DELETE</button></form> "
            ));
            page.push_str(&format!(
                "<form action=\"/files/rename{encoded}\" method=\"get\" style=\"display:inline;\"><button type=\"submit\">RENAME</button></form> "
            ));
            page.push_str(&format!(
                "<form action=\"/files/move{encoded}\" method=\"get\" style=\"display:inline;\"><button type=\"submit\">MOVE</button></form> - "
            ));
            if entry.is_dir {
                page.push_str(&format!(
                    "<b>[DIR]</b> <a href=\"/files{encoded}\">{}</a>",
                    entry.name
                ));
            } else {
                // Plain files link straight to the static route.
                page.push_str(&format!("<a href=\"{encoded}\">{}</a>", entry.name));
            }
            page.push_str("</li>");
        }
        page.push_str("</ul>");
    }

    page.push_str("<br>");
    let upload_action = percent_encode(&format!("/files/upload{current_dir}"));
    page.push_str(&format!(
        "<form action=\"{upload_action}\" method=\"post\" enctype=\"multipart/form-data\">Select file: <input type=\"file\" name=\"file\"><input type=\"submit\" value=\"Upload\"></form>"
    ));
    let create_action = percent_encode(&format!("/files/create_dir{current_dir}"));
    page.push_str(&format!(
        "<form action=\"{create_action}\" method=\"post\">New Directory Name: <input type=\"text\" name=\"dir_name\">&nbsp&nbsp<input type=\"submit\" value=\"Create Directory\"></form>"
    ));
    page.push_str("<br><a href=\"/\">Go Home</a>");
    page.push_str("</body></html>");
    page
}

/// Form asking for an item's new name.
#[must_use]
pub fn rename_form(item_path: &str) -> String {
    let action = percent_encode(&format!("/files/rename{item_path}"));
    let parent = dirname(item_path);
    format!(
        "<html><body><h1>Rename Item</h1><form action=\"{action}\" method=\"post\">New name: <input type=\"text\" name=\"new_name\">&nbsp<input type=\"submit\" value=\"Rename\"><br><a href=\"/files{parent}\">Cancel</a></form></body></html>"
    )
}

/// Form asking for a new directory name inside `dir_path`.
#[must_use]
pub fn create_dir_form(dir_path: &str) -> String {
    let action = percent_encode(&format!("/files/create_dir{dir_path}"));
    format!(
        "<html><body><h1>Create Directory</h1><form action=\"{action}\" method=\"post\">Directory name: <input type=\"text\" name=\"dir_name\"><input type=\"submit\" value=\"Create\"><br><a href=\"/files{dir_path}\">Cancel</a></form></body></html>"
    )
}

/// Destination picker for moving an item. The item's own directory is
/// filtered out; moving there would be a no-op.
#[must_use]
pub fn move_selection(item_path: &str, destinations: &[String]) -> String {
    let current_dir = dirname(item_path);
    let encoded_item = percent_encode(item_path);
    let mut page = String::from(
        "<html><body><h1>Move Item</h1><p>Select a destination directory:</p><ul>",
    );
    for dest in destinations {
        if *dest == current_dir {
            continue;
        }
        let encoded_dest = percent_encode(dest);
        page.push_str(&format!(
            "<li><a href=\"/files/move_confirm{encoded_item}?dest_dir={encoded_dest}\">{dest}</a></li>"
        ));
    }
    page.push_str("</ul>");
    page.push_str(&format!("<br><a href=\"/files{current_dir}\">Cancel</a>"));
    page.push_str("</body></html>");
    page
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir(name: &str) -> Entry {
        Entry {
            name: name.to_string(),
            is_dir: true,
        }
    }

    fn file(name: &str) -> Entry {
        Entry {
            name: name.to_string(),
            is_dir: false,
        }
    }

    #[test]
    fn root_listing_layout() {
        let page = listing("/", &[dir("docs"), file("a.txt")]);
        assert!(page.contains("<h1>Index of /files/</h1>"));
        assert!(!page.contains("Parent Directory"));
        assert!(page.contains("<form action=\"/files/delete/docs\""));
        assert!(page.contains("<form action=\"/files/rename/a.txt\""));
        assert!(page.contains("<form action=\"/files/move/docs\""));
        assert!(page.contains("<b>[DIR]</b> <a href=\"/files/docs\">docs</a>"));
        // Plain files link to the static route, without the /files prefix.
        assert!(page.contains("<a href=\"/a.txt\">a.txt</a>"));
        assert!(page.contains("action=\"/files/upload/\""));
        assert!(page.contains("enctype=\"multipart/form-data\""));
        assert!(page.contains("action=\"/files/create_dir/\""));
        assert!(page.contains("<a href=\"/\">Go Home</a>"));
    }

    #[test]
    fn subdirectory_listing_links_to_parent() {
        let page = listing("/docs/reports", &[file("q1.txt")]);
        assert!(page.contains("<h1>Index of /files/docs/reports</h1>"));
        assert!(page.contains("<a href=\"/files/docs\">../ (Parent Directory)</a>"));
        assert!(page.contains("/files/delete/docs/reports/q1.txt"));
        assert!(page.contains("action=\"/files/upload/docs/reports\""));
    }

    #[test]
    fn empty_directory_indicator() {
        let page = listing("/empty", &[]);
        assert!(page.contains("<ul><li><i>Directory Empty</i></li></ul>"));
        assert!(page.contains("action=\"/files/upload/empty\""));
    }

    #[test]
    fn names_needing_escapes_are_encoded_in_urls_only() {
        let page = listing("/", &[file("my report.txt")]);
        assert!(page.contains("/files/delete/my%20report.txt"));
        assert!(page.contains("<a href=\"/my%20report.txt\">my report.txt</a>"));
    }

    #[test]
    fn rename_form_posts_back_to_item() {
        let page = rename_form("/docs/old.txt");
        assert!(page.contains("<h1>Rename Item</h1>"));
        assert!(page.contains("action=\"/files/rename/docs/old.txt\" method=\"post\""));
        assert!(page.contains("name=\"new_name\""));
        assert!(page.contains("<a href=\"/files/docs\">Cancel</a>"));
    }

    #[test]
    fn create_dir_form_targets_directory() {
        let page = create_dir_form("/docs");
        assert!(page.contains("<h1>Create Directory</h1>"));
        assert!(page.contains("action=\"/files/create_dir/docs\" method=\"post\""));
        assert!(page.contains("name=\"dir_name\""));
        assert!(page.contains("<a href=\"/files/docs\">Cancel</a>"));
    }

    #[test]
    fn move_selection_filters_current_directory() {
        let dests = vec![
            "/".to_string(),
            "/archive".to_string(),
            "/docs".to_string(),
        ];
        let page = move_selection("/docs/report.txt", &dests);
        assert!(page.contains("<h1>Move Item</h1>"));
        assert!(page.contains("/files/move_confirm/docs/report.txt?dest_dir=/archive"));
        assert!(page.contains("?dest_dir=/\">"));
        // The parent directory is not offered.
        assert!(!page.contains("?dest_dir=/docs\""));
        assert!(page.contains("<a href=\"/files/docs\">Cancel</a>"));
    }
}
