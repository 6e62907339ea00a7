//! Request handling: store operations and page renders behind routes.

use std::io::{self, Read, Write};

use log::{error, info, warn};

use shelf_http::{
    FieldMap, PartSink, ReadChunks, RequestHead, Response, UploadDecoder, drive_upload,
    parse_boundary, parse_params, read_body,
};
use shelf_store::path::{dirname, join, sanitize};
use shelf_store::{FileStore, all_directories};

use crate::context::ServerContext;
use crate::pages;
use crate::routes::{Action, route};
use crate::templates;

/// Handle one parsed request, producing the response to send.
///
/// `leftover` holds body bytes already read past the head terminator.
/// POST bodies are consumed here, buffered for forms and streamed for
/// uploads; GET handlers never touch the stream.
///
/// # Errors
///
/// Only transport failures while consuming a form body surface as
/// errors; everything else becomes a response.
pub fn handle_request<S, R>(
    ctx: &ServerContext<S>,
    stream: &mut R,
    head: &RequestHead,
    leftover: Vec<u8>,
) -> io::Result<Response>
where
    S: FileStore,
    R: Read,
{
    match route(&head.method, &head.path) {
        Action::Home => Ok(home(ctx)),
        Action::Browse(tail) => Ok(browse(ctx, &tail)),
        Action::DeleteItem(tail) => Ok(delete_item(ctx, &tail)),
        Action::RenameForm(tail) => Ok(Response::html(pages::rename_form(&sanitize(&tail)))),
        Action::CreateDirForm(tail) => {
            Ok(Response::html(pages::create_dir_form(&sanitize(&tail))))
        }
        Action::MoveForm(tail) => Ok(move_form(ctx, &tail)),
        Action::MoveConfirm(tail) => Ok(move_confirm(ctx, &tail, &head.query)),
        Action::RenamePerform(tail) => {
            let form = read_form(ctx, stream, head, leftover)?;
            Ok(rename_perform(ctx, &tail, &form))
        }
        Action::CreateDirPerform(tail) => {
            let form = read_form(ctx, stream, head, leftover)?;
            Ok(create_dir_perform(ctx, &tail, &form))
        }
        Action::Upload(tail) => Ok(upload(ctx, stream, head, &leftover, &tail)),
        Action::ServeStatic(path) => Ok(serve_static(ctx, &path)),
        Action::NotFound => Ok(Response::not_found()),
    }
}

fn home<S: FileStore>(ctx: &ServerContext<S>) -> Response {
    let context = [("title", "Home Page")];
    match templates::render(ctx.store(), "/index.html", &context) {
        Some(html) => Response::html(html),
        None => Response::not_found(),
    }
}

fn browse<S: FileStore>(ctx: &ServerContext<S>, tail: &str) -> Response {
    let dir = sanitize(tail);
    if !ctx.store().is_dir(&dir) {
        return Response::not_found();
    }
    let entries = ctx.store().list(&dir);
    Response::html(pages::listing(&dir, &entries))
}

fn delete_item<S: FileStore>(ctx: &ServerContext<S>, tail: &str) -> Response {
    let item = sanitize(tail);
    ctx.store().delete(&item);
    Response::redirect(&format!("/files{}", dirname(&item)))
}

fn move_form<S: FileStore>(ctx: &ServerContext<S>, tail: &str) -> Response {
    let item = sanitize(tail);
    let mut destinations = vec!["/".to_string()];
    destinations.extend(all_directories(ctx.store(), "/", Some(item.as_str())));
    Response::html(pages::move_selection(&item, &destinations))
}

fn move_confirm<S: FileStore>(ctx: &ServerContext<S>, tail: &str, query: &str) -> Response {
    let item = sanitize(tail);
    let params = parse_params(query);
    let dest = sanitize(params.get("dest_dir").unwrap_or("/"));
    ctx.store().move_item(&item, &dest);
    Response::redirect(&format!("/files{dest}"))
}

fn rename_perform<S: FileStore>(ctx: &ServerContext<S>, tail: &str, form: &FieldMap) -> Response {
    let item = sanitize(tail);
    let Some(new_name) = form.get("new_name") else {
        return Response::bad_request("Rename failed");
    };
    ctx.store().rename(&item, new_name);
    Response::redirect(&format!("/files{}", dirname(&item)))
}

fn create_dir_perform<S: FileStore>(
    ctx: &ServerContext<S>,
    tail: &str,
    form: &FieldMap,
) -> Response {
    let dir = sanitize(tail);
    let Some(name) = form.get("dir_name") else {
        return Response::bad_request("Create directory failed");
    };
    ctx.store().make_dir(&join(&dir, name));
    Response::redirect(&format!("/files{dir}"))
}

fn read_form<S, R>(
    ctx: &ServerContext<S>,
    stream: &mut R,
    head: &RequestHead,
    leftover: Vec<u8>,
) -> io::Result<FieldMap>
where
    S: FileStore,
    R: Read,
{
    let body = read_body(stream, leftover, head.content_length(), ctx.read_config())?;
    let text = String::from_utf8_lossy(&body).into_owned();
    Ok(parse_params(&text))
}

fn upload<S, R>(
    ctx: &ServerContext<S>,
    stream: &mut R,
    head: &RequestHead,
    leftover: &[u8],
    tail: &str,
) -> Response
where
    S: FileStore,
    R: Read,
{
    let dir = sanitize(tail);
    let boundary = match parse_boundary(head.content_type()) {
        Ok(boundary) => boundary,
        Err(err) => {
            warn!("upload rejected: {err}");
            return Response::bad_request("Invalid form submission");
        }
    };

    let mut decoder = UploadDecoder::new(&boundary);
    let mut sink = StoreSink {
        store: ctx.store(),
        dir: &dir,
        stream: None,
    };
    match drive_upload(
        stream,
        leftover,
        head.content_length(),
        &mut decoder,
        &mut sink,
        ctx.read_config(),
    ) {
        Ok(()) => Response::redirect(&format!("/files{dir}")),
        Err(err) => {
            error!("upload failed: {err}");
            Response::server_error("File upload failed")
        }
    }
}

/// Streams decoded upload parts into the store.
struct StoreSink<'a, S: FileStore> {
    store: &'a S,
    dir: &'a str,
    stream: Option<Box<dyn Write>>,
}

impl<S: FileStore> PartSink for StoreSink<'_, S> {
    fn open_part(&mut self, filename: &str) -> io::Result<()> {
        let path = join(self.dir, filename);
        info!("saving upload to {path}");
        self.stream = Some(self.store.open_write(&path)?);
        Ok(())
    }

    fn write_part(&mut self, data: &[u8]) -> io::Result<()> {
        match self.stream.as_mut() {
            Some(stream) => stream.write_all(data),
            None => Ok(()),
        }
    }

    fn close_part(&mut self) -> io::Result<()> {
        match self.stream.take() {
            Some(mut stream) => stream.flush(),
            None => Ok(()),
        }
    }
}

fn serve_static<S: FileStore>(ctx: &ServerContext<S>, raw_path: &str) -> Response {
    let mut target = sanitize(raw_path).trim_start_matches('/').to_string();
    if target.is_empty() {
        target = "index".to_string();
    }
    if !target.contains('.') {
        target.push_str(".html");
    }
    let path = format!("/{target}");

    if !ctx.store().is_file(&path) {
        return Response::not_found();
    }
    match ctx.store().open_read(&path) {
        Ok((len, reader)) => {
            let source = ReadChunks::new(reader, ctx.read_config().body_chunk());
            Response::stream(content_type_for(&path), Some(len), Box::new(source))
        }
        Err(err) => {
            warn!("cannot open {path}: {err}");
            Response::not_found()
        }
    }
}

fn content_type_for(path: &str) -> &'static str {
    if path.ends_with(".html") {
        "text/html"
    } else if path.ends_with(".jpg") || path.ends_with(".jpeg") {
        "image/jpeg"
    } else if path.ends_with(".png") {
        "image/png"
    } else if path.ends_with(".gif") {
        "image/gif"
    } else if path.ends_with(".css") {
        "text/css"
    } else if path.ends_with(".js") {
        "application/javascript"
    } else {
        "application/octet-stream"
    }
}
