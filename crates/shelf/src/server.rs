//! Blocking accept loop serving one connection at a time.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};

use log::{debug, info, warn};

use shelf_http::{Response, ResponseWriter, read_head};
use shelf_store::FileStore;

use crate::context::ServerContext;
use crate::handlers::handle_request;

/// The file manager server.
///
/// Connections are served sequentially on the calling thread. A failure
/// on one connection is logged and answered with a 500 when the socket
/// still accepts writes; the listener itself never stops.
pub struct Server<S> {
    listener: TcpListener,
    ctx: ServerContext<S>,
    writer: ResponseWriter,
}

impl<S: FileStore> Server<S> {
    /// Bind the listener and prepare to serve.
    ///
    /// # Errors
    ///
    /// Fails when the address cannot be bound.
    pub fn bind(addr: impl ToSocketAddrs, ctx: ServerContext<S>) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        info!("listening on {}", listener.local_addr()?);
        Ok(Self {
            listener,
            ctx,
            writer: ResponseWriter::new(),
        })
    }

    /// The bound address, useful after binding port 0.
    ///
    /// # Errors
    ///
    /// Propagates the socket query failure.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept and serve connections until the process exits.
    pub fn run(&mut self) {
        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    debug!("client connected from {peer}");
                    self.serve_connection(stream);
                }
                Err(err) => warn!("accept failed: {err}"),
            }
        }
    }

    fn serve_connection(&mut self, mut stream: TcpStream) {
        if let Some(timeout) = self.ctx.read_timeout() {
            if let Err(err) = stream.set_read_timeout(Some(timeout)) {
                warn!("cannot set read timeout: {err}");
            }
        }
        if let Err(err) = self.handle(&mut stream) {
            warn!("connection failed: {err}");
            let apology = Response::server_error("Internal Server Error");
            if let Err(err) = self.writer.write_to(&mut stream, apology) {
                debug!("error page not sent: {err}");
            }
        }
        // Dropping the stream closes the connection.
    }

    /// Read, dispatch, and answer one request.
    ///
    /// An `Err` here means nothing has been written yet, so the caller
    /// may still send an error page. Failures while writing the
    /// response are only logged: bytes may already be on the wire.
    fn handle(&mut self, stream: &mut TcpStream) -> io::Result<()> {
        let Some((head, leftover)) = read_head(stream, self.ctx.read_config())? else {
            debug!("peer closed without sending a request");
            return Ok(());
        };
        let response = handle_request(&self.ctx, stream, &head, leftover)?;
        let status = response.status();
        match self.writer.write_to(stream, response) {
            Ok(()) => info!("{} {} -> {}", head.method, head.path, status.code()),
            Err(err) => warn!("response not fully sent: {err}"),
        }
        Ok(())
    }
}
