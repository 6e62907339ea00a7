use std::error::Error;
use std::path::Path;
use std::process;

use log::{error, info};

use shelf::config::Config;
use shelf::context::ServerContext;
use shelf::server::Server;
use shelf_store::LocalStore;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        error!("{err}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = Config::load_or_create(Path::new("config.json"))?;
    let store = LocalStore::open(&config.root_dir)?;
    info!(
        "serving {} on {}",
        store.root().display(),
        config.bind_addr
    );
    let ctx = ServerContext::new(store).with_read_timeout(config.read_timeout());
    let mut server = Server::bind(config.bind_addr.as_str(), ctx)?;
    server.run();
    Ok(())
}
