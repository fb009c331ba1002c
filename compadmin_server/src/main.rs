use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use compadmin_server::demo::Greeter;
use compadmin_server::{AdminConfig, Server};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "compadmin")]
#[command(about = "Admin page for a live component: inspect properties, invoke operations")]
struct Args {
    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind, overrides the config file
    #[arg(long)]
    bind: Option<IpAddr>,

    /// Port to listen on, overrides the config file
    #[arg(short, long)]
    port: Option<u16>,

    /// Path the admin page is served at, e.g. /admin/
    #[arg(long)]
    mount: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AdminConfig::load(path).context("loading config")?,
        None => AdminConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(mount) = args.mount {
        config.mount_path = mount;
    }
    config.validate()?;

    tracing_subscriber::fmt()
        .with_max_level(config.level()?)
        .init();

    let server = Server::new(Arc::new(Greeter::default()), Greeter::registry(), &config);

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    server.serve(listener).await.context("admin server exited")
}
