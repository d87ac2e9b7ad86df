//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Storage server settings, from flags or the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "unitrack-server")]
#[command(about = "Stores unitrack progress exports as JSON files", long_about = None)]
#[command(version)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "UNITRACK_ADDR", default_value = "0.0.0.0:3001")]
    pub addr: SocketAddr,

    /// Directory holding the stored files
    #[arg(long, env = "UNITRACK_STORAGE_DIR", default_value = "storage")]
    pub storage_dir: PathBuf,

    /// Built front-end served for any other path
    #[arg(long, env = "UNITRACK_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,
}
