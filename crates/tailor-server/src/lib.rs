//! Development server with live reload for tailor sites.
//!
//! Serves the built output directory, rebuilds on file changes and tells
//! connected browsers to reload over a WebSocket.

pub mod livereload;
pub mod server;
pub mod watcher;

pub use livereload::{reload_client_script, LiveReload, ReloadHub, ReloadMessage};
pub use server::{DevServer, DevServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent};
