//! Development server implementation.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use tokio::sync::broadcast::error::RecvError;
use tower_http::services::ServeDir;

use tailor_config::{BuildMode, SiteConfig, SiteConfigBuilder};
use tailor_static::{BuildError, BuildResult, StaticBuilder};

use crate::livereload::{reload_client_script, LiveReload, ReloadHub, ReloadMessage, RELOAD_PATH, SCRIPT_PATH};
use crate::watcher::FileWatcher;

/// Configuration for the development server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Project root
    pub root: PathBuf,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,

    pub mode: BuildMode,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            port: 8080,
            host: "127.0.0.1".to_string(),
            open: true,
            mode: BuildMode::Development,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address {0}: {1}")]
    InvalidAddress(String, String),

    #[error("Project root not found: {0}")]
    RootNotFound(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),

    #[error(transparent)]
    BuildError(#[from] BuildError),

    #[error("Build task failed: {0}")]
    TaskError(String),
}

/// Shared server state.
struct ServerState {
    hub: ReloadHub,
}

/// Development server.
///
/// Builds the site, serves the output directory and rebuilds whenever the
/// input directory, a watch target or a passthrough source changes. In
/// development, browsers reload after every successful rebuild.
pub struct DevServer {
    config: DevServerConfig,
}

impl DevServer {
    pub fn new(config: DevServerConfig) -> Self {
        Self { config }
    }

    /// The site configuration served. Development builds get live reload
    /// injected after every other transform; production output is served as
    /// built.
    pub fn site_config(&self) -> SiteConfig {
        let mut site = SiteConfigBuilder::configured(self.config.mode);
        if !self.config.mode.is_production() {
            site.add_transform("livereload", LiveReload);
        }
        site.build()
    }

    /// Start the development server.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr_str = format!("{}:{}", self.config.host, self.config.port);
        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|e: std::net::AddrParseError| ServerError::InvalidAddress(addr_str, e.to_string()))?;

        let root = self
            .config
            .root
            .canonicalize()
            .map_err(|e| ServerError::RootNotFound(format!("{}: {}", self.config.root.display(), e)))?;

        let builder = Arc::new(StaticBuilder::new(&root, self.site_config()));
        let output_dir = builder.output_dir();

        match run_build(&builder).await {
            Ok(result) => log_build(&result),
            Err(e) => tracing::error!("Initial build failed: {}", e),
        }

        let hub = ReloadHub::new();
        let watch_paths = watch_paths(&root, builder.config());
        let (watcher, mut rx) = FileWatcher::new(&watch_paths, &[output_dir.clone()])
            .map_err(|e| ServerError::WatchError(e.to_string()))?;

        let rebuild_hub = hub.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                tracing::info!("{} file(s) changed, rebuilding", event.paths.len());

                match run_build(&builder).await {
                    Ok(result) => {
                        log_build(&result);
                        rebuild_hub.send(ReloadMessage::Reload);
                    }
                    Err(e) => {
                        tracing::error!("Rebuild failed: {}", e);
                        rebuild_hub.send(ReloadMessage::BuildFailed {
                            message: e.to_string(),
                        });
                    }
                }
            }
            // Keep watcher alive
            drop(watcher);
        });

        let app = router(Arc::new(ServerState { hub }), &output_dir);

        tracing::info!("Serving {} at http://{}", output_dir.display(), addr);

        if self.config.open {
            let url = format!("http://{}", addr);
            if let Err(e) = open::that(&url) {
                tracing::warn!("Failed to open browser: {}", e);
            }
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

/// Input directory, watch targets and passthrough sources, resolved against `root`.
fn watch_paths(root: &Path, config: &SiteConfig) -> Vec<PathBuf> {
    let mut paths = vec![root.join(&config.dirs().input)];

    let extra = config
        .watch_targets()
        .iter()
        .map(PathBuf::as_path)
        .chain(config.passthrough_copies().iter().map(|copy| copy.source()));

    for path in extra {
        let path = root.join(path);
        if !paths.iter().any(|p| path.starts_with(p)) {
            paths.push(path);
        }
    }

    paths
}

/// Run a build on the blocking pool.
async fn run_build(builder: &Arc<StaticBuilder>) -> Result<BuildResult, ServerError> {
    let builder = Arc::clone(builder);

    tokio::task::spawn_blocking(move || builder.build())
        .await
        .map_err(|e| ServerError::TaskError(e.to_string()))?
        .map_err(ServerError::from)
}

fn log_build(result: &BuildResult) {
    tracing::info!(
        "Built {} pages, copied {} files in {}ms",
        result.pages,
        result.copied,
        result.duration_ms
    );
}

fn router(state: Arc<ServerState>, output_dir: &Path) -> Router {
    Router::new()
        .route(RELOAD_PATH, get(ws_handler))
        .route(SCRIPT_PATH, get(script_handler))
        .fallback_service(ServeDir::new(output_dir))
        .with_state(state)
}

/// Handler for the live reload WebSocket endpoint.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let rx = state.hub.subscribe();
    ws.on_upgrade(move |socket| handle_ws(socket, rx))
}

/// Forward reload messages to a connected browser.
async fn handle_ws(
    mut socket: WebSocket,
    mut rx: tokio::sync::broadcast::Receiver<ReloadMessage>,
) {
    if send(&mut socket, &ReloadMessage::Connected).await.is_err() {
        return;
    }

    loop {
        match rx.recv().await {
            Ok(msg) => {
                if send(&mut socket, &msg).await.is_err() {
                    break;
                }
            }
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}

async fn send(socket: &mut WebSocket, msg: &ReloadMessage) -> Result<(), ()> {
    let json = serde_json::to_string(msg).map_err(|_| ())?;
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

/// Handler for the live reload client script.
async fn script_handler() -> impl IntoResponse {
    (
        [("content-type", "application/javascript")],
        reload_client_script(),
    )
}
