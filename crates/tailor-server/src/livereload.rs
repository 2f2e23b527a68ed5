//! WebSocket-based live reload.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use tailor_config::{Transform, TransformError};

/// WebSocket endpoint the client script connects to.
pub const RELOAD_PATH: &str = "/__reload";

/// Route serving the client script.
pub const SCRIPT_PATH: &str = "/__reload.js";

/// Messages sent to connected browsers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReloadMessage {
    /// Connection established
    Connected,

    /// The site was rebuilt
    Reload,

    /// A rebuild failed; the page stays as it is
    BuildFailed { message: String },
}

/// Hub for broadcasting reload messages to all connected clients.
#[derive(Debug, Clone)]
pub struct ReloadHub {
    sender: broadcast::Sender<ReloadMessage>,
}

impl ReloadHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(16);
        Self { sender }
    }

    /// Send a message to all connected clients.
    pub fn send(&self, msg: ReloadMessage) {
        // No receivers is fine.
        let _ = self.sender.send(msg);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadMessage> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Client-side script that reloads the page after each rebuild.
pub fn reload_client_script() -> String {
    format!(
        r#"(function() {{
  'use strict';

  function connect(attempt) {{
    const ws = new WebSocket('ws://' + location.host + '{RELOAD_PATH}');

    ws.onopen = function() {{
      attempt = 0;
    }};

    ws.onmessage = function(event) {{
      const msg = JSON.parse(event.data);

      switch (msg.type) {{
        case 'reload':
          location.reload();
          break;

        case 'build_failed':
          console.error('[tailor] Build failed:', msg.message);
          break;

        case 'connected':
          console.log('[tailor] Live reload connected');
          break;
      }}
    }};

    ws.onclose = function() {{
      if (attempt < 10) {{
        setTimeout(function() {{ connect(attempt + 1); }}, 1000 * (attempt + 1));
      }}
    }};
  }}

  connect(0);
}})();
"#
    )
}

/// Injects the live reload script into every emitted HTML page.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveReload;

impl LiveReload {
    pub const TAG: &'static str = "<script src=\"/__reload.js\"></script>";
}

impl Transform for LiveReload {
    fn apply(&self, content: &str, output_path: Option<&Path>) -> Result<String, TransformError> {
        let is_html = output_path
            .and_then(Path::extension)
            .is_some_and(|ext| ext == "html");
        if !is_html {
            return Ok(content.to_string());
        }

        Ok(match content.rfind("</body>") {
            Some(index) => {
                let (head, tail) = content.split_at(index);
                format!("{head}{}{tail}", Self::TAG)
            }
            None => format!("{content}{}", Self::TAG),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hub_broadcasts_messages() {
        let hub = ReloadHub::new();
        let mut rx = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 1);

        hub.send(ReloadMessage::Reload);

        assert_eq!(rx.try_recv().unwrap(), ReloadMessage::Reload);
    }

    #[test]
    fn serializes_messages() {
        let reload = serde_json::to_string(&ReloadMessage::Reload).unwrap();
        assert_eq!(reload, r#"{"type":"reload"}"#);

        let failed = serde_json::to_string(&ReloadMessage::BuildFailed {
            message: "boom".to_string(),
        })
        .unwrap();
        assert_eq!(failed, r#"{"type":"build_failed","message":"boom"}"#);
    }

    #[test]
    fn client_script_connects_to_reload_endpoint() {
        let script = reload_client_script();

        assert!(script.contains("location.host + '/__reload'"));
        assert!(script.contains("case 'reload'"));
    }

    #[test]
    fn injects_before_closing_body() {
        let out = LiveReload
            .apply(
                "<html><body><p>x</p></body></html>",
                Some(Path::new("_site/index.html")),
            )
            .unwrap();

        assert_eq!(
            out,
            "<html><body><p>x</p><script src=\"/__reload.js\"></script></body></html>"
        );
    }

    #[test]
    fn appends_without_body() {
        let out = LiveReload
            .apply("<p>x</p>", Some(Path::new("a.html")))
            .unwrap();

        assert!(out.ends_with(LiveReload::TAG));
    }

    #[test]
    fn leaves_other_files_alone() {
        for path in [Some(Path::new("feed.xml")), None] {
            let out = LiveReload.apply("<body></body>", path).unwrap();
            assert_eq!(out, "<body></body>");
        }
    }
}
