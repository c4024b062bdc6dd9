use mailer_core::config::{LauncherConfig, ReadinessConfig};

use std::net::TcpListener;
use std::time::Duration;

/// A loopback port nothing is listening on (at the time of the call).
pub fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .and_then(|l| l.local_addr())
        .map(|a| a.port())
        .expect("ephemeral port")
}

/// Launcher config on loopback with short readiness intervals.
pub fn test_config(port: u16, timeout: Duration) -> LauncherConfig {
    LauncherConfig {
        host: "127.0.0.1".to_string(),
        port,
        readiness: ReadinessConfig {
            timeout,
            initial_interval: Duration::from_millis(25),
            max_interval: Duration::from_millis(100),
            ..ReadinessConfig::default()
        },
        ..LauncherConfig::default()
    }
}

/// A `sleep` process that owns a listening socket on a loopback port.
///
/// The listener is handed to the child as its stdin and closed here, so the
/// socket table attributes the port to the child alone.
#[cfg(unix)]
pub fn foreign_listener() -> (std::process::Child, u16) {
    use std::os::fd::OwnedFd;
    use std::process::{Command, Stdio};

    let listener = TcpListener::bind("127.0.0.1:0").expect("listener");
    let port = listener.local_addr().expect("local addr").port();

    let child = Command::new("sleep")
        .arg("60")
        .stdin(Stdio::from(OwnedFd::from(listener)))
        .spawn()
        .expect("sleep should be available");

    (child, port)
}

/// Whether `python3` can be started; tests needing a real HTTP service skip without it.
pub fn python3_available() -> bool {
    std::process::Command::new("python3")
        .arg("--version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// A minimal stand-in for the mail service: `GET /` answers 200, and
/// `POST /send-email` checks the required fields and echoes the sender address.
pub fn http_service_script(port: u16) -> String {
    format!(
        r#"import json
import os
from http.server import BaseHTTPRequestHandler, HTTPServer


class Handler(BaseHTTPRequestHandler):
    def _reply(self, status, body, content_type="application/json"):
        data = body.encode()
        self.send_response(status)
        self.send_header("Content-Type", content_type)
        self.send_header("Content-Length", str(len(data)))
        self.end_headers()
        self.wfile.write(data)

    def do_GET(self):
        if self.path == "/":
            self._reply(200, "<h1>Hello!</h1>", "text/html")
        else:
            self._reply(404, "not found", "text/plain")

    def do_POST(self):
        length = int(self.headers.get("Content-Length", 0))
        data = json.loads(self.rfile.read(length) or b"{{}}")
        if self.path != "/send-email":
            self._reply(404, json.dumps({{"error": "not found"}}))
        elif not data.get("email") or not data.get("subject") or not data.get("plainText"):
            self._reply(400, json.dumps({{"error": "Email address, subject, and plain text content are required"}}))
        else:
            sender = os.environ.get("SENDER_ADDRESS", "")
            self._reply(200, json.dumps({{"message": "Email sent successfully from " + sender}}))

    def log_message(self, *args):
        pass


HTTPServer(("127.0.0.1", {port}), Handler).serve_forever()
"#
    )
}
