use anyhow::{Result, anyhow};
use percent_encoding::percent_decode_str;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tiny_http::{Header, Response, Server};

/// static file server over the staged working tree, running on its own thread
///
/// the served directory mutates in place as commits are checked out; only one
/// client (the local browser) ever connects, so a single serve loop is enough
pub struct FileServer {
    server: Arc<Server>,
    port: u16,
    handle: Option<JoinHandle<()>>,
}

impl FileServer {
    /// bind the port and start serving `root` in the background
    pub fn start(root: &Path, port: u16) -> Result<Self> {
        let server = Server::http(("127.0.0.1", port))
            .map_err(|e| anyhow!("failed to bind port {port}: {e}"))?;
        let server = Arc::new(server);

        // binding port 0 picks an ephemeral port, report the real one
        let port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .unwrap_or(port);

        let worker = Arc::clone(&server);
        let root = root.to_path_buf();
        let handle = thread::spawn(move || {
            for request in worker.incoming_requests() {
                let _ = match load(&root, request.url()) {
                    Some((data, mime)) => {
                        request.respond(Response::from_data(data).with_header(content_type(&mime)))
                    }
                    None => request.respond(Response::from_string("not found").with_status_code(404)),
                };
            }
        });

        Ok(Self {
            server,
            port,
            handle: Some(handle),
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// stop the serve loop and join the thread; drop covers error paths
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for FileServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// read the file a request maps to, with its guessed content type
fn load(root: &Path, url: &str) -> Option<(Vec<u8>, String)> {
    let path = resolve(root, url)?;
    let data = fs::read(&path).ok()?;
    let mime = mime_guess::from_path(&path)
        .first_or_octet_stream()
        .to_string();
    Some((data, mime))
}

/// resolve a request path under the root, rejecting traversal outside it;
/// directory requests fall back to index.html
fn resolve(root: &Path, url: &str) -> Option<PathBuf> {
    let path = url.split(['?', '#']).next().unwrap_or("");

    let mut resolved = root.to_path_buf();
    for part in path.split('/') {
        // browsers percent-encode spaces and non-ascii in asset paths; the
        // traversal check applies to the decoded segment
        let part = percent_decode_str(part).decode_utf8().ok()?;
        match part.as_ref() {
            "" | "." => {}
            ".." => return None,
            part => resolved.push(part),
        }
    }

    if resolved.is_dir() {
        resolved.push("index.html");
    }
    resolved.is_file().then_some(resolved)
}

fn content_type(mime: &str) -> Header {
    Header::from_bytes(&b"Content-Type"[..], mime.as_bytes()).expect("header name is valid")
}
