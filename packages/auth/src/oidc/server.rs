// ABOUTME: Localhost listener serving the /oidc/redirect route during login
// ABOUTME: Captures the identity provider's redirect and answers the browser with the handshake result

use std::time::Duration;

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};
use tracing::{debug, error, info};

use crate::error::{AuthError, AuthResult};
use crate::guard::REDIRECT_PATH;
use crate::oidc::redirect::{HandshakeOutcome, RedirectQuery};

const MAX_REQUEST_BYTES: usize = 8 * 1024;

/// Listener bound to `127.0.0.1:{port}`. Bind before sending the user to the
/// identity provider so the redirect can never race the listener.
pub struct CallbackServer {
    listener: TcpListener,
    port: u16,
}

impl CallbackServer {
    /// Bind the listener. Port 0 picks a free port.
    pub async fn bind(port: u16) -> AuthResult<Self> {
        let addr = format!("127.0.0.1:{}", port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| AuthError::CallbackServer(format!("Failed to bind to {}: {}", addr, e)))?;
        let port = listener
            .local_addr()
            .map_err(|e| AuthError::CallbackServer(format!("Failed to read local address: {}", e)))?
            .port();

        info!("Login callback listening on 127.0.0.1:{}", port);
        Ok(Self { listener, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Origin sent to the identity service as `redirectOrigin`.
    pub fn origin(&self) -> String {
        format!("http://localhost:{}", self.port)
    }

    pub fn redirect_url(&self) -> String {
        format!("{}{}", self.origin(), REDIRECT_PATH)
    }

    /// Wait for the browser to arrive at `/oidc/redirect`. Requests for any
    /// other path (favicon, probes) get a 404 and are skipped.
    pub async fn accept_redirect(&self) -> AuthResult<CallbackRequest> {
        loop {
            let (mut stream, peer_addr) = self.listener.accept().await.map_err(|e| {
                AuthError::CallbackServer(format!("Failed to accept connection: {}", e))
            })?;
            debug!("Received connection from {}", peer_addr);

            let request = match read_request(&mut stream).await {
                Ok(request) => request,
                Err(e) => {
                    debug!("Dropping unreadable request from {}: {}", peer_addr, e);
                    continue;
                }
            };

            let Some(target) = request_target(&request) else {
                let _ = stream.write_all(plain_response(400, "Bad Request").as_bytes()).await;
                continue;
            };

            let path = target.split('?').next().unwrap_or_default();
            if path != REDIRECT_PATH {
                debug!("Ignoring request for {}", path);
                let _ = stream.write_all(plain_response(404, "Not Found").as_bytes()).await;
                continue;
            }

            return Ok(CallbackRequest {
                stream,
                query: RedirectQuery::parse(target),
            });
        }
    }

    /// [`accept_redirect`](Self::accept_redirect) bounded by `timeout`.
    pub async fn accept_redirect_within(&self, timeout: Duration) -> AuthResult<CallbackRequest> {
        tokio::time::timeout(timeout, self.accept_redirect())
            .await
            .map_err(|_| AuthError::CallbackTimeout)?
    }
}

/// A captured redirect whose browser connection is still open.
pub struct CallbackRequest {
    stream: TcpStream,
    query: RedirectQuery,
}

impl CallbackRequest {
    pub fn query(&self) -> &RedirectQuery {
        &self.query
    }

    /// Tell the browser how the handshake ended and close the connection.
    pub async fn respond(mut self, outcome: &HandshakeOutcome) -> AuthResult<()> {
        let response = match outcome.failure() {
            None => html_response(200, "OK", SUCCESS_HTML),
            Some(message) => html_response(400, "Bad Request", &failure_html(message)),
        };

        if let Err(e) = self.stream.write_all(response.as_bytes()).await {
            error!("Failed to send callback response: {}", e);
            return Err(e.into());
        }
        let _ = self.stream.shutdown().await;
        Ok(())
    }
}

async fn read_request(stream: &mut TcpStream) -> std::io::Result<String> {
    let mut buffer = Vec::with_capacity(2048);
    let mut chunk = [0u8; 1024];

    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
        if buffer.windows(4).any(|w| w == b"\r\n\r\n") || buffer.len() >= MAX_REQUEST_BYTES {
            break;
        }
    }

    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// `GET /oidc/redirect?code=.. HTTP/1.1` -> `/oidc/redirect?code=..`
fn request_target(request: &str) -> Option<&str> {
    let mut parts = request.lines().next()?.split_whitespace();
    let _method = parts.next()?;
    parts.next()
}

fn plain_response(status: u16, reason: &str) -> String {
    format!(
        "HTTP/1.1 {} {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        reason.len(),
        reason
    )
}

fn html_response(status: u16, reason: &str, html: &str) -> String {
    format!(
        "HTTP/1.1 {} {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        html.len(),
        html
    )
}

fn failure_html(message: &str) -> String {
    format!(
        r#"<html><body><h1>Login Failed</h1><p>{}</p><p>Return to your terminal and run <code>worksphere login</code> again.</p></body></html>"#,
        escape_html(message)
    )
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const SUCCESS_HTML: &str = r#"<html>
<head>
    <title>WorkSphere Login Successful</title>
    <style>
        body { font-family: system-ui, -apple-system, sans-serif; max-width: 600px; margin: 100px auto; text-align: center; }
        h1 { color: #0d9488; }
        p { color: #64748b; }
    </style>
</head>
<body>
    <h1>Login Successful!</h1>
    <p>You can now close this tab and return to your terminal.</p>
</body>
</html>"#;
