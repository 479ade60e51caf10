//! Local server with preview mode
//!
//! Serves the generated output. Entering preview mode regenerates the
//! site from the given snapshot ref into the preview directory and sets
//! a cookie; while the cookie is present the fallback serves the
//! preview output instead of the published one.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::commands;
use crate::Nebula;

/// Server state
struct ServerState {
    nebula: Nebula,
}

/// Start the server
pub async fn start(nebula: &Nebula, ip: &str, port: u16, open: bool) -> Result<()> {
    let state = Arc::new(ServerState {
        nebula: nebula.clone(),
    });

    let app = Router::new()
        .route("/api/preview", get(preview_handler))
        .route("/api/exit-preview", get(exit_preview_handler))
        .fallback(fallback_handler)
        .with_state(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    // Open browser if requested
    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Debug, Deserialize)]
struct PreviewParams {
    /// Preview snapshot ref handed out by the content backend
    token: String,
}

/// Enter preview mode: regenerate from the preview ref, set the cookie
async fn preview_handler(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<PreviewParams>,
) -> Response {
    tracing::info!("Entering preview mode");

    if let Err(e) = commands::generate::run_preview(&state.nebula, &params.token).await {
        tracing::error!("Preview generation failed: {:#}", e);
        return (
            StatusCode::BAD_GATEWAY,
            format!("Preview generation failed: {}", e),
        )
            .into_response();
    }

    let cookie = format!(
        "{}={}; Path=/; HttpOnly",
        state.nebula.config.preview.cookie, params.token
    );
    redirect_with_cookie("/", &cookie)
}

/// Leave preview mode: clear the cookie
async fn exit_preview_handler(State(state): State<Arc<ServerState>>) -> Response {
    tracing::info!("Leaving preview mode");
    let cookie = format!(
        "{}=; Path=/; HttpOnly; Max-Age=0",
        state.nebula.config.preview.cookie
    );
    redirect_with_cookie("/", &cookie)
}

fn redirect_with_cookie(location: &str, cookie: &str) -> Response {
    Response::builder()
        .status(StatusCode::SEE_OTHER)
        .header(header::LOCATION, location)
        .header(header::SET_COOKIE, cookie)
        .body(Body::empty())
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

/// Fallback handler serving static files from the active output directory
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let preview = has_preview_cookie(request.headers(), &state.nebula.config.preview.cookie);

    let root = if preview && state.nebula.preview_dir.exists() {
        &state.nebula.preview_dir
    } else {
        &state.nebula.public_dir
    };

    let mut service = ServeDir::new(root).append_index_html_on_directories(true);
    match service.try_call(request).await {
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

/// Whether the preview cookie is present with a non-empty value
fn has_preview_cookie(headers: &HeaderMap, name: &str) -> bool {
    let Some(cookies) = headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    cookies.split(';').any(|cookie| {
        let cookie = cookie.trim();
        cookie
            .strip_prefix(name)
            .and_then(|rest| rest.strip_prefix('='))
            .is_some_and(|value| !value.is_empty())
    })
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
