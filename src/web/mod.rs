// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Picsort Contributors

//! Web UI for the Picsort triage workflow

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Router,
};
use base64::{engine::general_purpose, Engine as _};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::archive::{build_archive, ARCHIVE_NAME};
use crate::category::Category;
use crate::config::AppConfig;
use crate::preview::render_preview;
use crate::session::{SortingSession, UploadedImage};
use crate::{PicsortError, Result};

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub session: std::sync::Mutex<SortingSession>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            session: std::sync::Mutex::new(SortingSession::new()),
        }
    }

    fn lock_session(&self) -> Result<std::sync::MutexGuard<'_, SortingSession>> {
        self.session
            .lock()
            .map_err(|_| PicsortError::Config("Session lock poisoned".to_string()))
    }
}

impl IntoResponse for PicsortError {
    fn into_response(self) -> Response {
        let status = match &self {
            PicsortError::UnknownCategory(_) | PicsortError::InvalidUpload(_) => {
                StatusCode::BAD_REQUEST
            }
            PicsortError::EmptyArchive(_) => StatusCode::NOT_FOUND,
            PicsortError::NoImagePending(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Internal error");
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        (status, message).into_response()
    }
}

/// Create the web application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let max_body = state.config.upload.max_body_bytes;

    Router::new()
        // Pages
        .route("/", get(index_page))
        // Actions
        .route("/upload", post(upload_batch))
        .route("/sort/:slug", post(sort_current))
        .route("/reset", post(reset_session))
        .route("/download", get(download_archive))
        // API endpoints
        .route("/api/stats", get(api_get_stats))
        .layer(DefaultBodyLimit::max(max_body))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// === Page Handlers ===

async fn index_page(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    let mut session = state.lock_session()?;

    let main_html = if !session.has_batch() {
        render_uploader(&state.config.upload.extensions)
    } else if session.is_complete() {
        render_complete(session.sorted_count())
    } else {
        render_sorter(&mut session, &state.config)
    };

    let stats_html = render_stats_panel(&session);

    let content = format!(
        r#"
        <h1>Image Content Sorter</h1>
        <div class="layout">
            <div>{}</div>
            <div>{}</div>
        </div>
    "#,
        main_html, stats_html
    );

    Ok(Html(base_template("Sort", &content)))
}

// === Action Handlers ===

async fn upload_batch(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Redirect> {
    let mut files = Vec::new();
    let mut skipped = 0usize;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PicsortError::InvalidUpload(e.to_string()))?
    {
        let filename = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };

        if !state.config.accepts(&filename) {
            debug!("Skipping unsupported upload: {}", filename);
            skipped += 1;
            continue;
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| PicsortError::InvalidUpload(e.to_string()))?;

        if data.is_empty() {
            skipped += 1;
            continue;
        }

        files.push(UploadedImage {
            filename,
            data: data.to_vec(),
        });
    }

    if files.is_empty() {
        return Err(PicsortError::InvalidUpload(
            "no supported image files in upload".to_string(),
        ));
    }

    let count = files.len();
    let mut session = state.lock_session()?;
    let batch_id = session.start_batch(files);

    info!(
        "New batch {:?}: {} images ({} skipped)",
        batch_id, count, skipped
    );

    Ok(Redirect::to("/"))
}

async fn sort_current(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Redirect> {
    let category: Category = slug.parse()?;

    let mut session = state.lock_session()?;
    match session.assign(category) {
        Ok(()) => {
            let (sorted, total) = (session.sorted_count(), session.batch_len());
            info!("Sorted image {}/{} into {}", sorted, total, category.slug());
        }
        // A stale click after completion just rerenders the true state
        Err(PicsortError::NoImagePending(_)) => {
            debug!("Ignoring sort click with no pending image");
        }
        Err(e) => return Err(e),
    }

    Ok(Redirect::to("/"))
}

async fn reset_session(State(state): State<Arc<AppState>>) -> Result<Redirect> {
    let mut session = state.lock_session()?;
    session.reset();
    info!("Session reset, ready for a new batch");
    Ok(Redirect::to("/"))
}

async fn download_archive(State(state): State<Arc<AppState>>) -> Result<Response> {
    let session = state.lock_session()?;
    let bytes = build_archive(session.sorted())?;

    info!(
        "Serving {} ({} files, {} bytes)",
        ARCHIVE_NAME,
        session.sorted_count(),
        bytes.len()
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", ARCHIVE_NAME),
            ),
        ],
        bytes,
    )
        .into_response())
}

// === API Handlers ===

#[derive(Serialize)]
struct StatsResponse {
    total_uploaded: usize,
    sorted_count: usize,
    total_processed: u64,
    sorting_complete: bool,
    categories: Vec<(String, usize)>,
    last_activity: Option<chrono::DateTime<chrono::Utc>>,
}

async fn api_get_stats(State(state): State<Arc<AppState>>) -> Result<Json<StatsResponse>> {
    let session = state.lock_session()?;

    let categories = session
        .category_counts()
        .into_iter()
        .map(|(cat, count)| (cat.slug().to_string(), count))
        .collect();

    Ok(Json(StatsResponse {
        total_uploaded: session.batch_len(),
        sorted_count: session.sorted_count(),
        total_processed: session.total_processed(),
        sorting_complete: session.is_complete(),
        categories,
        last_activity: session.last_activity(),
    }))
}

// === Template Rendering ===

fn base_template(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Picsort</title>
    <style>
        :root {{
            --bg-primary: #1a1a2e;
            --bg-secondary: #16213e;
            --bg-card: #0f3460;
            --text-primary: #e8e8e8;
            --text-secondary: #a0a0a0;
            --accent: #e94560;
            --accent-hover: #ff6b6b;
            --success: #00d9a5;
            --border: #2a2a4a;
        }}
        * {{ box-sizing: border-box; margin: 0; padding: 0; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: var(--bg-primary);
            color: var(--text-primary);
            line-height: 1.6;
        }}
        .container {{ max-width: 1100px; margin: 0 auto; padding: 20px; }}
        nav {{
            background: var(--bg-secondary);
            padding: 15px 20px;
            display: flex;
            align-items: center;
            gap: 30px;
            border-bottom: 1px solid var(--border);
        }}
        nav .logo {{
            font-size: 1.5em;
            font-weight: bold;
            color: var(--accent);
            text-decoration: none;
        }}
        .layout {{
            display: grid;
            grid-template-columns: 2fr 1fr;
            gap: 20px;
            margin-top: 20px;
        }}
        .card {{
            background: var(--bg-card);
            border-radius: 12px;
            padding: 20px;
            margin-bottom: 20px;
        }}
        .card h2 {{
            margin-bottom: 15px;
            color: var(--accent);
        }}
        .preview {{
            text-align: center;
            margin: 15px 0;
        }}
        .preview img {{
            max-width: 100%;
            border-radius: 8px;
        }}
        .caption {{
            color: var(--text-secondary);
            font-size: 0.9em;
            margin-top: 8px;
        }}
        .progress-track {{
            width: 100%;
            height: 8px;
            background: var(--bg-secondary);
            border-radius: 4px;
            overflow: hidden;
            margin: 10px 0 20px;
        }}
        .progress-fill {{
            height: 100%;
            background: var(--success);
            border-radius: 4px;
        }}
        .button-grid {{
            display: grid;
            grid-template-columns: repeat(3, 1fr);
            gap: 10px;
        }}
        .button-grid-bottom {{
            display: grid;
            grid-template-columns: repeat(2, 1fr);
            gap: 10px;
            margin-top: 10px;
        }}
        button {{
            width: 100%;
            min-height: 75px;
            padding: 10px;
            border: 1px solid var(--border);
            border-radius: 8px;
            background: var(--bg-secondary);
            color: var(--text-primary);
            font-size: 1em;
            cursor: pointer;
            white-space: normal;
        }}
        button:hover {{
            background: var(--accent);
        }}
        .reset-button {{
            min-height: 45px;
        }}
        table {{
            width: 100%;
            border-collapse: collapse;
        }}
        th, td {{
            padding: 12px;
            text-align: left;
            border-bottom: 1px solid var(--border);
        }}
        th {{ color: var(--text-secondary); font-weight: 500; }}
        input[type="file"] {{
            color: var(--text-secondary);
            margin: 15px 0;
        }}
        .banner {{
            background: var(--bg-secondary);
            border-left: 4px solid var(--success);
            padding: 12px 15px;
            border-radius: 6px;
            margin-bottom: 15px;
        }}
        .error-banner {{
            border-left-color: var(--accent);
        }}
        .download-button {{
            display: inline-block;
            padding: 0.5em 1em;
            background-color: var(--success);
            color: var(--bg-primary);
            text-decoration: none;
            border-radius: 6px;
            margin: 1em 0;
            font-weight: bold;
        }}
        .download-button:hover {{
            filter: brightness(1.1);
        }}
    </style>
</head>
<body>
    <nav>
        <a href="/" class="logo">Picsort</a>
    </nav>
    <main class="container">
        {}
    </main>
</body>
</html>"#,
        title, content
    )
}

fn render_uploader(extensions: &[String]) -> String {
    let accept: String = extensions
        .iter()
        .map(|e| format!(".{}", e))
        .collect::<Vec<_>>()
        .join(",");

    format!(
        r#"
        <div class="card">
            <h2>Upload your images</h2>
            <p>Please upload some images to begin sorting.</p>
            <form action="/upload" method="post" enctype="multipart/form-data">
                <input type="file" name="images" accept="{}" multiple required>
                <button type="submit" class="reset-button">Start Sorting</button>
            </form>
        </div>
    "#,
        accept
    )
}

fn render_sorter(session: &mut SortingSession, config: &AppConfig) -> String {
    let (position, total) = session.progress();
    let pct = (session.progress_fraction() * 100.0).round() as u32;

    let (filename, preview) = match current_preview(session, config.display.max_width) {
        Some(pair) => pair,
        None => return render_uploader(&config.upload.extensions),
    };

    let preview_html = match preview {
        Ok(bytes) => {
            let encoded = general_purpose::STANDARD.encode(&bytes);
            format!(
                r#"
                <div class="preview">
                    <img src="data:image/jpeg;base64,{}" alt="{}">
                    <div class="caption">{}</div>
                </div>
            "#,
                encoded,
                escape_html(&filename),
                escape_html(&filename)
            )
        }
        Err(e) => {
            warn!("Failed to render preview for {}: {}", filename, e);
            format!(
                r#"
                <div class="banner error-banner">
                    Error processing image <strong>{}</strong>. Please start a new batch
                    and try uploading again.
                </div>
                <form action="/reset" method="post">
                    <button type="submit" class="reset-button">Start New Batch</button>
                </form>
            "#,
                escape_html(&filename)
            )
        }
    };

    let buttons_top: String = Category::ALL[..3]
        .iter()
        .map(|c| category_button(*c))
        .collect();
    let buttons_bottom: String = Category::ALL[3..]
        .iter()
        .map(|c| category_button(*c))
        .collect();

    format!(
        r#"
        <div class="card">
            <p>Processing image {} of {}</p>
            <div class="progress-track">
                <div class="progress-fill" style="width: {}%"></div>
            </div>
            {}
            <div class="button-grid">{}</div>
            <div class="button-grid-bottom">{}</div>
        </div>
    "#,
        position, total, pct, preview_html, buttons_top, buttons_bottom
    )
}

fn category_button(category: Category) -> String {
    format!(
        r#"<form action="/sort/{}" method="post"><button type="submit">{}</button></form>"#,
        category.slug(),
        category.label()
    )
}

fn render_complete(sorted_count: usize) -> String {
    format!(
        r#"
        <div class="card">
            <div class="banner">All {} images have been sorted!</div>
            <form action="/reset" method="post">
                <button type="submit" class="reset-button">Start New Batch</button>
            </form>
        </div>
    "#,
        sorted_count
    )
}

fn render_stats_panel(session: &SortingSession) -> String {
    let rows: String = session
        .category_counts()
        .iter()
        .map(|(cat, count)| {
            format!(
                r#"<tr><td>{}</td><td>{}</td></tr>"#,
                cat.label(),
                count
            )
        })
        .collect();

    let download_html = if session.sorted_count() > 0 {
        format!(
            r#"<a href="/download" class="download-button">Download Sorted Images ({} files)</a>"#,
            session.sorted_count()
        )
    } else {
        String::new()
    };

    format!(
        r#"
        <div class="card">
            <h2>Sorting Statistics</h2>
            <table>
                <tr><th>Category</th><th>Images</th></tr>
                {}
            </table>
            {}
        </div>
    "#,
        rows, download_html
    )
}

/// Resolve the preview for the pending image, reusing the cached resize
/// when the page is rerendered without an assignment in between.
fn current_preview(
    session: &mut SortingSession,
    max_width: u32,
) -> Option<(String, Result<Vec<u8>>)> {
    let filename = session.current()?.filename.clone();

    if let Some(cached) = session.cached_preview(&filename) {
        return Some((filename, Ok(cached.to_vec())));
    }

    let rendered = session
        .current()
        .map(|img| render_preview(&img.data, max_width))?;

    if let Ok(ref bytes) = rendered {
        session.cache_preview(&filename, bytes.clone());
    }

    Some((filename, rendered))
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Start the web server with the given config
pub async fn start_server(config: AppConfig) -> Result<()> {
    let addr = format!("{}:{}", config.web.host, config.web.port);
    let state = Arc::new(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Web UI available at http://{}", addr);

    let router = create_router(state);
    axum::serve(listener, router)
        .await
        .map_err(|e| PicsortError::Config(format!("Server error: {}", e)))?;

    Ok(())
}
