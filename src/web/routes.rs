//! HTTP route handlers for the web interface.

use super::templates;
use crate::config::Config;
use crate::image_proc::{self, ProcessingError};
use axum::{
    body::Bytes,
    extract::{Form, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub session: Arc<RwLock<Session>>,
    pub config_path: String,
}

/// The current source image and the latest dithered output
///
/// Owned by the host behind a lock; every parameter change or new source
/// reprocesses from `source` and overwrites `output_png`, so a newer run
/// simply supersedes an older result.
#[derive(Default)]
pub struct Session {
    pub source: Option<image::RgbaImage>,
    pub source_name: Option<String>,
    pub output_png: Option<Vec<u8>>,
}

/// Form data for parameter updates
#[derive(Debug, Deserialize)]
pub struct ParamsForm {
    pub image_url: String,
    pub scale_factor: u32,
    #[serde(default)]
    pub grayscale: Option<String>,
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
}

fn default_max_dimension() -> u32 {
    1920
}

/// GET / - Main control page
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let config = state.config.read().await;
    let session = state.session.read().await;
    Html(templates::render_index_page(&config, &session, None))
}

/// POST /image - Drag-and-drop intake: raw image bytes in the request body
pub async fn upload_image(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let decoded = image::ImageReader::new(std::io::Cursor::new(body))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)
        .and_then(|reader| reader.decode());

    let img = match decoded {
        Ok(img) => img,
        Err(e) => {
            tracing::warn!("Dropped file could not be decoded: {}", e);
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Not a decodable image: {}", e),
            );
        }
    };

    let max_dimension = state.config.read().await.max_dimension;
    let source = image_proc::normalize_source(&img, max_dimension);

    {
        let mut session = state.session.write().await;
        session.source_name = Some(format!("dropped image ({}x{})", img.width(), img.height()));
        session.source = Some(source);
        session.output_png = None;
    }

    match reprocess(&state).await {
        Ok(_) => (StatusCode::OK, "ok".to_string()),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Processing failed: {}", e),
        ),
    }
}

/// POST /save - Save parameters and reprocess the loaded source, if any
pub async fn save_config(
    State(state): State<AppState>,
    Form(form): Form<ParamsForm>,
) -> impl IntoResponse {
    if let Err(e) = update_config(&state, &form).await {
        return render_page(&state, Some(&format!("Error: {}", e))).await;
    }

    let has_source = state.session.read().await.source.is_some();
    if has_source {
        if let Err(e) = reprocess(&state).await {
            return render_page(&state, Some(&format!("Saved, but processing failed: {}", e)))
                .await;
        }
        render_page(&state, Some("Parameters saved and image reprocessed!")).await
    } else {
        render_page(&state, Some("Parameters saved.")).await
    }
}

/// POST /apply - Save parameters and reprocess, fetching the configured URL
/// first when no source is loaded yet
pub async fn save_and_apply(
    State(state): State<AppState>,
    Form(form): Form<ParamsForm>,
) -> impl IntoResponse {
    if let Err(e) = update_config(&state, &form).await {
        return render_page(&state, Some(&format!("Error saving: {}", e))).await;
    }

    let needs_fetch = state.session.read().await.source.is_none();
    if needs_fetch {
        if let Err(e) = fetch_source(&state).await {
            return render_page(&state, Some(&format!("Fetch failed: {}", e))).await;
        }
    }

    match reprocess(&state).await {
        Ok(_) => render_page(&state, Some("Parameters applied!")).await,
        Err(e) => render_page(&state, Some(&format!("Saved, but processing failed: {}", e))).await,
    }
}

/// GET /action/:action - Session actions
pub async fn session_action(
    State(state): State<AppState>,
    Path(action): Path<String>,
) -> impl IntoResponse {
    let result = match action.as_str() {
        "fetch" => match fetch_source(&state).await {
            Ok(_) => reprocess(&state).await,
            Err(e) => Err(e),
        },
        "reprocess" => reprocess(&state).await,
        "clear" => {
            *state.session.write().await = Session::default();
            Ok(())
        }
        _ => {
            return (
                StatusCode::NOT_FOUND,
                Html(templates::render_message_page("Not Found", "Unknown action", true)),
            );
        }
    };

    match result {
        Ok(_) => (
            StatusCode::OK,
            Html(templates::render_message_page(
                "Success",
                &format!("Action '{}' completed successfully!", action),
                true,
            )),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(templates::render_message_page(
                "Error",
                &format!("Action failed: {}", e),
                true,
            )),
        ),
    }
}

/// GET /output.png - The latest dithered result, for preview and download
pub async fn output_png(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;
    match &session.output_png {
        Some(png) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "image/png")],
            png.clone(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "No dithered output yet").into_response(),
    }
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Re-run the full pipeline from the stored source with current parameters
async fn reprocess(state: &AppState) -> Result<(), ProcessingError> {
    let params = state.config.read().await.params();

    let mut session = state.session.write().await;
    let source = session.source.as_ref().ok_or(ProcessingError::NoSourceImage)?;
    let output = image_proc::process_image(source, &params)?;
    session.output_png = Some(image_proc::encode_png(&output)?);

    tracing::info!("Reprocessed session image");
    Ok(())
}

/// Fetch the configured URL and install it as the session source
async fn fetch_source(state: &AppState) -> Result<(), ProcessingError> {
    let (url, max_dimension) = {
        let config = state.config.read().await;
        (config.image_url.clone(), config.max_dimension)
    };

    let img = image_proc::fetch_image(&url).await?;
    let source = image_proc::normalize_source(&img, max_dimension);

    let mut session = state.session.write().await;
    session.source_name = Some(url);
    session.source = Some(source);
    session.output_png = None;
    Ok(())
}

/// Update configuration from form data
///
/// Validation and save run on a local copy; the shared config only changes
/// once both succeed, so a rejected form never leaves invalid values live.
async fn update_config(state: &AppState, form: &ParamsForm) -> Result<(), String> {
    let mut config = state.config.write().await;

    let mut updated = config.clone();
    updated.image_url = form.image_url.clone();
    updated.scale_factor = form.scale_factor;
    updated.grayscale = form.grayscale.is_some();
    updated.max_dimension = form.max_dimension;

    updated.validate().map_err(|e| e.to_string())?;
    updated.save(&state.config_path).map_err(|e| e.to_string())?;
    *config = updated;

    tracing::info!("Configuration saved to {}", state.config_path);
    Ok(())
}

async fn render_page(state: &AppState, status: Option<&str>) -> Html<String> {
    let config = state.config.read().await;
    let session = state.session.read().await;
    Html(templates::render_index_page(&config, &session, status))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state(config_file: &str) -> AppState {
        AppState {
            config: Arc::new(RwLock::new(Config::default())),
            session: Arc::new(RwLock::new(Session::default())),
            config_path: std::env::temp_dir()
                .join(config_file)
                .to_string_lossy()
                .into_owned(),
        }
    }

    fn form(scale_factor: u32, grayscale: bool) -> ParamsForm {
        ParamsForm {
            image_url: String::new(),
            scale_factor,
            grayscale: grayscale.then(|| "on".to_string()),
            max_dimension: 1920,
        }
    }

    #[tokio::test]
    async fn rejected_form_leaves_config_untouched() {
        let state = test_state("ditherdrop-reject-test.json");
        assert!(update_config(&state, &form(0, true)).await.is_err());

        let config = state.config.read().await;
        assert_eq!(config.scale_factor, Config::default().scale_factor);
        assert!(!config.grayscale);
    }

    #[tokio::test]
    async fn valid_form_is_applied_and_saved() {
        let state = test_state("ditherdrop-apply-test.json");
        update_config(&state, &form(4, true)).await.unwrap();

        let config = state.config.read().await;
        assert_eq!(config.scale_factor, 4);
        assert!(config.grayscale);

        let saved = Config::load(&state.config_path).unwrap();
        assert_eq!(saved.scale_factor, 4);
        let _ = std::fs::remove_file(&state.config_path);
    }
}
