use std::path::{Path, PathBuf};

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use notify::{Event, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tower_http::services::ServeDir;
use tower_livereload::LiveReloadLayer;
use tracing::{info, warn};

use backdrop::Tuning;

use crate::page;

/// Load the tuning (defaults when no file is given)
pub fn load_tuning(tuning: Option<&Path>) -> anyhow::Result<Tuning> {
    match tuning {
        Some(path) => Ok(Tuning::load(path)?),
        None => Ok(Tuning::default()),
    }
}

/// Regenerate the preview page from the tuning file
fn regenerate(tuning: Option<&Path>, output: &Path) -> anyhow::Result<()> {
    let tuning = load_tuning(tuning)?;
    page::render(&tuning, output)?;
    Ok(())
}

/// Body of the contact form
#[derive(Debug, Clone, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub company: String,
    pub message: String,
}

impl ContactForm {
    fn missing_field(&self) -> Option<&'static str> {
        if self.name.trim().is_empty() {
            Some("name")
        } else if !self.email.contains('@') {
            Some("email")
        } else if self.message.trim().is_empty() {
            Some("message")
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactReply {
    pub ok: bool,
    pub message: String,
}

/// Contact form stub: validates and acknowledges, nothing is stored or sent
pub async fn contact(Json(form): Json<ContactForm>) -> (StatusCode, Json<ContactReply>) {
    if let Some(field) = form.missing_field() {
        warn!(field, "rejected contact form");
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ContactReply {
                ok: false,
                message: format!("Please fill in your {field}."),
            }),
        );
    }

    info!(
        name = %form.name,
        company = %form.company,
        chars = form.message.len(),
        "contact form received"
    );
    (
        StatusCode::ACCEPTED,
        Json(ContactReply {
            ok: true,
            message: "Thanks! We will get back to you soon.".to_string(),
        }),
    )
}

/// Start the preview server with hot reload
pub async fn serve(tuning: Option<&Path>, output: &Path, port: u16) -> anyhow::Result<()> {
    // Generate initial page
    regenerate(tuning, output)?;
    println!("Generated preview page in {}", output.display());

    // Create channel for file change notifications
    let (tx, mut rx) = mpsc::channel::<()>(1);

    // Watch the tuning file's parent directory, if there is a tuning file
    let tuning_name = tuning.and_then(Path::file_name).map(|n| n.to_os_string());
    let mut watcher = notify::recommended_watcher(move |res: Result<Event, _>| {
        if let Ok(event) = res {
            let touches_tuning = event
                .paths
                .iter()
                .any(|p| p.file_name() == tuning_name.as_deref());
            if touches_tuning && (event.kind.is_modify() || event.kind.is_create()) {
                let _ = tx.blocking_send(());
            }
        }
    })?;
    if let Some(path) = tuning {
        let watch_path = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        watcher.watch(&watch_path, RecursiveMode::NonRecursive)?;
    }

    // Spawn regeneration task
    let tuning_for_regen = tuning.map(Path::to_path_buf);
    let output_for_regen = output.to_path_buf();
    tokio::spawn(async move {
        while rx.recv().await.is_some() {
            // Debounce: wait a bit for rapid changes to settle
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

            // Drain any additional notifications
            while rx.try_recv().is_ok() {}

            match regenerate(tuning_for_regen.as_deref(), &output_for_regen) {
                Ok(()) => info!("regenerated preview page"),
                Err(e) => warn!("error regenerating: {e:#}"),
            }
        }
    });

    // Create live reload layer
    let livereload = LiveReloadLayer::new();
    let reloader = livereload.reloader();

    // Reload the browser when the output changes (page or rebuilt wasm package)
    let mut output_watcher = notify::recommended_watcher(move |res: Result<Event, _>| {
        if let Ok(event) = res {
            if event.kind.is_modify() || event.kind.is_create() {
                reloader.reload();
            }
        }
    })?;
    output_watcher.watch(output, RecursiveMode::Recursive)?;

    // Build the router
    let app = Router::new()
        .route("/api/contact", post(contact))
        .fallback_service(ServeDir::new(output))
        .layer(livereload);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!("Preview server running at http://localhost:{port}");
    if let Some(path) = tuning {
        println!("Watching {} for changes...", path.display());
    }
    println!("Press Ctrl+C to stop");

    // Keep watchers alive
    let _watcher = watcher;
    let _output_watcher = output_watcher;

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, message: &str) -> ContactForm {
        ContactForm {
            name: name.to_string(),
            email: email.to_string(),
            company: String::new(),
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn contact_accepts_complete_form() {
        let (status, Json(reply)) = contact(Json(form("Ada", "ada@example.com", "Hello"))).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert!(reply.ok);
    }

    #[tokio::test]
    async fn contact_rejects_missing_fields() {
        let (status, Json(reply)) = contact(Json(form("Ada", "not-an-email", "Hello"))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(!reply.ok);
        assert!(reply.message.contains("email"));

        let (status, _) = contact(Json(form("  ", "ada@example.com", "Hello"))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn company_is_optional() {
        let form: ContactForm =
            serde_json::from_str(r#"{"name":"Ada","email":"a@b.c","message":"Hi"}"#).unwrap();
        assert!(form.company.is_empty());
        assert_eq!(form.missing_field(), None);
    }

    #[test]
    fn regenerate_writes_index() {
        let dir = tempfile::tempdir().expect("temp dir");
        regenerate(None, dir.path()).expect("regenerate failed");
        assert!(dir.path().join("index.html").exists());
    }
}
