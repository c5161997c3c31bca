//! HTTP request handlers
//!
//! The form flow is redirect-after-POST: an upload is validated, stored,
//! classified, and the resulting payload parked in the one-shot result
//! store; the redirect target renders it exactly once, so a refresh never
//! resubmits and never re-shows a stale result.

use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Multipart, Query, State},
    response::{Html, Redirect},
    Json,
};
use serde::Deserialize;
use tracing::{error, info};

use crate::disease;
use crate::report::{self, ReportData};
use crate::storage;

use super::error::{Result, ServerError};
use super::state::{AppState, BatchRow, ResultView, ViewPayload};

// ============================================================================
// Page handlers
// ============================================================================

#[derive(Deserialize)]
pub struct IndexQuery {
    pub show: Option<String>,
    pub rid: Option<String>,
    pub role: Option<String>,
}

/// Render the upload form, or a parked result when a valid one-time token
/// is presented.
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IndexQuery>,
) -> Html<String> {
    let role = query.role.as_deref().unwrap_or("doctor");
    let model_loaded = state.engine.is_loaded();

    if query.show.is_some() {
        if let Some(rid) = &query.rid {
            if let Some(payload) = state.results.take(rid).await {
                return Html(render_payload(&payload, role, model_loaded));
            }
        }
    }
    Html(render_intro(None, role, model_loaded))
}

/// Accept a single (`file`) or batch (`files`) upload, classify, and
/// redirect to the one-shot result page.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Redirect> {
    let mut role = "doctor".to_string();
    let mut want_pdf = false;
    let mut single: Option<(String, Bytes)> = None;
    let mut batch: Vec<(String, Bytes)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(e.to_string()))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "role" => {
                role = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(e.to_string()))?;
            }
            "generate_pdf" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(e.to_string()))?;
                want_pdf = value == "on";
            }
            "file" | "files" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(e.to_string()))?;
                // Browsers submit unfilled file inputs as an empty part with
                // filename=""; those must not count as an upload.
                if file_name.is_empty() && data.is_empty() {
                    continue;
                }
                if field_name == "files" {
                    batch.push((file_name, data));
                } else {
                    single = Some((file_name, data));
                }
            }
            _ => {}
        }
    }

    // Only the two known roles are echoed back through the redirect URL.
    let role = if role == "patient" { "patient" } else { "doctor" };

    let payload = if !batch.is_empty() {
        process_batch(&state, batch)
    } else if let Some((file_name, data)) = single {
        process_single(&state, &file_name, &data, want_pdf)
    } else {
        ViewPayload::Flash {
            message: "Please upload an image".to_string(),
        }
    };

    let rid = state.results.put(payload).await;
    Ok(Redirect::to(&format!("/?show=1&rid={rid}&role={role}")))
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model_loaded": state.engine.is_loaded(),
    }))
}

// ============================================================================
// Prediction flow
// ============================================================================

fn process_single(state: &AppState, file_name: &str, data: &[u8], want_pdf: bool) -> ViewPayload {
    if file_name.is_empty() {
        return ViewPayload::Flash {
            message: "Please upload an image".to_string(),
        };
    }
    if !storage::allowed_file(file_name) {
        return ViewPayload::Flash {
            message: "Invalid file type (allowed: png, jpg, jpeg)".to_string(),
        };
    }

    let stored = match state.uploads.save(file_name, data) {
        Ok(stored) => stored,
        Err(e) => {
            return ViewPayload::Flash {
                message: format!("Upload failed: {e}"),
            }
        }
    };

    let result = match state.engine.predict_bytes(data) {
        Ok(result) => result,
        Err(e) => {
            return ViewPayload::Flash {
                message: format!("Prediction failed: {e}"),
            }
        }
    };
    info!(
        file = %stored.file_name,
        label = %result.label,
        confidence = result.confidence,
        "Classified upload"
    );

    let info = disease::lookup(&result.label);
    let mut view = ResultView {
        label: result.label.clone(),
        confidence: result.confidence_text(),
        description: info.description.to_string(),
        cause: info.cause.to_string(),
        treatment: info.treatment.to_string(),
        symptoms: info.symptoms.iter().map(|s| s.to_string()).collect(),
        image_url: format!("/static/uploads/{}", stored.file_name),
        example_url: info
            .example_image
            .map(|f| format!("/static/disease_examples/{f}")),
        pdf_url: None,
        report_error: None,
    };

    if want_pdf {
        let stem = Path::new(&stored.file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "scan".to_string());
        let pdf_name = format!("report_{stem}.pdf");
        let pdf_path = state.uploads.path_for(&pdf_name);
        let report_data = ReportData {
            label: view.label.clone(),
            confidence: view.confidence.clone(),
            description: view.description.clone(),
            cause: view.cause.clone(),
            symptoms: view.symptoms.clone(),
        };
        match report::generate(
            &report_data,
            &stored.path,
            state.reference_image().as_deref(),
            &pdf_path,
        ) {
            Ok(()) => view.pdf_url = Some(format!("/static/uploads/{pdf_name}")),
            Err(e) => {
                error!(file = %stored.file_name, error = %e, "Report generation failed");
                view.report_error = Some(e.to_string());
            }
        }
    }

    ViewPayload::Single(view)
}

/// Classify each file independently; one bad file never aborts the batch.
fn process_batch(state: &AppState, files: Vec<(String, Bytes)>) -> ViewPayload {
    let rows = files
        .into_iter()
        .map(|(file_name, data)| {
            let display_name = storage::sanitize_filename(&file_name);
            if !storage::allowed_file(&file_name) {
                return BatchRow {
                    filename: display_name,
                    label: None,
                    confidence: None,
                    error: Some("unsupported file type".to_string()),
                };
            }
            let outcome = state
                .uploads
                .save(&file_name, &data)
                .and_then(|_| state.engine.predict_bytes(&data));
            match outcome {
                Ok(result) => BatchRow {
                    filename: display_name,
                    confidence: Some(result.confidence_text()),
                    label: Some(result.label),
                    error: None,
                },
                Err(e) => BatchRow {
                    filename: display_name,
                    label: None,
                    confidence: None,
                    error: Some(e.to_string()),
                },
            }
        })
        .collect();
    ViewPayload::Batch { rows }
}

// ============================================================================
// HTML rendering
// ============================================================================

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn page_shell(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Neuroscan - Brain MRI Classification</title>
<style>
body {{ font-family: sans-serif; margin: 2em auto; max-width: 860px; background: #f5f5f5; color: #222; }}
.card {{ background: white; border-radius: 8px; padding: 1.5em; margin: 1em 0; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }}
h1 {{ color: #1e3a5f; }} h2 {{ color: #555; margin-top: 0; }}
.flash {{ background: #fdecea; color: #b3261e; border-radius: 8px; padding: 1em; margin: 1em 0; }}
.warn {{ background: #fff4e5; color: #8a5a00; border-radius: 8px; padding: 1em; margin: 1em 0; }}
.confidence {{ font-size: 1.4em; font-weight: bold; color: #2563eb; }}
.images {{ display: flex; gap: 1em; }} .images img {{ max-width: 360px; border-radius: 4px; }}
table {{ border-collapse: collapse; width: 100%; }}
th, td {{ text-align: left; padding: 0.5em; border-bottom: 1px solid #ddd; }}
.muted {{ color: #777; font-size: 0.9em; }}
</style>
</head>
<body>
<h1>Neuroscan</h1>
{body}
</body></html>"#
    )
}

fn upload_form(role: &str) -> String {
    let doctor = if role == "doctor" { "selected" } else { "" };
    let patient = if role == "patient" { "selected" } else { "" };
    format!(
        r#"<div class="card">
<h2>Classify a brain MRI scan</h2>
<form method="post" action="/" enctype="multipart/form-data">
<p><label>Role:
<select name="role"><option value="doctor" {doctor}>Doctor</option><option value="patient" {patient}>Patient</option></select>
</label></p>
<p><label>Single image: <input type="file" name="file" accept=".png,.jpg,.jpeg"></label></p>
<p><label>Or batch: <input type="file" name="files" accept=".png,.jpg,.jpeg" multiple></label></p>
<p><label><input type="checkbox" name="generate_pdf" value="on"> Generate PDF report</label></p>
<p><button type="submit">Classify</button></p>
</form>
</div>"#
    )
}

fn model_banner(model_loaded: bool) -> &'static str {
    if model_loaded {
        ""
    } else {
        r#"<div class="warn">The classification model is not loaded; predictions are unavailable.</div>"#
    }
}

fn render_intro(flash: Option<&str>, role: &str, model_loaded: bool) -> String {
    let flash_html = flash
        .map(|m| format!(r#"<div class="flash">{}</div>"#, html_escape(m)))
        .unwrap_or_default();
    page_shell(&format!(
        "{}{}{}",
        model_banner(model_loaded),
        flash_html,
        upload_form(role)
    ))
}

fn render_payload(payload: &ViewPayload, role: &str, model_loaded: bool) -> String {
    match payload {
        ViewPayload::Flash { message } => render_intro(Some(message), role, model_loaded),
        ViewPayload::Single(view) => render_result(view, role, model_loaded),
        ViewPayload::Batch { rows } => render_batch(rows, role, model_loaded),
    }
}

fn render_result(view: &ResultView, role: &str, model_loaded: bool) -> String {
    let symptoms: String = view
        .symptoms
        .iter()
        .map(|s| format!("<li>{}</li>", html_escape(s)))
        .collect();
    let example = view
        .example_url
        .as_deref()
        .map(|url| format!(r#"<figure><img src="{url}" alt="Example scan"><figcaption class="muted">Typical example</figcaption></figure>"#))
        .unwrap_or_default();
    let pdf = view
        .pdf_url
        .as_deref()
        .map(|url| format!(r#"<p><a href="{url}">Download PDF report</a></p>"#))
        .unwrap_or_default();
    let report_warn = view
        .report_error
        .as_deref()
        .map(|e| format!(r#"<div class="warn">Report generation failed: {}</div>"#, html_escape(e)))
        .unwrap_or_default();

    let body = format!(
        r#"{banner}<div class="card">
<h2>{label}</h2>
<p class="confidence">Confidence: {confidence}</p>
<p>{description}</p>
<p><strong>Cause:</strong> {cause}</p>
<p><strong>Treatment:</strong> {treatment}</p>
<h3>Symptoms</h3>
<ul>{symptoms}</ul>
{report_warn}{pdf}
<div class="images">
<figure><img src="{image_url}" alt="Uploaded scan"><figcaption class="muted">Uploaded scan</figcaption></figure>
{example}
</div>
<p class="muted">This result is shown once; use the form below for a new scan.</p>
</div>{form}"#,
        banner = model_banner(model_loaded),
        label = html_escape(&view.label),
        confidence = html_escape(&view.confidence),
        description = html_escape(&view.description),
        cause = html_escape(&view.cause),
        treatment = html_escape(&view.treatment),
        symptoms = symptoms,
        report_warn = report_warn,
        pdf = pdf,
        image_url = view.image_url,
        example = example,
        form = upload_form(role),
    );
    page_shell(&body)
}

fn render_batch(rows: &[BatchRow], role: &str, model_loaded: bool) -> String {
    let table_rows: String = rows
        .iter()
        .map(|row| {
            let outcome = match (&row.label, &row.confidence, &row.error) {
                (Some(label), Some(confidence), _) => {
                    format!("<td>{}</td><td>{}</td>", html_escape(label), html_escape(confidence))
                }
                (_, _, Some(error)) => {
                    format!(r#"<td colspan="2" class="flash">{}</td>"#, html_escape(error))
                }
                _ => "<td colspan=\"2\"></td>".to_string(),
            };
            format!(
                "<tr><td>{}</td>{}</tr>",
                html_escape(&row.filename),
                outcome
            )
        })
        .collect();
    let body = format!(
        r#"{banner}<div class="card">
<h2>Batch results</h2>
<table>
<tr><th>File</th><th>Label</th><th>Confidence</th></tr>
{table_rows}
</table>
</div>{form}"#,
        banner = model_banner(model_loaded),
        table_rows = table_rows,
        form = upload_form(role),
    );
    page_shell(&body)
}
