use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tera::Context;

use crate::agents::request_judgment;
use crate::error::{error_page, AppError};
use crate::report::{list_submissions, reviews_for, summarize};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ViewParams {
    code: Option<String>,
}

/// The dashboard: the submissions table, or one submission when `?code=` is given.
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ViewParams>,
) -> Response {
    let result = match params.code.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(code) => submission_view(&state, code).await,
        None => list_view(&state).await,
    };

    match result {
        Ok(html) => html.into_response(),
        Err(err) => error_page(&state.config.title, &err),
    }
}

async fn list_view(state: &AppState) -> Result<Html<String>, AppError> {
    let rows = list_submissions(&state.pretalx).await?;

    let mut ctx = Context::new();
    ctx.insert("title", &state.config.title);
    ctx.insert("total", &rows.len());
    ctx.insert("rows", &rows);

    render_template(state, "submissions.html", &ctx)
}

async fn submission_view(state: &AppState, code: &str) -> Result<Html<String>, AppError> {
    super::validate_code(code)?;

    let (detail, reviews) = tokio::try_join!(
        state.pretalx.fetch_submission(code),
        reviews_for(&state.pretalx, code),
    )?;

    let summary = summarize(&reviews);
    let comments: Vec<String> = reviews.iter().map(|r| r.text.clone()).collect();

    let judgment = request_judgment(
        &state.gemini,
        &detail.r#abstract,
        &detail.description,
        &comments,
    )
    .await;

    let mut ctx = Context::new();
    ctx.insert("title", &state.config.title);
    ctx.insert("submission", &detail.submission);
    ctx.insert("submission_type", detail.submission.submission_type.display());
    ctx.insert("created", &detail.submission.created.display());
    ctx.insert("abstract", &detail.r#abstract);
    ctx.insert("description", &detail.description);
    ctx.insert("reviews", &reviews);
    ctx.insert("score_headline", &summary.headline());
    match judgment {
        Ok(judgment) => {
            ctx.insert("judgment", &judgment);
        }
        Err(err) => {
            tracing::warn!("Judgment for {} failed: {}", code, err);
            ctx.insert("judgment", &Option::<()>::None);
            ctx.insert("judgment_error", &err.label());
        }
    }

    render_template(state, "submission.html", &ctx)
}

fn render_template(state: &AppState, name: &str, ctx: &Context) -> Result<Html<String>, AppError> {
    Ok(Html(state.tera.render(name, ctx)?))
}
