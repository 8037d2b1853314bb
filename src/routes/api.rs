use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::ApiError;
use crate::pretalx::{Review, SubmissionDetail};
use crate::report::{list_submissions, reviews_for, summarize, ScoreSummary, SubmissionRow};
use crate::state::AppState;

#[derive(Serialize)]
pub struct SubmissionList {
    total: usize,
    results: Vec<SubmissionRow>,
}

#[derive(Serialize)]
pub struct SubmissionReport {
    submission: SubmissionDetail,
    reviews: Vec<Review>,
    summary: ScoreSummary,
}

pub async fn submissions(State(state): State<Arc<AppState>>) -> Result<Json<SubmissionList>, ApiError> {
    let results = list_submissions(&state.pretalx).await?;
    Ok(Json(SubmissionList {
        total: results.len(),
        results,
    }))
}

/// Submission detail with its reviews and score summary. No judgment is
/// requested here.
pub async fn submission(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<SubmissionReport>, ApiError> {
    super::validate_code(&code)?;

    let (submission, reviews) = tokio::try_join!(
        state.pretalx.fetch_submission(&code),
        reviews_for(&state.pretalx, &code),
    )?;
    let summary = summarize(&reviews);

    Ok(Json(SubmissionReport {
        submission,
        reviews,
        summary,
    }))
}
