use serde::Serialize;

use crate::error::FetchError;
use crate::pretalx::{PretalxClient, Submission};

/// One row of the submissions table.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SubmissionRow {
    pub rank: usize,
    pub code: String,
    pub submission_type: String,
    pub title: String,
    pub created: String,
}

pub async fn list_submissions(client: &PretalxClient) -> Result<Vec<SubmissionRow>, FetchError> {
    let submissions: Vec<Submission> = client.fetch_all(&client.submissions_url()).await?;
    Ok(aggregate(submissions))
}

/// Oldest first; `sort_by_key` is stable so equal timestamps keep fetch order.
pub fn aggregate(mut submissions: Vec<Submission>) -> Vec<SubmissionRow> {
    submissions.sort_by_key(|s| s.created);

    submissions
        .into_iter()
        .enumerate()
        .map(|(idx, s)| SubmissionRow {
            rank: idx + 1,
            submission_type: s.submission_type.display().to_string(),
            created: s.created.display(),
            code: s.code,
            title: s.title,
        })
        .collect()
}
