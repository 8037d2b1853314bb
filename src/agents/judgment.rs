use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use super::GeminiAgent;
use crate::error::JudgmentError;

pub const COMMENT_DELIMITER: &str = ", ";

#[derive(Debug, Clone, Serialize)]
pub struct Judgment {
    pub text: String,
    /// The 0-2 score the model was asked for, if it could be found in the text.
    pub suggested_score: Option<f64>,
}

pub fn build_prompt(abstract_text: &str, description: &str, comments: &[String]) -> String {
    format!(
        "You are looking at a conference submission and the reviews given by different reviewers. \
         The abstract of the submission is {abstract_text}, and description is {description}. \
         The reviewer comments are: {comments}. \
         Also, provide your final score in scale of 0 to 2, where 0 is unacceptable, while 2 is acceptable.",
        comments = comments.join(COMMENT_DELIMITER),
    )
}

pub async fn request_judgment(
    agent: &GeminiAgent,
    abstract_text: &str,
    description: &str,
    comments: &[String],
) -> Result<Judgment, JudgmentError> {
    let prompt = build_prompt(abstract_text, description, comments);
    let text = agent.generate(&prompt).await?;
    let suggested_score = extract_score(&text);
    Ok(Judgment {
        text,
        suggested_score,
    })
}

fn score_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\bscore\b[\s:*=]*(?:of\s+|is\s+)?\**\s*([0-2](?:\.\d+)?)\b")
            .expect("score pattern is valid")
    })
}

/// Last "score: N" mention with N in 0..=2; models usually end with it.
pub fn extract_score(text: &str) -> Option<f64> {
    score_pattern()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<f64>().ok())
        .filter(|score| (0.0..=2.0).contains(score))
        .last()
}
