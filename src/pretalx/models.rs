use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::report::dates::Timestamp;

/// One page of a paginated pretalx collection.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// pretalx sends translatable fields either as a plain string or as a map of
/// language code to text.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    Localized(BTreeMap<String, String>),
}

impl LocalizedText {
    pub fn display(&self) -> &str {
        match self {
            LocalizedText::Plain(text) => text,
            LocalizedText::Localized(map) => map
                .get("en")
                .or_else(|| map.values().next())
                .map(String::as_str)
                .unwrap_or(""),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Submission {
    pub code: String,
    pub submission_type: LocalizedText,
    pub title: String,
    pub created: Timestamp,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SubmissionDetail {
    #[serde(flatten)]
    pub submission: Submission,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub r#abstract: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Review {
    pub submission: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub user: String,
    #[serde(default, deserialize_with = "score_from_number_or_string")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScore {
    Number(f64),
    Text(String),
}

/// Scores are decimals; pretalx serializes them as strings ("1.00").
fn score_from_number_or_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    match Option::<RawScore>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawScore::Number(n)) => Ok(Some(n)),
        Some(RawScore::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(RawScore::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid score {s:?}"))),
    }
}
