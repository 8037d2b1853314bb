use serde::Serialize;

use crate::pretalx::Review;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScoreSummary {
    NoReviews,
    /// Reviews exist but none carries a score yet.
    Unscored { count: usize },
    Scored {
        count: usize,
        scored: usize,
        total: f64,
        average: f64,
    },
}

/// Reviewer count and mean score. Unscored reviews count as reviewers but
/// stay out of the average.
pub fn summarize(reviews: &[Review]) -> ScoreSummary {
    if reviews.is_empty() {
        return ScoreSummary::NoReviews;
    }

    let scores: Vec<f64> = reviews.iter().filter_map(|r| r.score).collect();
    if scores.is_empty() {
        return ScoreSummary::Unscored { count: reviews.len() };
    }

    let total: f64 = scores.iter().sum();
    ScoreSummary::Scored {
        count: reviews.len(),
        scored: scores.len(),
        total,
        average: total / scores.len() as f64,
    }
}

impl ScoreSummary {
    pub fn count(&self) -> usize {
        match self {
            ScoreSummary::NoReviews => 0,
            ScoreSummary::Unscored { count } | ScoreSummary::Scored { count, .. } => *count,
        }
    }

    pub fn average(&self) -> Option<f64> {
        match self {
            ScoreSummary::Scored { average, .. } => Some(*average),
            _ => None,
        }
    }

    /// Headline shown under the reviews; rounding happens only here.
    pub fn headline(&self) -> String {
        match self {
            ScoreSummary::NoReviews => "No reviews yet".to_string(),
            ScoreSummary::Unscored { count } => {
                format!("{count} reviewers, no scores yet")
            }
            ScoreSummary::Scored {
                count,
                total,
                average,
                ..
            } => format!("Total Score from {count} reviewers: {total}. Average Score: {average:.2}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(score: Option<f64>) -> Review {
        Review {
            submission: "A".to_string(),
            user: "reviewer".to_string(),
            score,
            text: String::new(),
        }
    }

    #[test]
    fn test_average_is_not_rounded() {
        let summary = summarize(&[review(Some(1.0)), review(Some(2.0)), review(Some(1.0))]);
        assert_eq!(summary.count(), 3);
        let average = summary.average().unwrap();
        assert!((average - 4.0 / 3.0).abs() < 1e-12);
        assert_eq!(
            summary.headline(),
            "Total Score from 3 reviewers: 4. Average Score: 1.33"
        );
    }

    #[test]
    fn test_no_reviews_is_explicit() {
        let summary = summarize(&[]);
        assert_eq!(summary, ScoreSummary::NoReviews);
        assert_eq!(summary.count(), 0);
        assert_eq!(summary.average(), None);
        assert_eq!(summary.headline(), "No reviews yet");
    }

    #[test]
    fn test_unscored_reviews_are_counted_but_not_averaged() {
        let summary = summarize(&[review(None), review(None)]);
        assert_eq!(summary, ScoreSummary::Unscored { count: 2 });

        let summary = summarize(&[review(Some(2.0)), review(None)]);
        assert_eq!(
            summary,
            ScoreSummary::Scored {
                count: 2,
                scored: 1,
                total: 2.0,
                average: 2.0
            }
        );
    }

    #[test]
    fn test_serializes_with_status_tag() {
        let value = serde_json::to_value(summarize(&[])).unwrap();
        assert_eq!(value, serde_json::json!({"status": "no_reviews"}));
    }
}
