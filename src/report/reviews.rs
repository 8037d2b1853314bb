use crate::error::FetchError;
use crate::pretalx::{PretalxClient, Review};

/// The reviews API has no submission filter, so this pulls every review of
/// the event and filters locally.
pub async fn reviews_for(client: &PretalxClient, code: &str) -> Result<Vec<Review>, FetchError> {
    let reviews: Vec<Review> = client.fetch_all(&client.reviews_url()).await?;
    Ok(filter_reviews(reviews, code))
}

pub fn filter_reviews(reviews: Vec<Review>, code: &str) -> Vec<Review> {
    reviews.into_iter().filter(|r| r.submission == code).collect()
}
