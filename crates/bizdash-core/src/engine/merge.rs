//! Applies externally computed sentiment labels onto reviews.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{ReviewRecord, Sentiment};

/// One classifier verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentAssignment {
    pub id: String,
    pub sentiment: Sentiment,
}

/// Returns a copy of `reviews` with matching ids relabelled.
///
/// Matching is exact id equality. Reviews without a verdict keep their
/// current label, stale or not; verdicts for unknown ids are ignored. When
/// an id appears more than once in `assignments` the first verdict wins.
#[must_use]
pub fn apply_sentiments(
    reviews: &[ReviewRecord],
    assignments: &[SentimentAssignment],
) -> Vec<ReviewRecord> {
    let mut verdicts: HashMap<&str, Sentiment> = HashMap::with_capacity(assignments.len());
    for assignment in assignments {
        verdicts
            .entry(assignment.id.as_str())
            .or_insert(assignment.sentiment);
    }

    reviews
        .iter()
        .map(|review| match verdicts.get(review.id.as_str()) {
            Some(&sentiment) => ReviewRecord {
                sentiment,
                ..review.clone()
            },
            None => review.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::types::StarRating;

    fn review(id: &str, sentiment: Sentiment) -> ReviewRecord {
        ReviewRecord {
            id: id.to_string(),
            location_id: "loc1".to_string(),
            author: "A".to_string(),
            rating: StarRating::new(3).unwrap(),
            text: "ok".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            sentiment,
        }
    }

    fn verdict(id: &str, sentiment: Sentiment) -> SentimentAssignment {
        SentimentAssignment {
            id: id.to_string(),
            sentiment,
        }
    }

    #[test]
    fn matched_review_is_relabelled_and_unmatched_kept() {
        let reviews = vec![
            review("r1", Sentiment::Unanalyzed),
            review("r2", Sentiment::Unanalyzed),
        ];
        let merged = apply_sentiments(&reviews, &[verdict("r1", Sentiment::Positive)]);
        assert_eq!(merged[0].sentiment, Sentiment::Positive);
        assert_eq!(merged[1].sentiment, Sentiment::Unanalyzed);
        // input untouched
        assert_eq!(reviews[0].sentiment, Sentiment::Unanalyzed);
    }

    #[test]
    fn stale_label_survives_when_not_reclassified() {
        let reviews = vec![review("r1", Sentiment::Negative)];
        let merged = apply_sentiments(&reviews, &[verdict("zzz", Sentiment::Positive)]);
        assert_eq!(merged, reviews);
    }

    #[test]
    fn prior_label_is_replaced_by_new_verdict() {
        let reviews = vec![review("r1", Sentiment::Negative)];
        let merged = apply_sentiments(&reviews, &[verdict("r1", Sentiment::Neutral)]);
        assert_eq!(merged[0].sentiment, Sentiment::Neutral);
    }

    #[test]
    fn first_duplicate_verdict_wins() {
        let reviews = vec![review("r1", Sentiment::Unanalyzed)];
        let merged = apply_sentiments(
            &reviews,
            &[
                verdict("r1", Sentiment::Negative),
                verdict("r1", Sentiment::Positive),
            ],
        );
        assert_eq!(merged[0].sentiment, Sentiment::Negative);
    }

    #[test]
    fn order_of_reviews_is_preserved() {
        let reviews = vec![
            review("b", Sentiment::Unanalyzed),
            review("a", Sentiment::Unanalyzed),
        ];
        let merged = apply_sentiments(&reviews, &[verdict("a", Sentiment::Positive)]);
        let ids: Vec<&str> = merged.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }
}
