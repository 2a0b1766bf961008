//! End-of-session summary.

use recall_core::Quality;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total: usize,
    /// Mean quality, 0-5.
    pub average_quality: f64,
    /// Share of ratings >= 3, in percent.
    pub correct_percentage: f64,
}

impl SessionSummary {
    /// Summarise a set of ratings. `None` when there are none.
    pub fn from_ratings(ratings: impl IntoIterator<Item = Quality>) -> Option<Self> {
        let (total, sum, correct) = ratings.into_iter().fold(
            (0usize, 0u32, 0usize),
            |(total, sum, correct), quality| {
                (
                    total + 1,
                    sum + u32::from(quality.value()),
                    correct + usize::from(quality.is_passing()),
                )
            },
        );

        if total == 0 {
            return None;
        }

        Some(Self {
            total,
            average_quality: f64::from(sum) / total as f64,
            correct_percentage: 100.0 * correct as f64 / total as f64,
        })
    }
}
