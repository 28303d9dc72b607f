//! Delivery-status classification.

use crate::types::MarkerColor;

/// Tokens treated as "delivered" when no configuration overrides them.
pub const DEFAULT_AFFIRMATIVE_TOKENS: &[&str] = &["да", "yes"];

/// Decides whether a free-text delivery status means "delivered".
///
/// Comparison is against the trimmed, lowercased status. Anything that is not
/// one of the affirmative tokens, including an empty cell, is negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryClassifier {
    tokens: Vec<String>,
}

impl DeliveryClassifier {
    /// Builds a classifier from a list of affirmative tokens. Tokens are
    /// normalized the same way statuses are; blank tokens are dropped.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = tokens
            .into_iter()
            .map(|t| normalize(t.as_ref()))
            .filter(|t| !t.is_empty())
            .collect();
        Self { tokens }
    }

    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    #[must_use]
    pub fn is_affirmative(&self, status: &str) -> bool {
        let status = normalize(status);
        self.tokens.iter().any(|t| *t == status)
    }

    #[must_use]
    pub fn color_for(&self, status: &str) -> MarkerColor {
        if self.is_affirmative(status) {
            MarkerColor::Green
        } else {
            MarkerColor::Red
        }
    }
}

impl Default for DeliveryClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_AFFIRMATIVE_TOKENS)
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}
