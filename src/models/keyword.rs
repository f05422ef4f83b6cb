//! Weighted keyword specification.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Keywords honored per ranking unless configured otherwise.
pub const MAX_KEYWORDS: usize = 3;

/// One keyword and its weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedKeyword {
    pub keyword: String,
    pub weight: f64,
}

/// Normalized keyword set applied uniformly to one scoring batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordSpec {
    entries: Vec<WeightedKeyword>,
    /// Set when more keywords were supplied than honored
    truncated: bool,
}

impl KeywordSpec {
    /// Build a spec from parallel keyword/weight lists.
    ///
    /// Keywords beyond `max_keywords` are dropped with a warning. Missing
    /// trailing weights default to 1. Blank keywords, surplus weights and
    /// negative or non-finite weights are rejected.
    pub fn new(keywords: &[String], weights: &[f64], max_keywords: usize) -> Result<Self> {
        if keywords.is_empty() {
            return Err(AppError::validation("At least one keyword is required"));
        }
        if max_keywords == 0 {
            return Err(AppError::validation("max_keywords must be > 0"));
        }

        let truncated = keywords.len() > max_keywords;
        if truncated {
            log::warn!(
                "{} keywords supplied, only the first {} are used: {:?}",
                keywords.len(),
                max_keywords,
                &keywords[..max_keywords]
            );
        }
        let keywords = &keywords[..keywords.len().min(max_keywords)];
        let weights = &weights[..weights.len().min(max_keywords)];

        if weights.len() > keywords.len() {
            return Err(AppError::validation(format!(
                "{} weights supplied for {} keywords",
                weights.len(),
                keywords.len()
            )));
        }

        let mut entries = Vec::with_capacity(keywords.len());
        for (i, keyword) in keywords.iter().enumerate() {
            let keyword = keyword.trim();
            if keyword.is_empty() {
                return Err(AppError::validation(format!("Keyword #{} is blank", i + 1)));
            }
            let weight = weights.get(i).copied().unwrap_or(1.0);
            if !weight.is_finite() || weight < 0.0 {
                return Err(AppError::validation(format!(
                    "Weight {weight} for '{keyword}' must be a non-negative number"
                )));
            }
            entries.push(WeightedKeyword {
                keyword: keyword.to_string(),
                weight,
            });
        }

        Ok(Self { entries, truncated })
    }

    /// Build a spec honoring at most [`MAX_KEYWORDS`] keywords.
    pub fn with_default_limit(keywords: &[String], weights: &[f64]) -> Result<Self> {
        Self::new(keywords, weights, MAX_KEYWORDS)
    }

    pub fn entries(&self) -> &[WeightedKeyword] {
        &self.entries
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.keyword.as_str())
    }

    pub fn was_truncated(&self) -> bool {
        self.truncated
    }

    /// `keyword(weight), ...` for logs and report headers.
    pub fn describe(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{}({})", e.keyword, e.weight))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
