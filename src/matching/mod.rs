//! Barcode normalization and record matching.
//!
//! A raw scan is turned into a bare identifier according to a
//! [`NormalizationPolicy`], then compared against the `BARCODE_NUMBER`
//! and `MATERIAL_ID` of every record. Both sides of the comparison have
//! surrounding whitespace and leading zeros removed, so `"0042"` and
//! `"42"` are the same identifier.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::constants::MAX_SEARCH_QUERY_LENGTH;
use crate::models::{InventoryRecord, LookupError};

/// GS1 Application Identifier `01` followed by a GTIN-13/14 payload
static GS1_GTIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"01([0-9]{13,14})").expect("valid GS1 pattern"));

/// Any bare 13-14 digit run
static DIGIT_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{13,14}").expect("valid digit-run pattern"));

/// How a raw scan is reduced to an identifier before matching
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationPolicy {
    /// Drop whitespace, extract the GTIN from a GS1 payload or the first
    /// 13-14 digit run, then strip leading zeros
    #[default]
    Gs1Aware,
    /// Trim surrounding whitespace only
    PlainTrim,
}

impl fmt::Display for NormalizationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gs1Aware => write!(f, "gs1"),
            Self::PlainTrim => write!(f, "plain"),
        }
    }
}

impl FromStr for NormalizationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gs1" | "gs1_aware" | "gs1-aware" => Ok(Self::Gs1Aware),
            "plain" | "plain_trim" | "plain-trim" | "trim" => Ok(Self::PlainTrim),
            other => Err(format!(
                "unknown match policy '{other}', expected 'gs1' or 'plain'"
            )),
        }
    }
}

fn is_scan_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

/// Reduce a raw scan payload to a candidate identifier.
pub fn normalize_identifier(raw: &str, policy: NormalizationPolicy) -> String {
    match policy {
        NormalizationPolicy::Gs1Aware => {
            let stripped: String = raw.chars().filter(|c| !is_scan_whitespace(*c)).collect();
            let gtin = GS1_GTIN_RE
                .captures(&stripped)
                .and_then(|caps| caps.get(1))
                .or_else(|| DIGIT_RUN_RE.find(&stripped))
                .map(|m| m.as_str())
                .unwrap_or(stripped.as_str());
            strip_leading_zeros(gtin).to_string()
        }
        NormalizationPolicy::PlainTrim => raw.trim_matches(is_scan_whitespace).to_string(),
    }
}

pub fn strip_leading_zeros(value: &str) -> &str {
    value.trim_start_matches('0')
}

/// Key both sides of a comparison are reduced to
pub fn comparison_key(value: &str) -> &str {
    strip_leading_zeros(value.trim_matches(is_scan_whitespace))
}

/// Stateless matcher over a dataset snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchEngine {
    policy: NormalizationPolicy,
}

impl MatchEngine {
    pub fn new(policy: NormalizationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> NormalizationPolicy {
        self.policy
    }

    pub fn normalize(&self, raw: &str) -> String {
        normalize_identifier(raw, self.policy)
    }

    /// Validate and normalize a raw query.
    ///
    /// Blank input, and input that reduces to nothing (such as `"000"`),
    /// is rejected with [`LookupError::EmptyQuery`].
    pub fn prepare_query(&self, raw: &str) -> Result<String, LookupError> {
        if raw.trim_matches(is_scan_whitespace).is_empty() {
            return Err(LookupError::EmptyQuery);
        }

        let length = raw.chars().count();
        if length > MAX_SEARCH_QUERY_LENGTH {
            return Err(LookupError::QueryTooLong {
                length,
                max: MAX_SEARCH_QUERY_LENGTH,
            });
        }

        let normalized = self.normalize(raw);
        if comparison_key(&normalized).is_empty() {
            return Err(LookupError::EmptyQuery);
        }
        Ok(normalized)
    }

    /// Every record whose barcode or material id equals `query`, in
    /// dataset order. An empty comparison key matches nothing.
    pub fn find_matches<'a>(
        &self,
        dataset: &'a [InventoryRecord],
        query: &str,
    ) -> Vec<&'a InventoryRecord> {
        let key = comparison_key(query);
        if key.is_empty() {
            return Vec::new();
        }

        dataset
            .iter()
            .filter(|record| {
                comparison_key(&record.barcode_number()) == key
                    || comparison_key(&record.material_id()) == key
            })
            .collect()
    }

    /// Validate, normalize and match in one step
    pub fn search<'a>(
        &self,
        dataset: &'a [InventoryRecord],
        raw: &str,
    ) -> Result<(String, Vec<&'a InventoryRecord>), LookupError> {
        let normalized = self.prepare_query(raw)?;
        let matches = self.find_matches(dataset, &normalized);
        Ok((normalized, matches))
    }
}
