//! Listing record data structure.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Sentinel value for a field whose extraction failed.
pub const UNKNOWN: &str = "Unknown";

/// A single job listing extracted from the source document.
///
/// Fields that could not be extracted hold [`UNKNOWN`] rather than
/// failing the row; a missing apply link is `None`. Records are
/// constructed once during extraction and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingRecord {
    /// Date the listing was posted, as shown on the source page
    pub posted_date: String,

    /// Recruiting organization
    pub organization: String,

    /// Advertised position
    pub position: String,

    /// Free-form qualification text (comma list on the source)
    pub qualifications: String,

    /// Application deadline, as shown on the source page
    pub apply_by_date: String,

    /// Application URL, when the row carries a link
    pub apply_link: Option<String>,
}

impl ListingRecord {
    /// A record with every field set to the sentinel.
    pub fn unknown() -> Self {
        Self {
            posted_date: UNKNOWN.to_string(),
            organization: UNKNOWN.to_string(),
            position: UNKNOWN.to_string(),
            qualifications: UNKNOWN.to_string(),
            apply_by_date: UNKNOWN.to_string(),
            apply_link: None,
        }
    }

    /// Whether this record is a non-data row (header/decoration) that
    /// slipped through extraction: both organization and position
    /// resolved to the sentinel.
    pub fn is_placeholder(&self) -> bool {
        self.organization == UNKNOWN && self.position == UNKNOWN
    }

    /// Content fingerprint over the full field set.
    ///
    /// Hashed in declared field order with a separator, so two records
    /// with identical field values collapse to one fingerprint no
    /// matter which extraction strategy produced them.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for field in [
            &self.posted_date,
            &self.organization,
            &self.position,
            &self.qualifications,
            &self.apply_by_date,
        ] {
            hasher.update(field.as_bytes());
            hasher.update([0x1f]);
        }
        hasher.update(self.apply_link.as_deref().unwrap_or("").as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> ListingRecord {
        ListingRecord {
            posted_date: "01-04-2026".to_string(),
            organization: "ABC Corp".to_string(),
            position: "Clerk".to_string(),
            qualifications: "B.A, B.Com".to_string(),
            apply_by_date: "30-04-2026".to_string(),
            apply_link: Some("https://example.com/apply/1".to_string()),
        }
    }

    #[test]
    fn fingerprint_is_stable() {
        let record = sample_record();
        assert_eq!(record.fingerprint(), record.fingerprint());
    }

    #[test]
    fn fingerprint_changes_with_content() {
        let a = sample_record();
        let mut b = sample_record();
        b.position = "Senior Clerk".to_string();
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn fingerprint_distinguishes_missing_link() {
        let a = sample_record();
        let mut b = sample_record();
        b.apply_link = None;
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn placeholder_requires_both_sentinels() {
        let mut record = ListingRecord::unknown();
        assert!(record.is_placeholder());

        record.organization = "ABC Corp".to_string();
        assert!(!record.is_placeholder());

        record.organization = UNKNOWN.to_string();
        record.position = "Clerk".to_string();
        assert!(!record.is_placeholder());
    }
}
