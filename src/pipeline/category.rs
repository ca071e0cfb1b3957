// src/pipeline/category.rs

//! Qualification category filter.
//!
//! A literal substring test, not a tokenizer: qualification text on
//! the source is a free-form comma list ("B.A, B.Com, M.Sc"), and the
//! requested label is matched inside it case-insensitively with dots
//! stripped from both sides so "BA" finds "B.A". Unrecognized
//! categories are legal and simply behave as literal filters.

use crate::models::ListingRecord;

/// Category that matches every record.
pub const WILDCARD: &str = "all";

/// Whether a record's qualification text matches the requested
/// category.
pub fn matches(record: &ListingRecord, category: &str) -> bool {
    if category.eq_ignore_ascii_case(WILDCARD) {
        return true;
    }
    normalize(&record.qualifications).contains(&normalize(category))
}

fn normalize(text: &str) -> String {
    text.to_lowercase().replace('.', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_qualifications(qualifications: &str) -> ListingRecord {
        ListingRecord {
            qualifications: qualifications.to_string(),
            ..ListingRecord::unknown()
        }
    }

    #[test]
    fn wildcard_accepts_everything() {
        for text in ["B.A, B.Com", "Unknown", ""] {
            let record = record_with_qualifications(text);
            assert!(matches(&record, "All"));
            assert!(matches(&record, "all"));
            assert!(matches(&record, "ALL"));
        }
    }

    #[test]
    fn dotted_labels_match_dotless_queries() {
        let record = record_with_qualifications("B.A, B.Com");
        assert!(matches(&record, "BA"));
        assert!(matches(&record, "B.Com"));
        assert!(!matches(&record, "MBA"));
    }

    #[test]
    fn match_is_case_insensitive() {
        let record = record_with_qualifications("Diploma, ITI");
        assert!(matches(&record, "diploma"));
        assert!(matches(&record, "iti"));
    }

    #[test]
    fn unrecognized_category_is_a_literal_filter() {
        let record = record_with_qualifications("Any Graduate");
        assert!(matches(&record, "graduate"));
        assert!(!matches(&record, "postgraduate"));
    }
}
