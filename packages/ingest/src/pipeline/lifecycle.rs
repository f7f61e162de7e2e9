//! Import status transitions.
//!
//! ```text
//! unseen -> pendingReview -> classified | noSignal -> expired
//!                  any processing step -> error
//!                              expired -> pendingReview (seen again)
//! ```
//!
//! Published listings belong to editors; their status is never touched
//! here.

use chrono::{DateTime, Duration, Utc};

use crate::classify::Classification;
use crate::types::{ImportStatus, JobRecord};

/// Status of a freshly inserted listing.
pub fn on_insert() -> ImportStatus {
    ImportStatus::PendingReview
}

/// Status after enrichment of an unpublished listing.
pub fn classify(classification: &Classification) -> ImportStatus {
    if classification.has_signal() {
        ImportStatus::Classified
    } else {
        ImportStatus::NoSignal
    }
}

/// Whether the listing is still waiting for review.
pub fn in_review_queue(record: &JobRecord) -> bool {
    !record.is_published
        && matches!(
            record.import_status,
            ImportStatus::PendingReview | ImportStatus::Classified | ImportStatus::NoSignal
        )
}

/// A review-queue listing that went unseen and was last seen before the
/// grace window.
pub fn should_expire(record: &JobRecord, now: DateTime<Utc>, grace: Duration) -> bool {
    in_review_queue(record) && record.last_seen_at < now - grace
}

pub fn expire(record: &mut JobRecord) {
    if in_review_queue(record) {
        record.import_status = ImportStatus::Expired;
    }
}

/// An expired listing showed up again.
pub fn revive(record: &mut JobRecord) -> bool {
    if record.import_status == ImportStatus::Expired && !record.is_published {
        record.import_status = ImportStatus::PendingReview;
        return true;
    }
    false
}

/// Apply a new classification to a known listing.
pub fn reclassify(record: &mut JobRecord, classification: &Classification) {
    if record.is_published {
        return;
    }
    revive(record);
    record.import_status = classify(classification);
}

pub fn fail(record: &mut JobRecord) {
    if !record.is_published {
        record.import_status = ImportStatus::Error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ClassificationSignal;
    use crate::types::{JobId, NewJobRecord, SourceName};
    use std::collections::BTreeSet;

    fn record(status: ImportStatus, published: bool, last_seen: DateTime<Utc>) -> JobRecord {
        let mut r = NewJobRecord {
            title: "Arzt".into(),
            hospital_name: String::new(),
            location: String::new(),
            department: None,
            tags: BTreeSet::new(),
            description: String::new(),
            apply_url: "https://example.org".into(),
            source_url: "https://example.org".into(),
            source_name: SourceName::Medijobs,
            source_unique_id: "1".into(),
            content_hash: String::new(),
            import_status: status,
            seen_at: last_seen,
        }
        .into_record(JobId::new());
        r.is_published = published;
        r
    }

    fn classification(department: Option<&str>) -> Classification {
        Classification {
            description: String::new(),
            department: department.map(str::to_string),
            tags: BTreeSet::new(),
            signal: ClassificationSignal::Rules,
        }
    }

    #[test]
    fn expiry_respects_grace_and_publication() {
        let now = Utc::now();
        let grace = Duration::hours(48);
        let old = now - Duration::hours(49);
        let fresh = now - Duration::hours(1);

        assert!(should_expire(&record(ImportStatus::PendingReview, false, old), now, grace));
        assert!(should_expire(&record(ImportStatus::NoSignal, false, old), now, grace));
        assert!(!should_expire(&record(ImportStatus::PendingReview, false, fresh), now, grace));
        assert!(!should_expire(&record(ImportStatus::Classified, true, old), now, grace));
        assert!(!should_expire(&record(ImportStatus::Expired, false, old), now, grace));
    }

    #[test]
    fn reclassify_revives_expired() {
        let mut r = record(ImportStatus::Expired, false, Utc::now());
        reclassify(&mut r, &classification(Some("Urologie")));
        assert_eq!(r.import_status, ImportStatus::Classified);

        let mut r = record(ImportStatus::Classified, false, Utc::now());
        reclassify(&mut r, &classification(None));
        assert_eq!(r.import_status, ImportStatus::NoSignal);
    }

    #[test]
    fn published_status_is_left_alone() {
        let mut r = record(ImportStatus::Classified, true, Utc::now());
        reclassify(&mut r, &classification(None));
        fail(&mut r);
        expire(&mut r);
        assert_eq!(r.import_status, ImportStatus::Classified);
    }
}
