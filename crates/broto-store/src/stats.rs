//! Aggregate counts for dashboard summaries.
//!
//! Pure derivation over a complaint collection; nothing here reads or
//! writes the store.

use crate::complaints::{Category, Complaint, Status};

/// Counts displayed on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stats {
    pub total: usize,
    pub pending: usize,
    pub in_review: usize,
    pub assigned: usize,
    pub resolved: usize,
    pub closed: usize,
    /// Per-category counts in first-seen order.
    pub by_category: Vec<(Category, usize)>,
}

impl Stats {
    /// Tally `complaints` into dashboard counts.
    pub fn compute(complaints: &[Complaint]) -> Self {
        let mut stats = Self {
            total: complaints.len(),
            ..Default::default()
        };

        for complaint in complaints {
            match complaint.status {
                Status::Pending => stats.pending += 1,
                Status::InReview => stats.in_review += 1,
                Status::Assigned => stats.assigned += 1,
                Status::Resolved => stats.resolved += 1,
                Status::Closed => stats.closed += 1,
            }

            match stats
                .by_category
                .iter_mut()
                .find(|(c, _)| *c == complaint.category)
            {
                Some((_, count)) => *count += 1,
                None => stats.by_category.push((complaint.category, 1)),
            }
        }

        stats
    }

    /// Complaints currently being handled: in review plus assigned, the
    /// same bucket the dashboard's "In Progress" card shows.
    pub fn in_progress(&self) -> usize {
        self.in_review + self.assigned
    }
}

// ── tests ────────────────────────────────────────────────────────────
