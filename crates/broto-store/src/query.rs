//! In-memory filter/sort pipeline for complaint collections.
//!
//! Pure functions of (collection, criteria, sort key): the input is never
//! mutated, nothing is persisted, and each call recomputes the full result.
//! Dashboard views rerun the pipeline whenever their criteria change.

use chrono::NaiveDate;

use crate::complaints::{Category, Complaint, Priority, Status};

/// Filter criteria. Every field is optional; `None` means no constraint.
/// Supplied criteria are combined with logical AND.
#[derive(Debug, Clone, Default)]
pub struct ComplaintFilter {
    /// Exact category match.
    pub category: Option<Category>,
    /// Exact status match.
    pub status: Option<Status>,
    /// Exact priority match.
    pub priority: Option<Priority>,
    /// Case-insensitive substring match against title, description, and
    /// student name; a complaint matches if *any* of the three contains the
    /// term.
    pub search: Option<String>,
    /// Inclusive lower bound on the creation calendar day.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the creation calendar day.
    pub date_to: Option<NaiveDate>,
}

impl ComplaintFilter {
    /// Whether `complaint` satisfies every supplied criterion.
    pub fn matches(&self, complaint: &Complaint) -> bool {
        if let Some(category) = self.category
            && complaint.category != category
        {
            return false;
        }
        if let Some(status) = self.status
            && complaint.status != status
        {
            return false;
        }
        if let Some(priority) = self.priority
            && complaint.priority != priority
        {
            return false;
        }
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            let hit = complaint.title.to_lowercase().contains(&term)
                || complaint.description.to_lowercase().contains(&term)
                || complaint.student_name.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }

        let day = complaint.created_at.date_naive();
        if let Some(from) = self.date_from
            && day < from
        {
            return false;
        }
        if let Some(to) = self.date_to
            && day > to
        {
            return false;
        }

        true
    }
}

/// Sort orders for complaint listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Newest first (default).
    #[default]
    DateDesc,
    /// Oldest first.
    DateAsc,
    /// Highest priority first (urgent=4 .. low=1).
    PriorityHigh,
    /// Lowest priority first.
    PriorityLow,
}

impl SortKey {
    /// Parse the wire/CLI spelling (`date-desc`, `priority-high`, ...).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "date-desc" => Some(Self::DateDesc),
            "date-asc" => Some(Self::DateAsc),
            "priority-high" => Some(Self::PriorityHigh),
            "priority-low" => Some(Self::PriorityLow),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DateDesc => "date-desc",
            Self::DateAsc => "date-asc",
            Self::PriorityHigh => "priority-high",
            Self::PriorityLow => "priority-low",
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter `complaints` by `filter`, then order by `sort`.
///
/// Sorts are stable: complaints with equal keys keep their original
/// relative order.
pub fn query(complaints: &[Complaint], filter: &ComplaintFilter, sort: SortKey) -> Vec<Complaint> {
    let mut result: Vec<Complaint> = complaints
        .iter()
        .filter(|c| filter.matches(c))
        .cloned()
        .collect();

    match sort {
        SortKey::DateDesc => {
            result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        SortKey::DateAsc => {
            result.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        }
        SortKey::PriorityHigh => {
            result.sort_by(|a, b| b.priority.rank().cmp(&a.priority.rank()));
        }
        SortKey::PriorityLow => {
            result.sort_by(|a, b| a.priority.rank().cmp(&b.priority.rank()));
        }
    }

    result
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap()
    }

    fn complaint(
        id: &str,
        title: &str,
        category: Category,
        priority: Priority,
        status: Status,
        created_at: DateTime<Utc>,
    ) -> Complaint {
        Complaint {
            id: id.into(),
            complaint_id: format!("CMPL-{id:0>4}"),
            title: title.into(),
            description: "description".into(),
            category,
            priority,
            status,
            student_id: "u1".into(),
            student_name: "Asha Kumar".into(),
            student_email: "asha@campus.edu".into(),
            student_phone: None,
            student_profile_image: None,
            image_url: None,
            created_at,
            updated_at: created_at,
            notes: vec![],
            assigned_to: None,
        }
    }

    fn sample() -> Vec<Complaint> {
        vec![
            complaint(
                "1",
                "Leaking roof",
                Category::Infrastructure,
                Priority::Low,
                Status::Pending,
                at(1),
            ),
            complaint(
                "2",
                "Wifi outage in hostel",
                Category::Infrastructure,
                Priority::Urgent,
                Status::InReview,
                at(2),
            ),
            complaint(
                "3",
                "Course material missing",
                Category::Academic,
                Priority::Medium,
                Status::Pending,
                at(3),
            ),
        ]
    }

    fn ids(result: &[Complaint]) -> Vec<&str> {
        result.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn no_criteria_passes_everything_newest_first() {
        let result = query(&sample(), &ComplaintFilter::default(), SortKey::default());
        assert_eq!(ids(&result), ["3", "2", "1"]);
    }

    #[test]
    fn category_filter_is_exact() {
        let filter = ComplaintFilter {
            category: Some(Category::Academic),
            ..Default::default()
        };
        let result = query(&sample(), &filter, SortKey::DateAsc);
        assert_eq!(ids(&result), ["3"]);
    }

    #[test]
    fn criteria_compose_with_and() {
        let both = ComplaintFilter {
            category: Some(Category::Infrastructure),
            priority: Some(Priority::Urgent),
            ..Default::default()
        };
        let combined = query(&sample(), &both, SortKey::DateAsc);

        // Filtering by category then additionally by priority must equal
        // filtering by both at once.
        let by_category = query(
            &sample(),
            &ComplaintFilter {
                category: Some(Category::Infrastructure),
                ..Default::default()
            },
            SortKey::DateAsc,
        );
        let sequential = query(
            &by_category,
            &ComplaintFilter {
                priority: Some(Priority::Urgent),
                ..Default::default()
            },
            SortKey::DateAsc,
        );

        assert_eq!(combined, sequential);
        assert_eq!(ids(&combined), ["2"]);
    }

    #[test]
    fn search_matches_any_field_case_insensitively() {
        let title_hit = ComplaintFilter {
            search: Some("WIFI".into()),
            ..Default::default()
        };
        assert_eq!(ids(&query(&sample(), &title_hit, SortKey::DateAsc)), ["2"]);

        let description_hit = ComplaintFilter {
            search: Some("descri".into()),
            ..Default::default()
        };
        assert_eq!(query(&sample(), &description_hit, SortKey::DateAsc).len(), 3);

        let name_hit = ComplaintFilter {
            search: Some("kumar".into()),
            ..Default::default()
        };
        assert_eq!(query(&sample(), &name_hit, SortKey::DateAsc).len(), 3);

        let miss = ComplaintFilter {
            search: Some("cafeteria".into()),
            ..Default::default()
        };
        assert!(query(&sample(), &miss, SortKey::DateAsc).is_empty());
    }

    #[test]
    fn date_bounds_are_inclusive_calendar_days() {
        let filter = ComplaintFilter {
            date_from: Some(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()),
            date_to: Some(NaiveDate::from_ymd_opt(2026, 3, 3).unwrap()),
            ..Default::default()
        };
        let result = query(&sample(), &filter, SortKey::DateAsc);
        assert_eq!(ids(&result), ["2", "3"]);
    }

    #[test]
    fn priority_high_orders_urgent_medium_low() {
        let collection = vec![
            complaint("1", "a", Category::Other, Priority::Low, Status::Pending, at(1)),
            complaint("2", "b", Category::Other, Priority::Urgent, Status::Pending, at(2)),
            complaint("3", "c", Category::Other, Priority::Medium, Status::Pending, at(3)),
        ];

        let high = query(&collection, &ComplaintFilter::default(), SortKey::PriorityHigh);
        assert_eq!(ids(&high), ["2", "3", "1"]);

        let low = query(&collection, &ComplaintFilter::default(), SortKey::PriorityLow);
        assert_eq!(ids(&low), ["1", "3", "2"]);
    }

    #[test]
    fn date_sorts_are_stable_on_equal_timestamps() {
        let collection = vec![
            complaint("1", "a", Category::Other, Priority::Low, Status::Pending, at(5)),
            complaint("2", "b", Category::Other, Priority::High, Status::Pending, at(5)),
            complaint("3", "c", Category::Other, Priority::Medium, Status::Pending, at(5)),
        ];

        let desc = query(&collection, &ComplaintFilter::default(), SortKey::DateDesc);
        assert_eq!(ids(&desc), ["1", "2", "3"]);

        let asc = query(&collection, &ComplaintFilter::default(), SortKey::DateAsc);
        assert_eq!(ids(&asc), ["1", "2", "3"]);
    }

    #[test]
    fn priority_sorts_are_stable_on_equal_ranks() {
        let collection = vec![
            complaint("1", "a", Category::Other, Priority::High, Status::Pending, at(1)),
            complaint("2", "b", Category::Other, Priority::High, Status::Pending, at(2)),
            complaint("3", "c", Category::Other, Priority::Low, Status::Pending, at(3)),
        ];

        let result = query(&collection, &ComplaintFilter::default(), SortKey::PriorityHigh);
        assert_eq!(ids(&result), ["1", "2", "3"]);
    }

    #[test]
    fn input_collection_is_not_mutated() {
        let collection = sample();
        let before = collection.clone();

        let _ = query(&collection, &ComplaintFilter::default(), SortKey::PriorityHigh);
        assert_eq!(collection, before);
    }

    #[test]
    fn sort_key_parses_wire_spellings() {
        assert_eq!(SortKey::parse("date-desc"), Some(SortKey::DateDesc));
        assert_eq!(SortKey::parse("priority-low"), Some(SortKey::PriorityLow));
        assert_eq!(SortKey::parse("newest"), None);
        assert_eq!(SortKey::default(), SortKey::DateDesc);
    }
}
