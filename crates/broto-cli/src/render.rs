//! Plain-text rendering of complaints, stats, and contact links.

use broto_store::{Complaint, Stats, User, contact};

/// One-line listing entry: code, status, priority, title, date.
pub fn complaint_row(complaint: &Complaint) -> String {
    format!(
        "{:<10} {:<10} {:<8} {:<40} {}",
        complaint.complaint_id,
        complaint.status.label(),
        complaint.priority.label(),
        truncate(&complaint.title, 40),
        complaint.created_at.format("%Y-%m-%d"),
    )
}

/// Column headers matching [`complaint_row`].
pub fn complaint_header() -> String {
    format!(
        "{:<10} {:<10} {:<8} {:<40} {}",
        "CODE", "STATUS", "PRIORITY", "TITLE", "CREATED"
    )
}

/// Full detail view including notes and contact links.
pub fn complaint_detail(complaint: &Complaint) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "#{} — {}\n",
        complaint.complaint_id, complaint.title
    ));
    out.push_str(&format!(
        "  id:        {}\n  status:    {}\n  priority:  {}\n  category:  {}\n",
        complaint.id,
        complaint.status.label(),
        complaint.priority.label(),
        complaint.category.label(),
    ));
    out.push_str(&format!(
        "  student:   {} <{}>\n",
        complaint.student_name, complaint.student_email
    ));
    if let Some(phone) = &complaint.student_phone {
        out.push_str(&format!("  phone:     {phone}\n"));
    }
    if let Some(assignee) = &complaint.assigned_to {
        out.push_str(&format!("  assigned:  {assignee}\n"));
    }
    out.push_str(&format!(
        "  created:   {}\n  updated:   {}\n",
        complaint.created_at.format("%Y-%m-%d %H:%M:%S"),
        complaint.updated_at.format("%Y-%m-%d %H:%M:%S"),
    ));
    if complaint.image_url.is_some() {
        out.push_str("  image:     attached\n");
    }
    out.push_str(&format!("\n  {}\n", complaint.description));

    if !complaint.notes.is_empty() {
        out.push_str("\n  Notes:\n");
        for note in &complaint.notes {
            out.push_str(&format!(
                "   - [{}] {} — {}\n",
                note.created_at.format("%Y-%m-%d %H:%M"),
                note.text,
                note.created_by,
            ));
        }
    }

    out.push_str(&format!("\n  email:    {}\n", contact::mailto_link(complaint)));
    if let Some(wa) = contact::whatsapp_link(complaint) {
        out.push_str(&format!("  whatsapp: {wa}\n"));
    }

    out
}

/// Dashboard summary block.
pub fn stats_block(stats: &Stats) -> String {
    let mut out = format!(
        "Total: {}\nPending: {}\nIn Progress: {}\nResolved: {}\nClosed: {}\n",
        stats.total,
        stats.pending,
        stats.in_progress(),
        stats.resolved,
        stats.closed,
    );

    if !stats.by_category.is_empty() {
        out.push_str("\nBy category:\n");
        for (category, count) in &stats.by_category {
            out.push_str(&format!("  {:<16} {count}\n", category.label()));
        }
    }

    out
}

/// Short identity line for `whoami`.
pub fn user_line(user: &User) -> String {
    format!("{} <{}> ({})", user.name, user.email, user.role)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use broto_store::{Category, Priority, Status};
    use chrono::Utc;

    fn complaint() -> Complaint {
        let now = Utc::now();
        Complaint {
            id: "c1".into(),
            complaint_id: "CMPL-0003".into(),
            title: "Broken projector".into(),
            description: "Room 204".into(),
            category: Category::Infrastructure,
            priority: Priority::High,
            status: Status::Pending,
            student_id: "u1".into(),
            student_name: "Asha".into(),
            student_email: "asha@campus.edu".into(),
            student_phone: Some("+1 555 0100".into()),
            student_profile_image: None,
            image_url: None,
            created_at: now,
            updated_at: now,
            notes: vec![],
            assigned_to: None,
        }
    }

    #[test]
    fn row_carries_code_and_labels() {
        let row = complaint_row(&complaint());
        assert!(row.contains("CMPL-0003"));
        assert!(row.contains("Pending"));
        assert!(row.contains("High"));
    }

    #[test]
    fn detail_includes_contact_links() {
        let detail = complaint_detail(&complaint());
        assert!(detail.contains("mailto:asha@campus.edu"));
        assert!(detail.contains("https://wa.me/15550100"));
    }

    #[test]
    fn long_titles_are_truncated() {
        let mut long = complaint();
        long.title = "x".repeat(60);
        let row = complaint_row(&long);
        assert!(row.contains('…'));
    }
}
