//! Contact-link construction for reaching a student about a complaint.
//!
//! Derived, non-persisted outputs: a `mailto:` link and a WhatsApp deep
//! link, built from complaint data for presentation-layer "contact student"
//! actions. Nothing here touches the store.

use url::Url;

use crate::complaints::Complaint;

/// Build a `mailto:` link addressed to the complaint's student.
///
/// Subject and body carry the complaint code, title, and current status.
pub fn mailto_link(complaint: &Complaint) -> String {
    let subject = format!("Complaint {}: {}", complaint.complaint_id, complaint.title);
    let body = format!(
        "Hello {},\n\nRegarding your complaint {} \"{}\".\nCurrent status: {}.\n",
        complaint.student_name,
        complaint.complaint_id,
        complaint.title,
        complaint.status.label(),
    );

    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("subject", &subject)
        .append_pair("body", &body)
        .finish()
        // Mail clients do not decode '+' as space in mailto queries.
        .replace('+', "%20");

    format!("mailto:{}?{}", complaint.student_email, query)
}

/// Build a WhatsApp deep link (`https://wa.me/<digits>`) for the
/// complaint's student, or `None` when no phone number is on record (or it
/// contains no digits).
///
/// The prefilled message carries the student name, title, code, and status.
pub fn whatsapp_link(complaint: &Complaint) -> Option<String> {
    let phone = complaint.student_phone.as_deref()?;
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }

    let text = format!(
        "Hello {}, regarding your complaint \"{}\" ({}). Status: {}.",
        complaint.student_name,
        complaint.title,
        complaint.complaint_id,
        complaint.status.label(),
    );

    let mut url = Url::parse(&format!("https://wa.me/{digits}")).ok()?;
    url.query_pairs_mut().append_pair("text", &text);
    Some(url.to_string())
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complaints::{Category, Priority, Status};
    use chrono::Utc;

    fn complaint(phone: Option<&str>) -> Complaint {
        let now = Utc::now();
        Complaint {
            id: "c1".into(),
            complaint_id: "CMPL-0007".into(),
            title: "Broken projector".into(),
            description: "Room 204".into(),
            category: Category::Infrastructure,
            priority: Priority::High,
            status: Status::InReview,
            student_id: "u1".into(),
            student_name: "Asha Kumar".into(),
            student_email: "asha@campus.edu".into(),
            student_phone: phone.map(str::to_string),
            student_profile_image: None,
            image_url: None,
            created_at: now,
            updated_at: now,
            notes: vec![],
            assigned_to: None,
        }
    }

    #[test]
    fn mailto_targets_student_and_encodes_subject() {
        let link = mailto_link(&complaint(None));

        assert!(link.starts_with("mailto:asha@campus.edu?"));
        assert!(link.contains("subject=Complaint%20CMPL-0007%3A%20Broken%20projector"));
        assert!(link.contains("CMPL-0007"));
        assert!(link.contains("In%20Review"));
        // Spaces must be %20, never '+'.
        assert!(!link.contains('+'));
    }

    #[test]
    fn whatsapp_strips_non_digits_from_phone() {
        let link = whatsapp_link(&complaint(Some("+91 98765-43210"))).unwrap();

        assert!(link.starts_with("https://wa.me/919876543210?text="));
        assert!(link.contains("CMPL-0007"));
        assert!(link.contains("Asha"));
    }

    #[test]
    fn whatsapp_absent_without_phone() {
        assert!(whatsapp_link(&complaint(None)).is_none());
        assert!(whatsapp_link(&complaint(Some("ext. none"))).is_none());
    }
}
