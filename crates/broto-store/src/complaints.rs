//! Complaint records, human-readable code assignment, and triage updates.
//!
//! Complaints live as one JSON collection under the `complaints` namespace.
//! Every mutation goes through [`ComplaintStore::update`], which merges a
//! typed patch and unconditionally refreshes `updated_at`; note appends are
//! expressed as an update whose notes field is the prior sequence plus one
//! element. Records are never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::identity::User;
use crate::records::{NS_COMPLAINT_COUNTER, NS_COMPLAINTS, RecordStore};

// ═══════════════════════════════════════════════════════════════════════
//  Types
// ═══════════════════════════════════════════════════════════════════════

/// Complaint category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Infrastructure,
    Facilities,
    Academic,
    Administration,
    Other,
}

impl Category {
    pub fn parse(s: &str) -> StoreResult<Self> {
        match s {
            "infrastructure" => Ok(Self::Infrastructure),
            "facilities" => Ok(Self::Facilities),
            "academic" => Ok(Self::Academic),
            "administration" => Ok(Self::Administration),
            "other" => Ok(Self::Other),
            other => Err(StoreError::InvalidArgument(format!(
                "unknown category: {other}"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Infrastructure => "infrastructure",
            Self::Facilities => "facilities",
            Self::Academic => "academic",
            Self::Administration => "administration",
            Self::Other => "other",
        }
    }

    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Infrastructure => "Infrastructure",
            Self::Facilities => "Facilities",
            Self::Academic => "Academic",
            Self::Administration => "Administration",
            Self::Other => "Other",
        }
    }

    /// All categories in presentation order.
    pub const ALL: [Category; 5] = [
        Self::Infrastructure,
        Self::Facilities,
        Self::Academic,
        Self::Administration,
        Self::Other,
    ];
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complaint priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn parse(s: &str) -> StoreResult<Self> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            other => Err(StoreError::InvalidArgument(format!(
                "unknown priority: {other}"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Urgent => "Urgent",
        }
    }

    /// Fixed sort rank: urgent=4, high=3, medium=2, low=1.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Urgent => 4,
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    pub const ALL: [Priority; 4] = [Self::Low, Self::Medium, Self::High, Self::Urgent];
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complaint lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    InReview,
    Assigned,
    Resolved,
    Closed,
}

impl Status {
    pub fn parse(s: &str) -> StoreResult<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_review" => Ok(Self::InReview),
            "assigned" => Ok(Self::Assigned),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            other => Err(StoreError::InvalidArgument(format!(
                "unknown status: {other}"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InReview => "in_review",
            Self::Assigned => "assigned",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }

    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InReview => "In Review",
            Self::Assigned => "Assigned",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
        }
    }

    pub const ALL: [Status; 5] = [
        Self::Pending,
        Self::InReview,
        Self::Assigned,
        Self::Resolved,
        Self::Closed,
    ];
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An admin note appended to a complaint. Immutable once added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Time-derived unique token (UUID v7).
    pub id: String,
    pub text: String,
    /// Display name of the author, not a user reference.
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Note {
    /// Construct a note stamped with the current time.
    pub fn new(text: &str, created_by: &str) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            text: text.to_string(),
            created_by: created_by.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// A complaint record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    /// Opaque unique key (UUID v7).
    pub id: String,
    /// Human-readable sequential code, `CMPL-%04d`.
    pub complaint_id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub status: Status,
    /// Back-reference to the submitting user. Not validated or cascaded.
    pub student_id: String,
    pub student_name: String,
    pub student_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_phone: Option<String>,
    /// Snapshot taken at submission, not live-linked to the account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_profile_image: Option<String>,
    /// Optional attachment as a data URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Append-only, insertion-ordered.
    pub notes: Vec<Note>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

/// Fields a student supplies when submitting a complaint. Everything else
/// (ids, status, timestamps, student snapshot) is filled by
/// [`ComplaintStore::submit`].
#[derive(Debug, Clone)]
pub struct NewComplaint {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub student_phone: Option<String>,
    pub image_url: Option<String>,
}

/// Partial update to a complaint. Provided fields overwrite, omitted fields
/// are retained. `updated_at` is refreshed by the store, not the patch.
#[derive(Debug, Clone, Default)]
pub struct ComplaintPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub student_phone: Option<String>,
    pub image_url: Option<String>,
    pub notes: Option<Vec<Note>>,
    pub assigned_to: Option<String>,
}

impl ComplaintPatch {
    /// Pure shallow merge of this patch into `existing`.
    pub fn apply(&self, mut existing: Complaint) -> Complaint {
        if let Some(title) = &self.title {
            existing.title = title.clone();
        }
        if let Some(description) = &self.description {
            existing.description = description.clone();
        }
        if let Some(category) = self.category {
            existing.category = category;
        }
        if let Some(priority) = self.priority {
            existing.priority = priority;
        }
        if let Some(status) = self.status {
            existing.status = status;
        }
        if let Some(phone) = &self.student_phone {
            existing.student_phone = Some(phone.clone());
        }
        if let Some(image) = &self.image_url {
            existing.image_url = Some(image.clone());
        }
        if let Some(notes) = &self.notes {
            existing.notes = notes.clone();
        }
        if let Some(assignee) = &self.assigned_to {
            existing.assigned_to = Some(assignee.clone());
        }
        existing
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  ComplaintStore
// ═══════════════════════════════════════════════════════════════════════

/// Complaint directory, per-student views, and code assignment.
#[derive(Clone)]
pub struct ComplaintStore {
    records: RecordStore,
}

impl ComplaintStore {
    /// Create a new complaint store on top of `records`.
    pub fn new(records: RecordStore) -> Self {
        Self { records }
    }

    /// List all complaints in store order.
    #[instrument(skip(self))]
    pub async fn list(&self) -> StoreResult<Vec<Complaint>> {
        self.records.load(NS_COMPLAINTS).await
    }

    /// Append a complaint record as-is. The caller supplies every field,
    /// including `id` and `complaint_id`.
    #[instrument(skip(self, complaint))]
    pub async fn add(&self, complaint: Complaint) -> StoreResult<()> {
        let mut complaints = self.list().await?;
        complaints.push(complaint);
        self.records.save(NS_COMPLAINTS, &complaints).await
    }

    /// Build and append a complaint for `student`, assigning the next
    /// sequential code and stamping submission defaults: `pending` status,
    /// empty notes, identical created/updated timestamps, and a snapshot of
    /// the student's name, email, and profile image.
    #[instrument(skip(self, new, student))]
    pub async fn submit(&self, new: NewComplaint, student: &User) -> StoreResult<Complaint> {
        let now = Utc::now();
        let complaint = Complaint {
            id: Uuid::now_v7().to_string(),
            complaint_id: self.next_complaint_id().await?,
            title: new.title,
            description: new.description,
            category: new.category,
            priority: new.priority,
            status: Status::Pending,
            student_id: student.id.clone(),
            student_name: student.name.clone(),
            student_email: student.email.clone(),
            student_phone: new.student_phone,
            student_profile_image: student.profile_image.clone(),
            image_url: new.image_url,
            created_at: now,
            updated_at: now,
            notes: Vec::new(),
            assigned_to: None,
        };

        self.add(complaint.clone()).await?;
        debug!(complaint_id = %complaint.complaint_id, student_id = %complaint.student_id, "complaint submitted");
        Ok(complaint)
    }

    /// Shallow-merge `patch` into the complaint with `id`, refresh
    /// `updated_at` to the mutation time, and persist.
    ///
    /// Unknown ids are a silent no-op (logged at debug). This is the only
    /// sanctioned mutation path for existing complaints.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: &str, patch: ComplaintPatch) -> StoreResult<()> {
        let mut complaints = self.list().await?;
        let Some(slot) = complaints.iter_mut().find(|c| c.id == id) else {
            debug!(id, "update targeted unknown complaint; ignoring");
            return Ok(());
        };

        let mut updated = patch.apply(slot.clone());
        updated.updated_at = Utc::now();
        *slot = updated;

        self.records.save(NS_COMPLAINTS, &complaints).await
    }

    /// Append a note authored by `created_by`, expressed as an update whose
    /// notes field is the prior sequence plus one element.
    ///
    /// Unknown ids are a silent no-op, consistent with [`Self::update`].
    #[instrument(skip(self, text))]
    pub async fn append_note(&self, id: &str, text: &str, created_by: &str) -> StoreResult<()> {
        let Some(existing) = self.find_by_id(id).await? else {
            debug!(id, "note targeted unknown complaint; ignoring");
            return Ok(());
        };

        let mut notes = existing.notes;
        notes.push(Note::new(text, created_by));

        self.update(
            id,
            ComplaintPatch {
                notes: Some(notes),
                ..Default::default()
            },
        )
        .await
    }

    /// Fetch a complaint by its opaque id.
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: &str) -> StoreResult<Option<Complaint>> {
        let complaints = self.list().await?;
        Ok(complaints.into_iter().find(|c| c.id == id))
    }

    /// All complaints submitted by `student_id`, in store order.
    #[instrument(skip(self))]
    pub async fn list_by_student(&self, student_id: &str) -> StoreResult<Vec<Complaint>> {
        let complaints = self.list().await?;
        Ok(complaints
            .into_iter()
            .filter(|c| c.student_id == student_id)
            .collect())
    }

    /// Advance the persisted sequence counter and return the formatted
    /// code. The first call ever returns `CMPL-0001`; codes are strictly
    /// increasing and never reused.
    #[instrument(skip(self))]
    pub async fn next_complaint_id(&self) -> StoreResult<String> {
        let n = self.records.increment(NS_COMPLAINT_COUNTER).await?;
        Ok(format!("CMPL-{n:04}"))
    }
}

// ── tests ────────────────────────────────────────────────────────────
