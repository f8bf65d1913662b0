//! User accounts and the current-session pointer.
//!
//! Accounts live as one JSON collection under the `users` namespace; the
//! session is a full snapshot of the logged-in user persisted under
//! `current_user` (a copy, not a live reference — profile edits must
//! re-set the pointer explicitly, matching the source system).
//!
//! Passwords are stored and compared in plain text. That reproduces the
//! source system's behavior faithfully and is **not** a security design to
//! carry anywhere else.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::records::{NS_ADMIN_AUTHENTICATED, NS_CURRENT_USER, NS_USERS, RecordStore};

/// Fixed credential pair for the legacy admin-flag login path.
pub const ADMIN_EMAIL: &str = "admin@broto.com";
/// Fixed password for the legacy admin-flag login path.
pub const ADMIN_PASSWORD: &str = "admin123";

// ═══════════════════════════════════════════════════════════════════════
//  Types
// ═══════════════════════════════════════════════════════════════════════

/// A user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier (UUID v7).
    pub id: String,
    /// Login email. Uniqueness is the caller's job, not the store's.
    pub email: String,
    /// Plain-text password (source fidelity).
    pub password: String,
    /// Display name.
    pub name: String,
    /// Role gating which views the user may reach.
    pub role: UserRole,
    /// Optional profile image as a data URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Construct a fresh student account with a generated id.
    pub fn new_student(name: &str, email: &str, password: &str) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
            role: UserRole::Student,
            profile_image: None,
            created_at: Utc::now(),
        }
    }
}

/// Account roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Submits and tracks complaints.
    Student,
    /// Triages and updates complaints.
    Admin,
}

impl UserRole {
    /// Convert from the stored string representation.
    pub fn parse(s: &str) -> StoreResult<Self> {
        match s {
            "student" => Ok(Self::Student),
            "admin" => Ok(Self::Admin),
            other => Err(StoreError::InvalidArgument(format!(
                "unknown user role: {other}"
            ))),
        }
    }

    /// Convert to the stored string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partial update to a user record. Provided fields overwrite, omitted
/// fields are retained.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub profile_image: Option<String>,
}

impl UserPatch {
    /// Pure shallow merge of this patch into `existing`.
    pub fn apply(&self, mut existing: User) -> User {
        if let Some(name) = &self.name {
            existing.name = name.clone();
        }
        if let Some(email) = &self.email {
            existing.email = email.clone();
        }
        if let Some(image) = &self.profile_image {
            existing.profile_image = Some(image.clone());
        }
        existing
    }

    fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.profile_image.is_none()
    }
}

/// Result of a credential check. Rejections are ordinary values, never
/// errors — the caller decides user-facing messaging.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// Credentials and role matched; the session pointer has been set.
    Granted(User),
    /// No account exists under that email.
    UnknownAccount,
    /// The account exists but the password did not match.
    WrongPassword,
    /// Credentials matched an account of a different role.
    WrongRole,
}

// ═══════════════════════════════════════════════════════════════════════
//  IdentityStore
// ═══════════════════════════════════════════════════════════════════════

/// Account directory plus the "who is logged in" pointer.
#[derive(Clone)]
pub struct IdentityStore {
    records: RecordStore,
}

impl IdentityStore {
    /// Create a new identity store on top of `records`.
    pub fn new(records: RecordStore) -> Self {
        Self { records }
    }

    /// List all accounts in insertion order.
    #[instrument(skip(self))]
    pub async fn list(&self) -> StoreResult<Vec<User>> {
        self.records.load(NS_USERS).await
    }

    /// Append an account. Performs no uniqueness check — callers screen
    /// duplicate emails before invoking this.
    #[instrument(skip(self, user))]
    pub async fn add(&self, user: User) -> StoreResult<()> {
        let mut users = self.list().await?;
        users.push(user);
        self.records.save(NS_USERS, &users).await
    }

    /// First account whose email matches exactly, scanning insertion order.
    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.list().await?;
        Ok(users.into_iter().find(|u| u.email == email))
    }

    /// Shallow-merge `patch` into the account with `id` and persist.
    ///
    /// Unknown ids are a silent no-op (logged at debug), per the store's
    /// soft-failure policy.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: &str, patch: UserPatch) -> StoreResult<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let mut users = self.list().await?;
        let Some(slot) = users.iter_mut().find(|u| u.id == id) else {
            debug!(id, "update targeted unknown user; ignoring");
            return Ok(());
        };

        *slot = patch.apply(slot.clone());
        self.records.save(NS_USERS, &users).await
    }

    // ── session pointer ──────────────────────────────────────────────

    /// The currently logged-in user, if any.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> StoreResult<Option<User>> {
        self.records.get(NS_CURRENT_USER).await
    }

    /// Set or clear the session pointer. The user is stored by value.
    #[instrument(skip(self, user))]
    pub async fn set_current_user(&self, user: Option<&User>) -> StoreResult<()> {
        match user {
            Some(user) => self.records.put(NS_CURRENT_USER, user).await,
            None => {
                self.records.clear(NS_CURRENT_USER).await?;
                Ok(())
            }
        }
    }

    /// Clear the session pointer and the legacy admin flag.
    ///
    /// Clearing both keeps the two session mechanisms from disagreeing
    /// after a sign-out.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> StoreResult<()> {
        self.set_current_user(None).await?;
        self.clear_admin_flag().await?;
        debug!("session cleared");
        Ok(())
    }

    // ── credential checks ────────────────────────────────────────────

    /// Check `email`/`password` against the directory, requiring
    /// `expected_role`, and set the session pointer on success.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        expected_role: UserRole,
    ) -> StoreResult<LoginOutcome> {
        let Some(user) = self.find_by_email(email).await? else {
            return Ok(LoginOutcome::UnknownAccount);
        };

        if user.password != password {
            return Ok(LoginOutcome::WrongPassword);
        }

        if user.role != expected_role {
            return Ok(LoginOutcome::WrongRole);
        }

        self.set_current_user(Some(&user)).await?;
        debug!(user_id = %user.id, role = %user.role, "login granted");
        Ok(LoginOutcome::Granted(user))
    }

    // ── legacy admin flag ────────────────────────────────────────────
    //
    // The source system carried a second, simplified admin session: a
    // boolean flag set by a fixed credential pair, independent of the
    // current-user pointer. The pointer is authoritative; the flag is kept
    // for the legacy admin dashboard path only.

    /// Check the fixed admin credential pair.
    pub fn verify_admin_credentials(email: &str, password: &str) -> bool {
        email == ADMIN_EMAIL && password == ADMIN_PASSWORD
    }

    /// Mark the legacy admin session as authenticated.
    #[instrument(skip(self))]
    pub async fn set_admin_flag(&self) -> StoreResult<()> {
        self.records.put(NS_ADMIN_AUTHENTICATED, &true).await
    }

    /// Whether the legacy admin session is authenticated. Presence of the
    /// namespace counts; its content is not inspected.
    #[instrument(skip(self))]
    pub async fn is_admin_flag(&self) -> StoreResult<bool> {
        self.records.exists(NS_ADMIN_AUTHENTICATED).await
    }

    /// Clear the legacy admin session.
    #[instrument(skip(self))]
    pub async fn clear_admin_flag(&self) -> StoreResult<()> {
        self.records.clear(NS_ADMIN_AUTHENTICATED).await?;
        Ok(())
    }
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn setup_store() -> IdentityStore {
        let db = Database::open_in_memory().unwrap();
        db.run_migrations().await.unwrap();
        IdentityStore::new(RecordStore::new(db))
    }

    fn student(name: &str, email: &str) -> User {
        User::new_student(name, email, "hunter22")
    }

    #[tokio::test]
    async fn add_and_list_preserve_insertion_order() {
        let store = setup_store().await;

        store.add(student("Asha", "asha@campus.edu")).await.unwrap();
        store.add(student("Ben", "ben@campus.edu")).await.unwrap();

        let users = store.list().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].name, "Asha");
        assert_eq!(users[1].name, "Ben");
    }

    #[tokio::test]
    async fn find_by_email_is_exact_and_case_sensitive() {
        let store = setup_store().await;
        store.add(student("Asha", "asha@campus.edu")).await.unwrap();

        assert!(store.find_by_email("asha@campus.edu").await.unwrap().is_some());
        assert!(store.find_by_email("Asha@campus.edu").await.unwrap().is_none());
        assert!(store.find_by_email("nobody@campus.edu").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_merges_and_keeps_omitted_fields() {
        let store = setup_store().await;
        let user = student("Asha", "asha@campus.edu");
        let id = user.id.clone();
        store.add(user).await.unwrap();

        store
            .update(
                &id,
                UserPatch {
                    name: Some("Asha K".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let updated = store.find_by_email("asha@campus.edu").await.unwrap().unwrap();
        assert_eq!(updated.name, "Asha K");
        assert_eq!(updated.password, "hunter22");
        assert_eq!(updated.role, UserRole::Student);
    }

    #[tokio::test]
    async fn update_unknown_id_is_a_no_op() {
        let store = setup_store().await;
        store.add(student("Asha", "asha@campus.edu")).await.unwrap();

        store
            .update(
                "missing",
                UserPatch {
                    name: Some("Ghost".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let users = store.list().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "Asha");
    }

    #[tokio::test]
    async fn session_pointer_set_read_clear() {
        let store = setup_store().await;
        let user = student("Asha", "asha@campus.edu");
        store.add(user.clone()).await.unwrap();

        assert!(store.current_user().await.unwrap().is_none());

        store.set_current_user(Some(&user)).await.unwrap();
        let current = store.current_user().await.unwrap().unwrap();
        assert_eq!(current.id, user.id);

        store.logout().await.unwrap();
        assert!(store.current_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn session_pointer_is_a_snapshot_not_a_live_reference() {
        let store = setup_store().await;
        let user = student("Asha", "asha@campus.edu");
        let id = user.id.clone();
        store.add(user.clone()).await.unwrap();
        store.set_current_user(Some(&user)).await.unwrap();

        // Editing the directory does not touch the snapshot.
        store
            .update(
                &id,
                UserPatch {
                    name: Some("Renamed".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let current = store.current_user().await.unwrap().unwrap();
        assert_eq!(current.name, "Asha");
    }

    #[tokio::test]
    async fn login_reports_each_rejection_reason() {
        let store = setup_store().await;
        store.add(student("Asha", "asha@campus.edu")).await.unwrap();

        let outcome = store
            .login("ghost@campus.edu", "hunter22", UserRole::Student)
            .await
            .unwrap();
        assert_eq!(outcome, LoginOutcome::UnknownAccount);

        let outcome = store
            .login("asha@campus.edu", "wrong", UserRole::Student)
            .await
            .unwrap();
        assert_eq!(outcome, LoginOutcome::WrongPassword);

        let outcome = store
            .login("asha@campus.edu", "hunter22", UserRole::Admin)
            .await
            .unwrap();
        assert_eq!(outcome, LoginOutcome::WrongRole);

        // No rejection may set the session.
        assert!(store.current_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn login_grants_and_sets_session() {
        let store = setup_store().await;
        store.add(student("Asha", "asha@campus.edu")).await.unwrap();

        let outcome = store
            .login("asha@campus.edu", "hunter22", UserRole::Student)
            .await
            .unwrap();
        let LoginOutcome::Granted(user) = outcome else {
            panic!("expected Granted, got {outcome:?}");
        };
        assert_eq!(user.email, "asha@campus.edu");

        let current = store.current_user().await.unwrap().unwrap();
        assert_eq!(current.id, user.id);
    }

    #[tokio::test]
    async fn admin_flag_round_trip() {
        let store = setup_store().await;

        assert!(!store.is_admin_flag().await.unwrap());
        store.set_admin_flag().await.unwrap();
        assert!(store.is_admin_flag().await.unwrap());

        store.logout().await.unwrap();
        assert!(!store.is_admin_flag().await.unwrap());
    }

    #[test]
    fn fixed_admin_credentials() {
        assert!(IdentityStore::verify_admin_credentials(
            "admin@broto.com",
            "admin123"
        ));
        assert!(!IdentityStore::verify_admin_credentials(
            "admin@broto.com",
            "nope"
        ));
        assert!(!IdentityStore::verify_admin_credentials(
            "someone@else.com",
            "admin123"
        ));
    }

    #[test]
    fn role_string_round_trip() {
        assert_eq!(UserRole::parse("student").unwrap(), UserRole::Student);
        assert_eq!(UserRole::parse("admin").unwrap(), UserRole::Admin);
        assert!(UserRole::parse("viewer").is_err());
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }

    #[test]
    fn patch_apply_is_pure_shallow_merge() {
        let user = student("Asha", "asha@campus.edu");
        let patch = UserPatch {
            email: Some("asha.k@campus.edu".into()),
            profile_image: Some("data:image/png;base64,AAAA".into()),
            ..Default::default()
        };

        let merged = patch.apply(user.clone());
        assert_eq!(merged.email, "asha.k@campus.edu");
        assert_eq!(merged.profile_image.as_deref(), Some("data:image/png;base64,AAAA"));
        assert_eq!(merged.name, user.name);
        assert_eq!(merged.id, user.id);
    }
}
