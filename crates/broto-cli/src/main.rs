//! CLI entry point for the Broto complaint desk.
//!
//! This binary provides the `broto` command: students sign up, log in, and
//! submit complaints; admins triage them. It is a terminal stand-in for the
//! web front-end and owns everything the store layer deliberately does not:
//! input validation, role gating, and user-facing messaging.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use broto_store::{
    Category, ComplaintFilter, ComplaintPatch, ComplaintStore, Database, IdentityStore,
    LoginOutcome, NewComplaint, Priority, RecordStore, SortKey, Stats, Status, User, UserPatch,
    UserRole, query,
};

mod attach;
mod render;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Broto — campus complaint desk.
#[derive(Parser)]
#[command(
    name = "broto",
    version,
    about = "Broto — campus complaint desk",
    long_about = "Submit, track, and triage campus complaints against a local store."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a student account and log in.
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Must match --password.
        #[arg(long)]
        confirm_password: String,
    },

    /// Log in with an existing account.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Which login page this stands in for: student or admin.
        #[arg(long, default_value = "student")]
        role: String,
    },

    /// Legacy admin login using the fixed credential pair.
    AdminLogin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Clear the current session.
    Logout,

    /// Show the current session.
    Whoami,

    /// Update the logged-in user's profile.
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Path to a profile image to attach as a data URI.
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Submit a new complaint (student).
    Submit {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// infrastructure, facilities, academic, administration, other.
        #[arg(long)]
        category: String,
        /// low, medium, high, urgent.
        #[arg(long)]
        priority: String,
        #[arg(long)]
        phone: Option<String>,
        /// Path to an image to attach as a data URI.
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// List complaints — your own as a student, everything as an admin.
    List {
        /// Filter by category ("all" for no constraint).
        #[arg(long)]
        category: Option<String>,
        /// Filter by status ("all" for no constraint).
        #[arg(long)]
        status: Option<String>,
        /// Filter by priority ("all" for no constraint).
        #[arg(long)]
        priority: Option<String>,
        /// Case-insensitive search across title, description, student name.
        #[arg(long)]
        search: Option<String>,
        /// Inclusive lower bound on creation date (YYYY-MM-DD).
        #[arg(long)]
        from: Option<String>,
        /// Inclusive upper bound on creation date (YYYY-MM-DD).
        #[arg(long)]
        to: Option<String>,
        /// date-desc, date-asc, priority-high, priority-low.
        #[arg(long, default_value = "date-desc")]
        sort: String,
    },

    /// Show one complaint in full, with contact links.
    Show { id: String },

    /// Update a complaint's triage fields (admin).
    Update {
        id: String,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        assign: Option<String>,
    },

    /// Append a note to a complaint (admin).
    Note {
        id: String,
        #[arg(long)]
        text: String,
    },

    /// Show dashboard counts (admin).
    Stats,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let stores = open_stores().await?;

    match cli.command {
        Commands::Signup {
            name,
            email,
            password,
            confirm_password,
        } => cmd_signup(&stores, &name, &email, &password, &confirm_password).await,
        Commands::Login {
            email,
            password,
            role,
        } => cmd_login(&stores, &email, &password, &role).await,
        Commands::AdminLogin { email, password } => cmd_admin_login(&stores, &email, &password).await,
        Commands::Logout => cmd_logout(&stores).await,
        Commands::Whoami => cmd_whoami(&stores).await,
        Commands::Profile { name, email, image } => cmd_profile(&stores, name, email, image).await,
        Commands::Submit {
            title,
            description,
            category,
            priority,
            phone,
            image,
        } => cmd_submit(&stores, title, description, &category, &priority, phone, image).await,
        Commands::List {
            category,
            status,
            priority,
            search,
            from,
            to,
            sort,
        } => cmd_list(&stores, category, status, priority, search, from, to, &sort).await,
        Commands::Show { id } => cmd_show(&stores, &id).await,
        Commands::Update {
            id,
            status,
            priority,
            assign,
        } => cmd_update(&stores, &id, status, priority, assign).await,
        Commands::Note { id, text } => cmd_note(&stores, &id, &text).await,
        Commands::Stats => cmd_stats(&stores).await,
    }
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

struct Stores {
    identity: IdentityStore,
    complaints: ComplaintStore,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn open_stores() -> Result<Stores> {
    let db_path = std::env::var("BROTO_DB").unwrap_or_else(|_| "data/broto.db".to_string());
    let db_path = PathBuf::from(db_path);

    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let db = Database::open_and_migrate(db_path.clone())
        .await
        .context("failed to open database")?;
    info!(path = %db_path.display(), "store initialized");

    let records = RecordStore::new(db);
    Ok(Stores {
        identity: IdentityStore::new(records.clone()),
        complaints: ComplaintStore::new(records),
    })
}

// ---------------------------------------------------------------------------
// Role gating (UI-level; the store enforces nothing)
// ---------------------------------------------------------------------------

async fn require_student(stores: &Stores) -> Result<User> {
    match stores.identity.current_user().await? {
        Some(user) if user.role == UserRole::Student => Ok(user),
        Some(_) => bail!("this command is for students — you are logged in as an admin"),
        None => bail!("please log in first (broto login)"),
    }
}

/// Admin access: the current-user pointer is authoritative; the legacy
/// admin flag (set by `admin-login`) is honored as well.
async fn require_admin(stores: &Stores) -> Result<Option<User>> {
    if let Some(user) = stores.identity.current_user().await?
        && user.role == UserRole::Admin
    {
        return Ok(Some(user));
    }
    if stores.identity.is_admin_flag().await? {
        return Ok(None);
    }
    bail!("admin access required (broto login --role admin, or broto admin-login)")
}

// ---------------------------------------------------------------------------
// Accounts and session
// ---------------------------------------------------------------------------

async fn cmd_signup(
    stores: &Stores,
    name: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<()> {
    if name.is_empty() || email.is_empty() || password.is_empty() {
        bail!("please fill in all fields");
    }
    if password != confirm_password {
        bail!("passwords do not match");
    }
    if password.len() < 6 {
        bail!("password must be at least 6 characters");
    }
    if stores.identity.find_by_email(email).await?.is_some() {
        bail!("an account with this email already exists");
    }

    let user = User::new_student(name, email, password);
    stores.identity.add(user.clone()).await?;
    stores.identity.set_current_user(Some(&user)).await?;

    println!("Account created. Welcome, {}!", user.name);
    Ok(())
}

async fn cmd_login(stores: &Stores, email: &str, password: &str, role: &str) -> Result<()> {
    if email.is_empty() || password.is_empty() {
        bail!("please fill in all fields");
    }
    let expected_role = UserRole::parse(role)?;

    match stores.identity.login(email, password, expected_role).await? {
        LoginOutcome::Granted(user) => {
            println!("Welcome back, {}!", user.name);
            Ok(())
        }
        LoginOutcome::UnknownAccount => bail!("no account found with this email"),
        LoginOutcome::WrongPassword => bail!("incorrect password"),
        LoginOutcome::WrongRole => match expected_role {
            UserRole::Student => bail!("please use the admin login"),
            UserRole::Admin => bail!("please use the student login"),
        },
    }
}

async fn cmd_admin_login(stores: &Stores, email: &str, password: &str) -> Result<()> {
    if !IdentityStore::verify_admin_credentials(email, password) {
        bail!("invalid credentials");
    }
    stores.identity.set_admin_flag().await?;
    println!("Admin login successful.");
    Ok(())
}

async fn cmd_logout(stores: &Stores) -> Result<()> {
    stores.identity.logout().await?;
    println!("Logged out.");
    Ok(())
}

async fn cmd_whoami(stores: &Stores) -> Result<()> {
    match stores.identity.current_user().await? {
        Some(user) => println!("{}", render::user_line(&user)),
        None => {
            if stores.identity.is_admin_flag().await? {
                println!("admin (legacy session)");
            } else {
                println!("not logged in");
            }
        }
    }
    Ok(())
}

async fn cmd_profile(
    stores: &Stores,
    name: Option<String>,
    email: Option<String>,
    image: Option<PathBuf>,
) -> Result<()> {
    let Some(user) = stores.identity.current_user().await? else {
        bail!("please log in first (broto login)");
    };
    if matches!(&name, Some(n) if n.is_empty()) || matches!(&email, Some(e) if e.is_empty()) {
        bail!("name and email cannot be empty");
    }

    let profile_image = image.as_deref().map(attach::data_uri_from_file).transpose()?;
    let patch = UserPatch {
        name,
        email,
        profile_image,
    };

    stores.identity.update(&user.id, patch.clone()).await?;

    // The session holds a snapshot; refresh it so role-gated views see the
    // new profile immediately.
    let updated = patch.apply(user);
    stores.identity.set_current_user(Some(&updated)).await?;

    println!("Profile updated.");
    Ok(())
}

// ---------------------------------------------------------------------------
// Complaints
// ---------------------------------------------------------------------------

async fn cmd_submit(
    stores: &Stores,
    title: String,
    description: String,
    category: &str,
    priority: &str,
    phone: Option<String>,
    image: Option<PathBuf>,
) -> Result<()> {
    let student = require_student(stores).await?;

    if title.is_empty() || description.is_empty() {
        bail!("please fill in all required fields");
    }
    let category = Category::parse(category)?;
    let priority = Priority::parse(priority)?;
    let image_url = image.as_deref().map(attach::data_uri_from_file).transpose()?;

    let complaint = stores
        .complaints
        .submit(
            NewComplaint {
                title,
                description,
                category,
                priority,
                student_phone: phone,
                image_url,
            },
            &student,
        )
        .await?;

    println!(
        "Complaint submitted: {} ({})",
        complaint.complaint_id, complaint.id
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn cmd_list(
    stores: &Stores,
    category: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    search: Option<String>,
    from: Option<String>,
    to: Option<String>,
    sort: &str,
) -> Result<()> {
    let filter = ComplaintFilter {
        category: parse_or_all(category, Category::parse)?,
        status: parse_or_all(status, Status::parse)?,
        priority: parse_or_all(priority, Priority::parse)?,
        search: search.filter(|s| !s.is_empty()),
        date_from: parse_date(from)?,
        date_to: parse_date(to)?,
    };
    let sort = SortKey::parse(sort)
        .with_context(|| format!("unknown sort key: {sort} (date-desc, date-asc, priority-high, priority-low)"))?;

    // Students see their own complaints; admins see everything.
    let collection = match stores.identity.current_user().await? {
        Some(user) if user.role == UserRole::Student => {
            stores.complaints.list_by_student(&user.id).await?
        }
        Some(_) => stores.complaints.list().await?,
        None => {
            require_admin(stores).await?;
            stores.complaints.list().await?
        }
    };

    let result = query(&collection, &filter, sort);
    if result.is_empty() {
        if collection.is_empty() {
            println!("No complaints yet.");
        } else {
            println!("No complaints match your filters.");
        }
        return Ok(());
    }

    println!("{}", render::complaint_header());
    for complaint in &result {
        println!("{}", render::complaint_row(complaint));
    }
    Ok(())
}

async fn cmd_show(stores: &Stores, id: &str) -> Result<()> {
    match stores.complaints.find_by_id(id).await? {
        Some(complaint) => {
            print!("{}", render::complaint_detail(&complaint));
            Ok(())
        }
        None => bail!("complaint not found: {id}"),
    }
}

async fn cmd_update(
    stores: &Stores,
    id: &str,
    status: Option<String>,
    priority: Option<String>,
    assign: Option<String>,
) -> Result<()> {
    require_admin(stores).await?;

    if status.is_none() && priority.is_none() && assign.is_none() {
        bail!("nothing to update (pass --status, --priority, or --assign)");
    }
    if stores.complaints.find_by_id(id).await?.is_none() {
        bail!("complaint not found: {id}");
    }

    let patch = ComplaintPatch {
        status: status.as_deref().map(Status::parse).transpose()?,
        priority: priority.as_deref().map(Priority::parse).transpose()?,
        assigned_to: assign,
        ..Default::default()
    };
    stores.complaints.update(id, patch).await?;

    println!("Complaint updated.");
    Ok(())
}

async fn cmd_note(stores: &Stores, id: &str, text: &str) -> Result<()> {
    let admin = require_admin(stores).await?;

    if text.trim().is_empty() {
        bail!("note text cannot be empty");
    }
    if stores.complaints.find_by_id(id).await?.is_none() {
        bail!("complaint not found: {id}");
    }

    // Legacy-flag sessions have no account behind them; sign as "Admin",
    // matching the source system.
    let author = admin.map(|u| u.name).unwrap_or_else(|| "Admin".to_string());
    stores.complaints.append_note(id, text, &author).await?;

    println!("Note added.");
    Ok(())
}

async fn cmd_stats(stores: &Stores) -> Result<()> {
    require_admin(stores).await?;

    let complaints = stores.complaints.list().await?;
    print!("{}", render::stats_block(&Stats::compute(&complaints)));
    Ok(())
}

// ---------------------------------------------------------------------------
// Argument parsing helpers
// ---------------------------------------------------------------------------

/// Parse an optional filter value, treating `"all"` (and empty) as no
/// constraint, the same sentinel the filter dropdowns use.
fn parse_or_all<T>(
    value: Option<String>,
    parse: impl Fn(&str) -> broto_store::StoreResult<T>,
) -> Result<Option<T>> {
    match value.as_deref() {
        None | Some("all") | Some("") => Ok(None),
        Some(s) => Ok(Some(parse(s)?)),
    }
}

fn parse_date(value: Option<String>) -> Result<Option<NaiveDate>> {
    value
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<NaiveDate>()
                .with_context(|| format!("invalid date (expected YYYY-MM-DD): {s}"))
        })
        .transpose()
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_sentinel_means_no_constraint() {
        assert!(parse_or_all(None, Category::parse).unwrap().is_none());
        assert!(parse_or_all(Some("all".into()), Category::parse).unwrap().is_none());
        assert_eq!(
            parse_or_all(Some("academic".into()), Category::parse).unwrap(),
            Some(Category::Academic)
        );
        assert!(parse_or_all(Some("sports".into()), Category::parse).is_err());
    }

    #[test]
    fn dates_parse_or_reject() {
        assert!(parse_date(None).unwrap().is_none());
        assert_eq!(
            parse_date(Some("2026-03-02".into())).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 2)
        );
        assert!(parse_date(Some("03/02/2026".into())).is_err());
    }
}
