use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ========== ROLE ==========
/// Role stored on a credential record.
///
/// Unrecognized values are kept verbatim so they round-trip through
/// responses and tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Student,
    Org,
    Individual,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
            Role::Org => "org",
            Role::Individual => "individual",
            Role::Other(other) => other,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "admin" => Role::Admin,
            "student" => Role::Student,
            "org" => Role::Org,
            "individual" => Role::Individual,
            _ => Role::Other(value),
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Role::from(value.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loose address check for registration: `local@domain.tld`, no spaces.
pub fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !email.contains(char::is_whitespace)
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

// ========== CREDENTIAL ==========
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CredentialRecord {
    pub id: String,
    pub email: String,
    /// PHC-format password hash
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub username: String,
}

// ========== ADMIN ==========
#[derive(Debug, Deserialize)]
pub struct CreateAdminRequest {
    pub name: String,
    pub org_id: String,
    pub role: String,
    pub contact: String,
    pub language: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateAdminRequest {
    pub name: Option<String>,
    pub role: Option<String>,
    pub contact: Option<String>,
    pub language: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

// ========== STUDENT ==========
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct StudentMarks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_mark: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_mark: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_test_mark: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fluency_mark: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocab_mark: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentence_mastery: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateStudentRequest {
    pub name: String,
    pub org_id: String,
    pub language: String,
    pub email: String,
    pub password: String,
    #[serde(flatten)]
    pub marks: StudentMarks,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateStudentRequest {
    pub name: Option<String>,
    pub language: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(flatten)]
    pub marks: StudentMarks,
}

// ========== TEST ==========
pub const STATUS_UPCOMING: &str = "upcoming";
pub const STATUS_COMPLETED: &str = "completed";

fn default_status() -> String {
    STATUS_UPCOMING.to_string()
}

#[derive(Debug, Deserialize)]
pub struct CreateTestRequest {
    pub test_name: String,
    /// Credential id of the creating admin
    pub auth_id: String,
    pub org_id: String,
    pub language: String,
    /// Minutes
    pub test_duration: i64,
    pub test_time: DateTime<Utc>,
    pub test_link: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTestRequest {
    pub test_name: Option<String>,
    pub test_duration: Option<i64>,
    pub test_time: Option<DateTime<Utc>>,
    pub test_link: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Test {
    pub id: String,
    pub test_name: String,
    pub org_id: String,
    pub user_id: String,
    pub language: String,
    pub test_duration: i64,
    pub test_time: String,
    pub test_link: Option<String>,
    pub status: String,
    #[serde(default)]
    pub created_at: String,
}

// ========== ANALYTICS ==========
#[derive(Debug, Serialize, PartialEq)]
pub struct AnalyticsSummary {
    pub avg_overall: f64,
    pub avg_fluency: f64,
    pub avg_vocab: f64,
    pub avg_sentence_mastery: f64,
    pub avg_pronunciation: f64,
    pub weekly_improvement: f64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct LanguageDetail {
    pub language_name: String,
    pub total_students: usize,
    pub active_students: usize,
    pub tests_conducted: usize,
    pub pass_rate: usize,
}
