use crate::error::{Result, StaffPayError};
use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Rating assigned to a teacher when the form leaves it unset.
pub const DEFAULT_RATING: f64 = 4.0;

pub const MIN_SALARY: Decimal = dec!(1000);
pub const MAX_SALARY: Decimal = dec!(50000);
pub const MAX_EXPERIENCE: u32 = 50;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("valid email pattern")
});

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{0,15}$").expect("valid phone pattern"));

pub const SUBJECTS: [&str; 11] = [
    "Mathematics",
    "English Literature",
    "Physics",
    "Chemistry",
    "Biology",
    "History",
    "Geography",
    "Computer Science",
    "Art",
    "Music",
    "Physical Education",
];

pub const ROLES: [&str; 8] = [
    "Head Teacher",
    "Senior Teacher",
    "Teacher",
    "Assistant Teacher",
    "Subject Coordinator",
    "Department Head",
    "Vice Principal",
    "Principal",
];

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum TeacherStatus {
    #[default]
    Active,
    Inactive,
}

impl std::fmt::Display for TeacherStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

impl std::str::FromStr for TeacherStatus {
    type Err = StaffPayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(StaffPayError::ValidationError(format!(
                "Unknown teacher status '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Qualification {
    pub name: String,
    pub rate: u8,
}

/// A member of the teaching staff as persisted under the `teachers` key.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub experience: u32,
    /// Monthly salary.
    #[serde(with = "rust_decimal::serde::float")]
    pub salary: Decimal,
    pub status: TeacherStatus,
    pub phone: String,
    pub join_date: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifications: Option<Vec<Qualification>>,
}

impl Teacher {
    pub fn is_active(&self) -> bool {
        self.status == TeacherStatus::Active
    }

    /// Case-insensitive substring match over name, subject, email and role.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term)
            || self.subject.to_lowercase().contains(&term)
            || self.email.to_lowercase().contains(&term)
            || self
                .role
                .as_ref()
                .is_some_and(|role| role.to_lowercase().contains(&term))
    }

    pub fn apply(&mut self, patch: TeacherPatch) {
        let TeacherPatch {
            name,
            email,
            subject,
            experience,
            salary,
            status,
            phone,
            rating,
            role,
            address,
        } = patch;
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(subject) = subject {
            self.subject = subject;
        }
        if let Some(experience) = experience {
            self.experience = experience;
        }
        if let Some(salary) = salary {
            self.salary = salary;
        }
        if let Some(status) = status {
            self.status = status;
        }
        if let Some(phone) = phone {
            self.phone = phone;
        }
        if let Some(rating) = rating {
            self.rating = rating;
        }
        if let Some(role) = role {
            self.role = Some(role);
        }
        if let Some(address) = address {
            self.address = Some(address);
        }
    }
}

/// Partial update merged over an existing teacher.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TeacherPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub experience: Option<u32>,
    pub salary: Option<Decimal>,
    pub status: Option<TeacherStatus>,
    pub phone: Option<String>,
    pub rating: Option<f64>,
    pub role: Option<String>,
    pub address: Option<String>,
}

impl TeacherPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the add-form rules to the fields the patch sets.
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            check_name(name)?;
        }
        if let Some(email) = &self.email {
            check_email(email)?;
        }
        if let Some(subject) = &self.subject {
            check_subject(subject)?;
        }
        if let Some(experience) = self.experience {
            check_experience(experience)?;
        }
        if let Some(salary) = self.salary {
            check_salary(salary)?;
        }
        if let Some(phone) = &self.phone {
            check_phone(phone)?;
        }
        if let Some(rating) = self.rating {
            check_rating(rating)?;
        }
        if let Some(role) = &self.role {
            check_role(role)?;
        }
        if let Some(address) = &self.address {
            check_address(address)?;
        }
        Ok(())
    }
}

/// The add-teacher form as submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTeacher {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub experience: u32,
    pub salary: Decimal,
    pub status: TeacherStatus,
    pub phone: String,
    pub rating: Option<f64>,
    pub role: String,
    pub birthdate: String,
    pub address: String,
    pub qualifications: Vec<Qualification>,
}

impl NewTeacher {
    /// Checks every form rule, reporting the first violation.
    pub fn validate(&self) -> Result<()> {
        check_name(&self.name)?;
        if self.role.trim().is_empty() {
            return invalid("Role is required");
        }
        check_role(&self.role)?;
        if self.birthdate.trim().is_empty() {
            return invalid("Birth date is required");
        }
        check_email(&self.email)?;
        check_phone(&self.phone)?;
        if self.subject.trim().is_empty() {
            return invalid("Subject is required");
        }
        check_subject(&self.subject)?;
        check_address(&self.address)?;
        match self.qualifications.first() {
            Some(first) if !first.name.trim().is_empty() => {}
            _ => return invalid("At least one qualification is required"),
        }
        for qualification in &self.qualifications {
            if qualification.name.trim().is_empty() {
                continue;
            }
            if !(1..=5).contains(&qualification.rate) {
                return invalid("Rate must be between 1 and 5");
            }
        }
        check_experience(self.experience)?;
        check_salary(self.salary)?;
        if let Some(rating) = self.rating {
            check_rating(rating)?;
        }
        Ok(())
    }

    /// Validates the form and builds the stored record.
    pub fn into_teacher(self, id: String, joined_at: DateTime<Utc>) -> Result<Teacher> {
        self.validate()?;
        let rating = match self.rating {
            Some(rating) if rating > 0.0 => rating,
            _ => DEFAULT_RATING,
        };
        let qualifications = self
            .qualifications
            .into_iter()
            .filter(|q| !q.name.trim().is_empty())
            .collect();
        Ok(Teacher {
            id,
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            subject: self.subject.trim().to_string(),
            experience: self.experience,
            salary: self.salary,
            status: self.status,
            phone: self.phone,
            join_date: joined_at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            rating,
            role: Some(self.role.trim().to_string()),
            birthdate: Some(self.birthdate),
            address: Some(self.address),
            qualifications: Some(qualifications),
        })
    }
}

fn invalid<T>(message: &str) -> Result<T> {
    Err(StaffPayError::ValidationError(message.to_string()))
}

fn check_name(name: &str) -> Result<()> {
    match name.trim().chars().count() {
        0 => invalid("Full name is required"),
        1 => invalid("Name must be at least 2 characters long"),
        len if len > 50 => invalid("Name must not exceed 50 characters"),
        _ => Ok(()),
    }
}

fn check_email(email: &str) -> Result<()> {
    if email.trim().is_empty() {
        return invalid("Email address is required");
    }
    if !EMAIL_PATTERN.is_match(email.trim()) {
        return invalid("Please enter a valid email address");
    }
    Ok(())
}

/// An empty phone number is allowed.
fn check_phone(phone: &str) -> Result<()> {
    if !phone.is_empty() && !PHONE_PATTERN.is_match(phone) {
        return invalid("Please enter a valid phone number");
    }
    Ok(())
}

fn check_subject(subject: &str) -> Result<()> {
    if !SUBJECTS.contains(&subject.trim()) {
        return invalid("Please select a subject from the list");
    }
    Ok(())
}

fn check_role(role: &str) -> Result<()> {
    if !ROLES.contains(&role.trim()) {
        return invalid("Please select a role from the list");
    }
    Ok(())
}

fn check_address(address: &str) -> Result<()> {
    if address.trim().chars().count() < 10 {
        return invalid("Address must be at least 10 characters long");
    }
    Ok(())
}

fn check_experience(experience: u32) -> Result<()> {
    if experience > MAX_EXPERIENCE {
        return invalid("Experience cannot exceed 50 years");
    }
    Ok(())
}

fn check_salary(salary: Decimal) -> Result<()> {
    if salary < MIN_SALARY {
        return invalid("Salary must be at least $1,000");
    }
    if salary > MAX_SALARY {
        return invalid("Salary cannot exceed $50,000");
    }
    Ok(())
}

fn check_rating(rating: f64) -> Result<()> {
    if !(0.0..=5.0).contains(&rating) {
        return invalid("Rating must be between 0 and 5");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> NewTeacher {
        NewTeacher {
            name: "Ada Lovelace".to_string(),
            email: "ada@school.edu".to_string(),
            subject: "Mathematics".to_string(),
            experience: 10,
            salary: dec!(4000),
            status: TeacherStatus::Active,
            phone: "+441234567".to_string(),
            rating: None,
            role: "Teacher".to_string(),
            birthdate: "1815-12-10".to_string(),
            address: "12 St James's Square, London".to_string(),
            qualifications: vec![
                Qualification {
                    name: "Analytical Engines".to_string(),
                    rate: 5,
                },
                Qualification {
                    name: " ".to_string(),
                    rate: 0,
                },
            ],
        }
    }

    #[test]
    fn test_valid_form_builds_teacher() {
        let teacher = form().into_teacher("42".to_string(), Utc::now()).unwrap();
        assert_eq!(teacher.id, "42");
        assert_eq!(teacher.salary, dec!(4000));
        assert_eq!(teacher.rating, DEFAULT_RATING);
        assert!(teacher.is_active());
        assert_eq!(teacher.qualifications.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_salary_bounds() {
        let mut low = form();
        low.salary = dec!(999);
        assert!(matches!(low.validate(), Err(StaffPayError::ValidationError(_))));

        let mut high = form();
        high.salary = dec!(50001);
        assert!(high.validate().is_err());

        let mut edge = form();
        edge.salary = dec!(50000);
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_email_and_phone_patterns() {
        let mut bad_email = form();
        bad_email.email = "ada@school".to_string();
        assert!(bad_email.validate().is_err());

        let mut no_phone = form();
        no_phone.phone = String::new();
        assert!(no_phone.validate().is_ok());

        let mut bad_phone = form();
        bad_phone.phone = "0123".to_string();
        assert!(bad_phone.validate().is_err());
    }

    #[test]
    fn test_first_qualification_required() {
        let mut missing = form();
        missing.qualifications.clear();
        assert!(missing.validate().is_err());

        let mut bad_rate = form();
        bad_rate.qualifications[0].rate = 6;
        assert!(bad_rate.validate().is_err());
    }

    #[test]
    fn test_subject_and_role_come_from_lists() {
        let mut subject = form();
        subject.subject = "Underwater Basketweaving".to_string();
        assert!(subject.validate().is_err());

        let mut role = form();
        role.role = "Grand Wizard".to_string();
        assert!(role.validate().is_err());

        let mut padded = form();
        padded.subject = " Physics ".to_string();
        assert!(padded.validate().is_ok());
    }

    #[test]
    fn test_patch_validates_only_given_fields() {
        assert!(TeacherPatch::default().validate().is_ok());

        let ok = TeacherPatch {
            salary: Some(dec!(4400)),
            rating: Some(4.5),
            email: Some("new@school.edu".to_string()),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let cases = [
            TeacherPatch {
                salary: Some(dec!(-5)),
                ..Default::default()
            },
            TeacherPatch {
                rating: Some(9.0),
                ..Default::default()
            },
            TeacherPatch {
                email: Some("nope".to_string()),
                ..Default::default()
            },
            TeacherPatch {
                experience: Some(51),
                ..Default::default()
            },
            TeacherPatch {
                name: Some("A".to_string()),
                ..Default::default()
            },
            TeacherPatch {
                phone: Some("0123".to_string()),
                ..Default::default()
            },
            TeacherPatch {
                role: Some("Grand Wizard".to_string()),
                ..Default::default()
            },
            TeacherPatch {
                address: Some("short".to_string()),
                ..Default::default()
            },
        ];
        for patch in cases {
            assert!(patch.validate().is_err(), "{patch:?}");
        }
    }

    #[test]
    fn test_search_matches_role_case_insensitively() {
        let teacher = form().into_teacher("1".to_string(), Utc::now()).unwrap();
        assert!(teacher.matches("TEACH"));
        assert!(teacher.matches("mathem"));
        assert!(!teacher.matches("physics"));
    }

    #[test]
    fn test_patch_only_touches_given_fields() {
        let mut teacher = form().into_teacher("1".to_string(), Utc::now()).unwrap();
        teacher.apply(TeacherPatch {
            status: Some(TeacherStatus::Inactive),
            ..Default::default()
        });
        assert_eq!(teacher.status, TeacherStatus::Inactive);
        assert_eq!(teacher.name, "Ada Lovelace");
    }

    #[test]
    fn test_durable_shape_is_camel_case() {
        let teacher = form().into_teacher("1".to_string(), Utc::now()).unwrap();
        let json = serde_json::to_value(&teacher).unwrap();
        assert!(json.get("joinDate").is_some());
        assert_eq!(json["salary"], serde_json::json!(4000.0));
        assert_eq!(json["status"], "active");
    }
}
