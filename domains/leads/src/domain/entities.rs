//! Domain entities for the Leads domain
//!
//! A lead is the profile captured by the chat widgets' one-time capture form.
//! Leads are keyed by their normalized (trimmed, lowercased) email.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::ValidateEmail;

use funnel_common::{Error, Result};

/// Maximum name length (varchar(100))
const MAX_NAME_LENGTH: usize = 100;

/// Maximum email length (varchar(254))
const MAX_EMAIL_LENGTH: usize = 254;

/// Digits, spaces, dashes, dots, parentheses and an optional leading plus
static PHONE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[0-9][0-9 ().-]{5,30}$").expect("phone regex is valid")
});

/// Stored lead
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Lead {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated, normalized lead submission
#[derive(Debug, Clone, PartialEq)]
pub struct NewLead {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl NewLead {
    /// Validate and normalize a submission.
    ///
    /// First name, last name and email are required together; a blank phone
    /// is treated as absent.
    pub fn new(
        first_name: &str,
        last_name: &str,
        email: &str,
        phone: Option<&str>,
    ) -> Result<Self> {
        let first_name = required_name("First name", first_name)?;
        let last_name = required_name("Last name", last_name)?;

        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(Error::Validation("Email is required".to_string()));
        }
        if email.len() > MAX_EMAIL_LENGTH || !email.validate_email() {
            return Err(Error::Validation("Email is invalid".to_string()));
        }

        let phone = match phone.map(str::trim).filter(|p| !p.is_empty()) {
            Some(p) if PHONE_REGEX.is_match(p) => Some(p.to_string()),
            Some(_) => return Err(Error::Validation("Phone number is invalid".to_string())),
            None => None,
        };

        Ok(Self {
            first_name,
            last_name,
            email,
            phone,
        })
    }

    /// Build the stored record for a first-time submission
    pub fn into_lead(self) -> Lead {
        let now = Utc::now();
        Lead {
            id: Uuid::new_v4(),
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Lead {
    /// Apply a repeated submission for the same email.
    ///
    /// Keeps `id` and `created_at`; a submission without a phone keeps the
    /// previously stored one.
    pub fn merge(&mut self, update: NewLead) {
        self.first_name = update.first_name;
        self.last_name = update.last_name;
        if update.phone.is_some() {
            self.phone = update.phone;
        }
        self.updated_at = Utc::now();
    }
}

fn required_name(label: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::Validation(format!("{} is required", label)));
    }
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(Error::Validation(format!(
            "{} must be at most {} characters",
            label, MAX_NAME_LENGTH
        )));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_lead_normalizes_fields() {
        let lead = NewLead::new("  Ada ", "Lovelace", " Ada@Example.COM ", Some("  ")).unwrap();
        assert_eq!(lead.first_name, "Ada");
        assert_eq!(lead.last_name, "Lovelace");
        assert_eq!(lead.email, "ada@example.com");
        assert_eq!(lead.phone, None);
    }

    #[test]
    fn test_new_lead_requires_names_and_email() {
        assert!(matches!(
            NewLead::new("", "Lovelace", "ada@example.com", None),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            NewLead::new("Ada", "   ", "ada@example.com", None),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            NewLead::new("Ada", "Lovelace", "", None),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_new_lead_rejects_invalid_email() {
        let err = NewLead::new("Ada", "Lovelace", "ada-at-example", None).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Email is invalid");
    }

    #[test]
    fn test_new_lead_rejects_long_name() {
        let long = "a".repeat(101);
        assert!(NewLead::new(&long, "Lovelace", "ada@example.com", None).is_err());
    }

    #[test]
    fn test_phone_validation() {
        assert_eq!(
            NewLead::new("Ada", "L", "ada@example.com", Some("+1 (555) 010-2030"))
                .unwrap()
                .phone
                .as_deref(),
            Some("+1 (555) 010-2030")
        );
        assert!(NewLead::new("Ada", "L", "ada@example.com", Some("call me")).is_err());
        assert!(NewLead::new("Ada", "L", "ada@example.com", Some("12")).is_err());
    }

    #[test]
    fn test_merge_keeps_identity_and_previous_phone() {
        let mut lead = NewLead::new("Ada", "Lovelace", "ada@example.com", Some("5550102030"))
            .unwrap()
            .into_lead();
        let id = lead.id;
        let created_at = lead.created_at;

        lead.merge(NewLead::new("Augusta", "King", "ada@example.com", None).unwrap());

        assert_eq!(lead.id, id);
        assert_eq!(lead.created_at, created_at);
        assert_eq!(lead.first_name, "Augusta");
        assert_eq!(lead.last_name, "King");
        assert_eq!(lead.phone.as_deref(), Some("5550102030"));
        assert!(lead.updated_at >= created_at);
    }
}
