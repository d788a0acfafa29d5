//! Domain entities for the Chat domain

use serde::{Deserialize, Serialize};

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// One conversational message.
///
/// Assistant messages start empty and grow as stream deltas arrive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    /// Whether this message carries any text
    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }
}

/// Product a conversation can be focused on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Product {
    Foundations,
    Membership,
    Mastermind,
}

impl Product {
    pub const ALL: [Product; 3] = [Product::Foundations, Product::Membership, Product::Mastermind];

    /// Stable identifier used on the wire and by product buttons
    pub fn id(&self) -> &'static str {
        match self {
            Product::Foundations => "foundations",
            Product::Membership => "membership",
            Product::Mastermind => "mastermind",
        }
    }

    /// Human-readable name used in prompts
    pub fn display_name(&self) -> &'static str {
        match self {
            Product::Foundations => "the Foundations Program",
            Product::Membership => "the Inner Circle Membership",
            Product::Mastermind => "the Mastermind Retreat",
        }
    }
}

impl std::fmt::Display for Product {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for Product {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Product::ALL
            .into_iter()
            .find(|p| p.id() == s.trim())
            .ok_or_else(|| format!("Unknown product: {}", s))
    }
}

/// Profile used to personalize assistant replies.
///
/// Every field is optional on the wire; a profile produced by the capture
/// form has first name, last name and email set together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl UserProfile {
    /// Build a profile from capture form input
    pub fn captured(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        phone: Option<String>,
    ) -> Self {
        Self {
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            email: Some(email.into()),
            phone,
        }
    }

    /// First name, last name and email are all present and non-blank
    pub fn is_complete(&self) -> bool {
        [&self.first_name, &self.last_name, &self.email]
            .iter()
            .all(|field| non_blank(field).is_some())
    }

    /// No field carries any text
    pub fn is_empty(&self) -> bool {
        [&self.first_name, &self.last_name, &self.email, &self.phone]
            .iter()
            .all(|field| non_blank(field).is_none())
    }

    pub fn first_name(&self) -> Option<&str> {
        non_blank(&self.first_name)
    }

    pub fn last_name(&self) -> Option<&str> {
        non_blank(&self.last_name)
    }

    pub fn email(&self) -> Option<&str> {
        non_blank(&self.email)
    }

    pub fn phone(&self) -> Option<&str> {
        non_blank(&self.phone)
    }
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_round_trips_through_id() {
        for product in Product::ALL {
            assert_eq!(product.id().parse::<Product>(), Ok(product));
        }
        assert!("platinum".parse::<Product>().is_err());
    }

    #[test]
    fn test_product_serializes_as_kebab_id() {
        assert_eq!(
            serde_json::to_string(&Product::Membership).unwrap(),
            "\"membership\""
        );
    }

    #[test]
    fn test_profile_completeness() {
        let profile = UserProfile::captured("Ada", "Lovelace", "ada@example.com", None);
        assert!(profile.is_complete());
        assert!(!profile.is_empty());

        let blank = UserProfile {
            first_name: Some("  ".to_string()),
            ..UserProfile::default()
        };
        assert!(blank.is_empty());
        assert!(!blank.is_complete());
        assert_eq!(blank.first_name(), None);
    }

    #[test]
    fn test_profile_wire_format_is_camel_case() {
        let profile = UserProfile::captured("Ada", "Lovelace", "ada@example.com", None);
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["lastName"], "Lovelace");
        assert!(json.get("phone").is_none());
    }

    #[test]
    fn test_message_has_content() {
        assert!(!Message::assistant("").has_content());
        assert!(Message::user("Hi").has_content());
    }
}
