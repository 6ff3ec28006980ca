use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    #[default]
    Personal,
    Academic,
    Professional,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "PERSONAL",
            Self::Academic => "ACADEMIC",
            Self::Professional => "PROFESSIONAL",
        }
    }
}

impl FromStr for AccountType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PERSONAL" => Ok(Self::Personal),
            "ACADEMIC" => Ok(Self::Academic),
            "PROFESSIONAL" => Ok(Self::Professional),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaritalStatus {
    Married,
    #[default]
    Single,
    Widowed,
}

impl MaritalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Married => "MARRIED",
            Self::Single => "SINGLE",
            Self::Widowed => "WIDOWED",
        }
    }
}

impl FromStr for MaritalStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MARRIED" => Ok(Self::Married),
            "SINGLE" => Ok(Self::Single),
            "WIDOWED" => Ok(Self::Widowed),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown variant: {}", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// A stored user. The password hash never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_photo: Option<String>,
    pub header_image: Option<String>,
    pub account_type: AccountType,
    pub marital_status: MaritalStatus,
    pub biography: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub joined: DateTime<Utc>,
    pub location: Option<Location>,
}

impl User {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Body of a create/update user request. Updates overwrite every field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_photo: Option<String>,
    pub header_image: Option<String>,
    pub account_type: AccountType,
    pub marital_status: MaritalStatus,
    pub biography: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub location: Option<Location>,
}

/// Public fields of a referenced user, used when a reference is populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub email: String,
}

/// Denormalized counters cached on each tuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TuitStats {
    pub replies: i64,
    pub retuits: i64,
    pub likes: i64,
    pub dislikes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tuit {
    pub id: String,
    pub tuit: String,
    pub posted_by: UserSummary,
    pub posted_on: DateTime<Utc>,
    pub stats: TuitStats,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTuit {
    pub tuit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: String,
    pub tuit: String,
    pub liked_by: String,
    pub is_dislike: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Follow {
    pub id: String,
    pub follower: String,
    pub followed: String,
    pub followed_on: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub user: String,
    pub tuit: String,
    pub bookmarked_on: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub message: String,
    pub sender: UserSummary,
    pub recipient: UserSummary,
    pub sent_on: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMessage {
    pub message: String,
}

/// Result of an update, shaped like a document-store write acknowledgement.
/// `modified_count` only counts rows whose stored values actually changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatus {
    pub matched_count: u64,
    pub modified_count: u64,
}

impl UpdateStatus {
    pub fn new(matched: usize, modified: usize) -> Self {
        Self {
            matched_count: matched as u64,
            modified_count: modified as u64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteStatus {
    pub deleted_count: u64,
}

impl DeleteStatus {
    pub fn from_rows(rows: usize) -> Self {
        Self {
            deleted_count: rows as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_type_round_trips_through_str() {
        for kind in [
            AccountType::Personal,
            AccountType::Academic,
            AccountType::Professional,
        ] {
            assert_eq!(kind.as_str().parse::<AccountType>().unwrap(), kind);
        }
        assert!("ADMIN".parse::<AccountType>().is_err());
    }

    #[test]
    fn marital_status_defaults_to_single() {
        assert_eq!(MaritalStatus::default(), MaritalStatus::Single);
        assert_eq!("WIDOWED".parse::<MaritalStatus>().unwrap(), MaritalStatus::Widowed);
    }

    #[test]
    fn user_json_hides_password_hash() {
        let user = User {
            id: "u1".into(),
            username: "alice".into(),
            password_hash: "$2b$secret".into(),
            email: "alice@example.com".into(),
            first_name: None,
            last_name: None,
            profile_photo: None,
            header_image: None,
            account_type: AccountType::Academic,
            marital_status: MaritalStatus::Single,
            biography: None,
            date_of_birth: None,
            joined: Utc::now(),
            location: None,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(!json.to_string().contains("secret"));
        assert_eq!(json["accountType"], "ACADEMIC");
    }

    #[test]
    fn new_user_fills_defaults() {
        let parsed: NewUser =
            serde_json::from_str(r#"{"username":"bob","password":"pw"}"#).unwrap();
        assert_eq!(parsed.email, "");
        assert_eq!(parsed.account_type, AccountType::Personal);
        assert!(parsed.location.is_none());
    }

    #[test]
    fn status_objects_use_camel_case() {
        let json = serde_json::to_value(DeleteStatus::from_rows(2)).unwrap();
        assert_eq!(json, serde_json::json!({ "deletedCount": 2 }));
        let json = serde_json::to_value(UpdateStatus::new(1, 0)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "matchedCount": 1, "modifiedCount": 0 })
        );
    }
}
