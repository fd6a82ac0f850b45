use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Gender as stored on the wire: 0 = female, 1 = male, 2 = unknown
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Gender {
    Female,
    Male,
    #[default]
    Unknown,
}

impl TryFrom<u8> for Gender {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Gender::Female),
            1 => Ok(Gender::Male),
            2 => Ok(Gender::Unknown),
            other => Err(format!("invalid gender {}, expected 0, 1 or 2", other)),
        }
    }
}

impl From<Gender> for u8 {
    fn from(gender: Gender) -> Self {
        match gender {
            Gender::Female => 0,
            Gender::Male => 1,
            Gender::Unknown => 2,
        }
    }
}

/// A user record held by the directory
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub login: String,
    pub password: String,
    pub name: String,
    pub gender: Gender,
    pub birthday: Option<NaiveDate>,
    pub admin: bool,
    pub created_on: DateTime<Utc>,
    pub created_by: String,
    pub modified_on: Option<DateTime<Utc>>,
    pub modified_by: Option<String>,
    /// Set when the user is soft deleted
    pub revoked_on: Option<DateTime<Utc>>,
    pub revoked_by: Option<String>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.revoked_on.is_none()
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            name: self.name.clone(),
            gender: self.gender,
            birthday: self.birthday,
            is_active: self.is_active(),
        }
    }

    pub(crate) fn touch(&mut self, actor: &str, now: DateTime<Utc>) {
        self.modified_by = Some(actor.to_string());
        self.modified_on = Some(now);
    }
}

/// Request body for POST /api/users
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub login: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub admin: bool,
}

impl NewUser {
    pub fn into_user(self, created_by: &str, created_on: DateTime<Utc>) -> User {
        User {
            login: self.login,
            password: self.password,
            name: self.name,
            gender: self.gender,
            birthday: self.birthday,
            admin: self.admin,
            created_on,
            created_by: created_by.to_string(),
            modified_on: None,
            modified_by: None,
            revoked_on: None,
            revoked_by: None,
        }
    }
}

/// Request body for PUT /api/users/update-info/{login}
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
}

/// Public view returned by the by-login and self lookups
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub gender: Gender,
    pub birthday: Option<NaiveDate>,
    pub is_active: bool,
}
