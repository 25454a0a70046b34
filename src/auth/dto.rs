use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use crate::formats::timestamp;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gender::ALL.into_iter().find(|g| g.as_str() == s).ok_or(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    ExtremelyActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::LightlyActive,
        ActivityLevel::ModeratelyActive,
        ActivityLevel::VeryActive,
        ActivityLevel::ExtremelyActive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::LightlyActive => "lightly_active",
            ActivityLevel::ModeratelyActive => "moderately_active",
            ActivityLevel::VeryActive => "very_active",
            ActivityLevel::ExtremelyActive => "extremely_active",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary (little or no exercise)",
            ActivityLevel::LightlyActive => "Lightly active (1-3 days/week)",
            ActivityLevel::ModeratelyActive => "Moderately active (3-5 days/week)",
            ActivityLevel::VeryActive => "Very active (6-7 days/week)",
            ActivityLevel::ExtremelyActive => "Extremely active (physical job)",
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivityLevel::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or(())
    }
}

/// The signed-in user as returned by `/auth/me`, login and `/users/profile`.
///
/// `/auth/me` omits the body-metric fields and the profile endpoint omits `is_active`,
/// so everything beyond the identity is optional.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub activity_level: Option<ActivityLevel>,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<PrimitiveDateTime>,
}

fn active_by_default() -> bool {
    true
}

impl User {
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) if !first.is_empty() => format!("{first} {last}"),
            (Some(first), _) if !first.is_empty() => first.to_string(),
            _ => self.username.clone(),
        }
    }
}

/// Partial user record merged into the session's copy after a profile edit.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct UserPatch {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
}

impl UserPatch {
    /// Shallow merge: fields present in the patch replace the user's, absent ones are kept.
    pub fn apply(self, user: &mut User) {
        if let Some(v) = self.email {
            user.email = v;
        }
        if let Some(v) = self.username {
            user.username = v;
        }
        if self.first_name.is_some() {
            user.first_name = self.first_name;
        }
        if self.last_name.is_some() {
            user.last_name = self.last_name;
        }
        if self.age.is_some() {
            user.age = self.age;
        }
        if self.gender.is_some() {
            user.gender = self.gender;
        }
        if self.weight_kg.is_some() {
            user.weight_kg = self.weight_kg;
        }
        if self.height_cm.is_some() {
            user.height_cm = self.height_cm;
        }
        if self.activity_level.is_some() {
            user.activity_level = self.activity_level;
        }
    }
}

impl From<User> for UserPatch {
    fn from(user: User) -> Self {
        Self {
            email: Some(user.email),
            username: Some(user.username),
            first_name: user.first_name,
            last_name: user.last_name,
            age: user.age,
            gender: user.gender,
            weight_kg: user.weight_kg,
            height_cm: user.height_cm,
            activity_level: user.activity_level,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<ActivityLevel>,
}

/// Response of login, refresh and (on some deployments) register.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub user: User,
}

/// Register answers either with a ready session or with the bare account record.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RegisterResponse {
    Session(TokenResponse),
    Account(User),
}

#[cfg(test)]
mod dto_tests {
    use super::*;
    use serde_json::json;

    fn ana() -> User {
        serde_json::from_value(json!({
            "id": 7,
            "email": "ana@example.com",
            "username": "ana",
            "first_name": "Ana",
            "last_name": null,
            "is_active": true,
            "created_at": "2024-05-01T12:30:00"
        }))
        .unwrap()
    }

    #[test]
    fn me_payload_without_metrics_parses() {
        let user = ana();
        assert_eq!(user.id, 7);
        assert_eq!(user.weight_kg, None);
        assert!(user.is_active);
        assert_eq!(user.display_name(), "Ana");
    }

    #[test]
    fn profile_payload_without_is_active_parses() {
        let user: User = serde_json::from_value(json!({
            "id": 7, "email": "ana@example.com", "username": "ana",
            "gender": "female", "activity_level": "very_active",
            "weight_kg": 61.5, "height_cm": 168.0, "bmi": 21.8,
            "created_at": "2024-05-01T12:30:00.123456"
        }))
        .unwrap();
        assert!(user.is_active);
        assert_eq!(user.gender, Some(Gender::Female));
        assert_eq!(user.activity_level, Some(ActivityLevel::VeryActive));
    }

    #[test]
    fn patch_merges_only_present_fields() {
        let mut user = ana();
        UserPatch {
            weight_kg: Some(70.0),
            last_name: Some("Silva".into()),
            ..Default::default()
        }
        .apply(&mut user);
        assert_eq!(user.weight_kg, Some(70.0));
        assert_eq!(user.first_name.as_deref(), Some("Ana"));
        assert_eq!(user.display_name(), "Ana Silva");
        assert_eq!(user.email, "ana@example.com");
    }

    #[test]
    fn register_accepts_bare_account_or_session() {
        let bare: RegisterResponse = serde_json::from_value(json!({
            "id": 1, "email": "a@b.co", "username": "abc",
            "first_name": null, "last_name": null,
            "is_active": true, "created_at": "2024-05-01T12:30:00"
        }))
        .unwrap();
        assert!(matches!(bare, RegisterResponse::Account(_)));

        let session: RegisterResponse = serde_json::from_value(json!({
            "access_token": "t", "token_type": "bearer", "expires_in": 1800,
            "user": {"id": 1, "email": "a@b.co", "username": "abc"}
        }))
        .unwrap();
        assert!(matches!(session, RegisterResponse::Session(_)));
    }

    #[test]
    fn enum_values_round_trip_through_form_strings() {
        assert_eq!("lightly_active".parse(), Ok(ActivityLevel::LightlyActive));
        assert_eq!("other".parse(), Ok(Gender::Other));
        assert!("".parse::<Gender>().is_err());
    }
}
