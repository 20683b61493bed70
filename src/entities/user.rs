//! Users of the system, including clients

use crate::core::auth::Role;
use crate::core::entity::{Data, Record};
use crate::core::field::FieldValue;
use crate::entities::not_blank;
use crate::export::CsvRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

wire_enum! {
    /// Whether a user may still sign in
    #[derive(Default)]
    pub enum UserStatus {
        #[default]
        Active => "active",
        Inactive => "inactive",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(User, "user", "users");

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            role,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            role: self.role,
        }
    }
}

/// The slice of a user shown in the acting-as selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
}

impl Data for User {
    fn belongs_to(&self, user_id: Uuid) -> bool {
        self.id == user_id
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(FieldValue::Uuid(self.id)),
            "name" => Some(FieldValue::String(self.name.clone())),
            "email" => Some(FieldValue::String(self.email.clone())),
            "role" => Some(FieldValue::String(self.role.to_string())),
            "status" => Some(FieldValue::String(self.status.to_string())),
            "createdAt" => Some(FieldValue::DateTime(self.created_at)),
            "updatedAt" => Some(FieldValue::DateTime(self.updated_at)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub status: Option<UserStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

impl Record for User {
    type Create = CreateUser;
    type Update = UpdateUser;

    fn from_create(input: CreateUser, _author: Uuid) -> Self {
        let mut user = User::new(input.name, input.email, input.role);
        user.status = input.status.unwrap_or_default();
        user
    }

    fn apply_update(&mut self, input: UpdateUser) {
        if let Some(name) = input.name {
            self.name = name;
        }
        if let Some(email) = input.email {
            self.email = email;
        }
        if let Some(role) = input.role {
            self.role = role;
        }
        if let Some(status) = input.status {
            self.status = status;
        }
    }
}

impl CsvRecord for User {
    fn csv_header() -> &'static [&'static str] {
        &["ID", "Name", "Email", "Role", "Status", "Created At"]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.email.clone(),
            self.role.to_string(),
            self.status.to_string(),
            self.created_at.to_rfc3339(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_wire_format() {
        let user = User::new("Asha", "asha@example.com", Role::Md);
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["role"], "md");
        assert_eq!(value["status"], "active");
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_belongs_to_self_only() {
        let user = User::new("Asha", "asha@example.com", Role::Engineer);
        assert!(user.belongs_to(user.id));
        assert!(!user.belongs_to(Uuid::new_v4()));
    }

    #[test]
    fn test_create_payload_validation() {
        let input: CreateUser = serde_json::from_value(json!({
            "name": " ",
            "email": "not-an-email",
            "role": "engineer"
        }))
        .unwrap();
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn test_unknown_role_rejected_on_parse() {
        let parsed = serde_json::from_value::<CreateUser>(json!({
            "name": "X",
            "email": "x@example.com",
            "role": "overlord"
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_apply_update_keeps_absent_fields() {
        let mut user = User::new("Asha", "asha@example.com", Role::Engineer);
        user.apply_update(UpdateUser {
            status: Some(UserStatus::Inactive),
            ..Default::default()
        });
        assert_eq!(user.name, "Asha");
        assert_eq!(user.status, UserStatus::Inactive);
    }
}
