//! Construction projects

use crate::core::entity::{Data, Record, Reference};
use crate::core::field::FieldValue;
use crate::entities::not_blank;
use crate::export::{CsvRecord, number_cell};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

wire_enum! {
    #[derive(Default)]
    pub enum ProjectStatus {
        #[default]
        Planning => "planning",
        Active => "active",
        OnHold => "on_hold",
        Completed => "completed",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    /// The client user this project is built for
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub managers: Vec<Uuid>,
    #[serde(default)]
    pub members: Vec<Uuid>,
    #[serde(default)]
    pub status: ProjectStatus,
    pub location: Option<String>,
    pub budget: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Project, "project", "projects");

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            client_id: None,
            managers: Vec::new(),
            members: Vec::new(),
            status: ProjectStatus::Planning,
            location: None,
            budget: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Data for Project {
    /// A project belongs to its client, its managers and its members
    fn belongs_to(&self, user_id: Uuid) -> bool {
        self.client_id == Some(user_id)
            || self.managers.contains(&user_id)
            || self.members.contains(&user_id)
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            // lets `?projectId=` narrow a project list to one project
            "id" | "projectId" => Some(FieldValue::Uuid(self.id)),
            "name" => Some(FieldValue::String(self.name.clone())),
            "clientId" => Some(self.client_id.into()),
            "status" => Some(FieldValue::String(self.status.to_string())),
            "location" => Some(self.location.clone().into()),
            "budget" => Some(self.budget.into()),
            "createdAt" => Some(FieldValue::DateTime(self.created_at)),
            "updatedAt" => Some(FieldValue::DateTime(self.updated_at)),
            _ => None,
        }
    }

    fn references(&self) -> Vec<Reference> {
        let mut refs = Vec::new();
        if let Some(client_id) = self.client_id {
            refs.push(Reference::named("clientId", "client", "user", client_id));
        }
        for (i, id) in self.managers.iter().enumerate() {
            refs.push(Reference::many(format!("managers[{}]", i), "managers", "user", *id));
        }
        for (i, id) in self.members.iter().enumerate() {
            refs.push(Reference::many(format!("members[{}]", i), "members", "user", *id));
        }
        refs
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub name: String,
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub managers: Vec<Uuid>,
    #[serde(default)]
    pub members: Vec<Uuid>,
    pub status: Option<ProjectStatus>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    #[validate(range(min = 0.0))]
    pub budget: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub name: Option<String>,
    pub client_id: Option<Uuid>,
    pub managers: Option<Vec<Uuid>>,
    pub members: Option<Vec<Uuid>>,
    pub status: Option<ProjectStatus>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    #[validate(range(min = 0.0))]
    pub budget: Option<f64>,
}

impl Record for Project {
    type Create = CreateProject;
    type Update = UpdateProject;

    /// The author manages the project unless managers are given explicitly
    fn from_create(input: CreateProject, author: Uuid) -> Self {
        let mut project = Project::new(input.name);
        project.client_id = input.client_id;
        project.managers = if input.managers.is_empty() {
            vec![author]
        } else {
            input.managers
        };
        project.members = input.members;
        project.status = input.status.unwrap_or_default();
        project.location = input.location;
        project.budget = input.budget;
        project
    }

    fn apply_update(&mut self, input: UpdateProject) {
        if let Some(name) = input.name {
            self.name = name;
        }
        if input.client_id.is_some() {
            self.client_id = input.client_id;
        }
        if let Some(managers) = input.managers {
            self.managers = managers;
        }
        if let Some(members) = input.members {
            self.members = members;
        }
        if let Some(status) = input.status {
            self.status = status;
        }
        if input.location.is_some() {
            self.location = input.location;
        }
        if input.budget.is_some() {
            self.budget = input.budget;
        }
    }
}

impl CsvRecord for Project {
    fn csv_header() -> &'static [&'static str] {
        &["ID", "Name", "Status", "Location", "Budget", "Client ID", "Created At"]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.status.to_string(),
            self.location.clone().unwrap_or_default(),
            self.budget.map(number_cell).unwrap_or_default(),
            self.client_id.map(|id| id.to_string()).unwrap_or_default(),
            self.created_at.to_rfc3339(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_belongs_to_client_manager_or_member() {
        let client = Uuid::new_v4();
        let manager = Uuid::new_v4();
        let member = Uuid::new_v4();
        let mut project = Project::new("Riverside Towers");
        project.client_id = Some(client);
        project.managers = vec![manager];
        project.members = vec![member];

        assert!(project.belongs_to(client));
        assert!(project.belongs_to(manager));
        assert!(project.belongs_to(member));
        assert!(!project.belongs_to(Uuid::new_v4()));
    }

    #[test]
    fn test_author_becomes_manager_by_default() {
        let author = Uuid::new_v4();
        let input: CreateProject = serde_json::from_value(json!({ "name": "Depot" })).unwrap();
        let project = Project::from_create(input, author);
        assert_eq!(project.managers, vec![author]);
        assert_eq!(project.status, ProjectStatus::Planning);
    }

    #[test]
    fn test_explicit_managers_kept() {
        let manager = Uuid::new_v4();
        let input: CreateProject = serde_json::from_value(json!({
            "name": "Depot",
            "managers": [manager],
            "status": "on_hold"
        }))
        .unwrap();
        let project = Project::from_create(input, Uuid::new_v4());
        assert_eq!(project.managers, vec![manager]);
        assert_eq!(project.status, ProjectStatus::OnHold);
    }

    #[test]
    fn test_references() {
        let mut project = Project::new("Depot");
        let client = Uuid::new_v4();
        project.client_id = Some(client);
        project.members = vec![Uuid::new_v4(), Uuid::new_v4()];

        let refs = project.references();
        assert_eq!(refs.len(), 3);
        assert_eq!(refs[0], Reference::named("clientId", "client", "user", client));
        assert_eq!(refs[2].field, "members[1]");
    }

    #[test]
    fn test_negative_budget_rejected() {
        let input: CreateProject =
            serde_json::from_value(json!({ "name": "Depot", "budget": -1.0 })).unwrap();
        assert!(input.validate().is_err());
    }
}
