use super::domain::KpiRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    DepartmentAdmin,
    User,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::DepartmentAdmin => "admin_bahagian",
            Self::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "admin_bahagian" | "department_admin" => Ok(Self::DepartmentAdmin),
            "user" => Ok(Self::User),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Who is acting. Supplied by the caller; never verified here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub role: Role,
    #[serde(default)]
    pub assigned_department: Option<String>,
}

impl SessionContext {
    pub fn admin() -> Self {
        Self {
            role: Role::Admin,
            assigned_department: None,
        }
    }

    pub fn department_admin(department: impl Into<String>) -> Self {
        Self {
            role: Role::DepartmentAdmin,
            assigned_department: Some(department.into()),
        }
    }

    pub fn user() -> Self {
        Self {
            role: Role::User,
            assigned_department: None,
        }
    }

    pub fn can_view(&self, record: &KpiRecord) -> bool {
        match self.role {
            Role::Admin | Role::User => true,
            Role::DepartmentAdmin => self.owns(record),
        }
    }

    /// Create, replace, delete and import.
    pub fn can_manage(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn can_update_fields(&self, record: &KpiRecord) -> bool {
        match self.role {
            Role::Admin => true,
            Role::DepartmentAdmin => self.owns(record),
            Role::User => false,
        }
    }

    fn owns(&self, record: &KpiRecord) -> bool {
        self.assigned_department
            .as_deref()
            .is_some_and(|department| department == record.department)
    }
}
