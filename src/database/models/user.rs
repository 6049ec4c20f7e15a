use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::convert::Infallible;
use uuid::Uuid;

use super::{require_text, FieldError, Validate};
use crate::database::postgres::{PgDocument, PgQueryAs};
use crate::database::repository::Document;

/// Registered account. `password` holds the bcrypt hash and is never serialized.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_admin: bool,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub groups: Vec<Uuid>,
    pub user_permissions: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account fields after the password has been hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub last_login: Option<DateTime<Utc>>,
    pub is_admin: Option<bool>,
    pub groups: Option<Vec<Uuid>>,
}

/// Normalize an email for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Body of `POST /auth/register`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterInput {
    pub email: Option<String>,
    pub password: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Body of `POST /auth/login`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Normalized email and the raw password, when both are present and non-blank
fn credentials<'a>(email: Option<&str>, password: Option<&'a str>) -> Option<(String, &'a str)> {
    let email = normalize_email(email?);
    let password = password?;
    if email.is_empty() || password.is_empty() {
        return None;
    }
    Some((email, password))
}

impl RegisterInput {
    pub fn credentials(&self) -> Option<(String, &str)> {
        credentials(self.email.as_deref(), self.password.as_deref())
    }
}

impl LoginInput {
    pub fn credentials(&self) -> Option<(String, &str)> {
        credentials(self.email.as_deref(), self.password.as_deref())
    }
}

// Auth handlers report missing credentials themselves
impl Validate for RegisterInput {}
impl Validate for LoginInput {}

impl Document for User {
    type Create = NewUser;
    type Patch = UserPatch;

    const COLLECTION: &'static str = "users";
    const LABEL: &'static str = "User";
    const UNIQUE_FIELD: Option<&'static str> = Some("email");

    fn id(&self) -> Uuid {
        self.id
    }

    fn unique_key(&self) -> Option<&str> {
        Some(&self.email)
    }

    fn from_create(id: Uuid, now: DateTime<Utc>, input: NewUser) -> Self {
        Self {
            id,
            email: input.email,
            password: input.password_hash,
            username: input.username,
            first_name: input.first_name,
            last_name: input.last_name,
            is_admin: false,
            is_active: true,
            is_staff: false,
            is_superuser: false,
            last_login: None,
            groups: vec![],
            user_permissions: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: UserPatch, now: DateTime<Utc>) {
        if let Some(last_login) = patch.last_login {
            self.last_login = Some(last_login);
        }
        if let Some(is_admin) = patch.is_admin {
            self.is_admin = is_admin;
        }
        if let Some(groups) = patch.groups {
            self.groups = groups;
        }
        self.updated_at = now;
    }
}

impl PgDocument for User {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "email",
        "password",
        "username",
        "first_name",
        "last_name",
        "is_admin",
        "is_active",
        "is_staff",
        "is_superuser",
        "last_login",
        "groups",
        "user_permissions",
        "created_at",
        "updated_at",
    ];

    fn bind_columns<'q>(&self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self> {
        query
            .bind(self.id)
            .bind(self.email.clone())
            .bind(self.password.clone())
            .bind(self.username.clone())
            .bind(self.first_name.clone())
            .bind(self.last_name.clone())
            .bind(self.is_admin)
            .bind(self.is_active)
            .bind(self.is_staff)
            .bind(self.is_superuser)
            .bind(self.last_login)
            .bind(self.groups.clone())
            .bind(self.user_permissions.clone())
            .bind(self.created_at)
            .bind(self.updated_at)
    }
}

/// Named set of permissions, managed from the CLI
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub permissions: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct GroupInput {
    pub name: String,
    pub permissions: Vec<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct GroupPatch {
    pub permissions: Option<Vec<Uuid>>,
}

impl Validate for GroupInput {
    fn validate(&self) -> Result<(), FieldError> {
        require_text("name", &self.name)
    }
}

impl Document for Group {
    type Create = GroupInput;
    type Patch = GroupPatch;

    const COLLECTION: &'static str = "groups";
    const LABEL: &'static str = "Group";
    const UNIQUE_FIELD: Option<&'static str> = Some("name");

    fn id(&self) -> Uuid {
        self.id
    }

    fn unique_key(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn from_create(id: Uuid, now: DateTime<Utc>, input: GroupInput) -> Self {
        Self {
            id,
            name: input.name,
            permissions: input.permissions,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: GroupPatch, now: DateTime<Utc>) {
        if let Some(permissions) = patch.permissions {
            self.permissions = permissions;
        }
        self.updated_at = now;
    }
}

impl PgDocument for Group {
    const COLUMNS: &'static [&'static str] =
        &["id", "name", "permissions", "created_at", "updated_at"];

    fn bind_columns<'q>(&self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self> {
        query
            .bind(self.id)
            .bind(self.name.clone())
            .bind(self.permissions.clone())
            .bind(self.created_at)
            .bind(self.updated_at)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Permission {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct PermissionInput {
    pub name: String,
}

impl Validate for PermissionInput {
    fn validate(&self) -> Result<(), FieldError> {
        require_text("name", &self.name)
    }
}

impl Document for Permission {
    type Create = PermissionInput;
    type Patch = Infallible;

    const COLLECTION: &'static str = "permissions";
    const LABEL: &'static str = "Permission";
    const UNIQUE_FIELD: Option<&'static str> = Some("name");

    fn id(&self) -> Uuid {
        self.id
    }

    fn unique_key(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn from_create(id: Uuid, now: DateTime<Utc>, input: PermissionInput) -> Self {
        Self {
            id,
            name: input.name,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: Infallible, _now: DateTime<Utc>) {
        match patch {}
    }
}

impl PgDocument for Permission {
    const COLUMNS: &'static [&'static str] = &["id", "name", "created_at", "updated_at"];

    fn bind_columns<'q>(&self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self> {
        query
            .bind(self.id)
            .bind(self.name.clone())
            .bind(self.created_at)
            .bind(self.updated_at)
    }
}
