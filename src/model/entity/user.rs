use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::Visitor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Pro,
    Enterprise,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
            Self::Enterprise => "enterprise",
        }
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown plan `{0}`, expected free, pro or enterprise")]
pub struct UnknownPlan(pub String);

impl std::str::FromStr for Plan {
    type Err = UnknownPlan;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            "enterprise" => Ok(Self::Enterprise),
            _ => Err(UnknownPlan(s.to_string())),
        }
    }
}

impl TryFrom<String> for Plan {
    type Error = UnknownPlan;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct UserEntity {
    id: Uuid,
    email: String,
    name: String,
    #[serde(skip)]
    password_hash: String,
    #[sqlx(try_from = "String")]
    plan: Plan,
    courses_created: i32,
    course_limit: i32,
    is_active: bool,
    is_staff: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UserEntityCreate {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub plan: Plan,
}

impl ResourceTyped for UserEntity {
    fn get_resource_type() -> crate::model::repo::ResourceType {
        crate::model::repo::ResourceType::User
    }
}

impl UserEntity {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hash(&self) -> &str {
        &self.password_hash
    }

    pub fn plan(&self) -> Plan {
        self.plan
    }

    pub fn courses_created(&self) -> i32 {
        self.courses_created
    }

    pub fn course_limit(&self) -> i32 {
        self.course_limit
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_staff(&self) -> bool {
        self.is_staff
    }

    pub fn can_create_course(&self) -> bool {
        self.courses_created < self.course_limit
    }

    pub async fn increment_courses(&mut self, mm: &ModelManager) -> DatabaseResult<()> {
        self.courses_created = sqlx::query_scalar(
            "UPDATE users SET courses_created = courses_created + 1, updated_at = now() WHERE id = $1 RETURNING courses_created",
        )
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;
        Ok(())
    }

    /// Never drops the counter below zero.
    pub async fn decrement_courses(&mut self, mm: &ModelManager) -> DatabaseResult<()> {
        self.courses_created = sqlx::query_scalar(
            "UPDATE users SET courses_created = GREATEST(courses_created - 1, 0), updated_at = now() WHERE id = $1 RETURNING courses_created",
        )
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;
        Ok(())
    }

    pub async fn find_by_email(
        mm: &ModelManager,
        _actor: &Visitor,
        email: &str,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email.trim().to_lowercase())
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }
}

#[async_trait]
impl CrudRepository<UserEntity, UserEntityCreate, Uuid> for UserEntity {
    async fn create(
        mm: &ModelManager,
        _actor: &Visitor,
        data: UserEntityCreate,
    ) -> DatabaseResult<Self> {
        let user = sqlx::query_as(
            "INSERT INTO users (id, email, name, password_hash, plan) VALUES ($1,$2,$3,$4,$5) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.email.trim().to_lowercase())
        .bind(&data.name)
        .bind(&data.password_hash)
        .bind(data.plan.as_str())
        .fetch_one(mm.executor())
        .await?;

        Ok(user)
    }

    async fn delete(self, mm: &ModelManager, _actor: &Visitor) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &Visitor,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    async fn list(
        mm: &ModelManager,
        _actor: &Visitor,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM users ORDER BY created_at LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &Visitor) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn user(courses_created: i32, course_limit: i32) -> UserEntity {
        let now = Utc::now();
        UserEntity {
            id: Uuid::new_v4(),
            email: String::from("someone@example.com"),
            name: String::new(),
            password_hash: String::new(),
            plan: Plan::Free,
            courses_created,
            course_limit,
            is_active: true,
            is_staff: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn course_limit_is_exclusive() {
        assert!(user(0, 3).can_create_course());
        assert!(user(2, 3).can_create_course());
        assert!(!user(3, 3).can_create_course());
    }

    fn loads_from_pg_row<T>()
    where
        T: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
    {
    }

    #[test]
    fn user_rows_decode_plan_column() {
        loads_from_pg_row::<UserEntity>();
    }

    #[test]
    fn plan_labels_parse() {
        assert_eq!("pro".parse::<Plan>().unwrap(), Plan::Pro);
        assert_eq!(" Enterprise ".parse::<Plan>().unwrap(), Plan::Enterprise);
        for plan in [Plan::Free, Plan::Pro, Plan::Enterprise] {
            assert_eq!(Plan::try_from(plan.to_string()).unwrap(), plan);
        }
    }

    #[test]
    fn unknown_plan_is_rejected() {
        let err = "premium".parse::<Plan>().unwrap_err();
        assert_eq!(err.0, "premium");
        assert!(Plan::try_from(String::new()).is_err());
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let mut u = user(0, 3);
        u.password_hash = String::from("$argon2id$secret");
        let json = serde_json::to_string(&u).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("\"plan\":\"free\""));
    }
}
