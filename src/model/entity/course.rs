use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::Visitor;

/// Course categories offered to the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub enum Category {
    #[serde(rename = "AI")]
    Ai,
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "Mobile Development")]
    MobileDevelopment,
    #[serde(rename = "Data Science")]
    DataScience,
    #[serde(rename = "Cloud Computing")]
    CloudComputing,
    #[serde(rename = "Cybersecurity")]
    Cybersecurity,
    #[serde(rename = "DevOps")]
    DevOps,
    #[serde(rename = "Blockchain")]
    Blockchain,
    #[serde(rename = "Game Development")]
    GameDevelopment,
    #[serde(rename = "Other")]
    Other,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Self::Ai,
        Self::WebDevelopment,
        Self::MobileDevelopment,
        Self::DataScience,
        Self::CloudComputing,
        Self::Cybersecurity,
        Self::DevOps,
        Self::Blockchain,
        Self::GameDevelopment,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "AI",
            Self::WebDevelopment => "Web Development",
            Self::MobileDevelopment => "Mobile Development",
            Self::DataScience => "Data Science",
            Self::CloudComputing => "Cloud Computing",
            Self::Cybersecurity => "Cybersecurity",
            Self::DevOps => "DevOps",
            Self::Blockchain => "Blockchain",
            Self::GameDevelopment => "Game Development",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown category `{0}`")]
pub struct UnknownCategory(pub String);

impl std::str::FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl TryFrom<String> for Category {
    type Error = UnknownCategory;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Subtopic {
    pub title: String,
    /// Either a resolved URL or a `search:<term>` placeholder.
    pub video_url: String,
    pub content: String,
    pub order: i32,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseModule {
    pub title: String,
    pub order: i32,
    pub subtopics: Vec<Subtopic>,
}

/// A fully generated course that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseDraft {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub thumbnail: String,
    pub modules: Vec<CourseModule>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Course {
    id: Uuid,
    owner_id: String,
    title: String,
    description: String,
    thumbnail: String,
    #[sqlx(try_from = "String")]
    category: Category,
    current_module_index: i32,
    current_subtopic_index: i32,
    #[sqlx(json)]
    modules: Vec<CourseModule>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ResourceTyped for Course {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Course
    }
}

impl Course {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn thumbnail(&self) -> &str {
        &self.thumbnail
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn current_module_index(&self) -> i32 {
        self.current_module_index
    }

    pub fn current_subtopic_index(&self) -> i32 {
        self.current_subtopic_index
    }

    pub fn modules(&self) -> &[CourseModule] {
        &self.modules
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Share of completed subtopics, rounded down. Zero for an empty course.
    pub fn progress_percentage(&self) -> i32 {
        let (total, completed) = self
            .modules
            .iter()
            .flat_map(|m| m.subtopics.iter())
            .fold((0usize, 0usize), |(total, done), s| {
                (total + 1, done + usize::from(s.completed))
            });

        if total == 0 {
            return 0;
        }

        (completed * 100 / total) as i32
    }

    /// Flips the `completed` flag in memory. Returns `None` and leaves the
    /// course untouched when either index is out of range.
    pub fn flip_subtopic(&mut self, module_index: usize, subtopic_index: usize) -> Option<Subtopic> {
        let subtopic = self
            .modules
            .get_mut(module_index)?
            .subtopics
            .get_mut(subtopic_index)?;
        subtopic.completed = !subtopic.completed;
        Some(subtopic.clone())
    }

    /// Overwrites whichever cursor indices are given. No bounds checking.
    pub fn move_cursor(&mut self, module_index: Option<i32>, subtopic_index: Option<i32>) {
        if let Some(m) = module_index {
            self.current_module_index = m;
        }
        if let Some(s) = subtopic_index {
            self.current_subtopic_index = s;
        }
    }

    /// Flips one subtopic and stores the new module tree.
    pub async fn toggle_subtopic(
        &mut self,
        mm: &ModelManager,
        _actor: &Visitor,
        module_index: usize,
        subtopic_index: usize,
    ) -> DatabaseResult<Option<Subtopic>> {
        let Some(subtopic) = self.flip_subtopic(module_index, subtopic_index) else {
            return Ok(None);
        };

        let updated_at: DateTime<Utc> = sqlx::query_scalar(
            "UPDATE courses SET modules = $1, updated_at = now() WHERE id = $2 RETURNING updated_at",
        )
        .bind(sqlx::types::Json(&self.modules))
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        self.updated_at = updated_at;
        Ok(Some(subtopic))
    }

    pub async fn update_progress(
        &mut self,
        mm: &ModelManager,
        _actor: &Visitor,
        module_index: Option<i32>,
        subtopic_index: Option<i32>,
    ) -> DatabaseResult<()> {
        self.move_cursor(module_index, subtopic_index);

        let updated_at: DateTime<Utc> = sqlx::query_scalar(
            "UPDATE courses SET current_module_index = $1, current_subtopic_index = $2, updated_at = now() WHERE id = $3 RETURNING updated_at",
        )
        .bind(self.current_module_index)
        .bind(self.current_subtopic_index)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        self.updated_at = updated_at;
        Ok(())
    }
}

#[async_trait]
impl CrudRepository<Course, CourseDraft, Uuid> for Course {
    async fn create(mm: &ModelManager, actor: &Visitor, data: CourseDraft) -> DatabaseResult<Self> {
        let course = sqlx::query_as(
            r#"
            INSERT INTO courses (id, owner_id, title, description, thumbnail, category, modules)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(actor.id())
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.thumbnail)
        .bind(data.category.as_str())
        .bind(sqlx::types::Json(&data.modules))
        .fetch_one(mm.executor())
        .await?;

        Ok(course)
    }

    async fn delete(self, mm: &ModelManager, actor: &Visitor) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM courses WHERE id = $1 AND owner_id = $2")
            .bind(self.id)
            .bind(actor.id())
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    async fn find_by_id(
        mm: &ModelManager,
        actor: &Visitor,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM courses WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(actor.id())
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    async fn list(
        mm: &ModelManager,
        actor: &Visitor,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM courses WHERE owner_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(actor.id())
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, actor: &Visitor) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses WHERE owner_id = $1")
            .bind(actor.id())
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

#[cfg(test)]
impl Course {
    pub(crate) fn fixture(modules: Vec<CourseModule>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id: String::from("anonymous"),
            title: String::from("Intro to Testing"),
            description: String::from("basics"),
            thumbnail: String::new(),
            category: Category::Other,
            current_module_index: 0,
            current_subtopic_index: 0,
            modules,
            created_at: now,
            updated_at: now,
        }
    }
}
