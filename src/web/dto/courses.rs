use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    generation::CourseRequest,
    model::{
        ResourceTyped,
        entity::{Category, Course, CourseModule},
    },
    web::{WebError, WebResult},
};

const MAX_TITLE_CHARS: usize = 255;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CourseCreateBody {
    pub title: String,
    pub description: String,
    /// One of the [`Category`] labels, e.g. `"Web Development"`.
    pub category: String,
    pub thumbnail: Option<String>,
}

impl CourseCreateBody {
    /// Rejects bad payloads before any generation work starts.
    pub fn validate(self) -> WebResult<CourseRequest> {
        let bad = |reason: String| WebError::resource_bad_request(Course::get_resource_type(), reason);

        let title = self.title.trim().to_string();
        let title_len = title.chars().count();
        if title_len == 0 || title_len > MAX_TITLE_CHARS {
            return Err(bad(format!("title must be 1-{MAX_TITLE_CHARS} characters")));
        }

        let description = self.description.trim().to_string();
        if description.is_empty() {
            return Err(bad(String::from("description must not be blank")));
        }

        let category: Category = self.category.parse().map_err(|e| bad(format!("{e}")))?;

        let thumbnail = self.thumbnail.unwrap_or_default().trim().to_string();
        if !thumbnail.is_empty() {
            let parsed = url::Url::parse(&thumbnail)
                .map_err(|e| bad(format!("thumbnail is not a valid URL: {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(bad(String::from("thumbnail must be an http(s) URL")));
            }
        }

        Ok(CourseRequest {
            title,
            description,
            category,
            thumbnail,
        })
    }
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct CourseProgressBody {
    pub module_index: Option<i32>,
    pub subtopic_index: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub category: Category,
    pub progress_percentage: i32,
    pub created_at: DateTime<Utc>,
}

impl From<&Course> for CourseSummary {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id(),
            title: course.title().to_string(),
            description: course.description().to_string(),
            thumbnail: course.thumbnail().to_string(),
            category: course.category(),
            progress_percentage: course.progress_percentage(),
            created_at: course.created_at(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseDetail {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub category: Category,
    pub current_module_index: i32,
    pub current_subtopic_index: i32,
    pub modules: Vec<CourseModule>,
    pub progress_percentage: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Course> for CourseDetail {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id(),
            title: course.title().to_string(),
            description: course.description().to_string(),
            thumbnail: course.thumbnail().to_string(),
            category: course.category(),
            current_module_index: course.current_module_index(),
            current_subtopic_index: course.current_subtopic_index(),
            modules: course.modules().to_vec(),
            progress_percentage: course.progress_percentage(),
            created_at: course.created_at(),
            updated_at: course.updated_at(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn body(title: &str, description: &str, category: &str, thumbnail: Option<&str>) -> CourseCreateBody {
        CourseCreateBody {
            title: title.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            thumbnail: thumbnail.map(str::to_string),
        }
    }

    #[test]
    fn valid_body_becomes_request() {
        let req = body(" Intro to Testing ", "basics", "Other", None).validate().unwrap();
        assert_eq!(req.title, "Intro to Testing");
        assert_eq!(req.category, Category::Other);
        assert_eq!(req.thumbnail, "");

        let req = body("t", "d", "Data Science", Some("https://img.example.com/a.png"))
            .validate()
            .unwrap();
        assert_eq!(req.category, Category::DataScience);
        assert_eq!(req.thumbnail, "https://img.example.com/a.png");
    }

    #[test]
    fn invalid_bodies_are_rejected() {
        let long = "x".repeat(256);
        let cases = [
            body("", "d", "Other", None),
            body(&long, "d", "Other", None),
            body("t", "  ", "Other", None),
            body("t", "d", "Cooking", None),
            body("t", "d", "Other", Some("not a url")),
            body("t", "d", "Other", Some("ftp://example.com/a.png")),
        ];

        for case in cases {
            let err = case.validate().unwrap_err();
            assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn blank_thumbnail_is_allowed() {
        let req = body("t", "d", "AI", Some("  ")).validate().unwrap();
        assert_eq!(req.thumbnail, "");
    }
}
