use std::sync::Arc;

use super::error::GenerationResult;
use super::gemini::CourseGenerator;
use super::normalize::normalize_response;
use super::prompt::build_course_prompt;
use crate::model::entity::{Category, CourseDraft, CourseModule, Subtopic};
use crate::video::VideoResolver;

/// Validated input of a generation run.
#[derive(Debug, Clone)]
pub struct CourseRequest {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub thumbnail: String,
}

/// prompt -> generator -> normalizer -> per-subtopic video resolution.
#[derive(Clone)]
pub struct CoursePipeline {
    generator: Arc<dyn CourseGenerator>,
    resolver: VideoResolver,
}

impl std::fmt::Debug for CoursePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoursePipeline")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl CoursePipeline {
    pub fn new(generator: Arc<dyn CourseGenerator>, resolver: VideoResolver) -> Self {
        Self {
            generator,
            resolver,
        }
    }

    pub fn resolver(&self) -> &VideoResolver {
        &self.resolver
    }

    /// Runs one generation. Subtopics are resolved one after another, so at
    /// most one external call is in flight.
    #[tracing::instrument(skip_all, fields(title = %request.title, category = %request.category))]
    pub async fn generate(&self, request: &CourseRequest) -> GenerationResult<CourseDraft> {
        let prompt = build_course_prompt(&request.title, &request.description, request.category);
        let raw = self.generator.generate(&prompt).await?;
        let outline = normalize_response(&raw)?;

        let mut modules = Vec::with_capacity(outline.modules.len());
        let mut resolved = 0usize;
        let mut total = 0usize;

        for (module_order, module) in outline.modules.into_iter().enumerate() {
            let mut subtopics = Vec::with_capacity(module.subtopics.len());
            for (order, subtopic) in module.subtopics.into_iter().enumerate() {
                let resolution = self.resolver.resolve(&subtopic.video_url).await;
                total += 1;
                if resolution.is_resolved() {
                    resolved += 1;
                }

                subtopics.push(Subtopic {
                    title: subtopic.title,
                    video_url: resolution.into_reference(),
                    content: subtopic.content,
                    order: order as i32,
                    completed: false,
                });
            }

            modules.push(CourseModule {
                title: module.title,
                order: module_order as i32,
                subtopics,
            });
        }

        tracing::info!(
            "generated {} modules, resolved {resolved}/{total} videos",
            modules.len()
        );

        Ok(CourseDraft {
            title: request.title.clone(),
            description: request.description.clone(),
            category: request.category,
            thumbnail: request.thumbnail.clone(),
            modules,
        })
    }
}
