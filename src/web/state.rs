use crate::generation::CoursePipeline;
use crate::model::ModelManager;

#[derive(Debug, Clone)]
pub struct AppState {
    mm: ModelManager,
    pipeline: CoursePipeline,
}

impl AppState {
    pub fn new(mm: ModelManager, pipeline: CoursePipeline) -> Self {
        Self { mm, pipeline }
    }

    pub fn pool(&self) -> &ModelManager {
        &self.mm
    }

    pub fn pipeline(&self) -> &CoursePipeline {
        &self.pipeline
    }
}
