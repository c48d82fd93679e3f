//! Course generation: prompt, LLM call, reply repair and assembly.

mod error;
pub use error::{GenerationError, GenerationResult};

mod gemini;
pub use gemini::{CourseGenerator, GeminiGenerator};

pub mod normalize;
pub use normalize::{CourseOutline, NormalizeError, normalize_response};

mod pipeline;
pub use pipeline::{CoursePipeline, CourseRequest};

mod prompt;
pub use prompt::build_course_prompt;
