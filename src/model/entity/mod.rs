mod user;
pub use user::{Plan, UnknownPlan, UserEntity, UserEntityCreate};

mod course;
pub use course::{Category, Course, CourseDraft, CourseModule, Subtopic, UnknownCategory};
