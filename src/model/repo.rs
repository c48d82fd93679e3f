use crate::{
    model::{ModelManager, error::DatabaseResult},
    web::Visitor,
};

#[derive(Debug, Clone)]
pub enum ResourceType {
    Course,
    Subtopic,
    User,
}

pub trait ResourceTyped {
    fn get_resource_type() -> ResourceType;
}

/// Storage operations every entity supports. `actor` scopes the lookups:
/// rows owned by another visitor behave as if they did not exist.
#[async_trait::async_trait]
pub trait CrudRepository<T, Create, V>
where
    T: ResourceTyped,
    V: Clone + Copy,
{
    async fn create(mm: &ModelManager, actor: &Visitor, data: Create) -> DatabaseResult<T>;

    async fn delete(self, mm: &ModelManager, actor: &Visitor) -> DatabaseResult<()>
    where
        Self: Sized;

    async fn find_by_id(mm: &ModelManager, actor: &Visitor, id: V) -> DatabaseResult<Option<T>>;

    async fn list(
        mm: &ModelManager,
        actor: &Visitor,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<T>>;

    async fn count(mm: &ModelManager, actor: &Visitor) -> DatabaseResult<i64>;
}
