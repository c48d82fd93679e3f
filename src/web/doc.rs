use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::web::middlewares::VISITOR_HEADER;

pub struct VisitorHeaderModifier;

impl Modify for VisitorHeaderModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme("visitor", SecurityScheme::ApiKey(
                    ApiKey::Header(ApiKeyValue::with_description(VISITOR_HEADER, "Opaque per-browser id courses are scoped by"))
            ));
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::routes::courses::course_list_handler,
        crate::web::routes::courses::course_create_handler,
        crate::web::routes::courses::course_detail_handler,
        crate::web::routes::courses::course_delete_handler,
        crate::web::routes::courses::course_progress_handler,
        crate::web::routes::courses::subtopic_toggle_handler,
    ),
    modifiers(&VisitorHeaderModifier),
)]
pub struct ApiDoc;
