//! OpenAPI documentation for the taskboard API.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api;
use crate::notifications;

/// Bearer token security scheme.
struct BearerSecurityAddon;

impl Modify for BearerSecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "BearerAuth".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "JWT access token obtained from `/authentication/register` or \
                             `/authentication/login`:\n\n```\nAuthorization: Bearer YOUR_TOKEN\n```",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&BearerSecurityAddon),
    paths(
        api::handlers::auth::register,
        api::handlers::auth::login,
        api::handlers::users::lookup_users,
        api::handlers::users::get_user,
        api::handlers::projects::list_projects,
        api::handlers::projects::lookup_projects,
        api::handlers::projects::get_project,
        api::handlers::projects::project_statistics,
        api::handlers::projects::create_project,
        api::handlers::projects::update_project,
        api::handlers::projects::delete_project,
        api::handlers::tasks::list_tasks,
        api::handlers::tasks::task_statistics,
        api::handlers::tasks::get_task,
        api::handlers::tasks::create_task,
        api::handlers::tasks::update_task,
        api::handlers::tasks::delete_task,
    ),
    components(
        schemas(
            api::models::auth::RegisterRequest,
            api::models::auth::LoginRequest,
            api::models::auth::AuthResponse,
            api::models::users::UserResponse,
            api::models::users::UserLookup,
            api::models::projects::ProjectCreate,
            api::models::projects::ProjectUpdate,
            api::models::projects::ProjectResponse,
            api::models::projects::ProjectDetailResponse,
            api::models::projects::ProjectLookup,
            api::models::projects::ProjectStatistics,
            api::models::tasks::TaskCreate,
            api::models::tasks::TaskUpdate,
            api::models::tasks::TaskResponse,
            api::models::tasks::TaskDetailResponse,
            api::models::tasks::TaskStatistics,
            api::models::tasks::TaskStatus,
            api::models::tasks::TaskPriority,
            notifications::TaskEvent,
            notifications::TaskEventKind,
        )
    ),
    tags(
        (name = "authentication", description = "Account registration and login"),
        (name = "users", description = "User lookups"),
        (name = "projects", description = "Project management"),
        (name = "tasks", description = "Task management and statistics"),
    )
)]
pub struct ApiDoc;
