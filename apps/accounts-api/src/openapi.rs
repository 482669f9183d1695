//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for the Accounts API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Accounts API",
        version = "0.1.0",
        description = "User accounts: registration, JWT authentication, profiles, addresses and password reset",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api", api = domain_accounts::ApiDoc)
    ),
    tags(
        (name = "Accounts", description = "Account management endpoints")
    )
)]
pub struct ApiDoc;
