use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
};
use utoipa::OpenApi;
use uuid::Uuid;
use web_core::{authenticate, require_staff, ApiError, JwtAuth, ValidatedJson};

use crate::models::{
    Address, AddressInput, LoginRequest, LoginResponse, MessageResponse, PasswordResetConfirm,
    PasswordResetRequest, RefreshRequest, RefreshResponse, RegisterRequest, UserResponse,
    RESET_REQUESTED_MESSAGE,
};
use crate::repository::{AddressStore, UserStore};
use crate::service::AccountsService;

/// OpenAPI documentation for the accounts API
#[derive(OpenApi)]
#[openapi(
    paths(
        register,
        login,
        refresh_token,
        list_users,
        me,
        list_addresses,
        create_address,
        update_address,
        delete_address,
        request_password_reset,
        confirm_password_reset,
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        LoginResponse,
        RefreshRequest,
        RefreshResponse,
        PasswordResetRequest,
        PasswordResetConfirm,
        MessageResponse,
        UserResponse,
        Address,
        AddressInput,
    )),
    tags(
        (name = "Accounts", description = "Registration, authentication and profile endpoints")
    )
)]
pub struct ApiDoc;

/// Route template to handler name, for the error envelope's meta.view.
/// Paths are as matched at the app level, under the /api prefix.
pub const VIEWS: &[(&str, &str)] = &[
    ("/api/register/", "register"),
    ("/api/login/", "login"),
    ("/api/token/refresh/", "refresh_token"),
    ("/api/users/", "list_users"),
    ("/api/me/", "me"),
    ("/api/me/addresses/", "addresses"),
    ("/api/me/addresses/{id}/", "address_detail"),
    ("/api/password-reset/", "request_password_reset"),
    ("/api/password-reset-confirm/", "confirm_password_reset"),
];

/// Shared handler state: the domain service plus token issuance.
pub struct AccountsState<U: UserStore, A: AddressStore> {
    pub service: AccountsService<U, A>,
    pub jwt: JwtAuth,
}

impl<U: UserStore, A: AddressStore> Clone for AccountsState<U, A> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            jwt: self.jwt.clone(),
        }
    }
}

/// Create the accounts router with all HTTP endpoints.
///
/// Trailing slashes are part of the route, matching the public API
/// contract existing clients depend on.
pub fn router<U, A>(state: AccountsState<U, A>) -> Router
where
    U: UserStore + 'static,
    A: AddressStore + 'static,
{
    Router::new()
        .route("/register/", post(register))
        .route("/login/", post(login))
        .route("/token/refresh/", post(refresh_token))
        .route("/users/", get(list_users))
        .route("/me/", get(me))
        .route("/me/addresses/", get(list_addresses).post(create_address))
        .route(
            "/me/addresses/{id}/",
            put(update_address).delete(delete_address),
        )
        .route("/password-reset/", post(request_password_reset))
        .route("/password-reset-confirm/", post(confirm_password_reset))
        .with_state(state)
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/register/",
    tag = "Accounts",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Validation failed")
    )
)]
async fn register<U: UserStore, A: AddressStore>(
    State(state): State<AccountsState<U, A>>,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.service.register(input).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Exchange credentials for a token pair
#[utoipa::path(
    post,
    path = "/login/",
    tag = "Accounts",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
async fn login<U: UserStore, A: AddressStore>(
    State(state): State<AccountsState<U, A>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .service
        .verify_credentials(&input.email, &input.password)
        .await?;

    let pair = state
        .jwt
        .issue_pair(user.id, &user.email, user.is_staff, user.is_superuser)?;

    Ok(Json(LoginResponse {
        access: pair.access,
        refresh: pair.refresh,
        user: UserResponse::from(user),
    }))
}

/// Rotate a refresh token into a fresh token pair
#[utoipa::path(
    post,
    path = "/token/refresh/",
    tag = "Accounts",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair", body = RefreshResponse),
        (status = 401, description = "Invalid or expired refresh token")
    )
)]
async fn refresh_token<U: UserStore, A: AddressStore>(
    State(state): State<AccountsState<U, A>>,
    ValidatedJson(input): ValidatedJson<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let claims = state
        .jwt
        .verify_refresh(&input.refresh)
        .map_err(|_| ApiError::unauthorized("Given token not valid for any token type."))?;

    // Re-read the account so revoked users and stale role claims
    // cannot refresh their way back in.
    let user = state
        .service
        .get_user(claims.user_id()?)
        .await
        .map_err(|_| ApiError::unauthorized("Given token not valid for any token type."))?;
    if !user.is_active {
        return Err(ApiError::unauthorized(
            "Given token not valid for any token type.",
        ));
    }

    let pair = state
        .jwt
        .issue_pair(user.id, &user.email, user.is_staff, user.is_superuser)?;

    Ok(Json(RefreshResponse {
        access: pair.access,
        refresh: pair.refresh,
    }))
}

/// List all accounts (staff only)
#[utoipa::path(
    get,
    path = "/users/",
    tag = "Accounts",
    responses(
        (status = 200, description = "All accounts", body = Vec<UserResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not staff")
    )
)]
async fn list_users<U: UserStore, A: AddressStore>(
    State(state): State<AccountsState<U, A>>,
    headers: HeaderMap,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let claims = authenticate(&state.jwt, &headers)?;
    require_staff(&claims)?;

    let users = state.service.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// The authenticated caller's own profile
#[utoipa::path(
    get,
    path = "/me/",
    tag = "Accounts",
    responses(
        (status = 200, description = "Own profile", body = UserResponse),
        (status = 401, description = "Not authenticated")
    )
)]
async fn me<U: UserStore, A: AddressStore>(
    State(state): State<AccountsState<U, A>>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, ApiError> {
    let claims = authenticate(&state.jwt, &headers)?;
    let user = state.service.get_user(claims.user_id()?).await?;
    Ok(Json(UserResponse::from(user)))
}

/// The caller's saved addresses
#[utoipa::path(
    get,
    path = "/me/addresses/",
    tag = "Accounts",
    responses(
        (status = 200, description = "Saved addresses", body = Vec<Address>),
        (status = 401, description = "Not authenticated")
    )
)]
async fn list_addresses<U: UserStore, A: AddressStore>(
    State(state): State<AccountsState<U, A>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Address>>, ApiError> {
    let claims = authenticate(&state.jwt, &headers)?;
    let addresses = state.service.list_addresses(claims.user_id()?).await?;
    Ok(Json(addresses))
}

/// Save a new address for the caller
#[utoipa::path(
    post,
    path = "/me/addresses/",
    tag = "Accounts",
    request_body = AddressInput,
    responses(
        (status = 201, description = "Address created", body = Address),
        (status = 400, description = "Validation failed or duplicate"),
        (status = 401, description = "Not authenticated")
    )
)]
async fn create_address<U: UserStore, A: AddressStore>(
    State(state): State<AccountsState<U, A>>,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<AddressInput>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = authenticate(&state.jwt, &headers)?;
    let address = state
        .service
        .create_address(claims.user_id()?, input)
        .await?;
    Ok((StatusCode::CREATED, Json(address)))
}

/// Replace one of the caller's addresses
#[utoipa::path(
    put,
    path = "/me/addresses/{id}/",
    tag = "Accounts",
    request_body = AddressInput,
    responses(
        (status = 200, description = "Address updated", body = Address),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Address not found")
    )
)]
async fn update_address<U: UserStore, A: AddressStore>(
    State(state): State<AccountsState<U, A>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<AddressInput>,
) -> Result<Json<Address>, ApiError> {
    let claims = authenticate(&state.jwt, &headers)?;
    let address = state
        .service
        .update_address(claims.user_id()?, id, input)
        .await?;
    Ok(Json(address))
}

/// Delete one of the caller's addresses
#[utoipa::path(
    delete,
    path = "/me/addresses/{id}/",
    tag = "Accounts",
    responses(
        (status = 204, description = "Address deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Address not found")
    )
)]
async fn delete_address<U: UserStore, A: AddressStore>(
    State(state): State<AccountsState<U, A>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = authenticate(&state.jwt, &headers)?;
    state.service.delete_address(claims.user_id()?, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Ask for a password-reset email
#[utoipa::path(
    post,
    path = "/password-reset/",
    tag = "Accounts",
    request_body = PasswordResetRequest,
    responses(
        (status = 200, description = "Uniform acknowledgement", body = MessageResponse)
    )
)]
async fn request_password_reset<U: UserStore, A: AddressStore>(
    State(state): State<AccountsState<U, A>>,
    ValidatedJson(input): ValidatedJson<PasswordResetRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.service.request_password_reset(&input.email).await?;

    // Identical body whether or not the email matched an account
    Ok(Json(MessageResponse::ok(RESET_REQUESTED_MESSAGE)))
}

/// Complete a password reset using the emailed token
#[utoipa::path(
    post,
    path = "/password-reset-confirm/",
    tag = "Accounts",
    request_body = PasswordResetConfirm,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Invalid link or token")
    )
)]
async fn confirm_password_reset<U: UserStore, A: AddressStore>(
    State(state): State<AccountsState<U, A>>,
    ValidatedJson(input): ValidatedJson<PasswordResetConfirm>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .service
        .confirm_password_reset(&input.uidb64, &input.token, &input.new_password)
        .await?;

    Ok(Json(MessageResponse::ok(
        "Password has been reset successfully.",
    )))
}
