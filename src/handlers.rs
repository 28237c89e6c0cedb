use crate::{
    AppState,
    auth::{self, AuthUser},
    error::{ApiError, ApiJson},
    models::{
        AuthResponse, ContactMessage, ContactMessageCreated, ContactMessageRequest, LoginRequest,
        NewUser, PageContentUpdate, RegisterRequest, SiteContent, SuccessResponse, UploadResponse,
        UserSummary,
    },
    resources::{ResourceKind, ResourceRecord},
    storage::{self, ImageFormat, MAX_UPLOAD_BYTES},
};
use axum::{
    Json,
    extract::{Multipart, Path, Query, State, multipart::MultipartError},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

// --- Filter Structs ---

/// PageContentFilter
///
/// Query parameters of `GET /api/page-content`. Without `page` every entry is returned.
#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageContentFilter {
    /// Page namespace, e.g. `about` selects every `about.*` key.
    pub page: Option<String>,
}

// --- Helpers ---

/// Resolves a route segment against the resource allow-list.
fn resolve_kind(segment: &str) -> Result<ResourceKind, ApiError> {
    segment.parse::<ResourceKind>().map_err(|e| {
        tracing::warn!("{}", e);
        ApiError::UnknownResource
    })
}

/// Parses a record id from the path. An id that is not a UUID can never exist, so it
/// fails like an update or delete of a missing record.
fn record_id(raw: &str, context: &str, state: &AppState) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| {
        ApiError::internal(
            context,
            format!("record {} not found", raw),
            &state.config.env,
        )
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::BadRequest(err.body_text())
    }
}

// --- Auth ---

/// login
///
/// [Public Route] Exchanges email + password for a 7-day admin token.
///
/// An unknown email and a wrong password produce the exact same 401, after the
/// same amount of password hashing work.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = AuthResponse),
        (status = 401, description = "Email ou mot de passe incorrect")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .repo
        .find_user_by_email(payload.email.trim())
        .await
        .map_err(|e| ApiError::internal("find_user_by_email", e, &state.config.env))?;

    let stored_hash = user.as_ref().map(|u| u.password_hash.as_str());
    let verified = auth::check_credentials(&payload.password, stored_hash);
    let Some(user) = user.filter(|_| verified) else {
        tracing::warn!("rejected login attempt");
        return Err(ApiError::InvalidCredentials);
    };

    let token = auth::issue_token(&state.config.jwt_secret, user.id, &user.email)
        .map_err(|e| ApiError::internal("issue_token", e, &state.config.env))?;

    tracing::info!(admin = %user.email, "admin logged in");
    Ok(Json(AuthResponse {
        token,
        user: UserSummary::from(&user),
    }))
}

/// register
///
/// [Public Route] One-time bootstrap of the admin account.
///
/// Refused with 403 as soon as any account exists. Note that this endpoint reveals
/// whether an admin account has been created.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Admin created", body = AuthResponse),
        (status = 400, description = "Missing email or password"),
        (status = 403, description = "Un administrateur existe déjà")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = payload.email.trim().to_string();
    if email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email et mot de passe requis".to_string(),
        ));
    }

    let password_hash = auth::hash_password(&payload.password)
        .map_err(|e| ApiError::internal("hash_password", e, &state.config.env))?;

    let new_user = NewUser {
        email,
        password_hash,
        name: non_blank(payload.name).unwrap_or_else(|| "Admin".to_string()),
        role: "admin".to_string(),
    };

    let user = state
        .repo
        .create_first_user(new_user)
        .await
        .map_err(|e| ApiError::internal("create_first_user", e, &state.config.env))?
        .ok_or_else(|| {
            tracing::warn!("registration refused: an admin already exists");
            ApiError::AdminAlreadyExists
        })?;

    let token = auth::issue_token(&state.config.jwt_secret, user.id, &user.email)
        .map_err(|e| ApiError::internal("issue_token", e, &state.config.env))?;

    tracing::info!(admin = %user.email, "admin account created");
    Ok(Json(AuthResponse {
        token,
        user: UserSummary::from(&user),
    }))
}

// --- Public content ---

/// list_public
///
/// [Public Route] All records of one content kind, `order` ascending.
/// Mounted once per `ResourceKind` at `/api/<segment>`.
pub async fn list_public(
    state: AppState,
    kind: ResourceKind,
) -> Result<Json<Vec<ResourceRecord>>, ApiError> {
    let records = state
        .repo
        .list_resources(kind)
        .await
        .map_err(|e| ApiError::internal("list_resources", e, &state.config.env))?;
    Ok(Json(records))
}

/// create_contact_message
///
/// [Public Route] Stores an inquiry from the contact form.
#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactMessageRequest,
    responses(
        (status = 200, description = "Stored", body = ContactMessageCreated),
        (status = 400, description = "Missing name, email or message")
    )
)]
pub async fn create_contact_message(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ContactMessageRequest>,
) -> Result<Json<ContactMessageCreated>, ApiError> {
    if [&payload.name, &payload.email, &payload.message]
        .iter()
        .any(|v| v.trim().is_empty())
    {
        return Err(ApiError::BadRequest(
            "Nom, email et message requis".to_string(),
        ));
    }

    let request = ContactMessageRequest {
        phone: non_blank(payload.phone),
        wedding_date: non_blank(payload.wedding_date),
        guest_count: non_blank(payload.guest_count),
        budget: non_blank(payload.budget),
        ..payload
    };

    let message = state
        .repo
        .create_message(request)
        .await
        .map_err(|e| ApiError::internal("create_message", e, &state.config.env))?;

    tracing::info!(message_id = %message.id, "contact message received");
    Ok(Json(ContactMessageCreated {
        success: true,
        message,
    }))
}

/// list_page_content
///
/// [Public Route] Page copy for one page (`?page=about`) or for the whole site.
/// Responses are marked uncacheable so edits show up on the next page load.
#[utoipa::path(
    get,
    path = "/api/page-content",
    params(PageContentFilter),
    responses((status = 200, description = "Entries ordered by key", body = [SiteContent]))
)]
pub async fn list_page_content(
    State(state): State<AppState>,
    Query(filter): Query<PageContentFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let page = non_blank(filter.page);
    let content = state
        .repo
        .list_page_content(page.as_deref())
        .await
        .map_err(|e| ApiError::internal("list_page_content", e, &state.config.env))?;

    Ok((
        [(
            header::CACHE_CONTROL,
            "no-store, no-cache, must-revalidate, proxy-revalidate",
        )],
        Json(content),
    ))
}

/// get_page_content
///
/// [Public Route] One entry by exact key, or JSON `null`.
#[utoipa::path(
    get,
    path = "/api/page-content/{key}",
    params(("key" = String, Path, description = "Full content key, e.g. about.story.title1")),
    responses((status = 200, description = "Entry, or null when the key is unknown", body = SiteContent))
)]
pub async fn get_page_content(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Option<SiteContent>>, ApiError> {
    let content = state
        .repo
        .get_page_content(&key)
        .await
        .map_err(|e| ApiError::internal("get_page_content", e, &state.config.env))?;
    Ok(Json(content))
}

/// put_page_content
///
/// [Authenticated Route] Creates or overwrites one entry. The body's `key`, when
/// present, wins over the path segment.
#[utoipa::path(
    put,
    path = "/api/page-content/{key}",
    params(("key" = String, Path, description = "Content key")),
    request_body = PageContentUpdate,
    responses(
        (status = 200, description = "Saved", body = SiteContent),
        (status = 400, description = "Clé invalide"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn put_page_content(
    AuthUser { email, .. }: AuthUser,
    State(state): State<AppState>,
    Path(path_key): Path<String>,
    ApiJson(payload): ApiJson<PageContentUpdate>,
) -> Result<Json<SiteContent>, ApiError> {
    let key = non_blank(payload.key).unwrap_or(path_key);
    let key = key.trim();
    if key.is_empty() || key == "undefined" {
        return Err(ApiError::BadRequest(
            "Clé invalide. La clé doit être fournie dans le body de la requête.".to_string(),
        ));
    }

    let content = state
        .repo
        .upsert_page_content(key, &payload.value, &payload.kind)
        .await
        .map_err(|e| ApiError::internal("upsert_page_content", e, &state.config.env))?;

    tracing::info!(admin = %email, key = %content.key, "page content saved");
    Ok(Json(content))
}

// --- Admin: content cards ---

/// admin_list_resources
///
/// [Admin Route] Lists one resource kind, `order` ascending.
#[utoipa::path(
    get,
    path = "/api/admin/{resource}",
    params(("resource" = String, Path, description = "services | testimonials | gallery | stats | values | contact-info")),
    responses(
        (status = 200, description = "Records ordered by `order`"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Ressource non trouvée")
    )
)]
pub async fn admin_list_resources(
    State(state): State<AppState>,
    Path(resource): Path<String>,
) -> Result<Json<Vec<ResourceRecord>>, ApiError> {
    let kind = resolve_kind(&resource)?;
    list_public(state, kind).await
}

/// admin_create_resource
///
/// [Admin Route] Validates the body against the kind's schema and inserts it.
#[utoipa::path(
    post,
    path = "/api/admin/{resource}",
    params(("resource" = String, Path, description = "Resource kind")),
    responses(
        (status = 200, description = "Created record"),
        (status = 400, description = "Body does not match the resource schema"),
        (status = 404, description = "Ressource non trouvée")
    )
)]
pub async fn admin_create_resource(
    AuthUser { email, .. }: AuthUser,
    State(state): State<AppState>,
    Path(resource): Path<String>,
    ApiJson(body): ApiJson<serde_json::Value>,
) -> Result<Json<ResourceRecord>, ApiError> {
    let kind = resolve_kind(&resource)?;
    let input = kind.decode_input(body)?;

    let record = state
        .repo
        .create_resource(input)
        .await
        .map_err(|e| ApiError::internal("create_resource", e, &state.config.env))?;

    tracing::info!(admin = %email, resource = %kind, id = %record.id(), "record created");
    Ok(Json(record))
}

/// admin_update_resource
///
/// [Admin Route] Replaces the fields of one record. A missing id is a 500.
#[utoipa::path(
    put,
    path = "/api/admin/{resource}/{id}",
    params(
        ("resource" = String, Path, description = "Resource kind"),
        ("id" = Uuid, Path, description = "Record ID")
    ),
    responses(
        (status = 200, description = "Updated record"),
        (status = 400, description = "Body does not match the resource schema"),
        (status = 404, description = "Ressource non trouvée")
    )
)]
pub async fn admin_update_resource(
    AuthUser { email, .. }: AuthUser,
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    ApiJson(body): ApiJson<serde_json::Value>,
) -> Result<Json<ResourceRecord>, ApiError> {
    let kind = resolve_kind(&resource)?;
    let input = kind.decode_input(body)?;
    let id = record_id(&id, "update_resource", &state)?;

    let record = state
        .repo
        .update_resource(id, input)
        .await
        .map_err(|e| ApiError::internal("update_resource", e, &state.config.env))?;

    tracing::info!(admin = %email, resource = %kind, %id, "record updated");
    Ok(Json(record))
}

/// admin_delete_resource
///
/// [Admin Route] Removes one record. Deleting an id that does not exist is a 500,
/// not an idempotent success.
#[utoipa::path(
    delete,
    path = "/api/admin/{resource}/{id}",
    params(
        ("resource" = String, Path, description = "Resource kind"),
        ("id" = Uuid, Path, description = "Record ID")
    ),
    responses(
        (status = 200, description = "Deleted", body = SuccessResponse),
        (status = 404, description = "Ressource non trouvée"),
        (status = 500, description = "Storage failure, including unknown id")
    )
)]
pub async fn admin_delete_resource(
    AuthUser { email, .. }: AuthUser,
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let kind = resolve_kind(&resource)?;
    let id = record_id(&id, "delete_resource", &state)?;

    state
        .repo
        .delete_resource(kind, id)
        .await
        .map_err(|e| ApiError::internal("delete_resource", e, &state.config.env))?;

    tracing::info!(admin = %email, resource = %kind, %id, "record deleted");
    Ok(Json(SuccessResponse { success: true }))
}

// --- Admin: inbox ---

/// list_messages
///
/// [Admin Route] The contact inbox, newest first.
#[utoipa::path(
    get,
    path = "/api/admin/messages",
    responses((status = 200, description = "Messages", body = [ContactMessage]))
)]
pub async fn list_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContactMessage>>, ApiError> {
    let messages = state
        .repo
        .list_messages()
        .await
        .map_err(|e| ApiError::internal("list_messages", e, &state.config.env))?;
    Ok(Json(messages))
}

/// mark_message_read
///
/// [Admin Route] Sets `read = true`. Repeating the call is harmless.
#[utoipa::path(
    put,
    path = "/api/admin/messages/{id}/read",
    params(("id" = Uuid, Path, description = "Message ID")),
    responses((status = 200, description = "Marked as read", body = ContactMessage))
)]
pub async fn mark_message_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ContactMessage>, ApiError> {
    let id = record_id(&id, "mark_message_read", &state)?;
    let message = state
        .repo
        .mark_message_read(id)
        .await
        .map_err(|e| ApiError::internal("mark_message_read", e, &state.config.env))?;
    Ok(Json(message))
}

/// delete_message
#[utoipa::path(
    delete,
    path = "/api/admin/messages/{id}",
    params(("id" = Uuid, Path, description = "Message ID")),
    responses((status = 200, description = "Deleted", body = SuccessResponse))
)]
pub async fn delete_message(
    AuthUser { email, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let id = record_id(&id, "delete_message", &state)?;
    state
        .repo
        .delete_message(id)
        .await
        .map_err(|e| ApiError::internal("delete_message", e, &state.config.env))?;

    tracing::info!(admin = %email, %id, "message deleted");
    Ok(Json(SuccessResponse { success: true }))
}

// --- Admin: media ---

/// upload_image
///
/// [Admin Route] Accepts one image in the multipart field `file` and stores it in
/// the object store, returning its public URL.
///
/// The declared type must be JPEG, PNG or WEBP and agree with the file signature (415).
/// The size limit is enforced while streaming, so an oversized file is rejected (413)
/// before anything reaches storage.
#[utoipa::path(
    post,
    path = "/api/admin/upload",
    responses(
        (status = 200, description = "Stored", body = UploadResponse),
        (status = 400, description = "Aucun fichier reçu"),
        (status = 413, description = "File larger than 4 MiB"),
        (status = 415, description = "Not a JPEG, PNG or WEBP image")
    )
)]
pub async fn upload_image(
    AuthUser { email, .. }: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let Some(original_name) = field.file_name().map(str::to_string) else {
            return Err(ApiError::BadRequest("Aucun fichier reçu".to_string()));
        };
        let format = field
            .content_type()
            .and_then(ImageFormat::from_mime)
            .ok_or(ApiError::UnsupportedMediaType)?;

        let mut data = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            if data.len() + chunk.len() > MAX_UPLOAD_BYTES {
                tracing::warn!(admin = %email, "upload rejected: over {} bytes", MAX_UPLOAD_BYTES);
                return Err(ApiError::PayloadTooLarge);
            }
            data.extend_from_slice(&chunk);
        }

        if data.is_empty() {
            return Err(ApiError::BadRequest("Aucun fichier reçu".to_string()));
        }
        if !format.matches_signature(&data) {
            return Err(ApiError::UnsupportedMediaType);
        }

        let key = storage::object_key_for(&original_name, format, Utc::now().timestamp_millis());
        let size = data.len() as u64;
        let url = state
            .storage
            .put_object(&key, data, format.mime())
            .await
            .map_err(|e| ApiError::internal("put_object", e, &state.config.env))?;

        tracing::info!(admin = %email, %key, size, "image uploaded");
        return Ok(Json(UploadResponse {
            url,
            size,
            original_name,
        }));
    }

    Err(ApiError::BadRequest("Aucun fichier reçu".to_string()))
}
