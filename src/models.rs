use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// An administrator account from the `users` table. Only used for authentication;
/// the password hash never leaves the server.
#[derive(Debug, Clone, FromRow, Default)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// NewUser
///
/// Insert payload for the `users` table. `password_hash` must already be an Argon2 PHC string.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
}

/// Service
///
/// A numbered service card shown on the home page ("01 Organisation Complète", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Service {
    pub id: Uuid,
    pub number: String,
    pub title: String,
    pub description: String,
    pub order: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Testimonial
///
/// A client quote. `featured` testimonials are highlighted on the home page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Testimonial {
    pub id: Uuid,
    pub text: String,
    pub author: String,
    // Free label such as "Mariés en 2023".
    pub role: Option<String>,
    pub featured: bool,
    pub order: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// GalleryCategory
///
/// Fixed set of gallery filters. Stored as the Postgres enum `gallery_category`
/// and serialized with the accented labels the public site displays.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default,
)]
#[sqlx(type_name = "gallery_category")]
#[ts(export)]
pub enum GalleryCategory {
    #[default]
    #[serde(rename = "Cérémonie")]
    #[sqlx(rename = "Cérémonie")]
    Ceremonie,
    #[serde(rename = "Décoration")]
    #[sqlx(rename = "Décoration")]
    Decoration,
    #[serde(rename = "Réception")]
    #[sqlx(rename = "Réception")]
    Reception,
    #[serde(rename = "Détails")]
    #[sqlx(rename = "Détails")]
    Details,
}

/// GalleryImage
///
/// A gallery entry. `src` is the public URL returned by the upload endpoint
/// (or any external URL the admin pastes in).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct GalleryImage {
    pub id: Uuid,
    pub src: String,
    pub alt: String,
    pub title: String,
    pub description: String,
    pub category: GalleryCategory,
    pub order: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Stat
///
/// A headline figure ("150+" / "Mariages organisés").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Stat {
    pub id: Uuid,
    pub number: String,
    pub label: String,
    pub order: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Value
///
/// A company value card on the about page. `icon` names a frontend icon component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Value {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub order: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// ContactInfo
///
/// A contact card (phone, email, address, opening hours).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ContactInfo {
    pub id: Uuid,
    // 'type' is a reserved keyword in Rust; exposed as "type" in JSON and SQL.
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub title: String,
    pub details: String,
    pub description: String,
    pub order: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// ContactMessage
///
/// An inquiry submitted through the public contact form, read from the admin inbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub wedding_date: Option<String>,
    pub guest_count: Option<String>,
    pub budget: Option<String>,
    pub message: String,
    pub read: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// SiteContent
///
/// One free-text field of page copy. `key` is unique and namespaced by page
/// (`about.story.title1`); writes are upserts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SiteContent {
    pub id: Uuid,
    pub key: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub value: String,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// LoginRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// RegisterRequest
///
/// One-time admin bootstrap payload. `name` falls back to "Admin".
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// ContactMessageRequest
///
/// Public contact form payload. Blank optional fields are stored as null.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ContactMessageRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub wedding_date: Option<String>,
    #[serde(default)]
    pub guest_count: Option<String>,
    #[serde(default)]
    pub budget: Option<String>,
    pub message: String,
}

/// PageContentUpdate
///
/// Body of `PUT /api/page-content/{key}`. A `key` in the body takes precedence
/// over the one in the path.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PageContentUpdate {
    #[serde(default)]
    pub key: Option<String>,
    pub value: String,
    #[serde(rename = "type", default = "default_content_type")]
    pub kind: String,
}

fn default_content_type() -> String {
    "text".to_string()
}

// --- Response Schemas (Output) ---

/// UserSummary
///
/// The public view of an admin account returned alongside a fresh token.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

/// AuthResponse
///
/// Returned by login and register. The client stores `token` and sends it as
/// `Authorization: Bearer <token>` on every admin request.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserSummary,
}

/// ContactMessageCreated
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ContactMessageCreated {
    pub success: bool,
    pub message: ContactMessage,
}

/// SuccessResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SuccessResponse {
    pub success: bool,
}

/// UploadResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UploadResponse {
    /// Public URL of the stored image, suitable for a gallery `src`.
    pub url: String,
    /// Stored size in bytes.
    pub size: u64,
    pub original_name: String,
}
