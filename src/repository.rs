use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{FromRow, PgPool, postgres::PgRow};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::{
        ContactInfo, ContactMessage, ContactMessageRequest, GalleryImage, NewUser, Service,
        SiteContent, Stat, Testimonial, User, Value,
    },
    resources::{ResourceInput, ResourceKind, ResourceRecord},
};

/// RepoError
///
/// Persistence failures. Handlers surface all of them as 500: a missing row on
/// update/delete is reported, not treated as an idempotent success.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("record {0} not found")]
    NotFound(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations, so handlers never
/// know whether they talk to Postgres or the in-memory store.
///
/// **Send + Sync + async_trait** are required to make the trait object (`Arc<dyn Repository>`)
/// shareable across Axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Content cards ---
    // All records of a kind, `order` ascending, ties in insertion order.
    async fn list_resources(&self, kind: ResourceKind) -> Result<Vec<ResourceRecord>, RepoError>;
    async fn create_resource(&self, input: ResourceInput) -> Result<ResourceRecord, RepoError>;
    // Replaces every field of the record `id` of `input.kind()`.
    async fn update_resource(&self, id: Uuid, input: ResourceInput) -> Result<ResourceRecord, RepoError>;
    async fn delete_resource(&self, kind: ResourceKind, id: Uuid) -> Result<(), RepoError>;

    // --- Contact inbox ---
    async fn create_message(&self, req: ContactMessageRequest) -> Result<ContactMessage, RepoError>;
    // Newest first.
    async fn list_messages(&self) -> Result<Vec<ContactMessage>, RepoError>;
    // Idempotent: a message already read stays read.
    async fn mark_message_read(&self, id: Uuid) -> Result<ContactMessage, RepoError>;
    async fn delete_message(&self, id: Uuid) -> Result<(), RepoError>;

    // --- Page content ---
    // `page = Some(p)` restricts to keys starting with "p."; ordered by key.
    async fn list_page_content(&self, page: Option<&str>) -> Result<Vec<SiteContent>, RepoError>;
    async fn get_page_content(&self, key: &str) -> Result<Option<SiteContent>, RepoError>;
    async fn upsert_page_content(&self, key: &str, value: &str, kind: &str) -> Result<SiteContent, RepoError>;

    // --- Users ---
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
    // Inserts only when the table is empty; `None` means an account already exists.
    async fn create_first_user(&self, user: NewUser) -> Result<Option<User>, RepoError>;
    // Insert-or-update by email. Used by seeding only.
    async fn upsert_user(&self, user: NewUser) -> Result<User, RepoError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

const SERVICE_COLUMNS: &str = r#"id, number, title, description, "order", created_at, updated_at"#;
const TESTIMONIAL_COLUMNS: &str =
    r#"id, text, author, role, featured, "order", created_at, updated_at"#;
const GALLERY_COLUMNS: &str =
    r#"id, src, alt, title, description, category, "order", created_at, updated_at"#;
const STAT_COLUMNS: &str = r#"id, number, label, "order", created_at, updated_at"#;
const VALUE_COLUMNS: &str = r#"id, title, description, icon, "order", created_at, updated_at"#;
const CONTACT_INFO_COLUMNS: &str =
    r#"id, type, title, details, description, "order", created_at, updated_at"#;
const MESSAGE_COLUMNS: &str =
    "id, name, email, phone, wedding_date, guest_count, budget, message, read, created_at";
const CONTENT_COLUMNS: &str = "id, key, type, value, updated_at";
const USER_COLUMNS: &str = "id, email, password_hash, name, role, created_at";

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// fetch_ordered
    ///
    /// Lists a content table in display order. `seq` is an identity column, so rows
    /// sharing an `order` value come back in insertion order.
    async fn fetch_ordered<T>(&self, kind: ResourceKind, columns: &str) -> Result<Vec<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!(
            r#"SELECT {columns} FROM {} ORDER BY "order" ASC, seq ASC"#,
            kind.table()
        );
        sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn list_resources(&self, kind: ResourceKind) -> Result<Vec<ResourceRecord>, RepoError> {
        let records = match kind {
            ResourceKind::Services => self
                .fetch_ordered::<Service>(kind, SERVICE_COLUMNS)
                .await?
                .into_iter()
                .map(ResourceRecord::Service)
                .collect(),
            ResourceKind::Testimonials => self
                .fetch_ordered::<Testimonial>(kind, TESTIMONIAL_COLUMNS)
                .await?
                .into_iter()
                .map(ResourceRecord::Testimonial)
                .collect(),
            ResourceKind::Gallery => self
                .fetch_ordered::<GalleryImage>(kind, GALLERY_COLUMNS)
                .await?
                .into_iter()
                .map(ResourceRecord::Gallery)
                .collect(),
            ResourceKind::Stats => self
                .fetch_ordered::<Stat>(kind, STAT_COLUMNS)
                .await?
                .into_iter()
                .map(ResourceRecord::Stat)
                .collect(),
            ResourceKind::Values => self
                .fetch_ordered::<Value>(kind, VALUE_COLUMNS)
                .await?
                .into_iter()
                .map(ResourceRecord::Value)
                .collect(),
            ResourceKind::ContactInfo => self
                .fetch_ordered::<ContactInfo>(kind, CONTACT_INFO_COLUMNS)
                .await?
                .into_iter()
                .map(ResourceRecord::ContactInfo)
                .collect(),
        };
        Ok(records)
    }

    /// create_resource
    ///
    /// One typed INSERT per kind; the stored row is read back via `RETURNING`.
    async fn create_resource(&self, input: ResourceInput) -> Result<ResourceRecord, RepoError> {
        let id = Uuid::new_v4();
        let record = match input {
            ResourceInput::Service(s) => {
                let sql = format!(
                    r#"INSERT INTO services (id, number, title, description, "order") VALUES ($1, $2, $3, $4, $5) RETURNING {SERVICE_COLUMNS}"#
                );
                sqlx::query_as::<_, Service>(&sql)
                    .bind(id)
                    .bind(s.number)
                    .bind(s.title)
                    .bind(s.description)
                    .bind(s.order)
                    .fetch_one(&self.pool)
                    .await
                    .map(ResourceRecord::Service)?
            }
            ResourceInput::Testimonial(t) => {
                let sql = format!(
                    r#"INSERT INTO testimonials (id, text, author, role, featured, "order") VALUES ($1, $2, $3, $4, $5, $6) RETURNING {TESTIMONIAL_COLUMNS}"#
                );
                sqlx::query_as::<_, Testimonial>(&sql)
                    .bind(id)
                    .bind(t.text)
                    .bind(t.author)
                    .bind(t.role)
                    .bind(t.featured)
                    .bind(t.order)
                    .fetch_one(&self.pool)
                    .await
                    .map(ResourceRecord::Testimonial)?
            }
            ResourceInput::Gallery(g) => {
                let sql = format!(
                    r#"INSERT INTO gallery_images (id, src, alt, title, description, category, "order") VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {GALLERY_COLUMNS}"#
                );
                sqlx::query_as::<_, GalleryImage>(&sql)
                    .bind(id)
                    .bind(g.src)
                    .bind(g.alt)
                    .bind(g.title)
                    .bind(g.description)
                    .bind(g.category)
                    .bind(g.order)
                    .fetch_one(&self.pool)
                    .await
                    .map(ResourceRecord::Gallery)?
            }
            ResourceInput::Stat(s) => {
                let sql = format!(
                    r#"INSERT INTO stats (id, number, label, "order") VALUES ($1, $2, $3, $4) RETURNING {STAT_COLUMNS}"#
                );
                sqlx::query_as::<_, Stat>(&sql)
                    .bind(id)
                    .bind(s.number)
                    .bind(s.label)
                    .bind(s.order)
                    .fetch_one(&self.pool)
                    .await
                    .map(ResourceRecord::Stat)?
            }
            ResourceInput::Value(v) => {
                let sql = format!(
                    r#"INSERT INTO company_values (id, title, description, icon, "order") VALUES ($1, $2, $3, $4, $5) RETURNING {VALUE_COLUMNS}"#
                );
                sqlx::query_as::<_, Value>(&sql)
                    .bind(id)
                    .bind(v.title)
                    .bind(v.description)
                    .bind(v.icon)
                    .bind(v.order)
                    .fetch_one(&self.pool)
                    .await
                    .map(ResourceRecord::Value)?
            }
            ResourceInput::ContactInfo(c) => {
                let sql = format!(
                    r#"INSERT INTO contact_infos (id, type, title, details, description, "order") VALUES ($1, $2, $3, $4, $5, $6) RETURNING {CONTACT_INFO_COLUMNS}"#
                );
                sqlx::query_as::<_, ContactInfo>(&sql)
                    .bind(id)
                    .bind(c.kind)
                    .bind(c.title)
                    .bind(c.details)
                    .bind(c.description)
                    .bind(c.order)
                    .fetch_one(&self.pool)
                    .await
                    .map(ResourceRecord::ContactInfo)?
            }
        };
        Ok(record)
    }

    /// update_resource
    ///
    /// Full replacement of the editable fields; `updated_at` is bumped. No row → `NotFound`.
    async fn update_resource(&self, id: Uuid, input: ResourceInput) -> Result<ResourceRecord, RepoError> {
        let record = match input {
            ResourceInput::Service(s) => {
                let sql = format!(
                    r#"UPDATE services SET number = $2, title = $3, description = $4, "order" = $5, updated_at = NOW() WHERE id = $1 RETURNING {SERVICE_COLUMNS}"#
                );
                sqlx::query_as::<_, Service>(&sql)
                    .bind(id)
                    .bind(s.number)
                    .bind(s.title)
                    .bind(s.description)
                    .bind(s.order)
                    .fetch_optional(&self.pool)
                    .await?
                    .map(ResourceRecord::Service)
            }
            ResourceInput::Testimonial(t) => {
                let sql = format!(
                    r#"UPDATE testimonials SET text = $2, author = $3, role = $4, featured = $5, "order" = $6, updated_at = NOW() WHERE id = $1 RETURNING {TESTIMONIAL_COLUMNS}"#
                );
                sqlx::query_as::<_, Testimonial>(&sql)
                    .bind(id)
                    .bind(t.text)
                    .bind(t.author)
                    .bind(t.role)
                    .bind(t.featured)
                    .bind(t.order)
                    .fetch_optional(&self.pool)
                    .await?
                    .map(ResourceRecord::Testimonial)
            }
            ResourceInput::Gallery(g) => {
                let sql = format!(
                    r#"UPDATE gallery_images SET src = $2, alt = $3, title = $4, description = $5, category = $6, "order" = $7, updated_at = NOW() WHERE id = $1 RETURNING {GALLERY_COLUMNS}"#
                );
                sqlx::query_as::<_, GalleryImage>(&sql)
                    .bind(id)
                    .bind(g.src)
                    .bind(g.alt)
                    .bind(g.title)
                    .bind(g.description)
                    .bind(g.category)
                    .bind(g.order)
                    .fetch_optional(&self.pool)
                    .await?
                    .map(ResourceRecord::Gallery)
            }
            ResourceInput::Stat(s) => {
                let sql = format!(
                    r#"UPDATE stats SET number = $2, label = $3, "order" = $4, updated_at = NOW() WHERE id = $1 RETURNING {STAT_COLUMNS}"#
                );
                sqlx::query_as::<_, Stat>(&sql)
                    .bind(id)
                    .bind(s.number)
                    .bind(s.label)
                    .bind(s.order)
                    .fetch_optional(&self.pool)
                    .await?
                    .map(ResourceRecord::Stat)
            }
            ResourceInput::Value(v) => {
                let sql = format!(
                    r#"UPDATE company_values SET title = $2, description = $3, icon = $4, "order" = $5, updated_at = NOW() WHERE id = $1 RETURNING {VALUE_COLUMNS}"#
                );
                sqlx::query_as::<_, Value>(&sql)
                    .bind(id)
                    .bind(v.title)
                    .bind(v.description)
                    .bind(v.icon)
                    .bind(v.order)
                    .fetch_optional(&self.pool)
                    .await?
                    .map(ResourceRecord::Value)
            }
            ResourceInput::ContactInfo(c) => {
                let sql = format!(
                    r#"UPDATE contact_infos SET type = $2, title = $3, details = $4, description = $5, "order" = $6, updated_at = NOW() WHERE id = $1 RETURNING {CONTACT_INFO_COLUMNS}"#
                );
                sqlx::query_as::<_, ContactInfo>(&sql)
                    .bind(id)
                    .bind(c.kind)
                    .bind(c.title)
                    .bind(c.details)
                    .bind(c.description)
                    .bind(c.order)
                    .fetch_optional(&self.pool)
                    .await?
                    .map(ResourceRecord::ContactInfo)
            }
        };
        record.ok_or(RepoError::NotFound(id))
    }

    async fn delete_resource(&self, kind: ResourceKind, id: Uuid) -> Result<(), RepoError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", kind.table());
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    // --- CONTACT INBOX ---

    async fn create_message(&self, req: ContactMessageRequest) -> Result<ContactMessage, RepoError> {
        let sql = format!(
            "INSERT INTO contact_messages (id, name, email, phone, wedding_date, guest_count, budget, message) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {MESSAGE_COLUMNS}"
        );
        let message = sqlx::query_as::<_, ContactMessage>(&sql)
            .bind(Uuid::new_v4())
            .bind(req.name)
            .bind(req.email)
            .bind(req.phone)
            .bind(req.wedding_date)
            .bind(req.guest_count)
            .bind(req.budget)
            .bind(req.message)
            .fetch_one(&self.pool)
            .await?;
        Ok(message)
    }

    async fn list_messages(&self) -> Result<Vec<ContactMessage>, RepoError> {
        let sql = format!("SELECT {MESSAGE_COLUMNS} FROM contact_messages ORDER BY created_at DESC");
        Ok(sqlx::query_as::<_, ContactMessage>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn mark_message_read(&self, id: Uuid) -> Result<ContactMessage, RepoError> {
        let sql = format!(
            "UPDATE contact_messages SET read = true WHERE id = $1 RETURNING {MESSAGE_COLUMNS}"
        );
        sqlx::query_as::<_, ContactMessage>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepoError::NotFound(id))
    }

    async fn delete_message(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM contact_messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    // --- PAGE CONTENT ---

    /// list_page_content
    ///
    /// `starts_with` avoids LIKE, so `%` or `_` in a page name match literally.
    async fn list_page_content(&self, page: Option<&str>) -> Result<Vec<SiteContent>, RepoError> {
        let content = match page {
            Some(page) => {
                let sql = format!(
                    "SELECT {CONTENT_COLUMNS} FROM site_content WHERE starts_with(key, $1) ORDER BY key ASC"
                );
                sqlx::query_as::<_, SiteContent>(&sql)
                    .bind(format!("{page}."))
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT {CONTENT_COLUMNS} FROM site_content ORDER BY key ASC");
                sqlx::query_as::<_, SiteContent>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(content)
    }

    async fn get_page_content(&self, key: &str) -> Result<Option<SiteContent>, RepoError> {
        let sql = format!("SELECT {CONTENT_COLUMNS} FROM site_content WHERE key = $1");
        Ok(sqlx::query_as::<_, SiteContent>(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// upsert_page_content
    ///
    /// `ON CONFLICT (key)` makes concurrent writers to one key last-write-wins.
    async fn upsert_page_content(&self, key: &str, value: &str, kind: &str) -> Result<SiteContent, RepoError> {
        let sql = format!(
            "INSERT INTO site_content (id, key, type, value) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, type = EXCLUDED.type, updated_at = NOW() \
             RETURNING {CONTENT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, SiteContent>(&sql)
            .bind(Uuid::new_v4())
            .bind(key)
            .bind(kind)
            .bind(value)
            .fetch_one(&self.pool)
            .await?)
    }

    // --- USERS ---

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// create_first_user
    ///
    /// `INSERT ... WHERE NOT EXISTS` under a self-conflicting table lock, so two
    /// racing registrations cannot both create an account.
    async fn create_first_user(&self, user: NewUser) -> Result<Option<User>, RepoError> {
        let sql = format!(
            "INSERT INTO users (id, email, password_hash, name, role) \
             SELECT $1, $2, $3, $4, $5 WHERE NOT EXISTS (SELECT 1 FROM users) \
             RETURNING {USER_COLUMNS}"
        );

        let mut tx = self.pool.begin().await?;
        sqlx::query("LOCK TABLE users IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(user.email)
            .bind(user.password_hash)
            .bind(user.name)
            .bind(user.role)
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(created)
    }

    async fn upsert_user(&self, user: NewUser) -> Result<User, RepoError> {
        let sql = format!(
            "INSERT INTO users (id, email, password_hash, name, role) VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (email) DO UPDATE SET password_hash = EXCLUDED.password_hash, \
             name = EXCLUDED.name, role = EXCLUDED.role, updated_at = NOW() \
             RETURNING {USER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(user.email)
            .bind(user.password_hash)
            .bind(user.name)
            .bind(user.role)
            .fetch_one(&self.pool)
            .await?)
    }
}

// --- In-memory implementation ---

#[derive(Default)]
struct MemoryStore {
    // Per-kind records in insertion order.
    resources: Vec<ResourceRecord>,
    messages: Vec<ContactMessage>,
    content: Vec<SiteContent>,
    users: Vec<User>,
}

/// InMemoryRepository
///
/// A `Repository` over process memory with the same ordering and not-found
/// semantics as `PostgresRepository`. Used by the integration tests and handy for
/// running the API without a database.
#[derive(Default, Clone)]
pub struct InMemoryRepository {
    store: Arc<Mutex<MemoryStore>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> MutexGuard<'_, MemoryStore> {
        // A poisoned lock only means another test thread panicked mid-write.
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn list_resources(&self, kind: ResourceKind) -> Result<Vec<ResourceRecord>, RepoError> {
        let mut records: Vec<ResourceRecord> = self
            .store()
            .resources
            .iter()
            .filter(|r| r.kind() == kind)
            .cloned()
            .collect();
        // Stable sort: equal `order` values keep insertion order.
        records.sort_by_key(ResourceRecord::order);
        Ok(records)
    }

    async fn create_resource(&self, input: ResourceInput) -> Result<ResourceRecord, RepoError> {
        let now = Utc::now();
        let record = input.into_record(Uuid::new_v4(), now, now);
        self.store().resources.push(record.clone());
        Ok(record)
    }

    async fn update_resource(&self, id: Uuid, input: ResourceInput) -> Result<ResourceRecord, RepoError> {
        let kind = input.kind();
        let mut store = self.store();
        let slot = store
            .resources
            .iter_mut()
            .find(|r| r.kind() == kind && r.id() == id)
            .ok_or(RepoError::NotFound(id))?;
        let updated = input.into_record(id, slot.created_at(), Utc::now());
        *slot = updated.clone();
        Ok(updated)
    }

    async fn delete_resource(&self, kind: ResourceKind, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store();
        let before = store.resources.len();
        store.resources.retain(|r| !(r.kind() == kind && r.id() == id));
        if store.resources.len() == before {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    async fn create_message(&self, req: ContactMessageRequest) -> Result<ContactMessage, RepoError> {
        let message = ContactMessage {
            id: Uuid::new_v4(),
            name: req.name,
            email: req.email,
            phone: req.phone,
            wedding_date: req.wedding_date,
            guest_count: req.guest_count,
            budget: req.budget,
            message: req.message,
            read: false,
            created_at: Utc::now(),
        };
        self.store().messages.push(message.clone());
        Ok(message)
    }

    async fn list_messages(&self) -> Result<Vec<ContactMessage>, RepoError> {
        // Newest first; reversing insertion order keeps same-instant messages stable.
        let mut messages: Vec<ContactMessage> = self.store().messages.iter().rev().cloned().collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(messages)
    }

    async fn mark_message_read(&self, id: Uuid) -> Result<ContactMessage, RepoError> {
        let mut store = self.store();
        let message = store
            .messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(RepoError::NotFound(id))?;
        message.read = true;
        Ok(message.clone())
    }

    async fn delete_message(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store();
        let before = store.messages.len();
        store.messages.retain(|m| m.id != id);
        if store.messages.len() == before {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    async fn list_page_content(&self, page: Option<&str>) -> Result<Vec<SiteContent>, RepoError> {
        let prefix = page.map(|p| format!("{p}."));
        let mut content: Vec<SiteContent> = self
            .store()
            .content
            .iter()
            .filter(|c| prefix.as_deref().is_none_or(|p| c.key.starts_with(p)))
            .cloned()
            .collect();
        content.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(content)
    }

    async fn get_page_content(&self, key: &str) -> Result<Option<SiteContent>, RepoError> {
        Ok(self.store().content.iter().find(|c| c.key == key).cloned())
    }

    async fn upsert_page_content(&self, key: &str, value: &str, kind: &str) -> Result<SiteContent, RepoError> {
        let mut store = self.store();
        let now = Utc::now();
        if let Some(existing) = store.content.iter_mut().find(|c| c.key == key) {
            existing.value = value.to_string();
            existing.kind = kind.to_string();
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        let created = SiteContent {
            id: Uuid::new_v4(),
            key: key.to_string(),
            kind: kind.to_string(),
            value: value.to_string(),
            updated_at: now,
        };
        store.content.push(created.clone());
        Ok(created)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self.store().users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_first_user(&self, user: NewUser) -> Result<Option<User>, RepoError> {
        let mut store = self.store();
        if !store.users.is_empty() {
            return Ok(None);
        }
        let created = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            role: user.role,
            created_at: Utc::now(),
        };
        store.users.push(created.clone());
        Ok(Some(created))
    }

    async fn upsert_user(&self, user: NewUser) -> Result<User, RepoError> {
        let mut store = self.store();
        if let Some(existing) = store.users.iter_mut().find(|u| u.email == user.email) {
            existing.password_hash = user.password_hash;
            existing.name = user.name;
            existing.role = user.role;
            return Ok(existing.clone());
        }
        let created = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            role: user.role,
            created_at: Utc::now(),
        };
        store.users.push(created.clone());
        Ok(created)
    }
}
