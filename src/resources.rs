//! Typed registry of the admin-managed content kinds.
//!
//! Every kind has a path segment, a backing table, a validated input schema and a
//! stored record type. Dispatch over kinds is a `match`, never a string lookup.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{ContactInfo, GalleryCategory, GalleryImage, Service, Stat, Testimonial, Value};

/// ResourceKind
///
/// The fixed allow-list of content kinds reachable through `/api/admin/{resource}`
/// and the public `/api/{resource}` list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Services,
    Testimonials,
    Gallery,
    Stats,
    Values,
    ContactInfo,
}

/// Returned when a path segment names no known resource.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource `{0}`")]
pub struct UnknownResource(pub String);

impl ResourceKind {
    pub const ALL: [Self; 6] = [
        Self::Services,
        Self::Testimonials,
        Self::Gallery,
        Self::Stats,
        Self::Values,
        Self::ContactInfo,
    ];

    /// The URL segment naming this kind.
    pub const fn segment(self) -> &'static str {
        match self {
            Self::Services => "services",
            Self::Testimonials => "testimonials",
            Self::Gallery => "gallery",
            Self::Stats => "stats",
            Self::Values => "values",
            Self::ContactInfo => "contact-info",
        }
    }

    /// The backing Postgres table.
    pub const fn table(self) -> &'static str {
        match self {
            Self::Services => "services",
            Self::Testimonials => "testimonials",
            Self::Gallery => "gallery_images",
            Self::Stats => "stats",
            Self::Values => "company_values",
            Self::ContactInfo => "contact_infos",
        }
    }

    /// decode_input
    ///
    /// Deserializes a request body into this kind's input schema and validates it.
    /// Unknown fields (`id`, `createdAt`, ... echoed back by the admin UI) are ignored.
    pub fn decode_input(self, body: serde_json::Value) -> Result<ResourceInput, InputError> {
        let input = match self {
            Self::Services => ResourceInput::Service(parse(body)?),
            Self::Testimonials => ResourceInput::Testimonial(parse(body)?),
            Self::Gallery => ResourceInput::Gallery(parse(body)?),
            Self::Stats => ResourceInput::Stat(parse(body)?),
            Self::Values => ResourceInput::Value(parse(body)?),
            Self::ContactInfo => ResourceInput::ContactInfo(parse(body)?),
        };
        input.validate()?;
        Ok(input)
    }
}

impl FromStr for ResourceKind {
    type Err = UnknownResource;

    fn from_str(segment: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.segment() == segment)
            .ok_or_else(|| UnknownResource(segment.to_string()))
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

/// InputError
///
/// A request body that does not match the schema of the targeted resource.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("invalid body: {0}")]
    Malformed(String),
    #[error("field `{0}` is required")]
    MissingField(&'static str),
}

fn parse<T: DeserializeOwned>(body: serde_json::Value) -> Result<T, InputError> {
    serde_json::from_value(body).map_err(|e| InputError::Malformed(e.to_string()))
}

fn require(field: &'static str, value: &str) -> Result<(), InputError> {
    if value.trim().is_empty() {
        return Err(InputError::MissingField(field));
    }
    Ok(())
}

// --- Per-kind input schemas ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ServiceInput {
    pub number: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TestimonialInput {
    pub text: String,
    pub author: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct GalleryImageInput {
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: GalleryCategory,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StatInput {
    pub number: String,
    pub label: String,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ValueInput {
    pub title: String,
    pub description: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default)]
    pub order: i32,
}

fn default_icon() -> String {
    "Heart".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ContactInfoInput {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub details: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order: i32,
}

/// ResourceInput
///
/// A validated create/update body, tagged with the kind it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceInput {
    Service(ServiceInput),
    Testimonial(TestimonialInput),
    Gallery(GalleryImageInput),
    Stat(StatInput),
    Value(ValueInput),
    ContactInfo(ContactInfoInput),
}

impl ResourceInput {
    pub const fn kind(&self) -> ResourceKind {
        match self {
            Self::Service(_) => ResourceKind::Services,
            Self::Testimonial(_) => ResourceKind::Testimonials,
            Self::Gallery(_) => ResourceKind::Gallery,
            Self::Stat(_) => ResourceKind::Stats,
            Self::Value(_) => ResourceKind::Values,
            Self::ContactInfo(_) => ResourceKind::ContactInfo,
        }
    }

    /// Checks the fields the public pages cannot render without.
    pub fn validate(&self) -> Result<(), InputError> {
        match self {
            Self::Service(s) => {
                require("number", &s.number)?;
                require("title", &s.title)?;
                require("description", &s.description)
            }
            Self::Testimonial(t) => {
                require("text", &t.text)?;
                require("author", &t.author)
            }
            Self::Gallery(g) => require("src", &g.src),
            Self::Stat(s) => {
                require("number", &s.number)?;
                require("label", &s.label)
            }
            Self::Value(v) => {
                require("title", &v.title)?;
                require("description", &v.description)
            }
            Self::ContactInfo(c) => {
                require("type", &c.kind)?;
                require("title", &c.title)?;
                require("details", &c.details)
            }
        }
    }

    /// into_record
    ///
    /// Materializes the stored form of this input. Used by the in-memory repository;
    /// Postgres builds records from `RETURNING` rows instead.
    pub fn into_record(self, id: Uuid, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> ResourceRecord {
        match self {
            Self::Service(s) => ResourceRecord::Service(Service {
                id,
                number: s.number,
                title: s.title,
                description: s.description,
                order: s.order,
                created_at,
                updated_at,
            }),
            Self::Testimonial(t) => ResourceRecord::Testimonial(Testimonial {
                id,
                text: t.text,
                author: t.author,
                role: t.role,
                featured: t.featured,
                order: t.order,
                created_at,
                updated_at,
            }),
            Self::Gallery(g) => ResourceRecord::Gallery(GalleryImage {
                id,
                src: g.src,
                alt: g.alt,
                title: g.title,
                description: g.description,
                category: g.category,
                order: g.order,
                created_at,
                updated_at,
            }),
            Self::Stat(s) => ResourceRecord::Stat(Stat {
                id,
                number: s.number,
                label: s.label,
                order: s.order,
                created_at,
                updated_at,
            }),
            Self::Value(v) => ResourceRecord::Value(Value {
                id,
                title: v.title,
                description: v.description,
                icon: v.icon,
                order: v.order,
                created_at,
                updated_at,
            }),
            Self::ContactInfo(c) => ResourceRecord::ContactInfo(ContactInfo {
                id,
                kind: c.kind,
                title: c.title,
                details: c.details,
                description: c.description,
                order: c.order,
                created_at,
                updated_at,
            }),
        }
    }
}

/// ResourceRecord
///
/// A stored content card of any kind. Serializes as the bare record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResourceRecord {
    Service(Service),
    Testimonial(Testimonial),
    Gallery(GalleryImage),
    Stat(Stat),
    Value(Value),
    ContactInfo(ContactInfo),
}

impl ResourceRecord {
    pub const fn kind(&self) -> ResourceKind {
        match self {
            Self::Service(_) => ResourceKind::Services,
            Self::Testimonial(_) => ResourceKind::Testimonials,
            Self::Gallery(_) => ResourceKind::Gallery,
            Self::Stat(_) => ResourceKind::Stats,
            Self::Value(_) => ResourceKind::Values,
            Self::ContactInfo(_) => ResourceKind::ContactInfo,
        }
    }

    pub const fn id(&self) -> Uuid {
        match self {
            Self::Service(r) => r.id,
            Self::Testimonial(r) => r.id,
            Self::Gallery(r) => r.id,
            Self::Stat(r) => r.id,
            Self::Value(r) => r.id,
            Self::ContactInfo(r) => r.id,
        }
    }

    pub const fn order(&self) -> i32 {
        match self {
            Self::Service(r) => r.order,
            Self::Testimonial(r) => r.order,
            Self::Gallery(r) => r.order,
            Self::Stat(r) => r.order,
            Self::Value(r) => r.order,
            Self::ContactInfo(r) => r.order,
        }
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        match self {
            Self::Service(r) => r.created_at,
            Self::Testimonial(r) => r.created_at,
            Self::Gallery(r) => r.created_at,
            Self::Stat(r) => r.created_at,
            Self::Value(r) => r.created_at,
            Self::ContactInfo(r) => r.created_at,
        }
    }
}
