//! Default site content and the optional bootstrap admin.
//!
//! Seeding is idempotent: each default card is inserted only when no stored record
//! of its kind shares its natural key, so running it twice changes nothing.

use thiserror::Error;

use crate::{
    auth,
    models::NewUser,
    repository::{RepoError, Repository},
    resources::{
        ContactInfoInput, ResourceInput, ResourceKind, ResourceRecord, ServiceInput, StatInput,
        TestimonialInput, ValueInput,
    },
};

/// SeedError
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("repository error: {0}")]
    Repository(#[from] RepoError),

    #[error("admin password hashing failed: {0}")]
    Hash(String),
}

/// SeedAdmin
///
/// Credentials of the admin account to upsert, read from `SEED_ADMIN_EMAIL` and
/// `SEED_ADMIN_PASSWORD`. Both must be set; there is no built-in password.
#[derive(Debug, Clone)]
pub struct SeedAdmin {
    pub email: String,
    pub password: String,
}

impl SeedAdmin {
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Some(Self {
            email: get("SEED_ADMIN_EMAIL")?.trim().to_string(),
            password: get("SEED_ADMIN_PASSWORD")?,
        })
    }
}

/// SeedReport
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: usize,
    pub skipped: usize,
    /// Email of the upserted admin, if credentials were supplied.
    pub admin: Option<String>,
}

fn service(number: &str, title: &str, description: &str, order: i32) -> ResourceInput {
    ResourceInput::Service(ServiceInput {
        number: number.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        order,
    })
}

fn stat(number: &str, label: &str, order: i32) -> ResourceInput {
    ResourceInput::Stat(StatInput {
        number: number.to_string(),
        label: label.to_string(),
        order,
    })
}

fn value(title: &str, description: &str, icon: &str, order: i32) -> ResourceInput {
    ResourceInput::Value(ValueInput {
        title: title.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        order,
    })
}

fn testimonial(text: &str, author: &str, featured: bool, order: i32) -> ResourceInput {
    ResourceInput::Testimonial(TestimonialInput {
        text: text.to_string(),
        author: author.to_string(),
        role: Some("Mariés en 2023".to_string()),
        featured,
        order,
    })
}

fn contact_info(kind: &str, title: &str, details: &str, description: &str, order: i32) -> ResourceInput {
    ResourceInput::ContactInfo(ContactInfoInput {
        kind: kind.to_string(),
        title: title.to_string(),
        details: details.to_string(),
        description: description.to_string(),
        order,
    })
}

/// default_content
///
/// The cards a fresh deployment starts with. The gallery starts empty.
pub fn default_content() -> Vec<ResourceInput> {
    vec![
        service(
            "01",
            "Organisation Complète",
            "De la vision initiale à l'exécution finale, nous orchestrons chaque aspect avec une précision horlogère et une sensibilité artistique.",
            0,
        ),
        service(
            "02",
            "Direction Artistique",
            "Création d'une identité visuelle cohérente et raffinée qui reflète votre personnalité et sublime votre histoire d'amour.",
            1,
        ),
        service(
            "03",
            "Coordination Jour J",
            "Une présence discrète et efficace pour que vous viviez pleinement votre journée pendant que nous veillons à la perfection.",
            2,
        ),
        stat("150+", "Mariages organisés", 0),
        stat("98%", "Clients satisfaits", 1),
        stat("5", "Années d'expérience", 2),
        stat("24/7", "Support dédié", 3),
        value(
            "Passion",
            "Chaque mariage est unique et mérite notre passion et notre dévouement absolu pour créer des moments d'exception.",
            "Heart",
            0,
        ),
        value(
            "Excellence",
            "Nous visons l'excellence dans chaque détail pour créer des moments inoubliables qui dépassent vos attentes.",
            "Award",
            1,
        ),
        value(
            "Personnalisation",
            "Chaque couple est unique, c'est pourquoi nous créons des expériences sur mesure qui vous ressemblent.",
            "Users",
            2,
        ),
        testimonial(
            "Amarea a transformé notre mariage en un moment absolument magique. Chaque détail était parfait, au-delà de nos rêves les plus fous.",
            "Sophie & Thomas",
            true,
            0,
        ),
        testimonial(
            "Une équipe formidable qui a su comprendre notre vision et la sublimer avec une élégance rare. Merci pour cette journée absolument parfaite.",
            "Emma & Thomas",
            false,
            1,
        ),
        contact_info("Phone", "Téléphone", "+33 1 23 45 67 89", "Disponible du lundi au vendredi", 0),
        contact_info("Mail", "Email", "contact@amarea.com", "Réponse sous 24h", 1),
        contact_info("MapPin", "Adresse", "123 Avenue des Champs-Élysées", "75008 Paris, France", 2),
        contact_info("Clock", "Horaires", "9h - 18h", "Du lundi au vendredi", 3),
    ]
}

/// Whether `record` already stands for `input`, compared on the kind's natural key.
fn same_natural_key(record: &ResourceRecord, input: &ResourceInput) -> bool {
    match (record, input) {
        (ResourceRecord::Service(r), ResourceInput::Service(i)) => r.number == i.number,
        (ResourceRecord::Stat(r), ResourceInput::Stat(i)) => r.label == i.label,
        (ResourceRecord::Value(r), ResourceInput::Value(i)) => r.title == i.title,
        (ResourceRecord::Testimonial(r), ResourceInput::Testimonial(i)) => {
            r.author == i.author && r.text == i.text
        }
        (ResourceRecord::ContactInfo(r), ResourceInput::ContactInfo(i)) => r.kind == i.kind,
        (ResourceRecord::Gallery(r), ResourceInput::Gallery(i)) => {
            r.src == i.src && r.category == i.category
        }
        _ => false,
    }
}

/// seed
///
/// Inserts the missing default cards and, when `admin` is given, upserts that
/// account by email (resetting its password).
pub async fn seed(repo: &dyn Repository, admin: Option<SeedAdmin>) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();
    let defaults = default_content();

    for kind in ResourceKind::ALL {
        let wanted: Vec<&ResourceInput> = defaults.iter().filter(|i| i.kind() == kind).collect();
        if wanted.is_empty() {
            continue;
        }

        let existing = repo.list_resources(kind).await?;
        for input in wanted {
            if existing.iter().any(|r| same_natural_key(r, input)) {
                report.skipped += 1;
                continue;
            }
            repo.create_resource(input.clone()).await?;
            report.inserted += 1;
        }
        tracing::info!(resource = %kind, "defaults seeded");
    }

    if let Some(admin) = admin {
        let password_hash =
            auth::hash_password(&admin.password).map_err(|e| SeedError::Hash(e.to_string()))?;
        let user = repo
            .upsert_user(NewUser {
                email: admin.email,
                password_hash,
                name: "Administrateur".to_string(),
                role: "admin".to_string(),
            })
            .await?;
        tracing::info!(admin = %user.email, "admin account upserted");
        report.admin = Some(user.email);
    }

    Ok(report)
}
