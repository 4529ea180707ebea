use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::credentials::{unusable_secret, CredentialHasher, Sha256Hasher};
use crate::errors::LeadError;
use crate::lead_sink::LeadSink;
use crate::models::{NormalizedLead, StoredLead, Submission};

/// Last name stored for leads; the landing form only asks for a first name.
pub const PLACEHOLDER_LAST_NAME: &str = "Pendiente";

/// Writes leads straight into the `usuarios` table.
///
/// Leads are stored as not-yet-claimed users: the password hash belongs to a
/// random secret nobody knows, so the row cannot be logged into until the
/// account is reset.
#[derive(Clone)]
pub struct LeadStorage {
    pool: PgPool,
    hasher: Arc<dyn CredentialHasher>,
}

impl LeadStorage {
    pub fn new(pool: PgPool) -> Self {
        Self::with_hasher(pool, Arc::new(Sha256Hasher))
    }

    pub fn with_hasher(pool: PgPool, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { pool, hasher }
    }

    /// Inserts one lead row keyed by email.
    ///
    /// # Returns
    ///
    /// * `Result<StoredLead, LeadError>` - The new row id with the echoed name and email,
    ///   `LeadError::DuplicateEmail` if the email is taken, or `LeadError::Persistence`.
    pub async fn store_lead(&self, lead: &NormalizedLead) -> Result<StoredLead, LeadError> {
        let password_hash = self.hasher.hash(&unusable_secret());

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO usuarios (nombre, apellido, edad, password_hash, email)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id::bigint
            "#,
        )
        .bind(lead.name())
        .bind(PLACEHOLDER_LAST_NAME)
        .bind(i16::from(lead.age()))
        .bind(&password_hash)
        .bind(lead.email())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify_insert_error(e, lead.email()))?;

        tracing::info!("✅ Lead stored: id={} email={}", id, lead.email());

        Ok(StoredLead {
            id,
            nombre: lead.name().to_string(),
            correo: lead.email().to_string(),
        })
    }
}

fn classify_insert_error(err: sqlx::Error, email: &str) -> LeadError {
    match &err {
        sqlx::Error::Database(db_err)
            if db_err.is_unique_violation() && is_email_constraint(db_err.constraint()) =>
        {
            LeadError::DuplicateEmail(email.to_string())
        }
        _ => LeadError::Persistence(err.to_string()),
    }
}

// Postgres names a column UNIQUE constraint `usuarios_email_key`; custom names
// are accepted as long as they mention the email column.
fn is_email_constraint(constraint: Option<&str>) -> bool {
    match constraint {
        Some(name) => name.to_ascii_lowercase().contains("email"),
        None => true,
    }
}

#[async_trait]
impl LeadSink for LeadStorage {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn submit(&self, lead: &NormalizedLead) -> Result<Submission, LeadError> {
        self.store_lead(lead).await.map(Submission::Stored)
    }
}
