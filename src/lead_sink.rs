use async_trait::async_trait;

use crate::errors::LeadError;
use crate::models::{NormalizedLead, Submission};

/// A backend of record for validated leads.
///
/// Implementations must map every failure into a [`LeadError`]; they never
/// retry on their own.
#[async_trait]
pub trait LeadSink: Send + Sync {
    /// Short backend name, reported by the health check.
    fn name(&self) -> &'static str;

    async fn submit(&self, lead: &NormalizedLead) -> Result<Submission, LeadError>;
}
