pub mod car_service;
pub mod catalog_service;

use chrono::{Datelike, Utc};

use crate::repository::AuditWriter;

/// Calendar year used to translate ages into model years.
pub fn current_year() -> i32 {
    Utc::now().year()
}

/// Writes an audit record; a failure is logged and never fails the caller.
pub(crate) async fn audit<R>(repo: &R, action: &str, resource: &str, metadata: serde_json::Value)
where
    R: AuditWriter + ?Sized,
{
    if let Err(err) = repo.record_audit(action, resource, metadata).await {
        tracing::warn!(error = %err, action, "audit log failed");
    }
}
