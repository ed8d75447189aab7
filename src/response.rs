use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PaginationInfo {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub pages: u64,
}

impl PaginationInfo {
    /// Builds the block for a served page. Pages past the end are reported
    /// as the last page (page 1 when nothing matched).
    pub fn new(total: u64, page: u64, limit: u64) -> Self {
        let limit = limit.max(1);
        let pages = total.div_ceil(limit);
        Self {
            total,
            page: page.clamp(1, pages.max(1)),
            limit,
            pages,
        }
    }
}

/// Envelope returned by every endpoint: either `{success: true, data}` or
/// `{success: false, error}`.
///
/// Fields are private so the two branches can only be built through
/// [`ActionResponse::success`] and [`ActionResponse::failure`].
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ActionResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Folds a service outcome into the envelope. Store and internal errors
    /// are logged in full and replaced by a generic message.
    pub fn from_result(result: AppResult<T>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(err) => {
                err.log();
                Self::failure(err.public_message())
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
