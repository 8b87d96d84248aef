use serde::Serialize;
use utoipa::ToSchema;

/// Envelope metadata. Paged listings fill every field; single-record
/// responses send it empty.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq, Eq)]
pub struct Meta {
    pub total: Option<i64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub total_pages: Option<i64>,
    pub has_next: Option<bool>,
    pub has_prev: Option<bool>,
}

impl Meta {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        Self {
            total: Some(total),
            page: Some(page),
            limit: Some(limit),
            total_pages: Some(total_pages),
            has_next: Some(page < total_pages),
            has_prev: Some(page > 1),
        }
    }

    pub fn empty() -> Self {
        Self {
            total: None,
            page: None,
            limit: None,
            total_pages: None,
            has_next: None,
            has_prev: None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }
}
