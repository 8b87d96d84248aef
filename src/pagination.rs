use std::str::FromStr;

use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Value,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{error::AppResult, response::Meta};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;
pub const DEFAULT_SORT_FIELD: &str = "created_at";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    #[serde(alias = "asc")]
    Asc,
    #[default]
    #[serde(alias = "desc")]
    Desc,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number, starting at 1.
    pub page: Option<i64>,
    /// Page size, at most 100.
    pub limit: Option<i64>,
    /// Column name in snake_case or camelCase; defaults to `created_at`.
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl PageQuery {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Returns `(page, limit, offset)`; page is at least 1, limit is
    /// clamped into `1..=MAX_LIMIT` and the offset saturates instead of
    /// overflowing for absurd page numbers.
    pub fn normalize(&self) -> (i64, i64, u64) {
        let page = self.page.unwrap_or(DEFAULT_PAGE).max(1);
        let limit = match self.limit {
            Some(limit) if limit > 0 => limit.min(MAX_LIMIT),
            _ => DEFAULT_LIMIT,
        };
        let offset = u64::try_from((page - 1).saturating_mul(limit)).unwrap_or(u64::MAX);
        (page, limit, offset)
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order.unwrap_or_default()
    }
}

/// One page of records plus the envelope metadata that describes it.
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: Meta,
}

impl<T> Paginated<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

/// Equality filters applied to both the count and the page query.
pub type Filters<E> = Vec<(<E as EntityTrait>::Column, Value)>;

/// Counts the filtered set, then fetches the requested window of it.
///
/// Ordering uses a single column; rows that tie on it have no guaranteed
/// order across pages. Unknown sort fields fall back to `created_at`.
pub async fn paginate<E, C>(
    conn: &C,
    query: &PageQuery,
    filters: Filters<E>,
) -> AppResult<Paginated<E::Model>>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let (page, limit, offset) = query.normalize();

    let condition = filters
        .into_iter()
        .fold(Condition::all(), |cond, (col, value)| cond.add(col.eq(value)));

    let finder = E::find().filter(condition);
    let total = finder.clone().count(conn).await?;
    let meta = Meta::new(page, limit, i64::try_from(total).unwrap_or(i64::MAX));

    // Past the last row there is nothing to fetch.
    if offset >= total {
        return Ok(Paginated {
            data: Vec::new(),
            meta,
        });
    }

    let finder = match resolve_sort_column::<E>(query.sort_by.as_deref()) {
        Some(col) => match query.sort_order() {
            SortOrder::Asc => finder.order_by_asc(col),
            SortOrder::Desc => finder.order_by_desc(col),
        },
        None => finder,
    };

    let data = finder
        .limit(limit.unsigned_abs())
        .offset(offset)
        .all(conn)
        .await?;

    Ok(Paginated { data, meta })
}

fn resolve_sort_column<E: EntityTrait>(field: Option<&str>) -> Option<E::Column> {
    let requested = field.map(str::trim).filter(|f| !f.is_empty());
    if let Some(name) = requested {
        if let Ok(col) = E::Column::from_str(name) {
            return Some(col);
        }
        tracing::debug!(sort_by = %name, "unknown sort field, using default");
    }
    E::Column::from_str(DEFAULT_SORT_FIELD).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::orders;
    use sea_orm::IdenStatic;

    #[test]
    fn defaults_apply_when_absent() {
        assert_eq!(PageQuery::default().normalize(), (1, 10, 0));
        assert_eq!(PageQuery::default().sort_order(), SortOrder::Desc);
    }

    #[test]
    fn limit_is_clamped_to_max() {
        assert_eq!(PageQuery::new(1, 500).normalize(), (1, 100, 0));
        assert_eq!(PageQuery::new(2, 500).normalize(), (2, 100, 100));
    }

    #[test]
    fn nonpositive_inputs_fall_back() {
        assert_eq!(PageQuery::new(0, 0).normalize(), (1, 10, 0));
        assert_eq!(PageQuery::new(-3, -5).normalize(), (1, 10, 0));
        assert_eq!(PageQuery::new(3, 10).normalize(), (3, 10, 20));
    }

    #[test]
    fn huge_page_saturates_offset() {
        let (page, limit, offset) = PageQuery::new(i64::MAX, 100).normalize();
        assert_eq!(page, i64::MAX);
        assert_eq!(limit, 100);
        assert_eq!(offset, i64::MAX as u64);

        let (_, _, offset) = PageQuery::new(i64::MAX / 50, 100).normalize();
        assert_eq!(offset, i64::MAX as u64);
    }

    fn sort_name(field: Option<&str>) -> Option<String> {
        resolve_sort_column::<orders::Entity>(field).map(|col| col.as_str().to_owned())
    }

    #[test]
    fn sort_field_accepts_both_spellings() {
        assert_eq!(sort_name(Some("createdAt")), Some("created_at".to_string()));
        assert_eq!(sort_name(Some("total_amount")), Some("total_amount".to_string()));
        assert_eq!(sort_name(Some("no_such_column")), Some("created_at".to_string()));
        assert_eq!(sort_name(None), Some("created_at".to_string()));
    }

    #[test]
    fn sort_order_parses_upper_and_lower_case() {
        let asc: SortOrder = serde_json::from_str("\"ASC\"").unwrap();
        let desc: SortOrder = serde_json::from_str("\"desc\"").unwrap();
        assert_eq!(asc, SortOrder::Asc);
        assert_eq!(desc, SortOrder::Desc);
    }
}
