//! Pagination.
//!
//! A [`Paginator`] is declared once in endpoint metadata under `paginator`.
//! Each request gets its own [`Pagination`], which walks
//! `Uninitialized → Ready` by validating the paginator's query parameters
//! and then bounds a query set. Paginators never touch the query set they
//! are given; they return a narrowed copy.
//!
//! | Strategy | Parameters | Bounds |
//! |----------|------------|--------|
//! | [`LimitOffsetPaginator`] | `limit` 1..=100 (20), `offset` ≥ 0 (0), `all` | `[offset, offset + limit)` or everything |
//! | [`FromIdPaginator`] | `from_id` ≥ 1, `limit` 1..=100 (10) | first `limit` rows past `from_id` |

use std::cell::OnceCell;
use std::fmt;
use std::sync::Arc;

use hermes_core::{ApiError, ApiResult, CapabilityRef, HttpError, Meta, MetaValue, KIND_PAGINATOR};
use hermes_schema::{CleanedData, Condition, Form, FormData, FormField, QuerySet, StoreResult};

/// Page position reported by offset-based strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// Rows in the unpaginated query set.
    pub total_count: usize,
    /// 1-based page number; `0` when there are no rows, `-1` past the end.
    pub current_page: i64,
    /// Number of pages.
    pub pages_total_count: usize,
}

/// A pagination strategy.
pub trait Paginator: fmt::Debug + Send + Sync {
    /// Strategy name, used in documentation.
    fn name(&self) -> &str;

    /// Form validating the strategy's query parameters.
    fn form(&self) -> &Form;

    /// Bounds `queryset` according to validated parameters.
    fn paginate(&self, params: &CleanedData, queryset: &QuerySet) -> StoreResult<QuerySet>;

    /// Page position, for strategies that have one.
    fn page_info(&self, _params: &CleanedData, _total_count: usize) -> Option<PageInfo> {
        None
    }
}

const MAX_LIMIT: i32 = 100;

fn limit_of(params: &CleanedData, default: usize) -> usize {
    params
        .get_i64("limit")
        .and_then(|limit| usize::try_from(limit).ok())
        .unwrap_or(default)
}

/// Offset/limit pagination.
///
/// # Example
///
/// ```rust
/// use hermes_pipeline::{LimitOffsetPaginator, Paginator};
/// use hermes_schema::CleanedData;
///
/// let paginator = LimitOffsetPaginator::new();
/// let mut params = CleanedData::new();
/// params.insert("offset", 40);
/// params.insert("limit", 20);
///
/// let info = paginator.page_info(&params, 45).unwrap();
/// assert_eq!(info.current_page, 3);
/// assert_eq!(info.pages_total_count, 3);
/// ```
#[derive(Debug, Clone)]
pub struct LimitOffsetPaginator {
    form: Form,
}

impl LimitOffsetPaginator {
    /// Default page size.
    pub const DEFAULT_LIMIT: usize = 20;

    /// Creates the paginator.
    #[must_use]
    pub fn new() -> Self {
        let form = Form::new("LimitOffsetPaginatorForm")
            .with_field(
                "limit",
                FormField::integer().optional().min_value(1).max_value(MAX_LIMIT),
            )
            .with_field("offset", FormField::integer().optional().min_value(0))
            .with_field("all", FormField::boolean().optional());
        Self { form }
    }

    fn offset(params: &CleanedData) -> usize {
        params
            .get_i64("offset")
            .and_then(|offset| usize::try_from(offset).ok())
            .unwrap_or(0)
    }

    fn all(params: &CleanedData) -> bool {
        params.get_bool("all").unwrap_or(false)
    }
}

impl Default for LimitOffsetPaginator {
    fn default() -> Self {
        Self::new()
    }
}

impl Paginator for LimitOffsetPaginator {
    fn name(&self) -> &str {
        "LimitOffsetPaginator"
    }

    fn form(&self) -> &Form {
        &self.form
    }

    fn paginate(&self, params: &CleanedData, queryset: &QuerySet) -> StoreResult<QuerySet> {
        if Self::all(params) {
            return Ok(queryset.clone());
        }
        Ok(queryset.slice(Self::offset(params), limit_of(params, Self::DEFAULT_LIMIT)))
    }

    fn page_info(&self, params: &CleanedData, total_count: usize) -> Option<PageInfo> {
        let limit = if Self::all(params) {
            total_count
        } else {
            limit_of(params, Self::DEFAULT_LIMIT)
        };
        let offset = if Self::all(params) { 0 } else { Self::offset(params) };

        let current_page = if total_count == 0 {
            0
        } else if offset >= total_count {
            -1
        } else {
            i64::try_from(offset / limit.max(1) + 1).unwrap_or(i64::MAX)
        };
        let pages_total_count = if total_count == 0 {
            0
        } else {
            total_count.div_ceil(limit.max(1))
        };

        Some(PageInfo {
            total_count,
            current_page,
            pages_total_count,
        })
    }
}

/// Cursor pagination over the primary key.
///
/// The ascending variant keeps rows with `id > from_id`, the descending
/// one rows with `id < from_id`. The query set is expected to be ordered
/// accordingly already.
#[derive(Debug, Clone)]
pub struct FromIdPaginator {
    form: Form,
    descending: bool,
}

impl FromIdPaginator {
    /// Default page size.
    pub const DEFAULT_LIMIT: usize = 10;

    fn with_direction(descending: bool) -> Self {
        let form = Form::new("FromIdPaginatorForm")
            .with_field("from_id", FormField::integer().optional().min_value(1))
            .with_field(
                "limit",
                FormField::integer().optional().min_value(1).max_value(MAX_LIMIT),
            );
        Self { form, descending }
    }

    /// Rows after `from_id`.
    #[must_use]
    pub fn asc() -> Self {
        Self::with_direction(false)
    }

    /// Rows before `from_id`.
    #[must_use]
    pub fn desc() -> Self {
        Self::with_direction(true)
    }

    /// Returns true for the descending variant.
    #[must_use]
    pub const fn is_descending(&self) -> bool {
        self.descending
    }
}

impl Paginator for FromIdPaginator {
    fn name(&self) -> &str {
        if self.descending {
            "FromIdDescPaginator"
        } else {
            "FromIdAscPaginator"
        }
    }

    fn form(&self) -> &Form {
        &self.form
    }

    fn paginate(&self, params: &CleanedData, queryset: &QuerySet) -> StoreResult<QuerySet> {
        let pk = queryset.descriptor().pk_name().to_string();
        let filtered = match params.get_i64("from_id") {
            Some(from_id) if self.descending => queryset.filter(Condition::lt(pk, from_id)),
            Some(from_id) => queryset.filter(Condition::gt(pk, from_id)),
            None => queryset.clone(),
        };
        Ok(filtered.slice(0, limit_of(params, Self::DEFAULT_LIMIT)))
    }
}

/// A shared paginator, as stored in endpoint metadata.
#[derive(Debug, Clone)]
pub struct PaginatorRef(Arc<dyn Paginator>);

impl PaginatorRef {
    /// Wraps a paginator.
    #[must_use]
    pub fn new(paginator: impl Paginator + 'static) -> Self {
        Self(Arc::new(paginator))
    }

    /// The wrapped paginator.
    #[must_use]
    pub fn get(&self) -> &dyn Paginator {
        self.0.as_ref()
    }

    /// The paginator declared under `paginator` in `meta`.
    #[must_use]
    pub fn declared(meta: &Meta) -> Option<&dyn Paginator> {
        meta.capability("paginator")
            .filter(|r| r.kind() == KIND_PAGINATOR)?
            .downcast_ref::<Self>()
            .map(Self::get)
    }
}

impl From<PaginatorRef> for MetaValue {
    fn from(paginator: PaginatorRef) -> Self {
        let name = paginator.get().name().to_string();
        Self::Ref(CapabilityRef::new(KIND_PAGINATOR, name, paginator))
    }
}

impl From<LimitOffsetPaginator> for MetaValue {
    fn from(paginator: LimitOffsetPaginator) -> Self {
        PaginatorRef::new(paginator).into()
    }
}

impl From<FromIdPaginator> for MetaValue {
    fn from(paginator: FromIdPaginator) -> Self {
        PaginatorRef::new(paginator).into()
    }
}

#[derive(Debug)]
enum State {
    Uninitialized,
    Ready(CleanedData),
}

/// Request-scoped pagination state.
///
/// # Example
///
/// ```rust
/// use hermes_pipeline::{FromIdPaginator, Pagination};
///
/// let paginator = FromIdPaginator::asc();
/// let mut pagination = Pagination::new(&paginator);
/// assert!(!pagination.is_ready());
///
/// let mut raw = serde_json::Map::new();
/// raw.insert("limit".into(), "500".into());
/// let err = pagination.validate_query(&raw).unwrap_err();
/// assert_eq!(err.http_code(), 400);
/// assert!(!pagination.is_ready());
/// ```
#[derive(Debug)]
pub struct Pagination<'p> {
    paginator: &'p dyn Paginator,
    state: State,
    total_count: OnceCell<usize>,
}

impl<'p> Pagination<'p> {
    /// Unvalidated pagination for one request.
    #[must_use]
    pub fn new(paginator: &'p dyn Paginator) -> Self {
        Self {
            paginator,
            state: State::Uninitialized,
            total_count: OnceCell::new(),
        }
    }

    /// The strategy.
    #[must_use]
    pub fn paginator(&self) -> &'p dyn Paginator {
        self.paginator
    }

    /// Returns true once the query parameters validated.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    /// Validated parameters.
    #[must_use]
    pub const fn data(&self) -> Option<&CleanedData> {
        match &self.state {
            State::Ready(data) => Some(data),
            State::Uninitialized => None,
        }
    }

    /// Validates raw query parameters with the paginator's form.
    pub fn validate_query(&mut self, raw: &FormData) -> Result<&CleanedData, HttpError> {
        let data = self.paginator.form().validate(raw).map_err(HttpError::form)?;
        self.state = State::Ready(data);
        match &self.state {
            State::Ready(data) => Ok(data),
            State::Uninitialized => Err(HttpError::internal()),
        }
    }

    fn params(&self) -> ApiResult<&CleanedData> {
        self.data()
            .ok_or_else(|| ApiError::fault(anyhow::anyhow!("pagination used before its query was validated")))
    }

    /// Bounds `queryset`.
    pub fn paginate(&self, queryset: &QuerySet) -> ApiResult<QuerySet> {
        Ok(self.paginator.paginate(self.params()?, queryset)?)
    }

    /// Row count of the unpaginated `queryset`, counted once per request.
    pub fn total_count(&self, queryset: &QuerySet) -> ApiResult<usize> {
        if let Some(count) = self.total_count.get() {
            return Ok(*count);
        }
        let count = queryset.count()?;
        Ok(*self.total_count.get_or_init(|| count))
    }

    /// Page position of the unpaginated `queryset`.
    pub fn page_info(&self, queryset: &QuerySet) -> ApiResult<Option<PageInfo>> {
        let params = self.params()?;
        let total_count = self.total_count(queryset)?;
        Ok(self.paginator.page_info(params, total_count))
    }
}
