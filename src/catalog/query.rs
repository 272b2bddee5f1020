//! Catalog listing: filters, sort order and pagination.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use crate::domain::aggregates::wig::{HairType, PriceRange, Style, Wig, WigLength};
use crate::domain::validation::FieldErrors;

pub const PUBLIC_PAGE_SIZE: u32 = 12;
pub const ADMIN_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Scope {
    /// Storefront: visible wigs only.
    #[default]
    Public,
    /// Back-office: everything, hidden wigs included.
    Admin,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortField { #[default] CreatedAt, Price, Name, Sales, Rating }

impl FromStr for SortField {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "createdAt" => Ok(Self::CreatedAt),
            "price" => Ok(Self::Price),
            "name" => Ok(Self::Name),
            "sales" => Ok(Self::Sales),
            "rating" => Ok(Self::Rating),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder { Asc, #[default] Desc }

/// Raw query-string parameters as sent by the storefront.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub price_range: Option<String>,
    pub hair_type: Option<String>,
    pub style: Option<String>,
    pub length: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WigQuery {
    pub scope: Scope,
    pub price_range: Option<PriceRange>,
    pub hair_type: Option<HairType>,
    pub style: Option<Style>,
    pub length: Option<WigLength>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub search: Option<String>,
    pub sort: SortField,
    pub order: SortOrder,
    pub page: u32,
    pub limit: u32,
}

impl Default for WigQuery {
    fn default() -> Self {
        Self {
            scope: Scope::Public, price_range: None, hair_type: None, style: None, length: None,
            min_price: None, max_price: None, search: None,
            sort: SortField::default(), order: SortOrder::default(), page: 1, limit: PUBLIC_PAGE_SIZE,
        }
    }
}

fn label<T: FromStr>(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<T> {
    let value = value.filter(|v| !v.is_empty())?;
    match value.parse() {
        Ok(v) => Some(v),
        Err(_) => { errors.insert(field, format!("Unknown value `{value}`")); None }
    }
}

impl WigQuery {
    /// Admin scope only honours `priceRange` and `search` besides paging and sorting.
    pub fn from_params(params: ListParams, scope: Scope) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::default();
        let price_range = label(&mut errors, "priceRange", params.price_range.filter(|r| r != "all"));
        let sort = label(&mut errors, "sortBy", params.sort_by).unwrap_or_default();
        let order = match params.sort_order.as_deref() {
            None | Some("") | Some("desc") => SortOrder::Desc,
            Some("asc") => SortOrder::Asc,
            Some(other) => { errors.insert("sortOrder", format!("Unknown value `{other}`")); SortOrder::Desc }
        };
        let default_limit = match scope { Scope::Public => PUBLIC_PAGE_SIZE, Scope::Admin => ADMIN_PAGE_SIZE };
        let mut query = Self {
            scope, price_range, sort, order,
            search: params.search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            page: params.page.unwrap_or(1).max(1),
            limit: params.limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE),
            ..Self::default()
        };
        if scope == Scope::Public {
            query.hair_type = label(&mut errors, "hairType", params.hair_type);
            query.style = label(&mut errors, "style", params.style);
            query.length = label(&mut errors, "length", params.length);
            query.min_price = params.min_price;
            query.max_price = params.max_price;
        }
        if errors.is_empty() { Ok(query) } else { Err(errors) }
    }

    pub fn offset(&self) -> u64 { u64::from(self.page - 1) * u64::from(self.limit) }

    pub fn matches(&self, wig: &Wig) -> bool {
        if self.scope == Scope::Public && !wig.is_visible { return false; }
        if self.price_range.is_some_and(|r| r != wig.price_range) { return false; }
        if self.hair_type.is_some_and(|h| h != wig.hair_type) { return false; }
        if self.style.is_some_and(|s| s != wig.style) { return false; }
        if self.length.is_some_and(|l| l != wig.length) { return false; }
        if self.min_price.is_some_and(|min| wig.price < min) { return false; }
        if self.max_price.is_some_and(|max| wig.price > max) { return false; }
        match &self.search {
            None => true,
            Some(term) => {
                let term = term.to_lowercase();
                let hit = |text: &str| text.to_lowercase().contains(&term);
                hit(&wig.name) || hit(&wig.description)
                    || (self.scope == Scope::Public && wig.tags.iter().any(|t| hit(t)))
            }
        }
    }

    /// Ordering on the sort field, ties broken by id so pages are stable.
    pub fn compare(&self, a: &Wig, b: &Wig) -> Ordering {
        let by_field = match self.sort {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::Price => a.price.cmp(&b.price),
            SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortField::Sales => a.sales.cmp(&b.sales),
            SortField::Rating => a.rating.average.total_cmp(&b.rating.average),
        };
        let ordering = by_field.then_with(|| a.id.cmp(&b.id));
        match self.order { SortOrder::Asc => ordering, SortOrder::Desc => ordering.reverse() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current: u32,
    pub pages: u64,
    pub total: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(query: &WigQuery, total: u64, returned: usize) -> Self {
        Self {
            current: query.page,
            pages: total.div_ceil(u64::from(query.limit)),
            total,
            has_next: query.offset().saturating_add(u64::try_from(returned).unwrap_or(u64::MAX)) < total,
            has_prev: query.page > 1,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct WigPage {
    pub wigs: Vec<Wig>,
    pub pagination: Pagination,
}
