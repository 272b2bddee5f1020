//! Postgres adapter for the wig catalog (schema in `migrations/`).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, Postgres};
use sqlx::types::Json;
use sqlx::QueryBuilder;
use uuid::Uuid;
use crate::catalog::query::{Pagination, Scope, SortField, SortOrder, WigPage, WigQuery};
use crate::catalog::repository::WigRepository;
use crate::domain::aggregates::wig::{Rating, Seo, Wig, WigChange, WigImage};
use crate::domain::value_objects::Slug;
use crate::{Result, StoreError};

#[derive(Debug, sqlx::FromRow)]
struct WigRow {
    id: Uuid,
    name: String,
    slug: String,
    price: i64,
    original_price: Option<i64>,
    price_range: String,
    hair_type: String,
    style: String,
    length: String,
    description: String,
    stock: i32,
    is_visible: bool,
    images: Json<Vec<WigImage>>,
    rating_average: f64,
    rating_count: i32,
    sales: i32,
    tags: Vec<String>,
    meta_title: Option<String>,
    meta_description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn corrupt(id: Uuid, what: impl std::fmt::Display) -> StoreError {
    StoreError::Corrupt(format!("wig {id}: {what}"))
}

impl TryFrom<WigRow> for Wig {
    type Error = StoreError;

    fn try_from(r: WigRow) -> Result<Self> {
        let id = r.id;
        let unsigned = |v: i64, col: &str| u64::try_from(v).map_err(|_| corrupt(id, format!("negative {col}")));
        let count = |v: i32, col: &str| u32::try_from(v).map_err(|_| corrupt(id, format!("negative {col}")));
        Ok(Wig {
            id,
            price: unsigned(r.price, "price")?,
            original_price: r.original_price.map(|p| unsigned(p, "original_price")).transpose()?,
            price_range: r.price_range.parse().map_err(|e| corrupt(id, e))?,
            hair_type: r.hair_type.parse().map_err(|e| corrupt(id, e))?,
            style: r.style.parse().map_err(|e| corrupt(id, e))?,
            length: r.length.parse().map_err(|e| corrupt(id, e))?,
            stock: count(r.stock, "stock")?,
            sales: count(r.sales, "sales")?,
            rating: Rating { average: r.rating_average, count: count(r.rating_count, "rating_count")? },
            seo: Seo {
                meta_title: r.meta_title,
                meta_description: r.meta_description,
                slug: Slug::new(&r.slug).map_err(|e| corrupt(id, e))?,
            },
            name: r.name,
            description: r.description,
            is_visible: r.is_visible,
            images: r.images.0,
            tags: r.tags,
            created_at: r.created_at,
            updated_at: r.updated_at,
            events: vec![],
        })
    }
}

fn to_i64(v: u64) -> i64 { i64::try_from(v).unwrap_or(i64::MAX) }
fn to_i32(v: u32) -> i32 { i32::try_from(v).unwrap_or(i32::MAX) }

fn map_unique(err: sqlx::Error, slug: &Slug) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateSlug(slug.to_string()),
        _ => StoreError::Storage(err),
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &WigQuery) {
    qb.push(" WHERE TRUE");
    if query.scope == Scope::Public { qb.push(" AND is_visible"); }
    if let Some(v) = query.price_range { qb.push(" AND price_range = ").push_bind(v.as_str()); }
    if let Some(v) = query.hair_type { qb.push(" AND hair_type = ").push_bind(v.as_str()); }
    if let Some(v) = query.style { qb.push(" AND style = ").push_bind(v.as_str()); }
    if let Some(v) = query.length { qb.push(" AND length = ").push_bind(v.as_str()); }
    if let Some(v) = query.min_price { qb.push(" AND price >= ").push_bind(to_i64(v)); }
    if let Some(v) = query.max_price { qb.push(" AND price <= ").push_bind(to_i64(v)); }
    if let Some(term) = &query.search {
        let pattern = format!("%{}%", term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_"));
        qb.push(" AND (name ILIKE ").push_bind(pattern.clone());
        qb.push(" OR description ILIKE ").push_bind(pattern.clone());
        if query.scope == Scope::Public {
            qb.push(" OR array_to_string(tags, ' ') ILIKE ").push_bind(pattern);
        }
        qb.push(")");
    }
}

pub struct PgWigRepository {
    pool: PgPool,
}

impl PgWigRepository {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl WigRepository for PgWigRepository {
    async fn insert(&self, wig: &Wig) -> Result<()> {
        sqlx::query(
            "INSERT INTO wigs (id, name, slug, price, original_price, price_range, hair_type, style, length, description, \
             stock, is_visible, images, rating_average, rating_count, sales, tags, meta_title, meta_description, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)",
        )
        .bind(wig.id).bind(&wig.name).bind(wig.slug().as_str()).bind(to_i64(wig.price)).bind(wig.original_price.map(to_i64))
        .bind(wig.price_range.as_str()).bind(wig.hair_type.as_str()).bind(wig.style.as_str()).bind(wig.length.as_str())
        .bind(&wig.description).bind(to_i32(wig.stock)).bind(wig.is_visible).bind(Json(&wig.images))
        .bind(wig.rating.average).bind(to_i32(wig.rating.count)).bind(to_i32(wig.sales)).bind(&wig.tags)
        .bind(&wig.seo.meta_title).bind(&wig.seo.meta_description).bind(wig.created_at).bind(wig.updated_at)
        .execute(&self.pool).await.map_err(|e| map_unique(e, wig.slug()))?;
        Ok(())
    }

    async fn modify(&self, id: Uuid, change: WigChange) -> Result<Wig> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, WigRow>("SELECT * FROM wigs WHERE id = $1 FOR UPDATE")
            .bind(id).fetch_optional(&mut *tx).await?
            .ok_or(StoreError::WigNotFound(id))?;
        let mut wig = Wig::try_from(row)?;
        wig.change(change)?;
        if wig.events.is_empty() { return Ok(wig); }
        sqlx::query(
            "UPDATE wigs SET name = $2, price = $3, original_price = $4, price_range = $5, hair_type = $6, style = $7, \
             length = $8, description = $9, stock = $10, is_visible = $11, images = $12, tags = $13, updated_at = $14 \
             WHERE id = $1",
        )
        .bind(id).bind(&wig.name).bind(to_i64(wig.price)).bind(wig.original_price.map(to_i64))
        .bind(wig.price_range.as_str()).bind(wig.hair_type.as_str()).bind(wig.style.as_str()).bind(wig.length.as_str())
        .bind(&wig.description).bind(to_i32(wig.stock)).bind(wig.is_visible).bind(Json(&wig.images)).bind(&wig.tags)
        .bind(wig.updated_at)
        .execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(wig)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Wig>> {
        sqlx::query_as::<_, WigRow>("SELECT * FROM wigs WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await?
            .map(Wig::try_from).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let done = sqlx::query("DELETE FROM wigs WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(done.rows_affected() > 0)
    }

    async fn list(&self, query: &WigQuery) -> Result<WigPage> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM wigs");
        push_filters(&mut count, query);
        let (total,): (i64,) = count.build_query_as().fetch_one(&self.pool).await?;

        let column = match query.sort {
            SortField::CreatedAt => "created_at",
            SortField::Price => "price",
            SortField::Name => "lower(name)",
            SortField::Sales => "sales",
            SortField::Rating => "rating_average",
        };
        let direction = match query.order { SortOrder::Asc => " ASC", SortOrder::Desc => " DESC" };
        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM wigs");
        push_filters(&mut select, query);
        select.push(" ORDER BY ").push(column).push(direction).push(", id").push(direction);
        select.push(" LIMIT ").push_bind(i64::from(query.limit)).push(" OFFSET ").push_bind(to_i64(query.offset()));
        let rows: Vec<WigRow> = select.build_query_as().fetch_all(&self.pool).await?;
        let wigs = rows.into_iter().map(Wig::try_from).collect::<Result<Vec<_>>>()?;

        let total = u64::try_from(total).unwrap_or(0);
        let pagination = Pagination::new(query, total, wigs.len());
        Ok(WigPage { wigs, pagination })
    }

    async fn decrement_stock(&self, id: Uuid, quantity: u32) -> Result<Wig> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, WigRow>("SELECT * FROM wigs WHERE id = $1 FOR UPDATE")
            .bind(id).fetch_optional(&mut *tx).await?
            .ok_or(StoreError::WigNotFound(id))?;
        let mut wig = Wig::try_from(row)?;
        wig.decrement_stock(quantity)?;
        sqlx::query("UPDATE wigs SET stock = $2, sales = $3, updated_at = $4 WHERE id = $1")
            .bind(id).bind(to_i32(wig.stock)).bind(to_i32(wig.sales)).bind(wig.updated_at)
            .execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(wig)
    }
}
