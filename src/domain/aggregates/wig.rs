//! Wig Aggregate
//!
//! A catalog entry. Enumerated attributes keep the storefront's French labels
//! on the wire so existing clients keep working.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;
use validator::{Validate, ValidationError};
use crate::domain::events::{DomainEvent, WigEvent};
use crate::domain::validation::{invalid, FieldErrors};
use crate::domain::value_objects::Slug;

macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name { $(#[serde(rename = $label)] $variant),+ }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
            pub fn as_str(&self) -> &'static str { match self { $(Self::$variant => $label),+ } }
        }

        impl FromStr for $name {
            type Err = UnknownLabel;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s { $($label => Ok(Self::$variant),)+ other => Err(UnknownLabel(other.to_string())) }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
        }
    };
}

labelled_enum!(PriceRange { Affordable => "abordable", Standard => "standard", Premium => "premium", Luxury => "luxe" });
labelled_enum!(HairType { Human => "Cheveux Humains", Synthetic => "Synthétique", Mixed => "Mixte" });
labelled_enum!(Style { Straight => "Lisse", Curly => "Bouclé", Wavy => "Ondulé", Kinky => "Crépu", Frizzy => "Frisé" });
labelled_enum!(
    /// Hair length in 5cm steps.
    WigLength {
        Cm25 => "25cm", Cm30 => "30cm", Cm35 => "35cm", Cm40 => "40cm",
        Cm45 => "45cm", Cm50 => "50cm", Cm55 => "55cm", Cm60 => "60cm",
    }
);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown label `{0}`")]
pub struct UnknownLabel(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WigImage {
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rating { pub average: f64, pub count: u32 }

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seo {
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub slug: Slug,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeoInput {
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub slug: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wig {
    pub id: Uuid,
    pub name: String,
    pub price: u64,
    pub original_price: Option<u64>,
    pub price_range: PriceRange,
    pub hair_type: HairType,
    pub style: Style,
    pub length: WigLength,
    pub description: String,
    pub stock: u32,
    pub is_visible: bool,
    pub images: Vec<WigImage>,
    pub rating: Rating,
    pub sales: u32,
    pub tags: Vec<String>,
    pub seo: Seo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub(crate) events: Vec<DomainEvent>,
}

/// Highest accepted unit price, in base currency units.
pub const MAX_PRICE: u64 = 1_000_000_000_000;
/// Stock and sales counters stay within a signed 32-bit column.
pub const MAX_STOCK: u32 = i32::MAX as u32;

fn visible_by_default() -> bool { true }

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewWig {
    #[validate(custom = "wig_name")]
    pub name: String,
    #[validate(range(max = "MAX_PRICE", message = "Price is too high"))]
    pub price: u64,
    #[serde(default)]
    #[validate(range(max = "MAX_PRICE", message = "Price is too high"))]
    pub original_price: Option<u64>,
    pub price_range: PriceRange,
    pub hair_type: HairType,
    pub style: Style,
    pub length: WigLength,
    #[serde(default)]
    #[validate(length(max = 1000, message = "Description cannot exceed 1000 characters"))]
    pub description: String,
    #[serde(default)]
    #[validate(range(max = "MAX_STOCK", message = "Stock is too high"))]
    pub stock: u32,
    #[serde(default = "visible_by_default")]
    pub is_visible: bool,
    #[serde(default)]
    #[validate(custom = "image_urls")]
    pub images: Vec<WigImage>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub seo: SeoInput,
}

/// Partial update; absent fields are left alone.
#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct WigPatch {
    #[validate(custom = "wig_name")]
    pub name: Option<String>,
    #[validate(range(max = "MAX_PRICE", message = "Price is too high"))]
    pub price: Option<u64>,
    #[validate(range(max = "MAX_PRICE", message = "Price is too high"))]
    pub original_price: Option<u64>,
    pub price_range: Option<PriceRange>,
    pub hair_type: Option<HairType>,
    pub style: Option<Style>,
    pub length: Option<WigLength>,
    #[validate(length(max = 1000, message = "Description cannot exceed 1000 characters"))]
    pub description: Option<String>,
    #[validate(range(max = "MAX_STOCK", message = "Stock is too high"))]
    pub stock: Option<u32>,
    pub is_visible: Option<bool>,
    #[validate(custom = "image_urls")]
    pub images: Option<Vec<WigImage>>,
    pub tags: Option<Vec<String>>,
}

/// An admin edit, applied to the stored wig in one step so it never races a
/// stock decrement.
#[derive(Clone, Debug)]
pub enum WigChange {
    Patch(WigPatch),
    Visibility(bool),
}

impl Wig {
    pub fn create(input: NewWig) -> Result<Self, WigError> {
        input.validate().map_err(|e| WigError::Invalid(e.into()))?;
        let name = input.name.trim().to_string();
        let slug = match input.seo.slug.as_deref() {
            Some(explicit) => Slug::new(explicit),
            None => Slug::from_name(&name),
        }
        .map_err(|_| WigError::InvalidSlug)?;
        let id = Uuid::now_v7();
        let now = Utc::now();
        let mut wig = Self {
            id, name, price: input.price, original_price: input.original_price,
            price_range: input.price_range, hair_type: input.hair_type, style: input.style, length: input.length,
            description: input.description, stock: input.stock, is_visible: input.is_visible,
            images: input.images, rating: Rating::default(), sales: 0, tags: input.tags,
            seo: Seo { meta_title: input.seo.meta_title, meta_description: input.seo.meta_description, slug: slug.clone() },
            created_at: now, updated_at: now, events: vec![],
        };
        wig.raise_event(DomainEvent::Wig(WigEvent::Created { wig_id: id, slug: slug.to_string() }));
        Ok(wig)
    }

    pub fn is_in_stock(&self) -> bool { self.stock > 0 }
    pub fn slug(&self) -> &Slug { &self.seo.slug }

    pub fn apply(&mut self, patch: WigPatch) -> Result<(), WigError> {
        patch.validate().map_err(|e| WigError::Invalid(e.into()))?;
        if let Some(name) = patch.name { self.name = name.trim().to_string(); }
        if let Some(price) = patch.price { self.price = price; }
        if patch.original_price.is_some() { self.original_price = patch.original_price; }
        if let Some(v) = patch.price_range { self.price_range = v; }
        if let Some(v) = patch.hair_type { self.hair_type = v; }
        if let Some(v) = patch.style { self.style = v; }
        if let Some(v) = patch.length { self.length = v; }
        if let Some(v) = patch.description { self.description = v; }
        if let Some(v) = patch.stock { self.stock = v; }
        if let Some(v) = patch.images { self.images = v; }
        if let Some(v) = patch.tags { self.tags = v; }
        self.touch();
        self.raise_event(DomainEvent::Wig(WigEvent::Updated { wig_id: self.id }));
        if let Some(visible) = patch.is_visible { self.set_visibility(visible); }
        Ok(())
    }

    pub fn change(&mut self, change: WigChange) -> Result<(), WigError> {
        match change {
            WigChange::Patch(patch) => self.apply(patch),
            WigChange::Visibility(is_visible) => { self.set_visibility(is_visible); Ok(()) }
        }
    }

    pub fn set_visibility(&mut self, is_visible: bool) {
        if self.is_visible == is_visible { return; }
        self.is_visible = is_visible;
        self.touch();
        self.raise_event(DomainEvent::Wig(WigEvent::VisibilityChanged { wig_id: self.id, is_visible }));
    }

    pub fn decrement_stock(&mut self, quantity: u32) -> Result<(), WigError> {
        if self.stock < quantity {
            return Err(WigError::InsufficientStock { available: self.stock, requested: quantity });
        }
        self.stock -= quantity;
        self.sales = self.sales.saturating_add(quantity).min(MAX_STOCK);
        self.touch();
        self.raise_event(DomainEvent::Wig(WigEvent::StockDecremented { wig_id: self.id, quantity, remaining: self.stock }));
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

fn wig_name(name: &str) -> Result<(), ValidationError> {
    let len = name.trim().chars().count();
    if len == 0 || len > 100 { return Err(invalid("name", "Name is required (1-100 characters)")); }
    Ok(())
}

fn image_urls(images: &[WigImage]) -> Result<(), ValidationError> {
    if images.iter().any(|i| i.url.trim().is_empty()) { return Err(invalid("images", "Every image needs a url")); }
    Ok(())
}

#[derive(Debug, Error)]
pub enum WigError {
    #[error("{0}")]
    Invalid(FieldErrors),
    #[error("slug has no usable characters")]
    InvalidSlug,
    #[error("insufficient stock: {available} available, {requested} requested")]
    InsufficientStock { available: u32, requested: u32 },
}
