use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// A persisted product row. `price` goes over the wire as a JSON number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Hook run on a freshly deserialised body before its rules are checked.
pub trait Normalize: Sized {
    fn normalize(self) -> Self {
        self
    }
}

fn non_negative(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::new("non_negative").with_message("Price must be non-negative".into()));
    }
    Ok(())
}

// ── Request payloads ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductCreate {
    #[validate(length(min = 1, max = 120, message = "Product name must be 1-120 characters"))]
    pub name: String,
    #[validate(length(max = 255, message = "Description must be at most 255 characters"))]
    pub description: Option<String>,
    #[validate(custom(function = "non_negative"))]
    pub price: Decimal,
}

impl Normalize for ProductCreate {
    fn normalize(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self
    }
}

/// Partial update. Only `description` and `price` are mutable; anything else in the
/// body (including `name`) is ignored.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProductUpdate {
    #[validate(length(max = 255, message = "Description must be at most 255 characters"))]
    pub description: Option<String>,
    #[validate(custom(function = "non_negative"))]
    pub price: Option<Decimal>,
}

impl Normalize for ProductUpdate {}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.price.is_none()
    }

    /// Names of the supplied fields, description first.
    pub fn supplied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::with_capacity(2);
        if self.description.is_some() {
            fields.push("description");
        }
        if self.price.is_some() {
            fields.push("price");
        }
        fields
    }
}

/// A validated, normalised create request ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
}

impl From<ProductCreate> for NewProduct {
    fn from(payload: ProductCreate) -> Self {
        Self {
            name: payload.name,
            description: payload.description.unwrap_or_default(),
            price: payload.price,
        }
    }
}
