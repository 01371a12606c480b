use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::product::{NewProduct, UpdateProduct};

/// Maximum allowed length for a product name.
const NAME_MAX_LEN: usize = 200;
const NAME_MAX_LEN_VALIDATOR: u64 = NAME_MAX_LEN as u64;

/// Result type returned by the product form helpers.
pub type ProductFormResult<T> = Result<T, ProductFormError>;

/// Errors that can occur while processing product payloads.
#[derive(Debug, Error)]
pub enum ProductFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// The provided name is empty after sanitization.
    #[error("product name cannot be empty")]
    EmptyName,
    /// The provided price is not a non-negative decimal with at most two
    /// fractional digits.
    #[error("invalid price `{value}`")]
    InvalidPrice { value: String },
}

/// JSON payload accepted when creating a product.
#[derive(Debug, Deserialize, Validate)]
pub struct AddProductForm {
    /// Name supplied by the caller.
    #[validate(length(min = 1, max = NAME_MAX_LEN_VALIDATOR))]
    pub name: String,
    /// Price as a decimal string, e.g. `"12.34"`.
    pub price: String,
    /// Optional initial stock; the store defaults to 10 when absent.
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    /// Optional category the product belongs to.
    pub category_id: Option<i32>,
    /// Optional tag ids to link at creation time.
    #[serde(default)]
    pub tag_ids: Vec<i32>,
}

impl AddProductForm {
    /// Validates and sanitizes the payload into a domain `NewProduct` plus
    /// the tag ids to link.
    pub fn into_new_product(self) -> ProductFormResult<(NewProduct, Vec<i32>)> {
        self.validate()?;

        let sanitized_name = sanitize_inline_text(&self.name);
        if sanitized_name.is_empty() {
            return Err(ProductFormError::EmptyName);
        }

        let price_cents = parse_price(&self.price)?;

        let mut new_product = NewProduct::new(sanitized_name, price_cents);

        if let Some(stock) = self.stock {
            new_product = new_product.with_stock(stock);
        }

        if let Some(category_id) = self.category_id {
            new_product = new_product.with_category_id(category_id);
        }

        Ok((new_product, self.tag_ids))
    }
}

/// JSON payload accepted when updating a product.
///
/// Absent fields leave the persisted values untouched; `tag_ids` being absent
/// skips tag reconciliation entirely, while an empty list removes every link.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct EditProductForm {
    /// Optional new name.
    #[validate(length(min = 1, max = NAME_MAX_LEN_VALIDATOR))]
    pub name: Option<String>,
    /// Optional price update as a decimal string.
    pub price: Option<String>,
    /// Optional stock update.
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    /// Optional category reassignment.
    pub category_id: Option<i32>,
    /// Complete desired tag list, when the caller wants links reconciled.
    pub tag_ids: Option<Vec<i32>>,
}

impl EditProductForm {
    /// Validates and sanitizes the payload into a domain `UpdateProduct` plus
    /// the optional desired tag list.
    pub fn into_update_product(self) -> ProductFormResult<(UpdateProduct, Option<Vec<i32>>)> {
        self.validate()?;

        let mut updates = UpdateProduct::new();

        if let Some(name) = self.name {
            let sanitized = sanitize_inline_text(&name);
            if sanitized.is_empty() {
                return Err(ProductFormError::EmptyName);
            }
            updates = updates.name(sanitized);
        }

        if let Some(price) = self.price {
            updates = updates.price_cents(parse_price(&price)?);
        }

        if let Some(stock) = self.stock {
            updates = updates.stock(stock);
        }

        if let Some(category_id) = self.category_id {
            updates = updates.category_id(category_id);
        }

        Ok((updates, self.tag_ids))
    }
}

/// Parse a non-negative decimal price with at most two fractional digits into
/// cents, e.g. `"12.34"` -> 1234, `"5"` -> 500.
fn parse_price(input: &str) -> ProductFormResult<i64> {
    let invalid = || ProductFormError::InvalidPrice {
        value: input.to_string(),
    };

    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.starts_with('-') || trimmed.starts_with('+') {
        return Err(invalid());
    }

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };

    if whole.is_empty() || !whole.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(invalid());
    }

    if fraction.len() > 2 || !fraction.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(invalid());
    }

    let whole: i64 = whole.parse().map_err(|_| invalid())?;

    let cents = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => fraction.parse::<i64>().map_err(|_| invalid())?,
    };

    whole
        .checked_mul(100)
        .and_then(|value| value.checked_add(cents))
        .ok_or_else(invalid)
}

fn sanitize_inline_text(input: &str) -> String {
    let mut sanitized = String::with_capacity(input.len());
    let mut previous_whitespace = false;

    for ch in input.trim().chars() {
        if ch.is_whitespace() {
            if !previous_whitespace {
                sanitized.push(' ');
                previous_whitespace = true;
            }
        } else if ch.is_control() {
            continue;
        } else {
            sanitized.push(ch);
            previous_whitespace = false;
        }
    }

    sanitized
}
