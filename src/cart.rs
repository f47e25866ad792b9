//! Cart arithmetic shared by the cart endpoints and checkout.
//!
//! Everything here is pure: lines carry the product snapshot they were
//! priced with, so totals and quantity rules can be evaluated without a
//! database round trip. Money is integer cents throughout.

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("product {0} is out of stock")]
    OutOfStock(Uuid),

    #[error("product {0} is not in the cart")]
    MissingLine(Uuid),

    #[error("cart is empty")]
    Empty,

    #[error("amount overflow while pricing the cart")]
    Overflow,
}

/// Clamp a requested quantity into `[1, stock]`.
///
/// A product with no stock cannot be put in a cart at all.
pub fn clamp_quantity(product_id: Uuid, requested: i32, stock: i32) -> Result<i32, CartError> {
    if stock <= 0 {
        return Err(CartError::OutOfStock(product_id));
    }
    Ok(requested.clamp(1, stock))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price: i64,
    pub stock: i32,
    pub quantity: i32,
}

impl CartLine {
    pub fn line_total(&self) -> Result<i64, CartError> {
        self.unit_price
            .checked_mul(i64::from(self.quantity))
            .ok_or(CartError::Overflow)
    }
}

/// Product snapshot used when adding a line.
#[derive(Debug, Clone)]
pub struct ProductSnapshot {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price: i64,
    pub stock: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| i64::from(l.quantity)).sum()
    }

    pub fn line(&self, product_id: Uuid) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    /// Add `quantity` units of a product, merging with an existing line.
    /// The resulting quantity is clamped to the product's stock.
    pub fn add(&mut self, product: ProductSnapshot, quantity: i32) -> Result<i32, CartError> {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product.product_id)
        {
            line.name = product.name;
            line.unit_price = product.unit_price;
            line.stock = product.stock;
            let merged = line.quantity.saturating_add(quantity.max(1));
            line.quantity = clamp_quantity(line.product_id, merged, line.stock)?;
            return Ok(line.quantity);
        }

        let quantity = clamp_quantity(product.product_id, quantity, product.stock)?;
        self.lines.push(CartLine {
            product_id: product.product_id,
            name: product.name,
            unit_price: product.unit_price,
            stock: product.stock,
            quantity,
        });
        Ok(quantity)
    }

    pub fn set_quantity(&mut self, product_id: Uuid, quantity: i32) -> Result<i32, CartError> {
        let line = self.line_mut(product_id)?;
        line.quantity = clamp_quantity(product_id, quantity, line.stock)?;
        Ok(line.quantity)
    }

    pub fn increment(&mut self, product_id: Uuid) -> Result<i32, CartError> {
        let current = self.line_mut(product_id)?.quantity;
        self.set_quantity(product_id, current.saturating_add(1))
    }

    pub fn decrement(&mut self, product_id: Uuid) -> Result<i32, CartError> {
        let current = self.line_mut(product_id)?.quantity;
        self.set_quantity(product_id, current.saturating_sub(1))
    }

    pub fn remove(&mut self, product_id: Uuid) -> Result<CartLine, CartError> {
        let idx = self
            .lines
            .iter()
            .position(|l| l.product_id == product_id)
            .ok_or(CartError::MissingLine(product_id))?;
        Ok(self.lines.remove(idx))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of `unit_price * quantity` over every line.
    pub fn subtotal(&self) -> Result<i64, CartError> {
        self.lines.iter().try_fold(0_i64, |acc, line| {
            acc.checked_add(line.line_total()?).ok_or(CartError::Overflow)
        })
    }

    fn line_mut(&mut self, product_id: Uuid) -> Result<&mut CartLine, CartError> {
        self.lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or(CartError::MissingLine(product_id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct CheckoutTotals {
    pub subtotal: i64,
    pub tax: i64,
    pub discount: i64,
    pub total: i64,
}

impl CheckoutTotals {
    /// Tax is rounded half up to the cent; the total never goes below zero.
    pub fn compute(subtotal: i64, discount: i64, tax_rate_percent: i64) -> Result<Self, CartError> {
        let tax = subtotal
            .checked_mul(tax_rate_percent)
            .and_then(|v| v.checked_add(50))
            .map(|v| v / 100)
            .ok_or(CartError::Overflow)?;
        let discount = discount.max(0);
        let total = subtotal
            .checked_add(tax)
            .ok_or(CartError::Overflow)?
            .saturating_sub(discount)
            .max(0);
        Ok(Self {
            subtotal,
            tax,
            discount,
            total,
        })
    }

    pub fn for_cart(cart: &Cart, tax_rate_percent: i64) -> Result<Self, CartError> {
        Self::compute(cart.subtotal()?, 0, tax_rate_percent)
    }
}
