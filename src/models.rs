//! Records exchanged with the practice data API
//!
//! Field names follow the API's camelCase JSON. Amounts are in the base
//! currency.

use crate::types::{Amount, Quantity, RecordId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single form validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub address: Option<String>,
}

impl Patient {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        }
        if let Some(phone) = &self.phone {
            if let Some(error) = validate_phone(phone) {
                errors.push(error);
            }
        }
        if let Some(email) = &self.email {
            if let Some(error) = validate_email(email) {
                errors.push(error);
            }
        }
        if matches!(self.age, Some(age) if age > 130) {
            errors.push(FieldError::new("age", "Age must be between 0 and 130"));
        }
        errors
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// Linked patient record, when the customer is also examined here
    #[serde(default)]
    pub patient_id: Option<RecordId>,
}

impl Customer {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        }
        if let Some(error) = self.phone.as_deref().and_then(validate_phone) {
            errors.push(error);
        }
        if let Some(error) = self.email.as_deref().and_then(validate_email) {
            errors.push(error);
        }
        errors
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductCategory {
    Frames,
    Lenses,
    ContactLenses,
    Sunglasses,
    Accessories,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: RecordId,
    pub name: String,
    pub price: Amount,
    #[serde(default = "default_category")]
    pub category: ProductCategory,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub stock: Quantity,
}

fn default_category() -> ProductCategory {
    ProductCategory::Other
}

impl Product {
    pub fn new(id: &str, name: &str, price: Amount) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            price,
            category: ProductCategory::Other,
            brand: None,
            stock: 0,
        }
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            errors.push(FieldError::new("price", "Price must be a non-negative number"));
        }
        errors
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Paid,
    Unpaid,
    Partial,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Paid => "Paid",
            InvoiceStatus::Unpaid => "Unpaid",
            InvoiceStatus::Partial => "Partial",
            InvoiceStatus::Cancelled => "Cancelled",
            InvoiceStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub product_id: RecordId,
    pub quantity: Quantity,
    /// Price charged per unit; the catalogue price when absent
    #[serde(default)]
    pub unit_price: Option<Amount>,
}

impl InvoiceItem {
    pub fn new(product_id: &str, quantity: Quantity) -> Self {
        Self {
            product_id: product_id.to_string(),
            quantity,
            unit_price: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: RecordId,
    pub status: InvoiceStatus,
    pub items: Vec<InvoiceItem>,
    #[serde(default)]
    pub customer_id: Option<RecordId>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub discount: Amount,
    /// Invoice total as recorded by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Amount>,
}

impl Invoice {
    pub fn new(id: &str, status: InvoiceStatus, items: Vec<InvoiceItem>) -> Self {
        Self {
            id: id.to_string(),
            status,
            items,
            customer_id: None,
            date: None,
            discount: 0.0,
            total: None,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.status == InvoiceStatus::Paid
    }

    /// Sum of line amounts before discount; lines without a unit price
    /// contribute nothing
    pub fn subtotal(&self) -> Amount {
        self.items
            .iter()
            .filter_map(|item| item.unit_price.map(|price| price * item.quantity as f64))
            .fold(0.0, |acc, line| acc + line)
    }

    /// Recorded total when the server sent one, otherwise the discounted
    /// subtotal
    pub fn total(&self) -> Amount {
        match self.total {
            Some(total) if total.is_finite() => total,
            _ => (self.subtotal() - self.discount).max(0.0),
        }
    }

    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.items.is_empty() {
            errors.push(FieldError::new("items", "Invoice needs at least one item"));
        }
        for (i, item) in self.items.iter().enumerate() {
            if item.quantity == 0 {
                errors.push(FieldError::new(
                    &format!("items[{}].quantity", i),
                    "Quantity must be at least 1",
                ));
            }
            if matches!(item.unit_price, Some(p) if !p.is_finite() || p < 0.0) {
                errors.push(FieldError::new(
                    &format!("items[{}].unitPrice", i),
                    "Unit price must be a non-negative number",
                ));
            }
        }
        if !self.discount.is_finite() || self.discount < 0.0 {
            errors.push(FieldError::new("discount", "Discount must be a non-negative number"));
        }
        if matches!(self.total, Some(t) if !t.is_finite() || t < 0.0) {
            errors.push(FieldError::new("total", "Total must be a non-negative number"));
        }
        errors
    }
}

/// Refraction for one eye
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EyePrescription {
    /// Spherical power in dioptres
    #[serde(default)]
    pub sphere: f64,
    /// Cylindrical power in dioptres
    #[serde(default)]
    pub cylinder: f64,
    /// Cylinder axis in degrees, required when cylinder is non-zero
    #[serde(default)]
    pub axis: Option<u16>,
    /// Near addition in dioptres
    #[serde(default)]
    pub add: Option<f64>,
}

impl EyePrescription {
    fn validate(&self, eye: &str, errors: &mut Vec<FieldError>) {
        let field = |name: &str| format!("{}.{}", eye, name);

        if !in_quarter_steps(self.sphere, -20.0, 20.0) {
            errors.push(FieldError::new(
                &field("sphere"),
                "Sphere must be between -20.00 and +20.00 in 0.25 steps",
            ));
        }
        if !in_quarter_steps(self.cylinder, -10.0, 10.0) {
            errors.push(FieldError::new(
                &field("cylinder"),
                "Cylinder must be between -10.00 and +10.00 in 0.25 steps",
            ));
        }
        match self.axis {
            None if self.cylinder != 0.0 => errors.push(FieldError::new(
                &field("axis"),
                "Axis is required when cylinder is set",
            )),
            Some(axis) if axis > 180 => errors.push(FieldError::new(
                &field("axis"),
                "Axis must be between 0 and 180",
            )),
            _ => {}
        }
        if let Some(add) = self.add {
            if !in_quarter_steps(add, 0.0, 4.0) {
                errors.push(FieldError::new(
                    &field("add"),
                    "Addition must be between 0.00 and +4.00 in 0.25 steps",
                ));
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub id: RecordId,
    pub patient_id: RecordId,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub right_eye: EyePrescription,
    #[serde(default)]
    pub left_eye: EyePrescription,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Prescription {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.patient_id.trim().is_empty() {
            errors.push(FieldError::new("patientId", "Patient is required"));
        }
        self.right_eye.validate("rightEye", &mut errors);
        self.left_eye.validate("leftEye", &mut errors);
        errors
    }
}

fn in_quarter_steps(value: f64, min: f64, max: f64) -> bool {
    value.is_finite() && value >= min && value <= max && (value * 4.0).fract() == 0.0
}

fn validate_phone(phone: &str) -> Option<FieldError> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'));
    if !allowed || !(7..=15).contains(&digits) {
        Some(FieldError::new("phone", "Phone number must have 7 to 15 digits"))
    } else {
        None
    }
}

fn validate_email(email: &str) -> Option<FieldError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    if valid {
        None
    } else {
        Some(FieldError::new("email", "Email address is not valid"))
    }
}
