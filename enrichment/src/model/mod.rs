use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum_macros::Display as EnumDisplay;
use thiserror::Error;

pub type GenericError = Box<dyn std::error::Error + Send + Sync>;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles"));

/// Request constraint violations, rejected before any enrichment runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
    #[error("card bin must be 6 to 8 digits")]
    InvalidCardBin,
    #[error("card last4 must be exactly 4 digits")]
    InvalidCardLast4,
    #[error("card expiry month must be between 1 and 12")]
    InvalidExpiryMonth,
    #[error("card expiry year must be between 2020 and 2100")]
    InvalidExpiryYear,
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL_PATTERN.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(email.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Address {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    #[serde(default = "default_country")]
    pub country: Option<String>,
}

fn default_country() -> Option<String> {
    Some("US".to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Device {
    pub user_agent: Option<String>,
    pub device_id: Option<String>,
    pub session_id: Option<String>,
    pub timezone: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Card {
    pub bin: Option<String>,
    pub last4: Option<String>,
    pub network: Option<String>,
    pub expiry_month: Option<u8>,
    pub expiry_year: Option<i32>,
}

impl Card {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(bin) = &self.bin {
            if !(6..=8).contains(&bin.len()) || !bin.chars().all(|c| c.is_ascii_digit()) {
                return Err(ValidationError::InvalidCardBin);
            }
        }
        if let Some(last4) = &self.last4 {
            if last4.len() != 4 || !last4.chars().all(|c| c.is_ascii_digit()) {
                return Err(ValidationError::InvalidCardLast4);
            }
        }
        if let Some(month) = self.expiry_month {
            if !(1..=12).contains(&month) {
                return Err(ValidationError::InvalidExpiryMonth);
            }
        }
        if let Some(year) = self.expiry_year {
            if !(2020..=2100).contains(&year) {
                return Err(ValidationError::InvalidExpiryYear);
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Payment {
    pub amount: Option<f64>,
    #[serde(default = "default_currency")]
    pub currency: Option<String>,
    pub card: Option<Card>,
}

fn default_currency() -> Option<String> {
    Some("USD".to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerData {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub ip: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub billing_address: Option<Address>,
    pub shipping_address: Option<Address>,
    pub device: Option<Device>,
}

/// Combined enrichment request. Unknown JSON fields are ignored on intake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichRequest {
    pub request_id: String,
    pub transaction_id: String,
    pub transaction_time: DateTime<Utc>,
    pub data: CustomerData,
    pub payment: Option<Payment>,
    pub customer_id: Option<i64>,
    pub merchant_id: Option<String>,
    pub channel: Option<String>,
}

impl EnrichRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_email(&self.data.email)?;
        if let Some(card) = self.payment.as_ref().and_then(|p| p.card.as_ref()) {
            card.validate()?;
        }

        Ok(())
    }
}

/// Identity-only request accepted by the simplified `/v1/ekata` and
/// `/v1/emailage` endpoints; no transaction id or time is required.
#[derive(Debug, Clone, Deserialize)]
pub struct SimpleEnrichRequest {
    pub request_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub ip: Option<String>,
    pub phone: Option<String>,
}

impl SimpleEnrichRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_email(&self.email)
    }
}

/// External services a record can be enriched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum Service {
    Emailage,
    Threatmetrix,
    Ekata,
}
