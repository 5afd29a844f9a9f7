/// Shared Test Helpers for Cross-Crate Use
///
/// This module provides centralized test utilities and fixtures used by the
/// `enrichment` crate's test suites as well as this crate's own tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{json, Value};

/// Convenience result type for test functions.
pub type TestResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

// Global counter for truly unique test identifiers across parallel tests
static GLOBAL_TEST_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate globally unique test identifiers that won't conflict across
/// parallel tests.
///
/// # Arguments
/// * `prefix` - A string prefix to identify the test type (e.g., "TX", "REQ")
///
/// # Returns
/// A unique string in the format: "{prefix}-{timestamp}-{counter}"
pub fn generate_unique_id(prefix: &str) -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis();
    let counter = GLOBAL_TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}-{}", prefix, timestamp, counter)
}

/// A dataset row with all five sections populated, keyed by the given
/// transaction id, customer email and transaction time.
pub fn sample_record(transaction_id: &str, email: &str, transaction_time: &str) -> Value {
    json!({
        "transaction": {
            "transaction_id": transaction_id,
            "transaction_time": transaction_time,
            "status": "Completed",
            "decision": "APPROVE",
            "amounts": { "total_amount": 125.50, "currency": "USD" },
            "channel": "web",
            "merchant": { "merchant_id": "M12345" },
            "payment": { "card": { "bin": "411111", "last4": "1111", "network": "VISA" } },
            "network": { "ip": "73.14.55.10", "ip_country": "US", "ip_proxy": false }
        },
        "customer": {
            "first_name": "Stored",
            "last_name": "Customer",
            "email": email,
            "phone": "+1-555-0000"
        },
        "external_services": {
            "emailage": {
                "score": 35,
                "email_first_seen": "2022-03-01T00:00:00Z",
                "email_last_seen": "2026-01-01T00:00:00Z",
                "domain_exists": true,
                "disposable": false,
                "free_provider": true
            },
            "threatmetrix": {
                "risk_score": 20,
                "policy": "ALLOW",
                "device_risk": 15,
                "ip_risk": 10,
                "true_ip": true,
                "bot_detected": false
            },
            "ekata": {
                "identity_confidence": 80,
                "phone_to_name_match": true,
                "address_to_name_match": true,
                "email_to_name_match": false
            }
        },
        "risk": {},
        "features": {}
    })
}

/// JSON body for a combined enrichment request, in the shape the HTTP
/// endpoints accept.
pub fn sample_request_body(request_id: &str, transaction_id: &str, email: &str) -> Value {
    json!({
        "request_id": request_id,
        "transaction_id": transaction_id,
        "transaction_time": "2026-01-14T05:22:31Z",
        "data": {
            "first_name": "Vishnu",
            "last_name": "Reddy",
            "email": email,
            "ip": "73.14.55.10",
            "phone": "+1-555-9999",
            "city": "hyd",
            "state": "in",
            "zip": "50044"
        }
    })
}
