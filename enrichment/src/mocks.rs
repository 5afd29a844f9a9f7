use chrono::{Duration, SecondsFormat, SubsecRound, Utc};
use serde_json::{json, Value};

use crate::generator::{chance, hash, pick, score, transaction_seed};
use crate::model::EnrichRequest;

pub const POLICY_OPTIONS: [&str; 3] = ["ALLOW", "REVIEW", "REJECT"];
pub const STATUS_OPTIONS: [&str; 4] = ["Completed", "Declined", "Review", "Pending"];
pub const DECISION_OPTIONS: [&str; 3] = ["APPROVE", "REVIEW", "DECLINE"];
pub const CHANNEL_OPTIONS: [&str; 3] = ["web", "mobile", "ivr"];
pub const MERCHANT_OPTIONS: [&str; 3] = ["M12345", "M67890", "M24680"];
pub const COUNTRY_OPTIONS: [&str; 5] = ["US", "CA", "MX", "GB", "IN"];

/// Mock email-reputation payload. The first/last-seen timestamps are offsets
/// from the current time and are the only fields here that vary across
/// invocation times; everything else is a pure function of the seed.
pub fn build_mock_emailage(seed: &str) -> Value {
    let now = Utc::now().trunc_subsecs(0);

    // first seen 30-2029 days ago, last seen 0-89 days ago
    let first_seen_days_ago = 30 + (hash(&format!("{seed}|first_seen")) % 2000) as i64;
    let last_seen_days_ago = (hash(&format!("{seed}|last_seen")) % 90) as i64;

    json!({
        "score": score(&format!("{seed}|emailage")),
        "email_first_seen": (now - Duration::days(first_seen_days_ago))
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        "email_last_seen": (now - Duration::days(last_seen_days_ago))
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        "domain_exists": chance(&format!("{seed}|domain"), 92),
        "disposable": chance(&format!("{seed}|disposable"), 7),
        "free_provider": chance(&format!("{seed}|free_provider"), 55),
    })
}

/// Mock device/network-risk payload.
pub fn build_mock_threatmetrix(seed: &str) -> Value {
    json!({
        "risk_score": score(&format!("{seed}|threatmetrix")),
        "policy": pick(&format!("{seed}|policy"), &POLICY_OPTIONS),
        "device_risk": score(&format!("{seed}|device_risk")),
        "ip_risk": score(&format!("{seed}|ip_risk")),
        "true_ip": chance(&format!("{seed}|true_ip"), 88),
        "bot_detected": chance(&format!("{seed}|bot"), 9),
    })
}

/// Mock identity-confidence payload.
pub fn build_mock_ekata(seed: &str) -> Value {
    json!({
        "identity_confidence": score(&format!("{seed}|ekata")),
        "phone_to_name_match": chance(&format!("{seed}|phone_name"), 72),
        "address_to_name_match": chance(&format!("{seed}|addr_name"), 66),
        "email_to_name_match": chance(&format!("{seed}|email_name"), 62),
    })
}

/// All three external-service mocks keyed by service name.
pub fn build_mock_external_services(seed: &str) -> Value {
    json!({
        "emailage": build_mock_emailage(seed),
        "threatmetrix": build_mock_threatmetrix(seed),
        "ekata": build_mock_ekata(seed),
    })
}

/// Full synthetic transaction for dataset misses. Request-supplied fields
/// (amount, currency, channel, merchant, card) take precedence over derived
/// values.
pub fn build_mock_transaction(req: &EnrichRequest) -> Value {
    let seed = transaction_seed(req);

    let status = pick(&format!("{seed}|status"), &STATUS_OPTIONS);
    let decision = pick(&format!("{seed}|decision"), &DECISION_OPTIONS);

    let amount = req
        .payment
        .as_ref()
        .and_then(|p| p.amount)
        .unwrap_or_else(|| (hash(&seed) % 19999) as f64 / 100.0);

    let currency = req
        .payment
        .as_ref()
        .and_then(|p| p.currency.clone())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| "USD".to_string());

    let card = match req.payment.as_ref().and_then(|p| p.card.as_ref()) {
        Some(card) => json!({
            "bin": card.bin,
            "last4": card.last4,
            "network": card.network,
        }),
        None => json!({}),
    };

    let channel = req
        .channel
        .clone()
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| pick(&format!("{seed}|channel"), &CHANNEL_OPTIONS).to_string());

    let merchant_id = req
        .merchant_id
        .clone()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| pick(&format!("{seed}|mid"), &MERCHANT_OPTIONS).to_string());

    json!({
        "transaction_id": req.transaction_id,
        "transaction_time": req.transaction_time.to_rfc3339_opts(SecondsFormat::Secs, true),
        "status": status,
        "decision": decision,
        "amounts": {
            "total_amount": (amount * 100.0).round() / 100.0,
            "currency": currency,
        },
        "channel": channel,
        "merchant": {
            "merchant_id": merchant_id,
        },
        "payment": { "card": card },
        "network": {
            "ip": req.data.ip,
            "ip_country": pick(&format!("{seed}|ip_country"), &COUNTRY_OPTIONS),
            "ip_proxy": chance(&format!("{seed}|proxy"), 11),
        },
    })
}
