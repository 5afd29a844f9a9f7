use chrono::SecondsFormat;
use serde_json::{json, Map, Value};

use crate::generator::{request_seed, simple_seed};
use crate::mocks::{
    build_mock_ekata, build_mock_emailage, build_mock_external_services, build_mock_threatmetrix,
    build_mock_transaction,
};
use crate::model::{EnrichRequest, Service, SimpleEnrichRequest};

const SERVICE_KEYS: [&str; 3] = ["emailage", "threatmetrix", "ekata"];

/// Merge a dataset row (or a freshly mocked base on a miss) with the
/// request-supplied identity fields and a computed risk summary, and shape
/// the combined response envelope.
pub fn normalize_response(req: &EnrichRequest, row: Option<&Value>) -> Value {
    let seed = request_seed(req);

    let (mut base, hit) = match row {
        // Structural clone keeps the stored record untouched.
        Some(row) => (row.as_object().cloned().unwrap_or_default(), true),
        None => {
            let mut base = Map::new();
            base.insert("transaction".to_string(), build_mock_transaction(req));
            base.insert("customer".to_string(), json!({}));
            base.insert(
                "external_services".to_string(),
                build_mock_external_services(&seed),
            );
            base.insert("risk".to_string(), json!({}));
            base.insert("features".to_string(), json!({}));
            (base, false)
        }
    };

    overlay_customer(&mut base, req);
    ensure_external_services(&mut base, &seed);

    let email_score = service_score(&base, "emailage", "score");
    let tm_score = service_score(&base, "threatmetrix", "risk_score");
    let blended = (0.55 * tm_score as f64 + 0.45 * email_score as f64).round() as i64;

    let mut reason_codes: Vec<&str> = Vec::new();
    if bool_at(&base, &["transaction", "network", "ip_proxy"]) {
        reason_codes.push("IP_PROXY");
    }
    if bool_at(&base, &["external_services", "emailage", "disposable"]) {
        reason_codes.push("DISPOSABLE_EMAIL");
    }
    if bool_at(&base, &["external_services", "threatmetrix", "bot_detected"]) {
        reason_codes.push("BOT_DETECTED");
    }

    base.insert(
        "risk".to_string(),
        json!({
            "blended_score": blended,
            "reason_codes": reason_codes,
            "recommended_action": if blended >= 60 { "REVIEW" } else { "ALLOW" },
        }),
    );

    json!({
        "request_id": req.request_id,
        "transaction_id": req.transaction_id,
        "transaction_time": req.transaction_time.to_rfc3339_opts(SecondsFormat::Secs, true),
        "dataset_hit": hit,
        "data": {
            "first_name": req.data.first_name,
            "last_name": req.data.last_name,
            "email": req.data.email,
            "ip": req.data.ip,
            "phone": req.data.phone,
            "city": req.data.city,
            "state": req.data.state,
            "zip": req.data.zip,
        },
        "transaction_payload": base,
    })
}

/// Single-service enrichment. A dataset hit requires the row to contain that
/// service's section specifically; each service is resolved independently of
/// the others, unlike the combined path.
pub fn enrich_with_service(req: &EnrichRequest, row: Option<&Value>, service: Service) -> Value {
    let key = service.to_string();
    let stored = row.and_then(|row| row.pointer(&format!("/external_services/{key}")));

    let (enrichment, hit) = match stored {
        Some(section) => (section.clone(), true),
        None => (build_service_mock(&request_seed(req), service), false),
    };

    json!({
        "request_id": req.request_id,
        "transaction_id": req.transaction_id,
        "transaction_time": req.transaction_time.to_rfc3339_opts(SecondsFormat::Secs, true),
        "dataset_hit": hit,
        "service": key,
        "data": {
            "first_name": req.data.first_name,
            "last_name": req.data.last_name,
            "email": req.data.email,
            "ip": req.data.ip,
            "phone": req.data.phone,
        },
        "enrichment": enrichment,
    })
}

/// Simplified identity-only ekata response; echoes the request under the
/// legacy field names.
pub fn simple_ekata_response(req: &SimpleEnrichRequest, row: Option<&Value>) -> Value {
    let (payload, hit) = simple_service_payload(req, row, Service::Ekata);

    json!({
        "request_id": req.request_id,
        "dataset_hit": hit,
        "data": {
            "fname": req.first_name,
            "l_name": req.last_name,
            "email": req.email,
            "homephone": req.phone,
            "ip": req.ip,
        },
        "ekata_payload": payload,
    })
}

/// Simplified identity-only emailage response.
pub fn simple_emailage_response(req: &SimpleEnrichRequest, row: Option<&Value>) -> Value {
    let (payload, hit) = simple_service_payload(req, row, Service::Emailage);

    json!({
        "request_id": req.request_id,
        "dataset_hit": hit,
        "data": {
            "first_name": req.first_name,
            "last_name": req.last_name,
            "email": req.email,
            "ip": req.ip,
            "phone": req.phone,
        },
        "emailage_payload": payload,
    })
}

fn simple_service_payload(
    req: &SimpleEnrichRequest,
    row: Option<&Value>,
    service: Service,
) -> (Value, bool) {
    let key = service.to_string();
    match row.and_then(|row| row.pointer(&format!("/external_services/{key}"))) {
        Some(section) => (section.clone(), true),
        None => (
            build_service_mock(&simple_seed(&req.email, req.ip.as_deref()), service),
            false,
        ),
    }
}

fn build_service_mock(seed: &str, service: Service) -> Value {
    match service {
        Service::Emailage => build_mock_emailage(seed),
        Service::Threatmetrix => build_mock_threatmetrix(seed),
        Service::Ekata => build_mock_ekata(seed),
    }
}

/// Request identity fields always win over stored customer fields for these
/// keys; other stored customer keys are left as-is.
fn overlay_customer(base: &mut Map<String, Value>, req: &EnrichRequest) {
    let billing = match &req.data.billing_address {
        Some(address) => json!(address),
        None => json!({
            "city": req.data.city,
            "state": req.data.state,
            "zip": req.data.zip,
            "country": "US",
        }),
    };

    let customer = object_entry(base, "customer");
    customer.insert("first_name".to_string(), json!(req.data.first_name));
    customer.insert("last_name".to_string(), json!(req.data.last_name));
    customer.insert("email".to_string(), json!(req.data.email));
    customer.insert("phone".to_string(), json!(req.data.phone));
    customer.insert(
        "addresses".to_string(),
        json!({
            "billing": billing,
            "shipping": req.data.shipping_address,
        }),
    );
    customer.insert("device".to_string(), json!(req.data.device));
}

/// Partial presence counts as none present: if any of the three sections is
/// missing, all three are regenerated from the seed as a unit.
fn ensure_external_services(base: &mut Map<String, Value>, seed: &str) {
    let services = object_entry(base, "external_services");
    let missing_any = SERVICE_KEYS.iter().any(|key| !services.contains_key(*key));
    if !missing_any {
        return;
    }

    if let Value::Object(mocks) = build_mock_external_services(seed) {
        for (key, value) in mocks {
            services.insert(key, value);
        }
    }
}

fn object_entry<'a>(base: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let slot = base
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

fn service_score(base: &Map<String, Value>, service: &str, field: &str) -> i64 {
    base.get("external_services")
        .and_then(|services| services.get(service))
        .and_then(|section| section.get(field))
        .and_then(Value::as_i64)
        .unwrap_or(0)
}

fn bool_at(base: &Map<String, Value>, path: &[&str]) -> bool {
    let mut cursor = base.get(path[0]);
    for key in &path[1..] {
        cursor = cursor.and_then(|value| value.get(*key));
    }
    cursor.and_then(Value::as_bool).unwrap_or(false)
}
