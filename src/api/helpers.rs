//! Response builders for the Lambda HTTP integration.

use serde_json::{Value, json};

use crate::core::models::JsonResponse;

/// Wraps a status and JSON body in the function-URL response envelope.
#[must_use]
pub fn json_response(status_code: u16, body: &Value) -> Value {
    json!({
        "statusCode": status_code,
        "headers": { "content-type": "application/json" },
        "body": body.to_string()
    })
}

#[must_use]
pub fn from_json_response(response: &JsonResponse) -> Value {
    json_response(response.status, &response.body)
}
