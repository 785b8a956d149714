use serde_json::Value;

use crate::core::models::RequestBody;
use crate::limits::UNKNOWN_CLIENT;

pub fn v_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = root;
    for key in path {
        cur = cur.get(*key)?;
    }
    Some(cur)
}

pub fn v_str<'a>(root: &'a Value, path: &[&str]) -> Option<&'a str> {
    v_path(root, path).and_then(|v| v.as_str())
}

pub fn get_header_value<'a>(headers: &'a serde_json::Value, name: &str) -> Option<&'a str> {
    if let Some(v) = headers.get(name).and_then(|s| s.as_str()) {
        return Some(v);
    }
    headers.as_object().and_then(|map| {
        map.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                v.as_str()
            } else {
                None
            }
        })
    })
}

/// Request path, from the v2 `rawPath` or the v1 `path`.
pub fn request_path(payload: &Value) -> Option<&str> {
    v_str(payload, &["rawPath"]).or_else(|| v_str(payload, &["path"]))
}

/// Upper-cased HTTP method; defaults to GET when the event carries none.
pub fn request_method(payload: &Value) -> String {
    v_str(payload, &["requestContext", "http", "method"])
        .or_else(|| v_str(payload, &["httpMethod"]))
        .unwrap_or("GET")
        .to_ascii_uppercase()
}

pub fn request_body(payload: &Value) -> RequestBody<'_> {
    RequestBody {
        body: payload.get("body").and_then(Value::as_str),
        is_base64_encoded: payload
            .get("isBase64Encoded")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }
}

/// Derives the rate-limit key from the first usable address hint:
/// `x-forwarded-for` (leftmost entry), `x-real-ip`, then the source IP the
/// platform observed. Falls back to [`UNKNOWN_CLIENT`].
pub fn client_id(payload: &Value) -> String {
    let headers = payload.get("headers").unwrap_or(&Value::Null);

    let forwarded = get_header_value(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next());
    let real_ip = get_header_value(headers, "x-real-ip");
    let source_ip = v_str(payload, &["requestContext", "http", "sourceIp"])
        .or_else(|| v_str(payload, &["requestContext", "identity", "sourceIp"]));

    [forwarded, real_ip, source_ip]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

/// Looks up a decoded query parameter from `queryStringParameters`, falling
/// back to parsing `rawQueryString`.
pub fn query_param(payload: &Value, name: &str) -> Option<String> {
    if let Some(v) = v_str(payload, &["queryStringParameters", name]) {
        return Some(v.to_string());
    }

    let raw = v_str(payload, &["rawQueryString"])?;
    url::form_urlencoded::parse(raw.as_bytes())
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let headers = json!({ "X-Forwarded-For": "1.1.1.1" });
        assert_eq!(get_header_value(&headers, "x-forwarded-for"), Some("1.1.1.1"));
    }

    #[test]
    fn test_client_id_prefers_leftmost_forwarded_for() {
        let payload = json!({
            "headers": { "x-forwarded-for": " 203.0.113.7 , 10.0.0.1", "x-real-ip": "10.0.0.2" },
            "requestContext": { "http": { "sourceIp": "10.0.0.3" } }
        });
        assert_eq!(client_id(&payload), "203.0.113.7");
    }

    #[test]
    fn test_client_id_skips_blank_hints() {
        let payload = json!({
            "headers": { "x-forwarded-for": "  ", "x-real-ip": "" },
            "requestContext": { "http": { "sourceIp": "10.0.0.3" } }
        });
        assert_eq!(client_id(&payload), "10.0.0.3");
    }

    #[test]
    fn test_client_id_falls_back_to_sentinel() {
        assert_eq!(client_id(&json!({})), UNKNOWN_CLIENT);
    }

    #[test]
    fn test_method_and_path_from_v2_and_v1_events() {
        let v2 = json!({ "rawPath": "/gateway/summarize", "requestContext": { "http": { "method": "post" } } });
        assert_eq!(request_path(&v2), Some("/gateway/summarize"));
        assert_eq!(request_method(&v2), "POST");

        let v1 = json!({ "path": "/github/search", "httpMethod": "GET" });
        assert_eq!(request_path(&v1), Some("/github/search"));
        assert_eq!(request_method(&v1), "GET");
    }

    #[test]
    fn test_query_param_sources() {
        let decoded = json!({ "queryStringParameters": { "q": "rust cli" } });
        assert_eq!(query_param(&decoded, "q").as_deref(), Some("rust cli"));

        let raw = json!({ "rawQueryString": "q=rust+cli&per_page=5" });
        assert_eq!(query_param(&raw, "q").as_deref(), Some("rust cli"));
        assert_eq!(query_param(&raw, "per_page").as_deref(), Some("5"));
        assert_eq!(query_param(&raw, "sort"), None);
    }
}
