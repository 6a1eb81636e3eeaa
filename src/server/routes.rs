use crate::server::api::{self, ApiContext, PayloadError};

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    pub fn to_http_string(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status_code,
            self.status_text,
            self.content_type,
            self.body.len(),
            self.body
        )
    }

    fn json(body: String) -> Self {
        Self {
            status_code: 200,
            status_text: "OK",
            content_type: "application/json",
            body,
        }
    }
}

/// Route with the built-in difficulty table and default engine settings.
pub fn route_request(method: &str, path: &str, body: &str) -> HttpResponse {
    route_request_with(&ApiContext::default(), method, path, body)
}

pub fn route_request_with(ctx: &ApiContext, method: &str, path: &str, body: &str) -> HttpResponse {
    let path = path.split('?').next().unwrap_or(path);
    match (method, path) {
        ("GET", "/api/health") => match api::health_payload() {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", "/api/difficulties") => match api::difficulties_payload(ctx) {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("POST", "/api/optimize") => payload_response(api::optimize_payload(ctx, body)),
        ("POST", "/api/probability") => payload_response(api::probability_payload(ctx, body)),
        _ => error_response(404, "Not Found", "Route not found"),
    }
}

fn payload_response(result: Result<String, PayloadError>) -> HttpResponse {
    match result {
        Ok(payload) => HttpResponse::json(payload),
        Err(PayloadError::Parse(err)) => {
            error_response(400, "Bad Request", &format!("Invalid request body: {err}"))
        }
        Err(PayloadError::Validation(validation)) => {
            validation_error_response(400, "Bad Request", validation)
        }
        Err(PayloadError::Search(failure)) => {
            let fallback = format!(
                "{{\n  \"status\": \"error\",\n  \"reason\": \"{}\"\n}}",
                failure.reason
            );
            HttpResponse {
                status_code: 422,
                status_text: "Unprocessable Entity",
                content_type: "application/json",
                body: serde_json::to_string_pretty(&serde_json::json!({
                    "status": "error",
                    "reason": failure.reason,
                    "message": failure.message,
                }))
                .unwrap_or(fallback),
            }
        }
        Err(PayloadError::Internal(msg)) => error_response(500, "Internal Server Error", &msg),
    }
}

fn validation_error_response(
    status_code: u16,
    status_text: &'static str,
    payload: api::ValidationErrorResponse,
) -> HttpResponse {
    let fallback =
        "{\n  \"status\": \"error\",\n  \"message\": \"Validation failed\"\n}".to_string();

    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: serde_json::to_string_pretty(&payload).unwrap_or(fallback),
    }
}

fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}
