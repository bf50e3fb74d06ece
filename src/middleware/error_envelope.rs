use axum::{
    body::{Bytes, to_bytes},
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::Response,
};

use crate::{config::Environment, error::AppError, response::ErrorReport};

const MAX_ERROR_BODY_BYTES: usize = 16 * 1024;

/// The one place error responses are rendered and logged.
///
/// Handlers return [`AppError`], which leaves an [`ErrorReport`] in the
/// response extensions; framework-generated errors (405, rejected extractors)
/// arrive as plain text and are classified by status. Either way the client
/// gets the standard envelope with detail gated on `environment`.
pub async fn error_envelope_middleware(
    State(environment): State<Environment>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let response = next.run(req).await;

    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let (parts, body) = response.into_parts();
    let report = match parts.extensions.get::<ErrorReport>() {
        Some(report) => report.clone(),
        None => {
            let message = match to_bytes(body, MAX_ERROR_BODY_BYTES).await {
                Ok(bytes) => body_bytes_to_message(status, bytes),
                Err(_) => default_message(status),
            };
            let mut report = ErrorReport::from_error(&app_error_from_status(status, message));
            report.status = status;
            report
        }
    };

    if status.is_server_error() {
        if environment.is_production() {
            tracing::error!(
                %method,
                path = %path,
                status = status.as_u16(),
                message = %report.message,
                "request failed"
            );
        } else {
            tracing::error!(
                %method,
                path = %path,
                status = status.as_u16(),
                message = %report.message,
                report = ?report,
                "request failed"
            );
        }
    } else {
        tracing::debug!(
            %method,
            path = %path,
            status = status.as_u16(),
            error = %report.kind,
            "request rejected"
        );
    }

    let mut new_response = report.render(environment);
    copy_headers(&parts.headers, &mut new_response);
    new_response
}

fn body_bytes_to_message(status: StatusCode, bytes: Bytes) -> String {
    let message = String::from_utf8_lossy(&bytes).trim().to_string();
    if message.is_empty() {
        return default_message(status);
    }
    message
}

fn default_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}

fn app_error_from_status(status: StatusCode, message: String) -> AppError {
    match status {
        StatusCode::NOT_FOUND => AppError::not_found(message),
        StatusCode::METHOD_NOT_ALLOWED => AppError::MethodNotAllowed(message),
        StatusCode::UNSUPPORTED_MEDIA_TYPE
        | StatusCode::UNPROCESSABLE_ENTITY
        | StatusCode::PAYLOAD_TOO_LARGE => AppError::MalformedPayload(message),
        _ if status.is_client_error() => AppError::bad_request(message),
        _ => AppError::internal(message),
    }
}

fn copy_headers(src: &HeaderMap, dest: &mut Response) {
    for (name, value) in src {
        if name == header::CONTENT_TYPE || name == header::CONTENT_LENGTH {
            continue;
        }
        dest.headers_mut().append(name.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use axum::response::IntoResponse;

    use super::*;

    #[test]
    fn framework_statuses_map_to_error_kinds() {
        let cases = [
            (StatusCode::NOT_FOUND, "Not Found"),
            (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed"),
            (StatusCode::UNSUPPORTED_MEDIA_TYPE, "Invalid JSON"),
            (StatusCode::CONFLICT, "Bad Request"),
            (StatusCode::BAD_GATEWAY, "Internal Server Error"),
        ];
        for (status, kind) in cases {
            assert_eq!(app_error_from_status(status, String::new()).kind(), kind);
        }
    }

    #[test]
    fn copied_headers_keep_every_value() {
        let mut src = HeaderMap::new();
        src.append(header::VARY, "origin".parse().unwrap());
        src.append(header::VARY, "access-control-request-method".parse().unwrap());
        src.insert(header::CONTENT_TYPE, "text/plain".parse().unwrap());

        let mut response = AppError::not_found("x").into_response();
        copy_headers(&src, &mut response);

        let vary: Vec<&str> = response
            .headers()
            .get_all(header::VARY)
            .iter()
            .map(|value| value.to_str().unwrap())
            .collect();
        assert_eq!(vary, vec!["origin", "access-control-request-method"]);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn empty_body_falls_back_to_reason_phrase() {
        assert_eq!(
            body_bytes_to_message(StatusCode::METHOD_NOT_ALLOWED, Bytes::new()),
            "Method Not Allowed"
        );
    }
}
