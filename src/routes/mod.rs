use actix_web::HttpResponse;
use serde_json::json;

pub mod bills;
pub mod orders;
pub mod pricing;

/// Parse a numeric path segment, answering `400` with the field name when
/// it is not a positive integer.
pub(crate) fn parse_path_id(raw: &str, field: &str) -> Result<i32, HttpResponse> {
    match raw.trim().parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(error_response(
            HttpResponse::BadRequest(),
            format!("{field} must be a positive integer"),
        )),
    }
}

pub(crate) fn error_response(
    mut builder: actix_web::HttpResponseBuilder,
    message: impl Into<String>,
) -> HttpResponse {
    builder.json(json!({ "error": message.into() }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn path_ids_must_be_positive_integers() {
        assert_eq!(parse_path_id("12", "orderId").ok(), Some(12));

        for raw in ["0", "-3", "abc", ""] {
            match parse_path_id(raw, "orderId") {
                Err(response) => assert_eq!(response.status(), StatusCode::BAD_REQUEST),
                Ok(id) => panic!("{raw:?} parsed as {id}"),
            }
        }
    }
}
