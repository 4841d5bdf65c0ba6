use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use shared_models::auth::{CallerIdentity, Role};
use shared_models::error::AppError;

/// Middleware that turns the identity headers stamped by the upstream auth
/// gateway into a [`CallerIdentity`] request extension. Identity resolution
/// and token validation happen upstream; requests reaching this service
/// without the headers are rejected.
pub async fn identity_middleware(
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let caller = identity_from_headers(&request)?;
    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}

fn identity_from_headers<B>(request: &Request<B>) -> Result<CallerIdentity, AppError> {
    let id_header = request
        .headers()
        .get("x-user-id")
        .ok_or_else(|| AppError::Auth("Missing x-user-id header".to_string()))?;

    let id = id_header
        .to_str()
        .ok()
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .ok_or_else(|| AppError::Auth("Invalid x-user-id header".to_string()))?;

    let roles = match request.headers().get("x-user-roles") {
        Some(value) => {
            let raw = value
                .to_str()
                .map_err(|_| AppError::Auth("Invalid x-user-roles header".to_string()))?;
            raw.split(',')
                .filter(|part| !part.trim().is_empty())
                .map(|part| {
                    Role::parse(part)
                        .ok_or_else(|| AppError::Auth(format!("Unknown role: {}", part.trim())))
                })
                .collect::<Result<Vec<_>, _>>()?
        }
        None => vec![Role::Patient],
    };

    Ok(CallerIdentity::new(id, roles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn request_with(headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().uri("/appointments/slots");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn extracts_identity_and_roles() {
        let id = Uuid::new_v4();
        let request = request_with(&[
            ("x-user-id", &id.to_string()),
            ("x-user-roles", "doctor, admin"),
        ]);

        let caller = identity_from_headers(&request).unwrap();
        assert_eq!(caller.id, id);
        assert!(caller.has_role(Role::Doctor));
        assert!(caller.is_admin());
        assert!(!caller.has_role(Role::Patient));
    }

    #[test]
    fn defaults_to_patient_role() {
        let request = request_with(&[("x-user-id", &Uuid::new_v4().to_string())]);
        let caller = identity_from_headers(&request).unwrap();
        assert!(caller.has_role(Role::Patient));
    }

    #[test]
    fn rejects_missing_or_malformed_id() {
        assert_matches!(
            identity_from_headers(&request_with(&[])),
            Err(AppError::Auth(_))
        );
        assert_matches!(
            identity_from_headers(&request_with(&[("x-user-id", "not-a-uuid")])),
            Err(AppError::Auth(_))
        );
    }

    #[test]
    fn rejects_unknown_role() {
        let request = request_with(&[
            ("x-user-id", &Uuid::new_v4().to_string()),
            ("x-user-roles", "superuser"),
        ]);
        assert_matches!(identity_from_headers(&request), Err(AppError::Auth(_)));
    }
}
