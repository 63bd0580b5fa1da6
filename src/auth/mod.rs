/*!
 * # Caller identity
 *
 * Authentication happens upstream of this service. The gateway in front of it
 * forwards the authenticated caller as two headers:
 *
 * - `x-user-id`: the caller's user id (UUID)
 * - `x-user-role`: `customer` (default when absent) or `admin`
 *
 * Handlers take [`AuthUser`] for customer-facing routes and [`AdminUser`] for
 * back-office routes.
 */

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::debug;
use uuid::Uuid;

use crate::errors::ServiceError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_CUSTOMER: &str = "customer";

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    fn from_parts(parts: &Parts) -> Result<Self, ServiceError> {
        let raw_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ServiceError::Unauthorized("Missing caller identity".to_string()))?;

        let user_id = Uuid::parse_str(raw_id.trim()).map_err(|_| {
            debug!(header = USER_ID_HEADER, "Rejected malformed caller id");
            ServiceError::Unauthorized("Malformed caller identity".to_string())
        })?;

        let role = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|r| r.trim().to_ascii_lowercase())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| ROLE_CUSTOMER.to_string());

        Ok(Self { user_id, role })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_parts(parts)
    }
}

/// Authenticated caller holding the admin role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser(pub AuthUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_parts(parts)?;
        if !user.is_admin() {
            return Err(ServiceError::Forbidden(
                "Admin role required".to_string(),
            ));
        }
        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::http::Request;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (parts, _) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[tokio::test]
    async fn customer_role_is_the_default() {
        let id = Uuid::new_v4();
        let mut p = parts(&[(USER_ID_HEADER, &id.to_string())]);
        let user = AuthUser::from_request_parts(&mut p, &()).await.unwrap();
        assert_eq!(user.user_id, id);
        assert!(!user.is_admin());
    }

    #[tokio::test]
    async fn missing_or_malformed_id_is_unauthorized() {
        let mut p = parts(&[]);
        assert_matches!(
            AuthUser::from_request_parts(&mut p, &()).await,
            Err(ServiceError::Unauthorized(_))
        );

        let mut p = parts(&[(USER_ID_HEADER, "not-a-uuid")]);
        assert_matches!(
            AuthUser::from_request_parts(&mut p, &()).await,
            Err(ServiceError::Unauthorized(_))
        );
    }

    #[tokio::test]
    async fn admin_extractor_requires_admin_role() {
        let id = Uuid::new_v4().to_string();
        let mut p = parts(&[(USER_ID_HEADER, &id), (USER_ROLE_HEADER, "customer")]);
        assert_matches!(
            AdminUser::from_request_parts(&mut p, &()).await,
            Err(ServiceError::Forbidden(_))
        );

        let mut p = parts(&[(USER_ID_HEADER, &id), (USER_ROLE_HEADER, "Admin")]);
        let AdminUser(user) = AdminUser::from_request_parts(&mut p, &()).await.unwrap();
        assert!(user.is_admin());
    }
}
