use crate::model::role::Role;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized};
use futures::future::{Ready, ready};

/// Identity established by `auth_middleware`; handlers extract it from the
/// request rather than re-validating the token.
#[derive(Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or_else(|| ErrorUnauthorized("Not authenticated")),
        )
    }
}

impl AuthUser {
    /// The one authorization predicate every protected endpoint goes through.
    fn require(&self, allowed: &[Role], label: &str) -> actix_web::Result<()> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden(format!("{} only", label)))
        }
    }

    pub fn require_admin(&self) -> actix_web::Result<()> {
        self.require(&[Role::Admin], "Admin")
    }

    /// Scan devices run under either an admin or a dedicated scanner account.
    pub fn require_scanner(&self) -> actix_web::Result<()> {
        self.require(&[Role::Admin, Role::Scanner], "Admin/Scanner")
    }
}
