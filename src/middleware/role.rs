use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

use crate::models::{Principal, Role};
use crate::utils::CampusError;

/// Allows a request only when the principal's role is in `allowed`.
pub fn authorize(principal: Option<&Principal>, allowed: &[Role]) -> Result<(), CampusError> {
    match principal {
        Some(p) if allowed.contains(&p.role) => Ok(()),
        _ => Err(CampusError::Forbidden("Forbidden".to_string())),
    }
}

/// Role gate. Must run inside `AuthMiddleware`, which attaches the principal.
#[derive(Clone)]
pub struct RequireRole {
    allowed: Rc<[Role]>,
}

impl RequireRole {
    pub fn any_of(allowed: &[Role]) -> Self {
        Self { allowed: Rc::from(allowed) }
    }

    pub fn only(role: Role) -> Self {
        Self::any_of(&[role])
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleService {
            service,
            allowed: Rc::clone(&self.allowed),
        }))
    }
}

pub struct RequireRoleService<S> {
    service: S,
    allowed: Rc<[Role]>,
}

impl<S, B> Service<ServiceRequest> for RequireRoleService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let decision = authorize(req.extensions().get::<Principal>(), &self.allowed);

        if let Err(e) = decision {
            log::warn!("⛔ {} {} denied for role outside {:?}", req.method(), req.path(), self.allowed);
            return Box::pin(async move { Err(e.into()) });
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{dev::Service as _, http::StatusCode, test as actix_test, web, App, HttpResponse};
    use mongodb::bson::oid::ObjectId;

    fn principal(role: Role) -> Principal {
        Principal {
            id: ObjectId::new(),
            name: "Test".into(),
            email: "test@klh.edu.in".into(),
            role,
        }
    }

    #[test]
    fn test_authorize_matrix() {
        let all = [Role::Student, Role::Teacher, Role::Admin];
        for role in all {
            let p = principal(role);
            assert!(authorize(Some(&p), &[role]).is_ok());
            assert!(authorize(Some(&p), &all).is_ok());
            for other in all.iter().filter(|r| **r != role) {
                let err = authorize(Some(&p), &[*other]).unwrap_err();
                assert!(matches!(err, CampusError::Forbidden(_)));
            }
        }
        assert!(authorize(None, &all).is_err());
    }

    #[actix_web::test]
    async fn test_gate_runs_after_principal_is_attached() {
        let app = actix_test::init_service(
            App::new()
                .wrap_fn(|req, srv| {
                    let role = req
                        .headers()
                        .get("x-test-role")
                        .and_then(|v| v.to_str().ok())
                        .and_then(Role::parse);
                    if let Some(role) = role {
                        req.extensions_mut().insert(principal(role));
                    }
                    srv.call(req)
                })
                .service(
                    web::scope("/teacher")
                        .wrap(RequireRole::only(Role::Teacher))
                        .route("/dashboard", web::get().to(|| async { HttpResponse::Ok().finish() })),
                ),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/teacher/dashboard")
            .insert_header(("x-test-role", "teacher"))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = actix_test::TestRequest::get()
            .uri("/teacher/dashboard")
            .insert_header(("x-test-role", "student"))
            .to_request();
        let err = actix_test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::FORBIDDEN);
    }
}
