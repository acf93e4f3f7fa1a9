use actix_web::{web, HttpResponse};

use crate::{
    database::MongoDB,
    models::Principal,
    services::auth_service,
    utils::{ok, CampusError},
};

#[utoipa::path(
    get,
    path = "/api/user/me",
    tag = "Users",
    responses(
        (status = 200, description = "Current user with role details"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(principal: web::ReqData<Principal>, db: web::Data<MongoDB>) -> Result<HttpResponse, CampusError> {
    let profile = auth_service::current_user(&db, &principal).await?;
    Ok(ok("User profile fetched", profile))
}
