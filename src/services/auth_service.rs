use crate::{
    config::AppConfig,
    database::{self, MongoDB},
    models::{
        Club, ClubSummary, Event, EventSummary, Principal, Role, StudentDetails, StudentProfile,
        TeacherDetails, TeacherProfile, User, UserProfile, DEFAULT_STUDENT_DEPARTMENT,
        DEFAULT_STUDENT_YEAR, DEFAULT_TEACHER_DEPARTMENT, DEFAULT_TEACHER_DESIGNATION,
    },
    services::identity_provider::ExternalIdentity,
    utils::{validation::to_iso, CampusError},
};
use chrono::{Duration, Utc};
use futures::stream::TryStreamExt;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use mongodb::options::ReturnDocument;
use serde::{Deserialize, Serialize};

pub const TOKEN_TTL_DAYS: i64 = 7;
pub const DEFAULT_USER_NAME: &str = "Unnamed User";

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub sub: String, // user id
    pub name: String,
    pub email: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

/// Signs a 7-day HS256 token for `user`.
pub fn generate_jwt(user: &Principal, secret: &str) -> Result<String, CampusError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id.to_hex(),
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role,
        iat: now.timestamp() as usize,
        exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize,
    };

    Ok(encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))?)
}

/// Checks signature and expiry. Every failure reads the same to the caller.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, CampusError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        log::debug!("🔒 Token rejected: {}", e);
        CampusError::Unauthorized("Unauthorized".to_string())
    })
}

/// Students must sign in with an institutional address.
pub fn check_domain(role: Role, email: &str, student_domain: &str) -> Result<(), CampusError> {
    let allowed = student_domain.trim_start_matches('@');
    let domain = email.rsplit_once('@').map(|(_, domain)| domain).unwrap_or_default();
    if role == Role::Student && !domain.eq_ignore_ascii_case(allowed) {
        return Err(CampusError::Forbidden("Invalid domain".to_string()));
    }
    Ok(())
}

/// Resolves the account behind verified claims. Accounts deleted since
/// issuance are rejected.
pub async fn authenticate(db: &MongoDB, claims: &Claims) -> Result<Principal, CampusError> {
    let unauthorized = || CampusError::Unauthorized("Invalid token".to_string());

    let user_id = ObjectId::parse_str(&claims.sub).map_err(|_| unauthorized())?;
    let user = db
        .collection::<User>(database::USERS)
        .find_one(doc! { "_id": user_id })
        .await?
        .ok_or_else(unauthorized)?;

    Principal::from_user(&user).ok_or_else(unauthorized)
}

/// Result of a completed OAuth login.
#[derive(Debug, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub user: UserProfile,
}

/// Turns a provider identity into an account, a role profile and a session token.
///
/// The domain policy runs before anything is written. The user upsert is keyed
/// by the external id, so a retried login after a failed profile upsert lands
/// on the same account.
pub async fn complete_oauth_login(
    db: &MongoDB,
    config: &AppConfig,
    identity: ExternalIdentity,
    requested_role: Role,
) -> Result<LoginOutcome, CampusError> {
    let email = identity
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| CampusError::Unauthorized("Unable to read Google account email".to_string()))?;

    check_domain(requested_role, &email, &config.student_email_domain)?;

    let name = identity
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_USER_NAME)
        .to_string();
    let profile_pic = identity.picture.unwrap_or_default();

    let user = upsert_user(db, &identity.id, &name, &email, &profile_pic, requested_role).await?;
    let principal = Principal::from_user(&user)
        .ok_or_else(|| CampusError::Internal("Upserted user has no id".to_string()))?;

    upsert_role_profile(db, &user).await?;

    let token = generate_jwt(&principal, &config.jwt_secret)?;
    let profile = load_profile(db, &user).await?;

    log::info!("✅ {} signed in as {}", user.email, user.role);
    Ok(LoginOutcome { token, user: profile })
}

/// Find-or-create keyed by Google id; existing accounts get the freshest
/// name, email, picture and role.
async fn upsert_user(
    db: &MongoDB,
    google_id: &str,
    name: &str,
    email: &str,
    profile_pic: &str,
    role: Role,
) -> Result<User, CampusError> {
    let now = BsonDateTime::now();
    let update = doc! {
        "$set": {
            "name": name,
            "email": email,
            "profile_pic": profile_pic,
            "role": role.as_str(),
            "updated_at": now,
        },
        "$setOnInsert": { "created_at": now },
    };

    db.collection::<User>(database::USERS)
        .find_one_and_update(doc! { "google_id": google_id }, update)
        .upsert(true)
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| CampusError::Internal("User upsert returned no document".to_string()))
}

/// Keeps the role profile in sync with the account. Defaults are only
/// written when the profile is created.
async fn upsert_role_profile(db: &MongoDB, user: &User) -> Result<(), CampusError> {
    let Some(user_id) = user.id else {
        return Err(CampusError::Internal("User has no id".to_string()));
    };
    let now = BsonDateTime::now();
    let synced = doc! {
        "name": &user.name,
        "email": &user.email,
        "google_id": &user.google_id,
        "profile_pic": &user.profile_pic,
        "role": user.role.as_str(),
        "updated_at": now,
    };

    let (collection, defaults) = match user.role {
        Role::Student => (
            database::STUDENTS,
            doc! {
                "department": DEFAULT_STUDENT_DEPARTMENT,
                "year": DEFAULT_STUDENT_YEAR,
                "joined_clubs": [],
                "created_at": now,
            },
        ),
        Role::Teacher => (
            database::TEACHERS,
            doc! {
                "department": DEFAULT_TEACHER_DEPARTMENT,
                "designation": DEFAULT_TEACHER_DESIGNATION,
                "managed_events": [],
                "created_at": now,
            },
        ),
        Role::Admin => return Ok(()),
    };

    db.collection::<mongodb::bson::Document>(collection)
        .update_one(doc! { "user": user_id }, doc! { "$set": synced, "$setOnInsert": defaults })
        .upsert(true)
        .await?;

    Ok(())
}

/// Profile for `/api/user/me`.
pub async fn current_user(db: &MongoDB, principal: &Principal) -> Result<UserProfile, CampusError> {
    let user = db
        .collection::<User>(database::USERS)
        .find_one(doc! { "_id": principal.id })
        .await?
        .ok_or_else(|| CampusError::not_found("User"))?;

    load_profile(db, &user).await
}

async fn load_profile(db: &MongoDB, user: &User) -> Result<UserProfile, CampusError> {
    let user_id = user
        .id
        .ok_or_else(|| CampusError::Internal("User has no id".to_string()))?;

    let role_details = match user.role {
        Role::Student => student_details(db, user_id).await?,
        Role::Teacher => teacher_details(db, user_id).await?,
        Role::Admin => None,
    };

    Ok(UserProfile {
        id: user_id.to_hex(),
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role,
        profile_pic: user.profile_pic.clone(),
        role_details,
    })
}

async fn student_details(db: &MongoDB, user_id: ObjectId) -> Result<Option<serde_json::Value>, CampusError> {
    let Some(profile) = db
        .collection::<StudentProfile>(database::STUDENTS)
        .find_one(doc! { "user": user_id })
        .await?
    else {
        return Ok(None);
    };

    let clubs: Vec<Club> = db
        .collection::<Club>(database::CLUBS)
        .find(doc! { "_id": { "$in": &profile.joined_clubs } })
        .await?
        .try_collect()
        .await?;

    let details = StudentDetails {
        name: profile.name,
        email: profile.email,
        department: profile.department,
        year: profile.year,
        profile_pic: profile.profile_pic,
        joined_clubs: clubs
            .into_iter()
            .map(|club| ClubSummary {
                id: club.id.map(|id| id.to_hex()).unwrap_or_default(),
                name: club.name,
                category: club.category,
            })
            .collect(),
    };

    Ok(Some(serde_json::to_value(details).map_err(|e| CampusError::Internal(e.to_string()))?))
}

async fn teacher_details(db: &MongoDB, user_id: ObjectId) -> Result<Option<serde_json::Value>, CampusError> {
    let Some(profile) = db
        .collection::<TeacherProfile>(database::TEACHERS)
        .find_one(doc! { "user": user_id })
        .await?
    else {
        return Ok(None);
    };

    let events: Vec<Event> = db
        .collection::<Event>(database::EVENTS)
        .find(doc! { "_id": { "$in": &profile.managed_events } })
        .sort(doc! { "date": 1 })
        .await?
        .try_collect()
        .await?;

    let details = TeacherDetails {
        name: profile.name,
        email: profile.email,
        department: profile.department,
        designation: profile.designation,
        profile_pic: profile.profile_pic,
        managed_events: events
            .into_iter()
            .map(|event| EventSummary {
                id: event.id.map(|id| id.to_hex()).unwrap_or_default(),
                title: event.title,
                date: to_iso(event.date),
                location: event.location,
            })
            .collect(),
    };

    Ok(Some(serde_json::to_value(details).map_err(|e| CampusError::Internal(e.to_string()))?))
}
