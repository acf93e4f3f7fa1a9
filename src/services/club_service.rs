use crate::{
    database::{self, MongoDB},
    models::{Club, ClubResponse, CreateClubRequest, Principal, Role, StudentProfile},
    utils::{error::is_duplicate_key, CampusError},
};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use mongodb::options::ReturnDocument;
use std::collections::HashSet;

const DUPLICATE_CLUB: &str = "A club with this name already exists";

/// All clubs; `joined` is set from the caller's student profile.
pub async fn list_clubs(db: &MongoDB, principal: &Principal) -> Result<Vec<ClubResponse>, CampusError> {
    let joined = if principal.role == Role::Student {
        joined_club_ids(db, principal.id).await?
    } else {
        HashSet::new()
    };

    let clubs: Vec<Club> = db
        .collection::<Club>(database::CLUBS)
        .find(doc! {})
        .sort(doc! { "name": 1 })
        .await?
        .try_collect()
        .await?;

    Ok(clubs.into_iter().map(|club| ClubResponse::from_club(club, &joined)).collect())
}

async fn joined_club_ids(db: &MongoDB, user: ObjectId) -> Result<HashSet<ObjectId>, CampusError> {
    let profile = db
        .collection::<StudentProfile>(database::STUDENTS)
        .find_one(doc! { "user": user })
        .await?;

    Ok(profile.map(|p| p.joined_clubs.into_iter().collect()).unwrap_or_default())
}

pub async fn create_club(db: &MongoDB, request: CreateClubRequest) -> Result<ClubResponse, CampusError> {
    let mut club = request.into_club(BsonDateTime::now())?;
    let collection = db.collection::<Club>(database::CLUBS);

    if collection.find_one(doc! { "name": &club.name }).await?.is_some() {
        return Err(CampusError::Conflict(DUPLICATE_CLUB.to_string()));
    }

    let result = collection.insert_one(&club).await.map_err(|e| {
        if is_duplicate_key(&e) {
            CampusError::Conflict(DUPLICATE_CLUB.to_string())
        } else {
            e.into()
        }
    })?;
    club.id = result.inserted_id.as_object_id();

    log::info!("✅ Club created: {}", club.name);
    Ok(ClubResponse::from_club(club, &HashSet::new()))
}

/// Removes the club and every student's reference to it.
pub async fn delete_club(db: &MongoDB, club_id: ObjectId) -> Result<(), CampusError> {
    let deleted = db
        .collection::<Club>(database::CLUBS)
        .find_one_and_delete(doc! { "_id": club_id })
        .await?
        .ok_or_else(|| CampusError::not_found("Club"))?;

    let cleaned = db
        .collection::<Document>(database::STUDENTS)
        .update_many(doc! { "joined_clubs": club_id }, doc! { "$pull": { "joined_clubs": club_id } })
        .await?;

    log::info!("🗑️ Club deleted: {} ({} memberships removed)", deleted.name, cleaned.modified_count);
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Join,
    Leave,
}

impl Membership {
    fn operator(self) -> &'static str {
        match self {
            Membership::Join => "$addToSet",
            Membership::Leave => "$pull",
        }
    }

    fn reverse(self) -> Membership {
        match self {
            Membership::Join => Membership::Leave,
            Membership::Leave => Membership::Join,
        }
    }
}

fn membership_update(action: Membership, field: &str, id: ObjectId) -> Document {
    let mut target = Document::new();
    target.insert(field, id);

    let mut update = Document::new();
    update.insert(action.operator(), target);
    update.insert("$set", doc! { "updated_at": BsonDateTime::now() });
    update
}

/// Adds or removes the student on both sides of the membership.
///
/// Both writes are set operations, so repeating a join or a leave changes
/// nothing. When the student side fails after the club side changed, the club
/// write is reverted and the error is returned.
pub async fn toggle_membership(
    db: &MongoDB,
    principal: &Principal,
    club_id: ObjectId,
    action: Membership,
) -> Result<ClubResponse, CampusError> {
    let students = db.collection::<Document>(database::STUDENTS);
    let clubs = db.collection::<Club>(database::CLUBS);

    if students.find_one(doc! { "user": principal.id }).await?.is_none() {
        return Err(CampusError::not_found("Student profile"));
    }

    let before = clubs
        .find_one_and_update(
            doc! { "_id": club_id },
            membership_update(action, "members", principal.id),
        )
        .return_document(ReturnDocument::Before)
        .await?
        .ok_or_else(|| CampusError::not_found("Club"))?;

    let was_member = before.has_member(&principal.id);
    let club_changed = match action {
        Membership::Join => !was_member,
        Membership::Leave => was_member,
    };

    let student_write = students
        .update_one(
            doc! { "user": principal.id },
            membership_update(action, "joined_clubs", club_id),
        )
        .await;

    if let Err(e) = student_write {
        if club_changed {
            let revert = membership_update(action.reverse(), "members", principal.id);
            if let Err(revert_err) = clubs.update_one(doc! { "_id": club_id }, revert).await {
                log::error!("❌ Club {} membership left inconsistent: {}", club_id, revert_err);
            }
        }
        return Err(e.into());
    }

    let mut club = before;
    match action {
        Membership::Join if !was_member => club.members.push(principal.id),
        Membership::Leave => club.members.retain(|member| member != &principal.id),
        _ => {}
    }

    let joined: HashSet<ObjectId> = match action {
        Membership::Join => [club_id].into_iter().collect(),
        Membership::Leave => HashSet::new(),
    };

    log::info!("👥 {} {:?} club {}", principal.email, action, club.name);
    Ok(ClubResponse::from_club(club, &joined))
}
