use crate::{
    database::{self, MongoDB},
    models::{CreatePollRequest, Poll, PollResponse, Principal},
    utils::CampusError,
};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use mongodb::options::ReturnDocument;

pub async fn list_polls(db: &MongoDB, principal: &Principal) -> Result<Vec<PollResponse>, CampusError> {
    let polls: Vec<Poll> = db
        .collection::<Poll>(database::POLLS)
        .find(doc! {})
        .sort(doc! { "created_at": -1 })
        .await?
        .try_collect()
        .await?;

    Ok(polls.into_iter().map(|poll| PollResponse::for_user(poll, &principal.id)).collect())
}

pub async fn create_poll(
    db: &MongoDB,
    principal: &Principal,
    request: CreatePollRequest,
) -> Result<PollResponse, CampusError> {
    let mut poll = request.into_poll(principal.id, BsonDateTime::now())?;

    let result = db.collection::<Poll>(database::POLLS).insert_one(&poll).await?;
    poll.id = result.inserted_id.as_object_id();

    log::info!("🗳️ Poll created: {}", poll.question);
    Ok(PollResponse::for_user(poll, &principal.id))
}

/// Records one vote.
///
/// The filter only matches while the caller has no ballot on the poll and the
/// option exists, and the counter increment and the ballot append happen in
/// the same document update. Two concurrent votes by one user cannot both match.
pub async fn vote(
    db: &MongoDB,
    principal: &Principal,
    poll_id: ObjectId,
    option_key: Option<&str>,
) -> Result<PollResponse, CampusError> {
    let option_key = option_key
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| CampusError::validation("Option key is required"))?;

    let polls = db.collection::<Poll>(database::POLLS);

    let updated = polls
        .find_one_and_update(
            doc! {
                "_id": poll_id,
                "votes.user": { "$ne": principal.id },
                "options.option_key": option_key,
            },
            doc! {
                "$inc": { "options.$.votes": 1 },
                "$push": { "votes": { "user": principal.id, "option_key": option_key } },
                "$set": { "updated_at": BsonDateTime::now() },
            },
        )
        .return_document(ReturnDocument::After)
        .await?;

    if let Some(poll) = updated {
        log::info!("🗳️ {} voted '{}' on poll {}", principal.email, option_key, poll_id);
        return Ok(PollResponse::for_user(poll, &principal.id));
    }

    // Nothing matched: work out which rule rejected the vote.
    let poll = polls
        .find_one(doc! { "_id": poll_id })
        .await?
        .ok_or_else(|| CampusError::not_found("Poll"))?;

    poll.check_vote(&principal.id, option_key)?;

    // The poll changed between the two reads.
    Err(CampusError::Conflict("Poll changed while voting, please retry".to_string()))
}
