use chrono::{DateTime, Utc};
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::utils::validation::{clean, parse_date, to_bson_date, to_iso};
use crate::utils::CampusError;

pub const MIN_POLL_OPTIONS: usize = 2;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PollOption {
    pub option_key: String,
    pub text: String,
    #[serde(default)]
    pub votes: i64,
}

/// One ballot. At most one per user, enforced by the vote filter.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PollVote {
    pub user: ObjectId,
    pub option_key: String,
}

/// Collection "polls"
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Poll {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub question: String,
    #[serde(default)]
    pub description: String,
    pub options: Vec<PollOption>,
    pub end_date: BsonDateTime,
    pub created_by: Option<ObjectId>,
    #[serde(default)]
    pub votes: Vec<PollVote>,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

impl Poll {
    pub fn has_user_voted(&self, user: &ObjectId) -> bool {
        self.votes.iter().any(|vote| &vote.user == user)
    }

    pub fn user_vote(&self, user: &ObjectId) -> Option<&str> {
        self.votes
            .iter()
            .find(|vote| &vote.user == user)
            .map(|vote| vote.option_key.as_str())
    }

    pub fn option(&self, key: &str) -> Option<&PollOption> {
        self.options.iter().find(|option| option.option_key == key)
    }

    /// Decides whether `user` may vote for `key`. A repeat voter is rejected
    /// before the option is looked at.
    pub fn check_vote(&self, user: &ObjectId, key: &str) -> Result<(), CampusError> {
        if self.has_user_voted(user) {
            return Err(CampusError::AlreadyVoted);
        }
        if self.option(key).is_none() {
            return Err(CampusError::InvalidOption);
        }
        Ok(())
    }

    pub fn total_votes(&self) -> usize {
        self.votes.len()
    }
}

#[derive(Debug, Deserialize, Clone, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeyedOptionInput {
    #[serde(alias = "option_key")]
    pub option_key: Option<String>,
    pub text: Option<String>,
}

/// Options may be sent as plain strings or as `{ optionKey, text }` objects.
#[derive(Debug, Deserialize, Clone, utoipa::ToSchema)]
#[serde(untagged)]
pub enum PollOptionInput {
    Text(String),
    Keyed(KeyedOptionInput),
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollRequest {
    pub question: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub options: Vec<PollOptionInput>,
    #[serde(alias = "end_date")]
    pub end_date: Option<String>,
}

impl CreatePollRequest {
    pub fn into_poll(self, creator: ObjectId, now: BsonDateTime) -> Result<Poll, CampusError> {
        let question = clean(self.question.as_deref())
            .ok_or_else(|| CampusError::validation("Question is required"))?;

        let options = prepare_options(self.options)?;

        let end_date: DateTime<Utc> = self
            .end_date
            .as_deref()
            .and_then(parse_date)
            .ok_or_else(|| CampusError::validation("A valid end date is required"))?;

        Ok(Poll {
            id: None,
            question,
            description: clean(self.description.as_deref()).unwrap_or_default(),
            options,
            end_date: to_bson_date(end_date),
            created_by: Some(creator),
            votes: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Drops blank options, assigns `option_<position>` keys where none was given
/// and rejects duplicate keys.
fn prepare_options(inputs: Vec<PollOptionInput>) -> Result<Vec<PollOption>, CampusError> {
    let mut seen = HashSet::new();
    let mut options = Vec::new();

    for (index, input) in inputs.into_iter().enumerate() {
        let (key, text) = match input {
            PollOptionInput::Text(text) => (None, clean(Some(&text))),
            PollOptionInput::Keyed(keyed) => (
                clean(keyed.option_key.as_deref()),
                clean(keyed.text.as_deref()),
            ),
        };

        let Some(text) = text else { continue };
        let option_key = key.unwrap_or_else(|| format!("option_{}", index + 1));

        if !seen.insert(option_key.clone()) {
            return Err(CampusError::Validation(format!("Duplicate poll option key '{}'", option_key)));
        }

        options.push(PollOption { option_key, text, votes: 0 });
    }

    if options.len() < MIN_POLL_OPTIONS {
        return Err(CampusError::validation("At least two poll options are required"));
    }

    Ok(options)
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    #[serde(alias = "option_key")]
    pub option_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollOptionResponse {
    pub option_key: String,
    pub text: String,
    pub votes: i64,
}

/// Poll as seen by one user: totals are computed, other users' ballots are not exposed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub question: String,
    pub description: String,
    pub options: Vec<PollOptionResponse>,
    pub end_date: String,
    pub created_by: Option<String>,
    pub total_votes: usize,
    pub user_vote: Option<String>,
    pub voted: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl PollResponse {
    pub fn for_user(poll: Poll, user: &ObjectId) -> Self {
        let user_vote = poll.user_vote(user).map(String::from);
        PollResponse {
            id: poll.id.map(|id| id.to_hex()).unwrap_or_default(),
            total_votes: poll.total_votes(),
            voted: user_vote.is_some(),
            user_vote,
            question: poll.question,
            description: poll.description,
            options: poll
                .options
                .into_iter()
                .map(|option| PollOptionResponse {
                    option_key: option.option_key,
                    text: option.text,
                    votes: option.votes,
                })
                .collect(),
            end_date: to_iso(poll.end_date),
            created_by: poll.created_by.map(|id| id.to_hex()),
            created_at: to_iso(poll.created_at),
            updated_at: to_iso(poll.updated_at),
        }
    }
}
