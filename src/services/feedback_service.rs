use crate::{
    database::{self, MongoDB},
    models::{Feedback, FeedbackResponse, Principal, RespondFeedbackRequest, Role, SubmitFeedbackRequest},
    utils::CampusError,
};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use mongodb::options::ReturnDocument;

pub async fn submit_feedback(
    db: &MongoDB,
    principal: &Principal,
    request: SubmitFeedbackRequest,
) -> Result<FeedbackResponse, CampusError> {
    let mut feedback = request.into_feedback(principal.id, BsonDateTime::now())?;

    let result = db
        .collection::<Feedback>(database::FEEDBACK)
        .insert_one(&feedback)
        .await?;
    feedback.id = result.inserted_id.as_object_id();

    log::info!("💬 Feedback submitted ({}) by {}", feedback.category, principal.email);
    Ok(FeedbackResponse::from(feedback))
}

/// Students see their own submissions; staff see everything.
pub async fn list_feedback(db: &MongoDB, principal: &Principal) -> Result<Vec<FeedbackResponse>, CampusError> {
    let filter = match principal.role {
        Role::Student => doc! { "submitted_by": principal.id },
        Role::Teacher | Role::Admin => doc! {},
    };

    let feedback: Vec<Feedback> = db
        .collection::<Feedback>(database::FEEDBACK)
        .find(filter)
        .sort(doc! { "submitted_at": -1 })
        .await?
        .try_collect()
        .await?;

    Ok(feedback.into_iter().map(FeedbackResponse::from).collect())
}

pub async fn respond_to_feedback(
    db: &MongoDB,
    principal: &Principal,
    id: ObjectId,
    request: RespondFeedbackRequest,
) -> Result<FeedbackResponse, CampusError> {
    let (response, status) = request.normalize()?;

    let feedback = db
        .collection::<Feedback>(database::FEEDBACK)
        .find_one_and_update(
            doc! { "_id": id },
            doc! {
                "$set": {
                    "response": response,
                    "status": status.as_str(),
                    "responded_by": principal.id,
                    "updated_at": BsonDateTime::now(),
                }
            },
        )
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| CampusError::not_found("Feedback"))?;

    log::info!("✅ Feedback {} marked {}", id, status);
    Ok(FeedbackResponse::from(feedback))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeedbackStatus;
    use crate::services::fixtures;

    fn wifi_complaint() -> SubmitFeedbackRequest {
        SubmitFeedbackRequest {
            category: Some("Infrastructure".into()),
            description: Some("Library wifi drops every hour".into()),
        }
    }

    #[actix_web::test]
    #[ignore] // requires MongoDB at MONGO_URI
    async fn test_students_see_only_their_feedback() {
        let db = database::test_db().await;
        let author = fixtures::student(&db).await;
        let bystander = fixtures::student(&db).await;
        let teacher = fixtures::teacher(&db).await;

        let submitted = submit_feedback(&db, &author, wifi_complaint()).await.unwrap();
        assert_eq!(submitted.status, FeedbackStatus::Submitted);

        let own = list_feedback(&db, &author).await.unwrap();
        assert!(own.iter().all(|f| f.submitted_by == author.id.to_hex()));
        assert!(own.iter().any(|f| f.id == submitted.id));

        let theirs = list_feedback(&db, &bystander).await.unwrap();
        assert!(theirs.iter().all(|f| f.id != submitted.id));

        let all = list_feedback(&db, &teacher).await.unwrap();
        assert!(all.iter().any(|f| f.id == submitted.id));
    }

    #[actix_web::test]
    #[ignore] // requires MongoDB at MONGO_URI
    async fn test_respond_defaults_to_in_review() {
        let db = database::test_db().await;
        let author = fixtures::student(&db).await;
        let teacher = fixtures::teacher(&db).await;

        let submitted = submit_feedback(&db, &author, wifi_complaint()).await.unwrap();
        let id = ObjectId::parse_str(&submitted.id).unwrap();

        let answered = respond_to_feedback(
            &db,
            &teacher,
            id,
            RespondFeedbackRequest { response: Some("Router replaced".into()), status: Some("bogus".into()) },
        )
        .await
        .unwrap();
        assert_eq!(answered.status, FeedbackStatus::InReview);
        assert_eq!(answered.responded_by, Some(teacher.id.to_hex()));

        let err = respond_to_feedback(
            &db,
            &teacher,
            ObjectId::new(),
            RespondFeedbackRequest { response: Some("Hi".into()), status: None },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CampusError::NotFound(_)));
    }
}
