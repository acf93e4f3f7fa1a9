use crate::{
    database::{self, MongoDB},
    models::{Announcement, AnnouncementResponse, CreateAnnouncementRequest, Principal},
    utils::CampusError,
};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};

/// Pinned announcements first, then newest.
pub async fn list_announcements(db: &MongoDB) -> Result<Vec<AnnouncementResponse>, CampusError> {
    let announcements: Vec<Announcement> = db
        .collection::<Announcement>(database::ANNOUNCEMENTS)
        .find(doc! {})
        .sort(doc! { "is_pinned": -1, "posted_at": -1 })
        .await?
        .try_collect()
        .await?;

    Ok(announcements.into_iter().map(AnnouncementResponse::from).collect())
}

pub async fn create_announcement(
    db: &MongoDB,
    principal: &Principal,
    request: CreateAnnouncementRequest,
) -> Result<AnnouncementResponse, CampusError> {
    let mut announcement = request.into_announcement(&principal.name, BsonDateTime::now())?;

    let result = db
        .collection::<Announcement>(database::ANNOUNCEMENTS)
        .insert_one(&announcement)
        .await?;
    announcement.id = result.inserted_id.as_object_id();

    log::info!("📢 Announcement posted: {}", announcement.title);
    Ok(AnnouncementResponse::from(announcement))
}

pub async fn delete_announcement(db: &MongoDB, id: ObjectId) -> Result<(), CampusError> {
    let result = db
        .collection::<Announcement>(database::ANNOUNCEMENTS)
        .delete_one(doc! { "_id": id })
        .await?;

    if result.deleted_count == 0 {
        return Err(CampusError::not_found("Announcement"));
    }

    log::info!("🗑️ Announcement deleted: {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::services::fixtures;

    fn notice(title: &str, pinned: bool) -> CreateAnnouncementRequest {
        CreateAnnouncementRequest {
            title: Some(title.to_string()),
            content: Some("Details inside".into()),
            category: None,
            is_pinned: pinned,
        }
    }

    #[actix_web::test]
    #[ignore] // requires MongoDB at MONGO_URI
    async fn test_pinned_listed_before_newer() {
        let db = database::test_db().await;
        let admin = fixtures::principal(Role::Admin);
        let tag = ObjectId::new().to_hex();

        let pinned = create_announcement(&db, &admin, notice(&format!("Pinned {}", tag), true))
            .await
            .unwrap();
        let latest = create_announcement(&db, &admin, notice(&format!("Latest {}", tag), false))
            .await
            .unwrap();
        assert_eq!(pinned.posted_by, admin.name);
        assert_eq!(latest.category, "General");

        let listed = list_announcements(&db).await.unwrap();
        let position = |id: &str| listed.iter().position(|a| a.id == id).unwrap();
        assert!(position(&pinned.id) < position(&latest.id));

        let id = ObjectId::parse_str(&latest.id).unwrap();
        delete_announcement(&db, id).await.unwrap();
        assert!(matches!(delete_announcement(&db, id).await, Err(CampusError::NotFound(_))));
    }
}
