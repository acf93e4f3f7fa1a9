use crate::{
    database::{self, MongoDB},
    models::{CreateResourceRequest, Principal, Resource, ResourceResponse, UpdateResourceRequest},
    utils::CampusError,
};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use mongodb::options::ReturnDocument;

pub async fn list_resources(db: &MongoDB) -> Result<Vec<ResourceResponse>, CampusError> {
    let resources: Vec<Resource> = db
        .collection::<Resource>(database::RESOURCES)
        .find(doc! {})
        .sort(doc! { "uploaded_at": -1 })
        .await?
        .try_collect()
        .await?;

    Ok(resources.into_iter().map(ResourceResponse::from).collect())
}

/// Counts a download with a server-side increment.
pub async fn record_download(db: &MongoDB, id: ObjectId) -> Result<ResourceResponse, CampusError> {
    let resource = db
        .collection::<Resource>(database::RESOURCES)
        .find_one_and_update(doc! { "_id": id }, doc! { "$inc": { "downloads": 1 } })
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| CampusError::not_found("Resource"))?;

    Ok(ResourceResponse::from(resource))
}

pub async fn create_resource(
    db: &MongoDB,
    principal: &Principal,
    request: CreateResourceRequest,
) -> Result<ResourceResponse, CampusError> {
    let mut resource = request.into_resource(principal, BsonDateTime::now())?;

    let result = db
        .collection::<Resource>(database::RESOURCES)
        .insert_one(&resource)
        .await?;
    resource.id = result.inserted_id.as_object_id();

    log::info!("📚 Resource uploaded: {} by {}", resource.title, principal.email);
    Ok(ResourceResponse::from(resource))
}

pub async fn update_own_resource(
    db: &MongoDB,
    principal: &Principal,
    id: ObjectId,
    request: UpdateResourceRequest,
) -> Result<ResourceResponse, CampusError> {
    let update = request.into_update(BsonDateTime::now())?;

    let resource = db
        .collection::<Resource>(database::RESOURCES)
        .find_one_and_update(doc! { "_id": id, "uploaded_by": principal.id }, update)
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| CampusError::not_found("Resource"))?;

    log::info!("✏️ Resource updated: {}", resource.title);
    Ok(ResourceResponse::from(resource))
}

pub async fn delete_own_resource(db: &MongoDB, principal: &Principal, id: ObjectId) -> Result<(), CampusError> {
    let resource = db
        .collection::<Resource>(database::RESOURCES)
        .find_one_and_delete(doc! { "_id": id, "uploaded_by": principal.id })
        .await?
        .ok_or_else(|| CampusError::not_found("Resource"))?;

    log::info!("🗑️ Resource deleted: {}", resource.title);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures;

    fn notes() -> CreateResourceRequest {
        CreateResourceRequest {
            title: Some("DBMS notes".into()),
            resource_type: Some("Notes".into()),
            department: Some("CSE".into()),
            semester: Some("5".into()),
            file_url: Some("https://files.example/dbms.pdf".into()),
        }
    }

    #[actix_web::test]
    #[ignore] // requires MongoDB at MONGO_URI
    async fn test_download_counter_increments() {
        let db = database::test_db().await;
        let teacher = fixtures::teacher(&db).await;

        let resource = create_resource(&db, &teacher, notes()).await.unwrap();
        assert_eq!(resource.uploader_name, teacher.name);
        let id = ObjectId::parse_str(&resource.id).unwrap();

        record_download(&db, id).await.unwrap();
        let counted = record_download(&db, id).await.unwrap();
        assert_eq!(counted.downloads, 2);

        assert!(matches!(record_download(&db, ObjectId::new()).await, Err(CampusError::NotFound(_))));
    }

    #[actix_web::test]
    #[ignore] // requires MongoDB at MONGO_URI
    async fn test_only_uploader_can_modify_resource() {
        let db = database::test_db().await;
        let owner = fixtures::teacher(&db).await;
        let other = fixtures::teacher(&db).await;

        let resource = create_resource(&db, &owner, notes()).await.unwrap();
        let id = ObjectId::parse_str(&resource.id).unwrap();
        let retitle = || UpdateResourceRequest { title: Some("OS notes".into()), ..Default::default() };

        let err = update_own_resource(&db, &other, id, retitle()).await.unwrap_err();
        assert!(matches!(err, CampusError::NotFound(_)));

        let blank = UpdateResourceRequest { semester: Some("  ".into()), ..Default::default() };
        let err = update_own_resource(&db, &owner, id, blank).await.unwrap_err();
        assert!(matches!(err, CampusError::Validation(_)));

        let updated = update_own_resource(&db, &owner, id, retitle()).await.unwrap();
        assert_eq!(updated.title, "OS notes");

        assert!(delete_own_resource(&db, &other, id).await.is_err());
        delete_own_resource(&db, &owner, id).await.unwrap();
    }
}
