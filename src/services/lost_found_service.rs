use actix_multipart::{Field, Multipart};
use chrono::Utc;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use mongodb::options::ReturnDocument;
use std::path::{Path, PathBuf};

use crate::{
    config::AppConfig,
    database::{self, MongoDB},
    models::{LostItem, LostItemForm, LostItemResponse, Principal, UpdateLostStatusRequest},
    utils::CampusError,
};

pub const IMAGE_FIELD: &str = "image";
pub const PUBLIC_PREFIX: &str = "/uploads/lost-found";

/// Image part held in memory until the rest of the form has been validated.
#[derive(Debug)]
pub struct PendingImage {
    pub extension: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct LostItemReport {
    pub form: LostItemForm,
    pub image: Option<PendingImage>,
}

pub async fn list_lost_items(db: &MongoDB) -> Result<Vec<LostItemResponse>, CampusError> {
    let items: Vec<LostItem> = db
        .collection::<LostItem>(database::LOST_ITEMS)
        .find(doc! {})
        .sort(doc! { "created_at": -1 })
        .await?
        .try_collect()
        .await?;

    Ok(items.into_iter().map(LostItemResponse::from).collect())
}

/// Reads every part of the report form. Text parts go to the form, the
/// `image` part must be an image of at most `max_bytes`.
pub async fn read_report(mut payload: Multipart, max_bytes: usize) -> Result<LostItemReport, CampusError> {
    let mut report = LostItemReport::default();

    while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
        let Some(name) = field.name().map(String::from) else {
            continue;
        };

        let bytes = read_limited(&mut field, max_bytes).await?;

        if name == IMAGE_FIELD {
            // Browsers send an empty part when no file was picked.
            if bytes.is_empty() {
                continue;
            }
            report.image = Some(PendingImage {
                extension: image_extension(&field)?,
                bytes,
            });
        } else {
            let value = String::from_utf8(bytes)
                .map_err(|_| CampusError::Validation(format!("Field '{}' is not valid text", name)))?;
            report.form.set(&name, value);
        }
    }

    Ok(report)
}

async fn read_limited(field: &mut Field, max_bytes: usize) -> Result<Vec<u8>, CampusError> {
    let mut buffer = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(malformed)? {
        if buffer.len() + chunk.len() > max_bytes {
            return Err(CampusError::validation("File too large"));
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer)
}

fn malformed(err: actix_multipart::MultipartError) -> CampusError {
    log::warn!("⚠️ Malformed multipart body: {}", err);
    CampusError::validation("Malformed form data")
}

/// Extension (with the dot) for a stored image: the client file name's when it
/// has a usable one, otherwise the MIME subtype.
fn image_extension(field: &Field) -> Result<String, CampusError> {
    let content_type = field
        .content_type()
        .filter(|mime| mime.type_() == mime::IMAGE)
        .ok_or_else(|| CampusError::validation("Only image uploads are allowed"))?;

    let from_name = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    let extension = from_name.unwrap_or_else(|| {
        content_type
            .subtype()
            .as_str()
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect()
    });

    Ok(format!(".{}", extension))
}

fn stored_file_name(extension: &str) -> String {
    format!("{}-{}{}", Utc::now().timestamp_millis(), uuid::Uuid::new_v4(), extension)
}

/// Validates the report, writes the image (if any) and stores the item. The
/// image file is removed again when the insert fails.
pub async fn create_lost_item(
    db: &MongoDB,
    config: &AppConfig,
    principal: &Principal,
    report: LostItemReport,
) -> Result<LostItemResponse, CampusError> {
    let LostItemReport { form, image } = report;
    form.validate()?;

    let saved: Option<(PathBuf, String)> = match image {
        Some(image) => {
            let dir = config.lost_found_dir();
            tokio::fs::create_dir_all(&dir).await?;

            let file_name = stored_file_name(&image.extension);
            let path = dir.join(&file_name);
            tokio::fs::write(&path, &image.bytes).await?;
            log::info!("🖼️ Stored lost-and-found image {} ({} bytes)", file_name, image.bytes.len());

            Some((path, format!("{}/{}", PUBLIC_PREFIX, file_name)))
        }
        None => None,
    };

    let public_url = saved.as_ref().map(|(_, url)| url.clone());
    let mut item = form.into_item(Some(principal.id), public_url, BsonDateTime::now())?;

    let inserted = db.collection::<LostItem>(database::LOST_ITEMS).insert_one(&item).await;
    let result = match inserted {
        Ok(result) => result,
        Err(e) => {
            if let Some((path, _)) = saved {
                if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                    log::warn!("⚠️ Could not remove orphaned upload {}: {}", path.display(), remove_err);
                }
            }
            return Err(e.into());
        }
    };
    item.id = result.inserted_id.as_object_id();

    log::info!("🔎 Lost item reported: {} ({})", item.title, item.status);
    Ok(LostItemResponse::from(item))
}

pub async fn update_status(
    db: &MongoDB,
    id: ObjectId,
    request: UpdateLostStatusRequest,
) -> Result<LostItemResponse, CampusError> {
    let status = request.status()?;

    let item = db
        .collection::<LostItem>(database::LOST_ITEMS)
        .find_one_and_update(
            doc! { "_id": id },
            doc! { "$set": { "status": status.as_str(), "updated_at": BsonDateTime::now() } },
        )
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| CampusError::not_found("Item"))?;

    log::info!("🔎 Lost item {} marked {}", id, status);
    Ok(LostItemResponse::from(item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_UPLOAD_BYTES;
    use actix_web::error::PayloadError;
    use actix_web::http::header::{self, HeaderMap, HeaderValue};
    use actix_web::web::Bytes;

    const BOUNDARY: &str = "campusboundary";

    fn text_part(name: &str, value: &str) -> String {
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{n}\"\r\n\r\n{v}\r\n",
            b = BOUNDARY,
            n = name,
            v = value
        )
    }

    fn file_part(filename: &str, content_type: &str, body: &str) -> String {
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{f}\"\r\nContent-Type: {c}\r\n\r\n{body}\r\n",
            b = BOUNDARY,
            f = filename,
            c = content_type,
            body = body
        )
    }

    fn multipart(parts: &[String]) -> Multipart {
        let mut body = parts.concat();
        body.push_str(&format!("--{}--\r\n", BOUNDARY));

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_str(&format!("multipart/form-data; boundary={}", BOUNDARY)).unwrap(),
        );
        let stream = futures::stream::once(async move { Ok::<Bytes, PayloadError>(Bytes::from(body)) });
        Multipart::new(&headers, stream)
    }

    fn report_fields() -> Vec<String> {
        vec![
            text_part("title", "Blue bottle"),
            text_part("description", "Steel, with stickers"),
            text_part("location", "Library"),
            text_part("studentId", "2100031234"),
        ]
    }

    #[actix_web::test]
    async fn test_read_report_collects_fields_and_image() {
        let mut parts = report_fields();
        parts.push(file_part("Bottle.PNG", "image/png", "fakepng"));

        let report = read_report(multipart(&parts), MAX_UPLOAD_BYTES).await.unwrap();
        assert_eq!(report.form.title.as_deref(), Some("Blue bottle"));
        assert_eq!(report.form.student_id.as_deref(), Some("2100031234"));
        assert!(report.form.validate().is_ok());

        let image = report.image.unwrap();
        assert_eq!(image.extension, ".png");
        assert_eq!(image.bytes, b"fakepng");
    }

    #[actix_web::test]
    async fn test_non_image_upload_rejected() {
        let mut parts = report_fields();
        parts.push(file_part("notes.pdf", "application/pdf", "%PDF"));

        let err = read_report(multipart(&parts), MAX_UPLOAD_BYTES).await.unwrap_err();
        assert_eq!(err.to_string(), "Only image uploads are allowed");
    }

    #[actix_web::test]
    async fn test_oversized_upload_rejected() {
        let mut parts = report_fields();
        parts.push(file_part("big.jpg", "image/jpeg", &"x".repeat(64)));

        let err = read_report(multipart(&parts), 32).await.unwrap_err();
        assert_eq!(err.to_string(), "File too large");
    }

    #[actix_web::test]
    async fn test_short_student_id_rejected_before_storage() {
        let parts = vec![
            text_part("title", "Keys"),
            text_part("description", "Bike keys"),
            text_part("location", "Parking"),
            text_part("studentId", "12345"),
        ];
        let report = read_report(multipart(&parts), MAX_UPLOAD_BYTES).await.unwrap();

        let db = database::offline_db().await;
        let config = crate::config::test_config();
        let principal = crate::services::fixtures::principal(crate::models::Role::Student);
        let err = create_lost_item(&db, &config, &principal, report).await.unwrap_err();
        assert_eq!(err.to_string(), "Student ID must be a 10-digit number");
    }

    #[test]
    fn test_stored_file_name_shape() {
        let name = stored_file_name(".jpg");
        let (millis, rest) = name.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert!(rest.ends_with(".jpg"));
    }

    #[actix_web::test]
    #[ignore] // requires MongoDB at MONGO_URI
    async fn test_status_update() {
        let db = database::test_db().await;
        let config = crate::config::test_config();
        let principal = crate::services::fixtures::principal(crate::models::Role::Student);

        let report = read_report(multipart(&report_fields()), MAX_UPLOAD_BYTES).await.unwrap();
        let item = create_lost_item(&db, &config, &principal, report).await.unwrap();
        assert_eq!(item.category, "Others");
        let id = ObjectId::parse_str(&item.id).unwrap();

        let found = update_status(&db, id, UpdateLostStatusRequest { status: Some("found".into()) })
            .await
            .unwrap();
        assert_eq!(found.status, crate::models::LostStatus::Found);

        let err = update_status(&db, id, UpdateLostStatusRequest { status: Some("gone".into()) })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid status");

        let err = update_status(&db, ObjectId::new(), UpdateLostStatusRequest { status: Some("claimed".into()) })
            .await
            .unwrap_err();
        assert!(matches!(err, CampusError::NotFound(_)));
    }
}
