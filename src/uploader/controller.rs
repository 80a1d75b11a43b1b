use actix_multipart::Multipart;
use actix_web::{HttpMessage, HttpRequest, HttpResponse};
use futures_util::StreamExt;
use serde_json::json;
use uuid::Uuid;

use crate::middleware::auth::AuthContext;
use crate::utils::error::ApiError;
use crate::utils::file::clear_image;

pub const IMAGES_DIR: &str = "images";

const ACCEPTED_MIME_TYPES: [&str; 3] = ["image/png", "image/jpg", "image/jpeg"];

pub fn is_accepted_image(mime: &str) -> bool {
    ACCEPTED_MIME_TYPES.contains(&mime)
}

fn image_extension(mime: &str) -> &'static str {
    if mime == "image/png" { "png" } else { "jpg" }
}

/// Single-file image upload, out of band from the query/mutation endpoint.
/// PUT /post-image
pub async fn upload_image(req: HttpRequest, mut payload: Multipart) -> Result<HttpResponse, ApiError> {
    let auth = req
        .extensions()
        .get::<AuthContext>()
        .cloned()
        .unwrap_or_else(AuthContext::anonymous);
    if !auth.is_auth() {
        return Err(ApiError::Unauthorized("Not authenticated!".to_string()));
    }

    let mut file_path: Option<String> = None;
    let mut old_path: Option<String> = None;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| ApiError::Internal(format!("Error reading multipart field: {}", e)))?;

        let field_name = match field.content_disposition().and_then(|cd| cd.get_name()) {
            Some(name) => name.to_string(),
            None => continue,
        };
        let content_type = field.content_type().map(|ct| ct.essence_str().to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|e| ApiError::Internal(format!("Error reading file chunk: {}", e)))?;
            data.extend_from_slice(&chunk);
        }

        match field_name.as_str() {
            "image" => {
                // A file of any other type is dropped from the request, not
                // answered with an error.
                let Some(mime) = content_type.filter(|ct| is_accepted_image(ct)) else {
                    continue;
                };
                if data.is_empty() || file_path.is_some() {
                    continue;
                }

                let stored = format!("{}/{}.{}", IMAGES_DIR, Uuid::new_v4(), image_extension(&mime));
                tokio::fs::write(&stored, &data)
                    .await
                    .map_err(|e| ApiError::Internal(format!("Failed to store image: {}", e)))?;
                file_path = Some(stored);
            }
            "oldPath" => {
                old_path = String::from_utf8(data).ok().filter(|p| !p.is_empty());
            }
            _ => {}
        }
    }

    let Some(file_path) = file_path else {
        return Ok(HttpResponse::Ok().json(json!({ "message": "No image provided!" })));
    };

    // Replacing an image orphans the previous file; clean it up best-effort.
    if let Some(old_path) = old_path {
        clear_image(&old_path).await;
    }

    Ok(HttpResponse::Created().json(json!({
        "message": "Image stored.",
        "filePath": file_path,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::{AuthGate, issue_token};
    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};

    #[::core::prelude::v1::test]
    fn only_png_and_jpeg_are_accepted() {
        assert!(is_accepted_image("image/png"));
        assert!(is_accepted_image("image/jpg"));
        assert!(is_accepted_image("image/jpeg"));
        assert!(!is_accepted_image("image/gif"));
        assert!(!is_accepted_image("text/html"));
    }

    fn multipart_body(mime: &str, filename: &str) -> (String, Vec<u8>) {
        let boundary = "----test-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\n\
             Content-Type: {mime}\r\n\r\n\
             not really pixels\r\n\
             --{boundary}--\r\n"
        );
        (
            format!("multipart/form-data; boundary={boundary}"),
            body.into_bytes(),
        )
    }

    async fn put_upload(mime: &str, filename: &str, token: Option<String>) -> (StatusCode, serde_json::Value) {
        let app = test::init_service(
            App::new()
                .wrap(AuthGate)
                .route("/post-image", web::put().to(upload_image)),
        )
        .await;

        let (content_type, body) = multipart_body(mime, filename);
        let mut req = test::TestRequest::put()
            .uri("/post-image")
            .insert_header(("content-type", content_type))
            .set_payload(body);
        if let Some(token) = token {
            req = req.insert_header(("authorization", format!("Bearer {token}")));
        }

        let resp = test::call_service(&app, req.to_request()).await;
        let status = resp.status();
        let body: serde_json::Value = test::read_body_json(resp).await;
        (status, body)
    }

    fn token() -> String {
        issue_token("64f000000000000000000001", "reader@example.com").unwrap()
    }

    #[actix_web::test]
    async fn anonymous_upload_is_unauthorized() {
        let (status, body) = put_upload("image/png", "a.png", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], 401);
    }

    #[actix_web::test]
    async fn gif_upload_succeeds_without_a_path() {
        let (status, body) = put_upload("image/gif", "a.gif", Some(token())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "No image provided!");
        assert!(body.get("filePath").is_none());
    }

    #[actix_web::test]
    async fn png_upload_lands_under_the_images_prefix() {
        std::fs::create_dir_all(IMAGES_DIR).unwrap();

        let (status, body) = put_upload("image/png", "a.png", Some(token())).await;
        assert_eq!(status, StatusCode::CREATED);

        let stored = body["filePath"].as_str().unwrap();
        assert!(stored.starts_with("images/"));
        assert!(std::path::Path::new(stored).exists());

        std::fs::remove_file(stored).unwrap();
    }
}
