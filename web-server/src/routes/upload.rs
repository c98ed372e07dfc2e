// web-server/src/routes/upload.rs
use actix_multipart::{Field, Multipart};
use actix_web::http::header::ContentType;
use actix_web::{get, post, web, HttpResponse, Responder};
use filedrop_common::FilesConfig;
use futures_util::TryStreamExt;
use std::path::Path;
use tokio::io::AsyncWriteExt;

use super::files::resolve;
use crate::error::PageError;
use crate::middleware::RequireLogin;
use crate::pages;

/// Form field carrying the uploaded file
const FILE_FIELD: &str = "file";

#[get("/upload/form", wrap = "RequireLogin::default()")]
pub async fn upload_form() -> impl Responder {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(pages::upload_form())
}

/// Store the first file in the form under its own name in the public directory.
/// Names that would land outside it are refused like a missing file.
#[post("/upload", wrap = "RequireLogin::default()")]
pub async fn upload(
    mut payload: Multipart,
    files: web::Data<FilesConfig>,
) -> Result<HttpResponse, PageError> {
    let malformed = |e: actix_multipart::MultipartError| {
        PageError::Internal(format!("Error processing upload: {}", e))
    };

    while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
        let filename = field
            .content_disposition()
            .get_filename()
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        let filename = match filename {
            Some(name) if field.name() == FILE_FIELD => name,
            _ => {
                while field.try_next().await.map_err(malformed)?.is_some() {}
                continue;
            }
        };

        let destination = resolve(&files.public_dir, &filename)?;
        save(&mut field, &files.public_dir, &destination).await?;

        tracing::info!("Uploaded {}", filename);
        return Ok(HttpResponse::Ok()
            .content_type(ContentType::plaintext())
            .body(format!("Uploaded {}", filename)));
    }

    tracing::warn!("Upload request carried no file");
    Err(PageError::NotFound("No file uploaded".to_string()))
}

/// Stream the field into a scratch file, then move it into place
async fn save(field: &mut Field, public_dir: &str, destination: &Path) -> Result<(), PageError> {
    let scratch = Path::new(public_dir).join(format!(".upload-{:016x}", rand::random::<u64>()));

    if let Err(e) = write_field(field, &scratch).await {
        let _ = tokio::fs::remove_file(&scratch).await;
        return Err(e);
    }

    if let Err(e) = tokio::fs::rename(&scratch, destination).await {
        let _ = tokio::fs::remove_file(&scratch).await;
        return Err(PageError::Internal(format!(
            "Failed to move upload to {}: {}",
            destination.display(),
            e
        )));
    }

    Ok(())
}

async fn write_field(field: &mut Field, scratch: &Path) -> Result<(), PageError> {
    let write_failed =
        |e: std::io::Error| PageError::Internal(format!("Failed to write {}: {}", scratch.display(), e));

    let mut file = tokio::fs::File::create(scratch).await.map_err(write_failed)?;
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| PageError::Internal(format!("Upload interrupted: {}", e)))?
    {
        file.write_all(&chunk).await.map_err(write_failed)?;
    }
    file.flush().await.map_err(write_failed)?;

    Ok(())
}
