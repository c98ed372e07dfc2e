// web-server/src/routes/files.rs
use actix_files::NamedFile;
use actix_web::http::header::{ContentDisposition, ContentType, DispositionParam, DispositionType};
use actix_web::{get, web, HttpRequest, HttpResponse};
use filedrop_common::error::StoreError;
use filedrop_common::models::counter::CounterSnapshot;
use filedrop_common::models::CounterKind;
use filedrop_common::store::CounterRepository;
use filedrop_common::FilesConfig;
use std::path::{Path, PathBuf};

use crate::error::PageError;
use crate::middleware::RequireLogin;
use crate::pages;

/// Map a requested name onto a file directly inside the public directory.
/// Anything that could step outside it is treated as missing.
pub(super) fn resolve(public_dir: &str, filename: &str) -> Result<PathBuf, PageError> {
    let escapes = filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains(|c: char| c == '/' || c == '\\' || c == '\0');

    if escapes {
        tracing::warn!("Rejected file name: {:?}", filename);
        return Err(PageError::NotFound(filename.to_string()));
    }

    Ok(Path::new(public_dir).join(filename))
}

async fn open_file(path: &Path, filename: &str) -> Result<NamedFile, PageError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => {}
        _ => return Err(PageError::NotFound(filename.to_string())),
    }

    NamedFile::open_async(path)
        .await
        .map_err(|_| PageError::NotFound(filename.to_string()))
}

fn disposition(disposition: DispositionType, filename: String) -> ContentDisposition {
    ContentDisposition {
        disposition,
        parameters: vec![DispositionParam::Filename(filename)],
    }
}

async fn snapshot(counters: &dyn CounterRepository) -> Result<CounterSnapshot, PageError> {
    let read = |e: StoreError| PageError::Internal(format!("Counter lookup failed: {}", e));
    Ok(CounterSnapshot {
        previews: counters.get(CounterKind::Preview).await.map_err(read)?,
        downloads: counters.get(CounterKind::Download).await.map_err(read)?,
    })
}

#[get("/files", wrap = "RequireLogin::default()")]
pub async fn list_files(
    files: web::Data<FilesConfig>,
    counters: web::Data<dyn CounterRepository>,
) -> Result<HttpResponse, PageError> {
    let unreadable = |e: std::io::Error| {
        PageError::Internal(format!("Cannot read {}: {}", files.public_dir, e))
    };

    let mut entries = tokio::fs::read_dir(&files.public_dir).await.map_err(unreadable)?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(unreadable)? {
        let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
        if is_file {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();

    let counts = snapshot(counters.get_ref()).await?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(pages::file_list(&names, counts)))
}

#[get("/files/{filename}", wrap = "RequireLogin::default()")]
pub async fn download(
    req: HttpRequest,
    path: web::Path<String>,
    files: web::Data<FilesConfig>,
    counters: web::Data<dyn CounterRepository>,
) -> Result<HttpResponse, PageError> {
    let filename = path.into_inner();
    let file_path = resolve(&files.public_dir, &filename)?;
    let file = open_file(&file_path, &filename).await?;

    let total = counters
        .increment(CounterKind::Download)
        .await
        .map_err(|e| PageError::Internal(format!("Failed to count download: {}", e)))?;
    tracing::info!("Serving download {} ({} total)", filename, total);

    Ok(file
        .set_content_disposition(disposition(DispositionType::Attachment, filename))
        .into_response(&req))
}

#[get("/preview/{filename}", wrap = "RequireLogin::default()")]
pub async fn preview(
    req: HttpRequest,
    path: web::Path<String>,
    files: web::Data<FilesConfig>,
) -> Result<HttpResponse, PageError> {
    let filename = path.into_inner();
    let file_path = resolve(&files.public_dir, &filename)?;
    let file = open_file(&file_path, &filename).await?;

    Ok(file
        .set_content_disposition(disposition(DispositionType::Inline, filename))
        .into_response(&req))
}
