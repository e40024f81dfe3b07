use hyper::{Body, Method, Response, StatusCode};

use crate::api::{self, Uploaded};
use crate::context::Config;
use crate::cors;
use crate::error::AppError;
use crate::manifest::Manifest;
use crate::media::{unique_file_name, UploadForm};
use crate::store::{ContentStore, StoreError, UpdateOutcome};
use crate::utils::now_millis;

/// Answer one request. Never fails: every error becomes a JSON response.
pub async fn handle(req: api::Request, config: &Config, store: &dyn ContentStore) -> Response<Body> {
    if req.method() == Method::OPTIONS {
        return cors::preflight();
    }
    let response = upload(req, config, store, now_millis()).await.unwrap_or_else(|e| {
        if e.is_internal() {
            log::error!("Upload error: {:?}", e);
        } else {
            log::debug!("Rejected upload: {}", e);
        }
        api::error_response(&e, config.expose_error_details)
    });
    cors::allow_origin(response)
}

async fn upload(req: api::Request, config: &Config, store: &dyn ContentStore, now: i64) -> api::Result {
    if req.method() != Method::POST {
        return Err(AppError::MethodNotAllowed);
    }
    if config.token.is_none() {
        return Err(AppError::MissingToken);
    }
    if !api::is_json(req.headers()) {
        return Err(AppError::BadRequest(format!("Content-Type must be application/json")));
    }
    let form: UploadForm = api::parse_body(req, config.max_body_size).await?;
    let upload = form.validate()?;
    let unique_name = unique_file_name(now, &upload.file_name);
    log::info!("uploading {} as {} ({:?})", unique_name, upload.file_type, upload.kind);

    let message = format!("Add upload: {}", unique_name);
    match store.create_file(&unique_name, &upload.file_content, &message).await {
        Ok(()) => {}
        Err(e @ StoreError::Transport(_)) => return Err(e.into()),
        Err(e) => {
            log::error!("Content store upload error: {}", e);
            return Err(AppError::Upstream {
                message: "Failed to upload file to the content store",
                details: e.provider_body(),
            });
        }
    }

    let (mut manifest, sha) = match store.read_file(&config.manifest_path).await {
        Ok(Some(file)) => (Manifest::decode(&file.content)?, Some(file.sha)),
        Ok(None) => (Manifest::default(), None),
        Err(e @ StoreError::Transport(_)) => return Err(e.into()),
        Err(e) => {
            log::warn!("Failed to fetch the manifest, starting from an empty one: {}", e);
            (Manifest::default(), None)
        }
    };
    manifest.push(upload.kind, unique_name.clone());

    let content = manifest.encode()?;
    let message = format!("Update gallery manifest: add {}", unique_name);
    let updated = store
        .update_file(&config.manifest_path, &content, sha.as_deref(), &message)
        .await;
    match updated {
        Ok(UpdateOutcome::Updated) => api::json(StatusCode::OK, &Uploaded::new(unique_name)),
        Ok(UpdateOutcome::Conflict) => {
            log::warn!("Manifest changed concurrently, {} is not listed", unique_name);
            api::json(StatusCode::OK, &Uploaded::manifest_stale(unique_name))
        }
        Err(e) => {
            log::error!("Manifest update error: {}", e);
            api::json(StatusCode::OK, &Uploaded::manifest_stale(unique_name))
        }
    }
}
