//! Image Upload Handler
//!
//! Accepts one multipart field named `image`, checks size and format from
//! the bytes themselves, and forwards it to Cloudinary.

use axum::extract::{Multipart, State};
use image::ImageFormat;

use crate::api::ApiResult;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::UploadedImage;
use shared::{ApiResponse, AppError, ErrorCode};

/// Maximum file size (5MB)
const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Multipart field carrying the file
const FIELD_NAME: &str = "image";

/// Detected format as (extension, mime type)
fn sniff_format(data: &[u8]) -> Result<(&'static str, &'static str), AppError> {
    match image::guess_format(data) {
        Ok(ImageFormat::Png) => Ok(("png", "image/png")),
        Ok(ImageFormat::Jpeg) => Ok(("jpg", "image/jpeg")),
        Ok(ImageFormat::WebP) => Ok(("webp", "image/webp")),
        _ => Err(AppError::with_message(
            ErrorCode::UnsupportedFileFormat,
            "Unsupported file format. Supported: png, jpeg, webp",
        )),
    }
}

fn validate_image(data: &[u8]) -> Result<(&'static str, &'static str), AppError> {
    if data.is_empty() {
        return Err(AppError::new(ErrorCode::EmptyFile));
    }
    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::with_message(
            ErrorCode::FileTooLarge,
            format!("File too large. Maximum size is {}MB", MAX_FILE_SIZE / 1024 / 1024),
        )
        .with_detail("max_bytes", MAX_FILE_SIZE));
    }
    sniff_format(data)
}

/// POST /api/upload
pub async fn upload(
    State(state): State<ServerState>,
    current: CurrentUser,
    mut multipart: Multipart,
) -> ApiResult<UploadedImage> {
    let Some(client) = state.cloudinary.as_ref() else {
        return Err(AppError::new(ErrorCode::UploadNotConfigured));
    };

    let mut file: Option<(Vec<u8>, Option<String>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Invalid multipart request: {e}")))?
    {
        if field.name() != Some(FIELD_NAME) {
            continue;
        }
        let original_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?;
        file = Some((bytes.to_vec(), original_name));
        break;
    }

    let (data, original_name) = file.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::NoFileProvided,
            format!("No '{FIELD_NAME}' field found"),
        )
    })?;
    let (ext, mime) = validate_image(&data)?;
    let size = data.len();
    let filename = format!("{}.{ext}", uuid::Uuid::new_v4());

    let uploaded = client.upload(data, &filename, mime).await.map_err(|e| {
        tracing::error!(error = %e, "Cloudinary upload failed");
        AppError::with_message(ErrorCode::UploadFailed, "Image upload failed")
    })?;

    tracing::info!(
        user_id = current.id,
        original_name = ?original_name,
        size,
        public_id = %uploaded.public_id,
        "Image uploaded"
    );
    Ok(ApiResponse::success_with_message("Image uploaded", uploaded))
}
