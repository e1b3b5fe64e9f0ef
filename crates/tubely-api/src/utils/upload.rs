//! Common utilities for file upload handlers

use base64::Engine;
use rand::Rng;
use tubely_core::constants::{RANDOM_NAME_BYTES, THUMBNAIL_CONTENT_TYPES};
use tubely_core::AppError;

/// Media type essence of a part's `Content-Type`, parameters stripped
/// (`image/png; charset=binary` -> `image/png`).
pub fn media_type_essence(content_type: Option<&str>) -> Result<String, AppError> {
    let content_type = content_type
        .ok_or_else(|| AppError::BadRequest("Missing Content-Type for file".to_string()))?;
    let parsed: mime::Mime = content_type
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid Content-Type: {}", content_type)))?;
    Ok(parsed.essence_str().to_lowercase())
}

/// File extension for an accepted thumbnail media type.
pub fn thumbnail_extension(essence: &str) -> Result<&'static str, AppError> {
    if !THUMBNAIL_CONTENT_TYPES.contains(&essence) {
        return Err(AppError::BadRequest(format!(
            "Invalid file type. Allowed types: {}",
            THUMBNAIL_CONTENT_TYPES.join(", ")
        )));
    }
    match essence {
        "image/png" => Ok("png"),
        _ => Ok("jpeg"),
    }
}

fn random_bytes() -> Vec<u8> {
    let mut rng = rand::rng();
    (0..RANDOM_NAME_BYTES).map(|_| rng.random()).collect()
}

/// URL-safe base64 (no padding) of 32 random bytes.
pub fn random_file_name() -> String {
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(random_bytes())
}

/// 64 lowercase hex characters.
pub fn random_hex_id() -> String {
    hex::encode(random_bytes())
}
