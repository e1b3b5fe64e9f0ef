//! Shared constants for upload handling.

/// Multipart field carrying the thumbnail image.
pub const THUMBNAIL_FIELD: &str = "thumbnail";

/// Multipart field carrying the video file.
pub const VIDEO_FIELD: &str = "video";

/// Content types accepted for thumbnails.
pub const THUMBNAIL_CONTENT_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// The only content type accepted for video uploads.
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Directory under the asset root where thumbnails are written.
pub const THUMBNAIL_DIR: &str = "thumbnails";

/// Issuer claim for access tokens.
pub const ACCESS_TOKEN_ISSUER: &str = "tubely-access";

/// Number of random bytes used for generated file names and object keys.
pub const RANDOM_NAME_BYTES: usize = 32;
