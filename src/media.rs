use serde::Deserialize;

use crate::error::AppError;

pub const IMAGE_TYPES: &[&str] = &["image/png", "image/jpeg", "image/jpg", "image/gif", "image/webp"];
pub const VIDEO_TYPES: &[&str] = &["video/mp4", "video/quicktime", "video/webm", "video/mov"];

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Images are matched first; a `.mov` file name counts as video whatever
    /// the declared type.
    pub fn classify(file_type: &str, file_name: &str) -> Option<MediaKind> {
        if IMAGE_TYPES.contains(&file_type) {
            Some(MediaKind::Image)
        } else if VIDEO_TYPES.contains(&file_type) || file_name.to_lowercase().ends_with(".mov") {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UploadForm {
    pub file_name: Option<String>,
    pub file_content: Option<String>,
    pub file_type: Option<String>,
}

/// A request that passed validation.
#[derive(Debug)]
pub struct Upload {
    pub file_name: String,
    /// Base64, forwarded to the store untouched.
    pub file_content: String,
    pub file_type: String,
    pub kind: MediaKind,
}

impl UploadForm {
    pub fn validate(self) -> Result<Upload, AppError> {
        let present = |field: &Option<String>| field.as_deref().map_or(false, |s| !s.is_empty());
        let missing: Vec<&'static str> = [
            ("fileName", present(&self.file_name)),
            ("fileContent", present(&self.file_content)),
            ("fileType", present(&self.file_type)),
        ]
        .iter()
        .filter(|(_, ok)| !ok)
        .map(|(name, _)| *name)
        .collect();
        if !missing.is_empty() {
            return Err(AppError::MissingFields(missing));
        }
        let file_name = self.file_name.unwrap_or_default();
        let file_type = self.file_type.unwrap_or_default();
        let kind = MediaKind::classify(&file_type, &file_name).ok_or(AppError::InvalidFileType)?;
        Ok(Upload {
            file_name,
            file_content: self.file_content.unwrap_or_default(),
            file_type,
            kind,
        })
    }
}

/// Replace every character outside `[A-Za-z0-9.-]` with `_`, one per UTF-16
/// code unit, so characters outside the BMP become `__`.
pub fn sanitize_file_name(name: &str) -> String {
    regex!(r"[^A-Za-z0-9.\-]")
        .replace_all(name, |caps: &regex::Captures| {
            let units: usize = caps[0].chars().map(char::len_utf16).sum();
            "_".repeat(units)
        })
        .into_owned()
}

pub fn unique_file_name(timestamp_millis: i64, file_name: &str) -> String {
    format!("upload_{}_{}", timestamp_millis, sanitize_file_name(file_name))
}
