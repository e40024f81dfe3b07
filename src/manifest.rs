//! The gallery manifest: one JSON document listing every stored upload,
//! split by media kind.
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::media::MediaKind;

#[derive(Debug, Default, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Manifest {
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub videos: Vec<String>,
}

impl Manifest {
    /// Decode the base64 content returned by the store. Line breaks inside
    /// the encoded text are ignored.
    pub fn decode(encoded: &str) -> Result<Manifest, AppError> {
        let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = base64::decode(compact).map_err(unexpected!())?;
        serde_json::from_slice(&bytes).map_err(unexpected!())
    }

    /// Pretty JSON, base64 encoded, ready to be committed.
    pub fn encode(&self) -> Result<String, AppError> {
        let json = serde_json::to_string_pretty(self).map_err(unexpected!())?;
        Ok(base64::encode(json))
    }

    /// Append in insertion order. Duplicates are kept.
    pub fn push(&mut self, kind: MediaKind, name: String) {
        match kind {
            MediaKind::Image => self.images.push(name),
            MediaKind::Video => self.videos.push(name),
        }
    }
}
