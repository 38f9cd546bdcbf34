use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;

/// Orientation bucket derived from a video's display aspect ratio.
///
/// The lowercase name doubles as the object-key prefix of the stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VideoCategory {
    Landscape,
    Portrait,
    Other,
}

impl VideoCategory {
    pub const ALL: [VideoCategory; 3] = [
        VideoCategory::Landscape,
        VideoCategory::Portrait,
        VideoCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoCategory::Landscape => "landscape",
            VideoCategory::Portrait => "portrait",
            VideoCategory::Other => "other",
        }
    }
}

impl Display for VideoCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
