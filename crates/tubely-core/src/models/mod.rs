//! Domain models

mod category;
mod video;

pub use category::VideoCategory;
pub use video::{CreateVideoRequest, Video};
