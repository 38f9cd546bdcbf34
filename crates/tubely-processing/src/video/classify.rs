use tubely_core::VideoCategory;

/// Map a probe's display aspect ratio onto a storage category.
///
/// Exact string match only: near-16:9 ratios such as "427:240" land in `Other`.
pub fn classify_aspect_ratio(aspect_ratio: &str) -> VideoCategory {
    match aspect_ratio {
        "16:9" => VideoCategory::Landscape,
        "9:16" => VideoCategory::Portrait,
        _ => VideoCategory::Other,
    }
}
