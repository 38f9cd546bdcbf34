//! Canonical object URLs.
//!
//! [`CanonicalUrls::url_for`] and [`CanonicalUrls::parse`] are exact inverses for every
//! key produced by [`crate::keys`].

use crate::traits::{StorageError, StorageResult};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use std::fmt;
use url::Url;

// Characters escaped inside a key path segment. '/' separates segments and is kept.
const KEY_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Bucket and key of a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum UrlStyle {
    /// `https://{bucket}.s3.{region}.amazonaws.com/{key}`
    VirtualHosted { region: String },
    /// `{endpoint}/{bucket}/{key}`
    PathStyle { endpoint: String },
}

/// Builds and parses the single URL form used to reference stored objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalUrls {
    bucket: String,
    style: UrlStyle,
}

impl CanonicalUrls {
    /// AWS virtual-hosted style.
    pub fn virtual_hosted(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            style: UrlStyle::VirtualHosted {
                region: region.into(),
            },
        }
    }

    /// Path style under a custom S3-compatible endpoint.
    pub fn path_style(bucket: impl Into<String>, endpoint: impl Into<String>) -> Self {
        let endpoint: String = endpoint.into();
        Self {
            bucket: bucket.into(),
            style: UrlStyle::PathStyle {
                endpoint: endpoint.trim_end_matches('/').to_string(),
            },
        }
    }

    /// Pick the style from an optional endpoint, the same way the S3 client is built.
    pub fn for_backend(bucket: &str, region: &str, endpoint: Option<&str>) -> Self {
        match endpoint {
            Some(endpoint) => Self::path_style(bucket, endpoint),
            None => Self::virtual_hosted(bucket, region),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn url_for(&self, key: &str) -> String {
        let encoded_key = utf8_percent_encode(key, KEY_SEGMENT).to_string();
        match &self.style {
            UrlStyle::VirtualHosted { region } => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, region, encoded_key
            ),
            UrlStyle::PathStyle { endpoint } => {
                format!("{}/{}/{}", endpoint, self.bucket, encoded_key)
            }
        }
    }

    /// Decode a canonical URL into its bucket and key.
    ///
    /// The URL must use this backend's form. Any query string is ignored.
    pub fn parse(&self, canonical_url: &str) -> StorageResult<ObjectLocation> {
        let malformed = |reason: &str| {
            StorageError::MalformedLocation(format!("{}: {}", reason, canonical_url))
        };

        let url = Url::parse(canonical_url).map_err(|_| malformed("not an absolute URL"))?;

        let (bucket, raw_key) = match &self.style {
            UrlStyle::VirtualHosted { region } => {
                if url.scheme() != "https" {
                    return Err(malformed("expected an https URL"));
                }
                let host = url.host_str().ok_or_else(|| malformed("missing host"))?;
                let suffix = format!(".s3.{}.amazonaws.com", region);
                let bucket = host
                    .strip_suffix(&suffix)
                    .ok_or_else(|| malformed("host is not an S3 endpoint for this region"))?;
                let key = url.path().strip_prefix('/').unwrap_or(url.path());
                (bucket.to_string(), key.to_string())
            }
            UrlStyle::PathStyle { endpoint } => {
                let without_query = canonical_url
                    .split(['?', '#'])
                    .next()
                    .unwrap_or(canonical_url);
                let rest = without_query
                    .strip_prefix(endpoint.as_str())
                    .and_then(|rest| rest.strip_prefix('/'))
                    .ok_or_else(|| malformed("URL is not under the configured endpoint"))?;
                let (bucket, key) = rest
                    .split_once('/')
                    .ok_or_else(|| malformed("missing object key"))?;
                (bucket.to_string(), key.to_string())
            }
        };

        if bucket.is_empty() {
            return Err(malformed("missing bucket"));
        }

        let key = percent_decode_str(&raw_key)
            .decode_utf8()
            .map_err(|_| malformed("key is not valid UTF-8"))?
            .into_owned();

        if key.is_empty() {
            return Err(malformed("missing object key"));
        }

        Ok(ObjectLocation { bucket, key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::generate_key;

    fn aws() -> CanonicalUrls {
        CanonicalUrls::virtual_hosted("tubely-videos", "us-east-1")
    }

    fn minio() -> CanonicalUrls {
        CanonicalUrls::path_style("tubely-videos", "http://localhost:9000/")
    }

    #[test]
    fn test_virtual_hosted_url() {
        assert_eq!(
            aws().url_for("landscape/abc.mp4"),
            "https://tubely-videos.s3.us-east-1.amazonaws.com/landscape/abc.mp4"
        );
    }

    #[test]
    fn test_path_style_url() {
        assert_eq!(
            minio().url_for("portrait/abc.mp4"),
            "http://localhost:9000/tubely-videos/portrait/abc.mp4"
        );
    }

    #[test]
    fn test_parse_inverts_url_for_generated_keys() {
        for urls in [aws(), minio()] {
            for prefix in ["landscape", "portrait", "other", "thumbnails"] {
                let key = generate_key(prefix, "mp4");
                let parsed = urls.parse(&urls.url_for(&key)).unwrap();
                assert_eq!(parsed.bucket, "tubely-videos");
                assert_eq!(parsed.key, key);
            }
        }
    }

    #[test]
    fn test_parse_ignores_query() {
        let parsed = aws()
            .parse("https://tubely-videos.s3.us-east-1.amazonaws.com/other/k.mp4?X-Amz-Expires=60")
            .unwrap();
        assert_eq!(parsed.key, "other/k.mp4");
    }

    #[test]
    fn test_parse_reports_foreign_bucket() {
        let parsed = aws()
            .parse("https://someone-else.s3.us-east-1.amazonaws.com/other/k.mp4")
            .unwrap();
        assert_eq!(parsed.bucket, "someone-else");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let cases = [
            "",
            "not a url",
            "tubely-videos,landscape/abc.mp4",
            "https://tubely-videos.s3.us-east-1.amazonaws.com/",
            "https://tubely-videos.s3.eu-west-1.amazonaws.com/landscape/abc.mp4",
            "https://s3.us-east-1.amazonaws.com/landscape/abc.mp4",
            "http://tubely-videos.s3.us-east-1.amazonaws.com/landscape/abc.mp4",
            "https://example.com/landscape/abc.mp4",
        ];
        for case in cases {
            assert!(
                matches!(aws().parse(case), Err(StorageError::MalformedLocation(_))),
                "accepted {:?}",
                case
            );
        }

        for case in [
            "http://localhost:9000/tubely-videos",
            "http://localhost:9000/tubely-videos/",
            "http://other-host:9000/tubely-videos/landscape/abc.mp4",
        ] {
            assert!(
                matches!(minio().parse(case), Err(StorageError::MalformedLocation(_))),
                "accepted {:?}",
                case
            );
        }
    }
}
