pub mod health;
pub mod thumbnail_upload;
pub mod video_upload;
pub mod videos;

use axum::http::header::CONTENT_LENGTH;
use axum::http::HeaderMap;

/// Content-Length of the request, when the client declared one.
pub(crate) fn declared_content_length(headers: &HeaderMap) -> Option<u64> {
    headers.get(CONTENT_LENGTH)?.to_str().ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn parses_declared_length() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("1048576"));
        assert_eq!(declared_content_length(&headers), Some(1_048_576));
    }

    #[test]
    fn absent_or_malformed_length_is_none() {
        assert_eq!(declared_content_length(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("lots"));
        assert_eq!(declared_content_length(&headers), None);
    }
}
