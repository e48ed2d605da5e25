//! ETagged JSON response construction.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE, ETAG};
use serde::Serialize;

use pride_cache::generate_etag;
use pride_core::Response;

/// Serialize a payload into a `200` response with content type and a
/// content-addressed `ETag`.
pub fn json_response<T: Serialize>(payload: &T) -> Result<Response, serde_json::Error> {
    let body = serde_json::to_vec(payload)?;
    let etag = generate_etag(&body);

    let mut response = http::Response::new(Bytes::from(body));
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    if let Ok(tag) = HeaderValue::try_from(etag) {
        response.headers_mut().insert(ETAG, tag);
    }
    Ok(response)
}
