//! Feed-document fetching: request construction, transport-encoding
//! negotiation, integrity fingerprinting.
//!
//! One outbound connection per call, no retries, and no timeout at this
//! layer — the caller's transport default applies. Retry policy is a caller
//! concern.

mod decode;
mod hash;

pub use decode::{ContentEncoding, DecodeError};
pub use hash::{fingerprint, FINGERPRINT_ALGORITHM};

use thiserror::Error;

/// Errors surfaced by a fetch attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection-level or HTTP-level failure (DNS, TLS, non-2xx status).
    #[error("request for {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The response declared a `Content-Encoding` outside the supported set.
    #[error("unexpected content-encoding type '{0}'")]
    UnsupportedEncoding(String),
    /// The body could not be decompressed or is not valid UTF-8.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Outcome of a single fetch attempt.
///
/// Created fresh per attempt, consumed by the parser or caller, never
/// mutated after construction. Not persisted.
#[derive(Debug)]
pub struct FetchResponse {
    /// The URL that was requested.
    pub url: String,
    /// Custom headers sent with the request, in the order given.
    pub request_headers: Vec<(String, String)>,
    /// HTTP status code of the response.
    pub status: u16,
    /// Response headers in insertion order; duplicates collapse to the last
    /// value seen (accepted contract, see [`Self::header`]).
    pub response_headers: Vec<(String, String)>,
    /// Body decoded to UTF-8 text (post-decompression).
    pub content: String,
    /// Fingerprint algorithm name, always [`FINGERPRINT_ALGORITHM`].
    pub hash_algorithm: &'static str,
    /// Lowercase hex digest over the decoded body bytes.
    pub content_hash: String,
    /// True if the body was gzip-decompressed.
    pub gzip: bool,
    /// True if the body declared deflate (and was passed through raw).
    pub deflate: bool,
}

impl FetchResponse {
    /// Look up a response header by name (reqwest lowercases header names).
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.response_headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Fetch a feed document.
///
/// Sends a GET request with the optional custom headers (omitted headers
/// mean none are added beyond reqwest's defaults), records the status and
/// full response header mapping, decodes the body per its declared
/// transport encoding, and fingerprints the decoded bytes.
///
/// # Errors
///
/// - [`FetchError::Transport`] on connection failure or a non-2xx status
/// - [`FetchError::UnsupportedEncoding`] for any `Content-Encoding` other
///   than gzip, deflate, or identity/absent — no partial content is returned
/// - [`FetchError::Decode`] for bad gzip framing or non-UTF-8 content
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    headers: Option<&[(String, String)]>,
) -> Result<FetchResponse, FetchError> {
    let transport = |source: reqwest::Error| FetchError::Transport {
        url: url.to_string(),
        source,
    };

    let mut request = client.get(url);
    let mut request_headers = Vec::new();
    if let Some(headers) = headers {
        for (name, value) in headers {
            request = request.header(name, value);
            request_headers.push((name.clone(), value.clone()));
        }
    }

    let response = request.send().await.map_err(transport)?;
    let status = response.status();

    // Capture the full header mapping before touching the body. Insertion
    // order is preserved; a repeated header name overwrites the earlier
    // value (last write wins).
    let mut response_headers: Vec<(String, String)> = Vec::new();
    for (name, value) in response.headers() {
        let name = name.as_str().to_string();
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        match response_headers.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => response_headers.push((name, value)),
        }
    }

    let encoding_header = response_headers
        .iter()
        .find(|(n, _)| n == "content-encoding")
        .map(|(_, v)| v.as_str());
    let encoding = ContentEncoding::from_header(encoding_header)
        .map_err(FetchError::UnsupportedEncoding)?;

    let response = response.error_for_status().map_err(transport)?;
    let raw = response.bytes().await.map_err(transport)?.to_vec();

    tracing::debug!(
        url = %url,
        status = status.as_u16(),
        encoding = ?encoding,
        bytes = raw.len(),
        "fetched feed document"
    );

    let decoded = encoding.decode(raw)?;
    let content_hash = fingerprint(&decoded);
    let content = String::from_utf8(decoded).map_err(DecodeError::from)?;

    Ok(FetchResponse {
        url: url.to_string(),
        request_headers,
        status: status.as_u16(),
        response_headers,
        content,
        hash_algorithm: FINGERPRINT_ALGORITHM,
        content_hash,
        gzip: encoding == ContentEncoding::Gzip,
        deflate: encoding == ContentEncoding::Deflate,
    })
}
