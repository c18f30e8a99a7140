//! Response body reading and content decoding.

use std::io::{self, Read};

use flate2::read::{DeflateDecoder, MultiGzDecoder, ZlibDecoder};

/// A body read off the wire, capped at a byte limit.
pub(crate) struct RawBody {
    pub bytes: Vec<u8>,
    pub truncated: bool,
}

/// Reads at most `limit` bytes of the response body.
///
/// # Errors
///
/// Returns the `reqwest::Error` of a failed chunk read (including timeouts).
pub(crate) async fn read_capped(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<RawBody, reqwest::Error> {
    let mut bytes = Vec::new();
    let mut truncated = false;
    while let Some(chunk) = response.chunk().await? {
        let remaining = limit - bytes.len();
        if chunk.len() > remaining {
            bytes.extend_from_slice(&chunk[..remaining]);
            truncated = true;
            break;
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(RawBody { bytes, truncated })
}

/// Undoes the `Content-Encoding` of `raw`, capping the decoded size at `limit`.
///
/// Encodings are removed in reverse order of application. A stream cut short
/// by the transfer cap decodes as far as it goes.
///
/// # Returns
///
/// The decoded bytes and whether the decoded output hit `limit`.
///
/// # Errors
///
/// Returns `InvalidData` for an encoding other than gzip/deflate/identity, or
/// the decoder's error for a corrupt complete stream.
pub(crate) fn decode(
    raw: RawBody,
    content_encoding: Option<&str>,
    limit: usize,
) -> io::Result<(Vec<u8>, bool)> {
    let encodings: Vec<String> = content_encoding
        .unwrap_or_default()
        .split(',')
        .map(|e| e.trim().to_ascii_lowercase())
        .filter(|e| !e.is_empty() && e != "identity")
        .collect();

    let mut bytes = raw.bytes;
    let mut truncated = raw.truncated;
    for encoding in encodings.iter().rev() {
        let result = match encoding.as_str() {
            "gzip" | "x-gzip" => read_limited(MultiGzDecoder::new(&bytes[..]), limit),
            "deflate" => read_limited(ZlibDecoder::new(&bytes[..]), limit)
                // Some servers send raw deflate without the zlib wrapper.
                .or_else(|_| read_limited(DeflateDecoder::new(&bytes[..]), limit)),
            other => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("unsupported content-encoding '{other}'"),
                ))
            }
        };
        let (decoded, hit_limit) = match result {
            Ok(decoded) => decoded,
            Err((partial, _)) if truncated && !partial.is_empty() => (partial, false),
            Err((_, e)) => return Err(e),
        };
        bytes = decoded;
        truncated |= hit_limit;
    }
    Ok((bytes, truncated))
}

/// Reads up to `limit` bytes; on error hands back whatever was decoded.
fn read_limited<R: Read>(reader: R, limit: usize) -> Result<(Vec<u8>, bool), (Vec<u8>, io::Error)> {
    let mut out = Vec::new();
    match reader.take(limit as u64 + 1).read_to_end(&mut out) {
        Ok(_) => {
            let hit_limit = out.len() > limit;
            out.truncate(limit);
            Ok((out, hit_limit))
        }
        Err(e) => Err((out, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::{GzEncoder, ZlibEncoder};
    use flate2::Compression;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn raw(bytes: Vec<u8>) -> RawBody {
        RawBody {
            bytes,
            truncated: false,
        }
    }

    #[test]
    fn test_identity_passthrough() {
        let (body, truncated) = decode(raw(b"<html></html>".to_vec()), None, 1024).unwrap();
        assert_eq!(body, b"<html></html>");
        assert!(!truncated);
    }

    #[test]
    fn test_gzip_decoded() {
        let html = b"<html><body>hello</body></html>".repeat(20);
        let (body, truncated) = decode(raw(gzip(&html)), Some("gzip"), 1 << 20).unwrap();
        assert_eq!(body, html);
        assert!(!truncated);
    }

    #[test]
    fn test_deflate_decoded() {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"deflated page").unwrap();
        let compressed = encoder.finish().unwrap();
        let (body, _) = decode(raw(compressed), Some("Deflate"), 1024).unwrap();
        assert_eq!(body, b"deflated page");
    }

    #[test]
    fn test_decoded_output_capped() {
        let html = vec![b'a'; 4096];
        let (body, truncated) = decode(raw(gzip(&html)), Some("gzip"), 1000).unwrap();
        assert_eq!(body.len(), 1000);
        assert!(truncated);
    }

    #[test]
    fn test_unknown_encoding_rejected() {
        let err = decode(raw(vec![1, 2, 3]), Some("br"), 1024).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_corrupt_gzip_rejected() {
        assert!(decode(raw(b"definitely not gzip".to_vec()), Some("gzip"), 1024).is_err());
    }
}
