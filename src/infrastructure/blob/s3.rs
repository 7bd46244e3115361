use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Url;
use sha2::{Digest, Sha256};

use crate::config::S3Config;
use crate::domain::storage::{BlobError, BlobStore};

type HmacSha256 = Hmac<Sha256>;

/// Characters left unescaped in object keys (RFC 3986 unreserved plus '/')
const KEY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

const SIGNED_HEADERS: &str = "content-type;host;x-amz-content-sha256;x-amz-date";

/// Amazon S3 (or S3-compatible) object store
///
/// Objects are written with a single SigV4-signed `PutObject`. Without an
/// endpoint override requests go to the virtual-hosted bucket URL; with one
/// they use path-style addressing against that endpoint.
pub struct S3BlobStore {
    client: reqwest::Client,
    config: S3Config,
}

/// Request parts that take part in the signature
struct SignedPut {
    url: String,
    host: String,
    canonical_uri: String,
    payload_hash: String,
    amz_date: String,
    authorization: String,
}

impl S3BlobStore {
    pub fn new(config: S3Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Public URL under which `key` is served
    pub fn public_url(&self, key: &str) -> String {
        let key = encode_key(key);
        match (&self.config.public_url, &self.config.endpoint) {
            (Some(base), _) => format!("{base}/{key}"),
            (None, Some(endpoint)) => format!("{endpoint}/{}/{key}", self.config.bucket),
            (None, None) => format!(
                "https://{}.s3.{}.amazonaws.com/{key}",
                self.config.bucket, self.config.region
            ),
        }
    }

    fn target(&self, key: &str) -> Result<(String, String, String), BlobError> {
        let key = encode_key(key);
        match &self.config.endpoint {
            Some(endpoint) => {
                let url = Url::parse(endpoint)
                    .map_err(|e| BlobError::UploadFailed(format!("invalid S3 endpoint: {e}")))?;
                let host = match (url.host_str(), url.port()) {
                    (Some(host), Some(port)) => format!("{host}:{port}"),
                    (Some(host), None) => host.to_string(),
                    (None, _) => {
                        return Err(BlobError::UploadFailed(
                            "S3 endpoint has no host".to_string(),
                        ))
                    }
                };
                let uri = format!("/{}/{key}", self.config.bucket);
                Ok((format!("{endpoint}{uri}"), host, uri))
            }
            None => {
                let host = format!(
                    "{}.s3.{}.amazonaws.com",
                    self.config.bucket, self.config.region
                );
                let uri = format!("/{key}");
                Ok((format!("https://{host}{uri}"), host, uri))
            }
        }
    }

    fn sign_put(
        &self,
        key: &str,
        body: &[u8],
        content_type: &str,
        now: DateTime<Utc>,
    ) -> Result<SignedPut, BlobError> {
        let (url, host, canonical_uri) = self.target(key)?;
        let payload_hash = hex::encode(Sha256::digest(body));
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date_stamp = now.format("%Y%m%d").to_string();

        let canonical_request = format!(
            "PUT\n{canonical_uri}\n\n\
             content-type:{content_type}\nhost:{host}\n\
             x-amz-content-sha256:{payload_hash}\nx-amz-date:{amz_date}\n\n\
             {SIGNED_HEADERS}\n{payload_hash}"
        );
        let scope = format!("{date_stamp}/{}/s3/aws4_request", self.config.region);
        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{amz_date}\n{scope}\n{}",
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let secret = format!("AWS4{}", self.config.secret_access_key);
        let k_date = hmac_sha256(secret.as_bytes(), date_stamp.as_bytes())?;
        let k_region = hmac_sha256(&k_date, self.config.region.as_bytes())?;
        let k_service = hmac_sha256(&k_region, b"s3")?;
        let k_signing = hmac_sha256(&k_service, b"aws4_request")?;
        let signature = hex::encode(hmac_sha256(&k_signing, string_to_sign.as_bytes())?);

        Ok(SignedPut {
            url,
            host,
            canonical_uri,
            payload_hash,
            amz_date,
            authorization: format!(
                "AWS4-HMAC-SHA256 Credential={}/{scope}, \
                 SignedHeaders={SIGNED_HEADERS}, Signature={signature}",
                self.config.access_key_id
            ),
        })
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<String, BlobError> {
        let signed = self.sign_put(key, &bytes, content_type, Utc::now())?;
        tracing::debug!(uri = %signed.canonical_uri, host = %signed.host, "Uploading object to S3");

        let response = self
            .client
            .put(&signed.url)
            .header("content-type", content_type)
            .header("x-amz-content-sha256", &signed.payload_hash)
            .header("x-amz-date", &signed.amz_date)
            .header("authorization", &signed.authorization)
            .body(bytes)
            .send()
            .await
            .map_err(|e| BlobError::UploadFailed(format!("S3 request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BlobError::UploadFailed(format!(
                "S3 responded {status}: {body}"
            )));
        }

        Ok(self.public_url(key))
    }
}

fn encode_key(key: &str) -> String {
    utf8_percent_encode(key, KEY_ENCODE_SET).to_string()
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, BlobError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| BlobError::UploadFailed(format!("signing key rejected: {e}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const KEY: &str = "photos/1700000000000-sunset.jpg";

    fn config(endpoint: Option<&str>) -> S3Config {
        S3Config {
            region: "us-east-1".to_string(),
            bucket: "fotoutc".to_string(),
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string(),
            endpoint: endpoint.map(str::to_string),
            public_url: None,
        }
    }

    fn signing_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 18, 12, 0, 0).unwrap()
    }

    #[test]
    fn signs_virtual_hosted_put() {
        let store = S3BlobStore::new(config(None));
        let signed = store
            .sign_put(KEY, b"jpeg-bytes", "image/jpeg", signing_time())
            .unwrap();

        assert_eq!(
            signed.url,
            "https://fotoutc.s3.us-east-1.amazonaws.com/photos/1700000000000-sunset.jpg"
        );
        assert_eq!(signed.amz_date, "20241018T120000Z");
        assert_eq!(
            signed.payload_hash,
            "0111dbc398b94eacda6759809c050530868ee7e313b3381c2f95ce8b55331c50"
        );
        assert_eq!(
            signed.authorization,
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20241018/us-east-1/s3/aws4_request, \
             SignedHeaders=content-type;host;x-amz-content-sha256;x-amz-date, \
             Signature=b335f58df6d01e4172ef03589074e31b19757c57e864e9efe7e7e9c2f65f4f2b"
        );
    }

    #[test]
    fn signs_path_style_put_against_endpoint() {
        let store = S3BlobStore::new(config(Some("http://localhost:9000")));
        let signed = store
            .sign_put(KEY, b"jpeg-bytes", "image/jpeg", signing_time())
            .unwrap();

        assert_eq!(
            signed.url,
            "http://localhost:9000/fotoutc/photos/1700000000000-sunset.jpg"
        );
        assert_eq!(signed.host, "localhost:9000");
        assert!(signed.authorization.ends_with(
            "Signature=2fa524e761d1c2835eda268b8703b1367cf85d64e0b8f614a95f1e068dc50b6e"
        ));
    }

    #[test]
    fn public_url_variants() {
        assert_eq!(
            S3BlobStore::new(config(None)).public_url(KEY),
            "https://fotoutc.s3.us-east-1.amazonaws.com/photos/1700000000000-sunset.jpg"
        );

        let mut with_cdn = config(None);
        with_cdn.public_url = Some("https://cdn.fotoutc.mx".to_string());
        assert_eq!(
            S3BlobStore::new(with_cdn).public_url(KEY),
            "https://cdn.fotoutc.mx/photos/1700000000000-sunset.jpg"
        );
    }

    #[test]
    fn keys_are_percent_encoded() {
        assert_eq!(encode_key("photos/1-mi foto.jpg"), "photos/1-mi%20foto.jpg");
    }

    #[test]
    fn invalid_endpoint_is_upload_failure() {
        let store = S3BlobStore::new(config(Some("not a url")));
        let result = store.sign_put(KEY, b"", "image/jpeg", signing_time());
        assert!(matches!(result, Err(BlobError::UploadFailed(_))));
    }
}
