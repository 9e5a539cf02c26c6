use std::path::Path;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use hmac::{
    Hmac, Mac,
    digest::{InvalidLength, KeyInit},
};
use reqwest::multipart::{Form, Part};
use sha1::Sha1;

use crate::{
    Res, error,
    http::HttpClient,
    info,
    providers::Recognizer,
    snippet::{SnippetExtractor, TempSnippet},
    types::{AcrResponse, ResolvedMetadata},
    utils, warning,
};

type HmacSha1 = Hmac<Sha1>;

const HTTP_METHOD: &str = "POST";
const HTTP_URI: &str = "/v1/identify";
const DATA_TYPE: &str = "audio";
const SIGNATURE_VERSION: &str = "1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcrCredentials {
    pub access_key: String,
    pub access_secret: String,
}

impl AcrCredentials {
    /// `None` unless both the key and the secret are present.
    pub fn from_parts(access_key: Option<String>, access_secret: Option<String>) -> Option<Self> {
        Some(Self {
            access_key: access_key?,
            access_secret: access_secret?,
        })
    }
}

/// ACRCloud audio fingerprint recognition.
///
/// A 12 second excerpt is cut from the track, signed with HMAC-SHA1 and posted
/// to the identify endpoint. Without credentials every call returns not-found
/// straight away and no snippet is extracted.
pub struct AcrCloud {
    http: HttpClient,
    host: String,
    credentials: Option<AcrCredentials>,
    extractor: Box<dyn SnippetExtractor>,
}

impl AcrCloud {
    pub fn new(
        http: HttpClient,
        host: String,
        credentials: Option<AcrCredentials>,
        extractor: Box<dyn SnippetExtractor>,
    ) -> Self {
        Self {
            http,
            host,
            credentials,
            extractor,
        }
    }

    async fn identify(
        &self,
        credentials: &AcrCredentials,
        sample: Vec<u8>,
    ) -> Option<ResolvedMetadata> {
        let timestamp = Utc::now().timestamp();
        let signature = match sign(
            &credentials.access_secret,
            &string_to_sign(&credentials.access_key, timestamp),
        ) {
            Ok(signature) => signature,
            Err(e) => {
                error!("Cannot sign ACRCloud request: {}", e);
                return None;
            }
        };
        let url = identify_url(&self.host);

        let build_form = || {
            Form::new()
                .part(
                    "sample",
                    Part::bytes(sample.clone()).file_name("snippet.mp3"),
                )
                .text("access_key", credentials.access_key.clone())
                .text("data_type", DATA_TYPE)
                .text("signature_version", SIGNATURE_VERSION)
                .text("signature", signature.clone())
                .text("sample_bytes", sample.len().to_string())
                .text("timestamp", timestamp.to_string())
        };

        let response: AcrResponse = match self.http.post_multipart_json(&url, build_form).await {
            Ok(response) => response,
            Err(e) => {
                error!("Error during recognition: {}", e);
                return None;
            }
        };

        let found = response_to_metadata(&response);
        if found.is_none() {
            warning!(
                "ACRCloud recognition failed: {}",
                response
                    .status
                    .and_then(|s| s.msg)
                    .unwrap_or_else(|| "Unknown error".to_string())
            );
        }
        found
    }
}

#[async_trait]
impl Recognizer for AcrCloud {
    fn name(&self) -> &'static str {
        "ACRCloud"
    }

    async fn recognize(&self, path: &Path) -> Res<Option<ResolvedMetadata>> {
        let Some(credentials) = &self.credentials else {
            error!("Missing ACRCloud credentials (ACRCLOUD_ACCESS_KEY, ACRCLOUD_ACCESS_SECRET)");
            return Ok(None);
        };

        let snippet = TempSnippet::for_source(path);
        info!("Extracting snippet from: {}", path.display());
        if let Err(e) = self.extractor.extract(path, snippet.path()).await {
            error!("Failed to create audio snippet: {}", e);
            return Ok(None);
        }

        let sample = match async_fs::read(snippet.path()).await {
            Ok(bytes) if !bytes.is_empty() => bytes,
            _ => {
                error!("Failed to create audio snippet");
                return Ok(None);
            }
        };

        info!("Recognizing via ACRCloud...");
        Ok(self.identify(credentials, sample).await)
    }
}

/// Canonical request string: method, URI, key, data type, version, timestamp.
pub fn string_to_sign(access_key: &str, timestamp: i64) -> String {
    [
        HTTP_METHOD,
        HTTP_URI,
        access_key,
        DATA_TYPE,
        SIGNATURE_VERSION,
        &timestamp.to_string(),
    ]
    .join("\n")
}

/// Base64 HMAC-SHA1 of `message` keyed by `secret`.
pub fn sign(secret: &str, message: &str) -> Result<String, InvalidLength> {
    let mut mac = <HmacSha1 as KeyInit>::new_from_slice(secret.as_bytes())?;
    mac.update(message.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Identify endpoint for `host`. A host given with a scheme is used as is,
/// a bare host name gets `https://`.
pub fn identify_url(host: &str) -> String {
    if host.contains("://") {
        format!("{}{}", host.trim_end_matches('/'), HTTP_URI)
    } else {
        format!("https://{}{}", host, HTTP_URI)
    }
}

/// First matched track of a successful identification.
pub fn response_to_metadata(response: &AcrResponse) -> Option<ResolvedMetadata> {
    if response.status.as_ref().and_then(|s| s.code) != Some(0) {
        return None;
    }
    let music = response.metadata.as_ref()?.music.first()?;

    Some(ResolvedMetadata {
        artist: music
            .artists
            .first()
            .and_then(|a| a.name.as_deref())
            .and_then(utils::non_empty)?,
        title: music.title.as_deref().and_then(utils::non_empty)?,
        album: music
            .album
            .as_ref()
            .and_then(|a| a.name.as_deref())
            .and_then(utils::non_empty),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_to_sign_is_newline_joined() {
        assert_eq!(
            string_to_sign("key123", 1_700_000_000),
            "POST\n/v1/identify\nkey123\naudio\n1\n1700000000"
        );
    }

    #[test]
    fn signature_is_base64_hmac_sha1() {
        let signature = sign("key", "The quick brown fox jumps over the lazy dog").unwrap();
        let raw = STANDARD.decode(&signature).unwrap();
        let hex: String = raw.iter().map(|b| format!("{b:02x}")).collect();
        assert_eq!(hex, "de7c9b85b8b78aa6bc8a7a36f70a90701c9db4d9");
    }

    #[test]
    fn identify_url_defaults_to_https() {
        assert_eq!(
            identify_url("identify-eu-west-1.acrcloud.com"),
            "https://identify-eu-west-1.acrcloud.com/v1/identify"
        );
        assert_eq!(
            identify_url("http://127.0.0.1:8080/"),
            "http://127.0.0.1:8080/v1/identify"
        );
    }

    #[test]
    fn credentials_need_key_and_secret() {
        assert!(AcrCredentials::from_parts(Some("k".into()), None).is_none());
        assert!(AcrCredentials::from_parts(None, Some("s".into())).is_none());
        assert!(AcrCredentials::from_parts(Some("k".into()), Some("s".into())).is_some());
    }

    #[test]
    fn maps_first_music_match() {
        let response: AcrResponse = serde_json::from_str(
            r#"{"status":{"code":0,"msg":"Success"},
                "metadata":{"music":[{"title":"My Song","artists":[{"name":"X"}],"album":{"name":"Y"}}]}}"#,
        )
        .unwrap();
        assert_eq!(
            response_to_metadata(&response),
            Some(ResolvedMetadata {
                artist: "X".into(),
                title: "My Song".into(),
                album: Some("Y".into()),
            })
        );
    }

    #[test]
    fn no_result_status_is_not_found() {
        let response: AcrResponse =
            serde_json::from_str(r#"{"status":{"code":1001,"msg":"No result"}}"#).unwrap();
        assert_eq!(response_to_metadata(&response), None);
    }
}
