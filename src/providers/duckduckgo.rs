use async_trait::async_trait;

use crate::{
    Res,
    http::{HttpClient, HttpError},
    info,
    providers::CoverSource,
    types::DdgImageSearch,
    utils, warning,
};

/// DuckDuckGo image search, the last resort of the cover chain.
///
/// The image endpoint needs a `vqd` session token that only appears in the HTML
/// of a regular search page, so every lookup is two requests plus the download.
#[derive(Debug, Clone)]
pub struct DuckDuckGo {
    http: HttpClient,
    base_url: String,
}

impl DuckDuckGo {
    pub fn new(http: HttpClient, base_url: String) -> Self {
        Self { http, base_url }
    }

    async fn search_image(&self, query: &str) -> Result<Option<Vec<u8>>, HttpError> {
        let q = urlencoding::encode(query);
        let html = self
            .http
            .get_text(&format!("{}/?q={}&iax=images&ia=images", self.base_url, q))
            .await?;
        let Some(token) = utils::extract_vqd_token(&html) else {
            return Ok(None);
        };

        let search: DdgImageSearch = self
            .http
            .get_json(&format!("{}/i.js?o=json&q={}&vqd={}", self.base_url, q, token))
            .await?;
        let Some(image_url) = search
            .results
            .into_iter()
            .next()
            .and_then(|result| result.image)
            .and_then(|url| utils::non_empty(&url))
        else {
            return Ok(None);
        };

        let bytes = self.http.get_bytes(&image_url).await?;
        Ok(Some(bytes).filter(|b| !b.is_empty()))
    }
}

#[async_trait]
impl CoverSource for DuckDuckGo {
    fn name(&self) -> &'static str {
        "DuckDuckGo"
    }

    async fn fetch_cover(&self, artist: &str, album: &str) -> Res<Option<Vec<u8>>> {
        let query = format!("{artist} {album} album cover");
        info!("Searching the web for: {}", query);
        match self.search_image(&query).await {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                warning!("Image search failed: {}", e);
                Ok(None)
            }
        }
    }
}
