use async_trait::async_trait;

use crate::{
    Res,
    http::{HttpClient, HttpError},
    providers::{CoverSource, MetadataSearch},
    types::{ItunesResult, ItunesSearch, ResolvedMetadata},
    utils, warning,
};

/// iTunes Search API client, used as the fallback for both metadata and covers.
///
/// Results are ranked by Apple; the first one is taken as is.
#[derive(Debug, Clone)]
pub struct ITunes {
    http: HttpClient,
    search_url: String,
}

impl ITunes {
    pub fn new(http: HttpClient, search_url: String) -> Self {
        Self { http, search_url }
    }

    async fn first_result(
        &self,
        term: &str,
        entity: &str,
    ) -> Result<Option<ItunesResult>, HttpError> {
        let url = format!(
            "{base}?term={term}&media=music&entity={entity}&limit=1",
            base = self.search_url,
            term = urlencoding::encode(term),
        );
        let search: ItunesSearch = self.http.get_json(&url).await?;
        Ok(search.results.into_iter().next())
    }

    async fn album_artwork(
        &self,
        artist: &str,
        album: &str,
    ) -> Result<Option<Vec<u8>>, HttpError> {
        let Some(result) = self.first_result(&format!("{artist} {album}"), "album").await? else {
            return Ok(None);
        };
        let Some(artwork) = result.artwork_url100.as_deref().and_then(utils::non_empty) else {
            return Ok(None);
        };

        let bytes = self.http.get_bytes(&utils::upgrade_artwork_url(&artwork)).await?;
        Ok(Some(bytes).filter(|b| !b.is_empty()))
    }
}

pub fn result_to_metadata(result: ItunesResult) -> Option<ResolvedMetadata> {
    Some(ResolvedMetadata {
        artist: result.artist_name.as_deref().and_then(utils::non_empty)?,
        title: result.track_name.as_deref().and_then(utils::non_empty)?,
        album: result.collection_name.as_deref().and_then(utils::non_empty),
    })
}

#[async_trait]
impl MetadataSearch for ITunes {
    fn name(&self) -> &'static str {
        "iTunes"
    }

    async fn search(&self, artist: Option<&str>, title: &str) -> Res<Option<ResolvedMetadata>> {
        let term = match artist {
            Some(artist) => format!("{artist} {title}"),
            None => title.to_string(),
        };
        match self.first_result(&term, "song").await {
            Ok(result) => Ok(result.and_then(result_to_metadata)),
            Err(e) => {
                warning!("iTunes search failed: {}", e);
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl CoverSource for ITunes {
    fn name(&self) -> &'static str {
        "iTunes"
    }

    async fn fetch_cover(&self, artist: &str, album: &str) -> Res<Option<Vec<u8>>> {
        match self.album_artwork(artist, album).await {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                warning!("iTunes artwork lookup failed: {}", e);
                Ok(None)
            }
        }
    }
}
