use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{Extension, Router, http::StatusCode, http::Uri};
use tagfill::{
    Res,
    http::{HttpClient, RetryPolicy},
    providers::{
        AcrCloud, AcrCredentials, CoverArtArchive, CoverSource, DuckDuckGo, ITunes,
        MetadataSearch, MusicBrainz, MusicBrainzCovers, Recognizer,
    },
    snippet::SnippetExtractor,
    types::ResolvedMetadata,
};

// ---------------------------------------------------------------------------
// Local upstream
// ---------------------------------------------------------------------------

/// Canned answers keyed by path. Unknown paths are answered with 404.
#[derive(Default)]
struct Upstream {
    routes: Mutex<HashMap<String, (StatusCode, Vec<u8>)>>,
    hits: Mutex<Vec<String>>,
}

impl Upstream {
    fn route(&self, path: &str, status: StatusCode, body: impl Into<Vec<u8>>) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body.into()));
    }

    fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }

    fn hit_paths(&self) -> Vec<String> {
        self.hits()
            .into_iter()
            .map(|hit| hit.split('?').next().unwrap_or_default().to_string())
            .collect()
    }
}

async fn respond(
    Extension(upstream): Extension<Arc<Upstream>>,
    uri: Uri,
) -> (StatusCode, Vec<u8>) {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    upstream.hits.lock().unwrap().push(target);

    upstream
        .routes
        .lock()
        .unwrap()
        .get(uri.path())
        .cloned()
        .unwrap_or((StatusCode::NOT_FOUND, b"not found".to_vec()))
}

/// Starts a server on an ephemeral port and returns its base URL.
async fn serve(upstream: Arc<Upstream>) -> String {
    let app = Router::new().fallback(respond).layer(Extension(upstream));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client() -> HttpClient {
    HttpClient::new(RetryPolicy {
        max_retries: 2,
        base_delay: Duration::ZERO,
        ..Default::default()
    })
    .unwrap()
}

fn musicbrainz_covers(base: &str) -> MusicBrainzCovers {
    MusicBrainzCovers::new(
        MusicBrainz::new(client(), format!("{base}/ws/2")),
        CoverArtArchive::new(client(), format!("{base}/caa")),
    )
}

/// Writes a fake excerpt to wherever it is asked to and remembers the path.
#[derive(Clone, Default)]
struct WritingExtractor {
    dest: Arc<Mutex<Option<PathBuf>>>,
}

impl WritingExtractor {
    fn dest(&self) -> PathBuf {
        self.dest.lock().unwrap().clone().unwrap()
    }
}

#[async_trait]
impl SnippetExtractor for WritingExtractor {
    async fn extract(&self, _source: &Path, dest: &Path) -> Res<()> {
        std::fs::write(dest, b"fake mp3 excerpt")?;
        *self.dest.lock().unwrap() = Some(dest.to_path_buf());
        Ok(())
    }
}

fn acrcloud(base: &str, extractor: WritingExtractor) -> AcrCloud {
    AcrCloud::new(
        client(),
        base.to_string(),
        Some(AcrCredentials {
            access_key: "key".to_string(),
            access_secret: "secret".to_string(),
        }),
        Box::new(extractor),
    )
}

// ---------------------------------------------------------------------------
// MusicBrainz and Cover Art Archive
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_musicbrainz_cover_fetches_front_of_first_release() {
    let upstream = Arc::new(Upstream::default());
    upstream.route(
        "/ws/2/release/",
        StatusCode::OK,
        r#"{"releases":[{"id":"r1"},{"id":"r2"}]}"#,
    );
    upstream.route("/caa/release/r1/front", StatusCode::OK, b"front image".to_vec());
    let base = serve(upstream.clone()).await;

    let cover = musicbrainz_covers(&base)
        .fetch_cover("Artist", "Album")
        .await
        .unwrap();

    assert_eq!(cover, Some(b"front image".to_vec()));
    assert_eq!(upstream.hit_paths(), vec!["/ws/2/release/", "/caa/release/r1/front"]);
    assert!(upstream.hits()[0].contains("fmt=json"));
}

#[tokio::test]
async fn test_cover_art_archive_404_is_not_found() {
    let upstream = Arc::new(Upstream::default());
    upstream.route("/ws/2/release/", StatusCode::OK, r#"{"releases":[{"id":"r1"}]}"#);
    let base = serve(upstream.clone()).await;

    let cover = musicbrainz_covers(&base)
        .fetch_cover("Artist", "Album")
        .await
        .unwrap();

    assert_eq!(cover, None);
    // A 404 is final and is asked for once
    assert_eq!(upstream.hit_paths(), vec!["/ws/2/release/", "/caa/release/r1/front"]);
}

#[tokio::test]
async fn test_malformed_release_search_is_not_found() {
    let upstream = Arc::new(Upstream::default());
    upstream.route("/ws/2/release/", StatusCode::OK, "<html>maintenance</html>");
    let base = serve(upstream.clone()).await;

    let cover = musicbrainz_covers(&base)
        .fetch_cover("Artist", "Album")
        .await
        .unwrap();

    assert_eq!(cover, None);
    assert_eq!(upstream.hit_paths(), vec!["/ws/2/release/"]);
}

#[tokio::test]
async fn test_server_error_after_retries_is_not_found() {
    let upstream = Arc::new(Upstream::default());
    upstream.route("/ws/2/release/", StatusCode::SERVICE_UNAVAILABLE, "busy");
    let base = serve(upstream.clone()).await;

    let cover = musicbrainz_covers(&base)
        .fetch_cover("Artist", "Album")
        .await
        .unwrap();

    assert_eq!(cover, None);
    assert_eq!(upstream.hit_paths().len(), 3);
}

#[tokio::test]
async fn test_musicbrainz_recording_search() {
    let upstream = Arc::new(Upstream::default());
    upstream.route(
        "/ws/2/recording/",
        StatusCode::OK,
        r#"{"recordings":[{"title":"Song","artist-credit":[{"name":"Artist"}],"releases":[{"title":"Album"}]}]}"#,
    );
    let base = serve(upstream.clone()).await;
    let musicbrainz = MusicBrainz::new(client(), format!("{base}/ws/2"));

    let found = musicbrainz.search(Some("Artist"), "Song").await.unwrap();

    assert_eq!(
        found,
        Some(ResolvedMetadata {
            artist: "Artist".to_string(),
            title: "Song".to_string(),
            album: Some("Album".to_string()),
        })
    );
    assert!(upstream.hits()[0].contains("fmt=json"));
}

#[tokio::test]
async fn test_malformed_recording_search_is_not_found() {
    let upstream = Arc::new(Upstream::default());
    upstream.route("/ws/2/recording/", StatusCode::OK, r#"{"recordings":"#);
    let base = serve(upstream.clone()).await;
    let musicbrainz = MusicBrainz::new(client(), format!("{base}/ws/2"));

    assert_eq!(musicbrainz.search(None, "Song").await.unwrap(), None);
    assert_eq!(upstream.hit_paths().len(), 1);
}

// ---------------------------------------------------------------------------
// iTunes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_itunes_cover_downloads_large_artwork() {
    let upstream = Arc::new(Upstream::default());
    let base = serve(upstream.clone()).await;
    upstream.route(
        "/search",
        StatusCode::OK,
        format!(r#"{{"results":[{{"artworkUrl100":"{base}/art/100x100bb.jpg"}}]}}"#),
    );
    upstream.route("/art/600x600bb.jpg", StatusCode::OK, b"large art".to_vec());
    let itunes = ITunes::new(client(), format!("{base}/search"));

    let cover = itunes.fetch_cover("Artist", "Album").await.unwrap();

    assert_eq!(cover, Some(b"large art".to_vec()));
    assert_eq!(upstream.hit_paths(), vec!["/search", "/art/600x600bb.jpg"]);
    assert!(upstream.hits()[0].contains("entity=album"));
}

#[tokio::test]
async fn test_itunes_song_search() {
    let upstream = Arc::new(Upstream::default());
    upstream.route(
        "/search",
        StatusCode::OK,
        r#"{"resultCount":1,"results":[{"trackName":"Song","artistName":"Artist"}]}"#,
    );
    let base = serve(upstream.clone()).await;
    let itunes = ITunes::new(client(), format!("{base}/search"));

    let found = itunes.search(None, "Song").await.unwrap().unwrap();

    assert_eq!(found.artist, "Artist");
    assert_eq!(found.album, None);
    assert!(upstream.hits()[0].contains("entity=song"));
}

#[tokio::test]
async fn test_itunes_without_results_is_not_found() {
    let upstream = Arc::new(Upstream::default());
    upstream.route("/search", StatusCode::OK, r#"{"resultCount":0,"results":[]}"#);
    let base = serve(upstream.clone()).await;
    let itunes = ITunes::new(client(), format!("{base}/search"));

    assert_eq!(itunes.fetch_cover("Artist", "Album").await.unwrap(), None);
    assert_eq!(upstream.hit_paths(), vec!["/search"]);
}

// ---------------------------------------------------------------------------
// DuckDuckGo
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_duckduckgo_follows_token_to_image() {
    let upstream = Arc::new(Upstream::default());
    let base = serve(upstream.clone()).await;
    upstream.route("/", StatusCode::OK, r#"<script>vqd="4-1234567890";</script>"#);
    upstream.route(
        "/i.js",
        StatusCode::OK,
        format!(r#"{{"results":[{{"image":"{base}/img/cover.jpg"}}]}}"#),
    );
    upstream.route("/img/cover.jpg", StatusCode::OK, b"web image".to_vec());
    let ddg = DuckDuckGo::new(client(), base);

    let cover = ddg.fetch_cover("Artist", "Album").await.unwrap();

    assert_eq!(cover, Some(b"web image".to_vec()));
    assert_eq!(upstream.hit_paths(), vec!["/", "/i.js", "/img/cover.jpg"]);
    assert!(upstream.hits()[1].contains("vqd=4-1234567890"));
}

#[tokio::test]
async fn test_duckduckgo_without_token_is_not_found() {
    let upstream = Arc::new(Upstream::default());
    upstream.route("/", StatusCode::OK, "<html>no token here</html>");
    let base = serve(upstream.clone()).await;
    let ddg = DuckDuckGo::new(client(), base);

    assert_eq!(ddg.fetch_cover("Artist", "Album").await.unwrap(), None);
    assert_eq!(upstream.hit_paths(), vec!["/"]);
}

// ---------------------------------------------------------------------------
// ACRCloud
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_acrcloud_failed_post_removes_snippet() {
    let upstream = Arc::new(Upstream::default());
    let base = serve(upstream.clone()).await;
    let extractor = WritingExtractor::default();
    let acr = acrcloud(&base, extractor.clone());

    let found = acr.recognize(Path::new("/music/track.mp3")).await.unwrap();

    assert_eq!(found, None);
    assert_eq!(upstream.hit_paths(), vec!["/v1/identify"]);
    assert!(!extractor.dest().exists());
}

#[tokio::test]
async fn test_acrcloud_identifies_track_and_removes_snippet() {
    let upstream = Arc::new(Upstream::default());
    upstream.route(
        "/v1/identify",
        StatusCode::OK,
        r#"{"status":{"code":0,"msg":"Success"},"metadata":{"music":[{"title":"Song","artists":[{"name":"Artist"}],"album":{"name":"Album"}}]}}"#,
    );
    let base = serve(upstream.clone()).await;
    let extractor = WritingExtractor::default();
    let acr = acrcloud(&base, extractor.clone());

    let found = acr.recognize(Path::new("/music/track.mp3")).await.unwrap();

    assert_eq!(
        found,
        Some(ResolvedMetadata {
            artist: "Artist".to_string(),
            title: "Song".to_string(),
            album: Some("Album".to_string()),
        })
    );
    assert!(!extractor.dest().exists());
}

#[tokio::test]
async fn test_acrcloud_no_match_is_not_found() {
    let upstream = Arc::new(Upstream::default());
    upstream.route(
        "/v1/identify",
        StatusCode::OK,
        r#"{"status":{"code":1001,"msg":"No result"}}"#,
    );
    let base = serve(upstream.clone()).await;
    let extractor = WritingExtractor::default();

    let found = acrcloud(&base, extractor.clone())
        .recognize(Path::new("/music/track.mp3"))
        .await
        .unwrap();

    assert_eq!(found, None);
    assert!(!extractor.dest().exists());
}
