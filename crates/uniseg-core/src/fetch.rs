//! Downloading media bytes.
//!
//! Fetching is the one operation that needs the platform: a [`MediaFetcher`]
//! is the opaque "give me the bytes behind this reference" capability an
//! adapter provides. [`fetch_media`] decides which reference of a media
//! segment to use.

use async_trait::async_trait;
use bytes::Bytes;
use tracing::trace;

use crate::error::{FetchError, FetchResult};
use crate::segment::MediaFields;

/// Platform capability for downloading media.
///
/// Calls may block on network I/O and are never retried here.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// The platform identifier.
    fn adapter(&self) -> &'static str;

    /// Downloads the resource at `url`.
    async fn fetch_url(&self, url: &str) -> FetchResult<Bytes>;

    /// Downloads a resource by platform file id.
    ///
    /// Platforms without such an API keep the default, which reports
    /// [`FetchError::NotImplemented`].
    async fn fetch_id(&self, id: &str) -> FetchResult<Bytes> {
        let _ = id;
        Err(FetchError::not_implemented(self.adapter(), "id"))
    }
}

/// Returns the bytes behind a media segment.
///
/// References are tried as URL, then platform id, then local path, then the
/// attached raw bytes. `Ok(None)` means the segment references nothing.
pub async fn fetch_media(
    media: &MediaFields,
    fetcher: &dyn MediaFetcher,
) -> FetchResult<Option<Bytes>> {
    let adapter = fetcher.adapter();
    if let Some(url) = media.url() {
        trace!(adapter, url, "Fetching media by url");
        return fetcher.fetch_url(url).await.map(Some);
    }
    if let Some(id) = media.id() {
        trace!(adapter, id, "Fetching media by id");
        return fetcher.fetch_id(id).await.map(Some);
    }
    if let Some(path) = media.path() {
        trace!(adapter, path = %path.display(), "Reading media from disk");
        return Ok(Some(Bytes::from(tokio::fs::read(path).await?)));
    }
    Ok(media.raw().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{Image, Voice};

    struct EchoFetcher;

    #[async_trait]
    impl MediaFetcher for EchoFetcher {
        fn adapter(&self) -> &'static str {
            "echo"
        }

        async fn fetch_url(&self, url: &str) -> FetchResult<Bytes> {
            Ok(Bytes::copy_from_slice(url.as_bytes()))
        }
    }

    #[tokio::test]
    async fn test_url_is_preferred() {
        let image = Image::new(
            MediaFields::new(Image::DEFAULT_NAME)
                .with_id("file-id")
                .with_url("https://a.b/c.png"),
        );
        let bytes = fetch_media(&image, &EchoFetcher).await.unwrap();
        assert_eq!(bytes.as_deref(), Some(&b"https://a.b/c.png"[..]));
    }

    #[tokio::test]
    async fn test_id_without_capability_is_not_implemented() {
        let voice = Voice::from_id("file-id");
        let err = fetch_media(&voice, &EchoFetcher).await.unwrap_err();
        assert!(err.is_not_implemented());
    }

    #[tokio::test]
    async fn test_local_path_and_raw() {
        let path = std::env::temp_dir().join("uniseg-fetch-test.bin");
        tokio::fs::write(&path, b"local").await.unwrap();
        let image = Image::from_path(&path);
        let bytes = fetch_media(&image, &EchoFetcher).await.unwrap();
        assert_eq!(bytes.as_deref(), Some(&b"local"[..]));
        tokio::fs::remove_file(&path).await.unwrap();

        let missing = Image::from_path(std::env::temp_dir().join("uniseg-missing.bin"));
        let err = fetch_media(&missing, &EchoFetcher).await.unwrap_err();
        assert!(matches!(err, FetchError::Io(_)));

        let raw = Image::from_raw(&b"raw"[..]);
        let bytes = fetch_media(&raw, &EchoFetcher).await.unwrap();
        assert_eq!(bytes.as_deref(), Some(&b"raw"[..]));

        let empty = Image::new(MediaFields::new(Image::DEFAULT_NAME));
        assert_eq!(fetch_media(&empty, &EchoFetcher).await.unwrap(), None);
    }
}
