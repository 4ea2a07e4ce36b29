use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::json;

use crate::error::ApiError;
use crate::model::{AlbumDetail, AlbumSummary, BulkIdResult, SearchPage, SearchResponse};
use crate::remote::{ByteStream, RemoteApi};

/// Production [`RemoteApi`] backed by `reqwest`.
///
/// The API key travels as an `x-api-key` default header on every request, so
/// individual methods only deal with paths and payloads.
pub struct HttpRemote {
    client: reqwest::Client,
    base: String,
}

impl HttpRemote {
    pub fn new(server_url: &str, api_key: &str) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key).map_err(|_| ApiError::InvalidApiKey)?;
        headers.insert("x-api-key", key);

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base: server_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

impl RemoteApi for HttpRemote {
    async fn ping(&self) -> Result<(), ApiError> {
        self.client
            .get(self.url("/api/server/about"))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn search_page(&self, size: u32, page: u32) -> Result<SearchPage, ApiError> {
        let response: SearchResponse = self
            .client
            .post(self.url("/api/search/metadata"))
            .json(&json!({ "size": size, "page": page }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response.assets)
    }

    async fn download(&self, asset_id: &str) -> Result<(ByteStream, Option<u64>), ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/api/assets/{asset_id}/original")))
            .send()
            .await?
            .error_for_status()?;

        let total = response.content_length();
        let stream = response.bytes_stream().map(|chunk| chunk.map_err(ApiError::from));
        Ok((Box::pin(stream), total))
    }

    async fn delete_assets(&self, ids: &[String], force: bool) -> Result<(), ApiError> {
        self.client
            .delete(self.url("/api/assets"))
            .json(&json!({ "force": force, "ids": ids }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn create_album(&self, album_name: &str, asset_ids: &[String]) -> Result<(), ApiError> {
        let album_name = if album_name.is_empty() { "Untitled" } else { album_name };
        self.client
            .post(self.url("/api/albums"))
            .json(&json!({ "albumName": album_name, "assetIds": asset_ids }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn add_to_album(
        &self,
        album_id: &str,
        asset_ids: &[String],
    ) -> Result<Vec<BulkIdResult>, ApiError> {
        let results: Vec<BulkIdResult> = self
            .client
            .put(self.url(&format!("/api/albums/{album_id}/assets")))
            .json(&json!({ "ids": asset_ids }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(results)
    }

    async fn list_albums(&self) -> Result<Vec<AlbumSummary>, ApiError> {
        let albums = self
            .client
            .get(self.url("/api/albums"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(albums)
    }

    async fn album_detail(&self, album_id: &str) -> Result<AlbumDetail, ApiError> {
        let album = self
            .client
            .get(self.url(&format!("/api/albums/{album_id}")))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(album)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_right_trimmed() {
        let remote = HttpRemote::new("https://photos.example.com/", "key").unwrap();
        assert_eq!(
            remote.url("/api/server/about"),
            "https://photos.example.com/api/server/about"
        );
    }

    #[test]
    fn rejects_unprintable_api_key() {
        assert!(matches!(
            HttpRemote::new("https://photos.example.com", "bad\nkey"),
            Err(ApiError::InvalidApiKey)
        ));
    }
}
