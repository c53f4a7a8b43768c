//! HTTP implementation of the resource API against YouTube Data v3.
//!
//! All listing calls request the 50-item page maximum and pass the
//! continuation token through untouched. Error responses are decoded
//! into [`ApiError`] with the structured reason code preserved, so the
//! classifier rarely has to fall back to message text.

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::api::{ApiError, ApiResult, ResourceApi};
use crate::auth::Credential;
use crate::fetch::MAX_PAGE_SIZE;
use crate::model::{Collection, CollectionItem, Page};

/// Production API endpoint.
pub const API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistResource {
    id: String,
    snippet: PlaylistSnippet,
    content_details: PlaylistContentDetails,
}

#[derive(Debug, Deserialize)]
struct PlaylistSnippet {
    title: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistContentDetails {
    item_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemResource {
    snippet: PlaylistItemSnippet,
    content_details: PlaylistItemContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemSnippet {
    title: String,
    playlist_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemContentDetails {
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct CreatedResource {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: u16,
    message: String,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    reason: Option<String>,
}

/// Decode an error response body, keeping the structured reason code.
fn error_from_body(status: u16, body: &str) -> ApiError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => ApiError {
            status: Some(envelope.error.code),
            reason: envelope
                .error
                .errors
                .into_iter()
                .find_map(|detail| detail.reason),
            message: envelope.error.message,
        },
        Err(_) => ApiError {
            status: Some(status),
            reason: None,
            message: format!("HTTP {status}: {body}"),
        },
    }
}

// ============================================================================
// Client
// ============================================================================

/// Blocking HTTP client for one authenticated identity.
#[derive(Debug)]
pub struct YouTubeApi {
    http: reqwest::blocking::Client,
    credential: Credential,
    base_url: String,
}

impl YouTubeApi {
    /// Build a client for the production endpoint.
    #[must_use]
    pub fn new(credential: Credential) -> Self {
        Self::with_base_url(credential, API_BASE_URL)
    }

    /// Build a client against an alternate endpoint.
    #[must_use]
    pub fn with_base_url(credential: Credential, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            credential,
            base_url: base_url.into(),
        }
    }

    fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ApiResult<T> {
        let url = format!("{}/{path}", self.base_url);
        debug!(%url, "GET");
        let response = self
            .http
            .get(&url)
            .bearer_auth(self.credential.access_token())
            .query(query)
            .send()
            .map_err(|e| ApiError::transport(e.to_string()))?;
        Self::decode(response)
    }

    fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> ApiResult<T> {
        let url = format!("{}/{path}", self.base_url);
        debug!(%url, "POST");
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.credential.access_token())
            .query(query)
            .json(body)
            .send()
            .map_err(|e| ApiError::transport(e.to_string()))?;
        Self::decode(response)
    }

    fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::blocking::Response,
    ) -> ApiResult<T> {
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| ApiError::transport(e.to_string()))?;

        if !status.is_success() {
            return Err(error_from_body(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| ApiError::transport(format!("malformed response: {e}")))
    }

    fn page_query<'q>(
        base: &'q [(&'q str, &'q str)],
        page_size: &'q str,
        cursor: Option<&'q str>,
    ) -> Vec<(&'q str, &'q str)> {
        let mut query: Vec<(&str, &str)> = base.to_vec();
        query.push(("maxResults", page_size));
        if let Some(token) = cursor {
            query.push(("pageToken", token));
        }
        query
    }
}

impl ResourceApi for YouTubeApi {
    fn list_collections(&self, cursor: Option<&str>) -> ApiResult<Page<Collection>> {
        let page_size = MAX_PAGE_SIZE.to_string();
        let query = Self::page_query(
            &[("part", "snippet,contentDetails"), ("mine", "true")],
            &page_size,
            cursor,
        );
        let response: ListResponse<PlaylistResource> = self.get("playlists", &query)?;

        Ok(Page {
            items: response
                .items
                .into_iter()
                .map(|playlist| Collection {
                    id: playlist.id,
                    title: playlist.snippet.title,
                    description: playlist.snippet.description,
                    item_count: playlist.content_details.item_count,
                })
                .collect(),
            next_cursor: response.next_page_token,
        })
    }

    fn list_collection_items(
        &self,
        collection_id: &str,
        cursor: Option<&str>,
    ) -> ApiResult<Page<CollectionItem>> {
        let page_size = MAX_PAGE_SIZE.to_string();
        let base = [
            ("part", "snippet,contentDetails"),
            ("playlistId", collection_id),
        ];
        let query = Self::page_query(&base, &page_size, cursor);
        let response: ListResponse<PlaylistItemResource> = self.get("playlistItems", &query)?;

        Ok(Page {
            items: response
                .items
                .into_iter()
                .map(|item| CollectionItem {
                    id: item.content_details.video_id,
                    title: item.snippet.title,
                    collection_id: item.snippet.playlist_id,
                })
                .collect(),
            next_cursor: response.next_page_token,
        })
    }

    fn create_collection(&self, title: &str, description: &str) -> ApiResult<String> {
        let body = json!({
            "snippet": {
                "title": title,
                "description": description,
            },
            "status": {
                "privacyStatus": "private",
            },
        });
        let created: CreatedResource =
            self.post("playlists", &[("part", "snippet,status")], &body)?;
        Ok(created.id)
    }

    fn add_item_to_collection(&self, collection_id: &str, item_id: &str) -> ApiResult<()> {
        let body = json!({
            "snippet": {
                "playlistId": collection_id,
                "resourceId": {
                    "kind": "youtube#video",
                    "videoId": item_id,
                },
            },
        });
        let _created: serde_json::Value = self.post("playlistItems", &[("part", "snippet")], &body)?;
        Ok(())
    }

    fn subscribe(&self, channel_id: &str) -> ApiResult<()> {
        let body = json!({
            "snippet": {
                "resourceId": {
                    "kind": "youtube#channel",
                    "channelId": channel_id,
                },
            },
        });
        let _created: serde_json::Value = self.post("subscriptions", &[("part", "snippet")], &body)?;
        Ok(())
    }
}
