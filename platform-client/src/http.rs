use crate::adapter::PlatformAdapter;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use murmur_core::{ConfigError, CoreError, PlatformApiError, Post, PublishedPost};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

/// Generic JSON adapter for platforms exposing a timeline/posts REST
/// surface. Payload shapes beyond this minimal envelope are out of scope;
/// anything richer belongs in a dedicated adapter implementing
/// [`PlatformAdapter`].
#[derive(Debug)]
pub struct HttpPlatform {
    http_client: Client,
    base_url: String,
    agent_handle: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPayload {
    pub id: String,
    pub author_id: String,
    pub text: String,
    pub created_at: i64,
    pub reply_to_id: Option<String>,
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct TimelinePayload {
    posts: Vec<PostPayload>,
}

#[derive(Debug, Clone, Deserialize)]
struct PublishedPayload {
    id: String,
    text: String,
    created_at: i64,
}

#[derive(Debug, Serialize)]
struct PublishRequest<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to_id: Option<&'a str>,
}

impl HttpPlatform {
    pub fn new(base_url: &str, agent_handle: &str) -> Result<Self, CoreError> {
        let parsed = Url::parse(base_url).map_err(|_| {
            CoreError::Config(ConfigError::InvalidValue {
                field: "platform_base_url".to_string(),
                value: base_url.to_string(),
            })
        })?;

        let http_client = Client::builder()
            .user_agent(format!("murmur/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            agent_handle: agent_handle.to_string(),
        })
    }

    pub fn agent_handle(&self) -> &str {
        &self.agent_handle
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("Platform request: {} {}", method, url);
        self.http_client.request(method, url)
    }

    async fn send(&self, builder: RequestBuilder, resource: &str) -> Result<Response, CoreError> {
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Network error for {}: {}", resource, e);
                if e.is_timeout() {
                    return Err(CoreError::Platform(PlatformApiError::RequestTimeout));
                }
                return Err(CoreError::Network(e));
            }
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                warn!("Rate limited on {}, retry after {}s", resource, retry_after);
                Err(CoreError::Platform(PlatformApiError::RateLimitExceeded {
                    retry_after,
                }))
            }
            StatusCode::FORBIDDEN => Err(CoreError::Platform(PlatformApiError::Forbidden {
                resource: resource.to_string(),
            })),
            StatusCode::NOT_FOUND => Err(CoreError::Platform(PlatformApiError::PostNotFound {
                post_id: resource.to_string(),
            })),
            s if s.is_server_error() => {
                error!("Server error {} for {}", s, resource);
                Err(CoreError::Platform(PlatformApiError::ServerError {
                    status_code: s.as_u16(),
                }))
            }
            s => Err(CoreError::Platform(PlatformApiError::InvalidResponse {
                details: format!("unexpected status {} for {}", s, resource),
            })),
        }
    }
}

#[async_trait]
impl PlatformAdapter for HttpPlatform {
    async fn fetch_timeline(&self, limit: usize) -> Result<Vec<Post>, CoreError> {
        let builder = self
            .request(Method::GET, "/timeline")
            .query(&[("limit", limit.to_string())]);
        let response = self.send(builder, "timeline").await?;

        let payload: TimelinePayload = response.json().await.map_err(|e| {
            error!("Failed to parse timeline: {}", e);
            CoreError::Platform(PlatformApiError::InvalidResponse {
                details: "failed to parse timeline".to_string(),
            })
        })?;

        info!("Fetched {} timeline posts", payload.posts.len());
        payload.posts.into_iter().map(Post::try_from).collect()
    }

    async fn fetch_post(&self, id: &str) -> Result<Option<Post>, CoreError> {
        let builder = self.request(Method::GET, &format!("/posts/{id}"));
        let response = match self.send(builder, id).await {
            Ok(response) => response,
            // Missing posts are end-of-chain, not failures.
            Err(CoreError::Platform(PlatformApiError::PostNotFound { .. })) => return Ok(None),
            Err(e) => return Err(e),
        };

        let payload: PostPayload = response.json().await.map_err(|e| {
            error!("Failed to parse post {}: {}", id, e);
            CoreError::Platform(PlatformApiError::InvalidResponse {
                details: format!("failed to parse post {id}"),
            })
        })?;

        Ok(Some(Post::try_from(payload)?))
    }

    async fn publish(
        &self,
        text: &str,
        reply_to_id: Option<&str>,
    ) -> Result<PublishedPost, CoreError> {
        let body = PublishRequest { text, reply_to_id };
        let builder = self.request(Method::POST, "/posts").json(&body);
        let response = self.send(builder, "publish").await?;

        let payload: PublishedPayload = response.json().await.map_err(|_| {
            CoreError::Platform(PlatformApiError::InvalidResponse {
                details: "failed to parse publish response".to_string(),
            })
        })?;

        info!("Published post {}", payload.id);
        published_from(payload)
    }

    async fn like(&self, id: &str) -> Result<(), CoreError> {
        let builder = self.request(Method::POST, &format!("/posts/{id}/like"));
        self.send(builder, id).await?;
        Ok(())
    }

    async fn share(&self, id: &str) -> Result<(), CoreError> {
        let builder = self.request(Method::POST, &format!("/posts/{id}/share"));
        self.send(builder, id).await?;
        Ok(())
    }

    async fn quote(&self, text: &str, id: &str) -> Result<PublishedPost, CoreError> {
        let body = PublishRequest {
            text,
            reply_to_id: None,
        };
        let builder = self
            .request(Method::POST, &format!("/posts/{id}/quote"))
            .json(&body);
        let response = self.send(builder, id).await?;

        let payload: PublishedPayload = response.json().await.map_err(|_| {
            CoreError::Platform(PlatformApiError::InvalidResponse {
                details: "failed to parse quote response".to_string(),
            })
        })?;

        info!("Published quote {} of {}", payload.id, id);
        published_from(payload)
    }
}

fn timestamp_from(secs: i64) -> Result<DateTime<Utc>, CoreError> {
    Utc.timestamp_opt(secs, 0).single().ok_or_else(|| {
        CoreError::Platform(PlatformApiError::InvalidResponse {
            details: format!("timestamp {secs} out of range"),
        })
    })
}

fn published_from(payload: PublishedPayload) -> Result<PublishedPost, CoreError> {
    Ok(PublishedPost {
        created_at: timestamp_from(payload.created_at)?,
        id: payload.id,
        text: payload.text,
    })
}

impl TryFrom<PostPayload> for Post {
    type Error = CoreError;

    fn try_from(payload: PostPayload) -> Result<Self, CoreError> {
        let created_at = timestamp_from(payload.created_at)?;
        // A platform that omits conversation ids still gets stable room
        // bookkeeping: the root post id stands in for the conversation.
        let conversation_id = payload
            .conversation_id
            .unwrap_or_else(|| payload.id.clone());
        Ok(Post {
            id: payload.id,
            author_id: payload.author_id,
            text: payload.text,
            created_at,
            reply_to_id: payload.reply_to_id,
            conversation_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_payload_conversion() {
        let payload = PostPayload {
            id: "p1".to_string(),
            author_id: "user-1".to_string(),
            text: "hello".to_string(),
            created_at: 1700000000,
            reply_to_id: Some("p0".to_string()),
            conversation_id: Some("c1".to_string()),
        };

        let post = Post::try_from(payload).unwrap();
        assert_eq!(post.id, "p1");
        assert_eq!(post.reply_to_id.as_deref(), Some("p0"));
        assert_eq!(post.conversation_id, "c1");
        assert_eq!(post.created_at.timestamp(), 1700000000);
    }

    #[test]
    fn test_missing_conversation_defaults_to_post_id() {
        let payload = PostPayload {
            id: "p1".to_string(),
            author_id: "user-1".to_string(),
            text: "hello".to_string(),
            created_at: 1700000000,
            reply_to_id: None,
            conversation_id: None,
        };

        let post = Post::try_from(payload).unwrap();
        assert_eq!(post.conversation_id, "p1");
    }

    #[test]
    fn test_base_url_must_parse() {
        assert!(HttpPlatform::new("not a url", "murmur").is_err());
        assert!(HttpPlatform::new("https://platform.example/api/", "murmur").is_ok());
    }
}
