//! HTTP client for a gewechat gateway.

use std::time::Duration;

use async_trait::async_trait;
use monitor_models::{GroupId, Member};
use monitor_runtime::{ClientError, MessagingClient};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::wire::{Envelope, MemberListData, MemberListRequest, PostTextRequest};

/// Default timeout for gateway requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Header carrying the gateway token.
const TOKEN_HEADER: &str = "X-GEWE-TOKEN";

/// Marker contained in every group chat ID.
const GROUP_MARKER: &str = "@chatroom";

/// Client for the gewechat HTTP API.
///
/// Cheap to clone; the underlying `reqwest::Client` pools connections.
#[derive(Debug, Clone)]
pub struct GewechatClient {
    http_client: Client,
    base_url: String,
    token: String,
    app_id: String,
    timeout: Duration,
}

impl GewechatClient {
    /// Creates a client with the default request timeout.
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        app_id: impl Into<String>,
    ) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, token, app_id, DEFAULT_TIMEOUT)
    }

    /// Creates a client whose requests give up after `timeout`.
    pub fn with_timeout(
        base_url: impl Into<String>,
        token: impl Into<String>,
        app_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Request(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            app_id: app_id.into(),
            timeout,
        })
    }

    /// The gateway base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The app ID sent with every request.
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<Envelope<T>, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(url = %url, "gewechat request");

        let response = self
            .http_client
            .post(&url)
            .header(TOKEN_HEADER, &self.token)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::Timeout(self.timeout)
                } else {
                    ClientError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "gewechat returned error status");
            return Err(ClientError::Status(status.as_u16()));
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;

        if !envelope.is_ok() {
            return Err(ClientError::Api {
                ret: envelope.ret,
                message: envelope.msg.unwrap_or_default(),
            });
        }

        Ok(envelope)
    }
}

#[async_trait]
impl MessagingClient for GewechatClient {
    async fn fetch_roster(&self, group: &GroupId) -> Result<Vec<Member>, ClientError> {
        let request = MemberListRequest {
            app_id: &self.app_id,
            chatroom_id: group.as_str(),
        };
        let envelope: Envelope<MemberListData> =
            self.post("/group/getChatroomMemberList", &request).await?;

        let members = envelope.data.unwrap_or_default().member_list;
        if members.is_empty() {
            return Err(ClientError::EmptyRoster);
        }

        Ok(members.into_iter().map(Member::from).collect())
    }

    async fn send_text(&self, group: &GroupId, text: &str) -> Result<(), ClientError> {
        let request = PostTextRequest {
            app_id: &self.app_id,
            to_wxid: group.as_str(),
            content: text,
        };
        let _: Envelope<serde_json::Value> = self.post("/message/postText", &request).await?;
        Ok(())
    }

    fn is_group(&self, group: &GroupId) -> bool {
        group.as_str().contains(GROUP_MARKER)
    }
}
