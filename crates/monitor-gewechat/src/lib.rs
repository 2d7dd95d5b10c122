//! gewechat gateway client for the member monitor.
//!
//! Implements [`MessagingClient`](monitor_runtime::MessagingClient) over the
//! gewechat HTTP API: member lists come from
//! `POST /group/getChatroomMemberList` and notices go out through
//! `POST /message/postText`. Every call carries the `X-GEWE-TOKEN` header and
//! succeeds only when the response envelope reports `ret == 200`.
//!
//! # Example
//!
//! ```ignore
//! use monitor_gewechat::GewechatClient;
//! use monitor_runtime::MessagingClient;
//!
//! let client = GewechatClient::new("http://127.0.0.1:2531/v2/api", "token", "wx_app")?;
//! let members = client.fetch_roster(&"34757816141@chatroom".into()).await?;
//! ```

pub mod client;
pub mod wire;

pub use client::{GewechatClient, DEFAULT_TIMEOUT};
