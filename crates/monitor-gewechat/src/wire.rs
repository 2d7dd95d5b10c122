//! Request and response bodies of the gewechat HTTP API.

use monitor_models::{Member, MemberId};
use serde::{Deserialize, Serialize};

/// `ret` value of a successful call.
pub const RET_OK: i64 = 200;

/// Body of `POST /group/getChatroomMemberList`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberListRequest<'a> {
    pub app_id: &'a str,
    pub chatroom_id: &'a str,
}

/// Body of `POST /message/postText`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostTextRequest<'a> {
    pub app_id: &'a str,
    pub to_wxid: &'a str,
    pub content: &'a str,
}

/// Response envelope shared by every endpoint.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub ret: i64,
    pub msg: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Returns true if the gateway reported success.
    pub fn is_ok(&self) -> bool {
        self.ret == RET_OK
    }
}

/// `data` of a member list response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberListData {
    #[serde(default)]
    pub member_list: Vec<WireMember>,
}

/// One roster entry as the gateway reports it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMember {
    pub wxid: String,
    #[serde(default)]
    pub nick_name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl From<WireMember> for Member {
    fn from(wire: WireMember) -> Self {
        let id = MemberId::from(wire.wxid);
        let name = Member::resolve_name(&id, wire.display_name.as_deref(), wire.nick_name.as_deref());
        Member::new(id, name)
    }
}
