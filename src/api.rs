use chrono::{DateTime, Utc};
use leptos::window;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

pub const TOKEN_STORAGE_KEY: &str = "routecraft.token";

/// Session token left in local storage by the login flow. This crate only
/// ever reads it; without it nothing is fetched and nothing is rendered.
pub fn stored_token() -> Option<String> {
    let storage = window().local_storage().ok().flatten()?;
    storage
        .get_item(TOKEN_STORAGE_KEY)
        .ok()
        .flatten()
        .filter(|token| !token.is_empty())
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error("not signed in")]
    MissingToken,

    #[error("session rejected by the server")]
    Unauthorized,
}

impl ApiError {
    /// Expected for logged-out or expired viewers; suppressed from the user.
    pub fn is_benign(&self) -> bool {
        matches!(self, ApiError::MissingToken | ApiError::Unauthorized)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateChat {
    pub id: u64,
    pub peer_id: u64,
    pub peer_name: String,
    pub peer_avatar: Option<String>,
    pub last_message: Option<String>,
    pub unread_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub enum GroupChatType {
    Discussion,
    Announcement,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupChat {
    pub id: u64,
    pub name: String,
    pub avatar: Option<String>,
    pub chat_type: GroupChatType,
    pub is_admin_only: bool,
    pub is_admin: bool,
    pub last_message: Option<String>,
    pub unread_count: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: u64,
    pub sender_id: u64,
    pub sender_name: String,
    pub sender_avatar: Option<String>,
    pub content: String,
    pub sent_at: DateTime<Utc>,
    pub is_read: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_chat_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_chat_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WeatherMain {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WeatherCondition {
    pub description: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WeatherWind {
    pub speed: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WeatherReport {
    pub main: WeatherMain,
    pub weather: Vec<WeatherCondition>,
    pub wind: WeatherWind,
    pub name: String,
}

#[derive(Clone)]
pub struct Api {
    base: Url,
    client: reqwest::Client,
}

impl Api {
    pub fn new(base: &str) -> Result<Self, ApiError> {
        let mut base = base.to_owned();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Api {
            base: Url::parse(&base)?,
            client: reqwest::Client::new(),
        })
    }

    pub async fn private_chats(&self) -> Result<Vec<PrivateChat>, ApiError> {
        self.get_json(self.base.join("private-chats")?).await
    }

    pub async fn group_chats(&self) -> Result<Vec<GroupChat>, ApiError> {
        self.get_json(self.base.join("group-chats")?).await
    }

    pub async fn private_messages(&self, chat_id: u64) -> Result<Vec<ChatMessage>, ApiError> {
        self.get_json(self.base.join(&format!("private-chats/{chat_id}/messages"))?)
            .await
    }

    pub async fn group_messages(&self, chat_id: u64) -> Result<Vec<ChatMessage>, ApiError> {
        self.get_json(self.base.join(&format!("group-chats/{chat_id}/messages"))?)
            .await
    }

    pub async fn send_message(&self, message: &NewMessage) -> Result<ChatMessage, ApiError> {
        let res = self
            .client
            .post(self.base.join("messages")?)
            .header(AUTHORIZATION, self.bearer()?)
            .json(message)
            .send()
            .await?;
        Self::read_json(res).await
    }

    pub async fn weather(&self, lat: f64, lon: f64) -> Result<WeatherReport, ApiError> {
        let mut url = self.base.join("config/weather")?;
        url.query_pairs_mut()
            .append_pair("lat", &lat.to_string())
            .append_pair("lon", &lon.to_string());
        self.get_json(url).await
    }

    fn bearer(&self) -> Result<String, ApiError> {
        let token = stored_token().ok_or(ApiError::MissingToken)?;
        Ok(format!("Bearer {token}"))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let res = self
            .client
            .get(url)
            .header(AUTHORIZATION, self.bearer()?)
            .send()
            .await?;
        Self::read_json(res).await
    }

    async fn read_json<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, ApiError> {
        if matches!(
            res.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Err(ApiError::Unauthorized);
        }
        Ok(res.error_for_status()?.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_chat_wire_format() {
        let chat: GroupChat = serde_json::from_str(
            r#"{
                "id": 7,
                "name": "Kaçkar Trekkers",
                "avatar": null,
                "chatType": "Announcement",
                "isAdminOnly": true,
                "isAdmin": false,
                "lastMessage": "Meeting point moved",
                "unreadCount": 3
            }"#,
        )
        .unwrap();
        assert_eq!(chat.chat_type, GroupChatType::Announcement);
        assert!(chat.is_admin_only);
        assert!(!chat.is_admin);
        assert_eq!(chat.unread_count, 3);
    }

    #[test]
    fn test_weather_wire_format() {
        let report: WeatherReport = serde_json::from_str(
            r#"{
                "main": { "temp": 17.4, "feels_like": 16.2, "humidity": 61.0 },
                "weather": [{ "description": "scattered clouds", "icon": "03d" }],
                "wind": { "speed": 5.0 },
                "name": "Rize"
            }"#,
        )
        .unwrap();
        assert_eq!(report.name, "Rize");
        assert_eq!(report.wind.speed, 5.0);
        assert_eq!(report.weather[0].description, "scattered clouds");
    }

    #[test]
    fn test_new_message_skips_absent_target() {
        let body = NewMessage {
            content: "yürüyüşe var mısın?".to_owned(),
            private_chat_id: Some(12),
            group_chat_id: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["privateChatId"], 12);
        assert!(json.get("groupChatId").is_none());
    }
}
