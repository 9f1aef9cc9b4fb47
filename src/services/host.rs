//! Host platform bridge (the mini-app SDK)

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

use super::leaderboard::PlayerProfile;

/// Notifications sent from the game to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// Play scene is up
    Ready,
    GameOver { score: u64 },
    /// Vibrate on player hit and death
    Haptic,
}

/// Messages the host may send to the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostMessage {
    PlayAgain,
    /// Carries the host's `isMuted` when it sends one; otherwise flip
    ToggleMute { is_muted: Option<bool> },
}

/// `toggle_mute` payload
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MutePayload {
    is_muted: Option<bool>,
}

impl HostMessage {
    /// Decode a message by name and its JSON payload (if any)
    pub fn parse(name: &str, payload: Option<&str>) -> Option<Self> {
        match name {
            "play_again" => Some(HostMessage::PlayAgain),
            "toggle_mute" => {
                let is_muted = payload
                    .and_then(|json| serde_json::from_str::<MutePayload>(json).ok())
                    .and_then(|p| p.is_muted);
                Some(HostMessage::ToggleMute { is_muted })
            }
            _ => None,
        }
    }
}

/// Player identity the host shares through `sdk.context`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HostContext {
    pub user: Option<HostUser>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HostUser {
    pub username: Option<String>,
    pub fid: u64,
    pub pfp_url: Option<String>,
}

impl HostContext {
    pub fn from_json(json: &str) -> Self {
        serde_json::from_str(json).unwrap_or_else(|err| {
            log::warn!("Unreadable host context: {err}");
            Self::default()
        })
    }

    pub fn profile(&self) -> PlayerProfile {
        match &self.user {
            Some(user) => PlayerProfile {
                username: user.username.clone(),
                fid: user.fid,
                pfp: user.pfp_url.clone(),
            },
            None => PlayerProfile::default(),
        }
    }
}

pub trait HostBridge {
    fn notify(&self, event: &HostEvent);
}

/// Writes host events to the log (native harness)
#[derive(Debug, Default)]
pub struct LogHost;

impl HostBridge for LogHost {
    fn notify(&self, event: &HostEvent) {
        log::info!("host <- {event:?}");
    }
}

/// Keeps every event it receives
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub events: RefCell<Vec<HostEvent>>,
}

impl HostBridge for RecordingHost {
    fn notify(&self, event: &HostEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_messages() {
        assert_eq!(HostMessage::parse("play_again", None), Some(HostMessage::PlayAgain));
        assert_eq!(
            HostMessage::parse("toggle_mute", None),
            Some(HostMessage::ToggleMute { is_muted: None })
        );
        assert_eq!(
            HostMessage::parse("toggle_mute", Some(r#"{"isMuted":true}"#)),
            Some(HostMessage::ToggleMute { is_muted: Some(true) })
        );
        assert_eq!(
            HostMessage::parse("toggle_mute", Some("garbage")),
            Some(HostMessage::ToggleMute { is_muted: None })
        );
        assert_eq!(HostMessage::parse("pause", None), None);
    }

    #[test]
    fn test_context_profile() {
        let ctx = HostContext::from_json(
            r#"{"user":{"username":"zed","fid":77,"pfpUrl":"https://x/p.png"},"client":{}}"#,
        );
        let profile = ctx.profile();
        assert_eq!(profile.username.as_deref(), Some("zed"));
        assert_eq!(profile.fid, 77);
        assert_eq!(profile.pfp.as_deref(), Some("https://x/p.png"));
        assert_eq!(HostContext::from_json("null").profile(), PlayerProfile::default());
    }

    #[test]
    fn test_recording_host_keeps_order() {
        let host = RecordingHost::default();
        host.notify(&HostEvent::Ready);
        host.notify(&HostEvent::GameOver { score: 3 });
        assert_eq!(
            *host.events.borrow(),
            vec![HostEvent::Ready, HostEvent::GameOver { score: 3 }]
        );
    }

    #[test]
    fn test_game_over_wire_form() {
        let json = serde_json::to_string(&HostEvent::GameOver { score: 42 }).unwrap();
        assert_eq!(json, r#"{"type":"game_over","score":42}"#);
    }
}
