//! Bot presence from `BOT_STATUS` / `ACTIVITY_TYPE` / `ACTIVITY_NAME`.

use serenity::gateway::ActivityData;
use serenity::model::user::OnlineStatus;
use tracing::warn;

/// Activity verb shown next to the bot's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Playing,
    Watching,
    Listening,
    Streaming,
    Competing,
}

impl ActivityKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PLAYING" => Some(ActivityKind::Playing),
            "WATCHING" => Some(ActivityKind::Watching),
            "LISTENING" => Some(ActivityKind::Listening),
            "STREAMING" => Some(ActivityKind::Streaming),
            "COMPETING" => Some(ActivityKind::Competing),
            _ => None,
        }
    }
}

/// Desired presence, independent of serenity types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceConfig {
    pub status: OnlineStatus,
    pub activity: Option<(ActivityKind, String)>,
    /// Stream URL, required by Discord for the streaming activity.
    pub stream_url: Option<String>,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            status: OnlineStatus::Online,
            activity: None,
            stream_url: None,
        }
    }
}

fn parse_status(s: &str) -> Option<OnlineStatus> {
    match s.trim().to_ascii_lowercase().as_str() {
        "online" => Some(OnlineStatus::Online),
        "idle" => Some(OnlineStatus::Idle),
        "dnd" => Some(OnlineStatus::DoNotDisturb),
        "invisible" => Some(OnlineStatus::Invisible),
        _ => None,
    }
}

impl PresenceConfig {
    /// Load from process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unknown values are logged and replaced by defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("BOT_STATUS").filter(|s| !s.trim().is_empty()) {
            match parse_status(&raw) {
                Some(status) => config.status = status,
                None => warn!(value = %raw, "Unknown BOT_STATUS, using online"),
            }
        }

        let name = lookup("ACTIVITY_NAME").filter(|s| !s.trim().is_empty());
        let kind = lookup("ACTIVITY_TYPE").filter(|s| !s.trim().is_empty());
        config.activity = match (kind, name) {
            (Some(kind), Some(name)) => match ActivityKind::parse(&kind) {
                Some(kind) => Some((kind, name)),
                None => {
                    warn!(value = %kind, "Unknown ACTIVITY_TYPE, activity not set");
                    None
                }
            },
            (None, Some(name)) => Some((ActivityKind::Playing, name)),
            _ => None,
        };
        config.stream_url = lookup("ACTIVITY_URL").filter(|s| !s.trim().is_empty());

        config
    }

    /// Serenity activity for the configured kind and name.
    pub fn activity_data(&self) -> Option<ActivityData> {
        let (kind, name) = self.activity.as_ref()?;
        let data = match kind {
            ActivityKind::Playing => ActivityData::playing(name.clone()),
            ActivityKind::Watching => ActivityData::watching(name.clone()),
            ActivityKind::Listening => ActivityData::listening(name.clone()),
            ActivityKind::Competing => ActivityData::competing(name.clone()),
            ActivityKind::Streaming => {
                let url = self.stream_url.as_deref().unwrap_or_default();
                match ActivityData::streaming(name.clone(), url) {
                    Ok(data) => data,
                    Err(e) => {
                        warn!(error = %e, "Invalid ACTIVITY_URL, showing as playing");
                        ActivityData::playing(name.clone())
                    }
                }
            }
        };
        Some(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let presence = PresenceConfig::from_lookup(lookup(&[]));
        assert_eq!(presence.status, OnlineStatus::Online);
        assert!(presence.activity.is_none());
        assert!(presence.activity_data().is_none());
    }

    #[test]
    fn test_status_and_activity() {
        let presence = PresenceConfig::from_lookup(lookup(&[
            ("BOT_STATUS", "dnd"),
            ("ACTIVITY_TYPE", "watching"),
            ("ACTIVITY_NAME", "the channels"),
        ]));
        assert_eq!(presence.status, OnlineStatus::DoNotDisturb);
        assert_eq!(
            presence.activity,
            Some((ActivityKind::Watching, "the channels".to_string()))
        );
        assert_eq!(presence.activity_data().unwrap().name, "the channels");
    }

    #[test]
    fn test_unknown_values_fall_back() {
        let presence = PresenceConfig::from_lookup(lookup(&[
            ("BOT_STATUS", "busy"),
            ("ACTIVITY_TYPE", "DANCING"),
            ("ACTIVITY_NAME", "Discord"),
        ]));
        assert_eq!(presence.status, OnlineStatus::Online);
        assert!(presence.activity.is_none());
    }

    #[test]
    fn test_name_without_type_is_playing() {
        let presence = PresenceConfig::from_lookup(lookup(&[("ACTIVITY_NAME", "Discord")]));
        assert_eq!(
            presence.activity,
            Some((ActivityKind::Playing, "Discord".to_string()))
        );
    }

    #[test]
    fn test_streaming_without_url_degrades() {
        let presence = PresenceConfig::from_lookup(lookup(&[
            ("ACTIVITY_TYPE", "STREAMING"),
            ("ACTIVITY_NAME", "live coding"),
        ]));
        assert!(presence.activity_data().is_some());
    }
}
