//! Character document supplied by the system configuration.
//!
//! The chat backend and the scene share one character description; the scene only consumes
//! the model path, the motion file lists and the background images.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::{MotionTable, SceneConfiguration};

const DEFAULT_BACKGROUND: &str = "/assets/bg/bg.jpg";
const DEFAULT_USER_AVATAR: &str = "/avatars/user.png";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterMotion {
    pub file_path: Vec<String>,
    /// Free-text hint the backend uses to decide when to emit this motion.
    pub trigger_condition: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterConfig {
    pub name: String,
    pub bio: String,
    pub avatar: String,
    pub user_avatar: Option<String>,
    pub model: String,
    pub prompt: String,
    pub motion: IndexMap<String, CharacterMotion>,
    pub background_image: Vec<String>,
}

impl CharacterConfig {
    /// Motion name → file list, in document order.
    #[must_use]
    pub fn motion_table(&self) -> MotionTable {
        self.motion
            .iter()
            .map(|(name, m)| (name.clone(), m.file_path.clone()))
            .collect()
    }

    #[must_use]
    pub fn default_background(&self) -> &str {
        self.background_image
            .first()
            .map_or(DEFAULT_BACKGROUND, String::as_str)
    }

    #[must_use]
    pub fn user_avatar(&self) -> &str {
        self.user_avatar
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_USER_AVATAR)
    }
}

/// Top-level system document. Only the character section matters to the scene.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemConfig {
    pub character: CharacterConfig,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

impl SystemConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

impl SceneConfiguration {
    /// Returns a copy with the character's identity, model, motions and backgrounds applied.
    ///
    /// Motions are merged: entries already present keep their position and take the
    /// character's file list, new entries are appended.
    #[must_use]
    pub fn with_character(mut self, character: &CharacterConfig) -> Self {
        self.model.name.clone_from(&character.name);
        self.model.bio.clone_from(&character.bio);
        self.model.avatar.clone_from(&character.avatar);
        self.model.path.clone_from(&character.model);
        self.model.motion.extend(character.motion_table());
        if character.background_image.is_empty() {
            self.background.image = vec![DEFAULT_BACKGROUND.to_string()];
        } else {
            self.background.image.clone_from(&character.background_image);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "character": {
            "name": "Miko",
            "bio": "hello",
            "avatar": "/a.png",
            "model": "/m.json",
            "prompt": "be nice",
            "motion": {
                "wave": {"file_path": ["/w1.json", "/w2.json"], "trigger_condition": "greeting"},
                "idle": {"file_path": ["/i.json"], "trigger_condition": "default"}
            },
            "background_image": ["/bg2.jpg"]
        },
        "llm": {"model": "x"}
    }"#;

    #[test]
    fn character_motion_table_keeps_order() {
        let system = SystemConfig::from_json(DOC).unwrap();
        let table = system.character.motion_table();
        assert_eq!(table.keys().collect::<Vec<_>>(), ["wave", "idle"]);
        assert_eq!(table.get("wave").unwrap().len(), 2);
        assert!(system.rest.contains_key("llm"));
    }

    #[test]
    fn with_character_merges_motions() {
        let system = SystemConfig::from_json(DOC).unwrap();
        let config = SceneConfiguration::default().with_character(&system.character);
        assert_eq!(config.model.path, "/m.json");
        // idle keeps its original slot, wave is appended
        assert_eq!(
            config.animation_names().collect::<Vec<_>>(),
            ["idle", "dance", "walk", "wave"]
        );
        assert_eq!(config.model.motion.get("idle").unwrap(), &vec!["/i.json".to_string()]);
        assert_eq!(config.background.image, vec!["/bg2.jpg".to_string()]);
    }

    #[test]
    fn user_avatar_falls_back() {
        let c = CharacterConfig::default();
        assert_eq!(c.user_avatar(), "/avatars/user.png");
        assert_eq!(c.default_background(), "/assets/bg/bg.jpg");
    }
}
