//! Gateway configuration.

use std::path::Path;

use notepad_renderer::ExportConfig;
use serde::{Deserialize, Serialize};

use crate::sharer::CancelPolicy;

/// Text and policy for shares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShareConfig {
    /// Native share title.
    pub title: String,
    /// Share text and intent message.
    pub text: String,
    /// Page URL for Facebook's `u` parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,
    /// Name of the file attached to native shares.
    pub file_name: String,
    /// Behaviour when the share sheet is dismissed.
    pub cancel_policy: CancelPolicy,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            title: "My Note".to_string(),
            text: "Check out my note!".to_string(),
            page_url: None,
            file_name: "note.jpg".to_string(),
            cancel_policy: CancelPolicy::default(),
        }
    }
}

/// Everything the gateway needs to know.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Rendering and encoding.
    pub export: ExportConfig,
    /// Sharing.
    pub share: ShareConfig,
}

impl GatewayConfig {
    /// Parse from JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let json = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json(&json).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json() {
        let config = GatewayConfig::from_json(
            r#"{"share": {"pageUrl": "https://notes.example/", "cancelPolicy": "stop"}}"#,
        )
        .expect("parse");
        assert_eq!(config.share.cancel_policy, CancelPolicy::Stop);
        assert_eq!(config.share.page_url.as_deref(), Some("https://notes.example/"));
        assert_eq!(config.share.title, "My Note");
        assert_eq!(config.export.jpeg_quality, 95);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = GatewayConfig::default();
        let json = config.to_json().expect("json");
        assert_eq!(GatewayConfig::from_json(&json).expect("parse"), config);
    }

    #[tokio::test]
    async fn test_load_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("notepad.json");
        std::fs::write(&path, r#"{"export": {"jpegQuality": 60}}"#).expect("write");

        let config = GatewayConfig::load(&path).await.expect("load");
        assert_eq!(config.export.jpeg_quality, 60);

        std::fs::write(&path, "{not json").expect("write");
        assert!(GatewayConfig::load(&path).await.is_err());
    }
}
