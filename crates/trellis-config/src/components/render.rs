//! Render pipeline configuration

use serde::{Deserialize, Serialize};

/// How full documents are produced
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RenderModeConfig {
    /// Render the whole document before responding
    #[default]
    String,
    /// Flush markup at layout boundaries as it is produced
    Streaming,
}

/// Render pipeline and document shell settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Mode used for full-document renders
    pub mode: RenderModeConfig,
    /// Number of chunks buffered per streaming response before the
    /// producer waits for the client
    pub stream_buffer: usize,
    /// Document `<title>`
    pub title: String,
    /// Client runtime entry script, loaded as a module after the
    /// hydration data block
    pub client_entry: Option<String>,
    /// Stylesheet URLs linked from the document head
    pub stylesheets: Vec<String>,
    /// Element id of the inline hydration data block
    pub data_script_id: String,
    /// Document language attribute
    pub lang: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: RenderModeConfig::String,
            stream_buffer: 16,
            title: "Trellis".to_string(),
            client_entry: None,
            stylesheets: Vec::new(),
            data_script_id: "__TRELLIS_DATA__".to_string(),
            lang: "en".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_lowercase() {
        let config: RenderConfig = toml::from_str(r#"mode = "streaming""#).unwrap();
        assert_eq!(config.mode, RenderModeConfig::Streaming);
        assert_eq!(config.stream_buffer, 16);
    }

    #[test]
    fn shell_fields_deserialize() {
        let toml = r#"
            title = "Admin"
            client_entry = "/assets/client.js"
            stylesheets = ["/assets/app.css"]
        "#;
        let config: RenderConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.title, "Admin");
        assert_eq!(config.client_entry.as_deref(), Some("/assets/client.js"));
        assert_eq!(config.stylesheets, vec!["/assets/app.css".to_string()]);
        assert_eq!(config.data_script_id, "__TRELLIS_DATA__");
    }
}
