use std::path::Path;
use std::time::Duration;

use anyhow::anyhow;
use config::{Config, File};
use serde::Deserialize;
use tracing::warn;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Master switch; when off nothing is indexed
    pub indexing_enabled: bool,
    /// Reindex unsaved documents while typing
    pub live_indexing: bool,
    /// Debounce for live indexing, in milliseconds
    pub live_indexing_delay: u64,
    pub index_on_save: bool,
    /// Glob patterns, relative to the workspace root, of files never indexed
    pub exclude: Vec<String>,
    pub hover: bool,
}

impl Settings {
    pub fn new(root_dir: &Path) -> anyhow::Result<Settings> {
        let expanded = shellexpand::tilde("~/.config/hcl-index/settings");
        let settings = Config::builder()
            .add_source(File::with_name(&expanded).required(false))
            .add_source(
                File::with_name(&format!(
                    "{}/.hcl-index",
                    root_dir
                        .to_str()
                        .ok_or(anyhow!("Can't convert root_dir to str"))?
                ))
                .required(false),
            )
            .set_default("indexing_enabled", true)?
            .set_default("live_indexing", true)?
            .set_default("live_indexing_delay", 500)?
            .set_default("index_on_save", true)?
            .set_default("exclude", Vec::<String>::new())?
            .set_default("hover", true)?
            .build()
            .map_err(|err| anyhow!("Build err: {err}"))?;

        let settings = settings.try_deserialize::<Settings>()?;

        anyhow::Ok(settings)
    }

    /// Applies a `workspace/didChangeConfiguration` payload. Settings may be
    /// nested under an `indexing` key. Unknown keys are ignored; a payload
    /// with a mistyped key is ignored as a whole.
    pub fn merge_json(&self, value: &serde_json::Value) -> Settings {
        let overrides = value.get("indexing").unwrap_or(value);
        let patch = match SettingsPatch::deserialize(overrides) {
            Ok(patch) => patch,
            Err(err) => {
                warn!(%err, "ignoring invalid settings");
                return self.clone();
            }
        };

        Settings {
            indexing_enabled: patch.enabled.unwrap_or(self.indexing_enabled),
            live_indexing: patch.live_indexing.unwrap_or(self.live_indexing),
            live_indexing_delay: patch.live_indexing_delay.unwrap_or(self.live_indexing_delay),
            index_on_save: patch.index_on_save.unwrap_or(self.index_on_save),
            exclude: patch.exclude.unwrap_or_else(|| self.exclude.clone()),
            hover: patch.hover.unwrap_or(self.hover),
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.live_indexing_delay)
    }
}

/// Client-side settings, as editors send them.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SettingsPatch {
    enabled: Option<bool>,
    live_indexing: Option<bool>,
    live_indexing_delay: Option<u64>,
    index_on_save: Option<bool>,
    exclude: Option<Vec<String>>,
    hover: Option<bool>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            indexing_enabled: true,
            live_indexing: true,
            live_indexing_delay: 500,
            index_on_save: true,
            exclude: Vec::new(),
            hover: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_utils::create_test_workspace_dir;

    #[test]
    fn test_defaults_without_config_files() {
        let (_temp_dir, root) = create_test_workspace_dir();

        let settings = Settings::new(&root).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_workspace_config_file_overrides_defaults() {
        let (_temp_dir, root) = create_test_workspace_dir();
        std::fs::write(
            root.join(".hcl-index.toml"),
            "live_indexing_delay = 50\nexclude = [\"vendor/**\"]\n",
        )
        .unwrap();

        let settings = Settings::new(&root).unwrap();
        assert_eq!(settings.live_indexing_delay, 50);
        assert_eq!(settings.exclude, vec!["vendor/**"]);
        assert!(settings.index_on_save);
    }

    #[test]
    fn test_merge_json() {
        let settings = Settings::default().merge_json(&json!({
            "indexing": {
                "enabled": false,
                "liveIndexingDelay": 100,
                "exclude": ["a/*.tf"],
                "unknown": 1
            }
        }));

        assert!(!settings.indexing_enabled);
        assert_eq!(settings.live_indexing_delay, 100);
        assert_eq!(settings.exclude, vec!["a/*.tf"]);
        assert!(settings.hover);
        assert!(settings.live_indexing);
        assert_eq!(settings.debounce(), Duration::from_millis(100));
    }

    #[test]
    fn test_merge_json_top_level_keys() {
        let settings = Settings::default().merge_json(&json!({
            "liveIndexing": false,
            "indexOnSave": false
        }));

        assert!(!settings.live_indexing);
        assert!(!settings.index_on_save);
        assert!(settings.indexing_enabled);
    }

    #[test]
    fn test_merge_json_mistyped_is_ignored() {
        let settings = Settings::default().merge_json(&json!({
            "indexing": { "enabled": false, "hover": "yes" }
        }));

        assert_eq!(settings, Settings::default());
    }
}
