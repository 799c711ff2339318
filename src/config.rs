use filters::ExpressionSpec;
use layout::Viewport;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use watchers::DispatchConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid page configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid page configuration: {0}")]
    Invalid(String),
}

/// Filter expressions applied to posts and comments.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub posts: ExpressionSpec,
    pub comments: ExpressionSpec,
}

/// Page session settings, loaded from TOML.
///
/// ```toml
/// viewport_height = 900
/// groups_per_turn = 2
///
/// [filters.posts]
/// combine = "any"
/// cases = [{ case = "isNSFW" }, { case = "postType", criterion = "self" }]
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub scroll_y: f32,
    pub groups_per_turn: usize,
    pub sort_sitetables: bool,
    pub filters: FilterConfig,
}

impl Default for PageConfig {
    fn default() -> Self {
        let viewport = Viewport::default();
        let dispatch = DispatchConfig::default();
        Self {
            viewport_width: viewport.width,
            viewport_height: viewport.height,
            scroll_y: viewport.scroll_y,
            groups_per_turn: dispatch.groups_per_turn,
            sort_sitetables: dispatch.sort_sitetables,
            filters: FilterConfig::default(),
        }
    }
}

impl PageConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: PageConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.groups_per_turn == 0 {
            return Err(ConfigError::Invalid("groups_per_turn must be at least 1".into()));
        }
        if !(self.viewport_width > 0.0 && self.viewport_height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "viewport must be positive, got {}x{}",
                self.viewport_width, self.viewport_height
            )));
        }
        Ok(())
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.viewport_width,
            height: self.viewport_height,
            scroll_y: self.scroll_y,
        }
    }

    pub fn dispatch(&self) -> DispatchConfig {
        DispatchConfig {
            groups_per_turn: self.groups_per_turn,
            sort_sitetables: self.sort_sitetables,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = PageConfig::from_toml_str("").unwrap();
        assert_eq!(config.viewport(), Viewport::default());
        assert_eq!(config.dispatch(), DispatchConfig::default());
        assert!(config.filters.posts.cases.is_empty());
    }

    #[test]
    fn overrides_and_filters_are_read() {
        let config = PageConfig::from_toml_str(
            r#"
            viewport_height = 900
            scroll_y = 120
            groups_per_turn = 3
            sort_sitetables = false

            [filters.posts]
            combine = "any"
            cases = [{ case = "isNSFW" }, { case = "postType", criterion = "self" }]
            "#,
        )
        .unwrap();
        assert_eq!(config.viewport().height, 900.0);
        assert_eq!(config.viewport().scroll_y, 120.0);
        assert_eq!(config.dispatch().groups_per_turn, 3);
        assert!(!config.dispatch().sort_sitetables);
        assert_eq!(config.filters.posts.cases.len(), 2);
        assert_eq!(config.filters.posts.cases[1].criterion.as_deref(), Some("self"));
    }

    #[test]
    fn nonsense_is_rejected() {
        assert!(matches!(
            PageConfig::from_toml_str("groups_per_turn = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            PageConfig::from_toml_str("viewport_width = \"wide\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
