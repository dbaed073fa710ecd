//! INI parsing: `Ini` → `ConfigFile`.
//!
//! The single place where INI key names map to struct fields.

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use ini::Ini;
use std::path::PathBuf;
use std::str::FromStr;

/// Parse an `Ini` into a `ConfigFile`, overlaying defaults.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [style] section
    if let Some(section) = ini.section(Some("style")) {
        if let Some(v) = section.get("url") {
            let v = v.trim();
            if !v.is_empty() {
                config.style.url = Some(v.to_string());
            }
        }
    }

    // [cache] section
    if let Some(section) = ini.section(Some("cache")) {
        if let Some(v) = section.get("enabled") {
            config.cache.enabled = parse_bool("cache", "enabled", v)?;
        }
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.cache.directory = expand_tilde(v);
            }
        }
    }

    // [fetch] section
    if let Some(section) = ini.section(Some("fetch")) {
        if let Some(v) = section.get("timeout") {
            let timeout: u64 = parse_number("fetch", "timeout", v)?;
            if timeout == 0 {
                return Err(invalid("fetch", "timeout", v, "must be a positive integer (seconds)"));
            }
            config.fetch.timeout = timeout;
        }
    }

    // [pipeline] section
    if let Some(section) = ini.section(Some("pipeline")) {
        if let Some(v) = section.get("hybrid") {
            config.pipeline.hybrid = parse_bool("pipeline", "hybrid", v)?;
        }
        if let Some(v) = section.get("background_to_raster") {
            config.pipeline.background_to_raster =
                parse_bool("pipeline", "background_to_raster", v)?;
        }
    }

    // [render] section
    if let Some(section) = ini.section(Some("render")) {
        if let Some(v) = section.get("base_draw_priority") {
            config.render.base_draw_priority = parse_number("render", "base_draw_priority", v)?;
        }
        if let Some(v) = section.get("draw_priority_per_level") {
            config.render.draw_priority_per_level =
                parse_number("render", "draw_priority_per_level", v)?;
        }
        if let Some(v) = section.get("line_scale") {
            config.render.line_scale = parse_scale("line_scale", v)?;
        }
        if let Some(v) = section.get("text_scale") {
            config.render.text_scale = parse_scale("text_scale", v)?;
        }
        if let Some(v) = section.get("marker_scale") {
            config.render.marker_scale = parse_scale("marker_scale", v)?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_bool(section: &str, key: &str, value: &str) -> Result<bool, ConfigFileError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(invalid(section, key, value, "must be true or false")),
    }
}

fn parse_number<T: FromStr>(section: &str, key: &str, value: &str) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, "must be an integer"))
}

fn parse_scale(key: &str, value: &str) -> Result<f32, ConfigFileError> {
    match value.trim().parse::<f32>() {
        Ok(scale) if scale.is_finite() && scale > 0.0 => Ok(scale),
        _ => Err(invalid("render", key, value, "must be a positive number")),
    }
}

/// Expand a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn load(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(&config_path, content).unwrap();
        ConfigFile::load_from(&config_path)
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = load(
            r#"
[style]
url = https://tiles.example.com/style.json
"#,
        )
        .unwrap();

        assert_eq!(
            config.style.url.as_deref(),
            Some("https://tiles.example.com/style.json")
        );
        assert!(config.pipeline.hybrid);
        assert!(config.pipeline.background_to_raster);
        assert_eq!(config.render, ConfigFile::default().render);
    }

    #[test]
    fn test_full_config() {
        let config = load(
            r#"
[cache]
enabled = no
directory = /var/cache/styles

[fetch]
timeout = 5

[pipeline]
hybrid = false
background_to_raster = off

[render]
base_draw_priority = 20
draw_priority_per_level = 2
line_scale = 1.5
text_scale = 0.8
marker_scale = 2
"#,
        )
        .unwrap();

        assert!(!config.cache.enabled);
        assert_eq!(config.cache.directory, PathBuf::from("/var/cache/styles"));
        assert_eq!(config.fetch.timeout, 5);
        assert!(!config.pipeline.hybrid);
        assert!(!config.pipeline.background_to_raster);
        assert_eq!(config.render.base_draw_priority, 20);
        assert_eq!(config.render.draw_priority_per_level, 2);
        assert_eq!(config.render.line_scale, 1.5);
        assert_eq!(config.render.marker_scale, 2.0);
    }

    #[test]
    fn test_invalid_bool() {
        let err = load("[pipeline]\nhybrid = maybe\n").unwrap_err();
        assert!(err.to_string().contains("pipeline.hybrid"));
        assert!(err.to_string().contains("true or false"));
    }

    #[test]
    fn test_invalid_scale() {
        let err = load("[render]\ntext_scale = -1\n").unwrap_err();
        assert!(err.to_string().contains("text_scale"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(load("[fetch]\ntimeout = 0\n").is_err());
    }

    #[test]
    fn test_blank_url_ignored() {
        let config = load("[style]\nurl =   \n").unwrap();
        assert!(config.style.url.is_none());
    }

    #[test]
    fn test_expand_tilde() {
        let path = expand_tilde("~/styles/cache");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path, home.join("styles/cache"));
        }
        assert_eq!(expand_tilde("/absolute/path"), PathBuf::from("/absolute/path"));
    }
}
