//! # Config Commands
//!
//! `config show` prints the effective configuration (file + environment +
//! flags); `config init` writes a config file.

use std::path::{Path, PathBuf};

use cashbook_sync::CashbookConfig;
use serde::Serialize;
use tracing::info;

use super::render;
use crate::error::{AppError, AppResult};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigView<'a> {
    config_path: Option<PathBuf>,
    database_path: Option<PathBuf>,
    config: &'a CashbookConfig,
}

pub fn show(config: &CashbookConfig, config_path: Option<&Path>, json: bool) -> AppResult<String> {
    let view = ConfigView {
        config_path: config_path
            .map(Path::to_path_buf)
            .or_else(CashbookConfig::default_config_path),
        database_path: config.database_path(),
        config,
    };

    render(json, &view, |view| {
        let toml = toml_text(view.config);
        format!(
            "# config file: {}\n# database:    {}\n{}",
            display_path(view.config_path.as_deref()),
            display_path(view.database_path.as_deref()),
            toml
        )
    })
}

/// Writes `config`, optionally with a mirror endpoint, to `config_path` or
/// the platform default.
pub fn init(
    mut config: CashbookConfig,
    config_path: Option<&Path>,
    mirror_url: Option<String>,
    force: bool,
    json: bool,
) -> AppResult<String> {
    let target = config_path
        .map(Path::to_path_buf)
        .or_else(CashbookConfig::default_config_path)
        .ok_or_else(|| AppError::config("No config path available on this platform"))?;

    if target.exists() && !force {
        return Err(AppError::config(format!(
            "{} already exists; pass --force to overwrite",
            target.display()
        )));
    }

    if let Some(url) = mirror_url {
        config.mirror.endpoint = Some(url);
        config.mirror.enabled = true;
    }
    config.validate()?;

    let written = config.save(Some(target))?;
    info!(path = %written.display(), "Config file written");

    render(json, &written, |path| format!("Wrote {}", path.display()))
}

fn toml_text(config: &CashbookConfig) -> String {
    toml::to_string_pretty(config)
        .unwrap_or_else(|e| format!("# could not render config: {}\n{:#?}", e, config))
}

fn display_path(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "(unavailable)".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_and_refuses_overwrite() {
        let dir = std::env::temp_dir().join(format!("cashbook-config-{}", std::process::id()));
        let path = dir.join("cashbook.toml");
        let _ = std::fs::remove_file(&path);

        let out = init(
            CashbookConfig::default(),
            Some(&path),
            Some("https://script.example.com/exec".into()),
            false,
            false,
        )
        .unwrap();
        assert!(out.starts_with("Wrote"));

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("enabled = true"));

        assert!(init(CashbookConfig::default(), Some(&path), None, false, false).is_err());
        assert!(init(CashbookConfig::default(), Some(&path), None, true, false).is_ok());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_show_includes_sections() {
        let mut config = CashbookConfig::default();
        config.user.identity = Some("asha".into());

        let out = show(&config, Some(Path::new("/tmp/cashbook.toml")), false).unwrap();
        assert!(out.contains("# config file: /tmp/cashbook.toml"));
        assert!(out.contains("identity = \"asha\""));
        assert!(out.contains("[mirror]"));
    }
}
