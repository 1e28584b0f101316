//! Load `.ytharvest.toml` from a directory (CLI only). Lib callers build [`Opts`] directly.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::Opts;
use crate::utils::config::PackagePaths;

#[derive(Debug, Deserialize)]
pub(crate) struct SettingsToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    channel_id: Option<String>,
    store_path: Option<String>,
    write_concurrency: Option<usize>,
    verbose: Option<bool>,
}

/// Load the settings file from `dir` if present. Returns None if missing, unreadable or malformed.
pub(crate) fn load_settings_toml(dir: &Path) -> Option<SettingsToml> {
    let path = dir.join(PackagePaths::get().settings_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_settings_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

pub(crate) fn parse_settings_toml(s: &str) -> Result<SettingsToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($section:expr, $opts:expr, $file_field:ident => $opts_field:ident) => {
        if let Some(v) = $section.$file_field.clone() {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file settings to opts (only fields present in the file). Call before applying CLI flags.
pub(crate) fn apply_file_to_opts(file: &SettingsToml, opts: &mut Opts) {
    let s = &file.settings;
    apply_file_opt!(s, opts, channel_id => channel_id);
    if let Some(ref p) = s.store_path {
        opts.store_path = PathBuf::from(p);
    }
    apply_file_opt!(s, opts, write_concurrency => write_concurrency);
    apply_file_opt!(s, opts, verbose => verbose);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::cli::default_opts;

    #[test]
    fn file_overrides_only_present_fields() {
        let file = parse_settings_toml(
            r#"
            [settings]
            channel_id = "UCfromfile"
            write_concurrency = 3
            "#,
        )
        .unwrap();
        let mut opts = default_opts();
        let store_before = opts.store_path.clone();
        apply_file_to_opts(&file, &mut opts);
        assert_eq!(opts.channel_id, "UCfromfile");
        assert_eq!(opts.write_concurrency, 3);
        assert_eq!(opts.store_path, store_before);
        assert!(!opts.verbose);
    }

    #[test]
    fn missing_settings_table_is_empty() {
        let file = parse_settings_toml("").unwrap();
        let mut opts = default_opts();
        let channel_before = opts.channel_id.clone();
        apply_file_to_opts(&file, &mut opts);
        assert_eq!(opts.channel_id, channel_before);
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(parse_settings_toml("[settings]\nwrite_concurrency = \"many\"").is_err());
    }
}
