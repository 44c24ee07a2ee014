pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::Settings;

use crate::error::AppResult;

/// Blank or whitespace-only profile names collapse to the default profile.
pub fn resolve_profile(requested: &str) -> String {
    let trimmed = requested.trim();
    if trimmed.is_empty() {
        return "default".to_string();
    }

    trimmed.to_string()
}

pub fn load_settings(paths: &AppPaths, profile: &str) -> AppResult<Settings> {
    settings::load(paths.settings_file(profile))
}

pub fn save_settings(paths: &AppPaths, profile: &str, settings: &Settings) -> AppResult<()> {
    settings::save(paths.settings_file(profile), settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_profile_resolves_to_default() {
        assert_eq!(resolve_profile(""), "default");
        assert_eq!(resolve_profile("   "), "default");
    }

    #[test]
    fn named_profile_is_trimmed() {
        assert_eq!(resolve_profile("  work  "), "work");
    }
}
