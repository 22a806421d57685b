//! Throw-away Chrome profile carrying the download preferences.

use std::path::Path;

use serde_json::json;
use tempfile::TempDir;

/// Preferences that make Chrome save PDFs to `download_dir` without asking.
pub fn download_preferences(download_dir: &Path) -> serde_json::Value {
    json!({
        "download": {
            "default_directory": download_dir.to_string_lossy(),
            "prompt_for_download": false,
            "directory_upgrade": true
        },
        "plugins": {
            "always_open_pdf_externally": true
        },
        "safebrowsing": {
            "enabled": false
        }
    })
}

/// Create a profile directory with `Default/Preferences` pre-seeded.
///
/// The directory is removed when the returned handle is dropped.
pub fn create_profile(download_dir: &Path) -> std::io::Result<TempDir> {
    let profile = tempfile::Builder::new()
        .prefix("pdfsweep-profile-")
        .tempdir()?;

    let default_dir = profile.path().join("Default");
    std::fs::create_dir_all(&default_dir)?;

    let prefs = serde_json::to_vec_pretty(&download_preferences(download_dir))
        .map_err(std::io::Error::other)?;
    std::fs::write(default_dir.join("Preferences"), prefs)?;

    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferences_force_pdf_download() {
        let prefs = download_preferences(Path::new("/data/pdfs"));
        assert_eq!(prefs["download"]["default_directory"], "/data/pdfs");
        assert_eq!(prefs["download"]["prompt_for_download"], false);
        assert_eq!(prefs["plugins"]["always_open_pdf_externally"], true);
        assert_eq!(prefs["safebrowsing"]["enabled"], false);
    }

    #[test]
    fn test_create_profile_writes_preferences() {
        let downloads = tempfile::tempdir().unwrap();
        let profile = create_profile(downloads.path()).unwrap();

        let written = std::fs::read_to_string(profile.path().join("Default/Preferences")).unwrap();
        let prefs: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(
            prefs["download"]["default_directory"],
            downloads.path().to_string_lossy().as_ref()
        );

        let path = profile.path().to_path_buf();
        drop(profile);
        assert!(!path.exists());
    }
}
