use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn log_dir() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("furitype")
        } else {
            ProjectDirs::from("", "", "furitype")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("logs"))
                .unwrap_or_else(|| PathBuf::from("logs"))
        }
    }
}
