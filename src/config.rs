use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub dictionary: String,
    pub number_of_words: usize,
    pub random_order: bool,
    pub ignore_case: bool,
    pub wrong_pause_ms: u64,
    /// Wrong attempts before the answer is offered; 0 never offers it.
    pub reveal_threshold: usize,
    /// Wrong attempts before the romaji hint line appears.
    pub hint_threshold: usize,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dictionary: "jlpt_n5".to_string(),
            number_of_words: 15,
            random_order: true,
            ignore_case: true,
            wrong_pause_ms: 300,
            reveal_threshold: 4,
            hint_threshold: 3,
            seed: None,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "furitype") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("furitype_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(path = %self.path.display(), %err, "no config file, using defaults");
                return Config::default();
            }
        };
        serde_json::from_slice::<Config>(&bytes).unwrap_or_else(|err| {
            warn!(path = %self.path.display(), %err, "unreadable config, using defaults");
            Config::default()
        })
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
