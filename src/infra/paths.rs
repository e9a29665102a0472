// src/infra/paths.rs — Config and data locations
//
// RECOMMENDER_HOME overrides everything: config and data both live under it.
// Otherwise config is ~/.project-recommender/ and data is XDG_DATA_HOME/project-recommender.

use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

fn recommender_home() -> Option<PathBuf> {
    std::env::var_os("RECOMMENDER_HOME").map(PathBuf::from)
}

/// Home directory, falling back to the working directory on exotic systems.
pub fn dirs_home() -> PathBuf {
    BaseDirs::new()
        .map(|b| b.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn config_dir() -> PathBuf {
    if let Some(home) = recommender_home() {
        return home;
    }
    dirs_home().join(".project-recommender")
}

pub fn data_dir() -> PathBuf {
    if let Some(home) = recommender_home() {
        return home.join("data");
    }
    ProjectDirs::from("", "", "project-recommender")
        .map(|p| p.data_local_dir().to_path_buf())
        .unwrap_or_else(|| config_dir().join("data"))
}

pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

pub fn db_path() -> PathBuf {
    data_dir().join("recommender.db")
}
