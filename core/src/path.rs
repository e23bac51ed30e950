//! Save directory path resolution
//!
//! A slot directory is named by concatenating the game id and the save name,
//! e.g. `ULUS10000` + `DATA00` = `ULUS10000DATA00`, and lives directly under
//! the configured save root.

use crate::bounded::{GameName, SaveName};
use crate::config::PathsConfig;

/// Directory name of a slot: game id followed by save name.
pub fn save_dir(game: &GameName, save: &SaveName) -> String {
    let mut dir = game.to_string_lossy();
    dir.push_str(&save.to_string_lossy());
    dir
}

/// Resolves slot names to full virtual paths under a save root.
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    paths: &'a PathsConfig,
}

impl<'a> PathResolver<'a> {
    pub fn new(paths: &'a PathsConfig) -> Self {
        Self { paths }
    }

    pub fn root(&self) -> &str {
        &self.paths.root
    }

    /// Full path of a slot directory.
    pub fn dir_path(&self, dir: &str) -> String {
        format!("{}{}", self.paths.root, dir)
    }

    /// Full path of a file inside a slot directory.
    pub fn file_path(&self, dir: &str, file: &str) -> String {
        format!("{}{}/{}", self.paths.root, dir, file)
    }

    pub fn sfo_path(&self, dir: &str) -> String {
        self.file_path(dir, &self.paths.sfo)
    }

    pub fn sfo_name(&self) -> &'a str {
        let paths: &'a PathsConfig = self.paths;
        &paths.sfo
    }

    pub fn icon0_path(&self, dir: &str) -> String {
        self.file_path(dir, &self.paths.icon0)
    }

    /// Asset file names in request order: icon0, icon1, pic1, snd0.
    pub fn asset_names(&self) -> [&'a str; 4] {
        let paths: &'a PathsConfig = self.paths;
        [
            paths.icon0.as_str(),
            paths.icon1.as_str(),
            paths.pic1.as_str(),
            paths.snd0.as_str(),
        ]
    }
}
