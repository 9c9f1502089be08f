//! Module for searching for bluehid config files

use std::{
    fs::{self, DirEntry},
    path::{Path, PathBuf},
};

/// Base system fallback path to use if one cannot be found with XDG
const FALLBACK_BASE_PATH: &str = "/usr/share/bluehid";

/// Name of the main configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Returns the base path for configuration data
pub fn get_base_path() -> PathBuf {
    let Ok(base_dirs) = xdg::BaseDirectories::with_prefix("bluehid") else {
        log::warn!("Unable to determine config base path. Using fallback path.");
        return PathBuf::from(FALLBACK_BASE_PATH);
    };

    // Get the data directories in preference order
    let data_dirs = base_dirs.get_data_dirs();
    for dir in data_dirs {
        if dir.exists() {
            return dir;
        }
    }

    log::warn!("Config base path not found. Using fallback path.");
    PathBuf::from(FALLBACK_BASE_PATH)
}

/// Returns the list of config file locations in load order.
/// E.g. ["/etc/bluehid/config.yaml", "/usr/share/bluehid/config.yaml"]
pub fn get_config_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("./rootfs/usr/share/bluehid").join(CONFIG_FILE_NAME),
        PathBuf::from("/etc/bluehid").join(CONFIG_FILE_NAME),
        get_base_path().join(CONFIG_FILE_NAME),
    ]
}

/// Returns a list of directories in load order to find keymaps.
/// E.g. ["/etc/bluehid/keymaps.d", "/usr/share/bluehid/keymaps"]
pub fn get_keymaps_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("./rootfs/usr/share/bluehid/keymaps"),
        PathBuf::from("/etc/bluehid/keymaps.d"),
        get_base_path().join("keymaps"),
    ]
}

/// Resolve a keymap reference from the configuration or command line. A
/// reference that points at an existing file is used as-is, otherwise it is
/// treated as a keymap name and looked up as "<name>.yaml" in the keymap
/// directories.
pub fn find_keymap(reference: &Path) -> Option<PathBuf> {
    if reference.is_file() {
        return Some(reference.to_path_buf());
    }
    let name = reference.to_str()?;
    let file_name = format!("{name}.yaml");
    let files = get_multidir_sorted_files(get_keymaps_paths().as_slice(), |entry| {
        entry.file_name().to_str() == Some(file_name.as_str())
    });
    files.into_iter().next()
}

/// Returns a list of file paths for the given directories sorted by filename across
/// all given directories. The filter argument is a closure that should return
/// `true` for any files that should be included in the final results.
pub fn get_multidir_sorted_files<F>(paths: &[PathBuf], filter: F) -> Vec<PathBuf>
where
    F: Fn(&DirEntry) -> bool,
{
    // Look for files in the given locations
    let mut file_entries: Vec<DirEntry> = paths
        .iter()
        .flat_map(|path| {
            log::trace!("Checking {path:?} for files");
            let files = match fs::read_dir(path) {
                Ok(files) => files,
                Err(e) => {
                    log::debug!("Unable to read directory: {path:?}: {e}");
                    return vec![];
                }
            };
            files
                .filter_map(|r| {
                    let Ok(entry) = r else { return None };
                    filter(&entry).then_some(entry)
                })
                .collect()
        })
        .collect();

    // Sort by name, preferring directories earlier in the list on a tie
    file_entries.sort_by(|a, b| {
        let file_name_a = a.file_name();
        let file_name_b = b.file_name();
        if file_name_a != file_name_b {
            return file_name_a.cmp(&file_name_b);
        }

        let priority = |entry: &DirEntry| {
            let path = entry.path();
            path.parent()
                .and_then(|dir| {
                    paths
                        .iter()
                        .position(|base| base.as_os_str() == dir.as_os_str())
                })
                .unwrap_or(paths.len())
        };
        priority(a).cmp(&priority(b))
    });
    log::trace!("Got sorted entries: {file_entries:?}");

    file_entries.into_iter().map(|entry| entry.path()).collect()
}
