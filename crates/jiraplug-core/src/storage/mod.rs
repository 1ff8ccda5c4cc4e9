pub mod config;

pub use config::ConfigStorage;

use std::path::PathBuf;

pub fn get_data_dir() -> crate::Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("jiraplug"))
        .ok_or_else(|| {
            crate::Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not find data directory",
            ))
        })
}

pub fn init_data_dir() -> crate::Result<PathBuf> {
    let data_dir = get_data_dir()?;
    std::fs::create_dir_all(&data_dir)?;
    Ok(data_dir)
}

/// Log file name for a plug. Unnamed plugs log to a timestamped file.
pub fn log_file_name(plug_name: Option<&str>) -> String {
    match plug_name.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => format!("{}.log", name),
        None => format!("{}.log", chrono::Local::now().format("%Y_%m_%d_%H_%M")),
    }
}
