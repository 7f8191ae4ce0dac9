use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Setting with key [{0}] already exists")]
    DuplicateSetting(String),
    #[error("Setting not found: [{0}]")]
    SettingNotFound(String),
    #[error("Settings CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Settings IO error: {0}")]
    Io(#[from] std::io::Error)
}
