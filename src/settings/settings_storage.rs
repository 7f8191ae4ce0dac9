use crate::settings::errors::SettingsError;
use crate::settings::SettingsProvider;
use chrono::{DateTime, Local};
use csv::{ReaderBuilder, Trim};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>
}

#[derive(Debug, Deserialize)]
struct SettingRecord {
    key: String,
    value: String,
    #[serde(default)]
    description: Option<String>
}

/// In-memory key/value settings store.
#[derive(Debug, Default)]
pub struct SettingsStorage {
    settings: DashMap<String, Setting>
}

impl SettingsStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `key,value,description` rows from a CSV file.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(BufReader::new(file));

        let storage = Self::new();

        for result in reader.deserialize::<SettingRecord>() {
            let record = result?;
            storage.create(&record.key, &record.value, record.description)?;
        }

        Ok(storage)
    }

    pub fn create(&self, key: &str, value: &str, description: Option<String>) -> Result<Setting, SettingsError> {
        match self.settings.entry(key.to_string()) {
            Entry::Occupied(_) => Err(SettingsError::DuplicateSetting(key.to_string())),
            Entry::Vacant(vacant) => {
                let now = Local::now();
                let setting = Setting {
                    key: key.to_string(),
                    value: value.to_string(),
                    description,
                    created_at: now,
                    updated_at: now
                };

                vacant.insert(setting.clone());
                Ok(setting)
            }
        }
    }

    pub fn get(&self, key: &str) -> Result<Setting, SettingsError> {
        self.settings.get(key)
            .map(|setting| setting.value().clone())
            .ok_or_else(|| SettingsError::SettingNotFound(key.to_string()))
    }

    /// Every setting, ordered by key.
    pub fn all(&self) -> Vec<Setting> {
        let mut settings: Vec<Setting> = self.settings.iter().map(|item| item.value().clone()).collect();
        settings.sort_by(|left, right| left.key.cmp(&right.key));
        settings
    }

    pub fn update(&self, key: &str, value: &str, description: Option<String>) -> Result<Setting, SettingsError> {
        let mut setting = self.settings.get_mut(key)
            .ok_or_else(|| SettingsError::SettingNotFound(key.to_string()))?;

        setting.value = value.to_string();
        setting.description = description;
        setting.updated_at = Local::now();

        Ok(setting.clone())
    }

    pub fn delete(&self, key: &str) -> Result<(), SettingsError> {
        self.settings.remove(key)
            .map(|_| ())
            .ok_or_else(|| SettingsError::SettingNotFound(key.to_string()))
    }
}

impl SettingsProvider for SettingsStorage {
    fn get_setting(&self, key: &str) -> Option<String> {
        self.settings.get(key).map(|setting| setting.value.clone())
    }
}
