use crate::constants::{STORAGE_KEY_API_KEY, STORAGE_KEY_USER_SETTINGS};
use crate::error::{ClientError, ClientResult};
use crate::settings::UserSettings;
use web_sys::Storage;

fn local_storage() -> ClientResult<Storage> {
    let window = web_sys::window().ok_or_else(|| ClientError::Js("no global window".into()))?;
    window
        .local_storage()?
        .ok_or_else(|| ClientError::Js("localStorage unavailable".into()))
}

fn read(key: &str) -> Option<String> {
    local_storage().ok()?.get_item(key).ok().flatten()
}

fn write(key: &str, value: Option<&str>) -> ClientResult<()> {
    let storage = local_storage()?;
    match value {
        Some(v) => storage.set_item(key, v)?,
        None => storage.remove_item(key)?,
    }
    Ok(())
}

/// Stored API key, if any.
pub fn load_api_key() -> Option<String> {
    read(STORAGE_KEY_API_KEY).filter(|k| !k.is_empty())
}

/// Persist the API key; `None` or an empty key removes it.
pub fn save_api_key(key: Option<&str>) -> ClientResult<()> {
    write(STORAGE_KEY_API_KEY, key.filter(|k| !k.is_empty()))
}

/// Raw settings blob; parsing and fallback live in [`UserSettings::from_stored`].
pub fn load_user_settings_raw() -> Option<String> {
    read(STORAGE_KEY_USER_SETTINGS)
}

pub fn save_user_settings(settings: &UserSettings) -> ClientResult<()> {
    write(STORAGE_KEY_USER_SETTINGS, Some(&settings.to_json()))
}
