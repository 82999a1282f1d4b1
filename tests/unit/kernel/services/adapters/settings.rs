use super::*;
use crate::kernel::services::ports::settings::UiLanguage;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = load_settings_from(&dir.path().join("settings.json")).unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn save_then_load_keeps_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.json");

    let mut settings = Settings::default();
    settings.ui_language = UiLanguage::En;
    settings.auto_save = true;
    settings.set_font_size(20);
    save_settings_to(&path, &settings).unwrap();

    assert_eq!(load_settings_from(&path).unwrap(), settings);
}

#[test]
fn invalid_json_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ nope").unwrap();
    assert!(matches!(load_settings_from(&path), Err(SettingsError::Json(_))));
}

#[test]
fn out_of_range_font_size_is_repaired_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{"fontSize": 3, "unknownField": true}"#).unwrap();
    assert_eq!(load_settings_from(&path).unwrap().font_size, 10);
}
