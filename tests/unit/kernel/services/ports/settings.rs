use super::*;

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.ui_language, UiLanguage::De);
    assert_eq!(settings.font_size, 14);
    assert!(!settings.auto_save);
    assert!(settings.favorites.contains(FormatKind::Json));
    assert!(settings.favorites.contains(FormatKind::Xml));
    assert!(!settings.favorites.contains(FormatKind::Yaml));
}

#[test]
fn test_font_size_is_clamped() {
    let mut settings = Settings::default();
    assert!(settings.set_font_size(40));
    assert_eq!(settings.font_size, MAX_FONT_SIZE);
    assert!(settings.set_font_size(2));
    assert_eq!(settings.font_size, MIN_FONT_SIZE);
    assert!(!settings.set_font_size(MIN_FONT_SIZE));
}

#[test]
fn test_partial_json_uses_defaults() {
    let settings: Settings = serde_json::from_str(r#"{"uiLanguage":"en","fontSize":99}"#).unwrap();
    let settings = settings.normalized();
    assert_eq!(settings.ui_language, UiLanguage::En);
    assert_eq!(settings.font_size, MAX_FONT_SIZE);
    assert_eq!(settings.favorites, Favorites::default());
}

#[test]
fn test_toggle_favorite() {
    let mut favorites = Favorites::default();
    favorites.toggle(FormatKind::Yaml);
    assert!(favorites.contains(FormatKind::Yaml));
    favorites.toggle(FormatKind::Json);
    assert!(!favorites.contains(FormatKind::Json));
}

#[test]
fn test_favorite_formats_keep_toolbar_order() {
    let mut settings = Settings::default();
    assert_eq!(
        settings.favorite_formats(),
        vec![FormatKind::Json, FormatKind::Xml]
    );
    settings.toggle_favorite(FormatKind::Yaml);
    settings.toggle_favorite(FormatKind::Json);
    assert_eq!(
        settings.favorite_formats(),
        vec![FormatKind::Xml, FormatKind::Yaml]
    );
}

#[test]
fn test_settings_serialize_camel_case() {
    let value = serde_json::to_value(Settings::default()).unwrap();
    assert_eq!(value["uiLanguage"], "de");
    assert_eq!(value["autoSave"], false);
    assert_eq!(value["yamlOnSurface"], false);
    assert_eq!(value["favorites"]["yaml"], false);
}
