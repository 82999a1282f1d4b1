use super::*;

#[test]
fn app_files_live_under_one_directory() {
    let Some(root) = get_app_data_dir() else {
        return;
    };
    assert!(root.ends_with(APP_NAME));
    assert_eq!(get_log_dir(), Some(root.join("logs")));
    assert_eq!(get_session_dir(), Some(root.join("session")));
    assert_eq!(get_settings_path(), Some(root.join("settings.json")));
}
