use storechat::Config;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_from(&dir.path().join("config.toml")).unwrap();

    assert_eq!(config.endpoint, "http://localhost:5000");
    assert_eq!(config.request_timeout_secs, None);
    assert!(!config.ui.start_open);
}

#[test]
fn saved_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = Config::default();
    config.endpoint = "https://shop.example.com".to_string();
    config.request_timeout_secs = Some(30);
    config.ui.title = "Help desk".to_string();
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded.endpoint, "https://shop.example.com");
    assert_eq!(loaded.request_timeout_secs, Some(30));
    assert_eq!(loaded.ui.title, "Help desk");
    assert_eq!(loaded.chat_url(), "https://shop.example.com/api/chat");
}

#[test]
fn invalid_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "endpoint = [not toml").unwrap();

    let err = Config::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}
