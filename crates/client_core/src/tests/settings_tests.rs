use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_settings_file(contents: &str) -> std::path::PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("payonlive_settings_test_{suffix}.toml"));
    fs::write(&path, contents).expect("write settings");
    path
}

#[test]
fn defaults_when_nothing_is_configured() {
    let settings = load_settings_from(Path::new("/nonexistent/payonlive.toml"), |_| None);
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.import_timeout(), Duration::from_secs(120));
    assert_eq!(
        settings.api_base().expect("base").as_str(),
        "https://dev-api.payonlive.com/"
    );
}

#[test]
fn environment_overrides_file() {
    let path = temp_settings_file(
        "api_url = \"http://file.example\"\nrequest_timeout_secs = 5\napi_token = \"file-token\"\n",
    );
    let vars: HashMap<&str, &str> = HashMap::from([
        ("APP__API_URL", "http://env.example"),
        ("APP__REQUEST_TIMEOUT_SECS", "not-a-number"),
    ]);

    let settings = load_settings_from(&path, |name| vars.get(name).map(|v| v.to_string()));

    assert_eq!(settings.api_url, "http://env.example");
    assert_eq!(settings.request_timeout_secs, 5);
    assert_eq!(settings.api_token.as_deref(), Some("file-token"));

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn malformed_file_falls_back_to_defaults() {
    let path = temp_settings_file("api_url = [");
    let settings = load_settings_from(&path, |_| None);
    assert_eq!(settings.api_url, DEFAULT_API_URL);
    fs::remove_file(path).expect("cleanup");
}

#[test]
fn rejects_non_http_base_urls() {
    let settings = Settings {
        api_url: "ftp://example.com".into(),
        ..Settings::default()
    };
    assert!(matches!(settings.api_base(), Err(ClientError::Settings(_))));
}
