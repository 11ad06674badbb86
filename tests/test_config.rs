//! Integration test: environment-driven service configuration
//!
//! Environment variables are process-wide, so every case lives in one test.

use credit_risk_service::inference::{default_models_dir, ENCODER_FILE, FEATURES_FILE, MODEL_FILE};
use credit_risk_service::server::{AppState, ServerConfig, DEFAULT_EXPLAIN_TOP_K, DEFAULT_PORT};

const VARS: [&str; 8] = [
    "HOST",
    "PORT",
    "ALLOWED_ORIGINS",
    "MODEL_PATH",
    "ENCODER_PATH",
    "FEATURES_PATH",
    "FALLBACK_BAND",
    "EXPLAIN_TOP_K",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
fn test_server_config_from_environment() {
    clear_env();

    // Defaults
    let config = ServerConfig::default();
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.allowed_origins, vec!["*"]);
    assert_eq!(config.fallback_band, "high");
    assert_eq!(config.explain_top_k, DEFAULT_EXPLAIN_TOP_K);
    assert_eq!(config.artifacts.model, default_models_dir().join(MODEL_FILE));

    // Overrides
    let dir = tempfile::tempdir().unwrap();
    let missing_features = dir.path().join("features.json");
    std::env::set_var("HOST", "127.0.0.1");
    std::env::set_var("PORT", "9100");
    std::env::set_var("ALLOWED_ORIGINS", "https://loans.example, https://admin.example");
    std::env::set_var("MODEL_PATH", default_models_dir().join(MODEL_FILE));
    std::env::set_var("ENCODER_PATH", default_models_dir().join(ENCODER_FILE));
    std::env::set_var("FEATURES_PATH", &missing_features);
    std::env::set_var("FALLBACK_BAND", "review");
    std::env::set_var("EXPLAIN_TOP_K", "2");

    let config = ServerConfig::default();
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 9100);
    assert_eq!(
        config.allowed_origins,
        vec!["https://loans.example", "https://admin.example"]
    );
    assert_eq!(config.artifacts.features, missing_features);
    assert_eq!(config.fallback_band, "review");
    assert_eq!(config.explain_top_k, 2);

    let err = AppState::load(ServerConfig::default()).err().expect("features file does not exist");
    assert!(err.to_string().contains("Failed to read artifact"));
    assert!(err.to_string().contains(&missing_features.display().to_string()));

    // Unparseable numbers and blank values fall back to defaults
    std::env::set_var("PORT", "not-a-port");
    std::env::set_var("EXPLAIN_TOP_K", "-1");
    std::env::set_var("FALLBACK_BAND", "  ");
    std::env::set_var("FEATURES_PATH", "");
    let config = ServerConfig::default();
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.explain_top_k, DEFAULT_EXPLAIN_TOP_K);
    assert_eq!(config.fallback_band, "high");
    assert_eq!(config.artifacts.features, default_models_dir().join(FEATURES_FILE));
    assert!(AppState::load(config).is_ok());

    clear_env();
}
