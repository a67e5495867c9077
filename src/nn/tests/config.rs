use crate::nn::{DreamConfig, TrainConfig};

#[test]
fn test_train_config_defaults_and_builder() {
    let config = TrainConfig::default();
    assert_eq!(config.epochs, 12);
    assert_eq!(config.batch_size, 128);
    assert!(config.shuffle);
    assert!(config.initialize_params);
    assert_eq!(config.seed, None);

    let config = TrainConfig::new().epochs(3).batch_size(2).shuffle(false).seed(7);
    assert_eq!((config.epochs, config.batch_size), (3, 2));
    assert!(!config.shuffle);
    assert_eq!(config.seed, Some(7));
}

#[test]
fn test_config_json_fills_missing_fields() {
    let config: TrainConfig = serde_json::from_str(r#"{"epochs": 5}"#).unwrap();
    assert_eq!(config.epochs, 5);
    assert_eq!(config.batch_size, 128);

    let dream: DreamConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(dream, DreamConfig::default());
    assert_eq!(dream.max_dream_length, 24);
    assert_eq!(dream.progress_every, 1000);
}

#[test]
fn test_config_json_file_round_trip() {
    let path = std::env::temp_dir().join("okapi_train_config_test.json");
    let config = TrainConfig::new().epochs(9).verbose(false);
    config.to_json_file(&path).unwrap();
    let loaded = TrainConfig::from_json_file(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(loaded, config);
}
