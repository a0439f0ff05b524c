use std::fs;

use figment::Jail;
use tempfile::TempDir;

use localscreen_core::config::{Backend, Config, Settings};

#[test]
fn defaults_apply_without_any_file() {
    Jail::expect_with(|jail| {
        jail.set_env("RUST_ENV", "test");
        let settings = Config::load().map_err(|e| e.to_string())?.settings().map_err(|e| e.to_string())?;
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.scan.max_chars, 280);
        assert_eq!(settings.scan.min_chunk_len, 12);
        assert_eq!(settings.scan.snippet_chars, 300);
        assert_eq!(settings.classifier.resolve_threshold(None), 0.5);
        assert_eq!(settings.classifier.resolve_max_len(None), 96);
        assert_eq!(settings.classifier.type_labels.len(), 5);
        Ok(())
    });
}

#[test]
fn env_file_and_variables_layer_in_order() {
    Jail::expect_with(|jail| {
        jail.set_env("RUST_ENV", "test");
        jail.create_file(
            "config.toml",
            r#"
                [classifier]
                backend = "fake"
                threshold = 0.7

                [scan]
                max_chars = 200
            "#,
        )?;
        jail.create_file("config.test.toml", "[scan]\nmax_chars = 150\n")?;
        jail.set_env("APP_SCAN__SNIPPET_CHARS", "64");

        let settings = Config::load().map_err(|e| e.to_string())?.settings().map_err(|e| e.to_string())?;
        assert_eq!(settings.classifier.backend, Backend::Fake);
        assert_eq!(settings.classifier.resolve_threshold(Some(0.4)), 0.7);
        assert_eq!(settings.scan.max_chars, 150);
        assert_eq!(settings.scan.snippet_chars, 64);
        assert_eq!(settings.scan.min_chunk_len, 12);
        Ok(())
    });
}

#[test]
fn training_config_fills_unset_threshold() {
    let settings = Settings::default();
    assert_eq!(settings.classifier.resolve_threshold(Some(0.42)), 0.42);
    assert_eq!(settings.classifier.resolve_max_len(Some(128)), 128);
}

#[test]
fn invalid_labels_are_rejected() {
    Jail::expect_with(|jail| {
        jail.set_env("RUST_ENV", "test");
        jail.create_file("config.toml", "[classifier]\ntype_labels = [\"a\", \"b\", \"c\", \"d\", \"a\"]\n")?;
        let err = Config::load().map_err(|e| e.to_string())?.settings().unwrap_err();
        assert!(err.to_string().contains("duplicate type label"), "{err}");
        Ok(())
    });
}

#[test]
fn fake_backend_is_refused_in_production() {
    Jail::expect_with(|jail| {
        jail.set_env("RUST_ENV", "prod");
        jail.create_file("config.toml", "[classifier]\nbackend = \"fake\"\n")?;
        assert!(Config::load().is_err());
        Ok(())
    });
}

#[test]
fn explicit_file_resolves_artifacts_next_to_it() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("host.toml");
    fs::write(&path, "[model]\nartifacts_dir = \"weights\"\n").unwrap();

    let config = Config::load_from(&path).expect("load");
    let settings = config.settings().expect("settings");
    assert_eq!(config.base_dir(), tmp.path());
    assert_eq!(
        settings.model.artifact(config.base_dir(), &settings.model.tokenizer),
        tmp.path().join("weights").join("tokenizer.json")
    );
}

#[test]
fn missing_explicit_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    assert!(Config::load_from(&tmp.path().join("nope.toml")).is_err());
}
