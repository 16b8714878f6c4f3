use std::path::PathBuf;

use figment::Jail;
use tsval_config::TsvalConfig;
use tsval_core::DuplicatePolicy;

#[test]
fn env_overrides_toml_values() {
    Jail::expect_with(|jail| {
        jail.create_file("tsval.toml", "[codegen]\nduplicate_policy = \"warn\"\n")?;
        jail.set_env("TSVAL_CODEGEN__DUPLICATE_POLICY", "error");

        let config = TsvalConfig::load(None).expect("config loads");
        assert_eq!(config.codegen.duplicate_policy, DuplicatePolicy::Error);
        Ok(())
    });
}

#[test]
fn env_fills_nested_sections() {
    Jail::expect_with(|jail| {
        jail.set_env("TSVAL_PATHS__SOURCE_ROOT", "/srv/app/src");
        jail.set_env("TSVAL_SCHEMA__ENCODE_REFS", "false");
        jail.set_env("TSVAL_PIPELINE__RESCAN_SCHEMA_DIR", "true");

        let config = TsvalConfig::load(None).expect("config loads");
        assert_eq!(config.paths.source_root, Some(PathBuf::from("/srv/app/src")));
        assert!(!config.schema.encode_refs);
        assert!(config.pipeline.rescan_schema_dir);
        Ok(())
    });
}

#[test]
fn unrelated_prefixed_vars_are_ignored() {
    Jail::expect_with(|jail| {
        jail.set_env("TSVAL_LOG", "debug");

        let config = TsvalConfig::load(None).expect("config loads");
        assert!(config.pipeline.parallel);
        Ok(())
    });
}
