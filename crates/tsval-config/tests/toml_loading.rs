//! Integration tests for TOML configuration loading.
//!
//! Uses `figment::Jail` for sandboxed files, cwd, and env vars.

use std::path::{Path, PathBuf};

use figment::Jail;
use pretty_assertions::assert_eq;
use tsval_config::TsvalConfig;
use tsval_core::{DuplicatePolicy, IdStrategy};

#[test]
fn loads_project_toml_from_cwd() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "tsval.toml",
            r#"
[paths]
source_root = "app/src"
out_root = "app/out"
manifest_name = "schemas.ts"

[schema]
additional_properties = false
restrict_to_requested = true

[codegen]
duplicate_policy = "warn"
id_strategy = "sequential"
output_file_name = "validators.ts"

[pipeline]
parallel = false
"#,
        )?;

        let config = TsvalConfig::load(None).expect("config loads");
        assert_eq!(config.paths.source_root, Some(PathBuf::from("app/src")));
        assert_eq!(config.paths.out_root, Some(PathBuf::from("app/out")));
        assert_eq!(config.paths.manifest_name, "schemas.ts");
        assert!(!config.schema.additional_properties);
        assert!(config.schema.encode_refs, "unset fields keep defaults");
        assert!(config.schema.restrict_to_requested);
        assert_eq!(config.codegen.duplicate_policy, DuplicatePolicy::Warn);
        assert_eq!(config.codegen.id_strategy, IdStrategy::Sequential);
        assert_eq!(config.codegen.output_file_name, "validators.ts");
        assert!(!config.pipeline.parallel);
        assert!(!config.pipeline.rescan_schema_dir);
        Ok(())
    });
}

#[test]
fn explicit_config_file_replaces_local() {
    Jail::expect_with(|jail| {
        jail.create_file("tsval.toml", "[codegen]\nid_strategy = \"random\"\n")?;
        jail.create_file("ci.toml", "[codegen]\nid_strategy = \"sequential\"\n")?;

        let config = TsvalConfig::load(Some(Path::new("ci.toml"))).expect("config loads");
        assert_eq!(config.codegen.id_strategy, IdStrategy::Sequential);
        Ok(())
    });
}

#[test]
fn invalid_policy_is_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file("tsval.toml", "[codegen]\nduplicate_policy = \"explode\"\n")?;

        let result = TsvalConfig::load(None);
        assert!(result.is_err(), "unknown policy should fail extraction");
        Ok(())
    });
}

#[test]
fn resolves_paths_from_tsconfig_when_unset() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "tsconfig.json",
            r#"{
  // generated by tsc --init
  "compilerOptions": { "rootDir": "./src", "outDir": "./dist", },
}"#,
        )?;

        let config = TsvalConfig::load(None).expect("config loads");
        let paths = config.paths.resolve().expect("paths resolve");
        assert_eq!(paths.source_root, PathBuf::from("./src"));
        assert_eq!(paths.out_root, PathBuf::from("./dist"));
        Ok(())
    });
}
