//! Integration tests for the beanmap binary.
//!
//! Runs `generate` and `check` against type tables written to a temp directory.

#![allow(non_snake_case)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const TYPES: &str = r#"{
    "classes": [
        {
            "package": "com.example",
            "simple_name": "Person",
            "fields": [
                { "name": "name", "type": { "kind": "class", "name": "java.lang.String" } },
                { "name": "age", "type": { "kind": "primitive", "name": "int" } }
            ]
        },
        {
            "package": "com.example",
            "simple_name": "PersonMapper",
            "kind": "interface",
            "interfaces": [
                {
                    "kind": "class",
                    "name": "com.github.nmorel.gwtjackson.client.ObjectMapper",
                    "args": [ { "kind": "class", "name": "com.example.Person" } ]
                }
            ]
        }
    ]
}"#;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn beanmap(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_beanmap"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

// =============================================================================
// Generate
// =============================================================================

mod generate {
    use super::*;

    #[test]
    fn generate___explicit_mapper___writes_mapper_and_codecs() {
        let dir = TempDir::new().unwrap();
        let types = write_file(&dir, "types.json", TYPES);
        let output = dir.path().join("out");

        let result = beanmap(&[
            "generate",
            "--types",
            path_arg(&types),
            "--mapper",
            "com.example.PersonMapper",
            "--output",
            path_arg(&output),
        ]);

        assert!(result.status.success());
        let package = output.join("com/example");
        assert!(package.join("PersonMapperImpl.java").exists());
        assert!(package.join("PersonBeanJsonSerializerImpl.java").exists());
        assert!(package.join("PersonBeanJsonDeserializerImpl.java").exists());
    }

    #[test]
    fn generate___no_mapper_flag___discovers_mappers() {
        let dir = TempDir::new().unwrap();
        let types = write_file(&dir, "types.json", TYPES);
        let output = dir.path().join("out");

        let result = beanmap(&["generate", "-t", path_arg(&types), "-o", path_arg(&output)]);

        assert!(result.status.success());
        let stdout = String::from_utf8_lossy(&result.stdout);
        assert!(stdout.contains("com.example.PersonMapper"));
        assert!(output.join("com/example/PersonMapperImpl.java").exists());
    }

    #[test]
    fn generate___unknown_mapper___fails() {
        let dir = TempDir::new().unwrap();
        let types = write_file(&dir, "types.json", TYPES);
        let output = dir.path().join("out");

        let result = beanmap(&[
            "generate",
            "--types",
            path_arg(&types),
            "--mapper",
            "com.example.Missing",
            "--output",
            path_arg(&output),
        ]);

        assert!(!result.status.success());
        let stdout = String::from_utf8_lossy(&result.stdout);
        assert!(stdout.contains("Unknown mapper interface"));
    }

    #[test]
    fn generate___mapper_specific_config___prefixes_bean_codecs() {
        let dir = TempDir::new().unwrap();
        let types = write_file(&dir, "types.json", TYPES);
        let config = write_file(&dir, "beanmap.toml", "mapper_specific = [\"com.example.Person\"]\n");
        let output = dir.path().join("out");

        let result = beanmap(&[
            "generate",
            "--types",
            path_arg(&types),
            "--config",
            path_arg(&config),
            "--output",
            path_arg(&output),
        ]);

        assert!(result.status.success());
        let package = output.join("com/example");
        assert!(!package.join("PersonBeanJsonSerializerImpl.java").exists());
        let prefixed = fs::read_dir(&package)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with("PersonMapper_") && name.ends_with("_PersonBeanJsonSerializerImpl.java"))
            .count();
        assert_eq!(prefixed, 1);
    }

    #[test]
    fn generate___missing_types_file___fails() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out");

        let result = beanmap(&[
            "generate",
            "--types",
            path_arg(&dir.path().join("missing.json")),
            "--output",
            path_arg(&output),
        ]);

        assert!(!result.status.success());
        let stderr = String::from_utf8_lossy(&result.stderr);
        assert!(stderr.contains("Failed to read type table"));
    }
}

// =============================================================================
// Check
// =============================================================================

mod check {
    use super::*;

    #[test]
    fn check___valid_table___succeeds() {
        let dir = TempDir::new().unwrap();
        let types = write_file(&dir, "types.json", TYPES);

        let result = beanmap(&["check", "--types", path_arg(&types)]);

        assert!(result.status.success());
        let stdout = String::from_utf8_lossy(&result.stdout);
        assert!(stdout.contains("Types: 2"));
        assert!(stdout.contains("Mappers: 1"));
    }

    #[test]
    fn check___dangling_supertype___fails() {
        let dir = TempDir::new().unwrap();
        let types = write_file(
            &dir,
            "types.json",
            r#"{ "classes": [ {
                "package": "com.example",
                "simple_name": "Child",
                "superclass": { "kind": "class", "name": "com.example.Missing" }
            } ] }"#,
        );

        let result = beanmap(&["check", "--types", path_arg(&types)]);

        assert!(!result.status.success());
        let stdout = String::from_utf8_lossy(&result.stdout);
        assert!(stdout.contains("com.example.Missing"));
    }

    #[test]
    fn check___unknown_mixin___fails() {
        let dir = TempDir::new().unwrap();
        let types = write_file(&dir, "types.json", TYPES);
        let config = write_file(
            &dir,
            "beanmap.toml",
            "[mixins]\n\"com.example.Person\" = \"com.example.PersonMixin\"\n",
        );

        let result = beanmap(&["check", "--types", path_arg(&types), "--config", path_arg(&config)]);

        assert!(!result.status.success());
        let stdout = String::from_utf8_lossy(&result.stdout);
        assert!(stdout.contains("com.example.PersonMixin"));
    }
}
