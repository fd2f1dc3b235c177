use super::*;
use std::io::Write;
use tempfile::NamedTempFile;

const MULTIPLE_IMPORTS: &str = r#"
import2:
  type: maven
  image: maven:3-eclipse-temurin-17
  source:
    url: https://repo.maven.apache.org/maven2
  destination:
    url: https://destination.test/maven
    credentials:
      token: TOKEN
      header_name: Private-Token
  packages:
    "com.example:lib": ["1.0.0", "1.0.1:war"]
import1:
  type: npm
  source:
    url: https://registry.npmjs.org
    credentials:
      token: SOURCE_TOKEN
      _base64_token: 1
      always-auth: true
  destination:
    url: https://destination.test/npm
    credentials:
      token: DESTINATION_TOKEN
  packages:
    lodash: 4.17.21
    "@scope/pkg": ["1.0.0", "0.9.0"]
"#;

fn import_yaml(kind: &str, source_url: &str, destination: &str) -> String {
    format!(
        r#"
import1:
  type: {kind}
  source:
    url: {source_url}
  destination:
{destination}
"#
    )
}

// ==================== from_yaml_str tests ====================

#[test]
fn test_from_yaml_str_multiple_imports() {
    let config = Configuration::from_yaml_str(MULTIPLE_IMPORTS).unwrap();

    let names: Vec<_> = config.imports.keys().cloned().collect();
    assert_eq!(names, vec!["import1", "import2"]);

    let npm = &config.imports["import1"];
    assert_eq!(npm.kind, "npm");
    assert_eq!(npm.image, None);
    assert_eq!(npm.source.credentials.token, "SOURCE_TOKEN");
    assert!(npm.source.credentials.use_base64_token());
    assert_eq!(npm.source.credentials.parameter("always-auth"), Some("true"));
    assert!(!npm.destination.credentials.use_base64_token());

    let maven = &config.imports["import2"];
    assert_eq!(maven.image.as_deref(), Some("maven:3-eclipse-temurin-17"));
    assert_eq!(
        maven.destination.credentials.parameter("header_name"),
        Some("Private-Token")
    );
    assert_eq!(maven.source.credentials, Credentials::default());
}

#[test]
fn test_from_yaml_str_inline_packages() {
    let config = Configuration::from_yaml_str(MULTIPLE_IMPORTS).unwrap();

    let PackagesSpec::Inline(packages) = &config.imports["import1"].packages else {
        panic!("expected inline packages");
    };
    assert_eq!(packages["lodash"], vec!["4.17.21"]);
    assert_eq!(packages["@scope/pkg"], vec!["1.0.0", "0.9.0"]);
}

#[test]
fn test_from_yaml_str_empty_document() {
    let config = Configuration::from_yaml_str("  \n").unwrap();
    assert!(config.imports.is_empty());
}

#[test]
fn test_from_yaml_str_incoherent_document() {
    let result = Configuration::from_yaml_str("import1:\n  type: [npm]\n");
    assert!(matches!(result, Err(ImporterError::Yaml(_))));
}

#[test]
fn test_from_yaml_str_ignores_unknown_fields() {
    let yaml = import_yaml(
        "npm",
        "http://source.test",
        "    url: http://destination.test\n    extra: 1\n    credentials:\n      token: T",
    ) + "  unexpected: true\n";
    let config = Configuration::from_yaml_str(&yaml).unwrap();

    let import = &config.imports["import1"];
    assert_eq!(import.kind, "npm");
    assert_eq!(import.destination.credentials.token, "T");
    assert!(import.destination.credentials.additional_parameters.is_empty());
}

// ==================== validate tests ====================

#[test]
fn test_validate_unknown_type() {
    let yaml = import_yaml(
        "rubygems",
        "http://source.test",
        "    url: http://destination.test\n    credentials:\n      token: T",
    );
    let err = Configuration::from_yaml_str(&yaml).unwrap_err();

    assert!(matches!(err, ImporterError::UnknownType { .. }));
    assert!(err.to_string().contains("rubygems"));
    assert!(err.to_string().contains("import1"));
}

#[test]
fn test_validate_same_urls() {
    let yaml = import_yaml(
        "npm",
        "http://same.test",
        "    url: http://same.test\n    credentials:\n      token: T",
    );
    let err = Configuration::from_yaml_str(&yaml).unwrap_err();

    assert_eq!(
        err.to_string(),
        r#"import "import1" has the same url for the source and the destination"#
    );
}

#[test]
fn test_validate_missing_destination_token() {
    let yaml = import_yaml("pypi", "http://source.test", "    url: http://destination.test");
    let err = Configuration::from_yaml_str(&yaml).unwrap_err();

    assert!(matches!(
        err,
        ImporterError::MissingToken {
            registry: "destination",
            ..
        }
    ));
    assert!(err.to_string().contains("import1"));
}

#[test]
fn test_validate_invalid_url() {
    let yaml = import_yaml(
        "npm",
        "not a url",
        "    url: http://destination.test\n    credentials:\n      token: T",
    );
    let err = Configuration::from_yaml_str(&yaml).unwrap_err();

    assert!(matches!(
        err,
        ImporterError::InvalidUrl {
            registry: "source",
            ..
        }
    ));
}

#[test]
fn test_validate_non_scalar_credential_parameter() {
    let yaml = import_yaml(
        "npm",
        "http://source.test",
        "    url: http://destination.test\n    credentials:\n      token: T\n      username: [a, b]",
    );
    let err = Configuration::from_yaml_str(&yaml).unwrap_err();

    assert!(matches!(err, ImporterError::InvalidConfig { .. }));
    assert!(err.to_string().contains("username"));
}

// ==================== load tests ====================

#[test]
fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(MULTIPLE_IMPORTS.as_bytes()).unwrap();

    let config = Configuration::load(file.path()).unwrap();
    assert_eq!(config.imports.len(), 2);
}

#[test]
fn test_load_missing_file() {
    let result = Configuration::load(Path::new("/nonexistent/config.yml"));
    assert!(matches!(result, Err(ImporterError::Io(_))));
}

// ==================== Credentials tests ====================

#[test]
fn test_credentials_parameter_ignores_empty_values() {
    let credentials = Credentials::new("T").with_parameter("username", "");
    assert_eq!(credentials.parameter("username"), None);
}

#[test]
fn test_credentials_base64_flag() {
    assert!(Credentials::new("T")
        .with_parameter(BASE64_TOKEN_KEY, "1")
        .use_base64_token());
    assert!(!Credentials::new("T")
        .with_parameter(BASE64_TOKEN_KEY, "0")
        .use_base64_token());
    assert!(!Credentials::new("T").use_base64_token());
}
