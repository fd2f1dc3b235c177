use super::*;
use crate::config::RegistryConfig;
use crate::packages::{PackageSource, PackagesMap, PackagesSpec};

const BASIC_AUTH_TEMPLATE: &str = r#"echo "<settings><servers><server><id>{label}</id><username>{user}</username><password>{token}</password></server></servers></settings>" > settings.xml"#;

fn maven_import(source: Credentials, destination: Credentials) -> Import {
    Import::new(
        "maven",
        RegistryConfig::new("http://source.test", source),
        RegistryConfig::new("https://destination.test", destination),
    )
}

fn destination_user() -> Credentials {
    Credentials::new("TOKEN_FOR_DESTINATION").with_parameter("username", "USER_FOR_DESTINATION")
}

/// (パッケージ名, バージョン) の組からパッケージ一覧を作る
fn packages_of(entries: &[(&str, &str)]) -> PackageSource {
    let mut packages = PackagesMap::new();
    for (name, version) in entries {
        packages
            .entry(name.to_string())
            .or_default()
            .push(version.to_string());
    }
    PackageSource::new(BTreeMap::from([(
        "import1".to_string(),
        PackagesSpec::Inline(packages),
    )]))
}

fn new_registry(import: Import) -> Result<MavenRegistry> {
    MavenRegistry::new(import, "import1", &PackageSource::default())
}

fn basic_auth(label: &str, user: &str, token: &str) -> String {
    BASIC_AUTH_TEMPLATE
        .replace("{label}", label)
        .replace("{user}", user)
        .replace("{token}", token)
}

// ==================== scripts tests ====================

#[test]
fn test_scripts_with_basic_auth_on_both_sides() {
    let source = Credentials::new("TOKEN_FOR_SOURCE").with_parameter("username", "USER_FOR_SOURCE");
    let registry = new_registry(maven_import(source, destination_user())).unwrap();
    let scripts = registry.scripts().unwrap();

    assert_eq!(scripts.len(), 6);
    assert_eq!(
        scripts[0],
        basic_auth(SOURCE_REGISTRY_LABEL, "USER_FOR_SOURCE", "TOKEN_FOR_SOURCE")
    );
    assert_eq!(
        scripts[1],
        "mvn dependency:get -Dmaven.repo.local=deps -Dtransitive=false \
         -Dartifact=$PACKAGE_NAME:$PACKAGE_VERSION \
         -DremoteRepositories=pkgs_importer_source::::http://source.test -s settings.xml"
    );
    assert!(scripts[2].starts_with("pkg_dir="));
    assert_eq!(scripts[3], r#"cd $(find deps -path "*/$pkg_dir")"#);
    assert_eq!(
        scripts[4],
        basic_auth(
            DESTINATION_REGISTRY_LABEL,
            "USER_FOR_DESTINATION",
            "TOKEN_FOR_DESTINATION"
        )
    );
    assert!(scripts[5].starts_with(
        "mvn deploy:deploy-file -Durl=https://destination.test -DrepositoryId=pkgs_importer_destination"
    ));
    assert!(scripts[5].ends_with("-s settings.xml"));
}

#[test]
fn test_scripts_without_source_credentials() {
    let registry = new_registry(maven_import(Credentials::default(), destination_user())).unwrap();
    let scripts = registry.scripts().unwrap();

    assert_eq!(scripts.len(), 5);
    assert!(scripts[0].starts_with("mvn dependency:get"));
    assert!(!scripts[0].contains("-s settings.xml"));
    assert!(scripts[3].contains(DESTINATION_REGISTRY_LABEL));
}

#[test]
fn test_scripts_with_custom_header() {
    let source = Credentials::new("TOKEN_FOR_SOURCE").with_parameter("header_name", "HEADER_FOR_SOURCE");
    let destination =
        Credentials::new("TOKEN_FOR_DESTINATION").with_parameter("header_name", "HEADER_FOR_DESTINATION");
    let registry = new_registry(maven_import(source, destination)).unwrap();
    let scripts = registry.scripts().unwrap().join("\n");

    assert!(scripts.contains(
        "<id>pkgs_importer_source</id><configuration><httpHeaders><property><name>HEADER_FOR_SOURCE</name><value>TOKEN_FOR_SOURCE</value></property></httpHeaders></configuration>"
    ));
    assert!(scripts.contains(
        "<id>pkgs_importer_destination</id><configuration><httpHeaders><property><name>HEADER_FOR_DESTINATION</name><value>TOKEN_FOR_DESTINATION</value></property></httpHeaders></configuration>"
    ));
}

#[test]
fn test_settings_values_are_escaped() {
    let destination = Credentials::new("a<b>&\"c'").with_parameter("username", "user");
    let registry = new_registry(maven_import(Credentials::default(), destination)).unwrap();
    let scripts = registry.scripts().unwrap().join("\n");

    assert!(scripts.contains("<password>a&lt;b&gt;&amp;&#34;c&#39;</password>"));
}

// ==================== additional_env_vars tests ====================

#[test]
fn test_additional_env_vars_packaging() {
    let registry = new_registry(maven_import(Credentials::default(), destination_user())).unwrap();

    for (version, packaging) in [
        ("1.2.3", "jar"),
        ("1.2.3:war", "war"),
        ("1.2.3:pom", "pom"),
        ("1.2.3:jar:javadoc", "jar"),
    ] {
        let vars = registry.additional_env_vars("com.example:lib", version);
        assert_eq!(vars.len(), 1);
        assert_eq!(vars["PACKAGE_PACKAGING"], packaging, "version {version}");
    }
}

// ==================== validation tests ====================

#[test]
fn test_new_with_valid_packages() {
    let packages = packages_of(&[
        ("com.example:lib", "1.2.3"),
        ("com.example:lib", "1.2.3:war"),
        ("com.example:lib", "2.0.0:maven-plugin"),
        ("org.test:other", "0.1.0"),
    ]);
    let result = MavenRegistry::new(
        maven_import(Credentials::default(), destination_user()),
        "import1",
        &packages,
    );
    assert!(result.is_ok());
}

#[test]
fn test_new_with_invalid_packaging() {
    let packages = packages_of(&[("com.example:lib", "1.2.3"), ("com.example:lib", "1.2.3:zip")]);
    let err = MavenRegistry::new(
        maven_import(Credentials::default(), destination_user()),
        "import1",
        &packages,
    )
    .err()
    .unwrap();

    assert!(matches!(err, ImporterError::InvalidPackaging { .. }));
    assert!(err.to_string().starts_with("zip is an invalid Maven packaging string"));
}

#[test]
fn test_new_with_malformed_version() {
    let packages = packages_of(&[("com.example:lib", "1.2.3:jar:javadoc")]);
    let err = MavenRegistry::new(
        maven_import(Credentials::default(), destination_user()),
        "import1",
        &packages,
    )
    .err()
    .unwrap();

    assert!(matches!(err, ImporterError::InvalidVersion(_)));
    assert!(err.to_string().contains("1.2.3:jar:javadoc"));
}

#[test]
fn test_new_with_invalid_package_names() {
    for name in ["no-colon", "a:b:c", ":artifact", "group:"] {
        let packages = packages_of(&[(name, "1.0.0")]);
        let result = MavenRegistry::new(
            maven_import(Credentials::default(), destination_user()),
            "import1",
            &packages,
        );
        assert!(
            matches!(result, Err(ImporterError::InvalidPackageName(_))),
            "package name {name}"
        );
    }
}

#[test]
fn test_new_with_invalid_credentials() {
    let source = Credentials::new("TOKEN_FOR_SOURCE");
    let err = new_registry(maven_import(source, destination_user()))
        .err()
        .unwrap();

    assert_eq!(
        err.to_string(),
        r#"Maven credentials for source in import "import1" require a token and a username or a header_name for authenticated registries"#
    );
}

#[test]
fn test_new_propagates_packages_error() {
    let packages = PackageSource::new(BTreeMap::from([(
        "import1".to_string(),
        PackagesSpec::Path("packages.txt".to_string()),
    )]));
    let result = MavenRegistry::new(
        maven_import(Credentials::default(), destination_user()),
        "import1",
        &packages,
    );
    assert!(matches!(result, Err(ImporterError::PackagesNotCsv { .. })));
}
