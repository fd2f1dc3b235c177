use super::*;
use crate::config::{Credentials, Import, RegistryConfig};
use crate::packages::{PackageSource, PackagesMap, PackagesSpec};
use crate::pipeline::PipelineJob;
use proptest::prelude::*;
use std::collections::BTreeMap;

/// インポート名
fn import_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,11}".prop_map(|s| s)
}

/// npm パッケージ名
fn package_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9.-]{0,15}".prop_map(|s| s)
}

/// バージョン文字列
fn version_strategy() -> impl Strategy<Value = String> {
    "[0-9]{1,2}\\.[0-9]{1,2}\\.[0-9]{1,2}".prop_map(|s| s)
}

fn packages_strategy() -> impl Strategy<Value = PackagesMap> {
    prop::collection::btree_map(
        package_name_strategy(),
        prop::collection::vec(version_strategy(), 1..4),
        0..4,
    )
}

fn config_strategy() -> impl Strategy<Value = Configuration> {
    prop::collection::btree_map(import_name_strategy(), packages_strategy(), 1..4).prop_map(
        |imports| {
            let imports: BTreeMap<String, Import> = imports
                .into_iter()
                .map(|(name, packages)| {
                    let import = Import::new(
                        "npm",
                        RegistryConfig::new("http://source.test", Credentials::default()),
                        RegistryConfig::new("https://destination.test", Credentials::new("TOKEN")),
                    )
                    .with_packages(PackagesSpec::Inline(packages));
                    (name, import)
                })
                .collect();
            Configuration::new(imports)
        },
    )
}

fn generate(config: &Configuration) -> Vec<u8> {
    let packages = PackageSource::from_config(config);
    let mut out = Vec::new();
    Generator::new(config, &packages).generate(&mut out).unwrap();
    out
}

proptest! {
    /// 同じ設定からは常に同じバイト列が生成される
    #[test]
    fn prop_generation_is_deterministic(config in config_strategy()) {
        prop_assert_eq!(generate(&config), generate(&config));
    }

    /// ステージはインポート名順、ジョブのラベルは `{import}:{name}:{version}`
    #[test]
    fn prop_labels_follow_import_package_version(config in config_strategy()) {
        let packages = PackageSource::from_config(&config);
        let pipeline = Generator::new(&config, &packages).build_pipeline().unwrap();

        let names: Vec<&String> = config.imports.keys().collect();
        let stages: Vec<&String> = pipeline.stages().iter().collect();
        prop_assert_eq!(stages, names);

        let mut expected = 0;
        for (import_name, import) in &config.imports {
            let hidden = format!(".{import_name}:scripts");
            prop_assert!(pipeline.get(&hidden).is_some());

            let PackagesSpec::Inline(packages) = &import.packages else {
                unreachable!("inline packages only");
            };
            for (name, versions) in packages {
                for version in versions {
                    let label = format!("{import_name}:{name}:{version}");
                    match pipeline.get(&label) {
                        Some(PipelineJob::Standard(job)) => {
                            prop_assert_eq!(&job.extends, &hidden);
                            prop_assert_eq!(&job.variables["PACKAGE_NAME"], name);
                            prop_assert_eq!(&job.variables["PACKAGE_VERSION"], version);
                        }
                        other => prop_assert!(false, "unexpected job for {}: {:?}", label, other),
                    }
                }
                // 重複バージョンは同じラベルに上書きされる
                let mut unique = versions.clone();
                unique.sort();
                unique.dedup();
                expected += unique.len();
            }
            expected += 1;
        }

        prop_assert_eq!(pipeline.jobs().len(), expected);
    }
}
