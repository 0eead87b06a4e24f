//! End-to-end pipeline runs against an in-process bundler.

use kodegen_bundler_lambda::bundler::{
    ArchiveBackend, BuildOverrides, BuildSpec, BundleTool, Error, ModuleRegistry, Pipeline,
    PipelineVariant, Result, Settings, SettingsBuilder,
};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

const MODULES: [&str; 3] = ["world", "getUser", "putUser"];

/// Writes `// <module>` followed by the entry source, plus a small map.
#[derive(Default)]
struct FakeBundler {
    failing: HashSet<String>,
}

impl FakeBundler {
    fn failing(module: &str) -> Self {
        Self {
            failing: HashSet::from([module.to_string()]),
        }
    }
}

impl BundleTool for FakeBundler {
    async fn bundle(&self, spec: &BuildSpec) -> Result<()> {
        if self.failing.contains(&spec.module_name) {
            return Err(Error::Build {
                module: spec.module_name.clone(),
                diagnostic: format!("✘ [ERROR] Could not resolve \"./{}-dep\"", spec.module_name),
            });
        }

        let source = tokio::fs::read_to_string(&spec.entry_point).await?;
        tokio::fs::write(
            &spec.output_path,
            format!("// {}\n{source}", spec.module_name),
        )
        .await?;
        if let Some(map) = spec.map_path() {
            tokio::fs::write(
                map,
                format!(r#"{{"version":3,"sources":["{}.ts"]}}"#, spec.module_name),
            )
            .await?;
        }
        Ok(())
    }
}

fn write_project(root: &Path, modules: &[&str]) {
    let src = root.join("src");
    std::fs::create_dir_all(&src).unwrap();
    for name in modules {
        std::fs::write(
            src.join(format!("{name}.ts")),
            format!("export const handler = async () => ({{ statusCode: 200, body: '{name}' }});\n"),
        )
        .unwrap();
    }
}

fn settings(root: &Path, variant: PipelineVariant) -> Settings {
    SettingsBuilder::new()
        .project_root(root)
        .variant(variant)
        .jobs(2)
        .build()
        .unwrap()
}

fn read_archive(path: &Path) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(std::fs::File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut data = Vec::new();
            file.read_to_end(&mut data).unwrap();
            (file.name().to_string(), data)
        })
        .collect()
}

fn zip_files(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".zip"))
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn every_module_gets_an_archive_with_bundle_and_map() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), &MODULES);

    let registry = ModuleRegistry::from_names(MODULES).unwrap();
    let pipeline = Pipeline::new(
        settings(dir.path(), PipelineVariant::default()),
        registry,
        FakeBundler::default(),
    );
    let archives = pipeline.run().await.unwrap();

    let dist = dir.path().join("dist");
    assert_eq!(zip_files(&dist), vec!["getUser.zip", "putUser.zip", "world.zip"]);
    assert_eq!(
        archives.iter().map(|a| a.module_name.as_str()).collect::<Vec<_>>(),
        vec!["getUser", "putUser", "world"]
    );

    for name in MODULES {
        let entries = read_archive(&dist.join(format!("{name}.zip")));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, format!("{name}.js"));
        assert_eq!(
            entries[0].1,
            std::fs::read(dist.join(format!("{name}.esm.js"))).unwrap()
        );
        assert_eq!(entries[1].0, format!("{name}.js.map"));
        assert_eq!(
            entries[1].1,
            std::fs::read(dist.join(format!("{name}.esm.js.map"))).unwrap()
        );
    }
}

#[tokio::test]
async fn disabling_source_maps_drops_the_map_entry() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), &["world"]);

    let variant = PipelineVariant {
        include_source_maps: false,
        ..Default::default()
    };
    let archives = Pipeline::new(
        settings(dir.path(), variant),
        ModuleRegistry::from_names(["world"]).unwrap(),
        FakeBundler::default(),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(archives[0].entries, vec!["world.js"]);
    let entries = read_archive(&archives[0].path);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, "world.js");
    assert!(!dir.path().join("dist/world.esm.js.map").exists());
}

#[tokio::test]
async fn missing_entry_point_fails_before_any_archive_is_written() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), &["world", "getUser"]);

    let err = Pipeline::new(
        settings(dir.path(), PipelineVariant::default()),
        ModuleRegistry::from_names(MODULES).unwrap(),
        FakeBundler::default(),
    )
    .run()
    .await
    .unwrap_err();

    assert_eq!(err.stage(), "build");
    assert_eq!(err.module_name(), Some("putUser"));
    assert!(zip_files(&dir.path().join("dist")).is_empty());
}

#[tokio::test]
async fn bundler_failure_names_the_module_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), &MODULES);

    let err = Pipeline::new(
        settings(dir.path(), PipelineVariant::default()),
        ModuleRegistry::from_names(MODULES).unwrap(),
        FakeBundler::failing("getUser"),
    )
    .run()
    .await
    .unwrap_err();

    match err {
        Error::Build { module, diagnostic } => {
            assert_eq!(module, "getUser");
            assert!(diagnostic.contains("Could not resolve"));
        }
        other => panic!("expected build error, got {other}"),
    }
    assert!(zip_files(&dir.path().join("dist")).is_empty());
}

#[tokio::test]
async fn empty_registry_succeeds_without_invoking_the_bundler() {
    let dir = tempfile::tempdir().unwrap();

    let pipeline = Pipeline::new(
        settings(dir.path(), PipelineVariant::default()),
        ModuleRegistry::from_names(Vec::<String>::new()).unwrap(),
        FakeBundler::default(),
    );
    let archives = pipeline.run().await.unwrap();

    assert!(archives.is_empty());
    assert!(!dir.path().join("dist").exists());
}

#[tokio::test]
async fn reruns_replace_archives_with_identical_content() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), &MODULES);

    let pipeline = Pipeline::new(
        settings(dir.path(), PipelineVariant::default()),
        ModuleRegistry::from_names(MODULES).unwrap(),
        FakeBundler::default(),
    );
    let first = pipeline.run().await.unwrap();
    let second = pipeline.run().await.unwrap();

    assert_eq!(
        first.iter().map(|a| &a.checksum).collect::<Vec<_>>(),
        second.iter().map(|a| &a.checksum).collect::<Vec<_>>()
    );
    assert_eq!(zip_files(&dir.path().join("dist")).len(), 3);
}

#[tokio::test]
async fn packaging_failures_are_reported_for_every_module() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), &MODULES);
    let dist = dir.path().join("dist");
    for blocked in ["getUser.zip", "putUser.zip"] {
        std::fs::create_dir_all(dist.join(blocked).join("occupied")).unwrap();
    }

    let err = Pipeline::new(
        settings(dir.path(), PipelineVariant::default()),
        ModuleRegistry::from_names(MODULES).unwrap(),
        FakeBundler::default(),
    )
    .run()
    .await
    .unwrap_err();

    match err {
        Error::PackagingFailed { failures, packaged } => {
            assert_eq!(
                failures.iter().map(|f| f.module_name.as_str()).collect::<Vec<_>>(),
                vec!["getUser", "putUser"]
            );
            assert_eq!(packaged, vec![dist.join("world.zip")]);
        }
        other => panic!("expected aggregated packaging error, got {other}"),
    }
    assert!(dist.join("world.zip").is_file());
}

#[tokio::test]
async fn async_zip_backend_produces_equivalent_archives() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), &MODULES);

    let variant = PipelineVariant {
        archive_backend: ArchiveBackend::AsyncZip,
        ..Default::default()
    };
    let archives = Pipeline::new(
        settings(dir.path(), variant),
        ModuleRegistry::from_names(MODULES).unwrap(),
        FakeBundler::default(),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(archives.len(), 3);
    for archive in &archives {
        let entries = read_archive(&archive.path);
        let name = &archive.module_name;
        assert_eq!(entries[0].0, format!("{name}.js"));
        assert_eq!(entries[1].0, format!("{name}.js.map"));
        assert!(String::from_utf8_lossy(&entries[0].1).starts_with(&format!("// {name}\n")));
    }
}

#[tokio::test]
async fn module_overrides_reach_the_bundler() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), &["world", "getUser"]);

    let settings = SettingsBuilder::new()
        .project_root(dir.path())
        .module_override(
            "getUser",
            BuildOverrides {
                sourcemap: Some(false),
                minify: Some(false),
                ..Default::default()
            },
        )
        .build()
        .unwrap();
    let pipeline = Pipeline::new(
        settings,
        ModuleRegistry::from_names(["world", "getUser"]).unwrap(),
        FakeBundler::default(),
    );
    let archives = pipeline.run().await.unwrap();

    let get_user = archives.iter().find(|a| a.module_name == "getUser").unwrap();
    let world = archives.iter().find(|a| a.module_name == "world").unwrap();
    assert_eq!(get_user.entries, vec!["getUser.js"]);
    assert_eq!(world.entries, vec!["world.js", "world.js.map"]);
    assert_eq!(pipeline.settings().overrides_for("getUser").unwrap().minify, Some(false));
}
