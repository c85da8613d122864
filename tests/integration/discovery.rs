//! Workspace discovery, graphs and image build contexts on disk.

use devops_cli::config::DevopsConfig;
use devops_cli::core::{DevopsError, ErrorKind};
use devops_cli::discovery::Language;
use devops_cli::resolver::{ImageResolver, Monorepo};
use devops_cli::test_utils::{MonorepoFixture, TestMonorepoBuilder, init_test_logging};

fn names(records: Vec<&devops_cli::discovery::PackageRecord>) -> Vec<String> {
    records.into_iter().map(|record| record.name.clone()).collect()
}

#[test]
fn test_sample_monorepo_discovery() {
    init_test_logging(None);
    let repo = MonorepoFixture::sample().unwrap();
    let monorepo = Monorepo::discover(repo.path()).unwrap();

    let all: Vec<&str> = monorepo.index().names().collect();
    assert_eq!(all, vec!["admin", "ml-api", "ml-core", "ui", "utils", "worker", "www"]);

    // external dependencies are dropped
    let www = monorepo.index().record(Language::Node, "www").unwrap();
    assert_eq!(www.dependency_names, vec!["ui", "utils"]);
    let ml_api = monorepo.index().record(Language::Python, "ml-api").unwrap();
    assert_eq!(ml_api.dependency_names, vec!["ml-core"]);

    assert_eq!(monorepo.dependents_of("www").unwrap(), vec!["www", "ui", "utils"]);
    assert_eq!(monorepo.dependents_of("utils").unwrap(), vec!["utils"]);
    assert_eq!(monorepo.direct_dependencies("www").unwrap(), vec!["ui", "utils"]);
    assert_eq!(monorepo.required_by("utils").unwrap(), vec!["worker", "www", "ui", "admin"]);
}

#[test]
fn test_image_build_contexts() {
    let repo = MonorepoFixture::sample().unwrap();
    let config = DevopsConfig::load(repo.path()).unwrap();
    let monorepo = Monorepo::discover(repo.path()).unwrap();
    let resolver = ImageResolver::build(&monorepo, &config).unwrap();

    assert_eq!(names(resolver.descendants_of("main").unwrap()), vec!["www", "ui", "utils", "worker"]);
    assert_eq!(names(resolver.descendants_of("ml").unwrap()), vec!["ml-api", "ml-core"]);

    assert_eq!(resolver.images_containing("utils").unwrap(), vec!["main"]);
    assert_eq!(resolver.images_containing("ml-core").unwrap(), vec!["ml"]);
    // admin depends on ui but is not part of any image
    assert!(resolver.images_containing("admin").unwrap().is_empty());

    let err = resolver.images_containing("wwww").unwrap_err();
    match err.downcast_ref::<DevopsError>() {
        Some(DevopsError::WorkspaceNotFound { suggestions, .. }) => {
            assert!(suggestions.contains(&"www".to_string()));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_resolution_does_not_reread_the_repository() {
    let repo = MonorepoFixture::sample().unwrap();
    let config = DevopsConfig::load(repo.path()).unwrap();
    let monorepo = Monorepo::discover(repo.path()).unwrap();
    let resolver = ImageResolver::build(&monorepo, &config).unwrap();

    std::fs::remove_file(repo.path().join("package.json")).unwrap();
    std::fs::remove_file(repo.path().join(".devops/config/images.yaml")).unwrap();
    std::fs::remove_dir_all(repo.path().join("apps")).unwrap();

    let first = names(resolver.descendants_of("main").unwrap());
    let second = names(resolver.descendants_of("main").unwrap());
    assert_eq!(first, vec!["www", "ui", "utils", "worker"]);
    assert_eq!(first, second);
    assert_eq!(resolver.images_containing("utils").unwrap(), resolver.images_containing("utils").unwrap());
    assert_eq!(monorepo.dependents_of("www").unwrap(), vec!["www", "ui", "utils"]);
}

#[test]
fn test_cyclic_workspaces_terminate() {
    let repo = TestMonorepoBuilder::new()
        .unwrap()
        .with_node_workspace("libs/a", "a", &["b"], None)
        .with_node_workspace("libs/b", "b", &["a"], None)
        .build()
        .unwrap();
    let monorepo = Monorepo::discover(repo.path()).unwrap();

    assert_eq!(monorepo.dependents_of("a").unwrap(), vec!["a", "b"]);
    assert_eq!(monorepo.dependents_of("b").unwrap(), vec!["b", "a"]);
    assert_eq!(monorepo.graph(Language::Node).cycles(), vec![vec!["a".to_string(), "b".to_string()]]);
}

#[test]
fn test_workspaces_below_node_modules_are_ignored() {
    let repo = TestMonorepoBuilder::new()
        .unwrap()
        .with_node_workspace("packages/app", "app", &["dep"], None)
        .with_file("package.json", r#"{"name": "monorepo", "workspaces": ["packages/**"]}"#)
        .with_file("packages/app/node_modules/dep/package.json", r#"{"name": "dep"}"#)
        .build()
        .unwrap();
    let monorepo = Monorepo::discover(repo.path()).unwrap();

    let all: Vec<&str> = monorepo.index().names().collect();
    assert_eq!(all, vec!["app"]);
    assert!(monorepo.index().record(Language::Node, "app").unwrap().dependency_names.is_empty());
}

#[test]
fn test_unknown_application_fails_resolution() {
    let repo = TestMonorepoBuilder::new()
        .unwrap()
        .with_node_workspace("apps/www", "www", &[], None)
        .with_images("images:\n  main:\n    applications: [web]\n")
        .build()
        .unwrap();
    let config = DevopsConfig::load(repo.path()).unwrap();
    let monorepo = Monorepo::discover(repo.path()).unwrap();

    let err = ImageResolver::build(&monorepo, &config).unwrap_err();
    assert_eq!(DevopsError::kind_of(&err), Some(ErrorKind::NotFound));
    assert!(format!("{err:#}").contains("web"));
}

#[test]
fn test_broken_workspace_manifest() {
    let repo = TestMonorepoBuilder::new()
        .unwrap()
        .with_node_workspace("apps/www", "www", &[], None)
        .build()
        .unwrap();
    repo.write("apps/www/package.json", "{ not json").unwrap();

    let err = Monorepo::discover(repo.path()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DevopsError>(),
        Some(DevopsError::ManifestParseError { .. })
    ));
}
