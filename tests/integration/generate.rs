//! Manifest generation over the sample monorepo.

use devops_cli::config::DevopsConfig;
use devops_cli::core::{DevopsError, ErrorKind};
use devops_cli::discovery::Language;
use devops_cli::k8s::{ConfigMapScale, ManifestGenerator, NoScale, ScaleSource};
use devops_cli::resolver::{ImageResolver, Monorepo};
use devops_cli::templating::{TemplateComposer, parse_documents};
use devops_cli::test_utils::{MonorepoFixture, TestMonorepo};
use std::path::Path;

const SHA: &str = "4f2a9c1e0b7d";

struct Loaded {
    repo: TestMonorepo,
    config: DevopsConfig,
    monorepo: Monorepo,
    resolver: ImageResolver,
    composer: TemplateComposer,
}

impl Loaded {
    fn sample() -> Self {
        Self::load(MonorepoFixture::sample().unwrap())
    }

    fn load(repo: TestMonorepo) -> Self {
        let config = DevopsConfig::load(repo.path()).unwrap();
        let monorepo = Monorepo::discover(repo.path()).unwrap();
        let resolver = ImageResolver::build(&monorepo, &config).unwrap();
        let composer = TemplateComposer::load(&config.manifests_dir()).unwrap();
        Self {
            repo,
            config,
            monorepo,
            resolver,
            composer,
        }
    }

    fn generator<'a>(&'a self, scale: &'a dyn ScaleSource) -> ManifestGenerator<'a> {
        ManifestGenerator::new(&self.config, &self.composer, &self.resolver, scale)
    }
}

fn keys(manifest: &str) -> Vec<String> {
    parse_documents(Path::new("output.yaml"), manifest)
        .unwrap()
        .iter()
        .map(|document| document.key().to_string())
        .collect()
}

fn document(manifest: &str, key: &str) -> serde_yaml::Value {
    parse_documents(Path::new("output.yaml"), manifest)
        .unwrap()
        .into_iter()
        .find(|document| document.key().to_string() == key)
        .map(|document| document.value().clone())
        .unwrap_or_else(|| panic!("no document {key} in:\n{manifest}"))
}

#[test]
fn test_image_deployments() {
    let loaded = Loaded::sample();
    let manifest = loaded.generator(&NoScale).image_deployments("staging", "main", SHA).unwrap();

    assert_eq!(
        keys(&manifest),
        vec![
            "Pod-main-debug",
            "Deployment-www",
            "Service-www",
            "Ingress-www",
            "ConfigMap-www-settings",
            "Deployment-worker",
        ]
    );
    assert!(manifest.contains("\n---\n"));

    let www = document(&manifest, "Deployment-www");
    assert_eq!(www["metadata"]["namespace"].as_str(), Some("acme-staging"));
    assert_eq!(www["metadata"]["labels"]["tier"].as_str(), Some("frontend"));
    assert_eq!(www["spec"]["replicas"].as_u64(), Some(1));
    assert_eq!(
        www["spec"]["template"]["spec"]["containers"][0]["image"].as_str(),
        Some("registry.example.com/images/acme-staging-main:4f2a9c1e0b7d")
    );

    let ingress = document(&manifest, "Ingress-www");
    assert_eq!(ingress["spec"]["rules"][0]["host"].as_str(), Some("www.staging.acme.dev"));

    // a declared replica count is ignored without a persisted scale
    let worker = document(&manifest, "Deployment-worker");
    assert_eq!(worker["spec"]["replicas"].as_u64(), Some(1));
}

#[test]
fn test_persisted_scale_overrides_declared_replicas() {
    let loaded = Loaded::sample();
    let scale_file = loaded
        .repo
        .write("scale.json", r#"{"version":"abc","scale":"{\"www\":3,\"worker\":5}"}"#)
        .unwrap();
    let scale = ConfigMapScale::from_file(&scale_file).unwrap();

    let manifest = loaded.generator(&scale).image_deployments("production", "main", SHA).unwrap();
    assert_eq!(document(&manifest, "Deployment-www")["spec"]["replicas"].as_u64(), Some(3));
    assert_eq!(document(&manifest, "Deployment-worker")["spec"]["replicas"].as_u64(), Some(5));
}

#[test]
fn test_image_without_debug_template() {
    let loaded = Loaded::sample();
    let generator = loaded.generator(&NoScale);

    let err = generator.image_deployments("staging", "ml", SHA).unwrap_err();
    assert_eq!(DevopsError::kind_of(&err), Some(ErrorKind::Configuration));
    assert!(format!("{err:#}").contains("debug-template"));

    let err = generator.debug_deployment("staging", "ml", SHA).unwrap_err();
    assert_eq!(DevopsError::kind_of(&err), Some(ErrorKind::Configuration));

    // the workspace itself still renders on its own
    let ml_api = loaded.monorepo.index().record(Language::Python, "ml-api").unwrap();
    let manifest = generator.workspace_deployment(ml_api, "staging", "ml", SHA).unwrap();
    assert_eq!(keys(&manifest), vec!["Deployment-ml-api"]);
}

#[test]
fn test_missing_domain_is_reported() {
    let loaded = Loaded::sample();
    let err = loaded.generator(&NoScale).image_deployments("qa", "main", SHA).unwrap_err();

    match err.downcast_ref::<DevopsError>() {
        Some(DevopsError::DomainMissing { image, env }) => {
            assert_eq!(image, "main");
            assert_eq!(env, "qa");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_workspace_deployment_and_jobs() {
    let loaded = Loaded::sample();
    let generator = loaded.generator(&NoScale);

    let worker = loaded.monorepo.index().record(Language::Node, "worker").unwrap();
    let manifest = generator.workspace_deployment(worker, "qa", "main", SHA).unwrap();
    assert_eq!(keys(&manifest), vec!["Deployment-worker"]);
    assert_eq!(
        document(&manifest, "Deployment-worker")["metadata"]["namespace"].as_str(),
        Some("acme-qa")
    );

    let debug = generator.debug_deployment("staging", "main", SHA).unwrap();
    assert_eq!(keys(&debug), vec!["Pod-main-debug"]);

    let job = generator.db_migrate_job("staging", "main", SHA).unwrap();
    assert_eq!(keys(&job), vec!["Job-db-migrate-job-4f2a9c1e"]);
}

#[test]
fn test_malformed_fragment_names_the_file() {
    let loaded = Loaded::sample();
    loaded
        .repo
        .write(".devops/manifests/jobs/db-migrate.yaml", "kind: Job\nmetadata:\n  labels: {}\n")
        .unwrap();

    let err = loaded.generator(&NoScale).db_migrate_job("staging", "main", SHA).unwrap_err();
    match err.downcast_ref::<DevopsError>() {
        Some(DevopsError::MalformedTemplate { path, .. }) => {
            assert!(path.ends_with("jobs/db-migrate.yaml"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_undefined_variable_in_override() {
    let loaded = Loaded::sample();
    loaded
        .repo
        .write(
            "apps/www/manifests/deployment.yaml",
            "kind: Deployment\nmetadata:\n  name: {{ app_nme }}\n",
        )
        .unwrap();
    let www = loaded.monorepo.index().record(Language::Node, "www").unwrap();

    let err = loaded
        .generator(&NoScale)
        .workspace_deployment(www, "staging", "main", SHA)
        .unwrap_err();
    assert_eq!(DevopsError::kind_of(&err), Some(ErrorKind::MalformedTemplate));
}
