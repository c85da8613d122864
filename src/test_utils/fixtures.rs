//! Canned monorepo fixtures
//!
//! Configuration files and template fragments shaped like a real project,
//! plus [`MonorepoFixture::sample`], a complete monorepo built from them.

use anyhow::Result;

use super::builder::{TestMonorepo, TestMonorepoBuilder};

/// Sample `constants.yaml`
pub const CONSTANTS: &str = r#"
project-name: acme
registry-base-url: registry.example.com
registry-name: images
extra-remote-environments:
  - qa
"#;

/// Sample `images.yaml`: a Node image with a debug pod and a Python image
/// without one
pub const IMAGES: &str = r#"
images:
  main:
    language: node
    applications:
      - www
      - worker
    debug-template: debug
    domains:
      staging: staging.acme.dev
      production: acme.dev
  ml:
    language: python
    applications:
      - ml-api
    domains:
      staging: ml.staging.acme.dev
"#;

/// Deployment fragment using the deployment context
pub const DEPLOYMENT_FRAGMENT: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: {{ app_name }}
  namespace: {{ namespace }}
spec:
  replicas: {{ replicas }}
  template:
    spec:
      containers:
        - name: {{ app_name }}
          image: {{ image_path }}
          envFrom:
            - secretRef:
                name: {{ env_secret_name }}
"#;

/// Service and ingress fragment; needs `port` and the domain
pub const SERVICE_FRAGMENT: &str = r#"apiVersion: v1
kind: Service
metadata:
  name: {{ service_name }}
  namespace: {{ namespace }}
spec:
  ports:
    - port: {{ port }}
---
apiVersion: networking.k8s.io/v1
kind: Ingress
metadata:
  name: {{ app_name }}
  namespace: {{ namespace }}
spec:
  rules:
    - host: {{ subdomain }}.{{ domain_name }}
"#;

/// Debug pod fragment
pub const DEBUG_FRAGMENT: &str = r#"apiVersion: v1
kind: Pod
metadata:
  name: {{ debug_pod_name }}
  namespace: {{ namespace }}
spec:
  containers:
    - name: debug
      image: {{ image_path }}
      command: ["sleep", "infinity"]
"#;

/// Database migration job fragment
pub const DB_MIGRATE_FRAGMENT: &str = r#"apiVersion: batch/v1
kind: Job
metadata:
  name: {{ db_migrate_job_name }}
  namespace: {{ namespace }}
spec:
  template:
    spec:
      restartPolicy: Never
      containers:
        - name: migrate
          image: {{ image_path }}
"#;

/// Override raising the `www` deployment and adding a config map
pub const WWW_OVERRIDE: &str = r#"kind: Deployment
metadata:
  name: {{ app_name }}
  labels:
    tier: frontend
---
kind: ConfigMap
metadata:
  name: {{ app_name }}-settings
  namespace: {{ namespace }}
data:
  env: {{ monorepo_env }}
"#;

/// Ready-made monorepos
pub struct MonorepoFixture;

impl MonorepoFixture {
    /// Builder preloaded with the sample configuration and templates
    pub fn builder() -> Result<TestMonorepoBuilder> {
        Ok(TestMonorepoBuilder::new()?
            .with_constants(CONSTANTS)
            .with_images(IMAGES)
            .with_template(
                "external-service",
                &[("deployment.yaml", DEPLOYMENT_FRAGMENT), ("service.yaml", SERVICE_FRAGMENT)],
            )
            .with_template("internal-service", &[("deployment.yaml", DEPLOYMENT_FRAGMENT)])
            .with_template("debug", &[("debug.yaml", DEBUG_FRAGMENT)])
            .with_template("db-migrate", &[("jobs/db-migrate.yaml", DB_MIGRATE_FRAGMENT)]))
    }

    /// Complete sample monorepo
    ///
    /// | Workspace | Language | Depends on       | Deployment         |
    /// |-----------|----------|------------------|--------------------|
    /// | www       | node     | ui, utils        | external-service   |
    /// | worker    | node     | utils            | internal-service   |
    /// | ui        | node     | utils            | -                  |
    /// | utils     | node     | -                | -                  |
    /// | admin     | node     | ui               | -                  |
    /// | ml-api    | python   | ml-core          | internal-service   |
    /// | ml-core   | python   | -                | -                  |
    ///
    /// `www` carries a `manifests/` override folder.
    pub fn sample() -> Result<TestMonorepo> {
        Self::builder()?
            .with_node_workspace(
                "apps/www",
                "www",
                &["ui", "utils", "react"],
                Some(serde_json::json!({
                    "template": "external-service",
                    "service_name": "www",
                    "port": 3000,
                })),
            )
            .with_node_workspace(
                "apps/worker",
                "worker",
                &["utils"],
                Some(serde_json::json!({"template": "internal-service", "replicas": 2})),
            )
            .with_node_workspace("apps/admin", "admin", &["ui"], None)
            .with_node_workspace("libs/ui", "ui", &["utils"], None)
            .with_node_workspace("libs/utils", "utils", &[], None)
            .with_python_workspace(
                "py/ml-api",
                "ml-api",
                &["ml-core", "fastapi>=0.110"],
                Some("template = \"internal-service\""),
            )
            .with_python_workspace("py/ml-core", "ml-core", &[], None)
            .with_file("apps/www/manifests/deployment.yaml", WWW_OVERRIDE)
            .build()
    }
}
