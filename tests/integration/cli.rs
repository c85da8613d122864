//! The `devops` binary end to end.

use assert_cmd::Command;
use devops_cli::test_utils::MonorepoFixture;
use predicates::prelude::*;

fn devops() -> Command {
    let mut cmd = Command::cargo_bin("devops").unwrap();
    cmd.env_remove("RUST_LOG").env_remove("MONOREPO_ENV").env_remove("GIT_SHA");
    cmd
}

#[test]
fn test_workspace_dependents() {
    let repo = MonorepoFixture::sample().unwrap();

    devops()
        .arg("--root")
        .arg(repo.path())
        .args(["workspace", "dependents", "www"])
        .assert()
        .success()
        .stdout("www\nui\nutils\n");

    devops()
        .arg("--root")
        .arg(repo.path())
        .args(["workspace", "dependents", "www", "--direct"])
        .assert()
        .success()
        .stdout("ui\nutils\n");

    devops()
        .env("MONOREPO_ROOT", repo.path())
        .args(["workspace", "dependents", "ui", "--reverse", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"www\"").and(predicate::str::contains("\"admin\"")));
}

#[test]
fn test_workspace_not_found_exit_code() {
    let repo = MonorepoFixture::sample().unwrap();

    devops()
        .arg("--root")
        .arg(repo.path())
        .args(["workspace", "dependents", "wwww"])
        .assert()
        .code(13)
        .stdout("")
        .stderr(predicate::str::contains("wwww").and(predicate::str::contains("www")));
}

#[test]
fn test_image_queries() {
    let repo = MonorepoFixture::sample().unwrap();

    devops()
        .arg("--root")
        .arg(repo.path())
        .args(["image", "workspaces", "main"])
        .assert()
        .success()
        .stdout("www\nui\nutils\nworker\n");

    devops()
        .arg("--root")
        .arg(repo.path())
        .args(["image", "workspaces", "main", "--deployable"])
        .assert()
        .success()
        .stdout("www\nworker\n");

    devops()
        .arg("--root")
        .arg(repo.path())
        .args(["workspace", "images", "ml-core"])
        .assert()
        .success()
        .stdout("ml\n");
}

#[test]
fn test_generate_image() {
    let repo = MonorepoFixture::sample().unwrap();

    devops()
        .arg("--root")
        .arg(repo.path())
        .args(["generate", "image", "main", "--env", "staging", "--sha", "abc123"])
        .assert()
        .success()
        .stdout(
            predicate::str::starts_with("apiVersion: v1\nkind: Pod\n")
                .and(predicate::str::contains("name: main-debug"))
                .and(predicate::str::contains("host: www.staging.acme.dev"))
                .and(predicate::str::contains("\n---\n")),
        );
}

#[test]
fn test_generate_workspace_with_scale_file() {
    let repo = MonorepoFixture::sample().unwrap();
    let scale = repo.write("scale.json", r#"{"scale":"{\"worker\":7}"}"#).unwrap();

    devops()
        .arg("--root")
        .arg(repo.path())
        .args(["generate", "workspace", "worker", "--env", "production", "--sha", "abc123"])
        .arg("--scale-file")
        .arg(&scale)
        .assert()
        .success()
        .stdout(predicate::str::contains("replicas: 7"));
}

#[test]
fn test_generate_failures() {
    let repo = MonorepoFixture::sample().unwrap();

    devops()
        .arg("--root")
        .arg(repo.path())
        .args(["generate", "image", "main", "--env", "qa", "--sha", "abc123"])
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("main").and(predicate::str::contains("qa")));

    devops()
        .arg("--root")
        .arg(repo.path())
        .args(["generate", "db-migrate", "main", "--env", "development", "--sha", "abc123"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("development"));

    devops()
        .arg("--root")
        .arg(repo.path())
        .args(["generate", "workspace", "utils", "--env", "staging", "--sha", "abc123"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("utils"));
}

#[test]
fn test_template_context() {
    let repo = MonorepoFixture::sample().unwrap();

    devops()
        .arg("--root")
        .arg(repo.path())
        .args(["template", "context", "deployment", "www", "--env", "staging", "--sha", "abc123"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"project_name\": \"www\"")
                .and(predicate::str::contains("\"namespace\": \"acme-staging\""))
                .and(predicate::str::contains("\"replicas\": 1")),
        );

    devops()
        .arg("--root")
        .arg(repo.path())
        .args(["template", "list"])
        .assert()
        .success()
        .stdout("db-migrate\ndebug\nexternal-service\ninternal-service\n");
}
