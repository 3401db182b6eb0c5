//! End-to-end runs of the binary against fake `docker` and `docker-compose`
//! executables, wired in through the user config file.

#![cfg(target_os = "linux")]

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PROJECT: &str = r#"{
  "name": "shop",
  "services": {
    "api": {"image": "shop/api:1.0", "build": {"context": "/srv/api", "args": {"FOO": "bar"}}},
    "db": {"image": "postgres:16"},
    "web": {"image": "shop/web:1.0", "build": {"context": "/srv/web"}}
  }
}"#;

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    /// `fail_for` is matched against the buildx arguments to simulate a failed build
    fn new(fail_for: &str) -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let root = dir.path();

        fs::write(root.join("project.json"), PROJECT)?;
        write_script(
            &root.join("docker-compose"),
            &format!("#!/bin/sh\ncat '{}'\n", root.join("project.json").display()),
        )?;
        write_script(
            &root.join("docker"),
            &format!(
                "#!/bin/sh\necho \"$*\" >> '{}'\ncase \"$*\" in *{}*) exit 1;; esac\nexit 0\n",
                root.join("calls.log").display(),
                fail_for
            ),
        )?;

        let config_dir = root.join("config").join("compose-buildx");
        fs::create_dir_all(&config_dir)?;
        fs::write(
            config_dir.join("config.toml"),
            format!(
                "docker = \"{}\"\ncompose_command = [\"{}\"]\n",
                root.join("docker").display(),
                root.join("docker-compose").display()
            ),
        )?;

        Ok(Self { dir })
    }

    fn command(&self) -> Result<Command> {
        let mut cmd = Command::cargo_bin("compose-buildx")?;
        cmd.env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .current_dir(self.dir.path());
        Ok(cmd)
    }

    fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.log_path())
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn log_path(&self) -> PathBuf {
        self.dir.path().join("calls.log")
    }
}

fn write_script(path: &Path, body: &str) -> Result<()> {
    fs::write(path, body)?;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[test]
fn test_help_command() -> Result<()> {
    let mut cmd = Command::cargo_bin("compose-buildx")?;
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Docker Compose 'buildx' helper"))
        .stdout(predicate::str::contains("--all-arch"))
        .stdout(predicate::str::contains("--ignore-errors"));
    Ok(())
}

#[test]
fn test_version_command() -> Result<()> {
    let mut cmd = Command::cargo_bin("compose-buildx")?;
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("compose-buildx 0.1.0"));
    Ok(())
}

#[test]
fn test_builds_all_services_for_all_architectures() -> Result<()> {
    let sandbox = Sandbox::new("never-fails")?;
    sandbox
        .command()?
        .arg("--all-arch")
        .assert()
        .success()
        .stderr(predicate::str::contains("Building api linux/arm64 image"))
        .stderr(predicate::str::contains("Building web linux/amd64 image"))
        .stderr(predicate::str::contains("Finished 4 build(s), 0 failed"));

    let calls = sandbox.calls();
    assert_eq!(calls.len(), 4);
    assert!(calls[0].starts_with("buildx build --platform linux/arm64"));
    assert!(calls[0].contains("--build-arg FOO=bar --tag shop/api:1.0 -f /srv/api/Dockerfile /srv/api"));
    assert!(calls.iter().all(|call| !call.contains("postgres")));
    Ok(())
}

#[test]
fn test_verbose_logs_command() -> Result<()> {
    let sandbox = Sandbox::new("never-fails")?;
    sandbox
        .command()?
        .args(["web", "--all-arch", "--verbose"])
        .assert()
        .success()
        .stderr(predicate::str::contains("buildx build\n\t--platform"));
    Ok(())
}

#[test]
fn test_command_hidden_without_verbose() -> Result<()> {
    let sandbox = Sandbox::new("never-fails")?;
    sandbox
        .command()?
        .arg("web")
        .assert()
        .success()
        .stderr(predicate::str::contains("--platform").not());
    Ok(())
}

#[test]
fn test_unknown_service_is_fatal() -> Result<()> {
    let sandbox = Sandbox::new("never-fails")?;
    sandbox
        .command()?
        .args(["web", "cache"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Service cache not found in docker-compose config",
        ));

    assert!(sandbox.calls().is_empty());
    Ok(())
}

#[test]
fn test_failure_exits_with_code_one() -> Result<()> {
    let sandbox = Sandbox::new("/srv/api")?;
    sandbox
        .command()?
        .args(["api", "web", "--all-arch"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Docker build failed for api linux/arm64 image !",
        ))
        .stderr(predicate::str::contains("\t--platform linux/arm64"));

    assert_eq!(sandbox.calls().len(), 1);
    Ok(())
}

#[test]
fn test_ignore_errors_keeps_going() -> Result<()> {
    let sandbox = Sandbox::new("/srv/api")?;
    sandbox
        .command()?
        .args(["api", "web", "--all-arch", "--ignore-errors"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Docker build failed for api"))
        .stderr(predicate::str::contains("Finished 4 build(s), 2 failed"));

    assert_eq!(sandbox.calls().len(), 4);
    Ok(())
}

#[test]
fn test_shared_tag_warning() -> Result<()> {
    let sandbox = Sandbox::new("never-fails")?;
    sandbox
        .command()?
        .args(["api", "web", "--all-arch", "--tag", "shop/all:dev"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Using --tag or --target likely only makes sense when building just one service",
        ));

    assert!(sandbox
        .calls()
        .iter()
        .all(|call| call.contains("--tag shop/all:dev")));
    Ok(())
}

#[test]
fn test_compose_warnings_are_shown() -> Result<()> {
    let sandbox = Sandbox::new("never-fails")?;
    write_script(
        &sandbox.dir.path().join("docker-compose"),
        &format!(
            "#!/bin/sh\necho 'The TOKEN variable is not set. Defaulting to a blank string.' >&2\ncat '{}'\n",
            sandbox.dir.path().join("project.json").display()
        ),
    )?;

    sandbox
        .command()?
        .args(["web", "--all-arch"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "The TOKEN variable is not set. Defaulting to a blank string.",
        ));
    Ok(())
}

#[test]
fn test_empty_tag_uses_service_image() -> Result<()> {
    let sandbox = Sandbox::new("never-fails")?;
    sandbox
        .command()?
        .args(["web", "--all-arch", "--tag", ""])
        .assert()
        .success();

    let calls = sandbox.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|call| call.contains("--tag shop/web:1.0 -f")));
    Ok(())
}

#[test]
fn test_compose_failure_is_fatal() -> Result<()> {
    let sandbox = Sandbox::new("never-fails")?;
    write_script(
        &sandbox.dir.path().join("docker-compose"),
        "#!/bin/sh\necho 'no configuration file provided: not found' >&2\nexit 1\n",
    )?;

    sandbox
        .command()?
        .assert()
        .failure()
        .stderr(predicate::str::contains("no configuration file provided"));
    assert!(!sandbox.log_path().exists());
    Ok(())
}
