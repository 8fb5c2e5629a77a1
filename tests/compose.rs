// ABOUTME: Integration tests for the compose project lifecycle.
// ABOUTME: Drives start, lookup, probing and cleanup against a scripted launcher.

mod support;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use stevedore::compose::{Compose, ComposeError, ComposeErrorKind, Options};
use stevedore::config::{ComposeConfig, Network, Service, Settings};
use stevedore::retry::SimpleRetryPolicy;
use stevedore::types::ProjectName;
use support::fake_inspector::{FakeInspector, container, container_with_port};
use support::scripted_runner::{PRUNE, ScriptedRunner, UP};
use tokio_util::sync::CancellationToken;

fn fast_settings() -> Settings {
    Settings {
        start_retry_delay: Duration::from_millis(1),
        cleanup_retry_delay: Duration::from_millis(1),
        ..Settings::default()
    }
}

fn two_services() -> ComposeConfig {
    ComposeConfig::new("3")
        .with_service("svcA", Service::new("busybox:latest"))
        .with_service("svcB", Service::new("busybox:latest"))
}

struct Harness {
    runner: Arc<ScriptedRunner>,
    inspector: Arc<FakeInspector>,
}

impl Harness {
    fn new() -> Self {
        support::init_tracing();
        Self {
            runner: Arc::new(ScriptedRunner::new(&["a1", "b1"])),
            inspector: Arc::new(FakeInspector::new([
                container("a1", "/proj_svcA_1"),
                container_with_port("b1", "/proj_svcB_1", 6379, 32768),
            ])),
        }
    }

    fn options(&self, config: ComposeConfig) -> Options {
        Options::new(config)
            .project_name(ProjectName::new("proj").unwrap())
            .settings(fast_settings())
            .runner(self.runner.clone())
            .inspector(self.inspector.clone())
    }
}

mod start {
    use super::*;

    #[tokio::test]
    async fn maps_containers_to_services() {
        let h = Harness::new();
        let compose = Compose::start(h.options(two_services())).await.unwrap();

        let names: Vec<_> = compose.containers().keys().cloned().collect();
        assert_eq!(names, vec!["svcA", "svcB"]);
        assert_eq!(compose.containers()["svcA"].short_name(), "proj_svcA_1");
        assert_eq!(compose.containers()["svcB"].short_name(), "proj_svcB_1");
        let ids: Vec<_> = compose.container_ids().iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "b1"]);

        let calls = h.runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "docker-compose");
        assert_eq!(
            calls[0].args,
            vec![
                "-f".to_string(),
                compose.file_path().display().to_string(),
                "-p".to_string(),
                "proj".to_string(),
                "--verbose".to_string(),
                "up".to_string(),
                "-d".to_string(),
            ]
        );

        compose.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn every_service_is_resolvable() {
        let h = Harness::new();
        let mut compose = Compose::start(h.options(two_services()).start_retries(2))
            .await
            .unwrap();

        for key in ["svcA", "svcB"] {
            let info = compose.get_container(key).await.unwrap();
            assert!(info.short_name().contains(key));
        }
        compose.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn retries_failed_up_until_success() {
        let h = Harness::new();
        h.runner.fail(UP, "ERROR: attempt-1");
        h.runner.fail(UP, "ERROR: attempt-2");

        let compose = Compose::start(h.options(two_services()).start_retries(3))
            .await
            .unwrap();

        assert_eq!(h.runner.count(UP), 3);
        assert_eq!(compose.containers().len(), 2);
        compose.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn reports_last_failure_when_retries_run_out() {
        let h = Harness::new();
        h.runner.fail(UP, "ERROR: attempt-1");
        h.runner.fail(UP, "ERROR: attempt-2");

        let err = Compose::start(h.options(two_services()).start_retries(2))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ComposeErrorKind::Start);
        let message = err.to_string();
        assert!(message.starts_with("error starting containers: "), "{message}");
        assert!(message.ends_with("ERROR: attempt-2"), "{message}");
        assert_eq!(h.runner.count(UP), 2);
    }

    #[tokio::test]
    async fn failed_start_keeps_rendered_file() {
        let h = Harness::new();
        h.runner.fail(UP, "ERROR: attempt-1");

        let err = Compose::start(h.options(two_services()).start_retries(1))
            .await
            .unwrap_err();

        let file = match err {
            ComposeError::Start { file, .. } => file,
            other => panic!("unexpected error: {other}"),
        };
        assert!(file.exists(), "{} should survive a failed start", file.display());
        let rendered = std::fs::read_to_string(&file).unwrap();
        assert!(rendered.contains("svcA"));
        std::fs::remove_file(&file).unwrap();
    }

    #[tokio::test]
    async fn start_retries_win_over_later_settings() {
        let h = Harness::new();
        h.runner.fail(UP, "ERROR: attempt-1");
        h.runner.fail(UP, "ERROR: attempt-2");

        let single_attempt = Settings {
            start_retries: 1,
            ..fast_settings()
        };
        let compose = Compose::start(
            h.options(two_services())
                .start_retries(3)
                .settings(single_attempt),
        )
        .await
        .unwrap();

        assert_eq!(h.runner.count(UP), 3);
        compose.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn unmapped_container_fails_the_attempt() {
        let h = Harness::new();
        h.inspector.insert(container("x1", "/proj_other_1"));
        h.runner.succeed(UP, support::scripted_runner::up_output(&["x1"]));

        let compose = Compose::start(h.options(two_services())).await.unwrap();

        assert_eq!(h.runner.count(UP), 2);
        assert_eq!(compose.containers().len(), 2);
        assert!(compose.container("other").is_none());
        compose.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn unmapped_container_is_named_in_the_error() {
        let h = Harness::new();
        h.inspector.insert(container("x1", "/proj_other_1"));
        h.runner.succeed(UP, support::scripted_runner::up_output(&["x1"]));

        let err = Compose::start(h.options(two_services()).start_retries(1))
            .await
            .unwrap_err();

        assert!(
            err.to_string()
                .ends_with("could not map container 'proj_other_1' to a known service"),
            "{err}"
        );
    }

    #[tokio::test]
    async fn rm_first_kills_and_removes_before_up() {
        let h = Harness::new();
        let compose = Compose::start(h.options(two_services()).rm_first(true))
            .await
            .unwrap();

        assert_eq!(h.runner.verbs(), vec!["kill", "rm --force -v", UP]);
        compose.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn force_pull_failure_is_fatal() {
        let h = Harness::new();
        h.runner.fail("pull", "ERROR: manifest unknown");

        let err = Compose::start(h.options(two_services()).force_pull(true))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ComposeErrorKind::Command);
        assert!(err.to_string().starts_with("error pulling images: "));
        assert_eq!(h.runner.verbs(), vec!["pull"]);
    }

    #[tokio::test]
    async fn rendered_file_has_no_networks() {
        let h = Harness::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docker-compose.yaml");

        let mut web = Service::new("nginx:latest");
        web.networks = vec!["backend".to_string()];
        let mut config = ComposeConfig::new("3")
            .with_service("svcA", web)
            .with_service("svcB", Service::new("redis:7"));
        config
            .networks
            .insert("backend".to_string(), Some(Network::default()));

        let compose = Compose::start(h.options(config.clone()).write_to_file(&path))
            .await
            .unwrap();
        assert_eq!(compose.file_path(), path.as_path());

        let rendered = ComposeConfig::load(&path).unwrap();
        assert!(rendered.networks.is_empty());
        assert!(rendered.services.values().all(|s| s.networks.is_empty()));
        assert_eq!(rendered.services["svcA"].image.as_deref(), Some("nginx:latest"));
        // The caller's configuration is untouched.
        assert_eq!(config.services["svcA"].networks, vec!["backend".to_string()]);

        compose.cleanup().await.unwrap();
        assert!(path.exists(), "a caller-provided file is never deleted");
    }

    #[tokio::test]
    async fn ambiguous_service_names_are_rejected() {
        let h = Harness::new();
        let config = ComposeConfig::new("3")
            .with_service("db", Service::new("postgres:16"))
            .with_service("dbadmin", Service::new("adminer:latest"));

        let err = Compose::start(h.options(config)).await.unwrap_err();

        assert_eq!(err.kind(), ComposeErrorKind::Config);
        assert!(h.runner.calls().is_empty());
    }

    #[tokio::test]
    async fn ambiguous_names_allowed_when_validation_is_off() {
        let h = Harness::new();
        h.inspector.insert(container("d1", "/proj_db_1"));
        h.runner.succeed(UP, support::scripted_runner::up_output(&["d1"]));
        let config = ComposeConfig::new("3")
            .with_service("db", Service::new("postgres:16"))
            .with_service("dbadmin", Service::new("adminer:latest"));

        let compose = Compose::start(h.options(config).validate_service_names(false))
            .await
            .unwrap();

        assert!(compose.container("db").is_some());
        compose.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn cancellation_cuts_retries_short() {
        let h = Harness::new();
        h.runner.fail(UP, "ERROR: attempt-1");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let slow = Settings {
            start_retry_delay: Duration::from_secs(60),
            ..fast_settings()
        };

        let err = Compose::start(h.options(two_services()).settings(slow).cancellation(cancel))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ComposeErrorKind::Cancelled);
        assert_eq!(h.runner.count(UP), 1);
    }
}

mod lookup {
    use super::*;

    #[tokio::test]
    async fn get_container_refreshes() {
        let h = Harness::new();
        let mut compose = Compose::start(h.options(two_services())).await.unwrap();
        let before = h.inspector.inspected().len();

        let info = compose.get_container("svcB").await.unwrap();
        assert_eq!(info.first_public_port(6379, "tcp").unwrap(), 32768);
        assert_eq!(h.inspector.inspected().len(), before + 2);

        compose.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn unknown_key_is_not_found() {
        let h = Harness::new();
        let mut compose = Compose::start(h.options(two_services())).await.unwrap();

        let err = compose.get_container("nope").await.unwrap_err();

        assert_eq!(err.kind(), ComposeErrorKind::NotFound);
        assert_eq!(err.to_string(), "no container nope found");
        compose.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_mapping() {
        let h = Harness::new();
        let mut compose = Compose::start(h.options(two_services())).await.unwrap();
        h.inspector.remove("a1");

        let err = compose.get_container("svcB").await.unwrap_err();

        assert_eq!(err.kind(), ComposeErrorKind::Inspect);
        assert_eq!(compose.containers().len(), 2);
        compose.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn connect_retries_probe() {
        let h = Harness::new();
        let compose = Compose::start(h.options(two_services())).await.unwrap();
        let mut attempts = 0;

        let result: Result<(), _> = compose
            .connect(SimpleRetryPolicy::new(2, Duration::from_millis(1)), || {
                attempts += 1;
                async { Err("connection refused") }
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(attempts, 3);
        assert_eq!(err.attempts(), 3);
        compose.cleanup().await.unwrap();
    }
}

mod cleanup {
    use super::*;

    #[tokio::test]
    async fn runs_every_step_and_aggregates_failures() {
        let h = Harness::new();
        let compose = Compose::start(h.options(two_services())).await.unwrap();
        h.runner.clear_calls();
        h.runner.fail("kill", "ERROR: permission denied");
        h.runner.fail("down -v --remove-orphans", "ERROR: busy");

        let err = compose.cleanup().await.unwrap_err();

        assert_eq!(err.kind(), ComposeErrorKind::Cleanup);
        let message = err.to_string();
        assert!(message.contains("permission denied"), "{message}");
        assert!(message.contains("busy"), "{message}");
        assert!(
            message.find("permission denied") < message.find("busy"),
            "{message}"
        );
        assert_eq!(
            h.runner.verbs(),
            vec!["stop", "kill", "down -v --remove-orphans", PRUNE]
        );
        assert_eq!(h.runner.calls()[3].program, "docker");
    }

    #[tokio::test]
    async fn stop_and_prune_failures_are_both_reported() {
        let h = Harness::new();
        let compose = Compose::start(h.options(two_services())).await.unwrap();
        h.runner.fail("stop", "ERROR: permission denied");
        for _ in 0..3 {
            h.runner.fail(PRUNE, "Error response from daemon: busy");
        }

        let err = compose.cleanup().await.unwrap_err();

        let message = err.to_string();
        assert!(message.contains("permission denied"), "{message}");
        assert!(message.contains("busy"), "{message}");
        assert_eq!(h.runner.count(PRUNE), 3);
    }

    #[tokio::test]
    async fn removes_temporary_file() {
        let h = Harness::new();
        let compose = Compose::start(h.options(two_services())).await.unwrap();
        let path: PathBuf = compose.file_path().to_path_buf();
        assert!(path.exists());
        let file_name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(file_name.starts_with("docker-compose-"));
        assert!(file_name.ends_with(".yaml"));

        compose.cleanup().await.unwrap();

        assert!(!path.exists());
    }

    #[tokio::test]
    async fn keep_around_only_stops() {
        let h = Harness::new();
        let compose = Compose::start(h.options(two_services()).keep_around(true))
            .await
            .unwrap();
        let path: PathBuf = compose.file_path().to_path_buf();
        h.runner.clear_calls();

        compose.cleanup().await.unwrap();

        assert_eq!(h.runner.verbs(), vec!["stop"]);
        assert!(path.exists());
        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn keep_around_and_prevent_stop_do_nothing() {
        let h = Harness::new();
        let compose = Compose::start(
            h.options(two_services())
                .keep_around(true)
                .prevent_stop(true),
        )
        .await
        .unwrap();
        let path: PathBuf = compose.file_path().to_path_buf();
        h.runner.clear_calls();

        compose.cleanup().await.unwrap();

        assert!(h.runner.calls().is_empty());
        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn prevent_stop_skips_stop() {
        let h = Harness::new();
        let compose = Compose::start(h.options(two_services()).prevent_stop(true))
            .await
            .unwrap();
        h.runner.clear_calls();

        compose.cleanup().await.unwrap();

        assert_eq!(
            h.runner.verbs(),
            vec!["kill", "down -v --remove-orphans", PRUNE]
        );
    }

    #[tokio::test]
    async fn stop_failure_does_not_skip_teardown() {
        let h = Harness::new();
        let compose = Compose::start(h.options(two_services())).await.unwrap();
        h.runner.clear_calls();
        h.runner.fail("stop", "ERROR: no such service");

        let err = compose.cleanup().await.unwrap_err();

        assert!(err.to_string().starts_with("error stopping containers: "));
        assert_eq!(h.runner.count(PRUNE), 1);
    }

    #[tokio::test]
    async fn volume_prune_is_retried() {
        let h = Harness::new();
        let compose = Compose::start(h.options(two_services())).await.unwrap();
        h.runner.fail(PRUNE, "Error response from daemon: a prune operation is already running");
        h.runner.fail(PRUNE, "Error response from daemon: a prune operation is already running");

        compose.cleanup().await.unwrap();

        assert_eq!(h.runner.count(PRUNE), 3);
    }

    #[tokio::test]
    async fn prune_is_retried_after_the_session_was_cancelled() {
        let h = Harness::new();
        let session = CancellationToken::new();
        let compose = Compose::start(h.options(two_services()).cancellation(session.clone()))
            .await
            .unwrap();
        session.cancel();
        h.runner.fail(PRUNE, "Error response from daemon: a prune operation is already running");

        compose
            .with_cancellation(CancellationToken::new())
            .cleanup()
            .await
            .unwrap();

        assert_eq!(h.runner.count(PRUNE), 2);
    }

    #[tokio::test]
    async fn cancelled_token_cuts_prune_retries_short() {
        let h = Harness::new();
        let session = CancellationToken::new();
        let compose = Compose::start(h.options(two_services()).cancellation(session.clone()))
            .await
            .unwrap();
        session.cancel();
        h.runner.fail(PRUNE, "Error response from daemon: a prune operation is already running");

        let err = compose.cleanup().await.unwrap_err();

        assert_eq!(err.kind(), ComposeErrorKind::Cleanup);
        assert_eq!(h.runner.count(PRUNE), 1);
    }

    #[tokio::test]
    async fn default_network_removal_is_retried() {
        let h = Harness::new();
        let compose = Compose::start(h.options(two_services())).await.unwrap();
        h.runner.fail("network rm proj_default", "Error: network has active endpoints");

        compose.remove_default_network().await.unwrap();

        assert_eq!(h.runner.count("network rm proj_default"), 2);
        compose.cleanup().await.unwrap();
    }
}
