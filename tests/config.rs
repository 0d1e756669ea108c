// ABOUTME: Integration tests for configuration loading and layering.
// ABOUTME: Config files, profiles, overrides and validation.

use hubsync::config::*;
use hubsync::error::{Error, ErrorKind};
use hubsync::runtime::RuntimeType;
use std::path::PathBuf;
use std::time::Duration;

mod parsing {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.namespace, DEFAULT_NAMESPACE);
        assert_eq!(config.output_path, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(config.pull_timeout, Duration::from_secs(300));
        assert_eq!(config.push_timeout, Duration::from_secs(600));
    }

    #[test]
    fn parse_full_config() {
        let yaml = r#"
username: mirror-bot
password: s3cret
repository: registry.example.com
namespace: mirrors
content: '{"hubsync": ["nginx:1.25"]}'
max_content: 20
output_path: pulls.sh
concurrency: 5
timeout: 15m
retry_count: 2
retry_delay: 1s
pull_timeout: 2m
push_timeout: 4m
force: true
dry_run: false
log_level: debug
runtime: docker
socket: /var/run/docker.sock
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.username, "mirror-bot");
        assert_eq!(config.repository, "registry.example.com");
        assert_eq!(config.max_content, 20);
        assert_eq!(config.output_path, PathBuf::from("pulls.sh"));
        assert_eq!(config.timeout, Duration::from_secs(900));
        assert_eq!(config.retry_policy().retries, 2);
        assert_eq!(config.retry_policy().base_delay, Duration::from_secs(1));
        assert_eq!(config.engine_timeouts().push, Duration::from_secs(240));
        assert!(config.force);
        assert_eq!(config.runtime_config().runtime, Some(RuntimeType::Docker));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn bad_duration_is_a_config_error() {
        let err = Config::from_yaml("timeout: soon").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}

mod layering {
    use super::*;

    const FILE: &str = r#"
namespace: mirrors
concurrency: 4
profiles:
  nightly:
    concurrency: 8
    timeout: 1h
  private:
    repository: registry.example.com
    namespace: team
"#;

    #[test]
    fn profile_replaces_only_its_fields() {
        let config = Config::from_yaml(FILE).unwrap();

        let nightly = config.for_profile("nightly").unwrap();
        assert_eq!(nightly.namespace, "mirrors");
        assert_eq!(nightly.concurrency, 8);
        assert_eq!(nightly.timeout, Duration::from_secs(3600));

        let private = config.for_profile("private").unwrap();
        assert_eq!(private.repository, "registry.example.com");
        assert_eq!(private.namespace, "team");
        assert_eq!(private.concurrency, 4);
    }

    #[test]
    fn overrides_win_over_profile() {
        let mut config = Config::from_yaml(FILE)
            .unwrap()
            .for_profile("nightly")
            .unwrap();

        Overrides {
            concurrency: Some(2),
            dry_run: Some(true),
            ..Overrides::default()
        }
        .apply_to(&mut config);

        assert_eq!(config.concurrency, 2);
        assert!(config.dry_run);
        assert_eq!(config.timeout, Duration::from_secs(3600));
    }

    #[test]
    fn unknown_profile() {
        let err = Config::from_yaml(FILE)
            .unwrap()
            .for_profile("staging")
            .unwrap_err();
        assert!(matches!(err, Error::UnknownProfile(_)));
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn discovers_config_in_dot_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".hubsync")).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME_DIR), "namespace: hidden\n").unwrap();

        let config = Config::resolve(None, dir.path()).unwrap();
        assert_eq!(config.namespace, "hidden");
    }

    #[test]
    fn explicit_path_beats_discovery() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "namespace: discovered\n").unwrap();
        let explicit = dir.path().join("custom.yml");
        std::fs::write(&explicit, "namespace: explicit\n").unwrap();

        let config = Config::resolve(Some(&explicit), dir.path()).unwrap();
        assert_eq!(config.namespace, "explicit");
    }
}

mod validation {
    use super::*;

    fn complete() -> Config {
        Config {
            username: "user".to_string(),
            password: "pass".to_string(),
            content: r#"{"hubsync": []}"#.to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn missing_password() {
        let config = Config {
            password: String::new(),
            ..complete()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("password"));
    }

    #[test]
    fn zero_concurrency() {
        let config = Config {
            concurrency: 0,
            ..complete()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn every_documented_log_level_is_accepted() {
        for level in LOG_LEVELS {
            let config = Config {
                log_level: level.to_string(),
                ..complete()
            };
            assert!(config.validate().is_ok(), "{level} should be valid");
        }
    }

    #[test]
    fn profile_can_fill_credentials_from_file() {
        let config = Config::from_yaml(
            r#"
content: '{"hubsync": ["nginx"]}'
profiles:
  ci:
    username: bot
    password: token
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
        assert!(config.for_profile("ci").unwrap().validate().is_ok());
    }
}
