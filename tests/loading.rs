//! Loading and merging file sources.

use hier_config::source::MapEnv;
use hier_config::{ConfigError, ConfigurationService, ServiceSettings};

mod common;
use common::TestHome;

const PRIMARY: &str = "\
# primary configuration
dspace.dir = /srv/dspace
dspace.name =    DSpace at My University   
mail.admin = admin@example.org
feedback.recipient = ${mail.admin}
sample.array = itemOne,itemTwo,\\
    itemThree
include = extra.cfg
";

#[test]
fn test_primary_values_are_trimmed_and_interpolated() {
    let home = TestHome::new(PRIMARY);
    home.write("extra.cfg", "extra.flag = true\n");
    let config = home.service();

    assert!(config.is_configured());
    assert_eq!(config.home(), Some(home.path()));
    assert_eq!(
        config.get("dspace.name").unwrap().as_deref(),
        Some("DSpace at My University")
    );
    assert_eq!(
        config.get("feedback.recipient").unwrap().as_deref(),
        Some("admin@example.org")
    );
    assert_eq!(
        config.get_raw("feedback.recipient").unwrap().to_string(),
        "${mail.admin}"
    );
}

#[test]
fn test_continued_line_splits_into_array() {
    let home = TestHome::new(PRIMARY);
    home.write("extra.cfg", "");
    let config = home.service();

    assert_eq!(
        config.get_array("sample.array").unwrap(),
        vec!["itemOne", "itemTwo", "itemThree"]
    );
}

#[test]
fn test_included_file_is_loaded_and_not_stored_as_key() {
    let home = TestHome::new(PRIMARY);
    home.write("extra.cfg", "extra.flag = yes\ndspace.dir = /overridden\n");
    let config = home.service();

    assert!(config.get_boolean("extra.flag").unwrap());
    assert!(!config.has_property("include"));
    // Includes load before the including file's own keys.
    assert_eq!(config.get("dspace.dir").unwrap().as_deref(), Some("/srv/dspace"));
}

#[test]
fn test_include_cycle_is_a_parse_error() {
    let home = TestHome::new("a = 1\ninclude = loop.cfg\n");
    home.write("loop.cfg", "b = 2\ninclude = dspace.cfg\n");

    let err = ConfigurationService::builder()
        .home(home.path())
        .env(MapEnv::new())
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got {err:?}");
}

#[test]
fn test_modules_load_sorted_then_local_overrides() {
    let home = TestHome::new("shared.value = primary\n");
    home.write(
        "modules/authentication-orcid.cfg",
        "authentication-orcid.can-self-register = true\nshared.value = orcid\n",
    );
    home.write(
        "modules/oai.cfg",
        "oai.url = ${dspace.server.url}/oai\nshared.value = oai\n",
    );
    home.write(
        "local.cfg",
        "dspace.server.url = http://localhost:8080/server\n",
    );
    let config = home.service();

    assert_eq!(config.modules(), vec!["authentication-orcid", "oai"]);
    assert_eq!(config.get("shared.value").unwrap().as_deref(), Some("oai"));
    assert_eq!(
        config.get("oai.url").unwrap().as_deref(),
        Some("http://localhost:8080/server/oai")
    );

    let orcid = config.module(Some("authentication-orcid"));
    assert!(orcid.get_boolean("can-self-register").unwrap());
    assert!(orcid.has_property("can-self-register"));
    assert_eq!(
        orcid.property_keys(),
        vec!["authentication-orcid.can-self-register"]
    );
}

#[test]
fn test_environment_overlay_wins_over_files() {
    let home = TestHome::new("mail.admin = files@example.org\n");
    let mut settings = ServiceSettings::default();
    settings.environment.allow = vec!["mail.*".into()];
    let env = MapEnv::new()
        .with("mail.admin", "env@example.org")
        .with("PATH", "/usr/bin");

    let config = home.service_with(settings, env);
    assert_eq!(
        config.get("mail.admin").unwrap().as_deref(),
        Some("env@example.org")
    );
    assert!(!config.has_property("PATH"));
}

#[test]
fn test_home_from_environment_variable() {
    let home = TestHome::new("a = 1\n");
    let env = MapEnv::new().with("DSPACE_HOME", home.path().display().to_string());

    let config = ConfigurationService::builder().env(env).build().unwrap();
    assert_eq!(config.home(), Some(home.path()));
    assert_eq!(config.get_int("a").unwrap(), 1);
}

#[test]
fn test_missing_home_is_reported_with_candidates() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = ServiceSettings::default();
    settings.default_home = dir.path().join("nowhere").display().to_string();

    let err = ConfigurationService::builder()
        .home(dir.path())
        .settings(settings)
        .env(MapEnv::new())
        .build()
        .unwrap_err();
    match err {
        ConfigError::HomeNotFound { tried } => assert_eq!(tried.len(), 2),
        other => panic!("expected HomeNotFound, got {other:?}"),
    }
}

#[test]
fn test_tree_queries_over_loaded_files() {
    let home = TestHome::new(
        "hier.key1.a = 1\nhier.key1.b = 2\nhier.key2 = x\nother = y\n",
    );
    let config = home.service();

    assert_eq!(config.children("hier"), vec!["key1", "key2"]);
    assert_eq!(
        config.subset("hier.key1").unwrap(),
        vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
        ]
    );
}
