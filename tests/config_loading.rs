// tests/config_loading.rs

mod common;
use crate::common::{SiteConfigBuilder, SiteFixture};

use std::error::Error;
use std::path::PathBuf;

use sitepipe::config::{load_and_validate, load_or_default, SiteConfig};
use sitepipe::errors::PipelineError;
use sitepipe::types::TriggerWhileRunningBehaviour;

type TestResult = Result<(), Box<dyn Error>>;

fn load(toml: &str) -> Result<SiteConfig, PipelineError> {
    let fx = SiteFixture::new();
    fx.write("Sitepipe.toml", toml);
    load_and_validate(fx.path("Sitepipe.toml"))
}

fn config_error(toml: &str) -> String {
    match load(toml) {
        Err(PipelineError::ConfigError(msg)) => msg,
        other => panic!("expected a config error, got {other:?}"),
    }
}

#[test]
fn missing_file_gives_the_standard_layout() -> TestResult {
    let fx = SiteFixture::new();
    let cfg = load_or_default(fx.path("Sitepipe.toml"))?;

    assert_eq!(cfg.paths.src, PathBuf::from("src"));
    assert_eq!(cfg.paths.build, PathBuf::from("build"));
    assert_eq!(cfg.server.port, 9999);
    assert!(cfg.server.open);
    assert!(cfg.server.cors);
    assert!(!cfg.server.notify);
    assert_eq!(
        cfg.config.triggered_while_running_behaviour,
        TriggerWhileRunningBehaviour::Queue
    );
    assert_eq!(cfg.config.queue_length, 1);
    assert_eq!(cfg.sprite.file_name, "sprite.svg");
    assert_eq!(cfg.sprite.remove_attrs, "(stroke|fill)");
    assert!(cfg.sprite.inline);
    assert_eq!(cfg.style.entry, PathBuf::from("sass/style.scss"));
    assert_eq!(cfg.style.browsers, vec!["defaults"]);
    Ok(())
}

#[test]
fn sections_override_defaults() -> TestResult {
    let cfg = load(
        r#"
[paths]
src = "site"
build = "public"

[server]
port = 3000
open = false
notify = true

[config]
triggered_while_running_behaviour = "drop"
queue_length = 3

[images]
png_level = 6
strip_jpeg_metadata = false

[sprite]
remove_attrs = "^fill$"
inline = false

[style]
entry = "scss/main.scss"
browsers = ["last 2 versions", "not dead"]
"#,
    )?;

    assert_eq!(cfg.paths.src, PathBuf::from("site"));
    assert_eq!(cfg.paths.build, PathBuf::from("public"));
    assert_eq!(cfg.src_glob_root(), "site");
    assert_eq!(cfg.server.port, 3000);
    assert!(!cfg.server.open);
    assert!(cfg.server.notify);
    assert_eq!(cfg.server.host, "127.0.0.1");
    assert_eq!(
        cfg.config.triggered_while_running_behaviour,
        TriggerWhileRunningBehaviour::Drop
    );
    assert_eq!(cfg.config.queue_length, 3);
    assert_eq!(cfg.images.png_level, 6);
    assert!(!cfg.images.strip_jpeg_metadata);
    assert!(!cfg.sprite.inline);
    assert_eq!(cfg.style.entry, PathBuf::from("scss/main.scss"));
    assert_eq!(cfg.style.browsers.len(), 2);
    Ok(())
}

#[test]
fn unknown_keys_and_values_are_rejected() {
    assert!(matches!(
        load("[server]\nprot = 3000\n"),
        Err(PipelineError::TomlError(_))
    ));
    assert!(matches!(
        load("[watch]\npattern = \"*\"\n"),
        Err(PipelineError::TomlError(_))
    ));
    assert!(matches!(
        load("[config]\ntriggered_while_running_behaviour = \"restart\"\n"),
        Err(PipelineError::TomlError(_))
    ));
}

#[test]
fn semantic_checks() {
    assert!(config_error("[config]\nqueue_length = 0\n").contains("queue_length"));
    assert!(config_error("[paths]\nsrc = \"src\"\nbuild = \"src/out\"\n").contains("inside"));
    assert!(config_error("[paths]\nsrc = \"./site\"\nbuild = \"site\"\n").contains("differ"));
    assert!(config_error("[images]\npng_level = 7\n").contains("png_level"));
    assert!(config_error("[sprite]\nremove_attrs = \"(stroke\"\n").contains("regex"));
    assert!(config_error("[style]\nbrowsers = []\n").contains("browsers"));
}

#[test]
fn builder_matches_the_file_format() {
    let cfg = SiteConfigBuilder::new()
        .behaviour(TriggerWhileRunningBehaviour::Drop)
        .queue_length(2)
        .test_server()
        .build();
    assert_eq!(cfg.server.port, 0);
    assert!(!cfg.server.open);
    assert_eq!(cfg.config.queue_length, 2);

    let raw = SiteConfigBuilder::new().queue_length(0).raw();
    assert!(SiteConfig::try_from(raw).is_err());
}

#[test]
fn behaviour_parses_from_cli_style_strings() {
    assert_eq!(
        " Drop ".parse::<TriggerWhileRunningBehaviour>(),
        Ok(TriggerWhileRunningBehaviour::Drop)
    );
    assert!("restart".parse::<TriggerWhileRunningBehaviour>().is_err());
}
