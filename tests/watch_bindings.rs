// tests/watch_bindings.rs

mod common;
use crate::common::{init_tracing, with_timeout, write_site, SiteConfigBuilder, SiteFixture};

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use sitepipe::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason};
use sitepipe::errors::PipelineError;
use sitepipe::exec::RegistryExecutor;
use sitepipe::server::{LiveMessage, LiveReload};
use sitepipe::tasks::{site_registry, TaskContext, TaskRegistry};
use sitepipe::types::{RunMode, TriggerWhileRunningBehaviour};
use sitepipe::watch::event_handler::is_relevant;
use sitepipe::watch::path_utils::relative_str;
use sitepipe::watch::{process_file_change, site_bindings, spawn_watcher, WatchBindings};

type TestResult = Result<(), Box<dyn Error>>;

fn site() -> Result<(TaskRegistry, WatchBindings), PipelineError> {
    let cfg = SiteConfigBuilder::new().build();
    let mut registry = site_registry(&cfg)?;
    let bindings = site_bindings(&cfg, &mut registry)?;
    registry.validate()?;
    Ok((registry, bindings))
}

#[test]
fn standard_bindings_route_changes_to_pipelines() -> TestResult {
    let (registry, bindings) = site()?;
    assert_eq!(bindings.len(), 4);

    assert_eq!(bindings.pipelines_for("src/img/photo.png"), vec!["images+refresh"]);
    assert_eq!(
        bindings.pipelines_for("src/img/sprite/home.svg"),
        vec!["images+refresh", "sprite+refresh"]
    );
    assert_eq!(bindings.pipelines_for("src/sass/parts/_nav.scss"), vec!["style"]);
    assert_eq!(bindings.pipelines_for("src/about/index.html"), vec!["html+refresh"]);
    assert!(bindings.pipelines_for("src/js/app.js").is_empty());
    assert!(bindings.pipelines_for("build/index.html").is_empty());

    // Composed pipelines are ordinary registry entries.
    assert_eq!(
        registry.series_of("html+refresh"),
        Some(&["html".to_string(), "refresh".to_string()][..])
    );
    Ok(())
}

#[test]
fn binding_checks_task_names() -> TestResult {
    let (mut registry, mut bindings) = site()?;

    let err = bindings
        .bind(&mut registry, "src/**/*.txt", &["copy", "nope"])
        .unwrap_err();
    assert!(matches!(err, PipelineError::UnknownTask(ref n) if n == "nope"));

    let err = bindings.bind(&mut registry, "src/**/*.txt", &[]).unwrap_err();
    assert!(matches!(err, PipelineError::ConfigError(_)));

    // Reusing an existing composition is fine.
    let pipeline = bindings.bind(&mut registry, "src/extra/**/*.png", &["images", "refresh"])?;
    assert_eq!(pipeline, "images+refresh");
    assert_eq!(bindings.len(), 5);

    let pipeline = bindings.bind(&mut registry, "src/js/*.js", &["copy"])?;
    assert_eq!(pipeline, "copy");
    assert_eq!(bindings.pipelines_for("src/js/app.js"), vec!["copy"]);
    Ok(())
}

#[test]
fn event_paths_are_made_relative_to_the_root() {
    let fx = SiteFixture::new();
    fx.write("src/img/a.png", "x");

    assert_eq!(
        relative_str(fx.root(), &fx.path("src/img/a.png")).as_deref(),
        Some("src/img/a.png")
    );
    // Removed files still resolve through their parent.
    assert_eq!(
        relative_str(fx.root(), &fx.path("src/img/gone.png")).as_deref(),
        Some("src/img/gone.png")
    );
    assert_eq!(relative_str(fx.root(), std::path::Path::new("/elsewhere/a.png")), None);
}

#[test]
fn access_events_are_ignored() {
    use notify::event::{AccessKind, CreateKind, EventKind, ModifyKind};
    assert!(!is_relevant(&EventKind::Access(AccessKind::Any)));
    assert!(is_relevant(&EventKind::Create(CreateKind::File)));
    assert!(is_relevant(&EventKind::Modify(ModifyKind::Any)));
}

#[tokio::test]
async fn a_changed_file_triggers_each_matching_pipeline() -> TestResult {
    init_tracing();
    let fx = SiteFixture::new();
    let (_registry, bindings) = site()?;
    let (tx, mut rx) = mpsc::channel(8);

    assert!(process_file_change(fx.root(), &fx.path("src/img/sprite/new.svg"), &bindings, &tx).await);

    let mut triggered = Vec::new();
    while let Ok(event) = rx.try_recv() {
        match event {
            RuntimeEvent::PipelineTriggered { pipeline, reason } => {
                assert_eq!(reason, TriggerReason::FileWatch);
                triggered.push(pipeline);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_eq!(triggered, vec!["images+refresh", "sprite+refresh"]);

    drop(rx);
    assert!(!process_file_change(fx.root(), &fx.path("src/index.html"), &bindings, &tx).await);
    Ok(())
}

#[tokio::test]
async fn watcher_reports_new_files() -> TestResult {
    init_tracing();
    let fx = SiteFixture::new();
    fx.write("src/sass/style.scss", "a { color: red; }");
    let (_registry, bindings) = site()?;
    let (tx, mut rx) = mpsc::channel(64);

    let _handle = spawn_watcher(fx.root(), Arc::new(bindings), tx)?;
    // Give the backend a moment to register the watch.
    tokio::time::sleep(Duration::from_millis(200)).await;
    fx.write("src/sass/_nav.scss", ".nav { display: flex; }");

    let event = with_timeout(rx.recv()).await.ok_or("watcher channel closed")?;
    match event {
        RuntimeEvent::PipelineTriggered { pipeline, .. } => assert_eq!(pipeline, "style"),
        other => panic!("unexpected event {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn new_image_runs_images_then_reload() -> TestResult {
    init_tracing();
    let fx = SiteFixture::new();
    write_site(&fx);
    let (registry, bindings) = site()?;
    let registry = Arc::new(registry);

    let ctx = TaskContext::real(fx.root());
    with_timeout(registry.run("build", &ctx)).await?;
    let hero_before = std::fs::metadata(fx.path("build/img/hero.png"))?.modified()?;

    fx.write("src/img/photo.png", common::solid_png(8, 8));

    let live = LiveReload::new();
    let mut browser = live.subscribe();
    let (tx, rx) = mpsc::channel(16);
    let executor = RegistryExecutor::new(Arc::clone(&registry), ctx.with_live(live), tx.clone());
    let core = CoreRuntime::new(
        TriggerWhileRunningBehaviour::Queue,
        1,
        RuntimeOptions {
            exit_when_idle: true,
            mode: RunMode::Serve,
        },
    );

    assert!(process_file_change(fx.root(), &fx.path("src/img/photo.png"), &bindings, &tx).await);
    with_timeout(Runtime::new(core, rx, executor).run()).await?;

    assert!(fx.exists("build/img/photo.png"));
    let hero_after = std::fs::metadata(fx.path("build/img/hero.png"))?.modified()?;
    assert_eq!(hero_before, hero_after);
    assert_eq!(browser.try_recv()?, LiveMessage::Reload);
    Ok(())
}

#[tokio::test]
async fn broken_stylesheet_in_serve_mode_is_survived() -> TestResult {
    init_tracing();
    let fx = SiteFixture::new();
    write_site(&fx);
    fx.write("src/sass/style.scss", ".nav { color: $nope; }");
    let (registry, bindings) = site()?;

    let (tx, rx) = mpsc::channel(16);
    let ctx = TaskContext::real(fx.root()).with_live(LiveReload::new());
    let executor = RegistryExecutor::new(Arc::new(registry), ctx, tx.clone());
    let core = CoreRuntime::new(
        TriggerWhileRunningBehaviour::Queue,
        1,
        RuntimeOptions {
            exit_when_idle: true,
            mode: RunMode::Serve,
        },
    );

    process_file_change(fx.root(), &fx.path("src/sass/style.scss"), &bindings, &tx).await;
    // The guarded failure is logged and the runtime winds down normally.
    with_timeout(Runtime::new(core, rx, executor).run()).await?;
    assert!(!fx.exists("build/css/style.css"));
    Ok(())
}

#[tokio::test]
async fn corrupt_image_in_serve_mode_ends_the_session() -> TestResult {
    init_tracing();
    let fx = SiteFixture::new();
    write_site(&fx);
    fx.write("src/img/bad.png", "not a png at all");
    let (registry, bindings) = site()?;

    let (tx, rx) = mpsc::channel(16);
    let ctx = TaskContext::real(fx.root()).with_live(LiveReload::new());
    let executor = RegistryExecutor::new(Arc::new(registry), ctx, tx.clone());
    let core = CoreRuntime::new(
        TriggerWhileRunningBehaviour::Queue,
        1,
        RuntimeOptions {
            exit_when_idle: true,
            mode: RunMode::Serve,
        },
    );

    process_file_change(fx.root(), &fx.path("src/img/bad.png"), &bindings, &tx).await;
    // `images` is not guarded, so the serve session stops.
    let err = with_timeout(Runtime::new(core, rx, executor).run())
        .await
        .unwrap_err();
    match err {
        PipelineError::Aborted(message) => assert!(message.contains("images+refresh"), "{message}"),
        other => panic!("expected Aborted, got {other:?}"),
    }
    Ok(())
}
