// tests/dev_server.rs

mod common;
use crate::common::{init_tracing, with_timeout, SiteFixture};

use std::error::Error;
use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use sitepipe::server::client::client_script;
use sitepipe::server::live::fingerprint;
use sitepipe::server::{
    inject_client, DevServer, LiveMessage, LiveReload, RunningServer, ServerOptions, LIVE_PATH,
};
use sitepipe::stages::StyleCompiler;
use sitepipe::tasks::style::StyleTask;
use sitepipe::tasks::{TaskContext, TaskRegistry};

type TestResult = Result<(), Box<dyn Error>>;

fn options(fx: &SiteFixture) -> ServerOptions {
    ServerOptions {
        root: fx.path("build"),
        host: "127.0.0.1".to_string(),
        port: 0,
        open: false,
        cors: true,
        notify: false,
    }
}

fn output_fixture() -> SiteFixture {
    let fx = SiteFixture::new();
    fx.write(
        "build/index.html",
        "<html><head><link rel=\"stylesheet\" href=\"css/style.css\"></head><body><h1>Home</h1></body></html>",
    )
    .write("build/about/index.html", "<html><BODY>About</BODY></html>")
    .write("build/css/style.css", ".nav{color:red}")
    .write("secret.txt", "outside the served directory");
    fx
}

async fn start(fx: &SiteFixture) -> Result<RunningServer, Box<dyn Error>> {
    Ok(DevServer::new(options(fx)).start().await?)
}

/// Minimal HTTP/1.1 GET; the server closes the connection after answering.
async fn get(addr: SocketAddr, path: &str, extra_headers: &str) -> Result<String, Box<dyn Error>> {
    let mut stream = TcpStream::connect(addr).await?;
    let request =
        format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\n{extra_headers}Connection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await?;
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await?;
    Ok(String::from_utf8_lossy(&response).into_owned())
}

/// Read from `stream` until the accumulated text contains `needle`.
async fn read_until(stream: &mut TcpStream, needle: &str) -> Result<String, Box<dyn Error>> {
    let mut seen = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(format!("connection closed before {needle:?} arrived").into());
        }
        seen.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&seen).into_owned();
        if text.contains(needle) {
            return Ok(text);
        }
    }
}

async fn open_live_stream(addr: SocketAddr) -> Result<TcpStream, Box<dyn Error>> {
    let mut stream = TcpStream::connect(addr).await?;
    let request = format!("GET {LIVE_PATH} HTTP/1.1\r\nHost: {addr}\r\nAccept: text/event-stream\r\n\r\n");
    stream.write_all(request.as_bytes()).await?;
    read_until(&mut stream, "text/event-stream").await?;
    Ok(stream)
}

#[tokio::test]
async fn pages_get_the_live_client() -> TestResult {
    init_tracing();
    let fx = output_fixture();
    let server = start(&fx).await?;

    let response = with_timeout(get(server.local_addr(), "/", "")).await?;
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains("<h1>Home</h1>"));
    let script = response.find("<script data-sitepipe>").ok_or("no client script")?;
    let body_end = response.rfind("</body>").ok_or("no </body>")?;
    assert!(script < body_end);
    assert!(response.contains(LIVE_PATH));

    // Upper-case tags and directory indexes work too.
    let response = with_timeout(get(server.local_addr(), "/about/", "")).await?;
    assert!(response.contains("<script data-sitepipe>"));
    Ok(())
}

#[tokio::test]
async fn other_files_are_served_untouched() -> TestResult {
    init_tracing();
    let fx = output_fixture();
    let server = start(&fx).await?;

    let response = with_timeout(get(server.local_addr(), "/css/style.css", "")).await?;
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.to_ascii_lowercase().contains("content-type: text/css"));
    assert!(response.ends_with(".nav{color:red}"));
    assert!(!response.contains("data-sitepipe"));

    let response = with_timeout(get(server.local_addr(), "/missing.png", "")).await?;
    assert!(response.starts_with("HTTP/1.1 404"), "{response}");
    Ok(())
}

#[tokio::test]
async fn parent_segments_are_refused() -> TestResult {
    init_tracing();
    let fx = output_fixture();
    let server = start(&fx).await?;

    let response = with_timeout(get(server.local_addr(), "/../secret.txt", "")).await?;
    assert!(response.starts_with("HTTP/1.1 400"), "{response}");
    assert!(!response.contains("outside the served directory"));
    Ok(())
}

#[tokio::test]
async fn cors_headers_follow_the_option() -> TestResult {
    init_tracing();
    let fx = output_fixture();
    let origin = "Origin: http://elsewhere.test\r\n";

    let server = start(&fx).await?;
    let response = with_timeout(get(server.local_addr(), "/css/style.css", origin)).await?;
    assert!(response
        .to_ascii_lowercase()
        .contains("access-control-allow-origin: http://elsewhere.test"));

    let server = DevServer::new(ServerOptions {
        cors: false,
        ..options(&fx)
    })
    .start()
    .await?;
    let response = with_timeout(get(server.local_addr(), "/css/style.css", origin)).await?;
    assert!(!response
        .to_ascii_lowercase()
        .contains("access-control-allow-origin"));
    Ok(())
}

#[tokio::test]
async fn live_clients_receive_reload_and_css_events() -> TestResult {
    init_tracing();
    let fx = output_fixture();
    let server = start(&fx).await?;
    let live = server.live();

    let mut stream = with_timeout(open_live_stream(server.local_addr())).await?;
    assert_eq!(live.client_count(), 1);

    assert_eq!(live.reload(), 1);
    let text = with_timeout(read_until(&mut stream, "reload")).await?;
    assert!(text.contains("event:"));

    let css = ".nav{color:blue}";
    assert!(live.inject_css("css/style.css", css));
    let expected = format!("css/style.css?v={}", fingerprint(css));
    with_timeout(read_until(&mut stream, &expected)).await?;
    Ok(())
}

#[test]
fn identical_css_is_not_pushed_twice() {
    let live = LiveReload::new();
    let mut rx = live.subscribe();

    assert!(live.inject_css("css/style.css", "a{}"));
    assert!(!live.inject_css("css/style.css", "a{}"));
    assert!(live.inject_css("css/style.css", "b{}"));
    // Another stylesheet has its own history.
    assert!(live.inject_css("css/print.css", "a{}"));

    let first = rx.try_recv().unwrap();
    assert_eq!(
        first,
        LiveMessage::Css {
            path: "css/style.css".into(),
            version: fingerprint("a{}"),
        }
    );
    assert_eq!(first.event_name(), "css");
    assert_eq!(first.data(), format!("css/style.css?v={}", fingerprint("a{}")));
    assert!(matches!(rx.try_recv().unwrap(), LiveMessage::Css { .. }));
    assert!(matches!(rx.try_recv().unwrap(), LiveMessage::Css { .. }));
    assert!(rx.try_recv().is_err());
}

#[test]
fn fingerprints_are_short_and_stable() {
    let a = fingerprint(".a{}");
    assert_eq!(a.len(), 16);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(a, fingerprint(".a{}"));
    assert_ne!(a, fingerprint(".b{}"));
}

#[test]
fn client_is_inserted_before_the_closing_body() {
    let html = inject_client("<html><body><p>x</p></BODY></html>", false);
    let script = html.find("<script data-sitepipe>").unwrap();
    assert!(script < html.find("</BODY>").unwrap());
    assert!(html.contains("var notify = false"));

    let fragment = inject_client("<p>no body tag</p>", true);
    assert!(fragment.starts_with("<p>no body tag</p><script data-sitepipe>"));
    assert!(fragment.contains("var notify = true"));

    assert!(client_script(false).ends_with("</script>"));
}

#[tokio::test]
async fn style_task_pushes_fresh_css_to_live_clients() -> TestResult {
    init_tracing();
    let fx = SiteFixture::new();
    fx.write("src/sass/style.scss", ".nav { a { color: #123456; } }");

    let mut registry = TaskRegistry::new();
    registry.register(
        "style",
        StyleTask::new(
            "src/sass/style.scss",
            "build/css",
            "css",
            StyleCompiler::new(&["defaults"])?,
        ),
        &[],
    )?;

    let live = LiveReload::new();
    let mut rx = live.subscribe();
    let ctx = TaskContext::real(fx.root()).with_live(live);

    let report = with_timeout(registry.run("style", &ctx)).await?;
    assert_eq!(report.processed, 2);
    let expanded = fx.read_string("build/css/style.css");
    match rx.try_recv()? {
        LiveMessage::Css { path, version } => {
            assert_eq!(path, "css/style.css");
            assert_eq!(version, fingerprint(&expanded));
        }
        other => panic!("expected a css message, got {other:?}"),
    }

    // Unchanged output is not pushed again.
    with_timeout(registry.run("style", &ctx)).await?;
    assert!(rx.try_recv().is_err());
    Ok(())
}
