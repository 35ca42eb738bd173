// src/server/routes.rs

use std::convert::Infallible;
use std::path::{Path, PathBuf};

use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::debug;
use warp::filters::BoxedFilter;
use warp::http::StatusCode;
use warp::path::FullPath;
use warp::sse::Event;
use warp::{Filter, Rejection, Reply};

use crate::server::client::inject_client;
use crate::server::live::LiveReload;
use crate::server::ServerState;

/// Every route of the dev server, in match order: live events, the
/// traversal guard, HTML pages with the client injected, then plain files.
pub(crate) fn routes(state: ServerState) -> BoxedFilter<(Box<dyn Reply>,)> {
    let app = live_events(state.live.clone())
        .or(traversal_guard())
        .or(html_pages(state.clone()))
        .or(warp::fs::dir(state.root.clone()));

    if state.cors {
        let cors = warp::cors()
            .allow_any_origin()
            .allow_methods(vec!["GET", "HEAD", "OPTIONS"]);
        app.with(cors).map(boxed).boxed()
    } else {
        app.map(boxed).boxed()
    }
}

fn boxed(reply: impl Reply + 'static) -> Box<dyn Reply> {
    Box::new(reply)
}

fn live_events(live: LiveReload) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("__sitepipe" / "live")
        .and(warp::get())
        .map(move || {
            debug!("live client connected");
            let stream = BroadcastStream::new(live.subscribe()).map(|msg| {
                let event = match msg {
                    Ok(msg) => Event::default().event(msg.event_name()).data(msg.data()),
                    // Missed messages; a full reload catches the page up.
                    Err(_lagged) => Event::default().event("reload").data(""),
                };
                Ok::<_, Infallible>(event)
            });
            warp::sse::reply(warp::sse::keep_alive().stream(stream))
        })
}

fn traversal_guard() -> impl Filter<Extract = (StatusCode,), Error = Rejection> + Clone {
    warp::path::full().and_then(|path: FullPath| async move {
        if path.as_str().split('/').any(|segment| segment == "..") {
            Ok(StatusCode::BAD_REQUEST)
        } else {
            Err(warp::reject::not_found())
        }
    })
}

fn html_pages(state: ServerState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::get()
        .and(warp::path::full())
        .and_then(move |path: FullPath| {
            let state = state.clone();
            async move {
                let Some(file) = html_page(&state.root, path.as_str()) else {
                    return Err(warp::reject::not_found());
                };
                match tokio::fs::read_to_string(&file).await {
                    Ok(html) => Ok(warp::reply::html(inject_client(&html, state.notify))),
                    Err(err) => {
                        debug!(path = %file.display(), error = %err, "could not read page");
                        Err(warp::reject::not_found())
                    }
                }
            }
        })
}

/// File behind a request for an HTML page (`*.html` or a directory index).
fn html_page(root: &Path, request_path: &str) -> Option<PathBuf> {
    let rel = request_path.trim_start_matches('/');
    let candidate = if rel.is_empty() || rel.ends_with('/') {
        root.join(rel).join("index.html")
    } else if rel.ends_with(".html") || rel.ends_with(".htm") {
        root.join(rel)
    } else {
        return None;
    };
    candidate.is_file().then_some(candidate)
}
