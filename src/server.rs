use crate::error::Error;
use crate::service::SlideSync;
use log::{error, info, warn};
use serde::Serialize;
use serde_json::Value;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::http::{HeaderValue, StatusCode};
use warp::hyper::body::Bytes;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

#[derive(Serialize)]
struct Detail {
    detail: String,
}

fn detail(status: StatusCode, detail: String) -> Response {
    warp::reply::with_status(warp::reply::json(&Detail { detail }), status).into_response()
}

fn with_sync(
    sync: Arc<SlideSync>,
) -> impl Filter<Extract = (Arc<SlideSync>,), Error = Infallible> + Clone {
    warp::any().map(move || sync.clone())
}

/// Gates simple requests on the frontend origin; preflights are answered by `preflight`.
fn cors(frontend_origin: &str) -> warp::cors::Builder {
    warp::cors()
        .allow_origin(frontend_origin)
        .allow_credentials(true)
}

/// Answers preflights from the frontend, permitting whatever method and
/// headers it asks for. Other origins fall through to `cors`, which refuses them.
fn preflight(
    frontend_origin: String,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::options()
        .and(warp::header::<String>("origin"))
        .and(warp::header::<String>("access-control-request-method"))
        .and(warp::header::optional::<String>("access-control-request-headers"))
        .and_then(move |origin: String, method: String, headers: Option<String>| {
            let allowed = origin == frontend_origin;
            async move {
                if !allowed {
                    return Err(warp::reject::not_found());
                }
                Ok(preflight_reply(&origin, &method, headers.as_deref()))
            }
        })
}

fn preflight_reply(origin: &str, method: &str, headers: Option<&str>) -> Response {
    let mut response = warp::reply().into_response();
    let allow = [
        ("access-control-allow-origin", Some(origin)),
        ("access-control-allow-credentials", Some("true")),
        ("access-control-allow-methods", Some(method)),
        ("access-control-allow-headers", headers),
        ("vary", Some("origin")),
    ];
    for (name, value) in allow {
        if let Some(value) = value.and_then(|v| HeaderValue::from_str(v).ok()) {
            response.headers_mut().insert(name, value);
        }
    }
    response
}

/// `POST /update-slides` and `POST /reset-slides`, restricted to one browser origin.
///
/// `frontend_origin` must already be a valid `scheme://host[:port]` origin.
pub fn routes(
    sync: Arc<SlideSync>,
    frontend_origin: String,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let update = warp::post()
        .and(warp::path("update-slides"))
        .and(warp::path::end())
        .and(warp::body::bytes())
        .and(with_sync(sync.clone()))
        .and_then(update_slides);

    let reset = warp::post()
        .and(warp::path("reset-slides"))
        .and(warp::path::end())
        .and(with_sync(sync))
        .and_then(reset_slides);

    preflight(frontend_origin.clone())
        .or(update.or(reset).with(cors(&frontend_origin)))
        .with(warp::log("slidesync::http"))
}

async fn update_slides(body: Bytes, sync: Arc<SlideSync>) -> Result<Response, Infallible> {
    let data: Value = match serde_json::from_slice(&body) {
        Ok(data) => data,
        Err(e) => {
            warn!("rejected update body: {e}");
            return Ok(detail(StatusCode::BAD_REQUEST, format!("Invalid JSON: {e}")));
        }
    };

    Ok(match sync.update(&data).await {
        Ok(outcome) => warp::reply::json(&outcome).into_response(),
        Err(e) => failure("Failed to update slides", e),
    })
}

async fn reset_slides(sync: Arc<SlideSync>) -> Result<Response, Infallible> {
    Ok(match sync.reset().await {
        Ok(outcome) => warp::reply::json(&outcome).into_response(),
        Err(e) => failure("Failed to reset template", e),
    })
}

fn failure(context: &str, e: Error) -> Response {
    error!("{context}: {e}");
    detail(StatusCode::INTERNAL_SERVER_ERROR, format!("{context}: {e}"))
}

/// Serves until Ctrl-C.
pub async fn run_server(
    sync: Arc<SlideSync>,
    bind: SocketAddr,
    frontend_origin: String,
) -> Result<(), Error> {
    let (addr, server) = warp::serve(routes(sync, frontend_origin))
        .try_bind_with_graceful_shutdown(bind, async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .map_err(|e| Error::Config(format!("failed to bind {bind}: {e}")))?;

    info!("Listening on {addr}");
    server.await;
    Ok(())
}
