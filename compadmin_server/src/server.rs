use std::fmt;
use std::io;
use std::sync::Arc;

use axum::extract::State;
use axum::http::header::{self, HeaderValue};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use bytes::Bytes;
use snowflake::ProcessUniqueId;
use tokio::net::TcpListener;
use tracing::{debug, error, info, info_span, warn};

use crate::component::Component;
use crate::config::AdminConfig;
use crate::dispatch::dispatch;
use crate::params::{Action, Params};
use crate::registry::Registry;
use crate::render::{DefaultRenderer, PageRenderer, Pages};
use crate::resources::Resources;

pub type RequestId = ProcessUniqueId;

/// Admin endpoint for a single component. Cheap to clone.
pub struct Server<C> {
    shared: Arc<ServerShared<C>>,
}

impl<C> Clone for Server<C> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

struct ServerShared<C> {
    component: Arc<C>,
    registry: Registry<C>,
    renderer: Box<dyn PageRenderer>,
    resources: Resources,
    mount_path: String,
    content_type: HeaderValue,
}

impl<C: Component> Server<C> {
    pub fn new(component: Arc<C>, registry: Registry<C>, config: &AdminConfig) -> Self {
        Self::with_renderer(component, registry, config, Box::new(DefaultRenderer))
    }

    pub fn with_renderer(
        component: Arc<C>, registry: Registry<C>, config: &AdminConfig, renderer: Box<dyn PageRenderer>,
    ) -> Self {
        let content_type = HeaderValue::try_from(format!("text/html; charset={}", config.char_encoding))
            .unwrap_or_else(|_| HeaderValue::from_static("text/html"));

        Server {
            shared: Arc::new(ServerShared {
                component,
                registry,
                renderer,
                resources: Resources::with_overrides(&config.resources),
                mount_path: config.mount_path.clone(),
                content_type,
            }),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .fallback(handle::<C>)
            .with_state(self.clone())
    }

    pub async fn serve(self, listener: TcpListener) -> io::Result<()> {
        if let Ok(addr) = listener.local_addr() {
            info!(
                "serving {} on http://{}{}",
                self.shared.component.name(),
                addr,
                self.shared.mount_path
            );
        }
        axum::serve(listener, self.router()).await
    }

    fn pages(&self) -> Pages<'_, C> {
        let shared = &*self.shared;
        Pages {
            renderer: shared.renderer.as_ref(),
            resources: &shared.resources,
            component: shared.component.as_ref(),
            registry: &shared.registry,
        }
    }

    fn respond(&self, method: &Method, uri: &Uri, body: &[u8]) -> Response {
        let path = uri.path();

        if !path.ends_with('/') {
            let mut location = format!("{}/", path);
            if let Some(q) = uri.query().filter(|q| !q.is_empty()) {
                location.push('?');
                location.push_str(q);
            }
            debug!("adding trailing separator, redirecting to {}", location);
            return found(location);
        }

        if path != self.shared.mount_path {
            return StatusCode::NOT_FOUND.into_response();
        }

        let body = (*method == Method::POST && !body.is_empty()).then_some(body);
        let params = match Params::parse(uri.query(), body) {
            Ok(params) => params,
            Err(e) => {
                warn!("malformed parameters: {}", e);
                return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
            },
        };

        let pages = self.pages();
        let page = match params.action() {
            Action::Default => pages.service(),
            Action::Property(name) => pages.property(name),
            Action::EventSet(name) => pages.event_set(name),
            Action::Confirm(name) => pages.confirm(name),
            Action::Reload => return found(path.to_owned()),
            Action::Invoke(inv) => {
                info!(method = inv.method, signature = ?inv.signature, "invoking");
                match dispatch(&self.shared.registry, &*self.shared.component, &inv) {
                    Ok(done) => {
                        info!(method = inv.method, returned = %done.returned, "invoked {}{}", inv.method, done.signature);
                        return found(path.to_owned());
                    },
                    Err(e) => {
                        warn!(method = inv.method, stage = %e.stage, "invocation failed: {}", e);
                        pages.invocation_error(inv.method, &e)
                    },
                }
            },
        };

        self.html(page)
    }

    fn html(&self, page: Result<String, fmt::Error>) -> Response {
        match page {
            Ok(body) => {
                let mut resp = body.into_response();
                let headers = resp.headers_mut();
                headers.insert(header::CONTENT_TYPE, self.shared.content_type.clone());
                headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
                headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
                resp
            },
            Err(e) => {
                error!("rendering failed: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            },
        }
    }
}

fn found(location: String) -> Response {
    match HeaderValue::try_from(location) {
        Ok(loc) => (StatusCode::FOUND, [(header::LOCATION, loc)]).into_response(),
        Err(e) => {
            error!("unusable redirect target: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        },
    }
}

async fn handle<C: Component>(State(server): State<Server<C>>, method: Method, uri: Uri, body: Bytes) -> Response {
    let id = RequestId::new();
    let span = info_span!("request", %id, %method, path = uri.path());
    span.in_scope(|| server.respond(&method, &uri, &body))
}
