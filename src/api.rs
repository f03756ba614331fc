use crate::{
    controller_client::NetworkConfigClient,
    reconciler::{NetworkConfigReconciler, SettingsView},
    screen::SettingsScreen,
    settings_store::SettingsStore,
    types::{OnionHosts, Rejected, SessionMode, TransportTimeouts},
};
use actix_web::{HttpResponse, Responder, web};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyTextPayload {
    host: Option<String>,
    port: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocksProxyPayload {
    enable: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModePayload<T> {
    mode: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenScreenResponse {
    pub id: Uuid,
    pub view: SettingsView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectionResponse {
    pub reason: Rejected,
    pub message: String,
}

type ScreenResult = Option<Result<SettingsView, Rejected>>;

/// Bounds on the open screens kept by the API
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ScreenLimits {
    /// Opening one more screen evicts the least recently used one
    pub max_screens: usize,
    /// Screens not accessed for this long are evicted when a screen is opened
    pub idle_timeout: Duration,
}

impl Default for ScreenLimits {
    fn default() -> Self {
        Self {
            max_screens: 16,
            idle_timeout: Duration::from_secs(30 * 60),
        }
    }
}

struct OpenScreen<Client, Store> {
    screen: SettingsScreen<Client, Store>,
    last_access: Instant,
}

type Screens<Client, Store> = HashMap<Uuid, OpenScreen<Client, Store>>;

pub struct Api<Client, Store> {
    client: Arc<Client>,
    store: Arc<Store>,
    developer_tools: bool,
    limits: ScreenLimits,
    screens: Mutex<Screens<Client, Store>>,
}

impl<Client, Store> Api<Client, Store>
where
    Client: NetworkConfigClient + Send + Sync + 'static,
    Store: SettingsStore + 'static,
{
    pub fn new(client: Client, store: Store, developer_tools: bool) -> Self {
        Self::with_limits(client, store, developer_tools, ScreenLimits::default())
    }

    pub fn with_limits(
        client: Client,
        store: Store,
        developer_tools: bool,
        limits: ScreenLimits,
    ) -> Self {
        Api {
            client: Arc::new(client),
            store: Arc::new(store),
            developer_tools,
            limits,
            screens: Mutex::new(HashMap::new()),
        }
    }

    /// Register all routes of the settings API
    pub fn routes(cfg: &mut web::ServiceConfig) {
        cfg.route("/healthcheck", web::get().to(Self::healthcheck))
            .route("/network-config", web::get().to(Self::network_config))
            .route("/screens", web::post().to(Self::open_screen))
            .route("/screens/{id}", web::get().to(Self::get_screen))
            .route("/screens/{id}", web::delete().to(Self::close_screen))
            .route("/screens/{id}/proxy", web::post().to(Self::set_proxy_text))
            .route("/screens/{id}/proxy/save", web::post().to(Self::save_proxy))
            .route(
                "/screens/{id}/proxy/revert",
                web::post().to(Self::revert_proxy),
            )
            .route("/screens/{id}/proxy/reset", web::post().to(Self::reset_proxy))
            .route(
                "/screens/{id}/socks-proxy",
                web::post().to(Self::toggle_socks_proxy),
            )
            .route(
                "/screens/{id}/onion-hosts",
                web::post().to(Self::select_onion_hosts),
            )
            .route(
                "/screens/{id}/session-mode",
                web::post().to(Self::select_session_mode),
            )
            .route("/screens/{id}/timeouts", web::post().to(Self::update_timeouts))
            .route("/screens/{id}/confirm", web::post().to(Self::confirm))
            .route("/screens/{id}/dismiss", web::post().to(Self::dismiss));
    }

    pub async fn healthcheck() -> impl Responder {
        HttpResponse::Ok().finish()
    }

    pub async fn network_config(api: web::Data<Self>) -> impl Responder {
        debug!("network_config() called");
        HttpResponse::Ok().json(api.store.current())
    }

    pub async fn open_screen(api: web::Data<Self>) -> impl Responder {
        debug!("open_screen() called");

        let screen = SettingsScreen::open(
            Arc::clone(&api.client),
            Arc::clone(&api.store),
            api.developer_tools,
        );
        let id = Uuid::new_v4();
        let view = screen.view();

        api.insert_screen(id, screen);

        HttpResponse::Created().json(OpenScreenResponse { id, view })
    }

    pub async fn get_screen(api: web::Data<Self>, id: web::Path<Uuid>) -> impl Responder {
        debug!("get_screen() called: {id}");

        let id = id.into_inner();
        let view = api.with_screen(&id, |screen| Ok(screen.view()));
        Self::respond(id, view)
    }

    pub async fn close_screen(api: web::Data<Self>, id: web::Path<Uuid>) -> impl Responder {
        debug!("close_screen() called: {id}");

        let id = id.into_inner();

        // dropping the screen detaches any apply still running for it
        match api.screens().remove(&id) {
            Some(_) => HttpResponse::NoContent().finish(),
            None => Self::not_found(&id),
        }
    }

    pub async fn set_proxy_text(
        api: web::Data<Self>,
        id: web::Path<Uuid>,
        body: web::Json<ProxyTextPayload>,
    ) -> impl Responder {
        debug!("set_proxy_text() called: {id}, {body:?}");

        let ProxyTextPayload { host, port } = body.into_inner();

        api.update(id.into_inner(), |r| {
            if let Some(host) = host {
                r.set_host_text(host)?;
            }
            if let Some(port) = port {
                r.set_port_text(port)?;
            }
            Ok(())
        })
    }

    pub async fn save_proxy(api: web::Data<Self>, id: web::Path<Uuid>) -> impl Responder {
        debug!("save_proxy() called: {id}");
        api.update(id.into_inner(), |r| r.save_proxy().map(|_| ()))
    }

    pub async fn revert_proxy(api: web::Data<Self>, id: web::Path<Uuid>) -> impl Responder {
        debug!("revert_proxy() called: {id}");
        api.update(id.into_inner(), |r| r.revert_proxy())
    }

    pub async fn reset_proxy(api: web::Data<Self>, id: web::Path<Uuid>) -> impl Responder {
        debug!("reset_proxy() called: {id}");
        api.update(id.into_inner(), |r| r.reset_proxy().map(|_| ()))
    }

    pub async fn toggle_socks_proxy(
        api: web::Data<Self>,
        id: web::Path<Uuid>,
        body: web::Json<SocksProxyPayload>,
    ) -> impl Responder {
        debug!("toggle_socks_proxy() called: {id}, {body:?}");
        api.update(id.into_inner(), |r| {
            r.toggle_socks_proxy(body.enable).map(|_| ())
        })
    }

    pub async fn select_onion_hosts(
        api: web::Data<Self>,
        id: web::Path<Uuid>,
        body: web::Json<ModePayload<OnionHosts>>,
    ) -> impl Responder {
        debug!("select_onion_hosts() called: {id}, {body:?}");
        api.update(id.into_inner(), |r| {
            r.select_onion_hosts(body.mode).map(|_| ())
        })
    }

    pub async fn select_session_mode(
        api: web::Data<Self>,
        id: web::Path<Uuid>,
        body: web::Json<ModePayload<SessionMode>>,
    ) -> impl Responder {
        debug!("select_session_mode() called: {id}, {body:?}");
        api.update(id.into_inner(), |r| {
            r.select_session_mode(body.mode).map(|_| ())
        })
    }

    pub async fn update_timeouts(
        api: web::Data<Self>,
        id: web::Path<Uuid>,
        body: web::Json<TransportTimeouts>,
    ) -> impl Responder {
        debug!("update_timeouts() called: {id}, {body:?}");
        api.update(id.into_inner(), |r| {
            r.update_timeouts(body.into_inner()).map(|_| ())
        })
    }

    /// Confirm the pending dialog. The apply keeps running after the response
    /// was sent, its outcome shows up in the screen's view.
    pub async fn confirm(api: web::Data<Self>, id: web::Path<Uuid>) -> impl Responder {
        debug!("confirm() called: {id}");

        let id = id.into_inner();
        let result: ScreenResult = api.with_screen(&id, |screen| {
            screen.confirm()?;
            Ok(screen.view())
        });

        match result {
            Some(Ok(view)) => HttpResponse::Accepted().json(view),
            other => Self::respond(id, other),
        }
    }

    pub async fn dismiss(api: web::Data<Self>, id: web::Path<Uuid>) -> impl Responder {
        debug!("dismiss() called: {id}");
        api.update(id.into_inner(), |r| r.dismiss())
    }

    fn update(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut NetworkConfigReconciler) -> Result<(), Rejected>,
    ) -> HttpResponse {
        let result: ScreenResult = self.with_screen(&id, |screen| {
            screen.update(f)?;
            Ok(screen.view())
        });

        Self::respond(id, result)
    }

    fn respond(id: Uuid, result: ScreenResult) -> HttpResponse {
        match result {
            Some(Ok(view)) => HttpResponse::Ok().json(view),
            Some(Err(reason)) => {
                debug!("screen {id} rejected request: {reason}");
                HttpResponse::Conflict().json(RejectionResponse {
                    reason,
                    message: reason.to_string(),
                })
            }
            None => Self::not_found(&id),
        }
    }

    fn not_found(id: &Uuid) -> HttpResponse {
        HttpResponse::NotFound().body(format!("unknown screen: {id}"))
    }

    fn with_screen<R>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&SettingsScreen<Client, Store>) -> R,
    ) -> Option<R> {
        let mut screens = self.screens();
        let open = screens.get_mut(id)?;

        open.last_access = Instant::now();
        Some(f(&open.screen))
    }

    fn insert_screen(&self, id: Uuid, screen: SettingsScreen<Client, Store>) {
        let mut screens = self.screens();
        let now = Instant::now();
        let idle_timeout = self.limits.idle_timeout;

        screens.retain(|id, open| {
            let idle = now.duration_since(open.last_access) >= idle_timeout;
            if idle {
                info!("closing idle screen {id}");
            }
            !idle
        });

        while screens.len() >= self.limits.max_screens.max(1) {
            let Some(oldest) = screens
                .iter()
                .min_by_key(|(_, open)| open.last_access)
                .map(|(id, _)| *id)
            else {
                break;
            };

            info!("too many open screens, closing {oldest}");
            screens.remove(&oldest);
        }

        screens.insert(
            id,
            OpenScreen {
                screen,
                last_access: now,
            },
        );
    }

    fn screens(&self) -> MutexGuard<'_, Screens<Client, Store>> {
        self.screens.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
