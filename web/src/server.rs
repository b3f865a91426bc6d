use std::collections::HashMap;
use std::convert::Infallible;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use warp::filters::BoxedFilter;
use warp::reply::Reply;
use warp::Filter;

use crate::coordinator::TimerConfig;
use crate::events::RoomBus;
use crate::handlers;
use crate::rooms::RoomManager;
use crate::store::{MemoryStore, SnapshotStore};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    host: String,
    port: u16,
    timers: TimerConfig,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timers: TimerConfig::default(),
        }
    }

    pub fn with_timers(mut self, timers: TimerConfig) -> Self {
        self.timers = timers;
        self
    }

    pub fn for_tests() -> Self {
        // ephemeral port; deadlines short enough to finish a test run but
        // long enough that request round-trips never race the auto-fold
        Self::new("127.0.0.1", 0).with_timers(TimerConfig {
            turn_deadline: Duration::from_secs(10),
            disconnect_grace: Duration::from_secs(10),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn timers(&self) -> TimerConfig {
        self.timers
    }
}

/// Shared components of the running server.
#[derive(Clone)]
pub struct AppContext {
    config: ServerConfig,
    store: Arc<dyn SnapshotStore>,
    bus: RoomBus,
    rooms: Arc<RoomManager>,
}

impl AppContext {
    pub fn new(config: ServerConfig) -> Self {
        Self::with_store(config, Arc::new(MemoryStore::new()))
    }

    pub fn with_store(config: ServerConfig, store: Arc<dyn SnapshotStore>) -> Self {
        let bus = RoomBus::new();
        let rooms = Arc::new(RoomManager::new(
            Arc::clone(&store),
            bus.clone(),
            config.timers(),
        ));
        Self {
            config,
            store,
            bus,
            rooms,
        }
    }

    pub fn new_for_tests() -> Self {
        Self::new(ServerConfig::for_tests())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<dyn SnapshotStore> {
        Arc::clone(&self.store)
    }

    pub fn bus(&self) -> &RoomBus {
        &self.bus
    }

    pub fn rooms(&self) -> Arc<RoomManager> {
        Arc::clone(&self.rooms)
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

#[derive(Clone)]
pub struct WebServer {
    context: AppContext,
}

impl WebServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            context: AppContext::new(config),
        }
    }

    pub fn from_context(context: AppContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub async fn start(self) -> Result<ServerHandle, ServerError> {
        let WebServer { context } = self;
        let bind_addr = Self::bind_addr(context.config())?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let routes = Self::routes(&context);
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
        };

        let (addr, server_future) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(bind_addr, shutdown_signal)
            .map_err(Self::map_warp_error)?;

        tracing::info!(address = %addr, "poker server listening");

        let task = tokio::spawn(server_future);

        Ok(ServerHandle {
            addr,
            shutdown_tx: Some(shutdown_tx),
            task,
            context,
        })
    }

    fn bind_addr(config: &ServerConfig) -> Result<SocketAddr, ServerError> {
        let host = config.host();

        if let Ok(addr) = host.parse::<SocketAddr>() {
            return Ok(addr);
        }
        if let Ok(ip) = host.parse::<std::net::IpAddr>() {
            return Ok(SocketAddr::new(ip, config.port()));
        }

        let candidate = format!("{}:{}", host, config.port());
        let mut addrs = candidate.to_socket_addrs().map_err(|err| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`: {err}"))
        })?;
        addrs.next().ok_or_else(|| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`"))
        })
    }

    fn map_warp_error(err: warp::Error) -> ServerError {
        use std::error::Error as StdError;

        if let Some(source) = err.source() {
            if let Some(io_err) = source.downcast_ref::<std::io::Error>() {
                let recreated = std::io::Error::new(io_err.kind(), io_err.to_string());
                return ServerError::BindError(recreated);
            }
        }
        ServerError::ConfigError(err.to_string())
    }

    fn routes(context: &AppContext) -> BoxedFilter<(warp::reply::Response,)> {
        let health = Self::health_route();
        let api = Self::api_routes(context);
        let sse = Self::sse_routes(context);

        health.or(api).unify().or(sse).unify().boxed()
    }

    fn health_route() -> BoxedFilter<(warp::reply::Response,)> {
        warp::path("health")
            .and(warp::get())
            .and(warp::path::end())
            .map(|| handlers::health().into_response())
            .boxed()
    }

    fn api_routes(context: &AppContext) -> BoxedFilter<(warp::reply::Response,)> {
        let rooms = context.rooms();

        let create = warp::path!("api" / "rooms")
            .and(warp::post())
            .and(Self::with_rooms(rooms.clone()))
            .and(warp::body::json())
            .and_then(
                |rooms: Arc<RoomManager>, request: handlers::CreateRoomRequest| async move {
                    Ok::<_, Infallible>(handlers::create_room(rooms, request).await)
                },
            );

        let lobby = warp::path!("api" / "rooms")
            .and(warp::get())
            .and(Self::with_rooms(rooms.clone()))
            .and_then(|rooms: Arc<RoomManager>| async move {
                Ok::<_, Infallible>(handlers::list_rooms(rooms).await)
            });

        let info = warp::path!("api" / "rooms" / String)
            .and(warp::get())
            .and(Self::with_rooms(rooms.clone()))
            .and(warp::query::<HashMap<String, String>>())
            .and_then(
                |room_id: String, rooms: Arc<RoomManager>, query: HashMap<String, String>| async move {
                    let player = query.get("player").cloned();
                    Ok::<_, Infallible>(handlers::get_room(rooms, room_id, player).await)
                },
            );

        let join = warp::path!("api" / "rooms" / String / "join")
            .and(warp::post())
            .and(Self::with_rooms(rooms.clone()))
            .and(warp::body::json())
            .and_then(
                |room_id: String, rooms: Arc<RoomManager>, request: handlers::PlayerRequest| async move {
                    Ok::<_, Infallible>(handlers::join_room(rooms, room_id, request).await)
                },
            );

        let leave = warp::path!("api" / "rooms" / String / "leave")
            .and(warp::post())
            .and(Self::with_rooms(rooms.clone()))
            .and(warp::body::json())
            .and_then(
                |room_id: String, rooms: Arc<RoomManager>, request: handlers::PlayerRequest| async move {
                    Ok::<_, Infallible>(handlers::leave_room(rooms, room_id, request).await)
                },
            );

        let start = warp::path!("api" / "rooms" / String / "start")
            .and(warp::post())
            .and(Self::with_rooms(rooms.clone()))
            .and(warp::body::json())
            .and_then(
                |room_id: String, rooms: Arc<RoomManager>, request: handlers::PlayerRequest| async move {
                    Ok::<_, Infallible>(handlers::start_hand(rooms, room_id, request).await)
                },
            );

        let actions = warp::path!("api" / "rooms" / String / "actions")
            .and(warp::post())
            .and(Self::with_rooms(rooms.clone()))
            .and(warp::body::json())
            .and_then(
                |room_id: String, rooms: Arc<RoomManager>, request: handlers::ActRequest| async move {
                    Ok::<_, Infallible>(handlers::act(rooms, room_id, request).await)
                },
            );

        let end = warp::path!("api" / "rooms" / String / "end")
            .and(warp::post())
            .and(Self::with_rooms(rooms))
            .and(warp::body::json())
            .and_then(
                |room_id: String, rooms: Arc<RoomManager>, request: handlers::PlayerRequest| async move {
                    Ok::<_, Infallible>(handlers::end_room(rooms, room_id, request).await)
                },
            );

        create
            .or(lobby)
            .unify()
            .or(info)
            .unify()
            .or(join)
            .unify()
            .or(leave)
            .unify()
            .or(start)
            .unify()
            .or(actions)
            .unify()
            .or(end)
            .unify()
            .boxed()
    }

    fn sse_routes(context: &AppContext) -> BoxedFilter<(warp::reply::Response,)> {
        let rooms = context.rooms();

        let stream = warp::path!("api" / "rooms" / String / "events")
            .and(warp::get())
            .and(Self::with_rooms(rooms.clone()))
            .and(warp::query::<HashMap<String, String>>())
            .and_then(
                |room_id: String, rooms: Arc<RoomManager>, query: HashMap<String, String>| async move {
                    let player = query.get("player").cloned();
                    Ok::<_, Infallible>(handlers::stream_events(rooms, room_id, player).await)
                },
            );

        let close = warp::path!("api" / "rooms" / String / "events")
            .and(warp::delete())
            .and(Self::with_rooms(rooms))
            .and(warp::query::<HashMap<String, String>>())
            .and_then(
                |room_id: String, rooms: Arc<RoomManager>, query: HashMap<String, String>| async move {
                    let player = query.get("player").cloned();
                    Ok::<_, Infallible>(handlers::unsubscribe(rooms, room_id, player).await)
                },
            );

        stream.or(close).unify().boxed()
    }

    fn with_rooms(
        rooms: Arc<RoomManager>,
    ) -> impl Filter<Extract = (Arc<RoomManager>,), Error = Infallible> + Clone {
        warp::any().map(move || Arc::clone(&rooms))
    }
}

/// Running server plus its shutdown switch.
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
    context: AppContext,
}

impl ServerHandle {
    pub fn address(&self) -> SocketAddr {
        self.addr
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        self.task
            .await
            .map_err(|err| ServerError::ConfigError(format!("server task panicked: {err}")))
    }
}
