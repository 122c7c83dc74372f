//! Application state shared across all handlers.

use std::sync::Arc;

use sqlx::PgPool;

use turnero_auth::TokenDecoder;
use turnero_core::config::AppConfig;
use turnero_core::events::EventBus;
use turnero_database::repositories::assignment::AssignmentRepository;
use turnero_database::repositories::catalog::CatalogRepository;
use turnero_database::repositories::display::DisplayRepository;
use turnero_database::repositories::ticket::TicketRepository;
use turnero_realtime::connection::{ConnectionManager, ConnectionPool};
use turnero_realtime::policy::StoreRoomPolicy;
use turnero_realtime::registry::RoomRegistry;
use turnero_service::issuance::IssuanceService;
use turnero_service::queue::QueueService;
use turnero_service::store::{AssignmentStore, CatalogStore, DisplayStore, TicketStore};

/// Shared dependencies passed to every handler via `State<AppState>`.
///
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool.
    pub db_pool: PgPool,
    /// Domain event bus.
    pub bus: EventBus,
    /// Token decoder.
    pub decoder: Arc<TokenDecoder>,
    /// Ticket issuance.
    pub issuance: Arc<IssuanceService>,
    /// Queue orchestration.
    pub queue: Arc<QueueService>,
    /// Catalog reads for the public surface.
    pub catalog: Arc<dyn CatalogStore>,
    /// Display projection reads.
    pub display: Arc<dyn DisplayStore>,
    /// Socket connection manager.
    pub connections: Arc<ConnectionManager>,
    /// Room registry (shared with the broadcaster).
    pub rooms: Arc<RoomRegistry>,
    /// Connection pool (shared with the broadcaster).
    pub socket_pool: Arc<ConnectionPool>,
}

impl AppState {
    /// Wires repositories, services, and the realtime engine from a
    /// configuration and a connected pool.
    pub fn new(config: AppConfig, db_pool: PgPool) -> Self {
        let config = Arc::new(config);
        let bus = EventBus::new(config.realtime.bus_capacity);

        let tickets: Arc<dyn TicketStore> = Arc::new(TicketRepository::new(db_pool.clone()));
        let assignments: Arc<dyn AssignmentStore> =
            Arc::new(AssignmentRepository::new(db_pool.clone()));
        let catalog: Arc<dyn CatalogStore> = Arc::new(CatalogRepository::new(db_pool.clone()));
        let display: Arc<dyn DisplayStore> = Arc::new(DisplayRepository::new(db_pool.clone()));

        let queue = Arc::new(QueueService::new(
            tickets.clone(),
            assignments.clone(),
            display.clone(),
            bus.clone(),
            config.queue.clone(),
        ));
        let issuance = Arc::new(IssuanceService::new(
            tickets,
            catalog.clone(),
            display.clone(),
            bus.clone(),
        ));

        let rooms = Arc::new(RoomRegistry::new());
        let socket_pool = Arc::new(ConnectionPool::new());
        let policy = Arc::new(StoreRoomPolicy::new(assignments, catalog.clone()));
        let connections = Arc::new(ConnectionManager::new(
            socket_pool.clone(),
            rooms.clone(),
            policy,
            config.realtime.clone(),
        ));

        let decoder = Arc::new(TokenDecoder::new(&config.auth));

        Self {
            config,
            db_pool,
            bus,
            decoder,
            issuance,
            queue,
            catalog,
            display,
            connections,
            rooms,
            socket_pool,
        }
    }
}
