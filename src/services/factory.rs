use std::sync::Arc;

use crate::{
    db::DbPool,
    events::EventSender,
    services::{
        ledger::LedgerService, requests::RequestService, statistics::StatisticsService,
        supplies::SupplyService,
    },
};

/// Factory for creating service instances with shared dependencies
pub struct ServiceFactory {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl ServiceFactory {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    pub fn ledger_service(&self) -> LedgerService {
        LedgerService::new(self.db_pool.clone(), self.event_sender.clone())
    }

    pub fn request_service(&self) -> RequestService {
        RequestService::new(self.db_pool.clone(), self.event_sender.clone())
    }

    pub fn statistics_service(&self) -> StatisticsService {
        StatisticsService::new(self.db_pool.clone())
    }

    pub fn supply_service(&self) -> SupplyService {
        SupplyService::new(self.db_pool.clone())
    }
}

/// Service container holding all service instances
#[derive(Clone)]
pub struct ServiceContainer {
    pub ledger: Arc<LedgerService>,
    pub requests: Arc<RequestService>,
    pub statistics: Arc<StatisticsService>,
    pub supplies: Arc<SupplyService>,
}

impl ServiceContainer {
    /// Creates a new service container with all services initialized
    pub fn new(factory: &ServiceFactory) -> Self {
        Self {
            ledger: Arc::new(factory.ledger_service()),
            requests: Arc::new(factory.request_service()),
            statistics: Arc::new(factory.statistics_service()),
            supplies: Arc::new(factory.supply_service()),
        }
    }
}
