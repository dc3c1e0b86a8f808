//! Builds the order ports from the configured adapters.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::warn;

use labelflow::domain::OrderLifecycleService;
use labelflow::domain::ports::{CompanyDirectory, OrderStore};
use labelflow::inbound::http::state::HttpState;
use labelflow::outbound::memory::{InMemoryCompanyDirectory, InMemoryOrderStore};
use labelflow::outbound::persistence::{DbPool, DieselCompanyDirectory, DieselOrderRepository};

fn lifecycle_state<S, C>(store: S, companies: C) -> HttpState
where
    S: OrderStore + 'static,
    C: CompanyDirectory + 'static,
{
    let service = Arc::new(OrderLifecycleService::new(
        Arc::new(store),
        Arc::new(companies),
        Arc::new(DefaultClock),
    ));
    HttpState::new(service.clone(), service)
}

/// Diesel adapters when a pool is configured, in-memory ones otherwise.
pub(crate) fn build_http_state(db_pool: Option<&DbPool>) -> web::Data<HttpState> {
    let state = match db_pool {
        Some(pool) => lifecycle_state(
            DieselOrderRepository::new(pool.clone()),
            DieselCompanyDirectory::new(pool.clone()),
        ),
        None => {
            warn!("no database configured; orders live in process memory and vanish on restart");
            lifecycle_state(InMemoryOrderStore::new(), InMemoryCompanyDirectory::default())
        }
    };
    web::Data::new(state)
}
