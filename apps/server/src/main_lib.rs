use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use clearcost_core::{
    catalog::{CatalogService, CatalogServiceTrait},
    customs::{CustomsService, CustomsServiceTrait},
    history::{HistoryRepositoryTrait, HistoryService, HistoryServiceTrait},
    market_prices::{MarketPriceService, MarketPriceServiceTrait},
    rates::{RateService, RateServiceTrait},
    CustomsSettings,
};
use clearcost_market_data::{AutoRiaProvider, NbuProvider, ResiliencePolicy};
use clearcost_storage_sqlite::{
    catalog::CatalogRepository, db, history::HistoryRepository, rates::RateRepository,
};

pub struct AppState {
    pub rate_service: Arc<dyn RateServiceTrait>,
    pub market_price_service: Arc<dyn MarketPriceServiceTrait>,
    pub catalog_service: Arc<dyn CatalogServiceTrait>,
    pub history_service: Arc<dyn HistoryServiceTrait>,
    pub customs_service: Arc<dyn CustomsServiceTrait>,
    pub settings: Arc<CustomsSettings>,
}

pub fn init_tracing() {
    let log_format = std::env::var("CLEARCOST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let settings = Arc::new(config.load_customs_settings()?);

    db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", config.db_path);

    let pool = db::create_pool(&config.db_path)?;
    db::run_migrations(&pool)?;

    // The dictionary should still be usable when the embedded seed list is
    // stale; a failed seed only delays brand resolution.
    if let Err(e) = db::seed_brands(&pool) {
        tracing::warn!("brand dictionary seeding failed: {}", e);
    }

    let writer = db::spawn_writer((*pool).clone());

    let rate_repository = Arc::new(RateRepository::new(Arc::clone(&pool), writer.clone()));
    let catalog_repository = Arc::new(CatalogRepository::new(Arc::clone(&pool), writer.clone()));
    let history_repository = Arc::new(HistoryRepository::new(Arc::clone(&pool), writer));

    // One policy instance: breaker state is per target inside it, so the
    // rate and market upstreams trip independently.
    let policy = Arc::new(ResiliencePolicy::new());

    let rate_service: Arc<dyn RateServiceTrait> = Arc::new(RateService::new(
        rate_repository,
        Arc::new(NbuProvider::new()),
        Arc::clone(&policy),
    ));

    let market_price_service: Arc<dyn MarketPriceServiceTrait> = Arc::new(MarketPriceService::new(
        Arc::new(AutoRiaProvider::new(config.autoria_api_key.clone())),
        policy,
    ));

    let catalog_service: Arc<dyn CatalogServiceTrait> = Arc::new(CatalogService::new(
        catalog_repository,
        Arc::clone(&market_price_service),
    ));

    let history_service: Arc<dyn HistoryServiceTrait> = Arc::new(HistoryService::new(
        Arc::clone(&history_repository) as Arc<dyn HistoryRepositoryTrait>,
    ));

    let customs_service: Arc<dyn CustomsServiceTrait> = Arc::new(CustomsService::new(
        Arc::clone(&rate_service),
        Arc::clone(&market_price_service),
        Arc::clone(&catalog_service),
        history_repository,
        Arc::clone(&settings),
    ));

    Ok(Arc::new(AppState {
        rate_service,
        market_price_service,
        catalog_service,
        history_service,
        customs_service,
        settings,
    }))
}
