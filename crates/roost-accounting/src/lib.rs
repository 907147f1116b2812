//! # roost-accounting: Services for Roost
//!
//! Service objects over [`roost_db::Database`]: the local tax registry, the
//! city-tax engine, the reservation ledger, the accommodation catalogue and
//! the customer book.
//!
//! ## Wiring
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RoostConfig::load(path)                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config.db_config())                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Services::new(db, &config)                                            │
//! │       ├── registry        TaxRegistry                                  │
//! │       ├── accounting      AccountingService ──► registry               │
//! │       ├── reservations    ReservationService ──► customers, accounting │
//! │       ├── accommodations  AccommodationService                         │
//! │       └── customers       CustomerBook                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every service holds a clone of the same pool; nothing is global.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod accommodations;
pub mod accounting;
pub mod config;
pub mod customers;
pub mod error;
pub mod registry;
pub mod report;
pub mod reservations;

// =============================================================================
// Re-exports
// =============================================================================

pub use accommodations::AccommodationService;
pub use accounting::AccountingService;
pub use config::RoostConfig;
pub use customers::CustomerBook;
pub use error::{AccountingError, AccountingResult, ConfigError, ReportError};
pub use registry::TaxRegistry;
pub use report::{CsvDirectorySink, DeclarationSink, MemorySink};
pub use reservations::ReservationService;

use roost_db::Database;

/// All services, built once at startup.
#[derive(Debug, Clone)]
pub struct Services {
    pub registry: TaxRegistry,
    pub accounting: AccountingService,
    pub reservations: ReservationService,
    pub accommodations: AccommodationService,
    pub customers: CustomerBook,
}

impl Services {
    pub async fn new(db: Database, config: &RoostConfig) -> AccountingResult<Self> {
        let registry = TaxRegistry::new(db.clone());
        let customers = CustomerBook::new(db.clone()).await?;
        let accounting = AccountingService::new(db.clone(), registry.clone(), config.mismatch_tolerance());

        Ok(Services {
            reservations: ReservationService::new(db.clone(), customers.clone(), accounting.clone()),
            accounting,
            accommodations: AccommodationService::new(db),
            registry,
            customers,
        })
    }
}
