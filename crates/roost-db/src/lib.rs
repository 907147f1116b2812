//! # roost-db: Database Layer for Roost
//!
//! SQLite storage for accommodations, customers, reservations and local tax
//! rules, using sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Roost Data Flow                                  │
//! │                                                                         │
//! │  roost-accounting service (e.g. evaluate_local_taxes)                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     roost-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌──────────────────┐   ┌──────────────┐ │   │
//! │  │   │   Database    │    │   Repositories   │   │  Migrations  │ │   │
//! │  │   │   (pool.rs)   │◄───│ accommodations   │   │  (embedded)  │ │   │
//! │  │   │  SqlitePool   │    │ customers        │   │ 001_initial  │ │   │
//! │  │   │               │    │ reservations     │   │              │ │   │
//! │  │   │               │    │ local_taxes      │   │              │ │   │
//! │  │   └───────────────┘    └──────────────────┘   └──────────────┘ │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (WAL mode)                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use roost_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("roost.db")).await?;
//! let rules = db.local_taxes().list_all().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{Constraint, DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::accommodation::AccommodationRepository;
pub use repository::customer::CustomerRepository;
pub use repository::local_tax::LocalTaxRepository;
pub use repository::reservation::ReservationRepository;
