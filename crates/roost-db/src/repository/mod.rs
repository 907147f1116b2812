//! # Repository Module
//!
//! Database repository implementations for Roost.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Service (roost-accounting)                                             │
//! │       │                                                                 │
//! │       │  db.local_taxes().find_overlapping(Adults, from, to)            │
//! │       ▼                                                                 │
//! │  LocalTaxRepository                                                     │
//! │  ├── insert / update / delete                                          │
//! │  ├── get_by_id / list_all                                              │
//! │  └── find_overlapping                                                  │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories do no validation of their own beyond the schema's CHECK and
//! FOREIGN KEY constraints; services validate before calling them.
//!
//! ## Available Repositories
//!
//! - [`accommodation::AccommodationRepository`] - Apartments and rooms
//! - [`customer::CustomerRepository`] - Customers
//! - [`reservation::ReservationRepository`] - Reservations and availability
//! - [`local_tax::LocalTaxRepository`] - City tax rules

pub mod accommodation;
pub mod customer;
pub mod local_tax;
pub mod reservation;
