//! # CLI Commands
//!
//! One module per entity. Each subcommand maps onto one service call.
//! `config` is the exception: it needs no database.

pub mod accommodation;
pub mod config;
pub mod customer;
pub mod declaration;
pub mod reservation;
pub mod tax;

use clap::Subcommand;

use roost_accounting::{RoostConfig, Services};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write or print the configuration file
    #[command(subcommand)]
    Config(config::ConfigCommand),

    #[command(flatten)]
    Ledger(LedgerCommand),
}

/// Commands that run against the database.
#[derive(Subcommand, Debug)]
pub enum LedgerCommand {
    /// Manage apartments and rooms
    #[command(subcommand)]
    Accommodation(accommodation::AccommodationCommand),

    /// Manage customers
    #[command(subcommand)]
    Customer(customer::CustomerCommand),

    /// Book, block and list stays
    #[command(subcommand)]
    Reservation(reservation::ReservationCommand),

    /// Manage city-tax rules and evaluate stays
    #[command(subcommand)]
    Tax(tax::TaxCommand),

    /// Build the monthly city-tax declaration of one accommodation
    Declaration(declaration::DeclarationCommand),
}

impl LedgerCommand {
    pub async fn run(self, services: &Services, config: &RoostConfig) -> anyhow::Result<()> {
        match self {
            LedgerCommand::Accommodation(cmd) => cmd.run(services).await,
            LedgerCommand::Customer(cmd) => cmd.run(services).await,
            LedgerCommand::Reservation(cmd) => cmd.run(services).await,
            LedgerCommand::Tax(cmd) => cmd.run(services).await,
            LedgerCommand::Declaration(cmd) => cmd.run(services, config).await,
        }
    }
}
