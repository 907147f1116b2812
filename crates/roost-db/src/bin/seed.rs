//! # Seed Data Generator
//!
//! Populates a database with Florence city-tax rules and one demo booking.
//!
//! ## Usage
//! ```bash
//! # Seed ./roost_dev.db (default)
//! cargo run -p roost-db --bin seed
//!
//! # Specify database path
//! cargo run -p roost-db --bin seed -- --db ./data/roost.db
//! ```
//!
//! ## Generated Data
//! - Florence rules for adults, children and infants:
//!   - 4.00 per night, 2020-01-01 to 2023-03-31
//!   - 5.50 per night, 2023-04-01 to 2030-12-31
//! - One apartment ("Santo Spirito apartment", 4 guests)
//! - One customer
//! - One reservation 2024-03-29 to 2024-04-03, 4 guests of which 2 children,
//!   with its city tax already evaluated

use chrono::{Local, NaiveDate};
use std::env;

use roost_core::tax::{evaluate_stay, RuleSet};
use roost_core::{Accommodation, Apartment, Money, NewReservation, NewTaxRule, TargetCategory};
use roost_db::{Database, DbConfig};

/// (description, cents per night, valid from, valid to)
const FLORENCE_RULES: &[(&str, i64, (i32, u32, u32), (i32, u32, u32))] = &[
    ("Florence city tax", 400, (2020, 1, 1), (2023, 3, 31)),
    ("Florence city tax 2023", 550, (2023, 4, 1), (2030, 12, 31)),
];

/// Florence stops charging after the 7th night.
const FLORENCE_THRESHOLD: i64 = 7;

fn date((y, m, d): (i32, u32, u32)) -> Result<NaiveDate, String> {
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| format!("invalid date {y}-{m}-{d}"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./roost_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Roost Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./roost_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Roost Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.local_taxes().list_all().await?.len();
    if existing > 0 {
        println!("⚠ Database already has {} tax rules", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Inserting tax rules...");
    for category in TargetCategory::ALL {
        for (description, cents, from, to) in FLORENCE_RULES {
            let rule = NewTaxRule {
                description: format!("{description} ({category})"),
                amount_per_night: Money::from_cents(*cents),
                target: category,
                days_threshold: FLORENCE_THRESHOLD,
                valid_from: date(*from)?,
                valid_to: date(*to)?,
            };
            let id = db.local_taxes().insert(&rule).await?;
            println!("  #{id} {} {} per night", rule.description, rule.amount_per_night);
        }
    }

    println!();
    println!("Inserting demo booking...");
    let apartment = Accommodation::Apartment(Apartment {
        id: 0,
        description: "Santo Spirito apartment".to_string(),
        max_guests_allowed: 4,
        rooms: 3,
        bathrooms: 1,
        bedrooms: 2,
        beds: 3,
    });
    let accommodation_id = db.accommodations().insert(&apartment).await?;
    let customer_id = db
        .customers()
        .insert("Giulia Rossi", Some("Via Maggio 12, Firenze"), Some("+39 055 000000"))
        .await?;

    let booking = NewReservation {
        accommodation_id,
        customer_id,
        arrival_date: date((2024, 3, 29))?,
        departure_date: date((2024, 4, 3))?,
        guests: 4,
        children: 2,
        infants: 0,
        price: Money::from_major_minor(160, 0),
    };
    let mut reservation = booking.draft(Local::now().date_naive());
    let last_night = reservation.departure_date.pred_opt().ok_or("departure has no previous day")?;

    let mut rules = RuleSet::new();
    for category in TargetCategory::ALL {
        let overlapping = db
            .local_taxes()
            .find_overlapping(category, reservation.arrival_date, last_night)
            .await?;
        rules.set_category(category, overlapping);
    }
    reservation.city_tax_cents = evaluate_stay(&reservation, &rules)?.total().cents();
    reservation.id = db.reservations().insert(&reservation).await?;

    println!(
        "  Reservation #{} {} to {}: city tax {}",
        reservation.id,
        reservation.arrival_date,
        reservation.departure_date,
        reservation.city_tax()
    );

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
