use chrono::NaiveDate;
use clap::Subcommand;
use tracing::warn;

use roost_accounting::Services;
use roost_core::{CalendarMonth, Money, NewReservation, Reservation};

#[derive(Subcommand, Debug)]
pub enum ReservationCommand {
    /// Book a stay and evaluate its city tax
    Add {
        #[arg(long)]
        accommodation: i64,
        #[arg(long)]
        customer: i64,
        /// Arrival date (YYYY-MM-DD)
        #[arg(long)]
        arrival: NaiveDate,
        /// Departure date (YYYY-MM-DD), exclusive
        #[arg(long)]
        departure: NaiveDate,
        /// Total guests, children and infants included
        #[arg(long)]
        guests: i64,
        #[arg(long, default_value_t = 0)]
        children: i64,
        #[arg(long, default_value_t = 0)]
        infants: i64,
        /// Price of the stay, e.g. 160 or 160.50
        #[arg(long, default_value = "0")]
        price: Money,
    },

    /// Mark dates as unavailable
    Block {
        #[arg(long)]
        accommodation: i64,
        #[arg(long)]
        from: NaiveDate,
        /// Exclusive
        #[arg(long)]
        to: NaiveDate,
    },

    /// List reservations
    List {
        #[arg(long)]
        accommodation: Option<i64>,
        /// Only stays touching this month (needs --accommodation and --year)
        #[arg(long, requires_all = ["accommodation", "year"])]
        month: Option<u32>,
        #[arg(long, requires = "month")]
        year: Option<i32>,
    },

    /// Delete a reservation
    Delete { id: i64 },
}

impl ReservationCommand {
    pub async fn run(self, services: &Services) -> anyhow::Result<()> {
        match self {
            ReservationCommand::Add {
                accommodation,
                customer,
                arrival,
                departure,
                guests,
                children,
                infants,
                price,
            } => {
                let reservation = services
                    .reservations
                    .add_reservation(&NewReservation {
                        accommodation_id: accommodation,
                        customer_id: customer,
                        arrival_date: arrival,
                        departure_date: departure,
                        guests,
                        children,
                        infants,
                        price,
                    })
                    .await?;
                println!(
                    "Booked reservation #{} (city tax {})",
                    reservation.id,
                    reservation.city_tax()
                );
            }
            ReservationCommand::Block { accommodation, from, to } => {
                let block = services.reservations.block_dates(accommodation, from, to).await?;
                println!("Blocked #{} from {} to {}", block.id, from, to);
            }
            ReservationCommand::List {
                accommodation,
                month,
                year,
            } => {
                let reservations = match (accommodation, month, year) {
                    (Some(id), Some(month), Some(year)) => {
                        services
                            .reservations
                            .for_month(id, CalendarMonth::new(year, month)?)
                            .await?
                    }
                    (Some(id), _, _) => services.reservations.for_accommodation(id).await?,
                    _ => services.reservations.list().await?,
                };
                print_all(&reservations);
            }
            ReservationCommand::Delete { id } => {
                if services.reservations.delete(id).await? {
                    println!("Deleted reservation #{id}");
                } else {
                    warn!(reservation_id = id, "No such reservation");
                }
            }
        }
        Ok(())
    }
}

fn print_all(reservations: &[Reservation]) {
    if reservations.is_empty() {
        println!("No reservations.");
        return;
    }
    for r in reservations {
        if r.is_unavailability_block() {
            println!("#{:<4} acc {:<4} {} → {}  BLOCKED", r.id, r.accommodation_id, r.arrival_date, r.departure_date);
            continue;
        }
        println!(
            "#{:<4} acc {:<4} {} → {}  {} guests ({} children, {} infants)  price {:>8}  city tax {:>7}",
            r.id,
            r.accommodation_id,
            r.arrival_date,
            r.departure_date,
            r.guests,
            r.children,
            r.infants,
            r.price(),
            r.city_tax()
        );
    }
}
