use chrono::NaiveDate;
use clap::Subcommand;

use roost_accounting::Services;
use roost_core::{Accommodation, Apartment, Room};

#[derive(Subcommand, Debug)]
pub enum AccommodationCommand {
    /// Add an apartment
    AddApartment {
        #[arg(long)]
        description: String,
        #[arg(long)]
        max_guests: i64,
        #[arg(long, default_value_t = 1)]
        rooms: i64,
        #[arg(long, default_value_t = 1)]
        bathrooms: i64,
        #[arg(long, default_value_t = 1)]
        bedrooms: i64,
        #[arg(long, default_value_t = 1)]
        beds: i64,
    },

    /// Add a room
    AddRoom {
        #[arg(long)]
        description: String,
        #[arg(long)]
        max_guests: i64,
        #[arg(long)]
        private_bathroom: bool,
        #[arg(long)]
        kitchen: bool,
    },

    /// List all accommodations
    List,

    /// List accommodations free for a whole stay
    Available {
        /// Arrival date (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,
        /// Departure date (YYYY-MM-DD), exclusive
        #[arg(long)]
        to: NaiveDate,
        #[arg(long, default_value_t = 1)]
        guests: i64,
    },
}

impl AccommodationCommand {
    pub async fn run(self, services: &Services) -> anyhow::Result<()> {
        match self {
            AccommodationCommand::AddApartment {
                description,
                max_guests,
                rooms,
                bathrooms,
                bedrooms,
                beds,
            } => {
                let created = services
                    .accommodations
                    .create_apartment(Apartment {
                        id: 0,
                        description,
                        max_guests_allowed: max_guests,
                        rooms,
                        bathrooms,
                        bedrooms,
                        beds,
                    })
                    .await?;
                println!("Added apartment #{}", created.id());
            }
            AccommodationCommand::AddRoom {
                description,
                max_guests,
                private_bathroom,
                kitchen,
            } => {
                let created = services
                    .accommodations
                    .create_room(Room {
                        id: 0,
                        description,
                        max_guests_allowed: max_guests,
                        has_private_bathroom: private_bathroom,
                        has_kitchen: kitchen,
                    })
                    .await?;
                println!("Added room #{}", created.id());
            }
            AccommodationCommand::List => print_all(&services.accommodations.list().await?),
            AccommodationCommand::Available { from, to, guests } => {
                print_all(&services.reservations.available_accommodations(from, to, guests).await?)
            }
        }
        Ok(())
    }
}

fn print_all(accommodations: &[Accommodation]) {
    if accommodations.is_empty() {
        println!("No accommodations.");
        return;
    }
    for accommodation in accommodations {
        println!(
            "#{:<4} {:<10} max {:<3} {}",
            accommodation.id(),
            accommodation.kind(),
            accommodation.max_guests_allowed(),
            accommodation.description()
        );
    }
}
