use clap::Subcommand;

use roost_accounting::Services;

#[derive(Subcommand, Debug)]
pub enum CustomerCommand {
    /// Add a customer
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },

    /// List customers
    List,
}

impl CustomerCommand {
    pub async fn run(self, services: &Services) -> anyhow::Result<()> {
        match self {
            CustomerCommand::Add { name, address, phone } => {
                let customer = services
                    .customers
                    .add(&name, address.as_deref(), phone.as_deref())
                    .await?;
                println!("Added customer #{} {}", customer.id, customer.name);
            }
            CustomerCommand::List => {
                for customer in services.customers.list().await? {
                    println!(
                        "#{:<4} {:<30} {:<30} {}",
                        customer.id,
                        customer.name,
                        customer.address.as_deref().unwrap_or("-"),
                        customer.phone.as_deref().unwrap_or("-")
                    );
                }
            }
        }
        Ok(())
    }
}
