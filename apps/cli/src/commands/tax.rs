use chrono::NaiveDate;
use clap::{Args, Subcommand};
use tracing::warn;

use roost_accounting::Services;
use roost_core::{Money, NewTaxRule, TargetCategory};

/// Fields shared by `tax add` and `tax update`.
#[derive(Args, Debug)]
pub struct RuleArgs {
    #[arg(long)]
    description: String,
    /// Amount per guest per night, e.g. 5.5
    #[arg(long)]
    amount: Money,
    /// adults | children | infants
    #[arg(long)]
    target: TargetCategory,
    /// Nights of one stay after which the tax stops
    #[arg(long)]
    threshold: i64,
    /// First day the rule applies (YYYY-MM-DD)
    #[arg(long)]
    from: NaiveDate,
    /// Last day the rule applies, inclusive (YYYY-MM-DD)
    #[arg(long)]
    to: NaiveDate,
}

impl From<RuleArgs> for NewTaxRule {
    fn from(args: RuleArgs) -> Self {
        NewTaxRule {
            description: args.description,
            amount_per_night: args.amount,
            target: args.target,
            days_threshold: args.threshold,
            valid_from: args.from,
            valid_to: args.to,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum TaxCommand {
    /// Add a city-tax rule
    Add(RuleArgs),

    /// Replace an existing rule
    Update {
        id: i64,
        #[command(flatten)]
        rule: RuleArgs,
    },

    /// Remove a rule
    Remove { id: i64 },

    /// List rules
    List {
        #[arg(long)]
        target: Option<TargetCategory>,
    },

    /// Re-evaluate the city tax of one reservation, or of all of them
    Evaluate {
        #[arg(long)]
        reservation: Option<i64>,
    },
}

impl TaxCommand {
    pub async fn run(self, services: &Services) -> anyhow::Result<()> {
        match self {
            TaxCommand::Add(args) => {
                let id = services.accounting.add_rule(&args.into()).await?;
                println!("Added tax rule #{id}");
            }
            TaxCommand::Update { id, rule } => {
                services.accounting.update_rule(id, &rule.into()).await?;
                println!("Updated tax rule #{id}");
            }
            TaxCommand::Remove { id } => {
                if services.accounting.remove_rule(id).await? {
                    println!("Removed tax rule #{id}");
                } else {
                    warn!(rule_id = id, "No such tax rule");
                }
            }
            TaxCommand::List { target } => {
                let rules = services.registry.list_rules().await?;
                for rule in rules.iter().filter(|r| target.map_or(true, |t| r.target == t)) {
                    println!(
                        "#{:<4} {:<8} {:>7}/night  first {:<3} nights  {} .. {}  {}",
                        rule.id,
                        rule.target,
                        rule.amount_per_night(),
                        rule.days_threshold,
                        rule.start_date,
                        rule.end_date,
                        rule.description
                    );
                }
            }
            TaxCommand::Evaluate { reservation: Some(id) } => {
                let reservation = services.accounting.evaluate_reservation(id).await?;
                println!("Reservation #{} city tax {}", reservation.id, reservation.city_tax());
            }
            TaxCommand::Evaluate { reservation: None } => {
                let count = services.accounting.reevaluate_all().await?;
                println!("Re-evaluated {count} reservations");
            }
        }
        Ok(())
    }
}
