use clap::{Subcommand, ValueEnum};
use engine::{Money, TopUpPlan, api_types::service::ServiceKind, try_parse_text};
use uuid::Uuid;

use super::Session;
use crate::{
    error::{AppError, Result},
    prompt,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Service {
    Celular,
    Bus,
}

impl From<Service> for ServiceKind {
    fn from(service: Service) -> Self {
        match service {
            Service::Celular => ServiceKind::Cellphone,
            Service::Bus => ServiceKind::Bus,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum TopUpCommand {
    /// Register a provider credit.
    Register {
        #[arg(long, value_enum)]
        service: Service,
        /// Credited virtual amount, e.g. `1.000,00`.
        #[arg(long)]
        amount: String,
    },
    /// List unpaid cellphone credit.
    Debts,
    /// Pay cellphone credit. Without ids every pending debt is paid.
    Pay {
        #[arg(long = "id")]
        ids: Vec<Uuid>,
    },
}

pub async fn run(session: &Session, command: TopUpCommand) -> Result<()> {
    let engine = &session.engine;
    let today = session.today();
    match command {
        TopUpCommand::Register { service, amount } => {
            let amount = try_parse_text(&amount)
                .ok_or_else(|| AppError::Input(format!("not an amount: {amount}")))?;
            let plan = TopUpPlan::new(service.into(), amount)?;
            println!("  credited  {:>12}", plan.virtual_amount.to_string());
            println!("  profit    {:>12}", plan.profit.to_string());
            println!("  owed      {:>12}", plan.owed.to_string());
            if plan.settle_now {
                println!("  paid now from CAJA_BUS");
            }
            if !prompt::confirm(&format!("Register the {} top-up?", plan.service))? {
                return Ok(());
            }
            let registered = session
                .busy("registering top-up", engine.register_topup(&plan, today))
                .await?;
            println!("Top-up {} registered.", registered.topup_id);
        }
        TopUpCommand::Debts => {
            let debts = engine.pending_debts(ServiceKind::Cellphone).await?;
            for item in &debts.items {
                println!(
                    "{}  {}  {:>12}",
                    item.id,
                    item.business_date,
                    Money::new(item.owed_minor).to_string()
                );
            }
            println!("Pending: {} ({} top-ups)", debts.total, debts.items.len());
        }
        TopUpCommand::Pay { ids } => {
            let ids = if ids.is_empty() {
                let debts = engine.pending_debts(ServiceKind::Cellphone).await?;
                println!("Paying {} top-ups for {}.", debts.items.len(), debts.total);
                debts.items.iter().map(|item| item.id).collect()
            } else {
                ids
            };
            if ids.is_empty() {
                println!("Nothing to pay.");
                return Ok(());
            }
            if !prompt::confirm("Mark them as paid today?")? {
                return Ok(());
            }
            let paid = session
                .busy("paying top-ups", engine.mark_topups_paid(&ids, today))
                .await?;
            println!("{} top-ups marked paid.", paid.updated);
        }
    }
    Ok(())
}
