use engine::{LegOutcome, ProfitStatus};

use super::Session;
use crate::{error::Result, prompt};

pub async fn run(session: &Session) -> Result<()> {
    let engine = &session.engine;
    let plan = match engine.pending_profit(session.today()).await? {
        ProfitStatus::Pending(plan) => plan,
        ProfitStatus::AlreadySettled(month) => {
            println!("No pending profit: {} was already transferred.", month.label());
            return Ok(());
        }
        ProfitStatus::NoSales(month) => {
            println!("No pending profit: no sales to share for {}.", month.label());
            return Ok(());
        }
    };

    println!("Profit for {}:", plan.month.label());
    for leg in &plan.legs {
        println!(
            "  {:<14} sales {:>14}  profit {:>12}  -> CAJA_CHICA",
            leg.from.as_str(),
            leg.month_sales.to_string(),
            leg.profit.to_string()
        );
    }
    println!("  total {:>48}", plan.total().to_string());
    if !prompt::confirm("Transfer the profit to petty cash?")? {
        return Ok(());
    }

    let report = session
        .busy("transferring profit", engine.transfer_profit(&plan))
        .await?;
    for (leg, outcome) in &report.legs {
        match outcome {
            LegOutcome::Transferred(_) => println!("  {} transferred {}", leg.tag, leg.profit),
            LegOutcome::Failed(err) => println!("  {} FAILED: {err}", leg.tag),
        }
    }
    if !report.is_complete() {
        println!("Some transfers failed. Run `cuadre profit` again to retry only those.");
    }
    Ok(())
}
