use chrono::Utc;
use engine::{DeficitStep, ShiftState};

use super::Session;
use crate::{error::Result, prompt};

/// Pre-opening flow: deficit repair when needed, fund check, then opening.
pub async fn open(session: &Session) -> Result<()> {
    let engine = &session.engine;
    let today = session.today();

    if let ShiftState::Open(shift) = engine.shift_state(today).await? {
        println!("Shift #{} is already open.", shift.shift_number);
        return Ok(());
    }

    let mut wizard = engine.deficit_wizard().await?;
    if wizard.step() == DeficitStep::RepairDeficit {
        let plan = *wizard.plan();
        println!("The last closing left a deficit.");
        println!("  deficit carried      {:>12}", plan.deficit_carried.to_string());
        println!("  fixed fund           {:>12}", plan.fixed_fund.to_string());
        println!("  last cash collected  {:>12}", plan.last_collected_cash.to_string());
        println!("  fund shortfall       {:>12}", plan.fund_shortfall.to_string());
        println!("  withdraw from CAJA   {:>12}", plan.total_to_withdraw.to_string());

        loop {
            let question = format!(
                "Withdraw {} from the main till and book the repair?",
                plan.total_to_withdraw
            );
            if !prompt::confirm(&question)? {
                println!("Shift not opened: the deficit must be repaired first.");
                return Ok(());
            }
            match session
                .busy("repairing deficit", engine.repair_deficit(&mut wizard, today))
                .await
            {
                Ok(_) => break,
                Err(err) => println!("{err}"),
            }
        }
    } else if wizard.plan().needs_repair() {
        println!(
            "The deficit of {} from the last closing is already repaid.",
            wizard.plan().deficit_carried
        );
    }

    let question = format!("Is the fixed fund of {} in the till?", wizard.plan().fixed_fund);
    let present = prompt::confirm(&question)?;
    let verified = match wizard.confirm_fund(present) {
        Ok(verified) => verified,
        Err(err) => {
            println!("Shift not opened: {err}");
            return Ok(());
        }
    };

    let shift = session
        .busy(
            "opening shift",
            engine.open_shift(verified, today, Utc::now()),
        )
        .await?;
    println!("Shift #{} opened for {}.", shift.shift_number, shift.business_date);
    Ok(())
}

pub async fn close(session: &Session) -> Result<()> {
    let engine = &session.engine;
    let ShiftState::Open(shift) = engine.shift_state(session.today()).await? else {
        println!("No shift is open today.");
        return Ok(());
    };
    if !prompt::confirm(&format!("Close shift #{}?", shift.shift_number))? {
        return Ok(());
    }
    let closed = session
        .busy("closing shift", engine.close_shift(shift.id, Utc::now()))
        .await?;
    println!("Shift #{} closed.", closed.shift_number);
    Ok(())
}
