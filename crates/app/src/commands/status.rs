use engine::{ShiftState, api_types::till::TillCode};

use super::Session;
use crate::error::Result;

pub async fn run(session: &Session) -> Result<()> {
    let today = session.today();
    let overview = session.engine.overview(today).await;

    println!("Business date: {today}");
    match &overview.shift {
        Some(ShiftState::Unopened) => println!("Shift: not opened yet"),
        Some(ShiftState::Open(shift)) => println!(
            "Shift: #{} open since {}",
            shift.shift_number,
            shift.opened_at.with_timezone(&chrono::Local).format("%H:%M")
        ),
        Some(ShiftState::Closed(shift)) => println!("Shift: #{} closed", shift.shift_number),
        None => println!("Shift: unknown (could not be read)"),
    }
    match overview.last_closing {
        Some(Some(date)) => println!("Last closing: {date}"),
        Some(None) => println!("Last closing: none yet"),
        None => println!("Last closing: unknown"),
    }

    match overview.balances {
        Some(balances) => {
            println!();
            for code in TillCode::ALL {
                let flag = match &overview.low_balance {
                    Some(low) if low.contains(&code) => "  LOW",
                    _ => "",
                };
                println!("{:<14}{:>14}{flag}", code.as_str(), balances.get(code).to_string());
            }
            println!("{:<14}{:>14}", "TOTAL", balances.total().to_string());
            if overview.low_balance.is_none() {
                println!("Low-balance alerts: unknown (settings could not be read)");
            }
        }
        None => println!("Balances: unknown (could not be read)"),
    }
    Ok(())
}
