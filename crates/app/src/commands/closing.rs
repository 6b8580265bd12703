use engine::{ClosingField, ClosingPreview, ClosingStep, ClosingWizard, LeaveDecision, Money};

use super::Session;
use crate::{error::Result, prompt};

fn print_preview(wizard: &ClosingWizard, preview: &ClosingPreview) {
    let baseline = wizard.baseline();
    let rows = [
        ("Cellphone sales", preview.sales_cellphone),
        ("Bus sales", preview.sales_bus),
        ("Total sales", preview.total_sales),
        ("Cash for cellphone", preview.cash_for_cellphone),
        ("Cash for bus", preview.cash_for_bus),
        ("CAJA after transfer", preview.main_till_ending),
        ("CAJA_CHICA after transfer", preview.petty_cash_ending),
        ("CAJA_CELULAR ending", preview.cellphone_till_ending),
        ("CAJA_BUS ending", preview.bus_till_ending),
    ];
    println!();
    println!(
        "Previous virtual balances: cellphone {}, bus {}",
        baseline.previous_virtual.cellphone, baseline.previous_virtual.bus
    );
    for (label, amount) in rows {
        println!("  {label:<26}{:>14}", amount.to_string());
    }
    println!();
}

/// Keeps the field untouched when the operator just pressed Enter.
fn apply_entry(wizard: &mut ClosingWizard, field: ClosingField, raw: String) -> Result<()> {
    if raw != wizard.raw(field) {
        wizard.set_field(field, raw)?;
    }
    Ok(())
}

/// Input step. Returns `false` when the operator left the wizard.
fn fill(wizard: &mut ClosingWizard) -> Result<bool> {
    loop {
        for field in ClosingField::ALL {
            let current = wizard.raw(field).to_string();
            let raw = prompt::line(&format!("{}: ", field.label()), &current)?;
            apply_entry(wizard, field, raw)?;
            if let Some(err) = wizard.visible_error(field) {
                println!("  {}: {err}", field.label());
            }
        }
        print_preview(wizard, &wizard.preview());

        match wizard.next() {
            Ok(()) => return Ok(true),
            Err(err) => {
                println!("{err}");
                if !prompt::confirm("Edit the values again?")? && leave(wizard)? {
                    return Ok(false);
                }
            }
        }
    }
}

/// Unsaved-changes guard. Returns `true` when leaving is allowed.
fn leave(wizard: &mut ClosingWizard) -> Result<bool> {
    match wizard.request_leave() {
        LeaveDecision::Allow => Ok(true),
        LeaveDecision::Blocked => Ok(false),
        LeaveDecision::ConfirmDiscard => {
            if prompt::confirm("Discard the closing you entered?")? {
                wizard.discard()?;
                Ok(true)
            } else {
                Ok(false)
            }
        }
    }
}

pub async fn run(session: &Session) -> Result<()> {
    let engine = &session.engine;
    let mut wizard = engine.closing_wizard(session.today()).await?;
    println!(
        "Daily closing for {} (amounts like 1.250,50 or 1,250.50 are accepted)",
        wizard.business_date()
    );

    loop {
        if wizard.step() == ClosingStep::Input && !fill(&mut wizard)? {
            println!("Closing discarded.");
            return Ok(());
        }

        println!("Review:");
        print_preview(&wizard, &wizard.preview());
        if !prompt::confirm("Submit the daily closing?")? {
            if prompt::confirm("Go back and edit?")? {
                wizard.back()?;
                continue;
            }
            if leave(&mut wizard)? {
                println!("Closing discarded.");
                return Ok(());
            }
            continue;
        }

        match session
            .busy("submitting closing", engine.submit_closing(&mut wizard))
            .await
        {
            Ok(committed) => {
                println!(
                    "Closing committed ({}). Deficit carried: {}",
                    committed.closing_id,
                    Money::new(committed.deficit_minor)
                );
                // Leave first, then clear the form.
                wizard.reset();
                return Ok(());
            }
            // Nothing was committed; the review is shown again for a retry.
            Err(err) if err.is_retryable() && wizard.step() == ClosingStep::Review => {
                println!("{err}");
            }
            Err(err) => return Err(err.into()),
        }
    }
}
