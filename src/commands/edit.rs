use crate::args::EditArgs;
use crate::commands::{commit, plural, Out};
use crate::dispatch::{dispatch, DispatchOutcome, EditEvent, Settings};
use crate::model::CellRef;
use crate::{Config, Result};
use anyhow::Context;
use tracing::warn;

/// Writes a value into one cell the way a person editing the workbook would, then runs whatever
/// the edit triggers.
///
/// A value outside the cell's dropdown is rejected before anything changes. Problems in the
/// triggered actions do not fail the command: they are listed in the returned outcome and the
/// edit itself is kept.
pub async fn edit(config: Config, args: EditArgs) -> Result<Out<DispatchOutcome>> {
    let cell = CellRef::parse(args.address().trim())
        .with_context(|| format!("Unable to edit '{}'", args.address()))?;
    let mut workbook = config.load_workbook().await?;
    workbook.edit(args.sheet(), cell, args.value())?;

    let settings = Settings::from(&config);
    let event = EditEvent::new(args.sheet(), cell.to_string());
    let outcome = dispatch(&mut workbook, &settings, &event).await;
    for failure in outcome.failures() {
        warn!(
            "{} failed: {}",
            failure.action,
            failure.error.as_deref().unwrap_or_default()
        );
    }
    commit(&config, &workbook).await?;

    let failed = outcome.failures().count();
    let message = if outcome.is_ignored() {
        format!("Edited {}!{cell}, nothing else to do", args.sheet())
    } else if failed == 0 {
        format!(
            "Edited {}!{cell} and ran {}",
            args.sheet(),
            plural(outcome.actions.len(), "action")
        )
    } else {
        format!(
            "Edited {}!{cell} and ran {}, {failed} failed",
            args.sheet(),
            plural(outcome.actions.len(), "action")
        )
    };
    Ok(Out::new(message, outcome))
}
