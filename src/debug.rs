//! Debug mode: a dropdown on the Monthly sheet that reveals the control cells and the log feed.
//!
//! While debug mode is off a cover image sits over the debug area. Turning it on parks the image
//! far down the sheet.

use crate::api::{CellStore, Host};
use crate::layout::{
    DEBUG_COVER_ANCHOR, DEBUG_DISABLED, DEBUG_ENABLED, DEBUG_LABEL, DEBUG_LABEL_CELL,
    DEBUG_PARKED_ANCHOR, DEBUG_TOGGLE_CELL, MONTHLY,
};
use crate::model::{CellRange, CellRef};
use crate::Result;
use anyhow::{bail, Context};
use tracing::debug;

/// Writes the label and the Enabled/Disabled dropdown, turns debug mode off and applies it.
pub async fn setup_debug_mode<H>(host: &mut H) -> Result<()>
where
    H: Host + ?Sized,
{
    if !host.has_sheet(MONTHLY).await? {
        bail!("{MONTHLY} sheet not found for debug setup");
    }
    host.set_value(MONTHLY, DEBUG_LABEL_CELL, DEBUG_LABEL).await?;
    let toggle = CellRange::from(CellRef::parse(DEBUG_TOGGLE_CELL)?);
    host.clear(MONTHLY, &toggle).await?;
    host.set_validation(
        MONTHLY,
        &toggle,
        &[DEBUG_ENABLED.to_string(), DEBUG_DISABLED.to_string()],
    )
    .await?;
    host.set_value(MONTHLY, DEBUG_TOGGLE_CELL, DEBUG_DISABLED)
        .await?;
    toggle_debug_visibility(host).await?;
    Ok(())
}

/// True when the toggle reads `Enabled`. A workbook without a Monthly sheet is never in debug mode.
pub async fn is_debug_enabled<H>(host: &mut H) -> Result<bool>
where
    H: CellStore + ?Sized,
{
    if !host.has_sheet(MONTHLY).await? {
        return Ok(false);
    }
    Ok(host.value(MONTHLY, DEBUG_TOGGLE_CELL).await? == DEBUG_ENABLED)
}

/// Moves the cover image to match the toggle. Returns whether debug mode is on.
pub async fn toggle_debug_visibility<H>(host: &mut H) -> Result<bool>
where
    H: Host + ?Sized,
{
    let enabled = is_debug_enabled(host).await?;
    if !host.has_sheet(MONTHLY).await? {
        return Ok(enabled);
    }
    if host.images(MONTHLY).await?.is_empty() {
        debug!("No cover image on {MONTHLY}");
        return Ok(enabled);
    }
    let anchor = if enabled {
        DEBUG_PARKED_ANCHOR
    } else {
        DEBUG_COVER_ANCHOR
    };
    host.anchor_image(MONTHLY, 0, CellRef::parse(anchor)?)
        .await
        .context("Unable to move the debug cover image")?;
    Ok(enabled)
}

/// Sets the toggle and applies it.
pub async fn set_debug_mode<H>(host: &mut H, enabled: bool) -> Result<()>
where
    H: Host + ?Sized,
{
    let value = if enabled { DEBUG_ENABLED } else { DEBUG_DISABLED };
    host.set_value(MONTHLY, DEBUG_TOGGLE_CELL, value).await?;
    toggle_debug_visibility(host).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ChartHost, MemoryWorkbook};

    async fn image_anchor(wb: &mut MemoryWorkbook) -> String {
        wb.images(MONTHLY).await.unwrap()[0].anchor.to_string()
    }

    #[tokio::test]
    async fn test_setup_debug_mode() {
        let mut wb = MemoryWorkbook::seeded().unwrap();
        wb.set_value(MONTHLY, DEBUG_TOGGLE_CELL, "Enabled").await.unwrap();
        wb.set_value(MONTHLY, DEBUG_LABEL_CELL, "").await.unwrap();
        setup_debug_mode(&mut wb).await.unwrap();
        assert_eq!(wb.value(MONTHLY, DEBUG_LABEL_CELL).await.unwrap(), "Debug Mode:");
        assert_eq!(wb.value(MONTHLY, DEBUG_TOGGLE_CELL).await.unwrap(), "Disabled");
        assert_eq!(
            wb.validation_for(MONTHLY, CellRef::parse(DEBUG_TOGGLE_CELL).unwrap()),
            Some(&["Enabled".to_string(), "Disabled".to_string()][..])
        );
        assert_eq!(image_anchor(&mut wb).await, "X3");
    }

    #[tokio::test]
    async fn test_setup_without_monthly_fails() {
        let mut wb = MemoryWorkbook::new();
        assert!(setup_debug_mode(&mut wb).await.is_err());
        assert!(!is_debug_enabled(&mut wb).await.unwrap());
    }

    #[tokio::test]
    async fn test_toggle_moves_cover_image() {
        let mut wb = MemoryWorkbook::seeded().unwrap();
        set_debug_mode(&mut wb, true).await.unwrap();
        assert!(is_debug_enabled(&mut wb).await.unwrap());
        assert_eq!(image_anchor(&mut wb).await, "A100");

        set_debug_mode(&mut wb, false).await.unwrap();
        assert!(!is_debug_enabled(&mut wb).await.unwrap());
        assert_eq!(image_anchor(&mut wb).await, "X3");
    }

    #[tokio::test]
    async fn test_toggle_without_images() {
        let mut wb = MemoryWorkbook::new();
        wb.ensure_sheet(MONTHLY).await.unwrap();
        wb.set_value(MONTHLY, DEBUG_TOGGLE_CELL, "Enabled").await.unwrap();
        assert!(toggle_debug_visibility(&mut wb).await.unwrap());
    }
}
