//! Screen capture.

use lobbyhands_protocols::Region;
use screenshots::image::RgbaImage;
use screenshots::Screen;

use crate::error::DesktopError;

fn primary_screen() -> Result<Screen, DesktopError> {
    let screens = Screen::all().map_err(|e| DesktopError::Capture(e.to_string()))?;
    let mut fallback = None;
    for screen in screens {
        if screen.display_info.is_primary {
            return Ok(screen);
        }
        fallback.get_or_insert(screen);
    }
    fallback.ok_or(DesktopError::NoMonitor)
}

/// Capture `region` of the primary screen.
pub fn capture_area(region: Region) -> Result<RgbaImage, DesktopError> {
    if region.is_empty() {
        return Err(DesktopError::Capture(format!("empty region {:?}", region)));
    }
    primary_screen()?
        .capture_area(region.x, region.y, region.width, region.height)
        .map_err(|e| DesktopError::Capture(e.to_string()))
}

/// Primary screen size in pixels.
pub fn screen_size() -> Result<(u32, u32), DesktopError> {
    let screen = primary_screen()?;
    Ok((screen.display_info.width, screen.display_info.height))
}
