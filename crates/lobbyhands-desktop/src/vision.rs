//! [`Vision`] backed by screen captures.

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use lobbyhands_protocols::{
    CollaboratorError, DeathFrameReading, PercentInsets, Position, Region, Rgb, Vision,
};
use screenshots::image::ImageOutputFormat;
use tracing::debug;

use crate::color::{count_color, locate_color};
use crate::error::DesktopError;
use crate::ocr::{find_text, TesseractOcr};
use crate::run_blocking;
use crate::screen::{capture_area, screen_size};

/// Where and what color the action button is.
#[derive(Debug, Clone)]
pub struct ButtonSearch {
    pub color: Rgb,
    pub tolerance: u8,
    pub insets: PercentInsets,
}

/// Host avatar frame check.
#[derive(Debug, Clone)]
pub struct DeathFrameSearch {
    pub region: Region,
    pub color: Rgb,
    pub tolerance: u8,
    pub min_pixels: usize,
}

pub struct DesktopVision {
    button: ButtonSearch,
    death_frame: DeathFrameSearch,
    ocr: Arc<TesseractOcr>,
}

impl DesktopVision {
    pub fn new(button: ButtonSearch, death_frame: DeathFrameSearch, ocr: TesseractOcr) -> Self {
        Self {
            button,
            death_frame,
            ocr: Arc::new(ocr),
        }
    }
}

#[async_trait]
impl Vision for DesktopVision {
    async fn find_action_button(&self) -> Result<Option<Position>, CollaboratorError> {
        let search = self.button.clone();
        run_blocking(move || {
            let (width, height) = screen_size()?;
            let region = search.insets.resolve(width, height);
            let image = capture_area(region)?;
            let found = locate_color(&image, search.color, search.tolerance);
            if let Some(m) = found {
                debug!(pixels = m.pixels, "Action button color found");
            }
            Ok(found.map(|m| region.to_absolute(m.x, m.y)))
        })
        .await
    }

    async fn find_death_frame_color(&self) -> Result<DeathFrameReading, CollaboratorError> {
        let search = self.death_frame.clone();
        run_blocking(move || {
            let image = capture_area(search.region)?;
            let matched_pixels = count_color(&image, search.color, search.tolerance);
            Ok(DeathFrameReading {
                detected: matched_pixels >= search.min_pixels,
                matched_pixels,
            })
        })
        .await
    }

    async fn find_specific_text(
        &self,
        pattern: &str,
        region: Region,
    ) -> Result<Option<Position>, CollaboratorError> {
        let pattern = pattern.to_string();
        let ocr = self.ocr.clone();
        run_blocking(move || {
            let image = capture_area(region)?;
            let mut png = Cursor::new(Vec::new());
            image
                .write_to(&mut png, ImageOutputFormat::Png)
                .map_err(|e| DesktopError::Capture(e.to_string()))?;

            let blocks = ocr.recognize_png(png.get_ref())?;
            Ok(find_text(&blocks, &pattern).map(|b| {
                let (x, y) = b.center();
                Position::new(region.x + x, region.y + y)
            }))
        })
        .await
    }

    async fn screen_size(&self) -> Result<(u32, u32), CollaboratorError> {
        run_blocking(screen_size).await
    }
}
