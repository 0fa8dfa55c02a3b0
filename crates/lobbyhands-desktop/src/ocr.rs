//! Text recognition through the `tesseract` CLI.

use std::process::Command;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DesktopError;

/// A recognized word with its box, relative to the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub confidence: f32,
}

impl TextBlock {
    pub fn center(&self) -> (i32, i32) {
        (
            self.x + (self.width / 2) as i32,
            self.y + (self.height / 2) as i32,
        )
    }
}

/// Parse `tesseract ... tsv` output into word blocks at or above `min_confidence`.
///
/// Columns: level page_num block_num par_num line_num word_num left top
/// width height conf text. Non-word rows carry `conf = -1`.
pub fn parse_tsv(tsv: &str, min_confidence: f32) -> Vec<TextBlock> {
    tsv.lines()
        .skip(1)
        .filter_map(|line| {
            let cols: Vec<&str> = line.split('\t').collect();
            if cols.len() < 12 {
                return None;
            }
            let text = cols[11].trim();
            let confidence: f32 = cols[10].trim().parse().ok()?;
            if text.is_empty() || confidence < min_confidence {
                return None;
            }
            Some(TextBlock {
                text: text.to_string(),
                x: cols[6].parse().ok()?,
                y: cols[7].parse().ok()?,
                width: cols[8].parse().ok()?,
                height: cols[9].parse().ok()?,
                confidence,
            })
        })
        .collect()
}

/// First block whose text contains `pattern`.
pub fn find_text<'a>(blocks: &'a [TextBlock], pattern: &str) -> Option<&'a TextBlock> {
    blocks.iter().find(|b| b.text.contains(pattern))
}

pub struct TesseractOcr {
    command: String,
    min_confidence: f32,
}

impl TesseractOcr {
    pub fn new(command: impl Into<String>, min_confidence: f32) -> Self {
        Self {
            command: command.into(),
            min_confidence,
        }
    }

    /// Recognize words in a PNG image. Blocking.
    pub fn recognize_png(&self, png: &[u8]) -> Result<Vec<TextBlock>, DesktopError> {
        let input = std::env::temp_dir().join(format!("lobbyhands_ocr_{}.png", std::process::id()));
        std::fs::write(&input, png)?;

        let output = Command::new(&self.command)
            .arg(&input)
            .arg("stdout")
            .arg("--psm")
            .arg("6")
            .arg("tsv")
            .output();
        let _ = std::fs::remove_file(&input);

        let output = output.map_err(|e| DesktopError::Ocr(format!("{}: {}", self.command, e)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DesktopError::Ocr(stderr.trim().to_string()));
        }

        let blocks = parse_tsv(&String::from_utf8_lossy(&output.stdout), self.min_confidence);
        debug!("OCR recognized {} words", blocks.len());
        Ok(blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TSV: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t800\t400\t-1\t
5\t1\t1\t1\t1\t1\t10\t20\t60\t14\t91.5\tPlayer:
5\t1\t1\t1\t1\t2\t80\t20\t70\t14\t88.0\t9999999
5\t1\t1\t1\t1\t3\t160\t20\t30\t14\t12.0\tzz
";

    #[test]
    fn test_parse_tsv_filters_rows() {
        let blocks = parse_tsv(TSV, 40.0);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text, "Player:");
        assert_eq!(blocks[1].x, 80);
        assert_eq!(blocks[1].confidence, 88.0);
    }

    #[test]
    fn test_parse_tsv_low_threshold_keeps_all_words() {
        assert_eq!(parse_tsv(TSV, 0.0).len(), 3);
    }

    #[test]
    fn test_parse_tsv_ignores_garbage() {
        assert!(parse_tsv("header\nnot\ta\trow", 0.0).is_empty());
        assert!(parse_tsv("", 0.0).is_empty());
    }

    #[test]
    fn test_find_text_and_center() {
        let blocks = parse_tsv(TSV, 40.0);
        let found = find_text(&blocks, "9999999").unwrap();
        assert_eq!(found.center(), (115, 27));
        assert!(find_text(&blocks, "1234").is_none());
    }
}
