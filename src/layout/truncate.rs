//! # Truncation
//!
//! Shrinks text that cannot fit a height budget, ending it with an ellipsis.
//!
//! Both searches rely on measured height being monotonic in string length
//! for a fixed width and font. That holds for the standard fonts and greedy
//! breaking used here; complex-script shaping can break it, in which case the
//! binary search may settle on a shorter prefix than strictly necessary.

use log::debug;

use crate::canvas::DocumentCanvas;
use crate::error::DossierError;
use crate::style::TextStyle;

pub const ELLIPSIS: &str = "\u{2026}";

/// Upper bound on truncation passes for a single row.
pub const ROW_FIT_ITERATIONS: usize = 12;

/// Longest prefix of `text` (trimmed, plus an ellipsis) whose height at
/// `width` is at most `max_height`. Text that already fits comes back
/// unchanged; if not even one character fits, the ellipsis alone is returned.
pub fn fit_to_height(
    canvas: &dyn DocumentCanvas,
    text: &str,
    width: f64,
    max_height: f64,
    style: &TextStyle,
) -> Result<String, DossierError> {
    if canvas.measure_height(text, width, style)? <= max_height {
        return Ok(text.to_string());
    }

    // Byte offset of every char boundary, so prefixes never split a char.
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();

    let mut lo = 0usize;
    let mut hi = boundaries.len() - 1;
    let mut best: Option<String> = None;

    while lo <= hi {
        let mid = (lo + hi) / 2;
        let candidate = format!("{}{}", text[..boundaries[mid]].trim_end(), ELLIPSIS);
        if canvas.measure_height(&candidate, width, style)? <= max_height {
            best = Some(candidate);
            lo = mid + 1;
        } else if mid == 0 {
            break;
        } else {
            hi = mid - 1;
        }
    }

    Ok(best.unwrap_or_else(|| ELLIPSIS.to_string()))
}

/// Truncate the tallest cell of a row, over and over, until every cell fits
/// `max_height` or [`ROW_FIT_ITERATIONS`] passes have run.
///
/// `widths[i]` is the text width available to `texts[i]`.
pub fn fit_row_to_height(
    canvas: &dyn DocumentCanvas,
    widths: &[f64],
    texts: &[String],
    max_height: f64,
    style: &TextStyle,
) -> Result<Vec<String>, DossierError> {
    let mut adjusted = texts.to_vec();

    for _ in 0..ROW_FIT_ITERATIONS {
        let heights = adjusted
            .iter()
            .zip(widths)
            .map(|(text, &width)| canvas.measure_height(text, width, style))
            .collect::<Result<Vec<f64>, _>>()?;

        // First index wins on ties.
        let Some((tallest, &height)) = heights
            .iter()
            .enumerate()
            .fold(None, |acc: Option<(usize, &f64)>, (i, h)| match acc {
                Some((_, best)) if *best >= *h => acc,
                _ => Some((i, h)),
            })
        else {
            break;
        };

        if height <= max_height {
            break;
        }

        debug!(
            "truncating cell {} ({:.2}pt) to fit {:.2}pt",
            tallest, height, max_height
        );
        adjusted[tallest] = fit_to_height(canvas, &adjusted[tallest], widths[tallest], max_height, style)?;
    }

    Ok(adjusted)
}
