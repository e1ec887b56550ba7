//! # Text Layout
//!
//! Line breaking and height measurement for table cells and flowing text.
//!
//! Greedy breaking at UAX#14 opportunities, with a forced break mid-word
//! when a single word is wider than the column. Widths come from the
//! standard-font AFM tables in [`crate::font`].

use crate::font::FontContext;
use crate::style::FontFace;
use unicode_linebreak::{linebreaks, BreakOpportunity};

/// A line of text after line-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokenLine {
    /// The text on this line, without trailing whitespace or newlines.
    pub text: String,
    /// Width of `text` in points.
    pub width: f64,
}

/// UAX#14 break opportunities, one entry per char: the break allowed
/// *before* that char, if any. The first entry is always `None`.
fn break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    // `linebreaks` reports the byte offset of the char following each break.
    let mut breaks = linebreaks(text).peekable();
    text.char_indices()
        .map(|(offset, _)| {
            while breaks.next_if(|(at, _)| *at < offset).is_some() {}
            breaks.next_if(|(at, _)| *at == offset).map(|(_, opp)| opp)
        })
        .collect()
}

fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextLayout;

impl TextLayout {
    pub fn new() -> Self {
        Self
    }

    /// Break a string into lines that fit within `max_width`.
    ///
    /// Empty text produces no lines. Trailing whitespace may hang past
    /// `max_width`; it never forces a break.
    pub fn break_into_lines(
        &self,
        font_context: &FontContext,
        text: &str,
        max_width: f64,
        face: FontFace,
        font_size: f64,
    ) -> Vec<BrokenLine> {
        if text.is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = text.chars().collect();
        let char_widths: Vec<f64> = chars
            .iter()
            .map(|&ch| {
                if is_line_terminator(ch) {
                    0.0
                } else {
                    font_context.char_width(ch, face, font_size)
                }
            })
            .collect();
        let break_opps = break_opportunities(text);

        let mut lines = Vec::new();
        let mut line_start = 0;
        let mut line_width = 0.0;
        let mut last_break_point: Option<usize> = None;

        for (i, &ch) in chars.iter().enumerate() {
            if i > 0 {
                match break_opps[i] {
                    Some(BreakOpportunity::Mandatory) => {
                        lines.push(self.make_line(font_context, &chars[line_start..i], face, font_size));
                        line_start = i;
                        line_width = 0.0;
                        last_break_point = None;
                    }
                    Some(BreakOpportunity::Allowed) => {
                        // The break is after char[i-1].
                        last_break_point = Some(i - 1);
                    }
                    None => {}
                }
            }

            if is_line_terminator(ch) {
                continue;
            }

            let char_width = char_widths[i];
            if line_width + char_width > max_width && line_start < i && !ch.is_whitespace() {
                if let Some(bp) = last_break_point.filter(|bp| *bp >= line_start) {
                    lines.push(self.make_line(font_context, &chars[line_start..=bp], face, font_size));
                    line_start = bp + 1;
                    line_width = char_widths[line_start..=i].iter().sum();
                    last_break_point = None;
                    continue;
                }

                // No break opportunity on this line: split the word here.
                lines.push(self.make_line(font_context, &chars[line_start..i], face, font_size));
                line_start = i;
                line_width = char_width;
                last_break_point = None;
                continue;
            }

            line_width += char_width;
        }

        if line_start < chars.len() {
            lines.push(self.make_line(font_context, &chars[line_start..], face, font_size));
        }

        lines
    }

    /// Height of `text` wrapped at `max_width`: line count times line height.
    pub fn measure_height(
        &self,
        font_context: &FontContext,
        text: &str,
        max_width: f64,
        face: FontFace,
        font_size: f64,
    ) -> f64 {
        let lines = self.break_into_lines(font_context, text, max_width, face, font_size);
        lines.len() as f64 * font_context.line_height(face, font_size)
    }

    fn make_line(
        &self,
        font_context: &FontContext,
        chars: &[char],
        face: FontFace,
        font_size: f64,
    ) -> BrokenLine {
        let raw: String = chars.iter().filter(|c| !is_line_terminator(**c)).collect();
        let text = raw.trim_end().to_string();
        let width = font_context.measure_string(&text, face, font_size);
        BrokenLine { text, width }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::FontFamily;

    fn ctx() -> FontContext {
        FontContext::new(FontFamily::Helvetica)
    }

    #[test]
    fn break_opportunities_sit_before_the_next_word() {
        let opps = break_opportunities("ab cd");
        assert_eq!(opps.len(), 5);
        assert_eq!(opps[0], None);
        assert_eq!(opps[3], Some(BreakOpportunity::Allowed));
        assert!(opps.iter().enumerate().all(|(i, o)| i == 3 || o.is_none()));
    }

    #[test]
    fn break_opportunities_index_by_char_not_byte() {
        // 'é' is two bytes; the break before the second word is char 2.
        let opps = break_opportunities("é é\nx");
        assert_eq!(opps.len(), 5);
        assert_eq!(opps[2], Some(BreakOpportunity::Allowed));
        assert_eq!(opps[4], Some(BreakOpportunity::Mandatory));
    }

    #[test]
    fn empty_text_has_no_lines() {
        let tl = TextLayout::new();
        assert!(tl.break_into_lines(&ctx(), "", 100.0, FontFace::Regular, 8.0).is_empty());
        assert_eq!(tl.measure_height(&ctx(), "", 100.0, FontFace::Regular, 8.0), 0.0);
    }

    #[test]
    fn short_text_is_one_line() {
        let tl = TextLayout::new();
        let lines = tl.break_into_lines(&ctx(), "Hello world", 200.0, FontFace::Regular, 8.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Hello world");
    }

    #[test]
    fn wraps_at_word_boundaries() {
        let tl = TextLayout::new();
        // "Hello " is ~22pt at 8pt Helvetica; 30pt fits one word per line.
        let lines = tl.break_into_lines(&ctx(), "Hello world again", 30.0, FontFace::Regular, 8.0);
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["Hello", "world", "again"]);
        for line in &lines {
            assert!(line.width <= 30.0);
        }
    }

    #[test]
    fn long_word_is_split() {
        let tl = TextLayout::new();
        let word = "x".repeat(100);
        let lines = tl.break_into_lines(&ctx(), &word, 40.0, FontFace::Regular, 8.0);
        assert!(lines.len() > 1);
        let rejoined: String = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(rejoined, word);
    }

    #[test]
    fn newlines_force_breaks() {
        let tl = TextLayout::new();
        let lines = tl.break_into_lines(&ctx(), "one\ntwo\r\nthree", 500.0, FontFace::Regular, 8.0);
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn height_grows_with_text_length() {
        let tl = TextLayout::new();
        let base = "lorem ipsum dolor sit amet ".repeat(40);
        let mut previous = 0.0;
        for len in (0..base.len()).step_by(37) {
            let h = tl.measure_height(&ctx(), &base[..len], 120.0, FontFace::Regular, 8.0);
            assert!(h >= previous, "height shrank at prefix {}", len);
            previous = h;
        }
    }
}
