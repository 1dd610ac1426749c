use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use shell_filter_core::Editor;

/// 1-based, inclusive range of lines, written `START:END`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl FromStr for LineRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once(':')
            .ok_or_else(|| format!("expected START:END, got `{s}`"))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<usize>()
                .map_err(|e| format!("invalid line number `{part}`: {e}"))
        };
        let start = parse(start)?;
        let end = parse(end)?;
        if start == 0 {
            return Err("line numbers start at 1".to_string());
        }
        if end < start {
            return Err(format!("range end {end} is before start {start}"));
        }
        Ok(Self { start, end })
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// Whole input held in memory with one selected byte range. Plays the part of
/// the editor for the terminal host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    selection: Range<usize>,
}

impl TextBuffer {
    /// Selects all of `text` except a final line break, so the filtered
    /// output keeps the input's trailing newline.
    pub fn select_all(text: String) -> Self {
        let end = text.len() - line_break_len(&text);
        Self {
            text,
            selection: 0..end,
        }
    }

    /// Selects the given lines, without the line break that ends the last
    /// one.
    pub fn select_lines(text: String, range: LineRange) -> anyhow::Result<Self> {
        let mut offset = 0;
        let mut start = None;
        let mut end = None;
        for (idx, line) in text.split_inclusive('\n').enumerate() {
            let number = idx + 1;
            if number == range.start {
                start = Some(offset);
            }
            if number == range.end {
                end = Some(offset + line.len() - line_break_len(line));
                break;
            }
            offset += line.len();
        }

        match (start, end) {
            (Some(start), Some(end)) => Ok(Self {
                text,
                selection: start..end,
            }),
            _ => anyhow::bail!(
                "line range {range} is outside the input ({} lines)",
                text.split_inclusive('\n').count()
            ),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl Editor for TextBuffer {
    fn selected_text(&self) -> Option<&str> {
        self.text.get(self.selection.clone())
    }

    fn replace_selection(&mut self, text: &str) -> std::io::Result<()> {
        let Range { start, end } = self.selection;
        if self.text.get(start..end).is_none() {
            return Err(std::io::Error::other("selection is no longer valid"));
        }
        self.text.replace_range(start..end, text);
        self.selection = start..start + text.len();
        Ok(())
    }
}

fn line_break_len(s: &str) -> usize {
    if s.ends_with("\r\n") {
        2
    } else if s.ends_with('\n') {
        1
    } else {
        0
    }
}
