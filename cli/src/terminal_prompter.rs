use std::io::BufRead;
use std::io::Write;

use owo_colors::OwoColorize;
use owo_colors::Style;
use shell_filter_core::Prompter;
use shell_filter_core::picker::InputBoxRequest;
use shell_filter_core::picker::QuickPickItem;

/// Line-oriented stand-in for an editor's input box and quick pick.
///
/// An empty answer or end of input dismisses the prompt. In the quick pick a
/// number selects an entry and any other text narrows the list to entries
/// containing it.
pub struct TerminalPrompter<R, W> {
    reader: R,
    writer: W,
    color: bool,
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(reader: R, writer: W, color: bool) -> Self {
        Self {
            reader,
            writer,
            color,
        }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.color {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }

    /// Reads one answer, trimmed. `None` at end of input or on a read error.
    fn read_answer(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()),
            Err(e) => {
                tracing::warn!("failed to read answer: {e}");
                None
            }
        }
    }

    fn write_prompt(&mut self, text: &str) -> Option<()> {
        let result = write!(self.writer, "{text}").and_then(|()| self.writer.flush());
        if let Err(e) = result {
            tracing::warn!("failed to write prompt: {e}");
            return None;
        }
        Some(())
    }

    fn render_items(&self, items: &[QuickPickItem], visible: &[usize]) -> String {
        let mut rendered = String::new();
        for &idx in visible {
            let item = &items[idx];
            let number = self.paint(&format!("{:>3}", idx + 1), Style::new().bold());
            rendered.push_str(&format!("{number}) {}", item.label));
            if !item.description.is_empty() {
                let description = self.paint(&item.description, Style::new().dimmed());
                rendered.push_str(&format!("  {description}"));
            }
            rendered.push('\n');
        }
        rendered
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn input_box(&mut self, request: InputBoxRequest<'_>) -> Option<String> {
        let mut prompt = self.paint(request.prompt, Style::new().bold());
        if let Some(placeholder) = request.placeholder {
            prompt.push_str(&format!(
                " {}",
                self.paint(&format!("({placeholder})"), Style::new().dimmed())
            ));
        }
        if let Some(value) = request.value {
            prompt.push_str(&format!(" [{value}]"));
        }
        prompt.push_str(": ");
        self.write_prompt(&prompt)?;

        let answer = self.read_answer()?;
        match (answer.is_empty(), request.value) {
            // An empty answer accepts the pre-filled text.
            (true, Some(value)) => Some(value.to_string()),
            (true, None) => None,
            (false, _) => Some(answer),
        }
    }

    fn quick_pick(&mut self, items: &[QuickPickItem], placeholder: &str) -> Option<usize> {
        let mut visible: Vec<usize> = (0..items.len()).collect();
        loop {
            let listing = self.render_items(items, &visible);
            let header = self.paint(placeholder, Style::new().dimmed());
            self.write_prompt(&format!("{header}\n{listing}> "))?;

            let answer = self.read_answer()?;
            if answer.is_empty() {
                return None;
            }

            if let Ok(number) = answer.parse::<usize>() {
                if (1..=items.len()).contains(&number) {
                    return Some(number - 1);
                }
                self.write_prompt(&format!("no entry numbered {number}\n"))?;
                continue;
            }

            let matches: Vec<usize> = visible
                .iter()
                .copied()
                .filter(|&idx| items[idx].label.contains(answer.as_str()))
                .collect();
            match matches.as_slice() {
                [] => {
                    self.write_prompt(&format!("no entries match `{answer}`\n"))?;
                    visible = (0..items.len()).collect();
                }
                [only] => return Some(*only),
                _ => visible = matches,
            }
        }
    }
}
