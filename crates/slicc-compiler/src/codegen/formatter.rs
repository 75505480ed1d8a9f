const INDENT: &str = "    ";

/// Append-only line accumulator with indentation tracking
#[derive(Debug, Default)]
pub struct CodeFormatter {
    lines: Vec<String>,
    indent: usize,
}

impl CodeFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line at the current indentation
    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines
                .push(format!("{}{}", INDENT.repeat(self.indent), text));
        }
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Consume the formatter; every line is newline-terminated
    pub fn finish(self) -> String {
        self.lines
            .into_iter()
            .map(|line| line + "\n")
            .collect()
    }
}
