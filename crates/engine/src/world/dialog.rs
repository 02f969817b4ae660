/// A modal dialog: a list of lines shown one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    lines: Vec<String>,
    line: usize,
    finished: bool,
}

impl Dialog {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        let finished = lines.is_empty();
        Self {
            lines,
            line: 0,
            finished,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn current_line(&self) -> Option<&str> {
        if self.finished {
            return None;
        }
        self.lines.get(self.line).map(String::as_str)
    }

    /// Zero-based index of the line on screen and the total line count.
    pub fn progress(&self) -> (usize, usize) {
        (self.line, self.lines.len())
    }

    /// Moves to the next line; past the last line the dialog is finished.
    pub fn advance(&mut self) {
        if self.finished {
            return;
        }
        self.line += 1;
        if self.line >= self.lines.len() {
            self.finished = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_walks_lines_then_finishes() {
        let mut dialog = Dialog::new(["hello", "bye"]);
        assert_eq!(dialog.current_line(), Some("hello"));
        dialog.advance();
        assert_eq!(dialog.current_line(), Some("bye"));
        assert!(!dialog.is_finished());
        dialog.advance();
        assert!(dialog.is_finished());
        assert_eq!(dialog.current_line(), None);
        dialog.advance();
        assert_eq!(dialog.progress(), (2, 2));
    }

    #[test]
    fn empty_dialog_starts_finished() {
        let dialog = Dialog::new(Vec::<String>::new());
        assert!(dialog.is_finished());
    }
}
