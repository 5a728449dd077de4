use std::{collections::VecDeque, io, thread, time::Duration};

/// Everything a running program can do to the outside world.
pub trait Screen {
    fn clear_home(&mut self);
    fn write(&mut self, text: &str);
    fn write_line(&mut self, text: &str);
    /// Writes `text` at a 1-based row and column.
    fn output(&mut self, row: usize, col: usize, text: &str);
    /// Shows a menu and returns the index of the chosen option.
    fn menu(&mut self, title: &str, options: &[String]) -> io::Result<usize>;
    /// Blocks until the user enters a line with something on it.
    fn read_line_non_empty(&mut self) -> io::Result<String>;
    fn wait_for_enter(&mut self) -> io::Result<()>;

    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    pub text: String,
}

/// A screen that replays queued input and records what the program shows.
#[derive(Debug, Default)]
pub struct ScriptedScreen {
    inputs: VecDeque<String>,
    choices: VecDeque<usize>,
    enters: usize,
    /// Text written through `write`/`write_line`, one entry per finished line.
    pub lines: Vec<String>,
    pending: String,
    pub cells: Vec<Cell>,
    pub menus: Vec<(String, Vec<String>)>,
    pub sleeps: Vec<Duration>,
    pub clears: usize,
}

fn exhausted(what: &str) -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, format!("script has no more {what}"))
}

impl ScriptedScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.extend(inputs.into_iter().map(Into::into));
        self
    }

    pub fn with_choices(mut self, choices: impl IntoIterator<Item = usize>) -> Self {
        self.choices.extend(choices);
        self
    }

    /// Allows `n` more `Pause` statements to wait for Enter.
    pub fn with_enters(mut self, n: usize) -> Self {
        self.enters += n;
        self
    }
}

impl Screen for ScriptedScreen {
    fn clear_home(&mut self) {
        self.clears += 1;
        self.lines.clear();
        self.pending.clear();
        self.cells.clear();
    }

    fn write(&mut self, text: &str) {
        self.pending.push_str(text);
    }

    fn write_line(&mut self, text: &str) {
        self.pending.push_str(text);
        self.lines.push(std::mem::take(&mut self.pending));
    }

    fn output(&mut self, row: usize, col: usize, text: &str) {
        self.cells.push(Cell {
            row,
            col,
            text: text.to_string(),
        });
    }

    fn menu(&mut self, title: &str, options: &[String]) -> io::Result<usize> {
        self.menus.push((title.to_string(), options.to_vec()));
        self.choices.pop_front().ok_or_else(|| exhausted("menu choices"))
    }

    fn read_line_non_empty(&mut self) -> io::Result<String> {
        loop {
            let line = self.inputs.pop_front().ok_or_else(|| exhausted("input"))?;
            if !line.is_empty() {
                // The typed line echoes like a terminal would.
                self.write_line(&line);
                return Ok(line);
            }
        }
    }

    fn wait_for_enter(&mut self) -> io::Result<()> {
        if self.enters == 0 {
            return Err(exhausted("Enter presses"));
        }
        self.enters -= 1;
        Ok(())
    }

    fn sleep(&mut self, duration: Duration) {
        self.sleeps.push(duration);
    }
}
