use std::{
    env::args_os,
    error::Error,
    fs,
    io::{self, stdin, stdout, IsTerminal, Write},
    path::Path,
    process::ExitCode,
};

use log::info;
use rustyline::error::ReadlineError;
use rustyline::validate::MatchingBracketValidator;
use rustyline::{Completer, DefaultEditor, Editor, Helper, Highlighter, Hinter, Validator};

use tibasic::error::InterpretErr;
use tibasic::interpreter::Interpreter;
use tibasic::screen::Screen;
use tibasic::statement::StatementErr;

fn main() -> ExitCode {
    env_logger::init();

    if args_os().len() > 2 {
        eprintln!("usage: tibasic [file]");
        return ExitCode::FAILURE;
    }

    let result = match args_os().nth(1) {
        Some(arg) => run_file(Path::new(&arg)),
        None => run_prompt(),
    };
    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_file(path: &Path) -> Result<ExitCode, Box<dyn Error>> {
    let content = fs::read_to_string(path)?;
    info!("running {}", path.display());
    run_program(&content)
}

fn run_program(program: &str) -> Result<ExitCode, Box<dyn Error>> {
    let mut interpreter = Interpreter::new(ConsoleScreen::new()?);
    Ok(match interpreter.run(program) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            interpreter.screen_mut().flush();
            println!("error: {err}");
            ExitCode::FAILURE
        }
    })
}

/// Terminal screen: ANSI escapes for placement, rustyline for input.
struct ConsoleScreen {
    editor: DefaultEditor,
    // Text written on the current line, shown again as the input prompt.
    pending: String,
}

impl ConsoleScreen {
    fn new() -> rustyline::Result<Self> {
        Ok(ConsoleScreen {
            editor: DefaultEditor::new()?,
            pending: String::new(),
        })
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            print!("{}", std::mem::take(&mut self.pending));
        }
        let _ = stdout().flush();
    }

    fn read_line(&mut self) -> io::Result<String> {
        let prompt = std::mem::take(&mut self.pending);
        match self.editor.readline(&prompt) {
            Ok(line) => Ok(line),
            Err(ReadlineError::Io(err)) => Err(err),
            Err(ReadlineError::Eof) => Err(io::ErrorKind::UnexpectedEof.into()),
            Err(ReadlineError::Interrupted) => Err(io::ErrorKind::Interrupted.into()),
            Err(err) => Err(io::Error::other(err)),
        }
    }
}

impl Screen for ConsoleScreen {
    fn clear_home(&mut self) {
        self.pending.clear();
        print!("\x1b[2J\x1b[H");
        let _ = stdout().flush();
    }

    fn write(&mut self, text: &str) {
        self.pending.push_str(text);
    }

    fn write_line(&mut self, text: &str) {
        self.flush();
        println!("{text}");
    }

    fn output(&mut self, row: usize, col: usize, text: &str) {
        self.flush();
        print!("\x1b[{row};{col}H{text}");
        let _ = stdout().flush();
    }

    fn menu(&mut self, title: &str, options: &[String]) -> io::Result<usize> {
        self.write_line(title);
        for (i, option) in options.iter().enumerate() {
            self.write_line(&format!("{}:{option}", i + 1));
        }
        loop {
            self.write("> ");
            let choice = self.read_line()?;
            match choice.trim().parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(n - 1),
                _ => continue,
            }
        }
    }

    fn read_line_non_empty(&mut self) -> io::Result<String> {
        let prompt = self.pending.clone();
        loop {
            let line = self.read_line()?;
            if !line.is_empty() {
                return Ok(line);
            }
            self.pending.clone_from(&prompt);
        }
    }

    fn wait_for_enter(&mut self) -> io::Result<()> {
        self.read_line().map(|_| ())
    }
}

#[derive(Helper, Completer, Hinter, Highlighter, Validator)]
struct ReplHelper {
    #[rustyline(Completer)]
    completer: (),
    #[rustyline(Validator)]
    validator: MatchingBracketValidator,
}

fn run_prompt() -> Result<ExitCode, Box<dyn Error>> {
    if !stdin().is_terminal() {
        let program = io::read_to_string(stdin().lock())?;
        return run_program(&program);
    }

    let mut interpreter = Interpreter::new(ConsoleScreen::new()?);
    let mut rl = Editor::new()?;
    rl.set_helper(Some(ReplHelper {
        completer: (),
        validator: MatchingBracketValidator::new(),
    }));

    loop {
        match rl.readline("> ") {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                repl_line(&mut interpreter, line.trim());
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                return Ok(ExitCode::SUCCESS)
            }
            Err(err) => return Err(Box::new(err)),
        }
    }
}

// A line that is not a statement is shown as an expression result.
fn repl_line(interpreter: &mut Interpreter<ConsoleScreen>, line: &str) {
    let result = match interpreter.run(line) {
        Err(InterpretErr::Statement(StatementErr::Unknown(_))) => interpreter
            .evaluate(line)
            .map(|value| interpreter.screen_mut().write_line(&value.to_string())),
        other => other,
    };
    if let Err(err) = result {
        interpreter.screen_mut().write_line(&format!("error: {err}"));
    }
}
