use std::time::Duration;

use log::debug;
use num_traits::ToPrimitive;

use crate::block::{parse_program, Block, Node, Root};
use crate::error::InterpretErr;
use crate::eval::{self, expect_scalar};
use crate::parser::parse;
use crate::scanner::scan;
use crate::screen::Screen;
use crate::statement::{StatementErr, Stmt};
use crate::store::VariableStore;
use crate::value::Value;

#[derive(Clone, Copy)]
struct Frame<'a> {
    block: &'a Block,
    index: usize,
}

enum Flow {
    Next,
    Stop,
    Jump(String),
}

/// Runs programs against one variable store and one screen.
///
/// Variables survive between calls to [`Interpreter::run`].
pub struct Interpreter<S: Screen> {
    store: VariableStore,
    screen: S,
}

impl<S: Screen> Interpreter<S> {
    pub fn new(screen: S) -> Self {
        Interpreter {
            store: VariableStore::new(),
            screen,
        }
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut S {
        &mut self.screen
    }

    pub fn get_var(&self, name: &str) -> Option<Value> {
        self.store.get_named(name)
    }

    /// Tokenizes, parses and evaluates one expression.
    pub fn evaluate(&self, code: &str) -> Result<Value, InterpretErr> {
        let tokens = scan(code)?;
        let postfix = parse(&tokens)?;
        Ok(eval::evaluate(&postfix, &self.store)?)
    }

    pub fn run(&mut self, source: &str) -> Result<(), InterpretErr> {
        let root = parse_program(source)?;
        self.execute(&root)
    }

    fn execute(&mut self, root: &Root) -> Result<(), InterpretErr> {
        let mut frames = vec![Frame {
            block: &root.block,
            index: 0,
        }];

        while let Some(Frame { block, index }) = frames.pop() {
            let Some(node) = block.children.get(index) else {
                continue;
            };
            if index + 1 < block.children.len() {
                frames.push(Frame {
                    block,
                    index: index + 1,
                });
            }

            match node {
                Node::Line { text, line } => match self.exec_line(text)? {
                    Flow::Next => {}
                    Flow::Stop => {
                        debug!("Stop on line {line}");
                        return Ok(());
                    }
                    Flow::Jump(label) => {
                        let target = root
                            .labels
                            .get(&label)
                            .and_then(|target| root.resolve(target))
                            .ok_or(StatementErr::UnknownLabel(label.clone()))?;
                        debug!("line {line} jumps to label {label}");
                        frames = target
                            .into_iter()
                            .map(|(block, index)| Frame { block, index })
                            .collect();
                    }
                },
                Node::IfElse(node) => {
                    let condition = expect_scalar(self.evaluate(&node.condition)?)?;
                    let branch = if !condition.is_zero() {
                        Some(&node.if_block)
                    } else {
                        node.else_block.as_ref()
                    };
                    if let Some(block) = branch {
                        frames.push(Frame { block, index: 0 });
                    }
                }
            }
        }
        Ok(())
    }

    fn exec_line(&mut self, text: &str) -> Result<Flow, InterpretErr> {
        match Stmt::parse(text)? {
            Stmt::ClrHome => self.screen.clear_home(),
            Stmt::Pause { message, seconds } => {
                if let Some(message) = message {
                    self.disp(&message)?;
                }
                match seconds {
                    Some(seconds) => {
                        let duration = self.duration(&seconds)?;
                        self.screen.sleep(duration);
                    }
                    None => self.screen.wait_for_enter()?,
                }
            }
            Stmt::Disp(args) => {
                for arg in args {
                    self.disp(&arg)?;
                }
            }
            Stmt::Output { row, col, expr } => {
                let row = self.position("Row", &row)?;
                let col = self.position("Column", &col)?;
                let text = self.evaluate(&expr)?.to_string();
                self.screen.output(row, col, &text);
            }
            Stmt::Input { prompt, target } => {
                match prompt {
                    Some(prompt) => {
                        let prompt = self.evaluate(&prompt)?.to_string();
                        self.screen.write(&prompt);
                    }
                    None => self.screen.write("?"),
                }
                let line = self.screen.read_line_non_empty()?;
                let value = self.evaluate(&line)?;
                self.store.set(&target, value)?;
            }
            Stmt::Prompt(targets) => {
                for target in targets {
                    self.screen.write(&format!("{target}=?"));
                    let line = self.screen.read_line_non_empty()?;
                    let value = self.evaluate(&line)?;
                    self.store.set(&target, value)?;
                }
            }
            Stmt::Menu { title, options } => {
                let title = self.evaluate(&title)?.to_string();
                let texts = options
                    .iter()
                    .map(|(text, _)| self.evaluate(text).map(|v| v.to_string()))
                    .collect::<Result<Vec<_>, _>>()?;
                let choice = self.screen.menu(&title, &texts)?;
                let (_, label) = options
                    .into_iter()
                    .nth(choice)
                    .ok_or(StatementErr::BadChoice(choice))?;
                return Ok(Flow::Jump(label));
            }
            Stmt::Stop => return Ok(Flow::Stop),
            Stmt::Store { expr, target } => {
                // Evaluate before touching the store so a failure leaves it intact.
                let value = self.evaluate(&expr)?;
                self.store.set(&target, value)?;
            }
        }
        Ok(Flow::Next)
    }

    fn disp(&mut self, arg: &str) -> Result<(), InterpretErr> {
        if arg.is_empty() {
            self.screen.write_line("");
        } else {
            let text = self.evaluate(arg)?.to_string();
            self.screen.write_line(&text);
        }
        Ok(())
    }

    fn position(&self, what: &'static str, code: &str) -> Result<usize, InterpretErr> {
        let n = expect_scalar(self.evaluate(code)?)?;
        n.to_integer()
            .and_then(|i| i.to_usize())
            .filter(|i| *i >= 1)
            .ok_or_else(|| StatementErr::BadPosition(what, n.to_string()).into())
    }

    fn duration(&self, code: &str) -> Result<Duration, InterpretErr> {
        let seconds = expect_scalar(self.evaluate(code)?)?.to_f64();
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(StatementErr::BadDuration(seconds.to_string()).into());
        }
        Ok(Duration::from_millis((seconds * 1000.0).round() as u64))
    }
}
