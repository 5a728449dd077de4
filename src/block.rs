use log::debug;
use rustc_hash::FxHashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BlockErrType {
    #[error("'{0}' without an open If")]
    NoOpenIf(&'static str),
    #[error("Duplicate '{0}'")]
    Duplicate(&'static str),
    #[error("'Then' after the If already has its line")]
    ThenAfterLine,
    #[error("Label '{0}' defined twice")]
    DuplicateLabel(String),
    #[error("Invalid label name '{0}'")]
    BadLabel(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("Line {line}: {data}.")]
pub struct BlockErr {
    pub line: usize,
    pub data: BlockErrType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Line { text: String, line: usize },
    IfElse(IfElse),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfElse {
    pub condition: String,
    pub line: usize,
    pub if_block: Block,
    pub else_block: Option<Block>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub children: Vec<Node>,
}

// Nested blocks are released from a work list so dropping a deep tree does
// not recurse once per level.
impl Drop for Block {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(node) = pending.pop() {
            if let Node::IfElse(mut node) = node {
                pending.append(&mut node.if_block.children);
                if let Some(mut block) = node.else_block.take() {
                    pending.append(&mut block.children);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    If,
    Else,
}

/// One `If` around a label: where it sits in its parent block and which of
/// its branches holds the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enclosing {
    pub index: usize,
    pub branch: Branch,
}

/// Where a `Lbl` was defined, outermost `If` first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelTarget {
    pub enclosing: Vec<Enclosing>,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Root {
    pub block: Block,
    pub labels: FxHashMap<String, LabelTarget>,
}

impl Root {
    /// Walks a label's path down the tree and returns the blocks it passes
    /// through, each paired with the index execution resumes at in it.
    pub fn resolve<'a>(&'a self, target: &LabelTarget) -> Option<Vec<(&'a Block, usize)>> {
        let mut frames = vec![];
        let mut block = &self.block;
        for enclosing in &target.enclosing {
            frames.push((block, enclosing.index + 1));
            let Some(Node::IfElse(node)) = block.children.get(enclosing.index) else {
                return None;
            };
            block = match enclosing.branch {
                Branch::If => &node.if_block,
                Branch::Else => node.else_block.as_ref()?,
            };
        }
        frames.push((block, target.position));
        Some(frames)
    }
}

struct OpenIf {
    node: IfElse,
    index: usize,
    seen_then: bool,
    seen_else: bool,
    parsed_block: bool,
    /// The if-block was opened with `Then`, so the else-block runs to `End`.
    long_else: bool,
}

impl OpenIf {
    // A Then-less branch owns exactly one line.
    fn is_stale(&self) -> bool {
        !self.seen_then && !self.long_else && self.parsed_block
    }

    fn active(&mut self) -> &mut Block {
        match self.node.else_block {
            Some(ref mut block) if self.seen_else => block,
            _ => &mut self.node.if_block,
        }
    }

    fn branch(&self) -> Branch {
        if self.seen_else {
            Branch::Else
        } else {
            Branch::If
        }
    }
}

struct BlockParser {
    root: Block,
    open: Vec<OpenIf>,
    labels: FxHashMap<String, LabelTarget>,
    line: usize,
}

impl BlockParser {
    fn error(&self, data: BlockErrType) -> BlockErr {
        BlockErr {
            line: self.line,
            data,
        }
    }

    fn active(&mut self) -> &mut Block {
        match self.open.last_mut() {
            Some(top) => top.active(),
            None => &mut self.root,
        }
    }

    fn close_top(&mut self) -> bool {
        let Some(done) = self.open.pop() else {
            return false;
        };
        self.active().children.push(Node::IfElse(done.node));
        true
    }

    fn close_stale(&mut self) {
        while self.open.last().is_some_and(OpenIf::is_stale) {
            self.close_top();
        }
    }

    fn mark_parsed(&mut self) {
        if let Some(top) = self.open.last_mut() {
            top.parsed_block = true;
        }
    }

    fn line(&mut self, text: &str) -> Result<(), BlockErr> {
        match text {
            "Then" => self.then(),
            "Else" => self.else_(),
            "End" => {
                // A Then-less If with an Else may still be closed by End.
                while self.open.last().is_some_and(|top| top.is_stale() && !top.seen_else) {
                    self.close_top();
                }
                if self.close_top() {
                    Ok(())
                } else {
                    Err(self.error(BlockErrType::NoOpenIf("End")))
                }
            }
            _ => {
                if let Some(condition) = keyword_arg(text, "If") {
                    self.close_stale();
                    self.mark_parsed();
                    let index = self.active().children.len();
                    self.open.push(OpenIf {
                        node: IfElse {
                            condition: condition.to_string(),
                            line: self.line,
                            if_block: Block::default(),
                            else_block: None,
                        },
                        index,
                        seen_then: false,
                        seen_else: false,
                        parsed_block: false,
                        long_else: false,
                    });
                    Ok(())
                } else if let Some(name) = keyword_arg(text, "Lbl") {
                    self.label(name)
                } else {
                    self.close_stale();
                    self.mark_parsed();
                    let line = self.line;
                    self.active().children.push(Node::Line {
                        text: text.to_string(),
                        line,
                    });
                    Ok(())
                }
            }
        }
    }

    fn then(&mut self) -> Result<(), BlockErr> {
        let line = self.line;
        let Some(top) = self.open.last_mut() else {
            return Err(BlockErr {
                line,
                data: BlockErrType::NoOpenIf("Then"),
            });
        };
        let err = if top.seen_then {
            BlockErrType::Duplicate("Then")
        } else if top.parsed_block {
            BlockErrType::ThenAfterLine
        } else {
            top.seen_then = true;
            return Ok(());
        };
        Err(self.error(err))
    }

    fn else_(&mut self) -> Result<(), BlockErr> {
        // A Then-less If that already ran its else line cannot take another Else.
        while self.open.last().is_some_and(|top| top.is_stale() && top.seen_else) {
            self.close_top();
        }
        let line = self.line;
        let error = |data| Err(BlockErr { line, data });
        let Some(top) = self.open.last_mut() else {
            return error(BlockErrType::NoOpenIf("Else"));
        };
        if top.seen_else {
            return error(BlockErrType::Duplicate("Else"));
        }
        top.seen_else = true;
        top.long_else = top.seen_then;
        top.seen_then = false;
        top.parsed_block = false;
        top.node.else_block = Some(Block::default());
        Ok(())
    }

    fn label(&mut self, name: &str) -> Result<(), BlockErr> {
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(self.error(BlockErrType::BadLabel(name.to_string())));
        }
        if self.labels.contains_key(name) {
            return Err(self.error(BlockErrType::DuplicateLabel(name.to_string())));
        }
        self.close_stale();

        let enclosing = self
            .open
            .iter()
            .map(|open| Enclosing {
                index: open.index,
                branch: open.branch(),
            })
            .collect();
        let position = self.active().children.len();
        debug!("label {name} at line {}", self.line);
        self.labels.insert(
            name.to_string(),
            LabelTarget {
                enclosing,
                position,
            },
        );
        Ok(())
    }

    fn finish(mut self) -> Root {
        while self.close_top() {}
        Root {
            block: self.root,
            labels: self.labels,
        }
    }
}

/// `If`, `If cond` and `If(cond)` all carry their argument after the keyword.
fn keyword_arg<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(keyword)?;
    if rest.is_empty() || rest.starts_with(' ') || rest.starts_with('(') {
        Some(rest.trim())
    } else {
        None
    }
}

/// Builds the block tree and label table for a whole program.
///
/// Lines are trimmed, a single leading `:` is dropped and blank lines are
/// skipped. Line numbers in errors are 1-based and count blank lines.
pub fn parse_program(source: &str) -> Result<Root, BlockErr> {
    let mut parser = BlockParser {
        root: Block::default(),
        open: vec![],
        labels: FxHashMap::default(),
        line: 0,
    };

    for (number, raw) in source.lines().enumerate() {
        parser.line = number + 1;
        let text = raw.trim();
        let text = text.strip_prefix(':').unwrap_or(text).trim();
        if text.is_empty() {
            continue;
        }
        parser.line(text)?;
    }

    Ok(parser.finish())
}
