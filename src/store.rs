use std::fmt;

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use rustc_hash::FxHashMap;

use crate::eval::EvalErr;
use crate::number::Number;
use crate::value::Value;

pub const THETA: char = 'θ';
pub const LIST_SIGIL: char = 'ʟ';
pub const STR_PREFIX: &str = "Str";
pub const MAX_LIST_NAME: usize = 5;

const STRING_SLOTS: usize = 10;
const SUBSCRIPTS: [char; 7] = ['₀', '₁', '₂', '₃', '₄', '₅', '₆'];

/// The six lists every calculator has, `L₁` through `L₆`.
#[repr(u8)]
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListSlot {
    L1 = 1,
    L2,
    L3,
    L4,
    L5,
    L6,
}

impl ListSlot {
    /// Accepts both the subscript glyphs and plain ASCII digits.
    pub fn from_digit(c: char) -> Option<Self> {
        let id = match c {
            '1'..='6' => c as u32 - '0' as u32,
            '₁'..='₆' => c as u32 - '₀' as u32,
            _ => return None,
        };
        Self::from_u32(id)
    }

    pub fn id(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListName {
    Builtin(ListSlot),
    User(String),
}

impl ListName {
    pub fn is_valid_user_name(name: &str) -> bool {
        (1..=MAX_LIST_NAME).contains(&name.chars().count())
            && name.chars().all(|c| c.is_ascii_uppercase())
    }
}

impl fmt::Display for ListName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(slot) => write!(f, "L{}", SUBSCRIPTS[slot.id() as usize]),
            Self::User(name) => write!(f, "{LIST_SIGIL}{name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VarName {
    Real(char),
    Str(u8),
    List(ListName),
}

impl VarName {
    /// Resolves written variable text to its namespace.
    ///
    /// Besides the canonical forms produced by the scanner this also accepts a
    /// bare name of two to five letters as a user list, which is how list
    /// names are usually written as store targets.
    pub fn parse(name: &str) -> Option<VarName> {
        let chars = name.chars().collect::<Vec<_>>();
        match chars.as_slice() {
            [c] if c.is_ascii_uppercase() || *c == THETA => Some(VarName::Real(*c)),
            ['S', 't', 'r', d] => d
                .to_digit(10)
                .map(|d| VarName::Str(d as u8)),
            ['L', d] if ListSlot::from_digit(*d).is_some() => {
                ListSlot::from_digit(*d).map(|slot| VarName::List(ListName::Builtin(slot)))
            }
            [LIST_SIGIL, rest @ ..] => {
                let rest = rest.iter().collect::<String>();
                ListName::is_valid_user_name(&rest).then(|| VarName::List(ListName::User(rest)))
            }
            _ if chars.len() > 1 && !name.starts_with(STR_PREFIX) => ListName::is_valid_user_name(name)
                .then(|| VarName::List(ListName::User(name.to_string()))),
            _ => None,
        }
    }
}

impl fmt::Display for VarName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real(c) => write!(f, "{c}"),
            Self::Str(id) => write!(f, "{STR_PREFIX}{id}"),
            Self::List(list) => write!(f, "{list}"),
        }
    }
}

/// Owns every variable of a program run.
#[derive(Debug)]
pub struct VariableStore {
    reals: FxHashMap<char, Number>,
    strings: [Option<String>; STRING_SLOTS],
    lists: FxHashMap<ListName, Vec<Number>>,
}

impl Default for VariableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VariableStore {
    pub fn new() -> Self {
        let reals = ('A'..='Z')
            .chain([THETA])
            .map(|c| (c, Number::zero()))
            .collect();
        VariableStore {
            reals,
            strings: Default::default(),
            lists: Default::default(),
        }
    }

    pub fn get(&self, name: &VarName) -> Option<Value> {
        match name {
            VarName::Real(c) => self.reals.get(c).cloned().map(Value::Scalar),
            VarName::Str(id) => self
                .strings
                .get(*id as usize)
                .and_then(Clone::clone)
                .map(Value::Text),
            VarName::List(list) => self.lists.get(list).cloned().map(Value::List),
        }
    }

    /// Stores `value`, which must be of the kind the namespace holds.
    pub fn set(&mut self, name: &VarName, value: Value) -> Result<(), EvalErr> {
        match (name, value) {
            (VarName::Real(c), Value::Scalar(n)) if self.reals.contains_key(c) => {
                self.reals.insert(*c, n);
            }
            (VarName::Str(id), Value::Text(text)) if (*id as usize) < STRING_SLOTS => {
                self.strings[*id as usize] = Some(text);
            }
            (VarName::List(list), Value::List(items)) => {
                self.lists.insert(list.clone(), items);
            }
            (name, value) => {
                return Err(EvalErr::TypeMismatch {
                    name: name.to_string(),
                    found: value.kind(),
                })
            }
        }
        Ok(())
    }

    pub fn get_named(&self, name: &str) -> Option<Value> {
        VarName::parse(name).and_then(|name| self.get(&name))
    }
}
