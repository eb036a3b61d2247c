//! Structured command line parsing.
//!
//! Converts a raw input line into a [`ParsedCommand`]. Only the verb is
//! case-normalized; argument tokens are sliced out of the original line so
//! hex digits keep their casing and "rest of line" arguments (patterns,
//! bookmark labels) keep their embedded whitespace. Offset tokens stay
//! textual here; resolving `+N`/`-N` needs the current page offset, which
//! is the dispatcher's business.
//!
//! Arity shortfalls classify as [`ParsedCommand::Incomplete`] and unknown
//! verbs as [`ParsedCommand::Unknown`]; both are quietly dropped at
//! dispatch. No side effects here; pure classification.

use core_bytes::{rest_of_line, split_ws};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedCommand<'a> {
    Patch { offset: &'a str, hex: &'a str },
    Label { offset: &'a str, name: &'a str },
    Goto { offset: &'a str },
    Find { hex: &'a str },
    FindNext,
    SaveTpl { name: &'a str, offset: &'a str, hex: &'a str },
    ApplyTpl { name: &'a str, offset: Option<&'a str> },
    MemPatch { pid: &'a str, addr: &'a str, hex: &'a str },
    Dump { offset: &'a str, size: &'a str },
    Disasm { offset: &'a str, size: &'a str },
    Vft { offset: &'a str, count: &'a str },
    /// A recognized verb with too few arguments.
    Incomplete,
    /// An unrecognized verb.
    Unknown,
    /// Nothing but whitespace.
    Empty,
}

pub struct CommandParser;

impl CommandParser {
    pub fn parse(line: &str) -> ParsedCommand<'_> {
        let tokens = split_ws(line);
        let Some(first) = tokens.first() else {
            return ParsedCommand::Empty;
        };
        let verb = first.to_ascii_lowercase();
        // Positional argument `i`, or bail out as Incomplete.
        macro_rules! arg {
            ($i:expr) => {
                match tokens.get($i) {
                    Some(t) => *t,
                    None => return ParsedCommand::Incomplete,
                }
            };
        }
        // Original-line suffix starting at token `i`, casing and inner
        // whitespace intact.
        macro_rules! rest {
            ($i:expr) => {
                match rest_of_line(line, $i) {
                    Some(r) => r,
                    None => return ParsedCommand::Incomplete,
                }
            };
        }
        match verb.as_str() {
            "patch" => ParsedCommand::Patch {
                offset: arg!(1),
                hex: rest!(2),
            },
            "label" => ParsedCommand::Label {
                offset: arg!(1),
                name: rest!(2),
            },
            "goto" => ParsedCommand::Goto { offset: arg!(1) },
            "find" => ParsedCommand::Find { hex: rest!(1) },
            "findnext" => ParsedCommand::FindNext,
            "savetpl" => ParsedCommand::SaveTpl {
                name: arg!(1),
                offset: arg!(2),
                hex: rest!(3),
            },
            "applytpl" => ParsedCommand::ApplyTpl {
                name: arg!(1),
                offset: tokens.get(2).copied(),
            },
            "mempatch" => ParsedCommand::MemPatch {
                pid: arg!(1),
                addr: arg!(2),
                hex: rest!(3),
            },
            "dump" => ParsedCommand::Dump {
                offset: arg!(1),
                size: arg!(2),
            },
            "disasm" => ParsedCommand::Disasm {
                offset: arg!(1),
                size: arg!(2),
            },
            "vft" => ParsedCommand::Vft {
                offset: arg!(1),
                count: arg!(2),
            },
            _ => ParsedCommand::Unknown,
        }
    }
}
