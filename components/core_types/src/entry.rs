//! Compile entry points.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bytecode index within a method.
pub type Bci = u32;

/// Where compiled code is entered.
///
/// A standard artifact is entered on method invocation; an OSR artifact is
/// entered from a running interpreted activation at a specific bytecode
/// offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompileEntry {
    /// Normal invocation entry
    Standard,
    /// On-stack replacement entry at the given bytecode index
    Osr(Bci),
}

impl CompileEntry {
    /// Whether this is an on-stack-replacement entry
    pub fn is_osr(&self) -> bool {
        matches!(self, CompileEntry::Osr(_))
    }

    /// OSR entry offset, if any
    pub fn osr_bci(&self) -> Option<Bci> {
        match self {
            CompileEntry::Standard => None,
            CompileEntry::Osr(bci) => Some(*bci),
        }
    }
}

impl fmt::Display for CompileEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileEntry::Standard => write!(f, "bci=invocation osr=false"),
            CompileEntry::Osr(bci) => write!(f, "bci={} osr=true", bci),
        }
    }
}
