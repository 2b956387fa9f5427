//! Contract functions the faucet screen can invoke

use std::fmt;

use serde::Deserialize;

/// Data-less function choice backing the dropdown.
///
/// Deserializes from the Solidity name, as written in the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
pub enum FunctionKind {
    #[default]
    #[serde(rename = "gm")]
    Gm,
    #[serde(rename = "faucet")]
    Faucet,
    #[serde(rename = "drip")]
    Drip,
    #[serde(rename = "claim")]
    Claim,
    #[serde(rename = "setGreeting")]
    SetGreeting,
}

impl FunctionKind {
    pub const ALL: [FunctionKind; 5] = [
        FunctionKind::Gm,
        FunctionKind::Faucet,
        FunctionKind::Drip,
        FunctionKind::Claim,
        FunctionKind::SetGreeting,
    ];

    /// Solidity function name
    pub fn name(&self) -> &'static str {
        match self {
            FunctionKind::Gm => "gm",
            FunctionKind::Faucet => "faucet",
            FunctionKind::Drip => "drip",
            FunctionKind::Claim => "claim",
            FunctionKind::SetGreeting => "setGreeting",
        }
    }

    /// Dropdown label
    pub fn label(&self) -> &'static str {
        match self {
            FunctionKind::Gm => "gm()",
            FunctionKind::Faucet => "faucet()",
            FunctionKind::Drip => "drip()",
            FunctionKind::Claim => "claim()",
            FunctionKind::SetGreeting => "setGreeting(string)",
        }
    }

    pub fn takes_argument(&self) -> bool {
        matches!(self, FunctionKind::SetGreeting)
    }

    /// Next option in the dropdown, wrapping around
    pub fn cycle(&self, forward: bool) -> Self {
        let len = Self::ALL.len();
        let idx = Self::ALL.iter().position(|kind| kind == self).unwrap_or(0);
        let next = if forward {
            (idx + 1) % len
        } else {
            (idx + len - 1) % len
        };
        Self::ALL[next]
    }

    /// Bind the argument buffer, which is only consulted for `setGreeting`
    pub fn with_argument(&self, argument: &str) -> FunctionSelector {
        match self {
            FunctionKind::Gm => FunctionSelector::Gm,
            FunctionKind::Faucet => FunctionSelector::Faucet,
            FunctionKind::Drip => FunctionSelector::Drip,
            FunctionKind::Claim => FunctionSelector::Claim,
            FunctionKind::SetGreeting => FunctionSelector::SetGreeting(argument.to_string()),
        }
    }
}

/// A fully specified call: the greeting travels with its variant, so a
/// zero-argument function can never carry one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FunctionSelector {
    Gm,
    Faucet,
    Drip,
    Claim,
    SetGreeting(String),
}

impl FunctionSelector {
    pub fn kind(&self) -> FunctionKind {
        match self {
            FunctionSelector::Gm => FunctionKind::Gm,
            FunctionSelector::Faucet => FunctionKind::Faucet,
            FunctionSelector::Drip => FunctionKind::Drip,
            FunctionSelector::Claim => FunctionKind::Claim,
            FunctionSelector::SetGreeting(_) => FunctionKind::SetGreeting,
        }
    }

    pub fn function_name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn argument(&self) -> Option<&str> {
        match self {
            FunctionSelector::SetGreeting(greeting) => Some(greeting.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for FunctionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionSelector::SetGreeting(greeting) => write!(f, "setGreeting({greeting:?})"),
            other => write!(f, "{}()", other.function_name()),
        }
    }
}
