//! Minimal function descriptors built per submission

use alloy_dyn_abi::{DynSolValue, JsonAbiExt};
use alloy_json_abi::{Function, Param, StateMutability};

use super::selector::FunctionSelector;

/// A function parameter specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    /// Parameter name
    pub name: String,
    /// Solidity type (e.g. "string")
    pub kind: String,
}

/// Structural description of a single contract function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDescriptor {
    pub name: String,
    /// Always "nonpayable" for the functions this screen calls
    pub state_mutability: String,
    pub inputs: Vec<ParamSpec>,
    pub outputs: Vec<ParamSpec>,
}

/// Build the descriptor for a selector.
///
/// Every function takes no input except `setGreeting`, which takes a single
/// `string newGreeting`.
pub fn build_descriptor(selector: &FunctionSelector) -> FunctionDescriptor {
    let inputs = match selector {
        FunctionSelector::SetGreeting(_) => vec![ParamSpec {
            name: "newGreeting".to_string(),
            kind: "string".to_string(),
        }],
        _ => Vec::new(),
    };

    FunctionDescriptor {
        name: selector.function_name().to_string(),
        state_mutability: "nonpayable".to_string(),
        inputs,
        outputs: Vec::new(),
    }
}

/// Call arguments in descriptor order
pub fn call_args(selector: &FunctionSelector) -> Vec<DynSolValue> {
    match selector {
        FunctionSelector::SetGreeting(greeting) => vec![DynSolValue::String(greeting.clone())],
        _ => Vec::new(),
    }
}

impl FunctionDescriptor {
    /// Convert into an alloy JSON ABI item
    pub fn to_json_abi(&self) -> Function {
        Function {
            name: self.name.clone(),
            inputs: self.inputs.iter().map(to_param).collect(),
            outputs: self.outputs.iter().map(to_param).collect(),
            state_mutability: StateMutability::NonPayable,
        }
    }

    /// Canonical signature, e.g. `setGreeting(string)`
    pub fn signature(&self) -> String {
        self.to_json_abi().signature()
    }

    /// 4-byte selector as hex string
    pub fn selector_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_json_abi().selector()))
    }

    /// ABI-encode calldata (selector + params) for the given arguments
    pub fn encode_call(&self, args: &[DynSolValue]) -> Result<Vec<u8>, alloy_dyn_abi::Error> {
        self.to_json_abi().abi_encode_input(args)
    }

    /// Single-item JSON ABI array, as handed to a wallet library
    pub fn abi_json(&self) -> String {
        serde_json::to_string(&[self.to_json_abi()]).unwrap_or_else(|_| "[]".to_string())
    }
}

fn to_param(spec: &ParamSpec) -> Param {
    Param {
        ty: spec.kind.clone(),
        name: spec.name.clone(),
        components: Vec::new(),
        internal_type: None,
    }
}
