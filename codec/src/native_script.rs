//! Native scripts: signature and time-lock predicates.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use emulator_data_structures::{
    chain::{KeyHash, Script, ScriptKind, Slot},
    error::CodecError,
};

/// Native script tree
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum NativeScript {
    /// Satisfied when `key_hash` signed the transaction
    Sig { key_hash: KeyHash },
    /// Satisfied when every sub-script is satisfied
    All { scripts: Vec<NativeScript> },
    /// Satisfied when any sub-script is satisfied
    Any { scripts: Vec<NativeScript> },
    /// Satisfied when at least `required` sub-scripts are satisfied
    AtLeast {
        required: u32,
        scripts: Vec<NativeScript>,
    },
    /// Satisfied when the transaction cannot be valid at or after `slot`
    Before { slot: Slot },
    /// Satisfied when the transaction cannot be valid before `slot`
    After { slot: Slot },
}

impl NativeScript {
    /// Serialize into a script of the native language
    pub fn to_script(&self) -> Result<Script, CodecError> {
        let bytes = serde_cbor::to_vec(self)
            .map_err(|e| CodecError::Encoding(format!("native script: {}", e)))?;

        Ok(Script {
            kind: ScriptKind::Native,
            bytes,
        })
    }

    /// Decode a script of the native language
    pub fn from_script(script: &Script) -> Result<Self, CodecError> {
        if !script.is_native() {
            return Err(CodecError::Script {
                kind: script.kind.to_string(),
                msg: "expected a native script".to_string(),
            });
        }

        serde_cbor::from_slice(&script.bytes).map_err(|e| CodecError::Script {
            kind: script.kind.to_string(),
            msg: e.to_string(),
        })
    }

    /// Every key hash mentioned by the script, in ascending order and without duplicates
    pub fn required_signers(&self) -> Vec<KeyHash> {
        let mut signers = BTreeSet::new();
        self.collect_signers(&mut signers);

        signers.into_iter().collect()
    }

    fn collect_signers(&self, signers: &mut BTreeSet<KeyHash>) {
        match self {
            NativeScript::Sig { key_hash } => {
                signers.insert(*key_hash);
            }
            NativeScript::All { scripts }
            | NativeScript::Any { scripts }
            | NativeScript::AtLeast { scripts, .. } => {
                for script in scripts {
                    script.collect_signers(signers);
                }
            }
            NativeScript::Before { .. } | NativeScript::After { .. } => {}
        }
    }

    /// Evaluate the predicate.
    ///
    /// `lower_bound` and `upper_bound` are the inclusive validity interval of the
    /// transaction; time-lock leaves can only be satisfied when the relevant bound is set.
    pub fn evaluate(
        &self,
        lower_bound: Option<Slot>,
        upper_bound: Option<Slot>,
        signers: &HashSet<KeyHash>,
    ) -> bool {
        match self {
            NativeScript::Sig { key_hash } => signers.contains(key_hash),
            NativeScript::All { scripts } => scripts
                .iter()
                .all(|s| s.evaluate(lower_bound, upper_bound, signers)),
            NativeScript::Any { scripts } => scripts
                .iter()
                .any(|s| s.evaluate(lower_bound, upper_bound, signers)),
            NativeScript::AtLeast { required, scripts } => {
                let satisfied = scripts
                    .iter()
                    .filter(|s| s.evaluate(lower_bound, upper_bound, signers))
                    .count();

                satisfied >= *required as usize
            }
            NativeScript::Before { slot } => upper_bound.is_some_and(|upper| upper < *slot),
            NativeScript::After { slot } => lower_bound.is_some_and(|lower| lower >= *slot),
        }
    }
}
