//! The [`Dag`]: graph ownership plus the staged execution pipeline.

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use log::info;
use serde::{Serialize, de::DeserializeOwned};

use crate::compile::{AlgorithmInfo, Plan, compile};
use crate::engine::{EncryptedInputs, ExecutionResult, KeySet, encrypt, execute};
use crate::error::{
    CompileError, DecryptError, EncryptError, ExecuteError, KeyGenError, PersistenceError,
};
use crate::expr::Expr;
use crate::graph::Graph;
use crate::op::{ConstantValue, DataTag};
use crate::wire::{PlainValue, Valuation, deserialize_artifact, serialize_artifact};
use crate::{ALGORITHM_MAGIC, GRAPH_MAGIC, INPUTS_MAGIC, OUTPUTS_MAGIC};

/// A computation graph and its pipeline state.
///
/// The pipeline stages run in a fixed order, each exactly once per round:
/// compile, key generation, input encryption, execution, decryption.
/// Stage methods fail when invoked out of order.
pub struct Dag {
    graph: Rc<RefCell<Graph>>,
    plan: Option<Plan>,
    info: Option<AlgorithmInfo>,
    keys: Option<KeySet>,
    encrypted: Option<EncryptedInputs>,
    result: Option<ExecutionResult>,
}

impl Dag {
    /// Create an empty graph with the given name and maximum slot width.
    pub fn new(name: &str, size: usize) -> Self {
        Self {
            graph: Rc::new(RefCell::new(Graph::new(name, size))),
            plan: None,
            info: None,
            keys: None,
            encrypted: None,
            result: None,
        }
    }

    pub fn name(&self) -> String {
        self.graph.borrow().name.clone()
    }

    pub fn size(&self) -> usize {
        self.graph.borrow().size
    }

    /// Number of records the query reductions cover. Must be set before
    /// building a reduction when fewer records than blocks are populated.
    pub fn set_record_count(&mut self, records: usize) {
        self.graph.borrow_mut().record_count = Some(records);
    }

    pub fn record_count(&self) -> usize {
        self.graph.borrow().records()
    }

    /// Declare a named input slot. Declaration order fixes the positional
    /// index used when binding expression parameters.
    pub fn declare_input(&mut self, name: &str, tag: DataTag) -> Expr {
        let node = self.graph.borrow_mut().add_input(name, tag);
        Expr::new(Rc::clone(&self.graph), node)
    }

    /// Declare a named output computed by the given handle.
    pub fn declare_output(&mut self, name: &str, expr: &Expr) {
        debug_assert!(
            Rc::ptr_eq(&self.graph, &expr.graph),
            "output must belong to this graph"
        );
        self.graph.borrow_mut().add_output(name, expr.node);
    }

    /// A scalar constant node, for literals in expression positions.
    pub fn constant(&self, value: f64) -> Expr {
        let node = self
            .graph
            .borrow_mut()
            .add_constant(ConstantValue::Scalar(value));
        Expr::new(Rc::clone(&self.graph), node)
    }

    /// Validate and lower the graph. Runs exactly once.
    pub fn compile(&mut self) -> Result<(), CompileError> {
        if self.plan.is_some() {
            return Err(CompileError::AlreadyCompiled);
        }
        let (plan, info) = compile(&self.graph.borrow())?;
        info!(
            "Compiled graph '{}': {} nodes, {} inputs, {} outputs, multiplicative depth {}",
            info.name, info.node_count, info.input_count, info.output_count,
            info.multiplicative_depth
        );
        self.plan = Some(plan);
        self.info = Some(info);
        Ok(())
    }

    /// Generate the key material for this round. Requires a compiled graph.
    pub fn generate_keys(&mut self) -> Result<(), KeyGenError> {
        if self.plan.is_none() {
            return Err(KeyGenError::NotCompiled);
        }
        if self.keys.is_some() {
            return Err(KeyGenError::AlreadyGenerated);
        }
        let keys = KeySet::generate();
        info!("Generated keys for graph '{}'", self.graph.borrow().name);
        self.keys = Some(keys);
        Ok(())
    }

    /// Bind and encrypt one valuation of the declared inputs.
    pub fn encrypt_inputs(&mut self, inputs: &Valuation) -> Result<(), EncryptError> {
        let keys = self.keys.as_ref().ok_or(EncryptError::MissingKeys)?;
        let encrypted = encrypt(&self.graph.borrow(), keys, inputs)?;
        info!(
            "Encrypted {} inputs for graph '{}'",
            encrypted.values.len(),
            self.graph.borrow().name
        );
        self.encrypted = Some(encrypted);
        Ok(())
    }

    /// Run the compiled graph over the encrypted inputs.
    pub fn execute(&mut self) -> Result<(), ExecuteError> {
        let plan = self.plan.as_ref().ok_or(ExecuteError::NotCompiled)?;
        let inputs = self
            .encrypted
            .as_ref()
            .ok_or(ExecuteError::InputsNotEncrypted)?;
        let result = execute(&self.graph.borrow(), plan, inputs)?;
        info!(
            "Executed graph '{}': {} outputs",
            self.graph.borrow().name,
            result.outputs.len()
        );
        self.result = Some(result);
        Ok(())
    }

    /// Decrypt the outputs of the last execution.
    pub fn decrypt_outputs(&self) -> Result<Valuation, DecryptError> {
        let result = self.result.as_ref().ok_or(DecryptError::NotExecuted)?;
        let keys = self.keys.as_ref().ok_or(DecryptError::MissingKeys)?;
        if result.key_id != keys.key_id {
            return Err(DecryptError::WrongKey {
                got: result.key_id,
                expected: keys.key_id,
            });
        }
        Ok(result
            .outputs
            .iter()
            .map(|(name, slots)| {
                let value = match slots.as_slice() {
                    [single] => PlainValue::Scalar(*single),
                    slots => PlainValue::Vector(slots.to_vec()),
                };
                (name.clone(), value)
            })
            .collect())
    }

    /// Raw output slots, for decoders that need the full slot layout.
    pub(crate) fn output_slots(&self, name: &str) -> Result<&[f64], DecryptError> {
        let result = self.result.as_ref().ok_or(DecryptError::NotExecuted)?;
        result
            .outputs
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| DecryptError::UnknownOutput(name.to_string()))
    }

    /// Summary of the compiled graph, available after [`Dag::compile`].
    pub fn algorithm_info(&self) -> Option<&AlgorithmInfo> {
        self.info.as_ref()
    }

    /// Persist the graph structure.
    pub fn save_graph(&self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        write_artifact(path, &GRAPH_MAGIC, &*self.graph.borrow())
    }

    /// Replace the graph structure from a saved artifact. Resets all
    /// pipeline state.
    pub fn load_graph(&mut self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let graph: Graph = read_artifact(path, &GRAPH_MAGIC)?;
        self.graph = Rc::new(RefCell::new(graph));
        self.plan = None;
        self.info = None;
        self.keys = None;
        self.encrypted = None;
        self.result = None;
        Ok(())
    }

    /// Persist the compiled-graph summary.
    pub fn save_algorithm_info(&self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let info = self
            .info
            .as_ref()
            .ok_or(PersistenceError::StageNotReached("graph is not compiled"))?;
        write_artifact(path, &ALGORITHM_MAGIC, info)
    }

    /// Persist the encrypted inputs of the current round.
    pub fn save_inputs(&self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let encrypted = self
            .encrypted
            .as_ref()
            .ok_or(PersistenceError::StageNotReached("inputs are not encrypted"))?;
        write_artifact(path, &INPUTS_MAGIC, encrypted)
    }

    /// Restore encrypted inputs saved by [`Dag::save_inputs`].
    pub fn load_inputs(&mut self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        self.encrypted = Some(read_artifact(path, &INPUTS_MAGIC)?);
        Ok(())
    }

    /// Persist the raw outputs of the last execution.
    pub fn save_outputs(&self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let result = self
            .result
            .as_ref()
            .ok_or(PersistenceError::StageNotReached("graph is not executed"))?;
        write_artifact(path, &OUTPUTS_MAGIC, result)
    }

    /// Restore outputs saved by [`Dag::save_outputs`], e.g. to decrypt a
    /// previous round.
    pub fn load_outputs(&mut self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        self.result = Some(read_artifact(path, &OUTPUTS_MAGIC)?);
        Ok(())
    }
}

fn write_artifact<T: Serialize>(
    path: impl AsRef<Path>,
    magic: &[u8; 4],
    payload: &T,
) -> Result<(), PersistenceError> {
    let path = path.as_ref();
    let bytes = serialize_artifact(magic, payload)?;
    fs::write(path, bytes).map_err(|source| PersistenceError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn read_artifact<T: DeserializeOwned>(
    path: impl AsRef<Path>,
    magic: &[u8; 4],
) -> Result<T, PersistenceError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| PersistenceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(deserialize_artifact(magic, &bytes)?)
}
