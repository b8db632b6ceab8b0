//! Computation-graph builder and reference engine for encrypted evaluation.
//!
//! A [`Dag`] is built incrementally through operator-overloaded [`Expr`]
//! handles, then driven through a fixed pipeline: compile, key generation,
//! input encryption, execution, output decryption. The engine shipped here
//! evaluates compiled graphs over plaintext slot vectors with the same
//! semantics a homomorphic backend would provide (elementwise arithmetic,
//! 0/1 comparisons, slot rotation), so the full pipeline is executable and
//! testable without any lattice cryptography.
//!
//! # Artifact Wire Format
//!
//! Saved artifacts (graph, algorithm info, encrypted inputs, encrypted
//! outputs) use a versioned binary format:
//!
//! ```text
//! [MAGIC: 4 bytes][VERSION: 4 bytes big-endian u32][PAYLOAD: msgpack bytes]
//! ```
//!
//! - **MAGIC**: artifact type identifier ("HDAG", "HALG", "HINP", "HOUT")
//! - **VERSION**: protocol version as big-endian u32 (fixed 4 bytes)
//! - **PAYLOAD**: MessagePack-serialized data
//!
//! Loading uses strict version matching: only an exact version match is
//! accepted, so incompatible artifacts fail early instead of deserializing
//! into silently wrong graphs or ciphertexts.

mod compile;
mod dag;
mod encode;
mod engine;
mod error;
mod expr;
mod graph;
mod op;
mod wire;

pub use compile::AlgorithmInfo;
pub use dag::Dag;
pub use encode::{
    decode_count_output, decode_frequency_domain_outputs, encode_comparable,
    encode_frequency_domain,
};
pub use error::{
    CompileError, DecryptError, DeserializeError, EncryptError, ExecuteError, KeyGenError,
    PeekError, PersistenceError, SerializeError,
};
pub use expr::{Expr, IntoOperand, query_count, query_sum};
pub use op::{ConstantValue, DataTag, Op};
pub use wire::{
    PlainValue, Valuation, peek_algorithm_version, peek_graph_version, peek_inputs_version,
    peek_outputs_version,
};

/// Current artifact protocol version, shared by all four artifact kinds.
pub const ARTIFACT_VERSION: u32 = 1;

/// Magic bytes identifying graph artifacts: "HDAG" in ASCII.
pub const GRAPH_MAGIC: [u8; 4] = *b"HDAG";

/// Magic bytes identifying algorithm-info artifacts: "HALG" in ASCII.
pub const ALGORITHM_MAGIC: [u8; 4] = *b"HALG";

/// Magic bytes identifying encrypted-input artifacts: "HINP" in ASCII.
pub const INPUTS_MAGIC: [u8; 4] = *b"HINP";

/// Magic bytes identifying encrypted-output artifacts: "HOUT" in ASCII.
pub const OUTPUTS_MAGIC: [u8; 4] = *b"HOUT";

/// Header size: 4 bytes magic + 4 bytes version.
pub const HEADER_SIZE: usize = 8;

/// Slots occupied by one record under the comparable and frequency-domain
/// encodings. Rotations in the query reductions step in multiples of this.
pub const QUERY_BLOCK: usize = 16;

/// Absolute tolerance for slotwise equality of the relational operations.
pub const CMP_EPSILON: f64 = 1e-9;
