//! Error types for the graph pipeline and the artifact wire format.

/// Error type for graph compilation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    /// The graph was already compiled; compilation happens exactly once.
    #[error("graph is already compiled")]
    AlreadyCompiled,
    /// No output was declared before compilation.
    #[error("graph has no declared outputs")]
    NoOutputs,
    /// Two inputs were declared under the same name.
    #[error("duplicate input name '{0}'")]
    DuplicateInput(String),
    /// Two outputs were declared under the same name.
    #[error("duplicate output name '{0}'")]
    DuplicateOutput(String),
    /// A rotation step is zero or not smaller than the graph width.
    #[error("rotation by {step} slots is invalid for graph width {size}")]
    InvalidRotation { step: usize, size: usize },
    /// A vector constant is wider than the graph.
    #[error("constant of width {width} exceeds graph width {size}")]
    ConstantTooWide { width: usize, size: usize },
}

/// Error type for key generation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyGenError {
    /// Keys can only be generated for a compiled graph.
    #[error("graph must be compiled before key generation")]
    NotCompiled,
    /// Keys were already generated; key generation happens exactly once.
    #[error("keys were already generated")]
    AlreadyGenerated,
}

/// Error type for input encryption.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncryptError {
    /// Encryption requires generated keys.
    #[error("keys must be generated before encrypting inputs")]
    MissingKeys,
    /// A declared input has no value in the provided valuation.
    #[error("no value provided for declared input '{0}'")]
    MissingInput(String),
    /// The valuation names an input that was never declared.
    #[error("value provided for undeclared input '{0}'")]
    UnknownInput(String),
    /// A vector value does not fit the graph width.
    #[error("input '{name}' has {len} slots but the graph width is {size}")]
    ShapeMismatch {
        name: String,
        len: usize,
        size: usize,
    },
}

/// Error type for graph execution.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExecuteError {
    /// Execution requires a compiled graph.
    #[error("graph must be compiled before execution")]
    NotCompiled,
    /// Execution requires encrypted inputs.
    #[error("inputs must be encrypted before execution")]
    InputsNotEncrypted,
    /// A declared input has no encrypted value, e.g. after loading an
    /// input artifact from a different graph.
    #[error("no encrypted value for input '{0}'")]
    MissingInput(String),
    /// Two operands have incompatible slot widths.
    #[error("operand widths {lhs} and {rhs} are incompatible at node {node}")]
    WidthMismatch { node: usize, lhs: usize, rhs: usize },
    /// Rotation was applied to an operand narrower than the graph width.
    #[error("rotation at node {node} requires a full-width operand, got width {width}")]
    RotateNarrowOperand { node: usize, width: usize },
}

/// Error type for output decryption.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecryptError {
    /// Decryption requires an executed graph.
    #[error("graph must be executed before decrypting outputs")]
    NotExecuted,
    /// Decryption requires the key set that encrypted the inputs.
    #[error("keys are missing")]
    MissingKeys,
    /// The outputs were produced under a different key set.
    #[error("outputs were produced under key {got:#x}, expected {expected:#x}")]
    WrongKey { got: u64, expected: u64 },
    /// The named output does not exist.
    #[error("no output named '{0}'")]
    UnknownOutput(String),
    /// An output does not have the slot layout the decoder expects.
    #[error("output '{name}' has width {width}, expected at least {expected}")]
    ShapeMismatch {
        name: String,
        width: usize,
        expected: usize,
    },
    /// The caller's record count disagrees with the graph's.
    #[error("record count {got} does not match the graph's {expected}")]
    RecordCountMismatch { got: usize, expected: usize },
}

/// Error type for saving or loading an artifact file.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Filesystem failure while reading or writing the artifact.
    #[error("failed to access artifact file '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The artifact could not be serialized.
    #[error(transparent)]
    Serialize(#[from] SerializeError),
    /// The artifact could not be deserialized.
    #[error(transparent)]
    Deserialize(#[from] DeserializeError),
    /// The pipeline stage whose artifact was requested has not run yet.
    #[error("nothing to save: {0}")]
    StageNotReached(&'static str),
}

/// Error type for peeking the version from serialized artifact data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PeekError {
    /// Data is too short to contain a valid header.
    #[error("data too short to contain valid header")]
    TooShort,
    /// Magic bytes do not match expected value.
    #[error("invalid magic bytes")]
    InvalidMagic,
    /// Version field is corrupt or unreadable.
    #[error("version field is corrupt or unreadable")]
    InvalidVersion,
}

/// Error type for artifact deserialization.
#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    /// Error peeking the version header.
    #[error("header validation failed: {0}")]
    Peek(#[from] PeekError),
    /// Version is not supported.
    #[error("unsupported version {got}, expected {expected}")]
    UnsupportedVersion { got: u32, expected: u32 },
    /// Error deserializing the payload.
    #[error("payload deserialization failed")]
    Payload(#[source] rmp_serde::decode::Error),
}

/// Error type for artifact serialization.
#[derive(Debug, thiserror::Error)]
#[error("payload serialization failed")]
pub struct SerializeError(#[source] pub(crate) rmp_serde::encode::Error);
