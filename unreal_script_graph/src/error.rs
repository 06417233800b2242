//! All errors thrown by unreal_script_graph

use std::io;

use thiserror::Error;

/// Thrown when script bytecode failed to decode
#[derive(Error, Debug)]
pub enum KismetError {
    /// Instruction tag was not recognized
    #[error("{0}")]
    UnknownExpression(Box<str>),
    /// Instruction was missing an operand or an operand had the wrong shape
    #[error("{0}")]
    MalformedExpression(Box<str>),
    /// An object name did not match any known pattern
    #[error("{0}")]
    MalformedObjectName(Box<str>),
    /// A property descriptor did not match any known shape
    #[error("{0}")]
    MalformedProperty(Box<str>),
}

impl KismetError {
    /// Create a `KismetError` for an unrecognized instruction tag
    pub fn unknown_expression(msg: String) -> Self {
        KismetError::UnknownExpression(msg.into_boxed_str())
    }

    /// Create a `KismetError` for a malformed expression
    pub fn expression(msg: String) -> Self {
        KismetError::MalformedExpression(msg.into_boxed_str())
    }

    /// Create a `KismetError` for a malformed object name
    pub fn object_name(msg: String) -> Self {
        KismetError::MalformedObjectName(msg.into_boxed_str())
    }

    /// Create a `KismetError` for a malformed property descriptor
    pub fn property(msg: String) -> Self {
        KismetError::MalformedProperty(msg.into_boxed_str())
    }
}

/// Thrown when a script document failed to serialize into an AST
#[derive(Error, Debug)]
pub enum ScriptError {
    /// A statement had no `StatementIndex`
    #[error("Statement without StatementIndex: {0}")]
    MissingStatementIndex(Box<str>),
    /// A statement document was not a mapping
    #[error("Statement is not a mapping: {0}")]
    InvalidStatement(Box<str>),
    /// A link endpoint does not name a serialized statement
    #[error("Link ({0}, {1}) points outside the statement list")]
    DanglingLink(usize, usize),
    /// A function entry was malformed
    #[error("{0}")]
    InvalidFunction(Box<str>),
    /// The top-level document was not a sequence of entries
    #[error("{0}")]
    InvalidDocument(Box<str>),
}

impl ScriptError {
    /// Create a `ScriptError` for a statement without a `StatementIndex`
    pub fn missing_statement_index(statement: String) -> Self {
        ScriptError::MissingStatementIndex(statement.into_boxed_str())
    }

    /// Create a `ScriptError` for a statement that is not a mapping
    pub fn invalid_statement(statement: String) -> Self {
        ScriptError::InvalidStatement(statement.into_boxed_str())
    }

    /// Create a `ScriptError` for a link endpoint outside the statement list
    pub fn dangling_link(from: usize, to: usize) -> Self {
        ScriptError::DanglingLink(from, to)
    }

    /// Create a `ScriptError` for a malformed function entry
    pub fn invalid_function(msg: String) -> Self {
        ScriptError::InvalidFunction(msg.into_boxed_str())
    }

    /// Create a `ScriptError` for a document that is not a sequence
    pub fn invalid_document(msg: String) -> Self {
        ScriptError::InvalidDocument(msg.into_boxed_str())
    }
}

/// Thrown when the execution-flow resolver hit an inconsistent graph
#[derive(Error, Debug)]
pub enum ResolveError {
    /// More than one computed jump in one function
    #[error("Computed jump at {1} but another already seen at {0}")]
    DuplicateComputedJump(usize, usize),
    /// A pop-execution statement ran with an empty simulated stack
    #[error("Pop at {0} with an empty execution-flow stack")]
    PopWithEmptyStack(usize),
    /// A pop-execution statement already resolved to a different address
    #[error("Pop at {0} already resolved to {1}, stack top is {2}")]
    PopTargetMismatch(usize, usize, usize),
    /// A pop-execution statement had the wrong number of outgoing links
    #[error("Pop at {0} expected {1} outgoing links, found {2}")]
    UnexpectedLinkCount(usize, usize, usize),
    /// A statement had neither outgoing links nor a stack to return to
    #[error("Statement {0} has no outgoing links and an empty stack")]
    DanglingStatement(usize),
    /// End of script still had outgoing links
    #[error("End of script at {0} has {1} outgoing links")]
    TrailingLinks(usize, usize),
    /// A computed jump would dispatch backwards
    #[error("Computed jump at {0} cannot dispatch backwards to {1}")]
    BackwardComputedJump(usize, usize),
    /// A walk reached a statement index that was never serialized
    #[error("Walk reached unknown statement {0}")]
    UnknownStatement(usize),
}

impl ResolveError {
    /// Create a `ResolveError` for a duplicate computed jump
    pub fn duplicate_computed_jump(first: usize, second: usize) -> Self {
        ResolveError::DuplicateComputedJump(first, second)
    }

    /// Create a `ResolveError` for a pop with an empty stack
    pub fn pop_with_empty_stack(index: usize) -> Self {
        ResolveError::PopWithEmptyStack(index)
    }

    /// Create a `ResolveError` for a pop that resolved to two addresses
    pub fn pop_target_mismatch(index: usize, resolved: usize, top: usize) -> Self {
        ResolveError::PopTargetMismatch(index, resolved, top)
    }

    /// Create a `ResolveError` for a pop with the wrong outgoing link count
    pub fn unexpected_link_count(index: usize, expected: usize, got: usize) -> Self {
        ResolveError::UnexpectedLinkCount(index, expected, got)
    }

    /// Create a `ResolveError` for a statement with nowhere to go
    pub fn dangling_statement(index: usize) -> Self {
        ResolveError::DanglingStatement(index)
    }

    /// Create a `ResolveError` for an end of script with outgoing links
    pub fn trailing_links(index: usize, count: usize) -> Self {
        ResolveError::TrailingLinks(index, count)
    }

    /// Create a `ResolveError` for a backward computed-jump target
    pub fn backward_computed_jump(jump: usize, target: usize) -> Self {
        ResolveError::BackwardComputedJump(jump, target)
    }

    /// Create a `ResolveError` for a walk into an unknown statement
    pub fn unknown_statement(index: usize) -> Self {
        ResolveError::UnknownStatement(index)
    }
}

/// Error type
#[derive(Error, Debug)]
pub enum Error {
    /// An `std::io::Error` occured
    #[error(transparent)]
    Io(#[from] io::Error),
    /// A `serde_json::Error` occured
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// A `KismetError` occured
    #[error(transparent)]
    Kismet(#[from] KismetError),
    /// A `ScriptError` occured
    #[error(transparent)]
    Script(#[from] ScriptError),
    /// A `ResolveError` occured
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}
