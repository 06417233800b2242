#![deny(missing_docs)]

//! This crate disassembles blueprint script bytecode extracted from asset
//! dumps and renders each function's control flow as a directed graph.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use unreal_script_graph::{GraphTheme, ScriptAst, ScriptGraph};
//!
//! let bytecode = [
//!     json!({"StatementIndex": 0, "Inst": "EX_Nothing"}),
//!     json!({"StatementIndex": 1, "Inst": "EX_EndOfScript"}),
//! ];
//!
//! let mut ast = ScriptAst::new("ExampleScript", &bytecode).unwrap();
//! ast.resolve().unwrap();
//!
//! for entrypoint in ast.entrypoints() {
//!     let (nodes, edges) = ast.subgraph(entrypoint).unwrap();
//!     let mut graph = ScriptGraph::new("ExampleScript", GraphTheme::default());
//!     for node in nodes {
//!         graph.draw_node(node);
//!     }
//!     for edge in edges {
//!         graph.draw_edge(edge);
//!     }
//!     println!("{}", graph.to_dot());
//! }
//! ```

pub mod ast;
pub mod document;
pub mod dot;
pub mod error;
pub mod kismet;
pub mod types;

pub use ast::{ScriptAst, ScriptStatement};
pub use document::FunctionEntry;
pub use dot::{GraphTheme, ScriptGraph};
pub use error::Error;
