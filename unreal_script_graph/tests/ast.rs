use serde_json::{json, Value};
use unreal_script_graph::error::{Error, ResolveError};
use unreal_script_graph::kismet::KismetExpression;
use unreal_script_graph::ScriptAst;

fn build(bytecode: &[Value]) -> ScriptAst {
    let mut ast = ScriptAst::new("TestScript", bytecode).expect("Failed to serialize");
    ast.resolve().expect("Failed to resolve");
    ast
}

fn pop_addr(ast: &ScriptAst, index: usize) -> Option<usize> {
    match &ast.node(index).expect("Missing statement").expr {
        KismetExpression::ExPopExecutionFlow(pop) => pop.pop_addr,
        KismetExpression::ExPopExecutionFlowIfNot(pop) => pop.pop_addr,
        other => panic!("Statement {index} is not a pop: {other:?}"),
    }
}

#[test]
fn test_empty_bytecode() {
    let ast = build(&[]);

    assert!(ast.script_nodes().is_empty());
    assert!(ast.link_list().is_empty());
    assert!(ast.entrypoints().is_empty());
    assert!(!ast.is_ubergraph());
}

#[test]
fn test_lone_end_of_script() {
    let ast = build(&[json!({"StatementIndex": 0, "Inst": "EX_EndOfScript"})]);

    assert_eq!(ast.script_nodes().len(), 1);
    assert!(ast.link_list().is_empty());
    assert_eq!(ast.entrypoints(), [0].into());

    let (nodes, edges) = ast.subgraph(0).expect("Failed to extract");
    assert_eq!(nodes.len(), 1);
    assert!(edges.is_empty());
}

#[test]
fn test_linear_pair() {
    let ast = build(&[
        json!({"StatementIndex": 0, "Inst": "EX_Nothing"}),
        json!({"StatementIndex": 1, "Inst": "EX_EndOfScript"}),
    ]);

    assert_eq!(ast.script_nodes().len(), 2);
    assert_eq!(*ast.link_list(), [(0, 1)].into());
    assert_eq!(ast.entrypoints(), [0].into());
    assert!(!ast.is_ubergraph());
}

#[test]
fn test_statement_indices_match_keys() {
    let ast = build(&[
        json!({"StatementIndex": 0, "Inst": "EX_Nothing"}),
        json!({"StatementIndex": 1, "Inst": "EX_Nothing"}),
        json!({"StatementIndex": 2, "Inst": "EX_EndOfScript"}),
    ]);

    for (index, stmt) in ast.script_nodes() {
        assert_eq!(*index, stmt.index);
    }
}

#[test]
fn test_unconditional_backward_jump() {
    let ast = build(&[
        json!({"StatementIndex": 0, "Inst": "EX_Nothing"}),
        json!({
            "StatementIndex": 1,
            "Inst": "EX_Jump",
            "CodeOffset": 0,
            "ObjectPath": "/Game/Test.Test"
        }),
        json!({"StatementIndex": 2, "Inst": "EX_EndOfScript"}),
    ]);

    // no fall-through out of the jump, so 2 keeps no incoming links
    assert_eq!(*ast.link_list(), [(0, 1), (1, 0)].into());
    assert_eq!(ast.entrypoints(), [2].into());
}

#[test]
fn test_conditional_jump() {
    let ast = build(&[
        json!({
            "StatementIndex": 0,
            "Inst": "EX_JumpIfNot",
            "CodeOffset": 2,
            "ObjectPath": "/Game/Test.Test",
            "BooleanExpression": {"Inst": "EX_True"}
        }),
        json!({
            "StatementIndex": 1,
            "Inst": "EX_Return",
            "Expression": {"Inst": "EX_Nothing"}
        }),
        json!({"StatementIndex": 2, "Inst": "EX_EndOfScript"}),
    ]);

    // the conditional jump keeps its fall-through next to the jump link
    assert_eq!(*ast.link_list(), [(0, 1), (0, 2), (1, 2)].into());
    assert_eq!(ast.entrypoints(), [0].into());
}

#[test]
fn test_push_pop_pair() {
    let ast = build(&[
        json!({
            "StatementIndex": 0,
            "Inst": "EX_PushExecutionFlow",
            "PushingAddress": 2,
            "ObjectPath": "/Game/Test.Test"
        }),
        json!({"StatementIndex": 1, "Inst": "EX_PopExecutionFlow"}),
        json!({"StatementIndex": 2, "Inst": "EX_Nothing"}),
        json!({"StatementIndex": 3, "Inst": "EX_EndOfScript"}),
    ]);

    assert!(ast.not_entrypoints().contains(&2));
    assert_eq!(pop_addr(&ast, 1), Some(2));
    assert!(ast.link_list().contains(&(1, 2)));
    assert_eq!(ast.entrypoints(), [0].into());
}

#[test]
fn test_resolver_is_idempotent() {
    let mut ast = ScriptAst::new(
        "TestScript",
        &[
            json!({
                "StatementIndex": 0,
                "Inst": "EX_PushExecutionFlow",
                "PushingAddress": 2,
                "ObjectPath": "/Game/Test.Test"
            }),
            json!({"StatementIndex": 1, "Inst": "EX_PopExecutionFlow"}),
            json!({"StatementIndex": 2, "Inst": "EX_Nothing"}),
            json!({"StatementIndex": 3, "Inst": "EX_EndOfScript"}),
        ],
    )
    .expect("Failed to serialize");

    ast.resolve().expect("Failed to resolve");
    let links = ast.link_list().clone();
    let resolved = pop_addr(&ast, 1);

    ast.resolve().expect("Failed to resolve again");
    assert_eq!(*ast.link_list(), links);
    assert_eq!(pop_addr(&ast, 1), resolved);
}

#[test]
fn test_entrypoints_have_no_incoming_links() {
    let ast = build(&[
        json!({"StatementIndex": 0, "Inst": "EX_Nothing"}),
        json!({
            "StatementIndex": 1,
            "Inst": "EX_Jump",
            "CodeOffset": 0,
            "ObjectPath": "/Game/Test.Test"
        }),
        json!({"StatementIndex": 2, "Inst": "EX_EndOfScript"}),
    ]);

    for entrypoint in ast.entrypoints() {
        assert!(ast.incoming(entrypoint).is_empty());
    }
}

#[test]
fn test_subgraph_of_entrypoint_zero_is_whole_graph() {
    let ast = build(&[
        json!({"StatementIndex": 0, "Inst": "EX_Nothing"}),
        json!({"StatementIndex": 1, "Inst": "EX_EndOfScript"}),
    ]);

    let (nodes, edges) = ast.subgraph(0).expect("Failed to extract");
    assert_eq!(nodes.len(), ast.script_nodes().len());
    assert_eq!(edges, *ast.link_list());
}

#[test]
fn test_computed_jump_ubergraph() {
    let ast = build(&[
        json!({
            "StatementIndex": 0,
            "Inst": "EX_PushExecutionFlow",
            "PushingAddress": 4,
            "ObjectPath": "/Game/Test.Test"
        }),
        json!({
            "StatementIndex": 1,
            "Inst": "EX_ComputedJump",
            "OffsetExpression": {"Inst": "EX_IntConst", "Value": 0}
        }),
        json!({"StatementIndex": 2, "Inst": "EX_Nothing"}),
        json!({
            "StatementIndex": 3,
            "Inst": "EX_Jump",
            "CodeOffset": 1,
            "ObjectPath": "/Game/Test.Test"
        }),
        json!({"StatementIndex": 4, "Inst": "EX_PopExecutionFlow"}),
        json!({"StatementIndex": 5, "Inst": "EX_EndOfScript"}),
    ]);

    assert!(ast.is_ubergraph());
    assert_eq!(ast.cmptd_jump_index(), Some(1));
    assert!(ast.not_entrypoints().contains(&0));
    assert!(ast.not_entrypoints().contains(&4));
    assert_eq!(ast.entrypoints(), [2, 5].into());

    // extraction toward entrypoint 2 synthesizes the dispatch link (1, 2)
    let (nodes, edges) = ast.subgraph(2).expect("Failed to extract");
    let indices: Vec<usize> = nodes.iter().map(|n| n.index).collect();
    assert_eq!(indices, [1, 2, 3]);
    assert_eq!(edges, [(1, 2), (2, 3), (3, 1)].into());

    let (nodes, edges) = ast.subgraph(5).expect("Failed to extract");
    let indices: Vec<usize> = nodes.iter().map(|n| n.index).collect();
    assert_eq!(indices, [5]);
    assert!(edges.is_empty());
}

#[test]
fn test_subgraph_closure_is_a_fixed_point() {
    let ast = build(&[
        json!({
            "StatementIndex": 0,
            "Inst": "EX_PushExecutionFlow",
            "PushingAddress": 4,
            "ObjectPath": "/Game/Test.Test"
        }),
        json!({
            "StatementIndex": 1,
            "Inst": "EX_ComputedJump",
            "OffsetExpression": {"Inst": "EX_IntConst", "Value": 0}
        }),
        json!({"StatementIndex": 2, "Inst": "EX_Nothing"}),
        json!({
            "StatementIndex": 3,
            "Inst": "EX_Jump",
            "CodeOffset": 1,
            "ObjectPath": "/Game/Test.Test"
        }),
        json!({"StatementIndex": 4, "Inst": "EX_PopExecutionFlow"}),
        json!({"StatementIndex": 5, "Inst": "EX_EndOfScript"}),
    ]);

    let (nodes, _) = ast.subgraph(2).expect("Failed to extract");
    let indices: Vec<usize> = nodes.iter().map(|n| n.index).collect();
    for index in &indices {
        for (_, to) in ast.outgoing(*index, Some(2)).expect("Failed to get links") {
            assert!(indices.contains(&to));
        }
    }
}

#[test]
fn test_duplicate_computed_jump_is_fatal() {
    let result = ScriptAst::new(
        "TestScript",
        &[
            json!({
                "StatementIndex": 0,
                "Inst": "EX_ComputedJump",
                "OffsetExpression": {"Inst": "EX_IntConst", "Value": 0}
            }),
            json!({
                "StatementIndex": 1,
                "Inst": "EX_ComputedJump",
                "OffsetExpression": {"Inst": "EX_IntConst", "Value": 0}
            }),
        ],
    );

    assert!(matches!(
        result,
        Err(Error::Resolve(ResolveError::DuplicateComputedJump(0, 1)))
    ));
}

#[test]
fn test_backward_computed_jump_is_fatal() {
    let ast = build(&[
        json!({
            "StatementIndex": 0,
            "Inst": "EX_Jump",
            "CodeOffset": 3,
            "ObjectPath": "/Game/Test.Test"
        }),
        json!({"StatementIndex": 1, "Inst": "EX_Nothing"}),
        json!({
            "StatementIndex": 2,
            "Inst": "EX_Jump",
            "CodeOffset": 3,
            "ObjectPath": "/Game/Test.Test"
        }),
        json!({
            "StatementIndex": 3,
            "Inst": "EX_ComputedJump",
            "OffsetExpression": {"Inst": "EX_IntConst", "Value": 0}
        }),
        json!({"StatementIndex": 4, "Inst": "EX_EndOfScript"}),
    ]);

    // entrypoint 1 reaches the computed jump at 3, which may not dispatch
    // backwards to 1
    let result = ast.subgraph(1);
    assert!(matches!(
        result,
        Err(Error::Resolve(ResolveError::BackwardComputedJump(3, 1)))
    ));
}

#[test]
fn test_pop_with_empty_stack_is_fatal() {
    let mut ast = ScriptAst::new(
        "TestScript",
        &[
            json!({
                "StatementIndex": 0,
                "Inst": "EX_PopExecutionFlowIfNot",
                "BooleanExpression": {"Inst": "EX_True"}
            }),
            json!({"StatementIndex": 1, "Inst": "EX_EndOfScript"}),
        ],
    )
    .expect("Failed to serialize");

    let result = ast.resolve();
    assert!(matches!(
        result,
        Err(Error::Resolve(ResolveError::PopWithEmptyStack(0)))
    ));
}

#[test]
fn test_fall_through_stops_after_no_flow() {
    let ast = build(&[
        json!({
            "StatementIndex": 0,
            "Inst": "EX_PushExecutionFlow",
            "PushingAddress": 2,
            "ObjectPath": "/Game/Test.Test"
        }),
        json!({"StatementIndex": 1, "Inst": "EX_PopExecutionFlow"}),
        json!({"StatementIndex": 2, "Inst": "EX_Nothing"}),
        json!({"StatementIndex": 3, "Inst": "EX_EndOfScript"}),
    ]);

    // the pop at 1 does not fall through into 2; the only (1, 2) link is the
    // resolved pop link, and (2, 3) is the only other fall-through besides
    // (0, 1)
    assert_eq!(*ast.link_list(), [(0, 1), (1, 2), (2, 3)].into());
}

#[test]
fn test_missing_statement_index_is_fatal() {
    let result = ScriptAst::new("TestScript", &[json!({"Inst": "EX_Nothing"})]);
    assert!(result.is_err());
}
