use serde_json::json;
use unreal_script_graph::dot::{artifact_name, make_label, BG_COLOR, FG_COLOR};
use unreal_script_graph::kismet::KismetExpression;
use unreal_script_graph::{GraphTheme, ScriptAst, ScriptGraph};

fn build(bytecode: &[serde_json::Value]) -> ScriptAst {
    let mut ast = ScriptAst::new("TestScript", bytecode).expect("Failed to serialize");
    ast.resolve().expect("Failed to resolve");
    ast
}

#[test]
fn test_artifact_name() {
    assert_eq!(artifact_name("OpenDoor", 0), "OpenDoor");
    assert_eq!(artifact_name("ExecuteUbergraph", 42), "ExecuteUbergraph_42");
}

#[test]
fn test_statement_label_leads_with_index() {
    let ast = build(&[
        json!({"StatementIndex": 0, "Inst": "EX_Nothing"}),
        json!({"StatementIndex": 1, "Inst": "EX_EndOfScript"}),
    ]);

    let label = make_label(&ast.node(0).unwrap().ast_value());
    assert_eq!(label, "{index|0}|{inst|{EX_Nothing}}");

    let label = make_label(&ast.node(1).unwrap().ast_value());
    assert_eq!(label, "{index|1}|{inst|{EX_EndOfScript}}|{no_flow|{true}}");
}

#[test]
fn test_label_keeps_operand_order() {
    let expr = KismetExpression::new(&json!({
        "Inst": "EX_Jump",
        "CodeOffset": 4,
        "ObjectPath": "/Game/Doors/BP_Door"
    }))
    .expect("Failed to decode");

    assert_eq!(
        make_label(&expr.ast_value()),
        "{inst|{EX_Jump}}|{jmp_offset|{4}}|{objpath|{BP_Door}}|{no_flow|{true}}"
    );
}

#[test]
fn test_label_nests_subexpressions() {
    let expr = KismetExpression::new(&json!({
        "Inst": "EX_Return",
        "Expression": {"Inst": "EX_Nothing"}
    }))
    .expect("Failed to decode");

    assert_eq!(
        make_label(&expr.ast_value()),
        "{inst|{EX_Return}}|{expr|{{inst|{EX_Nothing}}}}"
    );
}

#[test]
fn test_label_escapes_record_characters() {
    let expr = KismetExpression::new(&json!({
        "Inst": "EX_StringConst",
        "Value": "a{b}|c<d>"
    }))
    .expect("Failed to decode");

    assert_eq!(
        make_label(&expr.ast_value()),
        "{inst|{EX_StringConst}}|{value|{a\\{b\\}\\|c\\<d\\>}}"
    );
}

#[test]
fn test_list_labels_are_brace_wrapped() {
    let expr = KismetExpression::new(&json!({
        "Inst": "EX_LocalVirtualFunction",
        "Function": "HandleOverlap",
        "Parameters": [
            {"Inst": "EX_IntZero"},
            {"Inst": "EX_IntOne"}
        ]
    }))
    .expect("Failed to decode");

    let label = make_label(&expr.ast_value());
    assert!(label.contains("{params|{{{inst|{EX_IntZero}}|{value|{0}}}|{{inst|{EX_IntOne}}|{value|{1}}}}}"));
}

#[test]
fn test_to_dot_carries_theme_and_edges() {
    let ast = build(&[
        json!({"StatementIndex": 0, "Inst": "EX_Nothing"}),
        json!({"StatementIndex": 1, "Inst": "EX_EndOfScript"}),
    ]);

    let (nodes, edges) = ast.subgraph(0).expect("Failed to extract");
    let mut graph = ScriptGraph::new("TestScript", GraphTheme::default());
    for node in nodes {
        graph.draw_node(node);
    }
    for edge in edges {
        graph.draw_edge(edge);
    }

    let dot = graph.to_dot();
    assert!(dot.starts_with("// TestScript\ndigraph {\n"));
    assert!(dot.contains(&format!("bgcolor=\"{BG_COLOR}\"")));
    assert!(dot.contains(&format!("color=\"{FG_COLOR}\"")));
    assert!(dot.contains("\tnode [shape=\"box\""));
    assert!(dot.contains("\t0 [label=\"{index|0}|{inst|{EX_Nothing}}\" shape=\"record\"]\n"));
    assert!(dot.contains("\t0 -> 1\n"));
    assert!(dot.ends_with("}\n"));
}
