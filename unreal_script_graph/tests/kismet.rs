use serde_json::json;
use unreal_script_graph::error::{Error, KismetError};
use unreal_script_graph::kismet::{KismetExpression, KismetExpressionDataTrait};
use unreal_script_graph::types::{ObjectReference, PropertyPointer};

#[test]
fn test_object_reference_full_match() {
    let objref = ObjectReference::new(&json!({
        "ObjectName": "Function'BP_Door_C:OpenDoor'",
        "ObjectPath": "/Game/Doors/BP_Door.BP_Door_C"
    }))
    .expect("Failed to parse object reference");

    assert_eq!(objref.uetype, "Function");
    assert_eq!(objref.outer.as_deref(), Some("BP_Door_C"));
    assert_eq!(objref.name, "OpenDoor");
    assert_eq!(objref.objpath.as_deref(), Some("BP_Door.BP_Door_C"));
}

#[test]
fn test_object_reference_short_match() {
    let objref = ObjectReference::new(&json!({
        "ObjectName": "Class'BP_Door_C'",
        "ObjectPath": "/Game/Doors/BP_Door"
    }))
    .expect("Failed to parse object reference");

    assert_eq!(objref.uetype, "Class");
    assert_eq!(objref.outer, None);
    assert_eq!(objref.name, "BP_Door_C");
    assert_eq!(objref.objpath.as_deref(), Some("BP_Door"));
}

#[test]
fn test_object_reference_bare_string() {
    let objref =
        ObjectReference::new(&json!("HandleOverlap")).expect("Failed to parse object reference");

    assert_eq!(objref.uetype, "LocalVirtualFunction");
    assert_eq!(objref.outer, None);
    assert_eq!(objref.name, "HandleOverlap");
    assert_eq!(objref.objpath, None);
}

#[test]
fn test_object_reference_malformed() {
    let result = ObjectReference::new(&json!({
        "ObjectName": "NoQuotesHere",
        "ObjectPath": "/Game/Doors/BP_Door"
    }));

    assert!(matches!(
        result,
        Err(Error::Kismet(KismetError::MalformedObjectName(_)))
    ));
}

#[test]
fn test_property_descriptor_inline() {
    let prop = PropertyPointer::new(&json!({
        "Property": {"Name": "Counter", "Type": "IntProperty"}
    }))
    .expect("Failed to parse property");

    assert_eq!(
        prop,
        PropertyPointer::Inline {
            name: "Counter".to_string(),
            ty: "IntProperty".to_string(),
        }
    );
}

#[test]
fn test_property_descriptor_owned() {
    let prop = PropertyPointer::new(&json!({
        "Owner": {
            "ObjectName": "Class'BP_Door_C'",
            "ObjectPath": "/Game/Doors/BP_Door"
        },
        "Property": {"Name": "Counter", "Type": "IntProperty"}
    }))
    .expect("Failed to parse property");

    let PropertyPointer::Owned { owner, name, ty } = prop else {
        panic!("Expected an owned property, got {prop:?}");
    };
    assert_eq!(owner.uetype, "Class");
    assert_eq!(name, "Counter");
    assert_eq!(ty, "IntProperty");
}

#[test]
fn test_property_descriptor_path() {
    let prop = PropertyPointer::new(&json!({
        "Path": "SomeVariable",
        "ResolvedOwner": {
            "ObjectName": "Class'BP_Door_C'",
            "ObjectPath": "/Game/Doors/BP_Door"
        }
    }))
    .expect("Failed to parse property");

    let PropertyPointer::Path { name, owner } = prop else {
        panic!("Expected a path property, got {prop:?}");
    };
    assert_eq!(name, json!("SomeVariable"));
    assert_eq!(owner.name, "BP_Door_C");
}

#[test]
fn test_property_descriptor_malformed() {
    let result = PropertyPointer::new(&json!({"Unexpected": true}));

    assert!(matches!(
        result,
        Err(Error::Kismet(KismetError::MalformedProperty(_)))
    ));
}

#[test]
fn test_decode_local_variable_flattens_property() {
    let expr = KismetExpression::new(&json!({
        "Inst": "EX_LocalVariable",
        "Variable": {"Property": {"Name": "Counter", "Type": "IntProperty"}}
    }))
    .expect("Failed to decode");

    assert_eq!(
        expr.ast_value().to_json(),
        json!({
            "inst": "EX_LocalVariable",
            "kind": "local var",
            "name": "Counter",
            "type": "IntProperty"
        })
    );
}

#[test]
fn test_decode_let() {
    let expr = KismetExpression::new(&json!({
        "Inst": "EX_Let",
        "Variable": {
            "Inst": "EX_LocalVariable",
            "Variable": {"Property": {"Name": "Counter", "Type": "IntProperty"}}
        },
        "Expression": {"Inst": "EX_IntConst", "Value": 7}
    }))
    .expect("Failed to decode");

    assert_eq!(
        expr.ast_value().to_json(),
        json!({
            "inst": "EX_Let",
            "kind": "let",
            "var": {
                "inst": "EX_LocalVariable",
                "kind": "local var",
                "name": "Counter",
                "type": "IntProperty"
            },
            "expr": {"inst": "EX_IntConst", "kind": "int", "value": "7"}
        })
    );
}

#[test]
fn test_decode_call_math() {
    let expr = KismetExpression::new(&json!({
        "Inst": "EX_CallMath",
        "Function": {
            "ObjectName": "Function'KismetMathLibrary:Add_IntInt'",
            "ObjectPath": "/Script/Engine.KismetMathLibrary"
        },
        "Parameters": [
            {"Inst": "EX_IntZero"},
            {"Inst": "EX_IntOne"}
        ]
    }))
    .expect("Failed to decode");

    assert_eq!(
        expr.ast_value().to_json(),
        json!({
            "inst": "EX_CallMath",
            "kind": "call math",
            "func": {
                "uetype": "Function",
                "outer": "KismetMathLibrary",
                "name": "Add_IntInt",
                "objpath": "Engine.KismetMathLibrary"
            },
            "params": [
                {"inst": "EX_IntZero", "kind": "int", "value": "0"},
                {"inst": "EX_IntOne", "kind": "int", "value": "1"}
            ]
        })
    );
}

#[test]
fn test_decode_switch_value() {
    let expr = KismetExpression::new(&json!({
        "Inst": "EX_SwitchValue",
        "IndexTerm": {"Inst": "EX_IntZero"},
        "EndGotoOffset": 90,
        "Cases": [{
            "CaseIndexValueTerm": {"Inst": "EX_IntOne"},
            "NextOffset": 60,
            "CaseTerm": {"Inst": "EX_True"}
        }],
        "DefaultTerm": {"Inst": "EX_False"}
    }))
    .expect("Failed to decode");

    assert_eq!(
        expr.ast_value().to_json(),
        json!({
            "inst": "EX_SwitchValue",
            "kind": "switch value",
            "sw_index": {"inst": "EX_IntZero", "kind": "int", "value": "0"},
            "end_goto": 90,
            "cases": [{
                "case_index": {"inst": "EX_IntOne", "kind": "int", "value": "1"},
                "next_offset": 60,
                "case_term": {"inst": "EX_True", "kind": "bool", "value": "true"}
            }],
            "default": {"inst": "EX_False", "kind": "bool", "value": "false"}
        })
    );
}

#[test]
fn test_decode_context_without_rvalue() {
    let expr = KismetExpression::new(&json!({
        "Inst": "EX_Context",
        "ObjectExpression": {
            "Inst": "EX_InstanceVariable",
            "Variable": {"Property": {"Name": "Door", "Type": "ObjectProperty"}}
        },
        "Offset": 24,
        "RValuePointer": null,
        "ContextExpression": {
            "Inst": "EX_VirtualFunction",
            "Function": "Open",
            "Parameters": []
        }
    }))
    .expect("Failed to decode");

    let value = expr.ast_value().to_json();
    assert_eq!(value["kind"], json!("ctx"));
    assert_eq!(value["offset"], json!(24));
    assert_eq!(value["rvalue_ptr"], json!("null"));
    assert_eq!(value["ctx_expr"]["kind"], json!("virt func"));
}

#[test]
fn test_decode_context_with_rvalue() {
    let expr = KismetExpression::new(&json!({
        "Inst": "EX_Context",
        "ObjectExpression": {"Inst": "EX_Self"},
        "Offset": 24,
        "RValuePointer": {"Property": {"Name": "Result", "Type": "BoolProperty"}},
        "ContextExpression": {"Inst": "EX_Nothing"}
    }))
    .expect("Failed to decode");

    let value = expr.ast_value().to_json();
    assert_eq!(
        value["rvalue_ptr"],
        json!({"kind": "rvalue ptr", "name": "Result", "type": "BoolProperty"})
    );
}

#[test]
fn test_decode_dynamic_cast_kinds() {
    let class_cast = KismetExpression::new(&json!({
        "Inst": "EX_DynamicCast",
        "Target": {"Inst": "EX_Self"},
        "Class": {"ObjectName": "Class'BP_Door_C'", "ObjectPath": "/Game/Doors/BP_Door"}
    }))
    .expect("Failed to decode");
    assert_eq!(class_cast.get_kind(), "dyn cast class");

    let interface_cast = KismetExpression::new(&json!({
        "Inst": "EX_DynamicCast",
        "Target": {"Inst": "EX_Self"},
        "InterfaceClass": {"ObjectName": "Class'Openable'", "ObjectPath": "/Game/Doors/Openable"}
    }))
    .expect("Failed to decode");
    assert_eq!(interface_cast.get_kind(), "dyn cast intf class");
}

#[test]
fn test_decode_jump() {
    let expr = KismetExpression::new(&json!({
        "Inst": "EX_Jump",
        "CodeOffset": 4,
        "ObjectPath": "/Game/Doors/BP_Door.ExecuteUbergraph_BP_Door"
    }))
    .expect("Failed to decode");

    assert!(expr.no_flow());
    assert_eq!(
        expr.ast_value().to_json(),
        json!({
            "inst": "EX_Jump",
            "kind": "jump",
            "jmp_offset": "4",
            "objpath": "BP_Door.ExecuteUbergraph_BP_Door",
            "no_flow": true
        })
    );
}

#[test]
fn test_decode_pop_execution_flow() {
    let expr = KismetExpression::new(&json!({"Inst": "EX_PopExecutionFlow"}))
        .expect("Failed to decode");

    assert!(expr.no_flow());
    assert_eq!(
        expr.ast_value().to_json(),
        json!({
            "inst": "EX_PopExecutionFlow",
            "kind": "pop exec",
            "pop_addr": null,
            "no_flow": true
        })
    );
}

#[test]
fn test_decode_zero_operand_constants() {
    let cases = [
        (json!({"Inst": "EX_True"}), "bool", "true"),
        (json!({"Inst": "EX_False"}), "bool", "false"),
        (json!({"Inst": "EX_Self"}), "self", "<Self>"),
        (json!({"Inst": "EX_NoObject"}), "no obj", "<No Obj>"),
        (json!({"Inst": "EX_NoInterface"}), "no intf", "<No Intf>"),
    ];
    for (input, kind, value) in cases {
        let expr = KismetExpression::new(&input).expect("Failed to decode");
        let json = expr.ast_value().to_json();
        assert_eq!(json["kind"], json!(kind));
        assert_eq!(json["value"], json!(value));
    }
}

#[test]
fn test_decode_computed_jump() {
    let expr = KismetExpression::new(&json!({
        "Inst": "EX_ComputedJump",
        "OffsetExpression": {
            "Inst": "EX_InstanceVariable",
            "Variable": {"Property": {"Name": "EntryPoint", "Type": "IntProperty"}}
        }
    }))
    .expect("Failed to decode");

    assert!(expr.no_flow());
    assert_eq!(expr.get_kind(), "computed jump");
}

#[test]
fn test_unknown_instruction_is_fatal() {
    let result = KismetExpression::new(&json!({"Inst": "EX_Shiny"}));

    assert!(matches!(
        result,
        Err(Error::Kismet(KismetError::UnknownExpression(_)))
    ));
}

#[test]
fn test_missing_operand_is_fatal() {
    let result = KismetExpression::new(&json!({
        "Inst": "EX_Jump",
        "ObjectPath": "/Game/Doors/BP_Door"
    }));

    assert!(matches!(
        result,
        Err(Error::Kismet(KismetError::MalformedExpression(_)))
    ));
}
