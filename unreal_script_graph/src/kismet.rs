//! Script bytecode expressions
//!
//! One struct per recognized instruction tag. [`KismetExpression::new`]
//! decodes an input node recursively; every decoded expression can lower
//! itself to an ordered [`AstValue`] tree for label layout and dumping.

use std::fmt;

use enum_dispatch::enum_dispatch;
use serde_json::Value;

use crate::error::{Error, KismetError};
use crate::types::{shorten_object_path, AstField, AstValue, ObjectReference, PropertyPointer};

/// Mapping shape of a decoded input node
pub type JsonMap = serde_json::Map<String, Value>;

macro_rules! declare_tokens {
    ($( $(#[$meta:meta])* $name:ident => $tag:literal ),* $(,)?) => {
        /// Script instruction token
        #[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
        pub enum EExprToken {
            $( $(#[$meta])* $name, )*
        }

        impl EExprToken {
            /// The instruction tag as it appears in the dumps
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( EExprToken::$name => $tag, )*
                }
            }
        }

        impl fmt::Display for EExprToken {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

declare_tokens! {
    /// A local variable.
    ExLocalVariable => "EX_LocalVariable",
    /// An object variable.
    ExInstanceVariable => "EX_InstanceVariable",
    /// Default variable for a class context.
    ExDefaultVariable => "EX_DefaultVariable",
    /// Return from function.
    ExReturn => "EX_Return",
    /// Goto a local address in code.
    ExJump => "EX_Jump",
    /// Goto if not expression.
    ExJumpIfNot => "EX_JumpIfNot",
    /// No operation.
    ExNothing => "EX_Nothing",
    /// Assign an arbitrary size value to a variable.
    ExLet => "EX_Let",
    /// Class default object context.
    ExClassContext => "EX_ClassContext",
    /// Let boolean variable.
    ExLetBool => "EX_LetBool",
    /// Self object.
    ExSelf => "EX_Self",
    /// Call a function through an object context.
    ExContext => "EX_Context",
    /// A function call with parameters.
    ExVirtualFunction => "EX_VirtualFunction",
    /// A prebound function call with parameters.
    ExFinalFunction => "EX_FinalFunction",
    /// Int constant.
    ExIntConst => "EX_IntConst",
    /// Floating point constant.
    ExFloatConst => "EX_FloatConst",
    /// String constant.
    ExStringConst => "EX_StringConst",
    /// An object constant.
    ExObjectConst => "EX_ObjectConst",
    /// A name constant.
    ExNameConst => "EX_NameConst",
    /// A rotation constant.
    ExRotationConst => "EX_RotationConst",
    /// A vector constant.
    ExVectorConst => "EX_VectorConst",
    /// A byte constant.
    ExByteConst => "EX_ByteConst",
    /// Zero.
    ExIntZero => "EX_IntZero",
    /// One.
    ExIntOne => "EX_IntOne",
    /// Bool True.
    ExTrue => "EX_True",
    /// Bool False.
    ExFalse => "EX_False",
    /// FText constant.
    ExTextConst => "EX_TextConst",
    /// NoObject.
    ExNoObject => "EX_NoObject",
    /// A transform constant.
    ExTransformConst => "EX_TransformConst",
    /// A null interface.
    ExNoInterface => "EX_NoInterface",
    /// Safe dynamic class casting.
    ExDynamicCast => "EX_DynamicCast",
    /// An arbitrary UStruct constant.
    ExStructConst => "EX_StructConst",
    /// Set the value of arbitrary array.
    ExSetArray => "EX_SetArray",
    /// 64-bit integer constant.
    ExInt64Const => "EX_Int64Const",
    /// Context expression to address a property within a struct.
    ExStructMemberContext => "EX_StructMemberContext",
    /// Call a virtual function that is known to run only locally.
    ExLocalVirtualFunction => "EX_LocalVirtualFunction",
    /// Call a final function that is known to run only locally.
    ExLocalFinalFunction => "EX_LocalFinalFunction",
    /// Local out (pass by reference) function parameter.
    ExLocalOutVariable => "EX_LocalOutVariable",
    /// Push an address onto the execution flow stack.
    ExPushExecutionFlow => "EX_PushExecutionFlow",
    /// Continue at the last address pushed onto the execution flow stack.
    ExPopExecutionFlow => "EX_PopExecutionFlow",
    /// Goto a local address in code, specified by an integer value.
    ExComputedJump => "EX_ComputedJump",
    /// Pop the execution flow stack, if the condition is not true.
    ExPopExecutionFlowIfNot => "EX_PopExecutionFlowIfNot",
    /// Call a function through a native interface variable.
    ExInterfaceContext => "EX_InterfaceContext",
    /// Converting an object reference to native interface variable.
    ExObjToInterfaceCast => "EX_ObjToInterfaceCast",
    /// Last byte in script code.
    ExEndOfScript => "EX_EndOfScript",
    /// A CodeSizeSkipOffset constant.
    ExSkipOffsetConst => "EX_SkipOffsetConst",
    /// Adds a delegate to a multicast delegate's targets.
    ExAddMulticastDelegate => "EX_AddMulticastDelegate",
    /// Clears all delegates in a multicast target.
    ExClearMulticastDelegate => "EX_ClearMulticastDelegate",
    /// Assign to any object ref pointer.
    ExLetObj => "EX_LetObj",
    /// Assign to a weak object pointer.
    ExLetWeakObjPtr => "EX_LetWeakObjPtr",
    /// Bind object and name to delegate.
    ExBindDelegate => "EX_BindDelegate",
    /// Remove a delegate from a multicast delegate's targets.
    ExRemoveMulticastDelegate => "EX_RemoveMulticastDelegate",
    /// Call multicast delegate.
    ExCallMulticastDelegate => "EX_CallMulticastDelegate",
    /// Let value on persistent frame.
    ExLetValueOnPersistentFrame => "EX_LetValueOnPersistentFrame",
    /// Declare an array const.
    ExArrayConst => "EX_ArrayConst",
    /// Declare a soft object const.
    ExSoftObjectConst => "EX_SoftObjectConst",
    /// Static pure function from on local call space.
    ExCallMath => "EX_CallMath",
    /// Switch value.
    ExSwitchValue => "EX_SwitchValue",
    /// Get array by ref.
    ExArrayGetByRef => "EX_ArrayGetByRef",
    /// A bitfield constant.
    ExBitFieldConst => "EX_BitFieldConst",
    /// A double constant.
    ExDoubleConst => "EX_DoubleConst",
    /// A primitive cast with an explicit conversion type.
    ExCast => "EX_Cast",
}

/// Core data of a script expression
#[enum_dispatch]
pub trait KismetExpressionDataTrait {
    /// Get the expression's instruction token
    fn get_token(&self) -> EExprToken;
    /// Get the expression's short display kind
    fn get_kind(&self) -> &'static str;
    /// Whether control does not fall through after this statement
    fn no_flow(&self) -> bool;
}

/// Ordered operand attributes of a script expression
#[enum_dispatch]
pub trait KismetExpressionFieldsTrait {
    /// Operand attributes in render order
    fn ast_fields(&self) -> Vec<AstField>;
}

fn operand<'a>(obj: &'a JsonMap, token: EExprToken, name: &str) -> Result<&'a Value, Error> {
    obj.get(name)
        .ok_or_else(|| KismetError::expression(format!("{token} is missing {name}")).into())
}

fn text_operand(obj: &JsonMap, token: EExprToken, name: &str) -> Result<String, Error> {
    let value = operand(obj, token, name)?;
    let text = value.as_str().ok_or_else(|| {
        KismetError::expression(format!("{token} operand {name} is not a string: {value}"))
    })?;
    Ok(text.to_string())
}

fn index_operand(obj: &JsonMap, token: EExprToken, name: &str) -> Result<usize, Error> {
    let value = operand(obj, token, name)?;
    let index = value.as_u64().ok_or_else(|| {
        KismetError::expression(format!("{token} operand {name} is not an index: {value}"))
    })?;
    Ok(index as usize)
}

fn expr_operand(obj: &JsonMap, token: EExprToken, name: &str) -> Result<KismetExpression, Error> {
    KismetExpression::new(operand(obj, token, name)?)
}

fn expr_list_operand(
    obj: &JsonMap,
    token: EExprToken,
    name: &str,
) -> Result<Vec<KismetExpression>, Error> {
    let value = operand(obj, token, name)?;
    let list = value.as_array().ok_or_else(|| {
        KismetError::expression(format!("{token} operand {name} is not a sequence: {value}"))
    })?;
    list.iter().map(KismetExpression::new).collect()
}

fn objref_operand(obj: &JsonMap, token: EExprToken, name: &str) -> Result<ObjectReference, Error> {
    ObjectReference::new(operand(obj, token, name)?)
}

fn prop_operand(obj: &JsonMap, token: EExprToken, name: &str) -> Result<PropertyPointer, Error> {
    PropertyPointer::new(operand(obj, token, name)?)
}

/// Render a scalar operand the way it should appear in a label
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn expr_list_values(exprs: &[KismetExpression]) -> AstValue {
    AstValue::List(exprs.iter().map(KismetExpression::ast_value).collect())
}

macro_rules! declare_expression {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal $(, no_flow: $no_flow:literal)? {
            $(
                $(#[$field_meta:meta])*
                $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            $(
                $(#[$field_meta])*
                pub $field: $ty,
            )*
        }

        impl KismetExpressionDataTrait for $name {
            fn get_token(&self) -> EExprToken { EExprToken::$name }
            fn get_kind(&self) -> &'static str { $kind }
            fn no_flow(&self) -> bool { false $(|| $no_flow)? }
        }
    };
}

macro_rules! implement_unit_expression {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal $(, no_flow: $no_flow:literal)?
    ) => {
        declare_expression!($(#[$meta])* $name, $kind $(, no_flow: $no_flow)? {});

        impl $name {
            /// Decode `$name` from an input node
            pub fn new(_obj: &JsonMap) -> Result<Self, Error> {
                Ok($name {})
            }
        }

        impl KismetExpressionFieldsTrait for $name {
            fn ast_fields(&self) -> Vec<AstField> {
                Vec::new()
            }
        }
    };
}

macro_rules! implement_const_expression {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal, $value:literal
    ) => {
        declare_expression!($(#[$meta])* $name, $kind {});

        impl $name {
            /// Decode `$name` from an input node
            pub fn new(_obj: &JsonMap) -> Result<Self, Error> {
                Ok($name {})
            }
        }

        impl KismetExpressionFieldsTrait for $name {
            fn ast_fields(&self) -> Vec<AstField> {
                vec![("value", AstValue::text($value))]
            }
        }
    };
}

macro_rules! implement_value_expression {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal
    ) => {
        declare_expression!($(#[$meta])* $name, $kind {
            /// Constant value, rendered as text
            value: String,
        });

        impl $name {
            /// Decode `$name` from an input node
            pub fn new(obj: &JsonMap) -> Result<Self, Error> {
                Ok($name {
                    value: scalar_text(operand(obj, EExprToken::$name, "Value")?),
                })
            }
        }

        impl KismetExpressionFieldsTrait for $name {
            fn ast_fields(&self) -> Vec<AstField> {
                vec![("value", AstValue::text(&self.value))]
            }
        }
    };
}

macro_rules! implement_string_expression {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal
    ) => {
        declare_expression!($(#[$meta])* $name, $kind {
            /// Constant value
            value: String,
        });

        impl $name {
            /// Decode `$name` from an input node
            pub fn new(obj: &JsonMap) -> Result<Self, Error> {
                Ok($name {
                    value: text_operand(obj, EExprToken::$name, "Value")?,
                })
            }
        }

        impl KismetExpressionFieldsTrait for $name {
            fn ast_fields(&self) -> Vec<AstField> {
                vec![("value", AstValue::text(&self.value))]
            }
        }
    };
}

macro_rules! implement_raw_expression {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal, $field:ident, $key:literal
    ) => {
        declare_expression!($(#[$meta])* $name, $kind {
            /// Payload carried verbatim
            $field: Value,
        });

        impl $name {
            /// Decode `$name` from an input node
            pub fn new(obj: &JsonMap) -> Result<Self, Error> {
                Ok($name {
                    $field: operand(obj, EExprToken::$name, $key)?.clone(),
                })
            }
        }

        impl KismetExpressionFieldsTrait for $name {
            fn ast_fields(&self) -> Vec<AstField> {
                vec![(stringify!($field), AstValue::Raw(self.$field.clone()))]
            }
        }
    };
}

macro_rules! implement_let_expression {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal
    ) => {
        declare_expression!($(#[$meta])* $name, $kind {
            /// Variable assigned to
            var: Box<KismetExpression>,
            /// Expression assigned from
            expr: Box<KismetExpression>,
        });

        impl $name {
            /// Decode `$name` from an input node
            pub fn new(obj: &JsonMap) -> Result<Self, Error> {
                Ok($name {
                    var: Box::new(expr_operand(obj, EExprToken::$name, "Variable")?),
                    expr: Box::new(expr_operand(obj, EExprToken::$name, "Expression")?),
                })
            }
        }

        impl KismetExpressionFieldsTrait for $name {
            fn ast_fields(&self) -> Vec<AstField> {
                vec![
                    ("var", self.var.ast_value()),
                    ("expr", self.expr.ast_value()),
                ]
            }
        }
    };
}

macro_rules! implement_function_expression {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal, $func_key:literal, $params_key:literal
    ) => {
        declare_expression!($(#[$meta])* $name, $kind {
            /// Called function or constructed struct
            func: ObjectReference,
            /// Call parameters
            params: Vec<KismetExpression>,
        });

        impl $name {
            /// Decode `$name` from an input node
            pub fn new(obj: &JsonMap) -> Result<Self, Error> {
                Ok($name {
                    func: objref_operand(obj, EExprToken::$name, $func_key)?,
                    params: expr_list_operand(obj, EExprToken::$name, $params_key)?,
                })
            }
        }

        impl KismetExpressionFieldsTrait for $name {
            fn ast_fields(&self) -> Vec<AstField> {
                vec![
                    ("func", self.func.ast_value()),
                    ("params", expr_list_values(&self.params)),
                ]
            }
        }
    };
}

macro_rules! implement_variable_expression {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal
    ) => {
        declare_expression!($(#[$meta])* $name, $kind {
            /// Accessed property
            variable: PropertyPointer,
        });

        impl $name {
            /// Decode `$name` from an input node
            pub fn new(obj: &JsonMap) -> Result<Self, Error> {
                Ok($name {
                    variable: prop_operand(obj, EExprToken::$name, "Variable")?,
                })
            }
        }

        impl KismetExpressionFieldsTrait for $name {
            fn ast_fields(&self) -> Vec<AstField> {
                self.variable.ast_fields()
            }
        }
    };
}

macro_rules! implement_context_expression {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal
    ) => {
        declare_expression!($(#[$meta])* $name, $kind {
            /// Object providing the context
            obj_expr: Box<KismetExpression>,
            /// Skip offset past the context expression
            offset: u64,
            /// Property to assign through, when the context yields an rvalue
            rvalue_ptr: Option<PropertyPointer>,
            /// Expression evaluated inside the context
            ctx_expr: Box<KismetExpression>,
        });

        impl $name {
            /// Decode `$name` from an input node
            pub fn new(obj: &JsonMap) -> Result<Self, Error> {
                let token = EExprToken::$name;
                let rvalue = operand(obj, token, "RValuePointer")?;
                let rvalue_ptr = match rvalue {
                    Value::Null => None,
                    other => Some(PropertyPointer::new(other)?),
                };
                let offset = operand(obj, token, "Offset")?;
                let offset = offset.as_u64().ok_or_else(|| {
                    KismetError::expression(format!("{token} operand Offset is not a number: {offset}"))
                })?;
                Ok($name {
                    obj_expr: Box::new(expr_operand(obj, token, "ObjectExpression")?),
                    offset,
                    rvalue_ptr,
                    ctx_expr: Box::new(expr_operand(obj, token, "ContextExpression")?),
                })
            }
        }

        impl KismetExpressionFieldsTrait for $name {
            fn ast_fields(&self) -> Vec<AstField> {
                let rvalue_ptr = match &self.rvalue_ptr {
                    Some(prop) => prop.ast_value_with_kind("rvalue ptr"),
                    None => AstValue::text("null"),
                };
                vec![
                    ("obj_expr", self.obj_expr.ast_value()),
                    ("offset", AstValue::Int(self.offset)),
                    ("rvalue_ptr", rvalue_ptr),
                    ("ctx_expr", self.ctx_expr.ast_value()),
                ]
            }
        }
    };
}

macro_rules! implement_multicast_expression {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal
    ) => {
        declare_expression!($(#[$meta])* $name, $kind {
            /// Multicast delegate operated on
            multi_dele: Box<KismetExpression>,
            /// Delegate added or removed
            delegate: Box<KismetExpression>,
        });

        impl $name {
            /// Decode `$name` from an input node
            pub fn new(obj: &JsonMap) -> Result<Self, Error> {
                Ok($name {
                    multi_dele: Box::new(expr_operand(obj, EExprToken::$name, "MulticastDelegate")?),
                    delegate: Box::new(expr_operand(obj, EExprToken::$name, "Delegate")?),
                })
            }
        }

        impl KismetExpressionFieldsTrait for $name {
            fn ast_fields(&self) -> Vec<AstField> {
                vec![
                    ("multi_dele", self.multi_dele.ast_value()),
                    ("delegate", self.delegate.ast_value()),
                ]
            }
        }
    };
}

// Zero-operand constants.
implement_const_expression!(
    /// Zero.
    ExIntZero, "int", "0"
);
implement_const_expression!(
    /// One.
    ExIntOne, "int", "1"
);
implement_const_expression!(
    /// Bool True.
    ExTrue, "bool", "true"
);
implement_const_expression!(
    /// Bool False.
    ExFalse, "bool", "false"
);
implement_const_expression!(
    /// Self object.
    ExSelf, "self", "<Self>"
);
implement_const_expression!(
    /// NoObject.
    ExNoObject, "no obj", "<No Obj>"
);
implement_const_expression!(
    /// A null interface.
    ExNoInterface, "no intf", "<No Intf>"
);
implement_unit_expression!(
    /// No operation.
    ExNothing, "void"
);
implement_unit_expression!(
    /// Last byte in script code.
    ExEndOfScript, "script end", no_flow: true
);

// Numeric constants, rendered as text.
implement_value_expression!(
    /// A byte constant.
    ExByteConst, "byte"
);
implement_value_expression!(
    /// Int constant.
    ExIntConst, "int"
);
implement_value_expression!(
    /// 64-bit integer constant.
    ExInt64Const, "int64"
);
implement_value_expression!(
    /// A CodeSizeSkipOffset constant.
    ExSkipOffsetConst, "skip offset"
);
implement_value_expression!(
    /// Floating point constant.
    ExFloatConst, "float"
);
implement_value_expression!(
    /// A double constant.
    ExDoubleConst, "double"
);

// Textual constants.
implement_string_expression!(
    /// String constant.
    ExStringConst, "str"
);
implement_string_expression!(
    /// A name constant.
    ExNameConst, "name"
);
implement_raw_expression!(
    /// FText constant, carried verbatim since text literals may be structured.
    ExTextConst, "text", value, "Value"
);

// Struct constants, carried verbatim.
implement_raw_expression!(
    /// A vector constant.
    ExVectorConst, "const vec", value, "Value"
);
implement_raw_expression!(
    /// A rotation constant.
    ExRotationConst, "const rot", value, "Value"
);
implement_raw_expression!(
    /// A transform constant.
    ExTransformConst, "const trans", value, "Value"
);

implement_raw_expression!(
    /// Call a function through a native interface variable.
    ExInterfaceContext, "intf ctx", intf_value, "InterfaceValue"
);

// Contexts.
implement_context_expression!(
    /// Call a function through an object context.
    ExContext, "ctx"
);
implement_context_expression!(
    /// Class default object context.
    ExClassContext, "class ctx"
);

// Function calls.
implement_function_expression!(
    /// Static pure function from on local call space.
    ExCallMath, "call math", "Function", "Parameters"
);
implement_function_expression!(
    /// A prebound function call with parameters.
    ExFinalFunction, "final func", "Function", "Parameters"
);
implement_function_expression!(
    /// Call a final function that is known to run only locally.
    ExLocalFinalFunction, "local final func", "Function", "Parameters"
);
implement_function_expression!(
    /// A function call with parameters.
    ExVirtualFunction, "virt func", "Function", "Parameters"
);
implement_function_expression!(
    /// Call a virtual function that is known to run only locally.
    ExLocalVirtualFunction, "local virt func", "Function", "Parameters"
);
implement_function_expression!(
    /// An arbitrary UStruct constant.
    ExStructConst, "struct const", "Struct", "Properties"
);

declare_expression!(
    /// Call multicast delegate.
    ExCallMulticastDelegate, "call multi dele" {
        /// Called function
        func: ObjectReference,
        /// Call parameters
        params: Vec<KismetExpression>,
        /// Delegate called through
        delegate: Box<KismetExpression>,
    }
);

impl ExCallMulticastDelegate {
    /// Decode `ExCallMulticastDelegate` from an input node
    pub fn new(obj: &JsonMap) -> Result<Self, Error> {
        let token = EExprToken::ExCallMulticastDelegate;
        Ok(ExCallMulticastDelegate {
            func: objref_operand(obj, token, "FunctionName")?,
            params: expr_list_operand(obj, token, "Parameters")?,
            delegate: Box::new(expr_operand(obj, token, "Delegate")?),
        })
    }
}

impl KismetExpressionFieldsTrait for ExCallMulticastDelegate {
    fn ast_fields(&self) -> Vec<AstField> {
        vec![
            ("func", self.func.ast_value()),
            ("params", expr_list_values(&self.params)),
            ("delegate", self.delegate.ast_value()),
        ]
    }
}

// Assignments.
implement_let_expression!(
    /// Assign an arbitrary size value to a variable.
    ExLet, "let"
);
implement_let_expression!(
    /// Let boolean variable.
    ExLetBool, "let bool"
);
implement_let_expression!(
    /// Assign to any object ref pointer.
    ExLetObj, "let obj"
);
implement_let_expression!(
    /// Assign to a weak object pointer.
    ExLetWeakObjPtr, "let weak obj ptr"
);

declare_expression!(
    /// Let value on persistent frame.
    ExLetValueOnPersistentFrame, "let val on p.f." {
        /// Destination property on the persistent frame
        var: PropertyPointer,
        /// Expression assigned from
        expr: Box<KismetExpression>,
    }
);

impl ExLetValueOnPersistentFrame {
    /// Decode `ExLetValueOnPersistentFrame` from an input node
    pub fn new(obj: &JsonMap) -> Result<Self, Error> {
        let token = EExprToken::ExLetValueOnPersistentFrame;
        Ok(ExLetValueOnPersistentFrame {
            var: prop_operand(obj, token, "DestinationProperty")?,
            expr: Box::new(expr_operand(obj, token, "AssignmentExpression")?),
        })
    }
}

impl KismetExpressionFieldsTrait for ExLetValueOnPersistentFrame {
    fn ast_fields(&self) -> Vec<AstField> {
        vec![
            ("var", self.var.ast_value_with_kind("val on p.f.")),
            ("expr", self.expr.ast_value()),
        ]
    }
}

declare_expression!(
    /// Context expression to address a property within a struct.
    ExStructMemberContext, "struct mmb ctx" {
        /// Addressed struct member
        var: PropertyPointer,
        /// Expression yielding the struct
        expr: Box<KismetExpression>,
    }
);

impl ExStructMemberContext {
    /// Decode `ExStructMemberContext` from an input node
    pub fn new(obj: &JsonMap) -> Result<Self, Error> {
        let token = EExprToken::ExStructMemberContext;
        Ok(ExStructMemberContext {
            var: prop_operand(obj, token, "Property")?,
            expr: Box::new(expr_operand(obj, token, "StructExpression")?),
        })
    }
}

impl KismetExpressionFieldsTrait for ExStructMemberContext {
    fn ast_fields(&self) -> Vec<AstField> {
        vec![
            ("var", self.var.ast_value_with_kind("struct mmb")),
            ("expr", self.expr.ast_value()),
        ]
    }
}

declare_expression!(
    /// Set the value of arbitrary array.
    ExSetArray, "set array" {
        /// Array variable assigned to
        prop: Box<KismetExpression>,
        /// Assigned elements
        elements: Vec<KismetExpression>,
    }
);

impl ExSetArray {
    /// Decode `ExSetArray` from an input node
    pub fn new(obj: &JsonMap) -> Result<Self, Error> {
        let token = EExprToken::ExSetArray;
        Ok(ExSetArray {
            prop: Box::new(expr_operand(obj, token, "AssigningProperty")?),
            elements: expr_list_operand(obj, token, "Elements")?,
        })
    }
}

impl KismetExpressionFieldsTrait for ExSetArray {
    fn ast_fields(&self) -> Vec<AstField> {
        vec![
            ("prop", self.prop.ast_value()),
            ("elements", expr_list_values(&self.elements)),
        ]
    }
}

declare_expression!(
    /// Get array by ref.
    ExArrayGetByRef, "array get by ref" {
        /// Array indexed into
        array_var: Box<KismetExpression>,
        /// Element index
        array_index: Box<KismetExpression>,
    }
);

impl ExArrayGetByRef {
    /// Decode `ExArrayGetByRef` from an input node
    pub fn new(obj: &JsonMap) -> Result<Self, Error> {
        let token = EExprToken::ExArrayGetByRef;
        Ok(ExArrayGetByRef {
            array_var: Box::new(expr_operand(obj, token, "ArrayVariable")?),
            array_index: Box::new(expr_operand(obj, token, "ArrayIndex")?),
        })
    }
}

impl KismetExpressionFieldsTrait for ExArrayGetByRef {
    fn ast_fields(&self) -> Vec<AstField> {
        vec![
            ("array_var", self.array_var.ast_value()),
            ("array_index", self.array_index.ast_value()),
        ]
    }
}

declare_expression!(
    /// Declare an array const.
    ExArrayConst, "arr const" {
        /// Element property of the array
        inner_prop: PropertyPointer,
        /// Constant elements
        values: Vec<KismetExpression>,
    }
);

impl ExArrayConst {
    /// Decode `ExArrayConst` from an input node
    pub fn new(obj: &JsonMap) -> Result<Self, Error> {
        let token = EExprToken::ExArrayConst;
        Ok(ExArrayConst {
            inner_prop: prop_operand(obj, token, "InnerProperty")?,
            values: expr_list_operand(obj, token, "Values")?,
        })
    }
}

impl KismetExpressionFieldsTrait for ExArrayConst {
    fn ast_fields(&self) -> Vec<AstField> {
        vec![
            ("inner_prop", self.inner_prop.ast_value_with_kind("inner prop")),
            ("values", expr_list_values(&self.values)),
        ]
    }
}

declare_expression!(
    /// A bitfield constant.
    ExBitFieldConst, "bitfld const" {
        /// Bitfield property
        inner_prop: PropertyPointer,
        /// Constant bits, carried verbatim
        const_value: Value,
    }
);

impl ExBitFieldConst {
    /// Decode `ExBitFieldConst` from an input node
    pub fn new(obj: &JsonMap) -> Result<Self, Error> {
        let token = EExprToken::ExBitFieldConst;
        Ok(ExBitFieldConst {
            inner_prop: prop_operand(obj, token, "InnerProperty")?,
            const_value: operand(obj, token, "ConstValue")?.clone(),
        })
    }
}

impl KismetExpressionFieldsTrait for ExBitFieldConst {
    fn ast_fields(&self) -> Vec<AstField> {
        vec![
            ("inner_prop", self.inner_prop.ast_value_with_kind("inner prop")),
            ("const_value", AstValue::Raw(self.const_value.clone())),
        ]
    }
}

declare_expression!(
    /// Declare a soft object const.
    ExSoftObjectConst, "soft obj" {
        /// Inner path expression
        value: Box<KismetExpression>,
    }
);

impl ExSoftObjectConst {
    /// Decode `ExSoftObjectConst` from an input node
    pub fn new(obj: &JsonMap) -> Result<Self, Error> {
        Ok(ExSoftObjectConst {
            value: Box::new(expr_operand(obj, EExprToken::ExSoftObjectConst, "Value")?),
        })
    }
}

impl KismetExpressionFieldsTrait for ExSoftObjectConst {
    fn ast_fields(&self) -> Vec<AstField> {
        vec![("value", self.value.ast_value())]
    }
}

declare_expression!(
    /// An object constant.
    ExObjectConst, "obj" {
        /// Referenced object
        value: ObjectReference,
    }
);

impl ExObjectConst {
    /// Decode `ExObjectConst` from an input node
    pub fn new(obj: &JsonMap) -> Result<Self, Error> {
        Ok(ExObjectConst {
            value: objref_operand(obj, EExprToken::ExObjectConst, "Value")?,
        })
    }
}

impl KismetExpressionFieldsTrait for ExObjectConst {
    fn ast_fields(&self) -> Vec<AstField> {
        vec![("value", self.value.ast_value())]
    }
}

declare_expression!(
    /// A primitive cast with an explicit conversion type.
    ExCast, "cast" {
        /// Expression being cast
        target: Box<KismetExpression>,
        /// Conversion type tag, carried verbatim
        conv_type: Value,
    }
);

impl ExCast {
    /// Decode `ExCast` from an input node
    pub fn new(obj: &JsonMap) -> Result<Self, Error> {
        let token = EExprToken::ExCast;
        Ok(ExCast {
            target: Box::new(expr_operand(obj, token, "Target")?),
            conv_type: operand(obj, token, "ConversionType")?.clone(),
        })
    }
}

impl KismetExpressionFieldsTrait for ExCast {
    fn ast_fields(&self) -> Vec<AstField> {
        vec![
            ("target", self.target.ast_value()),
            ("conv_type", AstValue::Raw(self.conv_type.clone())),
        ]
    }
}

/// Safe dynamic class casting.
#[derive(Debug, Clone, PartialEq)]
pub struct ExDynamicCast {
    /// True when the cast targets an interface class
    pub to_interface: bool,
    /// Expression being cast
    pub target: Box<KismetExpression>,
    /// Class cast to
    pub clazz: ObjectReference,
}

impl ExDynamicCast {
    /// Decode `ExDynamicCast` from an input node
    pub fn new(obj: &JsonMap) -> Result<Self, Error> {
        let token = EExprToken::ExDynamicCast;
        let (to_interface, clazz) = if let Some(class) = obj.get("Class") {
            (false, ObjectReference::new(class)?)
        } else if let Some(class) = obj.get("InterfaceClass") {
            (true, ObjectReference::new(class)?)
        } else {
            return Err(KismetError::expression(format!(
                "{token} is missing Class or InterfaceClass"
            ))
            .into());
        };
        Ok(ExDynamicCast {
            to_interface,
            target: Box::new(expr_operand(obj, token, "Target")?),
            clazz,
        })
    }
}

impl KismetExpressionDataTrait for ExDynamicCast {
    fn get_token(&self) -> EExprToken {
        EExprToken::ExDynamicCast
    }

    fn get_kind(&self) -> &'static str {
        match self.to_interface {
            false => "dyn cast class",
            true => "dyn cast intf class",
        }
    }

    fn no_flow(&self) -> bool {
        false
    }
}

impl KismetExpressionFieldsTrait for ExDynamicCast {
    fn ast_fields(&self) -> Vec<AstField> {
        vec![
            ("target", self.target.ast_value()),
            ("clazz", self.clazz.ast_value()),
        ]
    }
}

declare_expression!(
    /// Converting an object reference to native interface variable.
    ExObjToInterfaceCast, "obj to intf cast" {
        /// Expression being cast
        target: Box<KismetExpression>,
        /// Interface class cast to
        clazz: ObjectReference,
    }
);

impl ExObjToInterfaceCast {
    /// Decode `ExObjToInterfaceCast` from an input node
    pub fn new(obj: &JsonMap) -> Result<Self, Error> {
        let token = EExprToken::ExObjToInterfaceCast;
        Ok(ExObjToInterfaceCast {
            target: Box::new(expr_operand(obj, token, "Target")?),
            clazz: objref_operand(obj, token, "InterfaceClass")?,
        })
    }
}

impl KismetExpressionFieldsTrait for ExObjToInterfaceCast {
    fn ast_fields(&self) -> Vec<AstField> {
        vec![
            ("target", self.target.ast_value()),
            ("clazz", self.clazz.ast_value()),
        ]
    }
}

// Variable accessors.
implement_variable_expression!(
    /// An object variable.
    ExInstanceVariable, "instance var"
);
implement_variable_expression!(
    /// A local variable.
    ExLocalVariable, "local var"
);
implement_variable_expression!(
    /// Local out (pass by reference) function parameter.
    ExLocalOutVariable, "local out var"
);
implement_variable_expression!(
    /// Default variable for a class context.
    ExDefaultVariable, "def var"
);

declare_expression!(
    /// Goto a local address in code, specified by an integer value.
    ExComputedJump, "computed jump", no_flow: true {
        /// Expression computing the target address
        expr: Box<KismetExpression>,
    }
);

impl ExComputedJump {
    /// Decode `ExComputedJump` from an input node
    pub fn new(obj: &JsonMap) -> Result<Self, Error> {
        Ok(ExComputedJump {
            expr: Box::new(expr_operand(obj, EExprToken::ExComputedJump, "OffsetExpression")?),
        })
    }
}

impl KismetExpressionFieldsTrait for ExComputedJump {
    fn ast_fields(&self) -> Vec<AstField> {
        vec![("expr", self.expr.ast_value())]
    }
}

declare_expression!(
    /// Return from function.
    ExReturn, "return" {
        /// Returned expression
        expr: Box<KismetExpression>,
    }
);

impl ExReturn {
    /// Decode `ExReturn` from an input node
    pub fn new(obj: &JsonMap) -> Result<Self, Error> {
        Ok(ExReturn {
            expr: Box::new(expr_operand(obj, EExprToken::ExReturn, "Expression")?),
        })
    }
}

impl KismetExpressionFieldsTrait for ExReturn {
    fn ast_fields(&self) -> Vec<AstField> {
        vec![("expr", self.expr.ast_value())]
    }
}

declare_expression!(
    /// Bind object and name to delegate.
    ExBindDelegate, "bind dele" {
        /// Bound function
        func: ObjectReference,
        /// Delegate bound to
        delegate: Box<KismetExpression>,
        /// Object bound through
        obj_term: Box<KismetExpression>,
    }
);

impl ExBindDelegate {
    /// Decode `ExBindDelegate` from an input node
    pub fn new(obj: &JsonMap) -> Result<Self, Error> {
        let token = EExprToken::ExBindDelegate;
        Ok(ExBindDelegate {
            func: objref_operand(obj, token, "FunctionName")?,
            delegate: Box::new(expr_operand(obj, token, "Delegate")?),
            obj_term: Box::new(expr_operand(obj, token, "ObjectTerm")?),
        })
    }
}

impl KismetExpressionFieldsTrait for ExBindDelegate {
    fn ast_fields(&self) -> Vec<AstField> {
        vec![
            ("func", self.func.ast_value()),
            ("delegate", self.delegate.ast_value()),
            ("obj_term", self.obj_term.ast_value()),
        ]
    }
}

implement_multicast_expression!(
    /// Adds a delegate to a multicast delegate's targets.
    ExAddMulticastDelegate, "add multi dele"
);
implement_multicast_expression!(
    /// Remove a delegate from a multicast delegate's targets.
    ExRemoveMulticastDelegate, "remove multi dele"
);

declare_expression!(
    /// Clears all delegates in a multicast target.
    ExClearMulticastDelegate, "clear multi dele" {
        /// Cleared delegate
        delegate: Box<KismetExpression>,
    }
);

impl ExClearMulticastDelegate {
    /// Decode `ExClearMulticastDelegate` from an input node
    pub fn new(obj: &JsonMap) -> Result<Self, Error> {
        Ok(ExClearMulticastDelegate {
            delegate: Box::new(expr_operand(
                obj,
                EExprToken::ExClearMulticastDelegate,
                "DelegateToClear",
            )?),
        })
    }
}

impl KismetExpressionFieldsTrait for ExClearMulticastDelegate {
    fn ast_fields(&self) -> Vec<AstField> {
        vec![("delegate", self.delegate.ast_value())]
    }
}

declare_expression!(
    /// Goto a local address in code.
    ExJump, "jump", no_flow: true {
        /// Target statement index
        jmp_offset: usize,
        /// Path of the jumping script object, shortened
        objpath: String,
    }
);

impl ExJump {
    /// Decode `ExJump` from an input node
    pub fn new(obj: &JsonMap) -> Result<Self, Error> {
        let token = EExprToken::ExJump;
        Ok(ExJump {
            jmp_offset: index_operand(obj, token, "CodeOffset")?,
            objpath: shorten_object_path(&text_operand(obj, token, "ObjectPath")?),
        })
    }
}

impl KismetExpressionFieldsTrait for ExJump {
    fn ast_fields(&self) -> Vec<AstField> {
        vec![
            ("jmp_offset", AstValue::Text(self.jmp_offset.to_string())),
            ("objpath", AstValue::text(&self.objpath)),
        ]
    }
}

declare_expression!(
    /// Goto if not expression.
    ExJumpIfNot, "jump if not" {
        /// Target statement index
        jmp_offset: usize,
        /// Path of the jumping script object, shortened
        objpath: String,
        /// Jump is taken when this is false
        predicate: Box<KismetExpression>,
    }
);

impl ExJumpIfNot {
    /// Decode `ExJumpIfNot` from an input node
    pub fn new(obj: &JsonMap) -> Result<Self, Error> {
        let token = EExprToken::ExJumpIfNot;
        Ok(ExJumpIfNot {
            jmp_offset: index_operand(obj, token, "CodeOffset")?,
            objpath: shorten_object_path(&text_operand(obj, token, "ObjectPath")?),
            predicate: Box::new(expr_operand(obj, token, "BooleanExpression")?),
        })
    }
}

impl KismetExpressionFieldsTrait for ExJumpIfNot {
    fn ast_fields(&self) -> Vec<AstField> {
        vec![
            ("jmp_offset", AstValue::Text(self.jmp_offset.to_string())),
            ("objpath", AstValue::text(&self.objpath)),
            ("predicate", self.predicate.ast_value()),
        ]
    }
}

declare_expression!(
    /// Push an address onto the execution flow stack.
    ExPushExecutionFlow, "push exec" {
        /// Address popped back to later
        push_addr: usize,
        /// Path of the pushing script object, shortened
        objpath: String,
    }
);

impl ExPushExecutionFlow {
    /// Decode `ExPushExecutionFlow` from an input node
    pub fn new(obj: &JsonMap) -> Result<Self, Error> {
        let token = EExprToken::ExPushExecutionFlow;
        Ok(ExPushExecutionFlow {
            push_addr: index_operand(obj, token, "PushingAddress")?,
            objpath: shorten_object_path(&text_operand(obj, token, "ObjectPath")?),
        })
    }
}

impl KismetExpressionFieldsTrait for ExPushExecutionFlow {
    fn ast_fields(&self) -> Vec<AstField> {
        vec![
            ("push_addr", AstValue::Text(self.push_addr.to_string())),
            ("objpath", AstValue::text(&self.objpath)),
        ]
    }
}

declare_expression!(
    /// Continue at the last address pushed onto the execution flow stack.
    ExPopExecutionFlow, "pop exec", no_flow: true {
        /// Resolved pop target, filled in by the stack resolver
        pop_addr: Option<usize>,
    }
);

impl ExPopExecutionFlow {
    /// Decode `ExPopExecutionFlow` from an input node
    pub fn new(_obj: &JsonMap) -> Result<Self, Error> {
        Ok(ExPopExecutionFlow { pop_addr: None })
    }
}

impl KismetExpressionFieldsTrait for ExPopExecutionFlow {
    fn ast_fields(&self) -> Vec<AstField> {
        let pop_addr = match self.pop_addr {
            Some(addr) => AstValue::Int(addr as u64),
            None => AstValue::Null,
        };
        vec![("pop_addr", pop_addr)]
    }
}

declare_expression!(
    /// Pop the execution flow stack, if the condition is not true.
    ExPopExecutionFlowIfNot, "pop exec if not" {
        /// Resolved pop target, filled in by the stack resolver
        pop_addr: Option<usize>,
        /// Pop is taken when this is false
        predicate: Box<KismetExpression>,
    }
);

impl ExPopExecutionFlowIfNot {
    /// Decode `ExPopExecutionFlowIfNot` from an input node
    pub fn new(obj: &JsonMap) -> Result<Self, Error> {
        Ok(ExPopExecutionFlowIfNot {
            pop_addr: None,
            predicate: Box::new(expr_operand(
                obj,
                EExprToken::ExPopExecutionFlowIfNot,
                "BooleanExpression",
            )?),
        })
    }
}

impl KismetExpressionFieldsTrait for ExPopExecutionFlowIfNot {
    fn ast_fields(&self) -> Vec<AstField> {
        let pop_addr = match self.pop_addr {
            Some(addr) => AstValue::Int(addr as u64),
            None => AstValue::Null,
        };
        vec![("pop_addr", pop_addr), ("predicate", self.predicate.ast_value())]
    }
}

/// A switch case decoded from an `ExSwitchValue`
#[derive(Debug, Clone, PartialEq)]
pub struct KismetSwitchCase {
    /// Value the switch index is compared against
    pub case_index: KismetExpression,
    /// Offset of the next case
    pub next_offset: usize,
    /// Expression the case yields
    pub case_term: KismetExpression,
}

impl KismetSwitchCase {
    /// Decode a `KismetSwitchCase` from an input node
    pub fn new(value: &Value) -> Result<Self, Error> {
        let obj = value.as_object().ok_or_else(|| {
            KismetError::expression(format!("Switch case is not a mapping: {value}"))
        })?;
        let token = EExprToken::ExSwitchValue;
        Ok(KismetSwitchCase {
            case_index: expr_operand(obj, token, "CaseIndexValueTerm")?,
            next_offset: index_operand(obj, token, "NextOffset")?,
            case_term: expr_operand(obj, token, "CaseTerm")?,
        })
    }

    /// Ordered attribute tree of this case
    pub fn ast_value(&self) -> AstValue {
        AstValue::Map(vec![
            ("case_index", self.case_index.ast_value()),
            ("next_offset", AstValue::Int(self.next_offset as u64)),
            ("case_term", self.case_term.ast_value()),
        ])
    }
}

declare_expression!(
    /// Switch value.
    ExSwitchValue, "switch value" {
        /// Expression selecting the case
        sw_index: Box<KismetExpression>,
        /// Offset past the whole switch
        end_goto: usize,
        /// Switch cases
        cases: Vec<KismetSwitchCase>,
        /// Expression yielded when no case matches
        default: Box<KismetExpression>,
    }
);

impl ExSwitchValue {
    /// Decode `ExSwitchValue` from an input node
    pub fn new(obj: &JsonMap) -> Result<Self, Error> {
        let token = EExprToken::ExSwitchValue;
        let cases = operand(obj, token, "Cases")?;
        let cases = cases.as_array().ok_or_else(|| {
            KismetError::expression(format!("{token} operand Cases is not a sequence: {cases}"))
        })?;
        Ok(ExSwitchValue {
            sw_index: Box::new(expr_operand(obj, token, "IndexTerm")?),
            end_goto: index_operand(obj, token, "EndGotoOffset")?,
            cases: cases.iter().map(KismetSwitchCase::new).collect::<Result<_, _>>()?,
            default: Box::new(expr_operand(obj, token, "DefaultTerm")?),
        })
    }
}

impl KismetExpressionFieldsTrait for ExSwitchValue {
    fn ast_fields(&self) -> Vec<AstField> {
        vec![
            ("sw_index", self.sw_index.ast_value()),
            ("end_goto", AstValue::Int(self.end_goto as u64)),
            (
                "cases",
                AstValue::List(self.cases.iter().map(KismetSwitchCase::ast_value).collect()),
            ),
            ("default", self.default.ast_value()),
        ]
    }
}

/// Script expression
#[enum_dispatch(KismetExpressionDataTrait, KismetExpressionFieldsTrait)]
#[derive(Debug, Clone, PartialEq)]
pub enum KismetExpression {
    /// A local variable.
    ExLocalVariable,
    /// An object variable.
    ExInstanceVariable,
    /// Default variable for a class context.
    ExDefaultVariable,
    /// Return from function.
    ExReturn,
    /// Goto a local address in code.
    ExJump,
    /// Goto if not expression.
    ExJumpIfNot,
    /// No operation.
    ExNothing,
    /// Assign an arbitrary size value to a variable.
    ExLet,
    /// Class default object context.
    ExClassContext,
    /// Let boolean variable.
    ExLetBool,
    /// Self object.
    ExSelf,
    /// Call a function through an object context.
    ExContext,
    /// A function call with parameters.
    ExVirtualFunction,
    /// A prebound function call with parameters.
    ExFinalFunction,
    /// Int constant.
    ExIntConst,
    /// Floating point constant.
    ExFloatConst,
    /// String constant.
    ExStringConst,
    /// An object constant.
    ExObjectConst,
    /// A name constant.
    ExNameConst,
    /// A rotation constant.
    ExRotationConst,
    /// A vector constant.
    ExVectorConst,
    /// A byte constant.
    ExByteConst,
    /// Zero.
    ExIntZero,
    /// One.
    ExIntOne,
    /// Bool True.
    ExTrue,
    /// Bool False.
    ExFalse,
    /// FText constant.
    ExTextConst,
    /// NoObject.
    ExNoObject,
    /// A transform constant.
    ExTransformConst,
    /// A null interface.
    ExNoInterface,
    /// Safe dynamic class casting.
    ExDynamicCast,
    /// An arbitrary UStruct constant.
    ExStructConst,
    /// Set the value of arbitrary array.
    ExSetArray,
    /// 64-bit integer constant.
    ExInt64Const,
    /// Context expression to address a property within a struct.
    ExStructMemberContext,
    /// Call a virtual function that is known to run only locally.
    ExLocalVirtualFunction,
    /// Call a final function that is known to run only locally.
    ExLocalFinalFunction,
    /// Local out (pass by reference) function parameter.
    ExLocalOutVariable,
    /// Push an address onto the execution flow stack.
    ExPushExecutionFlow,
    /// Continue at the last address pushed onto the execution flow stack.
    ExPopExecutionFlow,
    /// Goto a local address in code, specified by an integer value.
    ExComputedJump,
    /// Pop the execution flow stack, if the condition is not true.
    ExPopExecutionFlowIfNot,
    /// Call a function through a native interface variable.
    ExInterfaceContext,
    /// Converting an object reference to native interface variable.
    ExObjToInterfaceCast,
    /// Last byte in script code.
    ExEndOfScript,
    /// A CodeSizeSkipOffset constant.
    ExSkipOffsetConst,
    /// Adds a delegate to a multicast delegate's targets.
    ExAddMulticastDelegate,
    /// Clears all delegates in a multicast target.
    ExClearMulticastDelegate,
    /// Assign to any object ref pointer.
    ExLetObj,
    /// Assign to a weak object pointer.
    ExLetWeakObjPtr,
    /// Bind object and name to delegate.
    ExBindDelegate,
    /// Remove a delegate from a multicast delegate's targets.
    ExRemoveMulticastDelegate,
    /// Call multicast delegate.
    ExCallMulticastDelegate,
    /// Let value on persistent frame.
    ExLetValueOnPersistentFrame,
    /// Declare an array const.
    ExArrayConst,
    /// Declare a soft object const.
    ExSoftObjectConst,
    /// Static pure function from on local call space.
    ExCallMath,
    /// Switch value.
    ExSwitchValue,
    /// Get array by ref.
    ExArrayGetByRef,
    /// A bitfield constant.
    ExBitFieldConst,
    /// A double constant.
    ExDoubleConst,
    /// A primitive cast with an explicit conversion type.
    ExCast,
}

impl KismetExpression {
    /// Decode an expression from an input node, recursing through operand
    /// positions.
    ///
    /// Fails with a structural error on an unrecognized instruction tag or a
    /// missing operand.
    pub fn new(value: &Value) -> Result<Self, Error> {
        let obj = value.as_object().ok_or_else(|| {
            KismetError::expression(format!("Expression is not a mapping: {value}"))
        })?;
        let inst = obj.get("Inst").and_then(Value::as_str).ok_or_else(|| {
            KismetError::expression(format!("Expression without Inst: {value}"))
        })?;
        match inst {
            "EX_SwitchValue" => Ok(ExSwitchValue::new(obj)?.into()),
            "EX_Context" => Ok(ExContext::new(obj)?.into()),
            "EX_ClassContext" => Ok(ExClassContext::new(obj)?.into()),
            "EX_InterfaceContext" => Ok(ExInterfaceContext::new(obj)?.into()),
            "EX_ByteConst" => Ok(ExByteConst::new(obj)?.into()),
            "EX_IntConst" => Ok(ExIntConst::new(obj)?.into()),
            "EX_Int64Const" => Ok(ExInt64Const::new(obj)?.into()),
            "EX_SkipOffsetConst" => Ok(ExSkipOffsetConst::new(obj)?.into()),
            "EX_FloatConst" => Ok(ExFloatConst::new(obj)?.into()),
            "EX_DoubleConst" => Ok(ExDoubleConst::new(obj)?.into()),
            "EX_StringConst" => Ok(ExStringConst::new(obj)?.into()),
            "EX_TextConst" => Ok(ExTextConst::new(obj)?.into()),
            "EX_NameConst" => Ok(ExNameConst::new(obj)?.into()),
            "EX_VectorConst" => Ok(ExVectorConst::new(obj)?.into()),
            "EX_RotationConst" => Ok(ExRotationConst::new(obj)?.into()),
            "EX_TransformConst" => Ok(ExTransformConst::new(obj)?.into()),
            "EX_SoftObjectConst" => Ok(ExSoftObjectConst::new(obj)?.into()),
            "EX_ObjectConst" => Ok(ExObjectConst::new(obj)?.into()),
            "EX_ArrayConst" => Ok(ExArrayConst::new(obj)?.into()),
            "EX_BitFieldConst" => Ok(ExBitFieldConst::new(obj)?.into()),
            "EX_IntZero" => Ok(ExIntZero::new(obj)?.into()),
            "EX_IntOne" => Ok(ExIntOne::new(obj)?.into()),
            "EX_True" => Ok(ExTrue::new(obj)?.into()),
            "EX_False" => Ok(ExFalse::new(obj)?.into()),
            "EX_Self" => Ok(ExSelf::new(obj)?.into()),
            "EX_NoObject" => Ok(ExNoObject::new(obj)?.into()),
            "EX_NoInterface" => Ok(ExNoInterface::new(obj)?.into()),
            "EX_Nothing" => Ok(ExNothing::new(obj)?.into()),
            "EX_StructConst" => Ok(ExStructConst::new(obj)?.into()),
            "EX_CallMath" => Ok(ExCallMath::new(obj)?.into()),
            "EX_CallMulticastDelegate" => Ok(ExCallMulticastDelegate::new(obj)?.into()),
            "EX_FinalFunction" => Ok(ExFinalFunction::new(obj)?.into()),
            "EX_LocalFinalFunction" => Ok(ExLocalFinalFunction::new(obj)?.into()),
            "EX_VirtualFunction" => Ok(ExVirtualFunction::new(obj)?.into()),
            "EX_LocalVirtualFunction" => Ok(ExLocalVirtualFunction::new(obj)?.into()),
            "EX_Let" => Ok(ExLet::new(obj)?.into()),
            "EX_LetBool" => Ok(ExLetBool::new(obj)?.into()),
            "EX_LetObj" => Ok(ExLetObj::new(obj)?.into()),
            "EX_LetWeakObjPtr" => Ok(ExLetWeakObjPtr::new(obj)?.into()),
            "EX_LetValueOnPersistentFrame" => Ok(ExLetValueOnPersistentFrame::new(obj)?.into()),
            "EX_StructMemberContext" => Ok(ExStructMemberContext::new(obj)?.into()),
            "EX_SetArray" => Ok(ExSetArray::new(obj)?.into()),
            "EX_ArrayGetByRef" => Ok(ExArrayGetByRef::new(obj)?.into()),
            "EX_Cast" => Ok(ExCast::new(obj)?.into()),
            "EX_DynamicCast" => Ok(ExDynamicCast::new(obj)?.into()),
            "EX_ObjToInterfaceCast" => Ok(ExObjToInterfaceCast::new(obj)?.into()),
            "EX_InstanceVariable" => Ok(ExInstanceVariable::new(obj)?.into()),
            "EX_LocalVariable" => Ok(ExLocalVariable::new(obj)?.into()),
            "EX_LocalOutVariable" => Ok(ExLocalOutVariable::new(obj)?.into()),
            "EX_DefaultVariable" => Ok(ExDefaultVariable::new(obj)?.into()),
            "EX_ComputedJump" => Ok(ExComputedJump::new(obj)?.into()),
            "EX_Return" => Ok(ExReturn::new(obj)?.into()),
            "EX_BindDelegate" => Ok(ExBindDelegate::new(obj)?.into()),
            "EX_AddMulticastDelegate" => Ok(ExAddMulticastDelegate::new(obj)?.into()),
            "EX_RemoveMulticastDelegate" => Ok(ExRemoveMulticastDelegate::new(obj)?.into()),
            "EX_ClearMulticastDelegate" => Ok(ExClearMulticastDelegate::new(obj)?.into()),
            "EX_Jump" => Ok(ExJump::new(obj)?.into()),
            "EX_JumpIfNot" => Ok(ExJumpIfNot::new(obj)?.into()),
            "EX_PushExecutionFlow" => Ok(ExPushExecutionFlow::new(obj)?.into()),
            "EX_PopExecutionFlow" => Ok(ExPopExecutionFlow::new(obj)?.into()),
            "EX_PopExecutionFlowIfNot" => Ok(ExPopExecutionFlowIfNot::new(obj)?.into()),
            "EX_EndOfScript" => Ok(ExEndOfScript::new(obj)?.into()),
            _ => Err(KismetError::unknown_expression(format!(
                "Unknown instruction {inst}: {value}"
            ))
            .into()),
        }
    }

    /// All attributes of this expression in render order, `inst` first
    pub fn node_fields(&self) -> Vec<AstField> {
        let mut fields = vec![
            ("inst", AstValue::text(self.get_token().as_str())),
            ("kind", AstValue::text(self.get_kind())),
        ];
        fields.extend(self.ast_fields());
        if self.no_flow() {
            fields.push(("no_flow", AstValue::Bool(true)));
        }
        fields
    }

    /// Ordered attribute tree of this expression
    pub fn ast_value(&self) -> AstValue {
        AstValue::Map(self.node_fields())
    }
}
