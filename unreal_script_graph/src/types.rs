//! Shared types for decoded script expressions

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::error::{Error, KismetError};

/// An attribute name paired with its rendered value
pub type AstField = (&'static str, AstValue);

/// Ordered attribute tree of a decoded node.
///
/// Attribute order is load-bearing: the graph emitter lays record labels out
/// in insertion order and the intermediate dump mirrors it.
#[derive(Debug, Clone, PartialEq)]
pub enum AstValue {
    /// Scalar text
    Text(String),
    /// Boolean scalar
    Bool(bool),
    /// Numeric scalar
    Int(u64),
    /// Attribute not yet resolved
    Null,
    /// Nested node with ordered attributes
    Map(Vec<AstField>),
    /// Sequence of nested values
    List(Vec<AstValue>),
    /// Payload carried verbatim from the input document
    Raw(Value),
}

impl AstValue {
    /// Create a `Text` value from anything string-like
    pub fn text(value: impl Into<String>) -> Self {
        AstValue::Text(value.into())
    }

    /// Convert into a plain JSON value, preserving attribute order
    pub fn to_json(&self) -> Value {
        match self {
            AstValue::Text(text) => Value::String(text.clone()),
            AstValue::Bool(value) => Value::Bool(*value),
            AstValue::Int(value) => Value::Number((*value).into()),
            AstValue::Null => Value::Null,
            AstValue::Map(fields) => {
                let mut map = serde_json::Map::with_capacity(fields.len());
                for (key, value) in fields {
                    map.insert((*key).to_string(), value.to_json());
                }
                Value::Object(map)
            }
            AstValue::List(values) => Value::Array(values.iter().map(AstValue::to_json).collect()),
            AstValue::Raw(value) => value.clone(),
        }
    }
}

lazy_static! {
    static ref FULL_OBJECT_NAME: Regex = Regex::new("^(.*)'(.*):(.*)'$").unwrap();
    static ref SHORT_OBJECT_NAME: Regex = Regex::new("^(.*)'(.*)'$").unwrap();
}

/// Shorten an object path to its final `/`-separated segment
pub fn shorten_object_path(objpath: &str) -> String {
    match objpath.rfind('/') {
        Some(index) => objpath[index + 1..].to_string(),
        None => objpath.to_string(),
    }
}

/// A decoded reference to an engine object.
///
/// Parsed from an `ObjectName` of the form `TYPE'OUTER:NAME'` or
/// `TYPE'NAME'`, or from a bare string naming a local virtual function.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectReference {
    /// Engine type tag
    pub uetype: String,
    /// Outer object, when the name carried one
    pub outer: Option<String>,
    /// Object name
    pub name: String,
    /// Object path, shortened to its final segment
    pub objpath: Option<String>,
}

impl ObjectReference {
    /// Decode an object reference from an input node
    pub fn new(value: &Value) -> Result<Self, Error> {
        if let Some(name) = value.as_str() {
            return Ok(ObjectReference {
                uetype: "LocalVirtualFunction".to_string(),
                outer: None,
                name: name.to_string(),
                objpath: None,
            });
        }
        let obj = value.as_object().ok_or_else(|| {
            KismetError::object_name(format!("Object reference is not a mapping: {value}"))
        })?;
        let objname = obj.get("ObjectName").and_then(Value::as_str).ok_or_else(|| {
            KismetError::object_name(format!("Object reference without ObjectName: {value}"))
        })?;
        let objpath = obj.get("ObjectPath").and_then(Value::as_str).ok_or_else(|| {
            KismetError::object_name(format!("Object reference without ObjectPath: {value}"))
        })?;

        if let Some(captures) = FULL_OBJECT_NAME.captures(objname) {
            return Ok(ObjectReference {
                uetype: captures[1].to_string(),
                outer: Some(captures[2].to_string()),
                name: captures[3].to_string(),
                objpath: Some(shorten_object_path(objpath)),
            });
        }
        if let Some(captures) = SHORT_OBJECT_NAME.captures(objname) {
            return Ok(ObjectReference {
                uetype: captures[1].to_string(),
                outer: None,
                name: captures[2].to_string(),
                objpath: Some(shorten_object_path(objpath)),
            });
        }
        Err(KismetError::object_name(format!("Unrecognized object name: {objname}")).into())
    }

    /// Ordered attribute tree of this reference
    pub fn ast_value(&self) -> AstValue {
        let mut fields = vec![("uetype", AstValue::text(&self.uetype))];
        if let Some(outer) = &self.outer {
            fields.push(("outer", AstValue::text(outer)));
        }
        fields.push(("name", AstValue::text(&self.name)));
        if let Some(objpath) = &self.objpath {
            fields.push(("objpath", AstValue::text(objpath)));
        }
        AstValue::Map(fields)
    }
}

/// A decoded pointer to a property, in one of the three shapes the dumps
/// produce.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyPointer {
    /// `{Property: {Name, Type}}`
    Inline {
        /// Property name
        name: String,
        /// Property type
        ty: String,
    },
    /// `{Owner, Property}`
    Owned {
        /// Owning object
        owner: ObjectReference,
        /// Property name
        name: String,
        /// Property type
        ty: String,
    },
    /// `{Path, ResolvedOwner}`
    Path {
        /// Field path, carried verbatim
        name: Value,
        /// Resolved owner
        owner: ObjectReference,
    },
}

impl PropertyPointer {
    /// Decode a property descriptor from an input node
    pub fn new(value: &Value) -> Result<Self, Error> {
        let obj = value.as_object().ok_or_else(|| {
            KismetError::property(format!("Property descriptor is not a mapping: {value}"))
        })?;
        if let Some(owner) = obj.get("Owner") {
            let prop = obj.get("Property").ok_or_else(|| {
                KismetError::property(format!("Owned property without Property: {value}"))
            })?;
            let (name, ty) = Self::name_and_type(prop)?;
            return Ok(PropertyPointer::Owned {
                owner: ObjectReference::new(owner)?,
                name,
                ty,
            });
        }
        if let Some(prop) = obj.get("Property") {
            let (name, ty) = Self::name_and_type(prop)?;
            return Ok(PropertyPointer::Inline { name, ty });
        }
        if let (Some(path), Some(owner)) = (obj.get("Path"), obj.get("ResolvedOwner")) {
            return Ok(PropertyPointer::Path {
                name: path.clone(),
                owner: ObjectReference::new(owner)?,
            });
        }
        Err(KismetError::property(format!("Unrecognized property descriptor: {value}")).into())
    }

    fn name_and_type(prop: &Value) -> Result<(String, String), Error> {
        let name = prop.get("Name").and_then(Value::as_str).ok_or_else(|| {
            KismetError::property(format!("Property without Name: {prop}"))
        })?;
        let ty = prop.get("Type").and_then(Value::as_str).ok_or_else(|| {
            KismetError::property(format!("Property without Type: {prop}"))
        })?;
        Ok((name.to_string(), ty.to_string()))
    }

    /// Ordered attributes of this descriptor, for flattening into a node
    pub fn ast_fields(&self) -> Vec<AstField> {
        match self {
            PropertyPointer::Inline { name, ty } => vec![
                ("name", AstValue::text(name)),
                ("type", AstValue::text(ty)),
            ],
            PropertyPointer::Owned { owner, name, ty } => vec![
                ("owner", owner.ast_value()),
                (
                    "prop",
                    AstValue::Map(vec![
                        ("name", AstValue::text(name)),
                        ("type", AstValue::text(ty)),
                    ]),
                ),
            ],
            PropertyPointer::Path { name, owner } => vec![
                ("name", AstValue::Raw(name.clone())),
                ("owner", owner.ast_value()),
            ],
        }
    }

    /// Ordered attribute tree of this descriptor as a standalone node
    pub fn ast_value_with_kind(&self, kind: &'static str) -> AstValue {
        let mut fields = vec![("kind", AstValue::text(kind))];
        fields.extend(self.ast_fields());
        AstValue::Map(fields)
    }
}
