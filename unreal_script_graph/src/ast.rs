//! Per-function AST
//!
//! [`ScriptAst`] serializes the ordered statement list of one function,
//! records fall-through and jump links, resolves the execution-flow stack,
//! discovers entrypoints, and extracts per-entrypoint subgraphs.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde_json::Value;

use crate::error::{Error, ResolveError, ScriptError};
use crate::kismet::{KismetExpression, KismetExpressionDataTrait};
use crate::types::AstValue;

/// A directed link between two statement indices
pub type Link = (usize, usize);

/// A statement-level AST node
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptStatement {
    /// Stable statement index
    pub index: usize,
    /// Decoded expression
    pub expr: KismetExpression,
}

impl ScriptStatement {
    /// Ordered attribute tree of this statement, `index` last
    pub fn ast_value(&self) -> AstValue {
        let mut fields = self.expr.node_fields();
        fields.push(("index", AstValue::Int(self.index as u64)));
        AstValue::Map(fields)
    }
}

enum StackOp {
    Push(usize),
    Pop { current: Option<usize>, conditional: bool },
    None,
}

/// AST of one function's bytecode
#[derive(Debug, Clone, Default)]
pub struct ScriptAst {
    name: String,
    is_ubergraph: bool,
    cmptd_jump_index: Option<usize>,
    not_entrypoints: BTreeSet<usize>,
    script_nodes: BTreeMap<usize, ScriptStatement>,
    link_list: BTreeSet<Link>,
    temp_link_list: Vec<Link>,
    last_index: Option<usize>,
}

impl ScriptAst {
    /// Serialize the ordered statement list of one function.
    ///
    /// The returned AST has `script_nodes` and the fall-through/jump links
    /// populated; call [`ScriptAst::resolve`] before reading pop targets or
    /// extracting subgraphs.
    pub fn new(name: &str, bytecode: &[Value]) -> Result<Self, Error> {
        let mut ast = ScriptAst {
            name: name.to_string(),
            ..Default::default()
        };
        for statement in bytecode {
            ast.serialize_statement(statement)?;
        }
        Ok(ast)
    }

    /// Function name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True iff the function contains a computed jump
    pub fn is_ubergraph(&self) -> bool {
        self.is_ubergraph
    }

    /// Index of the computed-jump statement, when one exists
    pub fn cmptd_jump_index(&self) -> Option<usize> {
        self.cmptd_jump_index
    }

    /// Statement indices excluded from entrypoint discovery
    pub fn not_entrypoints(&self) -> &BTreeSet<usize> {
        &self.not_entrypoints
    }

    /// Serialized statements, keyed by statement index
    pub fn script_nodes(&self) -> &BTreeMap<usize, ScriptStatement> {
        &self.script_nodes
    }

    /// Directed links between statements
    pub fn link_list(&self) -> &BTreeSet<Link> {
        &self.link_list
    }

    /// Look up one statement
    pub fn node(&self, index: usize) -> Option<&ScriptStatement> {
        self.script_nodes.get(&index)
    }

    fn serialize_statement(&mut self, statement: &Value) -> Result<(), Error> {
        let obj = statement
            .as_object()
            .ok_or_else(|| ScriptError::invalid_statement(statement.to_string()))?;
        let index = obj
            .get("StatementIndex")
            .and_then(Value::as_u64)
            .ok_or_else(|| ScriptError::missing_statement_index(statement.to_string()))?
            as usize;
        let expr = KismetExpression::new(statement)?;

        match &expr {
            KismetExpression::ExJump(jump) => {
                self.link_list.insert((index, jump.jmp_offset));
            }
            KismetExpression::ExJumpIfNot(jump) => {
                self.link_list.insert((index, jump.jmp_offset));
            }
            KismetExpression::ExPushExecutionFlow(push) => {
                self.not_entrypoints.insert(push.push_addr);
            }
            KismetExpression::ExComputedJump(_) => {
                if let Some(first) = self.cmptd_jump_index {
                    return Err(ResolveError::duplicate_computed_jump(first, index).into());
                }
                self.is_ubergraph = true;
                self.cmptd_jump_index = Some(index);
                // the ubergraph dispatches from its head, so the head is a
                // dispatcher, not an event entry
                self.not_entrypoints.insert(0);
            }
            _ => {}
        }

        if let Some(last) = self.last_index {
            self.link_list.insert((last, index));
        }
        self.last_index = (!expr.no_flow()).then_some(index);
        self.script_nodes.insert(index, ScriptStatement { index, expr });
        Ok(())
    }

    /// Resolve pop-execution targets by walking from every entrypoint with a
    /// simulated execution-flow stack, then absorb the resolved links.
    ///
    /// Running this a second time on an already-resolved AST adds no links
    /// and rewrites no pop targets.
    pub fn resolve(&mut self) -> Result<(), Error> {
        for (from, to) in &self.link_list {
            if !self.script_nodes.contains_key(from) || !self.script_nodes.contains_key(to) {
                return Err(ScriptError::dangling_link(*from, *to).into());
            }
        }
        for entrypoint in self.entrypoints() {
            let mut visited = HashMap::new();
            self.resolve_stack(entrypoint, Vec::new(), None, &mut visited)?;
        }
        let resolved: Vec<Link> = self.temp_link_list.drain(..).collect();
        self.link_list.extend(resolved);
        Ok(())
    }

    fn resolve_stack(
        &mut self,
        index: usize,
        in_stack: Vec<usize>,
        _last_index: Option<usize>,
        visited: &mut HashMap<usize, Vec<usize>>,
    ) -> Result<(), Error> {
        let mut stack = in_stack;
        let outs = self.outgoing(index, None)?;
        let stmt = self
            .script_nodes
            .get(&index)
            .ok_or_else(|| ResolveError::unknown_statement(index))?;

        let op = match &stmt.expr {
            // dispatch targets are only synthesized during extraction
            KismetExpression::ExComputedJump(_) => return Ok(()),
            KismetExpression::ExEndOfScript(_) => {
                if !outs.is_empty() || !stack.is_empty() {
                    log::warn!(
                        "{}: end of script at {index} with {} unmatched links and {} stacked addresses",
                        self.name,
                        outs.len(),
                        stack.len()
                    );
                    for (from, to) in &outs {
                        log::warn!("    unmatched link ({from}, {to})");
                    }
                    for addr in &stack {
                        log::warn!("    stacked address {addr}");
                    }
                }
                if !outs.is_empty() {
                    return Err(ResolveError::trailing_links(index, outs.len()).into());
                }
                stack.clear();
                StackOp::None
            }
            expr => {
                if outs.is_empty() && stack.is_empty() {
                    return Err(ResolveError::dangling_statement(index).into());
                }
                match expr {
                    KismetExpression::ExPushExecutionFlow(push) => StackOp::Push(push.push_addr),
                    KismetExpression::ExPopExecutionFlow(pop) => StackOp::Pop {
                        current: pop.pop_addr,
                        conditional: false,
                    },
                    KismetExpression::ExPopExecutionFlowIfNot(pop) => StackOp::Pop {
                        current: pop.pop_addr,
                        conditional: true,
                    },
                    _ => StackOp::None,
                }
            }
        };

        if visited.contains_key(&index) {
            return Ok(());
        }
        visited.insert(index, stack.clone());

        match op {
            StackOp::Push(addr) => {
                log::debug!("  {index} push addr {addr}");
                stack.push(addr);
            }
            StackOp::Pop { current, conditional } => {
                let Some(&addr) = stack.last() else {
                    return Err(ResolveError::pop_with_empty_stack(index).into());
                };
                log::debug!("  {index} pop addr {addr}");
                match current {
                    Some(resolved) if resolved == addr => {}
                    Some(resolved) => {
                        return Err(ResolveError::pop_target_mismatch(index, resolved, addr).into())
                    }
                    None => {
                        // a conditional pop keeps its fall-through link, an
                        // unconditional one has none
                        let expected = usize::from(conditional);
                        if outs.len() != expected {
                            return Err(ResolveError::unexpected_link_count(
                                index,
                                expected,
                                outs.len(),
                            )
                            .into());
                        }
                        self.set_pop_addr(index, addr);
                        self.temp_link_list.push((index, addr));
                        let mut popped = stack.clone();
                        popped.pop();
                        self.resolve_stack(addr, popped, Some(index), visited)?;
                    }
                }
            }
            StackOp::None => {}
        }

        for (_, next) in outs {
            self.resolve_stack(next, stack.clone(), Some(index), visited)?;
        }
        Ok(())
    }

    fn set_pop_addr(&mut self, index: usize, addr: usize) {
        if let Some(stmt) = self.script_nodes.get_mut(&index) {
            match &mut stmt.expr {
                KismetExpression::ExPopExecutionFlow(pop) => pop.pop_addr = Some(addr),
                KismetExpression::ExPopExecutionFlowIfNot(pop) => pop.pop_addr = Some(addr),
                _ => {}
            }
        }
    }

    /// Links leading into a statement
    pub fn incoming(&self, index: usize) -> BTreeSet<Link> {
        self.link_list
            .iter()
            .filter(|(_, to)| *to == index)
            .copied()
            .collect()
    }

    /// Links leaving a statement.
    ///
    /// When the statement is the computed jump and a dispatch target has been
    /// supplied, the dispatch link is synthesized; a target at or before the
    /// computed jump is a fatal anomaly.
    pub fn outgoing(&self, index: usize, computed_target: Option<usize>) -> Result<BTreeSet<Link>, Error> {
        let mut links: BTreeSet<Link> = self
            .link_list
            .iter()
            .filter(|(from, _)| *from == index)
            .copied()
            .collect();
        if let (Some(jump), Some(target)) = (self.cmptd_jump_index, computed_target) {
            if index == jump {
                if target <= jump {
                    return Err(ResolveError::backward_computed_jump(jump, target).into());
                }
                links.insert((jump, target));
            }
        }
        Ok(links)
    }

    /// Statement indices with no incoming links that are not excluded by
    /// instruction semantics
    pub fn entrypoints(&self) -> BTreeSet<usize> {
        self.script_nodes
            .keys()
            .filter(|index| !self.not_entrypoints.contains(index))
            .filter(|index| self.incoming(**index).is_empty())
            .copied()
            .collect()
    }

    /// Extract the subgraph reachable from one entrypoint.
    ///
    /// Entrypoint `0` of a non-ubergraph yields the whole graph verbatim;
    /// any other seed is closed over the outgoing links, with the computed
    /// jump dispatching toward the seed.
    pub fn subgraph(&self, entrypoint: usize) -> Result<(Vec<&ScriptStatement>, BTreeSet<Link>), Error> {
        if entrypoint == 0 && !self.is_ubergraph {
            return Ok((self.script_nodes.values().collect(), self.link_list.clone()));
        }
        let mut final_nodes: BTreeSet<usize> = BTreeSet::new();
        let mut final_edges: BTreeSet<Link> = BTreeSet::new();
        let mut local_nodes: BTreeSet<usize> = BTreeSet::from([entrypoint]);
        while !local_nodes.is_subset(&final_nodes) {
            final_nodes.extend(&local_nodes);
            let mut local_edges: BTreeSet<Link> = BTreeSet::new();
            for node in &local_nodes {
                local_edges.extend(self.outgoing(*node, Some(entrypoint))?);
            }
            final_edges.extend(&local_edges);
            local_nodes = local_edges.iter().map(|(_, to)| *to).collect();
        }
        let nodes = final_nodes
            .iter()
            .filter_map(|index| self.script_nodes.get(index))
            .collect();
        Ok((nodes, final_edges))
    }

    /// Serialized statements as a plain JSON mapping, for the intermediate
    /// dump
    pub fn script_nodes_json(&self) -> Value {
        let mut map = serde_json::Map::with_capacity(self.script_nodes.len());
        for (index, stmt) in &self.script_nodes {
            map.insert(index.to_string(), stmt.ast_value().to_json());
        }
        Value::Object(map)
    }
}
