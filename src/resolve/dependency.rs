//! Order dependencies discovered during adjudication.
//!
//! An edge says: if the blocking order fails, the dependent order fails too,
//! with the edge's explanation. Edges are recorded while moves and supports
//! are resolved and propagated once every stage has run.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::board::OrderId;

/// Why a dependent order is bound to its blocker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub blocker: OrderId,
    pub explanation: String,
    /// Whether failure makes the dependent order invalid rather than merely
    /// unsuccessful.
    pub invalidates: bool,
}

/// A dependent order forced to fail by propagation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForcedFailure {
    pub order: OrderId,
    pub explanation: String,
    pub invalidates: bool,
}

/// Blocked order -> what blocks it, plus the blockers propagation starts from.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    blocked: BTreeMap<OrderId, Vec<Dependency>>,
    heads: BTreeSet<OrderId>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `dependent` fails whenever `blocker` fails.
    pub fn add(
        &mut self,
        blocker: OrderId,
        dependent: OrderId,
        explanation: impl Into<String>,
        invalidates: bool,
    ) {
        if blocker == dependent {
            return;
        }
        let entry = self.blocked.entry(dependent).or_default();
        if entry.iter().any(|d| d.blocker == blocker) {
            return;
        }
        entry.push(Dependency {
            blocker,
            explanation: explanation.into(),
            invalidates,
        });
        self.heads.insert(blocker);
    }

    pub fn dependencies_of(&self, order: OrderId) -> &[Dependency] {
        self.blocked.get(&order).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn heads(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.heads.iter().copied()
    }

    /// Number of recorded edges.
    pub fn len(&self) -> usize {
        self.blocked.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.blocked.is_empty()
    }

    fn dependents(&self) -> HashMap<OrderId, Vec<(OrderId, &Dependency)>> {
        let mut out: HashMap<OrderId, Vec<(OrderId, &Dependency)>> = HashMap::new();
        for (&dependent, deps) in &self.blocked {
            for dep in deps {
                out.entry(dep.blocker).or_default().push((dependent, dep));
            }
        }
        out
    }

    /// Pushes failures from failed heads through every chain of dependents.
    ///
    /// `success` reports the current outcome of an order. Each order is
    /// forced at most once, so cyclic chains terminate. Returns the forced
    /// failures in propagation order.
    pub fn propagate(&self, success: impl Fn(OrderId) -> Option<bool>) -> Vec<ForcedFailure> {
        let dependents = self.dependents();
        let mut failed: BTreeSet<OrderId> = BTreeSet::new();
        let mut stack: Vec<OrderId> = Vec::new();
        for head in self.heads() {
            if success(head) == Some(false) {
                failed.insert(head);
                stack.push(head);
            }
        }

        let mut forced = Vec::new();
        while let Some(blocker) = stack.pop() {
            let Some(edges) = dependents.get(&blocker) else {
                continue;
            };
            for &(dependent, dep) in edges {
                if failed.contains(&dependent) {
                    continue;
                }
                failed.insert(dependent);
                stack.push(dependent);
                if success(dependent) != Some(false) {
                    forced.push(ForcedFailure {
                        order: dependent,
                        explanation: dep.explanation.clone(),
                        invalidates: dep.invalidates,
                    });
                }
            }
        }
        forced
    }

    /// Strongly connected groups of orders that block each other in a ring.
    pub fn cycles(&self) -> Vec<Vec<OrderId>> {
        let dependents = self.dependents();
        let mut tarjan = Tarjan::default();
        for head in self.heads() {
            if !tarjan.index.contains_key(&head) {
                tarjan.visit(head, &dependents);
            }
        }
        tarjan.components
    }
}

#[derive(Default)]
struct Tarjan {
    next: usize,
    index: HashMap<OrderId, usize>,
    low: HashMap<OrderId, usize>,
    stack: Vec<OrderId>,
    on_stack: BTreeSet<OrderId>,
    components: Vec<Vec<OrderId>>,
}

impl Tarjan {
    fn visit(&mut self, node: OrderId, edges: &HashMap<OrderId, Vec<(OrderId, &Dependency)>>) {
        self.index.insert(node, self.next);
        self.low.insert(node, self.next);
        self.next += 1;
        self.stack.push(node);
        self.on_stack.insert(node);

        for &(next, _) in edges.get(&node).into_iter().flatten() {
            if !self.index.contains_key(&next) {
                self.visit(next, edges);
                let low = self.low[&node].min(self.low[&next]);
                self.low.insert(node, low);
            } else if self.on_stack.contains(&next) {
                let low = self.low[&node].min(self.index[&next]);
                self.low.insert(node, low);
            }
        }

        if self.low[&node] == self.index[&node] {
            let mut component = Vec::new();
            while let Some(member) = self.stack.pop() {
                self.on_stack.remove(&member);
                component.push(member);
                if member == node {
                    break;
                }
            }
            if component.len() > 1 {
                component.sort_unstable();
                self.components.push(component);
            }
        }
    }
}
