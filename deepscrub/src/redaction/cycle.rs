//! Cycle detection and neutralization.
//!
//! [`normalize`] walks the input graph depth-first and produces a structurally
//! identical shadow copy in which any container that is its own ancestor
//! along the current descent is, on the repeat encounter, replaced by a
//! [`Value::Circular`] marker recording the first-seen and current paths.
//!
//! Identity is container-allocation identity (`Value::container_id`), never
//! structural equality: a container reachable from several non-ancestor
//! parents is a shared reference, not a cycle, and is cloned untouched.
//! The walk runs on an explicit step stack, so native call depth stays
//! bounded regardless of nesting depth; exit steps unwind the ancestor chain
//! on backtrack, and both tracking structures are scoped to one call and
//! retain nothing afterwards.

use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    rc::Rc,
};

use tracing::debug;

use crate::value::{CircularRef, Entries, Segment, Value, display_path};

/// Produces a cycle-free shadow copy of `value`, safe to traverse without
/// re-entering itself. The input is never mutated.
#[must_use]
pub fn normalize(value: &Value) -> Value {
    Walk {
        on_chain: HashSet::new(),
        first_seen: HashMap::new(),
    }
    .copy(value)
}

/// Where a copied child is written.
enum Slot {
    Sequence(Rc<RefCell<Vec<Value>>>),
    Mapping(Rc<RefCell<Entries>>),
}

/// One step of the walk: descend into a value, or unwind a finished
/// container.
enum Step {
    Enter {
        value: Value,
        slot: Slot,
        segment: Segment,
    },
    Exit {
        id: usize,
    },
}

struct Walk {
    /// Containers on the current descent, by allocation identity.
    on_chain: HashSet<usize>,
    /// First-seen path per container, by allocation identity.
    first_seen: HashMap<usize, String>,
}

impl Walk {
    fn copy(mut self, root: &Value) -> Value {
        let Some(root_id) = root.container_id() else {
            // Scalars and structured leaf kinds cannot participate in cycles.
            return root.clone();
        };

        let mut stack: Vec<Step> = Vec::new();
        let mut path: Vec<Segment> = Vec::new();

        self.on_chain.insert(root_id);
        self.first_seen.insert(root_id, String::new());
        let shadow = shadow_container(root);
        // The walk ends at the root, so it needs no exit step of its own.
        push_children(&mut stack, root, &shadow);

        while let Some(step) = stack.pop() {
            match step {
                Step::Enter {
                    value,
                    slot,
                    segment,
                } => self.enter(&mut stack, &mut path, value, &slot, segment),
                Step::Exit { id } => {
                    // Unwind on backtrack so siblings may share this
                    // container freely.
                    self.on_chain.remove(&id);
                    path.pop();
                }
            }
        }

        shadow
    }

    fn enter(
        &mut self,
        stack: &mut Vec<Step>,
        path: &mut Vec<Segment>,
        value: Value,
        slot: &Slot,
        segment: Segment,
    ) {
        let Some(id) = value.container_id() else {
            write(slot, &segment, value);
            return;
        };

        if self.on_chain.contains(&id) {
            path.push(segment.clone());
            let original_path = self.first_seen.get(&id).cloned().unwrap_or_default();
            let current_path = display_path(path);
            path.pop();
            debug!(%original_path, %current_path, "circular reference neutralized");
            write(
                slot,
                &segment,
                Value::Circular(Box::new(CircularRef {
                    original_path,
                    current_path,
                })),
            );
            return;
        }

        path.push(segment.clone());
        self.on_chain.insert(id);
        self.first_seen
            .entry(id)
            .or_insert_with(|| display_path(path));

        let shadow = shadow_container(&value);
        write(slot, &segment, shadow.clone());
        stack.push(Step::Exit { id });
        push_children(stack, &value, &shadow);
    }
}

/// An empty container of the same variant, ready to receive copied children.
fn shadow_container(value: &Value) -> Value {
    match value {
        Value::Sequence(_) => Value::sequence(Vec::new()),
        Value::Set(_) => Value::set(Vec::new()),
        Value::Object(_) => Value::object(Entries::new()),
        Value::Map(_) => Value::map(Entries::new()),
        // container_id returned Some, so no other variant is possible.
        _ => value.clone(),
    }
}

/// Children are pushed in reverse so popping restores original order.
fn push_children(stack: &mut Vec<Step>, value: &Value, shadow: &Value) {
    match value {
        Value::Sequence(items) | Value::Set(items) => {
            let (Value::Sequence(out) | Value::Set(out)) = shadow else {
                return;
            };
            for (index, item) in items.borrow().iter().enumerate().rev() {
                stack.push(Step::Enter {
                    value: item.clone(),
                    slot: Slot::Sequence(Rc::clone(out)),
                    segment: Segment::Index(index),
                });
            }
        }
        Value::Object(entries) | Value::Map(entries) => {
            let (Value::Object(out) | Value::Map(out)) = shadow else {
                return;
            };
            for (key, item) in entries.borrow().iter().rev() {
                stack.push(Step::Enter {
                    value: item.clone(),
                    slot: Slot::Mapping(Rc::clone(out)),
                    segment: Segment::Key(key.clone()),
                });
            }
        }
        _ => {}
    }
}

fn write(slot: &Slot, segment: &Segment, value: Value) {
    match slot {
        Slot::Sequence(items) => items.borrow_mut().push(value),
        Slot::Mapping(entries) => {
            let key = match segment {
                Segment::Key(key) => key.clone(),
                Segment::Index(index) => index.to_string(),
            };
            entries.borrow_mut().push((key, value));
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
