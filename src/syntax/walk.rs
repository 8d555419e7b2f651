//! Generic pre-order traversal over the syntax tree.
//!
//! The walk is purely structural: it knows nothing about sections or
//! references, which keeps it reusable for the index builder and for the
//! `dump` debug output.

use std::fmt::{self, Write as _};

use super::{Body, Item, Key, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Item,
    Key,
    Value,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Root => "ROOT",
            NodeKind::Item => "ITEM",
            NodeKind::Key => "KEY",
            NodeKind::Value => "VALUE",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Root(&'a Body),
    Item(&'a Item),
    Key(&'a Key),
    Value(&'a Value),
}

impl NodeRef<'_> {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeRef::Root(_) => NodeKind::Root,
            NodeRef::Item(_) => NodeKind::Item,
            NodeRef::Key(_) => NodeKind::Key,
            NodeRef::Value(_) => NodeKind::Value,
        }
    }
}

/// What the visitor sees at each node.
pub struct Visit<'a, 'p> {
    pub node: NodeRef<'a>,
    /// Ancestors, outermost first.
    pub path: &'p [NodeRef<'a>],
    /// Position among its siblings, for items, keys and list entries.
    pub index: Option<usize>,
}

/// Visits every node reachable from `root` exactly once, parents before children.
pub fn walk<'a, F>(root: &'a Body, mut visitor: F)
where
    F: for<'p> FnMut(&Visit<'a, 'p>),
{
    let mut path = Vec::new();
    walk_node(NodeRef::Root(root), None, &mut path, &mut visitor);
}

fn walk_node<'a, F>(
    node: NodeRef<'a>,
    index: Option<usize>,
    path: &mut Vec<NodeRef<'a>>,
    visitor: &mut F,
) where
    F: for<'p> FnMut(&Visit<'a, 'p>),
{
    visitor(&Visit {
        node,
        path: path.as_slice(),
        index,
    });

    path.push(node);
    match node {
        NodeRef::Root(body) => {
            for (i, item) in body.items.iter().enumerate() {
                walk_node(NodeRef::Item(item), Some(i), path, visitor);
            }
        }
        NodeRef::Item(item) => {
            for (i, key) in item.keys.iter().enumerate() {
                walk_node(NodeRef::Key(key), Some(i), path, visitor);
            }
            if let Some(value) = &item.value {
                walk_node(NodeRef::Value(value), None, path, visitor);
            }
        }
        NodeRef::Key(_) => {}
        NodeRef::Value(value) => match value {
            Value::Scalar(_) => {}
            Value::Map(map) => walk_node(NodeRef::Root(&map.body), None, path, visitor),
            Value::List(list) => {
                for (i, entry) in list.entries.iter().enumerate() {
                    walk_node(NodeRef::Value(entry), Some(i), path, visitor);
                }
            }
        },
    }
    path.pop();
}

/// Renders the tree one node per line, indented by depth.
pub fn dump(root: &Body) -> String {
    let mut out = String::new();
    walk(root, |visit| {
        let _ = write!(out, "{}node: {}", "   ".repeat(visit.path.len()), visit.node.kind());
        match visit.node {
            NodeRef::Item(item) => {
                let keys: Vec<&str> = item.keys.iter().map(|k| k.token.text.as_str()).collect();
                let _ = write!(out, " Keys=[{}]", keys.join(", "));
            }
            NodeRef::Key(key) => {
                let _ = write!(out, " Token={} TokenKind={:?}", key.token.text, key.token.kind);
            }
            NodeRef::Value(Value::Scalar(token)) => {
                let _ = write!(out, " Token={} TokenKind={:?}", token.text, token.kind);
            }
            NodeRef::Value(Value::List(list)) => {
                let _ = write!(out, " List({})", list.entries.len());
            }
            NodeRef::Value(Value::Map(_)) => out.push_str(" Map"),
            NodeRef::Root(body) => {
                let _ = write!(out, " Items({})", body.items.len());
            }
        }
        out.push('\n');
    });
    out
}
