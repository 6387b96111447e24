//! Positioned views over a [`Tree`].

use std::rc::Rc;

use gloss_table::{Alias, FieldId, GrammarTable, Production, SymbolId};

use super::render::{self, SexpOptions};
use super::{Point, Subtree, Tree, TreeCursor};

/// A visible node: its subtree plus position, parent and the alias and field
/// it has in its parent's production.
#[derive(Clone)]
pub struct Node<'t> {
    tree: &'t Tree,
    subtree: &'t Subtree,
    start: usize,
    start_point: Point,
    alias: Option<&'t Alias>,
    field: Option<FieldId>,
    /// Position among the parent's visible children.
    index: usize,
    parent: Option<Rc<Node<'t>>>,
}

/// A visible child before it is tied to its parent.
struct Child<'t> {
    subtree: &'t Subtree,
    start: usize,
    start_point: Point,
    alias: Option<&'t Alias>,
    field: Option<FieldId>,
}

/// A hidden node being spliced into its visible ancestor.
struct Frame<'t> {
    subtree: &'t Subtree,
    production: Option<&'t Production>,
    /// Field of the hidden node itself, passed down to its children.
    inherited: Option<FieldId>,
    next: usize,
    step: usize,
}

impl<'t> Node<'t> {
    pub(crate) fn root(tree: &'t Tree) -> Self {
        Node {
            tree,
            subtree: tree.root_subtree(),
            start: 0,
            start_point: Point::default(),
            alias: None,
            field: None,
            index: 0,
            parent: None,
        }
    }

    fn visible_children(&self) -> Vec<Child<'t>> {
        let tree: &'t Tree = self.tree;
        let table: &'t GrammarTable = tree.table();
        let production_of = |s: &'t Subtree| s.production().map(|p| table.production(p));

        let mut out = Vec::new();
        let mut offset = self.start;
        let mut point = self.start_point;
        let mut frames = vec![Frame {
            subtree: self.subtree,
            production: production_of(self.subtree),
            inherited: None,
            next: 0,
            step: 0,
        }];

        while let Some(frame) = frames.last_mut() {
            let Some(child) = frame.subtree.children().get(frame.next) else {
                frames.pop();
                continue;
            };
            frame.next += 1;

            let (alias, field) = if child.is_extra() {
                (None, None)
            } else {
                let alias = frame.production.and_then(|p| p.alias(frame.step));
                let field = frame
                    .production
                    .and_then(|p| p.field(frame.step))
                    .or(frame.inherited);
                frame.step += 1;
                (alias, field)
            };

            let visible = alias.is_some() || child.is_error() || table.symbol(child.symbol()).visible;
            if visible || child.children().is_empty() {
                if visible {
                    out.push(Child {
                        subtree: child,
                        start: offset,
                        start_point: point,
                        alias,
                        field,
                    });
                }
                offset += child.len();
                point = point + child.size().extent;
                continue;
            }
            frames.push(Frame {
                subtree: child,
                production: production_of(child),
                inherited: field,
                next: 0,
                step: 0,
            });
        }
        out
    }

    /// Visible children, hidden nodes spliced in.
    pub fn children(&self) -> Vec<Node<'t>> {
        let parent = Rc::new(self.clone());
        self.visible_children()
            .into_iter()
            .enumerate()
            .map(|(index, c)| Node {
                tree: self.tree,
                subtree: c.subtree,
                start: c.start,
                start_point: c.start_point,
                alias: c.alias,
                field: c.field,
                index,
                parent: Some(Rc::clone(&parent)),
            })
            .collect()
    }

    pub fn child(&self, i: usize) -> Option<Node<'t>> {
        self.children().into_iter().nth(i)
    }

    pub fn child_count(&self) -> usize {
        self.visible_children().len()
    }

    pub fn named_children(&self) -> Vec<Node<'t>> {
        self.children().into_iter().filter(Node::is_named).collect()
    }

    pub fn named_child(&self, i: usize) -> Option<Node<'t>> {
        self.named_children().into_iter().nth(i)
    }

    pub fn named_child_count(&self) -> usize {
        self.named_children().len()
    }

    pub fn child_by_field_name(&self, name: &str) -> Option<Node<'t>> {
        let field = self.tree.table().field_id(name)?;
        self.children().into_iter().find(|c| c.field == Some(field))
    }

    pub fn children_by_field_name(&self, name: &str) -> Vec<Node<'t>> {
        let Some(field) = self.tree.table().field_id(name) else {
            return Vec::new();
        };
        self.children()
            .into_iter()
            .filter(|c| c.field == Some(field))
            .collect()
    }

    pub fn field_name_for_child(&self, i: usize) -> Option<&'t str> {
        self.child(i)?.field_name()
    }

    /// Field this node fills in its parent.
    pub fn field_name(&self) -> Option<&'t str> {
        let tree: &'t Tree = self.tree;
        self.field.map(|f| tree.table().field_name(f))
    }

    pub fn parent(&self) -> Option<Node<'t>> {
        self.parent.as_deref().cloned()
    }

    pub fn next_sibling(&self) -> Option<Node<'t>> {
        self.parent.as_ref()?.child(self.index + 1)
    }

    pub fn prev_sibling(&self) -> Option<Node<'t>> {
        let index = self.index.checked_sub(1)?;
        self.parent.as_ref()?.child(index)
    }

    pub fn next_named_sibling(&self) -> Option<Node<'t>> {
        let siblings = self.parent.as_ref()?.children();
        siblings.into_iter().skip(self.index + 1).find(Node::is_named)
    }

    pub fn prev_named_sibling(&self) -> Option<Node<'t>> {
        let siblings = self.parent.as_ref()?.children();
        siblings.into_iter().take(self.index).rev().find(Node::is_named)
    }

    pub fn byte_range(&self) -> std::ops::Range<usize> {
        self.start..self.end_byte()
    }

    pub fn start_byte(&self) -> usize {
        self.start
    }

    pub fn end_byte(&self) -> usize {
        self.start + self.subtree.len()
    }

    pub fn start_position(&self) -> Point {
        self.start_point
    }

    pub fn end_position(&self) -> Point {
        self.start_point + self.subtree.size().extent
    }

    /// Grammar symbol, before aliasing.
    pub fn symbol(&self) -> SymbolId {
        self.subtree.symbol()
    }

    /// Displayed name: the alias if there is one, else the symbol name.
    pub fn kind(&self) -> &'t str {
        let tree: &'t Tree = self.tree;
        match self.alias {
            Some(alias) => &alias.name,
            None => tree.table().symbol_name(self.subtree.symbol()),
        }
    }

    pub fn is_named(&self) -> bool {
        match self.alias {
            Some(alias) => alias.named,
            None => self.tree.table().symbol(self.subtree.symbol()).named,
        }
    }

    pub fn is_error(&self) -> bool {
        self.subtree.is_error()
    }

    pub fn has_error(&self) -> bool {
        self.subtree.has_error()
    }

    pub fn is_extra(&self) -> bool {
        self.subtree.is_extra()
    }

    pub fn text(&self) -> &'t str {
        let tree: &'t Tree = self.tree;
        &tree.text()[self.byte_range()]
    }

    /// Smallest descendant containing `start..end`, descending by containment.
    pub fn descendant_for_byte_range(&self, start: usize, end: usize) -> Option<Node<'t>> {
        if start > end || start < self.start_byte() || end > self.end_byte() {
            return None;
        }
        let mut current = self.clone();
        'descend: loop {
            for child in current.children() {
                if child.start_byte() <= start && end <= child.end_byte() && !child.subtree.is_empty()
                {
                    current = child;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }

    pub fn walk(&self) -> TreeCursor<'t> {
        TreeCursor::new(self.clone())
    }

    pub fn to_sexp(&self) -> String {
        render::to_sexp(self, SexpOptions::default())
    }

    /// Identity of the underlying subtree. Stable across tree versions that
    /// share it.
    pub fn id(&self) -> usize {
        self.subtree.id()
    }

    /// Whether both views share one subtree allocation.
    pub fn same_subtree(&self, other: &Node<'_>) -> bool {
        self.subtree.ptr_eq(other.subtree)
    }

    pub fn subtree(&self) -> &'t Subtree {
        self.subtree
    }

    pub fn tree(&self) -> &'t Tree {
        self.tree
    }
}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}..{}]", self.kind(), self.start_byte(), self.end_byte())
    }
}
