//! Stateful walk over visible nodes.

use super::{Node, Point};

/// Cursor over a node and its descendants. Never moves above the node it
/// started on.
#[derive(Clone, Debug)]
pub struct TreeCursor<'t> {
    root: Node<'t>,
    /// Sibling lists entered below the root, with the current index in each.
    levels: Vec<(Vec<Node<'t>>, usize)>,
}

impl<'t> TreeCursor<'t> {
    pub fn new(root: Node<'t>) -> Self {
        Self {
            root,
            levels: Vec::new(),
        }
    }

    pub fn node(&self) -> Node<'t> {
        match self.levels.last() {
            Some((siblings, i)) => siblings[*i].clone(),
            None => self.root.clone(),
        }
    }

    pub fn field_name(&self) -> Option<&'t str> {
        match self.levels.last() {
            Some((siblings, i)) => siblings[*i].field_name(),
            None => None,
        }
    }

    /// Levels below the starting node.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn goto_first_child(&mut self) -> bool {
        let children = self.node().children();
        if children.is_empty() {
            return false;
        }
        self.levels.push((children, 0));
        true
    }

    pub fn goto_next_sibling(&mut self) -> bool {
        match self.levels.last_mut() {
            Some((siblings, i)) if *i + 1 < siblings.len() => {
                *i += 1;
                true
            }
            _ => false,
        }
    }

    pub fn goto_parent(&mut self) -> bool {
        self.levels.pop().is_some()
    }

    /// Move to the first child that ends after `byte`, returning its index.
    pub fn goto_first_child_for_byte(&mut self, byte: usize) -> Option<usize> {
        let children = self.node().children();
        let index = children.iter().position(|c| c.end_byte() > byte)?;
        self.levels.push((children, index));
        Some(index)
    }

    /// Move to the first child that ends after `point`, returning its index.
    pub fn goto_first_child_for_point(&mut self, point: Point) -> Option<usize> {
        let children = self.node().children();
        let index = children.iter().position(|c| c.end_position() > point)?;
        self.levels.push((children, index));
        Some(index)
    }

    /// Back to the starting node.
    pub fn reset(&mut self) {
        self.levels.clear();
    }
}
