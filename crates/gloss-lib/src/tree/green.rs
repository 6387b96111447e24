//! Lossless export to `rowan`.

use rowan::{GreenNode, GreenNodeBuilder, Language};

use gloss_table::SymbolId;

use super::Subtree;

/// Language tag for `rowan` trees built from Gloss parses. Kinds are raw
/// symbol ids; map them back with the grammar table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GlossLanguage {}

impl Language for GlossLanguage {
    type Kind = rowan::SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind
    }
}

pub type SyntaxNode = rowan::SyntaxNode<GlossLanguage>;

#[inline]
pub fn syntax_kind(symbol: SymbolId) -> rowan::SyntaxKind {
    rowan::SyntaxKind(symbol.0)
}

enum Event<'s> {
    Enter(&'s Subtree),
    Exit,
}

/// Every subtree with children becomes a node and every leaf a token, so the
/// token texts concatenate back to `text`.
pub(crate) fn to_green(root: &Subtree, text: &str) -> GreenNode {
    let mut builder = GreenNodeBuilder::new();
    let mut offset = 0;

    if root.is_leaf() {
        builder.start_node(syntax_kind(root.symbol()));
        builder.token(syntax_kind(root.symbol()), &text[..root.len()]);
        builder.finish_node();
        return builder.finish();
    }

    let mut events = vec![Event::Enter(root)];
    while let Some(event) = events.pop() {
        match event {
            Event::Enter(subtree) if subtree.is_leaf() => {
                let end = offset + subtree.len();
                builder.token(syntax_kind(subtree.symbol()), &text[offset..end]);
                offset = end;
            }
            Event::Enter(subtree) => {
                builder.start_node(syntax_kind(subtree.symbol()));
                events.push(Event::Exit);
                events.extend(subtree.children().iter().rev().map(Event::Enter));
            }
            Event::Exit => builder.finish_node(),
        }
    }
    builder.finish()
}
