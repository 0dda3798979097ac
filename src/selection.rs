//! Resolves a raw text selection to the sentence that owns it.
//!
//! The rendering surface is abstracted behind [`DocumentTree`]: any view layer
//! that can report an element's parent and whether it carries a sentence
//! index tag can drive the resolver, and [`ElementTree`] gives tests and the
//! CLI an in-memory one.

use crate::model::SelectionCandidate;
use crate::placement::Rect;

/// Identifier of a rendered element.
pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("selection is empty")]
    NoSelection,
    #[error("selection is outside the sentence list")]
    OutsideContainer,
}

/// Read-only view over the element hierarchy that hosts rendered sentences.
pub trait DocumentTree {
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Sentence index tagged on this element, if any.
    fn sentence_index(&self, node: NodeId) -> Option<usize>;

    /// True when `node` is `container` or one of its descendants.
    fn contains(&self, container: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == container {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    fn ancestors(&self, node: NodeId) -> Ancestors<'_, Self>
    where
        Self: Sized,
    {
        Ancestors {
            tree: self,
            next: Some(node),
        }
    }
}

/// Walks from a node up to the root, starting with the node itself.
pub struct Ancestors<'a, T: ?Sized> {
    tree: &'a T,
    next: Option<NodeId>,
}

impl<T: DocumentTree> Iterator for Ancestors<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

/// Snapshot of a selection taken when the selection event fires.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSnapshot {
    pub text: String,
    /// Element containing the anchor point of the range.
    pub anchor: NodeId,
    /// Deepest element containing the whole range.
    pub common_ancestor: NodeId,
    pub bounds: Rect,
}

/// Turns a selection into a lookup candidate. Pure.
pub fn resolve<T: DocumentTree>(
    snapshot: &SelectionSnapshot,
    tree: &T,
    container: NodeId,
) -> Result<SelectionCandidate, SelectionError> {
    let text = snapshot.text.trim();
    if text.is_empty() {
        return Err(SelectionError::NoSelection);
    }
    if !tree.contains(container, snapshot.common_ancestor) {
        return Err(SelectionError::OutsideContainer);
    }
    let sentence_index = tree
        .ancestors(snapshot.anchor)
        .find_map(|node| tree.sentence_index(node))
        .ok_or(SelectionError::OutsideContainer)?;
    Ok(SelectionCandidate::new(text, Some(sentence_index)))
}

#[derive(Debug, Clone, Default)]
struct ElementNode {
    parent: Option<NodeId>,
    sentence_index: Option<usize>,
}

/// Arena-backed element hierarchy.
#[derive(Debug, Clone, Default)]
pub struct ElementTree {
    nodes: Vec<ElementNode>,
}

impl ElementTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parentless element.
    pub fn add_root(&mut self) -> NodeId {
        self.push(ElementNode::default())
    }

    pub fn add_child(&mut self, parent: NodeId) -> NodeId {
        self.push(ElementNode {
            parent: Some(parent),
            sentence_index: None,
        })
    }

    /// Adds an element tagged as the rendering of sentence `index`.
    pub fn add_sentence(&mut self, parent: NodeId, index: usize) -> NodeId {
        self.push(ElementNode {
            parent: Some(parent),
            sentence_index: Some(index),
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: ElementNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }
}

impl DocumentTree for ElementTree {
    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|n| n.parent)
    }

    fn sentence_index(&self, node: NodeId) -> Option<usize> {
        self.nodes.get(node).and_then(|n| n.sentence_index)
    }
}

/// Sentence list layout: a root container with one tagged element per
/// sentence, each holding an original-text and a translation child.
#[derive(Debug, Clone)]
pub struct SentenceListLayout {
    pub tree: ElementTree,
    pub page: NodeId,
    pub container: NodeId,
    pub sentences: Vec<SentenceNodes>,
}

#[derive(Debug, Clone, Copy)]
pub struct SentenceNodes {
    pub item: NodeId,
    pub original: NodeId,
    pub translation: NodeId,
}

impl SentenceListLayout {
    pub fn build(sentence_count: usize) -> Self {
        let mut tree = ElementTree::new();
        let page = tree.add_root();
        let container = tree.add_child(page);
        let sentences = (0..sentence_count)
            .map(|index| {
                let item = tree.add_sentence(container, index);
                SentenceNodes {
                    item,
                    original: tree.add_child(item),
                    translation: tree.add_child(item),
                }
            })
            .collect();
        Self {
            tree,
            page,
            container,
            sentences,
        }
    }

    /// Snapshot of `text` selected inside the original text of sentence `index`.
    pub fn select_in_original(
        &self,
        index: usize,
        text: impl Into<String>,
        bounds: Rect,
    ) -> Option<SelectionSnapshot> {
        let nodes = self.sentences.get(index)?;
        Some(SelectionSnapshot {
            text: text.into(),
            anchor: nodes.original,
            common_ancestor: nodes.original,
            bounds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(text: &str, anchor: NodeId, common_ancestor: NodeId) -> SelectionSnapshot {
        SelectionSnapshot {
            text: text.to_string(),
            anchor,
            common_ancestor,
            bounds: Rect::new(10.0, 20.0, 60.0, 40.0),
        }
    }

    #[test]
    fn resolves_owning_sentence_index() {
        let layout = SentenceListLayout::build(3);
        let nodes = layout.sentences[1];
        let candidate = resolve(
            &snapshot("  bananas ", nodes.original, nodes.original),
            &layout.tree,
            layout.container,
        )
        .unwrap();
        assert_eq!(candidate, SelectionCandidate::new("bananas", Some(1)));
    }

    #[test]
    fn whitespace_only_selection_is_rejected() {
        let layout = SentenceListLayout::build(1);
        let nodes = layout.sentences[0];
        for text in ["", "   ", "\n\t "] {
            assert_eq!(
                resolve(&snapshot(text, nodes.original, nodes.original), &layout.tree, layout.container),
                Err(SelectionError::NoSelection)
            );
        }
    }

    #[test]
    fn selection_outside_container_is_rejected() {
        let mut layout = SentenceListLayout::build(1);
        let title = layout.tree.add_child(layout.page);
        assert_eq!(
            resolve(&snapshot("NoteEnglish", title, title), &layout.tree, layout.container),
            Err(SelectionError::OutsideContainer)
        );
    }

    #[test]
    fn selection_spanning_sentences_uses_anchor() {
        let layout = SentenceListLayout::build(2);
        let anchor = layout.sentences[0].translation;
        let candidate = resolve(
            &snapshot("apples. I like", anchor, layout.container),
            &layout.tree,
            layout.container,
        )
        .unwrap();
        assert_eq!(candidate.sentence_index, Some(0));
    }

    #[test]
    fn untagged_anchor_inside_container_is_not_actionable() {
        let mut layout = SentenceListLayout::build(1);
        let heading = layout.tree.add_child(layout.container);
        assert_eq!(
            resolve(&snapshot("Translations", heading, heading), &layout.tree, layout.container),
            Err(SelectionError::OutsideContainer)
        );
    }
}
