use stencil_parser::ast::{ElementNode, NodeRef};

/// Visitor pattern for traversing element trees
///
/// Default implementations walk the entire tree depth-first, parents before
/// children. Override `visit_element` to act on nodes; call
/// [`walk_element`] from the override to keep descending.
pub trait Visitor: Sized {
    fn visit_forest(&mut self, forest: &[NodeRef]) {
        walk_forest(self, forest);
    }

    /// `parent` is `None` for top-level nodes
    fn visit_element(&mut self, element: &ElementNode, parent: Option<&ElementNode>) {
        let _ = parent;
        walk_element(self, element);
    }
}

pub fn walk_forest<V: Visitor>(visitor: &mut V, forest: &[NodeRef]) {
    for node in forest {
        visitor.visit_element(node, None);
    }
}

pub fn walk_element<V: Visitor>(visitor: &mut V, element: &ElementNode) {
    for child in &element.children {
        visitor.visit_element(child, Some(element));
    }
}

/// Visit every node of a forest with a closure
pub fn for_each_node<F>(forest: &[NodeRef], f: F)
where
    F: FnMut(&ElementNode, Option<&ElementNode>),
{
    struct ClosureVisitor<F>(F);

    impl<F: FnMut(&ElementNode, Option<&ElementNode>)> Visitor for ClosureVisitor<F> {
        fn visit_element(&mut self, element: &ElementNode, parent: Option<&ElementNode>) {
            (self.0)(element, parent);
            walk_element(self, element);
        }
    }

    ClosureVisitor(f).visit_forest(forest);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use stencil_parser::tags;

    struct TagCounter {
        tags: Vec<String>,
        depth: usize,
        max_depth: usize,
    }

    impl Visitor for TagCounter {
        fn visit_element(&mut self, element: &ElementNode, _parent: Option<&ElementNode>) {
            self.tags.push(element.tag.clone());
            self.depth += 1;
            self.max_depth = self.max_depth.max(self.depth);
            walk_element(self, element);
            self.depth -= 1;
        }
    }

    #[test]
    fn test_visitor_walks_depth_first() {
        let doc = ElementNode::new(tags::MJML).with_child(
            ElementNode::new(tags::BODY)
                .with_child(ElementNode::new(tags::SECTION).with_child(ElementNode::new(tags::COLUMN)))
                .with_child(ElementNode::new(tags::WRAPPER)),
        );

        let mut counter = TagCounter {
            tags: Vec::new(),
            depth: 0,
            max_depth: 0,
        };
        counter.visit_forest(&[Arc::new(doc)]);

        assert_eq!(
            counter.tags,
            vec!["mjml", "mj-body", "mj-section", "mj-column", "mj-wrapper"]
        );
        assert_eq!(counter.max_depth, 4);
    }

    #[test]
    fn test_for_each_node_reports_parents() {
        let doc = ElementNode::new(tags::MJML).with_child(ElementNode::new(tags::BODY));
        let mut pairs = Vec::new();
        for_each_node(&[Arc::new(doc)], |node, parent| {
            pairs.push((node.tag.clone(), parent.map(|p| p.tag.clone())));
        });

        assert_eq!(
            pairs,
            vec![
                ("mjml".to_string(), None),
                ("mj-body".to_string(), Some("mjml".to_string())),
            ]
        );
    }
}
