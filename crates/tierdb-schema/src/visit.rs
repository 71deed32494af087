use crate::{error::ErrorTree, node::VisitableNode};

///
/// Visitor
///

pub trait Visitor {
    fn visit<N: VisitableNode>(&mut self, node: &N);

    fn push(&mut self, _: &str) {}

    fn pop(&mut self) {}
}

///
/// ValidateVisitor
/// runs `ValidateNode::validate` on every node, filing errors by route
///

#[derive(Debug, Default)]
pub struct ValidateVisitor {
    pub errors: ErrorTree,
    route: Vec<String>,
}

impl ValidateVisitor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn current_route(&self) -> String {
        self.route
            .iter()
            .filter(|s| !s.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl Visitor for ValidateVisitor {
    fn visit<N: VisitableNode>(&mut self, node: &N) {
        if let Err(errs) = node.validate() {
            let route = self.current_route();
            if route.is_empty() {
                self.errors.merge(errs);
            } else {
                self.errors.add_child(route, errs);
            }
        }
    }

    fn push(&mut self, segment: &str) {
        self.route.push(segment.to_string());
    }

    fn pop(&mut self) {
        self.route.pop();
    }
}
