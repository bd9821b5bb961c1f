use std::cell::RefCell;
use std::rc::Rc;

pub mod dom_tree {
    use super::*;

    /// Shared handle to a node in the tree.
    pub type Handle = Rc<RefCell<Node>>;

    #[derive(Debug, Clone)]
    pub enum Node {
        DocumentRoot(DocumentRootNode),
        Element(ElementNode),
        Text(String),
        Comment(String),
    }

    #[derive(Debug, Clone, Default)]
    pub struct DocumentRootNode {
        pub children: Vec<Handle>,
    }

    #[derive(Debug, Clone)]
    pub struct ElementNode {
        /// Lowercased tag name, e.g. "div".
        pub tag: String,
        /// Attributes in source order.
        pub attributes: Vec<(String, String)>,
        pub children: Vec<Handle>,
    }

    #[derive(Debug)]
    pub struct Document {
        pub root: Handle,
        pub doctype: Option<Doctype>,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Doctype {
        pub name: String,
        pub public_id: Option<String>,
        pub system_id: Option<String>,
    }

    impl DocumentRootNode {
        pub fn new() -> Self {
            DocumentRootNode {
                children: Vec::new(),
            }
        }
    }

    impl ElementNode {
        pub fn new(tag: String, attributes: Vec<(String, String)>) -> Self {
            ElementNode {
                tag,
                attributes,
                children: Vec::new(),
            }
        }

        pub fn remove_attr(&mut self, name: &str) -> Option<String> {
            let index = self.attributes.iter().position(|(key, _)| key == name)?;
            Some(self.attributes.remove(index).1)
        }
    }

    impl Node {
        pub fn children(&self) -> Option<&[Handle]> {
            match self {
                Node::DocumentRoot(root) => Some(&root.children),
                Node::Element(elem) => Some(&elem.children),
                Node::Text(_) | Node::Comment(_) => None,
            }
        }

        pub fn children_mut(&mut self) -> Option<&mut Vec<Handle>> {
            match self {
                Node::DocumentRoot(root) => Some(&mut root.children),
                Node::Element(elem) => Some(&mut elem.children),
                Node::Text(_) | Node::Comment(_) => None,
            }
        }

        pub fn as_element(&self) -> Option<&ElementNode> {
            match self {
                Node::Element(elem) => Some(elem),
                _ => None,
            }
        }

        pub fn as_element_mut(&mut self) -> Option<&mut ElementNode> {
            match self {
                Node::Element(elem) => Some(elem),
                _ => None,
            }
        }

        /// True for an element whose tag is `tag`.
        pub fn is_element(&self, tag: &str) -> bool {
            self.as_element().is_some_and(|elem| elem.tag == tag)
        }
    }

    /// Tears the subtree down one node at a time. The derived drop would
    /// recurse once per nesting level.
    impl Drop for Node {
        fn drop(&mut self) {
            let mut pending = self
                .children_mut()
                .map(std::mem::take)
                .unwrap_or_default();
            while let Some(handle) = pending.pop() {
                // Nodes still referenced elsewhere are left to their owners.
                if let Ok(cell) = Rc::try_unwrap(handle) {
                    let mut node = cell.into_inner();
                    if let Some(children) = node.children_mut() {
                        pending.append(children);
                    }
                }
            }
        }
    }

    pub fn new_document() -> Document {
        Document {
            root: Rc::new(RefCell::new(Node::DocumentRoot(DocumentRootNode::new()))),
            doctype: None,
        }
    }

    pub fn new_element(tag: &str, attributes: Vec<(String, String)>) -> Handle {
        Rc::new(RefCell::new(Node::Element(ElementNode::new(
            tag.to_string(),
            attributes,
        ))))
    }

    pub fn new_text(text: &str) -> Handle {
        Rc::new(RefCell::new(Node::Text(text.to_string())))
    }

    /// Appends `child` as the last child of `parent`. Text and comment
    /// parents cannot hold children, so the child is dropped.
    pub fn append_child(parent: &Handle, child: Handle) {
        if let Some(children) = parent.borrow_mut().children_mut() {
            children.push(child);
        }
    }

    /// Detaches and returns every child of `parent`.
    pub fn take_children(parent: &Handle) -> Vec<Handle> {
        parent
            .borrow_mut()
            .children_mut()
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// First element named `tag` in a pre-order walk from `node` (inclusive).
    pub fn find_element(node: &Handle, tag: &str) -> Option<Handle> {
        let mut pending = vec![Rc::clone(node)];
        while let Some(current) = pending.pop() {
            if current.borrow().is_element(tag) {
                return Some(current);
            }
            if let Some(children) = current.borrow().children() {
                pending.extend(children.iter().rev().cloned());
            }
        }
        None
    }

    /// Removes every descendant element named `tag` from under `node` and
    /// returns them in document order. Matches are not searched further.
    pub fn take_elements(node: &Handle, tag: &str) -> Vec<Handle> {
        let mut taken = Vec::new();
        let mut pending = vec![Rc::clone(node)];
        while let Some(current) = pending.pop() {
            if !Rc::ptr_eq(&current, node) && current.borrow().is_element(tag) {
                taken.push(current);
                continue;
            }
            // Matches stay on the pending stack so they come off in
            // document order, interleaved with matches deeper down.
            if let Some(children) = current.borrow_mut().children_mut() {
                pending.extend(children.iter().rev().cloned());
                children.retain(|child| !child.borrow().is_element(tag));
            }
        }
        taken
    }

    /// Concatenated text of all text descendants.
    pub fn text_content(node: &Handle) -> String {
        let mut out = String::new();
        let mut pending = vec![Rc::clone(node)];
        while let Some(current) = pending.pop() {
            match &*current.borrow() {
                Node::Text(text) => out.push_str(text),
                Node::Comment(_) => {}
                other => {
                    let children = other.children().unwrap_or_default();
                    pending.extend(children.iter().rev().cloned());
                }
            }
        }
        out
    }
}
