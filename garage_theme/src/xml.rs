use sxd_document::dom::{Document, Element};


pub(crate) const NS_DRAWINGML: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub(crate) const NS_DRAWINGML_STRICT: &str = "http://purl.oclc.org/ooxml/drawingml/main";
pub(crate) const NS_OFFDOC_RELS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub(crate) const NS_PRESENTATIONML: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";


/// Prefixes to use for namespaces when writing elements into an existing document.
///
/// Color swatches written while patching a theme take their prefix from this table. If the role
/// element spells the namespace with another prefix, the swatch declares the table's prefix itself.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct NamespaceTable {
    entries: Vec<(String, String)>,
}
impl NamespaceTable {
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn with_prefix<P: Into<String>, N: Into<String>>(mut self, prefix: P, namespace_uri: N) -> Self {
        let prefix = prefix.into();
        let namespace_uri = namespace_uri.into();
        self.entries.retain(|(p, n)| p != &prefix && n != &namespace_uri);
        self.entries.push((prefix, namespace_uri));
        self
    }

    pub fn prefix_for(&self, namespace_uri: &str) -> Option<&str> {
        self.entries.iter()
            .filter(|(_, n)| n == namespace_uri)
            .map(|(p, _)| p.as_str())
            .nth(0)
    }

    pub fn namespace_for(&self, prefix: &str) -> Option<&str> {
        self.entries.iter()
            .filter(|(p, _)| p == prefix)
            .map(|(_, n)| n.as_str())
            .nth(0)
    }
}
impl Default for NamespaceTable {
    fn default() -> Self {
        Self::empty()
            .with_prefix("a", NS_DRAWINGML)
            .with_prefix("r", NS_OFFDOC_RELS)
            .with_prefix("p", NS_PRESENTATIONML)
    }
}


/// Whether an element in this namespace (or in none) counts as DrawingML.
pub(crate) fn is_drawingml_namespace(namespace_uri: Option<&str>) -> bool {
    match namespace_uri {
        None => true,
        Some(ns) => ns == NS_DRAWINGML || ns == NS_DRAWINGML_STRICT,
    }
}


pub(crate) trait DocExt<'d> {
    fn root_element(&self) -> Option<Element<'d>>;
}
impl<'d> DocExt<'d> for Document<'d> {
    fn root_element(&self) -> Option<Element<'d>> {
        self
            .root()
            .children().into_iter()
            .filter_map(|c| c.element())
            .nth(0)
    }
}

pub(crate) trait ElemExt<'d> {
    /// Whether the element is the DrawingML element with the given local name.
    ///
    /// Both the transitional and the strict DrawingML namespaces are accepted, as are elements
    /// without any namespace.
    fn is_drawingml(&self, name: &str) -> bool;

    fn child_elements(&self) -> Vec<Element<'d>>;
    fn collect_descendants_into(&self, buf: &mut Vec<Element<'d>>);
    fn non_empty_attribute_value(&self, name: &str) -> Option<&'d str>;

    fn child_elements_named_dml(&self, name: &str) -> Vec<Element<'d>> {
        self.child_elements()
            .into_iter()
            .filter(|e| e.is_drawingml(name))
            .collect()
    }

    /// Returns this element and all elements below it, in document order.
    fn descendants_or_self(&self) -> Vec<Element<'d>> {
        let mut buf = Vec::new();
        self.collect_descendants_into(&mut buf);
        buf
    }
}
impl<'d> ElemExt<'d> for Element<'d> {
    fn is_drawingml(&self, name: &str) -> bool {
        let my_name = self.name();
        if my_name.local_part() != name {
            return false;
        }
        is_drawingml_namespace(my_name.namespace_uri())
    }

    fn child_elements(&self) -> Vec<Element<'d>> {
        self.children()
            .into_iter()
            .filter_map(|c| c.element())
            .collect()
    }

    fn collect_descendants_into(&self, buf: &mut Vec<Element<'d>>) {
        buf.push(*self);
        for child in self.child_elements() {
            child.collect_descendants_into(buf);
        }
    }

    fn non_empty_attribute_value(&self, name: &str) -> Option<&'d str> {
        self.attribute_value(name)
            .filter(|v| v.len() > 0)
    }
}
