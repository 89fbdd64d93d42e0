// Tree → JSON.
//
// Every node becomes an object `{"type", "data"?, "value"?, "ial"?,
// "children"?}`: `type` is the kind name, `data` the raw tokens, `value` a
// kind-specific summary (heading tag, list flavor, code info, alignment,
// checkbox state). Objects are built on a stack during the walk and
// serialized with serde_json once it completes.

use serde::Serialize;

use super::{build_table, BaseRenderer, Handler, HandlerTable, RenderOptions, Renderer};
use crate::ast::{ListType, NodeId, NodeKind, Tree, WalkStatus};
use crate::error::ConvertError;

#[derive(Debug, Serialize)]
struct JsonNode {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "String::is_empty")]
    data: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    value: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ial: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<JsonNode>,
}

/// JSON renderer.
#[derive(Debug)]
pub struct JsonRenderer {
    base: BaseRenderer,
    table: HandlerTable<JsonRenderer>,
    pretty: bool,
    stack: Vec<JsonNode>,
    done: Option<JsonNode>,
}

impl Default for JsonRenderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl JsonRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            base: BaseRenderer::new(options),
            table: build_table(handler),
            pretty: false,
            stack: Vec::new(),
            done: None,
        }
    }

    /// Indent the output.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Renderer for JsonRenderer {
    fn base(&self) -> &BaseRenderer {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseRenderer {
        &mut self.base
    }

    fn table(&self) -> &HandlerTable<Self> {
        &self.table
    }

    fn table_mut(&mut self) -> &mut HandlerTable<Self> {
        &mut self.table
    }

    fn begin(&mut self, _tree: &Tree, _root: NodeId) {
        self.stack.clear();
        self.done = None;
    }

    fn finish(&mut self, _tree: &Tree) -> Result<String, ConvertError> {
        let Some(root) = self.done.take() else {
            return Ok(String::new());
        };
        let json = if self.pretty {
            serde_json::to_string_pretty(&root)?
        } else {
            serde_json::to_string(&root)?
        };
        Ok(json)
    }
}

fn handler(_: NodeKind) -> Option<Handler<JsonRenderer>> {
    Some(render_node)
}

fn render_node(r: &mut JsonRenderer, tree: &Tree, id: NodeId, entering: bool) -> WalkStatus {
    if entering {
        let node = &tree[id];
        r.stack.push(JsonNode {
            kind: node.kind.name(),
            data: node.tokens.clone(),
            value: value_of(tree, id),
            ial: node.ial.clone(),
            children: Vec::new(),
        });
        return WalkStatus::Continue;
    }
    let Some(done) = r.stack.pop() else {
        return WalkStatus::Continue;
    };
    match r.stack.last_mut() {
        Some(parent) => parent.children.push(done),
        None => r.done = Some(done),
    }
    WalkStatus::Continue
}

fn value_of(tree: &Tree, id: NodeId) -> String {
    let node = &tree[id];
    match node.kind {
        NodeKind::Heading => super::heading_tag(node.heading_level),
        NodeKind::List | NodeKind::ListItem => match &node.list {
            Some(data) if data.list_type == ListType::Task => "task".to_string(),
            Some(data) if data.is_numbered() => "ol".to_string(),
            Some(_) => "ul".to_string(),
            None => String::new(),
        },
        NodeKind::CodeBlockFenceInfoMarker => node.code_block_info.clone(),
        NodeKind::TableCell => node.cell_align.as_attr().unwrap_or_default().to_string(),
        NodeKind::TaskListItemMarker => node.task_checked.to_string(),
        NodeKind::Link | NodeKind::Image => node.link_ref_label.clone(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Node;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_nested_objects() {
        let mut tree = Tree::new();
        let root = tree.root();
        let h = tree.append_new(root, Node::heading(2));
        tree.append_new(h, Node::text("a\"b"));
        let out = JsonRenderer::default().render(&tree).unwrap();
        assert_eq!(
            out,
            r#"{"type":"Document","children":[{"type":"Heading","value":"h2","children":[{"type":"Text","data":"a\"b"}]}]}"#
        );
    }

    #[test]
    fn test_output_parses_back() {
        let mut tree = Tree::new();
        let root = tree.root();
        let p = tree.append_new(root, Node::new(NodeKind::Paragraph));
        tree[p].set_ial("id", "20200101");
        tree.append_new(p, Node::text("x\ny"));
        let out = JsonRenderer::default().pretty(true).render(&tree).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["children"][0]["ial"][0][1], "20200101");
        assert_eq!(value["children"][0]["children"][0]["data"], "x\ny");
    }
}
