//! Text dump of a graph for debugging.

use crate::autograd::{Node, OpKind};
use crate::error::Result;

/// Render `root` as an in-order tree, one `value=<v> grad=<g> <op>` line per
/// node. The first operand is printed above its parent and the second below,
/// both indented by the width of the parent's line. Shared sub-nodes are
/// printed once per use, so a chain of diamonds renders exponentially many
/// lines. The walk recurses once per level, which limits it to shallow
/// graphs; use [`crate::topological_order`] to inspect deep ones.
pub fn render_tree(root: &Node) -> Result<String> {
    let mut out = String::new();
    write_node(root, 0, &mut out)?;
    Ok(out)
}

fn write_node(node: &Node, indent: usize, out: &mut String) -> Result<()> {
    let label = match node.kind() {
        OpKind::None => String::new(),
        kind => kind.to_string(),
    };
    let line = format!(
        "{}value={} grad={} {}",
        " ".repeat(indent),
        node.value().render()?,
        node.grad().render()?,
        label
    );
    let line = line.trim_end();

    let operands = node.operands();
    if let Some(left) = operands.first() {
        write_node(left, line.len(), out)?;
    }
    out.push_str(line);
    out.push('\n');
    if let Some(right) = operands.get(1) {
        write_node(right, line.len(), out)?;
    }
    Ok(())
}
