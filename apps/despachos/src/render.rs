//! Plain-text output for the render description produced by `client_core::view`.

use std::fmt::Write;

use client_core::view::{Action, RenderNode, Tone};

const INDENT: &str = "  ";

pub fn render_text(nodes: &[RenderNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(&mut out, node, 0);
    }
    out
}

/// Page links on one line, e.g. `Anterior (1) 1 [2] 3 Siguiente (3)`.
/// Disabled arrows are dropped; arrows name the page they lead to.
pub fn render_page_links(nodes: &[RenderNode]) -> String {
    nodes
        .iter()
        .filter_map(|node| match node {
            RenderNode::PageLink {
                label,
                current: true,
                ..
            } => Some(format!("[{label}]")),
            RenderNode::PageLink {
                label,
                target,
                enabled: true,
                ..
            } => {
                if *label == target.to_string() {
                    Some(label.clone())
                } else {
                    Some(format!("{label} ({target})"))
                }
            }
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn write_node(out: &mut String, node: &RenderNode, depth: usize) {
    let pad = INDENT.repeat(depth);
    // Writing into a String cannot fail.
    let _ = match node {
        RenderNode::Heading(text) => writeln!(out, "{pad}== {text} =="),
        RenderNode::Text(text) => writeln!(out, "{pad}{text}"),
        RenderNode::Muted(text) => writeln!(out, "{pad}({text})"),
        RenderNode::Empty(text) => writeln!(out, "{pad}-- {text} --"),
        RenderNode::Badge { .. } | RenderNode::Progress { .. } => {
            writeln!(out, "{pad}{}", inline(node))
        }
        RenderNode::Fields(fields) => {
            let width = fields.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
            for (key, value) in fields {
                let _ = writeln!(out, "{pad}{key:<width$} : {value}");
            }
            Ok(())
        }
        RenderNode::Button { .. } | RenderNode::PageLink { .. } => Ok(()),
        RenderNode::Row { cells, .. } => {
            let cells: Vec<String> = cells.iter().map(inline).collect();
            writeln!(out, "{pad}{}", cells.join(" | "))
        }
        RenderNode::Section {
            title,
            expanded,
            children,
        } => {
            let marker = if *expanded { "v" } else { ">" };
            let _ = writeln!(out, "{pad}{marker} {title}");
            if *expanded {
                for child in children {
                    write_node(out, child, depth + 1);
                }
            }
            Ok(())
        }
    };
}

fn inline(node: &RenderNode) -> String {
    match node {
        RenderNode::Heading(text)
        | RenderNode::Text(text)
        | RenderNode::Muted(text)
        | RenderNode::Empty(text) => text.clone(),
        RenderNode::Badge { text, tone } => match tone {
            Tone::Success => format!("[OK {text}]"),
            _ => format!("[{text}]"),
        },
        RenderNode::Progress { label, .. } => label.clone(),
        RenderNode::Fields(fields) => fields
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", "),
        RenderNode::Button { label, .. } | RenderNode::PageLink { label, .. } => label.clone(),
        RenderNode::Row { cells, .. } => cells.iter().map(inline).collect::<Vec<_>>().join(" | "),
        RenderNode::Section { title, .. } => title.clone(),
    }
}

/// CLI hints for the actions a detail view offers.
pub fn action_hints(nodes: &[RenderNode], numero: &str) -> Vec<String> {
    let mut hints = Vec::new();
    collect_hints(nodes, numero, &mut hints);
    hints.dedup();
    hints
}

fn collect_hints(nodes: &[RenderNode], numero: &str, hints: &mut Vec<String>) {
    for node in nodes {
        match node {
            RenderNode::Button {
                action,
                enabled: true,
                ..
            } => {
                if let Some(hint) = action_hint(action, numero) {
                    hints.push(hint);
                }
            }
            RenderNode::Section { children, .. } => collect_hints(children, numero, hints),
            _ => {}
        }
    }
}

fn action_hint(action: &Action, numero: &str) -> Option<String> {
    let hint = match action {
        Action::ProcessAll => format!("despachos process {numero}"),
        Action::ProcessDocument(id) => format!("despachos process {numero} --document {id}"),
        Action::ViewDocument(id) => format!("despachos pdf {numero} {id}"),
        Action::SyncSgd => format!("despachos sync {numero}"),
        Action::Upload => format!("despachos upload {numero} <archivo.pdf>"),
        Action::ExportJson => format!("despachos export {numero} --format json"),
        Action::ExportExcel => format!("despachos export {numero} --format excel"),
        Action::Select(_) => return None,
    };
    Some(hint)
}
