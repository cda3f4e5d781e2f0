use anyhow::{Context, Result, anyhow, bail};
use log::{debug, error, trace, warn};
use std::{collections::BTreeSet, fs, path::Path};
use tree_sitter::{Node, Parser};

use crate::types::ImportDeclaration;

/// Reads `file` and returns its import declarations.
///
/// Unreadable files and files with syntax errors yield an empty set: a broken
/// module still belongs to the closure, it just contributes no edges.
pub fn imports_for(file: &Path) -> BTreeSet<ImportDeclaration> {
    trace!("Parsing file for imports: {}", file.display());
    let src = match fs::read_to_string(file) {
        Ok(src) => src,
        Err(e) => {
            error!("Failed to read {}: {}", file.display(), e);
            return BTreeSet::new();
        }
    };

    match parse_imports(&src) {
        Ok(imports) => {
            debug!("Found {} import declarations in {}", imports.len(), file.display());
            imports
        }
        Err(e) => {
            warn!("Syntax error in {}: {}", file.display(), e);
            BTreeSet::new()
        }
    }
}

/// Parses Python source and collects every `import` and `from ... import`
/// declaration, including ones nested in functions, classes and `try` blocks.
pub fn parse_imports(source: &str) -> Result<BTreeSet<ImportDeclaration>> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .context("Failed to load the Python grammar")?;
    let tree = parser.parse(source, None).ok_or_else(|| anyhow!("Parser returned no tree"))?;

    let root = tree.root_node();
    if root.has_error() {
        match first_error_line(root) {
            Some(line) => bail!("invalid syntax at line {}", line),
            None => bail!("invalid syntax"),
        }
    }

    let bytes = source.as_bytes();
    let mut imports = BTreeSet::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        match node.kind() {
            "import_statement" => collect_import(node, bytes, &mut imports),
            "import_from_statement" => collect_from_import(node, bytes, &mut imports),
            "future_import_statement" => {
                trace!("Found __future__ import");
                imports.insert(ImportDeclaration::Absolute("__future__".to_string()));
            }
            _ => {
                let mut cursor = node.walk();
                stack.extend(node.named_children(&mut cursor));
            }
        }
    }

    Ok(imports)
}

// import a.b, c as d
fn collect_import(node: Node, src: &[u8], imports: &mut BTreeSet<ImportDeclaration>) {
    let mut cursor = node.walk();
    for name in node.children_by_field_name("name", &mut cursor) {
        if let Some(module) = imported_name(name, src) {
            trace!("Found absolute import: '{}'", module);
            imports.insert(ImportDeclaration::Absolute(module));
        }
    }
}

// from ..pkg import a, b as c
fn collect_from_import(node: Node, src: &[u8], imports: &mut BTreeSet<ImportDeclaration>) {
    let Some(module_node) = node.child_by_field_name("module_name") else {
        return;
    };

    let (level, module) = if module_node.kind() == "relative_import" {
        let mut level = 0;
        let mut module = String::new();
        let mut cursor = module_node.walk();
        for child in module_node.named_children(&mut cursor) {
            match child.kind() {
                "import_prefix" => {
                    level = child
                        .utf8_text(src)
                        .map(|dots| dots.chars().filter(|c| *c == '.').count())
                        .unwrap_or(0);
                }
                "dotted_name" => module = dotted_text(child, src).unwrap_or_default(),
                _ => {}
            }
        }
        (level, module)
    } else {
        match dotted_text(module_node, src) {
            Some(module) => (0, module),
            None => return,
        }
    };

    let declare = |module: String| {
        if level == 0 {
            ImportDeclaration::Absolute(module)
        } else {
            ImportDeclaration::Relative { level, module }
        }
    };

    trace!("Found from-import: '{}{}'", ".".repeat(level), module);
    imports.insert(declare(module.clone()));

    // Each imported name may itself be a submodule of the source module
    let mut cursor = node.walk();
    for name in node.children_by_field_name("name", &mut cursor) {
        if let Some(member) = imported_name(name, src) {
            let candidate =
                if module.is_empty() { member } else { format!("{}.{}", module, member) };
            trace!("Found possible submodule: '{}{}'", ".".repeat(level), candidate);
            imports.insert(declare(candidate));
        }
    }
}

fn imported_name(node: Node, src: &[u8]) -> Option<String> {
    match node.kind() {
        "dotted_name" => dotted_text(node, src),
        "aliased_import" => node.child_by_field_name("name").and_then(|n| dotted_text(n, src)),
        _ => None,
    }
}

fn dotted_text(node: Node, src: &[u8]) -> Option<String> {
    let mut cursor = node.walk();
    let segments: Vec<&str> = node
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "identifier")
        .filter_map(|child| child.utf8_text(src).ok())
        .collect();

    if segments.is_empty() { None } else { Some(segments.join(".")) }
}

fn first_error_line(root: Node) -> Option<usize> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node.start_position().row + 1);
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<Node> = node.children(&mut cursor).collect();
            // Reverse so the earliest child is examined first
            stack.extend(children.into_iter().rev());
        }
    }
    None
}
