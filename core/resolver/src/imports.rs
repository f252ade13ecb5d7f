use solgraph_ast::nodes::{AstNode, ExportedSymbol, NodeId, NodeType};
use solgraph_ast::tree::Tree;
use tracing::trace;

use crate::errors::ReferenceKind;
use crate::resolver::{Resolver, ids_of};

impl Resolver {
    /// Binds each import directive to its source unit, then exports what it brings
    /// in from the importing unit. Exports repeat until nothing changes so that
    /// symbols travel through chains of imports.
    pub(crate) fn link_imports(&mut self, tree: &mut Tree) {
        let imports = ids_of(tree, &[NodeType::ImportDirective]);
        for id in &imports {
            let Some(AstNode::ImportDirective(import)) = tree.get_by_id(*id) else {
                continue;
            };
            if import.source_unit.is_some() {
                continue;
            }
            let file = import.file.clone();
            match find_unit(tree, &import.absolute_path, &file) {
                Some(unit) => {
                    trace!(import = id, unit, "bound import");
                    if let Some(AstNode::ImportDirective(import)) = tree.get_by_id_mut(*id) {
                        import.source_unit = Some(unit);
                    }
                }
                None => self.report(tree, *id, &file, ReferenceKind::Import),
            }
        }

        for _ in 0..=imports.len() {
            let mut changed = false;
            for id in &imports {
                changed |= export_imported_symbols(tree, *id);
            }
            if !changed {
                break;
            }
        }

        for id in &imports {
            self.bind_symbol_aliases(tree, *id);
        }
    }

    fn bind_symbol_aliases(&mut self, tree: &mut Tree, id: NodeId) {
        let Some(AstNode::ImportDirective(import)) = tree.get_by_id(id) else {
            return;
        };
        let Some(AstNode::SourceUnit(target)) = import.source_unit.and_then(|u| tree.get_by_id(u))
        else {
            return;
        };
        let bindings: Vec<(usize, Option<NodeId>, String)> = import
            .symbol_aliases
            .iter()
            .enumerate()
            .map(|(index, alias)| {
                let declaration = target
                    .exported_symbols
                    .iter()
                    .find(|symbol| symbol.name == alias.foreign)
                    .map(|symbol| symbol.id);
                (index, declaration, alias.foreign.clone())
            })
            .collect();
        for (index, declaration, foreign) in bindings {
            match declaration {
                Some(declaration) => {
                    if let Some(AstNode::ImportDirective(import)) = tree.get_by_id_mut(id)
                        && let Some(alias) = import.symbol_aliases.get_mut(index)
                    {
                        alias.referenced_declaration = Some(declaration);
                    }
                }
                None => self.report(tree, id, &foreign, ReferenceKind::Import),
            }
        }
    }
}

/// The unit an import names: the exact normalized path, or else the unit whose
/// path ends with the path as written.
fn find_unit(tree: &Tree, absolute_path: &str, file: &str) -> Option<NodeId> {
    if let Some(unit) = tree.source_unit_by_path(absolute_path) {
        return Some(unit.id);
    }
    let relative = file
        .split('/')
        .skip_while(|segment| matches!(*segment, "." | ".."))
        .collect::<Vec<_>>()
        .join("/");
    let suffix = format!("/{relative}");
    tree.source_units()
        .into_iter()
        .find(|unit| unit.absolute_path == relative || unit.absolute_path.ends_with(&suffix))
        .map(|unit| unit.id)
}

/// Adds the symbols an import brings in to the importing unit. Returns whether
/// anything was added.
fn export_imported_symbols(tree: &mut Tree, id: NodeId) -> bool {
    let Some(AstNode::ImportDirective(import)) = tree.get_by_id(id) else {
        return false;
    };
    let Some(AstNode::SourceUnit(target)) = import.source_unit.and_then(|u| tree.get_by_id(u))
    else {
        return false;
    };
    let symbols: Vec<ExportedSymbol> = if let Some(alias) = &import.unit_alias {
        vec![ExportedSymbol {
            id: target.id,
            name: alias.clone(),
            absolute_path: target.absolute_path.clone(),
        }]
    } else if import.symbol_aliases.is_empty() {
        target.exported_symbols.clone()
    } else {
        import
            .symbol_aliases
            .iter()
            .filter_map(|alias| {
                let symbol = target
                    .exported_symbols
                    .iter()
                    .find(|symbol| symbol.name == alias.foreign)?;
                Some(ExportedSymbol {
                    id: symbol.id,
                    name: alias.local_name().to_string(),
                    absolute_path: symbol.absolute_path.clone(),
                })
            })
            .collect()
    };
    let Some(importer) = tree.enclosing_source_unit(id).map(|unit| unit.id) else {
        return false;
    };
    let Some(AstNode::SourceUnit(importer)) = tree.get_by_id_mut(importer) else {
        return false;
    };
    let mut changed = false;
    for symbol in symbols {
        let known = importer
            .exported_symbols
            .iter()
            .any(|existing| existing.id == symbol.id && existing.name == symbol.name);
        if !known {
            importer.exported_symbols.push(symbol);
            changed = true;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use solgraph_ast::nodes::{SourceUnit, Src};

    fn tree_with_units(paths: &[&str]) -> Tree {
        let units = paths
            .iter()
            .enumerate()
            .map(|(index, path)| {
                AstNode::SourceUnit(SourceUnit {
                    id: i64::try_from(index).unwrap() + 1,
                    src: Src::new(1, 0, 0, 0, None),
                    absolute_path: (*path).to_string(),
                    license: None,
                    exported_symbols: Vec::new(),
                    nodes: Vec::new(),
                })
            })
            .collect::<Vec<_>>();
        let repr = serde_json::json!({
            "source_units": (1..=units.len()).collect::<Vec<_>>(),
            "global_nodes": [],
            "nodes": units,
        });
        Tree::from_json(repr).unwrap()
    }

    #[test]
    fn imports_match_exact_paths_before_suffixes() {
        let tree = tree_with_units(&["/a/lib/Math.sol", "/b/lib/Math.sol"]);
        assert_eq!(find_unit(&tree, "/b/lib/Math.sol", "../lib/Math.sol"), Some(2));
        assert_eq!(find_unit(&tree, "lib/Math.sol", "lib/Math.sol"), Some(1));
        assert_eq!(find_unit(&tree, "Other.sol", "Other.sol"), None);
    }
}
