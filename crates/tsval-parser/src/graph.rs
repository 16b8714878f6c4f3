//! Lazily loaded graph of source modules and cross-file name resolution.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tsval_core::fs;

use crate::error::IntrospectError;
use crate::lower::lower_module;
use crate::types::{Declaration, Imported, ModuleDecls, ReExport};

/// Extensions tried, in order, for an extension-less module specifier.
const CANDIDATE_SUFFIXES: &[&str] = &[".ts", ".tsx", ".d.ts", "/index.ts", "/index.tsx", "/index.d.ts"];

/// Resolve a relative module specifier against `base_dir`.
///
/// `./models/user` tries `user.ts`, `user.tsx`, `user.d.ts`, then
/// `user/index.*`. An explicit `.js` suffix (ESM style) is swapped for the
/// TypeScript source. Bare package specifiers never resolve.
#[must_use]
pub fn resolve_module_path(base_dir: &Path, specifier: &str) -> Option<PathBuf> {
    if !(specifier.starts_with("./") || specifier.starts_with("../") || specifier.starts_with('/')) {
        return None;
    }
    let joined = base_dir.join(specifier);
    if joined.is_file() && is_typescript(&joined) {
        return Some(joined);
    }

    let stem = specifier.strip_suffix(".js").unwrap_or(specifier);
    CANDIDATE_SUFFIXES
        .iter()
        .map(|suffix| base_dir.join(format!("{stem}{suffix}")))
        .find(|candidate| candidate.is_file())
}

fn is_typescript(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("ts" | "tsx")
    )
}

/// A declaration together with the module that declares it.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub module: Rc<ModuleDecls>,
    pub index: usize,
}

impl Resolved {
    #[must_use]
    pub fn declaration(&self) -> &Declaration {
        &self.module.declarations[self.index]
    }
}

/// Result of looking a name up in a module scope.
#[derive(Debug, Clone)]
pub enum Lookup {
    Declaration(Resolved),
    /// `ns` from `import * as ns from './x'`.
    Namespace(Rc<ModuleDecls>),
    NotFound,
}

/// Per-introspection module cache. Not shared across threads.
#[derive(Debug, Default)]
pub struct SourceGraph {
    modules: RefCell<HashMap<PathBuf, Rc<ModuleDecls>>>,
}

impl SourceGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load (or fetch from cache) the module at `path`.
    ///
    /// # Errors
    /// File system errors and syntax errors.
    pub fn load(&self, path: &Path) -> Result<Rc<ModuleDecls>, IntrospectError> {
        if let Some(module) = self.modules.borrow().get(path) {
            return Ok(Rc::clone(module));
        }
        let source = fs::read_file(path)?;
        let module = Rc::new(lower_module(&source, path)?);
        tracing::trace!(
            path = %path.display(),
            declarations = module.declarations.len(),
            "loaded module"
        );
        self.modules
            .borrow_mut()
            .insert(path.to_path_buf(), Rc::clone(&module));
        Ok(module)
    }

    /// Load the module `specifier` refers to from inside `from`.
    ///
    /// # Errors
    /// `ModuleNotFound` when the specifier does not resolve to a file.
    pub fn load_relative(
        &self,
        from: &ModuleDecls,
        specifier: &str,
    ) -> Result<Rc<ModuleDecls>, IntrospectError> {
        let base = from.path.parent().unwrap_or_else(|| Path::new("."));
        let path = resolve_module_path(base, specifier).ok_or_else(|| {
            IntrospectError::ModuleNotFound {
                specifier: specifier.to_string(),
                from: from.path.clone(),
            }
        })?;
        self.load(&path)
    }

    /// Resolve a (possibly `ns.`-qualified) name as seen from `module`.
    ///
    /// # Errors
    /// Module loading errors along import chains.
    pub fn lookup(&self, module: &Rc<ModuleDecls>, name: &str) -> Result<Lookup, IntrospectError> {
        if let Some((namespace, member)) = name.split_once('.') {
            return match self.lookup(module, namespace)? {
                Lookup::Namespace(target) => self.lookup_export(&target, member, &mut HashSet::new()),
                Lookup::Declaration(resolved) => Ok(Lookup::Declaration(resolved)),
                Lookup::NotFound => Ok(Lookup::NotFound),
            };
        }

        if let Some(index) = module.declarations.iter().position(|d| d.name == name) {
            return Ok(Lookup::Declaration(Resolved {
                module: Rc::clone(module),
                index,
            }));
        }

        if let Some(import) = module.imports.iter().find(|i| i.local == name) {
            let target = self.load_relative(module, &import.specifier)?;
            return match &import.imported {
                Imported::Namespace => Ok(Lookup::Namespace(target)),
                Imported::Named(imported) => self.lookup_export(&target, imported, &mut HashSet::new()),
            };
        }

        self.lookup_reexport(module, name, &mut HashSet::new())
    }

    /// Resolve an exported name of `module`, following re-export chains.
    fn lookup_export(
        &self,
        module: &Rc<ModuleDecls>,
        name: &str,
        visited: &mut HashSet<PathBuf>,
    ) -> Result<Lookup, IntrospectError> {
        if !visited.insert(module.path.clone()) {
            return Ok(Lookup::NotFound);
        }
        if let Some(index) = module
            .declarations
            .iter()
            .position(|d| d.name == name && d.exported)
        {
            return Ok(Lookup::Declaration(Resolved {
                module: Rc::clone(module),
                index,
            }));
        }
        if let Some(import) = module.imports.iter().find(|i| i.local == name) {
            // `import { X } from './x'; export { X };` is not tracked as a
            // local export list entry, but the binding is still visible.
            if let Imported::Named(imported) = &import.imported {
                let target = self.load_relative(module, &import.specifier)?;
                return self.lookup_export(&target, imported, visited);
            }
        }
        self.lookup_reexport(module, name, visited)
    }

    fn lookup_reexport(
        &self,
        module: &Rc<ModuleDecls>,
        name: &str,
        visited: &mut HashSet<PathBuf>,
    ) -> Result<Lookup, IntrospectError> {
        for reexport in &module.reexports {
            match reexport {
                ReExport::Named {
                    name: source_name,
                    exported_as,
                    specifier,
                } if exported_as == name => {
                    let target = self.load_relative(module, specifier)?;
                    return self.lookup_export(&target, source_name, visited);
                }
                ReExport::All { specifier } => {
                    let target = self.load_relative(module, specifier)?;
                    if let found @ (Lookup::Declaration(_) | Lookup::Namespace(_)) =
                        self.lookup_export(&target, name, visited)?
                    {
                        return Ok(found);
                    }
                }
                ReExport::Named { .. } => {}
            }
        }
        Ok(Lookup::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use std::fs as stdfs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn write(dir: &Path, rel: &str, contents: &str) -> PathBuf {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            stdfs::create_dir_all(parent).expect("mkdir should succeed");
        }
        stdfs::write(&path, contents).expect("write should succeed");
        path
    }

    #[test]
    fn resolves_candidates_in_order() {
        let tmp = TempDir::new().expect("tempdir should create");
        write(tmp.path(), "models/user.ts", "");
        write(tmp.path(), "models/api.d.ts", "");
        write(tmp.path(), "models/shared/index.ts", "");

        assert_eq!(
            resolve_module_path(tmp.path(), "./models/user"),
            Some(tmp.path().join("./models/user.ts"))
        );
        assert_eq!(
            resolve_module_path(tmp.path(), "./models/user.js"),
            Some(tmp.path().join("./models/user.ts"))
        );
        assert_eq!(
            resolve_module_path(tmp.path(), "./models/api"),
            Some(tmp.path().join("./models/api.d.ts"))
        );
        assert_eq!(
            resolve_module_path(tmp.path(), "./models/shared"),
            Some(tmp.path().join("./models/shared/index.ts"))
        );
        assert_eq!(resolve_module_path(tmp.path(), "lodash"), None);
    }

    #[test]
    fn lookup_follows_imports_and_reexports() {
        let tmp = TempDir::new().expect("tempdir should create");
        write(tmp.path(), "base.ts", "export interface Base { id: number }");
        write(tmp.path(), "barrel.ts", "export * from './base';");
        let main = write(
            tmp.path(),
            "main.ts",
            "import { Base } from './barrel';\nimport * as b from './base';\nexport interface Own { b: Base }",
        );

        let graph = SourceGraph::new();
        let module = graph.load(&main).expect("main should load");

        for (name, declared) in [("Own", "Own"), ("Base", "Base"), ("b.Base", "Base")] {
            let Lookup::Declaration(resolved) = graph.lookup(&module, name).expect("lookup") else {
                panic!("{name} should resolve to a declaration");
            };
            assert_eq!(resolved.declaration().name, declared);
        }
        assert!(matches!(
            graph.lookup(&module, "Missing").expect("lookup"),
            Lookup::NotFound
        ));
    }

    #[test]
    fn unresolvable_import_is_module_not_found() {
        let tmp = TempDir::new().expect("tempdir should create");
        let main = write(tmp.path(), "main.ts", "import { X } from './nowhere';");

        let graph = SourceGraph::new();
        let module = graph.load(&main).expect("main should load");
        let err = graph.lookup(&module, "X").expect_err("import target is missing");
        assert!(matches!(err, IntrospectError::ModuleNotFound { .. }));
    }

    #[test]
    fn modules_are_cached() {
        let tmp = TempDir::new().expect("tempdir should create");
        let path = write(tmp.path(), "a.ts", "export type A = string;");

        let graph = SourceGraph::new();
        let first = graph.load(&path).expect("load");
        let second = graph.load(&path).expect("load");
        assert!(Rc::ptr_eq(&first, &second));
    }
}
