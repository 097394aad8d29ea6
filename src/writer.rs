//! The file writer (Stage E): buffers one output artifact — an import set
//! plus a text body — and flushes it with a fixed license header, package
//! line, and sorted import block (§4.5, §6.2).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::Error;

/// Reused verbatim across every artifact kind (§6.2: "every artifact file
/// begins with a fixed license comment").
pub const LICENSE_HEADER: &str = "\
// SPDX-License-Identifier: Apache-2.0
";

/// Buffers a single output artifact until `flush`.
pub struct ArtifactWriter {
    package: String,
    imports: BTreeSet<String>,
    body: String,
    out_path: PathBuf,
}

impl ArtifactWriter {
    /// Construct a writer for `out_path`. Rejects an empty `package`
    /// immediately, per §4.5's construction-time validation.
    pub fn new(out_path: impl Into<PathBuf>, package: impl Into<String>) -> Result<Self, Error> {
        let package = package.into();
        if package.is_empty() {
            return Err(Error::MissingPackage { file: out_path.into().to_string_lossy().into_owned() });
        }
        Ok(Self { package, imports: BTreeSet::new(), body: String::new(), out_path: out_path.into() })
    }

    /// Accumulate a symbol into the deduplicated, lexicographically sorted
    /// import set.
    pub fn add_import(&mut self, symbol: impl Into<String>) {
        self.imports.insert(symbol.into());
    }

    /// Raw string concatenation into the body buffer.
    pub fn append(&mut self, text: &str) {
        self.body.push_str(text);
    }

    /// Render the full artifact text (header, package line, blank line,
    /// sorted imports, blank line, body) without touching the filesystem —
    /// used by `render`-level unit tests.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(LICENSE_HEADER);
        out.push_str(&format!("package {};\n\n", self.package));
        for import in &self.imports {
            out.push_str(&format!("import {};\n", import));
        }
        if !self.imports.is_empty() {
            out.push('\n');
        }
        out.push_str(&self.body);
        out
    }

    /// Write the rendered artifact to `out_path`, creating parent
    /// directories as needed. Idempotent: calling `flush` again overwrites
    /// the same target with whatever has been added since.
    pub fn flush(&self) -> Result<(), Error> {
        if let Some(parent) = self.out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.out_path, self.render())?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.out_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_package_at_construction() {
        let result = ArtifactWriter::new("Out.java", "");
        assert!(matches!(result, Err(Error::MissingPackage { .. })));
    }

    #[test]
    fn render_sorts_imports_lexicographically() {
        let mut w = ArtifactWriter::new("Out.java", "demo").unwrap();
        w.add_import("demo.B");
        w.add_import("demo.A");
        w.append("class Out {}\n");
        let rendered = w.render();
        let pos_a = rendered.find("import demo.A").unwrap();
        let pos_b = rendered.find("import demo.B").unwrap();
        assert!(pos_a < pos_b);
        assert!(rendered.starts_with(LICENSE_HEADER));
    }

    #[test]
    fn dedups_repeated_imports() {
        let mut w = ArtifactWriter::new("Out.java", "demo").unwrap();
        w.add_import("demo.A");
        w.add_import("demo.A");
        assert_eq!(w.render().matches("import demo.A").count(), 1);
    }
}
