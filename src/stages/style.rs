// src/stages/style.rs

//! SCSS → CSS: compile with `grass`, then prefix for the configured browser
//! targets and print expanded and minified copies with `lightningcss`.

use std::path::Path;

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};

use crate::errors::{PipelineError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledStyle {
    pub expanded: String,
    pub minified: String,
}

#[derive(Debug, Clone)]
pub struct StyleCompiler {
    browsers: Option<Browsers>,
}

impl StyleCompiler {
    /// `browsers` are browserslist queries such as `"defaults"` or
    /// `"last 2 versions"`.
    pub fn new<S: AsRef<str>>(browsers: &[S]) -> Result<Self> {
        let queries: Vec<&str> = browsers.iter().map(AsRef::as_ref).collect();
        let browsers = Browsers::from_browserslist(queries).map_err(|e| {
            PipelineError::ConfigError(format!("invalid browser targets: {e}"))
        })?;
        Ok(Self { browsers })
    }

    fn targets(&self) -> Targets {
        Targets {
            browsers: self.browsers,
            ..Targets::default()
        }
    }

    /// Compile `source`, read from `entry`. Imports resolve relative to the
    /// entry's directory.
    pub fn compile(&self, entry: &Path, source: &str) -> Result<CompiledStyle> {
        let mut options = grass::Options::default().style(grass::OutputStyle::Expanded);
        if let Some(dir) = entry.parent() {
            options = options.load_path(dir);
        }
        if entry.extension().is_some_and(|e| e == "sass") {
            options = options.input_syntax(grass::InputSyntax::Sass);
        }
        let css = grass::from_string(source.to_owned(), &options)
            .map_err(|e| PipelineError::stage("sass", entry, e))?;

        let filename = entry.to_string_lossy().into_owned();
        let mut sheet = StyleSheet::parse(
            &css,
            ParserOptions {
                filename,
                ..ParserOptions::default()
            },
        )
        .map_err(|e| PipelineError::stage("autoprefixer", entry, e))?;

        sheet
            .minify(MinifyOptions {
                targets: self.targets(),
                ..MinifyOptions::default()
            })
            .map_err(|e| PipelineError::stage("autoprefixer", entry, e))?;

        let expanded = self.print(&sheet, false, entry)?;
        let minified = self.print(&sheet, true, entry)?;
        Ok(CompiledStyle { expanded, minified })
    }

    fn print(&self, sheet: &StyleSheet<'_>, minify: bool, entry: &Path) -> Result<String> {
        let printed = sheet
            .to_css(PrinterOptions {
                minify,
                targets: self.targets(),
                ..PrinterOptions::default()
            })
            .map_err(|e| PipelineError::stage(if minify { "cssnano" } else { "autoprefixer" }, entry, e))?;
        Ok(printed.code)
    }
}
