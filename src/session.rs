//! The interactive menu loop.
//!
//! A [`Session`] owns the configuration, the terminal streams and the PDF
//! engine. It is generic over its input and output so the whole dialogue can
//! be driven from memory in tests.
//!
//! The engine is loaded the first time a pipeline actually has something to
//! do; browsing the menu or picking from an empty list never needs pdfium.

use crate::config::ToolConfig;
use crate::engine::PdfEngine;
use crate::error::PagekitError;
use crate::pipeline::{compose, decompose};
use crate::report::{Artifact, BatchReport};
use crate::select::prompt_selection;
use crate::workspace::{image_folder_candidates, pdf_candidates, Candidate};
use std::io::{self, BufRead, Write};
use tracing::info;

/// Produces the engine on first use.
pub type EngineLoader = Box<dyn FnMut() -> Result<Box<dyn PdfEngine>, PagekitError>>;

/// One line of menu input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuChoice {
    Decompose,
    Compose,
    Quit,
    Invalid(String),
}

impl MenuChoice {
    pub fn parse(line: &str) -> Self {
        match line.trim().to_lowercase().as_str() {
            "1" => MenuChoice::Decompose,
            "2" => MenuChoice::Compose,
            "q" => MenuChoice::Quit,
            other => MenuChoice::Invalid(other.to_string()),
        }
    }
}

pub struct Session<R, W> {
    config: ToolConfig,
    input: R,
    output: W,
    loader: EngineLoader,
    engine: Option<Box<dyn PdfEngine>>,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(config: ToolConfig, input: R, output: W, loader: EngineLoader) -> Self {
        Self {
            config,
            input,
            output,
            loader,
            engine: None,
        }
    }

    /// A session with an engine that is already loaded.
    pub fn with_engine(config: ToolConfig, input: R, output: W, engine: Box<dyn PdfEngine>) -> Self {
        let mut session = Self::new(
            config,
            input,
            output,
            Box::new(|| -> Result<Box<dyn PdfEngine>, PagekitError> {
                Err(PagekitError::Internal("engine already loaded".into()))
            }),
        );
        session.engine = Some(engine);
        session
    }

    /// Show the menu until the user quits or input ends.
    ///
    /// Only failures to write to the output end the loop early.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.output)?;
            writeln!(self.output, "=== PDF Page Kit ===")?;
            writeln!(self.output, "1. Decompose PDF (selected PDFs -> PNG pages)")?;
            writeln!(self.output, "2. Compose PDF (selected folders -> PDF)")?;
            writeln!(self.output, "q. Quit")?;
            write!(self.output, "Select > ")?;
            self.output.flush()?;

            let mut line = String::new();
            let choice = if self.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                MenuChoice::Quit
            } else {
                MenuChoice::parse(&line)
            };

            match choice {
                MenuChoice::Decompose => {
                    self.run_decompose()?;
                }
                MenuChoice::Compose => {
                    self.run_compose()?;
                }
                MenuChoice::Quit => {
                    writeln!(self.output, "Exiting.")?;
                    return Ok(());
                }
                MenuChoice::Invalid(other) => {
                    info!("Unknown menu choice {other:?}");
                    writeln!(self.output, "Please enter a valid option.")?;
                }
            }
        }
    }

    /// List PDFs, prompt for a selection and decompose it.
    ///
    /// Returns `None` when nothing was processed.
    pub fn run_decompose(&mut self) -> io::Result<Option<BatchReport>> {
        let candidates = match pdf_candidates(&self.config) {
            Ok(c) => c,
            Err(e) => return self.abort(&e),
        };
        let selected = self.prompt(&candidates, "PDF files");
        if selected.is_empty() {
            return Ok(None);
        }

        writeln!(self.output)?;
        writeln!(
            self.output,
            "Decomposing {} PDF(s) at {} DPI.",
            selected.len(),
            self.config.dpi
        )?;
        if let Err(e) = self.ensure_engine() {
            return self.abort(&e);
        }
        let Some(engine) = self.engine.as_deref() else {
            return Ok(None);
        };

        let report = decompose::decompose(&self.config, engine, &selected);
        write_report(&mut self.output, &report)?;
        writeln!(self.output, "Selected PDFs have been decomposed.")?;
        Ok(Some(report))
    }

    /// List image folders, prompt for a selection and compose it.
    pub fn run_compose(&mut self) -> io::Result<Option<BatchReport>> {
        let candidates = match image_folder_candidates(&self.config) {
            Ok(c) => c,
            Err(e) => return self.abort(&e),
        };
        let selected = self.prompt(&candidates, "image folders");
        if selected.is_empty() {
            return Ok(None);
        }

        writeln!(self.output)?;
        writeln!(self.output, "Composing {} folder(s).", selected.len())?;
        if let Err(e) = self.ensure_engine() {
            return self.abort(&e);
        }
        let Some(engine) = self.engine.as_deref() else {
            return Ok(None);
        };

        let report = compose::compose(&self.config, engine, &selected);
        write_report(&mut self.output, &report)?;
        writeln!(self.output, "Selected folders have been composed.")?;
        Ok(Some(report))
    }

    fn prompt(&mut self, candidates: &[Candidate], label: &str) -> Vec<Candidate> {
        prompt_selection(candidates, label, &mut self.input, &mut self.output)
    }

    fn read_line(&mut self, line: &mut String) -> io::Result<usize> {
        self.input.read_line(line)
    }

    fn ensure_engine(&mut self) -> Result<(), PagekitError> {
        if self.engine.is_none() {
            self.engine = Some((self.loader)()?);
        }
        Ok(())
    }

    fn abort(&mut self, e: &PagekitError) -> io::Result<Option<BatchReport>> {
        writeln!(self.output, "✗ {e}")?;
        Ok(None)
    }
}

/// One line per item, then a summary.
pub fn write_report<W: Write>(out: &mut W, report: &BatchReport) -> io::Result<()> {
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(Artifact::PageFolder { path, pages }) => writeln!(
                out,
                "  ✓ {} → {} ({} pages)",
                outcome.name,
                path.display(),
                pages
            )?,
            Ok(Artifact::MergedPdf { path, pages }) => writeln!(
                out,
                "  ✓ {} → {} ({} pages)",
                outcome.name,
                path.display(),
                pages
            )?,
            Err(e) => writeln!(out, "  ⚠ Error ({}): {}", outcome.name, e)?,
        }
    }
    writeln!(
        out,
        "{}/{} succeeded in {:.1}s.",
        report.succeeded(),
        report.total(),
        report.duration.as_secs_f64()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{touch, workspace, write_png, MockEngine};
    use std::cell::Cell;
    use std::io::Cursor;
    use std::rc::Rc;

    fn session<'a>(
        config: ToolConfig,
        typed: &str,
        out: &'a mut Vec<u8>,
        engine: MockEngine,
    ) -> Session<Cursor<Vec<u8>>, &'a mut Vec<u8>> {
        Session::with_engine(
            config,
            Cursor::new(typed.as_bytes().to_vec()),
            out,
            Box::new(engine),
        )
    }

    #[test]
    fn menu_choices_parse_case_insensitively() {
        assert_eq!(MenuChoice::parse("1\n"), MenuChoice::Decompose);
        assert_eq!(MenuChoice::parse(" 2 "), MenuChoice::Compose);
        assert_eq!(MenuChoice::parse("Q"), MenuChoice::Quit);
        assert_eq!(MenuChoice::parse("3"), MenuChoice::Invalid("3".into()));
    }

    #[test]
    fn unknown_choice_reprompts_until_quit() {
        let (_tmp, config) = workspace();
        let mut out = Vec::new();
        session(config, "x\n\nq\n", &mut out, MockEngine::default())
            .run()
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.matches("Please enter a valid option.").count(), 2);
        assert_eq!(out.matches("=== PDF Page Kit ===").count(), 3);
        assert!(out.ends_with("Exiting.\n"));
    }

    #[test]
    fn end_of_input_quits() {
        let (_tmp, config) = workspace();
        let mut out = Vec::new();
        session(config, "", &mut out, MockEngine::default())
            .run()
            .unwrap();
        assert!(String::from_utf8(out).unwrap().contains("Exiting."));
    }

    #[test]
    fn decompose_from_menu() {
        let (_tmp, config) = workspace();
        touch(&config.root.join("report.pdf"));
        touch(&config.root.join("report_converted.pdf"));
        let root = config.root.clone();
        let engine = MockEngine::default().with_document("report.pdf", 3);
        let mut out = Vec::new();

        session(config, "1\nall\nq\n", &mut out, engine).run().unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains(" [1] report.pdf"), "got: {out}");
        assert!(!out.contains("[2]"), "converted output must not be listed: {out}");
        assert!(out.contains("(3 pages)"));
        assert!(out.contains("1/1 succeeded"));
        for page in ["001.png", "002.png", "003.png"] {
            assert!(root.join("report").join(page).exists());
        }
    }

    #[test]
    fn compose_from_menu() {
        let (_tmp, config) = workspace();
        let root = config.root.clone();
        std::fs::create_dir(root.join("report")).unwrap();
        for page in ["002.png", "001.png"] {
            write_png(&root.join("report").join(page), 2, 2);
        }
        let mut out = Vec::new();

        session(config, "2\n1\nq\n", &mut out, MockEngine::default())
            .run()
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains(" [1] report (2 images)"), "got: {out}");
        assert_eq!(
            MockEngine::assembled_pages(&root.join("report_converted.pdf")),
            vec!["001.png", "002.png"]
        );
    }

    #[test]
    fn failures_are_reported_per_item() {
        let (_tmp, config) = workspace();
        touch(&config.root.join("bad.pdf"));
        touch(&config.root.join("good.pdf"));
        let engine = MockEngine::default()
            .with_document("good.pdf", 1)
            .failing("bad.pdf");
        let mut out = Vec::new();

        let report = session(config, "1 2\n", &mut out, engine)
            .run_decompose()
            .unwrap()
            .unwrap();

        assert_eq!(report.failed(), 1);
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("⚠ Error (bad.pdf)"), "got: {out}");
        assert!(out.contains("1/2 succeeded"));
    }

    #[test]
    fn empty_workspace_never_loads_engine() {
        let (_tmp, config) = workspace();
        let loads = Rc::new(Cell::new(0));
        let counter = loads.clone();
        let mut out = Vec::new();
        let mut s = Session::new(
            config,
            Cursor::new(b"1\n2\nq\n".to_vec()),
            &mut out,
            Box::new(move || {
                counter.set(counter.get() + 1);
                Ok(Box::new(MockEngine::default()) as Box<dyn PdfEngine>)
            }),
        );

        s.run().unwrap();
        drop(s);

        assert_eq!(loads.get(), 0);
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("No PDF files available."));
        assert!(out.contains("No image folders available."));
    }

    #[test]
    fn engine_failure_returns_to_menu() {
        let (_tmp, config) = workspace();
        touch(&config.root.join("a.pdf"));
        let mut out = Vec::new();
        let mut s = Session::new(
            config,
            Cursor::new(b"1\n1\nq\n".to_vec()),
            &mut out,
            Box::new(|| -> Result<Box<dyn PdfEngine>, PagekitError> {
                Err(PagekitError::EngineUnavailable("no library".into()))
            }),
        );

        s.run().unwrap();
        drop(s);

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Failed to load the PDF engine"), "got: {out}");
        assert!(out.ends_with("Exiting.\n"));
    }

    #[test]
    fn engine_is_loaded_once() {
        let (_tmp, config) = workspace();
        touch(&config.root.join("a.pdf"));
        let loads = Rc::new(Cell::new(0));
        let counter = loads.clone();
        let mut out = Vec::new();
        let mut s = Session::new(
            config,
            Cursor::new(b"1\n1\n1\n1\nq\n".to_vec()),
            &mut out,
            Box::new(move || {
                counter.set(counter.get() + 1);
                Ok(Box::new(MockEngine::default().with_document("a.pdf", 1)) as Box<dyn PdfEngine>)
            }),
        );

        s.run().unwrap();

        assert_eq!(loads.get(), 1);
    }
}
