use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use textsift::{
    capability::{Capability, CapabilityRegistry},
    config::Routing,
    error::{ProcessError, RegistryError},
    langid::{LanguageDetector, LanguageGuess},
    pipeline::{ExtractionRequest, Pipeline},
    report::NO_WINNER,
    router::Router,
    score::Scorer,
    select::NOTHING_ROUTED,
};

const GOOD: &str = "The quick brown fox jumps over the lazy dog. It was a calm and bright morning.";
const NOISY: &str = "T#e q@ick b~own f%x j^mps ov&r t*e l|zy d$g";

struct Fixed;

impl LanguageDetector for Fixed {
    fn detect(&self, _sample: &str) -> Result<Vec<LanguageGuess>> {
        Ok(vec![LanguageGuess {
            language: "en".into(),
            probability: 0.9,
        }])
    }
}

struct Fake {
    name: String,
    reply: Option<&'static str>,
    calls: Arc<AtomicUsize>,
}

impl Capability for Fake {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self, _path: &Path) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply {
            Some(text) => Ok(text.to_string()),
            None => Err(anyhow!("{} is not installed", self.name)),
        }
    }
}

struct Fixture {
    pipeline: Pipeline,
    calls: BTreeMap<&'static str, Arc<AtomicUsize>>,
    dir: tempfile::TempDir,
}

impl Fixture {
    fn new(replies: &[(&'static str, Option<&'static str>)]) -> Self {
        let mut registry = CapabilityRegistry::new();
        let mut calls = BTreeMap::new();
        for &(name, reply) in replies {
            let counter = Arc::new(AtomicUsize::new(0));
            calls.insert(name, counter.clone());
            registry
                .register(Box::new(Fake {
                    name: name.to_string(),
                    reply,
                    calls: counter,
                }))
                .unwrap();
        }
        let scorer = Scorer::new(Arc::new(Fixed)).unwrap();
        let pipeline = Pipeline::new(Arc::new(registry), Router::default(), scorer).unwrap();
        Self {
            pipeline,
            calls,
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn file(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, b"fixture").unwrap();
        path
    }

    fn count(&self, name: &str) -> usize {
        self.calls[name].load(Ordering::SeqCst)
    }

    fn total_calls(&self) -> usize {
        self.calls.values().map(|c| c.load(Ordering::SeqCst)).sum()
    }
}

fn all_succeed() -> Fixture {
    Fixture::new(&[
        ("docling", Some(GOOD)),
        ("PyMuPDF", Some(GOOD)),
        ("pdfplumber", Some(NOISY)),
        ("pytesseract", Some(NOISY)),
        ("easyocr", Some(NOISY)),
        ("python-docx", Some(GOOD)),
        ("beautifulsoup4", Some(GOOD)),
    ])
}

#[test]
fn pdf_runs_every_routed_engine_in_order() {
    let fx = all_succeed();
    let result = fx.pipeline.process(&fx.file("report.pdf"), None).unwrap();

    let order: Vec<&str> = result.candidates.iter().map(|c| c.engine.as_str()).collect();
    assert_eq!(
        order,
        vec!["docling", "PyMuPDF", "pdfplumber", "pytesseract", "easyocr"]
    );
    for name in order {
        assert_eq!(fx.count(name), 1, "{name}");
    }
    assert_eq!(fx.count("python-docx"), 0);
    // docling and PyMuPDF tie; the earlier one wins.
    assert_eq!(result.source, "docling");
    assert_eq!(result.text, GOOD);
}

#[test]
fn failing_engines_are_isolated() {
    let fx = Fixture::new(&[
        ("docling", None),
        ("PyMuPDF", Some(NOISY)),
        ("pdfplumber", None),
        ("pytesseract", Some(GOOD)),
        ("easyocr", None),
        ("python-docx", Some(GOOD)),
        ("beautifulsoup4", Some(GOOD)),
    ]);
    let result = fx.pipeline.process(&fx.file("scan.pdf"), None).unwrap();

    assert_eq!(result.candidates.len(), 5);
    assert_eq!(result.source, "pytesseract");
    assert!(result.score > result.candidates[1].score());
    assert_eq!(result.candidates[0].score(), -1.0);
    assert_eq!(
        result.candidates[0].error(),
        Some("docling is not installed")
    );
    assert_eq!(fx.count("easyocr"), 1);
}

#[test]
fn every_engine_failing_is_not_fatal() {
    let fx = Fixture::new(&[
        ("docling", Some(GOOD)),
        ("PyMuPDF", Some(GOOD)),
        ("pdfplumber", Some(GOOD)),
        ("pytesseract", None),
        ("easyocr", None),
        ("python-docx", Some(GOOD)),
        ("beautifulsoup4", Some(GOOD)),
    ]);
    let result = fx.pipeline.process(&fx.file("photo.png"), None).unwrap();
    assert_eq!(result.source, NO_WINNER);
    assert_eq!(result.score, 0.0);
    assert_eq!(result.text, "");
    assert_eq!(result.candidates.len(), 2);
    assert!(result.candidates.iter().all(|c| c.error().is_some()));
}

#[test]
fn explicit_engine_bypasses_router() {
    let fx = all_succeed();
    // The router has nothing for .xyz; the explicit engine still runs.
    let req = ExtractionRequest::new(fx.file("blob.xyz")).with_engine("docling");
    let result = fx.pipeline.run(&req).unwrap();

    assert_eq!(result.source, "docling");
    assert_eq!(result.candidates.len(), 1);
    assert_eq!(fx.count("docling"), 1);
    assert_eq!(fx.total_calls(), 1);
}

#[test]
fn unknown_explicit_engine_is_fatal() {
    let fx = all_succeed();
    let err = fx
        .pipeline
        .process(&fx.file("report.pdf"), Some("nonexistent"))
        .unwrap_err();
    match err {
        ProcessError::UnknownEngine { name, available } => {
            assert_eq!(name, "nonexistent");
            assert!(available.contains("docling"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fx.total_calls(), 0);
}

#[test]
fn missing_file_is_fatal() {
    let fx = all_succeed();
    let err = fx
        .pipeline
        .process(Path::new("/nonexistent/path"), None)
        .unwrap_err();
    assert!(matches!(err, ProcessError::InputNotFound(_)));

    let err = fx
        .pipeline
        .process(Path::new("/nonexistent/path.pdf"), Some("docling"))
        .unwrap_err();
    assert!(matches!(err, ProcessError::InputNotFound(_)));
    assert_eq!(fx.total_calls(), 0);
}

#[test]
fn unrouted_type_yields_empty_result() {
    let fx = all_succeed();
    let result = fx.pipeline.process(&fx.file("notes.xyz"), None).unwrap();
    assert_eq!(result.source, NO_WINNER);
    assert_eq!(result.error.as_deref(), Some(NOTHING_ROUTED));
    assert_eq!(fx.total_calls(), 0);
}

#[test]
fn routes_must_reference_registered_engines() {
    let mut registry = CapabilityRegistry::new();
    registry
        .register(Box::new(Fake {
            name: "docling".into(),
            reply: Some(GOOD),
            calls: Arc::default(),
        }))
        .unwrap();
    let router = Router::new(Routing {
        pdf: vec!["docling".into()],
        ..Routing::default()
    });
    let scorer = Scorer::new(Arc::new(Fixed)).unwrap();
    match Pipeline::new(Arc::new(registry), router, scorer) {
        Err(RegistryError::UnknownRoute { kind, name }) => {
            assert_eq!(kind, "image");
            assert_eq!(name, "pytesseract");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("pipeline accepted an unregistered route"),
    }
}

#[test]
fn duplicate_names_are_rejected() {
    let fake = || {
        Box::new(Fake {
            name: "docling".into(),
            reply: None,
            calls: Arc::default(),
        })
    };
    let mut registry = CapabilityRegistry::new();
    registry.register(fake()).unwrap();
    let err = registry.register(fake()).unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateName(ref n) if n == "docling"));
    assert_eq!(registry.names(), vec!["docling"]);
}
