use implement::config::Config;
use implement::errors::Result;
use implement::generation::{
    CallArguments, CodeGenerator, Formatter, ImplementationLoader, Implementer, Prompt,
};
use implement::cache::ImplementationCache;
use implement::python::SourceRoot;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Records every prompt and answers with a fenced implementation
#[derive(Clone, Default)]
struct RecordingGenerator {
    prompts: Arc<Mutex<Vec<Prompt>>>,
}

impl CodeGenerator for RecordingGenerator {
    fn generate(&self, prompt: &Prompt) -> Result<String> {
        self.prompts.lock().push(prompt.clone());
        std::thread::sleep(std::time::Duration::from_millis(20));
        Ok("```python\ndef calculate(a, b, c):\n    return a + b + c.get_value()\n```".to_string())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Leaves a visible mark so tests can tell formatted code apart
struct PaddingFormatter;

impl Formatter for PaddingFormatter {
    fn format(&self, code: &str) -> Result<String> {
        Ok(implement::generation::formatter::normalize(code).replace("return", "return  "))
    }
}

struct SlotReader;

impl ImplementationLoader for SlotReader {
    fn invoke(&self, cache: &ImplementationCache, function: &str, _: &CallArguments) -> Result<Value> {
        Ok(Value::String(cache.read(function)?))
    }
}

fn implementer(cache_dir: &TempDir, generator: &RecordingGenerator) -> Implementer {
    let config = Config {
        cache_dir: cache_dir.path().to_path_buf(),
        ..Config::default()
    };
    Implementer::new(
        &config,
        Box::new(generator.clone()),
        Box::new(PaddingFormatter),
        Box::new(SlotReader),
    )
    .unwrap()
}

#[test]
fn test_prompt_carries_extraction_artifact() {
    let root = SourceRoot::new(fixtures());
    let module = root.load_file(&fixtures().join("source_test.py")).unwrap();
    let calculate = module.function("calculate").unwrap();

    let cache_dir = TempDir::new().unwrap();
    let generator = RecordingGenerator::default();
    implementer(&cache_dir, &generator)
        .ensure(calculate.decl(), &calculate.scope(Some(&root)))
        .unwrap();

    let prompts = generator.prompts.lock();
    assert_eq!(prompts.len(), 1);
    assert_eq!(
        prompts[0].artifact().unwrap(),
        calculate.extract(Some(&root)).unwrap()
    );
    assert_eq!(prompts[0].seed, 6);
}

#[test]
fn test_formatted_code_is_persisted() {
    let root = SourceRoot::new(fixtures());
    let module = root.load_file(&fixtures().join("source_test.py")).unwrap();
    let calculate = module.function("calculate").unwrap();

    let cache_dir = TempDir::new().unwrap();
    let implementer = implementer(&cache_dir, &RecordingGenerator::default());
    let result = implementer
        .call(
            calculate.decl(),
            &calculate.scope(Some(&root)),
            &CallArguments::positional(vec![json!(1), json!(2)]),
        )
        .unwrap();

    assert_eq!(
        result,
        json!("def calculate(a, b, c):\n    return   a + b + c.get_value()\n")
    );
    assert!(cache_dir.path().join("calculate.py").is_file());
}

#[test]
fn test_concurrent_calls_generate_each_function_once() {
    let root = SourceRoot::new(fixtures());
    let module = root.load_file(&fixtures().join("source_test.py")).unwrap();
    let cache_dir = TempDir::new().unwrap();
    let generator = RecordingGenerator::default();
    let implementer = implementer(&cache_dir, &generator);
    let names = ["calculate", "print_error", "return_none"];

    std::thread::scope(|s| {
        for i in 0..12 {
            let name = names[i % names.len()];
            let (root, module, implementer) = (&root, &module, &implementer);
            s.spawn(move || {
                let function = module.function(name).unwrap();
                implementer
                    .ensure(function.decl(), &function.scope(Some(root)))
                    .unwrap();
            });
        }
    });

    assert_eq!(generator.prompts.lock().len(), names.len());
    for name in names {
        assert!(implementer.cache().contains(name));
    }
}

#[test]
fn test_existing_slot_is_reused() {
    let root = SourceRoot::new(fixtures());
    let module = root.load_file(&fixtures().join("source_test.py")).unwrap();
    let calculate = module.function("calculate").unwrap();

    let cache_dir = TempDir::new().unwrap();
    std::fs::write(cache_dir.path().join("calculate.py"), "def calculate(a, b, c):\n    return 0\n")
        .unwrap();

    let generator = RecordingGenerator::default();
    let slot = implementer(&cache_dir, &generator)
        .ensure(calculate.decl(), &calculate.scope(Some(&root)))
        .unwrap();

    assert!(generator.prompts.lock().is_empty());
    assert_eq!(slot, cache_dir.path().join("calculate.py"));
}
