//! Generate-once-then-reuse orchestration.

use super::client::{CodeGenerator, OpenAiClient};
use super::formatter::{CommandFormatter, Formatter};
use super::prompt::Prompt;
use super::runner::{CallArguments, ImplementationLoader, PythonRunner};
use crate::cache::ImplementationCache;
use crate::config::Config;
use crate::core::{FunctionDecl, Namespace};
use crate::errors::Result;
use crate::extraction;
use dashmap::DashMap;
use log::{debug, info};
use parking_lot::Mutex;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Produces, persists and calls implementations of declared functions.
///
/// A slot is generated at most once per function name: concurrent callers
/// for the same name wait on that slot's lock and then find it filled.
pub struct Implementer {
    cache: ImplementationCache,
    generator: Box<dyn CodeGenerator>,
    formatter: Box<dyn Formatter>,
    loader: Box<dyn ImplementationLoader>,
    slots: DashMap<String, Arc<Mutex<()>>>,
}

impl Implementer {
    /// Build from explicit parts; cleans the cache first when `config.clean`
    pub fn new(
        config: &Config,
        generator: Box<dyn CodeGenerator>,
        formatter: Box<dyn Formatter>,
        loader: Box<dyn ImplementationLoader>,
    ) -> Result<Self> {
        let cache = ImplementationCache::new(&config.cache_dir);
        if config.clean {
            let removed = cache.clean()?;
            info!(
                "Cleaned {} implementation(s) from {}",
                removed,
                cache.dir().display()
            );
        }

        Ok(Self {
            cache,
            generator,
            formatter,
            loader,
            slots: DashMap::new(),
        })
    }

    /// OpenAI generator, command formatter and Python runner from `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let generator =
            OpenAiClient::from_env(&config.openai.base_url, &config.model, config.openai.timeout())?;
        let formatter =
            CommandFormatter::new(config.formatter.program.clone(), config.formatter.args.clone());
        Self::new(
            config,
            Box::new(generator),
            Box::new(formatter),
            Box::new(PythonRunner::new(config.python.clone())),
        )
    }

    pub fn cache(&self) -> &ImplementationCache {
        &self.cache
    }

    /// Ask the model for an implementation and format it, without persisting
    pub fn generate_script(&self, function: &FunctionDecl, namespace: &dyn Namespace) -> Result<String> {
        let artifact = extraction::extract(function, namespace)?;
        debug!("Extraction artifact for {}:\n{}", function.qualname(), artifact);

        let start = Instant::now();
        info!(
            "Generating {} with {}",
            function.qualname(),
            self.generator.name()
        );
        let answer = self.generator.generate(&Prompt::for_artifact(artifact))?;
        let script = self.formatter.format(&answer)?;
        info!(
            "Generated {} in {:.1}s",
            function.qualname(),
            start.elapsed().as_secs_f64()
        );
        debug!("Generated script for {}:\n{}", function.qualname(), script);
        Ok(script)
    }

    /// Make sure an implementation of `function` is persisted; returns its slot
    pub fn ensure(&self, function: &FunctionDecl, namespace: &dyn Namespace) -> Result<PathBuf> {
        let name = function.name();
        let slot = self
            .slots
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = slot.lock();

        if self.cache.contains(name) {
            info!("{} is already implemented", name);
            return Ok(self.cache.slot_path(name));
        }

        let script = self.generate_script(function, namespace)?;
        self.cache.store(name, &script)
    }

    /// Ensure `function` is implemented, then call it
    pub fn call(
        &self,
        function: &FunctionDecl,
        namespace: &dyn Namespace,
        arguments: &CallArguments,
    ) -> Result<Value> {
        self.ensure(function, namespace)?;
        self.loader.invoke(&self.cache, function.name(), arguments)
    }
}
