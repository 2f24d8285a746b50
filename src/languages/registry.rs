use super::{Language, LanguageDefinition};
use std::sync::Arc;

#[derive(Clone)]
pub struct LanguageRegistry {
    languages: Vec<Arc<dyn LanguageDefinition>>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self {
            languages: Vec::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(super::PythonLanguage));
        registry.register(Arc::new(super::JavaScriptLanguage));
        registry.register(Arc::new(super::TypeScriptLanguage));
        registry.register(Arc::new(super::GoLanguage));
        registry.register(Arc::new(super::RustLanguage));
        registry
    }

    pub fn register(&mut self, language: Arc<dyn LanguageDefinition>) {
        self.languages.push(language);
    }

    pub fn get(&self, id: Language) -> Option<&dyn LanguageDefinition> {
        self.languages
            .iter()
            .find(|l| l.id() == id)
            .map(|l| l.as_ref())
    }

    pub fn all_languages(&self) -> &[Arc<dyn LanguageDefinition>] {
        &self.languages
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
