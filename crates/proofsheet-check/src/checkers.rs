//! Detector bundles and their cache

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ahash::AHashMap;
use tracing::{debug, warn};

use crate::classify;
use crate::config::{DetectorConfig, GrammarBackend, SpellingBackend};
use crate::detect::{
    DetectorError, DictionarySpeller, DisabledDetector, GrammarDetector, RuleGrammarChecker,
    SpellingDetector,
};
use crate::issue::IssueKind;

/// One spelling and one grammar detector, ready to use from many threads.
///
/// A failing detector call never propagates: the cell simply gets no
/// findings of that kind and a warning is logged.
pub struct Checkers {
    speller: Arc<dyn SpellingDetector>,
    grammar: Arc<dyn GrammarDetector>,
    grammar_min_word_count: usize,
    /// Set by [`acquire`](Checkers::acquire) for backends that are switched
    /// off or failed to start
    spelling_disabled: bool,
    grammar_disabled: bool,
}

impl Checkers {
    /// Bundle detectors built by the caller. Both count as enabled, whatever
    /// they are.
    pub fn new(
        speller: Arc<dyn SpellingDetector>,
        grammar: Arc<dyn GrammarDetector>,
        grammar_min_word_count: usize,
    ) -> Self {
        Self {
            speller,
            grammar,
            grammar_min_word_count,
            spelling_disabled: false,
            grammar_disabled: false,
        }
    }

    /// Initialise the configured backends.
    ///
    /// A backend that fails to start is replaced by a [`DisabledDetector`]
    /// and reported once.
    pub fn acquire(config: &DetectorConfig) -> Self {
        let (speller, spelling_disabled): (Arc<dyn SpellingDetector>, bool) =
            match spelling_detector(config) {
                Ok(Some(speller)) => (speller, false),
                Ok(None) => (Arc::new(DisabledDetector::new()), true),
                Err(e) => {
                    warn!(error = %e, "spelling checks disabled");
                    (Arc::new(DisabledDetector::because(e.to_string())), true)
                }
            };
        let (grammar, grammar_disabled): (Arc<dyn GrammarDetector>, bool) =
            match grammar_detector(config) {
                Ok(Some(grammar)) => (grammar, false),
                Ok(None) => (Arc::new(DisabledDetector::new()), true),
                Err(e) => {
                    warn!(error = %e, "grammar checks disabled");
                    (Arc::new(DisabledDetector::because(e.to_string())), true)
                }
            };
        debug!(
            language = %config.language,
            speller = speller.name(),
            grammar = grammar.name(),
            "checkers ready"
        );
        Self {
            speller,
            grammar,
            grammar_min_word_count: config.grammar_min_word_count,
            spelling_disabled,
            grammar_disabled,
        }
    }

    /// The spelling detector, disabled or not
    pub fn speller(&self) -> &dyn SpellingDetector {
        self.speller.as_ref()
    }

    pub fn grammar_detector(&self) -> &dyn GrammarDetector {
        self.grammar.as_ref()
    }

    /// Texts with fewer words than this skip grammar checking
    pub fn grammar_min_word_count(&self) -> usize {
        self.grammar_min_word_count
    }

    /// Whether a text is long enough for grammar checking
    pub fn grammar_applies(&self, text: &str) -> bool {
        classify::word_count(text) >= self.grammar_min_word_count
    }

    /// Misspelled words in `text`
    pub fn spelling(&self, text: &str) -> Vec<String> {
        match self.speller.check(text) {
            Ok(words) => words,
            Err(e) => {
                warn!(detector = self.speller.name(), error = %e, "spelling check failed");
                Vec::new()
            }
        }
    }

    /// Grammar messages for `text`, empty below the word-count gate
    pub fn grammar(&self, text: &str) -> Vec<String> {
        if !self.grammar_applies(text) {
            return Vec::new();
        }
        match self.grammar.check(text) {
            Ok(messages) => messages,
            Err(e) => {
                warn!(detector = self.grammar.name(), error = %e, "grammar check failed");
                Vec::new()
            }
        }
    }

    /// Run the detector for `kind`
    pub fn check(&self, kind: IssueKind, text: &str) -> Vec<String> {
        match kind {
            IssueKind::Spelling => self.spelling(text),
            IssueKind::Grammar => self.grammar(text),
        }
    }

    /// Whether checks of `kind` were switched off in the configuration or
    /// lost to a backend that failed to start
    pub fn is_disabled(&self, kind: IssueKind) -> bool {
        match kind {
            IssueKind::Spelling => self.spelling_disabled,
            IssueKind::Grammar => self.grammar_disabled,
        }
    }
}

impl fmt::Debug for Checkers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checkers")
            .field("speller", &self.speller.name())
            .field("grammar", &self.grammar.name())
            .field("grammar_min_word_count", &self.grammar_min_word_count)
            .field("spelling_disabled", &self.spelling_disabled)
            .field("grammar_disabled", &self.grammar_disabled)
            .finish()
    }
}

/// `None` when spelling is switched off
fn spelling_detector(
    config: &DetectorConfig,
) -> Result<Option<Arc<dyn SpellingDetector>>, DetectorError> {
    match &config.spelling {
        SpellingBackend::Dictionary {
            lexicons,
            extra_words,
        } => {
            let speller = DictionarySpeller::from_sources(lexicons, extra_words, &config.language)?;
            Ok(Some(Arc::new(speller)))
        }
        SpellingBackend::Disabled => Ok(None),
    }
}

/// `None` when grammar is switched off
fn grammar_detector(
    config: &DetectorConfig,
) -> Result<Option<Arc<dyn GrammarDetector>>, DetectorError> {
    match &config.grammar {
        GrammarBackend::Rules => Ok(Some(Arc::new(RuleGrammarChecker::for_language(
            &config.language,
        )?))),
        GrammarBackend::LanguageTool { url } => {
            languagetool_detector(url, &config.language).map(Some)
        }
        GrammarBackend::Disabled => Ok(None),
    }
}

#[cfg(feature = "languagetool")]
fn languagetool_detector(
    url: &str,
    language: &str,
) -> Result<Arc<dyn GrammarDetector>, DetectorError> {
    let checker = crate::detect::LanguageToolChecker::connect(url, language)?;
    Ok(Arc::new(checker))
}

#[cfg(not(feature = "languagetool"))]
fn languagetool_detector(
    _url: &str,
    _language: &str,
) -> Result<Arc<dyn GrammarDetector>, DetectorError> {
    Err(DetectorError::unavailable(
        "languagetool",
        "built without the languagetool feature",
    ))
}

/// Caches initialised [`Checkers`] per detector configuration.
///
/// Owned by whoever runs checks (a batch, a CLI invocation); detectors live
/// as long as the pool or until [`shutdown`](CheckerPool::shutdown).
#[derive(Debug, Default)]
pub struct CheckerPool {
    checkers: Mutex<AHashMap<DetectorConfig, Arc<Checkers>>>,
}

impl CheckerPool {
    pub fn new() -> Self {
        Self::default()
    }

    fn cache(&self) -> MutexGuard<'_, AHashMap<DetectorConfig, Arc<Checkers>>> {
        self.checkers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached checkers for `config`, initialising them on first use.
    ///
    /// Backends start without the pool locked, so a slow one (a grammar
    /// server that takes seconds to answer) never blocks lookups of other
    /// configurations. When two callers race on a new key both may start
    /// the backends; the first to finish is cached and returned to both.
    pub fn get_or_init(&self, config: &DetectorConfig) -> Arc<Checkers> {
        let cached = self.cache().get(config).cloned();
        if let Some(checkers) = cached {
            return checkers;
        }

        let fresh = Arc::new(Checkers::acquire(config));
        Arc::clone(self.cache().entry(config.clone()).or_insert(fresh))
    }

    /// Drop every cached detector
    pub fn shutdown(&self) {
        let mut cache = self.cache();
        debug!(count = cache.len(), "releasing checkers");
        cache.clear();
    }

    /// Number of cached configurations
    pub fn len(&self) -> usize {
        self.cache().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{Lexicon, LexiconSource};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Failing;

    impl SpellingDetector for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn check(&self, _text: &str) -> Result<Vec<String>, DetectorError> {
            Err(DetectorError::failed("failing", "connection reset"))
        }
    }

    #[derive(Default)]
    struct Counting(AtomicUsize);

    impl GrammarDetector for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        fn check(&self, _text: &str) -> Result<Vec<String>, DetectorError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(vec!["found".to_string()])
        }
    }

    fn missing_word_list() -> DetectorConfig {
        DetectorConfig {
            spelling: SpellingBackend::Dictionary {
                lexicons: vec![LexiconSource::WordList {
                    path: PathBuf::from("/nonexistent/words.txt"),
                }],
                extra_words: vec![],
            },
            ..DetectorConfig::default()
        }
    }

    #[test]
    fn test_failed_init_degrades() {
        let checkers = Checkers::acquire(&missing_word_list());

        assert!(checkers.is_disabled(IssueKind::Spelling));
        assert!(!checkers.is_disabled(IssueKind::Grammar));
        assert!(checkers.spelling("Teh qwerty").is_empty());
        assert_eq!(checkers.grammar("this is is wrong").len(), 2);
    }

    #[test]
    fn test_unsupported_language_disables_rules() {
        let config = DetectorConfig {
            language: "fr-FR".into(),
            spelling: SpellingBackend::Disabled,
            ..DetectorConfig::default()
        };
        let checkers = Checkers::acquire(&config);
        assert!(checkers.is_disabled(IssueKind::Grammar));
    }

    #[cfg(not(feature = "languagetool"))]
    #[test]
    fn test_languagetool_without_feature_is_disabled() {
        let config = DetectorConfig {
            grammar: GrammarBackend::LanguageTool {
                url: "http://localhost:8081".into(),
            },
            ..DetectorConfig::default()
        };
        assert!(Checkers::acquire(&config).is_disabled(IssueKind::Grammar));
    }

    #[test]
    fn test_call_failure_yields_no_findings() {
        let checkers = Checkers::new(Arc::new(Failing), Arc::new(DisabledDetector::new()), 3);
        assert!(checkers.spelling("anything at all").is_empty());
    }

    #[test]
    fn test_grammar_word_gate() {
        let counting = Arc::new(Counting::default());
        let checkers = Checkers::new(
            Arc::new(DictionarySpeller::new(Lexicon::from_words(["ok"]))),
            counting.clone(),
            3,
        );

        assert!(checkers.grammar("ok").is_empty());
        assert!(checkers.grammar("two words").is_empty());
        assert_eq!(counting.0.load(Ordering::SeqCst), 0);

        assert_eq!(checkers.grammar("Ths is a test"), vec!["found"]);
        assert_eq!(counting.0.load(Ordering::SeqCst), 1);
    }

    struct NamedDisabled;

    impl SpellingDetector for NamedDisabled {
        fn name(&self) -> &str {
            "disabled"
        }

        fn check(&self, text: &str) -> Result<Vec<String>, DetectorError> {
            Ok(vec![text.to_string()])
        }
    }

    #[test]
    fn test_detector_name_does_not_disable() {
        let checkers = Checkers::new(Arc::new(NamedDisabled), Arc::new(Counting::default()), 3);
        assert!(!checkers.is_disabled(IssueKind::Spelling));
        assert_eq!(checkers.spelling("zzz"), vec!["zzz"]);
    }

    #[test]
    fn test_switched_off_backends_are_disabled() {
        let config = DetectorConfig {
            spelling: SpellingBackend::Disabled,
            grammar: GrammarBackend::Disabled,
            ..DetectorConfig::default()
        };
        let checkers = Checkers::acquire(&config);
        assert!(checkers.is_disabled(IssueKind::Spelling));
        assert!(checkers.is_disabled(IssueKind::Grammar));

        let rules = Checkers::acquire(&DetectorConfig {
            spelling: SpellingBackend::Disabled,
            ..DetectorConfig::default()
        });
        assert!(!rules.is_disabled(IssueKind::Grammar));
    }

    #[test]
    fn test_pool_hands_every_thread_the_same_checkers() {
        let pool = CheckerPool::new();
        let config = DetectorConfig {
            spelling: SpellingBackend::Disabled,
            ..DetectorConfig::default()
        };

        let handed_out: Vec<Arc<Checkers>> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| pool.get_or_init(&config)))
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        assert_eq!(pool.len(), 1);
        let cached = pool.get_or_init(&config);
        assert!(handed_out.iter().all(|c| Arc::ptr_eq(c, &cached)));
    }

    #[test]
    fn test_pool_initialises_once_per_key() {
        let pool = CheckerPool::new();
        let disabled = DetectorConfig {
            spelling: SpellingBackend::Disabled,
            grammar: GrammarBackend::Disabled,
            ..DetectorConfig::default()
        };
        let rules = DetectorConfig {
            spelling: SpellingBackend::Disabled,
            ..DetectorConfig::default()
        };

        let a = pool.get_or_init(&disabled);
        let b = pool.get_or_init(&disabled);
        let c = pool.get_or_init(&rules);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(pool.len(), 2);

        pool.shutdown();
        assert!(pool.is_empty());
        // handed-out checkers stay usable
        assert!(a.spelling("whatever").is_empty());
    }
}
