//! Tasks and per-dataset hyperparameters

use serde::Serialize;
use std::fmt;

/// NLP task a dataset evaluates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    NamedEntityRecognition,
    PartOfSpeechTagging,
    DependencyParsing,
    TextClassification,
}

impl TaskKind {
    /// Name passed to the fine-tuning command
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NamedEntityRecognition => "ner",
            Self::PartOfSpeechTagging => "pos",
            Self::DependencyParsing => "dep",
            Self::TextClassification => "text-classification",
        }
    }

    /// Whether spaCy pipelines can be evaluated on this task
    ///
    /// spaCy pipelines ship token-level components only.
    pub fn supports_spacy(&self) -> bool {
        !matches!(self, Self::TextClassification)
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Hyperparameters and label vocabulary of one dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetParams {
    /// Short identifier, e.g. "dkhate"
    pub key: String,
    /// Descriptive name used in log lines
    pub alias: String,
    pub task: TaskKind,
    pub id2label: Vec<String>,
    pub epochs: u32,
    pub learning_rate: f64,
    pub warmup_steps: u32,
}

const LEARNING_RATE: f64 = 2e-5;
const WARMUP_STEPS: u32 = 50;

const NER_LABELS: [&str; 9] = [
    "B-LOC", "I-LOC", "B-ORG", "I-ORG", "B-PER", "I-PER", "B-MISC", "I-MISC", "O",
];

const POS_LABELS: [&str; 17] = [
    "ADJ", "ADP", "ADV", "AUX", "CCONJ", "DET", "INTJ", "NOUN", "NUM", "PART", "PRON", "PROPN",
    "PUNCT", "SCONJ", "SYM", "VERB", "X",
];

const DEP_LABELS: [&str; 36] = [
    "acl", "acl:relcl", "advcl", "advmod", "amod", "appos", "aux", "case", "cc", "ccomp",
    "compound:prt", "conj", "cop", "dep", "det", "discourse", "expl", "fixed", "flat", "iobj",
    "list", "mark", "nmod", "nmod:poss", "nsubj", "nummod", "obj", "obl", "obl:loc", "obl:tmod",
    "orphan", "parataxis", "punct", "root", "vocative", "xcomp",
];

const SENTIMENT_LABELS: [&str; 3] = ["negativ", "neutral", "positiv"];

const HATE_SPEECH_LABELS: [&str; 2] = ["NOT", "OFF"];

impl DatasetParams {
    fn new(key: &str, alias: &str, task: TaskKind, labels: &[&str], epochs: u32) -> Self {
        Self {
            key: key.to_string(),
            alias: alias.to_string(),
            task,
            id2label: labels.iter().map(|l| l.to_string()).collect(),
            epochs,
            learning_rate: LEARNING_RATE,
            warmup_steps: WARMUP_STEPS,
        }
    }

    pub fn num_labels(&self) -> usize {
        self.id2label.len()
    }

    /// The standard battery of Danish datasets, in benchmark order
    pub fn standard() -> Vec<Self> {
        let ner_without_misc: Vec<&str> = NER_LABELS
            .iter()
            .copied()
            .filter(|l| !l.ends_with("MISC"))
            .collect();

        vec![
            Self::new(
                "dane",
                "DaNE with MISC tags",
                TaskKind::NamedEntityRecognition,
                &NER_LABELS,
                5,
            ),
            Self::new(
                "dane-no-misc",
                "DaNE without MISC tags",
                TaskKind::NamedEntityRecognition,
                &ner_without_misc,
                5,
            ),
            Self::new(
                "ddt-pos",
                "the POS part of DDT",
                TaskKind::PartOfSpeechTagging,
                &POS_LABELS,
                5,
            ),
            Self::new(
                "ddt-dep",
                "the DEP part of DDT",
                TaskKind::DependencyParsing,
                &DEP_LABELS,
                5,
            ),
            Self::new(
                "angry-tweets",
                "Angry Tweets",
                TaskKind::TextClassification,
                &SENTIMENT_LABELS,
                5,
            ),
            Self::new(
                "twitter-sent",
                "Twitter Sent",
                TaskKind::TextClassification,
                &SENTIMENT_LABELS,
                5,
            ),
            Self::new(
                "dkhate",
                "DKHate",
                TaskKind::TextClassification,
                &HATE_SPEECH_LABELS,
                5,
            ),
            Self::new(
                "europarl1",
                "Europarl1",
                TaskKind::TextClassification,
                &SENTIMENT_LABELS,
                5,
            ),
            Self::new(
                "europarl2",
                "Europarl2",
                TaskKind::TextClassification,
                &SENTIMENT_LABELS,
                5,
            ),
            Self::new(
                "lcc1",
                "LCC1",
                TaskKind::TextClassification,
                &SENTIMENT_LABELS,
                5,
            ),
            Self::new(
                "lcc2",
                "LCC2",
                TaskKind::TextClassification,
                &SENTIMENT_LABELS,
                5,
            ),
        ]
    }
}
