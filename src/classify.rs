//! The classification pipeline.
//!
//! Tiers run in the fixed order of [`TIER_ORDER`], each at most once per
//! call. Every tier has the same contract: `Ok(language)` with a known
//! language ends the pipeline, while `Ok(Unknown)` or any error advances it.
//! No state survives between calls, so classifying the same snapshot twice
//! gives the same answer and calls may run concurrently.

use crate::config::ClassifierConfig;
use crate::detect::{args, privileged::PrivilegedDetector, resolve, signature};
use crate::error::{ClassifyError, Result};
use crate::language::Language;
use crate::process::ProcessInfo;
use crate::timeout::{with_timeout, Deadline, TimeoutConfig};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, debug_span, trace};

/// One detection strategy, in increasing order of cost and privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// argv[0] against interpreter names.
    Arguments,
    /// Resolve argv[0] to a file, then inspect it for toolchain markers.
    Executable,
    /// Ask the privileged collaborator about the pid.
    Privileged,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Arguments => "arguments",
            Tier::Executable => "executable",
            Tier::Privileged => "privileged",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The order tiers are visited in.
pub const TIER_ORDER: [Tier; 3] = [Tier::Arguments, Tier::Executable, Tier::Privileged];

/// Outcome of one classification: the language and the tier that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Classification {
    pub language: Language,
    /// `None` when every tier came back empty.
    pub tier: Option<Tier>,
}

/// Runs the tier pipeline for process snapshots.
#[derive(Clone, Default)]
pub struct Classifier {
    config: ClassifierConfig,
    detector: Option<Arc<dyn PrivilegedDetector>>,
}

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier")
            .field("config", &self.config)
            .field("detector", &self.detector.as_ref().map(|d| d.name()))
            .finish()
    }
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            detector: None,
        }
    }

    /// Enable the privileged tier with `detector`.
    pub fn with_detector(mut self, detector: Arc<dyn PrivilegedDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn has_detector(&self) -> bool {
        self.detector.is_some()
    }

    /// Classify one process. Never fails; `Unknown` when no tier answers.
    ///
    /// The privileged detector is waited on for at most
    /// `timeouts.privileged_ms`; an overrun counts as no answer.
    pub fn classify(&self, info: &ProcessInfo) -> Language {
        self.classify_detailed(info).language
    }

    /// Classify one process and report which tier answered.
    pub fn classify_detailed(&self, info: &ProcessInfo) -> Classification {
        let span = debug_span!("classify", pid = info.pid);
        let _guard = span.enter();

        for tier in TIER_ORDER {
            if let Some(language) = settle(tier, self.run_tier(tier, info)) {
                return Classification {
                    language,
                    tier: Some(tier),
                };
            }
        }
        Classification::default()
    }

    /// Classify one process, running the blocking tiers on tokio's blocking
    /// pool under the configured hard timeouts.
    ///
    /// A tier that overruns reports "no answer"; its worker finishes in the
    /// background and releases whatever it opened.
    pub async fn classify_with_timeout(&self, info: &ProcessInfo) -> Language {
        for tier in TIER_ORDER {
            let outcome = match tier {
                Tier::Arguments => self.run_tier(tier, info),
                Tier::Privileged if self.detector.is_none() => Err(unavailable()),
                _ => self.run_blocking(tier, info).await,
            };
            if let Some(language) = settle(tier, outcome) {
                return language;
            }
        }
        Language::Unknown
    }

    /// Classify many snapshots in parallel.
    pub fn classify_batch(&self, infos: &[ProcessInfo]) -> Vec<Language> {
        infos.par_iter().map(|info| self.classify(info)).collect()
    }

    /// Run a single tier.
    pub fn run_tier(&self, tier: Tier, info: &ProcessInfo) -> Result<Language> {
        match tier {
            Tier::Arguments => Ok(args::find_in_args(&info.args)),
            Tier::Executable => {
                let deadline = Deadline::after_millis(self.config.timeouts.executable_ms);
                let mut exe =
                    resolve::try_resolve_executable(info, &self.config.resolve, &deadline)?;
                let lang = signature::inspect_executable(&mut exe, &self.config.inspect);
                deadline.check("inspect")?;
                Ok(lang)
            }
            Tier::Privileged => {
                let detector = self.detector.clone().ok_or_else(unavailable)?;
                detect_bounded(detector, info.pid, self.config.timeouts.privileged_ms)
            }
        }
    }

    async fn run_blocking(&self, tier: Tier, info: &ProcessInfo) -> Result<Language> {
        let millis = match tier {
            Tier::Privileged => self.config.timeouts.privileged_ms,
            _ => self.config.timeouts.executable_ms,
        };
        let this = self.clone();
        let info = info.clone();
        let task = tokio::task::spawn_blocking(move || this.run_tier(tier, &info));

        with_timeout(TimeoutConfig::from_millis(millis, tier.as_str()), async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(join) => Err(ClassifyError::Internal(join.to_string())),
            }
        })
        .await
    }
}

/// Run the detector on its own thread and stop waiting after `millis`.
///
/// A detector that overruns keeps its thread until it returns; the late
/// answer is dropped.
fn detect_bounded(detector: Arc<dyn PrivilegedDetector>, pid: u32, millis: u64) -> Result<Language> {
    let (tx, rx) = mpsc::sync_channel(1);
    thread::Builder::new()
        .name(format!("proclang-detect-{}", pid))
        .spawn(move || {
            let _ = tx.send(detector.detect(pid));
        })
        .map_err(|e| ClassifyError::Internal(format!("spawning detector thread: {}", e)))?;

    match rx.recv_timeout(Duration::from_millis(millis)) {
        Ok(outcome) => outcome,
        Err(RecvTimeoutError::Timeout) => {
            debug!(pid, timeout_ms = millis, "Privileged detector overran its budget");
            Err(ClassifyError::Timeout { millis })
        }
        Err(RecvTimeoutError::Disconnected) => Err(ClassifyError::Internal(
            "privileged detector panicked".to_string(),
        )),
    }
}

fn unavailable() -> ClassifyError {
    ClassifyError::CollaboratorUnavailable("no privileged detector configured".to_string())
}

/// Collapse a tier outcome into "answered" or "advance".
fn settle(tier: Tier, outcome: Result<Language>) -> Option<Language> {
    match outcome {
        Ok(lang) if lang.is_known() => {
            debug!(%tier, language = %lang, "Tier answered");
            Some(lang)
        }
        Ok(_) => {
            trace!(%tier, "No answer");
            None
        }
        Err(ClassifyError::CollaboratorUnavailable(_)) => {
            trace!(%tier, "Tier not attempted");
            None
        }
        Err(err) => {
            debug!(%tier, error = %err, "Tier failed");
            None
        }
    }
}

/// Classify from the argument vector alone.
pub fn classify_from_arguments<S: AsRef<str>>(args: &[S]) -> Language {
    args::find_in_args(args)
}

/// Classify with the default configuration and no privileged detector.
pub fn classify(info: &ProcessInfo) -> Language {
    Classifier::default().classify(info)
}
