//! Per-package aggregation of normalized identifiers.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::core::identifier::Identifier;

/// Package name used for the summary across every package.
pub const ALL_PACKAGES: &str = "*";

/// Package key of a file: `<dir>/<package>`, or `<package>` at the root.
pub fn package_key(file: &str, package: &str) -> String {
    match file.rsplit_once('/') {
        Some((dir, _)) if !dir.is_empty() => format!("{dir}/{package}"),
        _ => package.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub project_ref: String,
    pub package: String,
    pub total_identifiers: usize,
    pub total_exported: usize,
    /// Tokens produced per splitter
    pub total_splits: BTreeMap<String, usize>,
    /// Tokens actually rewritten per expander
    pub total_expansions: BTreeMap<String, usize>,
    /// Sum of normalization scores
    pub total_weight: f64,
    pub files: BTreeSet<String>,
}

impl Insight {
    pub fn new(project_ref: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            project_ref: project_ref.into(),
            package: package.into(),
            total_identifiers: 0,
            total_exported: 0,
            total_splits: BTreeMap::new(),
            total_expansions: BTreeMap::new(),
            total_weight: 0.0,
            files: BTreeSet::new(),
        }
    }

    pub fn include(&mut self, identifier: &Identifier) {
        self.total_identifiers += 1;
        if identifier.is_exported() {
            self.total_exported += 1;
        }
        for (splitter, splits) in &identifier.splits {
            *self.total_splits.entry(splitter.clone()).or_insert(0) += splits.len();
        }
        for (expander, expansions) in &identifier.expansions {
            let rewritten = expansions
                .iter()
                .filter(|expansion| expansion.values.iter().any(|value| *value != expansion.from))
                .count();
            *self.total_expansions.entry(expander.clone()).or_insert(0) += rewritten;
        }
        self.total_weight += identifier.normalization.score;
        self.files.insert(identifier.file.clone());
    }

    /// Fold another insight's totals into this one.
    pub fn merge(&mut self, other: &Insight) {
        self.total_identifiers += other.total_identifiers;
        self.total_exported += other.total_exported;
        for (algorithm, count) in &other.total_splits {
            *self.total_splits.entry(algorithm.clone()).or_insert(0) += count;
        }
        for (algorithm, count) in &other.total_expansions {
            *self.total_expansions.entry(algorithm.clone()).or_insert(0) += count;
        }
        self.total_weight += other.total_weight;
        self.files.extend(other.files.iter().cloned());
    }

    fn average(&self, total: usize) -> f64 {
        if self.total_identifiers == 0 {
            0.0
        } else {
            total as f64 / self.total_identifiers as f64
        }
    }

    pub fn avg_splits(&self, algorithm: &str) -> f64 {
        self.average(self.total_splits.get(algorithm).copied().unwrap_or(0))
    }

    pub fn avg_expansions(&self, algorithm: &str) -> f64 {
        self.average(self.total_expansions.get(algorithm).copied().unwrap_or(0))
    }

    /// Mean normalization score.
    pub fn rate(&self) -> f64 {
        if self.total_identifiers == 0 {
            0.0
        } else {
            self.total_weight / self.total_identifiers as f64
        }
    }
}

/// Folds identifiers into one [`Insight`] per package.
#[derive(Debug, Clone, Default)]
pub struct InsightAggregator {
    project_ref: String,
    insights: BTreeMap<String, Insight>,
}

impl InsightAggregator {
    pub fn new(project_ref: impl Into<String>) -> Self {
        Self {
            project_ref: project_ref.into(),
            insights: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, identifier: &Identifier) {
        let key = package_key(&identifier.file, &identifier.package);
        let project_ref = &self.project_ref;
        self.insights
            .entry(key)
            .or_insert_with_key(|key| Insight::new(project_ref.clone(), key.clone()))
            .include(identifier);
    }

    /// Insights ordered by package key.
    pub fn finish(self) -> Vec<Insight> {
        self.insights.into_values().collect()
    }
}

/// Summary of several package insights.
pub fn overall(project_ref: &str, insights: &[Insight]) -> Insight {
    let mut summary = Insight::new(project_ref, ALL_PACKAGES);
    for insight in insights {
        summary.merge(insight);
    }
    summary
}
