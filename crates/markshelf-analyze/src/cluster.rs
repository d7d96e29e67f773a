//! Text clustering used to discover categories among unclaimed bookmarks.
//!
//! The default [`TfidfDbscan`] clusterer:
//!
//! 1. Tokenizes each text into words of two or more characters, drops
//!    stopwords and adds bigrams of adjacent remaining words
//! 2. Keeps terms present in at least `min_df` texts, capped at the
//!    `max_features` most frequent ones
//! 3. Weights terms by smoothed TF-IDF and L2-normalizes each vector
//! 4. Runs DBSCAN over cosine distances

use std::collections::{BTreeMap, HashMap, HashSet};

use derive_builder::Builder;
use itertools::Itertools;
use rayon::prelude::*;
use thiserror::Error;

use crate::text::{is_stopword, words};

/// Errors raised while clustering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClusterError {
    /// No term survived the document-frequency cut.
    #[error("Empty vocabulary: no term occurs in at least {min_df} texts")]
    EmptyVocabulary { min_df: usize },

    /// The clusterer was given nothing to work on.
    #[error("No texts to cluster")]
    NoTexts,
}

/// Assigns texts to clusters.
pub trait TextClusterer: Send + Sync {
    /// Cluster label per text, in input order. `None` marks noise.
    fn cluster(&self, texts: &[String]) -> Result<Vec<Option<usize>>, ClusterError>;
}

/// TF-IDF vectorization followed by DBSCAN with cosine distance.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct TfidfDbscan {
    /// Vocabulary size limit.
    #[builder(default = "100")]
    pub max_features: usize,

    /// Minimum number of texts a term must occur in.
    #[builder(default = "2")]
    pub min_df: usize,

    /// Maximum cosine distance between neighbours.
    #[builder(default = "0.6")]
    pub eps: f64,

    /// Neighbourhood size (the point included) that makes a core point.
    #[builder(default = "2")]
    pub min_samples: usize,
}

impl TfidfDbscan {
    /// Create a new builder.
    pub fn builder() -> TfidfDbscanBuilder {
        TfidfDbscanBuilder::default()
    }

    /// Turn texts into L2-normalized TF-IDF vectors over a shared vocabulary.
    pub fn vectorize(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, ClusterError> {
        let documents: Vec<Vec<String>> = texts.iter().map(|text| terms(text)).collect();

        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        let mut corpus_freq: HashMap<&str, usize> = HashMap::new();
        for document in &documents {
            let mut seen = HashSet::new();
            for term in document {
                *corpus_freq.entry(term).or_default() += 1;
                if seen.insert(term.as_str()) {
                    *doc_freq.entry(term).or_default() += 1;
                }
            }
        }

        // Most frequent first, alphabetical among equals, then re-sorted by term.
        let vocabulary: BTreeMap<&str, usize> = doc_freq
            .iter()
            .filter(|(_, df)| **df >= self.min_df)
            .map(|(term, _)| *term)
            .sorted_by(|a, b| corpus_freq[b].cmp(&corpus_freq[a]).then_with(|| a.cmp(b)))
            .take(self.max_features)
            .sorted()
            .enumerate()
            .map(|(index, term)| (term, index))
            .collect();

        if vocabulary.is_empty() {
            return Err(ClusterError::EmptyVocabulary {
                min_df: self.min_df,
            });
        }

        let n_docs = documents.len() as f64;
        let idf: Vec<f64> = vocabulary
            .keys()
            .map(|term| ((1.0 + n_docs) / (1.0 + doc_freq[term] as f64)).ln() + 1.0)
            .collect();

        let vectors = documents
            .iter()
            .map(|document| {
                let mut vector = vec![0.0; vocabulary.len()];
                for term in document {
                    if let Some(&index) = vocabulary.get(term.as_str()) {
                        vector[index] += idf[index];
                    }
                }
                let norm = vector.iter().map(|x| x * x).sum::<f64>().sqrt();
                if norm > 0.0 {
                    vector.iter_mut().for_each(|x| *x /= norm);
                }
                vector
            })
            .collect();

        Ok(vectors)
    }

    fn dbscan(&self, vectors: &[Vec<f64>]) -> Vec<Option<usize>> {
        let neighbours: Vec<Vec<usize>> = (0..vectors.len())
            .into_par_iter()
            .map(|i| {
                (0..vectors.len())
                    .filter(|&j| i == j || cosine_distance(&vectors[i], &vectors[j]) <= self.eps)
                    .collect()
            })
            .collect();
        let is_core: Vec<bool> = neighbours
            .iter()
            .map(|n| n.len() >= self.min_samples)
            .collect();

        let mut labels = vec![None; vectors.len()];
        let mut next_label = 0;

        for start in 0..vectors.len() {
            if labels[start].is_some() || !is_core[start] {
                continue;
            }

            labels[start] = Some(next_label);
            let mut stack = neighbours[start].clone();
            while let Some(point) = stack.pop() {
                if labels[point].is_some() {
                    continue;
                }
                labels[point] = Some(next_label);
                if is_core[point] {
                    stack.extend(&neighbours[point]);
                }
            }
            next_label += 1;
        }

        labels
    }
}

impl Default for TfidfDbscan {
    fn default() -> Self {
        Self {
            max_features: 100,
            min_df: 2,
            eps: 0.6,
            min_samples: 2,
        }
    }
}

impl TextClusterer for TfidfDbscan {
    fn cluster(&self, texts: &[String]) -> Result<Vec<Option<usize>>, ClusterError> {
        if texts.is_empty() {
            return Err(ClusterError::NoTexts);
        }
        let vectors = self.vectorize(texts)?;
        Ok(self.dbscan(&vectors))
    }
}

/// Unigrams and bigrams of a text, stopwords removed.
fn terms(text: &str) -> Vec<String> {
    let unigrams: Vec<String> = words(text)
        .filter(|word| word.chars().count() >= 2 && !is_stopword(word))
        .collect();
    let bigrams: Vec<String> = unigrams
        .iter()
        .tuple_windows()
        .map(|(a, b)| format!("{a} {b}"))
        .collect();

    unigrams.into_iter().chain(bigrams).collect()
}

/// Cosine distance between two L2-normalized vectors.
fn cosine_distance(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    1.0 - dot
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_terms_include_bigrams() {
        assert_eq!(
            terms("The Rust Book rust-lang.org"),
            vec!["rust", "book", "rust", "lang", "org", "rust book", "book rust", "rust lang", "lang org"]
        );
    }

    #[test]
    fn test_vectors_are_normalized() {
        let clusterer = TfidfDbscan::default();
        let vectors = clusterer
            .vectorize(&texts(&["rust async", "rust traits", "cooking pasta"]))
            .unwrap();

        for vector in &vectors[..2] {
            let norm: f64 = vector.iter().map(|x| x * x).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
        assert!(vectors[2].iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_empty_vocabulary_is_error() {
        let clusterer = TfidfDbscan::default();
        let err = clusterer.cluster(&texts(&["alpha", "beta", "gamma"])).unwrap_err();
        assert_eq!(err, ClusterError::EmptyVocabulary { min_df: 2 });
        assert_eq!(clusterer.cluster(&[]).unwrap_err(), ClusterError::NoTexts);
    }

    #[test]
    fn test_dbscan_groups_similar_texts() {
        let clusterer = TfidfDbscan::default();
        let labels = clusterer
            .cluster(&texts(&[
                "sourdough bread recipe",
                "sourdough bread starter",
                "kubernetes cluster upgrade",
                "kubernetes cluster networking",
                "unrelated lonely text",
            ]))
            .unwrap();

        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[2], labels[3]);
        assert!(labels[0].is_some());
        assert!(labels[2].is_some());
        assert_ne!(labels[0], labels[2]);
        assert_eq!(labels[4], None);
    }

    #[test]
    fn test_builder_defaults() {
        let clusterer = TfidfDbscan::builder().eps(0.3).build().unwrap();
        assert_eq!(clusterer.min_samples, 2);
        assert_eq!(clusterer.max_features, 100);
        assert_eq!(clusterer.eps, 0.3);
    }
}
