//! Text embedders used for relevance scoring.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Error, Result};

/// Turns text into a fixed-dimension vector.
///
/// Implementations must be deterministic: the same text always yields the
/// same vector.
pub trait Embedder: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    /// Vector dimension.
    fn dimension(&self) -> usize;

    /// Embed one text.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Function words that carry no topical signal.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "have", "in", "is",
    "it", "its", "of", "on", "or", "that", "the", "this", "to", "was", "were", "with",
];

/// Lowercase word tokens without stopwords.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
        .collect()
}

/// Cosine similarity; 0.0 for mismatched lengths or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}

fn normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

// ---------------------------------------------------------------------------
// HashingEmbedder
// ---------------------------------------------------------------------------

/// Asset-free embedder hashing word and character-trigram features.
///
/// Trigrams let morphological variants ("method", "methodology") share
/// features.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
    trigram_weight: f32,
}

impl HashingEmbedder {
    /// Default vector dimension.
    pub const DEFAULT_DIMENSION: usize = 512;

    /// Create a hashing embedder with the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
            trigram_weight: 0.5,
        }
    }

    /// Set the weight of character-trigram features relative to words.
    pub fn with_trigram_weight(mut self, weight: f32) -> Self {
        self.trigram_weight = weight;
        self
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let hash = crc32fast::hash(feature.as_bytes());
        let index = (hash as usize) % self.dimension;
        // High bit picks the sign to keep collisions unbiased
        let sign = if hash & 0x8000_0000 == 0 { 1.0 } else { -1.0 };
        vector[index] += sign * weight;
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIMENSION)
    }
}

impl Embedder for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0; self.dimension];

        for token in tokenize(text) {
            self.add_feature(&mut vector, &format!("w:{}", token), 1.0);

            let padded: Vec<char> = format!("#{}#", token).chars().collect();
            for gram in padded.windows(3) {
                let gram: String = gram.iter().collect();
                self.add_feature(&mut vector, &format!("g:{}", gram), self.trigram_weight);
            }
        }

        normalize(&mut vector);
        Ok(vector)
    }
}

// ---------------------------------------------------------------------------
// WordVectorEmbedder
// ---------------------------------------------------------------------------

/// Averages pretrained word vectors (GloVe / fastText `.vec` text format).
#[derive(Debug, Clone)]
pub struct WordVectorEmbedder {
    name: String,
    dimension: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl WordVectorEmbedder {
    /// Build from an in-memory table. All vectors must share one dimension.
    pub fn from_vectors(name: impl Into<String>, vectors: HashMap<String, Vec<f32>>) -> Result<Self> {
        let dimension = vectors
            .values()
            .next()
            .map(Vec::len)
            .ok_or_else(|| Error::Embedding("empty word vector table".to_string()))?;
        if vectors.values().any(|v| v.len() != dimension) {
            return Err(Error::Embedding("inconsistent vector dimensions".to_string()));
        }
        let vectors = vectors
            .into_iter()
            .map(|(word, vector)| (word.to_lowercase(), vector))
            .collect();
        Ok(Self {
            name: name.into(),
            dimension,
            vectors,
        })
    }

    /// Parse a text vector file: one `word v1 v2 ...` entry per line, with
    /// an optional `count dimension` header line.
    pub fn from_reader<R: BufRead>(name: impl Into<String>, reader: R) -> Result<Self> {
        let mut vectors: HashMap<String, Vec<f32>> = HashMap::new();
        let mut dimension = 0;
        let mut skipped = 0;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else {
                continue;
            };
            let values: std::result::Result<Vec<f32>, _> = parts.map(str::parse::<f32>).collect();
            let Ok(values) = values else {
                skipped += 1;
                continue;
            };

            // fastText header: "<count> <dimension>"
            if line_no == 0 && values.len() == 1 && word.parse::<usize>().is_ok() {
                continue;
            }
            if values.is_empty() {
                skipped += 1;
                continue;
            }
            if dimension == 0 {
                dimension = values.len();
            }
            if values.len() != dimension {
                skipped += 1;
                continue;
            }
            vectors.entry(word.to_lowercase()).or_insert(values);
        }

        if skipped > 0 {
            log::warn!("word vectors: skipped {} malformed lines", skipped);
        }
        log::debug!("word vectors: {} words, dimension {}", vectors.len(), dimension);
        Self::from_vectors(name, vectors)
    }

    /// Load a text vector file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| Error::Embedding(format!("cannot open {}: {}", path.display(), e)))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "word-vectors".to_string());
        Self::from_reader(name, BufReader::new(file))
    }

    /// Number of words in the table.
    pub fn vocabulary_size(&self) -> usize {
        self.vectors.len()
    }
}

impl Embedder for WordVectorEmbedder {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    /// Mean of the known token vectors; all zeros when no token is known.
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut sum = vec![0.0; self.dimension];
        let mut found = 0;
        for token in tokenize(text) {
            if let Some(vector) = self.vectors.get(&token) {
                for (s, v) in sum.iter_mut().zip(vector) {
                    *s += v;
                }
                found += 1;
            }
        }
        if found > 0 {
            for s in sum.iter_mut() {
                *s /= found as f32;
            }
        }
        Ok(sum)
    }
}
