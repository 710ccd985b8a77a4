//! Euclidean k-means over term vectors with k-means++ seeding.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::tokenize::TokenizerConfig;
use super::types::{AnalyticsError, AnalyticsSettings, ClusterAssignment, Document};
use super::vectorize::{TermVector, Vocabulary, vectorize};

const TOP_CENTROID_TERMS: usize = 5;

/// Parameters for one clustering run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KMeansOptions {
    /// Number of clusters.
    pub k: usize,
    /// Upper bound on assignment/update rounds.
    pub max_iterations: usize,
    /// Seed for centroid initialisation; equal seeds give equal partitions.
    pub seed: u64,
}

impl Default for KMeansOptions {
    fn default() -> Self {
        Self {
            k: 2,
            max_iterations: 100,
            seed: 42,
        }
    }
}

impl KMeansOptions {
    /// Options carrying the configured defaults.
    pub fn from_settings(settings: &AnalyticsSettings) -> Self {
        Self {
            k: settings.cluster_count,
            max_iterations: settings.cluster_max_iterations,
            seed: settings.cluster_seed,
        }
    }
}

/// Outcome of [`cluster`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Clustering {
    /// Number of clusters requested.
    pub k: usize,
    /// Cluster label for each input vector, in input order.
    pub assignments: Vec<usize>,
    /// Final centroids, indexed by cluster label.
    pub centroids: Vec<TermVector>,
    /// Rounds executed.
    pub iterations: usize,
    /// Whether assignments stabilised before the iteration cap.
    pub converged: bool,
    /// Sum of squared distances from each vector to its centroid.
    pub inertia: f64,
}

impl Clustering {
    /// Number of members per cluster label.
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.k];
        for &label in &self.assignments {
            sizes[label] += 1;
        }
        sizes
    }
}

/// Partition `vectors` into `options.k` groups.
pub fn cluster(
    vectors: &[TermVector],
    options: &KMeansOptions,
) -> Result<Clustering, AnalyticsError> {
    validate(vectors, options)?;

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut centroids = seed_centroids(vectors, options.k, &mut rng);
    let mut assignments = vec![0; vectors.len()];
    let mut iterations = 0;
    let mut converged = false;

    for round in 0..options.max_iterations {
        iterations = round + 1;
        let mut changed = round == 0;
        for (index, vector) in vectors.iter().enumerate() {
            let (nearest, _) = nearest_centroid(vector.values(), &centroids);
            if assignments[index] != nearest {
                assignments[index] = nearest;
                changed = true;
            }
        }
        if !changed {
            converged = true;
            break;
        }
        update_centroids(vectors, &assignments, &mut centroids);
    }

    let inertia = vectors
        .iter()
        .zip(&assignments)
        .map(|(vector, &label)| squared_distance(vector.values(), &centroids[label]))
        .sum();

    tracing::debug!(
        k = options.k,
        vectors = vectors.len(),
        iterations,
        converged,
        "K-means finished"
    );

    Ok(Clustering {
        k: options.k,
        assignments,
        centroids: centroids.into_iter().map(TermVector::new).collect(),
        iterations,
        converged,
        inertia,
    })
}

fn validate(vectors: &[TermVector], options: &KMeansOptions) -> Result<(), AnalyticsError> {
    if vectors.len() < 2 {
        return Err(AnalyticsError::InvalidInput(format!(
            "clustering needs at least 2 vectors, got {}",
            vectors.len()
        )));
    }
    if options.k == 0 || options.k > vectors.len() {
        return Err(AnalyticsError::InvalidInput(format!(
            "k must be between 1 and {}, got {}",
            vectors.len(),
            options.k
        )));
    }
    if options.max_iterations == 0 {
        return Err(AnalyticsError::InvalidInput(
            "max_iterations must be positive".to_string(),
        ));
    }
    let width = vectors[0].len();
    if vectors.iter().any(|vector| vector.len() != width) {
        return Err(AnalyticsError::InvalidInput(
            "term vectors have different lengths".to_string(),
        ));
    }
    Ok(())
}

/// k-means++: the first centroid is uniform, later ones are drawn with probability
/// proportional to the squared distance to the closest chosen centroid.
fn seed_centroids(vectors: &[TermVector], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut chosen = vec![rng.gen_range(0..vectors.len())];

    while chosen.len() < k {
        let centroids: Vec<Vec<f64>> = chosen
            .iter()
            .map(|&index| vectors[index].values().to_vec())
            .collect();
        let weights: Vec<f64> = vectors
            .iter()
            .map(|vector| nearest_centroid(vector.values(), &centroids).1)
            .collect();
        let total: f64 = weights.iter().sum();

        let next = if total > 0.0 {
            let mut target = rng.gen_range(0.0..total);
            let mut picked = None;
            for (index, weight) in weights.iter().enumerate() {
                if *weight <= 0.0 {
                    continue;
                }
                if target < *weight {
                    picked = Some(index);
                    break;
                }
                target -= weight;
            }
            // Rounding can leave the target past the last positive weight.
            picked.unwrap_or_else(|| {
                weights
                    .iter()
                    .rposition(|weight| *weight > 0.0)
                    .unwrap_or(0)
            })
        } else {
            // Every vector coincides with a centroid: fall back to a uniform unused pick.
            let unused: Vec<usize> = (0..vectors.len())
                .filter(|index| !chosen.contains(index))
                .collect();
            unused[rng.gen_range(0..unused.len())]
        };
        chosen.push(next);
    }

    chosen
        .into_iter()
        .map(|index| vectors[index].values().to_vec())
        .collect()
}

fn update_centroids(vectors: &[TermVector], assignments: &[usize], centroids: &mut [Vec<f64>]) {
    let width = vectors[0].len();
    let mut sums = vec![vec![0.0; width]; centroids.len()];
    let mut counts = vec![0usize; centroids.len()];

    for (vector, &label) in vectors.iter().zip(assignments) {
        counts[label] += 1;
        for (sum, value) in sums[label].iter_mut().zip(vector.values()) {
            *sum += value;
        }
    }

    for ((centroid, sum), count) in centroids.iter_mut().zip(sums).zip(counts) {
        // An empty cluster keeps its previous centroid.
        if count > 0 {
            *centroid = sum.into_iter().map(|value| value / count as f64).collect();
        }
    }
}

/// Index and squared distance of the closest centroid; ties go to the lower index.
fn nearest_centroid(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (index, centroid) in centroids.iter().enumerate() {
        let distance = squared_distance(point, centroid);
        if distance < best.1 {
            best = (index, distance);
        }
    }
    best
}

fn squared_distance(left: &[f64], right: &[f64]) -> f64 {
    left.iter()
        .zip(right)
        .map(|(a, b)| (a - b).powi(2))
        .sum()
}

/// Members and dominant terms of one cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    /// Cluster label.
    pub cluster_id: usize,
    /// Identifiers of the member documents, in input order.
    pub document_ids: Vec<String>,
    /// Highest-weighted centroid terms.
    pub top_terms: Vec<String>,
}

/// Document-level clustering result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentClustering {
    /// Number of clusters.
    pub k: usize,
    /// One assignment per input document, in input order.
    pub assignments: Vec<ClusterAssignment>,
    /// Every cluster label in `[0, k)`, including empty ones.
    pub clusters: Vec<ClusterSummary>,
    /// Size of the batch vocabulary.
    pub vocabulary_size: usize,
    /// Rounds executed.
    pub iterations: usize,
    /// Whether assignments stabilised before the iteration cap.
    pub converged: bool,
}

/// Vectorize a batch, cluster it and map labels back onto document identifiers.
pub fn cluster_documents(
    batch: &[Document],
    config: &TokenizerConfig,
    options: &KMeansOptions,
) -> Result<DocumentClustering, AnalyticsError> {
    if batch.is_empty() {
        return Err(AnalyticsError::EmptyInput);
    }
    let (vocabulary, vectors) = vectorize(batch, config)?;
    let clustering = cluster(&vectors, options)?;

    let assignments = batch
        .iter()
        .zip(&clustering.assignments)
        .map(|(document, &cluster_id)| ClusterAssignment {
            document_id: document.id.clone(),
            cluster_id,
        })
        .collect::<Vec<_>>();

    let clusters = (0..clustering.k)
        .map(|cluster_id| ClusterSummary {
            cluster_id,
            document_ids: assignments
                .iter()
                .filter(|assignment| assignment.cluster_id == cluster_id)
                .map(|assignment| assignment.document_id.clone())
                .collect(),
            top_terms: top_terms(&vocabulary, &clustering.centroids[cluster_id]),
        })
        .collect();

    Ok(DocumentClustering {
        k: clustering.k,
        assignments,
        clusters,
        vocabulary_size: vocabulary.len(),
        iterations: clustering.iterations,
        converged: clustering.converged,
    })
}

fn top_terms(vocabulary: &Vocabulary, centroid: &TermVector) -> Vec<String> {
    let mut weighted: Vec<(usize, f64)> = centroid
        .values()
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, weight)| *weight > 0.0)
        .collect();
    weighted.sort_by(|left, right| right.1.total_cmp(&left.1));
    weighted
        .into_iter()
        .take(TOP_CENTROID_TERMS)
        .map(|(index, _)| vocabulary.terms()[index].clone())
        .collect()
}
