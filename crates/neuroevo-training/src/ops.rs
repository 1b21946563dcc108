//! Gene vector operations for the genetic algorithm.
//!
//! This module provides the variation operators the genetic algorithm applies
//! to genomes: initialization, uniform crossover, and Gaussian mutation.
//! Operators never edit their inputs; each returns a freshly built genome, so
//! elites survive a generation bit for bit.
//!
//! # Operations
//!
//! - **Initialization**: [`random_genome`] draws uniform random genes
//! - **Crossover**: [`uniform_crossover`] mixes two parents gene by gene
//! - **Mutation**: [`gaussian_mutation`] perturbs genes with Gaussian noise
//!
//! # Design Decisions
//!
//! ## Uniform Crossover
//!
//! Each child gene comes from either parent with equal probability. Genome
//! positions encode unrelated network weights, so there is no locality for a
//! one-point scheme to exploit; uniform mixing recombines freely without
//! favoring any segment of the genome.
//!
//! ## Unbounded Genes
//!
//! Mutation does not clamp gene values. Network weights have no natural box
//! constraint, and the activations downstream keep policy outputs bounded
//! regardless of weight magnitude.

use neuroevo_policy::Genome;
use rand::Rng;
use rand_distr::Normal;

/// Creates a gene vector by applying a function to each index.
///
/// # Examples
///
/// ```
/// use neuroevo_training::ops;
///
/// let genes = ops::from_fn(|i| i as f32 * 0.5, 4);
/// assert_eq!(genes, vec![0.0, 0.5, 1.0, 1.5]);
/// ```
pub fn from_fn<F>(mut f: F, len: usize) -> Vec<f32>
where
    F: FnMut(usize) -> f32,
{
    let mut values = Vec::with_capacity(len);
    for i in 0..len {
        values.push(f(i));
    }
    values
}

/// Draws a fresh genome with genes uniform in `[-init_range, init_range]`.
pub fn random_genome<R>(rng: &mut R, len: usize, init_range: f32) -> Genome
where
    R: Rng + ?Sized,
{
    from_fn(|_| rng.random_range(-init_range..=init_range), len).into()
}

/// Uniform crossover: each child gene comes from either parent with equal
/// probability.
///
/// # Panics
///
/// Panics if the parents have different lengths.
pub fn uniform_crossover<R>(p1: &Genome, p2: &Genome, rng: &mut R) -> Genome
where
    R: Rng + ?Sized,
{
    assert_eq!(p1.len(), p2.len());
    let g1 = p1.genes();
    let g2 = p2.genes();
    from_fn(|i| if rng.random_bool(0.5) { g1[i] } else { g2[i] }, g1.len()).into()
}

/// Gaussian mutation: each gene is perturbed with probability `rate` by
/// noise drawn from `N(0, sigma²)`. Unmutated genes pass through untouched.
pub fn gaussian_mutation<R>(genome: &Genome, rate: f32, sigma: f32, rng: &mut R) -> Genome
where
    R: Rng + ?Sized,
{
    let normal = Normal::new(0.0, sigma).unwrap();
    let genes = genome.genes();
    from_fn(
        |i| {
            if rng.random_bool(rate.into()) {
                genes[i] + rng.sample(normal)
            } else {
                genes[i]
            }
        },
        genes.len(),
    )
    .into()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_random_genome_respects_init_range() {
        let mut rng = Pcg32::seed_from_u64(1);
        let genome = random_genome(&mut rng, 100, 0.5);
        assert_eq!(genome.len(), 100);
        assert!(genome.genes().iter().all(|g| g.abs() <= 0.5));
    }

    #[test]
    fn test_crossover_picks_genes_from_parents() {
        let mut rng = Pcg32::seed_from_u64(2);
        let p1 = Genome::new(vec![1.0; 50]);
        let p2 = Genome::new(vec![-1.0; 50]);
        let child = uniform_crossover(&p1, &p2, &mut rng);

        assert_eq!(child.len(), 50);
        assert!(child.genes().iter().all(|&g| g == 1.0 || g == -1.0));
        // With 50 genes, both parents contribute with overwhelming probability.
        assert!(child.genes().iter().any(|&g| g == 1.0));
        assert!(child.genes().iter().any(|&g| g == -1.0));
    }

    #[test]
    fn test_operators_are_seed_deterministic() {
        let p1 = Genome::new(vec![0.5; 20]);
        let p2 = Genome::new(vec![-0.5; 20]);

        let mut rng_a = Pcg32::seed_from_u64(7);
        let mut rng_b = Pcg32::seed_from_u64(7);
        assert_eq!(
            uniform_crossover(&p1, &p2, &mut rng_a),
            uniform_crossover(&p1, &p2, &mut rng_b)
        );
        assert_eq!(
            gaussian_mutation(&p1, 0.5, 0.1, &mut rng_a),
            gaussian_mutation(&p1, 0.5, 0.1, &mut rng_b)
        );
    }

    #[test]
    fn test_zero_rate_mutation_is_identity() {
        let mut rng = Pcg32::seed_from_u64(3);
        let genome = Genome::new(vec![0.25; 10]);
        assert_eq!(gaussian_mutation(&genome, 0.0, 1.0, &mut rng), genome);
    }

    #[test]
    fn test_zero_sigma_mutation_is_identity() {
        let mut rng = Pcg32::seed_from_u64(4);
        let genome = Genome::new(vec![0.25; 10]);
        assert_eq!(gaussian_mutation(&genome, 1.0, 0.0, &mut rng), genome);
    }

    #[test]
    fn test_full_rate_mutation_changes_genes() {
        let mut rng = Pcg32::seed_from_u64(5);
        let genome = Genome::new(vec![0.0; 10]);
        let mutated = gaussian_mutation(&genome, 1.0, 1.0, &mut rng);
        assert!(mutated.genes().iter().any(|&g| g != 0.0));
    }
}
