use approx::assert_abs_diff_eq;
use rand::prelude::*;
use rand::rngs::StdRng;

use mpboost::prelude::*;

use std::path::Path;


/// Three categories, four documents, two features.
/// ```txt
/// doc | features | categories
///  0  |  {0}     |  {0}
///  1  |  {0, 1}  |  {0, 1}
///  2  |  {1}     |  {1}
///  3  |  {}      |  {2}
/// ```
fn small_index() -> InvertedIndex {
    let mut builder = InvertedIndexBuilder::new(3);
    builder.add_document(vec![0], vec![0]).unwrap();
    builder.add_document(vec![0, 1], vec![0, 1]).unwrap();
    builder.add_document(vec![1], vec![1]).unwrap();
    builder.add_document(vec![], vec![2]).unwrap();
    builder.build()
}


/// Same shape as `small_index`, but document 0 skips category 1.
/// ```txt
/// doc | features | categories
///  0  |  {0}     |  {0, 2}
///  1  |  {0, 1}  |  {1}
///  2  |  {1}     |  {0}
///  3  |  {}      |  {2}
/// ```
fn gapped_index() -> InvertedIndex {
    let mut builder = InvertedIndexBuilder::new(3);
    builder.add_document(vec![0], vec![0, 2]).unwrap();
    builder.add_document(vec![0, 1], vec![1]).unwrap();
    builder.add_document(vec![1], vec![0]).unwrap();
    builder.add_document(vec![], vec![2]).unwrap();
    builder.build()
}


fn random_index(seed: u64) -> InvertedIndex {
    random_index_of(seed, 6, 40, 60)
}


fn random_index_of(
    seed: u64,
    n_categories: usize,
    n_features: usize,
    n_documents: usize,
) -> InvertedIndex
{
    let mut rng = StdRng::seed_from_u64(seed);
    let mut builder = InvertedIndexBuilder::new(n_categories)
        .features(n_features);
    for _ in 0..n_documents {
        let features = (0..n_features)
            .filter(|_| rng.gen_bool(0.15))
            .collect::<Vec<_>>();
        let categories = (0..n_categories)
            .filter(|_| rng.gen_bool(0.3))
            .collect::<Vec<_>>();
        builder.add_document(features, categories).unwrap();
    }
    builder.build()
}


/// Writes a random distribution (each category sums to one).
fn random_weights(path: &Path, index: &InvertedIndex, seed: u64)
    -> WeightMatrixStore
{
    let mut rng = StdRng::seed_from_u64(seed);
    let c = index.categories_count();
    let d = index.documents_count();
    let shape = Shape::distribution(c, d).unwrap();
    let mut store = WeightMatrixStore::create(shape, path).unwrap();
    for category in 0..c {
        let row = (0..d).map(|_| rng.gen_range(0.01..1.0)).collect::<Vec<f64>>();
        let sum = row.iter().sum::<f64>();
        for (document, w) in row.into_iter().enumerate() {
            store.set_weight(w / sum, category, document, 0).unwrap();
        }
    }
    store.close().unwrap();
    WeightMatrixStore::open(path, OpenMode::ReadOnly).unwrap()
}


/// Writes arbitrary non-negative weights, without normalization.
fn raw_weights(path: &Path, index: &InvertedIndex, seed: u64)
    -> WeightMatrixStore
{
    let mut rng = StdRng::seed_from_u64(seed);
    let c = index.categories_count();
    let d = index.documents_count();
    let shape = Shape::distribution(c, d).unwrap();
    let mut store = WeightMatrixStore::create(shape, path).unwrap();
    for category in 0..c {
        for document in 0..d {
            store.set_weight(rng.gen_range(0.0..2.0), category, document, 0)
                .unwrap();
        }
    }
    store.close().unwrap();
    WeightMatrixStore::open(path, OpenMode::ReadOnly).unwrap()
}


/// `(Z, score_present, score_absent)` of the stump on `feature`
/// for `category`, computed document by document.
fn direct_stump(
    weights: &WeightMatrixStore,
    index: &InvertedIndex,
    feature: usize,
    category: usize,
) -> (f64, f64, f64)
{
    let n_documents = index.documents_count();
    let epsilon = 1.0 / (index.categories_count() * n_documents) as f64;

    let mut mass = [[0f64; 2]; 2];
    for d in 0..n_documents {
        let label = usize::from(index.has_category(d, category));
        let present = usize::from(index.has_feature(d, feature));
        mass[present][label] += weights.weight(category, d);
    }
    let [[neg_x0, pos_x0], [neg_x1, pos_x1]] = mass;

    let z = 2.0 * ((pos_x0 * neg_x0).sqrt() + (pos_x1 * neg_x1).sqrt());
    let present = 0.5 * ((pos_x1 + epsilon) / (neg_x1 + epsilon)).ln();
    let absent = 0.5 * ((pos_x0 + epsilon) / (neg_x0 + epsilon)).ln();
    (z, present, absent)
}


fn uniform_weights(path: &Path, index: &InvertedIndex) -> WeightMatrixStore {
    ExponentialUpdate::new().initialize(path, index).unwrap();
    WeightMatrixStore::open(path, OpenMode::ReadOnly).unwrap()
}


/// Tests for `FeatureSearch`.
#[cfg(test)]
pub mod feature_search_tests {
    use super::*;

    #[test]
    fn hand_computed_round() {
        let dir = tempfile::tempdir().unwrap();
        let index = small_index();
        let weights = uniform_weights(&dir.path().join("w.bin"), &index);

        let ln7 = 7f64.ln();
        for n_threads in [1, 2, 3] {
            let search = FeatureSearch::new(n_threads).unwrap();
            let splits = search.produce(&index, &weights).unwrap();
            assert_eq!(splits.len(), 3);

            let h0 = splits[0].hypothesis;
            assert_eq!(h0.pivot(), Some(0));
            assert_abs_diff_eq!(splits[0].loss, 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(h0.score_present(), 0.5 * ln7, epsilon = 1e-9);
            assert_abs_diff_eq!(h0.score_absent(), -0.5 * ln7, epsilon = 1e-9);

            let h1 = splits[1].hypothesis;
            assert_eq!(h1.pivot(), Some(1));
            assert_abs_diff_eq!(splits[1].loss, 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(h1.score_present(), 0.5 * ln7, epsilon = 1e-9);
            assert_abs_diff_eq!(h1.score_absent(), -0.5 * ln7, epsilon = 1e-9);

            // Both features reach Z = 0.5; the lower id wins.
            let h2 = splits[2].hypothesis;
            assert_eq!(h2.pivot(), Some(0));
            assert_abs_diff_eq!(splits[2].loss, 0.5, epsilon = 1e-9);
            assert_abs_diff_eq!(h2.score_present(), -0.5 * ln7, epsilon = 1e-9);
            assert_abs_diff_eq!(h2.score_absent(), 0.0, epsilon = 1e-9);
        }
    }


    #[test]
    fn skipped_category_counts_as_negative() {
        let dir = tempfile::tempdir().unwrap();
        let index = gapped_index();
        let weights = uniform_weights(&dir.path().join("w.bin"), &index);

        let ln7 = 7f64.ln();
        for n_threads in [1, 2] {
            let splits = FeatureSearch::new(n_threads).unwrap()
                .produce(&index, &weights)
                .unwrap();

            // Z = 1 for both features; the lower id wins.
            let h0 = splits[0].hypothesis;
            assert_eq!(h0.pivot(), Some(0));
            assert_abs_diff_eq!(splits[0].loss, 1.0, epsilon = 1e-9);
            assert_abs_diff_eq!(h0.score_present(), 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(h0.score_absent(), 0.0, epsilon = 1e-9);

            // Document 0 is a negative of category 1 containing feature 0:
            // W+_1 = W-_1 = 1/4, W+_0 = 0, W-_0 = 1/2.
            let h1 = splits[1].hypothesis;
            assert_eq!(h1.pivot(), Some(0));
            assert_abs_diff_eq!(splits[1].loss, 0.5, epsilon = 1e-9);
            assert_abs_diff_eq!(h1.score_present(), 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(h1.score_absent(), -0.5 * ln7, epsilon = 1e-9);

            let h2 = splits[2].hypothesis;
            assert_eq!(h2.pivot(), Some(1));
            assert_abs_diff_eq!(splits[2].loss, 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(h2.score_present(), -0.5 * ln7, epsilon = 1e-9);
            assert_abs_diff_eq!(h2.score_absent(), 0.5 * ln7, epsilon = 1e-9);
        }
    }


    #[test]
    fn search_agrees_with_direct_computation() {
        let dir = tempfile::tempdir().unwrap();
        for seed in 0..20 {
            let index = random_index_of(seed, 7, 25, 40);
            let path = dir.path().join(format!("w{seed}.bin"));
            let weights = raw_weights(&path, &index, seed + 100);

            let splits = FeatureSearch::new(3).unwrap()
                .produce(&index, &weights)
                .unwrap();

            for (c, split) in splits.iter().enumerate() {
                let stumps = (0..index.features_count())
                    .filter(|&f| !index.documents_for_feature(f).is_empty())
                    .map(|f| (f, direct_stump(&weights, &index, f, c)))
                    .collect::<Vec<_>>();
                let best = stumps.iter()
                    .map(|(_, (z, _, _))| *z)
                    .fold(f64::INFINITY, f64::min);
                assert_abs_diff_eq!(split.loss, best, epsilon = 1e-9);

                let pivot = split.hypothesis.pivot().unwrap();
                let (_, (z, present, absent)) = stumps.iter()
                    .find(|(f, _)| *f == pivot)
                    .copied()
                    .unwrap();
                assert_abs_diff_eq!(z, split.loss, epsilon = 1e-9);
                assert_abs_diff_eq!(
                    split.hypothesis.score_present(), present, epsilon = 1e-9
                );
                assert_abs_diff_eq!(
                    split.hypothesis.score_absent(), absent, epsilon = 1e-9
                );
            }
        }
    }


    #[test]
    fn result_does_not_depend_on_thread_count() {
        let dir = tempfile::tempdir().unwrap();
        let index = random_index(7);
        let weights = random_weights(&dir.path().join("w.bin"), &index, 11);

        let reference = FeatureSearch::new(1).unwrap()
            .produce(&index, &weights)
            .unwrap();
        for n_threads in [2, 4, 7, 64] {
            let splits = FeatureSearch::new(n_threads).unwrap()
                .produce(&index, &weights)
                .unwrap();
            assert_eq!(splits.len(), reference.len());
            for (a, b) in splits.iter().zip(&reference) {
                assert_eq!(a.hypothesis.pivot(), b.hypothesis.pivot());
                assert_abs_diff_eq!(a.loss, b.loss, epsilon = 1e-12);
            }
        }
    }


    #[test]
    fn repeated_search_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let index = random_index(3);
        let weights = random_weights(&dir.path().join("w.bin"), &index, 5);

        let search = FeatureSearch::new(4).unwrap();
        let first = search.produce(&index, &weights).unwrap();
        let second = search.produce(&index, &weights).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            run_round(&weights, &index, 4).unwrap(),
            first.iter().map(|s| s.hypothesis).collect::<Vec<_>>(),
        );
    }


    #[test]
    fn losses_are_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let index = random_index(19);
        let weights = random_weights(&dir.path().join("w.bin"), &index, 23);

        let splits = FeatureSearch::new(3).unwrap()
            .produce(&index, &weights)
            .unwrap();
        // Z <= 2 sqrt(W+ W-) <= 1 when a category has unit mass.
        for split in splits {
            assert!(split.hypothesis.pivot().is_some());
            assert!(split.loss >= 0.0);
            assert!(split.loss <= 1.0 + 1e-9);
        }
    }


    #[test]
    fn totals_split_the_category_mass() {
        let dir = tempfile::tempdir().unwrap();
        let index = random_index(29);
        let weights = random_weights(&dir.path().join("w.bin"), &index, 31);

        let totals = CategoryWeightTotals::compute(&weights, &index).unwrap();
        for c in 0..index.categories_count() {
            let column = (0..index.documents_count())
                .map(|d| weights.weight(c, d))
                .sum::<f64>();
            assert!(totals.positive(c) >= 0.0);
            assert!(totals.negative(c) >= 0.0);
            assert_abs_diff_eq!(
                totals.positive(c) + totals.negative(c),
                column,
                epsilon = 1e-9
            );
        }
    }


    #[test]
    fn featureless_index_gives_sentinels() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = InvertedIndexBuilder::new(2).features(3);
        builder.add_document(vec![], vec![0]).unwrap();
        builder.add_document(vec![], vec![1]).unwrap();
        let index = builder.build();
        let weights = uniform_weights(&dir.path().join("w.bin"), &index);

        let splits = FeatureSearch::new(2).unwrap()
            .produce(&index, &weights)
            .unwrap();
        for split in splits {
            assert_eq!(split.hypothesis, WeakHypothesis::none());
            assert_eq!(split.hypothesis.score_present(), 0.0);
            assert_eq!(split.hypothesis.score_absent(), 0.0);
            assert!(split.loss.is_infinite());
        }
    }


    #[test]
    fn cancelled_search() {
        let dir = tempfile::tempdir().unwrap();
        let index = random_index(37);
        let weights = random_weights(&dir.path().join("w.bin"), &index, 41);

        let token = CancellationToken::new();
        token.cancel();
        let search = FeatureSearch::new(4).unwrap().cancel_on(token);
        assert!(matches!(
            search.produce(&index, &weights),
            Err(BoostError::Cancelled)
        ));
    }


    #[test]
    fn too_small_matrix_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let index = small_index();
        let path = dir.path().join("w.bin");
        let shape = Shape::distribution(2, 4).unwrap();
        let mut store = WeightMatrixStore::create(shape, &path).unwrap();
        store.fill(0.25).unwrap();
        store.close().unwrap();

        let weights = WeightMatrixStore::open(&path, OpenMode::ReadOnly).unwrap();
        assert!(matches!(
            run_round(&weights, &index, 2),
            Err(BoostError::InvalidArgument(_))
        ));
    }


    #[test]
    fn zero_threads_is_rejected() {
        assert!(matches!(
            FeatureSearch::new(0),
            Err(BoostError::InvalidArgument(_))
        ));
    }
}
