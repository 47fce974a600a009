use rand::{rngs::StdRng, Rng, SeedableRng};
use strata_nn::{DataPoint, DataSet};

const POINTS: usize = 10_000;
const TOLERANCE: f64 = 0.03;

#[test]
fn assignment_preserves_ratios_approximately() {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut data = DataSet::regression(3, 1);
    for _ in 0..POINTS {
        let input: Vec<f64> = (0..3).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let target = vec![input.iter().sum::<f64>()];
        data.add_data_point(DataPoint::regression(input, target)).unwrap();
    }

    data.assign_data_points(0.7, 0.2, 0.1, &mut rng).unwrap();

    let sizes = [data.training().len(), data.validation().len(), data.test().len()];
    assert_eq!(sizes.iter().sum::<usize>(), POINTS);
    assert_eq!(data.unassigned_len(), 0);
    for (size, ratio) in sizes.iter().zip([0.7, 0.2, 0.1]) {
        let share = *size as f64 / POINTS as f64;
        assert!((share - ratio).abs() < TOLERANCE, "share {share} vs ratio {ratio}");
    }
}

#[test]
fn classification_targets_are_one_hot() {
    let mut data = DataSet::classification(2, 3);
    data.add_classification_point(vec![0.1, 0.2], 2).unwrap();
    data.add_classification_point(vec![0.3, 0.4], 0).unwrap();
    data.one_hot_all().unwrap();
    data.assign_data_points(1.0, 0.0, 0.0, &mut StdRng::seed_from_u64(1)).unwrap();

    for point in data.training() {
        let target = point.target().unwrap();
        assert_eq!(target.len(), 3);
        let category = point.category.unwrap();
        for (i, &t) in target.iter().enumerate() {
            assert_eq!(t, if i == category { 1.0 } else { 0.0 });
        }
    }
}
