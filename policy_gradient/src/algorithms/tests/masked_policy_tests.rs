//! Tests for the validity of the masked action distribution.

use burn::backend::NdArray;
use burn::tensor::Tensor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::algorithms::action_policy::MaskedPolicyOutput;

type B = NdArray<f32>;

/// Random logits and masks with at least one legal action per row.
fn random_batch(rng: &mut StdRng, batch: usize, scale: f32) -> (Vec<f32>, Vec<f32>) {
    let logits: Vec<f32> = (0..batch * 4).map(|_| rng.gen_range(-scale..scale)).collect();
    let mut mask = Vec::with_capacity(batch * 4);
    for _ in 0..batch {
        let mut row: [f32; 4] = std::array::from_fn(|_| if rng.gen_bool(0.5) { 1.0 } else { 0.0 });
        if row.iter().all(|&m| m == 0.0) {
            row[rng.gen_range(0..4)] = 1.0;
        }
        mask.extend_from_slice(&row);
    }
    (logits, mask)
}

fn probs_of(logits: &[f32], mask: &[f32], batch: usize) -> Vec<f32> {
    let device = Default::default();
    let logits = Tensor::<B, 1>::from_floats(logits, &device).reshape([batch, 4]);
    MaskedPolicyOutput::from_mask_data(logits, mask, &device)
        .probs()
        .into_data()
        .to_vec::<f32>()
        .unwrap()
}

#[test]
fn test_probabilities_sum_to_one_and_respect_mask() {
    let mut rng = StdRng::seed_from_u64(2048);
    for scale in [0.1f32, 5.0, 50.0] {
        let batch = 64;
        let (logits, mask) = random_batch(&mut rng, batch, scale);
        let probs = probs_of(&logits, &mask, batch);

        for (row_p, row_m) in probs.chunks_exact(4).zip(mask.chunks_exact(4)) {
            let sum: f32 = row_p.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5, "row sums to {}", sum);
            for (&p, &m) in row_p.iter().zip(row_m) {
                assert!(p >= 0.0);
                if m == 0.0 {
                    assert_eq!(p, 0.0, "illegal action got probability {}", p);
                }
            }
        }
    }
}

#[test]
fn test_illegal_action_with_huge_logit_stays_zero() {
    let probs = probs_of(&[1e4, 0.0, 0.0, 0.0], &[0.0, 1.0, 1.0, 0.0], 1);
    assert_eq!(probs[0], 0.0);
    assert_eq!(probs[3], 0.0);
    assert!((probs[1] - 0.5).abs() < 1e-6);
    assert!((probs[2] - 0.5).abs() < 1e-6);
}

#[test]
fn test_single_legal_action_is_certain() {
    let probs = probs_of(&[3.0, -2.0, 7.0, 0.5], &[0.0, 0.0, 0.0, 1.0], 1);
    assert_eq!(probs, vec![0.0, 0.0, 0.0, 1.0]);
}

#[test]
fn test_all_legal_matches_plain_softmax() {
    let logits = [0.5f32, -1.0, 2.0, 0.0];
    let probs = probs_of(&logits, &[1.0; 4], 1);

    let z: f32 = logits.iter().map(|l| l.exp()).sum();
    for (p, l) in probs.iter().zip(logits.iter()) {
        assert!((p - l.exp() / z).abs() < 1e-6);
    }
}

#[test]
fn test_sampling_never_selects_illegal_actions() {
    let device = Default::default();
    let mut rng = StdRng::seed_from_u64(7);
    let batch = 32;
    let (logits, mask) = random_batch(&mut rng, batch, 10.0);
    let output = MaskedPolicyOutput::<B>::from_mask_data(
        Tensor::<B, 1>::from_floats(logits.as_slice(), &device).reshape([batch, 4]),
        &mask,
        &device,
    );

    for _ in 0..50 {
        let actions = output.sample(&mut rng).unwrap();
        assert_eq!(actions.len(), batch);
        for (i, &a) in actions.iter().enumerate() {
            assert_eq!(mask[i * 4 + a as usize], 1.0, "row {} sampled illegal {}", i, a);
        }
    }
}
