//! Sampling and Capability Tests

use crate::*;
use tensorbridge::{backends, sample, SampleOptions, Sampler, Tensor, TensorInit};

fn logits(values: &[f64]) -> Tensor {
    Tensor::new(TensorInit::values(values.to_vec())).unwrap()
}

#[test]
fn test_argmax_sampling() {
    let t = logits(&[-3.0, 0.5, 7.25, 7.0, 1.0]);
    assert_eq!(sample(&t, &SampleOptions::new().temperature(0.0)).unwrap(), 2);
}

#[test]
fn test_sample_model_output() {
    let (module, _) = loaded_module();
    let outputs = module
        .forward(vec![float_tensor(&[0.1, 0.2, 9.0, 0.3], vec![2, 2]), HostValue::Int(0)])
        .unwrap();
    let row = Tensor::try_from(&outputs[0]).unwrap();
    // [2, 2] is not a logits shape
    assert!(sample(&row, &SampleOptions::new()).is_err());

    let flat = Tensor::new(TensorInit::values(row.view().to_f64_vec())).unwrap();
    assert_eq!(sample(&flat, &SampleOptions::new().temperature(0.0)).unwrap(), 2);
}

#[test]
fn test_seeded_sampler_stays_in_range() {
    let t = logits(&[0.0, 0.0, 0.0]);
    let mut sampler = Sampler::new(&SampleOptions::new().top_p(0.9).seed(11)).unwrap();
    for _ in 0..50 {
        assert!(sampler.sample(t.view()).unwrap() < 3);
    }
}

#[test]
fn test_uniform_logits_hit_every_index() {
    let t = logits(&[1.0, 1.0, 1.0]);
    let mut sampler = Sampler::new(&SampleOptions::new().seed(3)).unwrap();
    let mut seen = [false; 3];
    for _ in 0..300 {
        seen[sampler.sample(t.view()).unwrap()] = true;
    }
    assert_eq!(seen, [true; 3]);
}

#[test]
fn test_backends_report_cpu() {
    let caps = backends();
    assert!(caps.cpu);
    let json = serde_json::to_value(caps).unwrap();
    assert_eq!(json["cpu"], serde_json::json!(true));
}

#[test]
fn test_narrow_nucleus_on_flat_logits() {
    let t = logits(&[1.0, 1.0]);
    let mut sampler = Sampler::new(&SampleOptions::new().top_p(0.1).seed(2)).unwrap();
    for _ in 0..20 {
        assert!(sampler.sample(t.view()).unwrap() < 2);
    }
}
