//! Loading the example config and driving the selector it describes.

use std::collections::HashMap;
use std::path::PathBuf;

use node_selector::config::load_config;
use node_selector::selector::PickContext;

fn example_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/selector.example.toml")
}

#[test]
fn test_example_config_drives_weighted_selector() {
    let config = load_config(&example_path()).unwrap();
    assert_eq!(config.strategy, "weight");
    assert_eq!(config.nodes.len(), 3);

    let selector = config.builder().unwrap().build();
    let ctx = PickContext::new();
    selector.update(&ctx, config.to_nodes()).unwrap();
    assert_eq!(selector.len(), 6);

    let total = 30_000;
    let mut counts: HashMap<String, usize> = HashMap::new();
    for _ in 0..total {
        let picked = selector.pick_available(&ctx).unwrap();
        *counts.entry(picked.node.address().to_string()).or_insert(0) += 1;
    }

    for (address, share) in [("10.0.0.1:8000", 1), ("10.0.0.2:8000", 2), ("10.0.0.3:8000", 3)] {
        let expected = total * share / 6;
        let got = counts[address];
        assert!(
            got.abs_diff(expected) < expected / 10,
            "{} picked {} times, expected about {}",
            address,
            got,
            expected
        );
    }
}

#[test]
fn test_strategy_override_switches_builder() {
    let mut config = load_config(&example_path()).unwrap();
    config.strategy = "round-robin".to_string();

    let selector = config.builder().unwrap().build();
    let ctx = PickContext::new();
    selector.update(&ctx, config.to_nodes()).unwrap();
    assert_eq!(selector.len(), 3);

    let order: Vec<String> = (0..4)
        .map(|_| selector.pick_available(&ctx).unwrap().node.address().to_string())
        .collect();
    assert_eq!(
        order,
        vec!["10.0.0.1:8000", "10.0.0.2:8000", "10.0.0.3:8000", "10.0.0.1:8000"]
    );
}
