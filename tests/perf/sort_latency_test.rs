use std::time::Instant;

use crate::model::{EntityType, ResultEntry};
use crate::ranking::{sort_results, SortKey};

fn p95_ms(samples: &mut [f64]) -> f64 {
    samples.sort_by(|a, b| a.total_cmp(b));
    let last = samples.len().saturating_sub(1);
    let idx = ((last as f64) * 0.95).round() as usize;
    samples[idx.min(last)]
}

fn catalog() -> Vec<ResultEntry> {
    (0..10_000)
        .map(|i| {
            let entity = EntityType::KNOWN[i % EntityType::KNOWN.len()];
            let relevance = ((i * 7_919) % 1_000) as f64 / 1_000.0;
            ResultEntry::new(&i.to_string(), entity, &format!("Entry {:05}", 10_000 - i), relevance)
                .with_timestamp(1_700_000_000 + (i as i64 * 37) % 86_400)
        })
        .collect()
}

#[test]
fn resort_of_ten_thousand_results_p95_under_50ms() {
    let base = catalog();
    for key in SortKey::ALL {
        let mut warm = base.clone();
        sort_results(&mut warm, key);
    }

    let mut batch_p95 = Vec::with_capacity(5);
    for _ in 0..5 {
        let mut samples = Vec::with_capacity(3 * 10);
        for _ in 0..10 {
            for key in SortKey::ALL {
                let mut results = base.clone();
                let start = Instant::now();
                assert!(sort_results(&mut results, key));
                samples.push(start.elapsed().as_secs_f64() * 1000.0);
            }
        }
        batch_p95.push(p95_ms(&mut samples));
    }

    batch_p95.sort_by(|a, b| a.total_cmp(b));
    let median_p95 = batch_p95[batch_p95.len() / 2];

    assert!(
        median_p95 <= 50.0,
        "median batch p95 too high: {median_p95:.3}ms (budget 50.0ms); batches={batch_p95:?}",
    );
}
