//! End-to-end tests for the public evaluation API.
//!
//! These tests go through `compute` / `get_explanation` / `list_measure_names`
//! exactly as a caller would, covering:
//! 1. Reference scenarios with known values (pytrec_eval and scikit-learn)
//! 2. Registry behavior: aliases, unknown names, cutoff suffixes
//! 3. Zero-fallback results versus genuine errors
//! 4. Determinism under repeated and concurrent calls

use startrec_core::{
    compute, get_explanation, list_measure_names, Cutoff, EvalError, Gain, MeasureParams,
    MeasureResult, QueryEvaluation, RankedList, Summary,
};

fn value(name: &str, relevance: &[u32], scores: &[f64]) -> f64 {
    compute(name, relevance, scores, &MeasureParams::default())
        .unwrap()
        .as_value()
        .unwrap_or_else(|| panic!("{} should produce a scalar", name))
}

// ============================================================================
// Reference Scenarios
// ============================================================================

#[test]
fn test_ndcg_pytrec_eval_cases() {
    let relevance = [0, 1, 0];

    assert!((value("ndcg", &relevance, &[1.0, 0.0, 1.5]) - 0.5).abs() < 1e-9);
    assert!((value("ndcg", &relevance, &[1.0, 2.0, 1.5]) - 1.0).abs() < 1e-9);
    assert!((value("ndcg", &relevance, &[4.0, 2.0, 1.5]) - 0.6309297535714575).abs() < 1e-9);
}

#[test]
fn test_ndcg_sklearn_cases() {
    let relevance = [10, 0, 0, 1, 5];

    let first = value("ndcg", &relevance, &[0.1, 0.2, 0.3, 4.0, 70.0]);
    assert!((first - 0.69).abs() < 0.01, "got {}", first);

    let second = value("ndcg", &relevance, &[0.05, 1.1, 1.0, 0.5, 0.0]);
    assert!((second - 0.49).abs() < 0.01, "got {}", second);
}

#[test]
fn test_average_precision_sklearn_case() {
    let ap = value("map", &[0, 0, 1, 1], &[0.1, 0.4, 0.35, 0.8]);
    assert!((ap - 0.83).abs() < 0.01);
}

#[test]
fn test_every_measure_runs_on_smoke_input() {
    for name in list_measure_names() {
        let result = compute(name, &[0, 1, 0], &[1.0, 0.0, 1.5], &MeasureParams::default());
        assert!(result.is_ok(), "{} failed: {:?}", name, result);
        for v in result.unwrap().values() {
            assert!(v.is_finite(), "{} produced {}", name, v);
        }
    }
}

#[test]
fn test_precision_sweep_matches_pinned_cutoffs() {
    let relevance = [1, 0, 1, 1, 0, 0, 1];
    let scores = [0.9, 0.8, 0.7, 0.6, 0.5, 0.4, 0.3];

    let sweep = compute("P", &relevance, &scores, &MeasureParams::default()).unwrap();
    let pinned = value("P@10", &relevance, &scores);
    assert_eq!(sweep.at(Cutoff::Rank(10)), Some(pinned));
    // 4 relevant, 7 retrieved, denominator stays 10
    assert!((pinned - 0.4).abs() < 1e-9);
}

#[test]
fn test_exponential_gain() {
    // Ranking grades [0, 2]: DCG = 3 / log2(3), IDCG = 3
    let params = MeasureParams::default().with_gain(Gain::Exponential);
    let ndcg = compute("ndcg", &[0, 2], &[1.0, 0.5], &params)
        .unwrap()
        .as_value()
        .unwrap();
    assert!((ndcg - 1.0 / 3f64.log2()).abs() < 1e-9);
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_explanations_exist() {
    for name in list_measure_names() {
        assert!(!get_explanation(name).unwrap().is_empty());
    }
}

#[test]
fn test_unknown_measure_fails_everywhere() {
    assert!(matches!(
        get_explanation("nonexistent_measure"),
        Err(EvalError::UnknownMeasure(_))
    ));
    assert!(matches!(
        compute("nonexistent_measure", &[1], &[1.0], &MeasureParams::default()),
        Err(EvalError::UnknownMeasure(_))
    ));
}

#[test]
fn test_nicknames_match_canonical() {
    let relevance = [0, 1, 1, 0, 1];
    let scores = [0.5, 0.1, 0.9, 0.3, 0.2];

    assert_eq!(value("mrr", &relevance, &scores), value("recip_rank", &relevance, &scores));
    assert_eq!(value("ap", &relevance, &scores), value("map", &relevance, &scores));
    assert_eq!(value("rprec", &relevance, &scores), value("Rprec", &relevance, &scores));
    assert_eq!(value("ndcg@5", &relevance, &scores), value("ndcg_cut_5", &relevance, &scores));
    assert_eq!(
        get_explanation("mrr").unwrap(),
        get_explanation("recip_rank").unwrap()
    );
}

// ============================================================================
// Zero Fallbacks vs Errors
// ============================================================================

#[test]
fn test_all_zero_relevance_falls_back_to_zero() {
    let relevance = [0, 0, 0, 0];
    let scores = [0.3, 0.9, 0.1, 0.5];

    for name in ["map", "recip_rank", "ndcg", "bpref", "Rprec", "set_recall"] {
        assert_eq!(value(name, &relevance, &scores), 0.0, "{}", name);
    }
    let recall = compute("recall", &relevance, &scores, &MeasureParams::default()).unwrap();
    assert!(recall.values().iter().all(|&v| v == 0.0));
}

#[test]
fn test_empty_input_is_not_an_error() {
    for name in list_measure_names() {
        let result = compute(name, &[], &[], &MeasureParams::default()).unwrap();
        if name != "gm_map" {
            assert!(result.values().iter().all(|&v| v == 0.0), "{}", name);
        }
    }
}

#[test]
fn test_length_mismatch_never_truncates() {
    for name in list_measure_names() {
        assert!(matches!(
            compute(name, &[0, 1, 0], &[1.0, 2.0], &MeasureParams::default()),
            Err(EvalError::LengthMismatch {
                relevance: 3,
                scores: 2
            })
        ));
    }
}

#[test]
fn test_invalid_parameters() {
    let relevance = [0, 1, 2];
    let scores = [0.1, 0.2, 0.3];

    let zero_cutoff = MeasureParams::default().with_cutoff(0);
    assert!(matches!(
        compute("P", &relevance, &scores, &zero_cutoff),
        Err(EvalError::InvalidParameter(_))
    ));

    let high_threshold = MeasureParams::default().with_threshold(5);
    assert!(matches!(
        compute("map", &relevance, &scores, &high_threshold),
        Err(EvalError::InvalidParameter(_))
    ));

    assert!(matches!(
        compute("map", &[1, 0], &[f64::NAN, 1.0], &MeasureParams::default()),
        Err(EvalError::InvalidParameter(_))
    ));
}

#[test]
fn test_recall_level_name_selects_one_point() {
    let relevance = [1, 0, 1, 0];
    let scores = [0.9, 0.8, 0.7, 0.6];

    let sweep = compute("iprec_at_recall", &relevance, &scores, &MeasureParams::default()).unwrap();
    let point = value("iprec_at_recall_0.30", &relevance, &scores);
    assert_eq!(sweep.at(Cutoff::RecallTenths(3)), Some(point));
    assert_eq!(value("iprec_at_recall@0.3", &relevance, &scores), point);

    // A rank cutoff limits the depth the level is read from
    let shallow = compute(
        "iprec_at_recall@1.0",
        &relevance,
        &scores,
        &MeasureParams::default().with_cutoff(2),
    )
    .unwrap();
    assert_eq!(shallow.as_value(), Some(0.0));
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_repeated_calls_are_identical() {
    let relevance = [2, 0, 1, 1, 0, 2, 0];
    let scores = [0.5, 0.5, 0.5, 0.1, 0.9, 0.5, 0.2];

    for name in list_measure_names() {
        let first = compute(name, &relevance, &scores, &MeasureParams::default()).unwrap();
        for _ in 0..5 {
            let again = compute(name, &relevance, &scores, &MeasureParams::default()).unwrap();
            assert_eq!(first, again, "{}", name);
        }
    }
}

#[test]
fn test_ties_resolve_by_input_position() {
    // All scores equal: ranking is input order, so the relevant document is third
    let rr = value("recip_rank", &[0, 0, 1], &[1.0, 1.0, 1.0]);
    assert!((rr - 1.0 / 3.0).abs() < 1e-9);

    let rr = value("recip_rank", &[1, 0, 0], &[1.0, 1.0, 1.0]);
    assert!((rr - 1.0).abs() < 1e-9);
}

#[test]
fn test_concurrent_evaluation_matches_sequential() {
    let relevance: Vec<u32> = (0..200).map(|i| (i * 7 % 4) as u32).collect();
    let scores: Vec<f64> = (0..200).map(|i| ((i * 31) % 97) as f64 / 97.0).collect();
    let list = RankedList::align(&relevance, &scores).unwrap();

    let expected: Vec<MeasureResult> = list_measure_names()
        .into_iter()
        .map(|n| compute(n, &relevance, &scores, &MeasureParams::default()).unwrap())
        .collect();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                s.spawn(|| {
                    list_measure_names()
                        .into_iter()
                        .map(|n| {
                            startrec_core::registry::resolve(n)
                                .unwrap()
                                .compute(&list, &MeasureParams::default())
                                .unwrap()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn test_summary_over_queries() {
    let queries: [(&[u32], &[f64]); 3] = [
        (&[0, 1, 0], &[1.0, 0.0, 1.5]),
        (&[0, 1, 0], &[1.0, 2.0, 1.5]),
        (&[0, 0, 1, 1], &[0.1, 0.4, 0.35, 0.8]),
    ];
    let measures = vec![startrec_core::registry::resolve("ndcg").unwrap()];

    let mut summary = Summary::new();
    for (relevance, scores) in queries {
        let list = RankedList::align(relevance, scores).unwrap();
        let eval = QueryEvaluation::evaluate(&measures, &list, &MeasureParams::default()).unwrap();
        summary.add_query(&eval);
    }

    let ndcg = &summary.finish()[0];
    assert_eq!(ndcg.label, "ndcg");
    assert_eq!(ndcg.queries, 3);
    let third = value("ndcg", &[0, 0, 1, 1], &[0.1, 0.4, 0.35, 0.8]);
    assert!((ndcg.value - (0.5 + 1.0 + third) / 3.0).abs() < 1e-9);
}
