use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ezquery::{Column, DataFrame, Error, Operator, Query, Table};

fn sample_table() -> DataFrame {
    DataFrame::from_columns([
        ("a", Column::from(vec![1i64, 1, 3, 5])),
        ("b", Column::from(vec![5i64, 1, 2, 5])),
        ("c", Column::from(vec![4.5, 6.2, 0.5, -3.5])),
    ])
    .unwrap()
}

fn names(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_expression_query() {
    let table = sample_table();
    let q = Query::expr("a > 3");

    assert_eq!(q.mask(&table).unwrap(), vec![false, false, false, true]);
    assert_eq!(q.count(&table).unwrap(), 1);
    assert_eq!(q.indices(&table).unwrap(), vec![3]);

    let filtered = q.filter(&table).unwrap();
    assert_eq!(filtered.row_count(), 1);
    assert_eq!(filtered.column("a").unwrap(), Column::from(vec![5i64]));

    let q2 = Query::expr("b > c");
    assert_eq!(q2.mask(&table).unwrap(), vec![true, false, true, true]);

    let combined = !q & q2;
    assert_eq!(combined.count(&table).unwrap(), 2);
}

#[test]
fn test_identity_query() {
    let table = sample_table();
    let q = Query::new();

    assert_eq!(q.count(&table).unwrap(), 4);
    assert_eq!(q.mask(&table).unwrap(), vec![true; 4]);
    assert_eq!(q.indices(&table).unwrap(), vec![0, 1, 2, 3]);
    assert_eq!(q.filter(&table).unwrap(), table);
    assert!(q.is_identity());
}

#[test]
fn test_callable_query() {
    let table = sample_table();
    let q = Query::callable(|table: &DataFrame| {
        let column = table.column("a")?;
        Ok(column.to_f64()?.iter().map(|&v| v > 2.0).collect())
    });

    assert_eq!(q.mask(&table).unwrap(), vec![false, false, true, true]);
    assert_eq!(q.count(&table).unwrap(), 2);
}

#[test]
fn test_column_function_query() {
    let table = sample_table();
    let q = Query::columns(["a", "b"], |cols| {
        let xs = cols[0].to_f64()?;
        let ys = cols[1].to_f64()?;
        Ok(xs.iter().zip(&ys).map(|(x, y)| x == y).collect())
    })
    .unwrap();

    assert_eq!(q.mask(&table).unwrap(), vec![false, true, false, true]);
}

#[test]
fn test_column_function_needs_names() {
    let result = Query::<DataFrame>::columns(Vec::<String>::new(), |_| Ok(Vec::new()));
    match result {
        Err(Error::InvalidPredicate(_)) => (),
        _ => panic!("Expected an InvalidPredicate error"),
    }
}

#[test]
fn test_operator_masks_match_elementwise() {
    let table = sample_table();
    let q1 = Query::expr("a > 1");
    let q2 = Query::expr("b > 1");
    let m1 = q1.mask(&table).unwrap();
    let m2 = q2.mask(&table).unwrap();

    let and_mask = (q1.clone() & q2.clone()).mask(&table).unwrap();
    let or_mask = (q1.clone() | q2.clone()).mask(&table).unwrap();
    let xor_mask = (q1 ^ q2).mask(&table).unwrap();

    for i in 0..4 {
        assert_eq!(and_mask[i], m1[i] && m2[i]);
        assert_eq!(or_mask[i], m1[i] || m2[i]);
        assert_eq!(xor_mask[i], m1[i] ^ m2[i]);
    }
}

#[test]
fn test_chained_operators_stay_flat() {
    let q: Query = Query::expr("a > 1") & Query::expr("b > 1") & Query::expr("c > 0");
    assert_eq!(q.operator(), Some(Operator::And));
    assert_eq!(q.operand_count(), 3);

    let q: Query = Query::expr("a > 1") | Query::expr("b > 1") | Query::expr("c > 0");
    assert_eq!(q.operator(), Some(Operator::Or));
    assert_eq!(q.operand_count(), 3);

    let q: Query = Query::expr("a > 1") ^ Query::expr("b > 1") ^ Query::expr("c > 0");
    assert_eq!(q.operator(), Some(Operator::Xor));
    assert_eq!(q.operand_count(), 3);
}

#[test]
fn test_flat_chain_matches_pairwise_masks() {
    let table = sample_table();
    let q1 = Query::expr("a > 1");
    let q2 = Query::expr("b > 1");
    let q3 = Query::expr("c > 0");

    let chained = (q1.clone() & q2.clone() & q3.clone()).mask(&table).unwrap();
    let m1 = q1.mask(&table).unwrap();
    let m2 = q2.mask(&table).unwrap();
    let m3 = q3.mask(&table).unwrap();

    for i in 0..4 {
        assert_eq!(chained[i], m1[i] && m2[i] && m3[i]);
    }
}

#[test]
fn test_mixed_operators_nest() {
    // A differently-kinded subtree stays one opaque operand
    let q: Query = (Query::expr("a > 1") | Query::expr("b > 1")) & Query::expr("c > 0");
    assert_eq!(q.operator(), Some(Operator::And));
    assert_eq!(q.operand_count(), 2);
}

#[test]
fn test_bare_expression_operands() {
    let table = sample_table();

    // Expression on the right
    let q = Query::expr("a > 3") & "b > c";
    assert_eq!(q.count(&table).unwrap(), 1);

    // Expression on the left
    let q = "b > c" & Query::expr("a > 3");
    assert_eq!(q.count(&table).unwrap(), 1);
}

#[test]
fn test_double_negation() {
    let table = sample_table();
    let q = Query::expr("a > 3");

    let double = !!q.clone();
    assert_eq!(double.mask(&table).unwrap(), q.mask(&table).unwrap());
    // The double negation collapses instead of stacking
    assert_eq!(double.operand_count(), 0);

    let negated = !q.clone();
    assert_eq!(negated.mask(&table).unwrap(), vec![true, true, true, false]);
    assert_eq!(negated.operand_count(), 1);
}

#[test]
fn test_in_place_combination_leaves_clones_untouched() {
    let mut q1: Query = Query::expr("a > 1");
    let snapshot = q1.clone();

    q1 &= Query::expr("b > 1");
    assert_eq!(q1.operator(), Some(Operator::And));
    assert_eq!(q1.operand_count(), 2);

    // The clone made before the in-place combination is unchanged
    assert_eq!(snapshot.operator(), None);
    assert_eq!(snapshot.operand_count(), 0);

    let mut q2: Query = Query::expr("a > 1");
    q2 |= Query::expr("b > 1");
    assert_eq!(q2.operator(), Some(Operator::Or));

    let mut q3: Query = Query::expr("a > 1");
    q3 ^= Query::expr("b > 1");
    assert_eq!(q3.operator(), Some(Operator::Xor));
}

#[test]
fn test_all_builds_one_flat_and() {
    let table = sample_table();

    let q = Query::all(vec![
        Query::expr("a > 1"),
        Query::expr("b > 1"),
        Query::expr("c > 0"),
    ]);
    assert_eq!(q.operator(), Some(Operator::And));
    assert_eq!(q.operand_count(), 3);
    assert_eq!(q.count(&table).unwrap(), 1);

    let single = Query::all(vec![Query::expr("a > 3")]);
    assert_eq!(single.operand_count(), 0);
    assert_eq!(single.count(&table).unwrap(), 1);

    let empty: Query = Query::all(Vec::new());
    assert!(empty.is_identity());
    assert_eq!(empty.count(&table).unwrap(), 4);
}

#[test]
fn test_and_filter_matches_mask_select() {
    let table = sample_table();
    let q = Query::expr("a > 1") & Query::expr("b > 1");

    let narrowed = q.filter(&table).unwrap();
    let masked = table.select(&q.mask(&table).unwrap()).unwrap();
    assert_eq!(narrowed, masked);
}

#[test]
fn test_filter_column() {
    let table = sample_table();
    let q = Query::expr("a > 1");

    let column = q.filter_column(&table, "b").unwrap();
    assert_eq!(column, Column::from(vec![2i64, 5]));

    // The identity query hands the column back whole
    let column = Query::new().filter_column(&table, "b").unwrap();
    assert_eq!(column, Column::from(vec![5i64, 1, 2, 5]));
}

#[test]
fn test_split() {
    let table = sample_table();
    let q = Query::expr("a > 1");

    let (matching, rest) = q.split(&table).unwrap();
    assert_eq!(matching.row_count(), 2);
    assert_eq!(rest.row_count(), 2);
    assert_eq!(matching, q.filter(&table).unwrap());
    assert_eq!(matching.column("a").unwrap(), Column::from(vec![3i64, 5]));
    assert_eq!(rest.column("a").unwrap(), Column::from(vec![1i64, 1]));

    let (hit, miss) = q.split_column(&table, "b").unwrap();
    assert_eq!(hit, Column::from(vec![2i64, 5]));
    assert_eq!(miss, Column::from(vec![5i64, 1]));
}

#[test]
fn test_split_partitions_preserving_order() {
    let mut rng = StdRng::seed_from_u64(42);
    let values: Vec<i64> = (0..100).map(|_| rng.gen_range(0..10)).collect();
    let table = DataFrame::from_columns([("v", Column::from(values.clone()))]).unwrap();

    let q = Query::expr("v < 5");
    let (matching, rest) = q.split(&table).unwrap();
    assert_eq!(matching.row_count() + rest.row_count(), 100);
    assert_eq!(matching, q.filter(&table).unwrap());

    // Walking the mask reconstructs the original row order exactly
    let mask = q.mask(&table).unwrap();
    let left = matching.column("v").unwrap();
    let left = left.as_i64().unwrap();
    let right = rest.column("v").unwrap();
    let right = right.as_i64().unwrap();

    let (mut li, mut ri) = (0, 0);
    for (i, &keep) in mask.iter().enumerate() {
        if keep {
            assert_eq!(left[li], values[i]);
            li += 1;
        } else {
            assert_eq!(right[ri], values[i]);
            ri += 1;
        }
    }
    assert_eq!(li, left.len());
    assert_eq!(ri, right.len());
}

#[test]
fn test_indices_match_mask() {
    let table = sample_table();
    let q = Query::expr("b > c");

    let mask = q.mask(&table).unwrap();
    let expected: Vec<usize> = mask
        .iter()
        .enumerate()
        .filter_map(|(i, &b)| if b { Some(i) } else { None })
        .collect();
    assert_eq!(q.indices(&table).unwrap(), expected);
}

#[test]
fn test_variable_names() {
    let q1: Query = Query::expr("a > 3");
    assert_eq!(q1.variable_names().unwrap(), &names(&["a"]));

    let q2: Query = Query::expr("b > c");
    assert_eq!(q2.variable_names().unwrap(), &names(&["b", "c"]));

    // Combination unions the operands' names
    let combined = q1.clone() & q2.clone();
    assert_eq!(combined.variable_names().unwrap(), &names(&["a", "b", "c"]));
    let combined = q1.clone() | q2.clone();
    assert_eq!(combined.variable_names().unwrap(), &names(&["a", "b", "c"]));

    // Negation keeps the child's names
    let negated = !q2;
    assert_eq!(negated.variable_names().unwrap(), &names(&["b", "c"]));

    // Declared names, de-duplicated
    let q: Query = Query::columns(["x", "y", "x"], |_| Ok(Vec::new())).unwrap();
    assert_eq!(q.variable_names().unwrap(), &names(&["x", "y"]));

    // A whole-table callable cannot report dependencies
    let q: Query = Query::callable(|table: &DataFrame| Ok(vec![true; table.nrows()]));
    assert_eq!(q.variable_names().unwrap(), &BTreeSet::new());

    // The identity query reads nothing
    let q: Query = Query::new();
    assert_eq!(q.variable_names().unwrap(), &BTreeSet::new());
}

#[test]
fn test_expression_errors_surface_at_evaluation() {
    let table = sample_table();

    let q = Query::expr("a >");
    match q.mask(&table) {
        Err(Error::Expression(_)) => (),
        _ => panic!("Expected an Expression error"),
    }

    let q = Query::expr("missing > 1");
    match q.count(&table) {
        Err(Error::ColumnNotFound(_)) => (),
        _ => panic!("Expected a ColumnNotFound error"),
    }
}

#[test]
fn test_wrong_length_mask_is_rejected() {
    let table = sample_table();
    let bad = Query::callable(|_: &DataFrame| Ok(vec![true, false]));

    // A combination folds the short mask against a full-length one
    let combined = bad.clone() & Query::expr("a > 1");
    match combined.mask(&table) {
        Err(Error::LengthMismatch { .. }) => (),
        _ => panic!("Expected a LengthMismatch error"),
    }

    // Selecting with the short mask fails in the column layer
    match bad.filter(&table) {
        Err(Error::LengthMismatch { .. }) => (),
        _ => panic!("Expected a LengthMismatch error"),
    }
}

#[test]
fn test_user_predicate_errors_propagate() {
    let table = sample_table();
    let q = Query::callable(|_: &DataFrame| {
        Err(Error::Evaluation("predicate rejected the table".to_string()))
    });

    match q.mask(&table) {
        Err(Error::Evaluation(_)) => (),
        _ => panic!("Expected an Evaluation error"),
    }
}
