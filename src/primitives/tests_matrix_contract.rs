// =========================================================================
// FALSIFY-MX: Matrix primitives contract
//
// Row-major storage invariants: every access path (get, row, row_slice,
// column, as_slice) must agree on element placement, and construction must
// reject length/shape mismatches.
//
// References:
//   - Golub & Van Loan (2013) "Matrix Computations"
// =========================================================================

use super::*;

/// FALSIFY-MX-001: from_vec rejects data whose length != rows * cols
#[test]
fn falsify_mx_001_from_vec_length_contract() {
    let bad = Matrix::from_vec(3, 3, vec![1.0_f32; 8]);
    assert!(
        bad.is_err(),
        "FALSIFIED MX-001: 8 elements accepted for a 3x3 matrix"
    );

    let good = Matrix::from_vec(3, 3, vec![1.0_f32; 9]);
    assert!(
        good.is_ok(),
        "FALSIFIED MX-001: 9 elements rejected for a 3x3 matrix"
    );
}

/// FALSIFY-MX-002: get and row_slice agree on row-major placement
#[test]
fn falsify_mx_002_row_major_layout() {
    let m = Matrix::from_vec(2, 3, vec![1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0]).expect("valid");

    for i in 0..2 {
        let row = m.row_slice(i);
        for j in 0..3 {
            assert!(
                (row[j] - m.get(i, j)).abs() < 1e-6,
                "FALSIFIED MX-002: row_slice({i})[{j}]={} != get({i},{j})={}",
                row[j],
                m.get(i, j)
            );
        }
    }
}

/// FALSIFY-MX-003: column(j) collects element j of every row
#[test]
fn falsify_mx_003_column_extraction() {
    let m = Matrix::from_vec(3, 2, vec![1.0_f32, 10.0, 2.0, 20.0, 3.0, 30.0]).expect("valid");
    let col = m.column(1);

    assert_eq!(col.len(), 3, "FALSIFIED MX-003: column length != n_rows");
    for i in 0..3 {
        assert!(
            (col[i] - m.get(i, 1)).abs() < 1e-6,
            "FALSIFIED MX-003: column(1)[{i}]={} != get({i},1)={}",
            col[i],
            m.get(i, 1)
        );
    }
}

/// FALSIFY-MX-004: set is visible through every access path
#[test]
fn falsify_mx_004_set_visibility() {
    let mut m = Matrix::<f32>::zeros(2, 2);
    m.set(0, 1, 42.0);

    assert!(
        (m.get(0, 1) - 42.0).abs() < 1e-6,
        "FALSIFIED MX-004: get does not see set value"
    );
    assert!(
        (m.row(0)[1] - 42.0).abs() < 1e-6,
        "FALSIFIED MX-004: row does not see set value"
    );
    assert!(
        (m.column(1)[0] - 42.0).abs() < 1e-6,
        "FALSIFIED MX-004: column does not see set value"
    );
}

mod matrix_proptest_falsify {
    use super::*;
    use proptest::prelude::*;

    /// FALSIFY-MX-002-prop: layout agreement for random shapes
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(30))]

        #[test]
        fn falsify_mx_002_prop_row_major_layout(
            rows in 1..=8usize,
            cols in 1..=8usize,
            seed in 0..500u32,
        ) {
            let data: Vec<f32> = (0..rows * cols)
                .map(|i| ((i as f32 + seed as f32) * 0.37).sin() * 10.0)
                .collect();
            let m = Matrix::from_vec(rows, cols, data.clone()).expect("valid");

            prop_assert_eq!(m.as_slice(), &data[..]);
            for i in 0..rows {
                for j in 0..cols {
                    prop_assert!(
                        (m.get(i, j) - data[i * cols + j]).abs() < 1e-6,
                        "FALSIFIED MX-002-prop: get({},{}) disagrees with layout",
                        i, j
                    );
                }
            }
        }
    }
}
