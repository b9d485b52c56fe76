//! A regression test for the "large_capped" example
use regression::run_regression_test;

#[test]
fn test_regression_large_capped() {
    run_regression_test("large_capped");
}
