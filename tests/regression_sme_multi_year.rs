//! A regression test for the "sme_multi_year" example
use regression::run_regression_test;

#[test]
fn test_regression_sme_multi_year() {
    run_regression_test("sme_multi_year");
}
