/// Asserts that two floats agree to within `1e-12` (or a given tolerance).
#[macro_export]
macro_rules! assert_close {
    ($left:expr, $right:expr) => {
        $crate::assert_close!($left, $right, 1e-12)
    };
    ($left:expr, $right:expr, $tol:expr) => {{
        let (l, r): (f64, f64) = ($left, $right);
        assert!((l - r).abs() <= $tol, "{} is not within {} of {}", l, $tol, r);
    }};
}

/// Asserts the verdict's worst trigger ratio, name and tally.
#[macro_export]
macro_rules! assert_worst {
    ($result:expr, $ratio:expr, $name:expr, $tally:expr) => {{
        let worst = $result.worst.as_ref().expect("expected an unsatisfied trigger");
        $crate::assert_close!(worst.ratio, $ratio, 1e-9);
        assert_eq!(worst.name, $name, "worst trigger name");
        assert_eq!(worst.source.tally(), $tally, "worst trigger tally");
    }};
}
