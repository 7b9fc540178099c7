//! Hermite functions: the one-dimensional building block of both expansions.
//!
//! `h_n(t) = H_n(t) · exp(-t²)`, where `H_n` is the physicists' Hermite
//! polynomial. Equivalently `h_n(t) = (-1)^n dⁿ/dtⁿ exp(-t²)`, which is what
//! makes the far-field and near-field series of the Gaussian kernel work.

/// Highest supported order.
pub const MAX_ORDER: usize = 21;

/// Integer coefficients of `H_n`, one row per order, split by parity.
///
/// For even `n`, entry `k` is the coefficient of `t^(2k)`; for odd `n`, of
/// `t^(2k+1)`. Row `n` has `n/2 + 1` meaningful entries.
pub const HERMITE_COEFFS: [[i64; 11]; MAX_ORDER + 1] = [
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [-2, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [-12, 8, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [12, -48, 16, 0, 0, 0, 0, 0, 0, 0, 0],
    [120, -160, 32, 0, 0, 0, 0, 0, 0, 0, 0],
    [-120, 720, -480, 64, 0, 0, 0, 0, 0, 0, 0],
    [-1680, 3360, -1344, 128, 0, 0, 0, 0, 0, 0, 0],
    [1680, -13440, 13440, -3584, 256, 0, 0, 0, 0, 0, 0],
    [30240, -80640, 48384, -9216, 512, 0, 0, 0, 0, 0, 0],
    [-30240, 302400, -403200, 161280, -23040, 1024, 0, 0, 0, 0, 0],
    [-665280, 2217600, -1774080, 506880, -56320, 2048, 0, 0, 0, 0, 0],
    [665280, -7983360, 13305600, -7096320, 1520640, -135168, 4096, 0, 0, 0, 0],
    [17297280, -69189120, 69189120, -26357760, 4392960, -319488, 8192, 0, 0, 0, 0],
    [
        -17297280, 242161920, -484323840, 322882560, -92252160, 12300288, -745472, 16384, 0, 0, 0,
    ],
    [
        -518918400, 2421619200, -2905943040, 1383782400, -307507200, 33546240, -1720320, 32768, 0,
        0, 0,
    ],
    [
        518918400, -8302694400, 19372953600, -15498362880, 5535129600, -984023040, 89456640,
        -3932160, 65536, 0, 0,
    ],
    [
        17643225600, -94097203200, 131736084480, -75277762560, 20910489600, -3041525760,
        233963520, -8912896, 131072, 0, 0,
    ],
    [
        -17643225600, 317578060800, -846874828800, 790416506880, -338749931520, 75277762560,
        -9124577280, 601620480, -20054016, 262144, 0,
    ],
    [
        -670442572800, 4022655436800, -6436248698880, 4290832465920, -1430277488640,
        260050452480, -26671841280, 1524105216, -44826624, 524288, 0,
    ],
    [
        670442572800, -13408851456000, 40226554368000, -42908324659200, 21454162329600,
        -5721109954560, 866834841600, -76205260800, 3810263040, -99614720, 1048576,
    ],
    [
        28158588057600, -187723920384000, 337903056691200, -257449947955200, 100119424204800,
        -21844238008320, 2800543334400, -213374730240, 9413591040, -220200960, 2097152,
    ],
];

/// `n!` for `n` in `0..20`.
pub const FACTORIAL: [f64; 20] = [
    1.0,
    1.0,
    2.0,
    6.0,
    24.0,
    120.0,
    720.0,
    5040.0,
    40320.0,
    362880.0,
    3628800.0,
    39916800.0,
    479001600.0,
    6227020800.0,
    87178291200.0,
    1307674368000.0,
    20922789888000.0,
    355687428096000.0,
    6402373705728000.0,
    121645100408832000.0,
];

/// Physicists' Hermite polynomial `H_n(t)`.
pub fn polynomial(t: f64, n: usize) -> f64 {
    debug_assert!(n <= MAX_ORDER, "Hermite order {} exceeds {}", n, MAX_ORDER);
    let row = &HERMITE_COEFFS[n];
    let t2 = t * t;
    // Horner in t², highest even/odd term first.
    let h = row[..=n / 2]
        .iter()
        .rev()
        .fold(0.0, |acc, &c| acc * t2 + c as f64);
    if n % 2 == 1 {
        h * t
    } else {
        h
    }
}

/// Hermite function `h_n(t) = H_n(t) · exp(-t²)`.
///
/// Orders above [`MAX_ORDER`] are out of contract.
pub fn function(t: f64, n: usize) -> f64 {
    polynomial(t, n) * (-t * t).exp()
}

/// `h_0(t) .. h_{len-1}(t)`, written into `out`.
pub fn functions_into(t: f64, out: &mut [f64]) {
    let g = (-t * t).exp();
    for (n, slot) in out.iter_mut().enumerate() {
        *slot = polynomial(t, n) * g;
    }
}
