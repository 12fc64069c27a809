//! Utilities related to the parsing of arguments.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

//================//
// Value parsers  //
//================//

/// Utility method to parse a fraction passed in on the command line and
/// ensure it is within the range [0.0, 1.0].
pub fn fraction_in_range(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("{} isn't a float", raw))?;

    match (0.0..=1.0).contains(&value) {
        true => Ok(value),
        false => Err(String::from("Value must be between 0.0 and 1.0")),
    }
}

/// Utility method to parse a count passed in on the command line and ensure it
/// is strictly positive.
pub fn positive_usize(raw: &str) -> Result<usize, String> {
    let value: usize = raw
        .parse()
        .map_err(|_| format!("{} isn't a non-negative integer", raw))?;

    match value > 0 {
        true => Ok(value),
        false => Err(String::from("Value must be greater than zero")),
    }
}

//==========//
// Seeding  //
//==========//

/// Builds the random number generator used by the randomized subcommands. A
/// seed makes runs reproducible.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => {
            debug!("Seeding random number generator with {}.", s);
            StdRng::seed_from_u64(s)
        }
        None => StdRng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    #[test]
    fn test_fraction_in_range() {
        assert_eq!(fraction_in_range("0.5"), Ok(0.5));
        assert!(fraction_in_range("1.5").is_err());
        assert!(fraction_in_range("abc").is_err());
    }

    #[test]
    fn test_positive_usize() {
        assert_eq!(positive_usize("10"), Ok(10));
        assert!(positive_usize("0").is_err());
        assert!(positive_usize("-1").is_err());
    }

    #[test]
    fn test_seeded_rngs_agree() {
        let a: u64 = rng_from_seed(Some(42)).gen();
        let b: u64 = rng_from_seed(Some(42)).gen();
        assert_eq!(a, b);
    }
}
