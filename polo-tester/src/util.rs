use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeedError {
    #[error("seed {0:?} is not an unsigned integer")]
    NotANumber(String),
    #[error("no seeds given")]
    Empty,
}

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse a comma-separated seed list. Accepts decimal or `0x` hex.
pub fn parse_seeds(raw: &str) -> Result<Vec<u64>, SeedError> {
    let seeds = split_csv(raw)
        .into_iter()
        .map(|token| {
            let parsed = token.strip_prefix("0x").map_or_else(
                || token.parse::<u64>(),
                |hex| u64::from_str_radix(hex, 16),
            );
            parsed.map_err(|_| SeedError::NotANumber(token))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if seeds.is_empty() {
        return Err(SeedError::Empty);
    }
    Ok(seeds)
}

/// Per-iteration seed derived from the run seed.
pub const fn iteration_seed(seed: u64, iteration: usize) -> u64 {
    seed ^ (iteration as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_filters() {
        let parts = split_csv(" alpha, ,beta,  gamma ");
        assert_eq!(parts, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn seeds_accept_decimal_and_hex() {
        assert_eq!(parse_seeds("1337, 0xff"), Ok(vec![1337, 255]));
        assert_eq!(parse_seeds(" , "), Err(SeedError::Empty));
        assert_eq!(
            parse_seeds("12,abc"),
            Err(SeedError::NotANumber("abc".to_string()))
        );
    }

    #[test]
    fn iteration_seeds_differ() {
        assert_eq!(iteration_seed(7, 0), 7);
        assert_ne!(iteration_seed(7, 1), iteration_seed(7, 2));
    }
}
