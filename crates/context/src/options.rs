//! Typed option map (spec §4.1, §3 "Execution context" row).
//!
//! The closed option set is `{RandomFixedSeed, Deterministic}`.
//! `option_parse` accepts the letter grammar `d,u,f,r` described in the
//! spec: `d` forces `Deterministic` (and, per spec, also forces
//! `RandomFixedSeed`), `u` clears `Deterministic`, `f` sets
//! `RandomFixedSeed`, `r` clears it.

use crate::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OptionMap {
    pub random_fixed_seed: bool,
    pub deterministic: bool,
}

impl OptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_deterministic(&mut self, on: bool) {
        self.deterministic = on;
        if on {
            self.random_fixed_seed = true;
        }
    }
}

/// Parses a whitespace-and-comma separated letter sequence into an
/// [`OptionMap`], per spec §4.1.
pub fn option_parse(text: &str) -> Result<OptionMap, Error> {
    let mut options = OptionMap::new();
    for token in text.split([',', ' ', '\t']).filter(|t| !t.is_empty()) {
        match token {
            "d" => options.set_deterministic(true),
            "u" => options.deterministic = false,
            "f" => options.random_fixed_seed = true,
            "r" => options.random_fixed_seed = false,
            other => {
                return Err(Error::InvalidArgument(format!(
                    "unknown context option letter {other:?}"
                )))
            }
        }
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_implies_fixed_seed() {
        let options = option_parse("d").unwrap();
        assert!(options.deterministic);
        assert!(options.random_fixed_seed);
    }

    #[test]
    fn letters_combine_left_to_right() {
        let options = option_parse("f,d,r").unwrap();
        assert!(options.deterministic);
        assert!(!options.random_fixed_seed);
    }

    #[test]
    fn unknown_letter_is_rejected() {
        assert!(option_parse("z").is_err());
    }
}
