use nanoid::nanoid;

/// Alphabet for model tokens (no ambiguous glyphs).
const MODEL_TOKEN_ALPHABET: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y',
    'Z', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'j', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];
const MODEL_TOKEN_LENGTH: usize = 20;

/// Process-unique identity token, used as the registry key of models without a name.
pub fn generate_model_token() -> String {
    nanoid!(MODEL_TOKEN_LENGTH, MODEL_TOKEN_ALPHABET)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_has_expected_length_and_charset() {
        let token = generate_model_token();
        assert_eq!(token.len(), MODEL_TOKEN_LENGTH);
        assert!(token.chars().all(|c| MODEL_TOKEN_ALPHABET.contains(&c)));
    }

    #[test]
    fn tokens_differ() {
        assert_ne!(generate_model_token(), generate_model_token());
    }
}
