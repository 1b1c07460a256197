use crate::error::Error;
use crate::Generator;
use blink_core::ShortCode;
use rand::Rng;
use typed_builder::TypedBuilder;

/// Base62 without the look-alike characters `0 O 1 l I`.
pub const UNAMBIGUOUS_ALPHABET: &[u8] =
    b"23456789abcdefghijkmnopqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ";

pub const DEFAULT_CODE_LENGTH: usize = 6;

#[derive(Debug, Clone, TypedBuilder)]
pub struct RandomSettings {
    #[builder(default = DEFAULT_CODE_LENGTH)]
    length: usize,
    #[builder(default = UNAMBIGUOUS_ALPHABET)]
    alphabet: &'static [u8],
}

/// Draws each character uniformly from an alphabet using the thread-local RNG.
#[derive(Debug, Clone)]
pub struct RandomGenerator {
    settings: RandomSettings,
}

impl RandomGenerator {
    /// Fails when the settings could only produce empty codes or no codes at all.
    pub fn new(settings: RandomSettings) -> Result<Self, Error> {
        if settings.length == 0 {
            return Err(Error::ZeroLength);
        }
        if settings.alphabet.is_empty() {
            return Err(Error::EmptyAlphabet);
        }

        Ok(Self { settings })
    }

    /// Generator with the default alphabet and the given code length.
    pub fn with_length(length: usize) -> Result<Self, Error> {
        Self::new(RandomSettings::builder().length(length).build())
    }

    pub fn length(&self) -> usize {
        self.settings.length
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self {
            settings: RandomSettings::builder().build(),
        }
    }
}

impl Generator for RandomGenerator {
    fn generate(&self) -> ShortCode {
        let alphabet = self.settings.alphabet;
        let mut rng = rand::rng();
        let code: String = (0..self.settings.length)
            .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
            .collect();
        ShortCode::generated(code)
    }
}
