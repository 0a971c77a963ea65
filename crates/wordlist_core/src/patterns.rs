use fancy_regex::Regex;

use crate::filter::FilterError;

/// Special characters accepted by the password patterns, as character-class body text.
macro_rules! special_chars {
    () => {
        r#"`~!@#$%^&*()_+/*\-=.\[\]{}":;'?,<>"#
    };
}

const VOZ_USERNAME: &str = r"https://voz\.vn/u/(.*?)\.";
const ALL_FOUR: &str = concat!(
    r"^(?=.*?[A-Z])(?=.*?[a-z])(?=.*?[0-9])(?=.*?[",
    special_chars!(),
    r"]).{8,16}$"
);
const THREE_CONDITIONS: &str = r"^(?![a-zA-Z]+$)(?![A-Z0-9]+$)(?![A-Z\W_]+$)(?![a-z0-9]+$)(?![a-z\W_]+$)(?![0-9\W_]+$)[a-zA-Z0-9\W_]{6,16}$";
const LETTER_DIGIT_SPECIAL: &str = concat!(
    r"^(?=.*[A-Za-z])(?=.*\d)(?=.*[",
    special_chars!(),
    r"])[A-Za-z\d",
    special_chars!(),
    r"]{6,16}$"
);
const UPPER_LOWER_DIGIT: &str = r"(?![0-9A-Z]+$)(?![0-9a-z]+$)(?![a-zA-Z]+$)[0-9A-Za-z]{8,20}$";
const DIGIT_AND_LETTER: &str = r"^(?![0-9]+$)(?![a-zA-Z]+$)[0-9A-Za-z]{8,16}$";
// No special character may occur three times.
const DEFAULT: &str = concat!(
    r"^(?=.*[A-Z])(?=.*[0-9])(?=.*[a-z])(?!.*([",
    special_chars!(),
    r"]).*\1.*\1)[A-Z0-9a-z",
    special_chars!(),
    r"]{8,16}$"
);

/// Named entries of the pattern registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PatternKind {
    VozUsername,
    /// 8-16 chars with upper, lower, digit and special.
    AllFour,
    /// 6-16 chars covering at least three of the four classes.
    ThreeConditions,
    LetterDigitSpecial,
    UpperLowerDigit,
    DigitAndLetter,
    #[default]
    Default,
}

impl PatternKind {
    pub const ALL: [PatternKind; 7] = [
        PatternKind::VozUsername,
        PatternKind::AllFour,
        PatternKind::ThreeConditions,
        PatternKind::LetterDigitSpecial,
        PatternKind::UpperLowerDigit,
        PatternKind::DigitAndLetter,
        PatternKind::Default,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PatternKind::VozUsername => "voz_username",
            PatternKind::AllFour => "all_four",
            PatternKind::ThreeConditions => "three_conditions",
            PatternKind::LetterDigitSpecial => "letter_digit_special",
            PatternKind::UpperLowerDigit => "upper_lower_digit",
            PatternKind::DigitAndLetter => "digit_and_letter",
            PatternKind::Default => "default",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn source(self) -> &'static str {
        match self {
            PatternKind::VozUsername => VOZ_USERNAME,
            PatternKind::AllFour => ALL_FOUR,
            PatternKind::ThreeConditions => THREE_CONDITIONS,
            PatternKind::LetterDigitSpecial => LETTER_DIGIT_SPECIAL,
            PatternKind::UpperLowerDigit => UPPER_LOWER_DIGIT,
            PatternKind::DigitAndLetter => DIGIT_AND_LETTER,
            PatternKind::Default => DEFAULT,
        }
    }
}

pub fn compile_pattern(pattern: &str) -> Result<Regex, FilterError> {
    Regex::new(pattern).map_err(|err| FilterError::InvalidPattern {
        pattern: pattern.to_string(),
        message: err.to_string(),
    })
}

/// A non-empty custom pattern wins over the registry entry.
pub fn select_pattern(kind: PatternKind, custom: Option<&str>) -> Result<Regex, FilterError> {
    match custom.filter(|pattern| !pattern.is_empty()) {
        Some(pattern) => compile_pattern(pattern),
        None => compile_pattern(kind.source()),
    }
}
