//Copyright 2024 Felix Engl
//
//Licensed under the Apache License, Version 2.0 (the "License");
//you may not use this file except in compliance with the License.
//You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
//Unless required by applicable law or agreed to in writing, software
//distributed under the License is distributed on an "AS IS" BASIS,
//WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//See the License for the specific language governing permissions and
//limitations under the License.

/// Cleans a text for the vectorizer.
///
/// The result contains only the ascii letters of [text] (lower case) and its whitespace,
/// in the original order. Everything else is dropped.
pub fn normalize(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphabetic() {
            result.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod test {
    use crate::normalizer::normalize;

    #[test]
    fn removes_punctuation_and_digits() {
        assert_eq!("hello world ", normalize("Hello, World! 123"));
    }

    #[test]
    fn keeps_whitespace_in_order() {
        assert_eq!("you\tare\nstupid", normalize("You\tARE\nstupid!!!"));
    }

    #[test]
    fn drops_non_ascii_letters() {
        assert_eq!("caf strae", normalize("Café Straße"));
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!("", normalize(""));
        assert_eq!("", normalize("1234?!"));
    }

    #[test]
    fn output_is_normalized_and_idempotent() {
        const SAMPLES: &[&str] = &[
            "Hello, World! 123",
            "ÅΩ oder `katze\u{30b}hier",
            "  multiple   spaces\r\n",
            "@user you're SO dumb :) #lol",
            "",
            "\u{a0}non breaking\u{2003}em space",
        ];
        for sample in SAMPLES {
            let once = normalize(sample);
            assert!(
                once.chars().all(|c| c.is_ascii_lowercase() || c.is_whitespace()),
                "{once:?} contains foreign characters"
            );
            assert_eq!(once, normalize(&once), "normalize is not idempotent for {sample:?}");
        }
    }
}
