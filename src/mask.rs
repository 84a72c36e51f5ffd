// Copyright (c) 2025 ADBC Drivers Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Masking of sensitive values before they are logged.

const MASK: &str = "***";

/// Partially masks a sensitive value for display.
///
/// Values of up to two characters are fully masked, values of up to eight
/// characters keep their first and last character, and longer values keep
/// their first and last four characters.
pub fn mask_sensitive_value(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let len = chars.len();
    let keep = match len {
        0..=2 => return MASK.to_string(),
        3..=8 => 1,
        _ => 4,
    };

    let mut masked = String::with_capacity(keep * 2 + MASK.len());
    masked.extend(&chars[..keep]);
    masked.push_str(MASK);
    masked.extend(&chars[len - keep..]);
    masked
}
