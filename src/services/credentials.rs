// SPDX-License-Identifier: MIT
// Copyright 2026 HIE Portal Contributors

//! Temporary credential generation.
//!
//! Generated credentials are handed to the overseer exactly once and never
//! persisted here; the identity service hashes them on account creation.

use rand::seq::index::sample;
use rand::Rng;

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()_+~`|}{[]:;?><,./-=";

pub const DEFAULT_PASSWORD_LENGTH: usize = 12;

/// Generate a random temporary password containing at least one lowercase
/// letter, one uppercase letter, one digit, and one symbol.
///
/// The string is sampled uniformly from the full alphabet, then any missing
/// character class is patched in at a distinct random position. The patch
/// slightly biases those positions toward their class, which is accepted in
/// exchange for a hard composition guarantee. Lengths below 4 are raised to
/// 4 so every class has a slot.
pub fn generate_temporary_password(length: usize) -> String {
    let length = length.max(4);
    let mut rng = rand::rng();

    let alphabet: Vec<u8> = [LOWERCASE, UPPERCASE, DIGITS, SYMBOLS].concat();
    let mut password: Vec<u8> = (0..length)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())])
        .collect();

    let classes: [&[u8]; 4] = [LOWERCASE, UPPERCASE, DIGITS, SYMBOLS];
    let missing: Vec<&[u8]> = classes
        .into_iter()
        .filter(|class| !password.iter().any(|c| class.contains(c)))
        .collect();

    if !missing.is_empty() {
        // Distinct positions, so one patch cannot clobber another.
        let positions = sample(&mut rng, length, missing.len());
        for (class, position) in missing.iter().zip(positions.iter()) {
            password[position] = class[rng.random_range(0..class.len())];
        }
    }

    password.into_iter().map(char::from).collect()
}
