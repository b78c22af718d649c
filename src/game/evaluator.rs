// src/game/evaluator.rs

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Fixed word length for the daily challenge game.
pub const WORD_LENGTH: usize = 5;

/// Per-letter classification of a guess against the target word.
/// Serialized with the classic tile color names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LetterColor {
    /// Right letter, right position.
    Green,
    /// Letter occurs elsewhere in the target (unconsumed occurrence).
    Yellow,
    /// Letter does not occur, or all its occurrences are already consumed.
    Gray,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterResult {
    pub letter: char,
    pub color: LetterColor,
    pub position: usize,
}

/// Result of evaluating one guess: the colored letters in guess order,
/// plus whether the guess equals the target outright.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessResult {
    pub positions: Vec<LetterResult>,
    pub is_correct: bool,
}

/// Scores a guessed word against the target word. Pure: same inputs, same
/// output. Both words must already be normalized (uppercase) and of equal
/// length.
///
/// Two-pass multiset matching: exact positions claim their target letter
/// first, then each remaining guess letter claims the first unconsumed
/// occurrence of itself in the target. A target letter is never counted
/// twice, which is what makes repeated letters come out right.
pub fn evaluate(guessed: &str, target: &str) -> Result<GuessResult, AppError> {
    let guess: Vec<char> = guessed.chars().collect();
    let goal: Vec<char> = target.chars().collect();

    if guess.len() != goal.len() {
        return Err(AppError::Validation(format!(
            "Word must be {} letters long",
            goal.len()
        )));
    }

    let mut colors: Vec<Option<LetterColor>> = vec![None; guess.len()];
    let mut consumed = vec![false; goal.len()];

    // Pass 1: exact position matches.
    for i in 0..guess.len() {
        if guess[i] == goal[i] {
            colors[i] = Some(LetterColor::Green);
            consumed[i] = true;
        }
    }

    // Pass 2: present but misplaced, consuming left-to-right.
    for i in 0..guess.len() {
        if colors[i].is_some() {
            continue;
        }
        for j in 0..goal.len() {
            if !consumed[j] && guess[i] == goal[j] {
                colors[i] = Some(LetterColor::Yellow);
                consumed[j] = true;
                break;
            }
        }
    }

    // Pass 3: everything left is absent.
    let positions = guess
        .iter()
        .enumerate()
        .map(|(i, &letter)| LetterResult {
            letter,
            color: colors[i].unwrap_or(LetterColor::Gray),
            position: i,
        })
        .collect();

    Ok(GuessResult {
        positions,
        is_correct: guess == goal,
    })
}

/// Uppercases a raw guess and rejects anything that is not exactly
/// `expected_len` letters.
pub fn normalize_word(raw: &str, expected_len: usize) -> Result<String, AppError> {
    let word = raw.trim().to_uppercase();
    if word.chars().count() != expected_len {
        return Err(AppError::Validation(format!(
            "Word must be {} letters long",
            expected_len
        )));
    }
    if !word.chars().all(char::is_alphabetic) {
        return Err(AppError::Validation(
            "Word must contain letters only".to_string(),
        ));
    }
    Ok(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors(result: &GuessResult) -> Vec<LetterColor> {
        result.positions.iter().map(|p| p.color).collect()
    }

    #[test]
    fn all_green_on_exact_match() {
        let result = evaluate("ABOUT", "ABOUT").unwrap();
        assert!(result.is_correct);
        assert_eq!(colors(&result), vec![LetterColor::Green; 5]);
    }

    #[test]
    fn mixed_greens_and_grays() {
        // A and O sit in the right spots, the rest are absent.
        let result = evaluate("AGONY", "ABOUT").unwrap();
        assert!(!result.is_correct);
        assert_eq!(
            colors(&result),
            vec![
                LetterColor::Green,
                LetterColor::Gray,
                LetterColor::Green,
                LetterColor::Gray,
                LetterColor::Gray,
            ]
        );
    }

    #[test]
    fn misplaced_letters_are_yellow() {
        let result = evaluate("ABOTU", "ABOUT").unwrap();
        assert!(!result.is_correct);
        assert_eq!(
            colors(&result),
            vec![
                LetterColor::Green,
                LetterColor::Green,
                LetterColor::Green,
                LetterColor::Yellow,
                LetterColor::Yellow,
            ]
        );
    }

    #[test]
    fn repeated_guess_letters_consume_target_once() {
        // Target BOBAR has two Bs: first guess B is green (consumes pos 0),
        // second guess B claims the B at pos 2, the Qs are absent.
        let result = evaluate("BBQQQ", "BOBAR").unwrap();
        assert_eq!(
            colors(&result),
            vec![
                LetterColor::Green,
                LetterColor::Yellow,
                LetterColor::Gray,
                LetterColor::Gray,
                LetterColor::Gray,
            ]
        );
    }

    #[test]
    fn exhausted_target_letters_go_gray() {
        // Target ABCDE: A green then second A has nothing left to claim;
        // first B claims index 1, second B is out of luck; C is misplaced.
        let result = evaluate("AABBC", "ABCDE").unwrap();
        assert_eq!(
            colors(&result),
            vec![
                LetterColor::Green,
                LetterColor::Gray,
                LetterColor::Yellow,
                LetterColor::Gray,
                LetterColor::Yellow,
            ]
        );
    }

    #[test]
    fn green_takes_priority_over_earlier_yellow_claim() {
        // The E at pos 4 matches exactly and must not be consumed by the
        // E at pos 0 during the yellow pass.
        let result = evaluate("EXXXE", "YZZZE").unwrap();
        assert_eq!(
            colors(&result),
            vec![
                LetterColor::Gray,
                LetterColor::Gray,
                LetterColor::Gray,
                LetterColor::Gray,
                LetterColor::Green,
            ]
        );
    }

    #[test]
    fn length_mismatch_is_rejected() {
        assert!(evaluate("ABOUT", "GO").is_err());
    }

    #[test]
    fn evaluation_is_pure() {
        let a = evaluate("RIVAL", "RIVER").unwrap();
        let b = evaluate("RIVAL", "RIVER").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn normalize_uppercases_and_checks_length() {
        assert_eq!(normalize_word("river", 5).unwrap(), "RIVER");
        assert_eq!(normalize_word("  table ", 5).unwrap(), "TABLE");
        assert!(normalize_word("word", 5).is_err());
        assert!(normalize_word("w0rdy", 5).is_err());
    }
}
