//! Note identifier codec.

use rand::Rng;

/// Alphabet for generated ids. Ambiguous characters (I, O, 0, 1) are excluded
/// so ids survive being read aloud or retyped.
const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of generated ids. Client-supplied ids may be any non-zero length.
const GENERATED_LENGTH: usize = 5;

/// Checks whether a note id is valid: non-empty, ASCII alphanumeric only.
///
/// This is the gate that keeps ids safe to use as file names and object keys;
/// it must hold for every id before it reaches the storage layer.
pub fn validate(note_id: &str) -> bool {
    !note_id.is_empty() && note_id.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Generates a random 5-character note id.
///
/// No collision check is performed against existing storage; at 32^5
/// combinations a collision silently overwrites, which is accepted for an
/// ephemeral note service.
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    (0..GENERATED_LENGTH)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}
