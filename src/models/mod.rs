pub mod evaluation;
pub mod proposal;
pub mod user;
pub mod workflow;

use rand::Rng;

/// Generate an opaque 24-character hex id (96 random bits).
pub fn new_id() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 12] = rng.random();
    hex::encode(bytes)
}
