//! Surrogate identifier generation.

use uuid::Uuid;

use crate::interfaces::IdGenerator;

/// Generates random (v4) UUIDs in their hyphenated string form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl UuidGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for UuidGenerator {
    fn new_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
