//! Version-4 UUID strings with a degraded fallback path.

use log::warn;
use once_cell::sync::Lazy;
use rand::rngs::{OsRng, SmallRng};
use rand::{Rng, RngCore, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Builder;

static FALLBACK_RNG: Lazy<Mutex<SmallRng>> =
    Lazy::new(|| Mutex::new(SmallRng::seed_from_u64(clock_seed())));
static FALLBACK_WARNED: AtomicBool = AtomicBool::new(false);

/// Source of cryptographically secure UUIDs.
///
/// Returns `None` when the host has no secure entropy available.
pub trait SecureRandomSource {
    fn secure_uuid(&self) -> Option<String>;
}

/// Secure source backed by the operating system generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsSecureSource;

impl SecureRandomSource for OsSecureSource {
    fn secure_uuid(&self) -> Option<String> {
        let mut bytes = [0u8; 16];
        OsRng.try_fill_bytes(&mut bytes).ok()?;
        Some(
            Builder::from_random_bytes(bytes)
                .into_uuid()
                .hyphenated()
                .to_string(),
        )
    }
}

/// Declares the secure source unavailable, forcing the fallback path.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSecureSource;

impl SecureRandomSource for NoSecureSource {
    fn secure_uuid(&self) -> Option<String> {
        None
    }
}

/// Generates note ids.
pub struct UuidGenerator {
    secure: Box<dyn SecureRandomSource>,
}

impl Default for UuidGenerator {
    fn default() -> Self {
        Self::with_source(OsSecureSource)
    }
}

impl UuidGenerator {
    pub fn with_source(secure: impl SecureRandomSource + 'static) -> Self {
        Self {
            secure: Box::new(secure),
        }
    }

    /// Returns a new id, from the secure source when it is available.
    pub fn generate(&self) -> String {
        if let Some(id) = self.secure.secure_uuid() {
            return id;
        }

        if !FALLBACK_WARNED.swap(true, Ordering::Relaxed) {
            warn!("event=uuid_fallback module=idgen status=degraded reason=secure_source_unavailable");
        }
        insecure_uuid()
    }
}

/// Builds a `xxxxxxxx-xxxx-4xxx-yxxx-xxxxxxxxxxxx` id from a pseudo-random
/// generator.
///
/// NOT cryptographically secure: the generator is seeded from the wall clock.
/// Only use this where ids must be unique but need not be unguessable.
pub fn insecure_uuid() -> String {
    let mut rng = FALLBACK_RNG
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    let mut id = String::with_capacity(36);
    for index in 0..32 {
        if matches!(index, 8 | 12 | 16 | 20) {
            id.push('-');
        }
        let random: u32 = rng.gen_range(0..16);
        let nibble = match index {
            12 => 4,
            16 => (random & 0x3) | 0x8,
            _ => random,
        };
        // nibble < 16, so the digit conversion cannot fail.
        id.push(char::from_digit(nibble, 16).unwrap_or('0'));
    }
    id
}

fn clock_seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    (nanos as u64) ^ u64::from(std::process::id()).rotate_left(32)
}
