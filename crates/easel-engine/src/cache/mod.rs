//! Frame-aged resource caches.

mod expiring;

pub use expiring::ExpiringCache;
