// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headers written into every cache opened for writing.
//!
//! The standard set records which library wrote the file, where, by whom and
//! when. Applications add their own fields with [`register_header_generator`].

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use parking_lot::RwLock;
use tracing::debug;

use crate::payload::Payload;

/// Version of this library.
pub const LIBRARY_VERSION: &str = "libraryVersion";
/// Operating system and architecture of the writing host.
pub const HOST: &str = "host";
/// Name of the writing host, when the environment provides one.
pub const HOST_NAME: &str = "hostName";
/// User who created the cache.
pub const USER: &str = "user";
/// Creation time, RFC 3339 in UTC.
pub const CREATED_AT: &str = "createdAt";

/// Produces extra header fields for a cache being opened for writing.
pub type HeaderGenerator = Arc<dyn Fn() -> Vec<(String, Payload)> + Send + Sync>;

static GENERATORS: RwLock<Vec<HeaderGenerator>> = parking_lot::const_rwlock(Vec::new());

/// Add a generator whose fields are written after the standard ones.
///
/// A generated field with a standard name replaces the standard value.
pub fn register_header_generator(generator: HeaderGenerator) {
    GENERATORS.write().push(generator);
    debug!("registered header generator");
}

/// Drop every registered generator. The standard fields are unaffected.
pub fn reset_header_generators() {
    GENERATORS.write().clear();
}

fn env_first(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|n| std::env::var(n).ok().filter(|v| !v.is_empty()))
}

fn standard() -> BTreeMap<String, Payload> {
    let mut h = BTreeMap::new();
    h.insert(
        LIBRARY_VERSION.to_owned(),
        Payload::string(env!("CARGO_PKG_VERSION")),
    );
    h.insert(
        HOST.to_owned(),
        Payload::string(&format!(
            "{} {}",
            std::env::consts::OS,
            std::env::consts::ARCH
        )),
    );
    if let Some(name) = env_first(&["HOSTNAME", "COMPUTERNAME"]) {
        h.insert(HOST_NAME.to_owned(), Payload::string(&name));
    }
    let user = env_first(&["USER", "USERNAME", "LOGNAME"]).unwrap_or_else(|| "unknown".to_owned());
    h.insert(USER.to_owned(), Payload::string(&user));
    h.insert(
        CREATED_AT.to_owned(),
        Payload::string(&Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
    );
    h
}

/// The full header set: standard fields, then every registered generator's.
pub fn generate() -> BTreeMap<String, Payload> {
    let mut h = standard();
    // Clone out so generators run without holding the lock.
    let generators = GENERATORS.read().clone();
    for g in generators {
        h.extend(g());
    }
    h
}
