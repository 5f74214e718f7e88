/*
    uft-core
    https://github.com/uft-project/uft-core

    Copyright 2026 UFT Project Developers

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    src/registry.rs

    The process-wide format registry: read-mostly shared state mapping
    stable format ids to adapters. Built-in adapters register lazily on
    first access; external adapters may be registered at any time, ideally
    before the first `open`.
*/
use std::{
    collections::BTreeMap,
    sync::{Arc, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::{
    adapter::{FormatAdapter, FormatId},
    formats,
};

type AdapterMap = BTreeMap<FormatId, Arc<dyn FormatAdapter>>;

static REGISTRY: OnceLock<RwLock<AdapterMap>> = OnceLock::new();

fn registry() -> &'static RwLock<AdapterMap> {
    REGISTRY.get_or_init(|| {
        let mut map: AdapterMap = BTreeMap::new();
        for adapter in formats::builtin_adapters() {
            map.insert(adapter.descriptor().id, adapter);
        }
        log::debug!("format registry initialized with {} built-in adapters", map.len());
        RwLock::new(map)
    })
}

// A panic while holding the lock leaves the map intact; keep serving it.
fn read_map() -> RwLockReadGuard<'static, AdapterMap> {
    registry().read().unwrap_or_else(|poison| poison.into_inner())
}

fn write_map() -> RwLockWriteGuard<'static, AdapterMap> {
    registry().write().unwrap_or_else(|poison| poison.into_inner())
}

/// Register an adapter. Re-registering an id replaces the previous adapter
/// (last wins) and logs a warning.
pub fn register(adapter: Arc<dyn FormatAdapter>) {
    let id = adapter.descriptor().id;
    let name = adapter.descriptor().name;
    let mut map = write_map();
    if let Some(previous) = map.insert(id, adapter) {
        log::warn!(
            "format id {id} re-registered: {} replaces {}",
            name,
            previous.descriptor().name
        );
    }
}

pub fn lookup_by_id(id: FormatId) -> Option<Arc<dyn FormatAdapter>> {
    read_map().get(&id).cloned()
}

/// Adapters claiming a filename extension (matched case-insensitively,
/// without the dot). Extensions are not unique across formats.
pub fn lookup_by_extension(ext: &str) -> Vec<Arc<dyn FormatAdapter>> {
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    read_map()
        .values()
        .filter(|a| a.descriptor().extensions.iter().any(|&e| e == ext))
        .cloned()
        .collect()
}

/// All registered adapters in id order.
pub fn enumerate() -> Vec<Arc<dyn FormatAdapter>> {
    read_map().values().cloned().collect()
}

/// Every extension any registered format claims, sorted and deduplicated.
pub fn supported_extensions() -> Vec<&'static str> {
    let mut exts: Vec<&'static str> = read_map()
        .values()
        .flat_map(|a| a.descriptor().extensions.iter().copied())
        .collect();
    exts.sort_unstable();
    exts.dedup();
    exts
}
