//! Alias additions racing on one SQLite database file.

use std::sync::{Arc, Barrier};
use std::thread;

use sshcache_core::Attributes;
use sshcache_hosts::{get_host_record, store_host};
use sshcache_storage::SqliteStore;

const THREADS: usize = 2;
const ALIASES_PER_THREAD: usize = 15;

#[test]
fn concurrent_alias_additions_are_all_kept() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hosts.db").to_string_lossy().to_string();
    {
        let mut store = SqliteStore::new(&path).unwrap();
        store_host(&mut store, "web01", None, 0, Attributes::new()).unwrap();
    }

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let path = path.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut store = SqliteStore::new(&path).unwrap();
                barrier.wait();
                for i in 0..ALIASES_PER_THREAD {
                    let alias = format!("alias-{t}-{i}");
                    store_host(&mut store, "web01", Some(alias.as_str()), i as i64, Attributes::new())
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let store = SqliteStore::new(&path).unwrap();
    let record = get_host_record(&store, "web01").unwrap().unwrap();
    assert_eq!(record.aliases.len(), THREADS * ALIASES_PER_THREAD);
    for t in 0..THREADS {
        for i in 0..ALIASES_PER_THREAD {
            let alias = format!("alias-{t}-{i}");
            assert!(record.aliases.contains(&alias), "missing {alias}");
        }
    }
}
