use byte_map::{fingerprint, AllocError, ByteMap, GetOrInsert, DEFAULT_CAPACITY};
use std::cell::RefCell;
use std::collections::HashMap;
use test_log::test;

#[test]
fn insert_get_remove_iter() {
    let mut m = ByteMap::new();
    m.insert(&b"hello"[..], 1);
    m.insert(&b"world"[..], 2);
    assert_eq!(m.len(), 2);
    assert_eq!(m.get(b"hello"), Some(1));

    m.remove(b"hello");
    assert_eq!(m.len(), 1);
    assert_eq!(m.get(b"hello"), None);

    let mut seen = Vec::new();
    m.for_each_entry(|k, v| seen.push((k.to_vec(), k.len(), v)));
    assert_eq!(seen, vec![(b"world".to_vec(), 5, 2)]);
}

#[test]
fn missing_key_is_not_an_error() {
    let mut m: ByteMap<&str> = ByteMap::new();
    assert_eq!(m.get(b"!"), None);
    assert!(!m.contains_key(b"!"));
    assert!(m.remove(b"!").is_none());
    assert_eq!(m.len(), 0);
    assert_eq!(m.tombstones(), 0);
}

#[test]
fn growth_keeps_every_entry() {
    let keys: Vec<String> = (0..23).map(|i| format!("k{}", i)).collect();
    let mut m = ByteMap::new();
    for (i, k) in keys.iter().enumerate() {
        m.insert(k.as_bytes(), i);
    }
    assert!(m.capacity() > DEFAULT_CAPACITY, "23 inserts must grow a default table");
    assert_eq!(m.len(), 23);
    for (i, k) in keys.iter().enumerate() {
        assert_eq!(m.get(k.as_bytes()), Some(i));
    }
    let order: Vec<usize> = m.values().collect();
    assert_eq!(order, (0..23).collect::<Vec<_>>());
}

#[test]
fn growth_is_transparent_under_churn() {
    let keys: Vec<String> = (0..200).map(|i| format!("key-{:03}", i)).collect();
    let mut m: ByteMap<&str> = ByteMap::new();
    let mut model: Vec<(&str, usize)> = Vec::new();

    for (i, k) in keys.iter().enumerate() {
        m.insert(k.as_str(), i);
        model.push((k.as_str(), i));
        if i % 3 == 0 {
            let victim = keys[i / 2].as_str();
            if m.remove(victim.as_bytes()).is_some() {
                model.retain(|(k, _)| *k != victim);
            }
        }

        let capacity = m.capacity();
        let before: Vec<(&str, usize)> = m.iter().map(|(k, v)| (*k, v)).collect();
        assert_eq!(before, model);
        if i % 17 == 0 {
            m.resize();
            assert_eq!(m.capacity(), capacity * 2);
            let after: Vec<(&str, usize)> = m.iter().map(|(k, v)| (*k, v)).collect();
            assert_eq!(before, after);
        }
    }
    assert_eq!(m.len(), model.len());
}

#[test]
fn get_or_insert_reports_presence() {
    let mut m: ByteMap<Vec<u8>> = ByteMap::new();
    assert_eq!(m.get_or_insert(b"a".to_vec(), 10), GetOrInsert::Inserted(10));
    let hit = m.get_or_insert(b"a".to_vec(), 20);
    assert!(hit.found());
    assert_eq!(hit.value(), 10);
    assert_eq!(m.get(b"a"), Some(10));
}

// Values as handles into an external arena: eviction and removal callbacks
// release the slot they point at.
#[test]
fn callbacks_release_external_resources() {
    let arena: RefCell<HashMap<usize, &'static str>> = RefCell::new(HashMap::new());
    let alloc = |payload: &'static str| {
        let mut a = arena.borrow_mut();
        let id = a.len() + 100;
        a.insert(id, payload);
        id
    };
    let release = |_k: String, id: usize| {
        arena.borrow_mut().remove(&id).expect("handle released once");
    };

    let mut m: ByteMap<String> = ByteMap::new();
    m.soft_insert("x".to_string(), alloc("first"), release);
    m.soft_insert("x".to_string(), alloc("second"), release);
    assert_eq!(arena.borrow().len(), 1);
    let id = m.get(b"x").expect("present");
    assert_eq!(arena.borrow()[&id], "second");

    m.remove_with(b"x", release);
    m.remove_with(b"x", release);
    assert!(arena.borrow().is_empty());
    assert!(m.is_empty());
}

#[test]
fn destroying_through_into_iter_yields_owned_keys() {
    let mut m: ByteMap<Box<[u8]>> = ByteMap::new();
    for i in 0..50u8 {
        m.insert(vec![i; (i % 9) as usize + 1].into_boxed_slice(), i as usize);
    }
    m.remove(&[3u8; 4]);
    let drained: Vec<(Box<[u8]>, usize)> = m.into_iter().collect();
    assert_eq!(drained.len(), 49);
    assert!(drained.iter().all(|(k, v)| k.iter().all(|&b| b as usize == *v)));
    assert!(drained.windows(2).all(|w| w[0].1 < w[1].1), "insertion order");
}

#[test]
fn empty_key_is_a_key() {
    let mut m: ByteMap<&[u8]> = ByteMap::new();
    m.insert(b"", 7);
    assert_eq!(m.get(b""), Some(7));
    assert_eq!(m.len(), 1);
    assert_eq!(fingerprint(b""), 0x811c_9dc5);
}

#[test]
fn fallible_operations_succeed_on_small_tables() -> Result<(), AllocError> {
    let mut m: ByteMap<&str> = ByteMap::try_with_capacity(2)?;
    assert_eq!(m.try_insert("a", 1)?, None);
    assert_eq!(m.try_insert("a", 2)?, Some(1));
    assert_eq!(m.try_get_or_insert("b", 3)?, GetOrInsert::Inserted(3));
    assert_eq!(m.try_soft_insert_evicted("b", 4)?, Some(("b", 3)));
    m.try_resize()?;
    assert_eq!(m.get(b"a"), Some(2));
    assert_eq!(m.get(b"b"), Some(4));
    Ok(())
}

#[test]
fn overflowing_capacity_is_reported() {
    let err = ByteMap::<Vec<u8>>::try_with_capacity(usize::MAX).unwrap_err();
    assert_eq!(err, AllocError::CapacityOverflow);
    assert_eq!(err.to_string(), "slot array capacity overflow");
}

#[test]
fn shared_behind_a_mutex() {
    use std::sync::{Arc, Mutex};
    use std::thread;

    let m: Arc<Mutex<ByteMap<Vec<u8>>>> = Arc::new(Mutex::new(ByteMap::new()));
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let m = Arc::clone(&m);
            thread::spawn(move || {
                for i in 0..100usize {
                    let key = format!("{}-{}", t, i).into_bytes();
                    m.lock().unwrap().insert(key, i);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(m.lock().unwrap().len(), 400);
}
