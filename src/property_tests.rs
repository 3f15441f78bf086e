use proptest_derive::Arbitrary;

use super::*;
use proptest::prelude::*;
use std::collections::VecDeque;
use std::sync::Arc;

// simple enum to allow pushes, pops and evictions in any order
#[derive(Debug, Clone, Copy, Arbitrary)]
enum DequeOps<T> {
    PushFront(T),
    PopFront,
    PushBack(T),
    PopBack,
    PushBackEvictFront(T),
    PushFrontEvictBack(T),
    Clear,
}

// operations that address a fixed pool of handles by index
#[derive(Debug, Clone, Copy, Arbitrary)]
enum HandleOps {
    PushFront(#[proptest(strategy = "0..6usize")] usize),
    PushBack(#[proptest(strategy = "0..6usize")] usize),
    PopFront,
    PopBack,
    Search(#[proptest(strategy = "0..6usize")] usize),
    Remove(#[proptest(strategy = "0..6usize")] usize),
}

proptest! {
    // Test that every operation agrees with a VecDeque that refuses to grow past the capacity
    #[test]
    fn test_matches_bounded_model(
        capacity in 1usize..8,
        ref ops in proptest::collection::vec(any::<DequeOps<i32>>(), 0..100)
    ) {
        let deque = CircularDeque::<i32>::with_capacity(capacity).unwrap();
        let mut model = VecDeque::with_capacity(capacity);
        for &op in ops.iter() {
            let full = model.len() == capacity;
            let before = deque.debug();
            match op {
                DequeOps::PushFront(item) => {
                    if full {
                        prop_assert_eq!(deque.push_front(item), Err(Full(item)));
                        prop_assert_eq!(deque.debug(), before);
                    } else {
                        prop_assert_eq!(deque.push_front(item), Ok(()));
                        model.push_front(item);
                    }
                }
                DequeOps::PushBack(item) => {
                    if full {
                        prop_assert_eq!(deque.push_back(item), Err(Full(item)));
                        prop_assert_eq!(deque.debug(), before);
                    } else {
                        prop_assert_eq!(deque.push_back(item), Ok(()));
                        model.push_back(item);
                    }
                }
                DequeOps::PopFront => {
                    prop_assert_eq!(deque.peek_front(), model.front().copied());
                    prop_assert_eq!(deque.pop_front(), model.pop_front());
                }
                DequeOps::PopBack => {
                    prop_assert_eq!(deque.peek_back(), model.back().copied());
                    prop_assert_eq!(deque.pop_back(), model.pop_back());
                }
                DequeOps::PushBackEvictFront(item) => {
                    let expected = if full { model.pop_front() } else { None };
                    model.push_back(item);
                    prop_assert_eq!(deque.push_back_evict_front(item), expected);
                }
                DequeOps::PushFrontEvictBack(item) => {
                    let expected = if full { model.pop_back() } else { None };
                    model.push_front(item);
                    prop_assert_eq!(deque.push_front_evict_back(item), expected);
                }
                DequeOps::Clear => {
                    deque.clear();
                    model.clear();
                }
            }
            prop_assert!(deque.len() <= capacity);
            prop_assert_eq!(deque.len(), model.len());
            prop_assert_eq!(deque.is_empty(), model.is_empty());
            prop_assert_eq!(deque.is_full(), model.len() == capacity);
        }
        let model_vec: Vec<_> = model.into_iter().collect();
        prop_assert_eq!(deque.to_vec(), model_vec);
    }

    // Test that strings survive arbitrary wraparound without being lost or duplicated
    #[test]
    fn test_push_pop_string(
        capacity in 1usize..6,
        ref ops in proptest::collection::vec(any::<DequeOps<String>>(), 0..100)
    ) {
        let deque = CircularDeque::<String>::with_capacity(capacity).unwrap();
        let mut model = VecDeque::new();
        for op in ops.iter() {
            match op {
                DequeOps::PushFront(item) => {
                    if deque.push_front(item.clone()).is_ok() {
                        model.push_front(item.clone());
                    }
                }
                DequeOps::PushBack(item) => {
                    if deque.push_back(item.clone()).is_ok() {
                        model.push_back(item.clone());
                    }
                }
                DequeOps::PopFront => { prop_assert_eq!(deque.pop_front(), model.pop_front()); }
                DequeOps::PopBack => { prop_assert_eq!(deque.pop_back(), model.pop_back()); }
                DequeOps::PushBackEvictFront(item) => {
                    if model.len() == capacity {
                        model.pop_front();
                    }
                    model.push_back(item.clone());
                    let _ = deque.push_back_evict_front(item.clone());
                }
                DequeOps::PushFrontEvictBack(item) => {
                    if model.len() == capacity {
                        model.pop_back();
                    }
                    model.push_front(item.clone());
                    let _ = deque.push_front_evict_back(item.clone());
                }
                DequeOps::Clear => {
                    let mut drained = Vec::new();
                    deque.traverse_and_clear(|s| drained.push(s));
                    let expected: Vec<_> = model.drain(..).collect();
                    prop_assert_eq!(drained, expected);
                }
            }
        }
        let mut seen = Vec::new();
        deque.traverse(|s| seen.push(s.clone()));
        let model_vec: Vec<_> = model.into_iter().collect();
        prop_assert_eq!(seen, model_vec);
    }

    // Test that search and remove find handles by identity and keep the survivors in order
    #[test]
    fn test_search_remove_by_identity(
        capacity in 1usize..8,
        ref ops in proptest::collection::vec(any::<HandleOps>(), 0..100)
    ) {
        // every handle holds the same value, so only identity can tell them apart
        let pool: Vec<Arc<u8>> = (0..6).map(|_| Arc::new(0)).collect();
        let deque = CircularDeque::<Arc<u8>>::with_capacity(capacity).unwrap();
        let mut model: VecDeque<usize> = VecDeque::new();
        for &op in ops.iter() {
            match op {
                HandleOps::PushFront(i) => {
                    if deque.push_front(Arc::clone(&pool[i])).is_ok() {
                        model.push_front(i);
                    }
                }
                HandleOps::PushBack(i) => {
                    if deque.push_back(Arc::clone(&pool[i])).is_ok() {
                        model.push_back(i);
                    }
                }
                HandleOps::PopFront => {
                    let popped = deque.pop_front();
                    let expected = model.pop_front();
                    prop_assert_eq!(popped.is_some(), expected.is_some());
                    if let (Some(h), Some(i)) = (popped, expected) {
                        prop_assert!(Arc::ptr_eq(&h, &pool[i]));
                    }
                }
                HandleOps::PopBack => {
                    let popped = deque.pop_back();
                    let expected = model.pop_back();
                    prop_assert_eq!(popped.is_some(), expected.is_some());
                    if let (Some(h), Some(i)) = (popped, expected) {
                        prop_assert!(Arc::ptr_eq(&h, &pool[i]));
                    }
                }
                HandleOps::Search(i) => {
                    let expected = model.iter().position(|&x| x == i);
                    prop_assert_eq!(deque.search(&pool[i]), expected);
                }
                HandleOps::Remove(i) => {
                    let before = deque.debug();
                    match model.iter().position(|&x| x == i) {
                        Some(pos) => {
                            model.remove(pos);
                            let removed = deque.remove(&pool[i]);
                            prop_assert!(matches!(removed, Ok(ref h) if Arc::ptr_eq(h, &pool[i])));
                        }
                        None => {
                            prop_assert_eq!(deque.remove(&pool[i]), Err(NotFound));
                            prop_assert_eq!(deque.debug(), before);
                        }
                    }
                }
            }
            prop_assert_eq!(deque.len(), model.len());
            for (offset, &i) in model.iter().enumerate() {
                prop_assert!(deque.search(&pool[i]).map_or(false, |found| found <= offset));
            }
        }
        let order: Vec<usize> = deque
            .to_vec()
            .iter()
            .filter_map(|h| pool.iter().position(|p| Arc::ptr_eq(p, h)))
            .collect();
        let model_vec: Vec<_> = model.into_iter().collect();
        prop_assert_eq!(order, model_vec);
    }
}
