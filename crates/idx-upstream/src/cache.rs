//! 검색 결과 LRU 캐시.
//!
//! 검색 쿼리는 소수의 인기 심볼에 집중되므로 작은 LRU 캐시로
//! 업스트림 호출 대부분을 제거할 수 있습니다. 키는 호출자가
//! 정규화(대문자 변환)한 쿼리 문자열입니다.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde_json::Value;

/// LRU 캐시 내부 상태.
struct LruState {
    entries: HashMap<String, Value>,
    /// 접근 순서. 앞쪽이 가장 오래된 항목.
    order: VecDeque<String>,
}

/// 검색 응답 LRU 캐시.
///
/// Lock은 조회/삽입 동안만 유지됩니다. 캐시 미스 시 업스트림 조회는
/// Lock 밖에서 수행되므로 같은 쿼리가 동시에 들어오면 중복 조회가
/// 발생할 수 있지만, 결과가 동일하므로 허용합니다.
pub struct SearchCache {
    capacity: usize,
    state: Mutex<LruState>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SearchCache {
    /// 주어진 용량의 캐시 생성. 용량 0이면 아무것도 저장하지 않습니다.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(LruState {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// 캐시 조회. 히트 시 해당 항목을 최근 사용으로 갱신합니다.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(value) = state.entries.get(key).cloned() {
            // 최근 사용 위치로 이동
            if let Some(pos) = state.order.iter().position(|k| k == key) {
                state.order.remove(pos);
            }
            state.order.push_back(key.to_string());
            self.hits.fetch_add(1, Ordering::Relaxed);
            Some(value)
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    /// 캐시 삽입. 용량 초과 시 가장 오래 사용되지 않은 항목을 제거합니다.
    pub fn insert(&self, key: String, value: Value) {
        if self.capacity == 0 {
            return;
        }

        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        if state.entries.contains_key(&key) {
            if let Some(pos) = state.order.iter().position(|k| k == &key) {
                state.order.remove(pos);
            }
        } else if state.entries.len() >= self.capacity {
            if let Some(oldest) = state.order.pop_front() {
                state.entries.remove(&oldest);
            }
        }

        state.order.push_back(key.clone());
        state.entries.insert(key, value);
    }

    /// 저장된 항목 수.
    pub fn len(&self) -> usize {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.entries.len()
    }

    /// 캐시가 비어 있는지 확인.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 누적 히트 수.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// 누적 미스 수.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// 모든 항목 제거. 통계는 유지됩니다.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.entries.clear();
        state.order.clear();
    }
}
