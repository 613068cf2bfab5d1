//! 结果聚合 - 业务能力层
//!
//! 一次批量运行对应一个实例，运行结束即丢弃，没有跨运行的全局状态

use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::record::ResultRecord;

/// 线程安全的结果聚合表（考号 → 记录）
///
/// 写入互斥；每个考号只对应一个任务，理论上不会出现并发重复写，
/// 真出现时后写的覆盖先写的
#[derive(Debug, Default)]
pub struct ResultStore {
    inner: Mutex<HashMap<String, ResultRecord>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入（或覆盖）一条记录
    pub fn put(&self, record: ResultRecord) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.insert(record.roll.clone(), record);
    }

    /// 取当前内容的副本
    ///
    /// 并发写入期间调用也不会读到半条记录；批次编排在全部任务
    /// 结束后才取最终快照
    pub fn snapshot(&self) -> Vec<ResultRecord> {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn record(roll: &str) -> ResultRecord {
        ResultRecord {
            roll: roll.to_string(),
            name: format!("STUDENT {}", roll),
            sgpa: "7.5".to_string(),
            cgpa: "7.2".to_string(),
            result: "Pass".to_string(),
        }
    }

    #[test]
    fn test_put_overwrites_same_roll() {
        let store = ResultStore::new();
        store.put(record("0101CS211001"));
        store.put(record("0101CS211001"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_concurrent_distinct_puts() {
        let store = Arc::new(ResultStore::new());
        let mut handles = Vec::new();

        for worker in 0..8 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..50 {
                    store.put(record(&format!("0101CS21{}{:03}", worker, i)));
                }
            }));
        }
        for handle in handles {
            handle.join().expect("写入线程不应 panic");
        }

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 8 * 50);
        // 没有被写坏的记录
        assert!(snapshot.iter().all(|r| r.name == format!("STUDENT {}", r.roll)));
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let store = ResultStore::new();
        store.put(record("A001"));
        let snapshot = store.snapshot();
        store.put(record("A002"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.len(), 2);
    }
}
