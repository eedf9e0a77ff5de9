use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{MenuItem, PricedLine, StorageError, StorageGateway, TRACKING_IN_PROGRESS};

// ============================================================================
// In-Memory Storage Gateway for Tests
// ============================================================================

/// Test double for [`StorageGateway`]: a fixed menu, committed rows held in
/// memory, monotonic order ids, and switchable commit failure. Counts every
/// gateway call so tests can assert that a path performed no storage I/O.
pub struct MockStorage {
    menu: HashMap<String, MenuItem>,
    next_order_id: AtomicI64,
    orders: Mutex<Vec<(i64, PricedLine)>>,
    tracking: Mutex<HashMap<i64, String>>,
    fail_commits: AtomicBool,
    calls: AtomicUsize,
}

impl MockStorage {
    pub fn with_menu(items: &[(&str, f64)]) -> Self {
        let menu = items
            .iter()
            .enumerate()
            .map(|(index, &(name, price))| {
                (
                    name.to_string(),
                    MenuItem {
                        item_id: index as i64 + 1,
                        name: name.to_string(),
                        price,
                    },
                )
            })
            .collect();

        Self {
            menu,
            next_order_id: AtomicI64::new(1),
            orders: Mutex::new(Vec::new()),
            tracking: Mutex::new(HashMap::new()),
            fail_commits: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Number of gateway calls of any kind seen so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of distinct committed orders.
    pub fn committed_orders(&self) -> usize {
        self.tracking.lock().unwrap().len()
    }

    pub fn order_lines(&self, order_id: i64) -> Vec<PricedLine> {
        self.orders
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == order_id)
            .map(|(_, line)| line.clone())
            .collect()
    }

    pub fn tracking_status(&self, order_id: i64) -> Option<String> {
        self.tracking.lock().unwrap().get(&order_id).cloned()
    }

    /// Seeds a tracking row directly, as an external fulfillment system
    /// updating the status would.
    pub fn set_tracking(&self, order_id: i64, status: &str) {
        self.tracking
            .lock()
            .unwrap()
            .insert(order_id, status.to_string());
    }
}

#[async_trait]
impl StorageGateway for MockStorage {
    async fn lookup_menu_item(&self, name: &str) -> Result<Option<MenuItem>, StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.menu.get(name).cloned())
    }

    async fn commit_order(&self, lines: &[PricedLine]) -> Result<i64, StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(StorageError::Query(sqlx::Error::PoolClosed));
        }

        let order_id = self.next_order_id.fetch_add(1, Ordering::SeqCst);
        let mut orders = self.orders.lock().unwrap();
        for line in lines {
            orders.push((order_id, line.clone()));
        }
        self.tracking
            .lock()
            .unwrap()
            .insert(order_id, TRACKING_IN_PROGRESS.to_string());

        Ok(order_id)
    }

    async fn get_order_total(&self, order_id: i64) -> Result<f64, StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == order_id)
            .map(|(_, line)| line.total_price)
            .sum())
    }

    async fn get_tracking_status(&self, order_id: i64) -> Result<Option<String>, StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.tracking.lock().unwrap().get(&order_id).cloned())
    }
}
