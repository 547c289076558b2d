//! 点击日志管理器
//!
//! 负责收集和刷新点击日志，支持：
//! - 高并发写入缓冲（使用 DashMap）
//! - 定时刷盘到存储后端
//! - 阈值触发刷盘
//! - 刷盘失败时数据恢复

use dashmap::DashMap;
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};
use tokio::sync::Mutex;
use tokio::time::{Duration, sleep};
use tracing::{debug, trace, warn};

use crate::analytics::{ClickRecord, ClickSink};

/// 点击缓冲区，封装所有可变状态
struct ClickBuffer {
    /// 待刷盘的点击记录
    data: DashMap<u64, ClickRecord>,
    /// 下一个缓冲区内部 ID
    next_id: AtomicU64,
    /// 刷盘锁，防止并发刷盘
    flush_lock: Mutex<()>,
    /// 是否有 flush 任务待处理（防止重复 spawn）
    flush_pending: AtomicBool,
}

impl ClickBuffer {
    fn new() -> Self {
        Self {
            data: DashMap::new(),
            next_id: AtomicU64::new(0),
            flush_lock: Mutex::new(()),
            flush_pending: AtomicBool::new(false),
        }
    }

    /// 添加点击记录，返回当前缓冲区大小
    fn push(&self, record: ClickRecord) -> usize {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.data.insert(id, record);
        self.data.len()
    }

    /// 收集所有记录并清空缓冲区（逐个 remove 避免竞态）
    fn drain(&self) -> Vec<ClickRecord> {
        let keys: Vec<u64> = self.data.iter().map(|r| *r.key()).collect();
        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some((_, record)) = self.data.remove(&key) {
                records.push(record);
            }
        }
        records
    }

    /// 恢复数据到缓冲区（用于刷盘失败时的恢复）
    fn restore(&self, records: Vec<ClickRecord>) {
        for record in records {
            self.push(record);
        }
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

/// 点击管理器
///
/// 负责收集点击日志并定期刷盘到存储后端。
/// 状态完全封装在结构体内部，便于测试和多实例使用。
#[derive(Clone)]
pub struct ClickManager {
    /// 点击缓冲区（共享所有权）
    buffer: Arc<ClickBuffer>,
    /// 存储后端
    sink: Arc<dyn ClickSink>,
    /// 刷盘间隔
    flush_interval: Duration,
    /// 触发刷盘的最大缓冲条数
    flush_threshold: usize,
}

impl ClickManager {
    pub fn new(sink: Arc<dyn ClickSink>, flush_interval: Duration, flush_threshold: usize) -> Self {
        Self {
            buffer: Arc::new(ClickBuffer::new()),
            sink,
            flush_interval,
            flush_threshold,
        }
    }

    /// 记录一条点击（线程安全，无锁）
    ///
    /// 刷盘在后台进行，本方法永不阻塞调用方；
    /// 刷盘失败只记日志，不影响跳转路径。
    pub fn record(&self, record: ClickRecord) {
        let current_size = self.buffer.push(record);
        trace!("ClickManager: buffer size now {}", current_size);

        // 检查是否达到阈值，尝试触发刷盘
        if current_size >= self.flush_threshold {
            // 使用 compare_exchange 防止任务风暴：
            // 只有成功将 flush_pending 从 false 设为 true 的线程才 spawn
            if self
                .buffer
                .flush_pending
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::Relaxed)
                .is_ok()
            {
                let buffer = Arc::clone(&self.buffer);
                let sink = Arc::clone(&self.sink);
                tokio::spawn(async move {
                    if let Ok(_guard) = buffer.flush_lock.try_lock() {
                        Self::flush_buffer(&buffer, &sink).await;
                    } else {
                        trace!("ClickManager: flush already in progress, skipping");
                    }
                    // 无论成功与否都重置标志，允许下次触发
                    buffer.flush_pending.store(false, Ordering::Release);
                });
            }
        }
    }

    /// 启动后台刷盘任务（作为异步方法运行）
    pub async fn start_background_task(&self) {
        loop {
            sleep(self.flush_interval).await;

            debug!("ClickManager: Triggering scheduled flush");
            if let Ok(_guard) = self.buffer.flush_lock.try_lock() {
                Self::flush_buffer(&self.buffer, &self.sink).await;
            } else {
                trace!("ClickManager: flush already in progress, skipping scheduled flush");
            }
        }
    }

    /// 手动触发刷盘（阻塞直到完成）
    pub async fn flush(&self) {
        debug!("ClickManager: Manual flush triggered");
        let _guard = self.buffer.flush_lock.lock().await;
        Self::flush_buffer(&self.buffer, &self.sink).await;
    }

    /// 执行实际的刷盘操作
    async fn flush_buffer(buffer: &ClickBuffer, sink: &Arc<dyn ClickSink>) {
        let records = buffer.drain();

        if records.is_empty() {
            trace!("ClickManager: No clicks to flush");
            return;
        }

        let count = records.len();
        match sink.log_clicks_batch(records.clone()).await {
            Ok(_) => {
                debug!("ClickManager: Successfully flushed {} click entries", count);
            }
            Err(e) => {
                // 刷盘失败，恢复数据到 buffer
                buffer.restore(records);
                warn!(
                    "ClickManager: log_clicks_batch failed: {}, {} entries restored to buffer",
                    e, count
                );
            }
        }
    }

    /// 获取当前缓冲区大小（用于监控）
    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }
}
